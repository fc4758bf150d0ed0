//! The build cycle state machine.
//!
//! A cycle moves through the [`BuildStage`]s in order:
//!
//! ```text
//! Init → WorkspacePrepared → ListGenerated → ImportsWired
//!      → DependenciesFetched → Compiled → Installed
//! ```
//!
//! Any fatal failure stops the cycle in a terminal failed state described by
//! a [`BuildError`]. Only adding an individual plugin to the manifest is
//! allowed to fail without stopping the cycle; such plugins are skipped,
//! dropped from the generated plugin list and reported in the
//! [`WiringReport`].

use std::path::{Path, PathBuf};

use graft_plugins::{
    InstalledPluginSource, PluginId, PluginSet, UpdateOperation, reconcile, write_plugin_list,
};
use graft_syntax::ImportEditor;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::error::{BuildError, BuildFailure, BuildStage, PluginWiringFailure};
use crate::layout::{BINARY_NAME, ProjectLayout};
use crate::tool::{Cargo, ToolRunner};
use crate::workspace::{install_binary, prepare_workspace};

const ORCHESTRATOR_TARGET: &str = "graft_build::orchestrator";

/// Outcome of the import wiring stage.
#[derive(Debug, Clone, Default)]
pub struct WiringReport {
    wired: Vec<PluginId>,
    newly_imported: Vec<PluginId>,
    failures: Vec<PluginWiringFailure>,
}

impl WiringReport {
    /// Plugins added to the manifest and imported by the entry point.
    #[must_use]
    pub fn wired(&self) -> &[PluginId] {
        &self.wired
    }

    /// Wired plugins whose import had to be inserted.
    #[must_use]
    pub fn newly_imported(&self) -> &[PluginId] {
        &self.newly_imported
    }

    /// Plugins skipped because they could not be added.
    #[must_use]
    pub fn failures(&self) -> &[PluginWiringFailure] {
        &self.failures
    }

    /// Returns `true` when no plugin was skipped.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Summary of a successful cycle.
#[derive(Debug, Clone)]
pub struct BuildReport {
    plugins: PluginSet,
    upgrade: Option<PluginId>,
    wiring: WiringReport,
    installed: PathBuf,
    completed: Vec<BuildStage>,
}

impl BuildReport {
    /// Target plugin set the cycle reconciled to. Plugins listed in
    /// [`WiringReport::failures`] are left out of the generated list.
    #[must_use]
    pub const fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    /// Plugin whose dependency was upgraded, if any.
    #[must_use]
    pub const fn upgrade(&self) -> Option<&PluginId> {
        self.upgrade.as_ref()
    }

    /// Per-plugin wiring results.
    #[must_use]
    pub const fn wiring(&self) -> &WiringReport {
        &self.wiring
    }

    /// Path the new binary was installed to.
    #[must_use]
    pub fn installed(&self) -> &Path {
        &self.installed
    }

    /// Stages completed, in order.
    #[must_use]
    pub fn completed(&self) -> &[BuildStage] {
        &self.completed
    }
}

/// Drives one build cycle against a [`ProjectLayout`].
#[derive(Debug)]
pub struct BuildOrchestrator<R> {
    layout: ProjectLayout,
    cargo: Cargo,
    runner: R,
    editor: ImportEditor,
}

impl<R: ToolRunner> BuildOrchestrator<R> {
    /// Creates an orchestrator that runs `cargo` through `runner`.
    #[must_use]
    pub const fn new(layout: ProjectLayout, cargo: Cargo, runner: R) -> Self {
        Self {
            layout,
            cargo,
            runner,
            editor: ImportEditor::new(),
        }
    }

    /// Returns the layout the cycle operates on.
    #[must_use]
    pub const fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Returns the tool runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs a full cycle for `operation`.
    ///
    /// `timestamp` is stamped into the generated plugin list.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] naming the first stage that failed fatally.
    /// The install target is only replaced when every stage before
    /// installation succeeded.
    pub fn run(
        &self,
        installed: &dyn InstalledPluginSource,
        operation: &UpdateOperation,
        timestamp: OffsetDateTime,
    ) -> Result<BuildReport, BuildError> {
        info!(
            target: ORCHESTRATOR_TARGET,
            operation = %operation,
            workspace = %self.layout.workspace_dir().display(),
            "starting build cycle"
        );
        let mut completed = Vec::with_capacity(BuildStage::ALL.len());

        run_stage(BuildStage::WorkspacePrepared, &mut completed, || {
            self.prepare()
        })?;
        let (plugins, upgrade) = run_stage(BuildStage::ListGenerated, &mut completed, || {
            self.generate_list(installed, operation, timestamp)
        })?;
        let wiring = run_stage(BuildStage::ImportsWired, &mut completed, || {
            self.wire_imports(&plugins, timestamp)
        })?;
        run_stage(BuildStage::DependenciesFetched, &mut completed, || {
            self.fetch_dependencies(upgrade.as_ref())
        })?;
        run_stage(BuildStage::Compiled, &mut completed, || self.compile())?;
        run_stage(BuildStage::Installed, &mut completed, || self.install())?;

        info!(
            target: ORCHESTRATOR_TARGET,
            plugins = plugins.len(),
            skipped = wiring.failures().len(),
            installed = %self.layout.install_target().display(),
            "build cycle complete"
        );

        Ok(BuildReport {
            plugins,
            upgrade,
            wiring,
            installed: self.layout.install_target().to_path_buf(),
            completed,
        })
    }

    fn prepare(&self) -> Result<(), BuildFailure> {
        prepare_workspace(
            self.layout.source_dir(),
            self.layout.workspace_dir(),
            &self.layout.required_files(),
        )?;
        Ok(())
    }

    fn generate_list(
        &self,
        installed: &dyn InstalledPluginSource,
        operation: &UpdateOperation,
        timestamp: OffsetDateTime,
    ) -> Result<(PluginSet, Option<PluginId>), BuildFailure> {
        let current = installed.list_installed()?;
        debug!(
            target: ORCHESTRATOR_TARGET,
            installed = current.len(),
            "read installed plugins"
        );

        let reconciliation = reconcile(current, operation);
        write_plugin_list(
            &self.layout.plugin_list(),
            reconciliation.plugins(),
            timestamp,
        )?;
        Ok(reconciliation.into_parts())
    }

    fn wire_imports(
        &self,
        plugins: &PluginSet,
        timestamp: OffsetDateTime,
    ) -> Result<WiringReport, BuildFailure> {
        let entry_point = self.layout.plugin_imports();
        let manifest = self.layout.cli_manifest();

        // A broken entry point would fail every plugin; stop before any
        // manifest edits.
        self.editor.inspect(&entry_point)?;

        let mut report = WiringReport::default();
        for plugin in plugins {
            if let Err(cause) = self.runner.run(&self.cargo.add(&manifest, plugin)) {
                warn!(
                    target: ORCHESTRATOR_TARGET,
                    plugin = %plugin,
                    error = %cause,
                    "skipping plugin that could not be added"
                );
                report
                    .failures
                    .push(PluginWiringFailure::new(plugin.clone(), cause));
                continue;
            }

            if self.editor.ensure_import(&entry_point, &plugin.import_path())? {
                report.newly_imported.push(plugin.clone());
            }
            report.wired.push(plugin.clone());
        }

        // The binary must not advertise plugins it was built without.
        if !report.is_complete() {
            let wired: PluginSet = report.wired.iter().cloned().collect();
            write_plugin_list(&self.layout.plugin_list(), &wired, timestamp)?;
            debug!(
                target: ORCHESTRATOR_TARGET,
                skipped = report.failures.len(),
                "plugin list regenerated without skipped plugins"
            );
        }

        Ok(report)
    }

    fn fetch_dependencies(&self, upgrade: Option<&PluginId>) -> Result<(), BuildFailure> {
        let manifest = self.layout.workspace_manifest();
        let invocation = upgrade.map_or_else(
            || self.cargo.fetch(&manifest),
            |plugin| self.cargo.update(&manifest, plugin),
        );
        self.runner.run(&invocation)?;
        Ok(())
    }

    fn compile(&self) -> Result<(), BuildFailure> {
        let invocation = self.cargo.build(
            &self.layout.workspace_manifest(),
            BINARY_NAME,
            self.layout.target_dir(),
        );
        self.runner.run(&invocation)?;
        Ok(())
    }

    fn install(&self) -> Result<(), BuildFailure> {
        install_binary(&self.layout.built_binary(), self.layout.install_target())?;
        Ok(())
    }
}

fn run_stage<T>(
    stage: BuildStage,
    completed: &mut Vec<BuildStage>,
    step: impl FnOnce() -> Result<T, BuildFailure>,
) -> Result<T, BuildError> {
    debug!(target: ORCHESTRATOR_TARGET, stage = %stage, "entering stage");
    match step() {
        Ok(value) => {
            completed.push(stage);
            info!(target: ORCHESTRATOR_TARGET, state = ?stage, "stage complete");
            Ok(value)
        }
        Err(cause) => {
            error!(
                target: ORCHESTRATOR_TARGET,
                stage = %stage,
                error = %cause,
                "stage failed"
            );
            Err(BuildError::new(stage, cause))
        }
    }
}
