//! Crate-level fixtures and BDD tests.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use graft_plugins::{PluginId, PluginRegistry};
use tempfile::TempDir;

use crate::layout::{CLI_MANIFEST, PLUGIN_IMPORTS, PLUGIN_LIST, ProjectLayout, WORKSPACE_MANIFEST};
use crate::tool::{ToolError, ToolInvocation, ToolOutput, ToolRunner};


pub(crate) const ENTRY_POINT: &str = "\
//! Links every enabled plugin crate into the binary.

use graft_plugins as _;
";

pub(crate) const OLD_BINARY: &str = "old binary";
pub(crate) const NEW_BINARY: &str = "new binary";

/// A canonical source tree, scratch directories and an installed binary in
/// one temporary directory.
pub(crate) struct Project {
    dir: TempDir,
}

impl Project {
    pub(crate) fn new() -> Self {
        let project = Self {
            dir: tempfile::tempdir().expect("tempdir"),
        };
        project.write_source(WORKSPACE_MANIFEST, "[workspace]\nmembers = [\"crates/*\"]\n");
        project.write_source(CLI_MANIFEST, "[package]\nname = \"graft-cli\"\n");
        project.write_source(PLUGIN_LIST, "pub const PLUGIN_PACKAGES: &[&str] = &[];\n");
        project.write_source(PLUGIN_IMPORTS, ENTRY_POINT);
        write_file(&project.install_target(), OLD_BINARY);
        project
    }

    pub(crate) fn source_dir(&self) -> PathBuf {
        self.dir.path().join("source")
    }

    pub(crate) fn install_target(&self) -> PathBuf {
        self.dir.path().join("bin").join("graft")
    }

    pub(crate) fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(
            self.source_dir(),
            self.dir.path().join("workspace"),
            self.dir.path().join("target"),
            self.install_target(),
        )
    }

    pub(crate) fn write_source(&self, relative: &str, contents: &str) {
        write_file(&self.source_dir().join(relative), contents);
    }

    pub(crate) fn remove_source(&self, relative: &str) {
        fs::remove_file(self.source_dir().join(relative)).expect("remove source file");
    }

    pub(crate) fn workspace_file(&self, relative: &str) -> String {
        fs::read_to_string(self.layout().workspace_dir().join(relative)).expect("workspace file")
    }

    pub(crate) fn installed_binary(&self) -> String {
        fs::read_to_string(self.install_target()).expect("installed binary")
    }
}

pub(crate) fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

pub(crate) fn plugin(name: &str) -> PluginId {
    PluginId::new(name).expect("valid plugin name")
}

pub(crate) fn registry(names: &[&str]) -> PluginRegistry {
    PluginRegistry::from_generated(names).expect("registry")
}

/// Writes the release binary a `cargo build` invocation would produce.
pub(crate) fn emit_binary(invocation: &ToolInvocation) {
    let target_dir = invocation
        .flag_value("--target-dir")
        .map(PathBuf::from)
        .expect("build names a target dir");
    let binary = target_dir
        .join("release")
        .join(format!("graft{}", std::env::consts::EXE_SUFFIX));
    write_file(&binary, NEW_BINARY);
}

/// Runner that records every invocation, fails `cargo add` for selected
/// packages and emits a binary on `cargo build`.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    failing_packages: Vec<String>,
    calls: RefCell<Vec<ToolInvocation>>,
}

impl ScriptedRunner {
    pub(crate) fn fail_adding(&mut self, package: &str) {
        self.failing_packages.push(package.to_owned());
    }

    pub(crate) fn subcommands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| call.subcommand().map(str::to_owned))
            .collect()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.calls.borrow_mut().push(invocation.clone());

        match invocation.subcommand() {
            Some("add") => {
                let package = invocation
                    .args()
                    .last()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if self.failing_packages.contains(&package) {
                    return Err(ToolError::NonZeroExit {
                        command: invocation.to_string(),
                        status: Some(101),
                        stderr: format!("error: the crate `{package}` could not be found"),
                    });
                }
            }
            Some("build") => emit_binary(invocation),
            _ => {}
        }
        Ok(ToolOutput::default())
    }
}
