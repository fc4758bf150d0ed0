use super::*;

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use graft_build::layout::{CLI_MANIFEST, PLUGIN_IMPORTS, PLUGIN_LIST, WORKSPACE_MANIFEST};
use graft_build::{ToolError, ToolInvocation, ToolOutput};
use rstest::{fixture, rstest};
use tempfile::TempDir;

const ENTRY_POINT: &str = "//! Links every enabled plugin crate into the binary.\n\nuse graft_plugins as _;\n";

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// A loader that panics, proving a command failed before configuration was
/// read.
struct PanickingLoader;

impl ConfigLoader for PanickingLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        panic!("configuration must not be loaded");
    }
}

/// Records invocations, fails `cargo add` for chosen packages and writes a
/// binary on `cargo build`.
#[derive(Default)]
struct ScriptedRunner {
    failing_packages: Vec<String>,
    calls: RefCell<Vec<String>>,
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        self.calls.borrow_mut().push(invocation.to_string());
        let package = invocation
            .args()
            .last()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_default();

        match invocation.subcommand() {
            Some("add") if self.failing_packages.contains(&package) => {
                return Err(ToolError::NonZeroExit {
                    command: invocation.to_string(),
                    status: Some(101),
                    stderr: format!("error: the crate `{package}` could not be found"),
                });
            }
            Some("build") => {
                let target_dir = invocation
                    .flag_value("--target-dir")
                    .map(PathBuf::from)
                    .expect("build names a target dir");
                write_file(
                    &target_dir
                        .join("release")
                        .join(format!("graft{}", std::env::consts::EXE_SUFFIX)),
                    "rebuilt",
                );
            }
            _ => {}
        }
        Ok(ToolOutput::default())
    }
}

struct Fixture {
    dir: TempDir,
    runner: ScriptedRunner,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Fixture {
    fn config(&self) -> Config {
        Config {
            source_dir: Some(self.dir.path().join("source")),
            workspace_dir: Some(self.dir.path().join("workspace")),
            target_dir: Some(self.dir.path().join("target")),
            ..Config::default()
        }
    }

    fn output_path(&self) -> PathBuf {
        self.dir.path().join("bin").join("graft")
    }

    fn run(&mut self, args: &[&str], compiled_plugins: &[&str]) -> ExitCode {
        let loader = StaticConfigLoader {
            config: self.config(),
        };
        self.run_with_loader(args, compiled_plugins, &loader)
    }

    fn run_with_loader<L: ConfigLoader>(
        &mut self,
        args: &[&str],
        compiled_plugins: &[&str],
        loader: &L,
    ) -> ExitCode {
        let runtime = Runtime {
            loader,
            runner: &self.runner,
            compiled_plugins,
        };
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        run_with(
            std::iter::once("graft")
                .chain(args.iter().copied())
                .map(OsString::from),
            &mut io,
            &runtime,
        )
    }

    fn stdout(&self) -> String {
        String::from_utf8(self.stdout.clone()).expect("stdout utf8")
    }

    fn stderr(&self) -> String {
        String::from_utf8(self.stderr.clone()).expect("stderr utf8")
    }

    fn workspace_file(&self, relative: &str) -> String {
        fs::read_to_string(self.dir.path().join("workspace").join(relative))
            .expect("workspace file")
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

#[fixture]
fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("source");
    write_file(&source.join(WORKSPACE_MANIFEST), "[workspace]\n");
    write_file(&source.join(CLI_MANIFEST), "[package]\nname = \"graft-cli\"\n");
    write_file(&source.join(PLUGIN_LIST), "pub const PLUGIN_PACKAGES: &[&str] = &[];\n");
    write_file(&source.join(PLUGIN_IMPORTS), ENTRY_POINT);

    Fixture {
        dir,
        runner: ScriptedRunner::default(),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

#[rstest]
fn list_prints_compiled_plugins_in_order(mut fixture: Fixture) {
    let exit = fixture.run(&["list"], &["graft-plugin-zip", "graft-plugin-audit"]);

    assert_eq!(exit, ExitCode::SUCCESS);
    assert_eq!(fixture.stdout(), "graft-plugin-audit\ngraft-plugin-zip\n");
    assert!(fixture.runner.calls.borrow().is_empty());
}

#[rstest]
fn add_rebuilds_and_installs_at_output(mut fixture: Fixture) {
    let output = fixture.output_path();
    let output_arg = output.to_string_lossy().into_owned();

    let exit = fixture.run(
        &["add", "graft-plugin-zip", "--output", output_arg.as_str()],
        &["graft-plugin-audit"],
    );

    assert_eq!(exit, ExitCode::SUCCESS, "stderr: {}", fixture.stderr());
    assert_eq!(fs::read_to_string(&output).expect("installed binary"), "rebuilt");
    assert!(fixture.stdout().starts_with("add graft-plugin-zip: installed graft with 2 plugin(s)"));

    let entry_point = fixture.workspace_file(PLUGIN_IMPORTS);
    assert!(entry_point.contains("use graft_plugin_audit as _;"));
    assert!(entry_point.contains("use graft_plugin_zip as _;"));
    assert!(
        fixture
            .workspace_file(PLUGIN_LIST)
            .contains("\"graft-plugin-audit\",\n    \"graft-plugin-zip\",")
    );
}

#[rstest]
fn wiring_failures_are_reported_as_warnings(mut fixture: Fixture) {
    fixture
        .runner
        .failing_packages
        .push(String::from("graft-plugin-lint"));
    let output_arg = fixture.output_path().to_string_lossy().into_owned();

    let exit = fixture.run(
        &["rebuild", "--output", output_arg.as_str()],
        &["graft-plugin-audit", "graft-plugin-lint"],
    );

    assert_eq!(exit, ExitCode::SUCCESS);
    assert!(
        fixture
            .stderr()
            .contains("warning: failed to wire plugin 'graft-plugin-lint'")
    );
    assert!(fixture.stdout().contains("with 1 plugin(s)"));
}

#[rstest]
fn update_upgrades_the_named_plugin(mut fixture: Fixture) {
    let output_arg = fixture.output_path().to_string_lossy().into_owned();

    let exit = fixture.run(
        &["update", "graft-plugin-audit", "--output", output_arg.as_str()],
        &["graft-plugin-audit"],
    );

    assert_eq!(exit, ExitCode::SUCCESS);
    let calls = fixture.runner.calls.borrow();
    assert!(
        calls
            .iter()
            .any(|call| call.contains(" update ") && call.ends_with("--package graft-plugin-audit")),
        "calls: {calls:?}"
    );
    assert!(!calls.iter().any(|call| call.contains(" fetch ")));
}

#[rstest]
fn invalid_plugin_names_fail_before_configuration_loads(mut fixture: Fixture) {
    let exit = fixture.run_with_loader(&["add", "../evil"], &[], &PanickingLoader);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(fixture.stderr().starts_with("invalid plugin name"));
}

#[rstest]
fn missing_source_tree_fails_while_preparing(mut fixture: Fixture) {
    fs::remove_dir_all(fixture.dir.path().join("source")).expect("remove source");
    let output_arg = fixture.output_path().to_string_lossy().into_owned();

    let exit = fixture.run(&["rebuild", "--output", output_arg.as_str()], &[]);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(
        fixture
            .stderr()
            .contains("build failed while preparing the workspace")
    );
    assert!(!fixture.output_path().exists());
}

#[rstest]
fn configuration_failures_are_reported(mut fixture: Fixture) {
    struct FailingLoader;

    impl ConfigLoader for FailingLoader {
        fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
            Err(AppError::CurrentExe(std::io::Error::other("no executable")))
        }
    }

    let exit = fixture.run_with_loader(&["list"], &[], &FailingLoader);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(fixture.stderr().contains("no executable"));
}

#[rstest]
fn help_is_written_to_stdout(mut fixture: Fixture) {
    let exit = fixture.run_with_loader(&["--help"], &[], &PanickingLoader);

    assert_eq!(exit, ExitCode::SUCCESS);
    assert!(fixture.stdout().contains("Usage: graft"));
    assert!(fixture.stderr().is_empty());
}

#[rstest]
fn missing_command_is_a_usage_error(mut fixture: Fixture) {
    let exit = fixture.run_with_loader(&[], &[], &PanickingLoader);

    assert_eq!(exit, ExitCode::FAILURE);
    assert!(fixture.stderr().contains("Usage: graft"));
}

#[rstest]
#[case::rebuild(&["rebuild"], UpdateOperation::Rebuild)]
#[case::add(&["add", "zip"], UpdateOperation::Add(plugin("zip")))]
#[case::remove(&["remove", "zip"], UpdateOperation::Remove(plugin("zip")))]
#[case::update(&["update", "zip"], UpdateOperation::Update(plugin("zip")))]
fn commands_map_to_operations(#[case] args: &[&str], #[case] expected: UpdateOperation) {
    let cli = Cli::try_parse_from(std::iter::once("graft").chain(args.iter().copied()))
        .expect("arguments parse");

    let plan = CommandPlan::try_from(cli.command).expect("valid command");

    assert_eq!(
        plan,
        CommandPlan::Build {
            operation: expected,
            output: None
        }
    );
}

fn plugin(name: &str) -> graft_plugins::PluginId {
    graft_plugins::PluginId::new(name).expect("valid plugin name")
}
