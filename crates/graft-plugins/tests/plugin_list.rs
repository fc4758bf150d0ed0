//! Integration tests covering the registry, reconciliation and the generated
//! plugin list together.

use std::fs;

use rstest::{fixture, rstest};
use time::OffsetDateTime;

use graft_plugins::{
    InstalledPluginSource, PluginId, PluginRegistry, PluginSet, UpdateOperation, reconcile,
    write_plugin_list,
};

#[fixture]
fn installed() -> PluginSet {
    PluginRegistry::from_generated(&["graft-plugin-audit", "graft-plugin-lint"])
        .unwrap_or_else(|err| panic!("registry: {err}"))
        .list_installed()
        .unwrap_or_else(|err| panic!("installed: {err}"))
}

fn plugin(name: &str) -> PluginId {
    PluginId::new(name).unwrap_or_else(|err| panic!("plugin id: {err}"))
}

fn listed_packages(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix('"'))
        .filter_map(|line| line.strip_suffix("\","))
        .map(str::to_owned)
        .collect()
}

#[rstest]
#[case(UpdateOperation::Rebuild, &["graft-plugin-audit", "graft-plugin-lint"])]
#[case(
    UpdateOperation::Add(plugin("graft-plugin-zip")),
    &["graft-plugin-audit", "graft-plugin-lint", "graft-plugin-zip"]
)]
#[case(UpdateOperation::Remove(plugin("graft-plugin-lint")), &["graft-plugin-audit"])]
#[case(
    UpdateOperation::Remove(plugin("graft-plugin-zip")),
    &["graft-plugin-audit", "graft-plugin-lint"]
)]
#[case(
    UpdateOperation::Update(plugin("graft-plugin-lint")),
    &["graft-plugin-audit", "graft-plugin-lint"]
)]
fn generated_list_matches_reconciled_set(
    installed: PluginSet,
    #[case] operation: UpdateOperation,
    #[case] expected: &[&str],
) {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let path = dir.path().join("plugin_list.rs");

    let target = reconcile(installed, &operation);
    write_plugin_list(&path, target.plugins(), OffsetDateTime::UNIX_EPOCH)
        .unwrap_or_else(|err| panic!("write list: {err}"));

    let contents = fs::read_to_string(&path).unwrap_or_else(|err| panic!("read list: {err}"));
    assert_eq!(listed_packages(&contents), expected);
}

#[rstest]
fn written_list_reloads_into_equal_registry(installed: PluginSet) {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let path = dir.path().join("plugin_list.rs");
    write_plugin_list(&path, &installed, OffsetDateTime::UNIX_EPOCH)
        .unwrap_or_else(|err| panic!("write list: {err}"));

    let contents = fs::read_to_string(&path).unwrap_or_else(|err| panic!("read list: {err}"));
    let packages = listed_packages(&contents);
    let names: Vec<&str> = packages.iter().map(String::as_str).collect();
    let reloaded = PluginRegistry::from_generated(&names)
        .unwrap_or_else(|err| panic!("reload: {err}"));

    assert_eq!(reloaded.plugins(), &installed);
}
