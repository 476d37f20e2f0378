//! Integration tests for `modalias config --json` and `modalias url`.

use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "modalias-cli", "--bin", "modalias", "--"]);
    cmd
}

#[test]
fn test_config_json_lists_aliases_in_order() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("modalias.config.json"),
        r#"{
            "base": "/hdx-signals-inform/",
            "plugins": ["svelte"],
            "resolve": { "alias": { "pages": "./src/pages", "@": "./src" } }
        }"#,
    )
    .unwrap();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(dir.path())
        .arg("config")
        .output()
        .expect("Failed to run config command");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim())
            .expect("stdout should be valid JSON");

    assert_eq!(json["ok"], true);
    assert_eq!(json["base"], "/hdx-signals-inform/");
    assert_eq!(json["plugins"], serde_json::json!(["svelte"]));
    assert_eq!(json["pipeline"], serde_json::json!(["alias", "svelte"]));

    let aliases = json["aliases"].as_array().unwrap();
    let prefixes: Vec<&str> = aliases
        .iter()
        .map(|a| a["prefix"].as_str().unwrap())
        .collect();
    assert_eq!(prefixes, vec!["pages", "@"]);
}

#[test]
fn test_config_without_file_uses_defaults() {
    let dir = tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(dir.path())
        .arg("config")
        .output()
        .expect("Failed to run config command");

    let json: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(json["ok"], true);
    assert!(json["config_file"].is_null());
    assert_eq!(json["base"], "/");
    assert_eq!(json["aliases"], serde_json::json!([]));
}

#[test]
fn test_duplicate_cli_alias_is_rejected() {
    let dir = tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "--alias", "@=./a,@=./b", "--cwd"])
        .arg(dir.path())
        .arg("config")
        .output()
        .expect("Failed to run config command");

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    assert_eq!(json["error"]["code"], "DUPLICATE_PREFIX");
}

#[test]
fn test_url_under_base() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("vite.config.js"),
        "export default { base: '/hdx-signals-inform/' }",
    )
    .unwrap();

    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["url", "assets/index.js"])
        .output()
        .expect("Failed to run url command");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "/hdx-signals-inform/assets/index.js"
    );
}

#[test]
fn test_version_without_project() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("vite.config.js"), "export default 42").unwrap();

    for args in [&["version"][..], &[][..]] {
        let output = cargo_bin()
            .arg("--cwd")
            .arg(dir.path())
            .args(args)
            .output()
            .expect("Failed to run version command");

        assert!(output.status.success(), "{args:?}");
        assert!(String::from_utf8_lossy(&output.stdout).starts_with("modalias "));
    }
}
