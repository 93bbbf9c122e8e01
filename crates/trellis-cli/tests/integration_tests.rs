//! End-to-end tests for the `trellis` binary.

use std::fs;
use std::path::Path;

use assert_cmd::{Command, cargo};
use predicates::prelude::*;
use tempfile::TempDir;

/// A `trellis` command isolated from the user's config and `.env`.
fn trellis(home: &Path) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("trellis");
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_flag() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rails"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("steps"));
}

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_flag_exits_one() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args(["new", "acme", "--no-such-flag"])
        .assert()
        .code(1);
}

#[test]
fn test_new_generates_application() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args(["new", "acme", "--database", "postgresql", "--skip-commands"])
        .assert()
        .success()
        .stdout(predicate::str::contains("steps applied"));

    let app = temp.path().join("acme");
    let gemfile = fs::read_to_string(app.join("Gemfile")).unwrap();
    assert!(gemfile.contains("gem \"pg\""));

    let database = fs::read_to_string(app.join("config/database.yml")).unwrap();
    assert!(database.contains("postgres:///acme_test"));

    let application = fs::read_to_string(app.join("config/application.rb")).unwrap();
    assert!(application.contains("module Acme"));

    assert!(app.join(".gitignore").is_file());
    assert!(app.join("log/.keep").is_file());
}

#[cfg(unix)]
#[test]
fn test_new_keeps_executable_scripts() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args(["new", "acme", "-d", "sqlite3", "--skip-commands"])
        .assert()
        .success();

    let mode = fs::metadata(temp.path().join("acme/bin/setup"))
        .unwrap()
        .permissions()
        .mode();
    assert_ne!(mode & 0o111, 0);
}

#[test]
fn test_new_twice_is_stable() {
    let temp = TempDir::new().unwrap();
    let args = ["new", "acme", "-d", "mysql", "--skip-commands"];
    trellis(temp.path()).args(args).assert().success();
    let boot = fs::read_to_string(temp.path().join("acme/config/boot.rb")).unwrap();

    trellis(temp.path()).args(args).assert().success();
    let again = fs::read_to_string(temp.path().join("acme/config/boot.rb")).unwrap();

    assert_eq!(boot, again);
}

#[test]
fn test_skip_flags_shape_the_tree() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args([
            "new",
            "acme",
            "--skip-active-record",
            "--skip-test-unit",
            "--skip-javascript",
            "--skip-action-cable",
            "--skip-commands",
        ])
        .assert()
        .success();

    let app = temp.path().join("acme");
    assert!(!app.join("config/database.yml").exists());
    assert!(!app.join("test").exists());
    assert!(!app.join("config/initializers/babel.rb").exists());
    assert!(!app.join("app/assets/javascripts/cable.js").exists());
}

#[test]
fn test_options_file_and_app_name_flag() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("options.toml"),
        "database = \"sqlite3\"\nskip_test_unit = true\n",
    )
    .unwrap();

    trellis(temp.path())
        .args([
            "new",
            "out",
            "--options",
            "options.toml",
            "--app-name",
            "my_shop",
            "--skip-commands",
        ])
        .assert()
        .success();

    let application = fs::read_to_string(temp.path().join("out/config/application.rb")).unwrap();
    assert!(application.contains("module MyShop"));
    assert!(!temp.path().join("out/test").exists());
}

#[test]
fn test_config_defaults_are_applied() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("trellis.toml"),
        "[defaults]\ndatabase = \"postgresql\"\n",
    )
    .unwrap();

    trellis(temp.path())
        .args(["--config", "trellis.toml", "new", "acme", "--skip-commands"])
        .assert()
        .success();

    let database = fs::read_to_string(temp.path().join("acme/config/database.yml")).unwrap();
    assert!(database.contains("adapter: postgresql"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args(["new", "acme", "-d", "sqlite3", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("install_dependencies"))
        .stdout(predicate::str::contains("steps would run"));

    assert!(!temp.path().join("acme").exists());
}

#[test]
fn test_steps_outline() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .arg("steps")
        .assert()
        .success()
        .stdout(predicate::str::contains("create_app_skeleton: copy-directory ."))
        .stdout(predicate::str::contains("unless skip_javascript"));
}

#[test]
fn test_steps_json_plan() {
    let temp = TempDir::new().unwrap();
    let output = trellis(temp.path())
        .args([
            "--output-format",
            "json",
            "steps",
            "-d",
            "sqlite3",
            "--skip-action-cable",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let steps = plan.as_array().unwrap();
    let skipped: Vec<&str> = steps
        .iter()
        .filter(|s| s["will_run"] == serde_json::Value::Bool(false))
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].starts_with("configure_action_cable:"));
}

#[test]
fn test_completions_bash() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trellis"));
}

#[test]
fn test_init_local_writes_config() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args(["init", "--local"])
        .assert()
        .success();

    let text = fs::read_to_string(temp.path().join(".trellis.toml")).unwrap();
    assert!(text.contains("[defaults]"));

    // A second run without --force leaves the file alone.
    fs::write(temp.path().join(".trellis.toml"), "# mine\n").unwrap();
    trellis(temp.path())
        .args(["init", "--local"])
        .assert()
        .success();
    let text = fs::read_to_string(temp.path().join(".trellis.toml")).unwrap();
    assert_eq!(text, "# mine\n");
}

#[test]
fn test_local_config_is_read_from_working_directory() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args(["init", "--local"])
        .assert()
        .success();

    let local = temp.path().join(".trellis.toml");
    let text = fs::read_to_string(&local).unwrap();
    fs::write(
        &local,
        text.replace("[defaults]\n", "[defaults]\ndatabase = \"postgresql\"\n"),
    )
    .unwrap();

    trellis(temp.path())
        .args(["config", "get", "defaults.database"])
        .assert()
        .success()
        .stdout(predicate::str::contains("defaults.database = postgresql"));

    trellis(temp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".trellis.toml"));

    trellis(temp.path())
        .args(["new", "acme", "--skip-commands"])
        .assert()
        .success();

    let database = fs::read_to_string(temp.path().join("acme/config/database.yml")).unwrap();
    assert!(database.contains("adapter: postgresql"));
}

#[test]
fn test_config_get() {
    let temp = TempDir::new().unwrap();
    trellis(temp.path())
        .args(["config", "get", "output.staged"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output.staged = false"));
}
