//! End-to-end tests for the strata binary
//!
//! Every test points XDG_CONFIG_HOME into its own temp directory so the real
//! global configuration is never touched.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper functions
// ============================================================================

struct Sandbox {
    temp: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("work")).unwrap();
        Self { temp }
    }

    fn xdg(&self) -> PathBuf {
        self.temp.path().join("xdg")
    }

    fn work(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    fn strata(&self, dir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("strata").unwrap();
        cmd.current_dir(dir)
            .env("XDG_CONFIG_HOME", self.xdg())
            .env("NO_COLOR", "1")
            .env_remove("STRATA_LOG");
        cmd
    }

    /// `strata init demo` without git; returns the project root
    fn init(&self, datasources: &[&str]) -> PathBuf {
        let mut cmd = self.strata(&self.work());
        cmd.args(["init", "demo", "--no-git"]);
        for ds in datasources {
            cmd.args(["-d", ds]);
        }
        cmd.assert().success();
        self.work().join("demo")
    }
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read file")
}

// ============================================================================
// Project guard
// ============================================================================

#[test]
fn test_version_runs_outside_project() {
    let sandbox = Sandbox::new();

    sandbox
        .strata(&sandbox.work())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_adapters_runs_outside_project() {
    let sandbox = Sandbox::new();

    sandbox
        .strata(&sandbox.work())
        .arg("adapters")
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres"))
        .stdout(predicate::str::contains("snowflake"));
}

#[test]
fn test_guarded_command_outside_project_exits_1() {
    let sandbox = Sandbox::new();

    sandbox
        .strata(&sandbox.work())
        .args(["ds", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("This is not a valid strata project"));

    assert!(!sandbox.xdg().exists());
    assert_eq!(fs::read_dir(sandbox.work()).unwrap().count(), 0);
}

#[test]
fn test_ds_add_outside_project_writes_nothing() {
    let sandbox = Sandbox::new();

    sandbox
        .strata(&sandbox.work())
        .args(["ds", "add", "postgres"])
        .assert()
        .code(1);

    assert!(!sandbox.work().join("datasources.yml").exists());
}

// ============================================================================
// Global configuration
// ============================================================================

#[test]
fn test_first_run_creates_global_file() {
    let sandbox = Sandbox::new();

    sandbox.strata(&sandbox.work()).arg("version").assert().success();

    let global: serde_yaml::Value =
        serde_yaml::from_str(&read_file(&sandbox.xdg().join(".strata"))).unwrap();
    assert_eq!(global["server"].as_str(), Some("http://localhost:3030"));
    assert_eq!(global["api_key"].as_str(), Some(""));
}

#[test]
fn test_store_loading_is_logged_with_strata_log() {
    let sandbox = Sandbox::new();

    sandbox
        .strata(&sandbox.work())
        .arg("version")
        .env("STRATA_LOG", "debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("no configuration found, writing defaults"))
        .stderr(predicate::str::contains("loaded global config"));
}

#[test]
fn test_configured_log_level_applies_after_load() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["postgres"]);
    let local = read_file(&root.join(".strata"));
    fs::write(root.join(".strata"), format!("{local}log_level: debug\n")).unwrap();

    sandbox
        .strata(&root)
        .args(["ds", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("configuration loaded"));

    sandbox
        .strata(&root)
        .args(["ds", "list"])
        .env("STRATA_LOG", "warn")
        .assert()
        .success()
        .stderr(predicate::str::contains("configuration loaded").not());
}

// ============================================================================
// strata init
// ============================================================================

#[test]
fn test_init_creates_project() {
    let sandbox = Sandbox::new();

    sandbox
        .strata(&sandbox.work())
        .args(["init", "Sales Analytics", "--no-git", "-d", "postgres"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created Strata project 'Sales Analytics'"));

    let root = sandbox.work().join("sales-analytics");
    assert!(root.join("schema").is_dir());
    assert!(root.join("tests").is_dir());
    assert!(read_file(&root.join("project.yml")).contains("uid: sales-analytics"));
    assert!(read_file(&root.join(".strata")).contains("api_key: YOUR_STRATA_API_KEY"));
    assert!(read_file(&root.join(".gitignore")).contains(".strata"));
    let manifest = read_file(&root.join("datasources.yml"));
    assert!(manifest.contains("postgres:\n  adapter: postgres\n  name: MYDATASOURCENAME\n"));
}

#[test]
fn test_init_with_unknown_adapter_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .strata(&sandbox.work())
        .args(["init", "demo", "--no-git", "-d", "oracle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'oracle' is not a supported adapter"));

    assert!(!sandbox.work().join("demo").exists());
}

#[test]
fn test_init_into_existing_directory_keeps_files() {
    let sandbox = Sandbox::new();
    let root = sandbox.work().join("demo");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("datasources.yml"), "mine:\n  adapter: mysql\n  name: Mine\n").unwrap();

    sandbox
        .strata(&sandbox.work())
        .args(["init", "demo", "--no-git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to overwrite datasources.yml"));

    assert_eq!(
        read_file(&root.join("datasources.yml")),
        "mine:\n  adapter: mysql\n  name: Mine\n"
    );
    assert!(!root.join(".strata").exists());
}

// ============================================================================
// strata ds
// ============================================================================

#[test]
fn test_ds_add_twice() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["duckdb"]);

    for expected in ["'postgres'", "'postgres_1'"] {
        sandbox
            .strata(&root)
            .args(["ds", "add", "postgres"])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected));
    }

    sandbox
        .strata(&root)
        .args(["ds", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("duckdb => MYDATASOURCENAME"))
        .stdout(predicate::str::contains("postgres => MYDATASOURCENAME"))
        .stdout(predicate::str::contains("postgres_1 => MYDATASOURCENAME"));
}

#[test]
fn test_ds_add_unsupported_adapter() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["postgres"]);
    let before = read_file(&root.join("datasources.yml"));

    sandbox
        .strata(&root)
        .args(["ds", "add", "oracle"])
        .assert()
        .success()
        .stderr(predicate::str::contains("'oracle' is not a supported adapter"))
        .stderr(predicate::str::contains("Supported adapters:"));

    assert_eq!(read_file(&root.join("datasources.yml")), before);
}

#[test]
fn test_ds_list_json() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["mysql"]);

    let output = sandbox
        .strata(&root)
        .args(["ds", "list", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["key"], "mysql");
}

#[test]
fn test_ds_auth_with_piped_answers() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["postgres"]);

    sandbox
        .strata(&root)
        .args(["ds", "auth", "postgres"])
        .write_stdin("alice\nsecret\n")
        .assert()
        .success();

    let local = read_file(&root.join(".strata"));
    assert!(local.starts_with("api_key: YOUR_STRATA_API_KEY\n"));
    assert!(local.ends_with("postgres:\n  username: alice\n  password: secret\n"));
}

#[test]
fn test_ds_add_with_setting_name_as_key() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["duckdb"]);

    sandbox
        .strata(&root)
        .args(["ds", "add", "postgres", "--key", "server"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'server_1'"));

    sandbox
        .strata(&root)
        .args(["ds", "auth", "server_1"])
        .write_stdin("alice\n8080\n")
        .assert()
        .success();

    let local: serde_yaml::Value = serde_yaml::from_str(&read_file(&root.join(".strata"))).unwrap();
    assert_eq!(local["server"].as_str(), Some("http://localhost:3030"));
    assert_eq!(local["server_1"]["password"].as_str(), Some("8080"));
}

#[test]
fn test_ds_auth_unknown_datasource() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["postgres"]);
    let before = read_file(&root.join(".strata"));

    sandbox
        .strata(&root)
        .args(["ds", "auth", "nope"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Datasource 'nope' not found"));

    assert_eq!(read_file(&root.join(".strata")), before);
}

#[test]
fn test_ds_test_without_driver_is_reported() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["postgres"]);

    sandbox
        .strata(&root)
        .args(["ds", "test", "postgres"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No driver available for adapter 'postgres'"));
}

#[test]
fn test_type_conversion_error_exits_1() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["postgres"]);
    fs::write(root.join(".strata"), "row_limit: lots\n").unwrap();

    sandbox
        .strata(&root)
        .args(["ds", "exec", "postgres", "--query", "select 1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid integer value for 'row_limit'"));
}

#[test]
fn test_broken_local_config_exits_1() {
    let sandbox = Sandbox::new();
    let root = sandbox.init(&["postgres"]);
    fs::write(root.join(".strata"), "server: [unclosed\n").unwrap();

    sandbox
        .strata(&root)
        .args(["ds", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid YAML"));
}
