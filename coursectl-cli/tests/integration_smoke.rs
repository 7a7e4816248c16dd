//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn coursectl() -> Command {
    let mut cmd = Command::cargo_bin("coursectl").unwrap();
    // Keep the developer's own environment out of the tests.
    cmd.env_remove("DATABASE_URL")
        .env_remove("COURSECTL_BIND")
        .env_remove("RUST_LOG");
    cmd
}

// === Top level ===

#[test]
fn test_help_lists_commands() {
    coursectl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version() {
    coursectl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("coursectl"));
}

// === Serve Command Tests ===

#[test]
fn test_serve_help() {
    coursectl()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--in-memory"))
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_serve_rejects_bad_bind() {
    coursectl()
        .args(["serve", "--in-memory", "--bind", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_serve_without_database_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    coursectl()
        .current_dir(dir.path())
        .env("COURSECTL_CONFIG", dir.path().join("missing.toml"))
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

// === Migrate Command Tests ===

#[test]
fn test_migrate_help() {
    coursectl()
        .arg("migrate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database URL"));
}

// === Config Command Tests ===

#[test]
fn test_config_path_honours_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");

    coursectl()
        .env("COURSECTL_CONFIG", &path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    coursectl()
        .env("COURSECTL_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(path.exists());

    coursectl()
        .env("COURSECTL_CONFIG", &path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    std::fs::write(
        &path,
        "[database]\nurl = \"postgres://localhost/records\"\n",
    )
    .unwrap();

    coursectl()
        .env("COURSECTL_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres://localhost/records"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\n").unwrap();

    coursectl()
        .env("COURSECTL_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid TOML"));
}
