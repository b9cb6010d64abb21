#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stand-in for `python`: answers `setup.py` queries and records what it saw.
const FAKE_PYTHON: &str = r#"#!/bin/sh
touch "$(dirname "$0")/ran"
shift
case "$1" in
  --name) echo demo ;;
  --version) echo 1.0 ;;
  install)
    echo "running install"
    echo "Searching for foo>=1.0"
    echo "Searching for click==4.0"
    ;;
  sdist|register)
    cp "$HOME/.pypirc" "$(dirname "$0")/seen_pypirc" 2>/dev/null
    echo "Server response (200): OK"
    ;;
  *) echo "unknown command $1" >&2; exit 2 ;;
esac
"#;

struct Sandbox {
    home: TempDir,
    bin: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let bin = tempfile::tempdir().unwrap();
        let python = bin.path().join("python");
        fs::write(&python, FAKE_PYTHON).unwrap();
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
        Self {
            home: tempfile::tempdir().unwrap(),
            bin,
        }
    }

    fn pypirc(&self) -> PathBuf {
        self.home.path().join(".pypirc")
    }

    fn python_ran(&self) -> bool {
        self.bin.path().join("ran").exists()
    }

    fn seen_pypirc(&self) -> Option<String> {
        fs::read_to_string(self.bin.path().join("seen_pypirc")).ok()
    }

    fn cmd(&self, index_url: &str) -> Command {
        let mut cmd = Command::cargo_bin("depypi").unwrap();
        cmd.env("HOME", self.home.path())
            .env("DEPYPI_PYTHON", self.bin.path().join("python"))
            .env("DEPYPI_LIVE_INDEX_URL", index_url)
            .env("DEPYPI_TEST_INDEX_URL", index_url)
            .env("DEPYPI_PROBE_TIMEOUT_SECS", "2")
            .env_remove("PYPIUSER")
            .env_remove("PYPIPWD")
            .env_remove("RUST_LOG")
            .current_dir(self.home.path());
        cmd
    }

    fn project(&self) -> &Path {
        self.home.path()
    }
}

async fn index_answering(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

#[test]
fn upload_without_target_fails_before_running_anything() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("http://127.0.0.1:1")
        .args(["upload", "-c", "alice", "pw"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Target not specified"));

    assert!(!sandbox.python_ran());
    assert!(!sandbox.pypirc().exists());
}

#[test]
fn single_credential_value_is_rejected_without_touching_files() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.pypirc(), "original").unwrap();

    sandbox
        .cmd("http://127.0.0.1:1")
        .args(["upload", "--test", "--credentials", "alice"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("wrong format"));

    assert!(!sandbox.python_ran());
    assert_eq!(fs::read_to_string(sandbox.pypirc()).unwrap(), "original");
    assert!(!sandbox.home.path().join(".pypirc.crt.backup").exists());
}

#[test]
fn upload_without_any_credentials_lists_all_options() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("http://127.0.0.1:1")
        .args(["upload", "--test"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unable to find credentials"))
        .stdout(
            predicate::str::contains(".pypirc")
                .and(predicate::str::contains("PYPIUSER"))
                .and(predicate::str::contains("-c USER PASSWORD")),
        );

    assert!(sandbox.seen_pypirc().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_with_env_credentials_injects_and_removes_pypirc() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/packages/source/d/demo/demo-1.0.tar.gz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let sandbox = Sandbox::new();

    sandbox
        .cmd(&server.uri())
        .args(["upload", "--force", "--path"])
        .arg(sandbox.project())
        .env("PYPIUSER", "envuser")
        .env("PYPIPWD", "envpw")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "package demo of version 1.0 is available on pypi",
        ));

    let seen = sandbox.seen_pypirc().unwrap();
    assert!(seen.contains("[pypi]"));
    assert!(seen.contains("username=envuser"));
    assert!(!sandbox.pypirc().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn register_with_explicit_credentials_restores_existing_pypirc() {
    let server = index_answering(404).await;
    let sandbox = Sandbox::new();
    fs::write(sandbox.pypirc(), "original").unwrap();

    sandbox
        .cmd(&server.uri())
        .args(["register", "--test", "-c", "alice", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verification has failed"));

    let seen = sandbox.seen_pypirc().unwrap();
    assert!(seen.contains("[pypitest]"));
    assert!(seen.contains("password=s3cret"));
    assert_eq!(fs::read_to_string(sandbox.pypirc()).unwrap(), "original");
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_accepts_password_with_leading_dash() {
    let server = index_answering(200).await;
    let sandbox = Sandbox::new();

    sandbox
        .cmd(&server.uri())
        .args(["upload", "--test", "-c", "alice", "-s3cret"])
        .assert()
        .success();

    let seen = sandbox.seen_pypirc().unwrap();
    assert!(seen.contains("username=alice"));
    assert!(seen.contains("password=-s3cret"));
    assert!(!sandbox.pypirc().exists());
}

#[test]
fn force_and_test_together_target_live() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("http://127.0.0.1:1")
        .args(["register", "--force", "--test", "-c", "alice", "pw"])
        .assert()
        .success();

    assert!(sandbox.seen_pypirc().unwrap().contains("[pypi]"));
    assert!(!sandbox.pypirc().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn verbose_upload_shows_server_response() {
    let server = index_answering(200).await;
    let sandbox = Sandbox::new();
    fs::write(sandbox.pypirc(), "original").unwrap();

    sandbox
        .cmd(&server.uri())
        .args(["-v", "upload", "--test", "-c", "alice", "pw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Server response (200): OK"))
        .stdout(predicate::str::contains(".pypirc.crt.backup"));

    assert_eq!(fs::read_to_string(sandbox.pypirc()).unwrap(), "original");
}

#[test]
fn invalid_index_url_is_a_fatal_error() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("ftp://example.invalid")
        .args(["isOnPypi"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must use http or https"));

    assert!(!sandbox.python_ran());
}

#[tokio::test(flavor = "multi_thread")]
async fn is_on_pypi_reports_available() {
    let server = index_answering(200).await;
    let sandbox = Sandbox::new();

    sandbox
        .cmd(&server.uri())
        .arg("isOnPypi")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "package demo of version 1.0 is available on pypi",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn is_on_pypi_reports_not_available() {
    let server = index_answering(404).await;
    let sandbox = Sandbox::new();

    sandbox
        .cmd(&server.uri())
        .args(["isOnPypi", "--test"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "package demo of version 1.0 is not on testpypi",
        ));
}

#[test]
fn is_on_pypi_unreachable_index_is_indeterminate() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("http://127.0.0.1:1")
        .arg("isOnPypi")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("could not determine"))
        .stderr(predicate::str::contains("Could not reach"));
}

#[test]
fn has_unlocked_deps_lists_declarations() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("http://127.0.0.1:1")
        .args(["hasUnlockedDeps", "--path"])
        .arg(sandbox.project())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("foo>=1.0 (unlocked)")
                .and(predicate::str::contains("click==4.0 (locked)"))
                .and(predicate::str::contains("1 of 2 declared dependencies are unlocked")),
        );
}

#[test]
fn has_unlocked_deps_fails_when_interpreter_is_missing() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd("http://127.0.0.1:1")
        .arg("hasUnlockedDeps")
        .env("DEPYPI_PYTHON", "/nonexistent/python")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("interpreter not found"));
}
