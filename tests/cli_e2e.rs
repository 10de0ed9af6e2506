//! End-to-end CLI tests for the segfetch binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

mod support;
use support::socket_guard::{socket_skip_return, start_mock_server_or_skip};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("segfetch").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Download files in concurrent byte-range sections",
        ))
        .stdout(predicate::str::contains("--workers"))
        .stdout(predicate::str::contains("--section-size"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("segfetch").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("segfetch"));
}

#[test]
fn test_binary_requires_a_url() {
    let mut cmd = Command::cargo_bin("segfetch").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_binary_rejects_missing_destination_directory() {
    // Validation fails before any request, so the unreachable URL is fine.
    let mut cmd = Command::cargo_bin("segfetch").unwrap();
    cmd.arg("-q")
        .arg("-d")
        .arg("/nonexistent/segfetch-test-dir")
        .arg("http://127.0.0.1:9/file.bin")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[tokio::test]
async fn test_binary_downloads_a_file() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    let body: Vec<u8> = (0..4_096_usize).map(|i| (i % 251) as u8).collect();
    Mock::given(method("HEAD"))
        .and(path("/data.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&mock_server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("segfetch").unwrap();
    cmd.arg("-q")
        .arg("-d")
        .arg(tempdir.path())
        .arg(format!("{}/data.bin", mock_server.uri()));

    cmd.assert().success();
    assert_eq!(
        std::fs::read(tempdir.path().join("data.bin")).unwrap(),
        body
    );
}

#[tokio::test]
async fn test_binary_downloads_with_ranged_sections() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    let body = b"hello range".to_vec();
    Mock::given(method("HEAD"))
        .and(path("/data.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Accept-Ranges", "bytes")
                .set_body_bytes(body.clone()),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.bin"))
        .and(header("Range", "bytes=0-4"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(body[0..=4].to_vec()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.bin"))
        .and(header("Range", "bytes=5-10"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(body[5..=10].to_vec()))
        .mount(&mock_server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("segfetch").unwrap();
    cmd.arg("-q")
        .arg("-d")
        .arg(tempdir.path())
        .arg("-w")
        .arg("2")
        .arg(format!("{}/data.bin", mock_server.uri()));

    cmd.assert().success();
    assert_eq!(std::fs::read(tempdir.path().join("data.bin")).unwrap(), body);
}

#[tokio::test]
async fn test_binary_stops_at_the_first_failing_url() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    Mock::given(method("HEAD"))
        .and(path("/first.bin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    // The second URL must never be touched once the first has failed.
    Mock::given(method("HEAD"))
        .and(path("/second.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"unreachable".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("segfetch").unwrap();
    cmd.arg("-q")
        .arg("-d")
        .arg(tempdir.path())
        .arg(format!("{}/first.bin", mock_server.uri()))
        .arg(format!("{}/second.bin", mock_server.uri()));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("HTTP 404"));
    assert!(tempdir.path().read_dir().unwrap().next().is_none());
}

#[tokio::test]
async fn test_binary_falls_back_to_positional_filenames() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };

    let body = b"rootward".to_vec();
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&mock_server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("segfetch").unwrap();
    cmd.arg("-q")
        .arg("-d")
        .arg(tempdir.path())
        .arg(format!("{}/", mock_server.uri()));

    cmd.assert().success();
    assert_eq!(std::fs::read(tempdir.path().join("1")).unwrap(), body);
}
