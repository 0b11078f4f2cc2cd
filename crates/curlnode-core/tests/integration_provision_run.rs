//! Integration: provision a fake curl binary from a local asset server and
//! drive work items through the full provision→execute→parse pipeline.
//!
//! The served "binary" is a shell script that prints a canned HTTP response,
//! so the whole chain (download, gunzip, chmod, shell invocation, parsing)
//! runs without touching the network beyond localhost.

mod common;

use curlnode_core::node::{CurlNode, RecordPayload, WorkItem};
use curlnode_core::provision::BinaryProvisioner;
use curlnode_core::response::CookieAttr;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use tempfile::tempdir;

const FAKE_CURL: &str = r#"#!/bin/sh
printf 'HTTP/1.1 200 OK\r\n'
printf 'Content-Type: text/plain\r\n'
printf 'Set-Cookie: a=1; Path=/; HttpOnly\r\n'
printf 'Set-Cookie: b=2\r\n'
printf '\r\n'
printf 'hello from fake curl\n'
case "$*" in
  *boom*) echo 'simulated failure' >&2; exit 6 ;;
esac
"#;

fn gzipped(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[cfg(unix)]
fn file_mode(path: &std::path::Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

fn work_items(cmdlines: &[&str]) -> Vec<WorkItem> {
    cmdlines
        .iter()
        .map(|cmdline| WorkItem {
            cmdline: cmdline.to_string(),
        })
        .collect()
}

#[tokio::test]
async fn provision_downloads_decompresses_and_marks_executable() {
    let server = common::asset_server::start(gzipped(FAKE_CURL.as_bytes()));
    let bin_dir = tempdir().unwrap();
    let provisioner = BinaryProvisioner::new(bin_dir.path().join("bin"), server.base_url.clone());

    let path = provisioner.ensure_binary("testarch").await.expect("provision");
    assert!(path.exists(), "binary should exist");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), FAKE_CURL);
    assert_eq!(server.hits(), 1);
    #[cfg(unix)]
    assert_eq!(file_mode(&path), 0o775);
}

#[tokio::test]
async fn provision_is_idempotent_and_reheals_permissions() {
    let server = common::asset_server::start(gzipped(FAKE_CURL.as_bytes()));
    let bin_dir = tempdir().unwrap();
    let provisioner = BinaryProvisioner::new(bin_dir.path().join("bin"), server.base_url.clone());

    let path = provisioner.ensure_binary("testarch").await.expect("first provision");
    assert_eq!(server.hits(), 1);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(file_mode(&path), 0o644);
    }

    let again = provisioner.ensure_binary("testarch").await.expect("second provision");
    assert_eq!(again, path);
    assert_eq!(server.hits(), 1, "cached binary must not be fetched again");
    #[cfg(unix)]
    assert_eq!(file_mode(&path), 0o775, "mode is forced back on every call");
}

#[tokio::test]
async fn missing_asset_fails_provisioning_and_leaves_no_file() {
    let server = common::asset_server::start_with_options(
        gzipped(FAKE_CURL.as_bytes()),
        common::asset_server::AssetServerOptions { not_found: true },
    );
    let bin_dir = tempdir().unwrap();
    let provisioner = BinaryProvisioner::new(bin_dir.path().join("bin"), server.base_url.clone());

    let err = provisioner
        .ensure_binary("testarch")
        .await
        .expect_err("404 must fail provisioning");
    assert!(format!("{err:#}").contains("HTTP 404"), "got: {err:#}");
    assert!(!provisioner.binary_path("testarch").exists());
}

#[tokio::test]
async fn corrupt_asset_stream_fails_provisioning() {
    let server = common::asset_server::start(b"this is not a gzip stream".to_vec());
    let bin_dir = tempdir().unwrap();
    let provisioner = BinaryProvisioner::new(bin_dir.path().join("bin"), server.base_url.clone());

    assert!(provisioner.ensure_binary("testarch").await.is_err());
    assert!(!provisioner.binary_path("testarch").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn node_runs_items_end_to_end_with_continue_on_fail() {
    let server = common::asset_server::start(gzipped(FAKE_CURL.as_bytes()));
    let bin_dir = tempdir().unwrap();
    let provisioner = BinaryProvisioner::new(bin_dir.path().join("bin"), server.base_url.clone());
    let node = CurlNode::with_arch(provisioner, "testarch");

    let items = work_items(&[
        "curl https://ok.example",
        "https://boom.example",
        "https://also-ok.example",
    ]);
    let records = node.run_items(&items, true).await.expect("batch completes");
    assert_eq!(records.len(), 3);
    assert_eq!(server.hits(), 1, "one fetch serves every item");

    match &records[0].payload {
        RecordPayload::Response(parsed) => {
            assert_eq!(parsed.status_code, Some(200));
            assert_eq!(parsed.status_message, "OK");
            assert_eq!(parsed.body, "hello from fake curl");
            let set_cookie = parsed.set_cookie.as_ref().expect("cookies parsed");
            assert_eq!(set_cookie.array, ["a=1", "b=2"]);
            assert_eq!(set_cookie.string, "a=1; b=2");
            assert_eq!(set_cookie.object["a"]["httponly"], CookieAttr::Flag(true));
        }
        RecordPayload::Failure { error } => panic!("item 0 should succeed, got: {error}"),
    }

    assert_eq!(records[1].item, 1);
    match &records[1].payload {
        RecordPayload::Failure { error } => {
            assert!(error.contains("status 6"), "got: {error}");
            assert!(error.contains("simulated failure"), "got: {error}");
        }
        RecordPayload::Response(_) => panic!("item 1 should fail"),
    }

    match &records[2].payload {
        RecordPayload::Response(parsed) => assert_eq!(parsed.status_code, Some(200)),
        RecordPayload::Failure { error } => panic!("item 2 should succeed, got: {error}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn first_failure_aborts_without_continue_on_fail() {
    let server = common::asset_server::start(gzipped(FAKE_CURL.as_bytes()));
    let bin_dir = tempdir().unwrap();
    let provisioner = BinaryProvisioner::new(bin_dir.path().join("bin"), server.base_url.clone());
    let node = CurlNode::with_arch(provisioner, "testarch");

    let items = work_items(&["https://ok.example", "https://boom.example", "https://never-runs"]);
    let err = node
        .run_items(&items, false)
        .await
        .expect_err("batch must abort");
    assert_eq!(err.item, 1);
    assert!(err.message.contains("status 6"));
}
