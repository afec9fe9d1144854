use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("chat-export")
        .join("tests")
        .join("fixtures")
        .join(name)
}

const HELLO_PAGE: &str = r#"<html><body><div role="log" aria-label="Chat messages">
<div data-message-id="q"><div aria-label="Your message"><div class="prose"><p>Hello world</p></div></div></div>
<div data-message-id="a"><div class="prose"><p>Hi there!</p></div><button>Copy</button></div>
</div></body></html>"#;

fn write_page(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("page.html");
    std::fs::write(&path, contents).expect("write page");
    path
}

/// A command isolated from the invoking user's config file.
fn chat_export(config_home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("chat-export");
    cmd.env("XDG_CONFIG_HOME", config_home).env_remove("RUST_LOG");
    cmd
}

#[test]
fn export_writes_derived_file_name_into_output_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    let page = write_page(dir.path(), HELLO_PAGE);
    let out_dir = dir.path().join("exports");

    chat_export(dir.path())
        .arg("export")
        .arg(&page)
        .arg("--output-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 messages"));

    let written = out_dir.join("hello-world-t3-chat-export.html");
    let html = std::fs::read_to_string(&written).expect("export written");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Hello world - T3 Chat Export</title>"));
    assert!(!html.contains("<button>Copy</button>"));
}

#[test]
fn export_fixture_conversation_to_explicit_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let target = dir.path().join("nested").join("chat.html");

    chat_export(dir.path())
        .arg("export")
        .arg(fixture_path("t3_conversation.html"))
        .arg("-o")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Exported 3 messages (2 yours, 1 assistant)",
        ));

    let html = std::fs::read_to_string(&target).expect("export written");
    assert!(html.contains("How do I reverse a string in Rust?"));
    assert!(html.contains("enhanced-code-block"));
}

#[test]
fn export_to_stdout() {
    let dir = tempfile::tempdir().expect("temp dir");
    let page = write_page(dir.path(), HELLO_PAGE);

    chat_export(dir.path())
        .arg("export")
        .arg(&page)
        .arg("--stdout")
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("<!DOCTYPE html>")
                .and(predicate::str::contains("2 messages")),
        );
}

#[test]
fn missing_container_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let page = write_page(dir.path(), "<html><body><p>Not a chat</p></body></html>");

    chat_export(dir.path())
        .arg("export")
        .arg(&page)
        .arg("--stdout")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("conversation container not found"));
}

#[test]
fn config_file_redirects_landmarks() {
    let dir = tempfile::tempdir().expect("temp dir");
    let page = write_page(
        dir.path(),
        r#"<html><body><section role="log" aria-label="Chat messages">
<div data-message-id="x"><div class="prose"><p>From a custom layout</p></div></div>
</section></body></html>"#,
    );
    let config = dir.path().join("custom.toml");
    std::fs::write(
        &config,
        "[landmarks.container]\ntag = \"section\"\n",
    )
    .expect("write config");

    chat_export(dir.path())
        .arg("inspect")
        .arg(&page)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("From a custom layout"));
}

#[test]
fn inspect_summary_and_unknown_view() {
    let dir = tempfile::tempdir().expect("temp dir");
    let page = write_page(dir.path(), HELLO_PAGE);

    chat_export(dir.path())
        .arg("inspect")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("user").and(predicate::str::contains("Hello world")));

    chat_export(dir.path())
        .arg("inspect")
        .arg(&page)
        .arg("--view")
        .arg("xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown view"));
}

#[test]
fn list_views() {
    let dir = tempfile::tempdir().expect("temp dir");
    chat_export(dir.path())
        .arg("--list-views")
        .assert()
        .success()
        .stdout(predicate::str::contains("records-json"));
}
