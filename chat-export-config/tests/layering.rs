use chat_export::{Landmark, Landmarks};
use chat_export_config::Loader;
use std::io::Write;
use std::path::PathBuf;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn user_file_overrides_selected_landmarks() {
    let file = write_config(
        r#"
[output]
directory = "/tmp/exports"

[landmarks.container]
tag = "section"
attributes = { id = "thread" }
"#,
    );

    let config = Loader::new().with_file(file.path()).build().expect("config");

    assert_eq!(config.output.directory, PathBuf::from("/tmp/exports"));
    assert_eq!(config.landmarks.container.tag.as_deref(), Some("section"));
    assert_eq!(
        config.landmarks.container.attributes.get("id").map(String::as_str),
        Some("thread")
    );
    // Tables merge key by key, so default attributes stay required.
    assert_eq!(
        config.landmarks.container.attributes.get("role").map(String::as_str),
        Some("log")
    );
    // Untouched landmarks keep their defaults.
    assert_eq!(config.landmarks.message, Landmarks::default().message);
    assert_eq!(config.landmarks.rich_content, Landmark::class("prose"));
}

#[test]
fn missing_optional_file_is_ignored() {
    let config = Loader::new()
        .with_optional_file("/definitely/not/here/config.toml")
        .build()
        .expect("config");
    assert_eq!(config.landmarks, Landmarks::default());
}

#[test]
fn missing_required_file_is_an_error() {
    let result = Loader::new()
        .with_file("/definitely/not/here/config.toml")
        .build();
    assert!(result.is_err());
}
