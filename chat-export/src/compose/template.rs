//! Static document shell: head, embedded CSS/JS and the highlighting resources
//!
//! The only external references in an exported document are the Prism files listed
//! here. They are referenced by absolute URL and never fetched by this crate.

use crate::dom::{append, create_element, create_text, outer_html};
use crate::error::ExportError;

pub const PRISM_BASE_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0";

/// Language components, in load order (`clike` first, others extend it).
pub const PRISM_LANGUAGES: &[&str] = &[
    "clike",
    "markup",
    "python",
    "javascript",
    "typescript",
    "java",
    "cpp",
    "c",
    "csharp",
    "go",
    "rust",
    "php",
    "ruby",
    "swift",
    "kotlin",
    "css",
    "scss",
    "less",
    "json",
    "yaml",
    "markdown",
    "bash",
    "shell",
    "sql",
    "r",
    "perl",
    "dart",
    "scala",
    "matlab",
    "xml",
];

const DOCUMENT_CSS: &str = include_str!("../../css/export.css");
const DOCUMENT_JS: &str = include_str!("../../js/export.js");

pub fn prism_theme_url() -> String {
    format!("{}/themes/prism-tomorrow.min.css", PRISM_BASE_URL)
}

pub fn prism_core_url() -> String {
    format!("{}/prism.min.js", PRISM_BASE_URL)
}

pub fn prism_language_url(language: &str) -> String {
    format!("{}/components/prism-{}.min.js", PRISM_BASE_URL, language)
}

/// Every external URL an exported document may reference.
pub fn external_resources() -> Vec<String> {
    let mut urls = vec![prism_theme_url(), prism_core_url()];
    urls.extend(PRISM_LANGUAGES.iter().map(|lang| prism_language_url(lang)));
    urls
}

/// Wrap a serialized body in the complete document with embedded CSS and script.
pub fn wrap_in_document(title: &str, body_html: &str) -> Result<String, ExportError> {
    let title_element = create_element("title", vec![]);
    append(
        &title_element,
        create_text(&format!("{} - T3 Chat Export", title)),
    );
    let title_html = outer_html(&[title_element])?;

    let language_scripts = PRISM_LANGUAGES
        .iter()
        .map(|lang| format!(r#"<script src="{}"></script>"#, prism_language_url(lang)))
        .collect::<Vec<_>>()
        .join("\n");

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en" class="dark">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta name="generator" content="chat-export">
  {}
  <link rel="stylesheet" href="{}">
  <style>
{}
  </style>
</head>
<body>
{}
<script>
{}
</script>
<script src="{}"></script>
{}
</body>
</html>
"#,
        title_html,
        prism_theme_url(),
        DOCUMENT_CSS,
        body_html,
        DOCUMENT_JS,
        prism_core_url(),
        language_scripts
    );

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_escaped() {
        let html = wrap_in_document("<script>alert(1)</script> & co", "").unwrap();
        assert!(html.contains(
            "<title>&lt;script&gt;alert(1)&lt;/script&gt; &amp; co - T3 Chat Export</title>"
        ));
    }

    #[test]
    fn test_resources_are_absolute_and_pinned() {
        let urls = external_resources();
        assert_eq!(urls.len(), 2 + PRISM_LANGUAGES.len());
        assert!(urls
            .iter()
            .all(|u| u.starts_with("https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0/")));
        assert_eq!(
            prism_language_url("rust"),
            "https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0/components/prism-rust.min.js"
        );
    }

    #[test]
    fn test_clike_loads_first() {
        let html = wrap_in_document("t", "").unwrap();
        let core = html.find(&prism_core_url()).unwrap();
        let clike = html.find(&prism_language_url("clike")).unwrap();
        let rust = html.find(&prism_language_url("rust")).unwrap();
        assert!(core < clike && clike < rust);
    }

    #[test]
    fn test_copy_script_ignores_clicks_during_flash() {
        let html = wrap_in_document("t", "").unwrap();
        let guard = html
            .find("button.classList.contains('copy-success') || button.classList.contains('copy-failed')")
            .expect("re-click guard in embedded script");
        let write = html.find("navigator.clipboard.writeText").unwrap();
        assert!(guard < write);
    }
}
