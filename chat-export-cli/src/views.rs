//! Inspection views
//!
//! Read-only renderings of what the extractor sees on a page, for checking landmarks
//! against a new page layout before exporting.

use anyhow::{bail, Context, Result};
use chat_export::dom::parse_page;
use chat_export::{derive_filename, derive_title, extract_messages, ConversationStats, Landmarks};
use serde_json::json;

/// All available views
pub const AVAILABLE_VIEWS: &[&str] = &["summary", "records-json", "stats-json"];

/// Maximum characters of message text shown per line in the summary view.
const SUMMARY_PREVIEW_CHARS: usize = 60;

/// Render the named view of `page`.
pub fn render_view(page: &str, landmarks: &Landmarks, view: &str) -> Result<String> {
    let dom = parse_page(page);
    let extraction = extract_messages(&dom, landmarks)?;

    match view {
        "summary" => {
            let mut out = String::new();
            for message in &extraction.messages {
                let preview: String = message
                    .raw_text
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .chars()
                    .take(SUMMARY_PREVIEW_CHARS)
                    .collect();
                out.push_str(&format!(
                    "#{:<3} {:<9} {:<24} {}\n",
                    message.index,
                    message.sender.as_str(),
                    message.id,
                    preview
                ));
            }
            for problem in &extraction.malformed {
                out.push_str(&format!("warning: message #{} {:?}\n", problem.index, problem.kind));
            }
            Ok(out)
        }
        "records-json" => serde_json::to_string_pretty(&extraction)
            .context("JSON serialization failed"),
        "stats-json" => {
            let title = derive_title(&extraction.messages);
            let stats = ConversationStats::from_messages(&extraction.messages);
            serde_json::to_string_pretty(&json!({
                "title": title,
                "filename": derive_filename(&title),
                "stats": stats,
                "malformed": extraction.malformed.len(),
            }))
            .context("JSON serialization failed")
        }
        _ => bail!(
            "Unknown view: {} (available: {})",
            view,
            AVAILABLE_VIEWS.join(", ")
        ),
    }
}
