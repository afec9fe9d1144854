//! Chat conversation export
//!
//!     This crate turns a rendered chat page into a single, self-contained HTML document:
//!     the conversation's messages with their formatting and code blocks, copy buttons, and
//!     syntax highlighting that works when the file is opened straight from disk.
//!
//! Architecture
//!
//!     Two stages, pure and synchronous:
//!
//!     - Extractor ([`extract`]): page tree → ordered, sanitized [`MessageRecord`]s.
//!     - Composer ([`compose`]): records + title → complete document string.
//!
//!     [`generate_export`] chains both and derives the file name. The crate never touches
//!     the file system or the network; saving the result is the caller's business.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # ExportError
//!     ├── dom.rs                  # rcdom helpers: parse, build, copy, serialize
//!     ├── landmarks.rs            # page conventions as declarative matchers
//!     ├── record.rs               # MessageRecord, ConversationExport, stats
//!     ├── extract.rs              # Extractor
//!     ├── compose
//!     │   ├── code_blocks.rs      # code region ids and wrappers
//!     │   ├── icons.rs            # inline SVG copy buttons
//!     │   ├── template.rs         # document shell, Prism resources
//!     │   └── mod.rs              # Composer, title and file name derivation
//!     ├── lib.rs
//!
//! Testing
//!     tests
//!     ├── export.rs               # end-to-end over fixture pages
//!     ├── properties.rs           # proptest laws (ordering, titles, file names)
//!     └── fixtures
//!         └── <page>.html
//!
//!     Unit tests live next to the code they cover.

pub mod compose;
pub mod dom;
pub mod error;
pub mod extract;
pub mod landmarks;
pub mod record;

pub use compose::{compose_document, derive_filename, derive_title, DEFAULT_TITLE};
pub use error::ExportError;
pub use extract::{extract_messages, Extraction, MalformedKind, MalformedMessage};
pub use landmarks::{Landmark, Landmarks};
pub use record::{ConversationExport, ConversationStats, MessageRecord, Sender};

use chrono::{DateTime, FixedOffset};

/// Output of one export run, ready to be written under `filename`.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub title: String,
    pub html: String,
    pub stats: ConversationStats,
    pub malformed: Vec<MalformedMessage>,
}

/// Run the whole pipeline over the HTML of a rendered chat page.
///
/// `generated_at` is the export timestamp shown in the document; pass the current local
/// time for a real export, a fixed value for reproducible output.
pub fn generate_export(
    page_html: &str,
    landmarks: &Landmarks,
    generated_at: DateTime<FixedOffset>,
) -> Result<ExportArtifact, ExportError> {
    let _span = tracing::info_span!("generate_export").entered();

    let dom = dom::parse_page(page_html);
    let extraction = extract_messages(&dom, landmarks)?;
    let export = ConversationExport::new(extraction.messages, generated_at);
    let html = compose_document(&export)?;
    let filename = derive_filename(&export.title);

    tracing::info!(
        title = %export.title,
        filename = %filename,
        total = export.stats.total,
        user = export.stats.user,
        assistant = export.stats.assistant,
        "export generated"
    );

    Ok(ExportArtifact {
        filename,
        title: export.title,
        html,
        stats: export.stats,
        malformed: extraction.malformed,
    })
}
