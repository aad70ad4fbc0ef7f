//! # pagecast
//!
//! Export the latest assistant reply of a saved chat page into a Notion
//! database.
//!
//! ## Features
//!
//! - Parse chat pages into an arena DOM with CSS selector queries
//! - Convert headings, paragraphs, lists, quotes, code, images and rules
//!   into Notion blocks
//! - Validate untyped blocks against Notion's schema
//! - Upload with a plain-text fallback when structured upload fails
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagecast::export::Exporter;
//! use pagecast::notion::NotionClient;
//! use pagecast::settings::{JsonFileStore, Resolver};
//!
//! let extraction = pagecast::read_page("chat.html")?;
//!
//! let settings = Resolver::new(Some(".env".into()), JsonFileStore::in_config_dir());
//! let exporter = Exporter::new(settings, NotionClient::default_remote()?);
//!
//! let result = exporter.export(&extraction.to_request());
//! println!("{}", result.notice());
//! # Ok::<(), pagecast::Error>(())
//! ```
//!
//! ## Converting Fragments
//!
//! ```
//! use pagecast::block::BlockKind;
//! use pagecast::dom::parse_html;
//!
//! let dom = parse_html("<h1>Title</h1><p></p><ul><li>a</li><li>b</li></ul>");
//! let body = dom.find_by_tag("body").unwrap();
//! let extraction = pagecast::extract::extract(&dom, body);
//!
//! let kinds: Vec<_> = extraction.blocks.iter().map(|b| b.kind()).collect();
//! assert_eq!(
//!     kinds,
//!     [BlockKind::Heading1, BlockKind::BulletedListItem, BlockKind::BulletedListItem]
//! );
//! ```

pub mod block;
pub mod convert;
pub mod dom;
pub mod error;
pub mod export;
pub mod extract;
pub mod message;
pub mod notion;
pub mod settings;
pub(crate) mod util;

use std::path::Path;

pub use block::{Block, BlockKind, RichText};
pub use error::{Error, Result};
pub use export::Exporter;
pub use extract::Extraction;
pub use message::{ExportRequest, ExportResult, Notice, Request};
pub use settings::Settings;

/// Locate the assistant reply in page source and extract its blocks.
pub fn extract_page(html: &[u8]) -> Result<Extraction> {
    let dom = dom::parse_html_bytes(html);
    let container = extract::locate_message(&dom)?;
    Ok(extract::extract(&dom, container))
}

/// Read a saved chat page from disk and extract the assistant reply.
pub fn read_page(path: impl AsRef<Path>) -> Result<Extraction> {
    let bytes = std::fs::read(path)?;
    extract_page(&bytes)
}
