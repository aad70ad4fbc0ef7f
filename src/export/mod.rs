//! Export of extracted content to Notion.
//!
//! An [`Exporter`] pairs a settings source with a [`NotionApi`]. Each
//! export runs as a small state machine:
//!
//! - `Structured`: upload the validated blocks under the full title
//! - `PlainTextFallback`: upload the content as chunked paragraphs
//! - `Terminal`: the result
//!
//! Any structured failure moves to the fallback. Nothing escapes as an
//! `Err`; every outcome is an [`ExportResult`].
//!
//! # Example
//!
//! ```
//! use pagecast::export::Exporter;
//! use pagecast::message::ExportRequest;
//! use pagecast::notion::MockNotionApi;
//! use pagecast::settings::Settings;
//!
//! let mock = MockNotionApi::new();
//! let exporter = Exporter::new(Settings::new("secret", "db"), &mock);
//!
//! let result = exporter.export(&ExportRequest {
//!     content: "Hello".into(),
//!     ..Default::default()
//! });
//! assert!(result.success && result.was_plain_text());
//! assert_eq!(mock.call_count(), 1);
//! ```

mod plain;

pub use plain::plain_text_blocks;

use crate::block::{Block, filter_valid};
use crate::message::{ExportRequest, ExportResult, Request};
use crate::notion::NotionApi;
use crate::settings::{Settings, SettingsProvider};
use crate::util::summarize;

pub const MISSING_CREDENTIALS: &str = "Notion API key and Database ID are required";
pub const PLAIN_TEXT_MESSAGE: &str = "Content was exported as plain text due to formatting issues";
pub const EXTRACT_UNSUPPORTED: &str =
    "extractAndExport needs the page; run the extractor and send exportToNotion";

/// Characters of content used as the fallback page title.
pub const TITLE_LENGTH: usize = 50;

enum Stage {
    Structured,
    PlainTextFallback,
    Terminal(ExportResult),
}

/// Uploads export requests to Notion.
pub struct Exporter<P, A> {
    settings: P,
    api: A,
}

impl<P: SettingsProvider, A: NotionApi> Exporter<P, A> {
    pub fn new(settings: P, api: A) -> Self {
        Self { settings, api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Answer one inter-layer message.
    pub fn handle(&self, request: &Request) -> ExportResult {
        match request {
            Request::ExportToNotion(export) => self.export(export),
            Request::ExtractAndExport => ExportResult::failure(EXTRACT_UNSUPPORTED),
        }
    }

    /// Export `request`, falling back to plain text when the structured
    /// upload fails or has no valid blocks.
    pub fn export(&self, request: &ExportRequest) -> ExportResult {
        tracing::debug!(
            blocks = request.blocks.len(),
            chars = request.content.chars().count(),
            "received export request"
        );

        let settings = match self.settings.settings() {
            Ok(settings) if settings.is_complete() => settings,
            Ok(_) => return self.fail(MISSING_CREDENTIALS),
            Err(e) => return self.fail(&e.to_string()),
        };

        let mut stage = Stage::Structured;
        loop {
            stage = match stage {
                Stage::Structured => self.structured(&settings, request),
                Stage::PlainTextFallback => self.plain_text(&settings, request),
                Stage::Terminal(result) => return result,
            };
        }
    }

    fn structured(&self, settings: &Settings, request: &ExportRequest) -> Stage {
        let blocks = filter_valid(&request.blocks);
        tracing::debug!(valid = blocks.len(), total = request.blocks.len(), "blocks validated");

        if blocks.is_empty() {
            tracing::warn!("no valid blocks, falling back to plain text");
            return Stage::PlainTextFallback;
        }

        let title = request.title.as_deref().unwrap_or(&request.content);
        match self.api.create_page(settings, title, &blocks) {
            Ok(page) => Stage::Terminal(ExportResult::structured(page)),
            Err(e) => {
                tracing::warn!(
                    kind = e.kind(),
                    transient = e.is_transient(),
                    error = %e,
                    "structured export failed, falling back to plain text"
                );
                Stage::PlainTextFallback
            }
        }
    }

    fn plain_text(&self, settings: &Settings, request: &ExportRequest) -> Stage {
        let blocks: Vec<_> = plain_text_blocks(&request.content)
            .iter()
            .map(Block::to_value)
            .collect();
        let title = summarize(&request.content, TITLE_LENGTH);
        tracing::debug!(chunks = blocks.len(), "attempting plain text export");

        let result = match self.api.create_page(settings, &title, &blocks) {
            Ok(page) => ExportResult::plain_text(page, PLAIN_TEXT_MESSAGE),
            Err(e) => self.fail(&e.to_string()),
        };
        Stage::Terminal(result)
    }

    fn fail(&self, error: &str) -> ExportResult {
        tracing::error!(%error, "export failed");
        ExportResult::failure(error)
    }
}
