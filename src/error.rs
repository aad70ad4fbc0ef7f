//! Error types for pagecast operations.

use thiserror::Error;

use crate::convert::ConversionError;
use crate::dom::QueryError;
use crate::extract::LocateError;
use crate::notion::NotionError;
use crate::settings::SettingsError;

/// Errors that can occur while reading a page or talking to Notion.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Notion(#[from] NotionError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, Error>;
