//! Notion page creation.
//!
//! [`NotionApi`] is the seam between the exporter and the network.
//! [`NotionClient`] talks to the REST API over `reqwest`; [`MockNotionApi`]
//! records calls and replays scripted responses.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::settings::Settings;

pub const DEFAULT_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum NotionError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Non-success status. `body` is the compact JSON error object, or the
    /// raw body when it is not JSON.
    #[error("Notion API Error: {body}")]
    Api { status: u16, body: String },

    #[error("malformed Notion response: {0}")]
    Decode(String),
}

impl NotionError {
    /// Failure class for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NotionError::Client(_) => "client",
            NotionError::Transport { .. } | NotionError::Timeout(_) => "transport",
            NotionError::Api { .. } => "api",
            NotionError::Decode(_) => "decode",
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            NotionError::Transport { .. } | NotionError::Timeout(_) => true,
            NotionError::Api { status, .. } => *status == 429 || *status >= 500,
            NotionError::Client(_) | NotionError::Decode(_) => false,
        }
    }
}

/// Creates pages in a Notion database.
pub trait NotionApi {
    /// Create a page titled `title` with `children` as its content and
    /// return the created page object. `children` are wire-format blocks.
    fn create_page(
        &self,
        settings: &Settings,
        title: &str,
        children: &[Value],
    ) -> Result<Value, NotionError>;
}

impl<T: NotionApi + ?Sized> NotionApi for &T {
    fn create_page(
        &self,
        settings: &Settings,
        title: &str,
        children: &[Value],
    ) -> Result<Value, NotionError> {
        (**self).create_page(settings, title, children)
    }
}

#[derive(Serialize)]
struct CreatePageRequest<'a> {
    parent: Parent<'a>,
    properties: Properties<'a>,
    children: &'a [Value],
}

#[derive(Serialize)]
struct Parent<'a> {
    database_id: &'a str,
}

#[derive(Serialize)]
struct Properties<'a> {
    #[serde(rename = "Name")]
    name: TitleProperty<'a>,
}

#[derive(Serialize)]
struct TitleProperty<'a> {
    title: [TitleText<'a>; 1],
}

#[derive(Serialize)]
struct TitleText<'a> {
    text: TitleContent<'a>,
}

#[derive(Serialize)]
struct TitleContent<'a> {
    content: &'a str,
}

impl<'a> CreatePageRequest<'a> {
    fn new(database_id: &'a str, title: &'a str, children: &'a [Value]) -> Self {
        Self {
            parent: Parent { database_id },
            properties: Properties {
                name: TitleProperty {
                    title: [TitleText {
                        text: TitleContent { content: title },
                    }],
                },
            },
            children,
        }
    }
}

/// Blocking REST client.
pub struct NotionClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl NotionClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, NotionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NotionError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    /// The public API with the default timeout.
    pub fn default_remote() -> Result<Self, NotionError> {
        Self::new(DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl NotionApi for NotionClient {
    fn create_page(
        &self,
        settings: &Settings,
        title: &str,
        children: &[Value],
    ) -> Result<Value, NotionError> {
        let url = format!("{}/pages", self.base_url);
        let body = CreatePageRequest::new(&settings.database_id, title, children);
        tracing::debug!(%url, children = children.len(), "creating page");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&settings.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    NotionError::Timeout(self.timeout_secs)
                } else {
                    NotionError::Transport {
                        url: url.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NotionError::Api {
                status: status.as_u16(),
                body: error_body(&body),
            });
        }

        response
            .json()
            .map_err(|e| NotionError::Decode(e.to_string()))
    }
}

/// Re-encode a JSON error body compactly; keep anything else verbatim.
fn error_body(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(json) => json.to_string(),
        Err(_) => raw.to_string(),
    }
}

/// One recorded [`NotionApi::create_page`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCall {
    pub database_id: String,
    pub title: String,
    pub children: Vec<Value>,
}

/// Mock API for testing: records calls and pops scripted responses.
///
/// Once the script is exhausted every call succeeds with a stub page.
#[derive(Default)]
pub struct MockNotionApi {
    responses: RefCell<VecDeque<Result<Value, NotionError>>>,
    calls: RefCell<Vec<PageCall>>,
}

impl MockNotionApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered call.
    pub fn respond(self, response: Result<Value, NotionError>) -> Self {
        self.responses.borrow_mut().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl NotionApi for MockNotionApi {
    fn create_page(
        &self,
        settings: &Settings,
        title: &str,
        children: &[Value],
    ) -> Result<Value, NotionError> {
        self.calls.borrow_mut().push(PageCall {
            database_id: settings.database_id.clone(),
            title: title.to_string(),
            children: children.to_vec(),
        });
        let n = self.call_count();
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Ok(serde_json::json!({"object": "page", "id": format!("page-{n}")}))
        })
    }
}
