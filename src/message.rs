//! Messages between the page side and the exporter, and user notices.
//!
//! Requests are JSON objects tagged by `action`:
//!
//! ```json
//! {"action": "exportToNotion", "content": "...", "blocks": [...]}
//! {"action": "extractAndExport"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content to export. Blocks stay untyped until validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub content: String,
    #[serde(default)]
    pub blocks: Vec<Value>,
    /// Page title for the structured attempt; `content` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ExportToNotion(ExportRequest),
    ExtractAndExport,
}

/// Outcome of one export. Absent fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_plain_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportResult {
    pub fn structured(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn plain_text(data: Value, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            was_plain_text: Some(true),
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn was_plain_text(&self) -> bool {
        self.was_plain_text.unwrap_or(false)
    }

    /// The notice shown for this result.
    pub fn notice(&self) -> Notice {
        if !self.success {
            Notice::error(format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ))
        } else if self.was_plain_text() {
            Notice::info("Exported to Notion as plain text (formatting simplified)")
        } else {
            Notice::info("Successfully exported to Notion with formatting!")
        }
    }
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }

    pub fn sending() -> Self {
        Self::info("Sending to Notion...")
    }

    pub fn no_content() -> Self {
        Self::error("No content blocks to export")
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_export_request() {
        let request: Request = serde_json::from_value(json!({
            "action": "exportToNotion",
            "content": "Hello...",
            "blocks": [{"object": "block"}]
        }))
        .unwrap();
        let Request::ExportToNotion(export) = request else {
            panic!("expected exportToNotion");
        };
        assert_eq!(export.content, "Hello...");
        assert_eq!(export.blocks.len(), 1);
        assert_eq!(export.title, None);
    }

    #[test]
    fn test_parse_extract_request() {
        let request: Request = serde_json::from_str(r#"{"action":"extractAndExport"}"#).unwrap();
        assert_eq!(request, Request::ExtractAndExport);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"action":"reply"}"#).is_err());
    }

    #[test]
    fn test_result_wire_shape() {
        let result = ExportResult::plain_text(json!({"id": "p"}), "simplified");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": true,
                "data": {"id": "p"},
                "wasPlainText": true,
                "message": "simplified"
            })
        );

        let failure = ExportResult::failure("boom");
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({"success": false, "error": "boom"})
        );
    }

    #[test]
    fn test_result_notices() {
        assert_eq!(
            ExportResult::structured(json!({})).notice(),
            Notice::info("Successfully exported to Notion with formatting!")
        );
        assert_eq!(
            ExportResult::plain_text(json!({}), "m").notice(),
            Notice::info("Exported to Notion as plain text (formatting simplified)")
        );
        assert_eq!(
            ExportResult::failure("bad key").notice(),
            Notice::error("Error: bad key")
        );
    }
}
