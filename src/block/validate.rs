//! Schema checks for blocks before they are sent.
//!
//! Blocks arrive from the page side as untyped JSON. [`validate_value`]
//! checks the shape Notion requires and reports the block's kind; anything
//! else is rejected with the reason. Accepted blocks are forwarded as they
//! came, so annotations, links, colors and non-text spans survive.
//! Validation never panics, and [`filter_valid`] drops rejects without
//! aborting the batch.

use serde_json::{Map, Value};
use thiserror::Error;

use super::{Block, BlockKind, CodePayload, OBJECT_BLOCK, TextPayload};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("block is not a JSON object")]
    NotAnObject,

    #[error("`object` must be \"block\"")]
    NotABlock,

    #[error("`type` must be a non-empty string")]
    MissingType,

    #[error("no `{0}` payload")]
    MissingPayload(String),

    #[error("`{0}.rich_text` is not an array")]
    RichTextNotArray(BlockKind),

    #[error("`{0}.rich_text` is empty")]
    EmptyRichText(BlockKind),

    #[error("image has no external url")]
    MissingImageUrl,

    #[error("unsupported block type `{0}`")]
    UnsupportedType(String),
}

/// Check an untyped block and return its kind.
pub fn validate_value(value: &Value) -> Result<BlockKind, ValidationError> {
    let block = value.as_object().ok_or(ValidationError::NotAnObject)?;

    if block.get("object").and_then(Value::as_str) != Some(OBJECT_BLOCK) {
        return Err(ValidationError::NotABlock);
    }

    let type_name = block
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingType)?;

    let payload = block
        .get(type_name)
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::MissingPayload(type_name.to_string()))?;

    let kind = BlockKind::from_type(type_name)
        .ok_or_else(|| ValidationError::UnsupportedType(type_name.to_string()))?;

    match kind {
        BlockKind::Image => require_image_url(payload)?,
        BlockKind::Divider => {}
        BlockKind::Paragraph
        | BlockKind::Heading1
        | BlockKind::Heading2
        | BlockKind::Heading3
        | BlockKind::BulletedListItem
        | BlockKind::NumberedListItem
        | BlockKind::Code
        | BlockKind::Quote => require_rich_text(kind, payload)?,
    }

    Ok(kind)
}

fn require_rich_text(
    kind: BlockKind,
    payload: &Map<String, Value>,
) -> Result<(), ValidationError> {
    let spans = payload
        .get("rich_text")
        .and_then(Value::as_array)
        .ok_or(ValidationError::RichTextNotArray(kind))?;

    if spans.is_empty() {
        return Err(ValidationError::EmptyRichText(kind));
    }
    Ok(())
}

fn require_image_url(payload: &Map<String, Value>) -> Result<(), ValidationError> {
    payload
        .get("external")
        .and_then(|e| e.get("url"))
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(|_| ())
        .ok_or(ValidationError::MissingImageUrl)
}

impl Block {
    /// Check a typed block against the same rules as [`validate_value`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Block::Image(image) if image.url.is_empty() => Err(ValidationError::MissingImageUrl),
            Block::Image(_) | Block::Divider => Ok(()),
            Block::Paragraph(TextPayload { rich_text })
            | Block::Heading1(TextPayload { rich_text })
            | Block::Heading2(TextPayload { rich_text })
            | Block::Heading3(TextPayload { rich_text })
            | Block::BulletedListItem(TextPayload { rich_text })
            | Block::NumberedListItem(TextPayload { rich_text })
            | Block::Quote(TextPayload { rich_text })
            | Block::Code(CodePayload { rich_text, .. }) => {
                if rich_text.is_empty() {
                    Err(ValidationError::EmptyRichText(self.kind()))
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Keep the blocks that pass validation, unchanged and in order; log and
/// drop the rest.
pub fn filter_valid(blocks: &[Value]) -> Vec<Value> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match validate_value(value) {
            Ok(_) => Some(value.clone()),
            Err(reason) => {
                tracing::warn!(index, %reason, block = %value, "invalid block skipped");
                None
            }
        })
        .collect()
}
