//! Notion block model.
//!
//! A [`Block`] is one structured unit of a Notion page. On the wire every
//! block has the shape
//!
//! ```json
//! {"object": "block", "type": "paragraph", "paragraph": {"rich_text": [...]}}
//! ```
//!
//! where the payload key always equals `type`. Here the payload is an enum
//! variant, so the key cannot drift from the type.

mod language;
pub mod validate;

pub use language::{PLAIN_TEXT, notion_language};
pub use validate::{ValidationError, filter_valid, validate_value};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::util::chunk_chars;

/// Notion's limit on the content length of one text span.
pub const MAX_TEXT_LENGTH: usize = 2000;

/// Discriminator value carried by every block.
pub const OBJECT_BLOCK: &str = "block";

/// One inline text span: `{"type": "text", "text": {"content": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText {
    pub content: String,
}

impl RichText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl Serialize for RichText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Text<'a> {
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Repr<'a> {
            #[serde(rename = "type")]
            kind: &'static str,
            text: Text<'a>,
        }

        Repr {
            kind: "text",
            text: Text {
                content: &self.content,
            },
        }
        .serialize(serializer)
    }
}

/// Spans for `text`, split every [`MAX_TEXT_LENGTH`] characters.
///
/// Empty text yields no spans.
pub fn rich_text(text: &str) -> Vec<RichText> {
    chunk_chars(text, MAX_TEXT_LENGTH)
        .into_iter()
        .map(RichText::new)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextPayload {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodePayload {
    pub rich_text: Vec<RichText>,
    pub language: String,
}

/// An externally hosted image with a caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub url: String,
    pub caption: Vec<RichText>,
}

impl Serialize for ImagePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct External<'a> {
            url: &'a str,
        }

        #[derive(Serialize)]
        struct Repr<'a> {
            #[serde(rename = "type")]
            kind: &'static str,
            external: External<'a>,
            caption: &'a [RichText],
        }

        Repr {
            kind: "external",
            external: External { url: &self.url },
            caption: &self.caption,
        }
        .serialize(serializer)
    }
}

/// Block type names, as used in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    Code,
    Quote,
    Image,
    Divider,
}

impl BlockKind {
    pub const ALL: [BlockKind; 10] = [
        BlockKind::Paragraph,
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::BulletedListItem,
        BlockKind::NumberedListItem,
        BlockKind::Code,
        BlockKind::Quote,
        BlockKind::Image,
        BlockKind::Divider,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading1 => "heading_1",
            BlockKind::Heading2 => "heading_2",
            BlockKind::Heading3 => "heading_3",
            BlockKind::BulletedListItem => "bulleted_list_item",
            BlockKind::NumberedListItem => "numbered_list_item",
            BlockKind::Code => "code",
            BlockKind::Quote => "quote",
            BlockKind::Image => "image",
            BlockKind::Divider => "divider",
        }
    }

    pub fn from_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Kinds whose payload must carry a non-empty `rich_text` array.
    pub fn requires_rich_text(self) -> bool {
        !matches!(self, BlockKind::Image | BlockKind::Divider)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Notion block. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(TextPayload),
    Heading1(TextPayload),
    Heading2(TextPayload),
    Heading3(TextPayload),
    BulletedListItem(TextPayload),
    NumberedListItem(TextPayload),
    Code(CodePayload),
    Quote(TextPayload),
    Image(ImagePayload),
    Divider,
}

impl Block {
    /// Text-bearing block of `kind`. Code gets the plain-text language;
    /// image and divider ignore `text`.
    pub fn text(kind: BlockKind, text: &str) -> Block {
        let payload = TextPayload {
            rich_text: rich_text(text),
        };
        match kind {
            BlockKind::Paragraph => Block::Paragraph(payload),
            BlockKind::Heading1 => Block::Heading1(payload),
            BlockKind::Heading2 => Block::Heading2(payload),
            BlockKind::Heading3 => Block::Heading3(payload),
            BlockKind::BulletedListItem => Block::BulletedListItem(payload),
            BlockKind::NumberedListItem => Block::NumberedListItem(payload),
            BlockKind::Quote => Block::Quote(payload),
            BlockKind::Code => Block::code(text, PLAIN_TEXT),
            BlockKind::Image => Block::image("", ""),
            BlockKind::Divider => Block::Divider,
        }
    }

    pub fn paragraph(text: &str) -> Block {
        Block::text(BlockKind::Paragraph, text)
    }

    /// Heading of level 1 to 3; other levels clamp into that range.
    pub fn heading(level: u8, text: &str) -> Block {
        let kind = match level {
            0 | 1 => BlockKind::Heading1,
            2 => BlockKind::Heading2,
            _ => BlockKind::Heading3,
        };
        Block::text(kind, text)
    }

    pub fn code(text: &str, language: &str) -> Block {
        Block::Code(CodePayload {
            rich_text: rich_text(text),
            language: language.to_string(),
        })
    }

    /// Image with `alt` as its single caption span.
    pub fn image(url: &str, alt: &str) -> Block {
        Block::Image(ImagePayload {
            url: url.to_string(),
            caption: vec![RichText::new(alt)],
        })
    }

    pub fn divider() -> Block {
        Block::Divider
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::Heading1(_) => BlockKind::Heading1,
            Block::Heading2(_) => BlockKind::Heading2,
            Block::Heading3(_) => BlockKind::Heading3,
            Block::BulletedListItem(_) => BlockKind::BulletedListItem,
            Block::NumberedListItem(_) => BlockKind::NumberedListItem,
            Block::Code(_) => BlockKind::Code,
            Block::Quote(_) => BlockKind::Quote,
            Block::Image(_) => BlockKind::Image,
            Block::Divider => BlockKind::Divider,
        }
    }

    /// The block's `rich_text` spans, if its kind has them.
    pub fn rich_text(&self) -> Option<&[RichText]> {
        match self {
            Block::Paragraph(p)
            | Block::Heading1(p)
            | Block::Heading2(p)
            | Block::Heading3(p)
            | Block::BulletedListItem(p)
            | Block::NumberedListItem(p)
            | Block::Quote(p) => Some(&p.rich_text),
            Block::Code(c) => Some(&c.rich_text),
            Block::Image(_) | Block::Divider => None,
        }
    }

    /// Concatenated span content.
    pub fn plain_text(&self) -> String {
        self.rich_text()
            .map(|spans| spans.iter().map(|s| s.content.as_str()).collect())
            .unwrap_or_default()
    }

    /// The Notion JSON form of this block.
    pub fn to_value(&self) -> serde_json::Value {
        // Serializing these types into a Value has no failure path.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Serialize)]
struct EmptyPayload {}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind().as_str();
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("object", OBJECT_BLOCK)?;
        map.serialize_entry("type", kind)?;
        match self {
            Block::Paragraph(p)
            | Block::Heading1(p)
            | Block::Heading2(p)
            | Block::Heading3(p)
            | Block::BulletedListItem(p)
            | Block::NumberedListItem(p)
            | Block::Quote(p) => map.serialize_entry(kind, p)?,
            Block::Code(c) => map.serialize_entry(kind, c)?,
            Block::Image(i) => map.serialize_entry(kind, i)?,
            Block::Divider => map.serialize_entry(kind, &EmptyPayload {})?,
        }
        map.end()
    }
}
