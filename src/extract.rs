//! Assistant message extraction from a chat page.
//!
//! [`locate_message`] finds the rendered markdown of the assistant's reply
//! in the last conversation turn; [`extract`] turns its children into an
//! ordered block sequence.

use std::sync::LazyLock;

use thiserror::Error;

use crate::block::Block;
use crate::convert::{convert_node, plain_paragraph};
use crate::dom::{Dom, NodeId, SelectorList};
use crate::message::ExportRequest;
use crate::util::summarize;

static CONVERSATION_TURN: LazyLock<SelectorList> = LazyLock::new(|| {
    SelectorList::parse(r#"article[data-testid^="conversation-turn-"]"#).expect("valid selector")
});

static ASSISTANT_MESSAGE: LazyLock<SelectorList> = LazyLock::new(|| {
    SelectorList::parse(r#"[data-message-author-role="assistant"]"#).expect("valid selector")
});

static MESSAGE_CONTENT: LazyLock<SelectorList> =
    LazyLock::new(|| SelectorList::parse(".markdown.prose").expect("valid selector"));

/// Characters of the content kept in [`Extraction::summary`].
pub const SUMMARY_LENGTH: usize = 50;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("No conversation found")]
    NoConversation,

    #[error("No assistant message found in the last conversation turn")]
    NoAssistantMessage,

    #[error("Could not extract message content")]
    NoMessageContent,
}

/// The message container of the assistant's reply in the last turn.
pub fn locate_message(dom: &Dom) -> Result<NodeId, LocateError> {
    let turn = dom
        .select_all(dom.document(), &CONVERSATION_TURN)
        .pop()
        .ok_or(LocateError::NoConversation)?;

    let assistant = dom
        .select(turn, &ASSISTANT_MESSAGE)
        .ok_or(LocateError::NoAssistantMessage)?;

    dom.select(assistant, &MESSAGE_CONTENT)
        .ok_or(LocateError::NoMessageContent)
}

/// Blocks and text gathered from one message container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub blocks: Vec<Block>,
    /// Full trimmed text of the container.
    pub content: String,
    /// First [`SUMMARY_LENGTH`] characters of `content` plus `...`.
    pub summary: String,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The upload request for this extraction: full text as content,
    /// summary as page title.
    pub fn to_request(&self) -> ExportRequest {
        ExportRequest {
            content: self.content.clone(),
            blocks: self.blocks.iter().map(Block::to_value).collect(),
            title: Some(self.summary.clone()),
        }
    }
}

/// Convert each element child of `container`, in document order.
///
/// A child that converts to nothing is kept as a plain paragraph of its
/// text when it has any.
pub fn extract(dom: &Dom, container: NodeId) -> Extraction {
    let mut blocks = Vec::new();
    for child in dom.element_children(container) {
        match convert_node(dom, child).or_else(|| plain_paragraph(dom, child)) {
            Some(converted) => blocks.extend(converted),
            None => tracing::debug!(node = ?child, "empty element skipped"),
        }
    }

    let text = dom.text_content(container);
    let content = text.trim().to_string();
    let summary = summarize(&content, SUMMARY_LENGTH);
    tracing::debug!(blocks = blocks.len(), chars = content.chars().count(), "message extracted");

    Extraction {
        blocks,
        content,
        summary,
    }
}
