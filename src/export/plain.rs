//! Plain-text rendition of content for the fallback upload.

use crate::block::{Block, MAX_TEXT_LENGTH};
use crate::util::chunk_chars;

/// One paragraph per [`MAX_TEXT_LENGTH`]-character segment of `content`.
///
/// Segments are cut at character boundaries only; order is preserved.
pub fn plain_text_blocks(content: &str) -> Vec<Block> {
    chunk_chars(content, MAX_TEXT_LENGTH)
        .into_iter()
        .map(Block::paragraph)
        .collect()
}
