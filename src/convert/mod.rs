//! Element → block conversion.
//!
//! [`try_convert_node`] applies the tag rules and reports failures;
//! [`convert_node`] is the same routine with failures degraded to a plain
//! paragraph through [`Degrade::or_plain_text`]. There is exactly one
//! fallback policy, [`plain_paragraph`], shared with the extractor.

mod code;

pub use code::{CodeSnippet, extract_code};

use thiserror::Error;

use crate::block::{Block, BlockKind};
use crate::dom::{Dom, NodeId};

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
}

/// Result of converting one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Converted {
    Single(Block),
    /// List items, in document order. Never empty.
    Many(Vec<Block>),
}

impl Converted {
    pub fn into_blocks(self) -> Vec<Block> {
        match self {
            Converted::Single(block) => vec![block],
            Converted::Many(blocks) => blocks,
        }
    }
}

impl IntoIterator for Converted {
    type Item = Block;
    type IntoIter = std::vec::IntoIter<Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_blocks().into_iter()
    }
}

/// How an element maps onto blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementRule {
    Heading(u8),
    Paragraph,
    Divider,
    Code,
    List { ordered: bool },
    Quote,
    Image,
    Other,
}

fn element_rule(tag: &str) -> ElementRule {
    match tag {
        "h1" => ElementRule::Heading(1),
        "h2" => ElementRule::Heading(2),
        "h3" => ElementRule::Heading(3),
        "p" => ElementRule::Paragraph,
        "hr" => ElementRule::Divider,
        "pre" => ElementRule::Code,
        "ul" => ElementRule::List { ordered: false },
        "ol" => ElementRule::List { ordered: true },
        "blockquote" => ElementRule::Quote,
        "img" => ElementRule::Image,
        _ => ElementRule::Other,
    }
}

/// Convert one element by its tag. `Ok(None)` means it has no content.
pub fn try_convert_node(dom: &Dom, id: NodeId) -> Result<Option<Converted>, ConversionError> {
    let tag = dom.tag_name(id).ok_or(ConversionError::NotAnElement(id))?;

    let converted = match element_rule(tag) {
        ElementRule::Heading(level) => {
            trimmed_text(dom, id).map(|text| Converted::Single(Block::heading(level, &text)))
        }
        ElementRule::Paragraph | ElementRule::Other => text_block(dom, id, BlockKind::Paragraph),
        ElementRule::Quote => text_block(dom, id, BlockKind::Quote),
        ElementRule::Divider => Some(Converted::Single(Block::divider())),
        ElementRule::Code => extract_code(dom, id)
            .map(|snippet| Converted::Single(Block::code(&snippet.content, snippet.language))),
        ElementRule::List { ordered } => {
            let kind = if ordered {
                BlockKind::NumberedListItem
            } else {
                BlockKind::BulletedListItem
            };
            let items: Vec<Block> = dom
                .element_children(id)
                .filter(|&li| dom.tag_name(li) == Some("li"))
                .filter_map(|li| trimmed_text(dom, li))
                .map(|text| Block::text(kind, &text))
                .collect();
            (!items.is_empty()).then_some(Converted::Many(items))
        }
        ElementRule::Image => {
            let src = dom.attr(id, "src").unwrap_or_default();
            let alt = dom.attr(id, "alt").unwrap_or_default();
            Some(Converted::Single(Block::image(src, alt)))
        }
    };

    Ok(converted)
}

/// Convert one element, degrading any failure to a plain paragraph.
pub fn convert_node(dom: &Dom, id: NodeId) -> Option<Converted> {
    try_convert_node(dom, id).or_plain_text(dom, id)
}

/// The node's trimmed text as a single paragraph, or `None` if blank.
pub fn plain_paragraph(dom: &Dom, id: NodeId) -> Option<Converted> {
    text_block(dom, id, BlockKind::Paragraph)
}

/// Recovery policy for a failed conversion.
pub trait Degrade {
    fn or_plain_text(self, dom: &Dom, id: NodeId) -> Option<Converted>;
}

impl Degrade for Result<Option<Converted>, ConversionError> {
    fn or_plain_text(self, dom: &Dom, id: NodeId) -> Option<Converted> {
        self.unwrap_or_else(|err| {
            tracing::warn!(node = ?id, error = %err, "conversion failed, using plain text");
            plain_paragraph(dom, id)
        })
    }
}

fn trimmed_text(dom: &Dom, id: NodeId) -> Option<String> {
    let text = dom.text_content(id);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn text_block(dom: &Dom, id: NodeId, kind: BlockKind) -> Option<Converted> {
    trimmed_text(dom, id).map(|text| Converted::Single(Block::text(kind, &text)))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::block::{PLAIN_TEXT, RichText};
    use crate::dom::parse_html;

    use super::*;

    /// Convert the first element with `tag` in `html`.
    fn convert(html: &str, tag: &str) -> Option<Converted> {
        let dom = parse_html(html);
        let id = dom.find_by_tag(tag).expect("fixture has the tag");
        convert_node(&dom, id)
    }

    fn single(converted: Option<Converted>) -> Block {
        match converted {
            Some(Converted::Single(block)) => block,
            other => panic!("expected a single block, got {other:?}"),
        }
    }

    #[test]
    fn test_headings() {
        assert_eq!(single(convert("<h1> Title </h1>", "h1")), Block::heading(1, "Title"));
        assert_eq!(single(convert("<h2>Sub</h2>", "h2")), Block::heading(2, "Sub"));
        assert_eq!(single(convert("<h3>Minor</h3>", "h3")), Block::heading(3, "Minor"));
    }

    #[test]
    fn test_h4_is_a_paragraph() {
        assert_eq!(single(convert("<h4>Deep</h4>", "h4")), Block::paragraph("Deep"));
    }

    #[test]
    fn test_paragraph_uses_all_descendant_text() {
        let block = single(convert("<p>Use <code>cargo</code> and <b>relax</b>.</p>", "p"));
        assert_eq!(block, Block::paragraph("Use cargo and relax."));
    }

    #[test]
    fn test_empty_text_blocks_yield_nothing() {
        assert_eq!(convert("<p>   </p>", "p"), None);
        assert_eq!(convert("<h2></h2>", "h2"), None);
        assert_eq!(convert("<blockquote>\n</blockquote>", "blockquote"), None);
        assert_eq!(convert("<div> </div>", "div"), None);
    }

    #[test]
    fn test_divider() {
        assert_eq!(single(convert("<hr>", "hr")), Block::divider());
    }

    #[test]
    fn test_quote() {
        let block = single(convert("<blockquote><p>Be brief.</p></blockquote>", "blockquote"));
        assert_eq!(block, Block::text(BlockKind::Quote, "Be brief."));
    }

    #[test]
    fn test_lists_drop_empty_items() {
        let converted = convert("<ul><li>one</li><li> </li><li>two</li></ul>", "ul");
        assert_eq!(
            converted,
            Some(Converted::Many(vec![
                Block::text(BlockKind::BulletedListItem, "one"),
                Block::text(BlockKind::BulletedListItem, "two"),
            ]))
        );

        let converted = convert("<ol><li>first</li></ol>", "ol");
        assert_eq!(
            converted,
            Some(Converted::Many(vec![Block::text(BlockKind::NumberedListItem, "first")]))
        );
    }

    #[test]
    fn test_list_of_empty_items_yields_nothing() {
        assert_eq!(convert("<ol><li></li><li>  </li></ol>", "ol"), None);
    }

    #[test]
    fn test_image() {
        let block = single(convert(r#"<img src="https://x.test/a.png" alt="diagram">"#, "img"));
        assert_eq!(block, Block::image("https://x.test/a.png", "diagram"));

        let Block::Image(image) = single(convert("<img>", "img")) else {
            panic!("expected image");
        };
        assert_eq!(image.url, "");
        assert_eq!(image.caption, vec![RichText::new("")]);
    }

    #[test]
    fn test_code_block() {
        let block = single(convert(
            r#"<pre><code class="language-js">console.log(1)</code></pre>"#,
            "pre",
        ));
        assert_eq!(block, Block::code("console.log(1)", "javascript"));
    }

    #[test]
    fn test_copy_caption_pre_yields_nothing() {
        assert_eq!(convert("<pre>copy</pre>", "pre"), None);
    }

    #[test]
    fn test_unknown_tag_falls_back_to_paragraph() {
        let block = single(convert("<table><tr><td>a</td><td>b</td></tr></table>", "table"));
        assert_eq!(block, Block::paragraph("ab"));
    }

    #[test]
    fn test_text_node_is_an_error_degraded_to_text() {
        let dom = parse_html("<p>hello</p>");
        let p = dom.find_by_tag("p").unwrap();
        let text = dom.children(p).next().unwrap();

        assert!(matches!(
            try_convert_node(&dom, text),
            Err(ConversionError::NotAnElement(_))
        ));
        assert_eq!(
            convert_node(&dom, text),
            Some(Converted::Single(Block::paragraph("hello")))
        );
    }

    #[test]
    fn test_degrade_policy() {
        let dom = parse_html("<pre> raw  </pre><pre></pre>");
        let pres: Vec<_> = dom
            .descendants(dom.document())
            .filter(|&id| dom.tag_name(id) == Some("pre"))
            .collect();
        type Attempt = Result<Option<Converted>, ConversionError>;
        let failure = || -> Attempt { Err(ConversionError::NotAnElement(NodeId::NONE)) };

        assert_eq!(
            failure().or_plain_text(&dom, pres[0]),
            Some(Converted::Single(Block::paragraph("raw")))
        );
        assert_eq!(failure().or_plain_text(&dom, pres[1]), None);
        let empty: Attempt = Ok(None);
        assert_eq!(empty.or_plain_text(&dom, pres[0]), None);
    }

    #[test]
    fn test_every_conversion_validates() {
        let dom = parse_html(
            r#"<h1>a</h1><h2>b</h2><h3>c</h3><p>d</p><hr><pre><code>e</code></pre>
               <ul><li>f</li></ul><ol><li>g</li></ol><blockquote>h</blockquote>
               <img src="https://x.test/i.png"><section>i</section>"#,
        );
        let body = dom.find_by_tag("body").unwrap();
        for child in dom.element_children(body) {
            for block in convert_node(&dom, child).into_iter().flatten() {
                assert!(block.is_valid(), "{block:?}");
                assert_eq!(
                    crate::block::validate_value(&block.to_value()),
                    Ok(block.kind())
                );
            }
        }
    }

    #[test]
    fn test_default_language_is_plain_text() {
        let block = single(convert("<pre><code>x</code></pre>", "pre"));
        let Block::Code(code) = block else {
            panic!("expected code");
        };
        assert_eq!(code.language, PLAIN_TEXT);
    }

    proptest! {
        #[test]
        fn prop_conversion_is_idempotent(
            items in prop::collection::vec("[a-z ]{0,12}", 0..6),
            heading in "[A-Za-z ]{0,20}",
        ) {
            let lis: String = items.iter().map(|t| format!("<li>{t}</li>")).collect();
            let html = format!("<h2>{heading}</h2><ul>{lis}</ul><pre><code>{heading}</code></pre>");
            let dom = parse_html(&html);
            let body = dom.find_by_tag("body").unwrap();

            let run = || -> Vec<Block> {
                dom.element_children(body)
                    .filter_map(|child| convert_node(&dom, child))
                    .flatten()
                    .collect()
            };
            prop_assert_eq!(run(), run());
        }
    }
}
