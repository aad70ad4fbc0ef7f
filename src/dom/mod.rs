//! HTML parsing into an arena DOM with selector queries.
//!
//! # Example
//!
//! ```
//! use pagecast::dom::parse_html;
//!
//! let dom = parse_html(r#"<div class="markdown prose"><p>Hi</p></div>"#);
//! let body = dom.query_selector(dom.document(), ".markdown.prose").unwrap().unwrap();
//! assert_eq!(dom.text_content(body), "Hi");
//! ```

mod arena;
mod element_ref;
mod query;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Descendants, Dom, Node, NodeData, NodeId};
pub use element_ref::{ElementRef, PageSelectors};
pub use query::{QueryError, SelectorList};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::DomSink;

/// Parse an HTML document or fragment.
pub fn parse_html(html: &str) -> Dom {
    parse_document(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse raw page bytes, honoring a `<meta charset>` declaration when the
/// bytes are not valid UTF-8.
pub fn parse_html_bytes(html: &[u8]) -> Dom {
    let hint = crate::util::extract_meta_charset(html);
    let text = crate::util::decode_text(html, hint);
    parse_html(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_gets_body() {
        let dom = parse_html("<h1>Title</h1>");
        let body = dom.find_by_tag("body").expect("body is synthesized");
        let children: Vec<_> = dom.element_children(body).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.tag_name(children[0]), Some("h1"));
    }

    #[test]
    fn test_parse_bytes_with_legacy_charset() {
        let dom = parse_html_bytes(b"<meta charset=\"windows-1252\"><p>caf\xE9</p>");
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(dom.text_content(p), "café");
    }
}
