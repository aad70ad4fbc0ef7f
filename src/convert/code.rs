//! Code extraction from `<pre>` elements.
//!
//! Chat pages wrap code in a toolbar (language label, copy button) and a
//! scrollable container. Content and language are taken from the first
//! layout that matches:
//!
//! 1. a scrollable container, with the toolbar label as language
//! 2. a nested `<code>` element, with a `language-<name>` class
//! 3. the whole `<pre>` text minus the toolbar text

use std::sync::LazyLock;

use regex::Regex;

use crate::block::{PLAIN_TEXT, notion_language};
use crate::dom::{Dom, NodeId, SelectorList};

static CODE_CONTAINER: LazyLock<SelectorList> =
    LazyLock::new(|| SelectorList::parse(".overflow-y-auto").expect("valid selector"));

static LANGUAGE_LABEL: LazyLock<SelectorList> =
    LazyLock::new(|| SelectorList::parse(".flex.items-center").expect("valid selector"));

static NESTED_CODE: LazyLock<SelectorList> =
    LazyLock::new(|| SelectorList::parse("code").expect("valid selector"));

/// Toolbar parts whose text is cut from a bare `<pre>`.
static UI_CHROME: LazyLock<SelectorList> = LazyLock::new(|| {
    SelectorList::parse(
        ".contain-inline-size, .sticky, .flex.items-center, .absolute, .relative, button",
    )
    .expect("valid selector")
});

/// Lines consisting only of a copy-button caption: `copy`, `Copy code`
/// or `코드 복사`.
static COPY_CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:copy|[Cc]opy code|코드\s*복사)\s*$").expect("valid regex")
});

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

static LANGUAGE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"language-(\w+)").expect("valid regex"));

/// Code text and its Notion language name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSnippet {
    pub content: String,
    pub language: &'static str,
}

/// Extract the code inside `pre`. `None` when nothing but chrome remains.
pub fn extract_code(dom: &Dom, pre: NodeId) -> Option<CodeSnippet> {
    let (raw, label) = if let Some(container) = dom.select(pre, &CODE_CONTAINER) {
        let label = dom
            .select(pre, &LANGUAGE_LABEL)
            .map(|el| dom.text_content(el).trim().to_lowercase());
        (dom.text_content(container).trim().to_string(), label)
    } else if let Some(code) = dom.select(pre, &NESTED_CODE) {
        let label = dom
            .attr(code, "class")
            .and_then(|class| LANGUAGE_CLASS_RE.captures(class))
            .map(|caps| caps[1].to_string());
        (dom.text_content(code).trim().to_string(), label)
    } else {
        (text_without_chrome(dom, pre), None)
    };

    if raw.is_empty() {
        return None;
    }

    let content = clean_code(&raw);
    if content.is_empty() {
        return None;
    }

    Some(CodeSnippet {
        content,
        language: label.as_deref().map_or(PLAIN_TEXT, notion_language),
    })
}

/// Full text of `pre` with each toolbar element's text cut out once.
fn text_without_chrome(dom: &Dom, pre: NodeId) -> String {
    let mut text = dom.text_content(pre);
    for el in dom.select_all(pre, &UI_CHROME) {
        let chrome = dom.text_content(el);
        if !chrome.is_empty() {
            text = text.replacen(&chrome, "", 1);
        }
    }
    text.trim().to_string()
}

/// Drop copy-button captions and blank lines.
fn clean_code(raw: &str) -> String {
    let without_captions = COPY_CAPTION_RE.replace_all(raw, "");
    let collapsed = BLANK_LINES_RE.replace_all(&without_captions, "\n");
    collapsed.trim().to_string()
}
