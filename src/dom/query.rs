//! `querySelector`-style lookups over the arena DOM.

use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::{MatchingForInvalidation, MatchingMode, NeedsSelectorFlags};
use selectors::parser::{ParseRelative, Selector};
use thiserror::Error;

use super::arena::{Dom, NodeId};
use super::element_ref::{ElementRef, PageSelectors};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone)]
pub struct SelectorList {
    selectors: Vec<Selector<PageSelectors>>,
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = selectors::parser::SelectorList::parse(
            &PageSelectors,
            &mut parser,
            ParseRelative::No,
        )
        .map_err(|_| QueryError::InvalidSelector(source.to_string()))?;

        Ok(Self {
            selectors: list.slice().to_vec(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Whether the element matches any selector in the list.
    pub fn matches(&self, dom: &Dom, id: NodeId, caches: &mut SelectorCaches) -> bool {
        if !dom.is_element(id) {
            return false;
        }
        let elem = ElementRef::new(dom, id);
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            caches,
            selectors::context::QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        self.selectors.iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
    }
}

/// Query helpers scoped to a subtree, mirroring `Element.querySelector`.
impl Dom {
    /// First descendant of `root` (document order) matching `selector`.
    pub fn query_selector(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, QueryError> {
        Ok(self.select(root, &SelectorList::parse(selector)?))
    }

    /// Every descendant of `root` matching `selector`, in document order.
    pub fn query_selector_all(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, QueryError> {
        Ok(self.select_all(root, &SelectorList::parse(selector)?))
    }

    /// First descendant of `root` matching an already parsed list.
    pub fn select(&self, root: NodeId, list: &SelectorList) -> Option<NodeId> {
        let mut caches = SelectorCaches::default();
        self.descendants(root)
            .find(|&id| list.matches(self, id, &mut caches))
    }

    /// Every descendant of `root` matching an already parsed list.
    pub fn select_all(&self, root: NodeId, list: &SelectorList) -> Vec<NodeId> {
        let mut caches = SelectorCaches::default();
        self.descendants(root)
            .filter(|&id| list.matches(self, id, &mut caches))
            .collect()
    }
}
