//! DOM capability traits and their `dom_query` adapter.
//!
//! Content extraction only needs a handful of DOM operations: query-first,
//! query-all, flattened text, serialized outer markup, access to `<body>` /
//! the document element, and removal of chrome on the body fallback. [`HtmlNode`] and
//! [`HtmlDocument`] capture exactly that, so the extractor is written against
//! the traits and any parser exposing these operations can stand in.
//!
//! [`ParsedDocument`] is the production implementation, backed by
//! `dom_query` (html5ever). Parsing never fails: malformed markup is
//! recovered the way a browser would.

use dom_query::{Document, Selection};

/// Operations on a single element.
pub trait HtmlNode: Sized {
    /// First descendant matching `selector`.
    fn select_first(&self, selector: &str) -> Option<Self>;

    /// Every descendant matching `selector`, in document order.
    fn select_all(&self, selector: &str) -> Vec<Self>;

    /// Number of descendants matching `selector`.
    fn count(&self, selector: &str) -> usize {
        self.select_all(selector).len()
    }

    /// Concatenated text of the element and all descendants.
    fn text_content(&self) -> String;

    /// The element serialized back to HTML, tags included.
    fn outer_html(&self) -> String;

    /// Lowercase tag name.
    fn tag_name(&self) -> Option<String>;

    /// Detach every descendant matching `selector`; returns how many matched.
    fn remove_descendants(&self, selector: &str) -> usize;
}

/// Read-only operations on a parsed document.
pub trait HtmlDocument {
    type Node<'a>: HtmlNode
    where
        Self: 'a;

    /// First element in the document matching `selector`.
    fn select_first(&self, selector: &str) -> Option<Self::Node<'_>>;

    /// Every element in the document matching `selector`, in document order.
    fn select_all(&self, selector: &str) -> Vec<Self::Node<'_>>;

    /// The `<body>` element, if the document has one.
    fn body(&self) -> Option<Self::Node<'_>>;

    /// The root `<html>` element.
    fn document_element(&self) -> Option<Self::Node<'_>>;
}

/// An HTML document parsed by `dom_query`.
pub struct ParsedDocument {
    inner: Document,
}

impl ParsedDocument {
    /// Parse `html` into a document.
    pub fn parse(html: &str) -> Self {
        Self {
            inner: Document::from(html),
        }
    }
}

fn non_empty(sel: Selection<'_>) -> Option<Selection<'_>> {
    if sel.exists() {
        Some(sel.first())
    } else {
        None
    }
}

impl<'a> HtmlNode for Selection<'a> {
    fn select_first(&self, selector: &str) -> Option<Self> {
        non_empty(self.select(selector))
    }

    fn select_all(&self, selector: &str) -> Vec<Self> {
        self.select(selector).iter().collect()
    }

    fn count(&self, selector: &str) -> usize {
        self.select(selector).length()
    }

    fn text_content(&self) -> String {
        self.text().to_string()
    }

    fn outer_html(&self) -> String {
        self.html().to_string()
    }

    fn tag_name(&self) -> Option<String> {
        self.nodes()
            .first()
            .and_then(dom_query::NodeRef::node_name)
            .map(|t| t.to_string())
    }

    fn remove_descendants(&self, selector: &str) -> usize {
        let found = self.select(selector);
        let n = found.length();
        found.remove();
        n
    }
}

impl HtmlDocument for ParsedDocument {
    type Node<'a> = Selection<'a>;

    fn select_first(&self, selector: &str) -> Option<Selection<'_>> {
        non_empty(self.inner.select(selector))
    }

    fn select_all(&self, selector: &str) -> Vec<Selection<'_>> {
        self.inner.select(selector).iter().collect()
    }

    fn body(&self) -> Option<Selection<'_>> {
        non_empty(self.inner.select("body"))
    }

    fn document_element(&self) -> Option<Selection<'_>> {
        non_empty(self.inner.select("html"))
    }
}
