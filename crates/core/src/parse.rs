//! HTML parsing and document access.
//!
//! This module provides the [`Document`] type: a parsed HTML page backed by
//! an arena [`DomTree`] that can be walked, cloned and rewritten.
//!
//! # Example
//!
//! ```rust
//! use quire_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title>Title</title></head>
//!         <body><h1>Title</h1></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.title(), Some("Title".to_string()));
//! ```

use scraper::Html;

use crate::Result;
use crate::dom_tree::{DomTree, NodeId, NodePath};

/// Represents a parsed HTML document.
///
/// The parser always produces a complete `html/head/body` skeleton, so
/// [`Document::head`] and [`Document::body`] are only `None` for trees
/// assembled by hand.
///
/// # Example
///
/// ```rust
/// use quire_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// # Arguments
    ///
    /// * `html` - The HTML content to parse
    ///
    /// # Example
    ///
    /// ```rust
    /// use quire_core::parse::Document;
    ///
    /// let html = "<html><body><h1>Title</h1></body></html>";
    /// let doc = Document::parse(html).unwrap();
    /// assert!(doc.body().is_some());
    /// ```
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { tree: DomTree::from_html(&html) })
    }

    /// Wraps an existing tree.
    pub fn from_tree(tree: DomTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// The `<html>` element.
    pub fn root_element(&self) -> Option<NodeId> {
        self.tree.children(self.tree.root()).iter().copied().find(|&id| self.tree.node(id).is_element())
    }

    pub fn head(&self) -> Option<NodeId> {
        self.child_of_root_element("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.child_of_root_element("body")
    }

    fn child_of_root_element(&self, name: &str) -> Option<NodeId> {
        let root = self.root_element()?;
        self.tree.children(root).iter().copied().find(|&id| self.tree.is_named(id, name))
    }

    /// Gets the title of the document.
    ///
    /// Returns the trimmed content of the first `<title>` element in the head.
    pub fn title(&self) -> Option<String> {
        let head = self.head()?;
        let title = self.tree.find_element(head, "title")?;
        Some(self.tree.text_content(title).trim().to_string())
    }

    /// Structural path of a node.
    pub fn path(&self, id: NodeId) -> NodePath {
        self.tree.path(id)
    }

    /// Node at a structural path.
    pub fn at_path(&self, path: &NodePath) -> Option<NodeId> {
        self.tree.at_path(path)
    }

    /// Serialises the whole document as HTML.
    pub fn to_html(&self) -> String {
        self.tree.serialize(self.tree.root())
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.tree.text_content(self.tree.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Test Page</title>
</head>
<body>
    <h1>Heading</h1>
    <p class="content">Paragraph 1</p>
    <p class="content">Paragraph 2</p>
</body>
</html>"#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_skeleton_accessors() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.path(body), NodePath::from("/html/body"));
        assert_eq!(doc.at_path(&NodePath::from("/html/head")), doc.head());
        assert_eq!(doc.tree().attr(doc.root_element().unwrap(), "lang"), Some("en"));
    }

    #[test]
    fn test_parser_supplies_missing_skeleton() {
        let doc = Document::parse("<p>A floating para.</p>").unwrap();
        assert!(doc.head().is_some());
        let body = doc.body().unwrap();
        assert_eq!(doc.tree().serialize(body), "<body><p>A floating para.</p></body>");
    }

    #[test]
    fn test_text_content() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let text = doc.text_content();

        assert!(text.contains("Heading"));
        assert!(text.contains("Paragraph 1"));
        assert!(text.contains("Paragraph 2"));
    }

    #[test]
    fn test_to_html_is_stable() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let reparsed = Document::parse(&doc.to_html()).unwrap();
        assert_eq!(doc.to_html(), reparsed.to_html());
    }
}
