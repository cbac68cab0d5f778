//! Merging several source documents into one.

use tracing::{debug, trace};

use crate::dom_tree::{NodeData, NodeId};
use crate::parse::Document;
use crate::{QuireError, Result};

/// Stitches documents into a single index document.
///
/// A single document is returned as-is. With more than one, the body of each
/// document (the first included) is wrapped in its own `article`, in order,
/// inside the first document's body. Head children of later documents that
/// the first document's head lacks are appended to it; `title` elements are
/// never merged.
///
/// # Errors
///
/// Returns [`QuireError::NoContent`] for an empty list, and
/// [`QuireError::MissingElement`] if a document has no `body`.
///
/// # Example
///
/// ```rust
/// use quire_core::{Document, stitch};
///
/// let docs = vec![
///     Document::parse("<p>One</p>").unwrap(),
///     Document::parse("<p>Two</p>").unwrap(),
/// ];
/// let index = stitch(&docs).unwrap();
/// let body = index.tree().serialize(index.body().unwrap());
/// assert_eq!(body, "<body><article><p>One</p></article><article><p>Two</p></article></body>");
/// ```
pub fn stitch(documents: &[Document]) -> Result<Document> {
    let (first, rest) = documents.split_first().ok_or(QuireError::NoContent)?;
    if rest.is_empty() {
        return Ok(first.clone());
    }

    let mut index = first.clone();
    let body = index.body().ok_or(QuireError::MissingElement("body"))?;
    let head = index.head().ok_or(QuireError::MissingElement("head"))?;
    index.tree_mut().clear_children(body);

    for document in documents {
        wrap_body(&mut index, body, document)?;
    }
    for document in rest {
        merge_head(&mut index, head, document);
    }

    debug!(documents = documents.len(), "stitched documents");
    Ok(index)
}

fn wrap_body(index: &mut Document, body: NodeId, source: &Document) -> Result<()> {
    let source_body = source.body().ok_or(QuireError::MissingElement("body"))?;
    let source_tree = source.tree();
    let tree = index.tree_mut();

    let article = tree.append(body, NodeData::element("article", &[]));
    for &child in source_tree.children(source_body) {
        tree.import_subtree(source_tree, child, article, &mut |_| false);
    }
    Ok(())
}

fn merge_head(index: &mut Document, head: NodeId, source: &Document) {
    let Some(source_head) = source.head() else {
        return;
    };
    let source_tree = source.tree();

    for &child in source_tree.children(source_head) {
        let node = source_tree.node(child);
        if node.is_blank_text() || source_tree.is_named(child, "title") {
            continue;
        }

        let tree = index.tree();
        if tree.children(head).iter().any(|&existing| tree.same_structure(existing, source_tree, child)) {
            continue;
        }

        trace!(element = node.name().unwrap_or("#text"), "merging head child");
        index.tree_mut().import_subtree(source_tree, child, head, &mut |_| false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whitewash(html: &str) -> String {
        html.split_whitespace().collect::<Vec<_>>().join(" ").replace("> <", "><")
    }

    #[test]
    fn test_stitching_components() {
        let docs = vec![
            Document::parse("<html><head><title>Index</title></head><body>\n<p>A para</p></body></html>").unwrap(),
            Document::parse(
                "<html><head><title>Foo</title></head><body>\n\
                 <hgroup><h1>Part Foo</h1><h2>Peregrin Took</h2></hgroup>\n\
                 <cite>A cite tag</cite></body></html>",
            )
            .unwrap(),
            Document::parse("<p>A floating para.</p>").unwrap(),
        ];

        let index = stitch(&docs).unwrap();
        assert_eq!(
            whitewash(&index.to_html()),
            whitewash(
                "<html><head><title>Index</title></head><body>
                 <article><p>A para</p></article>
                 <article><hgroup><h1>Part Foo</h1><h2>Peregrin Took</h2></hgroup><cite>A cite tag</cite></article>
                 <article><p>A floating para.</p></article>
                 </body></html>"
            )
        );
    }

    #[test]
    fn test_single_document_is_unchanged() {
        let doc = Document::parse("<html><head></head><body><p>Only</p></body></html>").unwrap();
        let index = stitch(std::slice::from_ref(&doc)).unwrap();
        assert_eq!(index.to_html(), doc.to_html());
    }

    #[test]
    fn test_head_children_merged_once() {
        let docs = vec![
            Document::parse(r#"<head><link rel="stylesheet" href="a.css"></head><p>1</p>"#).unwrap(),
            Document::parse(r#"<head><link rel="stylesheet" href="a.css"><meta name="x" content="y"></head><p>2</p>"#)
                .unwrap(),
            Document::parse(r#"<head><meta name="x" content="y"><title>Ignored</title></head><p>3</p>"#).unwrap(),
        ];

        let index = stitch(&docs).unwrap();
        let head = index.tree().serialize(index.head().unwrap());
        assert_eq!(head, r#"<head><link rel="stylesheet" href="a.css"><meta name="x" content="y"></head>"#);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(stitch(&[]), Err(QuireError::NoContent)));
    }
}
