//! Splitting one document into several files.
//!
//! A node can become a standalone file (a [`Component`]) when it is
//! article-like (`article`, `body`, `div.article`) and so is every sibling
//! that follows it. Without the second rule, splitting out an article would
//! strand the non-article content after it.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::classify::is_article_like;
use crate::dom_tree::{DomTree, NodeData, NodeId, NodePath};
use crate::parse::Document;
use crate::{QuireError, Result};

/// File name of the component at `index` in the component list.
///
/// ```rust
/// use quire_core::component_uri;
///
/// assert_eq!(component_uri(0), "index.html");
/// assert_eq!(component_uri(12), "part012.html");
/// ```
pub fn component_uri(index: usize) -> String {
    if index == 0 { "index.html".to_string() } else { format!("part{:03}.html", index) }
}

/// One physical file's worth of a book.
#[derive(Debug, Clone)]
pub struct Component {
    /// URI of the file, e.g. `part001.html`.
    pub src: String,
    /// Path of the subtree the component was cut from.
    pub path: NodePath,
    pub document: Document,
}

impl Component {
    /// A component holding a whole document, keyed by its body.
    pub fn whole(src: impl Into<String>, document: Document) -> Self {
        let path = document.body().map(|b| document.path(b)).unwrap_or_else(NodePath::root);
        Self { src: src.into(), path, document }
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }
}

/// Finds the splittable subtrees of a document and materialises them.
///
/// A componentizer is bound to one source document; create a new one for
/// each document.
///
/// # Example
///
/// ```rust
/// use quire_core::{Componentizer, Document};
///
/// let doc = Document::parse("<h1>A</h1><article><h2>B</h2></article>").unwrap();
/// let mut componentizer = Componentizer::new(&doc);
/// let paths = componentizer.process(doc.body().unwrap()).to_vec();
/// assert_eq!(paths.len(), 2);
///
/// let part = componentizer.generate_component(&paths[1]).unwrap();
/// assert!(part.to_html().contains("<body><article><h2>B</h2></article></body>"));
/// ```
pub struct Componentizer<'a> {
    document: &'a Document,
    component_paths: Vec<NodePath>,
    shell: Option<Document>,
}

impl<'a> Componentizer<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document, component_paths: Vec::new(), shell: None }
    }

    /// Paths returned by the last [`Componentizer::process`] call.
    pub fn component_paths(&self) -> &[NodePath] {
        &self.component_paths
    }

    /// Collects the paths of every splittable node at or below `from`, in
    /// document order.
    ///
    /// Nodes whose children are all components themselves (or blank text)
    /// are dropped, since their file would be empty.
    pub fn process(&mut self, from: NodeId) -> &[NodePath] {
        let document = self.document;
        let tree = document.tree();
        let mut found = Vec::new();
        let mut stack = vec![from];

        while let Some(id) = stack.pop() {
            if !self.is_componentizable(id) {
                continue;
            }
            found.push((id, tree.path(id)));
            stack.extend(tree.children(id).iter().rev());
        }

        let recorded: HashSet<NodePath> = found.iter().map(|(_, path)| path.clone()).collect();
        let before = found.len();
        found.retain(|(id, path)| {
            let emptied = Self::is_emptied(tree, *id, &recorded);
            if emptied {
                trace!(%path, "dropping component with no content of its own");
            }
            !emptied
        });

        debug!(components = found.len(), pruned = before - found.len(), "componentized document");
        self.component_paths = found.into_iter().map(|(_, path)| path).collect();
        &self.component_paths
    }

    /// True when `id` is article-like and every following sibling is too.
    ///
    /// Blank text and comments between siblings are ignored.
    pub fn is_componentizable(&self, id: NodeId) -> bool {
        let tree = self.document.tree();
        is_article_like(tree, id)
            && tree.following_siblings(id).iter().all(|&sibling| {
                let node = tree.node(sibling);
                node.is_blank_text() || matches!(node.data, NodeData::Comment(_)) || is_article_like(tree, sibling)
            })
    }

    fn is_emptied(tree: &DomTree, id: NodeId, recorded: &HashSet<NodePath>) -> bool {
        tree.children(id)
            .iter()
            .zip(tree.child_paths(id))
            .all(|(&child, path)| recorded.contains(&path) || tree.node(child).is_blank_text())
    }

    /// Builds the document for one component.
    ///
    /// The result keeps the source's `html` and `head`; its body holds a copy
    /// of the subtree at `path`, minus any nested components (they get their
    /// own files). When `path` is the body itself it replaces the body.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::NotAComponent`] if `path` was not returned by the
    /// last [`Componentizer::process`] call.
    pub fn generate_component(&mut self, path: &NodePath) -> Result<Document> {
        if !self.component_paths.contains(path) {
            return Err(QuireError::NotAComponent(path.clone()));
        }
        let document = self.document;
        let source = document.at_path(path).ok_or_else(|| QuireError::NotAComponent(path.clone()))?;

        let nested: HashSet<NodeId> =
            self.component_paths.iter().filter(|p| *p != path).filter_map(|p| document.at_path(p)).collect();
        let source_is_body = document.body() == Some(source);
        let source_tree = document.tree();

        let mut component = self.shell()?.clone();
        let body = component.body().ok_or(QuireError::MissingElement("body"))?;
        let root = component.root();
        let tree = component.tree_mut();
        let mut skip = |id: NodeId| nested.contains(&id);

        if source_is_body {
            let copy = tree.import_subtree(source_tree, source, root, &mut skip);
            tree.replace(body, copy);
        } else {
            tree.import_subtree(source_tree, source, body, &mut skip);
        }

        Ok(component)
    }

    /// Materialises every component from the last `process` call, named by
    /// [`component_uri`].
    pub fn components(&mut self) -> Result<Vec<Component>> {
        let paths = self.component_paths.clone();
        paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| {
                let document = self.generate_component(&path)?;
                Ok(Component { src: component_uri(index), path, document })
            })
            .collect()
    }

    /// The source document with an empty body, built on first use.
    fn shell(&mut self) -> Result<&Document> {
        if self.shell.is_none() {
            let document = self.document;
            let source = document.tree();
            let body = document.body().ok_or(QuireError::MissingElement("body"))?;

            let mut shell = DomTree::new();
            let root = shell.root();
            for &child in source.children(source.root()) {
                shell.import_subtree(source, child, root, &mut |id| source.get_parent(id) == Some(body));
            }
            self.shell = Some(Document::from_tree(shell));
        }

        self.shell.as_ref().ok_or(QuireError::MissingElement("body"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENTS_1: &str = r#"<!DOCTYPE html>
<html><head><title>Components test 1</title></head><body>
<h1>A</h1>
<article><h2>B</h2>
  <article><h3>C</h3></article>
  <article><h3>D</h3></article>
</article>
<article><h2>E</h2></article>
</body></html>"#;

    const COMPONENTS_2: &str = r#"<!DOCTYPE html>
<html><head><title>Components test 2</title></head><body>
<article><h2>B</h2>
  <article><h3>C</h3></article>
  <article><h3>D</h3></article>
</article>
<article><h2>E</h2>
  <article><h3>F</h3></article>
</article>
</body></html>"#;

    fn paths(doc: &Document) -> Vec<String> {
        let mut componentizer = Componentizer::new(doc);
        componentizer.process(doc.body().unwrap()).iter().map(|p| p.to_string()).collect()
    }

    fn squash(html: &str) -> String {
        html.split_whitespace().collect::<Vec<_>>().join("")
    }

    #[test]
    fn test_processing() {
        let doc = Document::parse(COMPONENTS_1).unwrap();
        assert_eq!(
            paths(&doc),
            vec![
                "/html/body",
                "/html/body/article[1]",
                "/html/body/article[1]/article[1]",
                "/html/body/article[1]/article[2]",
                "/html/body/article[2]",
            ]
        );
    }

    #[test]
    fn test_processing_where_body_should_be_empty() {
        let doc = Document::parse(COMPONENTS_2).unwrap();
        assert_eq!(
            paths(&doc),
            vec![
                "/html/body/article[1]",
                "/html/body/article[1]/article[1]",
                "/html/body/article[1]/article[2]",
                "/html/body/article[2]",
                "/html/body/article[2]/article",
            ]
        );
    }

    #[test]
    fn test_trailing_non_article_blocks_split() {
        let doc = Document::parse("<article>1</article><article>2</article><div>tail</div>").unwrap();
        let componentizer = Componentizer::new(&doc);
        let tree = doc.tree();
        let body = doc.body().unwrap();
        let articles: Vec<_> = tree.children(body).iter().copied().filter(|&c| tree.is_named(c, "article")).collect();

        assert_eq!(articles.len(), 2);
        assert!(articles.iter().all(|&a| !componentizer.is_componentizable(a)));
        assert_eq!(paths(&doc), vec!["/html/body"]);
    }

    #[test]
    fn test_article_suffix_is_componentizable() {
        let doc = Document::parse("<p>intro</p><article>1</article><article>2</article>").unwrap();
        assert_eq!(paths(&doc), vec!["/html/body", "/html/body/article[1]", "/html/body/article[2]"]);
    }

    #[test]
    fn test_generate_component() {
        let doc = Document::parse(COMPONENTS_1).unwrap();
        let mut componentizer = Componentizer::new(&doc);
        componentizer.process(doc.body().unwrap());

        let part = componentizer.generate_component(&NodePath::from("/html/body/article[1]")).unwrap();
        assert_eq!(
            squash(&part.to_html()),
            squash(
                "<!DOCTYPE html><html><head><title>Components test 1</title></head>\
                 <body><article><h2>B</h2></article></body></html>"
            )
        );
    }

    #[test]
    fn test_generate_body_component_replaces_body() {
        let doc = Document::parse(COMPONENTS_1).unwrap();
        let mut componentizer = Componentizer::new(&doc);
        componentizer.process(doc.body().unwrap());

        let index = componentizer.generate_component(&NodePath::from("/html/body")).unwrap();
        assert_eq!(
            squash(&index.to_html()),
            squash("<!DOCTYPE html><html><head><title>Components test 1</title></head><body><h1>A</h1></body></html>")
        );
    }

    #[test]
    fn test_generate_is_deterministic() {
        let doc = Document::parse(COMPONENTS_2).unwrap();
        let mut componentizer = Componentizer::new(&doc);
        componentizer.process(doc.body().unwrap());
        let path = NodePath::from("/html/body/article[2]");

        let first = componentizer.generate_component(&path).unwrap().to_html();
        let second = componentizer.generate_component(&path).unwrap().to_html();
        assert_eq!(first, second);
        assert!(!first.contains("<h3>F</h3>"));
    }

    #[test]
    fn test_not_a_component() {
        let doc = Document::parse(COMPONENTS_1).unwrap();
        let mut componentizer = Componentizer::new(&doc);
        componentizer.process(doc.body().unwrap());

        let result = componentizer.generate_component(&NodePath::from("/html/body/h1"));
        assert!(matches!(result, Err(QuireError::NotAComponent(p)) if p.as_str() == "/html/body/h1"));
    }

    #[test]
    fn test_components_are_named_in_order() {
        let doc = Document::parse(COMPONENTS_1).unwrap();
        let mut componentizer = Componentizer::new(&doc);
        componentizer.process(doc.body().unwrap());

        let srcs: Vec<_> = componentizer.components().unwrap().into_iter().map(|c| c.src).collect();
        assert_eq!(srcs, vec!["index.html", "part001.html", "part002.html", "part003.html", "part004.html"]);
    }
}
