//! Arena-backed document tree.
//!
//! `scraper` parses HTML into an immutable tree. Splitting a book needs to
//! clone, detach and graft subtrees, so the parsed tree is copied into a
//! [`DomTree`]: a flat `Vec` of [`DomNode`]s addressed by [`NodeId`], each
//! node carrying its parent and ordered children.
//!
//! Every node also has a [`NodePath`], an XPath-like string such as
//! `/html/body/article[2]` that identifies its position in the tree.

use std::collections::HashMap;
use std::fmt;
use std::io;

use html5ever::serialize::{Serialize as HtmlSerialize, SerializeOpts, Serializer, TraversalScope, serialize};
use html5ever::{LocalName, QualName, ns};
use serde::{Deserialize, Serialize};

/// Index of a node inside a [`DomTree`].
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// Structural identity of a node: equal for equal tree positions, distinct otherwise.
///
/// Segments are element names (`article`), `text()` or `comment()`. A 1-based
/// `[n]` index is appended only when the parent has several children with the
/// same segment name, so `/html/body/article[1]` and `/html/body/article[2]`
/// are siblings while a lone child is simply `/html/body/article`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(String);

impl NodePath {
    /// Path of the document node itself.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends one segment.
    pub fn child(&self, segment: &str) -> Self {
        if self.0 == "/" { Self(format!("/{}", segment)) } else { Self(format!("{}/{}", self.0, segment)) }
    }

    /// Iterates over the non-empty segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodePath {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodePath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Doctype { name: String, public_id: String, system_id: String },
    Element { name: String, attrs: Vec<(String, String)> },
    Text(String),
    Comment(String),
}

impl NodeData {
    /// Creates an element with a lower-cased name.
    pub fn element(name: &str, attrs: &[(&str, &str)]) -> Self {
        NodeData::Element {
            name: name.to_ascii_lowercase(),
            attrs: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    pub fn text(text: &str) -> Self {
        NodeData::Text(text.to_string())
    }

    /// Name used for this node in a [`NodePath`] segment.
    fn segment_name(&self) -> &str {
        match self {
            NodeData::Document => "",
            NodeData::Doctype { .. } => "doctype()",
            NodeData::Element { name, .. } => name,
            NodeData::Text(_) => "text()",
            NodeData::Comment(_) => "comment()",
        }
    }
}

/// A node in the DOM tree
#[derive(Debug, Clone)]
pub struct DomNode {
    /// Node payload
    pub data: NodeData,
    /// Parent node ID (if any)
    pub parent_id: Option<NodeId>,
    /// Child node IDs
    pub child_ids: Vec<NodeId>,
}

impl DomNode {
    /// Lower-case tag name for elements.
    pub fn name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attribute value, matched case-insensitively on the attribute name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match &self.data {
            NodeData::Element { attrs, .. } => {
                attrs.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v.as_str())
            }
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    /// True for text nodes holding only whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(&self.data, NodeData::Text(text) if text.trim().is_empty())
    }
}

/// A DOM tree structure that tracks parent-child relationships
///
/// Node 0 is always the document node. Detached nodes stay in the arena but
/// are no longer reachable from the root.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    /// Create a tree holding only a document node
    pub fn new() -> Self {
        Self { nodes: vec![DomNode { data: NodeData::Document, parent_id: None, child_ids: Vec::new() }] }
    }

    /// Copies a parsed `scraper` document into an arena.
    pub fn from_html(html: &scraper::Html) -> Self {
        let mut tree = Self::new();
        let mut ids = HashMap::new();

        for node in html.tree.root().descendants() {
            let data = match node.value() {
                scraper::Node::Document | scraper::Node::Fragment => {
                    ids.insert(node.id(), ROOT);
                    continue;
                }
                scraper::Node::Doctype(doctype) => NodeData::Doctype {
                    name: doctype.name().to_string(),
                    public_id: doctype.public_id().to_string(),
                    system_id: doctype.system_id().to_string(),
                },
                scraper::Node::Element(element) => NodeData::Element {
                    name: element.name().to_ascii_lowercase(),
                    attrs: element.attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                },
                scraper::Node::Text(text) => NodeData::Text(text.to_string()),
                scraper::Node::Comment(comment) => NodeData::Comment(comment.to_string()),
                _ => continue,
            };

            let parent = node.parent().and_then(|p| ids.get(&p.id()).copied()).unwrap_or(ROOT);
            let id = tree.append(parent, data);
            ids.insert(node.id(), id);
        }

        tree
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id)
    }

    /// Node by ID. IDs handed out by this tree are always valid.
    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id]
    }

    /// Get the parent of a node
    pub fn get_parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent_id
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].child_ids
    }

    /// Lower-case element name.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id)?.name()
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.nodes.get(id)?.attr(key)
    }

    /// Case-insensitive element name check.
    pub fn is_named(&self, id: NodeId, name: &str) -> bool {
        self.name(id).is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// Siblings after `id`, in document order.
    pub fn following_siblings(&self, id: NodeId) -> &[NodeId] {
        let Some(parent) = self.get_parent(id) else {
            return &[];
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&s| s == id) {
            Some(pos) => &siblings[pos + 1..],
            None => &[],
        }
    }

    /// Pre-order iterator over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants { tree: self, stack: vec![id] }
    }

    /// First element named `name` at or below `from`, in document order.
    pub fn find_element(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(from).find(|&id| self.is_named(id, name))
    }

    /// Concatenation of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|d| match &self.nodes[d].data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Path segments of every child of `id`, aligned with `children(id)`.
    pub fn child_segments(&self, id: NodeId) -> Vec<String> {
        let children = self.children(id);
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for &child in children {
            *totals.entry(self.nodes[child].data.segment_name()).or_default() += 1;
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        children
            .iter()
            .map(|&child| {
                let name = self.nodes[child].data.segment_name();
                let index = seen.entry(name).or_default();
                *index += 1;
                if totals.get(name).copied().unwrap_or(0) > 1 { format!("{}[{}]", name, index) } else { name.to_string() }
            })
            .collect()
    }

    /// Paths of every child of `id`, aligned with `children(id)`.
    pub fn child_paths(&self, id: NodeId) -> Vec<NodePath> {
        let base = self.path(id);
        self.child_segments(id).iter().map(|segment| base.child(segment)).collect()
    }

    /// Structural path of a node.
    pub fn path(&self, id: NodeId) -> NodePath {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(parent) = self.get_parent(current) {
            if let Some(pos) = self.children(parent).iter().position(|&c| c == current) {
                segments.push(self.child_segments(parent).swap_remove(pos));
            }
            current = parent;
        }

        segments.iter().rev().fold(NodePath::root(), |path, segment| path.child(segment))
    }

    /// Resolves a path produced by [`DomTree::path`] back to a node.
    pub fn at_path(&self, path: &NodePath) -> Option<NodeId> {
        let mut current = ROOT;
        for segment in path.segments() {
            let pos = self.child_segments(current).iter().position(|s| s == segment)?;
            current = self.children(current)[pos];
        }
        Some(current)
    }

    /// Add a node as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(DomNode { data, parent_id: Some(parent), child_ids: Vec::new() });
        self.nodes[parent].child_ids.push(id);
        id
    }

    /// Unlinks a node from its parent. The subtree stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent_id.take() {
            self.nodes[parent].child_ids.retain(|&c| c != id);
        }
    }

    /// Detaches every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in std::mem::take(&mut self.nodes[id].child_ids) {
            self.nodes[child].parent_id = None;
        }
    }

    /// Puts the detached node `new` where `old` is, detaching `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.detach(new);
        let Some(parent) = self.nodes[old].parent_id.take() else {
            return;
        };
        for child in self.nodes[parent].child_ids.iter_mut() {
            if *child == old {
                *child = new;
            }
        }
        self.nodes[new].parent_id = Some(parent);
    }

    /// Sets or overwrites an attribute on an element.
    pub fn set_attr(&mut self, id: NodeId, key: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id].data {
            match attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                Some(existing) => existing.1 = value.to_string(),
                None => attrs.push((key.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, key: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id].data {
            attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        }
    }

    /// Deep-copies `src_id` from `src` under `parent` and returns the copy's ID.
    ///
    /// Descendants (never `src_id` itself) for which `skip` returns true are
    /// left out together with their subtrees.
    pub fn import_subtree<F>(&mut self, src: &DomTree, src_id: NodeId, parent: NodeId, skip: &mut F) -> NodeId
    where
        F: FnMut(NodeId) -> bool,
    {
        let copy = self.append(parent, src.nodes[src_id].data.clone());
        let mut pending: Vec<(NodeId, NodeId)> = src.children(src_id).iter().rev().map(|&c| (c, copy)).collect();
        while let Some((child, dest_parent)) = pending.pop() {
            if skip(child) {
                continue;
            }
            let id = self.append(dest_parent, src.nodes[child].data.clone());
            pending.extend(src.children(child).iter().rev().map(|&c| (c, id)));
        }
        copy
    }

    /// Serialises `id` and its subtree as HTML.
    pub fn serialize(&self, id: NodeId) -> String {
        let mut bytes = Vec::new();
        let opts = SerializeOpts { traversal_scope: TraversalScope::IncludeNode, ..Default::default() };
        // Writing into a Vec cannot fail.
        if serialize(&mut bytes, &SerializableNode { tree: self, id }, opts).is_err() {
            return String::new();
        }
        String::from_utf8(bytes).unwrap_or_default()
    }

    /// True when both subtrees serialise identically.
    pub fn same_structure(&self, id: NodeId, other: &DomTree, other_id: NodeId) -> bool {
        self.serialize(id) == other.serialize(other_id)
    }

    /// Get the total number of nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].child_ids.is_empty()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order walk driven by an explicit stack.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev());
        Some(id)
    }
}

/// A subtree handed to the `html5ever` serializer.
///
/// Elements are emitted in the HTML namespace so void elements and raw text
/// (`script`, `style`, `noscript` and friends) follow the HTML serialisation
/// rules.
struct SerializableNode<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

enum Step {
    Open(NodeId),
    Close(QualName),
}

impl HtmlSerialize for SerializableNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: &mut S, scope: TraversalScope) -> io::Result<()> {
        let mut steps = match scope {
            TraversalScope::IncludeNode => vec![Step::Open(self.id)],
            TraversalScope::ChildrenOnly(_) => {
                self.tree.children(self.id).iter().rev().map(|&c| Step::Open(c)).collect()
            }
        };

        while let Some(step) = steps.pop() {
            let id = match step {
                Step::Close(name) => {
                    serializer.end_elem(name)?;
                    continue;
                }
                Step::Open(id) => id,
            };

            match &self.tree.nodes[id].data {
                NodeData::Document => {}
                NodeData::Doctype { name, .. } => serializer.write_doctype(name)?,
                NodeData::Element { name, attrs } => {
                    let qual = QualName::new(None, ns!(html), LocalName::from(name.as_str()));
                    let attrs: Vec<(QualName, &str)> = attrs
                        .iter()
                        .map(|(k, v)| (QualName::new(None, ns!(), LocalName::from(k.as_str())), v.as_str()))
                        .collect();
                    serializer.start_elem(qual.clone(), attrs.iter().map(|(k, v)| (k, *v)))?;
                    steps.push(Step::Close(qual));
                }
                NodeData::Text(text) => serializer.write_text(text)?,
                NodeData::Comment(comment) => serializer.write_comment(comment)?,
            }
            steps.extend(self.tree.children(id).iter().rev().map(|&c| Step::Open(c)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> DomTree {
        DomTree::from_html(&scraper::Html::parse_document(html))
    }

    #[test]
    fn test_build_dom_tree() {
        let tree = parse("<html><body><article><p>Test paragraph</p></article></body></html>");
        assert!(!tree.is_empty());
        let article = tree.find_element(tree.root(), "article").unwrap();
        let p = tree.find_element(article, "p").unwrap();
        assert_eq!(tree.get_parent(p), Some(article));
        assert_eq!(tree.text_content(article), "Test paragraph");
    }

    #[test]
    fn test_paths_index_only_repeated_names() {
        let tree = parse("<html><body><h1>A</h1><article>1</article><article>2</article></body></html>");
        let body = tree.find_element(tree.root(), "body").unwrap();
        let paths = tree.child_paths(body);
        assert_eq!(
            paths,
            vec![
                NodePath::from("/html/body/h1"),
                NodePath::from("/html/body/article[1]"),
                NodePath::from("/html/body/article[2]"),
            ]
        );
        assert_eq!(tree.path(body), NodePath::from("/html/body"));
    }

    #[test]
    fn test_path_round_trips_through_at_path() {
        let tree = parse("<html><body><div><p>a</p>text<p>b</p></div></body></html>");
        for id in tree.descendants(tree.root()) {
            assert_eq!(tree.at_path(&tree.path(id)), Some(id));
        }
    }

    #[test]
    fn test_at_path_unknown() {
        let tree = parse("<html><body></body></html>");
        assert_eq!(tree.at_path(&NodePath::from("/html/body/article[3]")), None);
    }

    #[test]
    fn test_serialize_escapes_and_void_elements() {
        let tree = parse(r#"<!DOCTYPE html><html><head><meta name="a" content="x&quot;y"></head><body><p>1 &lt; 2</p><br></body></html>"#);
        let html = tree.serialize(tree.root());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<meta name="a" content="x&quot;y">"#));
        assert!(html.contains("<p>1 &lt; 2</p>"));
        assert!(html.contains("<br></body>"));
        assert!(!html.contains("</meta>"));
    }

    #[test]
    fn test_raw_text_is_not_escaped() {
        let tree = parse("<html><head><script>if (a < b) {}</script></head><body></body></html>");
        assert!(tree.serialize(tree.root()).contains("<script>if (a < b) {}</script>"));
    }

    #[test]
    fn test_noscript_survives_repeated_round_trips() {
        let html = "<html><head></head><body><noscript><p>Enable JS & reload</p></noscript></body></html>";
        let first = parse(html).serialize(ROOT);
        let second = parse(&first).serialize(ROOT);
        assert_eq!(first, second);
        assert!(first.contains("<noscript><p>Enable JS & reload</p></noscript>"));
        assert!(!first.contains("&lt;p&gt;"));
    }

    #[test]
    fn test_deep_nesting_serializes_and_imports() {
        let depth = 20_000;
        let html = format!("<html><body>{}x{}</body></html>", "<div>".repeat(depth), "</div>".repeat(depth));
        let tree = parse(&html);
        let body = tree.find_element(tree.root(), "body").unwrap();

        let out = tree.serialize(body);
        assert_eq!(out.matches("<div>").count(), depth);
        assert!(out.ends_with("</div></body>"));

        let mut dest = DomTree::new();
        let copy = dest.import_subtree(&tree, body, dest.root(), &mut |_| false);
        assert_eq!(dest.serialize(copy), out);
    }

    #[test]
    fn test_import_keeps_child_order_and_skips_subtrees() {
        let src = parse("<html><body><ul><li>a<b>1</b></li><li>b</li><li>c<i>2</i></li></ul></body></html>");
        let ul = src.find_element(src.root(), "ul").unwrap();
        let bold = src.find_element(ul, "b").unwrap();

        let mut dest = DomTree::new();
        let copy = dest.import_subtree(&src, ul, dest.root(), &mut |id| id == bold);
        assert_eq!(dest.serialize(copy), "<ul><li>a</li><li>b</li><li>c<i>2</i></li></ul>");
    }

    #[test]
    fn test_detach_and_import() {
        let src = parse("<html><body><article><p>keep</p><section>drop</section></article></body></html>");
        let article = src.find_element(src.root(), "article").unwrap();
        let section = src.find_element(article, "section").unwrap();

        let mut dest = DomTree::new();
        let copy = dest.import_subtree(&src, article, dest.root(), &mut |id| id == section);
        assert_eq!(dest.serialize(copy), "<article><p>keep</p></article>");

        dest.detach(copy);
        assert!(dest.is_empty());
    }

    #[test]
    fn test_following_siblings() {
        let tree = parse("<html><body><a>1</a><b>2</b><i>3</i></body></html>");
        let b = tree.find_element(tree.root(), "b").unwrap();
        let following: Vec<_> = tree.following_siblings(b).iter().filter_map(|&id| tree.name(id)).collect();
        assert_eq!(following, vec!["i"]);
    }
}
