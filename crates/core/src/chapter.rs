//! Projection of an [`Outline`] onto the public chapter tree.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::componentize::component_uri;
use crate::dom_tree::{DomTree, NodeId, NodePath};
use crate::outline::{Outline, SectionId};

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]").unwrap());

/// An addressable entry in a book's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    /// 1-based pre-order rank across the whole chapter tree.
    pub position: usize,
    /// Component URI, possibly with a `#fragment`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Chapter>,
}

impl Chapter {
    /// Creates a chapter, turning line breaks in the title into spaces.
    pub fn new(title: Option<&str>, position: usize, src: Option<String>) -> Self {
        Self {
            title: title.map(|t| LINE_BREAK.replace_all(t, " ").into_owned()),
            position,
            src,
            children: Vec::new(),
        }
    }

    /// True when neither this chapter nor any chapter below it can be linked to.
    ///
    /// Tables of contents leave such chapters out.
    pub fn empty_leaf(&self) -> bool {
        self.src.is_none() && self.children.iter().all(Chapter::empty_leaf)
    }

    /// Number of chapters in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Chapter::count).sum::<usize>()
    }
}

/// Turns sections into chapters whose `src` points at the component holding
/// each section.
///
/// # Example
///
/// ```rust
/// use quire_core::{ChapterProjector, Document, NodePath, Outliner};
///
/// let doc = Document::parse(r#"<h1>Book</h1><article><h2 id="one">One</h2></article>"#).unwrap();
/// let outline = Outliner::new(doc.tree()).process(doc.root());
/// let paths = [NodePath::from("/html/body")];
///
/// let chapters = ChapterProjector::new(doc.tree(), &paths).project(&outline);
/// assert_eq!(chapters[0].children[0].src.as_deref(), Some("index.html#one"));
/// ```
pub struct ChapterProjector<'a> {
    tree: &'a DomTree,
    uris: HashMap<&'a NodePath, String>,
}

impl<'a> ChapterProjector<'a> {
    /// `component_paths` is the ordered list from
    /// [`Componentizer::process`](crate::Componentizer::process); index 0 is
    /// the index file.
    pub fn new(tree: &'a DomTree, component_paths: &'a [NodePath]) -> Self {
        let uris = component_paths.iter().enumerate().map(|(index, path)| (path, component_uri(index))).collect();
        Self { tree, uris }
    }

    /// Projects every non-empty section of `outline`.
    ///
    /// A lone untitled top-level section is unwrapped (repeatedly) so that a
    /// whole-document wrapper does not show up as a chapter.
    pub fn project(&self, outline: &Outline) -> Vec<Chapter> {
        let mut top = self.visible_children(outline, outline.root());
        while top.len() == 1 && outline.section(top[0]).title().is_none() {
            top = self.visible_children(outline, top[0]);
        }

        let mut position = 0;
        let chapters: Vec<Chapter> = top.into_iter().map(|id| self.project_section(outline, id, &mut position)).collect();
        debug!(chapters = position, "projected outline");
        chapters
    }

    fn visible_children(&self, outline: &Outline, id: SectionId) -> Vec<SectionId> {
        outline.children(id).iter().copied().filter(|&child| !outline.is_empty_section(child)).collect()
    }

    fn project_section(&self, outline: &Outline, id: SectionId, position: &mut usize) -> Chapter {
        *position += 1;
        let section = outline.section(id);
        let mut chapter = Chapter::new(section.title(), *position, self.resolve_src(outline, id));

        for child in self.visible_children(outline, id) {
            chapter.children.push(self.project_section(outline, child, position));
        }
        chapter
    }

    /// URI of the nearest enclosing component, plus the heading's id as a fragment.
    fn resolve_src(&self, outline: &Outline, id: SectionId) -> Option<String> {
        let section = outline.section(id);
        let start = section.node.or(section.heading.as_ref().map(|h| h.node))?;
        let base = self.enclosing_component(start)?;

        let fragment =
            section.heading.as_ref().and_then(|h| self.tree.attr(h.node, "id")).filter(|anchor| !anchor.is_empty());
        match fragment {
            Some(fragment) => Some(format!("{}#{}", base, fragment)),
            None => Some(base.to_string()),
        }
    }

    fn enclosing_component(&self, from: NodeId) -> Option<&str> {
        let mut current = Some(from);
        while let Some(id) = current {
            if let Some(uri) = self.uris.get(&self.tree.path(id)) {
                return Some(uri.as_str());
            }
            current = self.tree.get_parent(id);
        }
        None
    }
}
