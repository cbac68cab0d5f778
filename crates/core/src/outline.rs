//! Document outlining.
//!
//! Builds a tree of [`Section`]s from heading and sectioning semantics, in
//! the manner of the HTML5 outline algorithm:
//!
//! - a sectioning root (`body`, `blockquote`, ...) starts an isolated outline;
//!   when it ends, the outline it interrupted resumes at its deepest, last
//!   section;
//! - sectioning content (`article`, `section`, ...) starts a nested outline
//!   whose top-level sections are appended, as siblings, to the section that
//!   was current when it started;
//! - inside one scope, a heading ranked the same or higher than the last
//!   top-level section starts a new top-level section, a lower-ranked one
//!   nests under the nearest enclosing section of higher rank.
//!
//! Sections live in an arena owned by the [`Outline`]; parents and children
//! refer to each other by [`SectionId`].

use std::collections::HashMap;

use tracing::trace;

use crate::classify::{NodeKind, classify, heading_text};
use crate::dom_tree::{DomTree, NodeId};

/// Index of a section inside an [`Outline`].
pub type SectionId = usize;

/// Rank of a section that has no heading.
const UNHEADED_RANK: u8 = 1;

/// The heading governing a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub node: NodeId,
    pub rank: u8,
    /// Trimmed heading text; `None` when blank.
    pub text: Option<String>,
}

/// One sectioning scope of the outline.
#[derive(Debug, Clone, Default)]
pub struct Section {
    /// The sectioning element that created this section, if any.
    pub node: Option<NodeId>,
    pub heading: Option<Heading>,
    pub children: Vec<SectionId>,
    /// Enclosing section, used while ranking headings during construction.
    container: Option<SectionId>,
}

impl Section {
    fn new(node: Option<NodeId>) -> Self {
        Self { node, ..Default::default() }
    }

    pub fn title(&self) -> Option<&str> {
        self.heading.as_ref().and_then(|h| h.text.as_deref())
    }

    fn rank(&self) -> u8 {
        self.heading.as_ref().map_or(UNHEADED_RANK, |h| h.rank)
    }
}

/// Result of outlining: a section arena plus the synthetic top section.
#[derive(Debug, Clone)]
pub struct Outline {
    sections: Vec<Section>,
    root: SectionId,
}

impl Outline {
    /// The synthetic top section; its children are the outline's top level.
    pub fn root(&self) -> SectionId {
        self.root
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id]
    }

    pub fn children(&self, id: SectionId) -> &[SectionId] {
        &self.sections[id].children
    }

    /// Enclosing section recorded while the outline was built.
    pub fn container(&self, id: SectionId) -> Option<SectionId> {
        self.sections[id].container
    }

    /// A section is empty when neither it nor any descendant has heading text.
    pub fn is_empty_section(&self, id: SectionId) -> bool {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let section = &self.sections[current];
            if section.title().is_some() {
                return false;
            }
            stack.extend(&section.children);
        }
        true
    }

    /// True when the outline has no titled section at all.
    pub fn is_empty(&self) -> bool {
        self.is_empty_section(self.root)
    }

    /// Renders the outline as nested ordered lists of heading texts.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_list(self.root, &mut out);
        out
    }

    fn write_list(&self, id: SectionId, out: &mut String) {
        let children: Vec<_> = self.children(id).iter().filter(|&&c| !self.is_empty_section(c)).collect();
        if children.is_empty() {
            return;
        }
        out.push_str("<ol>");
        for &child in children {
            out.push_str("<li>");
            if let Some(title) = self.section(child).title() {
                out.push_str(title);
            }
            self.write_list(child, out);
            out.push_str("</li>");
        }
        out.push_str("</ol>");
    }
}

#[derive(Debug, Clone, Copy)]
enum StackEntry {
    Outlinee(NodeId),
    Heading(NodeId),
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId, NodeKind),
}

/// Walks a document tree and builds its [`Outline`].
///
/// # Example
///
/// ```rust
/// use quire_core::{Document, Outliner};
///
/// let doc = Document::parse("<h1>Book</h1><section><h1>Part</h1></section>").unwrap();
/// let outline = Outliner::new(doc.tree()).process(doc.root());
/// assert_eq!(outline.to_html(), "<ol><li>Book<ol><li>Part</li></ol></li></ol>");
/// ```
pub struct Outliner<'a> {
    tree: &'a DomTree,
    sections: Vec<Section>,
    outlinee: Option<NodeId>,
    current: SectionId,
    outlines: HashMap<NodeId, SectionId>,
    stack: Vec<StackEntry>,
}

impl<'a> Outliner<'a> {
    pub fn new(tree: &'a DomTree) -> Self {
        Self {
            tree,
            sections: vec![Section::new(None)],
            outlinee: None,
            current: 0,
            outlines: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Outlines the subtree rooted at `from`.
    ///
    /// When no sectioning element is found the result is a single empty
    /// top section.
    pub fn process(mut self, from: NodeId) -> Outline {
        let mut work = vec![Visit::Enter(from)];
        while let Some(visit) = work.pop() {
            match visit {
                Visit::Enter(id) => {
                    let kind = classify(self.tree, id);
                    self.enter(id, kind);
                    work.push(Visit::Exit(id, kind));
                    work.extend(self.tree.children(id).iter().rev().map(|&c| Visit::Enter(c)));
                }
                Visit::Exit(id, kind) => self.exit(id, kind),
            }
        }

        let root = self.outlinee.and_then(|o| self.outlines.get(&o).copied()).unwrap_or(0);
        Outline { sections: self.sections, root }
    }

    fn enter(&mut self, id: NodeId, kind: NodeKind) {
        if matches!(self.stack.last(), Some(StackEntry::Heading(_))) {
            return;
        }

        match kind {
            NodeKind::SectioningRoot | NodeKind::SectioningContent => {
                if let Some(outlinee) = self.outlinee {
                    self.stack.push(StackEntry::Outlinee(outlinee));
                }
                self.outlinee = Some(id);

                let section = self.push_section(Some(id));
                let top = self.push_section(None);
                self.sections[top].children.push(section);
                self.outlines.insert(id, top);
                self.current = section;
            }
            _ if self.outlinee.is_none() => {}
            NodeKind::Heading { rank } => {
                self.place_heading(id, rank);
                self.stack.push(StackEntry::Heading(id));
            }
            NodeKind::Plain => {}
        }
    }

    fn place_heading(&mut self, id: NodeId, rank: u8) {
        let heading = Heading { node: id, rank, text: heading_text(self.tree, id, rank) };

        if self.sections[self.current].heading.is_none() {
            self.sections[self.current].heading = Some(heading);
            return;
        }

        let top = self.current_top();
        let last_rank = self.sections[top].children.last().map_or(UNHEADED_RANK, |&s| self.sections[s].rank());

        if rank <= last_rank {
            trace!(node = id, rank, "heading opens a new top-level section");
            self.push_top_level(top, heading);
            return;
        }

        let mut candidate = self.current;
        loop {
            if rank > self.sections[candidate].rank() {
                trace!(node = id, rank, parent = candidate, "heading opens a subsection");
                let section = self.push_section(None);
                self.sections[section].heading = Some(heading);
                self.append(candidate, section);
                self.current = section;
                return;
            }
            match self.sections[candidate].container {
                Some(container) => candidate = container,
                None => {
                    self.push_top_level(top, heading);
                    return;
                }
            }
        }
    }

    fn exit(&mut self, id: NodeId, kind: NodeKind) {
        if let Some(StackEntry::Heading(heading)) = self.stack.last() {
            if *heading == id {
                self.stack.pop();
            }
            return;
        }

        match kind {
            NodeKind::SectioningContent if !self.stack.is_empty() => {
                let Some(resumed) = self.resume_outlinee() else {
                    return;
                };
                self.current = self.last_top_level(resumed);
                if let Some(&finished) = self.outlines.get(&id) {
                    for section in self.sections[finished].children.clone() {
                        self.append(self.current, section);
                    }
                }
            }
            NodeKind::SectioningRoot if !self.stack.is_empty() => {
                let Some(resumed) = self.resume_outlinee() else {
                    return;
                };
                let mut section = self.last_top_level(resumed);
                while let Some(&last) = self.sections[section].children.last() {
                    section = last;
                }
                self.current = section;
            }
            NodeKind::SectioningRoot | NodeKind::SectioningContent => {
                let top = self.current_top();
                if let Some(&first) = self.sections[top].children.first() {
                    self.current = first;
                }
            }
            _ => {}
        }
    }

    /// Pops the interrupted outlinee and makes it current again.
    fn resume_outlinee(&mut self) -> Option<NodeId> {
        match self.stack.pop()? {
            StackEntry::Outlinee(node) => {
                self.outlinee = Some(node);
                Some(node)
            }
            StackEntry::Heading(_) => None,
        }
    }

    fn push_section(&mut self, node: Option<NodeId>) -> SectionId {
        self.sections.push(Section::new(node));
        self.sections.len() - 1
    }

    fn push_top_level(&mut self, top: SectionId, heading: Heading) {
        let section = self.push_section(None);
        self.sections[section].heading = Some(heading);
        self.sections[top].children.push(section);
        self.current = section;
    }

    fn append(&mut self, parent: SectionId, child: SectionId) {
        self.sections[child].container = Some(parent);
        self.sections[parent].children.push(child);
    }

    /// Top section of the outline being built.
    fn current_top(&self) -> SectionId {
        self.outlinee.and_then(|o| self.outlines.get(&o).copied()).unwrap_or(0)
    }

    fn last_top_level(&self, outlinee: NodeId) -> SectionId {
        let top = self.outlines.get(&outlinee).copied().unwrap_or(0);
        self.sections[top].children.last().copied().unwrap_or(top)
    }
}
