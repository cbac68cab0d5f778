use crate::chapter::Chapter;
use crate::dom_tree::{DomTree, NodeData, NodeId};
use crate::formatters::linkable;

/// Configuration for HTML navigation output
#[derive(Debug, Clone, Default)]
pub struct HtmlConfig {
    /// Wrap the list in `<nav>`
    pub wrap_nav: bool,
}

/// HTML formatter producing nested `<ol>` navigation lists
pub struct HtmlFormatter {
    config: HtmlConfig,
}

impl HtmlFormatter {
    pub fn new(config: HtmlConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, chapters: &[Chapter]) -> String {
        convert_to_html(chapters, &self.config)
    }
}

/// Renders chapters as `<ol><li>` items, titles linked to their `src`.
///
/// Returns an empty string when no chapter can be linked to.
pub fn convert_to_html(chapters: &[Chapter], config: &HtmlConfig) -> String {
    let chapters = linkable(chapters);
    if chapters.is_empty() {
        return String::new();
    }

    let mut tree = DomTree::new();
    let mut parent = tree.root();
    if config.wrap_nav {
        parent = tree.append(parent, NodeData::element("nav", &[]));
    }
    append_list(&mut tree, parent, &chapters);
    tree.serialize(tree.root())
}

fn append_list(tree: &mut DomTree, parent: NodeId, chapters: &[Chapter]) {
    let list = tree.append(parent, NodeData::element("ol", &[]));
    for chapter in chapters {
        let item = tree.append(list, NodeData::element("li", &[]));
        let title = chapter.title.as_deref().unwrap_or("Untitled");
        let label = match &chapter.src {
            Some(src) => tree.append(item, NodeData::element("a", &[("href", src.as_str())])),
            None => tree.append(item, NodeData::element("span", &[])),
        };
        tree.append(label, NodeData::text(title));

        if !chapter.children.is_empty() {
            append_list(tree, item, &chapter.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_to_html() {
        let mut top = Chapter::new(Some("Fish & Chips"), 1, None);
        top.children.push(Chapter::new(Some("Batter"), 2, Some("part001.html#batter".to_string())));

        let html = convert_to_html(&[top], &HtmlConfig { wrap_nav: true });
        assert_eq!(
            html,
            r##"<nav><ol><li><span>Fish &amp; Chips</span><ol><li><a href="part001.html#batter">Batter</a></li></ol></li></ol></nav>"##
        );
    }

    #[test]
    fn test_nothing_linkable() {
        let html = HtmlFormatter::new(HtmlConfig::default()).convert(&[Chapter::new(Some("Lost"), 1, None)]);
        assert!(html.is_empty());
    }
}
