//! Sectioning classification of document nodes.
//!
//! Every node is exactly one [`NodeKind`], decided from its tag name (and,
//! for `div`, an `article` class token). Headings carry their rank so that
//! code holding a `NodeKind::Heading` never has to ask for the rank of
//! something that is not a heading.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom_tree::{DomTree, NodeId};

static ARTICLE_CLASS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\barticle\b").unwrap());

/// Rank used for an `hgroup` that holds no `h1`-`h6`.
pub const HGROUP_FALLBACK_RANK: u8 = 6;

/// How a node takes part in outlining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Starts an isolated outline: body, blockquote, details, fieldset, figure, td.
    SectioningRoot,
    /// Starts a nested outline spliced back into its parent: article, aside,
    /// nav, section, or `div.article`.
    SectioningContent,
    /// `h1`-`h6` or `hgroup`, with rank 1 (highest) to 6.
    Heading { rank: u8 },
    Plain,
}

/// Classifies a node.
pub fn classify(tree: &DomTree, id: NodeId) -> NodeKind {
    let Some(name) = tree.name(id) else {
        return NodeKind::Plain;
    };

    match name {
        "body" | "blockquote" | "details" | "fieldset" | "figure" | "td" => NodeKind::SectioningRoot,
        "article" | "aside" | "nav" | "section" => NodeKind::SectioningContent,
        "div" if has_article_class(tree, id) => NodeKind::SectioningContent,
        "hgroup" => NodeKind::Heading { rank: hgroup_rank(tree, id) },
        _ => match heading_level(name) {
            Some(rank) => NodeKind::Heading { rank },
            None => NodeKind::Plain,
        },
    }
}

/// `h1` -> 1 ... `h6` -> 6.
fn heading_level(name: &str) -> Option<u8> {
    let digit = name.strip_prefix('h')?;
    match digit.parse::<u8>() {
        Ok(rank @ 1..=6) => Some(rank),
        _ => None,
    }
}

/// Rank of the highest heading inside an hgroup.
fn hgroup_rank(tree: &DomTree, id: NodeId) -> u8 {
    (1..=6)
        .find(|rank| tree.find_element(id, &format!("h{}", rank)).is_some())
        .unwrap_or(HGROUP_FALLBACK_RANK)
}

/// True for `class` attributes carrying an `article` word.
pub fn has_article_class(tree: &DomTree, id: NodeId) -> bool {
    tree.attr(id, "class").is_some_and(|class| ARTICLE_CLASS.is_match(class))
}

/// `article`, `body` or `div.article`: the elements a book may be split on.
pub fn is_article_like(tree: &DomTree, id: NodeId) -> bool {
    match tree.name(id) {
        Some("article") | Some("body") => true,
        Some("div") => has_article_class(tree, id),
        _ => false,
    }
}

/// Text of a heading node. For an hgroup this is the text of its
/// highest-ranked heading. Whitespace-only text counts as no text.
pub fn heading_text(tree: &DomTree, id: NodeId, rank: u8) -> Option<String> {
    let target = if tree.is_named(id, "hgroup") { tree.find_element(id, &format!("h{}", rank))? } else { id };

    let text = tree.text_content(target);
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use rstest::rstest;

    fn first(doc: &Document, name: &str) -> NodeId {
        doc.tree().find_element(doc.root(), name).unwrap()
    }

    #[rstest]
    #[case("<h1>x</h1>", "h1", 1)]
    #[case("<h2>x</h2>", "h2", 2)]
    #[case("<h3>x</h3>", "h3", 3)]
    #[case("<h4>x</h4>", "h4", 4)]
    #[case("<h5>x</h5>", "h5", 5)]
    #[case("<h6>x</h6>", "h6", 6)]
    #[case("<hgroup><h3>b</h3><h2>a</h2></hgroup>", "hgroup", 2)]
    #[case("<hgroup><p>none</p></hgroup>", "hgroup", 6)]
    fn test_heading_rank(#[case] html: &str, #[case] name: &str, #[case] rank: u8) {
        let doc = Document::parse(html).unwrap();
        assert_eq!(classify(doc.tree(), first(&doc, name)), NodeKind::Heading { rank });
    }

    #[rstest]
    #[case("<blockquote></blockquote>", "blockquote", NodeKind::SectioningRoot)]
    #[case("<table><tr><td>x</td></tr></table>", "td", NodeKind::SectioningRoot)]
    #[case("<figure></figure>", "figure", NodeKind::SectioningRoot)]
    #[case("<aside></aside>", "aside", NodeKind::SectioningContent)]
    #[case("<nav></nav>", "nav", NodeKind::SectioningContent)]
    #[case(r#"<div class="main article"></div>"#, "div", NodeKind::SectioningContent)]
    #[case(r#"<div class="articles"></div>"#, "div", NodeKind::Plain)]
    #[case("<canvas></canvas>", "canvas", NodeKind::Plain)]
    #[case("<header></header>", "header", NodeKind::Plain)]
    fn test_classify(#[case] html: &str, #[case] name: &str, #[case] kind: NodeKind) {
        let doc = Document::parse(html).unwrap();
        assert_eq!(classify(doc.tree(), first(&doc, name)), kind);
    }

    #[test]
    fn test_body_is_sectioning_root() {
        let doc = Document::parse("<p>x</p>").unwrap();
        assert_eq!(classify(doc.tree(), doc.body().unwrap()), NodeKind::SectioningRoot);
        assert_eq!(classify(doc.tree(), doc.root()), NodeKind::Plain);
    }

    #[test]
    fn test_article_like() {
        let doc = Document::parse(r#"<article></article><div class="article"></div><section></section>"#).unwrap();
        let tree = doc.tree();
        assert!(is_article_like(tree, first(&doc, "article")));
        assert!(is_article_like(tree, first(&doc, "div")));
        assert!(is_article_like(tree, doc.body().unwrap()));
        assert!(!is_article_like(tree, first(&doc, "section")));
    }

    #[test]
    fn test_hgroup_heading_text() {
        let doc = Document::parse("<hgroup><h2>Sub</h2><h1> Main </h1></hgroup>").unwrap();
        let hgroup = first(&doc, "hgroup");
        assert_eq!(heading_text(doc.tree(), hgroup, 1), Some("Main".to_string()));
    }

    #[test]
    fn test_blank_heading_has_no_text() {
        let doc = Document::parse("<h1>   </h1>").unwrap();
        assert_eq!(heading_text(doc.tree(), first(&doc, "h1"), 1), None);
    }
}
