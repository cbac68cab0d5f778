//! Main conversion API.
//!
//! A [`Converter`] takes a book's index document through the pipeline:
//! split it into components (optionally), outline it, and project the
//! outline onto the components as a chapter tree.
//!
//! # Example
//!
//! ```rust
//! use quire_core::convert::{ConvertConfig, Converter};
//! use quire_core::Document;
//!
//! let html = r#"<h1>Book</h1>
//!     <article><h2 id="one">One</h2></article>
//!     <article><h2 id="two">Two</h2></article>"#;
//! let index = Document::parse(html).unwrap();
//!
//! let converter = Converter::with_config(ConvertConfig::builder().componentize(true).build());
//! let book = converter.to_book(&index).unwrap();
//! assert_eq!(book.components.len(), 3);
//! assert_eq!(book.chapters[0].children[1].src.as_deref(), Some("part002.html#two"));
//! ```

use tracing::debug;

use crate::book::Book;
use crate::chapter::{Chapter, ChapterProjector};
use crate::componentize::{Component, Componentizer, component_uri};
use crate::dom_tree::NodePath;
use crate::outline::Outliner;
use crate::parse::Document;
use crate::{QuireError, Result};

/// Configuration for the conversion pipeline.
///
/// # Example
///
/// ```rust
/// use quire_core::ConvertConfig;
///
/// let config = ConvertConfig::builder().componentize(true).build();
/// assert!(config.componentize);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    /// Split the index into one file per article (default: false).
    pub componentize: bool,
}

impl ConvertConfig {
    /// Creates a new builder for ConvertConfig.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder::new()
    }
}

/// Builder for ConvertConfig.
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ConvertConfig::default() }
    }

    /// Sets whether the index is split into components.
    pub fn componentize(mut self, value: bool) -> Self {
        self.config.componentize = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ConvertConfig {
        self.config
    }
}

impl Default for ConvertConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the outline and split pipeline over an index document.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    /// Creates a converter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Builds a book from an already stitched index document.
    ///
    /// Properties are read from the index's meta tags; the book has no
    /// resources.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::MissingElement`] if the index has no body.
    pub fn to_book(&self, index: &Document) -> Result<Book> {
        let body = index.body().ok_or(QuireError::MissingElement("body"))?;

        let (components, paths) = if self.config.componentize {
            let mut componentizer = Componentizer::new(index);
            let paths = componentizer.process(body).to_vec();
            if paths.is_empty() {
                debug!("nothing to split, keeping a single component");
                single_component(index)
            } else {
                (componentizer.components()?, paths)
            }
        } else {
            single_component(index)
        };
        debug!(components = components.len(), "split index");

        let chapters = project_chapters(index, &paths);

        Ok(Book { components, chapters, properties: index.extract_properties(), ..Book::default() })
    }

    /// Re-splits an existing book.
    ///
    /// The book's components are stitched into one index (with its
    /// properties written into the head) and run through [`Converter::to_book`].
    /// Properties, resources and cover are carried over.
    pub fn convert(&self, book: &Book) -> Result<Book> {
        let index = book.index_document()?;
        let converted = self.to_book(&index)?;

        Ok(Book {
            properties: book.properties.clone(),
            resources: book.resources.clone(),
            cover: book.cover.clone(),
            ..converted
        })
    }
}

fn single_component(index: &Document) -> (Vec<Component>, Vec<NodePath>) {
    let component = Component::whole(component_uri(0), index.clone());
    let paths = vec![component.path.clone()];
    (vec![component], paths)
}

fn project_chapters(index: &Document, paths: &[NodePath]) -> Vec<Chapter> {
    let outline = Outliner::new(index.tree()).process(index.root());
    ChapterProjector::new(index.tree(), paths).project(&outline)
}

/// Chapter tree of a single HTML document, without splitting it.
///
/// # Example
///
/// ```rust
/// use quire_core::outline;
///
/// let chapters = outline("<h1>One</h1><h1>Two</h1>").unwrap();
/// assert_eq!(chapters.len(), 2);
/// assert_eq!(chapters[1].src.as_deref(), Some("index.html"));
/// ```
pub fn outline(html: &str) -> Result<Vec<Chapter>> {
    let index = Document::parse(html)?;
    Ok(Converter::new().to_book(&index)?.chapters)
}

/// Splits a single HTML document into components.
pub fn componentize(html: &str) -> Result<Book> {
    let index = Document::parse(html)?;
    Converter::with_config(ConvertConfig { componentize: true }).to_book(&index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"<html><head><title>Nested</title></head><body>
<h1>Book</h1>
<article><h2 id="first">First</h2>
  <article><h3 id="first-a">First A</h3></article>
</article>
<article><h2 id="second">Second</h2>
  <article><h3 id="second-a">Second A</h3></article>
</article>
</body></html>"#;

    #[test]
    fn test_convert_config_default() {
        let config = ConvertConfig::default();
        assert!(!config.componentize);
    }

    #[test]
    fn test_convert_config_builder() {
        let config = ConvertConfig::builder().componentize(true).build();
        assert!(config.componentize);
        assert!(Converter::with_config(config).config().componentize);
    }

    #[test]
    fn test_single_component_book() {
        let index = Document::parse(NESTED).unwrap();
        let book = Converter::new().to_book(&index).unwrap();

        assert_eq!(book.components.len(), 1);
        assert_eq!(book.components[0].src, "index.html");
        assert_eq!(book.components[0].path.as_str(), "/html/body");
        assert_eq!(book.chapters[0].children[1].children[0].src.as_deref(), Some("index.html#second-a"));
    }

    #[test]
    fn test_componentized_nested_book() {
        let book = componentize(NESTED).unwrap();
        let srcs: Vec<_> = book.components.iter().map(|c| c.src.as_str()).collect();
        assert_eq!(srcs, vec!["index.html", "part001.html", "part002.html", "part003.html", "part004.html"]);

        let top = &book.chapters[0];
        assert_eq!(top.src.as_deref(), Some("index.html"));
        assert_eq!(top.children[0].src.as_deref(), Some("part001.html#first"));
        assert_eq!(top.children[0].children[0].src.as_deref(), Some("part002.html#first-a"));
        assert_eq!(top.children[1].src.as_deref(), Some("part003.html#second"));
        assert_eq!(top.children[1].children[0].src.as_deref(), Some("part004.html#second-a"));
    }

    #[test]
    fn test_empty_body_falls_back_to_index() {
        let book = componentize("<html><head></head><body></body></html>").unwrap();
        assert_eq!(book.components.len(), 1);
        assert_eq!(book.components[0].src, "index.html");
        assert!(book.chapters.is_empty());
    }

    #[test]
    fn test_convert_carries_resources() {
        let mut book = Book::from_html([("index.html", NESTED)]).unwrap();
        book.add_resource("cover.png", vec![1, 2, 3]);
        book.cover = Some("cover.png".to_string());

        let converted = Converter::with_config(ConvertConfig { componentize: true }).convert(&book).unwrap();
        assert_eq!(converted.components.len(), 5);
        assert_eq!(converted.resources.len(), 1);
        assert_eq!(converted.cover.as_deref(), Some("cover.png"));
    }

    #[test]
    fn test_outline_convenience() {
        let chapters = outline("<p>No headings at all.</p>").unwrap();
        assert!(chapters.is_empty());
    }
}
