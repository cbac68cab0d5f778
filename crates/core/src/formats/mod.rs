//! Readers and writers for on-disk book formats.
//!
//! Both formats carry a book as one `index.html` plus resources:
//!
//! - [`Zhook`]: a zip archive with a `.zhook` extension.
//! - [`Ochook`]: a directory with an HTML5 cache manifest.
//!
//! Reading produces the packaged index untouched; [`BookFormat::to_book`]
//! runs it through the [`Converter`] to obtain components and chapters.

pub mod ochook;
pub mod zhook;

use std::path::Path;

use tracing::warn;

pub use ochook::Ochook;
pub use zhook::Zhook;

use crate::book::{Book, Property, Resource};
use crate::convert::{ConvertConfig, Converter};
use crate::parse::Document;
use crate::{QuireError, Result};

pub const INDEX_PATH: &str = "index.html";
pub const COVER_PATH: &str = "cover.png";

/// A packaged book format.
pub trait BookFormat: Sized {
    /// Human-readable format name.
    const NAME: &'static str;

    /// Checks that `path` holds a valid book of this format.
    fn validate(path: &Path) -> Result<()>;

    /// Validates and loads the book at `path`.
    fn read(path: &Path) -> Result<Self>;

    /// Packages a book, stitching its components into one index.
    fn from_book(book: &Book) -> Result<Self>;

    /// Writes the package to `path`.
    fn write(&self, path: &Path) -> Result<()>;

    /// Unpacks into a book, splitting the index as `config` asks.
    fn to_book(&self, config: &ConvertConfig) -> Result<Book>;
}

/// State shared by both formats: the index and everything around it.
#[derive(Debug, Clone)]
pub(crate) struct Package {
    pub(crate) index: Document,
    pub(crate) properties: Vec<Property>,
    pub(crate) resources: Vec<Resource>,
    pub(crate) cover: Option<String>,
}

impl Package {
    pub(crate) fn from_book(book: &Book) -> Result<Self> {
        Ok(Self {
            index: book.index_document()?,
            properties: book.properties.clone(),
            resources: book.resources.clone(),
            cover: book.cover.clone(),
        })
    }

    /// A package read from disk: properties come from the index head, and
    /// the cover is always `cover.png`.
    pub(crate) fn loaded(index_html: &str, resources: Vec<Resource>) -> Result<Self> {
        let index = Document::parse(index_html)?;
        let properties = index.extract_properties();
        Ok(Self { index, properties, resources, cover: Some(COVER_PATH.to_string()) })
    }

    pub(crate) fn to_book(&self, index: &Document, config: &ConvertConfig) -> Result<Book> {
        let book = Converter::with_config(config.clone()).to_book(index)?;
        Ok(Book {
            properties: self.properties.clone(),
            resources: self.resources.clone(),
            cover: self.cover.clone(),
            ..book
        })
    }

    /// Resources to write, plus a `cover.png` copy of the cover when the
    /// book's cover lives elsewhere.
    pub(crate) fn resources_with_cover(&self) -> Vec<Resource> {
        let mut resources: Vec<Resource> = self.resources.iter().filter(|r| r.src != INDEX_PATH).cloned().collect();

        let Some(cover) = self.cover.as_deref() else {
            return resources;
        };
        if cover == COVER_PATH || resources.iter().any(|r| r.src == COVER_PATH) {
            return resources;
        }

        match resources.iter().find(|r| r.src == cover) {
            Some(resource) if resource.extension().as_deref() == Some("png") => {
                resources.push(Resource::new(COVER_PATH, resource.data.clone()));
            }
            Some(_) => warn!(cover, "cover is not a PNG image, not writing cover.png"),
            None => warn!(cover, "cover resource is missing, not writing cover.png"),
        }
        resources
    }
}

/// Root element of a packaged index, for validation.
pub(crate) fn index_root_has_id(index_html: &str) -> Result<bool> {
    let index = Document::parse(index_html)?;
    let root = index.root_element().ok_or(QuireError::MissingElement("html"))?;
    Ok(index.tree().attr(root, "id").is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(cover: Option<&str>, resources: Vec<Resource>) -> Package {
        Package {
            index: Document::parse("<p>x</p>").unwrap(),
            properties: Vec::new(),
            resources,
            cover: cover.map(str::to_string),
        }
    }

    #[test]
    fn test_png_cover_is_copied() {
        let pkg = package(Some("images/front.png"), vec![Resource::new("images/front.png", vec![1, 2])]);
        let srcs: Vec<_> = pkg.resources_with_cover().into_iter().map(|r| r.src).collect();
        assert_eq!(srcs, vec!["images/front.png", "cover.png"]);
    }

    #[test]
    fn test_non_png_cover_is_skipped() {
        let pkg = package(Some("front.jpg"), vec![Resource::new("front.jpg", vec![1, 2])]);
        assert_eq!(pkg.resources_with_cover().len(), 1);
    }

    #[test]
    fn test_cover_png_left_alone() {
        let pkg = package(Some("cover.png"), vec![Resource::new("cover.png", vec![1])]);
        assert_eq!(pkg.resources_with_cover().len(), 1);
    }

    #[test]
    fn test_index_root_has_id() {
        assert!(index_root_has_id(r#"<html id="book"><body></body></html>"#).unwrap());
        assert!(!index_root_has_id("<html><body></body></html>").unwrap());
    }
}
