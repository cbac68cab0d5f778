//! In-memory book model shared by every format.
//!
//! A [`Book`] is what format adapters read into and write from: the
//! component files holding the linear text, the chapter tree, metadata
//! properties, and any other files (images, stylesheets) as resources.

use std::path::{Component as PathComponent, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chapter::Chapter;
use crate::componentize::Component;
use crate::parse::Document;
use crate::stitch::stitch;
use crate::{QuireError, Result};

/// One unit of book metadata, such as `title` or `creator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// A file that is part of the book but not one of its components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Relative, `/`-separated path inside the book.
    pub src: String,
    pub data: Vec<u8>,
}

impl Resource {
    pub fn new(src: impl Into<String>, data: Vec<u8>) -> Self {
        Self { src: src.into(), data }
    }

    /// Lower-cased file extension of `src`, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.src.rsplit('/').next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() { None } else { Some(ext.to_ascii_lowercase()) }
    }
}

/// Where a book file named `src` goes when written under `dir`.
///
/// `src` must stay inside `dir`: absolute paths, `..` segments, Windows
/// prefixes and backslashes are rejected with [`QuireError::UnsafePath`].
pub fn resolve_src(dir: &Path, src: &str) -> Result<PathBuf> {
    let relative = Path::new(src);
    let contained = !src.is_empty()
        && !src.contains('\\')
        && relative.components().all(|c| matches!(c, PathComponent::Normal(_) | PathComponent::CurDir));
    if !contained {
        return Err(QuireError::UnsafePath(src.to_string()));
    }
    Ok(dir.join(relative))
}

/// A book as components, chapters, properties and resources.
///
/// # Example
///
/// ```rust
/// use quire_core::Book;
///
/// let book = Book::from_html([
///     ("one.html", "<html><head><meta name=\"title\" content=\"Two Parts\"></head><body><h1>One</h1></body></html>"),
///     ("two.html", "<h1>Two</h1>"),
/// ])
/// .unwrap();
///
/// assert_eq!(book.components.len(), 2);
/// assert_eq!(book.property_for("title"), Some("Two Parts"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub components: Vec<Component>,
    pub chapters: Vec<Chapter>,
    pub properties: Vec<Property>,
    pub resources: Vec<Resource>,
    /// `src` of the resource used as the cover.
    pub cover: Option<String>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from loose `(src, html)` files, in reading order.
    ///
    /// Properties come from the first file's meta tags. Chapters are left
    /// empty until the book is converted.
    pub fn from_html<I, S, H>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, H)>,
        S: Into<String>,
        H: AsRef<str>,
    {
        let mut book = Self::new();
        for (src, html) in sources {
            let document = Document::parse(html.as_ref())?;
            book.components.push(Component::whole(src, document));
        }

        let first = book.components.first().ok_or(QuireError::NoContent)?;
        book.properties = first.document.extract_properties();
        Ok(book)
    }

    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.push(Property::new(key, value));
    }

    pub fn add_resource(&mut self, src: impl Into<String>, data: Vec<u8>) {
        self.resources.push(Resource::new(src, data));
    }

    /// Value of the first property named `key`.
    pub fn property_for(&self, key: &str) -> Option<&str> {
        self.properties.iter().find(|p| p.key == key).map(|p| p.value.as_str())
    }

    pub fn resource(&self, src: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.src == src)
    }

    /// The cover resource, when the cover names one that exists.
    pub fn cover_resource(&self) -> Option<&Resource> {
        self.cover.as_deref().and_then(|src| self.resource(src))
    }

    /// Stitches all components into one index document and writes the
    /// book's properties into its head.
    pub fn index_document(&self) -> Result<Document> {
        let documents: Vec<Document> = self.components.iter().map(|c| c.document.clone()).collect();
        let mut index = stitch(&documents)?;
        index.consolidate_metadata(&self.properties)?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_for() {
        let mut book = Book::new();
        book.add_property("title", "Foo");
        book.add_property("creator", "Peregrin Took");
        book.add_property("title", "Shadowed");

        assert_eq!(book.property_for("title"), Some("Foo"));
        assert_eq!(book.property_for("creator"), Some("Peregrin Took"));
        assert_eq!(book.property_for("publisher"), None);
    }

    #[test]
    fn test_cover_resource() {
        let mut book = Book::new();
        book.add_resource("images/cover.png", vec![0x89, b'P', b'N', b'G']);
        assert!(book.cover_resource().is_none());

        book.cover = Some("images/cover.png".to_string());
        assert_eq!(book.cover_resource().map(|r| r.data.len()), Some(4));
    }

    #[test]
    fn test_resource_extension() {
        assert_eq!(Resource::new("images/Cover.PNG", Vec::new()).extension(), Some("png".to_string()));
        assert_eq!(Resource::new("css/.hidden", Vec::new()).extension(), None);
        assert_eq!(Resource::new("README", Vec::new()).extension(), None);
    }

    #[test]
    fn test_resolve_src() {
        let dir = Path::new("out");
        assert_eq!(resolve_src(dir, "images/front.png").unwrap(), dir.join("images/front.png"));
        assert_eq!(resolve_src(dir, "./part001.html").unwrap(), dir.join("./part001.html"));

        for src in ["../escaped.txt", "images/../../escaped.txt", "/etc/passwd", "..\\escaped.txt", ""] {
            assert!(matches!(resolve_src(dir, src), Err(QuireError::UnsafePath(s)) if s == src), "{src}");
        }
    }

    #[test]
    fn test_from_html_requires_content() {
        let sources: Vec<(String, String)> = Vec::new();
        assert!(matches!(Book::from_html(sources), Err(QuireError::NoContent)));
    }

    #[test]
    fn test_index_document_consolidates_metadata() {
        let mut book =
            Book::from_html([("index.html", "<html><head><title>Foo</title></head><body><p>Foo</p></body></html>")])
                .unwrap();
        book.add_property("creator", "Peregrin Took");

        let index = book.index_document().unwrap();
        assert_eq!(index.meta_content("creator"), Some("Peregrin Took".to_string()));
        assert_eq!(index.tree().serialize(index.body().unwrap()), "<body><p>Foo</p></body>");
    }
}
