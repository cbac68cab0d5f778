//! Error types for Quire operations.
//!
//! This module defines the main error type [`QuireError`] which represents
//! all possible errors that can occur while parsing, outlining, splitting,
//! reading and writing books.
//!
//! # Example
//!
//! ```rust
//! use quire_core::{QuireError, Result};
//!
//! fn first_source(sources: &[String]) -> Result<&str> {
//!     sources.first().map(String::as_str).ok_or(QuireError::NoContent)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::dom_tree::NodePath;

/// Main error type for book processing operations.
///
/// The validation variants mirror the checks each format adapter runs
/// before it accepts a file or directory.
///
/// # Example
///
/// ```rust
/// use quire_core::{Componentizer, Document, NodePath, QuireError};
///
/// let doc = Document::parse("<html><body><p>Hi</p></body></html>").unwrap();
/// let mut componentizer = Componentizer::new(&doc);
/// match componentizer.generate_component(&NodePath::from("/html/body/p")) {
///     Err(QuireError::NotAComponent(path)) => println!("not splittable: {}", path),
///     other => println!("{:?}", other.map(|d| d.to_html())),
/// }
/// ```
#[derive(Error, Debug)]
pub enum QuireError {
    /// A component was requested for a path the last `process` call did not return.
    ///
    /// This is an adapter bug and is never retried.
    #[error("Not a component: {0}")]
    NotAComponent(NodePath),

    /// HTML parsing errors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A structural element the operation depends on is absent.
    #[error("Document has no <{0}> element")]
    MissingElement(&'static str),

    /// Nothing to work with, e.g. stitching an empty list of documents.
    #[error("No content to process")]
    NoContent,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Directory not found (Ochook input).
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The file does not carry the extension its format requires.
    #[error("Wrong file extension: {0}")]
    WrongExtension(PathBuf),

    /// The file could not be opened as a zip archive.
    #[error("Not a zip archive: {0}")]
    NotAZipArchive(PathBuf),

    /// The book has no `index.html`.
    #[error("Missing index.html in {0}")]
    MissingIndexHtml(PathBuf),

    /// The book has no `cover.png`.
    #[error("Missing cover.png in {0}")]
    MissingCoverPng(PathBuf),

    /// The Ochook directory has no cache manifest.
    #[error("Missing ochook.manifest in {0}")]
    MissingManifest(PathBuf),

    /// The index document's root element carries an `id`.
    #[error("Root element of index.html has an id attribute: {0}")]
    IndexRootHasId(PathBuf),

    /// The Ochook index document's root element does not point at the manifest.
    #[error("Root element of index.html has no manifest attribute: {0}")]
    IndexRootHasNoManifest(PathBuf),

    /// A component or resource `src` that would land outside the book's
    /// root when written: absolute, containing `..`, or using backslashes.
    #[error("Unsafe file path in book: {0}")]
    UnsafePath(String),

    /// I/O errors while reading or writing books.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Zip archive errors.
    #[cfg(feature = "formats")]
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Invalid UTF-8 in an HTML source.
    #[error("Invalid character encoding: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),

    /// JSON serialisation errors.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for QuireError.
///
/// This is a convenience alias for `std::result::Result<T, QuireError>`.
pub type Result<T> = std::result::Result<T, QuireError>;
