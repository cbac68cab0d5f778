//! Ochook: a book laid out as a directory that works as an offline web app.
//!
//! The index's `<html>` element points at `ochook.manifest`, an HTML5 cache
//! manifest listing every file in the book.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use super::{BookFormat, COVER_PATH, INDEX_PATH, Package, index_root_has_id};
use crate::book::{Book, Resource, resolve_src};
use crate::convert::ConvertConfig;
use crate::parse::Document;
use crate::{QuireError, Result};

pub const MANIFEST_PATH: &str = "ochook.manifest";

/// An Ochook directory.
#[derive(Debug, Clone)]
pub struct Ochook {
    package: Package,
}

impl Ochook {
    /// The packaged index document, `manifest` attribute included.
    pub fn index(&self) -> &Document {
        &self.package.index
    }

    /// Lines of the cache manifest.
    pub fn manifest(&self) -> Vec<String> {
        let mut manifest: Vec<String> =
            ["CACHE MANIFEST", "", "NETWORK:", "*", "", "CACHE:", INDEX_PATH].iter().map(|s| s.to_string()).collect();
        manifest.extend(self.package.resources_with_cover().into_iter().map(|r| r.src));
        manifest
    }

    fn with_manifest_attribute(mut package: Package) -> Result<Self> {
        let root = package.index.root_element().ok_or(QuireError::MissingElement("html"))?;
        package.index.tree_mut().set_attr(root, "manifest", MANIFEST_PATH);
        Ok(Self { package })
    }
}

impl BookFormat for Ochook {
    const NAME: &'static str = "Ochook";

    fn validate(path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(QuireError::DirectoryNotFound(path.to_path_buf()));
        }
        if !path.join(INDEX_PATH).exists() {
            return Err(QuireError::MissingIndexHtml(path.to_path_buf()));
        }
        if !path.join(COVER_PATH).exists() {
            return Err(QuireError::MissingCoverPng(path.to_path_buf()));
        }
        if !path.join(MANIFEST_PATH).exists() {
            return Err(QuireError::MissingManifest(path.to_path_buf()));
        }

        let index_html = fs::read_to_string(path.join(INDEX_PATH))?;
        if index_root_has_id(&index_html)? {
            return Err(QuireError::IndexRootHasId(path.to_path_buf()));
        }

        let index = Document::parse(&index_html)?;
        let manifest = index.root_element().and_then(|root| index.tree().attr(root, "manifest"));
        if manifest != Some(MANIFEST_PATH) {
            return Err(QuireError::IndexRootHasNoManifest(path.to_path_buf()));
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self> {
        Self::validate(path)?;
        let index_html = fs::read_to_string(path.join(INDEX_PATH))?;

        let mut resources = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(path) else {
                continue;
            };
            let src = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
            if src == INDEX_PATH || src == MANIFEST_PATH {
                continue;
            }
            resources.push(Resource::new(src, fs::read(entry.path())?));
        }
        debug!(path = %path.display(), resources = resources.len(), "read ochook");

        Ok(Self { package: Package::loaded(&index_html, resources)? })
    }

    fn from_book(book: &Book) -> Result<Self> {
        Self::with_manifest_attribute(Package::from_book(book)?)
    }

    fn write(&self, path: &Path) -> Result<()> {
        let resources = self.package.resources_with_cover();
        let targets = resources.iter().map(|r| resolve_src(path, &r.src)).collect::<Result<Vec<_>>>()?;

        if path.is_dir() {
            fs::remove_dir_all(path)?;
        }
        fs::create_dir_all(path)?;

        fs::write(path.join(INDEX_PATH), self.package.index.to_html())?;

        for (resource, full_path) in resources.iter().zip(targets) {
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full_path, &resource.data)?;
        }

        fs::write(path.join(MANIFEST_PATH), self.manifest().join("\n"))?;
        info!(path = %path.display(), resources = resources.len(), "wrote ochook");
        Ok(())
    }

    fn to_book(&self, config: &ConvertConfig) -> Result<Book> {
        let mut index = self.package.index.clone();
        if let Some(root) = index.root_element() {
            index.tree_mut().remove_attr(root, "manifest");
        }
        self.package.to_book(&index, config)
    }
}
