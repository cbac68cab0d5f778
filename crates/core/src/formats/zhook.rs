//! Zhook: a book zipped up as `index.html`, `cover.png` and resources.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{BookFormat, COVER_PATH, INDEX_PATH, Package, index_root_has_id};
use crate::book::{Book, Resource, resolve_src};
use crate::convert::ConvertConfig;
use crate::parse::Document;
use crate::{QuireError, Result};

pub const FILE_EXT: &str = "zhook";

/// A `.zhook` archive.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use quire_core::ConvertConfig;
/// use quire_core::formats::{BookFormat, Zhook};
///
/// let zhook = Zhook::read(Path::new("basic.zhook")).unwrap();
/// let book = zhook.to_book(&ConvertConfig::builder().componentize(true).build()).unwrap();
/// println!("{} components", book.components.len());
/// ```
#[derive(Debug, Clone)]
pub struct Zhook {
    package: Package,
}

impl Zhook {
    /// The packaged index document.
    pub fn index(&self) -> &Document {
        &self.package.index
    }
}

impl BookFormat for Zhook {
    const NAME: &'static str = "Zhook";

    fn validate(path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(QuireError::FileNotFound(path.to_path_buf()));
        }
        if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXT) {
            return Err(QuireError::WrongExtension(path.to_path_buf()));
        }

        let mut archive =
            ZipArchive::new(File::open(path)?).map_err(|_| QuireError::NotAZipArchive(path.to_path_buf()))?;
        if !archive.file_names().any(|name| name == INDEX_PATH) {
            return Err(QuireError::MissingIndexHtml(path.to_path_buf()));
        }
        if !archive.file_names().any(|name| name == COVER_PATH) {
            return Err(QuireError::MissingCoverPng(path.to_path_buf()));
        }

        let index_html = read_entry(&mut archive, INDEX_PATH)?;
        if index_root_has_id(&index_html)? {
            return Err(QuireError::IndexRootHasId(path.to_path_buf()));
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self> {
        Self::validate(path)?;

        let mut archive = ZipArchive::new(File::open(path)?)?;
        let index_html = read_entry(&mut archive, INDEX_PATH)?;

        let mut resources = Vec::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() || file.name() == INDEX_PATH {
                continue;
            }
            let Some(enclosed) = file.enclosed_name() else {
                warn!(entry = file.name(), "skipping zip entry that points outside the book");
                continue;
            };
            let src = enclosed.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            resources.push(Resource::new(src, data));
        }
        debug!(path = %path.display(), resources = resources.len(), "read zhook");

        Ok(Self { package: Package::loaded(&index_html, resources)? })
    }

    fn from_book(book: &Book) -> Result<Self> {
        Ok(Self { package: Package::from_book(book)? })
    }

    fn write(&self, path: &Path) -> Result<()> {
        let mut zip = ZipWriter::new(File::create(path)?);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(INDEX_PATH, deflated)?;
        zip.write_all(self.package.index.to_html().as_bytes())?;

        let resources = self.package.resources_with_cover();
        for resource in &resources {
            resolve_src(Path::new(""), &resource.src)?;
            zip.start_file(resource.src.as_str(), deflated)?;
            zip.write_all(&resource.data)?;
        }

        zip.finish()?;
        info!(path = %path.display(), resources = resources.len(), "wrote zhook");
        Ok(())
    }

    fn to_book(&self, config: &ConvertConfig) -> Result<Book> {
        self.package.to_book(&self.package.index, config)
    }
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(String::from_utf8(contents)?)
}
