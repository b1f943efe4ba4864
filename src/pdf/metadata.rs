//! PDF metadata extraction

use std::path::Path;

use lopdf::{Document, Object};

use crate::error::{Error, Result};
use crate::layout::PageDimensions;

use super::page_box::{page_dimensions, resolve};

/// Count pages by reading the Count field from the Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc
        .trailer
        .get(b"Root")
        .map_err(|_| Error::General("No Root in trailer".to_string()))?;
    let catalog = resolve(doc, catalog)?
        .as_dict()
        .map_err(|_| Error::General("Catalog is not a dictionary".to_string()))?;

    let pages = catalog
        .get(b"Pages")
        .map_err(|_| Error::General("No Pages in catalog".to_string()))?;
    let pages = resolve(doc, pages)?
        .as_dict()
        .map_err(|_| Error::General("Pages is not a dictionary".to_string()))?;

    let count = pages
        .get(b"Count")
        .map_err(|_| Error::General("No Count in Pages".to_string()))?;

    match resolve(doc, count)? {
        Object::Integer(n) if *n >= 0 => Ok(*n as usize),
        _ => Err(Error::General("Count is not a page count".to_string())),
    }
}

/// Read a text entry of the Info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let info = resolve(doc, info).ok()?.as_dict().ok()?;
    let value = resolve(doc, info.get(key).ok()?).ok()?;
    let bytes = value.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// MediaBox size of every page, in order
    pub page_sizes: Vec<PageDimensions>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    metadata_of(&doc, &path.display().to_string())
}

/// Extract metadata from PDF bytes, e.g. a merged document held in memory
pub fn inspect_bytes(name: &str, bytes: &[u8]) -> Result<PdfMetadata> {
    let doc = Document::load_mem(bytes)?;
    metadata_of(&doc, name)
}

fn metadata_of(doc: &Document, name: &str) -> Result<PdfMetadata> {
    // Use catalog-based counting for accuracy
    let page_count = count_pages_from_catalog(doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(name.to_string()));
    }

    let page_sizes = doc
        .get_pages()
        .values()
        .map(|&id| page_dimensions(doc, id))
        .collect::<Result<Vec<_>>>()?;

    Ok(PdfMetadata {
        page_count,
        title: info_string(doc, b"Title"),
        author: info_string(doc, b"Author"),
        page_sizes,
    })
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.display().to_string()));
    }

    Ok(page_count)
}
