//! PDF merging functionality using lopdf
//!
//! Pages are concatenated in the order the sources are given. Each page is
//! passed through [`compute_layout`]; pages that come out unchanged are
//! moved into the output as they are, the others are wrapped in a Form
//! XObject and drawn onto a fresh page of the target size.

use std::fs;
use std::path::PathBuf;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::layout::{compute_layout, LayoutPolicy, PageDimensions, Placement};

use super::page_box::{inherited_attribute, media_box, resolve, INHERITABLE_ATTRIBUTES};
use super::source::SourceFile;

/// Resource name of the embedded page on a re-drawn page
const EMBEDDED_PAGE_NAME: &str = "Pg0";

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
    /// Page size and orientation normalization
    pub policy: LayoutPolicy,
}

/// One page of the merged document and where it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedPage {
    /// Index of the source file in merge order
    pub source_index: usize,
    /// 1-based page number within the source file
    pub source_page: u32,
    pub placement: Placement,
}

/// A merged document, serialized
#[derive(Debug, Clone)]
pub struct MergedPdf {
    pub bytes: Vec<u8>,
    pub pages: Vec<MergedPage>,
}

impl MergedPdf {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Merge multiple PDF files into a single PDF
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// # Example
///
/// ```no_run
/// use pdf_merger::layout::{LayoutMode, LayoutPolicy, PaperSize, RotationStrategy};
/// use pdf_merger::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("1. first.pdf"),
///         PathBuf::from("2. second.pdf"),
///     ],
///     output_path: PathBuf::from("merged.pdf"),
///     policy: LayoutPolicy::new(LayoutMode::ForcePortrait, PaperSize::A4, RotationStrategy::Auto),
/// };
///
/// merge_pdfs(&options).expect("Failed to merge");
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<MergedPdf> {
    if options.input_paths.is_empty() {
        return Err(Error::General("No input files provided".to_string()));
    }

    // Validate all input files exist
    for path in &options.input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let sources = options
        .input_paths
        .iter()
        .map(|path| SourceFile::from_path(path))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_documents(&sources, &options.policy)?;
    fs::write(&options.output_path, &merged.bytes)?;

    info!(
        output = %options.output_path.display(),
        pages = merged.page_count(),
        "wrote merged PDF"
    );

    Ok(merged)
}

/// Merge in-memory PDFs, in order, applying `policy` to every page
pub fn merge_documents(sources: &[SourceFile], policy: &LayoutPolicy) -> Result<MergedPdf> {
    if sources.is_empty() {
        return Err(Error::General("No input files provided".to_string()));
    }

    info!(files = sources.len(), ?policy, "merging PDFs");

    // Load all documents
    let mut documents: Vec<Document> = Vec::new();
    for source in sources {
        let doc = Document::load_mem(&source.bytes)?;

        // Validate document has pages
        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(source.name.clone()));
        }

        documents.push(doc);
    }

    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut source_pages: Vec<(usize, u32, ObjectId)> = Vec::new();
    let mut merged_doc = Document::with_version("1.5");

    for (source_index, mut doc) in documents.into_iter().enumerate() {
        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);

        // Update max_id for next document
        max_id = doc.max_id + 1;

        source_pages.extend(
            doc.get_pages()
                .into_iter()
                .map(|(number, id)| (source_index, number, id)),
        );

        merged_doc.objects.extend(doc.objects);
    }

    // Keep new_object_id() above every id we just moved in
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(source_pages.len());
    let mut pages: Vec<MergedPage> = Vec::with_capacity(source_pages.len());

    for (source_index, source_page, page_id) in source_pages {
        let rect = media_box(&merged_doc, page_id)?;
        let source_dims = PageDimensions::new(rect[2] - rect[0], rect[3] - rect[1]);
        let placement = compute_layout(source_dims, policy);

        debug!(
            file = %sources[source_index].name,
            page = source_page,
            source = %source_dims,
            target = %placement.target,
            rotated = placement.rotated,
            scale = placement.transform.scale,
            "placing page"
        );

        let output_page_id = if placement.is_identity() {
            adopt_page(&mut merged_doc, page_id, pages_id)?;
            page_id
        } else {
            redraw_page(&mut merged_doc, page_id, rect, &placement, pages_id)?
        };

        kids.push(Object::Reference(output_page_id));
        pages.push(MergedPage {
            source_index,
            source_page,
            placement,
        });
    }

    // Create Pages object
    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(kids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));

    // Create Catalog
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = merged_doc.add_object(catalog);

    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    // Source catalogs, page trees and replaced pages are now unreachable
    let pruned = merged_doc.prune_objects();
    debug!(objects = pruned.len(), "pruned unreachable objects");

    merged_doc.compress();

    let mut bytes = Vec::new();
    merged_doc.save_to(&mut bytes)?;

    Ok(MergedPdf { bytes, pages })
}

/// Re-parent an unchanged page under the new page tree.
///
/// Its old ancestors are discarded, so anything it inherited from them is
/// copied onto the page itself first.
fn adopt_page(doc: &mut Document, page_id: ObjectId, pages_id: ObjectId) -> Result<()> {
    let inherited: Vec<(&[u8], Object)> = INHERITABLE_ATTRIBUTES
        .iter()
        .filter_map(|&key| inherited_attribute(doc, page_id, key).map(|value| (key, value)))
        .collect();

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        if !page.has(key) {
            page.set(key.to_vec(), value);
        }
    }
    page.set("Parent", Object::Reference(pages_id));

    Ok(())
}

/// Draw a page, rotated and scaled per `placement`, onto a new page of the
/// target size. Returns the new page's id.
fn redraw_page(
    doc: &mut Document,
    page_id: ObjectId,
    rect: [f32; 4],
    placement: &Placement,
    pages_id: ObjectId,
) -> Result<ObjectId> {
    let xobject_id = create_page_xobject(doc, page_id, rect)?;

    let [a, b, c, d, e, f] = placement.content_matrix();
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                [a, b, c, d, e, f].into_iter().map(Object::Real).collect(),
            ),
            Operation::new("Do", vec![Object::Name(EMBEDDED_PAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let mut xobjects = Dictionary::new();
    xobjects.set(EMBEDDED_PAGE_NAME, Object::Reference(xobject_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(placement.target.width),
            Object::Real(placement.target.height),
        ]),
    );
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Reference(content_id));

    Ok(doc.add_object(page))
}

/// Turn a page into a Form XObject.
///
/// The form keeps the page's resources by reference and its `Matrix` moves
/// the MediaBox origin to (0,0), so placement matrices can treat every page
/// as starting at the origin.
fn create_page_xobject(doc: &mut Document, page_id: ObjectId, rect: [f32; 4]) -> Result<ObjectId> {
    let [llx, lly, _, _] = rect;
    let resources = inherited_attribute(doc, page_id, b"Resources");
    let (content, filter) = page_content(doc, page_id)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(rect.into_iter().map(Object::Real).collect()),
    );
    xobject_dict.set(
        "Matrix",
        Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Real(-llx),
            Object::Real(-lly),
        ]),
    );
    xobject_dict.set(
        "Resources",
        resources.unwrap_or_else(|| Object::Dictionary(Dictionary::new())),
    );
    let already_encoded = !filter.is_empty();
    for (key, value) in filter {
        xobject_dict.set(key, value);
    }

    let mut stream = Stream::new(xobject_dict, content);
    if already_encoded {
        stream.allows_compression = false;
    }
    Ok(doc.add_object(stream))
}

/// Content stream bytes of a page.
///
/// `Contents` may be a stream, an array of streams, or a reference to
/// either. A single stream is taken as stored, returning its Filter and
/// DecodeParms so they carry over to the form. Several streams are decoded
/// and joined with newlines.
fn page_content(doc: &Document, page_id: ObjectId) -> Result<(Vec<u8>, Vec<(&'static str, Object)>)> {
    let page = doc.get_dictionary(page_id)?;
    let Ok(contents) = page.get(b"Contents") else {
        // No content = blank page
        return Ok((Vec::new(), Vec::new()));
    };

    let streams: Vec<&Stream> = match resolve(doc, contents)? {
        Object::Stream(stream) => vec![stream],
        Object::Array(arr) => arr
            .iter()
            .filter_map(|obj| resolve(doc, obj).ok()?.as_stream().ok())
            .collect(),
        _ => Vec::new(),
    };

    if let [stream] = streams.as_slice() {
        let filter = ["Filter", "DecodeParms"]
            .into_iter()
            .filter_map(|key| {
                stream
                    .dict
                    .get(key.as_bytes())
                    .ok()
                    .map(|value| (key, value.clone()))
            })
            .collect();
        return Ok((stream.content.clone(), filter));
    }

    let mut combined = Vec::new();
    for stream in streams {
        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        combined.extend_from_slice(&content);
        combined.push(b'\n');
    }

    Ok((combined, Vec::new()))
}
