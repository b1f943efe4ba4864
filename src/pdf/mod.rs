//! PDF manipulation module

pub mod merge;
pub mod metadata;
pub mod page_box;
pub mod source;

// Re-export commonly used items
pub use merge::{merge_documents, merge_pdfs, MergeOptions, MergedPage, MergedPdf};
pub use metadata::{count_pages, extract_metadata, inspect_bytes, PdfMetadata};
pub use page_box::page_dimensions;
pub use source::SourceFile;
