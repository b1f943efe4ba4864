//! Error types for the PDF merger library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF merger library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization error
    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {0}")]
    EmptyPdf(String),

    /// Merge or preview requested with an empty file list
    #[error("No PDF files selected")]
    NoFiles,

    /// Unrecognized layout mode or rotation strategy
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// File index outside the current file list
    #[error("File index {index} out of range (have {len} files)")]
    IndexOutOfRange { index: usize, len: usize },

    /// General error
    #[error("{0}")]
    General(String),
}
