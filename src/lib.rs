//! PDF Merger Library
//!
//! Merge PDF files in a chosen order, optionally normalizing every page to
//! one paper size and orientation. This library provides functionality to:
//! - Compute per-page placement (rotation, scale, centering) for a layout policy
//! - Merge multiple PDF files, applying that placement page by page
//! - Extract metadata (page counts, page sizes, etc.)
//! - Keep a merge session with file ordering and preview navigation
//! - Load and save merge settings as JSON
//!
//! # Example
//!
//! ```no_run
//! use pdf_merger::layout::LayoutPolicy;
//! use pdf_merger::pdf::{MergeOptions, merge_pdfs};
//! use std::path::PathBuf;
//!
//! let options = MergeOptions {
//!     input_paths: vec![
//!         PathBuf::from("1. intro.pdf"),
//!         PathBuf::from("2. advanced.pdf"),
//!     ],
//!     output_path: PathBuf::from("merged.pdf"),
//!     policy: LayoutPolicy::default(),
//! };
//!
//! merge_pdfs(&options).expect("Failed to merge PDFs");
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod preview;
pub mod session;

// Re-export commonly used items
pub use config::MergeConfig;
pub use error::{Error, Result};
pub use layout::{compute_layout, LayoutMode, LayoutPolicy, PageDimensions, PaperSize, Placement, RotationStrategy};
pub use session::MergeSession;
