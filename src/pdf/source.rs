//! Source files selected for merging

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Leading bytes of every PDF file
const PDF_MAGIC: &[u8] = b"%PDF-";

/// One PDF held in memory, named for display and error messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk. The display name is the file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { name, bytes })
    }

    /// Whether this looks like a PDF, by extension or by its header
    pub fn is_pdf(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".pdf") || self.bytes.starts_with(PDF_MAGIC)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Size as shown in the file list, e.g. `(12.3 KB)`
    pub fn size_label(&self) -> String {
        format!("({:.1} KB)", self.size() as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_by_extension_or_header() {
        assert!(SourceFile::new("Report.PDF", vec![]).is_pdf());
        assert!(SourceFile::new("scan", b"%PDF-1.7\n".to_vec()).is_pdf());
        assert!(!SourceFile::new("notes.txt", b"hello".to_vec()).is_pdf());
    }

    #[test]
    fn test_size_label() {
        assert_eq!(SourceFile::new("a.pdf", vec![0; 1536]).size_label(), "(1.5 KB)");
        assert_eq!(SourceFile::new("a.pdf", vec![]).size_label(), "(0.0 KB)");
    }

    #[test]
    fn test_from_path_nonexistent_file() {
        let result = SourceFile::from_path(Path::new("nonexistent.pdf"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
