//! Merge session: the selected files, the layout settings and the preview
//!
//! All state a merge front end needs lives in [`MergeSession`]. Changing the
//! file list drops any preview, since it no longer matches the files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{output_file_name, MergeConfig};
use crate::error::{Error, Result};
use crate::layout::{LayoutPolicy, PageDimensions, Placement};
use crate::pdf::{merge_documents, MergedPdf, SourceFile};
use crate::preview::PreviewState;

/// What the preview currently shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageView {
    /// 0-based page index in the merged document
    pub page: usize,
    pub placement: Placement,
    /// Canvas size at the current zoom
    pub viewport: PageDimensions,
}

#[derive(Debug, Clone)]
pub struct MergeSession {
    files: Vec<SourceFile>,
    policy: LayoutPolicy,
    output_name: String,
    preview: Option<(MergedPdf, PreviewState)>,
}

impl Default for MergeSession {
    fn default() -> Self {
        Self::new(&MergeConfig::default())
    }
}

impl MergeSession {
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            files: Vec::new(),
            policy: config.policy(),
            output_name: config.output_name.clone(),
            preview: None,
        }
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn policy(&self) -> &LayoutPolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: LayoutPolicy) {
        if policy != self.policy {
            self.policy = policy;
            self.preview = None;
        }
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.output_name = name.into();
    }

    /// Append files, skipping anything that is not a PDF. Returns how many
    /// were added.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = SourceFile>) -> usize {
        let mut added = 0;
        for file in files {
            if file.is_pdf() {
                self.files.push(file);
                added += 1;
            } else {
                warn!(file = %file.name, "skipping non-PDF file");
            }
        }
        if added > 0 {
            self.preview = None;
        }
        added
    }

    /// Read and append files from disk
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize> {
        let files = paths
            .iter()
            .map(|path| SourceFile::from_path(path.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.add_files(files))
    }

    pub fn remove(&mut self, index: usize) -> Result<SourceFile> {
        self.check_index(index)?;
        self.preview = None;
        Ok(self.files.remove(index))
    }

    /// Move the file at `from` so that it ends up at index `to`
    pub fn move_file(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from != to {
            let file = self.files.remove(from);
            self.files.insert(to, file);
            self.preview = None;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.preview = None;
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.files.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        Ok(())
    }

    fn merge(&self) -> Result<MergedPdf> {
        if self.files.is_empty() {
            return Err(Error::NoFiles);
        }
        merge_documents(&self.files, &self.policy)
    }

    /// Merge the current files in memory and show the first page at 100%
    pub fn preview(&mut self) -> Result<&PreviewState> {
        let merged = self.merge()?;
        let state = PreviewState::new(merged.page_count());
        let (_, state) = self.preview.insert((merged, state));
        Ok(&*state)
    }

    pub fn preview_state(&self) -> Option<&PreviewState> {
        self.preview.as_ref().map(|(_, state)| state)
    }

    /// The merged document behind the current preview
    pub fn previewed(&self) -> Option<&MergedPdf> {
        self.preview.as_ref().map(|(merged, _)| merged)
    }

    pub fn next_page(&mut self) -> bool {
        self.preview.as_mut().is_some_and(|(_, state)| state.next_page())
    }

    pub fn prev_page(&mut self) -> bool {
        self.preview.as_mut().is_some_and(|(_, state)| state.prev_page())
    }

    pub fn zoom_in(&mut self) -> bool {
        self.preview.as_mut().is_some_and(|(_, state)| state.zoom_in())
    }

    pub fn zoom_out(&mut self) -> bool {
        self.preview.as_mut().is_some_and(|(_, state)| state.zoom_out())
    }

    /// Jump to a 0-based page and set the zoom in one go
    pub fn show(&mut self, page: usize, zoom: u32) {
        if let Some((_, state)) = self.preview.as_mut() {
            state.go_to(page);
            state.set_zoom(zoom);
        }
    }

    pub fn current_view(&self) -> Option<PageView> {
        let (merged, state) = self.preview.as_ref()?;
        let page = state.current_page();
        let placement = merged.pages.get(page)?.placement;
        Some(PageView {
            page,
            placement,
            viewport: state.viewport(placement.target),
        })
    }

    /// Merge and write `<dir>/<output name>.pdf`. Returns the written path.
    ///
    /// Output names containing path separators are rejected, so the file
    /// always lands directly in `dir`.
    pub fn download(&self, dir: &Path) -> Result<PathBuf> {
        let file_name = output_file_name(&self.output_name)?;
        let merged = self.merge()?;
        let path = dir.join(file_name);
        fs::write(&path, &merged.bytes)?;
        info!(path = %path.display(), pages = merged.page_count(), "saved merged PDF");
        Ok(path)
    }
}
