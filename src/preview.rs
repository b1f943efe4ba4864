//! Preview navigation over a merged document
//!
//! Tracks which page is shown and at what zoom. Pages are not rasterized;
//! the state reports the viewport a renderer would draw into.

use crate::layout::PageDimensions;

pub const MIN_ZOOM: u32 = 50;
pub const MAX_ZOOM: u32 = 200;
pub const ZOOM_STEP: u32 = 25;
pub const DEFAULT_ZOOM: u32 = 100;

/// Render scale at 100% zoom
pub const BASE_RENDER_SCALE: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewState {
    current_page: usize,
    total_pages: usize,
    zoom: u32,
}

impl PreviewState {
    /// First page at 100% zoom
    pub fn new(total_pages: usize) -> Self {
        Self {
            current_page: 0,
            total_pages,
            zoom: DEFAULT_ZOOM,
        }
    }

    /// 0-based index of the page shown
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Zoom in percent
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        if self.current_page + 1 < self.total_pages {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether the page changed.
    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a 0-based page, clamped to the document
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.min(self.total_pages.saturating_sub(1));
    }

    /// Returns whether the zoom changed.
    pub fn zoom_in(&mut self) -> bool {
        if self.zoom < MAX_ZOOM {
            self.zoom += ZOOM_STEP;
            true
        } else {
            false
        }
    }

    /// Returns whether the zoom changed.
    pub fn zoom_out(&mut self) -> bool {
        if self.zoom > MIN_ZOOM {
            self.zoom -= ZOOM_STEP;
            true
        } else {
            false
        }
    }

    /// Set zoom directly, snapped to the zoom steps within range
    pub fn set_zoom(&mut self, zoom: u32) {
        let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom = clamped - (clamped - MIN_ZOOM) % ZOOM_STEP;
    }

    pub fn render_scale(&self) -> f32 {
        BASE_RENDER_SCALE * self.zoom as f32 / 100.0
    }

    /// Canvas size for a page at the current zoom
    pub fn viewport(&self, page: PageDimensions) -> PageDimensions {
        let scale = self.render_scale();
        PageDimensions::new(page.width * scale, page.height * scale)
    }

    /// "n / total", 1-based
    pub fn page_label(&self) -> String {
        if self.total_pages == 0 {
            return "0 / 0".to_string();
        }
        format!("{} / {}", self.current_page + 1, self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_is_clamped() {
        let mut preview = PreviewState::new(3);
        assert!(!preview.prev_page());
        assert!(preview.next_page());
        assert!(preview.next_page());
        assert!(!preview.next_page());
        assert_eq!(preview.current_page(), 2);
        assert_eq!(preview.page_label(), "3 / 3");
    }

    #[test]
    fn test_empty_document_never_moves() {
        let mut preview = PreviewState::new(0);
        assert!(!preview.next_page());
        assert!(!preview.prev_page());
        preview.go_to(5);
        assert_eq!(preview.current_page(), 0);
        assert_eq!(preview.page_label(), "0 / 0");
    }

    #[test]
    fn test_zoom_limits() {
        let mut preview = PreviewState::new(1);
        let mut steps = 0;
        while preview.zoom_in() {
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert_eq!(preview.zoom(), MAX_ZOOM);

        while preview.zoom_out() {}
        assert_eq!(preview.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_set_zoom_snaps_to_steps() {
        let mut preview = PreviewState::new(1);
        preview.set_zoom(130);
        assert_eq!(preview.zoom(), 125);
        preview.set_zoom(10);
        assert_eq!(preview.zoom(), 50);
        preview.set_zoom(999);
        assert_eq!(preview.zoom(), 200);
    }

    #[test]
    fn test_viewport_uses_render_scale() {
        let mut preview = PreviewState::new(1);
        let a4 = PageDimensions::new(595.0, 842.0);
        assert_eq!(preview.viewport(a4), PageDimensions::new(892.5, 1263.0));

        preview.zoom_out();
        preview.zoom_out();
        assert_eq!(preview.render_scale(), 0.75);
    }
}
