//! Page layout normalization
//!
//! Decides, for one source page, how it lands on a page of the merged
//! document: which paper size the output page gets, whether the content is
//! turned by 90°, and the uniform scale and offset that center it.
//!
//! Everything here is pure arithmetic on page boxes measured in points
//! (1/72 inch). The merge pass calls [`compute_layout`] once per page.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Size differences up to this many points count as "already matching".
pub const SIZE_TOLERANCE_PT: f32 = 1.0;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
}

impl PageDimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Square pages count as portrait.
    pub fn is_portrait(&self) -> bool {
        self.height >= self.width
    }

    /// The same box turned by 90°
    pub fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Both sides within `tolerance` points of `other`
    pub fn approx_eq(&self, other: &PageDimensions, tolerance: f32) -> bool {
        (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

impl fmt::Display for PageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{} pt", self.width, self.height)
    }
}

/// Output paper sizes, stored portrait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
}

impl PaperSize {
    pub const ALL: [PaperSize; 4] = [PaperSize::A4, PaperSize::A3, PaperSize::A5, PaperSize::Letter];

    /// Look up a paper size by name. Unknown names fall back to A4.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "a3" => PaperSize::A3,
            "a5" => PaperSize::A5,
            "letter" => PaperSize::Letter,
            _ => PaperSize::A4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::A3 => "A3",
            PaperSize::A5 => "A5",
            PaperSize::Letter => "Letter",
        }
    }

    /// Portrait dimensions in whole points
    pub fn dimensions(&self) -> PageDimensions {
        match self {
            PaperSize::A4 => PageDimensions::new(595.0, 842.0),
            PaperSize::A3 => PageDimensions::new(842.0, 1191.0),
            PaperSize::A5 => PageDimensions::new(420.0, 595.0),
            PaperSize::Letter => PageDimensions::new(612.0, 792.0),
        }
    }
}

impl From<String> for PaperSize {
    fn from(name: String) -> Self {
        PaperSize::from_name(&name)
    }
}

impl From<PaperSize> for String {
    fn from(size: PaperSize) -> Self {
        size.name().to_string()
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Orientation constraint applied to every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Pages are concatenated as authored
    #[default]
    #[serde(alias = "merge", alias = "keep")]
    KeepOriginal,
    #[serde(alias = "portrait")]
    ForcePortrait,
    #[serde(alias = "landscape")]
    ForceLandscape,
}

impl FromStr for LayoutMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep-original" | "keep" | "merge" => Ok(LayoutMode::KeepOriginal),
            "force-portrait" | "portrait" => Ok(LayoutMode::ForcePortrait),
            "force-landscape" | "landscape" => Ok(LayoutMode::ForceLandscape),
            other => Err(Error::InvalidOption(format!("unknown layout mode '{}'", other))),
        }
    }
}

/// How mismatched pages get turned.
///
/// Both strategies perform the same 90° turn today; the value is carried so
/// that settings round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationStrategy {
    #[default]
    Auto,
    #[serde(alias = "manual")]
    Fixed,
}

impl FromStr for RotationStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(RotationStrategy::Auto),
            "fixed" | "manual" => Ok(RotationStrategy::Fixed),
            other => Err(Error::InvalidOption(format!("unknown rotation strategy '{}'", other))),
        }
    }
}

/// The user's choice of orientation, paper size and rotation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutPolicy {
    pub mode: LayoutMode,
    pub paper_size: PaperSize,
    pub rotation: RotationStrategy,
}

impl LayoutPolicy {
    pub fn new(mode: LayoutMode, paper_size: PaperSize, rotation: RotationStrategy) -> Self {
        Self { mode, paper_size, rotation }
    }

    /// Target page and the orientation content is turned to. The page is
    /// the catalog size as stored (portrait) in both modes.
    fn target(&self) -> Option<(PageDimensions, bool)> {
        let paper = self.paper_size.dimensions();
        match self.mode {
            LayoutMode::KeepOriginal => None,
            LayoutMode::ForcePortrait => Some((paper, true)),
            LayoutMode::ForceLandscape => Some((paper, false)),
        }
    }
}

/// Uniform scale followed by a translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { scale: 1.0, x: 0.0, y: 0.0 };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Where and how one source page is drawn on its output page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Size of the output page
    pub target: PageDimensions,
    /// Content is turned 90° counter-clockwise
    pub rotated: bool,
    /// Source content size after rotation, before scaling
    pub content: PageDimensions,
    pub transform: Transform,
}

impl Placement {
    /// Placement that leaves the page exactly as authored
    pub fn unchanged(source: PageDimensions) -> Self {
        Self {
            target: source,
            rotated: false,
            content: source,
            transform: Transform::IDENTITY,
        }
    }

    /// True when the page can be copied without re-drawing it
    pub fn is_identity(&self) -> bool {
        !self.rotated && self.transform.is_identity() && self.target == self.content
    }

    /// Size of the content once scaled
    pub fn scaled(&self) -> PageDimensions {
        PageDimensions::new(
            self.content.width * self.transform.scale,
            self.content.height * self.transform.scale,
        )
    }

    /// The six `cm` operands mapping the source page box (origin at 0,0)
    /// onto the output page.
    pub fn content_matrix(&self) -> [f32; 6] {
        let Transform { scale, x, y } = self.transform;
        if self.rotated {
            // (u, v) -> (x + scale * (content.width - v), y + scale * u)
            [0.0, scale, -scale, 0.0, x + scale * self.content.width, y]
        } else {
            [scale, 0.0, 0.0, scale, x, y]
        }
    }
}

/// Compute the placement of one source page under `policy`.
///
/// Pages whose orientation disagrees with the target are turned by 90°. The
/// content is then scaled uniformly to fit the target page and centered on
/// it, unless it already matches the target within [`SIZE_TOLERANCE_PT`], in
/// which case the page keeps its own size.
pub fn compute_layout(source: PageDimensions, policy: &LayoutPolicy) -> Placement {
    let Some((target, target_portrait)) = policy.target() else {
        return Placement::unchanged(source);
    };

    // Auto and Fixed rotation take the same turn.
    let rotated = source.is_portrait() != target_portrait;
    let content = if rotated { source.swapped() } else { source };

    if content.approx_eq(&target, SIZE_TOLERANCE_PT) {
        return Placement {
            target: content,
            rotated,
            content,
            transform: Transform::IDENTITY,
        };
    }

    let scale_x = target.width / content.width;
    let scale_y = target.height / content.height;
    let scale = scale_x.min(scale_y);

    let scaled_width = content.width * scale;
    let scaled_height = content.height * scale;

    Placement {
        target,
        rotated,
        content,
        transform: Transform {
            scale,
            x: (target.width - scaled_width) / 2.0,
            y: (target.height - scaled_height) / 2.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn portrait(size: PaperSize) -> LayoutPolicy {
        LayoutPolicy::new(LayoutMode::ForcePortrait, size, RotationStrategy::Auto)
    }

    fn landscape(size: PaperSize) -> LayoutPolicy {
        LayoutPolicy::new(LayoutMode::ForceLandscape, size, RotationStrategy::Auto)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_keep_original_is_identity() {
        let policy = LayoutPolicy::default();
        for source in [
            PageDimensions::new(595.0, 842.0),
            PageDimensions::new(842.0, 595.0),
            PageDimensions::new(10.5, 2000.0),
        ] {
            let placement = compute_layout(source, &policy);
            assert_eq!(placement.target, source);
            assert!(!placement.rotated);
            assert_eq!(placement.transform, Transform::IDENTITY);
            assert!(placement.is_identity());
        }
    }

    #[test]
    fn test_a4_portrait_onto_a4_portrait() {
        let placement = compute_layout(PageDimensions::new(595.0, 842.0), &portrait(PaperSize::A4));
        assert!(!placement.rotated);
        assert_eq!(placement.transform, Transform::IDENTITY);
        assert_eq!(placement.target, PageDimensions::new(595.0, 842.0));
        assert!(placement.is_identity());
    }

    #[test]
    fn test_a4_landscape_rotated_to_portrait() {
        let placement = compute_layout(PageDimensions::new(842.0, 595.0), &portrait(PaperSize::A4));
        assert!(placement.rotated);
        assert_eq!(placement.content, PageDimensions::new(595.0, 842.0));
        assert_eq!(placement.transform, Transform::IDENTITY);
        assert!(!placement.is_identity());
    }

    #[test]
    fn test_square_page_fits_a4_portrait() {
        let placement = compute_layout(PageDimensions::new(1000.0, 1000.0), &portrait(PaperSize::A4));
        assert!(!placement.rotated);
        assert_close(placement.transform.scale, 0.595);
        let scaled = placement.scaled();
        assert_close(scaled.width, 595.0);
        assert_close(scaled.height, 595.0);
        assert_close(placement.transform.x, 0.0);
        assert_close(placement.transform.y, 123.5);
    }

    #[test]
    fn test_unknown_paper_size_falls_back_to_a4() {
        assert_eq!(PaperSize::from_name("Tabloid"), PaperSize::A4);
        assert_eq!(PaperSize::from_name(""), PaperSize::A4);
        assert_eq!(PaperSize::from_name("Tabloid").dimensions(), PageDimensions::new(595.0, 842.0));
        assert_eq!(PaperSize::from_name("letter"), PaperSize::Letter);
        assert_eq!(PaperSize::from_name(" A3 "), PaperSize::A3);
    }

    #[test]
    fn test_scaled_content_always_fits_and_is_centered() {
        let sources = [
            PageDimensions::new(100.0, 50.0),
            PageDimensions::new(300.0, 2000.0),
            PageDimensions::new(1191.0, 842.0),
            PageDimensions::new(612.0, 792.0),
            PageDimensions::new(4000.0, 4001.0),
        ];
        for size in PaperSize::ALL {
            for policy in [portrait(size), landscape(size)] {
                for source in sources {
                    let p = compute_layout(source, &policy);
                    let scaled = p.scaled();
                    assert!(scaled.width <= p.target.width + EPS, "{:?} {:?}", source, policy);
                    assert!(scaled.height <= p.target.height + EPS, "{:?} {:?}", source, policy);
                    assert!(p.transform.x >= -EPS && p.transform.y >= -EPS);
                    assert_close(p.transform.x, (p.target.width - scaled.width) / 2.0);
                    assert_close(p.transform.y, (p.target.height - scaled.height) / 2.0);
                }
            }
        }
    }

    #[test]
    fn test_rotation_swaps_content_dimensions() {
        let source = PageDimensions::new(300.0, 200.0);
        let p = compute_layout(source, &portrait(PaperSize::Letter));
        assert!(p.rotated);
        assert_eq!(p.content, PageDimensions::new(200.0, 300.0));

        let p = compute_layout(PageDimensions::new(200.0, 300.0), &landscape(PaperSize::Letter));
        assert!(p.rotated);
        assert_eq!(p.content, PageDimensions::new(300.0, 200.0));
    }

    #[test]
    fn test_landscape_page_shrinks_onto_catalog_size() {
        let p = compute_layout(PageDimensions::new(842.0, 595.0), &landscape(PaperSize::A4));
        assert!(!p.rotated);
        assert_eq!(p.target, PageDimensions::new(595.0, 842.0));
        assert_close(p.transform.scale, 595.0 / 842.0);
        assert_close(p.transform.x, 0.0);
        assert_close(p.transform.y, (842.0 - 595.0 * 595.0 / 842.0) / 2.0);
    }

    #[test]
    fn test_landscape_turns_portrait_pages() {
        let p = compute_layout(PageDimensions::new(595.0, 842.0), &landscape(PaperSize::A4));
        assert!(p.rotated);
        assert_eq!(p.content, PageDimensions::new(842.0, 595.0));
        assert_eq!(p.target, PaperSize::A4.dimensions());
        assert_close(p.transform.scale, 595.0 / 842.0);
        assert!(!p.is_identity());
    }

    #[test]
    fn test_near_match_skips_scaling() {
        // Real A4 is 595.28 × 841.89
        let source = PageDimensions::new(595.28, 841.89);
        let p = compute_layout(source, &portrait(PaperSize::A4));
        assert_eq!(p.transform, Transform::IDENTITY);
        assert_eq!(p.target, source);
        assert!(p.is_identity());

        let p = compute_layout(PageDimensions::new(841.89, 595.28), &portrait(PaperSize::A4));
        assert!(p.rotated);
        assert_eq!(p.transform, Transform::IDENTITY);
        assert_eq!(p.target, PageDimensions::new(595.28, 841.89));
    }

    #[test]
    fn test_just_outside_tolerance_is_scaled() {
        let p = compute_layout(PageDimensions::new(597.0, 842.0), &portrait(PaperSize::A4));
        assert!(p.transform.scale < 1.0);
        assert_eq!(p.target, PaperSize::A4.dimensions());
    }

    #[test]
    fn test_small_pages_scale_up() {
        let p = compute_layout(PaperSize::A5.dimensions(), &portrait(PaperSize::A4));
        assert_close(p.transform.scale, (595.0f32 / 420.0).min(842.0 / 595.0));
    }

    #[test]
    fn test_rotation_strategies_are_equivalent() {
        let source = PageDimensions::new(842.0, 595.0);
        let auto = compute_layout(source, &portrait(PaperSize::A3));
        let fixed = compute_layout(
            source,
            &LayoutPolicy::new(LayoutMode::ForcePortrait, PaperSize::A3, RotationStrategy::Fixed),
        );
        assert_eq!(auto, fixed);
    }

    #[test]
    fn test_content_matrix_rotated_maps_box_onto_target() {
        let source = PageDimensions::new(842.0, 595.0);
        let p = compute_layout(source, &portrait(PaperSize::A4));
        let [a, b, c, d, e, f] = p.content_matrix();
        let map = |u: f32, v: f32| (a * u + c * v + e, b * u + d * v + f);

        let (x0, y0) = map(0.0, 0.0);
        let (x1, y1) = map(source.width, source.height);
        let (min_x, max_x) = (x0.min(x1), x0.max(x1));
        let (min_y, max_y) = (y0.min(y1), y0.max(y1));
        assert_close(min_x, 0.0);
        assert_close(max_x, 595.0);
        assert_close(min_y, 0.0);
        assert_close(max_y, 842.0);
    }

    #[test]
    fn test_content_matrix_unrotated() {
        let p = compute_layout(PageDimensions::new(1000.0, 1000.0), &portrait(PaperSize::A4));
        let m = p.content_matrix();
        assert_close(m[0], 0.595);
        assert_eq!(m[1], 0.0);
        assert_eq!(m[2], 0.0);
        assert_close(m[3], 0.595);
        assert_close(m[5], 123.5);
    }

    #[test]
    fn test_mode_and_rotation_parsing() {
        assert_eq!("merge".parse::<LayoutMode>().unwrap(), LayoutMode::KeepOriginal);
        assert_eq!("portrait".parse::<LayoutMode>().unwrap(), LayoutMode::ForcePortrait);
        assert_eq!("Force-Landscape".parse::<LayoutMode>().unwrap(), LayoutMode::ForceLandscape);
        assert!("sideways".parse::<LayoutMode>().is_err());

        assert_eq!("manual".parse::<RotationStrategy>().unwrap(), RotationStrategy::Fixed);
        assert_eq!("auto".parse::<RotationStrategy>().unwrap(), RotationStrategy::Auto);
        assert!(matches!(
            "clockwise".parse::<RotationStrategy>(),
            Err(Error::InvalidOption(_))
        ));
    }
}
