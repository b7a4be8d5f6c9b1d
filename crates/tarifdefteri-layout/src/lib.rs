//! `tarifdefteri-layout` - Image placement geometry for recipe pages
//!
//! Images on a recipe page are stored as percentages of the page container so a
//! layout survives any viewport size. This crate converts between that stored
//! form and the pixel rectangles used while an image is dragged or resized.
//!
//! # Example
//!
//! ```
//! use tarifdefteri_layout::{on_drag_end, to_pixels, ContainerSize, FractionRect, PixelPoint};
//!
//! let page = ContainerSize::new(400.0, 600.0).unwrap();
//! let stored = FractionRect::new(10.0, 20.0, 25.0, 25.0);
//!
//! let pixels = to_pixels(stored, page);
//! assert_eq!(pixels.x, 40.0);
//!
//! // Dropped far past the right edge: the image stays on the page.
//! let moved = on_drag_end(PixelPoint::new(1_000.0, 60.0), page, stored);
//! assert_eq!(moved.x, 75.0);
//! assert_eq!(moved.y, 10.0);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Smallest edge, in pixels, an image may be resized to.
pub const MIN_PIXEL_SIZE: f64 = 50.0;

/// Full extent of a container axis in stored units.
const FULL: f64 = 100.0;

/// Measured pixel size of a page container.
///
/// Only finite, strictly positive sizes can be constructed, so no conversion
/// in this crate can divide by zero. A page that has not been laid out yet has
/// no `ContainerSize` at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    width: f64,
    height: f64,
}

impl ContainerSize {
    /// Create a container size, or `None` if either dimension is zero,
    /// negative or not finite.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    /// Container width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Container height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }
}

/// A rectangle stored as percentages (0-100) of its container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FractionRect {
    /// Left edge, percent of container width.
    pub x: f64,
    /// Top edge, percent of container height.
    pub y: f64,
    /// Width, percent of container width.
    pub width: f64,
    /// Height, percent of container height.
    pub height: f64,
}

impl FractionRect {
    /// Create a new fractional rectangle.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle lies entirely inside its container.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= FULL + f64::EPSILON * FULL
            && self.y + self.height <= FULL + f64::EPSILON * FULL
    }

    /// Pull the origin back so the rectangle stays inside its container.
    /// Size is unchanged; an oversized axis pins to 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_axis(self.x, self.width),
            y: clamp_axis(self.y, self.height),
            ..self
        }
    }

    /// Compare two rectangles field by field within `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// A position in container pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelPoint {
    /// Horizontal offset from the container's left edge.
    pub x: f64,
    /// Vertical offset from the container's top edge.
    pub y: f64,
}

impl PixelPoint {
    /// Create a new pixel point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in container pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub fn position(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }
}

/// Convert a stored rectangle to pixels for the given container.
#[must_use]
pub fn to_pixels(fraction: FractionRect, container: ContainerSize) -> PixelRect {
    PixelRect {
        x: fraction.x / FULL * container.width,
        y: fraction.y / FULL * container.height,
        width: fraction.width / FULL * container.width,
        height: fraction.height / FULL * container.height,
    }
}

/// Convert a pixel rectangle back to stored percentages without clamping.
#[must_use]
pub fn to_fraction(pixels: PixelRect, container: ContainerSize) -> FractionRect {
    FractionRect {
        x: pixels.x / container.width * FULL,
        y: pixels.y / container.height * FULL,
        width: pixels.width / container.width * FULL,
        height: pixels.height / container.height * FULL,
    }
}

/// Compute the stored rectangle after a drag ends at `position`.
///
/// Width and height are taken from `size` unchanged. The new position is
/// clamped so the image cannot leave its container.
#[must_use]
pub fn on_drag_end(
    position: PixelPoint,
    container: ContainerSize,
    size: FractionRect,
) -> FractionRect {
    FractionRect {
        x: clamp_axis(position.x / container.width * FULL, size.width),
        y: clamp_axis(position.y / container.height * FULL, size.height),
        width: size.width,
        height: size.height,
    }
}

/// Compute the stored rectangle after a resize ends, using [`MIN_PIXEL_SIZE`].
#[must_use]
pub fn on_resize_end(rect: PixelRect, container: ContainerSize) -> FractionRect {
    on_resize_end_with_floor(rect, container, MIN_PIXEL_SIZE)
}

/// Compute the stored rectangle after a resize ends.
///
/// Each edge is raised to at least `min_pixel_size` (never beyond the
/// container), then the position is clamped inside the container.
#[must_use]
pub fn on_resize_end_with_floor(
    rect: PixelRect,
    container: ContainerSize,
    min_pixel_size: f64,
) -> FractionRect {
    let width_px = floor_edge(rect.width, min_pixel_size, container.width);
    let height_px = floor_edge(rect.height, min_pixel_size, container.height);

    let width = width_px / container.width * FULL;
    let height = height_px / container.height * FULL;

    FractionRect {
        x: clamp_axis(rect.x / container.width * FULL, width),
        y: clamp_axis(rect.y / container.height * FULL, height),
        width,
        height,
    }
}

fn floor_edge(edge: f64, floor: f64, limit: f64) -> f64 {
    let edge = if edge.is_finite() { edge } else { floor };
    edge.max(floor).min(limit)
}

fn clamp_axis(position: f64, extent: f64) -> f64 {
    if !position.is_finite() {
        return 0.0;
    }
    let max = (FULL - extent).max(0.0);
    position.clamp(0.0, max)
}

/// Interaction state of the placements on a page.
///
/// Derived from whether the owning page is being edited; placements never
/// carry their own mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlacementMode {
    /// Static rendering at the stored position.
    #[default]
    View,
    /// Draggable and resizable, bounded to the page.
    Edit,
}

impl PlacementMode {
    /// Mode for the placements of a page with the given edit flag.
    #[must_use]
    pub fn for_page(editing: bool) -> Self {
        if editing {
            Self::Edit
        } else {
            Self::View
        }
    }

    /// Whether placements accept drag and resize gestures.
    #[must_use]
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Edit)
    }
}

impl std::fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::View => write!(f, "view"),
            Self::Edit => write!(f, "edit"),
        }
    }
}

/// Measured state of one page.
///
/// Holds the last valid container measurement and the page's placement mode.
/// Every conversion returns `None` until the page has been measured, and
/// gestures return `None` in view mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageLayout {
    container: Option<ContainerSize>,
    mode: PlacementMode,
    min_pixel_size: Option<f64>,
}

impl PageLayout {
    /// Create an unmeasured page layout.
    #[must_use]
    pub fn new(mode: PlacementMode) -> Self {
        Self {
            container: None,
            mode,
            min_pixel_size: None,
        }
    }

    /// Create a page layout that is already measured.
    #[must_use]
    pub fn measured(container: ContainerSize, mode: PlacementMode) -> Self {
        Self {
            container: Some(container),
            mode,
            min_pixel_size: None,
        }
    }

    /// Override the resize floor (defaults to [`MIN_PIXEL_SIZE`]).
    #[must_use]
    pub fn with_min_pixel_size(mut self, min_pixel_size: f64) -> Self {
        self.min_pixel_size = Some(min_pixel_size);
        self
    }

    /// Record a new container measurement.
    ///
    /// A zero or invalid measurement marks the page as not laid out. Stored
    /// fractions are never touched; callers re-derive pixels afterwards.
    /// Returns whether the page is now measured.
    pub fn measure(&mut self, width: f64, height: f64) -> bool {
        self.container = ContainerSize::new(width, height);
        self.container.is_some()
    }

    /// The current container measurement, if any.
    #[must_use]
    pub fn container(&self) -> Option<ContainerSize> {
        self.container
    }

    /// The current placement mode.
    #[must_use]
    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Switch the page between view and edit mode.
    pub fn set_editing(&mut self, editing: bool) {
        self.mode = PlacementMode::for_page(editing);
    }

    /// Pixel rectangle for a stored placement under the current measurement.
    #[must_use]
    pub fn pixel_rect(&self, fraction: FractionRect) -> Option<PixelRect> {
        self.container.map(|c| to_pixels(fraction, c))
    }

    /// Apply a finished drag, or `None` if the page is unmeasured or in view mode.
    #[must_use]
    pub fn drag_end(&self, position: PixelPoint, current: FractionRect) -> Option<FractionRect> {
        let container = self.interactive_container()?;
        Some(on_drag_end(position, container, current))
    }

    /// Apply a finished resize, or `None` if the page is unmeasured or in view mode.
    #[must_use]
    pub fn resize_end(&self, rect: PixelRect) -> Option<FractionRect> {
        let container = self.interactive_container()?;
        let floor = self.min_pixel_size.unwrap_or(MIN_PIXEL_SIZE);
        Some(on_resize_end_with_floor(rect, container, floor))
    }

    fn interactive_container(&self) -> Option<ContainerSize> {
        if self.mode.is_interactive() {
            self.container
        } else {
            None
        }
    }
}
