#![forbid(unsafe_code)]

//! Geometric primitives read from the host page.

/// Viewport readings supplied by the host on every scroll notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportMetrics {
    /// Pixels between the top of the document and the top of the viewport.
    pub scroll_y: u32,
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Viewport height in CSS pixels.
    pub height: u32,
}

impl ViewportMetrics {
    #[inline]
    pub const fn new(scroll_y: u32, width: u32, height: u32) -> Self {
        Self {
            scroll_y,
            width,
            height,
        }
    }

    /// Same viewport, different scroll offset.
    #[inline]
    #[must_use]
    pub const fn with_scroll(self, scroll_y: u32) -> Self {
        Self { scroll_y, ..self }
    }

    /// Whether the viewport is narrower than `breakpoint`.
    #[inline]
    pub const fn is_narrow(&self, breakpoint: u32) -> bool {
        self.width < breakpoint
    }

    /// Build metrics from raw host floats, rounding up and clamping at zero.
    ///
    /// Rounding up keeps every integer threshold test exact: for integer `t`,
    /// `y > t` and `y >= t` hold for the fractional reading exactly when they
    /// hold for its ceiling.
    #[must_use]
    pub fn from_host(scroll_y: f64, width: f64, height: f64) -> Self {
        Self::new(px_to_u32(scroll_y), px_to_u32(width), px_to_u32(height))
    }
}

fn px_to_u32(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.ceil().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// A navigable page section. Geometry is queried once at page-ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Unique element id (anchor target without `#`).
    pub id: String,
    /// Distance from the document top in pixels.
    pub offset: i64,
    /// Rendered height in pixels.
    pub height: i64,
}

impl Section {
    pub fn new(id: impl Into<String>, offset: i64, height: i64) -> Self {
        Self {
            id: id.into(),
            offset,
            height,
        }
    }
}

/// Element bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Length of the longer side.
    #[inline]
    pub fn longest_side(&self) -> f64 {
        self.width.max(self.height)
    }
}

/// A pointer position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Format a pixel/number value the way inline styles expect it.
///
/// Rounds to two decimals and drops trailing zeros (`30.000001` → `30`).
pub(crate) fn css_number(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        // Avoid "-0".
        return "0".to_owned();
    }
    format!("{rounded}")
}
