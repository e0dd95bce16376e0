//! Coordinate-space-tagged geometry.
//!
//! A rectangle is meaningless without knowing which space it lives in, so
//! viewport (on-screen layout) and native (decoded camera pixels) rectangles
//! are distinct types. The only way from one to the other is the explicit
//! conversion in `alignment::domain::reconciler`.

/// On-screen layout rectangle in logical (CSS-style) pixels, origin at the
/// page/window top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        debug_assert!(
            width >= 0.0 && height >= 0.0,
            "rectangle dimensions must be non-negative"
        );
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Rectangle in the camera's decoded pixel space, origin at the frame's
/// top-left. Independent of how large the video is rendered on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NativeRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NativeRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        debug_assert!(
            width >= 0.0 && height >= 0.0,
            "rectangle dimensions must be non-negative"
        );
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Full containment of `inner` within `self`, edges inclusive.
    ///
    /// An inner edge exactly on an outer edge counts as contained.
    pub fn contains(&self, inner: &NativeRect) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.right() <= self.right()
            && inner.bottom() <= self.bottom()
    }
}

/// Decoded camera resolution. Both dimensions are zero until the stream has
/// produced its first decodable frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeSize {
    pub width: u32,
    pub height: u32,
}

impl NativeSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// False while either dimension is still zero (stream not ready).
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
