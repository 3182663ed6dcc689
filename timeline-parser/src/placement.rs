#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gap kept between the cursor and the popup, and between the popup and the window edge.
pub const DEFAULT_PADDING: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Top-left origin for an element of `size` shown next to `cursor`.
///
/// Prefers right of and below the cursor, flipping to the other side on an axis
/// that would overflow `viewport`. The result is never closer than `padding` to
/// the top or left edge. Elements larger than the viewport still overflow.
#[must_use]
pub fn place(cursor: Point, size: Size, viewport: Size, padding: f64) -> Point {
    Point {
        x: place_axis(cursor.x, size.width, viewport.width, padding),
        y: place_axis(cursor.y, size.height, viewport.height, padding),
    }
}

fn place_axis(cursor: f64, length: f64, limit: f64, padding: f64) -> f64 {
    let origin = if cursor + length + padding > limit {
        cursor - length - padding
    } else {
        cursor + padding
    };

    origin.max(padding)
}
