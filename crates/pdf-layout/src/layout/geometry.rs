//! Geometry primitives
//!
//! Rectangles and PDF affine transforms. A [`Transform`] uses the PDF
//! matrix layout `[a b c d e f]`, mapping `(x, y)` to
//! `(a*x + c*y + e, b*x + d*y + f)`.

use crate::types::{LayoutError, PageRotation, Result};

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from PDF box corners `[llx lly urx ury]`, normalizing swapped corners
    pub fn from_corners(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self::new(
            llx.min(urx),
            lly.min(ury),
            (urx - llx).abs(),
            (ury - lly).abs(),
        )
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            self.width - 2.0 * amount,
            self.height - 2.0 * amount,
        )
    }

    /// Whether both dimensions are strictly positive and finite
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Whether `other` lies inside this rectangle, allowing `tolerance` points of slack
    pub fn contains_rect(&self, other: &Rect, tolerance: f32) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.top() <= self.top() + tolerance
    }
}

/// An affine transform in PDF matrix form
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f32, ty: f32) -> Self {
        Transform {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Transform {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise rotation about the origin, exact for quarter turns
    pub fn rotate_clockwise(rotation: PageRotation) -> Self {
        let (a, b, c, d) = match rotation {
            PageRotation::None => (1.0, 0.0, 0.0, 1.0),
            PageRotation::Clockwise90 => (0.0, -1.0, 1.0, 0.0),
            PageRotation::Clockwise180 => (-1.0, 0.0, 0.0, -1.0),
            PageRotation::Clockwise270 => (0.0, 1.0, -1.0, 0.0),
        };
        Transform {
            a,
            b,
            c,
            d,
            e: 0.0,
            f: 0.0,
        }
    }

    /// The transform that applies `inner` first, then `self`.
    ///
    /// Matches content-stream order: emitting `self` as a `cm` before
    /// `inner` yields `self.concat(inner)`.
    pub fn concat(&self, inner: &Transform) -> Transform {
        Transform {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    /// Map a point through the transform
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Axis-aligned bounds of a rectangle after transformation
    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.apply(rect.x, rect.y),
            self.apply(rect.right(), rect.y),
            self.apply(rect.x, rect.top()),
            self.apply(rect.right(), rect.top()),
        ];
        let min_x = corners.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Content stream operand form (`a b c d e f`)
    pub fn to_operands(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

/// Compose `translate ∘ rotate ∘ scale`: points are scaled, then rotated,
/// then translated.
pub fn compose_transform(translate: (f32, f32), rotate: Transform, scale: f32) -> Transform {
    Transform::translate(translate.0, translate.1)
        .concat(&rotate)
        .concat(&Transform::scale(scale, scale))
}

/// Displayed `(width, height)` of a box once the page rotation is applied.
///
/// Quarter turns swap the dimensions; 0 and 180 leave them unchanged.
pub fn rotated_bounds(content_box: &Rect, rotation: PageRotation) -> (f32, f32) {
    if rotation.is_quarter_turn() {
        (content_box.height, content_box.width)
    } else {
        (content_box.width, content_box.height)
    }
}

/// Uniform scale that fits `src` inside `cell` while preserving aspect ratio.
pub fn fit_scale(src_w: f32, src_h: f32, cell_w: f32, cell_h: f32) -> Result<f32> {
    if !(cell_w > 0.0 && cell_h > 0.0) {
        return Err(LayoutError::InvalidLayout(format!(
            "cell has non-positive size {}x{}",
            cell_w, cell_h
        )));
    }
    if !(src_w > 0.0 && src_h > 0.0) {
        return Err(LayoutError::InvalidLayout(format!(
            "source content has non-positive size {}x{}",
            src_w, src_h
        )));
    }
    Ok((cell_w / src_w).min(cell_h / src_h))
}
