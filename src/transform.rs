#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_SCALE;

/// A point in container-local or content space (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self { x: (self.x + other.x) * 0.5, y: (self.y + other.y) * 0.5 }
    }
}

/// A width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and strictly positive.
    #[must_use]
    pub fn is_laid_out(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// The center point of a box of this size anchored at the origin.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// View transform of one diagram: translate by `(dx, dy)` then scale uniformly.
///
/// A content-space point `p` lands at `(p.x * scale + dx, p.y * scale + dy)`
/// in container space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self { dx: 0.0, dy: 0.0, scale: 1.0 };

    #[must_use]
    pub fn new(dx: f64, dy: f64, scale: f64) -> Self {
        Self { dx, dy, scale }
    }

    /// Map a content-space point to container space.
    #[must_use]
    pub fn screen_point(&self, content: Point) -> Point {
        Point { x: content.x * self.scale + self.dx, y: content.y * self.scale + self.dy }
    }

    /// Map a container-space point back to content space.
    #[must_use]
    pub fn content_point(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.dx) / self.scale, y: (screen.y - self.dy) / self.scale }
    }

    /// The translation part as a point.
    #[must_use]
    pub fn offset(&self) -> Point {
        Point::new(self.dx, self.dy)
    }

    /// CSS `transform` value for this view transform.
    ///
    /// The origin of the transformed element must be its top-left corner
    /// (`transform-origin: 0 0`) for the string to match [`Self::screen_point`].
    #[must_use]
    pub fn css(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.dx, self.dy, self.scale)
    }
}

/// Floor `scale` at [`MIN_SCALE`].
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    scale.max(MIN_SCALE)
}

/// Zoom by `factor` while keeping `pivot` (container space) fixed on screen.
///
/// Non-positive or non-finite factors leave the transform unchanged.
#[must_use]
pub fn zoom_at_point(state: Transform, factor: f64, pivot: Point) -> Transform {
    if !factor.is_finite() || factor <= 0.0 {
        return state;
    }
    let new_scale = clamp_scale(state.scale * factor);
    rescale_about(state, new_scale, pivot)
}

/// Like [`zoom_at_point`], but a discrete step never pushes the scale above `max`.
///
/// A scale that is already above `max` (a pinch can get there) is kept as is
/// rather than snapped down.
#[must_use]
pub fn zoom_at_point_bounded(state: Transform, factor: f64, pivot: Point, max: f64) -> Transform {
    if !factor.is_finite() || factor <= 0.0 {
        return state;
    }
    let mut new_scale = clamp_scale(state.scale * factor);
    if new_scale > max {
        new_scale = state.scale.max(max).min(new_scale);
    }
    rescale_about(state, new_scale, pivot)
}

fn rescale_about(state: Transform, new_scale: f64, pivot: Point) -> Transform {
    let ratio = new_scale / state.scale;
    Transform {
        dx: pivot.x - (pivot.x - state.dx) * ratio,
        dy: pivot.y - (pivot.y - state.dy) * ratio,
        scale: new_scale,
    }
}

/// Shift the transform by `(ddx, ddy)` pixels. Panning is unbounded.
#[must_use]
pub fn translate_by(state: Transform, ddx: f64, ddy: f64) -> Transform {
    Transform { dx: state.dx + ddx, dy: state.dy + ddy, scale: state.scale }
}

/// Transform that fits `content` inside `container`, centered, never upscaling.
///
/// Content or container without a usable size (not laid out yet) yields the
/// identity transform.
#[must_use]
pub fn fit_to_bounds(content: Size, container: Size) -> Transform {
    if !content.is_laid_out() || !container.is_laid_out() {
        tracing::debug!(?content, ?container, "fit skipped: zero-size box");
        return Transform::IDENTITY;
    }
    let scale = clamp_scale(
        (container.width / content.width)
            .min(container.height / content.height)
            .min(1.0),
    );
    Transform {
        dx: (container.width - content.width * scale) / 2.0,
        dy: (container.height - content.height * scale) / 2.0,
        scale,
    }
}
