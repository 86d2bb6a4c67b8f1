//! Viewport indicator: which part of the diagram is currently visible.
//!
//! Recomputed while the user drags, so updates go through a [`Throttle`]
//! driven by host timestamps.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::host::Measurements;
use crate::transform::{Point, Transform};

/// Visible part of the content, as fractions of the content box in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl VisibleRegion {
    pub const FULL: Self = Self { x: 0.0, y: 0.0, width: 1.0, height: 1.0 };
}

/// Compute the visible region of the content under `transform`.
///
/// Content that is not laid out reports the full region.
#[must_use]
pub fn visible_region(transform: Transform, measurements: Measurements) -> VisibleRegion {
    let content = measurements.content;
    let container = measurements.container;
    if !content.is_laid_out() || !container.is_laid_out() {
        return VisibleRegion::FULL;
    }
    let top_left = transform.content_point(Point::new(0.0, 0.0));
    let bottom_right = transform.content_point(Point::new(container.width, container.height));

    let x0 = (top_left.x / content.width).clamp(0.0, 1.0);
    let y0 = (top_left.y / content.height).clamp(0.0, 1.0);
    let x1 = (bottom_right.x / content.width).clamp(0.0, 1.0);
    let y1 = (bottom_right.y / content.height).clamp(0.0, 1.0);

    VisibleRegion { x: x0, y: y0, width: x1 - x0, height: y1 - y0 }
}

/// Lets an action through at most once per `interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    #[must_use]
    pub fn new(interval_ms: f64) -> Self {
        Self { interval_ms, last_ms: None }
    }

    /// Returns `true` and records `now_ms` when the interval has elapsed.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    /// Forget the last firing so the next call passes.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
