//! Actions: the only place container state changes.
//!
//! Each action resolves the record, runs the pure transform math, writes the
//! result back and returns a [`RenderUpdate`] for the caller to present.
//! `animate` is carried through untouched; it never changes the numbers.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use crate::config::PanelVisibilityScope;
use crate::host::Measurements;
use crate::input::{Intent, Pivot};
use crate::registry::ContainerKey;
use crate::store::{PanelPolicy, StateStore};
use crate::transform::{self, Point, Transform};

/// New transform of one container, ready to render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderUpdate {
    pub transform: Transform,
    pub animate: bool,
}

fn commit(store: &mut StateStore, key: &ContainerKey, next: Transform, animate: bool) -> RenderUpdate {
    store.state_mut(key).transform = next;
    RenderUpdate { transform: next, animate }
}

/// Shift by `(ddx, ddy)` pixels.
pub fn move_by(store: &mut StateStore, key: &ContainerKey, ddx: f64, ddy: f64, animate: bool) -> RenderUpdate {
    let next = transform::translate_by(store.transform(key), ddx, ddy);
    commit(store, key, next, animate)
}

/// Set the translation to `baseline + offset`, keeping the scale.
pub fn pan_from(store: &mut StateStore, key: &ContainerKey, baseline: Point, offset: Point) -> RenderUpdate {
    let current = store.transform(key);
    let next = Transform { dx: baseline.x + offset.x, dy: baseline.y + offset.y, scale: current.scale };
    commit(store, key, next, false)
}

/// Zoom about `pivot` with only the scale floor applied.
pub fn zoom_by(store: &mut StateStore, key: &ContainerKey, factor: f64, pivot: Point, animate: bool) -> RenderUpdate {
    let next = transform::zoom_at_point(store.transform(key), factor, pivot);
    commit(store, key, next, animate)
}

/// Discrete zoom step about `pivot`, clamped above at `max_scale`.
pub fn zoom_step(
    store: &mut StateStore,
    key: &ContainerKey,
    factor: f64,
    pivot: Point,
    max_scale: f64,
    animate: bool,
) -> RenderUpdate {
    let next = transform::zoom_at_point_bounded(store.transform(key), factor, pivot, max_scale);
    commit(store, key, next, animate)
}

/// Fit the content into the container. Unknown or zero sizes reset to identity.
pub fn reset_to_fit(
    store: &mut StateStore,
    key: &ContainerKey,
    measurements: Option<Measurements>,
    animate: bool,
) -> RenderUpdate {
    let next = measurements.map_or(Transform::IDENTITY, |m| transform::fit_to_bounds(m.content, m.container));
    commit(store, key, next, animate)
}

/// Apply a gesture intent.
///
/// `measurements` resolve [`Pivot::Center`] and fitting; when the host cannot
/// measure the node a centered zoom pivots on the container origin.
pub fn apply(
    store: &mut StateStore,
    key: &ContainerKey,
    intent: Intent,
    measurements: Option<Measurements>,
    max_step_scale: f64,
) -> RenderUpdate {
    match intent {
        Intent::PanFrom { baseline, offset } => pan_from(store, key, baseline, offset),
        Intent::MoveBy { dx, dy, animate } => move_by(store, key, dx, dy, animate),
        Intent::ZoomAt { factor, pivot, discrete, animate } => {
            let pivot = match pivot {
                Pivot::At { point } => point,
                Pivot::Center => measurements.map_or_else(Point::default, |m| m.container.center()),
            };
            if discrete {
                zoom_step(store, key, factor, pivot, max_step_scale, animate)
            } else {
                zoom_by(store, key, factor, pivot, animate)
            }
        }
        Intent::Reset { animate } => reset_to_fit(store, key, measurements, animate),
    }
}

/// Flip whether touch gestures are left to the host. Returns the new value.
pub fn toggle_native_touch(store: &mut StateStore, key: &ContainerKey) -> bool {
    let state = store.state_mut(key);
    state.native_touch_events = !state.native_touch_events;
    state.native_touch_events
}

/// Flip panel visibility under the configured scope. Returns the new value.
pub fn toggle_panels(store: &mut StateStore, key: &ContainerKey) -> bool {
    let policy = store.panel_policy();
    match policy.scope {
        PanelVisibilityScope::Global => {
            let visible = !policy.global_visible;
            store.set_panel_policy(PanelPolicy { global_visible: visible, ..policy });
            visible
        }
        PanelVisibilityScope::PerContainer => {
            let visible = !store.panels_visible(key);
            store.state_mut(key).panels_visible = visible;
            visible
        }
    }
}

/// Flip the fullscreen flag. Returns the new value.
pub fn toggle_fullscreen(store: &mut StateStore, key: &ContainerKey) -> bool {
    let state = store.state_mut(key);
    state.fullscreen = !state.fullscreen;
    state.fullscreen
}
