//! Input router: per-node gesture machines.
//!
//! Each wired diagram node gets one [`GestureMachine`]. Raw events go in,
//! at most one [`Intent`] comes out per event, plus flags telling the host
//! whether to suppress the browser default and whether the viewport
//! indicator should be recomputed.
//!
//! Mouse and touch drive the same logical states. A pan always computes its
//! offset from the anchor captured at gesture start; a pinch compares each
//! finger distance with the previous step.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::collections::HashMap;

use crate::config::Settings;
use crate::consts::{MAX_WHEEL_FACTOR, MIN_PINCH_DISTANCE_PX, MIN_WHEEL_FACTOR};
use crate::host::NodeHandle;
use crate::input::{Button, GestureState, HitTarget, InputEvent, Intent, Key, Modifiers, Pivot};
use crate::transform::{Point, Transform};
use crate::viewport::Throttle;

/// Container facts the router needs to interpret an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteContext {
    /// Current transform of the node's container (pan baseline).
    pub current: Transform,
    /// Touch input is left to the host.
    pub native_touch_events: bool,
    /// The container is folded; gestures are ignored.
    pub folded: bool,
}

/// Outcome of routing one event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Routed {
    /// Transform change to apply, if any.
    pub intent: Option<Intent>,
    /// The host should call `preventDefault` on the DOM event.
    pub prevent_default: bool,
    /// The viewport indicator should be recomputed.
    pub refresh_indicator: bool,
    /// The event makes this node the keyboard focus target.
    pub focus: bool,
}

impl Routed {
    fn consumed(intent: Option<Intent>) -> Self {
        Self { intent, prevent_default: true, ..Self::default() }
    }
}

/// Gesture state of one node. Ephemeral; dropped on detach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureMachine {
    state: GestureState,
    indicator: Throttle,
}

impl GestureMachine {
    #[must_use]
    pub fn new(indicator_throttle_ms: f64) -> Self {
        Self { state: GestureState::Idle, indicator: Throttle::new(indicator_throttle_ms) }
    }

    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    fn start_pan(&mut self, anchor: Point, current: Transform) {
        if matches!(self.state, GestureState::Panning { .. }) {
            tracing::debug!("pan restarted without a matching end event");
        }
        self.state = GestureState::Panning { anchor, baseline: current.offset(), last: anchor };
        self.indicator.reset();
    }

    fn pan_to(&mut self, pos: Point, now_ms: f64) -> Routed {
        let GestureState::Panning { anchor, baseline, .. } = self.state else {
            return Routed::default();
        };
        self.state = GestureState::Panning { anchor, baseline, last: pos };
        let mut routed = Routed::consumed(Some(Intent::PanFrom { baseline, offset: pos.sub(anchor) }));
        routed.refresh_indicator = self.indicator.ready(now_ms);
        routed
    }

    fn end(&mut self) -> Routed {
        if self.state.is_idle() {
            return Routed::default();
        }
        self.state = GestureState::Idle;
        Routed { refresh_indicator: true, ..Routed::default() }
    }

    /// Keep a drag in progress consistent with a transform that changed
    /// under it (wheel zoom, key step, panel command). The next move then
    /// continues from `current` instead of snapping back.
    pub fn rebase(&mut self, current: Transform) {
        if let GestureState::Panning { anchor, last, .. } = self.state {
            let baseline = current.offset().sub(last.sub(anchor));
            self.state = GestureState::Panning { anchor, baseline, last };
        }
    }

    /// Feed one event through the machine.
    pub fn handle(&mut self, ctx: RouteContext, event: &InputEvent, settings: &Settings, now_ms: f64) -> Routed {
        if ctx.folded {
            self.state = GestureState::Idle;
            return Routed::default();
        }
        if event.is_touch() && ctx.native_touch_events && !matches!(event, InputEvent::TouchEnd { .. }) {
            return Routed::default();
        }

        match event {
            InputEvent::PointerDown { pos, button, target } => {
                if *target == HitTarget::Panel || *button != Button::Primary {
                    return Routed::default();
                }
                self.start_pan(*pos, ctx.current);
                Routed { focus: true, ..Routed::consumed(None) }
            }
            InputEvent::PointerMove { pos } => self.pan_to(*pos, now_ms),
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => {
                if matches!(self.state, GestureState::Panning { .. }) {
                    self.end()
                } else {
                    Routed::default()
                }
            }
            InputEvent::Wheel { pos, delta, modifiers } => {
                if !settings.wheel_zoom_modifier.is_held(*modifiers) {
                    return Routed::default();
                }
                let intent = Intent::ZoomAt {
                    factor: wheel_factor(delta.dy, settings.wheel_sensitivity),
                    pivot: Pivot::At { point: *pos },
                    discrete: true,
                    animate: false,
                };
                Routed { refresh_indicator: true, focus: true, ..Routed::consumed(Some(intent)) }
            }
            InputEvent::TouchStart { touches, target } => {
                if *target == HitTarget::Panel {
                    return Routed::default();
                }
                match touches.as_slice() {
                    [] => Routed::default(),
                    [only] => {
                        self.start_pan(*only, ctx.current);
                        Routed { focus: true, ..Routed::consumed(None) }
                    }
                    [a, b, ..] => {
                        if matches!(self.state, GestureState::Pinching { .. }) {
                            tracing::debug!("pinch restarted without a matching end event");
                        }
                        self.state = GestureState::Pinching { baseline_distance: a.distance(*b) };
                        Routed { focus: true, ..Routed::consumed(None) }
                    }
                }
            }
            InputEvent::TouchMove { touches } => match (self.state, touches.as_slice()) {
                (GestureState::Pinching { baseline_distance }, [a, b, ..]) => {
                    let distance = a.distance(*b);
                    self.state = GestureState::Pinching { baseline_distance: distance };
                    if baseline_distance < MIN_PINCH_DISTANCE_PX {
                        return Routed::consumed(None);
                    }
                    let intent = Intent::ZoomAt {
                        factor: distance / baseline_distance,
                        pivot: Pivot::At { point: a.midpoint(*b) },
                        discrete: false,
                        animate: false,
                    };
                    let mut routed = Routed::consumed(Some(intent));
                    routed.refresh_indicator = self.indicator.ready(now_ms);
                    routed
                }
                (GestureState::Panning { .. }, [only]) => self.pan_to(*only, now_ms),
                _ => Routed::default(),
            },
            InputEvent::TouchEnd { .. } => self.end(),
            InputEvent::KeyDown { key, modifiers } => match key_intent(key, *modifiers, settings) {
                Some(intent) => Routed { focus: true, ..Routed::consumed(Some(intent)) },
                None => Routed::default(),
            },
            InputEvent::Focus => Routed { focus: true, ..Routed::default() },
        }
    }
}

/// Zoom factor of one wheel event: `1 - delta_y * k`, clamped to a sane range.
#[must_use]
pub fn wheel_factor(delta_y: f64, sensitivity: f64) -> f64 {
    (1.0 - delta_y * sensitivity).clamp(MIN_WHEEL_FACTOR, MAX_WHEEL_FACTOR)
}

/// Keyboard shortcut mapping. Arrow keys pan; Ctrl/Cmd with `=`/`+`, `-` and
/// `0` zoom in, zoom out and reset.
#[must_use]
pub fn key_intent(key: &Key, modifiers: Modifiers, settings: &Settings) -> Option<Intent> {
    let step = settings.pan_step_px;
    let intent = match (key.as_str(), modifiers.primary()) {
        ("ArrowLeft", _) => Intent::MoveBy { dx: -step, dy: 0.0, animate: true },
        ("ArrowRight", _) => Intent::MoveBy { dx: step, dy: 0.0, animate: true },
        ("ArrowUp", _) => Intent::MoveBy { dx: 0.0, dy: -step, animate: true },
        ("ArrowDown", _) => Intent::MoveBy { dx: 0.0, dy: step, animate: true },
        ("=" | "+", true) => {
            Intent::ZoomAt { factor: settings.zoom_in_factor, pivot: Pivot::Center, discrete: true, animate: true }
        }
        ("-", true) => {
            Intent::ZoomAt { factor: settings.zoom_out_factor, pivot: Pivot::Center, discrete: true, animate: true }
        }
        ("0", true) => Intent::Reset { animate: true },
        _ => return None,
    };
    Some(intent)
}

/// Owns the gesture machines of all attached nodes.
#[derive(Debug, Default)]
pub struct InputRouter {
    machines: HashMap<NodeHandle, GestureMachine>,
}

impl InputRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a machine to `node`. Returns `false` if one was already attached.
    pub fn attach(&mut self, node: NodeHandle, indicator_throttle_ms: f64) -> bool {
        if self.machines.contains_key(&node) {
            return false;
        }
        self.machines.insert(node, GestureMachine::new(indicator_throttle_ms));
        true
    }

    /// Drop the machine of `node`. Returns `false` if none was attached.
    pub fn detach(&mut self, node: NodeHandle) -> bool {
        self.machines.remove(&node).is_some()
    }

    #[must_use]
    pub fn is_attached(&self, node: NodeHandle) -> bool {
        self.machines.contains_key(&node)
    }

    /// Current gesture state of `node`, if attached.
    #[must_use]
    pub fn state(&self, node: NodeHandle) -> Option<GestureState> {
        self.machines.get(&node).map(GestureMachine::state)
    }

    /// Number of attached nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Returns `true` if no node is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Rebase a drag in progress on `node` onto `current`. No-op when idle.
    pub fn rebase(&mut self, node: NodeHandle, current: Transform) {
        if let Some(machine) = self.machines.get_mut(&node) {
            machine.rebase(current);
        }
    }

    /// Route `event` for `node`. Events for unattached nodes are ignored.
    pub fn route(
        &mut self,
        node: NodeHandle,
        ctx: RouteContext,
        event: &InputEvent,
        settings: &Settings,
        now_ms: f64,
    ) -> Routed {
        match self.machines.get_mut(&node) {
            Some(machine) => machine.handle(ctx, event, settings, now_ms),
            None => Routed::default(),
        }
    }
}
