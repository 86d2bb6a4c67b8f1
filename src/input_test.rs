use super::*;

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
    assert!(!m.primary());
}

#[test]
fn primary_is_ctrl_or_meta() {
    assert!(Modifiers { ctrl: true, ..Default::default() }.primary());
    assert!(Modifiers { meta: true, ..Default::default() }.primary());
    assert!(!Modifiers { alt: true, shift: true, ..Default::default() }.primary());
}

// =============================================================
// Button
// =============================================================

#[test]
fn button_from_dom_values() {
    assert_eq!(Button::from_dom(0), Button::Primary);
    assert_eq!(Button::from_dom(1), Button::Middle);
    assert_eq!(Button::from_dom(2), Button::Secondary);
    assert_eq!(Button::from_dom(7), Button::Primary);
}

// =============================================================
// InputEvent wire format
// =============================================================

#[test]
fn pointer_down_parses_from_host_json() {
    let ev: InputEvent = serde_json::from_str(r#"{"type":"pointer_down","pos":{"x":4,"y":5},"button":"primary"}"#)
        .expect("event should parse");
    assert_eq!(
        ev,
        InputEvent::PointerDown { pos: Point::new(4.0, 5.0), button: Button::Primary, target: HitTarget::Content }
    );
}

#[test]
fn wheel_parses_with_modifiers() {
    let ev: InputEvent = serde_json::from_str(
        r#"{"type":"wheel","pos":{"x":1,"y":2},"delta":{"dx":0,"dy":-120},"modifiers":{"ctrl":true}}"#,
    )
    .expect("event should parse");
    let InputEvent::Wheel { delta, modifiers, .. } = ev else {
        panic!("expected wheel event");
    };
    assert!((delta.dy + 120.0).abs() < f64::EPSILON);
    assert!(modifiers.ctrl);
    assert!(!modifiers.meta);
}

#[test]
fn touch_end_defaults_to_no_remaining_touches() {
    let ev: InputEvent = serde_json::from_str(r#"{"type":"touch_end"}"#).expect("event should parse");
    assert_eq!(ev, InputEvent::TouchEnd { touches: Vec::new() });
    assert!(ev.is_touch());
}

#[test]
fn key_down_parses_plain_key_string() {
    let ev: InputEvent =
        serde_json::from_str(r#"{"type":"key_down","key":"ArrowLeft"}"#).expect("event should parse");
    assert_eq!(ev, InputEvent::KeyDown { key: Key::new("ArrowLeft"), modifiers: Modifiers::default() });
}

#[test]
fn panel_target_parses() {
    let ev: InputEvent = serde_json::from_str(
        r#"{"type":"touch_start","touches":[{"x":0,"y":0}],"target":"panel"}"#,
    )
    .expect("event should parse");
    assert!(matches!(ev, InputEvent::TouchStart { target: HitTarget::Panel, .. }));
}

#[test]
fn unknown_event_type_is_rejected() {
    assert!(serde_json::from_str::<InputEvent>(r#"{"type":"hover"}"#).is_err());
}

#[test]
fn pointer_events_are_not_touch() {
    assert!(!InputEvent::PointerLeave.is_touch());
    assert!(!InputEvent::Focus.is_touch());
}

// =============================================================
// GestureState
// =============================================================

#[test]
fn gesture_state_defaults_to_idle() {
    assert!(GestureState::default().is_idle());
    assert!(!GestureState::Pinching { baseline_distance: 10.0 }.is_idle());
}
