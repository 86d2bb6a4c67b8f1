#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn sample_states() -> Vec<Transform> {
    vec![
        Transform::IDENTITY,
        Transform::new(12.5, -40.0, 1.0),
        Transform::new(-300.0, 220.0, 0.25),
        Transform::new(7.0, 3.0, 4.0),
        Transform::new(0.0, 0.0, MIN_SCALE),
    ]
}

fn sample_pivots() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(50.0, 50.0),
        Point::new(-20.0, 310.0),
        Point::new(640.0, 12.0),
    ]
}

// --- Point ---

#[test]
fn point_distance_is_euclidean() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

#[test]
fn point_midpoint() {
    let mid = Point::new(10.0, 20.0).midpoint(Point::new(30.0, 40.0));
    assert!(point_approx_eq(mid, Point::new(20.0, 30.0)));
}

#[test]
fn point_sub() {
    let d = Point::new(15.0, 5.0).sub(Point::new(5.0, 10.0));
    assert!(point_approx_eq(d, Point::new(10.0, -5.0)));
}

// --- Size ---

#[test]
fn size_zero_is_not_laid_out() {
    assert!(!Size::new(0.0, 100.0).is_laid_out());
    assert!(!Size::new(100.0, 0.0).is_laid_out());
    assert!(!Size::new(f64::NAN, 10.0).is_laid_out());
    assert!(Size::new(1.0, 1.0).is_laid_out());
}

#[test]
fn size_center() {
    assert!(point_approx_eq(Size::new(200.0, 100.0).center(), Point::new(100.0, 50.0)));
}

// --- Transform ---

#[test]
fn transform_default_is_identity() {
    let t = Transform::default();
    assert_eq!(t.dx, 0.0);
    assert_eq!(t.dy, 0.0);
    assert_eq!(t.scale, 1.0);
}

#[test]
fn screen_and_content_points_are_inverse() {
    let t = Transform::new(20.0, -10.0, 2.5);
    let p = Point::new(13.0, 7.0);
    assert!(point_approx_eq(t.content_point(t.screen_point(p)), p));
}

#[test]
fn css_string_format() {
    let t = Transform::new(-5.0, 12.5, 1.1);
    assert_eq!(t.css(), "translate(-5px, 12.5px) scale(1.1)");
}

// --- zoom_at_point ---

#[test]
fn zoom_keeps_pivot_fixed_on_screen() {
    for state in sample_states() {
        for pivot in sample_pivots() {
            for factor in [0.5, 0.9, 1.0, 1.1, 1.5, 3.0] {
                let anchor = state.content_point(pivot);
                let after = zoom_at_point(state, factor, pivot);
                if after.scale == state.scale * factor {
                    assert!(
                        point_approx_eq(after.screen_point(anchor), pivot),
                        "pivot moved: state={state:?} pivot={pivot:?} factor={factor}"
                    );
                }
            }
        }
    }
}

#[test]
fn zoom_keeps_pivot_fixed_when_floor_applies() {
    let state = Transform::new(30.0, 40.0, 0.2);
    let pivot = Point::new(100.0, 80.0);
    let anchor = state.content_point(pivot);
    let after = zoom_at_point(state, 0.1, pivot);
    assert_eq!(after.scale, MIN_SCALE);
    assert!(point_approx_eq(after.screen_point(anchor), pivot));
}

#[test]
fn zoom_scenario_from_identity() {
    let after = zoom_at_point(Transform::IDENTITY, 1.1, Point::new(50.0, 50.0));
    assert!(approx_eq(after.scale, 1.1));
    assert!(approx_eq(after.dx, -5.0));
    assert!(approx_eq(after.dy, -5.0));
}

#[test]
fn repeated_zoom_out_never_drops_below_floor() {
    let mut state = Transform::new(10.0, 10.0, 3.0);
    for _ in 0..200 {
        state = zoom_at_point(state, 0.7, Point::new(25.0, 60.0));
        assert!(state.scale >= MIN_SCALE);
    }
    assert_eq!(state.scale, MIN_SCALE);
}

#[test]
fn zoom_rejects_invalid_factors() {
    let state = Transform::new(1.0, 2.0, 3.0);
    assert_eq!(zoom_at_point(state, 0.0, Point::default()), state);
    assert_eq!(zoom_at_point(state, -1.0, Point::default()), state);
    assert_eq!(zoom_at_point(state, f64::NAN, Point::default()), state);
    assert_eq!(zoom_at_point(state, f64::INFINITY, Point::default()), state);
}

#[test]
fn zoom_has_no_upper_clamp() {
    let mut state = Transform::IDENTITY;
    for _ in 0..40 {
        state = zoom_at_point(state, 1.5, Point::default());
    }
    assert!(state.scale > 1000.0);
}

// --- zoom_at_point_bounded ---

#[test]
fn bounded_zoom_stops_at_max() {
    let after = zoom_at_point_bounded(Transform::new(0.0, 0.0, 7.5), 1.1, Point::default(), 8.0);
    assert_eq!(after.scale, 8.0);
}

#[test]
fn bounded_zoom_does_not_snap_down_a_pinched_scale() {
    let state = Transform::new(0.0, 0.0, 12.0);
    let after = zoom_at_point_bounded(state, 1.1, Point::default(), 8.0);
    assert_eq!(after.scale, 12.0);
}

#[test]
fn bounded_zoom_out_from_above_max_still_works() {
    let state = Transform::new(0.0, 0.0, 12.0);
    let after = zoom_at_point_bounded(state, 0.9, Point::default(), 8.0);
    assert!(approx_eq(after.scale, 10.8));
}

#[test]
fn bounded_zoom_keeps_pivot_fixed() {
    let state = Transform::new(-40.0, 15.0, 7.9);
    let pivot = Point::new(120.0, 90.0);
    let anchor = state.content_point(pivot);
    let after = zoom_at_point_bounded(state, 1.1, pivot, 8.0);
    assert!(point_approx_eq(after.screen_point(anchor), pivot));
}

// --- translate_by ---

#[test]
fn translate_accumulates() {
    let state = translate_by(translate_by(Transform::IDENTITY, 10.0, -5.0), 10.0, 5.0);
    assert!(approx_eq(state.dx, 20.0));
    assert!(approx_eq(state.dy, 0.0));
    assert_eq!(state.scale, 1.0);
}

#[test]
fn translate_is_unbounded() {
    let state = translate_by(Transform::IDENTITY, -1.0e7, 1.0e7);
    assert_eq!(state.dx, -1.0e7);
    assert_eq!(state.dy, 1.0e7);
}

// --- fit_to_bounds ---

#[test]
fn fit_scenario_wide_content() {
    let t = fit_to_bounds(Size::new(400.0, 300.0), Size::new(200.0, 300.0));
    assert!(approx_eq(t.scale, 0.5));
    assert!(approx_eq(t.dx, 0.0));
    assert!(approx_eq(t.dy, 75.0));
}

#[test]
fn fit_never_upscales() {
    let t = fit_to_bounds(Size::new(100.0, 50.0), Size::new(800.0, 600.0));
    assert_eq!(t.scale, 1.0);
    assert!(approx_eq(t.dx, 350.0));
    assert!(approx_eq(t.dy, 275.0));
}

#[test]
fn fit_is_idempotent() {
    let content = Size::new(913.0, 211.0);
    let container = Size::new(640.0, 480.0);
    assert_eq!(fit_to_bounds(content, container), fit_to_bounds(content, container));
}

#[test]
fn fit_zero_width_returns_identity() {
    let t = fit_to_bounds(Size::new(0.0, 300.0), Size::new(200.0, 300.0));
    assert_eq!(t, Transform::IDENTITY);
    assert!(!t.dx.is_nan() && !t.dy.is_nan() && !t.scale.is_nan());
}

#[test]
fn fit_zero_height_returns_identity() {
    assert_eq!(fit_to_bounds(Size::new(300.0, 0.0), Size::new(200.0, 300.0)), Transform::IDENTITY);
}

#[test]
fn fit_unlaid_container_returns_identity() {
    assert_eq!(fit_to_bounds(Size::new(300.0, 200.0), Size::new(0.0, 0.0)), Transform::IDENTITY);
}

#[test]
fn fit_respects_scale_floor() {
    let t = fit_to_bounds(Size::new(100_000.0, 100.0), Size::new(100.0, 100.0));
    assert_eq!(t.scale, MIN_SCALE);
}
