//! Shared numeric constants for the interaction engine.

// ── Transform ───────────────────────────────────────────────────

/// Hard floor for the uniform scale. No gesture may go below it.
pub const MIN_SCALE: f64 = 0.125;

/// Default upper clamp applied to discrete zoom steps (wheel, keyboard, panel buttons).
pub const DEFAULT_MAX_STEP_SCALE: f64 = 8.0;

// ── Wheel ───────────────────────────────────────────────────────

/// Default wheel sensitivity `k` in `factor = 1 - delta_y * k`.
pub const DEFAULT_WHEEL_SENSITIVITY: f64 = 0.002;

/// Lower bound of a single wheel zoom factor, so a large delta cannot flip the sign.
pub const MIN_WHEEL_FACTOR: f64 = 0.5;

/// Upper bound of a single wheel zoom factor.
pub const MAX_WHEEL_FACTOR: f64 = 1.5;

// ── Keyboard / panel steps ──────────────────────────────────────

/// Distance in pixels of one arrow-key or panel move step.
pub const DEFAULT_PAN_STEP_PX: f64 = 50.0;

/// Zoom factor of one zoom-in step.
pub const DEFAULT_ZOOM_IN_FACTOR: f64 = 1.1;

/// Zoom factor of one zoom-out step.
pub const DEFAULT_ZOOM_OUT_FACTOR: f64 = 0.9;

// ── Gestures ────────────────────────────────────────────────────

/// Pinch baselines shorter than this (in pixels) are ignored to avoid huge factors.
pub const MIN_PINCH_DISTANCE_PX: f64 = 1.0;

// ── Timing ──────────────────────────────────────────────────────

/// Minimum interval between viewport indicator recomputations during a drag.
pub const DEFAULT_INDICATOR_THROTTLE_MS: f64 = 100.0;

/// How long a content root is watched for late-rendered diagrams.
pub const DEFAULT_LATE_CONTENT_TIMEOUT_MS: f64 = 5000.0;

// ── Export ──────────────────────────────────────────────────────

/// Default prefix for exported file names.
pub const DEFAULT_EXPORT_PREFIX: &str = "dmz";

/// XML preface written in front of exported SVG documents.
pub const SVG_XML_PREFACE: &str = r#"<?xml version="1.0"?>"#;
