//! Resolved settings snapshot supplied by the host.
//!
//! The host owns the settings UI and persistence; the engine only receives a
//! JSON snapshot. Every field has a default, so a partial (or empty) object is
//! a valid snapshot.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_EXPORT_PREFIX, DEFAULT_INDICATOR_THROTTLE_MS, DEFAULT_LATE_CONTENT_TIMEOUT_MS, DEFAULT_MAX_STEP_SCALE,
    DEFAULT_PAN_STEP_PX, DEFAULT_WHEEL_SENSITIVITY, DEFAULT_ZOOM_IN_FACTOR, DEFAULT_ZOOM_OUT_FACTOR, MIN_SCALE,
};
use crate::input::Modifiers;

/// Error returned by [`Settings::from_json`] and [`Settings::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The snapshot is not valid JSON or has wrongly typed fields.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field parsed but holds a value the engine cannot use.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Modifier that turns a wheel event into a zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomModifier {
    /// Ctrl on Windows/Linux, Cmd on macOS (either is accepted).
    #[default]
    Primary,
    Alt,
    Shift,
}

impl ZoomModifier {
    /// Whether `modifiers` satisfies this gate.
    #[must_use]
    pub fn is_held(self, modifiers: Modifiers) -> bool {
        match self {
            Self::Primary => modifiers.ctrl || modifiers.meta,
            Self::Alt => modifiers.alt,
            Self::Shift => modifiers.shift,
        }
    }
}

/// Where the panel visibility toggle is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelVisibilityScope {
    /// Each container remembers its own visibility.
    #[default]
    PerContainer,
    /// One engine-wide flag shared by every container.
    Global,
}

/// Resolved configuration snapshot.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Modifier that must be held for wheel zoom.
    pub wheel_zoom_modifier: ZoomModifier,
    /// `k` in `factor = 1 - delta_y * k`.
    pub wheel_sensitivity: f64,
    /// Distance of one keyboard/panel move step, in pixels.
    pub pan_step_px: f64,
    /// Factor of one zoom-in step.
    pub zoom_in_factor: f64,
    /// Factor of one zoom-out step.
    pub zoom_out_factor: f64,
    /// Upper scale clamp for discrete zoom steps.
    pub max_step_scale: f64,
    /// Storage scope of the panel visibility toggle.
    pub panel_scope: PanelVisibilityScope,
    /// Initial panel visibility.
    pub panels_visible_by_default: bool,
    /// Fold newly wired diagrams.
    pub fold_on_wire: bool,
    /// Fit newly created containers to their box. Off: new records start at identity.
    pub fit_on_wire: bool,
    /// Minimum interval between viewport indicator updates during a drag.
    pub indicator_throttle_ms: f64,
    /// How long an empty content root is watched for late diagrams.
    pub late_content_timeout_ms: f64,
    /// Prefix of exported file names.
    pub export_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wheel_zoom_modifier: ZoomModifier::default(),
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
            pan_step_px: DEFAULT_PAN_STEP_PX,
            zoom_in_factor: DEFAULT_ZOOM_IN_FACTOR,
            zoom_out_factor: DEFAULT_ZOOM_OUT_FACTOR,
            max_step_scale: DEFAULT_MAX_STEP_SCALE,
            panel_scope: PanelVisibilityScope::default(),
            panels_visible_by_default: true,
            fold_on_wire: false,
            fit_on_wire: false,
            indicator_throttle_ms: DEFAULT_INDICATOR_THROTTLE_MS,
            late_content_timeout_ms: DEFAULT_LATE_CONTENT_TIMEOUT_MS,
            export_prefix: DEFAULT_EXPORT_PREFIX.to_owned(),
        }
    }
}

impl Settings {
    /// Parse and validate a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every numeric field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("wheel_sensitivity", self.wheel_sensitivity)?;
        positive("pan_step_px", self.pan_step_px)?;
        positive("indicator_throttle_ms", self.indicator_throttle_ms)?;
        positive("late_content_timeout_ms", self.late_content_timeout_ms)?;
        if !(self.zoom_in_factor.is_finite() && self.zoom_in_factor > 1.0) {
            return Err(invalid("zoom_in_factor", "must be greater than 1"));
        }
        if !(self.zoom_out_factor.is_finite() && self.zoom_out_factor > 0.0 && self.zoom_out_factor < 1.0) {
            return Err(invalid("zoom_out_factor", "must be between 0 and 1"));
        }
        if !(self.max_step_scale.is_finite() && self.max_step_scale >= MIN_SCALE) {
            return Err(invalid("max_step_scale", &format!("must be at least {MIN_SCALE}")));
        }
        if self.export_prefix.trim().is_empty() {
            return Err(invalid("export_prefix", "must not be empty"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive number"))
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_owned() }
}
