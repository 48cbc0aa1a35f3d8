//! Configuration for viewport physics and controls
//!
//! Tuning comes in presets per map mode (`Nearby`, `Global`) or as a custom
//! [`ViewportConfig`], which can also be loaded from JSON. Every preset
//! resolves to a complete, validated configuration.

use crate::animation::interpolation::EasingFunction;
use crate::constants::*;
use crate::core::bounds::PanBounds;
use crate::core::viewport::ViewportState;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Which view a map screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Points around the user; tight pan limits
    #[default]
    Nearby,
    /// Every known point; wider pan limits and deeper zoom
    Global,
}

impl MapMode {
    pub fn profile(self) -> InteractionProfile {
        match self {
            MapMode::Nearby => InteractionProfile::Nearby,
            MapMode::Global => InteractionProfile::Global,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionProfile {
    #[default]
    Nearby,
    Global,
    Custom(ViewportConfig),
}

impl InteractionProfile {
    pub fn resolve(&self) -> ViewportConfig {
        match self {
            Self::Nearby => ViewportConfig::default(),
            Self::Global => ViewportConfig {
                min_scale: 0.5,
                max_scale: 3.0,
                bounds_max: 800.0,
                resistance_factor: 0.3,
                ..ViewportConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

/// Tuning for the viewport: scale limits, pan bounds, inertia and settle timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Absolute offset per axis reachable without resistance
    pub bounds_max: f64,
    /// Share of the overshoot kept beyond `bounds_max`, in `(0, 1)`
    pub resistance_factor: f64,
    /// Per-frame velocity multiplier while coasting, in `(0, 1)`
    pub friction_factor: f64,
    /// Extra velocity multiplier on an axis that hit the bounds, in `(0, 1]`
    pub boundary_damping: f64,
    /// Coasting stops when both velocity components are below this
    pub velocity_stop_threshold: f64,
    /// Coasting starts when either release velocity component exceeds this
    pub inertia_start_threshold: f64,
    pub zoom_step: f64,
    /// Length of one velocity frame, in milliseconds
    pub frame_interval_ms: f64,
    pub settle_duration_ms: f64,
    pub settle_easing: EasingFunction,
    /// Pull the offset back inside the bounds once a release or coast ends
    /// in the overshoot zone
    pub spring_back: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            bounds_max: DEFAULT_BOUNDS_MAX,
            resistance_factor: DEFAULT_RESISTANCE,
            friction_factor: DEFAULT_FRICTION,
            boundary_damping: DEFAULT_BOUNDARY_DAMPING,
            velocity_stop_threshold: DEFAULT_VELOCITY_STOP_THRESHOLD,
            inertia_start_threshold: DEFAULT_INERTIA_START_THRESHOLD,
            zoom_step: DEFAULT_ZOOM_STEP,
            frame_interval_ms: FRAME_INTERVAL_MS,
            settle_duration_ms: DEFAULT_SETTLE_DURATION_MS,
            settle_easing: EasingFunction::EaseOutCubic,
            spring_back: false,
        }
    }
}

impl ViewportConfig {
    /// Parses a configuration from JSON and validates it.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ViewportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let checks: [(bool, &str); 10] = [
            (
                self.min_scale > 0.0 && self.min_scale <= 1.0,
                "min_scale must be in (0, 1]",
            ),
            (self.max_scale >= 1.0, "max_scale must be at least 1"),
            (
                self.bounds_max.is_finite() && self.bounds_max >= 0.0,
                "bounds_max must be a non-negative number",
            ),
            (
                self.resistance_factor > 0.0 && self.resistance_factor < 1.0,
                "resistance_factor must be in (0, 1)",
            ),
            (
                self.friction_factor > 0.0 && self.friction_factor < 1.0,
                "friction_factor must be in (0, 1)",
            ),
            (
                self.boundary_damping > 0.0 && self.boundary_damping <= 1.0,
                "boundary_damping must be in (0, 1]",
            ),
            (
                self.velocity_stop_threshold > 0.0,
                "velocity_stop_threshold must be positive",
            ),
            (
                self.inertia_start_threshold >= 0.0,
                "inertia_start_threshold must not be negative",
            ),
            (self.zoom_step > 0.0, "zoom_step must be positive"),
            (
                self.frame_interval_ms > 0.0 && self.settle_duration_ms > 0.0,
                "frame_interval_ms and settle_duration_ms must be positive",
            ),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, message)) => Err(MapError::InvalidConfig((*message).to_string())),
            None => Ok(()),
        }
    }

    pub fn pan_bounds(&self) -> PanBounds {
        PanBounds::new(self.bounds_max, self.resistance_factor)
    }

    /// Identity viewport state with this configuration's limits.
    pub fn initial_state(&self) -> ViewportState {
        ViewportState::new(self.pan_bounds(), self.min_scale, self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_presets() {
        let nearby = InteractionProfile::Nearby.resolve();
        let global = InteractionProfile::Global.resolve();

        assert_eq!(nearby.bounds_max, 400.0);
        assert_eq!(nearby.resistance_factor, 0.3);
        assert_eq!(nearby.friction_factor, 0.95);
        assert_eq!(nearby.zoom_step, 0.2);
        assert!(global.bounds_max > nearby.bounds_max);
        assert!(global.max_scale > nearby.max_scale);

        assert!(nearby.validate().is_ok());
        assert!(global.validate().is_ok());
    }

    #[test]
    fn test_custom_profile_is_passed_through() {
        let custom = ViewportConfig {
            zoom_step: 0.5,
            ..Default::default()
        };
        assert_eq!(
            InteractionProfile::Custom(custom.clone()).resolve(),
            custom
        );
    }

    #[test]
    fn test_mode_profiles() {
        assert_eq!(MapMode::Nearby.profile(), InteractionProfile::Nearby);
        assert_eq!(MapMode::Global.profile(), InteractionProfile::Global);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_friction = ViewportConfig {
            friction_factor: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_friction.validate(),
            Err(MapError::InvalidConfig(_))
        ));

        let bad_scale = ViewportConfig {
            min_scale: 1.5,
            ..Default::default()
        };
        assert!(bad_scale.validate().is_err());

        let bad_resistance = ViewportConfig {
            resistance_factor: 0.0,
            ..Default::default()
        };
        assert!(bad_resistance.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ViewportConfig::from_json(r#"{ "bounds_max": 250.0, "spring_back": true }"#)
            .expect("valid config");
        assert_eq!(config.bounds_max, 250.0);
        assert!(config.spring_back);
        assert_eq!(config.friction_factor, DEFAULT_FRICTION);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ViewportConfig::from_json("{ not json"),
            Err(MapError::Serialization(_))
        ));
        assert!(matches!(
            ViewportConfig::from_json(r#"{ "zoom_step": -1.0 }"#),
            Err(MapError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_initial_state_uses_limits() {
        let config = InteractionProfile::Global.resolve();
        let state = config.initial_state();
        assert_eq!(state.bounds().max, 800.0);
        assert_eq!(state.max_scale(), 3.0);
        assert_eq!(state.scale(), 1.0);
    }
}
