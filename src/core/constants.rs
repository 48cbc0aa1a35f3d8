//! Default tuning for viewport physics and controls.

/// Nominal frame interval in milliseconds; velocities are expressed per frame of this length.
pub const FRAME_INTERVAL_MS: f64 = 16.0;

/// Smallest allowed content scale.
pub const DEFAULT_MIN_SCALE: f64 = 0.5;

/// Largest allowed content scale.
pub const DEFAULT_MAX_SCALE: f64 = 2.0;

/// Scale change applied by one zoom-in/zoom-out control action.
pub const DEFAULT_ZOOM_STEP: f64 = 0.2;

/// Absolute offset (per axis) reachable without rubber-band resistance.
pub const DEFAULT_BOUNDS_MAX: f64 = 400.0;

/// Share of the overshoot beyond the bounds that is kept.
pub const DEFAULT_RESISTANCE: f64 = 0.3;

/// Per-frame velocity multiplier while coasting.
pub const DEFAULT_FRICTION: f64 = 0.95;

/// Extra velocity multiplier on an axis that hit the bounds this frame.
pub const DEFAULT_BOUNDARY_DAMPING: f64 = 0.7;

/// Coasting stops once both velocity components fall below this.
pub const DEFAULT_VELOCITY_STOP_THRESHOLD: f64 = 0.1;

/// Release velocity (per axis) needed to start coasting.
pub const DEFAULT_INERTIA_START_THRESHOLD: f64 = 0.5;

/// A release this many frames after the last move sample carries no velocity.
pub const VELOCITY_MAX_AGE_FRAMES: f64 = 4.0;

/// Duration of recenter and zoom-step settle animations.
pub const DEFAULT_SETTLE_DURATION_MS: f64 = 300.0;

/// Scale values are rounded to `1 / SCALE_RESOLUTION` so repeated steps stay on grid.
pub const SCALE_RESOLUTION: f64 = 1e6;

/// Default tap radius, in screen pixels, used when hit testing markers.
pub const MARKER_HIT_RADIUS: f64 = 22.0;
