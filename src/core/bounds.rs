use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Elastic pan limits applied to the viewport offset, per axis.
///
/// Inside `[-max, max]` an offset is stored as proposed. Beyond it, the
/// overshoot is multiplied by `resistance`, so the content follows the finger
/// with growing reluctance instead of stopping dead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanBounds {
    /// Largest absolute offset reachable without resistance.
    pub max: f64,
    /// Share of the overshoot that is kept, in `(0, 1)`.
    pub resistance: f64,
}

/// Which axes were pushed past the pan limit by a bounded update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisClamp {
    pub x: bool,
    pub y: bool,
}

impl AxisClamp {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

impl PanBounds {
    pub fn new(max: f64, resistance: f64) -> Self {
        Self { max, resistance }
    }

    /// Applies rubber-band resistance to one axis.
    ///
    /// Returns the effective offset and whether the proposed value was out of
    /// bounds.
    pub fn apply_axis(&self, proposed: f64) -> (f64, bool) {
        if !proposed.is_finite() {
            return (0.0, true);
        }
        if proposed.abs() <= self.max {
            return (proposed, false);
        }
        let edge = self.max * proposed.signum();
        (edge + (proposed - edge) * self.resistance, true)
    }

    /// Applies rubber-band resistance to both axes independently.
    pub fn apply(&self, proposed: Point) -> (Point, AxisClamp) {
        let (x, clamped_x) = self.apply_axis(proposed.x);
        let (y, clamped_y) = self.apply_axis(proposed.y);
        (
            Point::new(x, y),
            AxisClamp {
                x: clamped_x,
                y: clamped_y,
            },
        )
    }

    /// Inverse of [`apply_axis`](Self::apply_axis): the raw offset that
    /// would produce `effective`.
    pub fn unapply_axis(&self, effective: f64) -> f64 {
        if effective.abs() <= self.max || self.resistance <= 0.0 {
            return effective;
        }
        let edge = self.max * effective.signum();
        edge + (effective - edge) / self.resistance
    }

    pub fn unapply(&self, effective: Point) -> Point {
        Point::new(self.unapply_axis(effective.x), self.unapply_axis(effective.y))
    }

    /// Nearest offset with no overshoot on either axis.
    pub fn clamp_hard(&self, offset: Point) -> Point {
        Point::new(
            offset.x.clamp(-self.max, self.max),
            offset.y.clamp(-self.max, self.max),
        )
    }

    /// Checks if an offset lies within the limits on both axes
    pub fn contains(&self, offset: &Point) -> bool {
        offset.x.abs() <= self.max && offset.y.abs() <= self.max
    }
}

impl Default for PanBounds {
    fn default() -> Self {
        Self::new(
            crate::constants::DEFAULT_BOUNDS_MAX,
            crate::constants::DEFAULT_RESISTANCE,
        )
    }
}
