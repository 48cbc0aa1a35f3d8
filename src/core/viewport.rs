use crate::animation::interpolation::Interpolatable;
use crate::constants::SCALE_RESOLUTION;
use crate::core::bounds::{AxisClamp, PanBounds};
use crate::core::geo::{NormalizedPosition, Point};
use serde::{Deserialize, Serialize};

/// Pan offset and zoom scale of the map content, plus the limits they live in.
///
/// The state is a plain value. Every change goes through one of the reducer
/// methods below, each returning a new state that already satisfies the
/// limits: the offset has rubber-band resistance applied, the scale is
/// clamped to `[min_scale, max_scale]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    /// Effective (bounded) pan offset in screen pixels
    offset: Point,
    /// Current zoom scale (1.0 = natural size)
    scale: f64,
    bounds: PanBounds,
    min_scale: f64,
    max_scale: f64,
}

/// Result of a bounded offset update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedUpdate {
    pub state: ViewportState,
    /// Axes on which the proposed offset was out of bounds
    pub clamped: AxisClamp,
}

impl ViewportState {
    /// Creates an identity state (offset `(0, 0)`, scale `1`).
    ///
    /// Inverted scale limits are swapped so the state can never be built in
    /// an invalid shape.
    pub fn new(bounds: PanBounds, min_scale: f64, max_scale: f64) -> Self {
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        Self {
            offset: Point::ZERO,
            scale: 1.0_f64.clamp(min_scale, max_scale),
            bounds,
            min_scale,
            max_scale,
        }
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn bounds(&self) -> PanBounds {
        self.bounds
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Proposes a raw offset; the stored offset is its rubber-banded form.
    pub fn bounded_update(&self, proposed: Point) -> BoundedUpdate {
        let (offset, clamped) = self.bounds.apply(proposed);
        BoundedUpdate {
            state: Self { offset, ..*self },
            clamped,
        }
    }

    /// Raw offset that maps onto the stored effective offset.
    pub fn unbounded_offset(&self) -> Point {
        self.bounds.unapply(self.offset)
    }

    /// Returns a state with the scale clamped and quantised.
    pub fn with_scale(&self, scale: f64) -> Self {
        Self {
            scale: self.clamp_scale(scale),
            ..*self
        }
    }

    /// Scale target for a discrete zoom step from `from_scale`.
    pub fn stepped_scale(&self, from_scale: f64, step: f64) -> f64 {
        self.clamp_scale(from_scale + step)
    }

    /// Identity transform with the current limits.
    pub fn recentered(&self) -> Self {
        Self::new(self.bounds, self.min_scale, self.max_scale)
    }

    /// Same limits, but with the pan overshoot removed.
    pub fn pulled_in_bounds(&self) -> Self {
        Self {
            offset: self.bounds.clamp_hard(self.offset),
            ..*self
        }
    }

    /// Checks if the offset currently sits in the overshoot zone
    pub fn is_overshooting(&self) -> bool {
        !self.bounds.contains(&self.offset)
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.scale;
        }
        quantize_scale(scale).clamp(self.min_scale, self.max_scale)
    }
}

/// Blend between two states, used by settle animations. Limits come from
/// `self`; the scale is clamped against rounding.
impl Interpolatable for ViewportState {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        if t >= 1.0 {
            return *other;
        }
        let t = t.max(0.0);
        Self {
            offset: self.offset.lerp(&other.offset, t),
            scale: self
                .scale
                .lerp(&other.scale, t)
                .clamp(self.min_scale, self.max_scale),
            ..*self
        }
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(
            PanBounds::default(),
            crate::constants::DEFAULT_MIN_SCALE,
            crate::constants::DEFAULT_MAX_SCALE,
        )
    }
}

fn quantize_scale(scale: f64) -> f64 {
    (scale * SCALE_RESOLUTION).round() / SCALE_RESOLUTION
}

/// Transform state for rendering (CSS-style `translate() scale()` about an origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation in pixels
    pub translate: Point,
    /// Scale factor (1.0 = no scaling)
    pub scale: f64,
    /// Transform origin point in pixels
    pub origin: Point,
}

impl Transform {
    pub fn new(translate: Point, scale: f64, origin: Point) -> Self {
        Self {
            translate,
            scale,
            origin,
        }
    }

    /// Create identity transform (no change)
    pub fn identity() -> Self {
        Self::new(Point::ZERO, 1.0, Point::ZERO)
    }

    /// Maps a point of the untransformed layer onto the screen.
    pub fn apply(&self, point: &Point) -> Point {
        Point::new(
            (point.x - self.origin.x) * self.scale + self.origin.x + self.translate.x,
            (point.y - self.origin.y) * self.scale + self.origin.y + self.translate.y,
        )
    }

    /// Maps a screen point back onto the untransformed layer.
    pub fn invert(&self, point: &Point) -> Point {
        Point::new(
            (point.x - self.translate.x - self.origin.x) / self.scale + self.origin.x,
            (point.y - self.translate.y - self.origin.y) / self.scale + self.origin.y,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Screen and content dimensions that the projection needs.
///
/// The content layer is centred in the view at rest and scales about the view
/// centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewGeometry {
    /// The size of the viewport in pixels
    pub view_size: Point,
    /// The size of the content layer at scale 1, in pixels
    pub content_size: Point,
}

impl ViewGeometry {
    pub fn new(view_size: Point, content_size: Point) -> Self {
        Self {
            view_size,
            content_size,
        }
    }

    /// Geometry where the content layer exactly fills the view.
    pub fn filling(view_size: Point) -> Self {
        Self::new(view_size, view_size)
    }

    pub fn view_center(&self) -> Point {
        self.view_size.multiply(0.5)
    }

    /// Offset of the untransformed content layer's top-left corner on screen.
    fn content_origin(&self) -> Point {
        self.view_center().subtract(&self.content_size.multiply(0.5))
    }

    /// Rendering transform for a viewport state.
    pub fn transform(&self, state: &ViewportState) -> Transform {
        Transform::new(state.offset(), state.scale(), self.view_center())
    }

    /// Converts a content pixel (relative to the layer's top-left) to screen space.
    pub fn content_to_screen(&self, content: &Point, state: &ViewportState) -> Point {
        let layer_point = content.add(&self.content_origin());
        self.transform(state).apply(&layer_point)
    }

    /// Converts a screen pixel back to a content pixel.
    pub fn screen_to_content(&self, screen: &Point, state: &ViewportState) -> Point {
        let layer_point = self.transform(state).invert(screen);
        layer_point.subtract(&self.content_origin())
    }
}

impl Default for ViewGeometry {
    fn default() -> Self {
        Self::filling(Point::new(390.0, 844.0))
    }
}

/// Projects a normalized marker position to screen space.
///
/// Pure and cheap; safe to call for every marker on every frame.
pub fn project_content_to_screen(
    position: &NormalizedPosition,
    state: &ViewportState,
    geometry: &ViewGeometry,
) -> Point {
    let content = position.to_content_point(geometry.content_size);
    geometry.content_to_screen(&content, state)
}
