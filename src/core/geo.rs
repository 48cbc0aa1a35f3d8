use serde::{Deserialize, Serialize};

/// Lower edge of a normalized (percent) coordinate.
pub const PERCENT_MIN: f64 = 0.0;
/// Upper edge of a normalized (percent) coordinate.
pub const PERCENT_MAX: f64 = 100.0;

/// Represents a point in screen, offset or content coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f64 {
        self.distance_to(&Point::ZERO)
    }

    /// True when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::ZERO
    }
}

/// A marker position expressed as a percentage of the content layer.
///
/// `x` runs left to right and `y` top to bottom, both in `[0, 100]`. Data
/// sources describe points as `lat%`/`lng%`; `lat` is the vertical share and
/// `lng` the horizontal one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPosition {
    /// Creates a position, clamping each component into `[0, 100]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Builds a position from a `lat%`/`lng%` pair as supplied by data sources.
    pub fn from_lat_lng_percent(lat: f64, lng: f64) -> Self {
        Self::new(lng, lat)
    }

    /// Validates that both components are already within `[0, 100]`
    pub fn is_valid(x: f64, y: f64) -> bool {
        (PERCENT_MIN..=PERCENT_MAX).contains(&x) && (PERCENT_MIN..=PERCENT_MAX).contains(&y)
    }

    /// Position inside a content layer of the given size, in content pixels.
    pub fn to_content_point(&self, content_size: Point) -> Point {
        Point::new(
            self.x / PERCENT_MAX * content_size.x,
            self.y / PERCENT_MAX * content_size.y,
        )
    }
}

impl Default for NormalizedPosition {
    fn default() -> Self {
        Self::new(50.0, 50.0)
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return PERCENT_MAX / 2.0;
    }
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}
