use crate::core::geo::Point;
use crate::core::viewport::ViewportState;
use crate::input::events::GestureEvent;

/// Position and time of one gesture sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: Point,
    pub timestamp_ms: f64,
}

/// Derives a per-frame velocity from the two most recent gesture samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySampler {
    last: Sample,
    velocity: Point,
    frame_interval_ms: f64,
}

impl VelocitySampler {
    pub fn new(start: Sample, frame_interval_ms: f64) -> Self {
        Self {
            last: start,
            velocity: Point::ZERO,
            frame_interval_ms,
        }
    }

    /// Records a sample and returns the current velocity.
    ///
    /// Samples that are not strictly newer than the previous one (duplicate
    /// or out-of-order timestamps) leave both the velocity and the reference
    /// sample untouched.
    pub fn record(&mut self, sample: Sample) -> Point {
        let elapsed = sample.timestamp_ms - self.last.timestamp_ms;
        if elapsed.is_nan() || elapsed <= 0.0 {
            log::trace!(
                "skipping velocity sample: {:.3}ms since previous",
                elapsed
            );
            return self.velocity;
        }

        let delta = sample.position.subtract(&self.last.position);
        let velocity = delta.multiply(self.frame_interval_ms / elapsed);
        if velocity.is_finite() {
            self.velocity = velocity;
        }
        self.last = sample;
        self.velocity
    }

    /// Offset units per frame, from the latest valid pair of samples
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn last_sample(&self) -> Sample {
        self.last
    }
}

/// An active pan gesture.
///
/// Created on press and dropped on release or cancel. The session maps the
/// pointer's travel since the press onto a proposed offset; the viewport
/// decides how much of it to keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    origin_screen: Point,
    /// Raw (unbounded) offset equivalent to the stored offset at press time
    origin_offset: Point,
    sampler: VelocitySampler,
    moved: bool,
}

impl DragSession {
    /// Starts a drag at the press position from the current viewport.
    pub fn begin(press: &GestureEvent, state: &ViewportState, frame_interval_ms: f64) -> Self {
        let origin_screen = press.position();
        Self {
            origin_screen,
            origin_offset: state.unbounded_offset(),
            sampler: VelocitySampler::new(
                Sample {
                    position: origin_screen,
                    timestamp_ms: press.timestamp_ms,
                },
                frame_interval_ms,
            ),
            moved: false,
        }
    }

    /// Handles a move sample and returns the raw offset it proposes.
    pub fn update(&mut self, event: &GestureEvent) -> Point {
        let position = event.position();
        self.sampler.record(Sample {
            position,
            timestamp_ms: event.timestamp_ms,
        });
        self.moved = true;
        self.proposed_offset(position)
    }

    /// Raw offset for a pointer at `position`: origin offset plus travel.
    pub fn proposed_offset(&self, position: Point) -> Point {
        self.origin_offset
            .add(&position.subtract(&self.origin_screen))
    }

    pub fn velocity(&self) -> Point {
        self.sampler.velocity()
    }

    /// Velocity to hand over to inertia on release at `release_ms`.
    ///
    /// A pointer held still for more than `max_age_ms` after its last move
    /// has stopped, whatever the last move sample measured.
    pub fn release_velocity(&self, release_ms: f64, max_age_ms: f64) -> Point {
        let held_ms = release_ms - self.sampler.last_sample().timestamp_ms;
        if held_ms > max_age_ms {
            log::trace!("release {:.1}ms after last move, dropping velocity", held_ms);
            return Point::ZERO;
        }
        self.sampler.velocity()
    }

    pub fn origin_screen(&self) -> Point {
        self.origin_screen
    }

    pub fn origin_offset(&self) -> Point {
        self.origin_offset
    }

    pub fn last_sample(&self) -> Sample {
        self.sampler.last_sample()
    }

    /// Whether any move sample arrived since the press
    pub fn has_moved(&self) -> bool {
        self.moved
    }
}
