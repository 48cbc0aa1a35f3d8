use crate::core::config::ViewportConfig;
use crate::core::geo::Point;
use crate::core::viewport::ViewportState;
use crate::runtime::{FrameHandle, FrameScheduler, FrameSlot};

/// Momentum that keeps the map moving after a drag is released.
///
/// Each frame the velocity loses a fixed share to friction, the offset moves
/// by what is left (through the rubber band), and an axis that ran into the
/// bounds loses extra energy. The engine stops once both components drop
/// below the stop threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InertiaEngine {
    velocity: Point,
    running: bool,
    slot: FrameSlot,
}

impl InertiaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a release velocity is fast enough to coast.
    pub fn should_start(velocity: Point, config: &ViewportConfig) -> bool {
        velocity.x.abs() > config.inertia_start_threshold
            || velocity.y.abs() > config.inertia_start_threshold
    }

    /// Starts coasting with `velocity` and schedules the first frame.
    pub fn start<S: FrameScheduler + ?Sized>(
        &mut self,
        velocity: Point,
        scheduler: &mut S,
    ) -> FrameHandle {
        log::debug!(
            "inertia start: velocity ({:.2}, {:.2})",
            velocity.x,
            velocity.y
        );
        self.velocity = velocity;
        self.running = true;
        self.slot.arm(scheduler)
    }

    /// Runs one physics step on `state`.
    ///
    /// This is the pure half of a frame; it does not touch the scheduler.
    /// Velocity is added to the raw offset behind the stored one, so a coast
    /// that starts in the overshoot zone keeps moving the way it was thrown.
    pub fn step(&mut self, state: &ViewportState, config: &ViewportConfig) -> ViewportState {
        if !self.running {
            return *state;
        }

        let mut velocity = self.velocity.multiply(config.friction_factor);
        let update = state.bounded_update(state.unbounded_offset().add(&velocity));

        if update.clamped.x {
            velocity.x *= config.boundary_damping;
        }
        if update.clamped.y {
            velocity.y *= config.boundary_damping;
        }

        let threshold = config.velocity_stop_threshold;
        if velocity.x.abs() < threshold && velocity.y.abs() < threshold {
            velocity = Point::ZERO;
            self.running = false;
        }
        self.velocity = velocity;

        log::trace!(
            "inertia frame: offset ({:.2}, {:.2}) velocity ({:.3}, {:.3})",
            update.state.offset().x,
            update.state.offset().y,
            velocity.x,
            velocity.y
        );
        update.state
    }

    /// Handles a delivered frame.
    ///
    /// Returns `None` when `handle` is not the one this engine holds, in which
    /// case nothing changes. Otherwise steps once and schedules the next frame
    /// if still running.
    pub fn on_frame<S: FrameScheduler + ?Sized>(
        &mut self,
        handle: FrameHandle,
        state: &ViewportState,
        config: &ViewportConfig,
        scheduler: &mut S,
    ) -> Option<ViewportState> {
        if !self.slot.claim(handle) {
            return None;
        }

        let next = self.step(state, config);
        if self.running {
            self.slot.arm(scheduler);
        } else {
            log::debug!("inertia stopped");
        }
        Some(next)
    }

    /// Stops coasting and withdraws the scheduled frame.
    pub fn cancel<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.running {
            log::debug!("inertia cancelled");
        }
        self.slot.disarm(scheduler);
        self.running = false;
        self.velocity = Point::ZERO;
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.slot.owns(handle)
    }
}
