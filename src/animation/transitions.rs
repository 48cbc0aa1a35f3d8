use crate::animation::interpolation::{EasingFunction, Interpolatable};
use crate::core::config::ViewportConfig;
use crate::core::viewport::ViewportState;
use crate::runtime::{FrameHandle, FrameScheduler, FrameSlot};

/// What a settle animation is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleKind {
    /// Back to offset `(0, 0)` at scale 1
    Recenter,
    ZoomIn,
    ZoomOut,
    /// Pull an overshooting offset back to the bounds edge
    SpringBack,
}

impl SettleKind {
    pub fn is_zoom(self) -> bool {
        matches!(self, SettleKind::ZoomIn | SettleKind::ZoomOut)
    }
}

/// State of a settle animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
}

/// Fixed-duration eased move from one viewport state to an exact target.
///
/// The clock starts at the first delivered frame, which applies progress 0.
/// Once the duration has elapsed the state is set to the target itself, not
/// to an interpolated approximation of it.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlingAnimation {
    kind: SettleKind,
    from: ViewportState,
    to: ViewportState,
    duration_ms: f64,
    easing: EasingFunction,
    start_ms: Option<f64>,
    state: SettleState,
    slot: FrameSlot,
}

impl SettlingAnimation {
    pub fn new(
        kind: SettleKind,
        from: ViewportState,
        to: ViewportState,
        duration_ms: f64,
        easing: EasingFunction,
    ) -> Self {
        Self {
            kind,
            from,
            to,
            duration_ms,
            easing,
            start_ms: None,
            state: SettleState::NotStarted,
            slot: FrameSlot::new(),
        }
    }

    /// Recenter from `from`, timed by `config`.
    pub fn recenter(from: ViewportState, config: &ViewportConfig) -> Self {
        Self::new(
            SettleKind::Recenter,
            from,
            from.recentered(),
            config.settle_duration_ms,
            config.settle_easing,
        )
    }

    /// Zoom to `target_scale` with the offset left where it is.
    pub fn zoom(
        kind: SettleKind,
        from: ViewportState,
        target_scale: f64,
        config: &ViewportConfig,
    ) -> Self {
        Self::new(
            kind,
            from,
            from.with_scale(target_scale),
            config.settle_duration_ms,
            config.settle_easing,
        )
    }

    /// Pull the offset back inside the pan bounds.
    pub fn spring_back(from: ViewportState, config: &ViewportConfig) -> Self {
        Self::new(
            SettleKind::SpringBack,
            from,
            from.pulled_in_bounds(),
            config.settle_duration_ms,
            config.settle_easing,
        )
    }

    /// Schedules the first frame.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> FrameHandle {
        log::debug!(
            "settle {:?} start: scale {:.3} -> {:.3}",
            self.kind,
            self.from.scale(),
            self.to.scale()
        );
        self.slot.arm(scheduler)
    }

    /// Eased progress in `[0, 1]` at `now_ms`, without changing any state.
    pub fn progress(&self, now_ms: f64) -> f64 {
        let Some(start_ms) = self.start_ms else {
            return 0.0;
        };
        let t = (now_ms - start_ms) / self.duration_ms;
        if t.is_nan() {
            return 0.0;
        }
        self.easing.apply(t.clamp(0.0, 1.0))
    }

    /// Advances the animation to `now_ms` and returns the state to apply.
    pub fn update(&mut self, now_ms: f64) -> ViewportState {
        match self.state {
            SettleState::Completed => return self.to,
            SettleState::Cancelled => return self.from,
            SettleState::NotStarted => {
                self.start_ms = Some(now_ms);
                self.state = SettleState::Running;
            }
            SettleState::Running => {}
        }

        let elapsed = self.start_ms.map_or(0.0, |start| now_ms - start);
        if elapsed >= self.duration_ms {
            self.state = SettleState::Completed;
            log::debug!("settle {:?} complete", self.kind);
            return self.to;
        }

        let progress = self.progress(now_ms);
        log::trace!("settle {:?} progress {:.3}", self.kind, progress);
        self.from.lerp(&self.to, progress)
    }

    /// Handles a delivered frame.
    ///
    /// Stale handles return `None`. Otherwise the animation advances and
    /// schedules another frame unless it just finished.
    pub fn on_frame<S: FrameScheduler + ?Sized>(
        &mut self,
        handle: FrameHandle,
        now_ms: f64,
        scheduler: &mut S,
    ) -> Option<ViewportState> {
        if !self.slot.claim(handle) {
            return None;
        }
        let next = self.update(now_ms);
        if !self.is_finished() {
            self.slot.arm(scheduler);
        }
        Some(next)
    }

    /// Stops the animation where it is and withdraws its frame.
    pub fn cancel<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.slot.disarm(scheduler);
        if !self.is_finished() {
            log::debug!("settle {:?} cancelled", self.kind);
            self.state = SettleState::Cancelled;
        }
    }

    pub fn kind(&self) -> SettleKind {
        self.kind
    }

    pub fn target(&self) -> ViewportState {
        self.to
    }

    pub fn state(&self) -> SettleState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SettleState::Completed | SettleState::Cancelled)
    }

    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.slot.owns(handle)
    }
}
