//! Frame scheduling abstraction
//!
//! Animations never own a timer. They ask a [`FrameScheduler`] for the next
//! frame and get a [`FrameHandle`] back; the host later delivers that handle
//! to the map, which runs whichever animation still holds it. A handle that
//! was cancelled, or that belongs to an animation that has since been
//! replaced, is simply ignored when it arrives.

use instant::Instant;
use std::collections::VecDeque;

/// Token identifying one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wraps a host-assigned id. Schedulers must not reuse ids while the
    /// handle may still be delivered.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A cooperative "run this again next frame" primitive.
pub trait FrameScheduler {
    /// Requests one callback on the next frame.
    fn schedule_frame(&mut self) -> FrameHandle;

    /// Withdraws a pending request. Cancelling an unknown or already
    /// delivered handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Single-slot arena holding the one frame request an animation may own.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameSlot {
    handle: Option<FrameHandle>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the next frame, replacing (and cancelling) any previous one.
    pub fn arm<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> FrameHandle {
        self.disarm(scheduler);
        let handle = scheduler.schedule_frame();
        self.handle = Some(handle);
        handle
    }

    /// Cancels the held request, if any.
    pub fn disarm<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.handle.take() {
            scheduler.cancel_frame(handle);
        }
    }

    /// Consumes the held handle if it is the one being delivered.
    ///
    /// Returns `false` for stale handles; callers must then leave state alone.
    pub fn claim(&mut self, handle: FrameHandle) -> bool {
        if self.handle == Some(handle) {
            self.handle = None;
            true
        } else {
            false
        }
    }

    pub fn owns(&self, handle: FrameHandle) -> bool {
        self.handle == Some(handle)
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

/// In-process scheduler for hosts that pump frames themselves.
///
/// Requests are delivered in the order they were made. Handles requested
/// while a batch is being delivered land in the following batch.
#[derive(Debug, Default)]
pub struct FrameLoop {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every handle due on this frame.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        self.pending.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl FrameScheduler for FrameLoop {
    fn schedule_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|pending| *pending != handle);
    }
}

/// Monotonic millisecond clock used to stamp frames and gestures.
pub trait FrameClock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by `instant::Instant`, usable natively and on wasm.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for InstantClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock advanced by hand; deterministic replays and tests use it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now_ms: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now_ms: start_ms }
    }

    pub fn advance(&mut self, delta_ms: f64) -> f64 {
        self.now_ms += delta_ms.max(0.0);
        self.now_ms
    }
}

impl FrameClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}
