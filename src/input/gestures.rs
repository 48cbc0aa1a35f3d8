use crate::{
    core::geo::Point,
    input::events::{
        GestureEvent, GesturePhase, InputEvent, MouseButton, PointerPhase, TouchEventType,
        TouchPoint,
    },
};

/// Which device currently owns the gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveContact {
    Pointer,
    Touch(u64),
}

/// Turns pointer and touch input into one stream of [`GestureEvent`]s.
///
/// Only one contact is followed at a time. For multi-touch, the first finger
/// down drives the gesture and the others are ignored; lifting that first
/// finger releases the gesture even if others stay down.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    pub enabled: bool,
    active: Option<ActiveContact>,
    last_position: Point,
}

impl GestureAdapter {
    pub fn new() -> Self {
        Self {
            enabled: true,
            active: None,
            last_position: Point::ZERO,
        }
    }

    /// Normalizes one raw event. Returns `None` for input that does not
    /// affect the gesture (hover moves, secondary buttons, extra fingers).
    pub fn normalize(&mut self, input: &InputEvent) -> Option<GestureEvent> {
        if !self.enabled {
            return None;
        }

        match input {
            InputEvent::Pointer {
                phase,
                position,
                button,
                timestamp_ms,
            } => self.process_pointer(*phase, *position, *button, *timestamp_ms),
            InputEvent::Touch {
                event_type,
                touches,
                timestamp_ms,
            } => self.process_touch(*event_type, touches, *timestamp_ms),
        }
    }

    fn process_pointer(
        &mut self,
        phase: PointerPhase,
        position: Point,
        button: MouseButton,
        timestamp_ms: f64,
    ) -> Option<GestureEvent> {
        match phase {
            PointerPhase::Down => {
                if button != MouseButton::Left || self.active.is_some() {
                    return None;
                }
                self.active = Some(ActiveContact::Pointer);
                Some(self.emit(GesturePhase::Press, position, timestamp_ms))
            }
            PointerPhase::Move => {
                if self.active != Some(ActiveContact::Pointer) {
                    return None;
                }
                Some(self.emit(GesturePhase::Move, position, timestamp_ms))
            }
            PointerPhase::Up | PointerPhase::Leave => {
                if self.active != Some(ActiveContact::Pointer) {
                    return None;
                }
                if phase == PointerPhase::Up && button != MouseButton::Left {
                    return None;
                }
                self.active = None;
                Some(self.emit(GesturePhase::Release, position, timestamp_ms))
            }
        }
    }

    fn process_touch(
        &mut self,
        event_type: TouchEventType,
        touches: &[TouchPoint],
        timestamp_ms: f64,
    ) -> Option<GestureEvent> {
        match event_type {
            TouchEventType::Start => {
                if self.active.is_some() {
                    return None;
                }
                let first = touches.first()?;
                self.active = Some(ActiveContact::Touch(first.id));
                Some(self.emit(GesturePhase::Press, first.position, timestamp_ms))
            }
            TouchEventType::Move => {
                let Some(ActiveContact::Touch(id)) = self.active else {
                    return None;
                };
                let tracked = touches.iter().find(|t| t.id == id)?;
                Some(self.emit(GesturePhase::Move, tracked.position, timestamp_ms))
            }
            TouchEventType::End | TouchEventType::Cancel => {
                let Some(ActiveContact::Touch(id)) = self.active else {
                    return None;
                };
                if touches.iter().any(|t| t.id == id) {
                    // A different finger lifted
                    return None;
                }
                self.active = None;
                let phase = if event_type == TouchEventType::Cancel {
                    GesturePhase::Cancel
                } else {
                    GesturePhase::Release
                };
                Some(self.emit(phase, self.last_position, timestamp_ms))
            }
        }
    }

    fn emit(&mut self, phase: GesturePhase, position: Point, timestamp_ms: f64) -> GestureEvent {
        self.last_position = position;
        GestureEvent::new(phase, position.x, position.y, timestamp_ms)
    }

    /// Whether a press is currently being tracked
    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    /// Resets all gesture state
    pub fn reset(&mut self) {
        self.active = None;
        self.last_position = Point::ZERO;
    }
}

impl Default for GestureAdapter {
    fn default() -> Self {
        Self::new()
    }
}
