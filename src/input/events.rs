use crate::core::geo::Point;
use crate::core::config::MapMode;
use crate::layers::marker::{CategoryFilter, MarkerId};
use crate::ui::popup::NavigationRequest;
use serde::{Deserialize, Serialize};

/// Raw input as delivered by the host, before device differences are removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device", rename_all = "lowercase")]
pub enum InputEvent {
    /// Mouse or pen
    Pointer {
        phase: PointerPhase,
        position: Point,
        #[serde(default)]
        button: MouseButton,
        timestamp_ms: f64,
    },
    /// Touch screen; `touches` lists the contacts still on the surface
    /// (for `End`/`Cancel`, the ones remaining after the lift)
    Touch {
        event_type: TouchEventType,
        touches: Vec<TouchPoint>,
        timestamp_ms: f64,
    },
}

/// Pointer event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The pointer left the map surface
    Leave,
}

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchEventType {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
    Other(u16),
}

impl InputEvent {
    /// Convenience constructor for a primary-button pointer event
    pub fn pointer(phase: PointerPhase, x: f64, y: f64, timestamp_ms: f64) -> Self {
        InputEvent::Pointer {
            phase,
            position: Point::new(x, y),
            button: MouseButton::Left,
            timestamp_ms,
        }
    }

    /// Convenience constructor for a single-contact touch event
    pub fn touch(event_type: TouchEventType, id: u64, x: f64, y: f64, timestamp_ms: f64) -> Self {
        let touches = match event_type {
            TouchEventType::End | TouchEventType::Cancel => Vec::new(),
            _ => vec![TouchPoint::new(id, Point::new(x, y))],
        };
        InputEvent::Touch {
            event_type,
            touches,
            timestamp_ms,
        }
    }

    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Pointer { position, .. } => Some(*position),
            InputEvent::Touch { touches, .. } => touches.first().map(|t| t.position),
        }
    }

    pub fn timestamp_ms(&self) -> f64 {
        match self {
            InputEvent::Pointer { timestamp_ms, .. } | InputEvent::Touch { timestamp_ms, .. } => {
                *timestamp_ms
            }
        }
    }
}

/// Phase of a canonical gesture event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    Press,
    Move,
    Release,
    /// The platform aborted the gesture; treated like a release without coasting
    Cancel,
}

/// Device-independent gesture sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub phase: GesturePhase,
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: f64,
}

impl GestureEvent {
    pub fn new(phase: GesturePhase, x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self {
            phase,
            x,
            y,
            timestamp_ms,
        }
    }

    pub fn press(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self::new(GesturePhase::Press, x, y, timestamp_ms)
    }

    pub fn moved(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self::new(GesturePhase::Move, x, y, timestamp_ms)
    }

    pub fn release(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self::new(GesturePhase::Release, x, y, timestamp_ms)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Events emitted by the map to the hosting screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapEvent {
    /// A marker's popup was opened
    MarkerSelected { marker_id: MarkerId },
    /// The open popup was closed
    SelectionCleared,
    /// The user asked to leave the map for a marker's details or a pickup
    NavigationRequested { request: NavigationRequest },
    /// The category filter changed
    FilterChanged {
        filter: CategoryFilter,
        visible_count: usize,
    },
    /// A drag started moving the map
    MoveStart { offset: Point },
    /// The map came to rest after a drag, coast or settle
    MoveEnd { offset: Point },
    /// A settle animation finished at a new scale
    ScaleChanged { scale: f64 },
    /// The map switched between nearby and global view
    ModeChanged { mode: MapMode },
}

impl MapEvent {
    /// Listener key for this event
    pub fn name(&self) -> &'static str {
        match self {
            MapEvent::MarkerSelected { .. } => "markerselected",
            MapEvent::SelectionCleared => "selectioncleared",
            MapEvent::NavigationRequested { .. } => "navigationrequested",
            MapEvent::FilterChanged { .. } => "filterchanged",
            MapEvent::MoveStart { .. } => "movestart",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::ScaleChanged { .. } => "scalechanged",
            MapEvent::ModeChanged { .. } => "modechanged",
        }
    }
}
