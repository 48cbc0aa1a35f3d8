pub mod drag;
pub mod events;
pub mod gestures;
pub mod handler;

// Re-export the essential types
pub use drag::{DragSession, Sample, VelocitySampler};
pub use events::{
    GestureEvent, GesturePhase, InputEvent, MapEvent, MouseButton, PointerPhase, TouchEventType,
    TouchPoint,
};
pub use gestures::GestureAdapter;
pub use handler::{EventCallback, EventManager};
