//! Prelude module for common wastemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use wastemap::prelude::*;`

pub use crate::core::{
    bounds::{AxisClamp, PanBounds},
    config::{InteractionProfile, MapMode, ViewportConfig},
    geo::{NormalizedPosition, Point},
    map::{Driver, MapView},
    viewport::{project_content_to_screen, Transform, ViewGeometry, ViewportState},
};

pub use crate::input::{
    events::{GestureEvent, GesturePhase, InputEvent, MapEvent, PointerPhase, TouchEventType},
    gestures::GestureAdapter,
};

pub use crate::animation::{
    inertia::InertiaEngine,
    interpolation::EasingFunction,
    transitions::{SettleKind, SettlingAnimation},
};

pub use crate::layers::marker::{
    Category, CategoryFilter, ContactDetails, MarkerId, MarkerLayer, MarkerMetadata, MarkerPoint,
};

pub use crate::ui::popup::{NavigationAction, NavigationRequest, SelectionController, SelectionState};

pub use crate::runtime::{FrameClock, FrameHandle, FrameLoop, FrameScheduler, InstantClock};

pub use crate::{MapError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
