//! # wastemap
//!
//! Interactive viewport for browsing waste points (collection, valorisation
//! and distribution sites) on a pannable, zoomable map.
//!
//! The crate covers the parts of a map screen that carry real state: gesture
//! capture, the offset/scale transform with elastic bounds, momentum panning,
//! eased settle animations for discrete controls, category filtering of the
//! marker set, and single-slot popup selection. Rendering is left to the host;
//! everything here is plain data driven by events and frame callbacks.

pub mod animation;
pub mod core;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::{AxisClamp, PanBounds},
    config::{InteractionProfile, MapMode, ViewportConfig},
    geo::{NormalizedPosition, Point},
    map::{Driver, MapView},
    viewport::{ViewGeometry, ViewportState},
};

pub use input::{
    drag::DragSession,
    events::{GestureEvent, GesturePhase, InputEvent, MapEvent},
    gestures::GestureAdapter,
    handler::EventManager,
};

pub use animation::{inertia::InertiaEngine, transitions::SettlingAnimation};

pub use layers::marker::{Category, CategoryFilter, MarkerId, MarkerLayer, MarkerPoint};

pub use ui::popup::{NavigationRequest, SelectionController, SelectionState};

pub use runtime::{FrameHandle, FrameLoop, FrameScheduler};

/// Result type used throughout the library
pub type Result<T, E = MapError> = std::result::Result<T, E>;

/// Common error types
///
/// The interactive core never returns these; they only surface when loading
/// configuration or marker data supplied by a collaborator.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid marker: {0}")]
    InvalidMarker(String),

    #[error("Unknown marker: {0}")]
    UnknownMarker(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Initialise `env_logger` for hosts that do not bring their own logger.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
