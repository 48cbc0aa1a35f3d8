pub mod inertia;
pub mod interpolation;
pub mod transitions;

// Re-export commonly used types for convenience
pub use inertia::InertiaEngine;
pub use interpolation::{EasingFunction, Interpolatable, Interpolation};
pub use transitions::{SettleKind, SettleState, SettlingAnimation};
