pub mod popup;

pub use popup::{NavigationAction, NavigationRequest, SelectionController, SelectionState};
