pub mod marker;

pub use marker::{
    Category, CategoryFilter, ContactDetails, MarkerId, MarkerLayer, MarkerMetadata, MarkerPoint,
    MarkerRecord,
};
