pub mod store;
pub mod types;

pub use store::{load_mapping, mapping_to_yaml};
pub use types::{FieldMapping, Preset, ProjectionField, DEFAULT_MARKER};
