pub mod labels;
pub mod point_store;

pub use labels::LabelStore;
pub use point_store::{PointId, PointStore};
