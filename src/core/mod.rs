pub mod engine;
pub mod metrics;
pub mod placement;
pub mod report;
pub mod session;

pub use crate::domain::model::{BodyDimensions, Landmark, PlacementRect, Point};
pub use crate::domain::ports::PoseDetector;
pub use crate::utils::error::Result;
