//! Garment placement for a virtual try-on mirror.
//!
//! Body landmarks from an external pose detector are reduced to
//! [`BodyDimensions`] (shoulder width, torso height, shoulder center and
//! angle), which are then mapped to the pixel rectangle where a garment
//! image should be drawn. [`MirrorSession`] owns the detector and the
//! current state and discards stale detection results.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, OutputFormat};
pub use crate::config::MirrorConfig;

pub use crate::adapters::ReplayDetector;
pub use crate::core::{
    engine::FitEngine,
    metrics::extract_metrics,
    placement::{compute_placement, place, rotation_for},
    report::FitReport,
    session::{DetectionOutcome, DetectionTicket, MirrorSession, SessionConfig},
};
pub use crate::domain::model::{
    AdjustmentRanges, Adjustments, BodyDimensions, CanvasSize, DetectionResult,
    GarmentDimensions, Landmark, Overlay, PhotoFrame, PlacementRect, PlacementRequest, Point,
    Rotation, SliderRange,
};
pub use crate::domain::ports::PoseDetector;
pub use crate::utils::error::{MirrorError, Result};
