use crate::domain::model::{DetectionResult, PhotoFrame};
use crate::utils::error::Result;
use async_trait::async_trait;

/// External body-landmark detector.
#[async_trait]
pub trait PoseDetector: Send + Sync {
    /// Runs detection on one frame. `DetectionResult::NoPose` when no person was found.
    async fn detect(&self, frame: &PhotoFrame) -> Result<DetectionResult>;

    /// Releases the underlying model. Called once when the owning session ends.
    fn close(&self) {}
}
