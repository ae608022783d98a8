use crate::core::report::FitReport;
use crate::core::session::{DetectionOutcome, MirrorSession};
use crate::domain::model::{AdjustmentRanges, GarmentDimensions, PhotoFrame};
use crate::domain::ports::PoseDetector;
use crate::utils::error::{MirrorError, Result};
use chrono::Utc;

/// Drives one try-on: detect the body, take the garment, place it.
pub struct FitEngine<D: PoseDetector> {
    session: MirrorSession<D>,
    ranges: AdjustmentRanges,
}

impl<D: PoseDetector> FitEngine<D> {
    pub fn new(session: MirrorSession<D>, ranges: AdjustmentRanges) -> Self {
        Self { session, ranges }
    }

    pub fn session(&self) -> &MirrorSession<D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut MirrorSession<D> {
        &mut self.session
    }

    pub async fn run(
        &mut self,
        frame: PhotoFrame,
        garment: Result<GarmentDimensions>,
    ) -> Result<FitReport> {
        tracing::info!("Starting fit for frame '{}'", frame.id);
        let frame_id = frame.id.clone();
        let canvas = frame.size;

        tracing::info!("Detecting body landmarks...");
        let metrics = match self.session.detect(frame).await? {
            DetectionOutcome::Updated(metrics) => metrics,
            DetectionOutcome::Stale {
                generation,
                current,
            } => {
                return Err(MirrorError::DetectorError {
                    message: format!(
                        "detection #{} was superseded by #{}",
                        generation, current
                    ),
                })
            }
        };

        tracing::info!("Loading garment...");
        self.session.load_garment(garment)?;

        let adjustments = self.session.adjustments();
        let out_of_range = self.ranges.out_of_range(&adjustments);
        for field in &out_of_range {
            // 不夾值，只提示
            tracing::warn!(
                "Adjustment '{}' is outside the recommended range, using it as given",
                field
            );
        }

        tracing::info!("Computing placement...");
        let overlay = self.session.overlay()?.ok_or_else(|| MirrorError::DetectorError {
            message: "no body metrics available for placement".to_string(),
        })?;
        let garment = self.session.garment().ok_or_else(|| MirrorError::GarmentLoadFailure {
            reason: "no garment loaded".to_string(),
        })?;

        Ok(FitReport {
            generated_at: Utc::now(),
            frame: frame_id,
            canvas,
            garment,
            adjustments,
            metrics,
            overlay,
            out_of_range,
        })
    }

    pub fn close(self) {
        self.session.close();
    }
}
