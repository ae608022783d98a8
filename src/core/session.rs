//! Mirror session: the single owner of the detector and of the current
//! metrics, garment and adjustments.
//!
//! Detections are tagged with a generation number. A result that arrives
//! for an older generation than the latest requested one is discarded, so
//! a slow detection for a previous photo can never overwrite the metrics of
//! a newer photo.

use crate::config::MirrorConfig;
use crate::core::metrics::extract_metrics;
use crate::core::placement::{place, rotation_for};
use crate::domain::model::{
    Adjustments, BodyDimensions, CanvasSize, DetectionResult, GarmentDimensions, Overlay,
    PhotoFrame, PlacementRequest,
};
use crate::domain::ports::PoseDetector;
use crate::utils::error::{MirrorError, Result};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub detection_timeout: Duration,
    pub apply_rotation: bool,
    pub adjustments: Adjustments,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            detection_timeout: Duration::from_secs(10),
            apply_rotation: false,
            adjustments: Adjustments::default(),
        }
    }
}

impl From<&MirrorConfig> for SessionConfig {
    fn from(config: &MirrorConfig) -> Self {
        Self {
            detection_timeout: config.detector.timeout(),
            apply_rotation: config.placement.apply_rotation,
            adjustments: config.adjustments,
        }
    }
}

/// Handle for one in-flight detection.
#[derive(Debug, Clone)]
pub struct DetectionTicket {
    generation: u64,
    frame: PhotoFrame,
}

impl DetectionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame(&self) -> &PhotoFrame {
        &self.frame
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Updated(BodyDimensions),
    /// A newer detection was requested after this one; result dropped.
    Stale { generation: u64, current: u64 },
}

#[derive(Debug, Clone, Copy)]
struct FrameState {
    canvas: CanvasSize,
    metrics: BodyDimensions,
}

pub struct MirrorSession<D: PoseDetector> {
    detector: Arc<D>,
    config: SessionConfig,
    generation: u64,
    current: Option<FrameState>,
    garment: Option<GarmentDimensions>,
    adjustments: Adjustments,
    closed: bool,
}

impl<D: PoseDetector> MirrorSession<D> {
    pub fn open(detector: D, config: SessionConfig) -> Self {
        tracing::info!(
            "Mirror session opened (timeout: {:?}, rotation: {})",
            config.detection_timeout,
            config.apply_rotation
        );
        let adjustments = config.adjustments;
        Self {
            detector: Arc::new(detector),
            config,
            generation: 0,
            current: None,
            garment: None,
            adjustments,
            closed: false,
        }
    }

    /// Shared handle for running detections outside the session.
    pub fn detector(&self) -> Arc<D> {
        Arc::clone(&self.detector)
    }

    /// Registers a new photo. Metrics of the previous photo are dropped
    /// until this detection completes.
    pub fn begin_detection(&mut self, frame: PhotoFrame) -> Result<DetectionTicket> {
        if self.closed {
            return Err(MirrorError::DetectorClosed);
        }

        self.generation += 1;
        self.current = None;
        tracing::debug!(
            "Detection #{} requested for frame '{}'",
            self.generation,
            frame.id
        );

        Ok(DetectionTicket {
            generation: self.generation,
            frame,
        })
    }

    pub fn apply_detection(
        &mut self,
        ticket: DetectionTicket,
        result: Result<DetectionResult>,
    ) -> Result<DetectionOutcome> {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale detection #{} (current #{})",
                ticket.generation,
                self.generation
            );
            return Ok(DetectionOutcome::Stale {
                generation: ticket.generation,
                current: self.generation,
            });
        }

        let landmarks = match result? {
            DetectionResult::Landmarks(landmarks) => landmarks,
            DetectionResult::NoPose => {
                tracing::warn!("No pose found in frame '{}'", ticket.frame.id);
                return Err(MirrorError::NoPoseDetected {
                    frame: ticket.frame.id,
                });
            }
        };

        let metrics = extract_metrics(&landmarks)?;
        self.current = Some(FrameState {
            canvas: ticket.frame.size,
            metrics,
        });
        tracing::info!(
            "Body detected in '{}': shoulder width {:.3}, torso height {:.3}",
            ticket.frame.id,
            metrics.shoulder_width,
            metrics.torso_height
        );

        Ok(DetectionOutcome::Updated(metrics))
    }

    /// Runs the detector on `frame`, bounded by the configured timeout.
    pub async fn detect(&mut self, frame: PhotoFrame) -> Result<DetectionOutcome> {
        let ticket = self.begin_detection(frame)?;
        let detector = self.detector();
        let timeout = self.config.detection_timeout;

        let result = match tokio::time::timeout(timeout, detector.detect(ticket.frame())).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Detection #{} timed out after {:?}",
                    ticket.generation,
                    timeout
                );
                Err(MirrorError::DetectionTimeout { timeout })
            }
        };

        self.apply_detection(ticket, result)
    }

    /// Accepts the outcome of decoding a garment image. On failure the
    /// previous garment stays in place.
    pub fn load_garment(&mut self, result: Result<GarmentDimensions>) -> Result<()> {
        let garment = match result {
            Ok(garment) => garment,
            Err(e) => {
                tracing::warn!("Garment load failed, keeping previous garment: {}", e);
                return Err(match e {
                    MirrorError::GarmentLoadFailure { .. } => e,
                    other => MirrorError::GarmentLoadFailure {
                        reason: other.to_string(),
                    },
                });
            }
        };

        if !garment.is_drawable() {
            tracing::warn!(
                "Garment {}x{} cannot be drawn, keeping previous garment",
                garment.width,
                garment.height
            );
            return Err(MirrorError::DegenerateGarmentDimensions {
                width: garment.width,
                height: garment.height,
            });
        }

        tracing::debug!("Garment loaded: {}x{}", garment.width, garment.height);
        self.garment = Some(garment);
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.adjustments.scale = scale;
    }

    pub fn set_offset_x(&mut self, offset_x: f64) {
        self.adjustments.offset_x = offset_x;
    }

    pub fn set_offset_y(&mut self, offset_y: f64) {
        self.adjustments.offset_y = offset_y;
    }

    pub fn set_adjustments(&mut self, adjustments: Adjustments) {
        self.adjustments = adjustments;
    }

    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }

    pub fn metrics(&self) -> Option<BodyDimensions> {
        self.current.map(|state| state.metrics)
    }

    pub fn canvas(&self) -> Option<CanvasSize> {
        self.current.map(|state| state.canvas)
    }

    pub fn garment(&self) -> Option<GarmentDimensions> {
        self.garment
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Full recomputation of the garment overlay from the current state.
    /// `None` until both a body and a garment are known.
    pub fn overlay(&self) -> Result<Option<Overlay>> {
        let (Some(state), Some(garment)) = (self.current, self.garment) else {
            return Ok(None);
        };

        let rect = place(&PlacementRequest {
            canvas: state.canvas,
            metrics: state.metrics,
            garment,
            adjustments: self.adjustments,
        })?;

        let rotation = self
            .config
            .apply_rotation
            .then(|| rotation_for(&state.metrics, &state.canvas));

        Ok(Some(Overlay { rect, rotation }))
    }

    /// Releases the detector. Dropping the session does the same.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.detector.close();
            tracing::info!("Mirror session closed, detector released");
        }
    }
}

impl<D: PoseDetector> Drop for MirrorSession<D> {
    fn drop(&mut self) {
        self.release();
    }
}
