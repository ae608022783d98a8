use crate::domain::model::{DetectionResult, Landmark, PhotoFrame};
use crate::domain::ports::PoseDetector;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Landmark file layouts: a bare array, or a detector results object whose
/// `poseLandmarks` is absent or null when nobody was found.
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkFile {
    Bare(Vec<Landmark>),
    Results {
        #[serde(rename = "poseLandmarks", default)]
        pose_landmarks: Option<Vec<Landmark>>,
    },
}

pub fn parse_landmarks_json(content: &str) -> Result<DetectionResult> {
    let file: LandmarkFile = serde_json::from_str(content)?;
    Ok(match file {
        LandmarkFile::Bare(landmarks) => DetectionResult::Landmarks(landmarks),
        LandmarkFile::Results {
            pose_landmarks: Some(landmarks),
        } => DetectionResult::Landmarks(landmarks),
        LandmarkFile::Results {
            pose_landmarks: None,
        } => DetectionResult::NoPose,
    })
}

#[derive(Debug, Clone, PartialEq)]
enum ReplaySource {
    /// `<base>/<frame id>.json`
    Directory(PathBuf),
    /// One file, read as-is whatever the frame id.
    File(PathBuf),
}

/// Pose detector that replays recorded landmarks from disk.
#[derive(Debug)]
pub struct ReplayDetector {
    source: ReplaySource,
    closed: AtomicBool,
}

impl ReplayDetector {
    /// Looks up `<base>/<frame id>.json` per frame.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            source: ReplaySource::Directory(base_path.into()),
            closed: AtomicBool::new(false),
        }
    }

    /// Detector bound to exactly `path`, plus a frame id taken from its stem.
    pub fn for_file(path: &Path) -> (Self, String) {
        let frame_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let detector = Self {
            source: ReplaySource::File(path.to_path_buf()),
            closed: AtomicBool::new(false),
        };
        (detector, frame_id)
    }

    fn landmark_path(&self, frame: &PhotoFrame) -> PathBuf {
        match &self.source {
            ReplaySource::Directory(base) => base.join(format!("{}.json", frame.id)),
            ReplaySource::File(path) => path.clone(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoseDetector for ReplayDetector {
    async fn detect(&self, frame: &PhotoFrame) -> Result<DetectionResult> {
        let full_path = self.landmark_path(frame);
        tracing::debug!("Replaying landmarks from {}", full_path.display());

        let content = tokio::fs::read_to_string(&full_path).await?;
        parse_landmarks_json(&content)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
