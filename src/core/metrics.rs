//! Body metrics from a 33-point pose landmark set.

use crate::domain::model::{BodyDimensions, Landmark};
use crate::utils::error::{MirrorError, Result};

/// Number of keypoints in the full body layout.
pub const POSE_LANDMARK_COUNT: usize = 33;

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;

/// Reduces a landmark set to shoulder width, torso height, shoulder center
/// and shoulder angle.
///
/// Fails with [`MirrorError::InsufficientLandmarks`] for fewer than 33
/// points rather than producing a partial record.
pub fn extract_metrics(landmarks: &[Landmark]) -> Result<BodyDimensions> {
    if landmarks.len() < POSE_LANDMARK_COUNT {
        return Err(MirrorError::InsufficientLandmarks {
            found: landmarks.len(),
            required: POSE_LANDMARK_COUNT,
        });
    }

    let left_shoulder = landmarks[LEFT_SHOULDER].point();
    let right_shoulder = landmarks[RIGHT_SHOULDER].point();
    let left_hip = landmarks[LEFT_HIP].point();
    let right_hip = landmarks[RIGHT_HIP].point();

    // 肩膀中點 (鎖骨中央)
    let center = left_shoulder.midpoint(&right_shoulder);
    let shoulder_width = left_shoulder.distance(&right_shoulder);

    let mid_hip = left_hip.midpoint(&right_hip);
    let torso_height = mid_hip.distance(&center);

    let angle = (right_shoulder.y - left_shoulder.y).atan2(right_shoulder.x - left_shoulder.x);

    tracing::debug!(
        "Body metrics: shoulder_width={:.4}, torso_height={:.4}, center=({:.4}, {:.4}), angle={:.4}",
        shoulder_width,
        torso_height,
        center.x,
        center.y,
        angle
    );

    Ok(BodyDimensions {
        shoulder_width,
        torso_height,
        center,
        angle,
    })
}
