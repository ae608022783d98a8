use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Insufficient landmarks: found {found}, need at least {required}")]
    InsufficientLandmarks { found: usize, required: usize },

    #[error("No pose detected in frame '{frame}'")]
    NoPoseDetected { frame: String },

    #[error("Garment image failed to load: {reason}")]
    GarmentLoadFailure { reason: String },

    #[error("Degenerate garment dimensions: {width}x{height}")]
    DegenerateGarmentDimensions { width: f64, height: f64 },

    #[error("Pose detection timed out after {timeout:?}")]
    DetectionTimeout { timeout: Duration },

    #[error("Pose detector has already been released")]
    DetectorClosed,

    #[error("Pose detector error: {message}")]
    DetectorError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Detection,
    Garment,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl MirrorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InsufficientLandmarks { .. }
            | Self::NoPoseDetected { .. }
            | Self::DetectionTimeout { .. }
            | Self::DetectorClosed
            | Self::DetectorError { .. } => ErrorCategory::Detection,
            Self::GarmentLoadFailure { .. } | Self::DegenerateGarmentDimensions { .. } => {
                ErrorCategory::Garment
            }
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 換一張照片或衣服就能恢復
            Self::InsufficientLandmarks { .. }
            | Self::NoPoseDetected { .. }
            | Self::GarmentLoadFailure { .. }
            | Self::DetectionTimeout { .. } => ErrorSeverity::Medium,
            Self::DegenerateGarmentDimensions { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::DetectorClosed
            | Self::DetectorError { .. }
            | Self::IoError(_)
            | Self::CsvError(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether a retry with the same input can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DetectionTimeout { .. } | Self::DetectorError { .. })
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InsufficientLandmarks { .. } | Self::NoPoseDetected { .. } => {
                "Could not detect body pose. Please try a clearer photo.".to_string()
            }
            Self::GarmentLoadFailure { .. } | Self::DegenerateGarmentDimensions { .. } => {
                "Could not load dress image. Try uploading a local file.".to_string()
            }
            Self::DetectionTimeout { .. } => {
                "Body detection is taking too long. Please try again.".to_string()
            }
            Self::DetectorClosed | Self::DetectorError { .. } => {
                "The body detector is unavailable.".to_string()
            }
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. } => {
                format!("Invalid configuration for '{}'", field)
            }
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::SerializationError(_) => "Landmark data is not valid JSON.".to_string(),
            Self::CsvError(_) => "Could not write CSV output.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InsufficientLandmarks { .. } | Self::NoPoseDetected { .. } => {
                "Use a photo where the full upper body, shoulders and hips are visible"
            }
            Self::GarmentLoadFailure { .. } => {
                "Pick another garment or upload the image from a local file"
            }
            Self::DegenerateGarmentDimensions { .. } => {
                "Garment width and height must both be positive"
            }
            Self::DetectionTimeout { .. } => {
                "Retry the detection or raise detector.timeout_ms in the config"
            }
            Self::DetectorClosed => "Open a new mirror session",
            Self::DetectorError { .. } => "Check the detector input and retry",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line arguments"
            }
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => {
                "Landmarks must be a JSON array or an object with 'poseLandmarks'"
            }
            Self::CsvError(_) => "Check that stdout is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
