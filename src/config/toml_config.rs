use crate::domain::model::{AdjustmentRanges, Adjustments};
use crate::utils::error::{MirrorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub adjustments: Adjustments,
    #[serde(default)]
    pub ranges: AdjustmentRanges,
    #[serde(default)]
    pub placement: PlacementConfig,
    pub logging: Option<LoggingConfig>,
}

/// Pose model options. Defaults mirror the browser detector setup.
///
/// Only `timeout_ms` is read by the session. The model fields are validated
/// here and handed to a live pose model; the replay detector ignores them
/// since its landmarks were already produced under some model setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// 0, 1 or 2. Live detector only.
    pub model_complexity: u8,
    /// Live detector only.
    pub smooth_landmarks: bool,
    /// Live detector only.
    pub enable_segmentation: bool,
    /// 0.0 - 1.0. Live detector only.
    pub min_detection_confidence: f64,
    /// 0.0 - 1.0. Live detector only.
    pub min_tracking_confidence: f64,
    /// Upper bound on one detection call, enforced by `MirrorSession`.
    pub timeout_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_complexity: 1,
            smooth_landmarks: true,
            enable_segmentation: false,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            timeout_ms: 10_000,
        }
    }
}

impl DetectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Rotate the garment to the shoulder line. Off unless asked for.
    pub apply_rotation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl MirrorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MirrorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MirrorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MIRROR_TIMEOUT_MS})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MirrorError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let detector = &self.detector;
        validation::validate_range("detector.model_complexity", detector.model_complexity, 0, 2)?;
        validation::validate_range(
            "detector.min_detection_confidence",
            detector.min_detection_confidence,
            0.0,
            1.0,
        )?;
        validation::validate_range(
            "detector.min_tracking_confidence",
            detector.min_tracking_confidence,
            0.0,
            1.0,
        )?;
        validation::validate_positive_number("detector.timeout_ms", detector.timeout_ms, 1)?;

        // 調整值不限範圍，但必須是有限數
        validation::validate_finite("adjustments.scale", self.adjustments.scale)?;
        validation::validate_finite("adjustments.offset_x", self.adjustments.offset_x)?;
        validation::validate_finite("adjustments.offset_y", self.adjustments.offset_y)?;

        for (field, range) in [
            ("ranges.scale", &self.ranges.scale),
            ("ranges.offset_x", &self.ranges.offset_x),
            ("ranges.offset_y", &self.ranges.offset_y),
        ] {
            if !(range.min <= range.max) || !(range.step > 0.0) {
                return Err(MirrorError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: format!("{}..{} step {}", range.min, range.max, range.step),
                    reason: "Range needs min <= max and a positive step".to_string(),
                });
            }
        }

        if let Some(level) = self.log_level() {
            validation::validate_log_level("logging.level", level)?;
        }

        Ok(())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logging(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for MirrorConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
