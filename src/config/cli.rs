use crate::config::MirrorConfig;
use crate::domain::model::{CanvasSize, GarmentDimensions};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "virtual-mirror")]
#[command(about = "Fit a garment image onto a detected body pose")]
pub struct CliConfig {
    /// Landmark JSON file recorded from the pose detector
    #[arg(short, long)]
    pub landmarks: PathBuf,

    /// Photo size in pixels, e.g. 800x1000
    #[arg(long)]
    pub canvas: CanvasSize,

    /// Garment image size in pixels, e.g. 400x600
    #[arg(long)]
    pub garment: GarmentDimensions,

    /// Size multiplier (recommended 0.5 - 3.0)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Horizontal shift in pixels (recommended -100 - 100)
    #[arg(long, allow_hyphen_values = true)]
    pub offset_x: Option<f64>,

    /// Vertical shift in pixels (recommended -200 - 200)
    #[arg(long, allow_hyphen_values = true)]
    pub offset_y: Option<f64>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Rotate the garment to the shoulder line
    #[arg(long)]
    pub rotate: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// Loads the TOML file (or defaults) and layers command line overrides on top.
    pub fn resolve(&self) -> Result<MirrorConfig> {
        let mut config = match &self.config {
            Some(path) => MirrorConfig::from_file(path)?,
            None => MirrorConfig::default(),
        };

        if let Some(scale) = self.scale {
            config.adjustments.scale = scale;
        }
        if let Some(offset_x) = self.offset_x {
            config.adjustments.offset_x = offset_x;
        }
        if let Some(offset_y) = self.offset_y {
            config.adjustments.offset_y = offset_y;
        }
        if self.rotate {
            config.placement.apply_rotation = true;
        }

        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string(
            "landmarks",
            &self.landmarks.to_string_lossy(),
        )?;
        validation::validate_positive_f64("canvas.width", self.canvas.width)?;
        validation::validate_positive_f64("canvas.height", self.canvas.height)?;
        for (field, value) in [
            ("scale", self.scale),
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
        ] {
            if let Some(value) = value {
                validation::validate_finite(field, value)?;
            }
        }
        Ok(())
    }
}
