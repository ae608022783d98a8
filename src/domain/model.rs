use crate::utils::error::MirrorError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A normalized 2D coordinate, each axis a fraction of the source image size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One keypoint as reported by the pose detector.
///
/// `z` and `visibility` are carried through for completeness but play no
/// part in the fit computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Body measurements derived from shoulder and hip landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDimensions {
    pub shoulder_width: f64,
    pub torso_height: f64,
    pub center: Point,
    /// Radians, from left shoulder to right shoulder.
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Decoded pixel size of a garment image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarmentDimensions {
    pub width: f64,
    pub height: f64,
}

impl GarmentDimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides positive and finite.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.height / self.width
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `400x600`.
fn parse_size(s: &str) -> Option<(f64, f64)> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    let w = w.trim().parse::<f64>().ok()?;
    let h = h.trim().parse::<f64>().ok()?;
    Some((w, h))
}

impl FromStr for GarmentDimensions {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_size(s)
            .map(|(w, h)| Self::new(w, h))
            .ok_or_else(|| MirrorError::InvalidConfigValueError {
                field: "garment".to_string(),
                value: s.to_string(),
                reason: "Expected WIDTHxHEIGHT, e.g. 400x600".to_string(),
            })
    }
}

impl FromStr for CanvasSize {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_size(s)
            .map(|(w, h)| Self::new(w, h))
            .ok_or_else(|| MirrorError::InvalidConfigValueError {
                field: "canvas".to_string(),
                value: s.to_string(),
                reason: "Expected WIDTHxHEIGHT, e.g. 800x1000".to_string(),
            })
    }
}

/// Manual fine-tune values. Never clamped by the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    pub scale: f64,
    /// Horizontal shift in canvas pixels.
    pub offset_x: f64,
    /// Vertical shift in canvas pixels.
    pub offset_y: f64,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            scale: 1.5,
            offset_x: 0.0,
            offset_y: -20.0,
        }
    }
}

/// Recommended slider bounds for one adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SliderRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentRanges {
    pub scale: SliderRange,
    pub offset_x: SliderRange,
    pub offset_y: SliderRange,
}

impl Default for AdjustmentRanges {
    fn default() -> Self {
        Self {
            scale: SliderRange::new(0.5, 3.0, 0.1),
            offset_x: SliderRange::new(-100.0, 100.0, 5.0),
            offset_y: SliderRange::new(-200.0, 200.0, 5.0),
        }
    }
}

impl AdjustmentRanges {
    /// Names of the adjustments that fall outside their recommended range.
    pub fn out_of_range(&self, adjustments: &Adjustments) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !self.scale.contains(adjustments.scale) {
            fields.push("scale");
        }
        if !self.offset_x.contains(adjustments.offset_x) {
            fields.push("offset_x");
        }
        if !self.offset_y.contains(adjustments.offset_y) {
            fields.push("offset_y");
        }
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub canvas: CanvasSize,
    pub metrics: BodyDimensions,
    pub garment: GarmentDimensions,
    pub adjustments: Adjustments,
}

/// Where to draw the garment, in canvas pixels. Unrotated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacementRect {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// Canvas rotation to apply around `pivot` before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub pivot: Point,
    pub radians: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub rect: PlacementRect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
}

/// A user photo handed to the detector. Pixels are owned elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoFrame {
    pub id: String,
    pub size: CanvasSize,
}

impl PhotoFrame {
    pub fn new(id: impl Into<String>, size: CanvasSize) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    Landmarks(Vec<Landmark>),
    NoPose,
}
