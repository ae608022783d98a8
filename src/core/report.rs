use crate::domain::model::{Adjustments, BodyDimensions, CanvasSize, GarmentDimensions, Overlay};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

/// Result of fitting one garment onto one photo.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub generated_at: DateTime<Utc>,
    pub frame: String,
    pub canvas: CanvasSize,
    pub garment: GarmentDimensions,
    pub adjustments: Adjustments,
    pub metrics: BodyDimensions,
    pub overlay: Overlay,
    /// Adjustments outside the recommended slider ranges.
    pub out_of_range: Vec<&'static str>,
}

/// Flat row for CSV output.
#[derive(Debug, Serialize)]
struct FitRow<'a> {
    frame: &'a str,
    shoulder_width: f64,
    torso_height: f64,
    center_x: f64,
    center_y: f64,
    angle: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: Option<f64>,
}

impl FitReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let rect = self.overlay.rect;
        csv_writer.serialize(FitRow {
            frame: &self.frame,
            shoulder_width: self.metrics.shoulder_width,
            torso_height: self.metrics.torso_height,
            center_x: self.metrics.center.x,
            center_y: self.metrics.center.y,
            angle: self.metrics.angle,
            scale: self.adjustments.scale,
            offset_x: self.adjustments.offset_x,
            offset_y: self.adjustments.offset_y,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            rotation: self.overlay.rotation.map(|r| r.radians),
        })?;
        csv_writer.flush()?;
        Ok(())
    }

    pub fn render_text(&self) -> String {
        let m = &self.metrics;
        let rect = &self.overlay.rect;
        let mut out = String::new();

        // write! 到 String 不會失敗
        let _ = writeln!(out, "📷 Frame: {} ({}x{})", self.frame, self.canvas.width, self.canvas.height);
        let _ = writeln!(out, "📏 Shoulder width: {:.4}", m.shoulder_width);
        let _ = writeln!(out, "📏 Torso height:   {:.4}", m.torso_height);
        let _ = writeln!(out, "🎯 Center:         ({:.4}, {:.4})", m.center.x, m.center.y);
        let _ = writeln!(out, "📐 Shoulder angle: {:.4} rad", m.angle);
        let _ = writeln!(
            out,
            "👗 Garment {}x{} -> x={:.1}, y={:.1}, width={:.1}, height={:.1}",
            self.garment.width, self.garment.height, rect.x, rect.y, rect.width, rect.height
        );
        if let Some(rotation) = self.overlay.rotation {
            let _ = writeln!(
                out,
                "🔄 Rotate {:.4} rad around ({:.1}, {:.1})",
                rotation.radians, rotation.pivot.x, rotation.pivot.y
            );
        }
        if !self.out_of_range.is_empty() {
            let _ = writeln!(
                out,
                "⚠️  Outside recommended range: {}",
                self.out_of_range.join(", ")
            );
        }
        out
    }
}
