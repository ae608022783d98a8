//! Garment placement from body metrics.

use crate::domain::model::{
    BodyDimensions, CanvasSize, PlacementRect, PlacementRequest, Point, Rotation,
};
use crate::utils::error::{MirrorError, Result};

/// Drawn garment width relative to the skeletal shoulder span.
pub const SHOULDER_SPAN_FACTOR: f64 = 2.2;

/// Fraction of the garment image height, from its top edge, where the neckline sits.
pub const NECKLINE_RATIO: f64 = 0.2;

/// Raw placement arithmetic.
///
/// `garment_width` must be non-zero; use [`place`] when the garment size is
/// not already known to be drawable. `scale` and the offsets are used as
/// given, without clamping.
#[allow(clippy::too_many_arguments)]
pub fn compute_placement(
    canvas_width: f64,
    canvas_height: f64,
    metrics: &BodyDimensions,
    garment_width: f64,
    garment_height: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
) -> PlacementRect {
    // 正規化座標轉像素
    let shoulder_width_px = metrics.shoulder_width * canvas_width;
    let center_x_px = metrics.center.x * canvas_width;
    let center_y_px = metrics.center.y * canvas_height;

    let width = shoulder_width_px * SHOULDER_SPAN_FACTOR * scale;
    let aspect_ratio = garment_height / garment_width;
    let height = width * aspect_ratio;

    PlacementRect {
        x: center_x_px - width / 2.0 + offset_x,
        y: center_y_px - height * NECKLINE_RATIO + offset_y,
        width,
        height,
    }
}

/// Guarded entry point: rejects a garment with a zero, negative or
/// non-finite side before any arithmetic runs.
pub fn place(request: &PlacementRequest) -> Result<PlacementRect> {
    let garment = request.garment;
    if !garment.is_drawable() {
        tracing::warn!(
            "Refusing placement for degenerate garment {}x{}",
            garment.width,
            garment.height
        );
        return Err(MirrorError::DegenerateGarmentDimensions {
            width: garment.width,
            height: garment.height,
        });
    }

    let adjustments = request.adjustments;
    let rect = compute_placement(
        request.canvas.width,
        request.canvas.height,
        &request.metrics,
        garment.width,
        garment.height,
        adjustments.scale,
        adjustments.offset_x,
        adjustments.offset_y,
    );

    tracing::debug!(
        "Placement: x={:.1}, y={:.1}, width={:.1}, height={:.1}",
        rect.x,
        rect.y,
        rect.width,
        rect.height
    );

    Ok(rect)
}

/// Rotation that would align the garment with the shoulder line.
///
/// Pivots on the shoulder center in pixels. The angle is negated for a
/// canvas whose rotation sense is opposite to the image-space atan2.
pub fn rotation_for(metrics: &BodyDimensions, canvas: &CanvasSize) -> Rotation {
    Rotation {
        pivot: Point::new(
            metrics.center.x * canvas.width,
            metrics.center.y * canvas.height,
        ),
        radians: -metrics.angle,
    }
}
