use serde::Serialize;

use crate::face_parser::Landmark;
use crate::mask::MaskBounds;

/// Horizontal margin added on each side of the face region, as a fraction of
/// its width.
pub const DEFAULT_SIDE_MARGIN: f64 = 0.1;

/// Crop rectangle within the source image. `x_max` and `y_max` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropBox {
    /// Left edge.
    pub x_min: u32,
    /// Right edge, exclusive.
    pub x_max: u32,
    /// Top edge.
    pub y_min: u32,
    /// Bottom edge, exclusive.
    pub y_max: u32,
}

impl CropBox {
    /// Width in pixels; zero when the edges cross.
    pub fn width(&self) -> u32 {
        self.x_max.saturating_sub(self.x_min)
    }

    /// Height in pixels; zero when the edges cross.
    pub fn height(&self) -> u32 {
        self.y_max.saturating_sub(self.y_min)
    }

    /// Whether the box has no area.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Lowest landmark row, used as the chin line.
///
/// Truncated to whole pixels and clamped to `[0, image_height]`. Without
/// landmarks the chin is taken to be the bottom of the image, so nothing is
/// clipped.
pub fn chin_y(landmarks: &[Landmark], image_height: u32) -> u32 {
    landmarks
        .iter()
        .map(|landmark| landmark.y)
        .filter(|y| y.is_finite())
        .reduce(f32::max)
        .map(|y| (y.max(0.0) as u32).min(image_height))
        .unwrap_or(image_height)
}

/// Crop around the face region: clip the bottom at the chin, widen both
/// sides by `side_margin` of the region width, clamp to the image.
pub fn face_crop(
    bounds: MaskBounds,
    chin_y: u32,
    image_width: u32,
    image_height: u32,
    side_margin: f64,
) -> CropBox {
    let bottom = bounds.y_max.min(chin_y);
    let margin = ((bounds.x_max - bounds.x_min) as f64 * side_margin) as u32;

    CropBox {
        x_min: bounds.x_min.saturating_sub(margin),
        x_max: bounds.x_max.saturating_add(margin).min(image_width),
        y_min: bounds.y_min.min(image_height),
        y_max: bottom.min(image_height),
    }
}
