use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mask value for pixels inside the face region.
pub const MASK_ON: u8 = 255;

/// Mask value for pixels outside the face region.
pub const MASK_OFF: u8 = 0;

/// Which segmentation class ids make up the face region.
///
/// Defaults follow the CelebAMask-style label set: 2 is face skin, 4–13 are
/// eyebrows, eyes, ears, nose, mouth and lips, 14 is hair, 3 is
/// shoulders/body and everything from 15 up is clothing, neck or background
/// detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationClasses {
    /// Face skin.
    pub face_skin: u8,
    /// First facial-feature class (eyebrows).
    pub first_feature: u8,
    /// Last facial-feature class (lips), inclusive.
    pub last_feature: u8,
    /// Hair.
    pub hair: u8,
    /// Shoulders and body.
    pub body: u8,
    /// Every class id at or above this is excluded.
    pub first_outfit: u8,
}

impl Default for SegmentationClasses {
    fn default() -> Self {
        Self {
            face_skin: 2,
            first_feature: 4,
            last_feature: 13,
            hair: 14,
            body: 3,
            first_outfit: 15,
        }
    }
}

impl SegmentationClasses {
    /// Body and clothing classes, never part of the region.
    pub fn is_excluded(&self, class: u8) -> bool {
        class == self.body || class >= self.first_outfit
    }

    /// Whether a pixel of this class belongs to the face region. Exclusion is
    /// checked first and always wins.
    pub fn is_included(&self, class: u8) -> bool {
        if self.is_excluded(class) {
            return false;
        }
        class == self.face_skin
            || class == self.hair
            || (self.first_feature..=self.last_feature).contains(&class)
    }
}

/// Inclusive pixel bounds of the non-zero area of a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskBounds {
    /// Leftmost column.
    pub x_min: u32,
    /// Rightmost column.
    pub x_max: u32,
    /// Top row.
    pub y_min: u32,
    /// Bottom row.
    pub y_max: u32,
}

/// Binary face-region mask (0 / 255) with the class map's dimensions.
pub fn build_mask(class_map: &GrayImage, classes: &SegmentationClasses) -> GrayImage {
    let mut mask = GrayImage::new(class_map.width(), class_map.height());
    for (x, y, class) in class_map.enumerate_pixels() {
        if classes.is_included(class.0[0]) {
            mask.put_pixel(x, y, Luma([MASK_ON]));
        }
    }
    debug!(pixels = count_on(&mask), "face region mask built");
    mask
}

/// Number of pixels inside the region.
pub fn count_on(mask: &GrayImage) -> usize {
    mask.as_raw().iter().filter(|&&v| v != MASK_OFF).count()
}

/// Bounding box of the region, or `None` if the mask is empty.
pub fn mask_bounds(mask: &GrayImage) -> Option<MaskBounds> {
    let mut bounds: Option<MaskBounds> = None;
    for (x, y, value) in mask.enumerate_pixels() {
        if value.0[0] == MASK_OFF {
            continue;
        }
        bounds = Some(match bounds {
            None => MaskBounds {
                x_min: x,
                x_max: x,
                y_min: y,
                y_max: y,
            },
            Some(b) => MaskBounds {
                x_min: b.x_min.min(x),
                x_max: b.x_max.max(x),
                y_min: b.y_min.min(y),
                y_max: b.y_max.max(y),
            },
        });
    }
    bounds
}
