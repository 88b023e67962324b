//! Face-region extraction: crop to face skin, features and hair, black out
//! everything else, resize to the classifier's input size.
//!
//! Missing or unusable parser output is not an error. Every such case falls
//! back to the whole source image resized to the target size, reported as
//! [`RegionExtraction::Unmasked`] with the reason.

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::crop::{chin_y, face_crop, CropBox, DEFAULT_SIDE_MARGIN};
use crate::error::ToneError;
use crate::face_parser::FaceDetection;
use crate::mask::{build_mask, mask_bounds, SegmentationClasses};

/// Classifier input size.
pub const DEFAULT_OUTPUT_SIZE: (u32, u32) = (224, 224);

/// Resized mask values above this keep the source pixel.
const MASK_MIDPOINT: u8 = 127;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Why masking was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The parser found no face, or no parser was available.
    NoFaceDetected,
    /// The detection carried no segmentation map.
    NoSegmentation,
    /// The segmentation map does not match the source image size.
    MalformedSegmentation,
    /// No pixel belongs to a face-region class.
    EmptyMask,
    /// The chin-clipped crop has no area.
    DegenerateCrop,
}

/// Output of [`extract_face_region`]; the image is always the target size.
#[derive(Debug, Clone)]
pub enum RegionExtraction {
    /// The face region was isolated.
    Masked {
        /// Masked face region.
        image: RgbImage,
        /// Resized binary mask matching `image`.
        mask: GrayImage,
        /// Crop taken from the source image.
        crop: CropBox,
    },
    /// Masking was skipped; the whole source was resized.
    Unmasked {
        /// Resized source image.
        image: RgbImage,
        /// Why masking was skipped.
        reason: SkipReason,
    },
}

impl RegionExtraction {
    /// Whether the face region was isolated.
    pub fn masking_applied(&self) -> bool {
        matches!(self, RegionExtraction::Masked { .. })
    }

    /// The output image, masked or not.
    pub fn image(&self) -> &RgbImage {
        match self {
            RegionExtraction::Masked { image, .. } | RegionExtraction::Unmasked { image, .. } => {
                image
            }
        }
    }

    /// Take the output image.
    pub fn into_image(self) -> RgbImage {
        match self {
            RegionExtraction::Masked { image, .. } | RegionExtraction::Unmasked { image, .. } => {
                image
            }
        }
    }

    /// Why masking was skipped, if it was.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            RegionExtraction::Masked { .. } => None,
            RegionExtraction::Unmasked { reason, .. } => Some(*reason),
        }
    }
}

/// Settings for [`extract_face_region`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionOptions {
    /// Output width in pixels.
    pub output_width: u32,
    /// Output height in pixels.
    pub output_height: u32,
    /// Fraction of the region width added on the left and right.
    pub side_margin: f64,
    /// Segmentation label set.
    pub classes: SegmentationClasses,
}

impl Default for RegionOptions {
    fn default() -> Self {
        Self {
            output_width: DEFAULT_OUTPUT_SIZE.0,
            output_height: DEFAULT_OUTPUT_SIZE.1,
            side_margin: DEFAULT_SIDE_MARGIN,
            classes: SegmentationClasses::default(),
        }
    }
}

impl RegionOptions {
    /// Set the output size in pixels (default: 224×224).
    pub fn output_size(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    /// Set the horizontal margin fraction (default: 0.1).
    pub fn side_margin(mut self, margin: f64) -> Self {
        self.side_margin = margin;
        self
    }

    /// Use a different segmentation label set.
    pub fn classes(mut self, classes: SegmentationClasses) -> Self {
        self.classes = classes;
        self
    }

    /// Reject a zero output size or a negative margin.
    pub fn validate(&self) -> Result<(), ToneError> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(ToneError::InvalidOutputSize);
        }
        if !self.side_margin.is_finite() || self.side_margin < 0.0 {
            return Err(ToneError::InvalidOption(format!(
                "side_margin must be >= 0, got {}",
                self.side_margin
            )));
        }
        Ok(())
    }
}

/// Resize the whole source image to the target size, smoothing.
pub fn resize_source(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Isolate the face region of `image` using the first parser detection.
///
/// Errors only on caller mistakes (zero-sized source or target, negative
/// margin); every parser-side problem degrades to the unmasked fallback.
pub fn extract_face_region(
    image: &RgbImage,
    detection: Option<&FaceDetection>,
    options: &RegionOptions,
) -> Result<RegionExtraction, ToneError> {
    options.validate()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ToneError::ZeroDimensions);
    }

    let (out_w, out_h) = (options.output_width, options.output_height);
    let fallback = |reason: SkipReason| {
        info!(?reason, "face masking skipped, using resized original");
        RegionExtraction::Unmasked {
            image: resize_source(image, out_w, out_h),
            reason,
        }
    };

    let Some(detection) = detection else {
        return Ok(fallback(SkipReason::NoFaceDetected));
    };
    let Some(class_map) = detection.segmentation.as_ref() else {
        return Ok(fallback(SkipReason::NoSegmentation));
    };
    if class_map.dimensions() != image.dimensions() {
        debug!(
            segmentation = ?class_map.dimensions(),
            image = ?image.dimensions(),
            "segmentation size mismatch"
        );
        return Ok(fallback(SkipReason::MalformedSegmentation));
    }

    let mask = build_mask(class_map, &options.classes);
    let Some(bounds) = mask_bounds(&mask) else {
        return Ok(fallback(SkipReason::EmptyMask));
    };

    let chin = chin_y(&detection.landmarks, image.height());
    let crop = face_crop(
        bounds,
        chin,
        image.width(),
        image.height(),
        options.side_margin,
    );
    debug!(?bounds, chin, ?crop, "face crop");
    if crop.is_empty() {
        return Ok(fallback(SkipReason::DegenerateCrop));
    }

    let cropped_image =
        imageops::crop_imm(image, crop.x_min, crop.y_min, crop.width(), crop.height()).to_image();
    let cropped_mask =
        imageops::crop_imm(&mask, crop.x_min, crop.y_min, crop.width(), crop.height()).to_image();

    let resized_image = imageops::resize(&cropped_image, out_w, out_h, FilterType::Lanczos3);
    // nearest keeps the mask binary
    let resized_mask = imageops::resize(&cropped_mask, out_w, out_h, FilterType::Nearest);

    let masked = apply_mask(&resized_image, &resized_mask);
    info!(
        crop_width = crop.width(),
        crop_height = crop.height(),
        "face masking applied"
    );

    Ok(RegionExtraction::Masked {
        image: masked,
        mask: resized_mask,
        crop,
    })
}

/// Keep pixels whose mask value is above the midpoint, black out the rest.
pub(crate) fn apply_mask(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let keep = mask.get_pixel(x, y).0[0] > MASK_MIDPOINT;
        out.put_pixel(x, y, if keep { *pixel } else { BLACK });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face_parser::Landmark;
    use image::Luma;

    fn make_test_rgb(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ]);
        }
        img
    }

    /// Class map with `class` inside the given inclusive rectangle, 0 elsewhere.
    fn map_with_rect(width: u32, height: u32, rects: &[(u32, u32, u32, u32, u8)]) -> GrayImage {
        let mut map = GrayImage::new(width, height);
        for &(x0, x1, y0, y1, class) in rects {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    map.put_pixel(x, y, Luma([class]));
                }
            }
        }
        map
    }

    fn detection(map: GrayImage, landmarks: Vec<Landmark>) -> FaceDetection {
        FaceDetection {
            segmentation: Some(map),
            landmarks,
        }
    }

    #[test]
    fn no_detection_falls_back_to_resized_source() {
        let img = make_test_rgb(120, 160);
        let result = extract_face_region(&img, None, &RegionOptions::default().output_size(32, 32)).unwrap();
        assert!(!result.masking_applied());
        assert_eq!(result.skip_reason(), Some(SkipReason::NoFaceDetected));
        assert_eq!(result.image(), &resize_source(&img, 32, 32));
    }

    #[test]
    fn missing_segmentation_falls_back() {
        let img = make_test_rgb(40, 40);
        let det = FaceDetection::default();
        let result = extract_face_region(&img, Some(&det), &RegionOptions::default()).unwrap();
        assert_eq!(result.skip_reason(), Some(SkipReason::NoSegmentation));
        assert_eq!(result.image().dimensions(), DEFAULT_OUTPUT_SIZE);
    }

    #[test]
    fn mismatched_segmentation_falls_back() {
        let img = make_test_rgb(40, 40);
        let det = detection(map_with_rect(20, 40, &[(0, 19, 0, 39, 2)]), vec![]);
        let result = extract_face_region(&img, Some(&det), &RegionOptions::default()).unwrap();
        assert_eq!(result.skip_reason(), Some(SkipReason::MalformedSegmentation));
    }

    #[test]
    fn empty_mask_equals_plain_resize() {
        let img = make_test_rgb(64, 48);
        // only body, outfit and background classes
        let det = detection(
            map_with_rect(64, 48, &[(0, 63, 30, 47, 3), (0, 63, 0, 10, 16)]),
            vec![Landmark::new(30.0, 20.0)],
        );
        let options = RegionOptions::default().output_size(24, 24);
        let result = extract_face_region(&img, Some(&det), &options).unwrap();
        assert!(!result.masking_applied());
        assert_eq!(result.skip_reason(), Some(SkipReason::EmptyMask));
        assert_eq!(result.into_image(), resize_source(&img, 24, 24));
    }

    #[test]
    fn chin_above_region_is_degenerate() {
        let img = make_test_rgb(50, 50);
        let det = detection(
            map_with_rect(50, 50, &[(10, 40, 20, 45, 2)]),
            vec![Landmark::new(25.0, 5.0)],
        );
        let result = extract_face_region(&img, Some(&det), &RegionOptions::default()).unwrap();
        assert_eq!(result.skip_reason(), Some(SkipReason::DegenerateCrop));
        assert_eq!(result.image().dimensions(), DEFAULT_OUTPUT_SIZE);
    }

    #[test]
    fn crop_bottom_is_chin_for_skin_and_hair() {
        let img = make_test_rgb(100, 120);
        // hair on top, skin below, skin running past the chin down the neck
        let det = detection(
            map_with_rect(100, 120, &[(30, 70, 10, 29, 14), (35, 65, 30, 100, 2)]),
            vec![Landmark::new(40.0, 50.0), Landmark::new(50.0, 80.0), Landmark::new(60.0, 50.0)],
        );
        let result = extract_face_region(&img, Some(&det), &RegionOptions::default()).unwrap();
        let RegionExtraction::Masked { crop, image, mask } = result else {
            panic!("expected masking to apply");
        };
        assert_eq!(crop.y_max, 80);
        assert_eq!(crop.y_min, 10);
        // width 40 → 4 px each side
        assert_eq!((crop.x_min, crop.x_max), (26, 74));
        assert_eq!(image.dimensions(), DEFAULT_OUTPUT_SIZE);
        assert_eq!(mask.dimensions(), DEFAULT_OUTPUT_SIZE);
    }

    #[test]
    fn without_landmarks_uses_natural_bottom() {
        let img = make_test_rgb(60, 60);
        let det = detection(map_with_rect(60, 60, &[(10, 50, 5, 40, 2)]), vec![]);
        let result = extract_face_region(&img, Some(&det), &RegionOptions::default()).unwrap();
        let RegionExtraction::Masked { crop, .. } = result else {
            panic!("expected masking to apply");
        };
        assert_eq!(crop.y_max, 40);
    }

    #[test]
    fn outside_region_is_black_and_mask_binary() {
        let mut img = RgbImage::new(80, 80);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([200, 150, 100]);
        }
        // ring of skin around a hole of outfit pixels
        let det = detection(
            map_with_rect(80, 80, &[(20, 59, 20, 59, 2), (30, 49, 30, 49, 16)]),
            vec![],
        );
        let options = RegionOptions::default().output_size(40, 40);
        let result = extract_face_region(&img, Some(&det), &options).unwrap();
        let RegionExtraction::Masked { image, mask, .. } = result else {
            panic!("expected masking to apply");
        };

        assert!(mask.as_raw().iter().all(|&v| v == 0 || v == 255));
        for (x, y, pixel) in image.enumerate_pixels() {
            if mask.get_pixel(x, y).0[0] == 0 {
                assert_eq!(*pixel, BLACK);
            }
        }
        // the hole sits in the middle of the crop
        assert_eq!(mask.get_pixel(20, 20).0[0], 0);
        assert_eq!(*image.get_pixel(20, 20), BLACK);
        assert_eq!(mask.get_pixel(8, 20).0[0], 255);
        assert_eq!(*image.get_pixel(8, 20), Rgb([200, 150, 100]));
    }

    #[test]
    fn non_square_output_size() {
        let img = make_test_rgb(90, 90);
        let det = detection(map_with_rect(90, 90, &[(10, 80, 10, 80, 2)]), vec![]);
        let options = RegionOptions::default().output_size(30, 50);
        let result = extract_face_region(&img, Some(&det), &options).unwrap();
        assert!(result.masking_applied());
        assert_eq!(result.image().dimensions(), (30, 50));
    }

    #[test]
    fn zero_output_size_is_rejected() {
        let img = make_test_rgb(10, 10);
        let options = RegionOptions::default().output_size(0, 10);
        assert!(matches!(
            extract_face_region(&img, None, &options),
            Err(ToneError::InvalidOutputSize)
        ));
    }

    #[test]
    fn zero_source_is_rejected() {
        let img = RgbImage::new(0, 0);
        assert!(matches!(
            extract_face_region(&img, None, &RegionOptions::default()),
            Err(ToneError::ZeroDimensions)
        ));
    }

    #[test]
    fn apply_mask_uses_midpoint() {
        let img = RgbImage::from_pixel(3, 1, Rgb([10, 20, 30]));
        let mask = GrayImage::from_raw(3, 1, vec![127, 128, 255]).unwrap();
        let out = apply_mask(&img, &mask);
        assert_eq!(*out.get_pixel(0, 0), BLACK);
        assert_eq!(*out.get_pixel(1, 0), Rgb([10, 20, 30]));
        assert_eq!(*out.get_pixel(2, 0), Rgb([10, 20, 30]));
    }
}
