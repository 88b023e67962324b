use image::{GrayImage, RgbImage};

/// A facial landmark in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// Column.
    pub x: f32,
    /// Row, growing downward.
    pub y: f32,
}

impl Landmark {
    /// Landmark at column `x`, row `y`.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One face found by a parser.
#[derive(Debug, Clone, Default)]
pub struct FaceDetection {
    /// Per-pixel semantic class ids at the source resolution, or `None` if
    /// the parser produced no segmentation for this face.
    pub segmentation: Option<GrayImage>,
    /// Ordered landmark points; only the lowest one (the chin) is used.
    pub landmarks: Vec<Landmark>,
}

/// Pluggable face detection + segmentation backend.
///
/// Implement this trait around a face-parsing network and pass it to
/// [`crate::Analyzer::face_parser`]. Returning no detections is a normal
/// outcome, not an error.
pub trait FaceParser: Send + Sync {
    /// Detect and parse faces in an RGB image.
    fn parse(&self, image: &RgbImage) -> Vec<FaceDetection>;
}
