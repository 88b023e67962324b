use image::RgbImage;

use crate::error::ToneError;
use crate::season::SeasonProbabilities;

/// Pluggable season classifier.
///
/// Implement this trait around the four-way classification network and pass
/// it to [`crate::Analyzer::classifier`]. The input is the preprocessed image
/// at the analyzer's input size.
pub trait SeasonClassifier: Send + Sync {
    /// Score the image against the four seasons, in [`crate::Season::ALL`] order.
    fn classify(&self, image: &RgbImage) -> Result<SeasonProbabilities, ToneError>;
}
