//! Personal color analysis post-processing: isolate the face region for a
//! season classifier, then turn the classifier's probabilities into a
//! personalized color palette.
//!
//! The two halves are independent and usable on their own:
//! [`extract_face_region`] for the image side, [`synthesize`] and
//! [`recommend`] for the palette side. [`Analyzer`] wires them together
//! around caller-supplied models.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tonefit::{ColorCatalog, PaletteOptions, SeasonProbabilities};
//!
//! let catalog = Arc::new(ColorCatalog::embedded().unwrap());
//! let probabilities = SeasonProbabilities::from_pairs([
//!     ("Summer", 0.55),
//!     ("Spring", 0.30),
//!     ("Autumn", 0.10),
//!     ("Winter", 0.05),
//! ])
//! .unwrap();
//!
//! let palette = tonefit::synthesize(&catalog, &probabilities, &PaletteOptions::default()).unwrap();
//! for color in &palette.primary {
//!     println!("{} {}", color.name, color.hex);
//! }
//! ```
#![warn(missing_docs)]

mod catalog;
mod classifier;
mod config;
mod crop;
mod error;
mod face_parser;
mod mask;
mod palette;
mod recommend;
mod region;
mod season;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use image::RgbImage;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

/// Color catalog, its entries and season descriptions.
pub use catalog::{
    normalize_hex, ColorCatalog, ColorEntry, SeasonDescription, SeasonProfile, WILDCARD_USE,
};
/// Season classifier trait.
pub use classifier::SeasonClassifier;
/// File configuration.
pub use config::{AnalyzerSettings, ToneConfig, CATALOG_PATH_ENV, DEFAULT_MAX_INPUT_BYTES};
/// Chin-clipped crop geometry.
pub use crop::{chin_y, face_crop, CropBox, DEFAULT_SIDE_MARGIN};
/// Error type returned by tonefit operations.
pub use error::ToneError;
/// Face parser trait and its detection types.
pub use face_parser::{FaceDetection, FaceParser, Landmark};
/// Face-region mask construction.
pub use mask::{build_mask, mask_bounds, MaskBounds, SegmentationClasses};
/// Weighted palette synthesis.
pub use palette::{
    synthesize, synthesize_weighted, Palette, PaletteColor, PaletteOptions, WeightedColor,
    WeightedPalette,
};
/// Fit-score recommendations.
pub use recommend::{
    recommend, seasonal_analysis, RecommendedColor, Recommendations, SeasonalAnalysis,
    DEFAULT_RECOMMENDATION_LIMIT,
};
/// Face-region extraction.
pub use region::{
    extract_face_region, resize_source, RegionExtraction, RegionOptions, SkipReason,
    DEFAULT_OUTPUT_SIZE,
};
/// Season labels and classifier scores.
pub use season::{Season, SeasonProbabilities, UNIT_SUM_TOLERANCE};

/// The image handed to the classifier, with how it was produced.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Classifier input at the configured size.
    pub image: RgbImage,
    /// Whether face masking produced `image`.
    pub masking_applied: bool,
    /// Set when masking was attempted but fell back to the plain resize.
    pub skip_reason: Option<SkipReason>,
}

/// Result of [`Analyzer::analyze`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Most probable season.
    pub season: Season,
    /// Probability of `season`, rounded to four decimals.
    pub confidence: f64,
    /// Weighted two-tier palette.
    pub palettes: Palette,
    /// Normalized probability per season, in label order.
    pub all_probabilities: IndexMap<Season, f64>,
    /// Season description, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<SeasonDescription>,
    /// Whether the classifier saw the masked face region.
    pub face_masking_applied: bool,
}

/// Result of [`Analyzer::analyze_detailed`].
#[derive(Debug, Clone, Serialize)]
pub struct DetailedAnalysis {
    /// Most probable season.
    pub season: Season,
    /// Probability of `season`, rounded to four decimals.
    pub confidence: f64,
    /// Weighted two-tier palette.
    pub palettes: Palette,
    /// Primary and secondary season as percentages.
    pub seasonal_analysis: SeasonalAnalysis,
    /// Best-fitting catalog colors, highest fit score first.
    pub recommended_colors: Vec<RecommendedColor>,
    /// Description of the predicted season.
    pub description: SeasonDescription,
    /// Whether the classifier saw the masked face region.
    pub face_masking_applied: bool,
}

/// Which collaborators an [`Analyzer`] has, for health reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzerStatus {
    /// A season classifier is attached.
    pub classifier_loaded: bool,
    /// A face parser is attached.
    pub face_parser_loaded: bool,
    /// Face masking runs when a parser is attached.
    pub face_masking_enabled: bool,
    /// Number of seasons the classifier scores.
    pub num_classes: usize,
}

/// Builder-style orchestrator around a classifier and an optional face parser.
///
/// The catalog is shared and read-only; one analyzer can serve concurrent
/// requests from many threads.
pub struct Analyzer {
    catalog: Arc<ColorCatalog>,
    classifier: Option<Box<dyn SeasonClassifier>>,
    parser: Option<Box<dyn FaceParser>>,
    face_masking: bool,
    region: RegionOptions,
    palette: PaletteOptions,
    max_input_bytes: usize,
    recommendation_limit: usize,
}

impl Analyzer {
    /// Create an analyzer with default settings and no models attached.
    pub fn new(catalog: Arc<ColorCatalog>) -> Self {
        let settings = AnalyzerSettings::default();
        Self {
            catalog,
            classifier: None,
            parser: None,
            face_masking: settings.face_masking,
            region: RegionOptions::default(),
            palette: PaletteOptions::default(),
            max_input_bytes: settings.max_input_bytes,
            recommendation_limit: settings.recommendation_limit,
        }
    }

    /// Create an analyzer from a validated configuration.
    pub fn from_config(catalog: Arc<ColorCatalog>, config: &ToneConfig) -> Result<Self, ToneError> {
        config.validate()?;
        Ok(Self {
            catalog,
            classifier: None,
            parser: None,
            face_masking: config.analyzer.face_masking,
            region: config.region.clone(),
            palette: config.palette.clone(),
            max_input_bytes: config.analyzer.max_input_bytes,
            recommendation_limit: config.analyzer.recommendation_limit,
        })
    }

    /// Attach the season classifier. Analysis fails with
    /// [`ToneError::ClassifierUnavailable`] until one is set.
    pub fn classifier(mut self, classifier: Box<dyn SeasonClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Attach a face parser. Without one, images are only resized.
    pub fn face_parser(mut self, parser: Box<dyn FaceParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Enable or disable face masking (default: true).
    pub fn face_masking(mut self, enable: bool) -> Self {
        self.face_masking = enable;
        self
    }

    /// Set the classifier input size (default: 224×224).
    pub fn input_size(mut self, width: u32, height: u32) -> Self {
        self.region = self.region.output_size(width, height);
        self
    }

    /// Replace all face-region settings.
    pub fn region_options(mut self, options: RegionOptions) -> Self {
        self.region = options;
        self
    }

    /// Set palette synthesis tuning.
    pub fn palette_options(mut self, options: PaletteOptions) -> Self {
        self.palette = options;
        self
    }

    /// Reject inputs larger than this many bytes (default: 10 MiB).
    pub fn max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = limit;
        self
    }

    /// The shared color catalog.
    pub fn catalog(&self) -> &ColorCatalog {
        &self.catalog
    }

    /// Report which collaborators are attached.
    pub fn status(&self) -> AnalyzerStatus {
        AnalyzerStatus {
            classifier_loaded: self.classifier.is_some(),
            face_parser_loaded: self.parser.is_some(),
            face_masking_enabled: self.face_masking,
            num_classes: Season::ALL.len(),
        }
    }

    /// Decode raw image bytes (JPEG, PNG, or WebP) and prepare them for the
    /// classifier.
    pub fn preprocess(&self, input: &[u8]) -> Result<PreparedImage, ToneError> {
        let image = self.decode(input)?;
        self.preprocess_image(&image)
    }

    /// Prepare an already-decoded image for the classifier.
    pub fn preprocess_image(&self, image: &RgbImage) -> Result<PreparedImage, ToneError> {
        self.region.validate()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(ToneError::ZeroDimensions);
        }

        match (&self.parser, self.face_masking) {
            (Some(parser), true) => {
                let detections = parser.parse(image);
                info!(faces = detections.len(), "face parser finished");
                let extraction = extract_face_region(image, detections.first(), &self.region)?;
                Ok(PreparedImage {
                    masking_applied: extraction.masking_applied(),
                    skip_reason: extraction.skip_reason(),
                    image: extraction.into_image(),
                })
            }
            (None, true) => {
                warn!("face masking enabled but no face parser attached");
                Ok(self.resize_only(image))
            }
            (_, false) => Ok(self.resize_only(image)),
        }
    }

    /// Classify the image and build the weighted palette for it.
    pub fn analyze(&self, input: &[u8], include_description: bool) -> Result<AnalysisResult, ToneError> {
        let (prepared, probabilities) = self.classify(input)?;
        let (season, confidence) = probabilities.top();
        let palettes = synthesize(&self.catalog, &probabilities, &self.palette)?;
        info!(%season, confidence, masking = prepared.masking_applied, "analysis complete");

        Ok(AnalysisResult {
            season,
            confidence: round4(confidence),
            palettes,
            all_probabilities: probabilities.to_map(),
            description: include_description.then(|| self.catalog.describe(season)),
            face_masking_applied: prepared.masking_applied,
        })
    }

    /// Like [`Analyzer::analyze`], plus fit-score recommendations across the
    /// whole catalog, optionally filtered to one use case.
    pub fn analyze_detailed(
        &self,
        input: &[u8],
        use_case: Option<&str>,
    ) -> Result<DetailedAnalysis, ToneError> {
        let (prepared, probabilities) = self.classify(input)?;
        let (season, confidence) = probabilities.top();
        let palettes = synthesize(&self.catalog, &probabilities, &self.palette)?;
        let recommendations = recommend(
            &self.catalog,
            &probabilities,
            use_case,
            self.recommendation_limit,
        )?;

        Ok(DetailedAnalysis {
            season,
            confidence: round4(confidence),
            palettes,
            seasonal_analysis: recommendations.seasonal_analysis,
            recommended_colors: recommendations.recommended_colors,
            description: self.catalog.describe(season),
            face_masking_applied: prepared.masking_applied,
        })
    }

    /// Preprocess and run the classifier; returns normalized probabilities.
    fn classify(&self, input: &[u8]) -> Result<(PreparedImage, SeasonProbabilities), ToneError> {
        let classifier = self
            .classifier
            .as_deref()
            .ok_or(ToneError::ClassifierUnavailable)?;
        let prepared = self.preprocess(input)?;
        let probabilities = classifier.classify(&prepared.image)?.normalized()?;
        Ok((prepared, probabilities))
    }

    fn decode(&self, input: &[u8]) -> Result<RgbImage, ToneError> {
        if input.is_empty() {
            return Err(ToneError::EmptyInput);
        }
        if input.len() > self.max_input_bytes {
            return Err(ToneError::InputTooLarge {
                size: input.len(),
                limit: self.max_input_bytes,
            });
        }
        let decoded =
            image::load_from_memory(input).map_err(|e| ToneError::DecodeError(e.to_string()))?;
        info!(width = decoded.width(), height = decoded.height(), "image decoded");
        Ok(decoded.to_rgb8())
    }

    fn resize_only(&self, image: &RgbImage) -> PreparedImage {
        PreparedImage {
            image: resize_source(image, self.region.output_width, self.region.output_height),
            masking_applied: false,
            skip_reason: None,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
