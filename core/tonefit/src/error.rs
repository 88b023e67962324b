use thiserror::Error;

/// Error type returned by tonefit operations.
#[derive(Debug, Error)]
pub enum ToneError {
    /// A label that is not one of the four seasons.
    #[error("unknown season: {0}")]
    UnknownSeason(String),

    /// Negative, NaN or zero-sum scores.
    #[error("invalid probabilities: {0}")]
    InvalidProbabilities(String),

    /// The source image has no pixels.
    #[error("image dimensions are zero")]
    ZeroDimensions,

    /// A requested output dimension is zero.
    #[error("output dimensions must be > 0")]
    InvalidOutputSize,

    /// A tuning value is out of range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The catalog file could not be read.
    #[error("failed to read color catalog: {0}")]
    CatalogRead(String),

    /// The catalog document is not valid JSON for the catalog schema.
    #[error("failed to parse color catalog: {0}")]
    CatalogParse(String),

    /// The catalog lacks one of the four seasons.
    #[error("color catalog has no entry for season {0}")]
    MissingSeason(String),

    /// A catalog color with a bad hex code or multiplier.
    #[error("invalid catalog entry {name}: {reason}")]
    InvalidCatalogEntry {
        /// Name of the offending color.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Analysis was requested without a classifier attached.
    #[error("season classifier is not available")]
    ClassifierUnavailable,

    /// The classifier reported an error.
    #[error("season classifier failed: {0}")]
    ClassifierFailed(String),

    /// The input bytes are not a supported image.
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    /// The input has no bytes.
    #[error("input image is empty")]
    EmptyInput,

    /// The input exceeds the configured size limit.
    #[error("input image is {size} bytes, limit is {limit}")]
    InputTooLarge {
        /// Input size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The configuration file is malformed or holds invalid values.
    #[error("invalid configuration: {0}")]
    Config(String),
}
