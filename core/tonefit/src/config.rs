//! File-based configuration.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! catalog_path = "color_palette.json"
//!
//! [palette]
//! min_probability = 0.15
//!
//! [region]
//! output_width = 224
//! output_height = 224
//!
//! [analyzer]
//! face_masking = true
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::ColorCatalog;
use crate::error::ToneError;
use crate::palette::PaletteOptions;
use crate::recommend::DEFAULT_RECOMMENDATION_LIMIT;
use crate::region::RegionOptions;

/// Environment variable that overrides [`ToneConfig::catalog_path`].
pub const CATALOG_PATH_ENV: &str = "TONEFIT_CATALOG_PATH";

/// Largest accepted input image, in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// `[analyzer]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Run face-region extraction before classification when a parser is set.
    pub face_masking: bool,
    /// Largest accepted input image, in bytes.
    pub max_input_bytes: usize,
    /// Colors returned by detailed analysis.
    pub recommendation_limit: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            face_masking: true,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

/// Complete file configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Catalog JSON file; the bundled catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// `[palette]` section.
    pub palette: PaletteOptions,
    /// `[region]` section.
    pub region: RegionOptions,
    /// `[analyzer]` section.
    pub analyzer: AnalyzerSettings,
}

impl ToneConfig {
    /// Parse and validate TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ToneError> {
        let config: ToneConfig =
            toml::from_str(content).map_err(|e| ToneError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ToneError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ToneError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ToneError> {
        self.palette.validate()?;
        self.region.validate()?;
        if self.analyzer.max_input_bytes == 0 {
            return Err(ToneError::Config("max_input_bytes must be > 0".into()));
        }
        Ok(())
    }

    /// Catalog location: the environment variable wins over the file value.
    /// An empty variable counts as unset.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.resolve_catalog_path(std::env::var_os(CATALOG_PATH_ENV))
    }

    fn resolve_catalog_path(&self, env_value: Option<OsString>) -> Option<PathBuf> {
        match env_value {
            Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
            _ => self.catalog_path.clone(),
        }
    }

    /// Load the catalog from [`ToneConfig::catalog_path`], or the bundled
    /// catalog when no path is configured.
    pub fn load_catalog(&self) -> Result<ColorCatalog, ToneError> {
        load_catalog_at(self.catalog_path())
    }
}

fn load_catalog_at(path: Option<PathBuf>) -> Result<ColorCatalog, ToneError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading color catalog");
            ColorCatalog::from_json_file(path)
        }
        None => ColorCatalog::embedded(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = ToneConfig::from_toml_str("").unwrap();
        assert_eq!(config, ToneConfig::default());
        assert_eq!(config.palette.primary_count, 6);
        assert_eq!(config.palette.min_probability, 0.05);
        assert_eq!(config.region.output_width, 224);
        assert!(config.analyzer.face_masking);
        assert_eq!(config.analyzer.max_input_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ToneConfig::from_toml_str(
            r#"
            catalog_path = "palettes/v2.json"

            [palette]
            min_probability = 0.15
            secondary_boost = 2.0

            [region]
            output_width = 128
            output_height = 96

            [region.classes]
            hair = 17
            first_outfit = 18

            [analyzer]
            face_masking = false
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog_path, Some(PathBuf::from("palettes/v2.json")));
        assert_eq!(config.palette.min_probability, 0.15);
        assert_eq!(config.palette.secondary_boost, 2.0);
        assert_eq!(config.palette.secondary_count, 6);
        assert_eq!((config.region.output_width, config.region.output_height), (128, 96));
        assert_eq!(config.region.side_margin, 0.1);
        assert_eq!(config.region.classes.hair, 17);
        assert_eq!(config.region.classes.face_skin, 2);
        assert!(!config.analyzer.face_masking);
        assert_eq!(config.analyzer.recommendation_limit, 20);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ToneConfig::from_toml_str("[palette]\nmin_probability = 2.0").is_err());
        assert!(ToneConfig::from_toml_str("[region]\noutput_width = 0").is_err());
        assert!(ToneConfig::from_toml_str("[analyzer]\nmax_input_bytes = 0").is_err());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            ToneConfig::from_toml_str("[palette"),
            Err(ToneError::Config(_))
        ));
    }

    #[test]
    fn env_value_overrides_file_path() {
        let config = ToneConfig {
            catalog_path: Some(PathBuf::from("from_file.json")),
            ..ToneConfig::default()
        };
        assert_eq!(
            config.resolve_catalog_path(Some(OsString::from("/srv/palette.json"))),
            Some(PathBuf::from("/srv/palette.json"))
        );
        assert_eq!(
            config.resolve_catalog_path(Some(OsString::new())),
            Some(PathBuf::from("from_file.json"))
        );
        assert_eq!(
            config.resolve_catalog_path(None),
            Some(PathBuf::from("from_file.json"))
        );
        assert_eq!(ToneConfig::default().resolve_catalog_path(None), None);
    }

    // the only test in this crate that touches the variable
    #[test]
    fn catalog_path_reads_environment() {
        let config = ToneConfig {
            catalog_path: Some(PathBuf::from("from_file.json")),
            ..ToneConfig::default()
        };

        std::env::set_var(CATALOG_PATH_ENV, "/srv/palette.json");
        assert_eq!(config.catalog_path(), Some(PathBuf::from("/srv/palette.json")));

        std::env::set_var(CATALOG_PATH_ENV, "");
        assert_eq!(config.catalog_path(), Some(PathBuf::from("from_file.json")));

        std::env::remove_var(CATALOG_PATH_ENV);
        assert_eq!(config.catalog_path(), Some(PathBuf::from("from_file.json")));
    }

    #[test]
    fn catalog_loads_embedded_without_path() {
        let catalog = load_catalog_at(None).unwrap();
        assert_eq!(catalog.describe(crate::Season::Winter).code, "WINTER");
    }

    #[test]
    fn catalog_loads_from_configured_path() {
        assert!(matches!(
            load_catalog_at(Some(PathBuf::from("/nonexistent/palette.json"))),
            Err(ToneError::CatalogRead(_))
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            ToneConfig::from_toml_file("/nonexistent/tonefit.toml"),
            Err(ToneError::Config(_))
        ));
    }
}
