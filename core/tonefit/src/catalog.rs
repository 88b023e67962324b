//! The static color catalog: per-season color lists and descriptive metadata.
//!
//! The catalog is a JSON document keyed by lowercase season name. It is loaded
//! once and never mutated; share it between requests behind an `Arc`.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ToneError;
use crate::palette::{Palette, PaletteColor};
use crate::season::Season;

/// Use-case tag that matches every filter.
pub const WILDCARD_USE: &str = "all";

/// Number of primary colors in a single-season palette.
const FIXED_PRIMARY_COUNT: usize = 6;

/// Extra primary colors moved into the secondary tier of a single-season palette.
const FIXED_SECONDARY_FROM_PRIMARY: usize = 3;

/// Neutral colors appended to the secondary tier of a single-season palette.
const FIXED_SECONDARY_NEUTRALS: usize = 3;

const EMBEDDED_CATALOG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/color_palette.json"
));

fn default_multiplier() -> f64 {
    1.0
}

/// A single named color in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// Display name.
    pub name: String,
    /// Hex code, `#rrggbb`.
    pub hex: String,
    /// Explicit RGB triplet, if the catalog lists one.
    #[serde(default)]
    pub rgb: Option<[u8; 3]>,
    /// Scales this color's weight independently of season probability.
    #[serde(default = "default_multiplier")]
    pub confidence_multiplier: f64,
    /// Garment or accessory kinds this color is recommended for.
    #[serde(default)]
    pub use_for: Vec<String>,
}

impl ColorEntry {
    /// The RGB triplet, taken from the entry or decoded from its hex code.
    pub fn rgb(&self) -> Option<[u8; 3]> {
        self.rgb.or_else(|| parse_hex(&self.hex))
    }

    /// Whether this color passes a use-case filter. `None` and the wildcard
    /// accept everything.
    pub fn suits(&self, use_case: Option<&str>) -> bool {
        match use_case {
            None | Some(WILDCARD_USE) => true,
            Some(tag) => self.use_for.iter().any(|u| u == tag || u == WILDCARD_USE),
        }
    }

    fn to_palette_color(&self) -> PaletteColor {
        PaletteColor {
            name: self.name.clone(),
            hex: self.hex.clone(),
        }
    }

    fn validate(&self) -> Result<(), ToneError> {
        let invalid = |reason: String| ToneError::InvalidCatalogEntry {
            name: self.name.clone(),
            reason,
        };
        if parse_hex(&self.hex).is_none() {
            return Err(invalid(format!("bad hex code {:?}", self.hex)));
        }
        if !self.confidence_multiplier.is_finite() || self.confidence_multiplier < 0.0 {
            return Err(invalid(format!(
                "confidence multiplier must be >= 0, got {}",
                self.confidence_multiplier
            )));
        }
        Ok(())
    }
}

/// Everything the catalog knows about one season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonProfile {
    /// Display name, e.g. `"Autumn"`.
    pub display_name: String,
    /// Short code, e.g. `"AUTUMN"`.
    pub season_code: String,
    /// One-paragraph summary.
    pub description: String,
    /// Undertone, value, chroma and contrast.
    pub characteristics: IndexMap<String, String>,
    /// Typical natural hair colors.
    pub hair_colors: Vec<String>,
    /// Makeup shades keyed by product.
    pub makeup_recommendations: IndexMap<String, Vec<String>>,
    /// Ordered; this order breaks ties in every ranking.
    pub primary_colors: Vec<ColorEntry>,
    /// Neutrals; used to fill the single-season secondary tier.
    pub neutral_colors: Vec<ColorEntry>,
    /// Colors that clash with the season.
    pub avoid_colors: Vec<ColorEntry>,
}

/// Presentation view of a season profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonDescription {
    /// Display name.
    pub name: String,
    /// Short code, e.g. `"AUTUMN"`.
    pub code: String,
    /// One-paragraph summary.
    pub description: String,
    /// Undertone, value, chroma and contrast.
    pub characteristics: IndexMap<String, String>,
    /// Typical natural hair colors.
    pub hair_colors: Vec<String>,
    /// Makeup shades keyed by product.
    pub makeup_recommendations: IndexMap<String, Vec<String>>,
    /// Colors that clash with the season.
    pub avoid_colors: Vec<PaletteColor>,
}

/// The loaded, validated catalog for all four seasons.
#[derive(Debug, Clone)]
pub struct ColorCatalog {
    profiles: [SeasonProfile; 4],
}

impl ColorCatalog {
    /// Parse a catalog document. Every season must be present; any other
    /// top-level key is rejected.
    pub fn from_json_str(json: &str) -> Result<Self, ToneError> {
        let mut raw: IndexMap<String, SeasonProfile> =
            serde_json::from_str(json).map_err(|e| ToneError::CatalogParse(e.to_string()))?;

        if let Some(unknown) = raw.keys().find(|key| key.parse::<Season>().is_err()) {
            return Err(ToneError::UnknownSeason(unknown.clone()));
        }

        let mut take = |season: Season| -> Result<SeasonProfile, ToneError> {
            let key = raw
                .keys()
                .find(|key| key.parse::<Season>().ok() == Some(season))
                .cloned()
                .ok_or_else(|| ToneError::MissingSeason(season.name().to_string()))?;
            let profile = raw
                .shift_remove(&key)
                .ok_or_else(|| ToneError::MissingSeason(season.name().to_string()))?;
            for color in profile
                .primary_colors
                .iter()
                .chain(&profile.neutral_colors)
                .chain(&profile.avoid_colors)
            {
                color.validate()?;
            }
            Ok(profile)
        };

        let profiles = [
            take(Season::Autumn)?,
            take(Season::Summer)?,
            take(Season::Winter)?,
            take(Season::Spring)?,
        ];

        let catalog = Self { profiles };
        info!(
            seasons = Season::ALL.len(),
            primary_colors = catalog.primary_color_count(),
            "color catalog loaded"
        );
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ToneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ToneError::CatalogRead(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// The catalog bundled with the crate.
    pub fn embedded() -> Result<Self, ToneError> {
        Self::from_json_str(EMBEDDED_CATALOG)
    }

    /// Profile of one season.
    pub fn profile(&self, season: Season) -> &SeasonProfile {
        &self.profiles[season.index()]
    }

    /// Look a profile up by label. Unknown labels are a hard error.
    pub fn profile_by_name(&self, name: &str) -> Result<&SeasonProfile, ToneError> {
        let season: Season = name.parse()?;
        Ok(self.profile(season))
    }

    /// Primary colors of every season in catalog iteration order: season label
    /// order, then entry order within the season.
    pub fn primary_colors(&self) -> impl Iterator<Item = (Season, &ColorEntry)> + '_ {
        Season::ALL.into_iter().flat_map(move |season| {
            self.profile(season)
                .primary_colors
                .iter()
                .map(move |color| (season, color))
        })
    }

    fn primary_color_count(&self) -> usize {
        self.profiles.iter().map(|p| p.primary_colors.len()).sum()
    }

    /// The unweighted palette of a single season: its first six primary
    /// colors, then three more primaries and three neutrals as the secondary
    /// tier.
    pub fn fixed_palette(&self, season: Season) -> Palette {
        let profile = self.profile(season);

        let primary = profile
            .primary_colors
            .iter()
            .take(FIXED_PRIMARY_COUNT)
            .map(ColorEntry::to_palette_color)
            .collect();

        let secondary = profile
            .primary_colors
            .iter()
            .skip(FIXED_PRIMARY_COUNT)
            .take(FIXED_SECONDARY_FROM_PRIMARY)
            .chain(profile.neutral_colors.iter().take(FIXED_SECONDARY_NEUTRALS))
            .map(ColorEntry::to_palette_color)
            .collect();

        Palette { primary, secondary }
    }

    /// Presentation view of one season.
    pub fn describe(&self, season: Season) -> SeasonDescription {
        let profile = self.profile(season);
        let name = if profile.display_name.is_empty() {
            season.name().to_string()
        } else {
            profile.display_name.clone()
        };
        SeasonDescription {
            name,
            code: profile.season_code.clone(),
            description: profile.description.clone(),
            characteristics: profile.characteristics.clone(),
            hair_colors: profile.hair_colors.clone(),
            makeup_recommendations: profile.makeup_recommendations.clone(),
            avoid_colors: profile
                .avoid_colors
                .iter()
                .map(ColorEntry::to_palette_color)
                .collect(),
        }
    }

    /// Every season's description, in label order.
    pub fn describe_all(&self) -> IndexMap<Season, SeasonDescription> {
        Season::ALL
            .into_iter()
            .map(|season| (season, self.describe(season)))
            .collect()
    }
}

/// Canonical form of a hex color: `#rrggbb`, lowercase.
///
/// Surrounding whitespace and a leading `#` are dropped and anything past six
/// characters is ignored. Blank input yields an empty string.
pub fn normalize_hex(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let digits: String = digits.chars().take(6).collect();
    format!("#{}", digits.to_lowercase())
}

fn parse_hex(value: &str) -> Option<[u8; 3]> {
    let normalized = normalize_hex(value);
    let digits = normalized.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
