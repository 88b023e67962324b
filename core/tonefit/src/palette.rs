//! Confidence-weighted palette synthesis.
//!
//! Each season whose normalized probability clears the threshold contributes
//! its primary colors, weighted by probability and the color's confidence
//! multiplier. Colors shared between seasons accumulate weight, so a hex code
//! listed by two likely seasons outranks either season's own colors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::catalog::{normalize_hex, ColorCatalog};
use crate::error::ToneError;
use crate::season::{Season, SeasonProbabilities};

/// Colors in the primary tier.
pub const DEFAULT_PRIMARY_COUNT: usize = 6;
/// Colors in the secondary tier.
pub const DEFAULT_SECONDARY_COUNT: usize = 6;
/// Seasons below this probability contribute nothing.
pub const DEFAULT_MIN_PROBABILITY: f64 = 0.05;
/// Weight factor for the second most likely season.
pub const DEFAULT_SECONDARY_BOOST: f64 = 1.5;

/// The secondary season is boosted only when its probability is above this.
pub const DEFAULT_BOOST_FLOOR: f64 = 0.20;

/// Slack for threshold comparisons, so float noise at a boundary does not
/// flip a season in or out.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// A color as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    /// Display name.
    pub name: String,
    /// Hex code as listed in the catalog.
    pub hex: String,
}

/// Two-tier palette.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Highest-weighted colors.
    pub primary: Vec<PaletteColor>,
    /// The next colors after the primary tier.
    pub secondary: Vec<PaletteColor>,
}

/// Tuning for [`synthesize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteOptions {
    /// Size of the primary tier.
    pub primary_count: usize,
    /// Size of the secondary tier.
    pub secondary_count: usize,
    /// Seasons below this normalized probability contribute no colors.
    pub min_probability: f64,
    /// Factor applied to the secondary season's colors.
    pub secondary_boost: f64,
    /// The secondary season must be above this to be boosted.
    pub boost_floor: f64,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            primary_count: DEFAULT_PRIMARY_COUNT,
            secondary_count: DEFAULT_SECONDARY_COUNT,
            min_probability: DEFAULT_MIN_PROBABILITY,
            secondary_boost: DEFAULT_SECONDARY_BOOST,
            boost_floor: DEFAULT_BOOST_FLOOR,
        }
    }
}

impl PaletteOptions {
    /// Number of colors in the primary tier (default: 6).
    pub fn primary_count(mut self, count: usize) -> Self {
        self.primary_count = count;
        self
    }

    /// Number of colors in the secondary tier (default: 6).
    pub fn secondary_count(mut self, count: usize) -> Self {
        self.secondary_count = count;
        self
    }

    /// Inclusive probability cutoff for a season to contribute (default: 0.05).
    pub fn min_probability(mut self, threshold: f64) -> Self {
        self.min_probability = threshold;
        self
    }

    /// Multiplier for the second most probable season (default: 1.5).
    pub fn secondary_boost(mut self, boost: f64) -> Self {
        self.secondary_boost = boost;
        self
    }

    /// Exclusive probability floor for the secondary boost (default: 0.20).
    pub fn boost_floor(mut self, floor: f64) -> Self {
        self.boost_floor = floor;
        self
    }

    /// Reject out-of-range thresholds and factors.
    pub fn validate(&self) -> Result<(), ToneError> {
        if !(0.0..=1.0).contains(&self.min_probability) {
            return Err(ToneError::InvalidOption(format!(
                "min_probability must be within 0.0..=1.0, got {}",
                self.min_probability
            )));
        }
        if !self.secondary_boost.is_finite() || self.secondary_boost < 0.0 {
            return Err(ToneError::InvalidOption(format!(
                "secondary_boost must be >= 0, got {}",
                self.secondary_boost
            )));
        }
        if !self.boost_floor.is_finite() {
            return Err(ToneError::InvalidOption(format!(
                "boost_floor must be finite, got {}",
                self.boost_floor
            )));
        }
        Ok(())
    }
}

/// A color with its accumulated weight and the seasons that contributed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedColor {
    /// Display name.
    pub name: String,
    /// Hex code as listed in the catalog.
    pub hex: String,
    /// Summed weight over all contributing seasons.
    pub weight: f64,
    /// Seasons that listed this color, in catalog order.
    pub seasons: Vec<Season>,
}

impl WeightedColor {
    fn to_palette_color(&self) -> PaletteColor {
        PaletteColor {
            name: self.name.clone(),
            hex: self.hex.clone(),
        }
    }
}

/// Full result of a weighted synthesis, including the ranking behind the tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedPalette {
    /// Most probable season.
    pub primary_season: Season,
    /// Second most probable season.
    pub secondary_season: Season,
    /// Normalized probabilities the palette was built from.
    pub probabilities: IndexMap<Season, f64>,
    /// Every contributing color, highest weight first.
    pub ranked: Vec<WeightedColor>,
    /// The ranking cut into tiers.
    pub palette: Palette,
}

/// Build a personalized two-tier palette from classifier probabilities.
pub fn synthesize(
    catalog: &ColorCatalog,
    probabilities: &SeasonProbabilities,
    options: &PaletteOptions,
) -> Result<Palette, ToneError> {
    synthesize_weighted(catalog, probabilities, options).map(|weighted| weighted.palette)
}

/// Like [`synthesize`], but also returns the weighted ranking.
pub fn synthesize_weighted(
    catalog: &ColorCatalog,
    probabilities: &SeasonProbabilities,
    options: &PaletteOptions,
) -> Result<WeightedPalette, ToneError> {
    options.validate()?;
    let probabilities = probabilities.normalized()?;

    let ranked_seasons = probabilities.ranked();
    let (primary_season, primary_p) = ranked_seasons[0];
    let (secondary_season, secondary_p) = ranked_seasons[1];
    debug!(
        %primary_season,
        primary_p,
        %secondary_season,
        secondary_p,
        "ranked seasons"
    );

    let accumulator = accumulate(catalog, &probabilities, secondary_season, options);
    let ranked = rank(accumulator);

    let primary = ranked
        .iter()
        .take(options.primary_count)
        .map(WeightedColor::to_palette_color)
        .collect();
    let secondary = ranked
        .iter()
        .skip(options.primary_count)
        .take(options.secondary_count)
        .map(WeightedColor::to_palette_color)
        .collect();

    Ok(WeightedPalette {
        primary_season,
        secondary_season,
        probabilities: probabilities.to_map(),
        ranked,
        palette: Palette { primary, secondary },
    })
}

/// Weight of one catalog color contributed by `season` at probability `p`.
fn color_weight(
    season: Season,
    p: f64,
    multiplier: f64,
    secondary_season: Season,
    options: &PaletteOptions,
) -> f64 {
    let weight = p * multiplier;
    if season == secondary_season && p > options.boost_floor + THRESHOLD_EPSILON {
        weight * options.secondary_boost
    } else {
        weight
    }
}

/// Sum weights per normalized hex code, in catalog iteration order.
fn accumulate(
    catalog: &ColorCatalog,
    probabilities: &SeasonProbabilities,
    secondary_season: Season,
    options: &PaletteOptions,
) -> IndexMap<String, WeightedColor> {
    let mut accumulator: IndexMap<String, WeightedColor> = IndexMap::new();

    for season in Season::ALL {
        let p = probabilities.get(season);
        if p < options.min_probability - THRESHOLD_EPSILON {
            debug!(%season, p, "season below threshold, skipped");
            continue;
        }

        for color in &catalog.profile(season).primary_colors {
            let weight = color_weight(
                season,
                p,
                color.confidence_multiplier,
                secondary_season,
                options,
            );
            let entry = accumulator
                .entry(normalize_hex(&color.hex))
                .or_insert_with(|| WeightedColor {
                    name: color.name.clone(),
                    hex: color.hex.clone(),
                    weight: 0.0,
                    seasons: Vec::new(),
                });
            entry.weight += weight;
            if !entry.seasons.contains(&season) {
                entry.seasons.push(season);
            }
        }
    }

    accumulator
}

/// Highest weight first; equal weights keep accumulation order.
fn rank(accumulator: IndexMap<String, WeightedColor>) -> Vec<WeightedColor> {
    let mut ranked: Vec<WeightedColor> = accumulator.into_values().collect();
    ranked.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    ranked
}
