//! Fit-score ranking across the whole catalog.
//!
//! Unlike [`crate::palette`], no season is cut off here: every primary color
//! is scored, with the primary season at full strength, the secondary season
//! damped, and all other seasons held to a small flat floor.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::ColorCatalog;
use crate::error::ToneError;
use crate::season::{Season, SeasonProbabilities};

/// Recommended colors returned by default.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 20;

const SECONDARY_FACTOR: f64 = 0.7;
const OTHER_FACTOR: f64 = 0.2;
const MAX_FIT_SCORE: f64 = 100.0;

/// Summary of the classifier output as percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalAnalysis {
    /// Most probable season.
    pub primary_season: Season,
    /// Primary season probability, in percent.
    pub primary_score: f64,
    /// Second most probable season.
    pub secondary_season: Season,
    /// Secondary season probability, in percent.
    pub secondary_score: f64,
    /// Every season in percent, in label order.
    pub all_scores: IndexMap<Season, f64>,
}

/// A catalog color scored against the classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedColor {
    /// Display name.
    pub name: String,
    /// Hex code as listed in the catalog.
    pub hex: String,
    /// RGB triplet, from the catalog or decoded from `hex`.
    pub rgb: Option<[u8; 3]>,
    /// Season whose catalog listed the color.
    pub season: Season,
    /// 0–100.
    pub fit_score: f64,
    /// Use-case tags from the catalog.
    pub use_for: Vec<String>,
    /// The catalog multiplier applied to the score.
    pub confidence_multiplier: f64,
}

/// Output of [`recommend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    /// Season percentages the scores were derived from.
    pub seasonal_analysis: SeasonalAnalysis,
    /// Highest fit score first, at most `limit` long.
    pub recommended_colors: Vec<RecommendedColor>,
    /// Colors that passed the use-case filter before truncation.
    pub total_analyzed: usize,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent scores, unrounded, with the top two seasons.
fn percent_scores(probabilities: &SeasonProbabilities) -> Result<([(Season, f64); 4], SeasonProbabilities), ToneError> {
    let normalized = probabilities.normalized()?;
    let ranked = normalized.ranked().map(|(season, p)| (season, p * 100.0));
    Ok((ranked, normalized))
}

/// Primary and secondary season with their percentage scores.
pub fn seasonal_analysis(probabilities: &SeasonProbabilities) -> Result<SeasonalAnalysis, ToneError> {
    let (ranked, normalized) = percent_scores(probabilities)?;
    Ok(SeasonalAnalysis {
        primary_season: ranked[0].0,
        primary_score: round2(ranked[0].1),
        secondary_season: ranked[1].0,
        secondary_score: round2(ranked[1].1),
        all_scores: normalized
            .iter()
            .map(|(season, p)| (season, round2(p * 100.0)))
            .collect(),
    })
}

/// Score every catalog color against the distribution and return the best
/// `limit`, optionally restricted to one use case.
pub fn recommend(
    catalog: &ColorCatalog,
    probabilities: &SeasonProbabilities,
    use_case: Option<&str>,
    limit: usize,
) -> Result<Recommendations, ToneError> {
    let (ranked, _) = percent_scores(probabilities)?;
    let (primary_season, primary_score) = ranked[0];
    let (secondary_season, secondary_score) = ranked[1];
    info!(
        %primary_season,
        primary_score,
        %secondary_season,
        secondary_score,
        "seasonal analysis"
    );

    let base_score = |season: Season| {
        if season == primary_season {
            primary_score
        } else if season == secondary_season {
            secondary_score * SECONDARY_FACTOR
        } else {
            primary_score.min(secondary_score) * OTHER_FACTOR
        }
    };

    let mut colors: Vec<RecommendedColor> = catalog
        .primary_colors()
        .filter(|(_, color)| color.suits(use_case))
        .map(|(season, color)| RecommendedColor {
            name: color.name.clone(),
            hex: color.hex.clone(),
            rgb: color.rgb(),
            season,
            fit_score: (base_score(season) * color.confidence_multiplier).min(MAX_FIT_SCORE),
            use_for: color.use_for.clone(),
            confidence_multiplier: color.confidence_multiplier,
        })
        .collect();

    colors.sort_by(|a, b| b.fit_score.partial_cmp(&a.fit_score).unwrap_or(Ordering::Equal));
    let total_analyzed = colors.len();
    colors.truncate(limit);
    debug!(total_analyzed, returned = colors.len(), "color recommendations");

    Ok(Recommendations {
        seasonal_analysis: seasonal_analysis(probabilities)?,
        recommended_colors: colors,
        total_analyzed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog_from, entry, uniform_catalog};

    fn probs(values: [f64; 4]) -> SeasonProbabilities {
        SeasonProbabilities::new(values).unwrap()
    }

    fn score_of(recs: &Recommendations, name: &str) -> f64 {
        recs.recommended_colors
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("{name} missing"))
            .fit_score
    }

    #[test]
    fn base_scores_by_rank() {
        let catalog = uniform_catalog(1);
        let recs = recommend(&catalog, &probs([0.6, 0.25, 0.1, 0.05]), None, 20).unwrap();

        assert!((score_of(&recs, "Autumn 0") - 60.0).abs() < 1e-9);
        assert!((score_of(&recs, "Summer 0") - 25.0 * 0.7).abs() < 1e-9);
        // every other season gets min(primary, secondary) × 0.2 regardless of its own score
        assert!((score_of(&recs, "Winter 0") - 5.0).abs() < 1e-9);
        assert!((score_of(&recs, "Spring 0") - 5.0).abs() < 1e-9);
    }

    #[test]
    fn no_threshold_applies() {
        let catalog = uniform_catalog(3);
        let recs = recommend(&catalog, &probs([0.97, 0.01, 0.01, 0.01]), None, 100).unwrap();
        assert_eq!(recs.recommended_colors.len(), 12);
        assert_eq!(recs.total_analyzed, 12);
    }

    #[test]
    fn fit_score_is_capped_at_100() {
        let catalog = catalog_from([
            vec![entry("Gold", "#ffd700", 1.8, &[])],
            vec![entry("Sky", "#87ceeb", 0.0, &[])],
            vec![],
            vec![],
        ]);
        let recs = recommend(&catalog, &probs([0.9, 0.1, 0.0, 0.0]), None, 20).unwrap();
        assert_eq!(score_of(&recs, "Gold"), 100.0);
        assert_eq!(score_of(&recs, "Sky"), 0.0);
    }

    #[test]
    fn scores_stay_in_range_for_any_distribution() {
        let catalog = catalog_from([
            vec![entry("A", "#010101", 3.0, &[]), entry("A2", "#010102", 0.0, &[])],
            vec![entry("B", "#020202", 1.5, &[])],
            vec![entry("C", "#030303", 1.0, &[])],
            vec![entry("D", "#040404", 10.0, &[])],
        ]);
        let steps = [0.0, 0.01, 0.3, 0.7, 1.0, 5.0];
        for &a in &steps {
            for &b in &steps {
                for &c in &steps {
                    let recs = recommend(&catalog, &probs([a, b, c, 0.2]), None, 20).unwrap();
                    for color in &recs.recommended_colors {
                        assert!((0.0..=100.0).contains(&color.fit_score), "{}", color.fit_score);
                    }
                }
            }
        }
    }

    #[test]
    fn use_case_filter_respects_wildcard_tag() {
        let catalog = catalog_from([
            vec![
                entry("Top", "#111111", 1.0, &["tops"]),
                entry("Dress", "#222222", 1.0, &["dresses"]),
                entry("Anything", "#333333", 1.0, &["all"]),
                entry("Untagged", "#444444", 1.0, &[]),
            ],
            vec![],
            vec![],
            vec![],
        ]);
        let distribution = probs([0.7, 0.3, 0.0, 0.0]);

        let names = |use_case: Option<&str>| -> Vec<String> {
            recommend(&catalog, &distribution, use_case, 20)
                .unwrap()
                .recommended_colors
                .into_iter()
                .map(|c| c.name)
                .collect()
        };

        assert_eq!(names(Some("tops")), ["Top", "Anything"]);
        assert_eq!(names(Some("all")).len(), 4);
        assert_eq!(names(None).len(), 4);
        assert_eq!(names(Some("shoes")), ["Anything"]);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let catalog = uniform_catalog(10);
        let recs = recommend(&catalog, &probs([0.1, 0.2, 0.6, 0.1]), None, 5).unwrap();
        assert_eq!(recs.recommended_colors.len(), 5);
        assert_eq!(recs.total_analyzed, 40);
        assert!(recs
            .recommended_colors
            .iter()
            .all(|c| c.season == Season::Winter));
        // ties keep catalog order
        let names: Vec<_> = recs.recommended_colors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Winter 0", "Winter 1", "Winter 2", "Winter 3", "Winter 4"]);
    }

    #[test]
    fn sorted_descending() {
        let catalog = uniform_catalog(4);
        let recs = recommend(&catalog, &probs([0.3, 0.4, 0.2, 0.1]), None, 20).unwrap();
        for pair in recs.recommended_colors.windows(2) {
            assert!(pair[0].fit_score >= pair[1].fit_score);
        }
    }

    #[test]
    fn seasonal_summary_is_rounded_percentages() {
        let analysis = seasonal_analysis(&probs([1.0, 2.0, 0.0, 0.0])).unwrap();
        assert_eq!(analysis.primary_season, Season::Summer);
        assert_eq!(analysis.primary_score, 66.67);
        assert_eq!(analysis.secondary_season, Season::Autumn);
        assert_eq!(analysis.secondary_score, 33.33);
        assert_eq!(analysis.all_scores[&Season::Winter], 0.0);
        assert_eq!(
            analysis.all_scores.keys().copied().collect::<Vec<_>>(),
            Season::ALL.to_vec()
        );
    }

    #[test]
    fn rgb_is_reported_from_hex() {
        let catalog = catalog_from([vec![entry("Rust", "#b7410e", 1.0, &[])], vec![], vec![], vec![]]);
        let recs = recommend(&catalog, &probs([1.0, 0.0, 0.0, 0.0]), None, 1).unwrap();
        assert_eq!(recs.recommended_colors[0].rgb, Some([0xb7, 0x41, 0x0e]));
    }

    #[test]
    fn recommendations_serialize_with_season_names() {
        let catalog = uniform_catalog(1);
        let recs = recommend(&catalog, &probs([0.5, 0.3, 0.1, 0.1]), None, 2).unwrap();
        let json = serde_json::to_value(&recs).unwrap();
        assert_eq!(json["seasonal_analysis"]["primary_season"], "Autumn");
        assert_eq!(json["seasonal_analysis"]["all_scores"]["Summer"], 30.0);
        assert_eq!(json["recommended_colors"][0]["season"], "Autumn");
    }
}
