use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ToneError;

/// One of the four seasonal color types the classifier predicts.
///
/// The declaration order is the classifier's output order and also the order
/// in which the catalog is walked, so it decides every tie-break downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    /// Warm, deep, muted.
    Autumn,
    /// Cool, light, muted.
    Summer,
    /// Cool, deep, clear.
    Winter,
    /// Warm, light, clear.
    Spring,
}

impl Season {
    /// All seasons in classifier label order.
    pub const ALL: [Season; 4] = [Season::Autumn, Season::Summer, Season::Winter, Season::Spring];

    /// Position of this season in [`Season::ALL`].
    pub fn index(self) -> usize {
        match self {
            Season::Autumn => 0,
            Season::Summer => 1,
            Season::Winter => 2,
            Season::Spring => 3,
        }
    }

    /// Display label, e.g. `"Autumn"`.
    pub fn name(self) -> &'static str {
        match self {
            Season::Autumn => "Autumn",
            Season::Summer => "Summer",
            Season::Winter => "Winter",
            Season::Spring => "Spring",
        }
    }

    /// Lowercase key used by the catalog document, e.g. `"autumn"`.
    pub fn key(self) -> &'static str {
        match self {
            Season::Autumn => "autumn",
            Season::Summer => "summer",
            Season::Winter => "winter",
            Season::Spring => "spring",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Season {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::ALL
            .into_iter()
            .find(|season| season.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ToneError::UnknownSeason(s.to_string()))
    }
}

/// How far from one a score sum may drift and still count as normalized.
pub const UNIT_SUM_TOLERANCE: f64 = 1e-9;

/// Classifier scores, one per season, in label order.
///
/// Values are validated to be finite and non-negative but are not required to
/// sum to one; call [`SeasonProbabilities::normalized`] before using them as
/// weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonProbabilities {
    values: [f64; 4],
}

impl SeasonProbabilities {
    /// Build from scores in [`Season::ALL`] order.
    pub fn new(values: [f64; 4]) -> Result<Self, ToneError> {
        for (season, value) in Season::ALL.iter().zip(values) {
            if !value.is_finite() || value < 0.0 {
                return Err(ToneError::InvalidProbabilities(format!(
                    "{season} has score {value}"
                )));
            }
        }
        Ok(Self { values })
    }

    /// Build from `(label, score)` pairs. Labels missing from the input score
    /// zero; an unrecognised label is a hard error.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ToneError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut values = [0.0; 4];
        let mut seen = [false; 4];
        for (label, value) in pairs {
            let season: Season = label.parse()?;
            if seen[season.index()] {
                return Err(ToneError::InvalidProbabilities(format!(
                    "{season} given more than once"
                )));
            }
            seen[season.index()] = true;
            values[season.index()] = value;
        }
        Self::new(values)
    }

    /// Score for one season.
    pub fn get(&self, season: Season) -> f64 {
        self.values[season.index()]
    }

    /// Raw scores in label order.
    pub fn values(&self) -> [f64; 4] {
        self.values
    }

    /// Iterate `(season, score)` in label order.
    pub fn iter(&self) -> impl Iterator<Item = (Season, f64)> + '_ {
        Season::ALL.into_iter().map(|season| (season, self.get(season)))
    }

    /// Rescale so the scores sum to one.
    ///
    /// Scores that already sum to one within [`UNIT_SUM_TOLERANCE`] are
    /// returned as given, so an exact `0.05` stays `0.05`.
    pub fn normalized(&self) -> Result<Self, ToneError> {
        let total: f64 = self.values.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Err(ToneError::InvalidProbabilities(format!(
                "scores must have a positive sum, got {total}"
            )));
        }
        if (total - 1.0).abs() <= UNIT_SUM_TOLERANCE {
            return Ok(*self);
        }
        Ok(Self {
            values: self.values.map(|value| value / total),
        })
    }

    /// Seasons sorted by score, highest first. Equal scores keep label order.
    pub fn ranked(&self) -> [(Season, f64); 4] {
        let mut ranked = Season::ALL.map(|season| (season, self.get(season)));
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked
    }

    /// The most probable season and its score.
    pub fn top(&self) -> (Season, f64) {
        self.ranked()[0]
    }

    /// Scores keyed by season, in label order.
    pub fn to_map(&self) -> IndexMap<Season, f64> {
        self.iter().collect()
    }
}
