//! Catalog builders shared by unit tests.

use serde_json::{json, Value};

use crate::catalog::ColorCatalog;
use crate::season::Season;

pub(crate) fn entry(name: &str, hex: &str, multiplier: f64, use_for: &[&str]) -> Value {
    json!({
        "name": name,
        "hex": hex,
        "confidence_multiplier": multiplier,
        "use_for": use_for,
    })
}

/// A catalog whose seasons list the given primary colors, in label order.
pub(crate) fn catalog_from(primaries: [Vec<Value>; 4]) -> ColorCatalog {
    let mut doc = serde_json::Map::new();
    for (season, colors) in Season::ALL.into_iter().zip(primaries) {
        doc.insert(
            season.key().to_string(),
            json!({
                "display_name": season.name(),
                "primary_colors": colors,
                "neutral_colors": [
                    entry("Ivory", "#fffff0", 1.0, &["all"]),
                    entry("Taupe", "#483c32", 1.0, &["all"]),
                    entry("Charcoal", "#36454f", 1.0, &["all"]),
                ],
            }),
        );
    }
    ColorCatalog::from_json_str(&Value::Object(doc).to_string()).unwrap()
}

/// `per_season` distinct colors per season named `"<Season> <i>"`, all with
/// multiplier 1.0.
pub(crate) fn uniform_catalog(per_season: usize) -> ColorCatalog {
    catalog_from(Season::ALL.map(|season| {
        (0..per_season)
            .map(|i| {
                entry(
                    &format!("{} {i}", season.name()),
                    &format!("#{:02x}{i:02x}80", season.index() * 16),
                    1.0,
                    &["all"],
                )
            })
            .collect()
    }))
}
