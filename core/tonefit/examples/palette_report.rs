//! Print the personalized palette for a few classifier outputs.
//!
//! Usage:
//!   cargo run --example palette_report [tonefit.toml]
//!
//! The catalog comes from `TONEFIT_CATALOG_PATH`, then the config file's
//! `catalog_path`, then the bundled catalog. Set `RUST_LOG=tonefit=debug` to
//! see the season ranking and weighting.

use tonefit::{
    recommend, synthesize_weighted, SeasonProbabilities, ToneConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ToneConfig::from_toml_file(path)?,
        None => ToneConfig::default(),
    };
    let catalog = config.load_catalog()?;

    let cases: &[(&str, [(&str, f64); 4])] = &[
        (
            "clear Autumn",
            [("Autumn", 0.88), ("Summer", 0.07), ("Winter", 0.03), ("Spring", 0.02)],
        ),
        (
            "Summer leaning Spring",
            [("Summer", 0.55), ("Spring", 0.30), ("Autumn", 0.10), ("Winter", 0.05)],
        ),
        (
            "Winter / Summer split",
            [("Winter", 0.45), ("Summer", 0.40), ("Spring", 0.10), ("Autumn", 0.05)],
        ),
    ];

    for (label, pairs) in cases {
        let probabilities = SeasonProbabilities::from_pairs(pairs.iter().copied())?;
        let weighted = synthesize_weighted(&catalog, &probabilities, &config.palette)?;

        println!("== {label} ({} / {})", weighted.primary_season, weighted.secondary_season);
        for color in weighted.ranked.iter().take(12) {
            let seasons: Vec<String> = color.seasons.iter().map(|s| s.to_string()).collect();
            println!(
                "  {:<18} {}  weight {:.4}  from {}",
                color.name,
                color.hex,
                color.weight,
                seasons.join(", ")
            );
        }
        let primary: Vec<&str> = weighted.palette.primary.iter().map(|c| c.name.as_str()).collect();
        let secondary: Vec<&str> = weighted.palette.secondary.iter().map(|c| c.name.as_str()).collect();
        println!("  primary:   {}", primary.join(", "));
        println!("  secondary: {}", secondary.join(", "));

        let recommendations = recommend(
            &catalog,
            &probabilities,
            Some("dresses"),
            config.analyzer.recommendation_limit,
        )?;
        println!(
            "  dresses:   {} of {} colors, best {} ({:.1})",
            recommendations.recommended_colors.len(),
            recommendations.total_analyzed,
            recommendations
                .recommended_colors
                .first()
                .map(|c| c.name.as_str())
                .unwrap_or("-"),
            recommendations
                .recommended_colors
                .first()
                .map(|c| c.fit_score)
                .unwrap_or(0.0),
        );
        println!();
    }

    Ok(())
}
