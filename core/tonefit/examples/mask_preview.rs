//! Run face-region extraction on a synthetic portrait and save the stages.
//!
//! Usage:
//!   cargo run --example mask_preview [output_dir]
//!
//! Writes `source.png`, `classes.png`, `mask.png` and `region.png` to the
//! output directory (default: the system temp dir).

use std::path::PathBuf;

use image::{GrayImage, Luma, Rgb, RgbImage};
use tonefit::{extract_face_region, FaceDetection, Landmark, RegionExtraction, RegionOptions};
use tracing_subscriber::EnvFilter;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 400;

/// A flat-colored "portrait": background, shoulders, neck, face, hair.
fn synthetic_portrait() -> (RgbImage, GrayImage) {
    let mut image = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([70, 110, 160]));
    let mut classes = GrayImage::new(WIDTH, HEIGHT);

    let (cx, cy) = (WIDTH as f32 / 2.0, 170.0);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let dx = (x as f32 - cx) / 80.0;
            let dy = (y as f32 - cy) / 105.0;
            let in_face = dx * dx + dy * dy <= 1.0;
            let in_hair = (in_face && y < 110) || (dx * dx + dy * dy <= 1.3 && y < 150 && !in_face);
            let in_neck = !in_face && (x as f32 - cx).abs() < 35.0 && (250..310).contains(&y);

            let (class, color) = if y >= 310 {
                (16, Rgb([40, 40, 45]))
            } else if in_hair {
                (14, Rgb([90, 55, 30]))
            } else if in_face {
                (2, Rgb([224, 180, 150]))
            } else if in_neck {
                // neck skin the parser mislabels as face
                (2, Rgb([210, 165, 135]))
            } else {
                (0, *image.get_pixel(x, y))
            };
            image.put_pixel(x, y, color);
            classes.put_pixel(x, y, Luma([class]));
        }
    }
    (image, classes)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&output_dir)?;

    let (image, classes) = synthetic_portrait();
    // jawline landmarks; the lowest one is the chin
    let landmarks = vec![
        Landmark::new(90.0, 200.0),
        Landmark::new(120.0, 245.0),
        Landmark::new(160.0, 268.0),
        Landmark::new(200.0, 245.0),
        Landmark::new(230.0, 200.0),
    ];
    let detection = FaceDetection {
        segmentation: Some(classes.clone()),
        landmarks,
    };

    let result = extract_face_region(&image, Some(&detection), &RegionOptions::default())?;

    image.save(output_dir.join("source.png"))?;
    // stretch class ids so they are visible
    let visible = GrayImage::from_fn(WIDTH, HEIGHT, |x, y| {
        Luma([classes.get_pixel(x, y).0[0].saturating_mul(15)])
    });
    visible.save(output_dir.join("classes.png"))?;

    match &result {
        RegionExtraction::Masked { image, mask, crop } => {
            println!("masked, crop {crop:?}");
            mask.save(output_dir.join("mask.png"))?;
            image.save(output_dir.join("region.png"))?;
        }
        RegionExtraction::Unmasked { image, reason } => {
            println!("masking skipped: {reason:?}");
            image.save(output_dir.join("region.png"))?;
        }
    }
    println!("wrote previews to {}", output_dir.display());
    Ok(())
}
