use std::env;

use fruitcount::DetectionPipeline;
use fruitcount::batch::load_rgb;

fn main() -> anyhow::Result<()> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "fruit_test_image.png".to_string());

    let img = load_rgb(path.as_ref())?;
    println!("Image loaded: {}x{}", img.width(), img.height());

    let pipeline = DetectionPipeline::default();
    for analysis in pipeline.analyze(&img)? {
        println!(
            "{:>7}: {} region(s) traced, {} counted",
            analysis.kind,
            analysis.contours.len(),
            analysis.count
        );
    }

    let detection = pipeline.detect(&img)?;
    println!("\n{}", serde_json::to_string_pretty(&detection.counts)?);
    Ok(())
}
