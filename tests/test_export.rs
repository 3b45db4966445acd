//! Integration tests for result export and image outputs.

mod common;

use common::*;
use fruitcount::export;
use fruitcount::{FruitCounts, FruitKind};
use image::Rgb;
use indexmap::IndexMap;

fn sample_store() -> ResultStore {
    let mut store = ResultStore::new();
    store.put("b.jpg", counts(0, 2, 1));
    store.put("a.jpg", counts(1, 0, 0));
    store
}

#[test]
fn test_json_uses_four_space_indent_and_store_order() -> anyhow::Result<()> {
    let json = export::to_json_string(&sample_store())?;

    assert!(json.starts_with("{\n    \"b.jpg\": {\n        \"apple\": 0,"));
    assert!(json.find("\"b.jpg\"") < json.find("\"a.jpg\""));

    let parsed: IndexMap<String, FruitCounts> = serde_json::from_str(&json)?;
    assert_eq!(parsed, sample_store().get_all());
    Ok(())
}

#[test]
fn test_write_json_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("results.json");

    assert!(export::write_json(&sample_store(), &path)?);
    let parsed: ResultStore = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(parsed, sample_store());
    Ok(())
}

#[test]
fn test_empty_store_is_not_exported() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("results.json");

    assert!(!export::write_json(&ResultStore::new(), &path)?);
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_masked_image_blacks_out_background() {
    let img = single_disk_image(APPLE_RED);
    let detection = DetectionPipeline::default().detect(&img).unwrap();

    let masked = export::masked_image(&img, &detection.masks.apple);
    assert_eq!(*masked.get_pixel(100, 100), APPLE_RED);
    assert_eq!(*masked.get_pixel(5, 5), Rgb([0, 0, 0]));

    let nothing = export::masked_image(&img, &detection.masks.banana);
    assert!(nothing.pixels().all(|p| *p == Rgb([0, 0, 0])));
}

#[test]
fn test_save_masked_images_names_files_per_fruit() -> anyhow::Result<()> {
    let input_dir = tempfile::TempDir::new()?;
    let output_dir = tempfile::TempDir::new()?;
    let paths = vec![
        write_png(input_dir.path(), "bowl.png", &single_disk_image(ORANGE)),
        input_dir.path().join("gone.png"),
        write_png(input_dir.path(), "plate.png", &single_disk_image(APPLE_RED)),
    ];

    let written =
        export::save_masked_images(&DetectionPipeline::default(), &paths, output_dir.path())?;
    assert_eq!(written.len(), 6);

    for name in [
        "bowl_apples_1.jpg",
        "bowl_bananas_1.jpg",
        "bowl_oranges_1.jpg",
        "plate_apples_3.jpg",
        "plate_bananas_3.jpg",
        "plate_oranges_3.jpg",
    ] {
        assert!(output_dir.path().join(name).exists(), "missing {name}");
    }
    Ok(())
}

#[test]
fn test_overlay_outlines_contours() -> anyhow::Result<()> {
    let img = single_disk_image(BANANA_YELLOW);
    let analyses = DetectionPipeline::default().analyze(&img)?;
    let banana = analyses
        .iter()
        .find(|a| a.kind == FruitKind::Banana)
        .expect("banana pass");

    let overlay = export::render_overlay(&img, banana);
    let outline = Rgb(FruitKind::Banana.overlay_color());
    assert!(overlay.pixels().any(|p| *p == outline));
    // Background outside the mask is untouched
    assert_eq!(*overlay.get_pixel(2, 2), BACKGROUND_BLUE);
    Ok(())
}

#[test]
fn test_debug_outputs_require_empty_dir() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    export::prepare_debug_dir(dir.path())?;

    let fresh = dir.path().join("nested");
    export::prepare_debug_dir(&fresh)?;
    assert!(fresh.is_dir());

    // `dir` now contains `nested`
    assert!(export::prepare_debug_dir(dir.path()).is_err());
    Ok(())
}

#[test]
fn test_write_debug_outputs() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let img = two_disk_image(APPLE_RED);
    let image_path = std::path::Path::new("fruit.png");

    let written =
        export::write_debug_outputs(&DetectionPipeline::default(), &img, image_path, dir.path())?;
    assert_eq!(written.len(), 9);
    assert!(dir.path().join("fruit").join("03_apple_overlay.png").exists());
    assert!(written.iter().all(|p| p.exists()));
    Ok(())
}
