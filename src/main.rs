use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, info, warn};

use fruitcount::batch::load_rgb;
use fruitcount::{
    BatchExecutor, DetectionConfig, DetectionPipeline, ImageOutcome, ResultStore, export, report,
};

#[derive(Parser)]
#[command(name = "fruitcount")]
#[command(about = "Count apples, bananas and oranges in images by hue segmentation")]
struct Cli {
    /// Image files to process
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON file overriding hue ranges, area thresholds and cleaning size
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of worker threads (defaults to available cores)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Write the per-image counts to a JSON file
    #[arg(long, value_name = "FILE")]
    export_json: Option<PathBuf>,

    /// Save each image masked to each fruit into this directory
    #[arg(long, value_name = "DIR")]
    save_masked: Option<PathBuf>,

    /// Save masks and contour overlays to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => DetectionConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DetectionConfig::default(),
    };
    let pipeline = DetectionPipeline::new(config);

    if let Some(dir) = &args.debug_out {
        export::prepare_debug_dir(dir)?;
    }

    let mut executor = BatchExecutor::new(pipeline);
    if let Some(jobs) = args.jobs {
        executor = executor.with_workers(jobs);
    }

    info!("Processing {} image(s)", args.images.len());
    let mut store = ResultStore::new();
    let batch = executor.run_paths(&args.images, &mut store);

    println!("{}", report::render_table(&store));
    if batch.failed() > 0 {
        println!("Failed images:");
        for (image, err) in batch.failures() {
            println!("  {}: {}", image, err);
        }
    }

    // Follow-up outputs only for images that made it into the store
    let processed: Vec<PathBuf> = args
        .images
        .iter()
        .zip(&batch.items)
        .filter(|(_, item)| matches!(item.outcome, ImageOutcome::Detected(_)))
        .map(|(path, _)| path.clone())
        .collect();

    if let Some(path) = &args.export_json {
        if export::write_json(&store, path)? {
            info!("Results exported to {}", path.display());
        }
    }

    if let Some(dir) = &args.save_masked {
        let written = export::save_masked_images(executor.pipeline(), &processed, dir)
            .context("Failed to save masked images")?;
        info!("Saved {} masked image(s) to {}", written.len(), dir.display());
    }

    if let Some(dir) = &args.debug_out {
        for path in &processed {
            let rgb = match load_rgb(path) {
                Ok(rgb) => rgb,
                Err(err) => {
                    warn!("Skipping debug output for {}: {}", path.display(), err);
                    continue;
                }
            };
            export::write_debug_outputs(executor.pipeline(), &rgb, path, dir)?;
        }
        info!("Debug outputs saved to {}", dir.display());
    }

    Ok(())
}
