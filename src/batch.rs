use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;

use image::{DynamicImage, ImageReader, RgbImage};
use tracing::{debug, info, warn};

use crate::detection::DetectionPipeline;
use crate::detection::preprocessing::rgb_from_dynamic;
use crate::error::{DetectionError, Result};
use crate::models::FruitCounts;
use crate::store::ResultStore;

/// Shared flag for stopping a batch between images
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum ImageOutcome {
    Detected(FruitCounts),
    Failed(DetectionError),
    /// Not started because the batch was cancelled
    Skipped,
}

#[derive(Debug)]
pub struct ImageReport {
    pub image_id: String,
    pub outcome: ImageOutcome,
}

/// Per-image outcomes of one batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<ImageReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Detected(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Skipped))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &DetectionError)> {
        self.items.iter().filter_map(|item| match &item.outcome {
            ImageOutcome::Failed(err) => Some((item.image_id.as_str(), err)),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&ImageOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

/// Identifier used for an image in the result store: its file name
pub fn image_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode an image file into an RGB raster
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path).map_err(|source| DetectionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let img = reader.decode().map_err(|source| DetectionError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    rgb_from_dynamic(&img)
}

struct Job<T> {
    index: usize,
    image_id: String,
    input: T,
}

/// Runs the detection pipeline over many images on a pool of worker
/// threads. Work is handed out through a channel; the calling thread is the
/// only one writing to the [`ResultStore`].
pub struct BatchExecutor {
    pipeline: DetectionPipeline,
    workers: usize,
    cancel: CancelFlag,
}

impl BatchExecutor {
    pub fn new(pipeline: DetectionPipeline) -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            pipeline,
            workers,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    /// Load and process image files, recording results under their file names
    pub fn run_paths(&self, paths: &[PathBuf], store: &mut ResultStore) -> BatchReport {
        let jobs: Vec<(String, PathBuf)> = paths
            .iter()
            .map(|path| (image_id(path), path.clone()))
            .collect();
        self.run_with(jobs, |path: PathBuf| load_rgb(&path), store)
    }

    /// Process already-decoded images
    pub fn run_images(
        &self,
        images: Vec<(String, DynamicImage)>,
        store: &mut ResultStore,
    ) -> BatchReport {
        self.run_with(images, |img: DynamicImage| rgb_from_dynamic(&img), store)
    }

    /// Process arbitrary inputs, turning each into an RGB raster with `load`
    /// on the worker thread that picked it up
    pub fn run_with<T, L>(
        &self,
        inputs: Vec<(String, T)>,
        load: L,
        store: &mut ResultStore,
    ) -> BatchReport
    where
        T: Send,
        L: Fn(T) -> Result<RgbImage> + Sync,
    {
        let total = inputs.len();
        if total == 0 {
            return BatchReport::default();
        }
        let workers = self.workers.min(total).max(1);
        debug!(images = total, workers, "starting batch");

        let (job_tx, job_rx) = mpsc::channel::<Job<T>>();
        let (result_tx, result_rx) = mpsc::channel::<(usize, ImageOutcome)>();

        let mut ids = Vec::with_capacity(total);
        for (index, (image_id, input)) in inputs.into_iter().enumerate() {
            ids.push(image_id.clone());
            // The receiver outlives this loop, so sending cannot fail
            let _ = job_tx.send(Job {
                index,
                image_id,
                input,
            });
        }
        drop(job_tx);

        let job_rx = Mutex::new(job_rx);
        let mut outcomes: Vec<Option<ImageOutcome>> = (0..total).map(|_| None).collect();

        thread::scope(|scope| {
            for _ in 0..workers {
                let result_tx = result_tx.clone();
                let job_rx = &job_rx;
                let load = &load;
                scope.spawn(move || self.worker(job_rx, result_tx, load));
            }
            drop(result_tx);

            for (index, outcome) in result_rx {
                outcomes[index] = Some(outcome);
            }
        });

        let mut report = BatchReport::default();
        for (image_id, outcome) in ids.into_iter().zip(outcomes) {
            let outcome = outcome.unwrap_or(ImageOutcome::Skipped);
            match &outcome {
                ImageOutcome::Detected(counts) => {
                    info!(
                        image = %image_id,
                        apple = counts.apple,
                        banana = counts.banana,
                        orange = counts.orange,
                        "detected"
                    );
                    store.put(image_id.clone(), *counts);
                }
                ImageOutcome::Failed(err) => warn!(image = %image_id, "skipping image: {}", err),
                ImageOutcome::Skipped => debug!(image = %image_id, "cancelled before start"),
            }
            report.items.push(ImageReport { image_id, outcome });
        }
        report
    }

    fn worker<T, L>(
        &self,
        jobs: &Mutex<Receiver<Job<T>>>,
        results: mpsc::Sender<(usize, ImageOutcome)>,
        load: &L,
    ) where
        L: Fn(T) -> Result<RgbImage>,
    {
        loop {
            // Hold the lock only while taking the next job
            let job = match jobs.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => return,
            };
            let Ok(job) = job else {
                return;
            };

            let outcome = if self.cancel.is_cancelled() {
                ImageOutcome::Skipped
            } else {
                debug!(image = %job.image_id, "processing");
                match load(job.input).and_then(|rgb| self.pipeline.detect(&rgb)) {
                    Ok(detection) => ImageOutcome::Detected(detection.counts),
                    Err(err) => ImageOutcome::Failed(err),
                }
            };

            if results.send((job.index, outcome)).is_err() {
                return;
            }
        }
    }
}
