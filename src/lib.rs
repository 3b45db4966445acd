pub mod batch;
pub mod config;
pub mod detection;
pub mod error;
pub mod export;
pub mod models;
pub mod report;
pub mod store;

pub use batch::{BatchExecutor, BatchReport, CancelFlag, ImageOutcome, ImageReport};
pub use config::{AreaMethod, DetectionConfig, FruitParams};
pub use detection::{DetectionPipeline, FruitAnalysis};
pub use error::DetectionError;
pub use models::{Contour, Detection, FruitCounts, FruitKind, FruitMasks, HueRange};
pub use store::ResultStore;
