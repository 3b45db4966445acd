mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from fruitcount for tests
pub use fruitcount::{
    AreaMethod, BatchExecutor, CancelFlag, DetectionConfig, DetectionPipeline, FruitCounts,
    FruitKind, ImageOutcome, ResultStore,
};
