pub mod annotations;
pub mod dataset;
pub mod detection;
pub mod error;
pub mod files;
pub mod models;
pub mod recognizer;
pub mod render;
pub mod training;

pub use models::{Patch, Rectangle, SkippedItem, Verdict};
pub use error::DetectorError;
pub use detection::{DetectionPipeline, ImageReport, RunSummary};
pub use dataset::{DatasetBuilder, DatasetLayout, DatasetPolicy};
pub use recognizer::{BoatModel, FeatureExtractor, PatchClassifier};
pub use training::{Trainer, TrainingConfig};
