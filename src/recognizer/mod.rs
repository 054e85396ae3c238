//! Patch recognizer: keypoint features, a visual vocabulary and a linear
//! classifier, plugged into detection through two narrow traits.

pub mod features;
pub mod svm;
pub mod vocabulary;

use std::path::Path;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, Result};
use crate::models::Verdict;
use features::KeypointDescriptor;
use svm::LinearSvm;
use vocabulary::Vocabulary;

/// Turns a normalized patch into a fixed-length descriptor.
/// `None` means no salient keypoints were found.
pub trait FeatureExtractor {
    fn describe(&self, patch: &GrayImage) -> Option<Vec<f32>>;
}

pub trait PatchClassifier {
    fn classify(&self, descriptor: &[f32]) -> Verdict;
}

/// Bag-of-visual-words descriptor over keypoint descriptors.
pub struct BowExtractor<'a> {
    pub keypoints: KeypointDescriptor,
    pub vocabulary: &'a Vocabulary,
}

impl FeatureExtractor for BowExtractor<'_> {
    fn describe(&self, patch: &GrayImage) -> Option<Vec<f32>> {
        let descriptors = self.keypoints.compute(patch);
        if descriptors.is_empty() {
            return None;
        }
        Some(self.vocabulary.histogram(&descriptors))
    }
}

/// Trained vocabulary plus classifier weights, stored as one opaque file.
#[derive(Debug, Serialize, Deserialize)]
pub struct BoatModel {
    pub vocabulary: Vocabulary,
    pub svm: LinearSvm,
    pub max_keypoints: usize,
}

impl BoatModel {
    pub fn extractor(&self) -> BowExtractor<'_> {
        BowExtractor {
            keypoints: KeypointDescriptor::new(self.max_keypoints),
            vocabulary: &self.vocabulary,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).map_err(|e| DetectorError::Model {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| DetectorError::file_access(path, e))
    }

    pub fn load(path: &Path) -> Result<BoatModel> {
        let text = std::fs::read_to_string(path).map_err(|e| DetectorError::file_access(path, e))?;
        let model: BoatModel = serde_json::from_str(&text).map_err(|e| DetectorError::Model {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if model.vocabulary.is_empty() || model.svm.weights.len() != model.vocabulary.len() {
            return Err(DetectorError::Model {
                path: path.to_path_buf(),
                reason: format!(
                    "{} classifier weights for a {}-word vocabulary",
                    model.svm.weights.len(),
                    model.vocabulary.len()
                ),
            });
        }
        Ok(model)
    }
}
