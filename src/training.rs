use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use log::{info, warn};
use rayon::prelude::*;

use crate::detection::load_image;
use crate::files::{self, PATCH_PATTERNS};
use crate::models::SkippedItem;
use crate::recognizer::BoatModel;
use crate::recognizer::features::KeypointDescriptor;
use crate::recognizer::svm::{LinearSvm, SvmParams};
use crate::recognizer::vocabulary::{KMeansParams, Vocabulary};

#[derive(Debug, Clone, Copy)]
pub struct TrainingConfig {
    pub vocabulary_size: usize,
    pub kmeans_iterations: usize,
    /// Soft-margin penalty of the SVM.
    pub svm_c: f64,
    pub svm_epochs: usize,
    pub seed: u64,
    pub max_keypoints: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocabulary_size: 300,
            kmeans_iterations: 100,
            svm_c: 10.0,
            svm_epochs: 2,
            seed: 42,
            max_keypoints: 200,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    pub positives: usize,
    pub negatives: usize,
    /// Patches without any keypoint, left out of training.
    pub undescribed: usize,
    pub vocabulary_size: usize,
    pub skipped: Vec<SkippedItem>,
}

pub struct Trainer {
    pub config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Learn a vocabulary and classifier from the patch directories.
    pub fn train(&self, positive_dir: &Path, negative_dir: &Path) -> anyhow::Result<(BoatModel, TrainingSummary)> {
        let positive_files = files::scan_directory(positive_dir, PATCH_PATTERNS)
            .context("Error occurred while loading positive patches")?;
        let negative_files = files::scan_directory(negative_dir, PATCH_PATTERNS)
            .context("Error occurred while loading negative patches")?;
        info!(
            "Found {} positive and {} negative patches",
            positive_files.len(),
            negative_files.len()
        );

        let keypoints = KeypointDescriptor::new(self.config.max_keypoints);
        let mut summary = TrainingSummary::default();

        let positives = describe_patches(&keypoints, &positive_files, &mut summary);
        let negatives = describe_patches(&keypoints, &negative_files, &mut summary);
        if positives.is_empty() || negatives.is_empty() {
            bail!(
                "Need keypoints in both classes ({} positive, {} negative patches usable)",
                positives.len(),
                negatives.len()
            );
        }

        let all_features: Vec<Vec<f32>> = positives
            .iter()
            .chain(&negatives)
            .flat_map(|d| d.iter().cloned())
            .collect();

        info!("Clustering {} keypoint descriptors...", all_features.len());
        let vocabulary = Vocabulary::cluster(
            &all_features,
            KMeansParams {
                clusters: self.config.vocabulary_size,
                max_iterations: self.config.kmeans_iterations,
                seed: self.config.seed,
            },
        )
        .context("Error occurred while building the vocabulary")?;

        let mut samples = Vec::with_capacity(positives.len() + negatives.len());
        let mut labels = Vec::with_capacity(samples.capacity());
        for (descriptors, label) in positives
            .iter()
            .map(|d| (d, true))
            .chain(negatives.iter().map(|d| (d, false)))
        {
            samples.push(vocabulary.histogram(descriptors));
            labels.push(label);
        }

        info!("Training the classifier on {} samples...", samples.len());
        let svm = LinearSvm::train(
            &samples,
            &labels,
            SvmParams {
                c: self.config.svm_c,
                epochs: self.config.svm_epochs,
                seed: self.config.seed,
            },
        )
        .context("Error occurred while training the classifier")?;

        summary.positives = positives.len();
        summary.negatives = negatives.len();
        summary.vocabulary_size = vocabulary.len();

        let model = BoatModel {
            vocabulary,
            svm,
            max_keypoints: self.config.max_keypoints,
        };
        Ok((model, summary))
    }
}

/// Keypoint descriptors for each readable patch that has any.
fn describe_patches(
    keypoints: &KeypointDescriptor,
    paths: &[PathBuf],
    summary: &mut TrainingSummary,
) -> Vec<Vec<Vec<f32>>> {
    let results: Vec<_> = paths
        .par_iter()
        .map(|path| load_image(path).map(|img| keypoints.compute(&img.to_luma8())))
        .collect();

    let mut described = Vec::new();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(descriptors) if descriptors.is_empty() => summary.undescribed += 1,
            Ok(descriptors) => described.push(descriptors),
            Err(e) => {
                warn!("{}", e);
                summary.skipped.push(SkippedItem::new(path, &e));
            }
        }
    }
    described
}
