//! Patch dataset construction.
//!
//! Positives are the ground-truth boxes of every annotated image. Negatives
//! are mined from proposals of every `negative_stride`-th image: a proposal
//! qualifies only if it has zero overlap with all of that image's ground
//! truth, and at most `negatives_per_image` are taken.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::DynamicImage;
use log::{info, warn};

use crate::annotations;
use crate::detection::overlap::overlaps_none;
use crate::detection::patches;
use crate::detection::proposals::{
    self, DEFAULT_MIN_AREA, DEFAULT_PROPOSAL_CAP, RegionProposer,
};
use crate::detection::load_image;
use crate::error::DetectorError;
use crate::files::{self, ANNOTATION_PATTERNS};
use crate::models::{Patch, Rectangle, SkippedItem};

pub const POSITIVE_DIR: &str = "BOATS";
pub const NEGATIVE_DIR: &str = "NONBOATS";

/// Sampling knobs. Changing them changes the dataset that gets built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetPolicy {
    pub negative_stride: usize,
    pub negatives_per_image: usize,
    pub proposal_cap: usize,
    pub min_area: i64,
}

impl Default for DatasetPolicy {
    fn default() -> Self {
        Self {
            negative_stride: 2,
            negatives_per_image: 4,
            proposal_cap: DEFAULT_PROPOSAL_CAP,
            min_area: DEFAULT_MIN_AREA,
        }
    }
}

/// Where positive and negative patches are written.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    pub positives: PathBuf,
    pub negatives: PathBuf,
}

impl DatasetLayout {
    pub fn under(root: &Path) -> Self {
        Self {
            positives: root.join(POSITIVE_DIR),
            negatives: root.join(NEGATIVE_DIR),
        }
    }

    pub fn create(&self) -> crate::error::Result<()> {
        files::ensure_dir(&self.positives)?;
        files::ensure_dir(&self.negatives)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub images_processed: usize,
    pub positives: usize,
    pub negatives: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Walk `proposals` in order and accept those overlapping no ground-truth box,
/// stopping after `cap` acceptances.
pub fn mine_negatives(proposals: &[Rectangle], ground_truth: &[Rectangle], cap: usize) -> Vec<Rectangle> {
    proposals
        .iter()
        .filter(|p| overlaps_none(p, ground_truth))
        .take(cap)
        .copied()
        .collect()
}

pub struct DatasetBuilder<'a> {
    proposer: &'a dyn RegionProposer,
    pub policy: DatasetPolicy,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(proposer: &'a dyn RegionProposer) -> Self {
        Self {
            proposer,
            policy: DatasetPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DatasetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Normalized crops of every ground-truth box.
    pub fn positive_patches(&self, image: &DynamicImage, ground_truth: &[Rectangle]) -> Vec<Patch> {
        let mut patches = patches::extract_patches(image, ground_truth);
        patches::normalize_patches(&mut patches);
        patches
    }

    /// Normalized crops of the negatives mined from this image's proposals.
    pub fn negative_patches(&self, image: &DynamicImage, ground_truth: &[Rectangle]) -> Vec<Patch> {
        let raw = self.proposer.propose(image);
        let filtered = proposals::filter_regions(&raw, self.policy.proposal_cap, self.policy.min_area);
        let negatives = mine_negatives(&filtered, ground_truth, self.policy.negatives_per_image);

        let mut patches = patches::extract_patches(image, &negatives);
        patches::normalize_patches(&mut patches);
        patches
    }

    /// Build the dataset from `<annotation_dir>/*.txt` and the images of the
    /// same name in `image_dir`.
    pub fn build(
        &self,
        image_dir: &Path,
        annotation_dir: &Path,
        layout: &DatasetLayout,
    ) -> anyhow::Result<BuildSummary> {
        let annotation_files = files::scan_directory(annotation_dir, ANNOTATION_PATTERNS)
            .context("Error occurred while loading annotation files")?;
        std::fs::read_dir(image_dir)
            .map_err(|e| DetectorError::file_access(image_dir, e))
            .context("Error occurred while opening the image directory")?;
        layout.create().context("Cannot create the patch directories")?;

        let stride = self.policy.negative_stride.max(1);
        let mut summary = BuildSummary::default();

        for (i, annotation) in annotation_files.iter().enumerate() {
            info!("Processing {} ...", annotation.display());
            let name = files::image_name(annotation);

            let ground_truth = match annotations::load_ground_truth(annotation) {
                Ok(gt) => gt,
                Err(e) => {
                    warn!("{}", e);
                    summary.skipped.push(SkippedItem::new(annotation, &e));
                    continue;
                }
            };

            let Some(image_path) = files::find_image(image_dir, &name) else {
                let missing = image_dir.join(format!("{}.png", name));
                warn!("No image found for {}", annotation.display());
                summary
                    .skipped
                    .push(SkippedItem::new(&missing, &"no matching image"));
                continue;
            };

            let image = match load_image(&image_path) {
                Ok(image) => image,
                Err(e) => {
                    warn!("{}", e);
                    summary.skipped.push(SkippedItem::new(&image_path, &e));
                    continue;
                }
            };

            let positives = self.positive_patches(&image, &ground_truth);
            let written = match patches::save_patches(&positives, &name, &layout.positives) {
                Ok(written) => written,
                Err(e) => {
                    warn!("{}", e);
                    summary.skipped.push(SkippedItem::new(&image_path, &e));
                    continue;
                }
            };

            let mut negatives_written = 0;
            if i % stride == 0 {
                let negatives = self.negative_patches(&image, &ground_truth);
                if negatives.is_empty() {
                    info!("No zero-overlap proposal found for {}", name);
                }
                match patches::save_patches(&negatives, &name, &layout.negatives) {
                    Ok(saved) => negatives_written = saved.len(),
                    Err(e) => {
                        // The image contributes nothing unless both sets were written
                        warn!("{}; discarding its positive patches", e);
                        remove_files(&written);
                        summary.skipped.push(SkippedItem::new(&image_path, &e));
                        continue;
                    }
                }
            }

            summary.positives += written.len();
            summary.negatives += negatives_written;
            summary.images_processed += 1;
        }

        Ok(summary)
    }
}

fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
