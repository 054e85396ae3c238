pub mod contours;
pub mod contrast;
pub mod matching;
pub mod overlap;
pub mod patches;
pub mod preprocessing;
pub mod proposals;
pub mod suppression;

use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use anyhow::Context;
use image::DynamicImage;
use log::{debug, info, warn};

use crate::annotations;
use crate::error::DetectorError;
use crate::files::{self, ANNOTATION_PATTERNS, IMAGE_PATTERNS};
use crate::models::{Rectangle, SkippedItem, Verdict};
use crate::recognizer::{FeatureExtractor, PatchClassifier};
use crate::render;
use matching::Evaluation;
use proposals::{DEFAULT_MIN_AREA, DEFAULT_PROPOSAL_CAP, RegionProposer};

/// Per-image detection: propose, filter, crop, classify, suppress.
pub struct DetectionPipeline<'a> {
    proposer: &'a dyn RegionProposer,
    extractor: &'a dyn FeatureExtractor,
    classifier: &'a dyn PatchClassifier,
    pub proposal_cap: usize,
    pub min_area: i64,
    pub nms_threshold: f32,
    /// Font for IoU labels on result images; boxes only when unset.
    pub label_font: Option<&'a FontVec>,
}

/// Intermediate and final boxes for one image.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Proposals that survived the region filter.
    pub proposals: Vec<Rectangle>,
    /// Proposals classified as boats, before suppression.
    pub predictions: Vec<Rectangle>,
    /// Predictions left after suppression.
    pub kept: Vec<Rectangle>,
    /// Patches for which no descriptor could be computed.
    pub undescribed: usize,
}

#[derive(Debug, Clone)]
pub struct ImageReport {
    pub detection: Detection,
    pub evaluation: Evaluation,
}

/// Totals over a directory of test images.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub images_processed: usize,
    pub skipped: Vec<SkippedItem>,
    pub ground_truth: usize,
    pub matched: usize,
    pub undetected: usize,
    pub false_positives: usize,
    pub iou_sum: f32,
}

impl RunSummary {
    pub fn mean_iou(&self) -> Option<f32> {
        (self.matched > 0).then(|| self.iou_sum / self.matched as f32)
    }

    fn record(&mut self, report: &ImageReport) {
        let eval = &report.evaluation;
        self.images_processed += 1;
        self.ground_truth += eval.outcomes.len();
        self.matched += eval.matched_count();
        self.undetected += eval.undetected_count();
        self.false_positives += eval.false_positives.len();
        self.iou_sum += eval.matched_ious().sum::<f32>();
    }
}

impl<'a> DetectionPipeline<'a> {
    pub fn new(
        proposer: &'a dyn RegionProposer,
        extractor: &'a dyn FeatureExtractor,
        classifier: &'a dyn PatchClassifier,
        nms_threshold: f32,
    ) -> Self {
        Self {
            proposer,
            extractor,
            classifier,
            proposal_cap: DEFAULT_PROPOSAL_CAP,
            min_area: DEFAULT_MIN_AREA,
            nms_threshold,
            label_font: None,
        }
    }

    pub fn with_proposal_cap(mut self, proposal_cap: usize) -> Self {
        self.proposal_cap = proposal_cap;
        self
    }

    pub fn with_min_area(mut self, min_area: i64) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_label_font(mut self, font: &'a FontVec) -> Self {
        self.label_font = Some(font);
        self
    }

    /// Run detection on one image.
    pub fn detect(&self, image: &DynamicImage) -> Detection {
        let raw = self.proposer.propose(image);
        let proposals = proposals::filter_regions(&raw, self.proposal_cap, self.min_area);
        debug!("{} of {} proposals pass the region filter", proposals.len(), raw.len());

        if proposals.is_empty() {
            warn!("No proposals survived filtering; image yields no predictions");
            return Detection::default();
        }

        let mut patches = patches::extract_patches(image, &proposals);
        patches::normalize_patches(&mut patches);

        let mut predictions = Vec::new();
        let mut undescribed = 0;
        for patch in &patches {
            // A patch without descriptor casts no vote
            let Some(descriptor) = self.extractor.describe(&patch.gray()) else {
                undescribed += 1;
                continue;
            };
            if self.classifier.classify(&descriptor) == Verdict::Boat {
                predictions.push(proposals[patch.source_index]);
            }
        }
        debug!(
            "{} boat patches, {} without descriptor",
            predictions.len(),
            undescribed
        );

        let kept = suppression::suppress(&predictions, self.nms_threshold);

        Detection {
            proposals,
            predictions,
            kept,
            undescribed,
        }
    }

    /// Detect and evaluate against the image's ground truth.
    pub fn process(&self, image: &DynamicImage, ground_truth: &[Rectangle]) -> ImageReport {
        let detection = self.detect(image);
        let evaluation = matching::evaluate(ground_truth, detection.kept.clone());
        ImageReport {
            detection,
            evaluation,
        }
    }

    /// Process every image in `image_dir` against `<annotation_dir>/<name>.txt`.
    ///
    /// Only unreadable or empty input directories, or an output directory
    /// that cannot be created, fail the run; other problems are recorded
    /// in the summary.
    pub fn run_directory(
        &self,
        image_dir: &Path,
        annotation_dir: &Path,
        output_dir: Option<&Path>,
    ) -> anyhow::Result<RunSummary> {
        let images = files::scan_directory(image_dir, IMAGE_PATTERNS)
            .context("Error occurred while loading test images")?;
        files::scan_directory(annotation_dir, ANNOTATION_PATTERNS)
            .context("Error occurred while loading annotation files for test images")?;
        if let Some(dir) = output_dir {
            files::ensure_dir(dir)?;
        }
        info!("Test images successfully loaded: {}", images.len());

        let mut summary = RunSummary::default();

        for path in &images {
            info!("Processing image {}", path.display());
            let name = files::image_name(path);

            let image = match load_image(path) {
                Ok(image) => image,
                Err(e) => {
                    warn!("{}", e);
                    summary.skipped.push(SkippedItem::new(path, &e));
                    continue;
                }
            };

            let annotation = annotation_dir.join(format!("{}.txt", name));
            let ground_truth = annotations::load_ground_truth(&annotation).unwrap_or_else(|e| {
                warn!("{}; treating image as unannotated", e);
                summary.skipped.push(SkippedItem::new(&annotation, &e));
                Vec::new()
            });

            let report = self.process(&image, &ground_truth);
            for outcome in &report.evaluation.outcomes {
                match outcome.matched {
                    Some((_, iou)) => info!("IoU {:.4} for ground truth {:?}", iou, outcome.ground_truth),
                    None => info!("Ground truth {:?} undetected", outcome.ground_truth),
                }
            }

            if let Some(dir) = output_dir {
                let out = dir.join(format!("{}.png", name));
                if let Err(e) = render::draw_report(&image, &report, self.label_font).save(&out) {
                    warn!("Failed to save {}: {}", out.display(), e);
                    summary.skipped.push(SkippedItem::new(&out, &e));
                }
            }

            summary.record(&report);
        }

        Ok(summary)
    }
}

pub fn load_image(path: &Path) -> Result<DynamicImage, DetectorError> {
    image::ImageReader::open(path)
        .map_err(|e| DetectorError::file_access(path, e))?
        .decode()
        .map_err(|source| DetectorError::ImageDecode {
            path: PathBuf::from(path),
            source,
        })
}
