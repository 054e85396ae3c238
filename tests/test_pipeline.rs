//! Per-image detection and directory runs with stub collaborators.

mod common;

use boatdet::DetectionPipeline;
use common::*;

fn ground_truth() -> Vec<Rectangle> {
    vec![rect(10, 10, 40, 30), rect(70, 50, 40, 40)]
}

fn proposals() -> Vec<Rectangle> {
    vec![
        rect(10, 10, 40, 30), // 1200
        rect(12, 12, 40, 30), // near duplicate of the first
        rect(70, 50, 40, 40), // 1600
        rect(0, 60, 40, 35),  // 1400, background
        rect(0, 0, 5, 5),     // filtered out
    ]
}

#[test]
fn test_detect_filters_classifies_and_suppresses() {
    let image = scene_with_boxes(120, 100, &ground_truth());
    let proposer = FixedProposer(proposals());
    let extractor = PatchSize { min_side: 1 };
    let classifier = Always(Verdict::Boat);
    let pipeline = DetectionPipeline::new(&proposer, &extractor, &classifier, 0.3);

    let detection = pipeline.detect(&image);
    assert_eq!(detection.proposals, proposals()[..4].to_vec());
    assert_eq!(detection.predictions.len(), 4);
    assert_eq!(detection.undescribed, 0);
    assert_eq!(
        detection.kept,
        vec![rect(0, 60, 40, 35), rect(70, 50, 40, 40), rect(12, 12, 40, 30)]
    );
}

#[test]
fn test_process_evaluates_against_ground_truth() {
    let image = scene_with_boxes(120, 100, &ground_truth());
    let proposer = FixedProposer(proposals());
    let extractor = PatchSize { min_side: 1 };
    let classifier = Always(Verdict::Boat);
    let pipeline = DetectionPipeline::new(&proposer, &extractor, &classifier, 0.3);

    let report = pipeline.process(&image, &ground_truth());
    let eval = &report.evaluation;
    assert_eq!(eval.matched_count(), 2);
    assert_eq!(eval.outcomes[1].matched, Some((rect(70, 50, 40, 40), 1.0)));
    assert_eq!(eval.false_positives, vec![rect(0, 60, 40, 35)]);
}

#[test]
fn test_patches_without_descriptor_do_not_vote() {
    let image = scene_with_boxes(120, 100, &ground_truth());
    let proposer = FixedProposer(proposals());
    let extractor = PatchSize { min_side: 36 };
    let classifier = Always(Verdict::Boat);
    let pipeline = DetectionPipeline::new(&proposer, &extractor, &classifier, 0.3);

    let detection = pipeline.detect(&image);
    assert_eq!(detection.undescribed, 3);
    assert_eq!(detection.predictions, vec![rect(70, 50, 40, 40)]);
}

#[test]
fn test_classifier_verdicts_select_predictions() {
    let image = scene_with_boxes(120, 100, &ground_truth());
    let proposer = FixedProposer(proposals());
    let extractor = PatchSize { min_side: 1 };
    let classifier = TallerThan(36.0);
    let pipeline = DetectionPipeline::new(&proposer, &extractor, &classifier, 0.3);

    let detection = pipeline.detect(&image);
    assert_eq!(detection.predictions, vec![rect(70, 50, 40, 40)]);
}

#[test]
fn test_no_surviving_proposals_leaves_ground_truth_undetected() {
    let image = scene_with_boxes(120, 100, &ground_truth());
    let proposer = FixedProposer(vec![rect(0, 0, 5, 5)]);
    let extractor = PatchSize { min_side: 1 };
    let classifier = Always(Verdict::Boat);
    let pipeline = DetectionPipeline::new(&proposer, &extractor, &classifier, 0.3);

    let report = pipeline.process(&image, &ground_truth());
    assert!(report.detection.proposals.is_empty());
    assert_eq!(report.evaluation.undetected_count(), 2);
    assert!(report.evaluation.false_positives.is_empty());
}

#[test]
fn test_proposal_cap_and_min_area_are_configurable() {
    let image = scene_with_boxes(120, 100, &ground_truth());
    let proposer = FixedProposer(proposals());
    let extractor = PatchSize { min_side: 1 };
    let classifier = Always(Verdict::Boat);
    let pipeline = DetectionPipeline::new(&proposer, &extractor, &classifier, 1.0)
        .with_proposal_cap(2)
        .with_min_area(10);

    let detection = pipeline.detect(&image);
    assert_eq!(detection.proposals, proposals()[..2].to_vec());
    assert_eq!(detection.kept.len(), 2);
}

#[test]
fn test_run_directory_isolates_failures() -> anyhow::Result<()> {
    let images = tempfile::TempDir::new()?;
    let annotations = tempfile::TempDir::new()?;
    let rendered = tempfile::TempDir::new()?;
    let out_dir = rendered.path().join("results");

    let scene = scene_with_boxes(120, 100, &ground_truth());
    save_image(images.path(), "image0001.png", &scene);
    save_image(images.path(), "image0002.png", &scene);
    std::fs::write(images.path().join("broken.png"), b"not a png")?;
    save_annotation(annotations.path(), "image0001.txt", "boat:10;50;10;40\nboat:70;110;50;90\n");

    let proposer = FixedProposer(proposals());
    let extractor = PatchSize { min_side: 1 };
    let classifier = Always(Verdict::Boat);
    let pipeline = DetectionPipeline::new(&proposer, &extractor, &classifier, 0.3);

    let summary = pipeline.run_directory(images.path(), annotations.path(), Some(&out_dir))?;

    assert_eq!(summary.images_processed, 2);
    // The undecodable image and the missing annotation for image0002
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(summary.ground_truth, 2);
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.undetected, 0);
    // One stray box in image0001, three unmatched boxes in image0002
    assert_eq!(summary.false_positives, 4);
    assert!(summary.mean_iou().is_some());

    assert!(out_dir.join("image0001.png").is_file());
    assert!(out_dir.join("image0002.png").is_file());
    Ok(())
}

#[test]
fn test_run_directory_fails_on_missing_input() {
    let proposer = FixedProposer(Vec::new());
    let extractor = PatchSize { min_side: 1 };
    let classifier = Always(Verdict::Boat);
    let pipeline = DetectionPipeline::new(&proposer, &extractor, &classifier, 0.3);

    let missing = std::path::Path::new("/no/such/test/images");
    assert!(pipeline.run_directory(missing, missing, None).is_err());
}
