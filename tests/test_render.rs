//! Result image drawing.

mod common;

use std::path::{Path, PathBuf};

use boatdet::DetectorError;
use boatdet::detection::matching::evaluate;
use boatdet::detection::{Detection, ImageReport};
use boatdet::render::{MATCH_COLOR, UNMATCHED_COLOR, draw_report, load_font};
use common::*;
use image::{DynamicImage, RgbImage};

fn font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/DejaVuSansMono.ttf")
}

fn report(ground_truth: &[Rectangle], predictions: Vec<Rectangle>) -> ImageReport {
    ImageReport {
        detection: Detection::default(),
        evaluation: evaluate(ground_truth, predictions),
    }
}

/// Label pixels are green-dominant blends over the black background.
fn green_pixels(canvas: &RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
    ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let p = canvas.get_pixel(x, y);
            p[1] > 60 && p[1] > p[0] && p[1] > p[2]
        })
        .count()
}

#[test]
fn test_boxes_are_coloured_by_outcome() {
    let image = DynamicImage::new_rgb8(100, 100);
    let truth = rect(10, 10, 30, 30);
    let report = report(&[truth], vec![truth, rect(60, 60, 20, 20)]);

    let canvas = draw_report(&image, &report, None);
    assert_eq!(*canvas.get_pixel(10, 10), MATCH_COLOR);
    assert_eq!(*canvas.get_pixel(11, 11), MATCH_COLOR);
    assert_eq!(*canvas.get_pixel(60, 60), UNMATCHED_COLOR);
    assert_eq!(*canvas.get_pixel(61, 61), image::Rgb([0, 0, 0]));
}

#[test]
fn test_iou_label_is_drawn_above_matched_box() -> anyhow::Result<()> {
    let font = load_font(&font_path())?;
    let image = DynamicImage::new_rgb8(100, 100);
    let truth = rect(20, 40, 50, 40);
    let report = report(&[truth], vec![truth, rect(75, 85, 20, 10)]);

    let plain = draw_report(&image, &report, None);
    assert_eq!(green_pixels(&plain, 20..70, 20..40), 0);

    let labelled = draw_report(&image, &report, Some(&font));
    assert!(green_pixels(&labelled, 20..70, 20..40) > 0);
    // False positives carry no label
    assert_eq!(green_pixels(&labelled, 75..100, 70..85), 0);
    Ok(())
}

#[test]
fn test_iou_label_moves_inside_box_at_top_edge() -> anyhow::Result<()> {
    let font = load_font(&font_path())?;
    let image = DynamicImage::new_rgb8(100, 100);
    let truth = rect(10, 4, 60, 40);

    let canvas = draw_report(&image, &report(&[truth], vec![truth]), Some(&font));
    // Interior of the box, clear of its 2px border
    assert!(green_pixels(&canvas, 12..68, 6..22) > 0);
    Ok(())
}

#[test]
fn test_load_font_rejects_unusable_files() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let garbage = dir.path().join("font.ttf");
    std::fs::write(&garbage, b"not a font")?;

    assert!(matches!(load_font(&garbage), Err(DetectorError::Font { .. })));
    assert!(matches!(
        load_font(&dir.path().join("missing.ttf")),
        Err(DetectorError::FileAccess { .. })
    ));
    Ok(())
}
