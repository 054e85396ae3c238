use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::detection::ImageReport;
use crate::error::{DetectorError, Result};
use crate::models::Rectangle;

pub const MATCH_COLOR: Rgb<u8> = Rgb([50, 205, 50]);
pub const UNMATCHED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Height in pixels of the IoU labels.
pub const LABEL_SCALE: f32 = 14.0;

/// Load a TrueType/OpenType font for the IoU labels.
pub fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path).map_err(|e| DetectorError::file_access(path, e))?;
    FontVec::try_from_vec(bytes).map_err(|e| DetectorError::Font {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Draw best matches in green (2px) and every other kept prediction in red (1px).
///
/// With a font, each matched box also gets its IoU written above it, or just
/// inside its top edge when there is no room above.
pub fn draw_report(image: &DynamicImage, report: &ImageReport, font: Option<&FontVec>) -> RgbImage {
    let mut canvas = image.to_rgb8();

    for outcome in &report.evaluation.outcomes {
        if let Some((rect, iou)) = outcome.matched {
            draw_box(&mut canvas, &rect, MATCH_COLOR, 2);
            if let Some(font) = font {
                draw_label(&mut canvas, &rect, &format!("{:.2}", iou), font);
            }
        }
    }
    for rect in &report.evaluation.false_positives {
        draw_box(&mut canvas, rect, UNMATCHED_COLOR, 1);
    }

    canvas
}

fn draw_label(canvas: &mut RgbImage, rect: &Rectangle, text: &str, font: &FontVec) {
    let above = rect.y - LABEL_SCALE as i32;
    let y = if above >= 0 { above } else { rect.y + 2 };
    draw_text_mut(canvas, MATCH_COLOR, rect.x, y, PxScale::from(LABEL_SCALE), font, text);
}

fn draw_box(canvas: &mut RgbImage, rect: &Rectangle, color: Rgb<u8>, thickness: i32) {
    for t in 0..thickness {
        let (w, h) = (rect.width - 2 * t, rect.height - 2 * t);
        if w <= 0 || h <= 0 {
            break;
        }
        draw_hollow_rect_mut(
            canvas,
            Rect::at(rect.x + t, rect.y + t).of_size(w as u32, h as u32),
            color,
        );
    }
}
