use boatdet::detection::proposals::RegionProposer;
use boatdet::{FeatureExtractor, PatchClassifier, Rectangle, Verdict};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};
use std::path::Path;

/// Creates a dark RGB image with bright filled rectangles drawn on it.
pub fn scene_with_boxes(width: u32, height: u32, boxes: &[Rectangle]) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let inside = boxes.iter().any(|b| {
            (x as i64) >= b.x as i64 && (x as i64) < b.right() && (y as i64) >= b.y as i64 && (y as i64) < b.bottom()
        });
        if inside {
            Rgb([230u8, 230u8, 230u8])
        } else {
            Rgb([20u8, 40u8, 60u8])
        }
    });
    DynamicImage::ImageRgb8(img)
}

/// Creates a dark grayscale image with a grid of bright square dots, rich in corners.
pub fn dotted(size: u32, spacing: u32, dot: u32) -> GrayImage {
    let offset = (spacing - dot) / 2;
    ImageBuffer::from_fn(size, size, |x, y| {
        let on = (x % spacing) >= offset && (x % spacing) < offset + dot
            && (y % spacing) >= offset && (y % spacing) < offset + dot;
        if on { Luma([220u8]) } else { Luma([30u8]) }
    })
}

/// Creates a flat grayscale image with no structure at all.
pub fn flat(size: u32, value: u8) -> GrayImage {
    ImageBuffer::from_pixel(size, size, Luma([value]))
}

/// Writes an image into `dir` under `name`.
pub fn save_image(dir: &Path, name: &str, img: &DynamicImage) {
    img.save(dir.join(name)).expect("Failed to save test image");
}

/// Writes an annotation file into `dir` under `name`.
pub fn save_annotation(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).expect("Failed to write annotation");
}

/// Proposer that returns the same rectangles for every image.
pub struct FixedProposer(pub Vec<Rectangle>);

impl RegionProposer for FixedProposer {
    fn propose(&self, _image: &DynamicImage) -> Vec<Rectangle> {
        self.0.clone()
    }
}

/// Describes a patch by its size; patches with a side below `min_side` have no descriptor.
pub struct PatchSize {
    pub min_side: u32,
}

impl FeatureExtractor for PatchSize {
    fn describe(&self, patch: &GrayImage) -> Option<Vec<f32>> {
        let (w, h) = patch.dimensions();
        (w.min(h) >= self.min_side).then(|| vec![w as f32, h as f32])
    }
}

/// Classifies every patch the same way.
pub struct Always(pub Verdict);

impl PatchClassifier for Always {
    fn classify(&self, _descriptor: &[f32]) -> Verdict {
        self.0
    }
}

/// Boat when the described patch is taller than the threshold.
pub struct TallerThan(pub f32);

impl PatchClassifier for TallerThan {
    fn classify(&self, descriptor: &[f32]) -> Verdict {
        if descriptor[1] > self.0 {
            Verdict::Boat
        } else {
            Verdict::NotBoat
        }
    }
}

pub fn rect(x: i32, y: i32, width: i32, height: i32) -> Rectangle {
    Rectangle::new(x, y, width, height)
}
