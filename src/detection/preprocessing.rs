use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;

use crate::detection::contrast::Clahe;

/// Canny edges of `gray` after smoothing at scale `sigma`.
pub fn edge_map(gray: &GrayImage, sigma: f32, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let smoothed = gaussian_blur_f32(gray, sigma);
    canny(&smoothed, low_threshold, high_threshold)
}

/// Thicken edges by `radius` pixels so nearby fragments join into one component.
pub fn close_gaps(edges: &GrayImage, radius: u8) -> GrayImage {
    match radius {
        0 => edges.clone(),
        r => dilate(edges, Norm::LInf, r),
    }
}

/// Luma conversion followed by CLAHE. Every stored or classified patch goes through this.
pub fn normalize(img: &DynamicImage) -> GrayImage {
    Clahe::default().apply(&img.to_luma8())
}
