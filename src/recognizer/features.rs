//! Keypoint detection and local gradient descriptors.

use image::GrayImage;
use imageproc::corners::corners_fast9;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

pub const DESCRIPTOR_LEN: usize = 128;

const WINDOW: i64 = 16;
const CELL: i64 = 4;
const BINS: usize = 8;

/// FAST-9 corners described by 4x4 cells of 8-bin gradient orientation
/// histograms over a 16x16 window.
#[derive(Debug, Clone)]
pub struct KeypointDescriptor {
    pub fast_threshold: u8,
    pub max_keypoints: usize,
}

impl Default for KeypointDescriptor {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_keypoints: 200,
        }
    }
}

impl KeypointDescriptor {
    pub fn new(max_keypoints: usize) -> Self {
        Self {
            max_keypoints,
            ..Default::default()
        }
    }

    /// One descriptor per retained keypoint. Empty when the patch has no
    /// keypoint far enough from the border.
    pub fn compute(&self, patch: &GrayImage) -> Vec<Vec<f32>> {
        let (width, height) = patch.dimensions();
        let half = WINDOW / 2;
        if (width as i64) < WINDOW || (height as i64) < WINDOW {
            return Vec::new();
        }

        let mut corners: Vec<_> = corners_fast9(patch, self.fast_threshold)
            .into_iter()
            .filter(|c| {
                let (x, y) = (c.x as i64, c.y as i64);
                x >= half && y >= half && x + half <= width as i64 && y + half <= height as i64
            })
            .collect();
        corners.sort_by(|a, b| b.score.total_cmp(&a.score));
        corners.truncate(self.max_keypoints);

        if corners.is_empty() {
            return Vec::new();
        }

        let gx = horizontal_sobel(patch);
        let gy = vertical_sobel(patch);

        corners
            .iter()
            .map(|c| {
                let mut desc = vec![0f32; DESCRIPTOR_LEN];
                let (ox, oy) = (c.x as i64 - half, c.y as i64 - half);

                for dy in 0..WINDOW {
                    for dx in 0..WINDOW {
                        let (px, py) = ((ox + dx) as u32, (oy + dy) as u32);
                        let gxv = gx.get_pixel(px, py)[0] as f32;
                        let gyv = gy.get_pixel(px, py)[0] as f32;
                        let magnitude = (gxv * gxv + gyv * gyv).sqrt();
                        if magnitude == 0.0 {
                            continue;
                        }

                        let angle = gyv.atan2(gxv).rem_euclid(std::f32::consts::TAU);
                        let bin = ((angle / std::f32::consts::TAU * BINS as f32) as usize).min(BINS - 1);
                        let cell = ((dy / CELL) * (WINDOW / CELL) + dx / CELL) as usize;
                        desc[cell * BINS + bin] += magnitude;
                    }
                }

                normalize_descriptor(&mut desc);
                desc
            })
            .collect()
    }
}

/// L2-normalize, clip large components at 0.2 and normalize again.
fn normalize_descriptor(desc: &mut [f32]) {
    l2_normalize(desc);
    for v in desc.iter_mut() {
        *v = v.min(0.2);
    }
    l2_normalize(desc);
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
