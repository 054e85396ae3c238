//! Contrast-limited adaptive histogram equalization (CLAHE).

use image::{GrayImage, Luma, imageops};
use imageproc::stats::histogram;

/// Local contrast equalization over a grid of tiles.
///
/// `clip_limit` is relative to a uniform histogram: a bin may hold at most
/// `clip_limit * tile_area / 256` pixels before the excess is spread evenly.
#[derive(Debug, Clone, Copy)]
pub struct Clahe {
    pub clip_limit: f32,
    pub grid_x: u32,
    pub grid_y: u32,
}

impl Default for Clahe {
    fn default() -> Self {
        Self {
            clip_limit: 40.0,
            grid_x: 8,
            grid_y: 8,
        }
    }
}

impl Clahe {
    pub fn apply(&self, img: &GrayImage) -> GrayImage {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return img.clone();
        }

        // Small patches get at most one tile per pixel
        let gx = self.grid_x.clamp(1, width);
        let gy = self.grid_y.clamp(1, height);

        let mut luts = Vec::with_capacity((gx * gy) as usize);
        for ty in 0..gy {
            for tx in 0..gx {
                let (x0, x1) = tile_span(tx, gx, width);
                let (y0, y1) = tile_span(ty, gy, height);
                luts.push(self.tile_lut(img, x0, x1, y0, y1));
            }
        }

        let tile_w = width as f32 / gx as f32;
        let tile_h = height as f32 / gy as f32;

        GrayImage::from_fn(width, height, |x, y| {
            let (tx0, tx1, ax) = neighbours(x, tile_w, gx);
            let (ty0, ty1, ay) = neighbours(y, tile_h, gy);
            let v = img.get_pixel(x, y)[0] as usize;

            let lut = |tx: u32, ty: u32| luts[(ty * gx + tx) as usize][v] as f32;
            let top = lut(tx0, ty0) * (1.0 - ax) + lut(tx1, ty0) * ax;
            let bottom = lut(tx0, ty1) * (1.0 - ax) + lut(tx1, ty1) * ax;
            let value = top * (1.0 - ay) + bottom * ay;

            Luma([value.round().clamp(0.0, 255.0) as u8])
        })
    }

    fn tile_lut(&self, img: &GrayImage, x0: u32, x1: u32, y0: u32, y1: u32) -> [u8; 256] {
        let tile = imageops::crop_imm(img, x0, y0, x1 - x0, y1 - y0).to_image();
        let mut hist = histogram(&tile).channels[0];

        let area = (x1 - x0) * (y1 - y0);
        let limit = ((self.clip_limit * area as f32 / 256.0) as u32).max(1);

        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let share = excess / 256;
        let remainder = (excess % 256) as usize;
        for (i, bin) in hist.iter_mut().enumerate() {
            *bin += share;
            if i < remainder {
                *bin += 1;
            }
        }

        let scale = 255.0 / area as f32;
        let mut lut = [0u8; 256];
        let mut cdf = 0u32;
        for (i, bin) in hist.iter().enumerate() {
            cdf += bin;
            lut[i] = (cdf as f32 * scale).round().min(255.0) as u8;
        }
        lut
    }
}

fn tile_span(index: u32, count: u32, extent: u32) -> (u32, u32) {
    let start = index * extent / count;
    let end = (index + 1) * extent / count;
    (start, end.max(start + 1).min(extent))
}

/// Tiles whose centres bracket `pos`, with the interpolation weight of the second.
fn neighbours(pos: u32, tile_size: f32, count: u32) -> (u32, u32, f32) {
    let f = (pos as f32 + 0.5) / tile_size - 0.5;
    if f <= 0.0 {
        return (0, 0, 0.0);
    }
    let lo = (f.floor() as u32).min(count - 1);
    let hi = (lo + 1).min(count - 1);
    let weight = if hi == lo { 0.0 } else { f - lo as f32 };
    (lo, hi, weight)
}
