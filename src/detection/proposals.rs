use std::collections::HashSet;

use image::DynamicImage;
use log::debug;

use crate::detection::{contours, preprocessing};
use crate::models::Rectangle;

/// Regions must be strictly larger than this to be examined.
pub const DEFAULT_MIN_AREA: i64 = 1000;

/// Upper bound on the regions examined per image.
pub const DEFAULT_PROPOSAL_CAP: usize = 2000;

/// Source of candidate rectangles for an image. Results are unordered and
/// carry no score.
pub trait RegionProposer {
    fn propose(&self, image: &DynamicImage) -> Vec<Rectangle>;
}

/// Keep, in input order, the first `max_count` regions whose area exceeds
/// `min_area`. Regions that fail the area test do not use up the quota.
pub fn filter_regions(regions: &[Rectangle], max_count: usize, min_area: i64) -> Vec<Rectangle> {
    regions
        .iter()
        .filter(|r| r.area() > min_area)
        .take(max_count)
        .copied()
        .collect()
}

/// Multi-scale edge grouping: blur, Canny, optional dilation, then the
/// bounding box of every connected edge component.
#[derive(Debug, Clone)]
pub struct EdgeRegionProposer {
    pub sigmas: Vec<f32>,
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub dilation_radii: Vec<u8>,
    pub min_pixels: u32,
}

impl Default for EdgeRegionProposer {
    fn default() -> Self {
        Self {
            sigmas: vec![1.0, 2.0, 4.0],
            low_threshold: 50.0,
            high_threshold: 100.0,
            dilation_radii: vec![0, 2, 4],
            min_pixels: 10,
        }
    }
}

impl RegionProposer for EdgeRegionProposer {
    fn propose(&self, image: &DynamicImage) -> Vec<Rectangle> {
        let gray = image.to_luma8();
        let mut seen = HashSet::new();
        let mut proposals = Vec::new();

        for &sigma in &self.sigmas {
            let edges = preprocessing::edge_map(&gray, sigma, self.low_threshold, self.high_threshold);

            for &radius in &self.dilation_radii {
                let joined = preprocessing::close_gaps(&edges, radius);
                for contour in contours::find_contours(&joined, self.min_pixels) {
                    let rect = contour.bounding_rect();
                    if seen.insert(rect) {
                        proposals.push(rect);
                    }
                }
            }
        }

        debug!("Edge grouping proposed {} regions", proposals.len());
        proposals
    }
}
