use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::models::Contour;

/// Group the lit pixels of an edge map into 8-connected components.
///
/// Components smaller than `min_pixels` are dropped. The rest come back in
/// label order, which follows the raster position of each component's first pixel.
pub fn find_contours(edges: &GrayImage, min_pixels: u32) -> Vec<Contour> {
    let labels = connected_components(edges, Connectivity::Eight, Luma([0u8]));

    let mut components: BTreeMap<u32, Contour> = BTreeMap::new();
    for (x, y, px) in labels.enumerate_pixels() {
        let label = px[0];
        if label == 0 {
            continue;
        }
        components
            .entry(label)
            .or_insert_with(|| Contour::seed(label, x, y))
            .absorb(x, y);
    }

    components
        .into_values()
        .filter(|c| c.pixel_count >= min_pixels)
        .collect()
}
