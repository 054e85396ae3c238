use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use log::{debug, warn};

use crate::detection::preprocessing;
use crate::error::{DetectorError, Result};
use crate::models::{Patch, Rectangle};

/// Crop every rectangle out of `image`, clamped to the frame.
/// Rectangles lying entirely outside the frame produce no patch.
pub fn extract_patches(image: &DynamicImage, rects: &[Rectangle]) -> Vec<Patch> {
    let (width, height) = image.dimensions();

    rects
        .iter()
        .enumerate()
        .filter_map(|(i, rect)| match rect.clamp_to(width, height) {
            Some((x, y, w, h)) => Some(Patch {
                source_index: i,
                image: image.crop_imm(x, y, w, h),
            }),
            None => {
                warn!("Region {:?} lies outside the {}x{} image", rect, width, height);
                None
            }
        })
        .collect()
}

/// Grayscale and contrast-equalize each patch in place.
pub fn normalize_patches(patches: &mut [Patch]) {
    for patch in patches.iter_mut() {
        patch.image = DynamicImage::ImageLuma8(preprocessing::normalize(&patch.image));
    }
}

/// Write patches as `<image_name>_<i>.png` into `dir`.
///
/// Either every patch is written or, on the first failure, the files already
/// written for this image are removed and the error is returned.
pub fn save_patches(patches: &[Patch], image_name: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(patches.len());

    for (i, patch) in patches.iter().enumerate() {
        let path = dir.join(format!("{}_{}.png", image_name, i));
        if let Err(source) = patch.image.save(&path) {
            for done in &written {
                let _ = std::fs::remove_file(done);
            }
            let _ = std::fs::remove_file(&path);
            return Err(DetectorError::PatchWrite { path, source });
        }
        written.push(path);
    }

    debug!("Saved {} patches for {}", written.len(), image_name);
    Ok(written)
}
