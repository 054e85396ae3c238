//! Greedy non-maximum suppression for unscored candidates.
//!
//! Without classifier scores, salience is the y-coordinate of each box's
//! bottom-right corner: the box reaching lowest in the image is picked
//! first. Among equal bottoms the most recently inserted candidate wins.

use log::debug;

use crate::detection::overlap::iou;
use crate::models::Rectangle;

/// Reduce `candidates` to a set whose pairwise IoU does not exceed
/// `threshold`. Kept boxes are returned in pick order (largest bottom first).
///
/// Suppression requires `iou > threshold`; a pair at exactly the threshold
/// survives, so a threshold of `1.0` keeps every candidate.
pub fn suppress(candidates: &[Rectangle], threshold: f32) -> Vec<Rectangle> {
    if candidates.is_empty() {
        return Vec::new();
    }

    // Ascending by bottom; sort_by_key is stable so ties stay in insertion order
    let mut order: Vec<(i64, usize)> = candidates
        .iter()
        .enumerate()
        .map(|(i, rect)| (rect.bottom(), i))
        .collect();
    order.sort_by_key(|&(bottom, _)| bottom);

    let mut kept = Vec::new();
    while let Some((_, pick)) = order.pop() {
        let keep = candidates[pick];
        order.retain(|&(_, other)| iou(&keep, &candidates[other]) <= threshold);
        kept.push(keep);
    }

    debug!("NMS kept {} of {} candidates", kept.len(), candidates.len());
    kept
}
