use crate::detection::overlap::iou;
use crate::models::Rectangle;

/// Best-overlapping prediction for one ground-truth box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    pub iou: f32,
    pub index: usize,
}

/// Find the prediction with the highest IoU against `ground_truth`.
///
/// `None` for an empty prediction list. With a non-empty list the first
/// maximum wins, and a list with no overlap at all reports `iou == 0` at
/// index 0.
pub fn best_match(predictions: &[Rectangle], ground_truth: &Rectangle) -> Option<BestMatch> {
    if predictions.is_empty() {
        return None;
    }

    let mut best = BestMatch { iou: 0.0, index: 0 };
    for (i, prediction) in predictions.iter().enumerate() {
        let value = iou(ground_truth, prediction);
        if value > best.iou {
            best = BestMatch { iou: value, index: i };
        }
    }
    Some(best)
}

/// Outcome for a single ground-truth box.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruthOutcome {
    pub ground_truth: Rectangle,
    /// The prediction consumed by this box and its IoU; `None` if undetected.
    pub matched: Option<(Rectangle, f32)>,
}

/// Pairing of an image's ground truth against its final predictions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub outcomes: Vec<GroundTruthOutcome>,
    /// Predictions never consumed by a ground-truth box.
    pub false_positives: Vec<Rectangle>,
}

impl Evaluation {
    pub fn matched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.matched.is_some()).count()
    }

    pub fn undetected_count(&self) -> usize {
        self.outcomes.len() - self.matched_count()
    }

    pub fn matched_ious(&self) -> impl Iterator<Item = f32> + '_ {
        self.outcomes.iter().filter_map(|o| o.matched.map(|(_, v)| v))
    }
}

/// Match every ground-truth box, in order, to its best remaining prediction.
/// A consumed prediction cannot match a second box.
pub fn evaluate(ground_truth: &[Rectangle], predictions: Vec<Rectangle>) -> Evaluation {
    let mut pool = predictions;
    let mut outcomes = Vec::with_capacity(ground_truth.len());

    for gt in ground_truth {
        let matched = match best_match(&pool, gt) {
            Some(best) if best.iou > 0.0 => Some((pool.remove(best.index), best.iou)),
            _ => None,
        };
        outcomes.push(GroundTruthOutcome {
            ground_truth: *gt,
            matched,
        });
    }

    Evaluation {
        outcomes,
        false_positives: pool,
    }
}
