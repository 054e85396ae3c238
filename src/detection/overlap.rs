use crate::models::Rectangle;

/// Intersection over union of two rectangles, in `[0, 1]`.
///
/// Zero when the rectangles do not overlap or when both are empty.
pub fn iou(a: &Rectangle, b: &Rectangle) -> f32 {
    let intersection = a.intersection(b).map(|r| r.area()).unwrap_or(0);
    let union = a.area() + b.area() - intersection;

    if union <= 0 {
        return 0.0;
    }
    (intersection as f64 / union as f64) as f32
}

/// True when `a` shares no area with any rectangle in `others`.
pub fn overlaps_none(a: &Rectangle, others: &[Rectangle]) -> bool {
    others.iter().all(|b| iou(a, b) == 0.0)
}
