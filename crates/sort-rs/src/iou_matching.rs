use crate::*;
use ndarray::*;

/// Compute intersection over union.
///
/// # Parameters
///
/// * `bbox`: A bounding box in format `(top left x, top left y, width, height)`.
/// * `candidates`: A matrix of candidate bounding boxes (one per row) in the same format as `bbox`.
///
/// # Returns
///
/// The intersection over union in [0.0, 1.0] between the `bbox` and each candidate. Boxes without area have no overlap.
pub fn intersection_over_union(bbox: &Array1<f32>, candidates: &Array2<f32>) -> Array1<f32> {
    let bbox_tl = bbox.slice(s![..2]).to_owned();
    let bbox_br = &bbox_tl + &bbox.slice(s![2..4]);
    let candidates_tl = candidates.slice(s![.., 0..2]).to_owned();
    let candidates_br = &candidates_tl + &candidates.slice(s![.., 2..4]);

    let tl = stack!(
        Axis(1),
        candidates_tl.slice(s![.., 0]).mapv(|v| v.max(bbox_tl[0])),
        candidates_tl.slice(s![.., 1]).mapv(|v| v.max(bbox_tl[1]))
    );
    let br = stack!(
        Axis(1),
        candidates_br.slice(s![.., 0]).mapv(|v| v.min(bbox_br[0])),
        candidates_br.slice(s![.., 1]).mapv(|v| v.min(bbox_br[1]))
    );
    let wh = (br - tl).mapv(|v| v.clamp(0.0, f32::MAX));

    let area_intersection = wh.map_axis(Axis(1), |v| v[0] * v[1]);
    let area_bbox = bbox[2] * bbox[3];
    let area_candidates = candidates.map_axis(Axis(1), |v| v[2] * v[3]);

    (&area_intersection / &(area_bbox + &area_candidates - &area_intersection))
        .mapv(|v| if v.is_finite() { v } else { 0.0 })
}

/// Intersection over union between every detection and every predicted track box.
///
/// # Parameters
///
/// * `detections`: The detections of the current frame.
/// * `predictions`: The predicted boxes of the tracks.
///
/// # Returns
///
/// A matrix of shape `(detections.len(), predictions.len())` where entry (i, j) is
/// `iou(detections[i], predictions[j])`.
pub fn intersection_over_union_matrix(
    detections: &[Detection],
    predictions: &[BoundingBox],
) -> Array2<f32> {
    let mut candidates = Array2::<f32>::zeros((predictions.len(), 4));
    candidates
        .outer_iter_mut()
        .zip(predictions)
        .for_each(|(mut row, prediction)| row.assign(&prediction.to_tlwh()));

    let mut ious = Array2::<f32>::zeros((detections.len(), predictions.len()));
    if predictions.is_empty() {
        return ious;
    }

    ious.outer_iter_mut()
        .zip(detections)
        .for_each(|(mut row, detection)| {
            row.assign(&intersection_over_union(
                &detection.bbox().to_tlwh(),
                &candidates,
            ))
        });

    ious
}
