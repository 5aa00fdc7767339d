use crate::*;
use anyhow::Result;
use fixedbitset::FixedBitSet;
use ndarray::*;
use pathfinding::kuhn_munkres::kuhn_munkres;
use pathfinding::matrix::Matrix;

/// Scale applied to overlaps before solving, as the solver requires `std::cmp::Ord` weights.
const WEIGHT_SCALE: f32 = 1_000_000.0;

/// The result of associating the detections of a frame with the predicted tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Association {
    /// Matched `(detection index, track index)` pairs, ordered by detection index.
    pub matches: Vec<(usize, usize)>,
    /// Indices of detections without a track.
    pub unmatched_detections: Vec<usize>,
    /// Indices of tracks without a detection.
    pub unmatched_tracks: Vec<usize>,
}

/// Matches the detections of a frame against the predicted track boxes.
///
/// Every detection index and every track index must appear exactly once across the three parts of
/// the returned Association.
pub trait Associator {
    /// Match `detections` against the `predictions` of the live tracks.
    ///
    /// # Parameters
    ///
    /// * `detections`: The detections of the current frame.
    /// * `predictions`: The predicted box of every track, indexed like the tracks.
    fn associate(
        &self,
        detections: &[Detection],
        predictions: &[BoundingBox],
    ) -> Result<Association>;
}

/// Associates by maximum total intersection over union, rejecting pairs below `iou_threshold`.
#[derive(Debug, Clone)]
pub struct IouAssociator {
    /// Minimum overlap of a valid match.
    iou_threshold: f32,
}

impl Default for IouAssociator {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl IouAssociator {
    /// Returns a new IouAssociator
    ///
    /// # Parameters
    ///
    /// * `iou_threshold`: Minimum overlap of a valid match.
    pub fn new(iou_threshold: f32) -> IouAssociator {
        IouAssociator { iou_threshold }
    }
}

impl Associator for IouAssociator {
    fn associate(
        &self,
        detections: &[Detection],
        predictions: &[BoundingBox],
    ) -> Result<Association> {
        let ious = iou_matching::intersection_over_union_matrix(detections, predictions);
        Ok(max_overlap_matching(ious.view(), self.iou_threshold))
    }
}

/// Solve linear assignment problem.
///
/// # Parameters
///
/// * `overlap`: A matrix of shape `(detections, tracks)` where entry (i, j) is the overlap of detection i and track j.
/// * `min_overlap`: Gating threshold. Assigned pairs with an overlap below this value are split into their unmatched sets.
///
/// # Returns
///
/// The Association which maximises the total overlap.
pub fn max_overlap_matching(overlap: ArrayView2<f32>, min_overlap: f32) -> Association {
    let (num_detections, num_tracks) = overlap.dim();
    if num_detections == 0 || num_tracks == 0 {
        return Association {
            matches: vec![],
            unmatched_detections: (0..num_detections).collect(),
            unmatched_tracks: (0..num_tracks).collect(),
        };
    }

    // kuhn munkres requires no more rows than columns
    let (weights, transposed) = if num_detections > num_tracks {
        (overlap.t(), true)
    } else {
        (overlap.view(), false)
    };

    let mut matrix = Matrix::new(weights.nrows(), weights.ncols(), 0i64);
    weights.indexed_iter().for_each(|((row, col), value)| {
        if value.is_finite() {
            matrix[(row, col)] = (value * WEIGHT_SCALE) as i64;
        }
    });

    // invoke the kuhn munkres max (aka hungarian) assignment algorithm
    // it returns the assigned column of every row
    let (_, col_indices) = kuhn_munkres(&matrix);

    let mut matches: Vec<(usize, usize)> = Vec::with_capacity(col_indices.len());
    let mut matched_detections = FixedBitSet::with_capacity(num_detections);
    let mut matched_tracks = FixedBitSet::with_capacity(num_tracks);

    col_indices
        .into_iter()
        .enumerate()
        .for_each(|(row, col)| {
            let (detection_idx, track_idx) = if transposed { (col, row) } else { (row, col) };
            let value = overlap[[detection_idx, track_idx]];
            if value.is_nan() || value < min_overlap {
                return;
            }

            matches.push((detection_idx, track_idx));
            matched_detections.insert(detection_idx);
            matched_tracks.insert(track_idx);
        });
    matches.sort_unstable();

    Association {
        matches,
        unmatched_detections: (0..num_detections)
            .filter(|idx| !matched_detections.contains(*idx))
            .collect(),
        unmatched_tracks: (0..num_tracks)
            .filter(|idx| !matched_tracks.contains(*idx))
            .collect(),
    }
}
