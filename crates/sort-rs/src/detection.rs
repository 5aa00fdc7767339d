use crate::{BoundingBox, TrackerError};
use ndarray::*;

/// Detection represents a bounding box detection in a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in left, top, width, height format.
    bbox: BoundingBox,
    /// Detection confidence score.
    confidence: f32,
}

impl Detection {
    /// Returns a new Detection
    ///
    /// # Parameters
    ///
    /// * `bbox`: A bounding box object.
    /// * `confidence`: Detection confidence score.
    pub fn new(bbox: BoundingBox, confidence: f32) -> Detection {
        Detection { bbox, confidence }
    }

    /// Returns a Detection from a `(x, y, w, h, score)` row.
    pub fn from_row(row: ArrayView1<f32>) -> Result<Detection, TrackerError> {
        if row.len() != 5 {
            return Err(TrackerError::DetectionShape(row.len()));
        }

        Ok(Detection::new(
            BoundingBox::new(row[0], row[1], row[2], row[3]),
            row[4],
        ))
    }

    /// Returns a BoundingBox of the detection co-ordinates
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Returns the confidence of the detection
    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}
