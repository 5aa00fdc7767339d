use crate::*;
use anyhow::Result;
use ndarray::*;

/// Selects the estimator newly created tracks use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EstimatorKind {
    /// Constant velocity Kalman filter over the box center, area and aspect ratio.
    #[default]
    Kalman,
    /// Normalized cross-correlation of the box appearance. Requires frame images.
    Correlation,
}

/// The per-track motion estimator.
#[derive(Debug, Clone)]
pub enum Estimator {
    Kalman {
        /// Mean vector of the state distribution.
        mean: Array1<f32>,
        /// Covariance matrix of the state distribution.
        covariance: Array2<f32>,
    },
    Correlation(CorrelationTracker),
}

impl Estimator {
    /// Returns a new Estimator of `kind` initialised on `bbox`.
    ///
    /// # Parameters
    ///
    /// * `kind`: The estimator variant.
    /// * `kf`: The Kalman filter.
    /// * `bbox`: The detection the track originates from.
    /// * `image`: The current frame, required by `EstimatorKind::Correlation`.
    pub fn new(
        kind: EstimatorKind,
        kf: &KalmanFilter,
        bbox: &BoundingBox,
        image: Option<ArrayView2<f32>>,
    ) -> std::result::Result<Estimator, TrackerError> {
        match kind {
            EstimatorKind::Kalman => {
                let (mean, covariance) = kf.initiate(bbox);
                Ok(Estimator::Kalman { mean, covariance })
            }
            EstimatorKind::Correlation => {
                let image = image.ok_or(TrackerError::MissingImage)?;
                Ok(Estimator::Correlation(CorrelationTracker::new(image, bbox)))
            }
        }
    }

    /// Returns the kind of this estimator.
    pub fn kind(&self) -> EstimatorKind {
        match self {
            Estimator::Kalman { .. } => EstimatorKind::Kalman,
            Estimator::Correlation(_) => EstimatorKind::Correlation,
        }
    }

    /// Advance the estimate by one frame and return the predicted box.
    ///
    /// The correlation tracker holds its position when no image is given.
    pub fn predict(&mut self, kf: &KalmanFilter, image: Option<ArrayView2<f32>>) -> BoundingBox {
        match self {
            Estimator::Kalman { mean, covariance } => {
                (*mean, *covariance) = kf.predict(mean, covariance);
                BoundingBox::from_z(mean.slice(s![..4]))
            }
            Estimator::Correlation(tracker) => match image {
                Some(image) => tracker.predict(image),
                None => tracker.bbox().clone(),
            },
        }
    }

    /// Correct the estimate toward `bbox`. `None` is the marker for a frame without any detection
    /// and leaves both variants unchanged.
    pub fn update(
        &mut self,
        kf: &KalmanFilter,
        bbox: Option<&BoundingBox>,
        image: Option<ArrayView2<f32>>,
    ) -> Result<()> {
        match (self, bbox) {
            (Estimator::Kalman { mean, covariance }, Some(bbox)) => {
                (*mean, *covariance) = kf.update(mean, covariance, &bbox.to_z())?;
            }
            (Estimator::Correlation(tracker), Some(bbox)) => {
                if let Some(image) = image {
                    tracker.update(image, Some(bbox));
                }
            }
            (_, None) => {}
        }
        Ok(())
    }

    /// Returns the current best estimate of the box.
    pub fn bbox(&self) -> BoundingBox {
        match self {
            Estimator::Kalman { mean, .. } => BoundingBox::from_z(mean.slice(s![..4])),
            Estimator::Correlation(tracker) => tracker.bbox().clone(),
        }
    }
}
