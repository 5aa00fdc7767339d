//! SORT (Simple Online and Realtime Tracking) multi-object tracking.
//!
//! Each frame the [`Tracker`] predicts every track, associates the predictions with the frame's
//! detections by maximum intersection over union, corrects the matched tracks, starts new tracks
//! for the unmatched detections and retires stale ones.

mod archive;
mod bounding_box;
mod correlation_tracker;
mod detection;
pub mod error;
mod estimator;
mod frame;
pub mod iou_matching;
mod kalman_filter;
pub mod linear_assignment;
mod track;
mod tracker;

pub use archive::Archiver;
pub use bounding_box::BoundingBox;
pub use correlation_tracker::CorrelationTracker;
pub use detection::Detection;
pub use error::TrackerError;
pub use estimator::{Estimator, EstimatorKind};
pub use frame::Frame;
pub use kalman_filter::KalmanFilter;
pub use linear_assignment::{Association, Associator, IouAssociator};
pub use track::Track;
pub use tracker::Tracker;
