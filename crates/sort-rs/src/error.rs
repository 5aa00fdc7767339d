use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors returned to the caller of the tracker.
///
/// Numerical degeneracy of a track and tracks leaving the frame are not errors, they are handled
/// by removing the track.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid detection shape: expected 5 columns (x, y, w, h, score), got {0}")]
    DetectionShape(usize),

    #[error("Attribute count mismatch: {detections} detections but {attributes} attributes")]
    AttributeMismatch {
        detections: usize,
        attributes: usize,
    },

    #[error("Correlation tracking requires a frame image")]
    MissingImage,

    #[error("Association referenced detection {detection} and track {track} but only {detections} detections and {tracks} tracks exist")]
    InvalidAssociation {
        detection: usize,
        track: usize,
        detections: usize,
        tracks: usize,
    },

    #[error(transparent)]
    Association(#[from] anyhow::Error),
}
