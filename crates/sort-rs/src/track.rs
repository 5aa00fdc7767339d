use std::hash::{Hash, Hasher};

use crate::*;
use anyhow::Result;
use ndarray::*;

/// A single target track: a motion estimator plus the bookkeeping used to confirm and retire it.
///
/// `A` is the side-channel payload collected on every matched detection (e.g. appearance crops).
pub struct Track<A = ()> {
    /// A unique track identifier.
    track_id: usize,
    /// The motion estimator of the track.
    estimator: Estimator,
    /// Total number of measurement updates.
    hits: usize,
    /// Number of consecutive frames with a measurement update.
    hit_streak: usize,
    /// Total number of frames since first occurance.
    age: usize,
    /// Total number of frames since last measurement update.
    time_since_update: usize,
    /// Attributes of every detection assigned to this track.
    attributes: Vec<A>,
}

impl<A> std::fmt::Debug for Track<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Track")
            .field("track_id", &self.track_id)
            .field("estimator", &self.estimator.kind())
            .field("hits", &self.hits)
            .field("hit_streak", &self.hit_streak)
            .field("age", &self.age)
            .field("time_since_update", &self.time_since_update)
            .field("attributes", &self.attributes.len())
            .finish()
    }
}

impl<A> PartialEq for Track<A> {
    fn eq(&self, other: &Self) -> bool {
        self.track_id == other.track_id
    }
}

impl<A> Eq for Track<A> {}

impl<A> Hash for Track<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.track_id.hash(state);
    }
}

impl<A> Track<A> {
    /// Returns a new Track
    ///
    /// The originating detection counts as the first hit.
    ///
    /// # Parameters
    ///
    /// * `track_id`: A unique track identifier.
    /// * `estimator`: The estimator initialised on the originating detection.
    pub fn new(track_id: usize, estimator: Estimator) -> Track<A> {
        Track {
            track_id,
            estimator,
            hits: 1,
            hit_streak: 1,
            age: 0,
            time_since_update: 0,
            attributes: vec![],
        }
    }

    /// Return the identifier of the track
    pub fn track_id(&self) -> usize {
        self.track_id
    }

    /// Return the total number of hits of the track
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Return the number of consecutive hits of the track
    pub fn hit_streak(&self) -> usize {
        self.hit_streak
    }

    /// Return the number of predictions since creation
    pub fn age(&self) -> usize {
        self.age
    }

    /// Return the time since update of the track
    pub fn time_since_update(&self) -> usize {
        self.time_since_update
    }

    /// Return the attributes collected by the track
    pub fn attributes(&self) -> &[A] {
        &self.attributes
    }

    /// Append an attribute of an assigned detection
    pub fn push_attribute(&mut self, attribute: A) {
        self.attributes.push(attribute);
    }

    /// Returns the track position bounding box
    pub fn bbox(&self) -> BoundingBox {
        self.estimator.bbox()
    }

    /// Propagate the state to the current frame.
    ///
    /// The hit streak is broken here when the previous frame went unmatched, and the time since
    /// update is advanced before matching runs.
    ///
    /// # Parameters
    ///
    /// * `kf`: The Kalman filter.
    /// * `image`: The current frame image, if any.
    pub fn predict(&mut self, kf: &KalmanFilter, image: Option<ArrayView2<f32>>) -> BoundingBox {
        let bbox = self.estimator.predict(kf, image);
        self.age += 1;
        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;
        bbox
    }

    /// Perform the estimator measurement update step.
    ///
    /// `None` marks a frame without any detection: it is forwarded to the estimator and the track
    /// counters are left untouched.
    ///
    /// # Parameters
    ///
    /// * `kf`: The Kalman filter.
    /// * `detection`: The associated detection.
    /// * `image`: The current frame image, if any.
    pub fn update(
        &mut self,
        kf: &KalmanFilter,
        detection: Option<&Detection>,
        image: Option<ArrayView2<f32>>,
    ) -> Result<()> {
        self.estimator
            .update(kf, detection.map(|detection| detection.bbox()), image)?;

        if detection.is_some() {
            self.hits += 1;
            self.hit_streak += 1;
            self.time_since_update = 0;
        }

        Ok(())
    }
}
