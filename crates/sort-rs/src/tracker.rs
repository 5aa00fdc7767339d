use crate::{error::Result, *};
use fixedbitset::FixedBitSet;
use log::{debug, trace, warn};
use ndarray::*;

/// This is the multi-target tracker.
///
/// # Examples
///
/// ```
/// use sort_rs::{BoundingBox, Detection, Frame, Tracker};
///
/// // instantiate tracker with default parameters
/// let mut tracker: Tracker = Tracker::default();
/// let frame = Frame::new(480, 640);
///
/// // add 0..n detections once per frame
/// let detections = [Detection::new(BoundingBox::new(10.0, 20.0, 50.0, 80.0), 0.9)];
/// let tracked = tracker.update(&detections, vec![(); 1], &frame).unwrap();
///
/// // print (x, y, w, h, id) of the reported tracks
/// for row in tracked.outer_iter() {
///     println!("{} {:?}", row[4], row.slice(ndarray::s![..4]));
/// }
/// ```
pub struct Tracker<A = ()> {
    /// Maximum number of frames a track survives without a match.
    max_age: usize,
    /// Number of consecutive matches before a track is reported.
    min_hits: usize,
    /// Estimator of newly created tracks.
    estimator: EstimatorKind,
    /// Minimum number of collected attributes for an expiring track to be archived.
    archive_min_attributes: usize,
    /// A Kalman filter to filter target trajectories in image space.
    kf: KalmanFilter,
    /// Matches detections to predicted tracks.
    associator: Box<dyn Associator>,
    /// Receives expiring tracks.
    archiver: Option<Box<dyn Archiver<A>>>,
    /// The live tracks in creation order.
    tracks: Vec<Track<A>>,
    /// Used to allocate identifiers to new tracks.
    next_id: usize,
    /// Number of processed frames.
    frame_count: usize,
}

impl<A> std::fmt::Debug for Tracker<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("max_age", &self.max_age)
            .field("min_hits", &self.min_hits)
            .field("estimator", &self.estimator)
            .field("archive_min_attributes", &self.archive_min_attributes)
            .field("archiver", &self.archiver.is_some())
            .field("tracks", &self.tracks)
            .field("next_id", &self.next_id)
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

impl<A> Default for Tracker<A> {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl<A> Tracker<A> {
    /// Returns a new Tracker
    ///
    /// # Arguments
    ///
    /// * `max_age`: Maximum number of frames a track survives without a match. Default `1`.
    /// * `min_hits`: Number of consecutive matches before a track is reported. Default `3`.
    /// * `estimator`: Estimator of newly created tracks. Default `EstimatorKind::Kalman`.
    pub fn new(
        max_age: Option<usize>,
        min_hits: Option<usize>,
        estimator: Option<EstimatorKind>,
    ) -> Tracker<A> {
        Tracker {
            max_age: max_age.unwrap_or(1),
            min_hits: min_hits.unwrap_or(3),
            estimator: estimator.unwrap_or_default(),
            archive_min_attributes: 5,
            kf: KalmanFilter::default(),
            associator: Box::<IouAssociator>::default(),
            archiver: None,
            tracks: vec![],
            next_id: 0,
            frame_count: 0,
        }
    }

    /// Set max_age
    pub fn with_max_age(&mut self, max_age: usize) -> &mut Self {
        self.max_age = max_age;
        self
    }

    /// Set min_hits
    pub fn with_min_hits(&mut self, min_hits: usize) -> &mut Self {
        self.min_hits = min_hits;
        self
    }

    /// Use an IouAssociator with `iou_threshold`
    pub fn with_iou_threshold(&mut self, iou_threshold: f32) -> &mut Self {
        self.associator = Box::new(IouAssociator::new(iou_threshold));
        self
    }

    /// Set the associator
    pub fn with_associator(&mut self, associator: impl Associator + 'static) -> &mut Self {
        self.associator = Box::new(associator);
        self
    }

    /// Set the archiver
    pub fn with_archiver(&mut self, archiver: impl Archiver<A> + 'static) -> &mut Self {
        self.archiver = Some(Box::new(archiver));
        self
    }

    /// Set archive_min_attributes
    pub fn with_archive_min_attributes(&mut self, archive_min_attributes: usize) -> &mut Self {
        self.archive_min_attributes = archive_min_attributes;
        self
    }

    /// Return the live tracks in creation order
    pub fn tracks(&self) -> &[Track<A>] {
        &self.tracks
    }

    /// Return the number of processed frames
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Process the detections of the next frame.
    ///
    /// Must be called once for every frame, even without detections.
    ///
    /// # Parameters
    ///
    /// * `detections`: The detections of the current frame.
    /// * `attributes`: One attribute per detection, collected by the track the detection is assigned to.
    /// * `frame`: The frame size and, for correlation tracking, its image.
    ///
    /// # Returns
    ///
    /// An array with one `(x, y, w, h, id)` row per reported track, newest track first. A track
    /// born from a detection without width or height reports a non-finite box in its first frame
    /// and is dropped on the next predict.
    ///
    /// # Errors
    ///
    /// Invalid attributes or a missing image are rejected before the frame is counted. Once the
    /// tracks have been predicted an associator error still consumes the frame: the frame count and
    /// track ages have advanced, so the frame must not be submitted again.
    pub fn update(
        &mut self,
        detections: &[Detection],
        attributes: Vec<A>,
        frame: &Frame,
    ) -> Result<Array2<f32>> {
        if attributes.len() != detections.len() {
            return Err(TrackerError::AttributeMismatch {
                detections: detections.len(),
                attributes: attributes.len(),
            });
        }
        let image = frame.image();
        if self.estimator == EstimatorKind::Correlation && image.is_none() {
            return Err(TrackerError::MissingImage);
        }

        self.frame_count += 1;

        // get predicted locations from existing trackers
        let predictions = self
            .tracks
            .iter_mut()
            .map(|track| track.predict(&self.kf, image))
            .collect::<Vec<_>>();
        self.remove_tracks(|idx| !predictions[idx].is_finite(), "degenerate prediction");
        let predictions = predictions
            .into_iter()
            .filter(BoundingBox::is_finite)
            .collect::<Vec<_>>();

        let mut attributes = attributes.into_iter().map(Some).collect::<Vec<_>>();
        let mut failed = FixedBitSet::with_capacity(self.tracks.len());
        let mut unmatched_detections = vec![];

        if detections.is_empty() {
            for (idx, track) in self.tracks.iter_mut().enumerate() {
                if let Err(err) = track.update(&self.kf, None, image) {
                    debug!("track {} failed to update: {}", track.track_id(), err);
                    failed.insert(idx);
                }
            }
        } else {
            let association = self.associator.associate(detections, &predictions)?;
            let matched_detections =
                validate_matches(&association, detections.len(), predictions.len())?;

            for &(detection_idx, track_idx) in &association.matches {
                let track = &mut self.tracks[track_idx];
                match track.update(&self.kf, Some(&detections[detection_idx]), image) {
                    Ok(()) => {
                        trace!(
                            "matched detection {} to track {}",
                            detection_idx,
                            track.track_id()
                        );
                        if let Some(attribute) = attributes[detection_idx].take() {
                            track.push_attribute(attribute);
                        }
                    }
                    Err(err) => {
                        debug!("track {} failed to update: {}", track.track_id(), err);
                        failed.insert(track_idx);
                    }
                }
            }

            unmatched_detections = (0..detections.len())
                .filter(|idx| !matched_detections.contains(*idx))
                .collect();
        }

        self.remove_tracks(|idx| failed.contains(idx), "failed update");

        // create and initialise new trackers for unmatched detections
        for detection_idx in unmatched_detections {
            let detection = &detections[detection_idx];
            let estimator = Estimator::new(self.estimator, &self.kf, detection.bbox(), image)?;
            let mut track = Track::new(self.next_id, estimator);
            if let Some(attribute) = attributes[detection_idx].take() {
                track.push_attribute(attribute);
            }
            debug!("created track {} at {:?}", track.track_id(), detection.bbox());
            self.next_id += 1;
            self.tracks.push(track);
        }

        Ok(self.report_and_prune(frame))
    }

    /// Process the detections of the next frame given as `(x, y, w, h, score)` rows.
    ///
    /// See `update`.
    pub fn update_array(
        &mut self,
        detections: ArrayView2<f32>,
        attributes: Vec<A>,
        frame: &Frame,
    ) -> Result<Array2<f32>> {
        let detections = detections
            .outer_iter()
            .map(Detection::from_row)
            .collect::<Result<Vec<_>>>()?;
        self.update(&detections, attributes, frame)
    }

    /// Drop the tracks whose current index satisfies `remove`.
    fn remove_tracks(&mut self, remove: impl Fn(usize) -> bool, reason: &str) {
        let mut idx = 0;
        self.tracks.retain(|track| {
            let keep = !remove(idx);
            if !keep {
                debug!("removed track {}: {}", track.track_id(), reason);
            }
            idx += 1;
            keep
        });
    }

    /// Collect the reported tracks and expire the stale or off-frame ones, newest track first.
    fn report_and_prune(&mut self, frame: &Frame) -> Array2<f32> {
        let width = frame.width() as f32;
        let height = frame.height() as f32;

        let mut reported: Vec<[f32; 5]> = vec![];
        let mut retained = Vec::with_capacity(self.tracks.len());

        for track in std::mem::take(&mut self.tracks).into_iter().rev() {
            let bbox = track.bbox();

            if track.time_since_update() < 1
                && (track.hit_streak() >= self.min_hits || self.frame_count <= self.min_hits)
            {
                reported.push([
                    bbox.x(),
                    bbox.y(),
                    bbox.width(),
                    bbox.height(),
                    (track.track_id() + 1) as f32,
                ]);
            }

            let expired = track.time_since_update() >= self.max_age
                || bbox.width() < 0.0
                || bbox.height() < 0.0
                || bbox.x() > width
                || bbox.y() > height;

            if !expired {
                retained.push(track);
                continue;
            }

            debug!(
                "expired track {} after {} frames",
                track.track_id(),
                track.age()
            );
            if track.attributes().len() >= self.archive_min_attributes {
                if let Some(archiver) = self.archiver.as_mut() {
                    if let Err(err) = archiver.archive(&track, self.frame_count) {
                        warn!("failed to archive track {}: {}", track.track_id(), err);
                    }
                }
            }
        }

        retained.reverse();
        self.tracks = retained;

        Array2::from(reported)
    }
}

/// Check the matches reference existing indices at most once each and return the matched detections.
fn validate_matches(
    association: &Association,
    num_detections: usize,
    num_tracks: usize,
) -> Result<FixedBitSet> {
    let mut matched_detections = FixedBitSet::with_capacity(num_detections);
    let mut matched_tracks = FixedBitSet::with_capacity(num_tracks);

    for &(detection, track) in &association.matches {
        if detection >= num_detections
            || track >= num_tracks
            || matched_detections.put(detection)
            || matched_tracks.put(track)
        {
            return Err(TrackerError::InvalidAssociation {
                detection,
                track,
                detections: num_detections,
                tracks: num_tracks,
            });
        }
    }

    Ok(matched_detections)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::*;
    use anyhow::Result;
    use ndarray::*;
    use rand::prelude::*;
    use rand_distr::Normal;
    use rand_pcg::Pcg64;

    fn detection(x: f32, y: f32, width: f32, height: f32) -> Detection {
        Detection::new(BoundingBox::new(x, y, width, height), 0.9)
    }

    fn ids(tracked: &Array2<f32>) -> Vec<usize> {
        tracked.column(4).iter().map(|id| *id as usize).collect()
    }

    #[test]
    fn scenario() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(1), Some(3), None);

        let tracked = tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame)?;
        assert_eq!(tracked.dim(), (1, 5));
        assert_eq!(ids(&tracked), vec![1]);

        let tracked = tracker.update(&[detection(12.0, 11.0, 20.0, 20.0)], vec![()], &frame)?;
        assert_eq!(ids(&tracked), vec![1]);
        assert_eq!(tracker.tracks()[0].hit_streak(), 2);
        assert_eq!(tracker.tracks()[0].time_since_update(), 0);

        let tracked = tracker.update(&[], vec![], &frame)?;
        assert_eq!(tracked.dim(), (0, 5));
        assert!(tracker.tracks().is_empty());
        assert_eq!(tracker.frame_count(), 3);

        Ok(())
    }

    #[test]
    fn reported_row() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::default();

        let tracked = tracker.update(&[detection(10.0, 20.0, 30.0, 40.0)], vec![()], &frame)?;
        [10.0f32, 20.0, 30.0, 40.0, 1.0]
            .iter()
            .zip(tracked.row(0).iter())
            .for_each(|(expected, actual)| assert!((expected - actual).abs() < 1e-3));

        Ok(())
    }

    #[test]
    fn warm_up() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(3), Some(3), None);

        // first object is confirmed by continuous matches
        for _ in 0..4 {
            tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame)?;
        }

        // a new object after warm-up waits for its hit streak
        let both = [detection(10.0, 10.0, 20.0, 20.0), detection(200.0, 200.0, 20.0, 20.0)];
        assert_eq!(ids(&tracker.update(&both, vec![(); 2], &frame)?), vec![1]);
        assert_eq!(ids(&tracker.update(&both, vec![(); 2], &frame)?), vec![1]);
        assert_eq!(ids(&tracker.update(&both, vec![(); 2], &frame)?), vec![2, 1]);

        Ok(())
    }

    #[test]
    fn expire_at_max_age() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(3), Some(1), None);
        let far = detection(400.0, 400.0, 10.0, 10.0);

        tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame)?;
        // unmatched predictions are not reported
        let tracked = tracker.update(&[far.clone()], vec![()], &frame)?;
        assert_eq!(ids(&tracked), vec![2]);
        assert_eq!(tracker.tracks().len(), 2);

        tracker.update(&[far.clone()], vec![()], &frame)?;
        assert_eq!(tracker.tracks().len(), 2);
        assert_eq!(tracker.tracks()[0].time_since_update(), 2);

        tracker.update(&[far], vec![()], &frame)?;
        assert_eq!(tracker.tracks().len(), 1);
        assert_eq!(tracker.tracks()[0].track_id(), 1);

        Ok(())
    }

    #[test]
    fn empty_frames() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::default();

        for _ in 0..10 {
            assert_eq!(tracker.update(&[], vec![], &frame)?.dim(), (0, 5));
        }
        assert_eq!(tracker.frame_count(), 10);
        assert!(tracker.tracks().is_empty());

        Ok(())
    }

    #[test]
    fn degenerate_prediction() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(5), None, None);

        // without height the aspect ratio is infinite and the prediction is not finite
        tracker.update(&[detection(10.0, 10.0, 20.0, 0.0)], vec![()], &frame)?;
        assert_eq!(tracker.tracks().len(), 1);

        let tracked = tracker.update(&[], vec![], &frame)?;
        assert_eq!(tracked.dim(), (0, 5));
        assert!(tracker.tracks().is_empty());

        Ok(())
    }

    #[test]
    fn leaves_frame() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(5), None, None);

        let tracked = tracker.update(&[detection(650.0, 10.0, 20.0, 20.0)], vec![()], &frame)?;
        assert_eq!(ids(&tracked), vec![1]);
        assert!(tracker.tracks().is_empty());

        tracker.update(&[detection(10.0, 490.0, 20.0, 20.0)], vec![()], &frame)?;
        assert!(tracker.tracks().is_empty());

        Ok(())
    }

    #[test]
    fn negative_geometry() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(5), None, None);

        // a negative width flips the sign of the height recovered from area and aspect ratio
        let tracked = tracker.update(&[detection(10.0, 10.0, -20.0, 20.0)], vec![()], &frame)?;
        assert_eq!(ids(&tracked), vec![1]);
        assert!(tracked[[0, 3]] < 0.0);
        assert!(tracker.tracks().is_empty());

        Ok(())
    }

    #[test]
    fn associator_failure_consumes_frame() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(5), None, None);
        tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame)?;
        tracker.with_associator(FailingAssociator);

        assert!(tracker
            .update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame)
            .is_err());
        assert_eq!(tracker.frame_count(), 2);
        assert_eq!(tracker.tracks()[0].time_since_update(), 1);

        Ok(())
    }

    #[test]
    fn archive() -> Result<()> {
        let frame = Frame::new(480, 640);
        let archived = Rc::new(RefCell::new(vec![]));
        let sink = archived.clone();

        let mut tracker: Tracker<usize> = Tracker::new(Some(1), None, None);
        tracker.with_archiver(move |track: &Track<usize>, frame_count: usize| -> Result<()> {
            sink.borrow_mut()
                .push((track.track_id(), frame_count, track.attributes().to_vec()));
            Ok(())
        });

        for i in 0..5 {
            tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![i], &frame)?;
        }
        // a short lived track is not archived
        tracker.update(&[detection(300.0, 300.0, 20.0, 20.0)], vec![9], &frame)?;
        assert_eq!(*archived.borrow(), vec![(0, 6, vec![0, 1, 2, 3, 4])]);

        tracker.update(&[], vec![], &frame)?;
        assert_eq!(archived.borrow().len(), 1);

        Ok(())
    }

    #[test]
    fn archive_failure() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(1), None, None);
        tracker
            .with_archive_min_attributes(1)
            .with_archiver(|_: &Track, _: usize| -> Result<()> { anyhow::bail!("disk full") });

        tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame)?;
        let tracked = tracker.update(&[detection(300.0, 300.0, 20.0, 20.0)], vec![()], &frame)?;

        assert_eq!(ids(&tracked), vec![2]);
        assert_eq!(tracker.tracks().len(), 1);

        Ok(())
    }

    #[test]
    fn attribute_mismatch() {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker<u8> = Tracker::default();

        assert!(matches!(
            tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![], &frame),
            Err(TrackerError::AttributeMismatch {
                detections: 1,
                attributes: 0
            })
        ));
        assert_eq!(tracker.frame_count(), 0);
    }

    #[test]
    fn missing_image() {
        let mut tracker: Tracker = Tracker::new(None, None, Some(EstimatorKind::Correlation));

        assert!(matches!(
            tracker.update(&[], vec![], &Frame::new(480, 640)),
            Err(TrackerError::MissingImage)
        ));
        assert_eq!(tracker.frame_count(), 0);
    }

    #[test]
    fn update_array() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::default();

        let tracked = tracker.update_array(
            arr2(&[[10.0, 10.0, 20.0, 20.0, 0.9], [100.0, 100.0, 20.0, 20.0, 0.8]]).view(),
            vec![(); 2],
            &frame,
        )?;
        assert_eq!(ids(&tracked), vec![2, 1]);

        let tracked = tracker.update_array(Array2::zeros((0, 5)).view(), vec![], &frame)?;
        assert_eq!(tracked.dim(), (0, 5));

        assert!(matches!(
            tracker.update_array(arr2(&[[10.0, 10.0, 20.0, 20.0]]).view(), vec![()], &frame),
            Err(TrackerError::DetectionShape(4))
        ));

        Ok(())
    }

    struct FixedAssociator(Association);

    impl Associator for FixedAssociator {
        fn associate(&self, _: &[Detection], _: &[BoundingBox]) -> Result<Association> {
            Ok(self.0.clone())
        }
    }

    struct FailingAssociator;

    impl Associator for FailingAssociator {
        fn associate(&self, _: &[Detection], _: &[BoundingBox]) -> Result<Association> {
            anyhow::bail!("solver unavailable")
        }
    }

    #[test]
    fn invalid_association() {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::default();
        tracker.with_associator(FixedAssociator(Association {
            matches: vec![(0, 3)],
            unmatched_detections: vec![],
            unmatched_tracks: vec![],
        }));

        assert!(matches!(
            tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame),
            Err(TrackerError::InvalidAssociation {
                detection: 0,
                track: 3,
                detections: 1,
                tracks: 0
            })
        ));
    }

    #[test]
    fn association_failure() {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::default();
        tracker.with_associator(FailingAssociator);

        let err = tracker
            .update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame)
            .unwrap_err();
        assert!(matches!(err, TrackerError::Association(_)));
        assert_eq!(err.to_string(), "solver unavailable");
    }

    #[test]
    fn iou_threshold() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(2), None, None);
        tracker.with_iou_threshold(0.9);

        tracker.update(&[detection(10.0, 10.0, 20.0, 20.0)], vec![()], &frame)?;
        // overlaps by half, too little for the raised threshold
        let tracked = tracker.update(&[detection(20.0, 10.0, 20.0, 20.0)], vec![()], &frame)?;

        assert_eq!(ids(&tracked), vec![2]);
        assert_eq!(tracker.tracks().len(), 2);

        Ok(())
    }

    #[test]
    fn unique_ids() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::new(Some(1), Some(1), None);

        let mut seen = vec![];
        for i in 0..6 {
            // a new object every frame, each seen once
            let x = 20.0 + i as f32 * 60.0;
            let tracked = tracker.update(&[detection(x, 10.0, 20.0, 20.0)], vec![()], &frame)?;
            seen.extend(ids(&tracked));
        }

        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    /// Two objects moving on straight lines observed with gaussian jitter.
    fn trajectories(frames: usize, seed: u64) -> Vec<Vec<Detection>> {
        let mut rng = Pcg64::seed_from_u64(seed);
        let jitter = Normal::new(0.0f32, 0.5).unwrap();

        (0..frames)
            .map(|frame| {
                let t = frame as f32;
                [(20.0 + 3.0 * t, 50.0 + t), (400.0 - 2.0 * t, 300.0 - 1.5 * t)]
                    .iter()
                    .map(|(x, y)| {
                        detection(
                            x + jitter.sample(&mut rng),
                            y + jitter.sample(&mut rng),
                            60.0 + jitter.sample(&mut rng),
                            120.0 + jitter.sample(&mut rng),
                        )
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn stable_ids() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut tracker: Tracker = Tracker::default();

        for detections in trajectories(40, 42) {
            let tracked = tracker.update(&detections, vec![(); detections.len()], &frame)?;
            let mut ids = ids(&tracked);
            ids.sort_unstable();
            assert_eq!(ids, vec![1, 2]);
        }
        assert_eq!(tracker.tracks().len(), 2);

        Ok(())
    }

    #[test]
    fn deterministic() -> Result<()> {
        let frame = Frame::new(480, 640);
        let mut first: Tracker = Tracker::default();
        let mut second: Tracker = Tracker::default();

        for detections in trajectories(20, 7) {
            let a = first.update(&detections, vec![(); detections.len()], &frame)?;
            let b = second.update(&detections, vec![(); detections.len()], &frame)?;
            assert_eq!(a, b);
        }

        Ok(())
    }

    /// A textured square of `size` at `(x, y)` on a black background.
    fn make_scene(width: usize, height: usize, x: usize, y: usize, size: usize) -> Array2<f32> {
        Array2::from_shape_fn((height, width), |(row, col)| {
            if (y..y + size).contains(&row) && (x..x + size).contains(&col) {
                (((row - y) * 7 + (col - x) * 13) % 17) as f32 / 17.0 + 0.1
            } else {
                0.0
            }
        })
    }

    #[test]
    fn correlation() -> Result<()> {
        let mut tracker: Tracker = Tracker::new(None, None, Some(EstimatorKind::Correlation));

        for step in 0..8 {
            let (x, y) = (10 + step * 2, 20 + step);
            let scene = make_scene(160, 120, x, y, 16);
            let frame = Frame::from_image(scene.view());

            let tracked = tracker.update(
                &[detection(x as f32, y as f32, 16.0, 16.0)],
                vec![()],
                &frame,
            )?;
            assert_eq!(ids(&tracked), vec![1]);
            assert_eq!(
                tracked.row(0).to_vec(),
                vec![x as f32, y as f32, 16.0, 16.0, 1.0]
            );
        }
        assert_eq!(tracker.tracks()[0].hits(), 8);

        Ok(())
    }
}
