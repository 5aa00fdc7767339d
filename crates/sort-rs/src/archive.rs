use crate::*;
use anyhow::Result;

/// Receives tracks which expire with enough collected attributes to be worth keeping.
///
/// An error returned here is logged by the tracker and does not abort the frame.
pub trait Archiver<A> {
    /// Persist an expiring track.
    ///
    /// # Parameters
    ///
    /// * `track`: The expiring track, still holding its attributes.
    /// * `frame_count`: The frame in which the track expired.
    fn archive(&mut self, track: &Track<A>, frame_count: usize) -> Result<()>;
}

impl<A, F> Archiver<A> for F
where
    F: FnMut(&Track<A>, usize) -> Result<()>,
{
    fn archive(&mut self, track: &Track<A>, frame_count: usize) -> Result<()> {
        self(track, frame_count)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use anyhow::Result;

    #[test]
    fn closure_archiver() -> Result<()> {
        let kf = KalmanFilter::new();
        let mut track: Track<u8> = Track::new(
            7,
            Estimator::new(
                EstimatorKind::Kalman,
                &kf,
                &BoundingBox::new(0.0, 0.0, 1.0, 1.0),
                None,
            )?,
        );
        track.push_attribute(1);
        track.push_attribute(2);

        let mut archived = vec![];
        let mut archiver = |track: &Track<u8>, frame_count: usize| -> Result<()> {
            archived.push((track.track_id(), frame_count, track.attributes().to_vec()));
            Ok(())
        };
        archiver.archive(&track, 12)?;

        assert_eq!(archived, vec![(7, 12, vec![1, 2])]);
        Ok(())
    }
}
