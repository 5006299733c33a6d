use crate::{error::Error, pose::Pose};

pub mod track;

pub use track::LandmarkTrack;

/// The body-landmark detector: given a decoded frame, returns the detected
/// skeleton or `None` when no person was found.
pub trait PoseEstimator<F> {
    fn detect(&mut self, frame_index: usize, frame: &F) -> Result<Option<Pose>, Error>;
}

/// An estimator that never finds anyone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Absent;

impl<F> PoseEstimator<F> for Absent {
    fn detect(&mut self, _frame_index: usize, _frame: &F) -> Result<Option<Pose>, Error> {
        Ok(None)
    }
}

impl<F, E> PoseEstimator<F> for &mut E
where
    E: PoseEstimator<F> + ?Sized,
{
    fn detect(&mut self, frame_index: usize, frame: &F) -> Result<Option<Pose>, Error> {
        (**self).detect(frame_index, frame)
    }
}
