//! Seams to the video decode/encode collaborators.

use crate::{error::Error, pose::Pose};
use std::path::Path;

#[cfg(feature = "video")]
pub mod cv;

#[cfg(test)]
pub(crate) mod fake;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

/// A decoded frame that a skeleton can be drawn onto.
pub trait Frame {
    /// True for zero-length frames a decoder sometimes hands back mid-stream.
    fn is_empty(&self) -> bool;

    /// Draw every keypoint of `pose` scoring at least `min_score`, plus the
    /// skeleton edges between them.
    fn draw_pose(&mut self, pose: &Pose, min_score: f32) -> Result<(), Error>;
}

/// A lazy, finite sequence of frames with known timing and dimensions.
pub trait FrameSource {
    type Frame: Frame;

    fn info(&self) -> VideoInfo;

    /// The next frame, or `None` once the video is exhausted.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Error>;
}

pub trait FrameSink<F> {
    fn write(&mut self, frame: &F) -> Result<(), Error>;

    /// Flush and close the file so it is playable.
    fn finish(self) -> Result<(), Error>;
}

/// Opens sources and sinks by path.
pub trait VideoBackend {
    type Frame: Frame;
    type Source: FrameSource<Frame = Self::Frame>;
    type Sink: FrameSink<Self::Frame>;

    fn open_source(&self, path: &Path) -> Result<Self::Source, Error>;

    fn open_sink(&self, path: &Path, info: &VideoInfo) -> Result<Self::Sink, Error>;
}
