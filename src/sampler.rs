use crate::{
    error::Error,
    video::{Frame, FrameSink, FrameSource},
};
use indicatif::ProgressBar;
use num_traits::cast::ToPrimitive;
use tracing::trace;

/// Frame rates above this are analyzed at every other frame.
const HIGH_FPS: i64 = 30;

/// Decides which decoded frames are handed to pose analysis.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sampler {
    stride: Option<usize>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub frames: usize,
    pub sampled: usize,
    pub dropped: usize,
}

impl Sampler {
    /// Stride 2 above 30 fps, otherwise every frame. The rate is truncated to
    /// a whole number first, so 30.5 fps still samples every frame.
    pub fn for_fps(fps: f64) -> Self {
        let whole = fps.trunc().to_i64().unwrap_or(0);
        Self {
            stride: Some(if whole > HIGH_FPS { 2 } else { 1 }),
        }
    }

    /// Samples nothing; every frame is copied through untouched.
    pub fn passthrough() -> Self {
        Self { stride: None }
    }

    pub fn stride(&self) -> Option<usize> {
        self.stride
    }

    pub fn is_sampled(&self, index: usize) -> bool {
        self.stride.map_or(false, |stride| index % stride == 0)
    }

    /// Walk `source` to the end, writing every frame to `sink` in order.
    /// Sampled frames go through `visit` first, which may draw on them.
    /// Empty frames are skipped but still advance the index.
    pub fn run<S, K, V>(
        &self,
        source: &mut S,
        sink: &mut K,
        progress: Option<&ProgressBar>,
        mut visit: V,
    ) -> Result<ScanStats, Error>
    where
        S: FrameSource,
        K: FrameSink<S::Frame>,
        V: FnMut(usize, &mut S::Frame) -> Result<(), Error>,
    {
        let mut stats = ScanStats::default();
        let mut index = 0;

        while let Some(mut frame) = source.next_frame()? {
            if let Some(pb) = progress {
                pb.inc(1);
            }

            if frame.is_empty() {
                trace!(message = "skipping empty frame", index);
                stats.dropped += 1;
                index += 1;
                continue;
            }

            if self.is_sampled(index) {
                visit(index, &mut frame)?;
                stats.sampled += 1;
            }
            sink.write(&frame)?;
            stats.frames += 1;
            index += 1;
        }

        Ok(stats)
    }
}
