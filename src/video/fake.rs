//! Plain-text stand-in for a video container, used by tests.
//!
//! A fake video is a text file: the first line is the frame rate, every
//! following line is either `frame` or `blank` (a zero-length frame). The fake
//! sink writes one line per frame it receives: `<source index> <overlays>`.

use crate::{
    error::Error,
    pose::Pose,
    video::{Frame, FrameSink, FrameSource, VideoBackend, VideoInfo},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeFrame {
    pub(crate) index: usize,
    pub(crate) blank: bool,
    pub(crate) overlays: usize,
}

impl Frame for FakeFrame {
    fn is_empty(&self) -> bool {
        self.blank
    }

    fn draw_pose(&mut self, _pose: &Pose, _min_score: f32) -> Result<(), Error> {
        self.overlays += 1;
        Ok(())
    }
}

pub(crate) struct FakeSource {
    info: VideoInfo,
    frames: std::vec::IntoIter<FakeFrame>,
}

impl FrameSource for FakeSource {
    type Frame = FakeFrame;

    fn info(&self) -> VideoInfo {
        self.info
    }

    fn next_frame(&mut self) -> Result<Option<FakeFrame>, Error> {
        Ok(self.frames.next())
    }
}

pub(crate) struct FakeSink {
    path: PathBuf,
    lines: Vec<String>,
}

impl FrameSink<FakeFrame> for FakeSink {
    fn write(&mut self, frame: &FakeFrame) -> Result<(), Error> {
        self.lines
            .push(format!("{} {}", frame.index, frame.overlays));
        Ok(())
    }

    fn finish(self) -> Result<(), Error> {
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        fs::write(&self.path, contents).map_err(|_| Error::FinishSink(self.path.clone()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FakeBackend;

impl VideoBackend for FakeBackend {
    type Frame = FakeFrame;
    type Source = FakeSource;
    type Sink = FakeSink;

    fn open_source(&self, path: &Path) -> Result<FakeSource, Error> {
        let text = fs::read_to_string(path).map_err(|_| Error::OpenSource(path.to_owned()))?;
        let mut lines = text.lines();
        let fps = lines
            .next()
            .and_then(|line| line.trim().parse::<f64>().ok())
            .ok_or_else(|| Error::OpenSource(path.to_owned()))?;
        let frames = lines
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(index, line)| FakeFrame {
                index,
                blank: line.trim() == "blank",
                overlays: 0,
            })
            .collect::<Vec<_>>();
        Ok(FakeSource {
            info: VideoInfo {
                fps,
                width: 64,
                height: 48,
            },
            frames: frames.into_iter(),
        })
    }

    fn open_sink(&self, path: &Path, _info: &VideoInfo) -> Result<FakeSink, Error> {
        Ok(FakeSink {
            path: path.to_owned(),
            lines: Vec::new(),
        })
    }
}

/// Write a fake video with `frames` non-blank frames at `fps`.
pub(crate) fn write_video(path: &Path, fps: f64, frames: usize) {
    let mut contents = format!("{}\n", fps);
    contents.push_str(&"frame\n".repeat(frames));
    fs::write(path, contents).unwrap();
}

/// Parse what a `FakeSink` wrote as `(source index, overlays)` pairs.
pub(crate) fn read_output(path: &Path) -> Vec<(usize, usize)> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.split(' ');
            let index = parts.next().unwrap().parse().unwrap();
            let overlays = parts.next().unwrap().parse().unwrap();
            (index, overlays)
        })
        .collect()
}
