use crate::{
    error::Error,
    pose::{self, KeypointKind, Pose},
    video::{Frame, FrameSink, FrameSource, VideoBackend, VideoInfo},
};
use num_traits::cast::ToPrimitive;
use opencv::{
    core::{Mat, Point2i, Scalar, Size},
    imgproc::{self, LINE_8},
    prelude::*,
    videoio::{
        VideoCapture, VideoWriter, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT,
        CAP_PROP_FRAME_WIDTH,
    },
};
use std::path::{Path, PathBuf};

const GREEN: (f64, f64, f64) = (0.0, 255.0, 0.0);
const YELLOW: (f64, f64, f64) = (0.0, 255.0, 255.0);

fn scalar((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

fn to_pixel(point: pose::Point, cols: i32, rows: i32) -> Result<Point2i, Error> {
    let x = (f64::from(point.x()) * f64::from(cols))
        .to_i32()
        .ok_or(Error::ConvertToI32)?;
    let y = (f64::from(point.y()) * f64::from(rows))
        .to_i32()
        .ok_or(Error::ConvertToI32)?;
    Ok(Point2i::new(x, y))
}

impl Frame for Mat {
    fn is_empty(&self) -> bool {
        self.rows() <= 0 || self.cols() <= 0
    }

    fn draw_pose(&mut self, pose: &Pose, min_score: f32) -> Result<(), Error> {
        let (cols, rows) = (self.cols(), self.rows());
        let mut xys = [None; pose::NUM_KEYPOINTS];

        for kind in KeypointKind::all() {
            if let Some(point) = pose.visible(kind, min_score) {
                let center = to_pixel(point, cols, rows)?;
                xys[kind.idx()?] = Some(center);
                imgproc::circle(
                    self,
                    center,
                    6,
                    scalar(GREEN),
                    2,      // thickness
                    LINE_8, // line_type
                    0,      // shift
                )
                .map_err(|e| Error::OpenCv(e, "draw circle"))?;
            }
        }

        for (a, b) in pose::constants::KEYPOINT_EDGES {
            if let (Some(a_point), Some(b_point)) = (xys[a.idx()?], xys[b.idx()?]) {
                imgproc::line(
                    self,
                    a_point,
                    b_point,
                    scalar(YELLOW),
                    2,      // thickness
                    LINE_8, // line_type
                    0,      // shift
                )
                .map_err(|e| Error::OpenCv(e, "draw line"))?;
            }
        }
        Ok(())
    }
}

pub struct Capture {
    capture: VideoCapture,
    info: VideoInfo,
    frame_num: usize,
}

impl FrameSource for Capture {
    type Frame = Mat;

    fn info(&self) -> VideoInfo {
        self.info
    }

    fn next_frame(&mut self) -> Result<Option<Mat>, Error> {
        let mut frame = Mat::default();
        let more = self
            .capture
            .read(&mut frame)
            .map_err(|_| Error::ReadFrame(self.frame_num))?;
        if !more {
            return Ok(None);
        }
        self.frame_num += 1;
        Ok(Some(frame))
    }
}

pub struct Writer {
    writer: VideoWriter,
    path: PathBuf,
    frame_num: usize,
}

impl FrameSink<Mat> for Writer {
    fn write(&mut self, frame: &Mat) -> Result<(), Error> {
        self.writer
            .write(frame)
            .map_err(|_| Error::WriteFrame(self.frame_num))?;
        self.frame_num += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<(), Error> {
        self.writer
            .release()
            .map_err(|_| Error::FinishSink(self.path.clone()))
    }
}

/// Decodes with `VideoCapture` and encodes H.264 (`avc1`) with `VideoWriter`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvBackend;

fn dimension(capture: &VideoCapture, prop: i32) -> Result<u32, Error> {
    let value = capture
        .get(prop)
        .map_err(|e| Error::OpenCv(e, "get capture property"))?;
    value.to_u32().ok_or(Error::ConvertDimension(value))
}

fn path_str(path: &Path) -> Result<&str, Error> {
    path.to_str().ok_or_else(|| Error::OpenSource(path.to_owned()))
}

impl VideoBackend for OpenCvBackend {
    type Frame = Mat;
    type Source = Capture;
    type Sink = Writer;

    fn open_source(&self, path: &Path) -> Result<Capture, Error> {
        let capture = VideoCapture::from_file(path_str(path)?, CAP_ANY)
            .map_err(|_| Error::OpenSource(path.to_owned()))?;
        if !capture
            .is_opened()
            .map_err(|_| Error::OpenSource(path.to_owned()))?
        {
            return Err(Error::OpenSource(path.to_owned()));
        }

        let fps = capture
            .get(CAP_PROP_FPS)
            .map_err(|e| Error::OpenCv(e, "get frame rate"))?;
        let info = VideoInfo {
            fps,
            width: dimension(&capture, CAP_PROP_FRAME_WIDTH)?,
            height: dimension(&capture, CAP_PROP_FRAME_HEIGHT)?,
        };
        Ok(Capture {
            capture,
            info,
            frame_num: 0,
        })
    }

    fn open_sink(&self, path: &Path, info: &VideoInfo) -> Result<Writer, Error> {
        let fourcc = VideoWriter::fourcc('a', 'v', 'c', '1')
            .map_err(|e| Error::OpenCv(e, "build fourcc"))?;
        let size = Size::new(
            info.width.to_i32().ok_or(Error::ConvertToI32)?,
            info.height.to_i32().ok_or(Error::ConvertToI32)?,
        );
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::OpenSink(path.to_owned()))?;
        let writer = VideoWriter::new(path_str, fourcc, info.fps, size, true)
            .map_err(|_| Error::OpenSink(path.to_owned()))?;
        if !writer
            .is_opened()
            .map_err(|_| Error::OpenSink(path.to_owned()))?
        {
            return Err(Error::OpenSink(path.to_owned()));
        }
        Ok(Writer {
            writer,
            path: path.to_owned(),
            frame_num: 0,
        })
    }
}
