use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to convert keypoint variant to usize: {0:?}")]
    KeypointVariantToUSize(crate::pose::KeypointKind),

    #[error("failed to open video for reading: {0:?}")]
    OpenSource(PathBuf),

    #[error("failed to open video for writing: {0:?}")]
    OpenSink(PathBuf),

    #[error("failed to read frame {0}")]
    ReadFrame(usize),

    #[error("failed to write frame {0}")]
    WriteFrame(usize),

    #[error("failed to finalize video: {0:?}")]
    FinishSink(PathBuf),

    #[error("failed to convert video dimension {0} to u32")]
    ConvertDimension(f64),

    #[error("failed to convert value to i32")]
    ConvertToI32,

    #[cfg(feature = "video")]
    #[error("opencv call failed: {1}")]
    OpenCv(#[source] opencv::Error, &'static str),

    #[error("failed to create artifact folder: {1:?}")]
    CreateFolder(#[source] std::io::Error, PathBuf),

    #[error("failed to copy upload {1:?} into {2:?}")]
    CopyUpload(#[source] std::io::Error, PathBuf, PathBuf),

    #[error("failed to publish artifact {1:?} as {2:?}")]
    Publish(#[source] std::io::Error, PathBuf, PathBuf),

    #[error("failed to read landmark file: {1:?}")]
    ReadLandmarks(#[source] std::io::Error, PathBuf),

    #[error("failed to parse landmarks on line {1}")]
    ParseLandmarks(#[source] serde_json::Error, usize),

    #[error("invalid landmark on line {1}")]
    InvalidLandmark(#[source] Box<Error>, usize),
}
