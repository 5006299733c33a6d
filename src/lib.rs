//! Golf swing analysis: reduces per-frame body landmarks to swing metrics,
//! grades them against club-specific targets, and writes a coaching report
//! plus an annotated copy of the video.

pub mod artifact;
pub mod club;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod evaluate;
pub mod metrics;
pub mod pose;
pub mod report;
pub mod sampler;
pub mod video;

pub use engine::{AnalysisResult, Engine};
pub use error::Error;
