use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use opencv::core::Mat;
use std::path::PathBuf;
use structopt::StructOpt;
use swing_coach::{
    artifact::{self, Workspace},
    engine::Engine,
    estimator::{Absent, LandmarkTrack, PoseEstimator},
    video::cv::OpenCvBackend,
};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Path to the uploaded swing video (.mp4).
    #[structopt(required = true)]
    video: PathBuf,

    /// Club used for the swing: driver, iron, wedge or putter. Anything else
    /// is graded as an iron.
    #[structopt(short, long, default_value = "iron")]
    club: String,

    /// JSON Lines file of per-frame body landmarks. Without it no pose is
    /// ever detected.
    #[structopt(short = "-L", long)]
    landmarks: Option<PathBuf>,

    /// Minimum keypoint score drawn in the overlay.
    #[structopt(short, long, default_value = "0.5")]
    threshold: f32,

    /// Folder holding the most recent uploads.
    #[structopt(long, default_value = "uploads", env = "SWING_UPLOAD_DIR")]
    upload_dir: PathBuf,

    /// Folder holding the most recent annotated videos.
    #[structopt(long, default_value = "static", env = "SWING_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// How many artifacts each folder retains.
    #[structopt(long, default_value = "1")]
    keep: usize,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    if !artifact::is_supported_upload(&opt.video) {
        bail!("please upload an .mp4 file: {}", opt.video.display());
    }

    let workspace = Workspace::open(&opt.upload_dir, &opt.output_dir, opt.keep)
        .context("failed opening artifact folders")?;

    let mut estimator: Box<dyn PoseEstimator<Mat>> = match opt.landmarks {
        Some(ref path) => Box::new(
            LandmarkTrack::open(path)
                .with_context(|| format!("failed loading landmarks from {}", path.display()))?,
        ),
        None => Box::new(Absent),
    };

    let mut engine = Engine::new(OpenCvBackend, estimator.as_mut()).with_min_score(opt.threshold);

    if opt.show_progress {
        engine = engine.with_progress(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {pos} frames {wide_msg}"),
            ),
        );
    }

    let result = engine
        .handle_upload(&opt.video, &workspace, &opt.club)
        .context("failed analyzing swing")?;

    info!(
        message = "request complete",
        output = ?result.output_file,
        inference_ms = engine.timing().inference.as_secs_f64() * 1000.0
    );

    println!("{}", result.report);
    if let Some(name) = result.output_file {
        println!("{}", workspace.outputs.root().join(name).display());
    }

    Ok(())
}
