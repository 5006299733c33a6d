use crate::{
    artifact::{ArtifactStore, Token, Workspace},
    club::Club,
    error::Error,
    estimator::PoseEstimator,
    evaluate,
    metrics::{self, SwingSeries},
    report,
    sampler::{Sampler, ScanStats},
    video::{Frame, FrameSink, FrameSource, VideoBackend},
};
use indicatif::ProgressBar;
use std::{
    path::Path,
    time::{Duration, Instant},
};
use tracing::{info, instrument, warn};

/// Keypoints scoring below this are not drawn.
pub const DEFAULT_MIN_SCORE: f32 = 0.5;

pub struct Engine<B, E> {
    backend: B,
    estimator: E,
    min_score: f32,
    progress: Option<ProgressBar>,
    timing: Timing,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct Timing {
    pub inference: Duration,
}

/// What a request hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub report: String,
    /// File name of the annotated video in the output folder. `None` when the
    /// input could not be opened.
    pub output_file: Option<String>,
}

struct Scan {
    stats: ScanStats,
    series: SwingSeries,
    posed: usize,
}

impl<B, E> Engine<B, E>
where
    B: VideoBackend,
    E: PoseEstimator<B::Frame>,
{
    pub fn new(backend: B, estimator: E) -> Self {
        Self {
            backend,
            estimator,
            min_score: DEFAULT_MIN_SCORE,
            progress: None,
            timing: Timing::default(),
        }
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Time spent in the estimator during the last analysis.
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Take ownership of an uploaded video, analyze it, and publish the
    /// annotated copy. Older uploads and outputs are swept afterwards.
    pub fn handle_upload(
        &mut self,
        upload: &Path,
        workspace: &Workspace,
        club: &str,
    ) -> Result<AnalysisResult, Error> {
        let token = Token::generate();
        let input = workspace.uploads.ingest(upload, &token)?;
        let result = self.analyze(&input, &workspace.outputs, &token, club);
        workspace.uploads.sweep(&token);
        result
    }

    /// Analyze the swing in `input` for `club`, writing the annotated video
    /// into `outputs` under `token`.
    #[instrument(skip(self, outputs, token), fields(token = %token))]
    pub fn analyze(
        &mut self,
        input: &Path,
        outputs: &ArtifactStore,
        token: &Token,
        club: &str,
    ) -> Result<AnalysisResult, Error> {
        self.timing = Timing::default();
        let profile = Club::resolve(club).profile();

        let mut source = match self.backend.open_source(input) {
            Ok(source) => source,
            Err(error) => {
                warn!(message = "cannot open video", path = %input.display(), %error);
                return Ok(AnalysisResult {
                    report: report::UNREADABLE.to_owned(),
                    output_file: None,
                });
            }
        };

        let info = source.info();
        let sampler = if profile.skips_analysis() {
            Sampler::passthrough()
        } else {
            Sampler::for_fps(info.fps)
        };
        info!(
            message = "analyzing swing",
            club = %profile.club,
            fps = info.fps,
            width = info.width,
            height = info.height,
            stride = ?sampler.stride()
        );

        let mut sink = match self.backend.open_sink(&outputs.staging_path(token), &info) {
            Ok(sink) => sink,
            Err(error) => {
                outputs.discard(token);
                return Err(error);
            }
        };
        let scan = match self
            .scan(&sampler, &mut source, &mut sink)
            .and_then(|scan| sink.finish().map(|()| scan))
        {
            Ok(scan) => scan,
            Err(error) => {
                outputs.discard(token);
                return Err(error);
            }
        };

        let output_file = outputs.publish(token)?;
        outputs.sweep(token);

        info!(
            message = "scan complete",
            frames = scan.stats.frames,
            sampled = scan.stats.sampled,
            dropped = scan.stats.dropped,
            posed = scan.posed,
            inference_ms = self.timing.inference.as_secs_f64() * 1000.0
        );

        let evaluation = evaluate::evaluate(profile, &scan.series);
        Ok(AnalysisResult {
            report: report::render(club.trim(), &evaluation),
            output_file: Some(output_file),
        })
    }

    fn scan(
        &mut self,
        sampler: &Sampler,
        source: &mut B::Source,
        sink: &mut B::Sink,
    ) -> Result<Scan, Error> {
        let Self {
            estimator,
            min_score,
            progress,
            timing,
            ..
        } = self;
        let min_score = *min_score;
        let mut series = SwingSeries::default();
        let mut posed = 0;

        let stats = sampler.run(source, sink, progress.as_ref(), |index, frame| {
            let start_inference = Instant::now();
            let pose = estimator.detect(index, frame)?;
            timing.inference += start_inference.elapsed();

            if let Some(pose) = pose {
                posed += 1;
                frame.draw_pose(&pose, min_score)?;
                series.record(&metrics::reduce(&pose));
            }
            Ok(())
        })?;

        if let Some(pb) = progress.as_ref() {
            pb.finish_and_clear();
        }

        Ok(Scan {
            stats,
            series,
            posed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisResult, Engine};
    use crate::{
        artifact::{ArtifactStore, Token, Workspace},
        club::{Club, Fault},
        error::Error,
        estimator::{Absent, PoseEstimator},
        pose::{KeypointKind, Pose},
        report,
        video::{
            fake::{self, FakeBackend, FakeFrame, FakeSink, FakeSource},
            FrameSink, VideoBackend, VideoInfo,
        },
    };
    use std::{
        collections::HashMap,
        fs,
        path::{Path, PathBuf},
    };

    /// Hands back scripted poses and remembers which frames it was shown.
    #[derive(Default)]
    struct Scripted {
        poses: HashMap<usize, Pose>,
        seen: Vec<usize>,
    }

    impl<F> PoseEstimator<F> for Scripted {
        fn detect(&mut self, frame_index: usize, _frame: &F) -> Result<Option<Pose>, Error> {
            self.seen.push(frame_index);
            Ok(self.poses.get(&frame_index).copied())
        }
    }

    /// Shoulders at `angle` degrees, wrists at `wrist_y`.
    fn swing_pose(angle: f64, wrist_y: f32) -> Pose {
        scored_swing_pose(angle, wrist_y, 0.9)
    }

    fn scored_swing_pose(angle: f64, wrist_y: f32, score: f32) -> Pose {
        let (sin, cos) = angle.to_radians().sin_cos();
        let mut pose = Pose::default();
        pose.set(KeypointKind::RightShoulder, 0.4, 0.5, score).unwrap();
        pose.set(
            KeypointKind::LeftShoulder,
            (0.4 + 0.2 * cos) as f32,
            (0.5 + 0.2 * sin) as f32,
            score,
        )
        .unwrap();
        pose.set(KeypointKind::LeftWrist, 0.5, wrist_y, score).unwrap();
        pose.set(KeypointKind::RightWrist, 0.52, wrist_y, score).unwrap();
        pose
    }

    fn mp4_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().unwrap().is_file())
            .map(|e| e.file_name().into_string().unwrap())
            .filter(|n| n.ends_with(".mp4"))
            .collect()
    }

    struct Fixture {
        dir: tempfile::TempDir,
        outputs: ArtifactStore,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let outputs = ArtifactStore::open(dir.path().join("static"), "annotated_swing", 1)
                .unwrap();
            Self { dir, outputs }
        }

        fn video(&self, fps: f64, frames: usize) -> std::path::PathBuf {
            let path = self.dir.path().join("swing.mp4");
            fake::write_video(&path, fps, frames);
            path
        }

        fn output(&self, result: &AnalysisResult) -> Vec<(usize, usize)> {
            let name = result.output_file.as_ref().unwrap();
            fake::read_output(&self.outputs.root().join(name))
        }
    }

    #[test]
    fn no_pose_anywhere_reports_tracking_failures() {
        let fixture = Fixture::new();
        let input = fixture.video(24.0, 6);
        let mut engine = Engine::new(FakeBackend, Absent);

        let result = engine
            .analyze(&input, &fixture.outputs, &Token::generate(), "iron")
            .unwrap();

        assert!(result.report.contains("❌ Could not track shoulders."));
        assert!(result.report.contains("❌ Could not track wrists."));
        assert!(result.report.contains("❌ Could not track shoulder balance."));
        assert!(!result.report.contains("  ❌"));
        assert!(!result.report.contains("✅"));

        let written = fixture.output(&result);
        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|&(_, overlays)| overlays == 0));
    }

    #[test]
    fn sixty_fps_analyzes_every_other_frame() {
        let fixture = Fixture::new();
        let input = fixture.video(60.0, 6);
        let mut scripted = Scripted::default();
        for i in 0..6 {
            scripted.poses.insert(i, swing_pose(10.0, 0.6));
        }

        let result = Engine::new(FakeBackend, &mut scripted)
            .analyze(&input, &fixture.outputs, &Token::generate(), "iron")
            .unwrap();

        assert_eq!(scripted.seen, vec![0, 2, 4]);
        assert_eq!(
            fixture.output(&result),
            vec![(0, 1), (1, 0), (2, 1), (3, 0), (4, 1), (5, 0)]
        );
    }

    #[test]
    fn flat_shoulder_turn_is_faulted_for_iron() {
        let fixture = Fixture::new();
        let input = fixture.video(24.0, 3);
        let mut scripted = Scripted::default();
        for (i, wrist_y) in [0.3, 0.45, 0.6].iter().enumerate() {
            scripted.poses.insert(i, swing_pose(10.0, *wrist_y));
        }

        let result = Engine::new(FakeBackend, &mut scripted)
            .analyze(&input, &fixture.outputs, &Token::generate(), "iron")
            .unwrap();

        let tip = Club::Iron.profile().tip(Fault::ShoulderRotation).unwrap();
        assert!(result.report.contains("🧍 Shoulder Rotation Range: 0.00°"));
        assert!(result
            .report
            .contains(&format!("❌ Limited Shoulder Rotation: {}", tip)));
        assert!(result.report.contains("✅ Good Wrist Extension"));
    }

    #[test]
    fn wide_shoulder_turn_passes_for_iron() {
        let fixture = Fixture::new();
        let input = fixture.video(24.0, 2);
        let mut scripted = Scripted::default();
        scripted.poses.insert(0, swing_pose(0.0, 0.6));
        scripted.poses.insert(1, swing_pose(90.0, 0.6));

        let result = Engine::new(FakeBackend, &mut scripted)
            .analyze(&input, &fixture.outputs, &Token::generate(), "iron")
            .unwrap();

        assert!(result.report.contains("🧍 Shoulder Rotation Range: 90.00°"));
        assert!(result.report.contains("✅ Good Shoulder Turn"));
    }

    #[test]
    fn low_confidence_landmarks_are_measured() {
        let fixture = Fixture::new();
        let input = fixture.video(24.0, 2);
        let mut scripted = Scripted::default();
        scripted.poses.insert(0, scored_swing_pose(0.0, 0.5, 0.4));
        scripted.poses.insert(1, scored_swing_pose(90.0, 0.6, 0.4));

        let result = Engine::new(FakeBackend, &mut scripted)
            .analyze(&input, &fixture.outputs, &Token::generate(), "iron")
            .unwrap();

        assert!(!result.report.contains("Could not track"));
        assert!(result.report.contains("🧍 Shoulder Rotation Range: 90.00°"));
        assert!(result.report.contains("🖐 Wrist Arc Vertical Range: 0.100"));
        assert!(result.report.contains("✅ Good Shoulder Turn"));
        assert!(result.report.contains("✅ Good Wrist Extension"));
    }

    #[test]
    fn putter_copies_frames_without_pose_pass() {
        let fixture = Fixture::new();
        let input = fixture.video(60.0, 9);
        let mut scripted = Scripted::default();
        scripted.poses.insert(0, swing_pose(0.0, 0.6));

        let result = Engine::new(FakeBackend, &mut scripted)
            .analyze(&input, &fixture.outputs, &Token::generate(), "putter")
            .unwrap();

        assert!(scripted.seen.is_empty());
        let written = fixture.output(&result);
        assert_eq!(written.len(), 9);
        assert!(written.iter().all(|&(_, overlays)| overlays == 0));
        assert!(result.report.contains(Club::Putter.profile().tip(Fault::Putting).unwrap()));
        assert!(!result.report.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn unreadable_input_produces_no_artifact() {
        let fixture = Fixture::new();
        let missing = fixture.dir.path().join("missing.mp4");
        let token = Token::generate();

        let result = Engine::new(FakeBackend, Absent)
            .analyze(&missing, &fixture.outputs, &token, "driver")
            .unwrap();

        assert_eq!(
            result,
            AnalysisResult {
                report: report::UNREADABLE.to_owned(),
                output_file: None,
            }
        );
        assert!(mp4_files(fixture.outputs.root()).is_empty());
        assert!(!fixture.outputs.staging_path(&token).exists());
    }

    /// Opens sources like `FakeBackend` but its sinks refuse every frame.
    struct BrokenSink;

    impl FrameSink<FakeFrame> for BrokenSink {
        fn write(&mut self, frame: &FakeFrame) -> Result<(), Error> {
            Err(Error::WriteFrame(frame.index))
        }

        fn finish(self) -> Result<(), Error> {
            Ok(())
        }
    }

    struct BrokenBackend;

    impl VideoBackend for BrokenBackend {
        type Frame = FakeFrame;
        type Source = FakeSource;
        type Sink = BrokenSink;

        fn open_source(&self, path: &Path) -> Result<FakeSource, Error> {
            FakeBackend.open_source(path)
        }

        fn open_sink(&self, path: &Path, info: &VideoInfo) -> Result<BrokenSink, Error> {
            // Leave a partial file behind, as a real encoder would.
            let sink: FakeSink = FakeBackend.open_sink(path, info)?;
            sink.finish()?;
            Ok(BrokenSink)
        }
    }

    #[test]
    fn encode_failure_discards_staged_output() {
        let fixture = Fixture::new();
        let input = fixture.video(24.0, 3);
        let token = Token::generate();

        let result = Engine::new(BrokenBackend, Absent).analyze(
            &input,
            &fixture.outputs,
            &token,
            "iron",
        );

        assert!(matches!(result, Err(Error::WriteFrame(0))));
        assert!(!fixture.outputs.staging_path(&token).exists());
        assert!(mp4_files(fixture.outputs.root()).is_empty());
    }

    #[test]
    fn sequential_uploads_leave_one_artifact_per_folder() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::open(dir.path().join("uploads"), dir.path().join("static"), 1)
            .unwrap();
        let upload = dir.path().join("swing.mp4");
        fake::write_video(&upload, 30.0, 4);
        let mut engine = Engine::new(FakeBackend, Absent);

        let mut last = None;
        for club in &["driver", "iron", "wedge", "putter", "hybrid"] {
            let result = engine.handle_upload(&upload, &workspace, club).unwrap();
            last = result.output_file;
        }

        let last = last.unwrap();
        assert_eq!(mp4_files(workspace.outputs.root()), vec![last.clone()]);

        let uploads = mp4_files(workspace.uploads.root());
        assert_eq!(uploads.len(), 1);
        let token = last
            .strip_prefix("annotated_swing_")
            .and_then(|rest| rest.strip_suffix(".mp4"))
            .unwrap();
        assert_eq!(uploads[0], format!("user_video_{}.mp4", token));
    }

    /// Records whether `path` exists each time it is asked for a pose.
    struct Watch {
        path: PathBuf,
        existed: Vec<bool>,
    }

    impl<F> PoseEstimator<F> for Watch {
        fn detect(&mut self, _frame_index: usize, _frame: &F) -> Result<Option<Pose>, Error> {
            self.existed.push(self.path.exists());
            Ok(None)
        }
    }

    #[test]
    fn older_uploads_outlive_the_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::open(dir.path().join("uploads"), dir.path().join("static"), 1)
            .unwrap();
        let upload = dir.path().join("swing.mp4");
        fake::write_video(&upload, 24.0, 2);
        let older = workspace.uploads.ingest(&upload, &Token::generate()).unwrap();

        let mut watch = Watch {
            path: older.clone(),
            existed: Vec::new(),
        };
        Engine::new(FakeBackend, &mut watch)
            .handle_upload(&upload, &workspace, "iron")
            .unwrap();

        assert_eq!(watch.existed, vec![true, true]);
        assert!(!older.exists());
        assert_eq!(mp4_files(workspace.uploads.root()).len(), 1);
    }
}
