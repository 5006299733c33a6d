//! Landmarks precomputed by an external detector, one JSON object per line:
//!
//! ```text
//! {"frame": 0, "landmarks": {"left_shoulder": [0.61, 0.42, 0.98], ...}}
//! {"frame": 2, "landmarks": null}
//! ```

use crate::{
    error::Error,
    estimator::PoseEstimator,
    pose::{KeypointKind, Pose},
};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

#[derive(Debug, Deserialize)]
struct Line {
    frame: usize,
    #[serde(default)]
    landmarks: Option<BTreeMap<String, [f32; 3]>>,
}

#[derive(Debug, Default)]
pub struct LandmarkTrack {
    poses: HashMap<usize, Pose>,
}

impl LandmarkTrack {
    pub fn open<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::ReadLandmarks(e, path.to_owned()))?;
        let track = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            Error::ReadLandmarks(source, _) => Error::ReadLandmarks(source, path.to_owned()),
            other => other,
        })?;
        debug!(
            message = "loaded landmark track",
            path = %path.display(),
            frames = track.len()
        );
        Ok(track)
    }

    pub fn from_reader<R>(reader: R) -> Result<Self, Error>
    where
        R: BufRead,
    {
        let mut poses = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| Error::ReadLandmarks(e, PathBuf::new()))?;
            if line.trim().is_empty() {
                continue;
            }

            let Line { frame, landmarks } =
                serde_json::from_str(&line).map_err(|e| Error::ParseLandmarks(e, line_no))?;

            let mut pose = Pose::default();
            for (name, [x, y, score]) in landmarks.into_iter().flatten() {
                match name.parse::<KeypointKind>() {
                    Ok(kind) => pose
                        .set(kind, x, y, score)
                        .map_err(|e| Error::InvalidLandmark(Box::new(e), line_no))?,
                    Err(reason) => trace!(message = "skipping landmark", %reason, line = line_no),
                }
            }

            if pose.is_empty() {
                poses.remove(&frame);
            } else {
                poses.insert(frame, pose);
            }
        }

        Ok(Self { poses })
    }

    /// Number of frames with a detected pose.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl<F> PoseEstimator<F> for LandmarkTrack {
    fn detect(&mut self, frame_index: usize, _frame: &F) -> Result<Option<Pose>, Error> {
        Ok(self.poses.get(&frame_index).copied())
    }
}
