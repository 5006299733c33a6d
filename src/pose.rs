use crate::error::Error;
use num_traits::{FromPrimitive, ToPrimitive};
use ordered_float::NotNan;
use std::str::FromStr;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::KeypointVariantToUSize(self))
    }

    /// Iterate over every keypoint kind in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..NUM_KEYPOINTS).filter_map(Self::from_usize)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl FromStr for KeypointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown landmark name: {}", s))
    }
}

/// A point in normalized image coordinates, guaranteed not to be NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::ConstructNotNan(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::ConstructNotNan(e, y))?
                .into_inner(),
        })
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.y
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Keypoint {
    pub point: Point,
    pub score: f32,
}

/// One detected skeleton. Keypoints the detector did not report are `None`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Pose {
    keypoints: [Option<Keypoint>; NUM_KEYPOINTS],
}

impl Pose {
    pub fn set(&mut self, kind: KeypointKind, x: f32, y: f32, score: f32) -> Result<(), Error> {
        let point = Point::new(x, y)?;
        self.keypoints[kind.idx()?] = Some(Keypoint { point, score });
        Ok(())
    }

    pub fn get(&self, kind: KeypointKind) -> Option<Keypoint> {
        kind.idx()
            .ok()
            .and_then(|index| self.keypoints.get(index).copied().flatten())
    }

    /// The keypoint of `kind` if it was reported with at least `min_score`.
    pub fn visible(&self, kind: KeypointKind, min_score: f32) -> Option<Point> {
        self.get(kind)
            .filter(|keypoint| keypoint.score >= min_score)
            .map(|keypoint| keypoint.point)
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.iter().all(Option::is_none)
    }
}

#[cfg(feature = "video")]
pub mod constants {
    use crate::pose::KeypointKind::{self, *};

    pub const KEYPOINT_EDGES: [(KeypointKind, KeypointKind); 19] = [
        (Nose, LeftEye),
        (Nose, RightEye),
        (Nose, LeftEar),
        (Nose, RightEar),
        (LeftEar, LeftEye),
        (RightEar, RightEye),
        (LeftEye, RightEye),
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightElbow),
        (RightShoulder, RightHip),
        (LeftElbow, LeftWrist),
        (RightElbow, RightWrist),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
    ];
}
