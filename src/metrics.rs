//! Per-frame reduction of a pose to the three swing features, and the time
//! series they accumulate into.

use crate::pose::{KeypointKind, Pose};
use ordered_float::NotNan;

/// Features of one analyzed frame. A feature is `None` when the estimator did
/// not report the landmarks it needs.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameMetrics {
    /// Angle of the line from right to left shoulder, in signed degrees.
    pub shoulder_angle: Option<f64>,
    /// Mean normalized height of both wrists.
    pub wrist_height: Option<f64>,
    /// Absolute normalized height difference between the shoulders.
    pub shoulder_imbalance: Option<f64>,
}

/// Reduce every landmark the estimator reported, whatever its score.
pub fn reduce(pose: &Pose) -> FrameMetrics {
    let point = |kind| pose.get(kind).map(|keypoint| keypoint.point);
    let shoulders = point(KeypointKind::LeftShoulder).zip(point(KeypointKind::RightShoulder));
    let wrists = point(KeypointKind::LeftWrist).zip(point(KeypointKind::RightWrist));

    FrameMetrics {
        shoulder_angle: shoulders.map(|(left, right)| {
            let dx = f64::from(left.x()) - f64::from(right.x());
            let dy = f64::from(left.y()) - f64::from(right.y());
            dy.atan2(dx).to_degrees()
        }),
        wrist_height: wrists.map(|(left, right)| (f64::from(left.y()) + f64::from(right.y())) / 2.0),
        shoulder_imbalance: shoulders
            .map(|(left, right)| (f64::from(left.y()) - f64::from(right.y())).abs()),
    }
}

/// Ordered values of one feature, one per frame that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    values: Vec<NotNan<f64>>,
}

impl MetricSeries {
    /// Append `value`, ignoring NaN.
    pub fn push(&mut self, value: f64) {
        if let Ok(value) = NotNan::new(value) {
            self.values.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `max - min`, or `None` for an empty series.
    pub fn range(&self) -> Option<f64> {
        let max = self.values.iter().max()?;
        let min = self.values.iter().min()?;
        Some(max.into_inner() - min.into_inner())
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let sum = self.values.iter().map(|v| v.into_inner()).sum::<f64>();
        Some(sum / self.values.len() as f64)
    }
}

impl FromIterator<f64> for MetricSeries {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut series = Self::default();
        iter.into_iter().for_each(|value| series.push(value));
        series
    }
}

/// The three series gathered over one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwingSeries {
    pub shoulder_angle: MetricSeries,
    pub wrist_height: MetricSeries,
    pub shoulder_imbalance: MetricSeries,
}

impl SwingSeries {
    pub fn record(&mut self, metrics: &FrameMetrics) {
        if let Some(angle) = metrics.shoulder_angle {
            self.shoulder_angle.push(angle);
        }
        if let Some(height) = metrics.wrist_height {
            self.wrist_height.push(height);
        }
        if let Some(imbalance) = metrics.shoulder_imbalance {
            self.shoulder_imbalance.push(imbalance);
        }
    }
}
