use crate::{
    club::{ClubProfile, Fault},
    metrics::SwingSeries,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dimension {
    ShoulderRotation,
    WristArc,
    ShoulderBalance,
}

impl Dimension {
    pub fn fault_label(self) -> &'static str {
        match self {
            Self::ShoulderRotation => "Limited Shoulder Rotation",
            Self::WristArc => "Compact Wrist Arc",
            Self::ShoulderBalance => "Excessive Shoulder Tilt",
        }
    }

    pub fn pass_label(self) -> &'static str {
        match self {
            Self::ShoulderRotation => "Good Shoulder Turn",
            Self::WristArc => "Good Wrist Extension",
            Self::ShoulderBalance => "Balanced Shoulder Plane",
        }
    }

    fn fault(self) -> Fault {
        match self {
            Self::ShoulderRotation => Fault::ShoulderRotation,
            Self::WristArc => Fault::WristArc,
            Self::ShoulderBalance => Fault::ShoulderLevel,
        }
    }
}

/// PASS/FAULT verdict for one dimension. `advice` is set only on a fault.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub dimension: Dimension,
    pub advice: Option<&'static str>,
}

impl Finding {
    pub fn is_fault(&self) -> bool {
        self.advice.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Tracked {
        dimension: Dimension,
        /// Range for rotation and wrist arc, mean for balance.
        value: f64,
        finding: Finding,
    },
    /// No analyzed frame ever produced this dimension.
    Untracked(Dimension),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Putting is not measured, only advised.
    Putting { tips: Vec<&'static str> },
    Swing { measurements: Vec<Measurement> },
}

impl Evaluation {
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        let measurements = match self {
            Self::Putting { .. } => &[][..],
            Self::Swing { measurements } => measurements.as_slice(),
        };
        measurements.iter().filter_map(|measurement| match measurement {
            Measurement::Tracked { finding, .. } => Some(finding),
            Measurement::Untracked(_) => None,
        })
    }
}

fn classify(
    profile: &ClubProfile,
    dimension: Dimension,
    value: Option<f64>,
    is_fault: impl FnOnce(f64) -> bool,
) -> Measurement {
    match value {
        None => Measurement::Untracked(dimension),
        Some(value) => Measurement::Tracked {
            dimension,
            value,
            finding: Finding {
                dimension,
                advice: if is_fault(value) {
                    profile.tip(dimension.fault())
                } else {
                    None
                },
            },
        },
    }
}

pub fn evaluate(profile: &ClubProfile, series: &SwingSeries) -> Evaluation {
    if profile.skips_analysis() {
        return Evaluation::Putting {
            tips: profile.tips.iter().map(|&(_, tip)| tip).collect(),
        };
    }

    let measurements = vec![
        classify(
            profile,
            Dimension::ShoulderRotation,
            series.shoulder_angle.range(),
            |range| range < profile.rotation_min,
        ),
        classify(
            profile,
            Dimension::WristArc,
            series.wrist_height.range(),
            |range| range < profile.wrist_arc_min,
        ),
        classify(
            profile,
            Dimension::ShoulderBalance,
            series.shoulder_imbalance.mean(),
            |mean| mean > profile.imbalance_max,
        ),
    ];
    Evaluation::Swing { measurements }
}
