//! Club-specific swing targets and coaching text.

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Club {
    Driver,
    Iron,
    Wedge,
    Putter,
}

/// What a piece of advice addresses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Fault {
    ShoulderRotation,
    WristArc,
    ShoulderLevel,
    Putting,
}

#[derive(Debug, PartialEq)]
pub struct ClubProfile {
    pub club: Club,
    /// Minimum shoulder rotation range, degrees.
    pub rotation_min: f64,
    /// Minimum vertical wrist travel, normalized units.
    pub wrist_arc_min: f64,
    /// Maximum mean shoulder height difference, normalized units.
    pub imbalance_max: f64,
    pub tips: &'static [(Fault, &'static str)],
}

static DRIVER: ClubProfile = ClubProfile {
    club: Club::Driver,
    rotation_min: 85.0,
    wrist_arc_min: 0.1,
    imbalance_max: 0.08,
    tips: &[
        (
            Fault::ShoulderRotation,
            "Your shoulder turn is too shallow — rotate more to generate coil and power.",
        ),
        (
            Fault::WristArc,
            "Wrist arc is compact — work on extending your hands away from your body on the backswing.",
        ),
        (
            Fault::ShoulderLevel,
            "You’re tilting too much laterally — keep your shoulders more level to avoid swaying.",
        ),
    ],
};

static IRON: ClubProfile = ClubProfile {
    club: Club::Iron,
    rotation_min: 75.0,
    wrist_arc_min: 0.07,
    imbalance_max: 0.08,
    tips: &[
        (
            Fault::ShoulderRotation,
            "Lack of shoulder rotation — rotate your lead shoulder under your chin on the backswing.",
        ),
        (
            Fault::WristArc,
            "Wrist arc appears restricted — improve your extension for more consistent ball-striking.",
        ),
        (
            Fault::ShoulderLevel,
            "Uneven shoulders — stay centered and resist collapsing your trail side.",
        ),
    ],
};

static WEDGE: ClubProfile = ClubProfile {
    club: Club::Wedge,
    rotation_min: 60.0,
    wrist_arc_min: 0.04,
    imbalance_max: 0.08,
    tips: &[
        (
            Fault::ShoulderRotation,
            "You’re rotating too little — even with wedges, maintain rotational control for spin.",
        ),
        (
            Fault::WristArc,
            "Wrist motion is too tight — allow soft hinge and controlled unhinge.",
        ),
        (
            Fault::ShoulderLevel,
            "Inconsistent shoulder height — avoid collapsing your upper body during the swing.",
        ),
    ],
};

static PUTTER: ClubProfile = ClubProfile {
    club: Club::Putter,
    rotation_min: 0.0,
    wrist_arc_min: 0.0,
    imbalance_max: 0.0,
    tips: &[(
        Fault::Putting,
        "Maintain a pendulum motion, led by the shoulders — no wrist breakdown.",
    )],
};

impl Club {
    /// Resolve a free-text club name. Anything unrecognized is an iron.
    pub fn resolve(identifier: &str) -> Self {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "driver" => Self::Driver,
            "wedge" => Self::Wedge,
            "putter" => Self::Putter,
            _ => Self::Iron,
        }
    }

    pub fn profile(self) -> &'static ClubProfile {
        match self {
            Self::Driver => &DRIVER,
            Self::Iron => &IRON,
            Self::Wedge => &WEDGE,
            Self::Putter => &PUTTER,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Iron => "iron",
            Self::Wedge => "wedge",
            Self::Putter => "putter",
        }
    }
}

impl fmt::Display for Club {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ClubProfile {
    pub fn tip(&self, fault: Fault) -> Option<&'static str> {
        self.tips
            .iter()
            .find(|&&(kind, _)| kind == fault)
            .map(|&(_, tip)| tip)
    }

    /// Putting skips pose analysis entirely.
    pub fn skips_analysis(&self) -> bool {
        self.club == Club::Putter
    }
}
