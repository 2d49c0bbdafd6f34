//! Session pacing: step position -> named phase -> allowed intensity band.

use std::fmt;

use contracts::Rating;
use serde::{Deserialize, Serialize};

const WARMUP_SHARE: f64 = 0.20;
const BUILD_SHARE_END: f64 = 0.60;
const PEAK_SHARE_END: f64 = 0.88;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Warmup,
    Build,
    Peak,
    Afterglow,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Warmup, Phase::Build, Phase::Peak, Phase::Afterglow];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Warmup => "warmup",
            Phase::Build => "build",
            Phase::Peak => "peak",
            Phase::Afterglow => "afterglow",
        }
    }

    /// Intensity band for this phase at a given rating tier.
    pub fn band(self, rating: Rating) -> IntensityBand {
        let (min, max) = match (rating, self) {
            (Rating::G, _) => (1, 1),
            (Rating::R, Phase::Warmup) => (1, 2),
            (Rating::R, Phase::Build) => (2, 3),
            (Rating::R, Phase::Peak) => (3, 3),
            (Rating::R, Phase::Afterglow) => (2, 3),
            (Rating::X, Phase::Warmup) => (2, 3),
            (Rating::X, Phase::Build) => (3, 4),
            (Rating::X, Phase::Peak) => (4, 5),
            (Rating::X, Phase::Afterglow) => (2, 3),
        };
        IntensityBand { min, max }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive intensity range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntensityBand {
    pub min: u8,
    pub max: u8,
}

impl IntensityBand {
    pub fn contains(&self, intensity: u8) -> bool {
        (self.min..=self.max).contains(&intensity)
    }
}

impl fmt::Display for IntensityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Phase boundaries for one session length. Each boundary is the last step
/// of its phase; all are floored so consecutive phases share no step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSchedule {
    total_steps: u32,
    warmup_end: u32,
    build_end: u32,
    peak_end: u32,
}

impl PhaseSchedule {
    pub fn new(total_steps: u32) -> Self {
        let total_steps = total_steps.max(1);
        let at = |share: f64| (f64::from(total_steps) * share).floor() as u32;
        Self {
            total_steps,
            warmup_end: at(WARMUP_SHARE),
            build_end: at(BUILD_SHARE_END),
            peak_end: at(PEAK_SHARE_END),
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Phase for a 1-based step. Steps past the end wrap around.
    pub fn phase_at(&self, step: u32) -> Phase {
        let step = self.effective_step(step);
        if step <= self.warmup_end {
            Phase::Warmup
        } else if step <= self.build_end {
            Phase::Build
        } else if step <= self.peak_end {
            Phase::Peak
        } else {
            Phase::Afterglow
        }
    }

    pub fn band_at(&self, step: u32, rating: Rating) -> IntensityBand {
        self.phase_at(step).band(rating)
    }

    /// Last step of the warmup phase; zero when the session is too short to have one.
    pub fn warmup_end(&self) -> u32 {
        self.warmup_end
    }

    /// Inclusive step range covered by a phase, or `None` when it is empty.
    pub fn span(&self, phase: Phase) -> Option<(u32, u32)> {
        let (start, end) = match phase {
            Phase::Warmup => (1, self.warmup_end),
            Phase::Build => (self.warmup_end + 1, self.build_end),
            Phase::Peak => (self.build_end + 1, self.peak_end),
            Phase::Afterglow => (self.peak_end + 1, self.total_steps),
        };
        (start <= end).then_some((start, end))
    }

    pub fn effective_step(&self, step: u32) -> u32 {
        (step.max(1) - 1) % self.total_steps + 1
    }
}
