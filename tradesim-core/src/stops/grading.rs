//! Grading — how much of the path's best move a stop captured.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Below this range a path is treated as flat and capture is 0.
const FLAT_RANGE_EPSILON: f64 = 1e-9;

/// Letter grade for a stop policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    /// Bottom of the scale. The capture heuristic grades losses `D` and never
    /// emits `F`.
    #[serde(rename = "F")]
    F,
    /// The stop never triggered, so the trade is still open.
    #[serde(rename = "in_progress")]
    InProgress,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
            Grade::InProgress => "In Progress",
        }
    }

    /// Position on the letter scale (`F` = 0 … `A+` = 7); `None` for `InProgress`.
    pub fn rank(self) -> Option<u8> {
        match self {
            Grade::F => Some(0),
            Grade::D => Some(1),
            Grade::CMinus => Some(2),
            Grade::C => Some(3),
            Grade::B => Some(4),
            Grade::BPlus => Some(5),
            Grade::A => Some(6),
            Grade::APlus => Some(7),
            Grade::InProgress => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capture-ratio cutoffs. A ratio must be strictly above a cutoff to earn it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    pub a_plus: f64,
    pub a: f64,
    pub b_plus: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            a_plus: 0.8,
            a: 0.7,
            b_plus: 0.6,
            b: 0.5,
            c: 0.3,
        }
    }
}

impl GradeThresholds {
    /// Letter for a realised profit and capture ratio. Losses grade `D`.
    pub fn letter(&self, profit: f64, capture_ratio: f64) -> Grade {
        if profit < 0.0 {
            Grade::D
        } else if capture_ratio > self.a_plus {
            Grade::APlus
        } else if capture_ratio > self.a {
            Grade::A
        } else if capture_ratio > self.b_plus {
            Grade::BPlus
        } else if capture_ratio > self.b {
            Grade::B
        } else if capture_ratio > self.c {
            Grade::C
        } else {
            Grade::CMinus
        }
    }
}

/// `profit / (max_price - entry_price)`, or 0 when the path never rose above entry.
pub fn capture_ratio(profit: f64, entry_price: f64, max_price: f64) -> f64 {
    let range = max_price - entry_price;
    if !range.is_finite() || range <= FLAT_RANGE_EPSILON || !profit.is_finite() {
        return 0.0;
    }
    profit / range
}
