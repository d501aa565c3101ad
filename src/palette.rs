//! Traffic-light colors and severity bands shared by heatmaps, regions and overlays.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const GREEN: &str = "#22c55e";
pub const AMBER: &str = "#f59e0b";
pub const RED: &str = "#ef4444";
pub const BLUE: &str = "#3b82f6";
pub const YELLOW: &str = "#eab308";

/// Color for a "higher is better" score: >0.7 green, >0.4 amber, else red.
pub fn score_color(score: f64) -> &'static str {
    if score > 0.7 {
        GREEN
    } else if score > 0.4 {
        AMBER
    } else {
        RED
    }
}

/// Color for a "lower is better" density: <0.2 green, <0.5 amber, else red.
pub fn density_color(density: f64) -> &'static str {
    if density < 0.2 {
        GREEN
    } else if density < 0.5 {
        AMBER
    } else {
        RED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Band for an artifact region score (high score = clean edge/border).
    pub fn from_region_score(score: f64) -> Self {
        if score > 0.7 {
            Severity::Low
        } else if score > 0.4 {
            Severity::Medium
        } else {
            Severity::High
        }
    }

    /// Band for a forensic anomaly score: <0.3 high, <0.5 medium, else low.
    pub fn from_forensic_score(score: f64) -> Self {
        if score < 0.3 {
            Severity::High
        } else if score < 0.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Severity::Low => GREEN,
            Severity::Medium => AMBER,
            Severity::High => RED,
        }
    }

    pub fn risk_label(self) -> &'static str {
        match self {
            Severity::Low => "LOW RISK",
            Severity::Medium => "MEDIUM RISK",
            Severity::High => "HIGH RISK",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}
