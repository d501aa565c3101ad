//! Temporal consistency of per-frame predictions
//!
//! A genuine video tends to get the same verdict, with similar confidence,
//! frame after frame. Manipulated footage often "flaps": the detector flips
//! between REAL and FAKE and its confidence jumps around. The consistency
//! score condenses that into one number in `[0, 1]`.
//!
//! # Scoring
//!
//! For per-frame confidences `c_1..c_n`:
//!
//! ```text
//! variancePenalty = min(1, 4 * variance(c))
//! changePenalty   = suddenChanges / n      (|c_i - c_{i-1}| > 0.2)
//! swapPenalty     = predictionSwaps / n    (label differs from previous frame)
//! score           = clamp(1 - (variancePenalty + changePenalty + swapPenalty), 0, 1)
//! ```
//!
//! Each term is bounded so a single outlier frame cannot zero the score on its
//! own. The score and the reported statistics are rounded to 3 decimals.

use super::frames::is_suspicious;
use super::DeriveOptions;
use crate::model::{lenient, FrameResult};
use crate::percent::round3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionAnalysis {
    #[serde(deserialize_with = "lenient::number")]
    pub average_confidence: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub confidence_variance: f64,
    #[serde(deserialize_with = "lenient::count")]
    pub sudden_changes: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub prediction_swaps: u64,
    /// Share of suspicious frames
    #[serde(deserialize_with = "lenient::number")]
    pub fake_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalAnalysis {
    #[serde(deserialize_with = "lenient::number")]
    pub consistency_score: f64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub motion_analysis: MotionAnalysis,
}

impl TemporalAnalysis {
    pub fn label(&self) -> &'static str {
        if self.consistency_score > 0.7 {
            "Consistent"
        } else if self.consistency_score > 0.4 {
            "Moderate"
        } else {
            "Inconsistent"
        }
    }
}

/// Derive temporal statistics from raw frame results.
///
/// An empty frame list yields a zero score and zeroed statistics.
pub fn analyze(frames: &[FrameResult], options: &DeriveOptions) -> TemporalAnalysis {
    if frames.is_empty() {
        return TemporalAnalysis::default();
    }

    let n = frames.len() as f64;
    let mean = frames.iter().map(|f| f.confidence).sum::<f64>() / n;
    let variance = frames
        .iter()
        .map(|f| (f.confidence - mean).powi(2))
        .sum::<f64>()
        / n;

    let sudden_changes = frames
        .windows(2)
        .filter(|w| (w[1].confidence - w[0].confidence).abs() > options.sudden_change)
        .count();
    let prediction_swaps = frames
        .windows(2)
        .filter(|w| w[1].prediction != w[0].prediction)
        .count();
    let suspicious = frames
        .iter()
        .filter(|f| is_suspicious(f, options.suspicious_confidence))
        .count();

    let variance_penalty = (variance * 4.0).min(1.0);
    let change_penalty = sudden_changes as f64 / n;
    let swap_penalty = prediction_swaps as f64 / n;
    let score = (1.0 - (variance_penalty + change_penalty + swap_penalty)).clamp(0.0, 1.0);

    TemporalAnalysis {
        consistency_score: round3(score),
        motion_analysis: MotionAnalysis {
            average_confidence: round3(mean),
            confidence_variance: round3(variance),
            sudden_changes: sudden_changes as u64,
            prediction_swaps: prediction_swaps as u64,
            fake_ratio: round3(suspicious as f64 / n),
        },
    }
}
