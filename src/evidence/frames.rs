//! Suspicious-frame selection and frame image extraction
//!
//! Extraction is the one boundary operation with side effects: the host seeks
//! its video element to each frame's timestamp, waits for the seek to finish
//! and captures the picture. It runs strictly one frame at a time, is capped at
//! [`MAX_EXTRACTED_FRAMES`], and can be aborted by the host on teardown.

use crate::model::{FrameResult, Prediction};
use crate::percent::format_percentage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on frames captured for one video.
pub const MAX_EXTRACTED_FRAMES: usize = 20;

/// Artifact and forensic scores under this value are called out as reasons.
const REASON_SCORE_FLOOR: f64 = 0.7;

/// A frame is suspicious when it was labeled FAKE or the detector was unsure.
pub fn is_suspicious(frame: &FrameResult, min_confidence: f64) -> bool {
    frame.prediction == Prediction::Fake || frame.confidence < min_confidence
}

pub fn suspicious(frames: &[FrameResult], min_confidence: f64) -> Vec<&FrameResult> {
    frames
        .iter()
        .filter(|f| is_suspicious(f, min_confidence))
        .collect()
}

/// Human-readable reasons a frame was flagged.
pub fn suspicious_reasons(frame: &FrameResult, min_confidence: f64) -> Vec<String> {
    let mut reasons = Vec::new();

    if frame.prediction == Prediction::Fake {
        reasons.push("Predicted as fake".to_string());
    }
    if frame.confidence < min_confidence {
        reasons.push(format!(
            "Low confidence ({}%)",
            format_percentage(Some(frame.confidence), 1)
        ));
    }

    let artifact_checks = [
        ("border_quality", "Poor border quality"),
        ("edge_uniformity", "Inconsistent edges"),
        ("lighting_consistency", "Inconsistent lighting"),
    ];
    for (key, reason) in artifact_checks {
        if frame.artifacts.get(key).is_some_and(|s| *s < REASON_SCORE_FLOOR) {
            reasons.push(reason.to_string());
        }
    }

    for (key, score) in &frame.forensic_analysis {
        if *score < REASON_SCORE_FLOOR {
            reasons.push(format!("{} anomaly", key.replace('_', " ")));
        }
    }

    if reasons.is_empty() {
        reasons.push("No specific issues detected".to_string());
    }
    reasons
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("seek to {timestamp:.3}s failed: {reason}")]
    Seek { timestamp: f64, reason: String },

    #[error("capture failed: {0}")]
    Capture(String),
}

/// Host-side video access.
///
/// `seek` must not return until the host's "seek completed" signal fired.
pub trait FrameSource {
    type Image;

    fn seek(&mut self, timestamp: f64) -> Result<(), FrameError>;

    fn capture(&mut self) -> Result<Self::Image, FrameError>;
}

#[derive(Debug, Clone)]
pub struct ExtractedFrame<I> {
    /// Position in the requested frame list
    pub index: usize,
    pub frame: FrameResult,
    pub image: I,
}

/// Shared abort flag, set by the host when the viewer is torn down.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Capture images for up to [`MAX_EXTRACTED_FRAMES`] frames, in order.
///
/// Frames without a timestamp are skipped. A seek or capture failure is
/// logged and ends the run; whatever was captured before it is returned.
pub fn extract_frames<'a, S, I>(
    source: &mut S,
    frames: I,
    cancel: &CancelToken,
) -> Vec<ExtractedFrame<S::Image>>
where
    S: FrameSource,
    I: IntoIterator<Item = &'a FrameResult>,
{
    let mut extracted = Vec::new();

    for (index, frame) in frames.into_iter().take(MAX_EXTRACTED_FRAMES).enumerate() {
        if cancel.is_cancelled() {
            debug!(captured = extracted.len(), "frame extraction cancelled");
            break;
        }
        let Some(timestamp) = frame.timestamp else {
            continue;
        };

        let image = match source.seek(timestamp).and_then(|()| source.capture()) {
            Ok(image) => image,
            Err(e) => {
                warn!(frame = frame.frame_number, error = %e, "error extracting frames");
                break;
            }
        };

        extracted.push(ExtractedFrame {
            index,
            frame: frame.clone(),
            image,
        });
    }

    debug!(count = extracted.len(), "extracted frames");
    extracted
}
