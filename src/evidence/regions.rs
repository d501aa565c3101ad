//! Areas of interest in natural media coordinates.

use crate::geometry::BoundingBox;
use crate::model::{lenient, region, BackendEvidence, FaceFeatures, FrameResult, RawMetrics};
use crate::palette::{Severity, AMBER, BLUE, RED};
use crate::percent::number_from_value;
use serde::Serialize;
use serde_json::Value;

pub const FACE_REGION: &str = "face-region";
pub const BORDER_ARTIFACTS: &str = "border-artifacts";
pub const EDGE_ARTIFACTS: &str = "edge-artifacts";
pub const LIGHTING_ARTIFACTS: &str = "lighting-artifacts";
pub const TEXTURE_ARTIFACTS: &str = "texture-artifacts";
pub const FORENSIC_ANOMALY: &str = "forensic-anomaly";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    #[serde(flatten)]
    pub bounds: BoundingBox,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl Region {
    pub fn new(bounds: BoundingBox, kind: &str, color: &str, description: &str) -> Self {
        Self {
            bounds,
            kind: kind.to_string(),
            color: color.to_string(),
            description: description.to_string(),
            score: None,
            confidence: None,
            severity: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Artifact-like regions (border/edge/lighting/texture) as opposed to faces.
    pub fn is_artifact(&self) -> bool {
        ["artifact", "border", "edge"]
            .iter()
            .any(|needle| self.kind.contains(needle))
    }

    /// Read a backend region entry.
    ///
    /// Coordinates may sit under `coordinates` or on the entry itself. Entries
    /// without a usable horizontal coordinate are dropped. The backend's own
    /// `type`, `color` and `description` win over the defaults given here.
    pub fn from_backend(entry: &Value, kind: &str, color: &str) -> Option<Region> {
        let bounds = entry
            .get("coordinates")
            .and_then(lenient::bounding_box)
            .or_else(|| lenient::bounding_box(entry))?;

        let text = |key: &str| entry.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
        let score = entry.get("score").and_then(number_from_value);

        Some(Region {
            bounds,
            kind: text("type").unwrap_or(kind).to_string(),
            color: text("color").unwrap_or(color).to_string(),
            description: text("description").unwrap_or_default().to_string(),
            score,
            confidence: entry.get("confidence").and_then(number_from_value),
            severity: score.map(Severity::from_region_score),
        })
    }
}

pub(crate) fn from_backend_list(entries: &[Value], kind: &str, color: &str) -> Vec<Region> {
    entries
        .iter()
        .filter_map(|e| Region::from_backend(e, kind, color))
        .collect()
}

fn face_region(bounds: BoundingBox, confidence: f64) -> Region {
    Region {
        confidence: Some(confidence),
        ..Region::new(bounds, FACE_REGION, BLUE, "Detected Face Region")
    }
}

/// Face box plus border and edge artifact regions from a backend block.
pub fn backend_regions(evidence: &BackendEvidence) -> Vec<Region> {
    let mut regions = Vec::new();

    if let Some(fd) = &evidence.face_detection {
        if let Some(bounds) = fd.bounding_box {
            regions.push(face_region(bounds, fd.confidence));
        }
    }
    regions.extend(from_backend_list(&evidence.artifacts.border_regions, BORDER_ARTIFACTS, RED));
    regions.extend(from_backend_list(&evidence.artifacts.edge_regions, EDGE_ARTIFACTS, AMBER));

    regions
}

/// First rectangle found under any of `keys`.
pub(crate) fn first_region(raw: &RawMetrics, keys: &[&str]) -> Option<BoundingBox> {
    keys.iter().find_map(|k| region(raw, k))
}

/// Regions for an image from raw face features.
pub fn image_regions(features: &FaceFeatures) -> Vec<Region> {
    let mut regions = Vec::new();
    let artifacts = &features.artifact_analysis;

    if let Some(bounds) = features.face_region {
        regions.push(face_region(bounds, features.face_confidence.unwrap_or(0.0)));
    }
    if let Some(bounds) = region(&artifacts.border_analysis, "border_region") {
        regions.push(
            Region::new(bounds, BORDER_ARTIFACTS, RED, "Border Artifacts Detected")
                .with_severity(Severity::High),
        );
    }
    if let Some(bounds) = region(&artifacts.edge_analysis, "problematic_regions") {
        regions.push(
            Region::new(bounds, EDGE_ARTIFACTS, AMBER, "Edge Inconsistencies")
                .with_severity(Severity::Medium),
        );
    }

    regions
}

/// Face boxes of the first `limit` suspicious frames, scored by `1 - confidence`.
pub fn video_regions(suspicious: &[&FrameResult], limit: usize) -> Vec<Region> {
    suspicious
        .iter()
        .take(limit)
        .filter_map(|frame| {
            let bounds = frame.face_detection.as_ref()?.bounding_box?;
            let description = format!("Frame #{} flagged as {}", frame.frame_number, frame.prediction);
            Some(Region::new(bounds, BORDER_ARTIFACTS, RED, &description).with_score(1.0 - frame.confidence))
        })
        .collect()
}
