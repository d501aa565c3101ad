//! Passthrough of backend-precomputed `visual_evidence`.
//!
//! The backend already did the work, so nothing is recomputed here: fields are
//! mapped into the bundle shape and absent ones fall back to defaults.

use super::regions::{
    backend_regions, from_backend_list, BORDER_ARTIFACTS, EDGE_ARTIFACTS, FACE_REGION, FORENSIC_ANOMALY,
    LIGHTING_ARTIFACTS, TEXTURE_ARTIFACTS,
};
use super::{AnomalyScore, Artifacts, EvidenceBundle, Forensic, Heatmap, SpatialAnalysis};
use crate::model::BackendEvidence;
use crate::palette::{AMBER, BLUE, RED};
use crate::percent::number_from_value;
use serde_json::Value;
use std::collections::BTreeMap;

pub(crate) fn bundle_from_backend(evidence: &BackendEvidence) -> EvidenceBundle {
    let artifacts = &evidence.artifacts;
    let spatial = evidence.spatial_analysis.clone().unwrap_or_default();

    EvidenceBundle {
        face_detection: evidence.face_detection.clone().unwrap_or_default(),
        artifacts: Artifacts {
            border_regions: from_backend_list(&artifacts.border_regions, BORDER_ARTIFACTS, RED),
            edge_regions: from_backend_list(&artifacts.edge_regions, EDGE_ARTIFACTS, AMBER),
            lighting_regions: from_backend_list(&artifacts.lighting_regions, LIGHTING_ARTIFACTS, AMBER),
            texture_regions: from_backend_list(&artifacts.texture_regions, TEXTURE_ARTIFACTS, AMBER),
            scores: BTreeMap::new(),
        },
        forensic: Forensic {
            anomaly_scores: anomaly_scores(&evidence.forensic_analysis.anomaly_scores),
            problematic_regions: from_backend_list(
                &evidence.forensic_analysis.problematic_regions,
                FORENSIC_ANOMALY,
                RED,
            ),
        },
        frame_analysis: evidence.frame_analysis.clone().unwrap_or_default(),
        temporal_analysis: evidence.temporal_analysis.clone().unwrap_or_default(),
        spatial_analysis: SpatialAnalysis {
            face_regions: from_backend_list(&spatial.face_regions, FACE_REGION, BLUE),
            artifact_regions: from_backend_list(&spatial.artifact_regions, BORDER_ARTIFACTS, RED),
            problematic_frames: spatial.problematic_frames,
        },
        heatmaps: evidence
            .heatmaps
            .iter()
            .cloned()
            .map(Heatmap::with_color_filled)
            .collect(),
        regions: backend_regions(evidence),
        image_data: evidence.image_data.clone(),
    }
}

/// `{"lighting": {"score": 0.4, "description": ".."}}` or bare numbers.
fn anomaly_scores(raw: &BTreeMap<String, Value>) -> BTreeMap<String, AnomalyScore> {
    raw.iter()
        .filter_map(|(key, value)| {
            let score = match value {
                Value::Object(obj) => AnomalyScore {
                    score: obj.get("score").and_then(number_from_value)?,
                    confidence: obj.get("confidence").and_then(number_from_value),
                    description: obj
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                },
                other => AnomalyScore {
                    score: number_from_value(other)?,
                    confidence: None,
                    description: String::new(),
                },
            };
            Some((key.clone(), score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use serde_json::json;

    fn backend(value: Value) -> BackendEvidence {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_block_is_all_defaults() {
        let bundle = bundle_from_backend(&BackendEvidence::default());
        assert!(!bundle.face_detection.detected);
        assert!(bundle.heatmaps.is_empty());
        assert!(bundle.regions.is_empty());
        assert_eq!(bundle.temporal_analysis.consistency_score, 0.0);
        assert!(bundle.image_data.is_none());
    }

    #[test]
    fn test_anomaly_scores_accept_both_shapes() {
        let ev = backend(json!({
            "forensic_analysis": {
                "anomaly_scores": {
                    "lighting": {"score": 0.42, "description": "Lighting consistency analysis"},
                    "skin": 0.81,
                    "noise": {"description": "no score"},
                    "edge": "n/a"
                }
            }
        }));
        let bundle = bundle_from_backend(&ev);
        let scores = &bundle.forensic.anomaly_scores;
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["lighting"].score, 0.42);
        assert_eq!(scores["lighting"].description, "Lighting consistency analysis");
        assert_eq!(scores["skin"].score, 0.81);
    }

    #[test]
    fn test_regions_include_face_and_artifacts() {
        let ev = backend(json!({
            "face_detection": {"detected": true, "confidence": 0.97,
                               "bounding_box": {"x": 50, "y": 40, "width": 100, "height": 120}},
            "artifacts": {
                "border_regions": [{"coordinates": {"x": 45, "y": 35, "width": 110, "height": 130}, "score": 0.8, "description": "Border"}],
                "edge_regions": [{"description": "missing coordinates"}],
                "texture_regions": [{"coordinates": {"x": 60, "y": 60, "width": 10, "height": 10}}]
            },
            "image_data": "data:image/jpeg;base64,AAAA"
        }));
        let bundle = bundle_from_backend(&ev);

        assert_eq!(bundle.regions.len(), 2);
        assert_eq!(bundle.regions[0].kind, FACE_REGION);
        assert_eq!(bundle.regions[0].bounds, BoundingBox::new(50.0, 40.0, 100.0, 120.0));
        assert_eq!(bundle.regions[1].kind, BORDER_ARTIFACTS);
        assert_eq!(bundle.artifacts.edge_regions.len(), 0);
        assert_eq!(bundle.artifacts.texture_regions.len(), 1);
        assert_eq!(bundle.image_data.as_deref(), Some("data:image/jpeg;base64,AAAA"));
    }
}
