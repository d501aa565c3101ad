//! Evidence derivation
//!
//! Turns one backend [`AnalysisResult`] into an [`EvidenceBundle`]: the fully
//! populated structure every overlay and report reads from.
//!
//! # Two paths
//!
//! 1. **Passthrough**: the backend sent a `visual_evidence` block. It is
//!    trusted and mapped field by field; nothing is recomputed.
//! 2. **Fallback**: no block. The bundle is derived from raw data:
//!    - video: temporal consistency, three summary heatmaps and artifact
//!      regions from suspicious frames' face boxes
//!    - image (and anything else): face detection, artifact/forensic scores,
//!      quality heatmaps and regions from `details.face_features`
//!
//! # Guarantees
//!
//! Derivation is a pure function of its input. It never fails and never
//! leaves a sub-structure unset: absent data shows up as `0`, `false` or an
//! empty list, so consumers never need to null-check.

pub mod backend;
pub mod frames;
pub mod heatmap;
pub mod regions;
pub mod temporal;

pub use frames::{extract_frames, CancelToken, ExtractedFrame, FrameError, FrameSource};
pub use heatmap::Heatmap;
pub use regions::Region;
pub use temporal::{MotionAnalysis, TemporalAnalysis};

use crate::model::{metric, AnalysisResult, FaceDetection, FaceFeatures, FrameAnalysis, FrameResult, MediaType, Prediction, RawMetrics};
use crate::percent::normalize_percentage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Artifacts {
    pub border_regions: Vec<Region>,
    pub edge_regions: Vec<Region>,
    pub lighting_regions: Vec<Region>,
    pub texture_regions: Vec<Region>,
    /// Named 0-1 quality scores (border_quality, edge_uniformity, ...)
    pub scores: BTreeMap<String, f64>,
}

impl Artifacts {
    /// All artifact regions, border first.
    pub fn all_regions(&self) -> impl Iterator<Item = &Region> {
        self.border_regions
            .iter()
            .chain(&self.edge_regions)
            .chain(&self.lighting_regions)
            .chain(&self.texture_regions)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyScore {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forensic {
    pub anomaly_scores: BTreeMap<String, AnomalyScore>,
    pub problematic_regions: Vec<Region>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpatialAnalysis {
    pub face_regions: Vec<Region>,
    pub artifact_regions: Vec<Region>,
    pub problematic_frames: Vec<FrameResult>,
}

/// Normalized evidence for one analysis result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvidenceBundle {
    pub face_detection: FaceDetection,
    pub artifacts: Artifacts,
    pub forensic: Forensic,
    pub frame_analysis: FrameAnalysis,
    pub temporal_analysis: TemporalAnalysis,
    pub spatial_analysis: SpatialAnalysis,
    pub heatmaps: Vec<Heatmap>,
    pub regions: Vec<Region>,
    /// Base64 copy of the analyzed image, when the backend embedded one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl EvidenceBundle {
    /// Model attention heatmaps that carry an image.
    pub fn gradcam_heatmaps(&self) -> Vec<&Heatmap> {
        self.heatmaps.iter().filter(|h| h.is_gradcam()).collect()
    }
}

/// Tunables for the fallback derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveOptions {
    /// Frames below this confidence count as suspicious
    pub suspicious_confidence: f64,
    /// Frame-to-frame confidence jump counted as "sudden"
    pub sudden_change: f64,
    /// Suspicious frames turned into artifact regions
    pub artifact_region_limit: usize,
    /// Suspicious frames listed under spatial analysis
    pub problematic_frame_limit: usize,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            suspicious_confidence: 0.5,
            sudden_change: 0.2,
            artifact_region_limit: 10,
            problematic_frame_limit: 20,
        }
    }
}

/// Derive a bundle with default options.
pub fn derive(result: &AnalysisResult) -> EvidenceBundle {
    Deriver::new().derive(result)
}

#[derive(Debug, Clone, Default)]
pub struct Deriver {
    pub options: DeriveOptions,
}

impl Deriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: DeriveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_suspicious_confidence(mut self, threshold: f64) -> Self {
        self.options.suspicious_confidence = threshold;
        self
    }

    pub fn derive(&self, result: &AnalysisResult) -> EvidenceBundle {
        if let Some(evidence) = &result.visual_evidence {
            debug!(media = %result.media_type, "using backend visual evidence");
            return backend::bundle_from_backend(evidence);
        }

        debug!(media = %result.media_type, "no backend visual evidence, deriving fallback");
        match result.media_type {
            MediaType::Video => self.derive_video(result.frame_results()),
            _ => self.derive_image(&result.details.face_features),
        }
    }

    fn derive_video(&self, results: &[FrameResult]) -> EvidenceBundle {
        let opts = &self.options;
        let suspicious = frames::suspicious(results, opts.suspicious_confidence);
        let temporal = temporal::analyze(results, opts);
        let heatmaps = heatmap::video_heatmaps(results.len(), suspicious.len(), &temporal);
        let regions = regions::video_regions(&suspicious, opts.artifact_region_limit);

        let face_detection = results
            .iter()
            .find_map(|f| {
                let fd = f.face_detection.as_ref()?;
                let bounds = f.face_box()?;
                Some(FaceDetection {
                    detected: true,
                    confidence: fd.confidence,
                    bounding_box: Some(*bounds),
                })
            })
            .unwrap_or_default();

        EvidenceBundle {
            face_detection,
            artifacts: Artifacts {
                border_regions: regions.clone(),
                ..Default::default()
            },
            forensic: Forensic::default(),
            frame_analysis: FrameAnalysis {
                total_frames: results.len() as u64,
                fake_frames: suspicious.len() as u64,
                real_frames: results.len().saturating_sub(suspicious.len()) as u64,
                frame_results: results.to_vec(),
            },
            temporal_analysis: temporal,
            spatial_analysis: SpatialAnalysis {
                face_regions: Vec::new(),
                artifact_regions: regions.clone(),
                problematic_frames: suspicious
                    .iter()
                    .take(opts.problematic_frame_limit)
                    .map(|f| (*f).clone())
                    .collect(),
            },
            heatmaps,
            regions,
            image_data: None,
        }
    }

    fn derive_image(&self, features: &FaceFeatures) -> EvidenceBundle {
        let artifacts = &features.artifact_analysis;
        let forensic = &features.forensic_analysis;

        let region_for = |raw: &RawMetrics, kind: &str, color: &str, description: &str| {
            regions::first_region(raw, &["region", "problematic_regions"])
                .map(|b| Region::new(b, kind, color, description))
                .into_iter()
                .collect::<Vec<_>>()
        };

        let image_regions = regions::image_regions(features);
        let of_kind = |kind: &str| -> Vec<Region> {
            image_regions.iter().filter(|r| r.kind == kind).cloned().collect()
        };

        EvidenceBundle {
            face_detection: FaceDetection {
                detected: features.face_detected.unwrap_or(features.face_region.is_some()),
                confidence: features.face_confidence.unwrap_or(0.0),
                bounding_box: features.face_region,
            },
            artifacts: Artifacts {
                border_regions: of_kind(regions::BORDER_ARTIFACTS),
                edge_regions: of_kind(regions::EDGE_ARTIFACTS),
                lighting_regions: region_for(
                    &artifacts.lighting_analysis,
                    regions::LIGHTING_ARTIFACTS,
                    crate::palette::AMBER,
                    "Lighting Inconsistencies",
                ),
                texture_regions: region_for(
                    &artifacts.texture_analysis,
                    regions::TEXTURE_ARTIFACTS,
                    crate::palette::AMBER,
                    "Texture Anomalies",
                ),
                scores: artifact_scores(features),
            },
            forensic: Forensic {
                anomaly_scores: forensic_scores(forensic),
                problematic_regions: Vec::new(),
            },
            frame_analysis: FrameAnalysis::default(),
            temporal_analysis: TemporalAnalysis::default(),
            spatial_analysis: SpatialAnalysis {
                face_regions: of_kind(regions::FACE_REGION),
                artifact_regions: image_regions.iter().filter(|r| r.is_artifact()).cloned().collect(),
                problematic_frames: Vec::new(),
            },
            heatmaps: heatmap::image_heatmaps(artifacts, forensic),
            regions: image_regions.clone(),
            image_data: None,
        }
    }

    /// Load a backend JSON file and derive its evidence.
    ///
    /// Unreadable or syntactically invalid files produce a record carrying
    /// the error instead of failing the batch.
    pub fn derive_file<P: AsRef<Path>>(&self, path: P) -> EvidenceRecord {
        let path = path.as_ref();
        let file_path = path.display().to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.clone());

        let parsed = std::fs::read_to_string(path)
            .map_err(crate::Error::from)
            .and_then(|s| AnalysisResult::from_json_str(&s).map_err(crate::Error::from));

        match parsed {
            Ok(result) => {
                let evidence = self.derive(&result);
                EvidenceRecord::new(file_path, file_name, result, evidence)
            }
            Err(e) => {
                warn!(file = %file_path, error = %e, "failed to load analysis result");
                EvidenceRecord::failed(file_path, file_name, e.to_string())
            }
        }
    }
}

/// All numeric artifact scores, flattened across sub-analyses.
fn artifact_scores(features: &FaceFeatures) -> BTreeMap<String, f64> {
    let a = &features.artifact_analysis;
    [
        &a.border_analysis,
        &a.edge_analysis,
        &a.lighting_analysis,
        &a.texture_analysis,
        &a.blending_analysis,
    ]
    .into_iter()
    .flat_map(|raw| raw.keys().filter_map(move |k| metric(raw, k).map(|v| (k.clone(), v))))
    .collect()
}

/// Forensic anomaly scores, one per sub-analysis that reports a usable metric.
fn forensic_scores(forensic: &crate::model::ForensicAnalysis) -> BTreeMap<String, AnomalyScore> {
    let sources: [(&str, &RawMetrics, &[&str], &str); 5] = [
        ("lighting", &forensic.lighting_analysis, &["brightness_uniformity"], "Lighting consistency analysis"),
        ("skin", &forensic.skin_analysis, &["skin_naturalness", "skin_smoothness"], "Skin texture analysis"),
        ("symmetry", &forensic.symmetry_analysis, &["face_symmetry"], "Facial symmetry analysis"),
        ("edge", &forensic.edge_analysis, &["edge_uniformity", "edge_consistency"], "Edge pattern analysis"),
        ("frequency", &forensic.frequency_analysis, &["frequency_score", "frequency_consistency"], "Frequency domain analysis"),
    ];

    sources
        .into_iter()
        .filter_map(|(key, raw, metrics, description)| {
            let score = metrics.iter().find_map(|m| metric(raw, m))?;
            Some((
                key.to_string(),
                AnomalyScore {
                    score,
                    confidence: metric(raw, "confidence"),
                    description: description.to_string(),
                },
            ))
        })
        .collect()
}

/// One derived file, as listed by the CLI, reports and the server.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceRecord {
    pub file_path: String,
    pub file_name: String,
    pub media_type: MediaType,
    pub prediction: Prediction,
    /// Overall confidence normalized to 0-100
    pub confidence: f64,
    pub evidence: EvidenceBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub result: AnalysisResult,
}

impl EvidenceRecord {
    pub fn new(file_path: String, file_name: String, result: AnalysisResult, evidence: EvidenceBundle) -> Self {
        Self {
            file_path,
            file_name,
            media_type: result.media_type,
            prediction: result.prediction,
            confidence: normalize_percentage(Some(result.confidence)),
            evidence,
            error: None,
            result,
        }
    }

    pub fn failed(file_path: String, file_name: String, error: String) -> Self {
        Self {
            file_path,
            file_name,
            media_type: MediaType::Unknown,
            prediction: Prediction::Unknown,
            confidence: 0.0,
            evidence: EvidenceBundle::default(),
            error: Some(error),
            result: AnalysisResult::default(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::palette::{GREEN, RED};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn result(value: serde_json::Value) -> AnalysisResult {
        AnalysisResult::from_value(value)
    }

    // ==========================================================================
    // PASSTHROUGH vs FALLBACK
    // ==========================================================================
    //
    // When the backend already computed evidence we must not second-guess it.
    // The fixture below carries a consistency heatmap of 0.123 while the raw
    // frames are perfectly stable (fallback would say 1.0).
    // ==========================================================================

    #[test]
    fn test_backend_evidence_is_not_recomputed() {
        let r = result(json!({
            "type": "video",
            "prediction": "FAKE",
            "confidence": 0.8,
            "frame_analysis": {"frame_results": [
                {"frame_number": 0, "prediction": "REAL", "confidence": 0.9},
                {"frame_number": 1, "prediction": "REAL", "confidence": 0.9}
            ]},
            "visual_evidence": {
                "temporal_analysis": {"consistency_score": 0.123, "motion_analysis": {"confidence_variance": 0.3}},
                "heatmaps": [
                    {"type": "frame_consistency", "intensity": 0.123, "color": "#ef4444", "description": "Frame Consistency Analysis"},
                    {"type": "overall_score", "intensity": 0.91, "description": "Overall Video Score"}
                ]
            }
        }));

        let bundle = derive(&r);
        assert_eq!(bundle.temporal_analysis.consistency_score, 0.123);
        assert_eq!(bundle.temporal_analysis.motion_analysis.confidence_variance, 0.3);
        assert_eq!(bundle.heatmaps.len(), 2);
        assert_eq!(bundle.heatmaps[0].kind, "frame_consistency");
        assert_eq!(bundle.heatmaps[0].intensity, 0.123);
        assert_eq!(bundle.heatmaps[1].intensity, 0.91);
        assert_eq!(bundle.heatmaps[1].color, GREEN);
        // the backend block has no frame analysis of its own
        assert_eq!(bundle.frame_analysis, FrameAnalysis::default());
    }

    #[test]
    fn test_video_fallback() {
        let r = result(json!({
            "type": "video",
            "prediction": "FAKE",
            "confidence": 73,
            "frame_analysis": {"frame_results": [
                {"frame_number": 0, "timestamp": 0.0, "prediction": "REAL", "confidence": 0.9},
                {"frame_number": 30, "timestamp": 1.0, "prediction": "FAKE", "confidence": 0.4,
                 "face_detection": {"detected": true, "confidence": 0.95,
                                    "bounding_box": {"x": 100, "y": 80, "width": 60, "height": 70}}},
                {"frame_number": 60, "timestamp": 2.0, "prediction": "FAKE", "confidence": 0.45}
            ]}
        }));

        let bundle = derive(&r);
        assert_eq!(bundle.frame_analysis.total_frames, 3);
        assert_eq!(bundle.frame_analysis.fake_frames, 2);
        assert_eq!(bundle.frame_analysis.real_frames, 1);
        assert_eq!(bundle.frame_analysis.frame_results.len(), 3);

        assert_eq!(bundle.heatmaps.len(), 3);
        assert_eq!(bundle.heatmaps[1].kind, "fake-density");
        assert_eq!(bundle.heatmaps[1].color, RED);
        assert_eq!(bundle.heatmaps[2].intensity, bundle.temporal_analysis.consistency_score);

        assert_eq!(bundle.regions.len(), 1);
        assert_eq!(bundle.regions[0].description, "Frame #30 flagged as FAKE");
        assert_eq!(bundle.artifacts.border_regions, bundle.regions);
        assert_eq!(bundle.spatial_analysis.artifact_regions, bundle.regions);
        assert_eq!(bundle.spatial_analysis.problematic_frames.len(), 2);

        assert!(bundle.face_detection.detected);
        assert_eq!(bundle.face_detection.confidence, 0.95);
        assert_eq!(bundle.face_detection.bounding_box, Some(BoundingBox::new(100.0, 80.0, 60.0, 70.0)));
    }

    #[test]
    fn test_video_without_frames() {
        let bundle = derive(&result(json!({"type": "video"})));
        assert_eq!(bundle, EvidenceBundle::default());
    }

    #[test]
    fn test_image_fallback() {
        let r = result(json!({
            "type": "image",
            "prediction": "REAL",
            "confidence": 0.88,
            "details": {"face_features": {
                "face_detected": true,
                "face_confidence": 0.97,
                "face_region": {"left": 10, "top": 20, "width": 100, "height": 120},
                "artifact_analysis": {
                    "border_analysis": {"border_quality": 0.82},
                    "edge_analysis": {"edge_uniformity": 0.55},
                    "texture_analysis": {"texture_score": 0.7, "region": {"x": 30, "y": 40, "width": 10, "height": 10}}
                },
                "forensic_analysis": {
                    "lighting_analysis": {"brightness_uniformity": 0.91},
                    "skin_analysis": {"skin_smoothness": 0.25, "confidence": 0.6},
                    "symmetry_analysis": {"note": "skipped"}
                }
            }}
        }));

        let bundle = derive(&r);
        assert!(bundle.face_detection.detected);
        assert_eq!(bundle.face_detection.bounding_box, Some(BoundingBox::new(10.0, 20.0, 100.0, 120.0)));

        assert_eq!(bundle.artifacts.scores["border_quality"], 0.82);
        assert_eq!(bundle.artifacts.scores["texture_score"], 0.7);
        assert_eq!(bundle.artifacts.texture_regions.len(), 1);
        assert!(bundle.artifacts.border_regions.is_empty());

        let scores = &bundle.forensic.anomaly_scores;
        assert_eq!(scores.keys().collect::<Vec<_>>(), ["lighting", "skin"]);
        assert_eq!(scores["skin"].score, 0.25);
        assert_eq!(scores["skin"].confidence, Some(0.6));

        let kinds: Vec<_> = bundle.heatmaps.iter().map(|h| h.kind.as_str()).collect();
        assert_eq!(kinds, ["border-quality", "edge-uniformity", "lighting-uniformity"]);

        assert_eq!(bundle.regions.len(), 1);
        assert_eq!(bundle.spatial_analysis.face_regions.len(), 1);
    }

    #[test]
    fn test_image_without_face_flag_uses_region_presence() {
        let bundle = derive(&result(json!({"type": "image", "details": {"face_features": {}}})));
        assert!(!bundle.face_detection.detected);
        assert!(bundle.face_detection.bounding_box.is_none());
        assert!(bundle.regions.is_empty());
    }

    #[test]
    fn test_audio_bundle_is_empty() {
        let bundle = derive(&result(json!({
            "type": "audio",
            "prediction": "FAKE",
            "details": {"deepfake_indicators": {"pitch_inconsistency": 0.8}}
        })));
        assert_eq!(bundle, EvidenceBundle::default());
    }

    #[test]
    fn test_custom_threshold() {
        let r = result(json!({
            "type": "video",
            "frame_analysis": {"frame_results": [
                {"prediction": "REAL", "confidence": 0.6},
                {"prediction": "REAL", "confidence": 0.9}
            ]}
        }));
        let strict = Deriver::new().with_suspicious_confidence(0.7).derive(&r);
        assert_eq!(strict.frame_analysis.fake_frames, 1);
        let default = derive(&r);
        assert_eq!(default.frame_analysis.fake_frames, 0);
    }

    #[test]
    fn test_record_normalizes_confidence() {
        let r = result(json!({"type": "image", "prediction": "FAKE", "confidence": 0.75}));
        let evidence = derive(&r);
        let record = EvidenceRecord::new("/a/b.json".into(), "b.json".into(), r, evidence);
        assert_eq!(record.confidence, 75.0);
        assert_eq!(record.prediction, Prediction::Fake);
        assert!(!record.is_error());
    }

    #[test]
    fn test_derive_file_missing() {
        let record = Deriver::new().derive_file("/definitely/not/here.json");
        assert!(record.is_error());
        assert_eq!(record.file_name, "here.json");
        assert_eq!(record.evidence, EvidenceBundle::default());
    }

    // ==========================================================================
    // INVARIANT: any JSON value derives without panicking
    // ==========================================================================

    use proptest::prelude::*;
    use serde_json::Value;

    const KEYS: &[&str] = &[
        "type", "prediction", "confidence", "details", "face_features", "face_detected",
        "face_region", "artifact_analysis", "border_analysis", "frame_analysis",
        "frame_results", "frame_number", "timestamp", "face_detection", "bounding_box",
        "visual_evidence", "heatmaps", "temporal_analysis", "x", "width",
    ];

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-200.0f64..200.0).prop_map(Value::from),
            prop::sample::select(vec!["video", "image", "audio", "FAKE", "REAL", "0.4", ""]).prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec((prop::sample::select(KEYS), inner), 0..6).prop_map(|pairs| {
                    Value::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_any_value_derives(value in arb_json()) {
            let is_object = value.is_object();
            let bundle = derive(&result(value));
            if !is_object {
                prop_assert_eq!(bundle, EvidenceBundle::default());
            }
        }
    }
}
