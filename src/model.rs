//! Backend analysis result types
//!
//! These mirror the JSON the inference backend returns. The backend's schema
//! is informal: fields go missing, numbers arrive as strings, sub-objects are
//! sometimes `null`. Nothing here is allowed to fail on that. Every field is
//! deserialized through [`lenient`], which maps absent or malformed values to
//! neutral defaults (0, false, empty). Only invalid JSON syntax is an error.

use crate::evidence::{Heatmap, TemporalAnalysis};
use crate::geometry::BoundingBox;
use crate::percent::number_from_value;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Raw metric object as sent by the backend (`{"border_quality": 0.8, ...}`).
pub type RawMetrics = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    #[default]
    Unknown,
}

impl MediaType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            "audio" => MediaType::Audio,
            _ => MediaType::Unknown,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
            MediaType::Audio => write!(f, "audio"),
            MediaType::Unknown => write!(f, "unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for MediaType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(v.as_str().map(MediaType::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Prediction {
    Real,
    Fake,
    #[default]
    Unknown,
}

impl Prediction {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "REAL" => Prediction::Real,
            "FAKE" => Prediction::Fake,
            _ => Prediction::Unknown,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Real => write!(f, "REAL"),
            Prediction::Fake => write!(f, "FAKE"),
            Prediction::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl<'de> Deserialize<'de> for Prediction {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(v.as_str().map(Prediction::parse).unwrap_or_default())
    }
}

/// Top-level backend response for one analyzed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub prediction: Prediction,
    /// 0-1 or 0-100 depending on the backend version
    #[serde(deserialize_with = "lenient::number")]
    pub confidence: f64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub details: Details,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub frame_analysis: Option<FrameAnalysis>,
    /// Derived evidence precomputed by the backend; trusted as-is when present
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub visual_evidence: Option<BackendEvidence>,
}

impl AnalysisResult {
    /// Parse a backend response. Only malformed JSON syntax is an error.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(value))
    }

    /// Build from an already-parsed value. Never fails; anything but an
    /// object is an empty result.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Raw per-frame results, wherever the backend put them.
    pub fn frame_results(&self) -> &[FrameResult] {
        self.visual_evidence
            .as_ref()
            .and_then(|ve| ve.frame_analysis.as_ref())
            .or(self.frame_analysis.as_ref())
            .or(self.details.frame_analysis.as_ref())
            .map(|fa| fa.frame_results.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Details {
    #[serde(deserialize_with = "lenient::or_default")]
    pub face_features: FaceFeatures,
    #[serde(deserialize_with = "lenient::scores")]
    pub deepfake_indicators: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub preprocessing_info: PreprocessingInfo,
    #[serde(deserialize_with = "lenient::scores")]
    pub comprehensive_features: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub frame_analysis: Option<FrameAnalysis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingInfo {
    #[serde(deserialize_with = "lenient::opt_number")]
    pub duration: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub sample_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceFeatures {
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub face_detected: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub face_confidence: Option<f64>,
    /// `{left, top, width, height}` in natural pixels
    #[serde(deserialize_with = "lenient::opt_box")]
    pub face_region: Option<BoundingBox>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub artifact_analysis: ArtifactAnalysis,
    #[serde(deserialize_with = "lenient::or_default")]
    pub forensic_analysis: ForensicAnalysis,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactAnalysis {
    #[serde(deserialize_with = "lenient::or_default")]
    pub border_analysis: RawMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub edge_analysis: RawMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub lighting_analysis: RawMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub texture_analysis: RawMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub blending_analysis: RawMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForensicAnalysis {
    #[serde(deserialize_with = "lenient::or_default")]
    pub lighting_analysis: RawMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub skin_analysis: RawMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub symmetry_analysis: RawMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub edge_analysis: RawMetrics,
    #[serde(deserialize_with = "lenient::or_default")]
    pub frequency_analysis: RawMetrics,
}

/// Numeric metric from a raw object, if present and finite.
pub fn metric(raw: &RawMetrics, key: &str) -> Option<f64> {
    raw.get(key).and_then(number_from_value)
}

/// Rectangle stored under `key`, if it carries coordinates.
pub fn region(raw: &RawMetrics, key: &str) -> Option<BoundingBox> {
    raw.get(key).and_then(lenient::bounding_box)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceDetection {
    #[serde(deserialize_with = "lenient::boolean")]
    pub detected: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub confidence: f64,
    #[serde(deserialize_with = "lenient::opt_box")]
    pub bounding_box: Option<BoundingBox>,
}

/// One analyzed video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameResult {
    #[serde(deserialize_with = "lenient::count")]
    pub frame_number: u64,
    /// Seconds from the start of the video
    #[serde(deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    pub prediction: Prediction,
    #[serde(deserialize_with = "lenient::number")]
    pub confidence: f64,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub face_detection: Option<FaceDetection>,
    #[serde(deserialize_with = "lenient::scores", skip_serializing_if = "BTreeMap::is_empty")]
    pub artifacts: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient::scores", skip_serializing_if = "BTreeMap::is_empty")]
    pub forensic_analysis: BTreeMap<String, f64>,
}

impl FrameResult {
    /// Face box for this frame, only when a face was actually detected.
    pub fn face_box(&self) -> Option<&BoundingBox> {
        self.face_detection
            .as_ref()
            .filter(|fd| fd.detected)
            .and_then(|fd| fd.bounding_box.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameAnalysis {
    #[serde(deserialize_with = "lenient::count")]
    pub total_frames: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub fake_frames: u64,
    #[serde(deserialize_with = "lenient::count")]
    pub real_frames: u64,
    #[serde(deserialize_with = "lenient::list")]
    pub frame_results: Vec<FrameResult>,
}

/// Backend-precomputed `visual_evidence` block.
///
/// Regions stay as raw JSON here; the deriver maps them into
/// [`crate::evidence::Region`] values without touching their numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendEvidence {
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub face_detection: Option<FaceDetection>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub artifacts: BackendArtifacts,
    #[serde(deserialize_with = "lenient::or_default")]
    pub forensic_analysis: BackendForensic,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub frame_analysis: Option<FrameAnalysis>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub temporal_analysis: Option<TemporalAnalysis>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub spatial_analysis: Option<BackendSpatial>,
    #[serde(deserialize_with = "lenient::list")]
    pub heatmaps: Vec<Heatmap>,
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendArtifacts {
    #[serde(deserialize_with = "lenient::or_default")]
    pub border_regions: Vec<Value>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub edge_regions: Vec<Value>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub lighting_regions: Vec<Value>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub texture_regions: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendForensic {
    #[serde(deserialize_with = "lenient::or_default")]
    pub anomaly_scores: BTreeMap<String, Value>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub problematic_regions: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSpatial {
    #[serde(deserialize_with = "lenient::or_default")]
    pub face_regions: Vec<Value>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub artifact_regions: Vec<Value>,
    #[serde(deserialize_with = "lenient::list")]
    pub problematic_frames: Vec<FrameResult>,
}

/// Field deserializers that never fail.
///
/// Each one reads the field as a generic JSON value first and then picks out
/// what it can. A wrong type yields the field's default instead of an error.
pub(crate) mod lenient {
    use super::*;
    use serde::de::DeserializeOwned;

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(opt_number(d)?.unwrap_or(0.0))
    }

    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(number_from_value(&v))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(match v {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(opt_number(d)?.filter(|n| *n >= 0.0).map(|n| n as u64).unwrap_or(0))
    }

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(opt_bool(d)?.unwrap_or(false))
    }

    pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(v.as_bool())
    }

    /// Object-shaped value as `T`. Derived struct visitors also accept
    /// sequences, so arrays are rejected before serde sees them.
    fn record<T: DeserializeOwned>(v: Value) -> Option<T> {
        if !v.is_object() {
            return None;
        }
        serde_json::from_value(v).ok()
    }

    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let v = Value::deserialize(d)?;
        Ok(record(v).unwrap_or_default())
    }

    pub fn opt<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let v = Value::deserialize(d)?;
        Ok(record(v))
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(match v {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    /// Keep the object elements that parse; anything that isn't an array is empty.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let v = Value::deserialize(d)?;
        let Value::Array(items) = v else {
            return Ok(Vec::new());
        };
        Ok(items.into_iter().filter_map(record).collect())
    }

    /// Named 0-1 scores; non-numeric entries are dropped.
    pub fn scores<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, f64>, D::Error> {
        let v = Value::deserialize(d)?;
        let Value::Object(map) = v else {
            return Ok(BTreeMap::new());
        };
        Ok(map
            .iter()
            .filter_map(|(k, v)| number_from_value(v).map(|n| (k.clone(), n)))
            .collect())
    }

    pub fn opt_box<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BoundingBox>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(bounding_box(&v))
    }

    /// `{x, y, width, height}` or `{left, top, width, height}`.
    ///
    /// A box needs at least a horizontal coordinate; missing extents are 0.
    pub fn bounding_box(v: &Value) -> Option<BoundingBox> {
        let obj = v.as_object()?;
        let field = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k).and_then(number_from_value));
        let x = field(&["x", "left"])?;
        Some(BoundingBox {
            x,
            y: field(&["y", "top"]).unwrap_or(0.0),
            width: field(&["width", "w"]).unwrap_or(0.0),
            height: field(&["height", "h"]).unwrap_or(0.0),
        })
    }
}
