//! Heatmap entries: a metric's intensity plus its traffic-light color.

use super::TemporalAnalysis;
use crate::model::{lenient, metric, ArtifactAnalysis, ForensicAnalysis};
use crate::palette::{density_color, score_color};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heatmap {
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub kind: String,
    /// 0-1
    #[serde(deserialize_with = "lenient::number")]
    pub intensity: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub color: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    /// Base64 image for model-generated (Grad-CAM) heatmaps
    #[serde(deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl Heatmap {
    /// Heatmap for a "higher is better" score.
    pub fn scored(kind: &str, intensity: f64, description: &str) -> Self {
        Self {
            kind: kind.to_string(),
            intensity,
            color: score_color(intensity).to_string(),
            description: description.to_string(),
            image_data: None,
        }
    }

    /// Heatmap for a "lower is better" density.
    pub fn density(kind: &str, intensity: f64, description: &str) -> Self {
        Self {
            color: density_color(intensity).to_string(),
            ..Self::scored(kind, intensity, description)
        }
    }

    pub fn is_gradcam(&self) -> bool {
        self.kind == "gradcam" && self.image_data.is_some()
    }

    /// Backend heatmaps sometimes omit the color; numbers are left untouched.
    pub(crate) fn with_color_filled(mut self) -> Self {
        if self.color.is_empty() {
            self.color = score_color(self.intensity).to_string();
        }
        self
    }
}

/// Three summary heatmaps for a video, built from frame statistics.
pub fn video_heatmaps(total: usize, suspicious: usize, temporal: &TemporalAnalysis) -> Vec<Heatmap> {
    if total == 0 {
        return Vec::new();
    }
    let fake_density = suspicious as f64 / total as f64;

    vec![
        Heatmap::scored(
            "frame-confidence",
            temporal.motion_analysis.average_confidence,
            "Average frame confidence across the video",
        ),
        Heatmap::density(
            "fake-density",
            fake_density,
            "Density of suspicious frames in the timeline",
        ),
        Heatmap::scored(
            "consistency-trend",
            temporal.consistency_score,
            "Temporal consistency derived from frame-to-frame variance",
        ),
    ]
}

/// Heatmaps for an image, one per raw quality score the backend reported.
pub fn image_heatmaps(artifacts: &ArtifactAnalysis, forensic: &ForensicAnalysis) -> Vec<Heatmap> {
    let sources = [
        (
            metric(&artifacts.border_analysis, "border_quality"),
            "border-quality",
            "Border Quality Analysis",
        ),
        (
            metric(&artifacts.edge_analysis, "edge_uniformity"),
            "edge-uniformity",
            "Edge Uniformity Analysis",
        ),
        (
            metric(&forensic.lighting_analysis, "brightness_uniformity"),
            "lighting-uniformity",
            "Lighting Uniformity Analysis",
        ),
    ];

    sources
        .into_iter()
        .filter_map(|(value, kind, description)| value.map(|v| Heatmap::scored(kind, v, description)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::MotionAnalysis;
    use crate::palette::{AMBER, GREEN, RED};
    use serde_json::json;

    #[test]
    fn test_video_heatmaps() {
        let temporal = TemporalAnalysis {
            consistency_score: 0.55,
            motion_analysis: MotionAnalysis {
                average_confidence: 0.82,
                ..Default::default()
            },
        };
        let maps = video_heatmaps(10, 6, &temporal);
        let kinds: Vec<_> = maps.iter().map(|h| h.kind.as_str()).collect();
        assert_eq!(kinds, ["frame-confidence", "fake-density", "consistency-trend"]);

        assert_eq!(maps[0].intensity, 0.82);
        assert_eq!(maps[0].color, GREEN);
        assert_eq!(maps[1].intensity, 0.6);
        assert_eq!(maps[1].color, RED);
        assert_eq!(maps[2].color, AMBER);
    }

    #[test]
    fn test_low_density_is_green() {
        let maps = video_heatmaps(10, 1, &TemporalAnalysis::default());
        assert_eq!(maps[1].color, GREEN);
        assert_eq!(maps[2].color, RED);
    }

    #[test]
    fn test_no_frames_no_heatmaps() {
        assert!(video_heatmaps(0, 0, &TemporalAnalysis::default()).is_empty());
    }

    #[test]
    fn test_image_heatmaps_only_for_present_scores() {
        let artifacts: ArtifactAnalysis = serde_json::from_value(json!({
            "border_analysis": {"border_quality": 0.35},
            "edge_analysis": {"edge_density": 0.1}
        }))
        .unwrap();
        let forensic: ForensicAnalysis = serde_json::from_value(json!({
            "lighting_analysis": {"brightness_uniformity": "0.9"}
        }))
        .unwrap();

        let maps = image_heatmaps(&artifacts, &forensic);
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].kind, "border-quality");
        assert_eq!(maps[0].color, RED);
        assert_eq!(maps[1].kind, "lighting-uniformity");
        assert_eq!(maps[1].intensity, 0.9);
    }

    #[test]
    fn test_backend_heatmap_parsing() {
        let h: Heatmap = serde_json::from_value(json!({
            "type": "gradcam",
            "intensity": 0.64,
            "description": "Model attention",
            "image_data": "data:image/png;base64,AAAA"
        }))
        .unwrap();
        assert!(h.is_gradcam());
        assert_eq!(h.color, "");
        assert_eq!(h.with_color_filled().color, AMBER);
    }
}
