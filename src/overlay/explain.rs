//! Plain-language explanations for forensic anomaly scores.

use crate::model::Prediction;
use crate::palette::Severity;

/// One-line explanation shown next to a forensic score.
pub fn explanation(key: &str, score: f64) -> String {
    let severity = Severity::from_forensic_score(score);
    let text = match (key, severity) {
        ("lighting", Severity::High) => "Inconsistent lighting patterns suggest artificial manipulation",
        ("lighting", Severity::Medium) => "Minor lighting inconsistencies detected",
        ("lighting", Severity::Low) => "Natural lighting patterns consistent with authentic image",
        ("skin", Severity::High) => "Skin texture anomalies indicate potential deepfake generation",
        ("skin", Severity::Medium) => "Minor skin texture irregularities detected",
        ("skin", Severity::Low) => "Natural skin texture consistent with authentic image",
        ("edge", Severity::High) => "Sharp edge artifacts suggest AI-generated content",
        ("edge", Severity::Medium) => "Minor edge inconsistencies detected",
        ("edge", Severity::Low) => "Natural edge transitions consistent with authentic image",
        ("compression", Severity::High) => "Compression artifacts inconsistent with natural photography",
        ("compression", Severity::Medium) => "Minor compression inconsistencies detected",
        ("compression", Severity::Low) => "Natural compression patterns consistent with authentic image",
        ("noise", Severity::High) => "Digital noise patterns suggest artificial generation",
        ("noise", Severity::Medium) => "Minor noise inconsistencies detected",
        ("noise", Severity::Low) => "Natural noise patterns consistent with authentic image",
        _ => return format!("{key} analysis: {severity} risk detected"),
    };
    text.to_string()
}

/// Longer hover text. Lighting, skin and edge get their own bands (0.7 / 0.5);
/// everything else falls back to the risk bands.
pub fn detail(key: &str, score: f64) -> String {
    let banded = |good: &str, fair: &str, poor: &str| {
        if score >= 0.7 {
            good.to_string()
        } else if score >= 0.5 {
            fair.to_string()
        } else {
            poor.to_string()
        }
    };

    match key {
        "lighting" => banded(
            "Uniform lighting across the face indicates natural photography. Real images typically have consistent lighting patterns.",
            "Moderate lighting variation detected. Some inconsistencies may suggest manipulation or AI generation.",
            "Inconsistent lighting patterns detected. Low scores (<50%) indicate artificial lighting, a common deepfake indicator.",
        ),
        "skin" => banded(
            "Natural skin texture with realistic variation. Authentic images show natural skin imperfections.",
            "Some skin texture anomalies detected. May indicate smoothing or manipulation.",
            "Unnaturally smooth skin detected. Very low scores suggest AI-generated skin texture, a common deepfake artifact.",
        ),
        k if k.contains("edge") => banded(
            "Natural edge patterns with smooth transitions. Real photos have organic edge distributions.",
            "Some edge inconsistencies detected. Unusual edge patterns or sharp transitions may suggest manipulation or AI generation.",
            "Unnatural edge patterns detected. Low scores (<50%) indicate sharp artificial edges or grid-like patterns.",
        ),
        _ => match Severity::from_forensic_score(score) {
            Severity::High if key == "compression" => {
                "High risk: Compression artifacts inconsistent with natural photography".to_string()
            }
            Severity::High => "High risk: Digital patterns suggest artificial generation".to_string(),
            Severity::Medium => format!("Medium risk: Minor {key} inconsistencies detected"),
            Severity::Low => format!("Low risk: Natural {key} patterns consistent with authentic image"),
        },
    }
}

pub fn conclusion(prediction: Prediction) -> &'static str {
    match prediction {
        Prediction::Fake => "Multiple forensic anomalies detected suggesting artificial generation",
        _ => "Forensic analysis consistent with authentic image",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_metrics_use_table() {
        assert_eq!(
            explanation("lighting", 0.1),
            "Inconsistent lighting patterns suggest artificial manipulation"
        );
        assert_eq!(explanation("skin", 0.45), "Minor skin texture irregularities detected");
        assert_eq!(
            explanation("noise", 0.9),
            "Natural noise patterns consistent with authentic image"
        );
    }

    #[test]
    fn test_unknown_metric_falls_back() {
        assert_eq!(explanation("symmetry", 0.2), "symmetry analysis: high risk detected");
        assert_eq!(explanation("frequency", 0.6), "frequency analysis: low risk detected");
    }

    #[test]
    fn test_detail_bands() {
        assert!(detail("lighting", 0.7).starts_with("Uniform lighting"));
        assert!(detail("lighting", 0.55).starts_with("Moderate lighting"));
        assert!(detail("edge_consistency", 0.2).starts_with("Unnatural edge"));
        assert_eq!(
            detail("compression", 0.1),
            "High risk: Compression artifacts inconsistent with natural photography"
        );
        assert_eq!(detail("symmetry", 0.4), "Medium risk: Minor symmetry inconsistencies detected");
    }

    #[test]
    fn test_conclusion() {
        assert!(conclusion(Prediction::Fake).starts_with("Multiple forensic anomalies"));
        assert_eq!(conclusion(Prediction::Unknown), "Forensic analysis consistent with authentic image");
    }
}
