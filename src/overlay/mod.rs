//! Overlay selection and rendering
//!
//! Each media type offers a fixed set of overlays. [`render`] turns one
//! overlay kind plus the current viewer context into plain data: boxes already
//! placed in display coordinates, info panels, and an optional notice when
//! there is nothing to draw ("No face detected", "Loading image...").
//!
//! ```text
//! image  face-detection | artifacts | forensic | heatmaps
//! video  frame-analysis | frame-by-frame | suspicious-frames | temporal | artifacts | heatmaps
//! audio  audio-analysis | spectral | waveform | indicators
//! ```
//!
//! All box placement goes through the one [`ContainFit`] in the context. With
//! no fit (media not loaded yet) overlays that need boxes show a loading
//! notice instead.

pub mod explain;

use crate::evidence::frames::suspicious_reasons;
use crate::evidence::{frames, EvidenceBundle, Region};
use crate::geometry::{BoundingBox, ContainFit};
use crate::model::{AnalysisResult, FrameResult, MediaType, Prediction};
use crate::palette::{score_color, Severity, BLUE, GREEN, RED, YELLOW};
use crate::percent::format_percentage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKind {
    FaceDetection,
    Artifacts,
    Forensic,
    Heatmaps,
    FrameAnalysis,
    FrameByFrame,
    SuspiciousFrames,
    Temporal,
    AudioAnalysis,
    Spectral,
    Waveform,
    Indicators,
}

use OverlayKind::*;

const IMAGE_OVERLAYS: &[OverlayKind] = &[FaceDetection, Artifacts, Forensic, Heatmaps];
const VIDEO_OVERLAYS: &[OverlayKind] = &[
    FrameAnalysis,
    FrameByFrame,
    SuspiciousFrames,
    Temporal,
    Artifacts,
    Heatmaps,
];
const AUDIO_OVERLAYS: &[OverlayKind] = &[AudioAnalysis, Spectral, Waveform, Indicators];

impl OverlayKind {
    pub const ALL: [OverlayKind; 12] = [
        FaceDetection,
        Artifacts,
        Forensic,
        Heatmaps,
        FrameAnalysis,
        FrameByFrame,
        SuspiciousFrames,
        Temporal,
        AudioAnalysis,
        Spectral,
        Waveform,
        Indicators,
    ];

    pub fn id(self) -> &'static str {
        match self {
            FaceDetection => "face-detection",
            Artifacts => "artifacts",
            Forensic => "forensic",
            Heatmaps => "heatmaps",
            FrameAnalysis => "frame-analysis",
            FrameByFrame => "frame-by-frame",
            SuspiciousFrames => "suspicious-frames",
            Temporal => "temporal",
            AudioAnalysis => "audio-analysis",
            Spectral => "spectral",
            Waveform => "waveform",
            Indicators => "indicators",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FaceDetection => "Face Detection",
            Artifacts => "Artifacts",
            Forensic => "Forensic Analysis",
            Heatmaps => "Heatmaps",
            FrameAnalysis => "Frame Analysis",
            FrameByFrame => "Frame by Frame",
            SuspiciousFrames => "Suspicious Frames",
            Temporal => "Temporal Analysis",
            AudioAnalysis => "Audio Analysis",
            Spectral => "Spectral Analysis",
            Waveform => "Waveform",
            Indicators => "Deepfake Indicators",
        }
    }

    /// Overlays offered for a media type. Unknown types get the image set.
    pub fn options_for(media: MediaType) -> &'static [OverlayKind] {
        match media {
            MediaType::Video => VIDEO_OVERLAYS,
            MediaType::Audio => AUDIO_OVERLAYS,
            MediaType::Image | MediaType::Unknown => IMAGE_OVERLAYS,
        }
    }

    pub fn default_for(media: MediaType) -> OverlayKind {
        match media {
            MediaType::Video => FrameAnalysis,
            MediaType::Audio => AudioAnalysis,
            MediaType::Image | MediaType::Unknown => FaceDetection,
        }
    }

    pub fn is_available_for(self, media: MediaType) -> bool {
        Self::options_for(media).contains(&self)
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Error)]
#[error("unknown overlay: {0}")]
pub struct UnknownOverlay(pub String);

impl FromStr for OverlayKind {
    type Err = UnknownOverlay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or_else(|| UnknownOverlay(s.to_string()))
    }
}

/// Selector entry for a viewer's overlay menu.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayOption {
    pub id: &'static str,
    pub label: &'static str,
}

pub fn options(media: MediaType) -> Vec<OverlayOption> {
    OverlayKind::options_for(media)
        .iter()
        .map(|k| OverlayOption {
            id: k.id(),
            label: k.label(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Loading,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// A box in display coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBox {
    #[serde(flatten)]
    pub rect: BoundingBox,
    pub color: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PlacedBox {
    pub fn new(rect: BoundingBox, color: &str, label: impl Into<String>) -> Self {
        Self {
            rect,
            color: color.to_string(),
            label: label.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PanelRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            color: None,
            detail: None,
        }
    }

    fn colored(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub rows: Vec<PanelRow>,
}

impl Panel {
    pub fn new(title: impl Into<String>, rows: Vec<PanelRow>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }

    /// Value of the first row with this label.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub kind: OverlayKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub boxes: Vec<PlacedBox>,
    pub panels: Vec<Panel>,
}

impl Overlay {
    pub fn new(kind: OverlayKind) -> Self {
        Self {
            kind,
            notice: None,
            boxes: Vec::new(),
            panels: Vec::new(),
        }
    }

    fn with_notice(mut self, level: NoticeLevel, text: &str) -> Self {
        self.notice = Some(Notice {
            level,
            text: text.to_string(),
        });
        self
    }

    fn with_box(mut self, b: PlacedBox) -> Self {
        self.boxes.push(b);
        self
    }

    fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn notice_text(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.title == title)
    }
}

/// Everything an overlay needs from the viewer at render time.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub result: &'a AnalysisResult,
    pub evidence: &'a EvidenceBundle,
    /// `None` until the media element reports its natural size
    pub fit: Option<ContainFit>,
    /// Position in the navigable frame list
    pub frame_index: usize,
    /// Navigate suspicious frames only
    pub filter_suspicious: bool,
    pub suspicious_confidence: f64,
}

impl<'a> RenderContext<'a> {
    pub fn new(result: &'a AnalysisResult, evidence: &'a EvidenceBundle) -> Self {
        Self {
            result,
            evidence,
            fit: None,
            frame_index: 0,
            filter_suspicious: true,
            suspicious_confidence: 0.5,
        }
    }

    pub fn with_fit(mut self, fit: Option<ContainFit>) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_frame_index(mut self, index: usize) -> Self {
        self.frame_index = index;
        self
    }

    pub fn with_filter_suspicious(mut self, filter: bool) -> Self {
        self.filter_suspicious = filter;
        self
    }

    pub fn with_suspicious_confidence(mut self, threshold: f64) -> Self {
        self.suspicious_confidence = threshold;
        self
    }

    fn is_video(&self) -> bool {
        self.result.media_type == MediaType::Video
    }

    /// Per-frame results, preferring the bundle's copy.
    pub fn frames(&self) -> &'a [FrameResult] {
        let bundled = &self.evidence.frame_analysis.frame_results;
        if bundled.is_empty() {
            self.result.frame_results()
        } else {
            bundled
        }
    }

    pub fn suspicious_frames(&self) -> Vec<&'a FrameResult> {
        frames::suspicious(self.frames(), self.suspicious_confidence)
    }

    /// The list the frame navigator walks: suspicious frames or all of them.
    pub fn navigable_frames(&self) -> Vec<&'a FrameResult> {
        if self.filter_suspicious {
            self.suspicious_frames()
        } else {
            self.frames().iter().collect()
        }
    }

    pub fn current_frame(&self) -> Option<&'a FrameResult> {
        self.navigable_frames().get(self.frame_index).copied()
    }

    fn place(&self, b: &BoundingBox) -> Option<BoundingBox> {
        self.fit.map(|fit| fit.map_box(b))
    }
}

/// Render one overlay. Never fails; missing data becomes a notice.
pub fn render(kind: OverlayKind, ctx: &RenderContext<'_>) -> Overlay {
    match kind {
        FaceDetection => face_detection(ctx),
        Artifacts if ctx.is_video() => video_artifacts(ctx),
        Artifacts => image_artifacts(ctx),
        Forensic => forensic(ctx),
        Heatmaps => heatmaps(ctx),
        FrameAnalysis => frame_analysis(ctx),
        FrameByFrame => frame_by_frame(ctx),
        SuspiciousFrames => suspicious_frames(ctx),
        Temporal => temporal(ctx),
        AudioAnalysis => audio_analysis(ctx),
        Spectral => spectral(ctx),
        Waveform => waveform(ctx),
        Indicators => indicators(ctx),
    }
}

fn pct(value: f64) -> String {
    format!("{}%", format_percentage(Some(value), 1))
}

fn humanize(key: &str) -> String {
    key.replace('_', " ")
}

fn fixed(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}{unit}"),
        None => "N/A".to_string(),
    }
}

fn timestamp(frame: &FrameResult) -> String {
    fixed(frame.timestamp, 2, "s")
}

fn prediction_color(prediction: Prediction) -> &'static str {
    if prediction == Prediction::Fake {
        RED
    } else {
        GREEN
    }
}

/// Deepfake indicators are "higher is worse".
fn indicator_color(value: f64) -> &'static str {
    if value > 0.7 {
        RED
    } else if value > 0.4 {
        YELLOW
    } else {
        GREEN
    }
}

// ============================================================================
// IMAGE
// ============================================================================

fn face_detection(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(FaceDetection);
    let face = &ctx.evidence.face_detection;

    if !face.detected {
        return overlay.with_notice(NoticeLevel::Info, "No face detected");
    }
    let Some(bounds) = face.bounding_box else {
        return overlay.with_notice(NoticeLevel::Warning, "Face detected but no bounding box data");
    };
    let Some(rect) = ctx.place(&bounds) else {
        return overlay.with_notice(NoticeLevel::Loading, "Loading image...");
    };

    overlay.with_box(PlacedBox::new(
        rect,
        BLUE,
        format!("Face Detected ({} confidence)", pct(face.confidence)),
    ))
}

fn region_label(region: &Region) -> String {
    let mut label = [region.description.as_str(), region.kind.as_str()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("Artifact")
        .to_string();
    if let Some(score) = region.score {
        label.push_str(&format!(" ({})", pct(score)));
    }
    label
}

fn image_artifacts(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(Artifacts);
    let Some(fit) = ctx.fit else {
        return overlay.with_notice(NoticeLevel::Loading, "Loading image...");
    };

    // the same region often sits in both lists
    let mut regions: Vec<&Region> = Vec::new();
    let candidates = ctx
        .evidence
        .regions
        .iter()
        .filter(|r| r.is_artifact())
        .chain(ctx.evidence.artifacts.all_regions());
    for region in candidates {
        if !regions.contains(&region) {
            regions.push(region);
        }
    }

    if regions.is_empty() {
        return match ctx.evidence.face_detection.bounding_box {
            Some(face) => overlay.with_box(PlacedBox::new(fit.map_box(&face), YELLOW, "Artifact Analysis Area")),
            None => overlay.with_notice(NoticeLevel::Info, "No artifact regions detected"),
        };
    }

    let boxes = regions
        .into_iter()
        .map(|r| PlacedBox::new(fit.map_box(&r.bounds), &r.color, region_label(r)))
        .collect();
    Overlay { boxes, ..overlay }
}

fn forensic(ctx: &RenderContext<'_>) -> Overlay {
    let mut overlay = Overlay::new(Forensic);
    let forensic = &ctx.evidence.forensic;

    if forensic.anomaly_scores.is_empty() && forensic.problematic_regions.is_empty() {
        return overlay.with_notice(NoticeLevel::Info, "Forensic analysis not available");
    }

    // flagged metrics are pinned to the face
    if let Some(face) = ctx.evidence.face_detection.bounding_box.and_then(|b| ctx.place(&b)) {
        for (key, anomaly) in forensic.anomaly_scores.iter().filter(|(_, a)| a.score < 0.7) {
            let severity = Severity::from_forensic_score(anomaly.score);
            let label = format!("{}: {}", humanize(key).to_uppercase(), pct(anomaly.score));
            overlay
                .boxes
                .push(PlacedBox::new(face, severity.color(), label).with_detail(explain::detail(key, anomaly.score)));
        }
    }

    for region in &forensic.problematic_regions {
        let Some(rect) = ctx.place(&region.bounds) else {
            continue;
        };
        let score = region.score.unwrap_or(0.0);
        let color = Severity::from_forensic_score(score).color();
        let label = format!("{} ({})", region.description, pct(score));
        overlay.boxes.push(PlacedBox::new(rect, color, label));
    }

    let mut rows: Vec<PanelRow> = forensic
        .anomaly_scores
        .iter()
        .map(|(key, anomaly)| {
            let severity = Severity::from_forensic_score(anomaly.score);
            let mut row = PanelRow::new(
                humanize(key).to_uppercase(),
                format!("{} ({})", severity.risk_label(), pct(anomaly.score)),
            )
            .colored(severity.color())
            .with_detail(explain::explanation(key, anomaly.score));
            if let Some(confidence) = anomaly.confidence {
                row.value.push_str(&format!(", confidence {}", pct(confidence)));
            }
            row
        })
        .collect();
    rows.push(PanelRow::new(
        "OVERALL FORENSIC CONCLUSION",
        explain::conclusion(ctx.result.prediction),
    ));

    overlay.with_panel(Panel::new("FORENSIC ANALYSIS", rows))
}

fn heatmaps(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(Heatmaps);
    let maps = &ctx.evidence.heatmaps;
    if maps.is_empty() {
        return overlay.with_notice(NoticeLevel::Info, "No heatmaps available");
    }

    let rows = maps
        .iter()
        .map(|h| {
            let label = if h.description.is_empty() { &h.kind } else { &h.description };
            PanelRow::new(label.as_str(), pct(h.intensity)).colored(&h.color)
        })
        .collect();
    overlay.with_panel(Panel::new("Heatmaps", rows))
}

// ============================================================================
// VIDEO
// ============================================================================

fn frame_rows(frame: &FrameResult) -> Vec<PanelRow> {
    vec![
        PanelRow::new("Frame", format!("#{}", frame.frame_number)),
        PanelRow::new("Timestamp", timestamp(frame)),
        PanelRow::new("Prediction", frame.prediction.to_string()).colored(prediction_color(frame.prediction)),
        PanelRow::new("Confidence", pct(frame.confidence)),
    ]
}

/// Face box of a frame, or a loading notice when the video has no size yet.
fn frame_face(overlay: Overlay, ctx: &RenderContext<'_>, frame: &FrameResult, color: &str) -> Overlay {
    let Some(bounds) = frame.face_box() else {
        return overlay;
    };
    let confidence = frame.face_detection.as_ref().map_or(0.0, |fd| fd.confidence);
    match ctx.place(bounds) {
        Some(rect) => overlay.with_box(PlacedBox::new(rect, color, format!("Face ({})", pct(confidence)))),
        None => overlay.with_notice(NoticeLevel::Loading, "Preparing video overlay..."),
    }
}

fn video_artifacts(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(Artifacts);
    let focus = ctx
        .current_frame()
        .and_then(|f| Some((f, f.face_detection.as_ref()?.bounding_box?)));
    let Some((frame, bounds)) = focus else {
        return overlay.with_notice(NoticeLevel::Info, "No artifact regions detected for current frame");
    };
    let Some(rect) = ctx.place(&bounds) else {
        return overlay.with_notice(NoticeLevel::Loading, "Preparing video overlay...");
    };

    let overlay = overlay.with_box(PlacedBox::new(rect, YELLOW, "Artifact focus area"));
    if frame.artifacts.is_empty() {
        return overlay;
    }
    let rows = frame
        .artifacts
        .iter()
        .map(|(key, score)| PanelRow::new(humanize(key), pct(*score)))
        .collect();
    overlay.with_panel(Panel::new("Artifacts", rows))
}

fn frame_analysis(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(FrameAnalysis);
    if !ctx.is_video() {
        return overlay.with_notice(NoticeLevel::Info, "Frame analysis not available");
    }
    let Some(frame) = ctx.frames().first() else {
        return overlay.with_notice(NoticeLevel::Info, "No frame data available");
    };

    let mut overlay = frame_face(overlay.with_panel(Panel::new("Frame", frame_rows(frame))), ctx, frame, GREEN);

    // weak artifact scores are drawn on the face area
    if let Some(face) = frame.face_box().and_then(|b| ctx.place(b)) {
        for (key, score) in frame.artifacts.iter().filter(|(_, s)| **s < 0.7) {
            let label = format!("{} ({})", humanize(key), pct(*score));
            overlay.boxes.push(PlacedBox::new(face, RED, label));
        }
    }
    overlay
}

fn frame_by_frame(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(FrameByFrame);
    if !ctx.is_video() || ctx.frames().is_empty() {
        return overlay.with_notice(NoticeLevel::Info, "Frame-by-frame analysis not available");
    }
    let navigable = ctx.navigable_frames();
    let Some(frame) = navigable.get(ctx.frame_index).copied() else {
        return overlay;
    };

    let mut rows = frame_rows(frame);
    if !frame.artifacts.is_empty() {
        for (key, label) in [
            ("border_quality", "Border"),
            ("edge_uniformity", "Edges"),
            ("lighting_consistency", "Lighting"),
        ] {
            let value = format_percentage(frame.artifacts.get(key).copied(), 1);
            rows.push(PanelRow::new(label, format!("{value}%")));
        }
    }

    let title = format!("Frame {} of {}", ctx.frame_index + 1, navigable.len());
    frame_face(overlay.with_panel(Panel::new(title, rows)), ctx, frame, GREEN)
}

fn suspicious_frames(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(SuspiciousFrames);
    let suspicious = ctx.suspicious_frames();
    if !ctx.is_video() || suspicious.is_empty() {
        return overlay.with_notice(NoticeLevel::Success, "No suspicious frames detected");
    }
    let Some(frame) = suspicious.get(ctx.frame_index).copied() else {
        return overlay;
    };

    let reasons = suspicious_reasons(frame, ctx.suspicious_confidence)
        .into_iter()
        .map(|reason| PanelRow::new(reason, ""))
        .collect();
    let title = format!("Suspicious Frame {} / {}", ctx.frame_index + 1, suspicious.len());
    let overlay = overlay
        .with_panel(Panel::new(title, frame_rows(frame)))
        .with_panel(Panel::new("Reasons", reasons));
    frame_face(overlay, ctx, frame, RED)
}

fn temporal(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(Temporal);
    if !ctx.is_video() {
        return overlay.with_notice(NoticeLevel::Info, "Temporal analysis not available");
    }
    let temporal = &ctx.evidence.temporal_analysis;
    let motion = &temporal.motion_analysis;
    let counts = &ctx.evidence.frame_analysis;
    let score = temporal.consistency_score;

    overlay
        .with_panel(Panel::new(
            "Temporal Analysis",
            vec![
                PanelRow::new("Consistency Score", pct(score)),
                PanelRow::new("Confidence Variance", format!("{:.3}", motion.confidence_variance)),
                PanelRow::new("Avg Confidence", pct(motion.average_confidence)),
                PanelRow::new("Sudden Changes", motion.sudden_changes.to_string()),
                PanelRow::new("Prediction Swaps", motion.prediction_swaps.to_string()),
            ],
        ))
        .with_panel(Panel::new(
            "Frame Consistency",
            vec![PanelRow::new(temporal.label(), pct(score)).colored(score_color(score))],
        ))
        .with_panel(Panel::new(
            "Frames",
            vec![
                PanelRow::new("Total Frames", counts.total_frames.to_string()),
                PanelRow::new("Fake Frames", counts.fake_frames.to_string()),
                PanelRow::new("Real Frames", counts.real_frames.to_string()),
            ],
        ))
}

// ============================================================================
// AUDIO
// ============================================================================

fn audio_analysis(ctx: &RenderContext<'_>) -> Overlay {
    let info = &ctx.result.details.preprocessing_info;
    Overlay::new(AudioAnalysis).with_panel(Panel::new(
        "Audio Analysis",
        vec![
            PanelRow::new("Duration", fixed(info.duration, 1, "s")),
            PanelRow::new("Sample Rate", fixed(info.sample_rate, 0, " Hz")),
            PanelRow::new("Prediction", ctx.result.prediction.to_string()),
            PanelRow::new("Confidence", pct(ctx.result.confidence)),
        ],
    ))
}

fn spectral(ctx: &RenderContext<'_>) -> Overlay {
    let features = &ctx.result.details.comprehensive_features;
    let get = |key: &str| features.get(key).copied();
    Overlay::new(Spectral).with_panel(Panel::new(
        "Spectral Analysis",
        vec![
            PanelRow::new("F0 Mean", fixed(get("f0_mean"), 1, " Hz")),
            PanelRow::new("Spectral Centroid", fixed(get("spectral_centroid_mean"), 0, " Hz")),
            PanelRow::new("Energy", fixed(get("energy_mean"), 3, "")),
            PanelRow::new("ZCR", fixed(get("zcr_mean"), 3, "")),
        ],
    ))
}

fn waveform(ctx: &RenderContext<'_>) -> Overlay {
    let features = &ctx.result.details.comprehensive_features;
    let get = |key: &str| features.get(key).copied();
    Overlay::new(Waveform).with_panel(Panel::new(
        "Waveform Analysis",
        vec![
            PanelRow::new("Voiced Ratio", pct(get("voiced_ratio").unwrap_or(0.0))),
            PanelRow::new("F0 Variation", fixed(get("f0_std"), 1, " Hz")),
            PanelRow::new("Energy Variation", fixed(get("energy_std"), 3, "")),
        ],
    ))
}

fn indicators(ctx: &RenderContext<'_>) -> Overlay {
    let overlay = Overlay::new(Indicators);
    let indicators = &ctx.result.details.deepfake_indicators;
    if indicators.is_empty() {
        return overlay.with_notice(NoticeLevel::Info, "No deepfake indicators reported");
    }
    let rows = indicators
        .iter()
        .map(|(key, value)| PanelRow::new(humanize(key), pct(*value)).colored(indicator_color(*value)))
        .collect();
    overlay.with_panel(Panel::new("Deepfake Indicators", rows))
}
