//! HTML report with inline SVG region previews

use crate::evidence::{EvidenceBundle, EvidenceRecord};
use crate::geometry::{ContainFit, Size};
use crate::model::{MediaType, Prediction};
use crate::report::{sorted, Summary};
use std::fmt::Write as _;
use std::io::{self, Write};

const PREVIEW_WIDTH: f64 = 320.0;
const PREVIEW_HEIGHT: f64 = 180.0;

pub fn write<W: Write>(writer: &mut W, records: &[EvidenceRecord]) -> io::Result<()> {
    let summary = Summary::from_records(records);
    let cards: String = sorted(records).into_iter().map(file_card).collect();

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>deepview Evidence Report</title>
    <style>
        :root {{
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --real: #22c55e;
            --fake: #ef4444;
            --unknown: #f59e0b;
            --error: #6e7681;
            --accent: #3b82f6;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1400px; margin: 0 auto; padding: 2rem; }}
        .header {{
            display: flex;
            align-items: baseline;
            gap: 1rem;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
        }}
        .logo {{ font-size: 2.5rem; font-weight: 800; color: var(--accent); }}
        .subtitle {{ color: var(--dim); }}
        .stats {{
            display: grid;
            grid-template-columns: repeat(4, 1fr);
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            text-align: center;
        }}
        .stat-value {{ font-size: 3rem; font-weight: 700; line-height: 1; }}
        .stat-label {{ color: var(--dim); font-size: 0.875rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }}
        .stat.real .stat-value {{ color: var(--real); }}
        .stat.fake .stat-value {{ color: var(--fake); }}
        .stat.error .stat-value {{ color: var(--error); }}
        .files {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(380px, 1fr)); gap: 1.5rem; }}
        .file {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.25rem;
        }}
        .file-head {{ display: flex; justify-content: space-between; align-items: center; margin-bottom: 0.75rem; }}
        .file-name {{ font-weight: 600; word-break: break-all; }}
        .badge {{ padding: 0.15rem 0.6rem; border-radius: 999px; font-size: 0.75rem; font-weight: 700; color: #fff; }}
        .badge.real {{ background: var(--real); }}
        .badge.fake {{ background: var(--fake); }}
        .badge.unknown {{ background: var(--unknown); }}
        .badge.error {{ background: var(--error); }}
        .meta {{ color: var(--dim); font-size: 0.8rem; margin-bottom: 0.75rem; }}
        svg.preview {{ width: 100%; background: #0b0f14; border-radius: 8px; }}
        .bars {{ margin-top: 0.75rem; }}
        .bar-row {{ display: grid; grid-template-columns: 140px 1fr 48px; gap: 0.5rem; align-items: center; font-size: 0.8rem; }}
        .bar {{ height: 8px; background: var(--border); border-radius: 4px; overflow: hidden; }}
        .bar > span {{ display: block; height: 100%; }}
        .err {{ color: var(--fake); font-size: 0.85rem; }}
    </style>
</head>
<body>
<div class="container">
    <div class="header">
        <div class="logo">deepview</div>
        <div class="subtitle">Evidence report, {generated}</div>
    </div>
    <div class="stats">
        <div class="stat"><div class="stat-value">{total}</div><div class="stat-label">Files</div></div>
        <div class="stat real"><div class="stat-value">{real}</div><div class="stat-label">Real</div></div>
        <div class="stat fake"><div class="stat-value">{fake}</div><div class="stat-label">Fake</div></div>
        <div class="stat error"><div class="stat-value">{error}</div><div class="stat-label">Errors</div></div>
    </div>
    <div class="files">
{cards}    </div>
</div>
</body>
</html>
"#,
        generated = chrono::Local::now().format("%Y-%m-%d %H:%M"),
        total = summary.total,
        real = summary.real,
        fake = summary.fake,
        error = summary.error,
        cards = cards,
    )?;

    Ok(())
}

fn badge_class(record: &EvidenceRecord) -> &'static str {
    if record.is_error() {
        return "error";
    }
    match record.prediction {
        Prediction::Real => "real",
        Prediction::Fake => "fake",
        Prediction::Unknown => "unknown",
    }
}

fn file_card(record: &EvidenceRecord) -> String {
    let mut card = String::new();
    let _ = writeln!(card, r#"        <div class="file">"#);
    let _ = writeln!(
        card,
        r#"            <div class="file-head"><span class="file-name">{}</span><span class="badge {}">{}</span></div>"#,
        html_escape(&record.file_name),
        badge_class(record),
        if record.is_error() { "ERROR".to_string() } else { record.prediction.to_string() },
    );

    if let Some(error) = &record.error {
        let _ = writeln!(card, r#"            <div class="err">{}</div>"#, html_escape(error));
        let _ = writeln!(card, "        </div>");
        return card;
    }

    let ev = &record.evidence;
    let mut meta = format!("{} &middot; {:.1}% confidence", record.media_type, record.confidence);
    if record.media_type == MediaType::Video {
        let _ = write!(
            meta,
            " &middot; {} of {} frames suspicious &middot; temporal {:.3} ({})",
            ev.frame_analysis.fake_frames,
            ev.frame_analysis.total_frames,
            ev.temporal_analysis.consistency_score,
            ev.temporal_analysis.label(),
        );
    }
    let _ = writeln!(card, r#"            <div class="meta">{meta}</div>"#);

    if let Some(svg) = region_preview(ev) {
        card.push_str(&svg);
    }
    card.push_str(&heatmap_bars(ev));
    let _ = writeln!(card, "        </div>");
    card
}

/// Regions drawn into a fixed-size preview.
///
/// The natural media size isn't part of the result, so the extent covering
/// every region stands in for it.
fn region_preview(ev: &EvidenceBundle) -> Option<String> {
    let natural = Size::covering(ev.regions.iter().map(|r| &r.bounds))?;
    let fit = ContainFit::new(natural, Size::new(PREVIEW_WIDTH, PREVIEW_HEIGHT))?;
    let content = fit.content_rect();

    let mut svg = format!(
        r##"            <svg class="preview" viewBox="0 0 {PREVIEW_WIDTH} {PREVIEW_HEIGHT}" xmlns="http://www.w3.org/2000/svg">
                <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#1f2630"/>
"##,
        content.x, content.y, content.width, content.height,
    );
    for region in &ev.regions {
        let b = fit.map_box(&region.bounds);
        let _ = writeln!(
            svg,
            r#"                <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{color}" fill-opacity="0.15" stroke="{color}" stroke-width="2"><title>{}</title></rect>"#,
            b.x,
            b.y,
            b.width,
            b.height,
            html_escape(&region.description),
            color = html_escape(&region.color),
        );
    }
    svg.push_str("            </svg>\n");
    Some(svg)
}

fn heatmap_bars(ev: &EvidenceBundle) -> String {
    if ev.heatmaps.is_empty() {
        return String::new();
    }
    let mut bars = String::from("            <div class=\"bars\">\n");
    for h in &ev.heatmaps {
        let pct = crate::percent::normalize_percentage(Some(h.intensity));
        let _ = writeln!(
            bars,
            r#"                <div class="bar-row"><span>{}</span><div class="bar"><span style="width:{pct:.1}%;background:{}"></span></div><span>{pct:.1}%</span></div>"#,
            html_escape(&h.kind),
            html_escape(&h.color),
        );
    }
    bars.push_str("            </div>\n");
    bars
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{record, sample_records};
    use serde_json::json;

    fn render(records: &[EvidenceRecord]) -> String {
        let mut out = Vec::new();
        write(&mut out, records).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary_cards() {
        let html = render(&sample_records());
        assert!(html.contains(r#"<div class="stat fake"><div class="stat-value">1</div>"#));
        assert!(html.contains(r#"<div class="stat error"><div class="stat-value">1</div>"#));
    }

    #[test]
    fn test_fake_listed_first() {
        let html = render(&sample_records());
        let clip = html.find("clip.json").unwrap();
        let portrait = html.find("portrait.json").unwrap();
        let broken = html.find("broken.json").unwrap();
        assert!(clip < portrait && portrait < broken);
    }

    #[test]
    fn test_region_preview_uses_contain_fit() {
        // one 160x90 face region anchored at the origin fills the 320x180 preview
        let r = record(
            "a.json",
            json!({"type": "image", "details": {"face_features": {
                "face_region": {"x": 0, "y": 0, "width": 160, "height": 90}
            }}}),
        );
        let svg = region_preview(&r.evidence).unwrap();
        assert!(svg.contains(r##"<rect x="0.0" y="0.0" width="320.0" height="180.0" fill="#1f2630"/>"##));
        assert!(svg.contains("<title>Detected Face Region</title>"));
    }

    #[test]
    fn test_no_regions_no_preview() {
        let r = record("a.json", json!({"type": "audio"}));
        assert!(region_preview(&r.evidence).is_none());
        assert!(heatmap_bars(&r.evidence).is_empty());
    }

    #[test]
    fn test_escaping() {
        let mut records = sample_records();
        records[0].file_name = "<script>.json".into();
        let html = render(&records);
        assert!(html.contains("&lt;script&gt;.json"));
        assert!(!html.contains("<script>.json"));
    }

    #[test]
    fn test_video_meta() {
        let html = render(&sample_records());
        assert!(html.contains("1 of 2 frames suspicious"));
    }
}
