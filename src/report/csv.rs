//! CSV report, one row per file.

use crate::evidence::EvidenceRecord;
use crate::model::MediaType;
use crate::report::sorted;
use std::io::{self, Write};

const HEADER: &str = "file_name,file_path,type,prediction,confidence,face_detected,regions,heatmaps,suspicious_frames,consistency_score,error";

pub fn write<W: Write>(writer: &mut W, records: &[EvidenceRecord]) -> io::Result<()> {
    writeln!(writer, "{HEADER}")?;

    for r in sorted(records) {
        let ev = &r.evidence;
        let (suspicious, consistency) = if r.media_type == MediaType::Video {
            (
                ev.frame_analysis.fake_frames.to_string(),
                format!("{:.3}", ev.temporal_analysis.consistency_score),
            )
        } else {
            (String::new(), String::new())
        };

        writeln!(
            writer,
            "{},{},{},{},{:.1},{},{},{},{},{},{}",
            escape(&r.file_name),
            escape(&r.file_path),
            r.media_type,
            r.prediction,
            r.confidence,
            ev.face_detection.detected,
            ev.regions.len(),
            ev.heatmaps.len(),
            suspicious,
            consistency,
            escape(r.error.as_deref().unwrap_or("")),
        )?;
    }

    Ok(())
}

/// Quote a field if it contains a separator, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
