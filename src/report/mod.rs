//! Report generation for derived evidence
//!
//! Output formatters for a batch of [`EvidenceRecord`]s:
//!
//! - **HTML**: Self-contained page with summary cards, per-file region
//!   previews drawn as SVG, and heatmap bars
//! - **JSON**: Machine-readable format for programmatic consumption
//! - **CSV**: Spreadsheet-compatible format for bulk review
//!
//! # Usage
//!
//! ```ignore
//! use deepview::report;
//!
//! // Automatically picks format based on extension
//! report::generate("report.html", &records)?;  // HTML
//! report::generate("report.json", &records)?;  // JSON
//! report::generate("report.csv", &records)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;

use crate::evidence::EvidenceRecord;
use crate::model::Prediction;
use serde::Serialize;
use std::cmp::Ordering;
use std::io;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, records: &[EvidenceRecord]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, records),
        "json" => json::write(&mut file, records),
        _ => csv::write(&mut file, records),
    }
}

/// Summary statistics for a batch of records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub real: usize,
    pub fake: usize,
    pub unknown: usize,
    pub error: usize,
}

impl Summary {
    pub fn from_records(records: &[EvidenceRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for r in records {
            if r.is_error() {
                summary.error += 1;
                continue;
            }
            match r.prediction {
                Prediction::Real => summary.real += 1,
                Prediction::Fake => summary.fake += 1,
                Prediction::Unknown => summary.unknown += 1,
            }
        }

        summary
    }
}

/// Report order: FAKE first, then by confidence, errors last.
pub(crate) fn sorted(records: &[EvidenceRecord]) -> Vec<&EvidenceRecord> {
    let rank = |r: &EvidenceRecord| match (r.is_error(), r.prediction) {
        (true, _) => 3,
        (false, Prediction::Fake) => 0,
        (false, Prediction::Unknown) => 1,
        (false, Prediction::Real) => 2,
    };
    let mut sorted: Vec<_> = records.iter().collect();
    sorted.sort_by(|a, b| {
        rank(a)
            .cmp(&rank(b))
            .then(b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal))
    });
    sorted
}
