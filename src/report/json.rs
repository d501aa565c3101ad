//! JSON report: summary plus every record with its full evidence bundle.

use crate::evidence::EvidenceRecord;
use crate::report::{sorted, Summary};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    summary: Summary,
    files: Vec<&'a EvidenceRecord>,
}

pub fn write<W: Write>(writer: &mut W, records: &[EvidenceRecord]) -> io::Result<()> {
    let report = JsonReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        summary: Summary::from_records(records),
        files: sorted(records),
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_records;

    #[test]
    fn test_json_shape() {
        let mut out = Vec::new();
        write(&mut out, &sample_records()).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(v["summary"]["total"], 3);
        assert_eq!(v["files"][0]["file_name"], "clip.json");
        assert_eq!(v["files"][0]["prediction"], "FAKE");
        assert_eq!(v["files"][0]["confidence"], 81.0);
        assert_eq!(v["files"][0]["evidence"]["heatmaps"].as_array().unwrap().len(), 3);
        assert_eq!(v["files"][2]["error"], "invalid JSON");
        // raw backend payload is not duplicated into the report
        assert!(v["files"][0].get("result").is_none());
    }
}
