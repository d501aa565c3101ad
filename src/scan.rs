//! Finding result files on disk and deriving them in parallel.

use crate::evidence::{Deriver, EvidenceRecord};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions accepted as backend result files.
pub const RESULT_EXTENSIONS: &[&str] = &["json"];

fn is_result_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RESULT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// A single file is taken as-is; directories are walked for `.json` files.
///
/// Results are sorted so batches are reproducible.
pub fn collect_result_files(path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_result_file(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect()
    } else if path.exists() {
        vec![path.to_path_buf()]
    } else {
        vec![]
    };
    files.sort();
    files
}

pub fn derive_files(deriver: &Deriver, files: &[PathBuf]) -> Vec<EvidenceRecord> {
    files.par_iter().map(|p| deriver.derive_file(p)).collect()
}
