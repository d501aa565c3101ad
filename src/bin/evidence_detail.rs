//! Per-frame breakdown of the temporal consistency score for result files

use deepview::config::Settings;
use deepview::evidence::{frames, temporal};
use deepview::model::FrameResult;
use deepview::{AnalysisResult, DeriveOptions};
use std::env;
use std::fs;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: evidence_detail <result.json> [more.json ...]");
        std::process::exit(1);
    }

    let options = Settings::load().map(|s| s.derive).unwrap_or_default();
    let mut failed = false;

    for path in &args[1..] {
        println!("\n{}", "=".repeat(72));
        println!("FILE: {}", path);
        println!("{}", "=".repeat(72));
        if let Err(e) = detail_file(path, &options) {
            eprintln!("  {}", e);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn detail_file(path: &str, options: &DeriveOptions) -> deepview::Result<()> {
    let text = fs::read_to_string(path)?;
    let result = AnalysisResult::from_json_str(&text)?;
    let results = result.frame_results();

    println!("Type: {}  Prediction: {}  Frames: {}", result.media_type, result.prediction, results.len());
    if results.is_empty() {
        println!("No per-frame results.");
        return Ok(());
    }

    println!(
        "\n{:>6} {:>8} {:<8} {:>6} {:>7}  {}",
        "FRAME", "TIME", "PRED", "CONF", "DELTA", "NOTES"
    );
    println!("{}", "-".repeat(72));

    let mut previous: Option<&FrameResult> = None;
    for frame in results {
        let mut notes = Vec::new();
        let delta = previous.map(|p| frame.confidence - p.confidence);
        if let Some(p) = previous {
            if (frame.confidence - p.confidence).abs() > options.sudden_change {
                notes.push("sudden".to_string());
            }
            if frame.prediction != p.prediction {
                notes.push("swap".to_string());
            }
        }
        if frames::is_suspicious(frame, options.suspicious_confidence) {
            notes.extend(frames::suspicious_reasons(frame, options.suspicious_confidence));
        }

        println!(
            "{:>6} {:>8} {:<8} {:>6.3} {:>7}  {}",
            frame.frame_number,
            frame.timestamp.map(|t| format!("{:.2}s", t)).unwrap_or_else(|| "-".into()),
            frame.prediction.to_string(),
            frame.confidence,
            delta.map(|d| format!("{:+.3}", d)).unwrap_or_else(|| "-".into()),
            notes.join(", ")
        );
        previous = Some(frame);
    }

    let analysis = temporal::analyze(results, options);
    let motion = &analysis.motion_analysis;
    let n = results.len() as f64;

    println!("\nMean confidence:   {:.3}", motion.average_confidence);
    println!("Variance:          {:.4}  (penalty {:.3})", motion.confidence_variance, (4.0 * motion.confidence_variance).min(1.0));
    println!("Sudden changes:    {}  (penalty {:.3})", motion.sudden_changes, motion.sudden_changes as f64 / n);
    println!("Prediction swaps:  {}  (penalty {:.3})", motion.prediction_swaps, motion.prediction_swaps as f64 / n);
    println!("Consistency score: {:.3}  ({})", analysis.consistency_score, analysis.label());

    Ok(())
}
