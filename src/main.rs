use chrono::Local;
use clap::{Parser, Subcommand};
use deepview::config::Settings;
use deepview::evidence::EvidenceRecord;
use deepview::palette::Severity;
use deepview::serve::ServerState;
use deepview::{scan, Deriver, MediaType, Prediction};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "deepview")]
#[command(author, version, about = "Derive visual evidence from deepfake detection results")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Result file or directory of result files (.json)
    path: Option<PathBuf>,

    /// Output report file (.html, .json, .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports (default from config: deepview-reports)
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Don't auto-generate an HTML report
    #[arg(long)]
    no_report: bool,

    /// Don't prompt to open report
    #[arg(long)]
    no_open: bool,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Confidence below which a frame counts as suspicious
    #[arg(long)]
    suspicious_confidence: Option<f64>,

    /// Show detailed evidence
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive viewer
    Serve {
        /// File or directory of results to serve
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Port to listen on (default from config: 3001)
        #[arg(short, long)]
        port: Option<u16>,

        /// Don't open a browser
        #[arg(long)]
        no_open: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deepview=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();

    let mut settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(threshold) = args.suspicious_confidence {
        settings.derive.suspicious_confidence = threshold;
    }
    debug!(?settings, "loaded settings");

    let deriver = Deriver::new().with_options(settings.derive);

    // Handle subcommands first
    if let Some(Command::Serve { path, port, no_open }) = args.command {
        if let Some(port) = port {
            settings.server.port = port;
        }
        let state = ServerState::new(path, deriver);
        if let Err(e) = deepview::serve::start(&settings.server, state, !no_open) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let Some(path) = args.path.clone() else {
        eprintln!("Usage: deepview <PATH>");
        eprintln!("Run 'deepview --help' for more options.");
        std::process::exit(1);
    };

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files = scan::collect_result_files(&path);
    if files.is_empty() {
        eprintln!("No result files found (expected .json analysis results)");
        std::process::exit(1);
    }

    if !args.quiet {
        eprintln!("\x1b[1mdeepview - Deepfake Evidence Viewer\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} result file(s)\n", files.len());
    }

    // Set up progress bar
    let pb = if !args.quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    // Derive in parallel
    let records: Vec<EvidenceRecord> = files
        .par_iter()
        .map(|path| {
            let record = deriver.derive_file(path);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(record.file_name.clone());
            }
            record
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if !args.quiet {
        for r in &records {
            print_record(r, args.verbose);
        }
    }

    let summary = deepview::report::Summary::from_records(&records);

    if !args.quiet {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  \x1b[32m✓ Real:\x1b[0m    {}", summary.real);
        eprintln!("  \x1b[31m✗ Fake:\x1b[0m    {}", summary.fake);
        if summary.unknown > 0 {
            eprintln!("  \x1b[33m? Unknown:\x1b[0m {}", summary.unknown);
        }
        if summary.error > 0 {
            eprintln!("  \x1b[90mErrors:\x1b[0m    {}", summary.error);
        }
    }

    // Determine report path
    let report_path = if let Some(ref output) = args.output {
        Some(output.clone())
    } else if !args.no_report {
        let dir = args.report_dir.clone().unwrap_or(settings.report.dir.clone());
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create report directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        Some(dir.join(format!("deepview_report_{}.html", timestamp)))
    } else {
        None
    };

    if let Some(ref output_path) = report_path {
        if let Err(e) = deepview::report::generate(output_path, &records) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }

        if !args.no_open && !args.quiet {
            eprint!("\nOpen report in browser? [Y/n] ");
            io::stderr().flush().ok();

            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_ok() {
                let input = input.trim().to_lowercase();
                if input.is_empty() || input == "y" || input == "yes" {
                    if let Err(e) = open::that(output_path) {
                        eprintln!("Failed to open report: {}", e);
                    }
                }
            }
        }
    }

    if !args.quiet {
        eprintln!("\n\x1b[90mDone.\x1b[0m");
    }

    // Exit with appropriate code
    if summary.fake > 0 {
        std::process::exit(2);
    } else if summary.error > 0 {
        std::process::exit(1);
    }
}

fn print_record(r: &EvidenceRecord, verbose: bool) {
    let reset = "\x1b[0m";
    if let Some(ref error) = r.error {
        println!("\x1b[90m{:<9}{} {:<40}  {}", "[ERROR]", reset, truncate(&r.file_name, 40), error);
        return;
    }

    let color = match r.prediction {
        Prediction::Real => "\x1b[32m",
        Prediction::Fake => "\x1b[31m",
        Prediction::Unknown => "\x1b[33m",
    };
    let ev = &r.evidence;
    let extra = match r.media_type {
        MediaType::Video => format!(
            "{}/{} frames suspicious, temporal {:.3}",
            ev.frame_analysis.fake_frames,
            ev.frame_analysis.total_frames,
            ev.temporal_analysis.consistency_score
        ),
        MediaType::Image => format!(
            "face={} regions={}",
            if ev.face_detection.detected { "yes" } else { "no" },
            ev.regions.len()
        ),
        MediaType::Audio | MediaType::Unknown => String::new(),
    };

    println!(
        "{}{:<9}{} {:>5.1}%  {:<6}  {:<40}  {}",
        color,
        format!("[{}]", r.prediction),
        reset,
        r.confidence,
        r.media_type,
        truncate(&r.file_name, 40),
        extra
    );

    if verbose {
        if r.media_type == MediaType::Video {
            let motion = &ev.temporal_analysis.motion_analysis;
            eprintln!(
                "    Temporal: {} mean={:.3} variance={:.4} sudden={} swaps={}",
                ev.temporal_analysis.label(),
                motion.average_confidence,
                motion.confidence_variance,
                motion.sudden_changes,
                motion.prediction_swaps
            );
        }
        for (key, score) in &ev.forensic.anomaly_scores {
            eprintln!(
                "    Forensic: {:<10} {:.3} ({} risk)",
                key,
                score.score,
                Severity::from_forensic_score(score.score)
            );
        }
        for region in &ev.regions {
            let b = &region.bounds;
            eprintln!(
                "    Region: {:<24} x={:.0} y={:.0} {:.0}x{:.0}",
                region.description, b.x, b.y, b.width, b.height
            );
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
