//! stowage - storage utilization report with archival candidates.
//!
//! Usage:
//!   stowage [PATH]                 Report on PATH (defaults to .)
//!   stowage [PATH] -n 10           Show ten stale candidates
//!   stowage [PATH] --format json   Emit the report as JSON
//!   stowage --help                 Show help

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use stowage_analyze::{ScanConfig, ScanError, ScanPipeline, ScanResult};
use stowage_core::DEFAULT_STALE_COUNT;

#[derive(Parser)]
#[command(
    name = "stowage",
    version,
    about = "Storage utilization report with stale-file archival candidates",
    long_about = "stowage scans a directory, sums the size of every file in it, reports \
                  the capacity of the hosting volume and lists the least recently \
                  accessed files as candidates for archiving.\n\n\
                  Press Ctrl-C to cancel a running scan."
)]
struct Cli {
    /// Directory to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Number of stale candidates to report
    #[arg(short = 'n', long, default_value_t = DEFAULT_STALE_COUNT)]
    count: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Walker threads (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,

    /// Maximum depth to descend
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Skip entries whose name matches this glob (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,

    /// Follow symbolic links
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Stay on the filesystem of PATH; mount points are listed as skipped
    #[arg(short = 'x', long)]
    one_file_system: bool,

    /// Include every scanned file in the report
    #[arg(long)]
    files: bool,

    /// Print progress to stderr while scanning
    #[arg(short, long)]
    progress: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();

    let config = ScanConfig::builder()
        .root(cli.path.clone())
        .stale_count(cli.count)
        .threads(cli.threads)
        .max_depth(cli.max_depth)
        .ignore_patterns(cli.ignore.clone())
        .include_hidden(!cli.no_hidden)
        .follow_symlinks(cli.follow_symlinks)
        .cross_filesystems(!cli.one_file_system)
        .retain_records(cli.files)
        .build()
        .context("Invalid configuration")?;

    eprintln!("Scanning {}...", cli.path.display());

    let report = run_pipeline(config, cli.progress).await?;

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
    };

    match cli.output {
        Some(output_path) => {
            std::fs::write(&output_path, rendered)
                .with_context(|| format!("Cannot write {}", output_path.display()))?;
            eprintln!("Report written to {}", output_path.display());
        }
        None => {
            println!("{rendered}");
        }
    }

    Ok(())
}

/// Install the stderr log subscriber, `RUST_LOG` overriding the `warn` default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the scan on a blocking thread, cancelling it on Ctrl-C.
async fn run_pipeline(config: ScanConfig, show_progress: bool) -> Result<ScanResult> {
    let pipeline = ScanPipeline::new(config);
    let token = pipeline.cancellation_token();

    let progress_task = show_progress.then(|| {
        let mut progress_rx = pipeline.subscribe_progress();
        tokio::spawn(async move {
            while let Ok(progress) = progress_rx.recv().await {
                eprint!(
                    "\r {} files, {} dirs, {} ({:.0} files/s)",
                    progress.files_scanned,
                    progress.dirs_scanned,
                    format_size(progress.bytes_scanned),
                    progress.files_per_second()
                );
            }
            eprintln!();
        })
    });

    // jwalk drives its own rayon pool; keep it off the async workers
    let mut scan = tokio::task::spawn_blocking(move || pipeline.run());

    let joined = tokio::select! {
        joined = &mut scan => joined,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nCancelling scan...");
            token.cancel();
            scan.await
        }
    };

    if let Some(task) = progress_task {
        let _ = task.await;
    }

    match joined.context("Scan task failed")? {
        Ok(report) => Ok(report),
        Err(ScanError::Cancelled) => bail!("Scan cancelled"),
        Err(err) => Err(err).context("Scan failed"),
    }
}

/// Render the report for a terminal.
fn render_text(report: &ScanResult) -> String {
    let mut out = String::new();
    let rule = "─".repeat(70);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, " {}", report.target.display());
    let _ = writeln!(out, "{rule}");

    if report.volume_measured {
        let _ = writeln!(
            out,
            " Volume:          {} total, {} used, {} free",
            format_size(report.volume.total_bytes),
            format_size(report.volume.used_bytes),
            format_size(report.volume.free_bytes)
        );
    } else {
        let _ = writeln!(out, " Volume:          unavailable");
    }
    let _ = writeln!(
        out,
        " Files:           {} in {} files",
        format_size(report.total_file_bytes),
        report.file_count
    );
    let _ = writeln!(
        out,
        " Directory size:  {}",
        format_size(report.directory_size())
    );
    let _ = writeln!(
        out,
        " Share of volume: {} {:.1}%",
        make_bar(report.file_share(), 20),
        report.file_share() * 100.0
    );
    let _ = writeln!(out);

    if report.stale_candidates.is_empty() {
        let _ = writeln!(out, " No files found to consider archiving.");
    } else {
        let _ = writeln!(out, " Oldest accessed files to consider archiving:");
        for path in &report.stale_candidates {
            let _ = writeln!(out, "   {}", path.display());
        }
    }

    if !report.files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, " Files:");
        for record in &report.files {
            let _ = writeln!(
                out,
                "   {:>10}  {}",
                format_size(record.size_bytes),
                record.path.display()
            );
        }
    }

    if report.has_skipped() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            " {} entr{} skipped:",
            report.skipped.len(),
            if report.skipped.len() == 1 { "y" } else { "ies" }
        );
        for warning in &report.skipped {
            let _ = writeln!(out, "   {}", warning.message);
        }
    }

    let scanned_at: DateTime<Local> = report.scanned_at.into();
    let _ = writeln!(out);
    let _ = write!(
        out,
        " Scanned in {:.2}s at {}",
        report.scan_duration.as_secs_f64(),
        scanned_at.format("%Y-%m-%d %H:%M:%S")
    );

    out
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0)) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
