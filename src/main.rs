use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use jwalk::WalkDir;
use std::collections::HashSet;
use std::path::PathBuf;

use filehasher::export;
use filehasher::hash::{
    AlgorithmId, AlgorithmSet, BatchEngine, BatchProgress, BatchReport, FileStatus, HashJob,
    DEFAULT_CHUNK_SIZE,
};

/// Compute MD5 / SHA-1 / SHA-256 / SHA-512 digests for a batch of files
#[derive(Parser)]
#[command(name = "filehasher", version)]
struct Cli {
    /// Files or directories to hash (directories are expanded recursively)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Comma-separated algorithms, in desired output order
    #[arg(short, long, value_delimiter = ',', default_value = "md5")]
    algorithms: Vec<AlgorithmId>,

    /// Export results to a CSV file
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Read chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Cap concurrent hash tasks (0 = CPU core count; default: one task per file)
    #[arg(long)]
    max_tasks: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration is validated before any job is created
    let algorithms = AlgorithmSet::new(&cli.algorithms)?;
    let files = collect_input_files(&cli.paths);
    if files.is_empty() {
        bail!("No files to hash");
    }

    let job = HashJob::new(files, algorithms)?;
    let cancel = job.cancel_token();

    let pb = ProgressBar::new(job.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) | {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let max_tasks = cli
        .max_tasks
        .map(|n| if n == 0 { num_cpus::get() } else { n });

    let pb_progress = pb.clone();
    let engine = BatchEngine::new()
        .with_chunk_size(cli.chunk_size)
        .with_max_tasks(max_tasks)
        .with_progress_callback(move |progress: BatchProgress| {
            pb_progress.set_position(progress.files_completed as u64);
            pb_progress.set_message(progress.current_file);
        });

    // Ctrl-C requests cooperative cancellation; in-flight chunks finish first
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let report = tokio::task::spawn_blocking(move || engine.run(job)).await?;
    pb.finish_and_clear();

    print_results(&report);

    if let Some(ref csv_path) = cli.csv {
        export::export_csv(csv_path, &report.entries, &report.algorithms)?;
        println!("Results written to: {}", csv_path.display());
    }

    Ok(())
}

/// Expand files and directories into a deduplicated file list, preserving
/// first-seen order
fn collect_input_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for path in paths {
        if path.is_dir() {
            for entry_result in WalkDir::new(path)
                .skip_hidden(false)
                .follow_links(false)
            {
                match entry_result {
                    Ok(entry) => {
                        if entry.file_type().is_file() {
                            let file_path = entry.path();
                            if seen.insert(file_path.clone()) {
                                files.push(file_path);
                            }
                        }
                    }
                    Err(e) => {
                        eprintln!("Warning: Error walking directory: {}", e);
                    }
                }
            }
        } else if seen.insert(path.clone()) {
            // Missing files stay in the batch and surface as per-file errors
            files.push(path.clone());
        }
    }

    files
}

fn print_results(report: &BatchReport) {
    for entry in &report.entries {
        let status = match entry.status {
            FileStatus::Done => "done".green(),
            FileStatus::Error => "error".red(),
            FileStatus::Cancelled => "cancelled".yellow(),
            FileStatus::Pending | FileStatus::Computing => "pending".normal(),
        };

        println!(
            "{} [{}] ({})",
            entry.path.display(),
            status,
            export::format_file_size(entry.size_bytes)
        );

        match entry.status {
            FileStatus::Done => {
                for (id, hex) in &entry.digests {
                    println!("  {:<8} {}", id.name(), hex);
                }
            }
            FileStatus::Error => {
                if let Some(ref message) = entry.error {
                    println!("  {}", message.red());
                }
            }
            _ => {}
        }
    }

    println!();
    println!("{}", report.summary());
    println!(
        "Total bytes: {} | Duration: {:.2}s",
        export::format_file_size(report.total_bytes),
        report.duration.as_secs_f64()
    );
}
