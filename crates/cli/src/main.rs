//! cellseg CLI - Instance segmentation of microscopy responses

mod batch;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use cellseg_algorithms::pipeline::{process_image, SegmentationParams};
use cellseg_core::io::{read_output_record, read_tiff};
use cellseg_core::Grid;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cellseg")]
#[command(author, version, about = "Instance segmentation of microscopy images", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment one image and write its cell record
    Process {
        /// Intensity image (TIFF)
        image: PathBuf,
        /// Segmentation response for the image (TIFF)
        response: PathBuf,
        /// Output record (JSON)
        output: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Segment every image in a directory
    Batch {
        /// Directory of intensity images
        images_dir: PathBuf,
        /// Directory of responses, matched to images by file stem
        responses_dir: PathBuf,
        /// Directory receiving one <stem>.json per image
        output_dir: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
        /// Number of worker threads (default: all cores)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Also write each label map as <stem>_labels.tif here
        #[arg(long)]
        labels_dir: Option<PathBuf>,
    },
    /// Summarize a cell record
    Inspect {
        /// Record file (JSON)
        input: PathBuf,
    },
}

#[derive(Args, Clone, Default)]
struct ParamArgs {
    /// JSON file with segmentation parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Response values above this are foreground
    #[arg(short, long)]
    threshold: Option<f64>,
    /// Minimum instance area in pixels
    #[arg(short, long)]
    min_area: Option<usize>,
    /// Window side for seed detection (odd, >= 3)
    #[arg(short, long)]
    seed_neighborhood: Option<usize>,
}

impl ParamArgs {
    fn resolve(&self) -> Result<SegmentationParams> {
        let mut params = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => SegmentationParams::default(),
        };

        if let Some(threshold) = self.threshold {
            params.threshold = threshold;
        }
        if let Some(min_area) = self.min_area {
            params.min_area = min_area;
        }
        if let Some(size) = self.seed_neighborhood {
            params.seed_neighborhood = size;
        }

        params.validate().context("Invalid segmentation parameters")?;
        Ok(params)
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_grid(path: &Path) -> Result<Grid<f64>> {
    let pb = spinner("Reading image...");
    let grid = read_tiff(path).with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", grid.cols(), grid.rows());
    let stats = grid.statistics();
    if let (Some(min), Some(max)) = (stats.min, stats.max) {
        debug!("{}: range {:.4} .. {:.4}, {} valid pixels", path.display(), min, max, stats.valid_count);
    }
    Ok(grid)
}

/// File name used as the record's image identifier
pub(crate) fn image_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Process ──────────────────────────────────────────────────
        Commands::Process {
            image,
            response,
            output,
            params,
        } => {
            let params = params.resolve()?;
            let intensity = read_grid(&image)?;
            let response_grid = read_grid(&response)?;

            let start = Instant::now();
            let pb = spinner("Segmenting...");
            let record = process_image(
                &image_name(&image),
                &response_grid,
                &intensity,
                &params,
                &output,
            )
            .context("Failed to process image")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            info!("{} cells", record.cells.len());
            done("Cell record", &output, elapsed);
        }

        // ── Batch ────────────────────────────────────────────────────
        Commands::Batch {
            images_dir,
            responses_dir,
            output_dir,
            params,
            jobs,
            labels_dir,
        } => {
            let options = batch::BatchOptions {
                images_dir,
                responses_dir,
                output_dir,
                labels_dir,
                params: params.resolve()?,
                jobs,
            };
            let start = Instant::now();
            let summary = batch::run(&options)?;
            println!(
                "Processed {} images ({} failed)",
                summary.processed, summary.failed
            );
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        // ── Inspect ──────────────────────────────────────────────────
        Commands::Inspect { input } => {
            let record = read_output_record(&input)
                .with_context(|| format!("Failed to read record {}", input.display()))?;

            println!("File: {}", input.display());
            println!("Image: {}", record.image_name);
            println!("Cells: {}", record.cells.len());
            if !record.cells.is_empty() {
                let n = record.cells.len() as f64;
                let total_area: f64 = record.cells.iter().map(|c| c.area).sum();
                let mean_ecc: f64 = record.cells.iter().map(|c| c.eccentricity).sum::<f64>() / n;
                let min_area = record.cells.iter().map(|c| c.area).fold(f64::INFINITY, f64::min);
                let max_area = record.cells.iter().map(|c| c.area).fold(0.0, f64::max);

                println!("\nStatistics:");
                println!("  Area: min {:.0}, max {:.0}, mean {:.1}", min_area, max_area, total_area / n);
                println!("  Mean eccentricity: {:.4}", mean_ecc);
            }
        }
    }

    Ok(())
}
