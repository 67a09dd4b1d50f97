//! Directory batch driver
//!
//! Images are paired with responses by file stem. Each image is processed
//! independently; a failing image is logged and skipped.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use cellseg_algorithms::pipeline::{measure_segmentation, segment, SegmentationParams};
use cellseg_core::io::{read_tiff, write_label_tiff, write_output_record};

use crate::image_name;

const TIFF_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

pub struct BatchOptions {
    pub images_dir: PathBuf,
    pub responses_dir: PathBuf,
    pub output_dir: PathBuf,
    pub labels_dir: Option<PathBuf>,
    pub params: SegmentationParams,
    pub jobs: Option<usize>,
}

#[derive(Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TIFF_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// TIFF files directly inside `dir`, sorted by file name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory {}", dir.display()))?
            .path();
        if path.is_file() && is_tiff(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Response file in `responses_dir` sharing the image's stem
pub fn find_response(image: &Path, responses_dir: &Path) -> Option<PathBuf> {
    let stem = image.file_stem()?.to_string_lossy();
    TIFF_EXTENSIONS
        .iter()
        .map(|ext| responses_dir.join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.is_file())
}

fn process_one(image: &Path, options: &BatchOptions) -> Result<usize> {
    let name = image_name(image);
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.clone());

    let response_path = find_response(image, &options.responses_dir)
        .with_context(|| format!("{}: no response in {}", name, options.responses_dir.display()))?;

    let intensity = read_tiff(image).with_context(|| format!("Failed to read {}", image.display()))?;
    let response = read_tiff(&response_path)
        .with_context(|| format!("Failed to read {}", response_path.display()))?;

    let segmentation = segment(&response, &options.params).map_err(|e| e.for_image(&name))?;
    let record = measure_segmentation(&name, &segmentation, &intensity)?;

    // Record last, so it exists only when every output of the image was written
    if let Some(labels_dir) = &options.labels_dir {
        let path = labels_dir.join(format!("{}_labels.tif", stem));
        write_label_tiff(&segmentation.labels, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let output = options.output_dir.join(format!("{}.json", stem));
    write_output_record(&record, &output).map_err(|e| e.for_image(&name))?;

    debug!("{}: {} cells", name, record.cells.len());
    Ok(record.cells.len())
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

#[cfg(feature = "parallel")]
fn process_all(images: &[PathBuf], options: &BatchOptions, pb: &ProgressBar) -> Result<Vec<bool>> {
    use rayon::prelude::*;

    let work = || {
        images
            .par_iter()
            .map(|image| {
                let ok = report(image, process_one(image, options));
                pb.inc(1);
                ok
            })
            .collect::<Vec<bool>>()
    };

    match options.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("Failed to build worker pool")?;
            Ok(pool.install(work))
        }
        None => Ok(work()),
    }
}

#[cfg(not(feature = "parallel"))]
fn process_all(images: &[PathBuf], options: &BatchOptions, pb: &ProgressBar) -> Result<Vec<bool>> {
    if options.jobs.is_some() {
        warn!("--jobs ignored: built without the parallel feature");
    }
    Ok(images
        .iter()
        .map(|image| {
            let ok = report(image, process_one(image, options));
            pb.inc(1);
            ok
        })
        .collect())
}

fn report(image: &Path, result: Result<usize>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            error!("{}: {:#}", image.display(), e);
            false
        }
    }
}

/// Process every image in `options.images_dir`.
///
/// Fails only when a directory cannot be read or created; per-image failures
/// are counted in the summary.
pub fn run(options: &BatchOptions) -> Result<BatchSummary> {
    let images = list_images(&options.images_dir)?;
    if !options.responses_dir.is_dir() {
        anyhow::bail!("Responses directory not found: {}", options.responses_dir.display());
    }
    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("Failed to create {}", options.output_dir.display()))?;
    if let Some(labels_dir) = &options.labels_dir {
        std::fs::create_dir_all(labels_dir)
            .with_context(|| format!("Failed to create {}", labels_dir.display()))?;
    }

    if images.is_empty() {
        warn!("No TIFF images in {}", options.images_dir.display());
        return Ok(BatchSummary::default());
    }

    let pb = progress_bar(images.len());
    let outcomes = process_all(&images, options, &pb)?;
    pb.finish_and_clear();

    let processed = outcomes.iter().filter(|&&ok| ok).count();
    Ok(BatchSummary {
        processed,
        failed: outcomes.len() - processed,
    })
}
