//! Per-image segmentation and measurement pipeline
//!
//! response → binarize → distance transform → seeds → watershed → area filter
//! → region properties → output record.
//!
//! Every grid lives only for the duration of one call; nothing is shared
//! between images, so callers may run images on separate threads freely.

use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;
use cellseg_core::io::{write_output_record, InstanceRecord, OutputRecord};
use cellseg_core::raster::Grid;
use cellseg_core::{Error, Result};

use crate::measure::region_properties;
use crate::segmentation::{
    binarize, distance_transform, extract_seeds, filter_small_instances, instance_areas,
    validate_neighborhood, watershed, SeedParams,
};

/// Tunable policy of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    /// Response values strictly above this are foreground
    pub threshold: f64,
    /// Instances with fewer pixels are discarded
    pub min_area: usize,
    /// Side of the square window used to find distance maxima (odd, >= 3)
    pub seed_neighborhood: usize,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_area: 50,
            seed_neighborhood: 3,
        }
    }
}

impl SegmentationParams {
    /// Reject parameter values no image could be processed with
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(Error::InvalidParameter {
                name: "threshold",
                value: self.threshold.to_string(),
                reason: "threshold must be a finite number".to_string(),
            });
        }
        validate_neighborhood(self.seed_neighborhood)
    }
}

/// Intermediate and final grids of one segmentation run
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub mask: Grid<bool>,
    pub distance: Grid<f64>,
    pub seeds: Grid<u32>,
    pub seed_count: u32,
    /// Watershed labels before area filtering
    pub raw_labels: Grid<u32>,
    /// Labels that survived the area filter
    pub labels: Grid<u32>,
}

/// Separate the instances of a segmentation response.
pub fn segment(response: &Grid<f64>, params: &SegmentationParams) -> Result<Segmentation> {
    params.validate()?;

    let mask = binarize(response, params.threshold)?;
    let distance = distance_transform(&mask)?;
    let (seeds, seed_count) = extract_seeds(
        &distance,
        SeedParams {
            neighborhood: params.seed_neighborhood,
        },
    )?;
    let raw_labels = watershed(&mask, &seeds, &distance)?;
    let labels = filter_small_instances(&raw_labels, params.min_area);

    debug!(
        "foreground={} seeds={} instances={} kept={}",
        mask.count_true(),
        seed_count,
        instance_areas(&raw_labels).len(),
        instance_areas(&labels).len()
    );

    Ok(Segmentation {
        mask,
        distance,
        seeds,
        seed_count,
        raw_labels,
        labels,
    })
}

/// Segment `response` and measure every surviving instance against `intensity`.
///
/// Fails with [`Error::SizeMismatch`] if the two grids differ in shape.
pub fn extract_cells(
    response: &Grid<f64>,
    intensity: &Grid<f64>,
    params: &SegmentationParams,
) -> Result<Vec<InstanceRecord>> {
    let segmentation = segment(response, params)?;
    region_properties(&segmentation.labels, intensity)
}

/// Measure an existing segmentation into the output record of one image.
///
/// Lets callers that also keep the label map avoid segmenting twice. Errors
/// carry `image_name`.
pub fn measure_segmentation(
    image_name: &str,
    segmentation: &Segmentation,
    intensity: &Grid<f64>,
) -> Result<OutputRecord> {
    region_properties(&segmentation.labels, intensity)
        .map(|cells| OutputRecord::new(image_name, cells))
        .map_err(|e| e.for_image(image_name))
}

/// Build the output record of one image without writing it.
///
/// Errors carry `image_name`.
pub fn build_record(
    image_name: &str,
    response: &Grid<f64>,
    intensity: &Grid<f64>,
    params: &SegmentationParams,
) -> Result<OutputRecord> {
    let segmentation = segment(response, params).map_err(|e| e.for_image(image_name))?;
    measure_segmentation(image_name, &segmentation, intensity)
}

/// Run the whole pipeline on one image and write its record to `output`.
///
/// Nothing is written when segmentation or measurement fails. Errors carry
/// `image_name`.
pub fn process_image(
    image_name: &str,
    response: &Grid<f64>,
    intensity: &Grid<f64>,
    params: &SegmentationParams,
    output: &Path,
) -> Result<OutputRecord> {
    let record = build_record(image_name, response, intensity, params)?;
    write_output_record(&record, output).map_err(|e| e.for_image(image_name))?;
    debug!("{}: {} cells -> {}", image_name, record.cells.len(), output.display());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SegmentationParams::default();
        assert_eq!(params.threshold, 0.5);
        assert_eq!(params.min_area, 50);
        assert_eq!(params.seed_neighborhood, 3);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_validation() {
        let bad_threshold = SegmentationParams {
            threshold: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            bad_threshold.validate(),
            Err(Error::InvalidParameter { name: "threshold", .. })
        ));

        let bad_window = SegmentationParams {
            seed_neighborhood: 2,
            ..Default::default()
        };
        assert!(bad_window.validate().is_err());
    }

    #[test]
    fn test_params_partial_json_uses_defaults() {
        let params: SegmentationParams = serde_json::from_str(r#"{"min_area": 20}"#).unwrap();
        assert_eq!(params.min_area, 20);
        assert_eq!(params.threshold, 0.5);
        assert_eq!(params.seed_neighborhood, 3);
    }

    #[test]
    fn test_errors_carry_image_name() {
        let response = Grid::filled(8, 8, 1.0);
        let intensity = Grid::filled(8, 9, 1.0);
        let err = build_record("cells_01.tiff", &response, &intensity, &SegmentationParams::default())
            .unwrap_err();

        match err {
            Error::Image { name, source } => {
                assert_eq!(name, "cells_01.tiff");
                assert!(matches!(*source, Error::SizeMismatch { .. }));
            }
            other => panic!("expected Image error, got {:?}", other),
        }
    }

    #[test]
    fn test_measure_segmentation_matches_build_record() {
        let mut response = Grid::filled(16, 16, 0.0);
        for r in 3..13 {
            for c in 4..12 {
                response.set(r, c, 1.0).unwrap();
            }
        }
        let intensity = response.map(|v| v * 7.0);
        let params = SegmentationParams::default();

        let seg = segment(&response, &params).unwrap();
        let measured = measure_segmentation("block.tif", &seg, &intensity).unwrap();
        let built = build_record("block.tif", &response, &intensity, &params).unwrap();
        assert_eq!(measured, built);
        assert_eq!(measured.cells.len(), 1);

        let err = measure_segmentation("block.tif", &seg, &Grid::filled(16, 17, 0.0)).unwrap_err();
        assert!(matches!(err, Error::Image { .. }));
    }

    #[test]
    fn test_segment_keeps_filter_subset_of_watershed() {
        let mut response = Grid::filled(20, 20, 0.0);
        for r in 2..12 {
            for c in 2..12 {
                response.set(r, c, 1.0).unwrap();
            }
        }
        for r in 15..18 {
            for c in 15..18 {
                response.set(r, c, 1.0).unwrap();
            }
        }

        let seg = segment(&response, &SegmentationParams::default()).unwrap();
        for ((r, c), &label) in seg.labels.data().indexed_iter() {
            let raw = seg.raw_labels.get(r, c).unwrap();
            assert!(label == raw || label == 0);
        }
        assert_eq!(instance_areas(&seg.labels).len(), 1);
        assert_eq!(seg.labels.get(16, 16).unwrap(), 0, "9-pixel blob is filtered");
    }
}
