//! Region properties of a label map
//!
//! One pass over the label map accumulates, per label, pixel count,
//! coordinate moments, bounding box, boundary pixels and intensity sum.
//! Records come out ascending by label.
//!
//! - centroid: mean (row, col)
//! - perimeter: pixels with a 4-neighbor of another label or off the image
//! - eccentricity: `sqrt(1 - λ2/λ1)` from the eigenvalues of the coordinate
//!   covariance matrix (0 for a disk, 1 for a straight line)

use std::collections::BTreeMap;
use cellseg_core::io::InstanceRecord;
use cellseg_core::raster::{Grid, ROOK_OFFSETS};
use cellseg_core::{Algorithm, Error, Result};

/// Inputs to region measurement
#[derive(Debug, Clone)]
pub struct RegionInput {
    pub labels: Grid<u32>,
    pub intensity: Grid<f64>,
}

/// Region properties algorithm
#[derive(Debug, Clone, Default)]
pub struct RegionProperties;

impl Algorithm for RegionProperties {
    type Input = RegionInput;
    type Output = Vec<InstanceRecord>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Region Properties"
    }

    fn description(&self) -> &'static str {
        "Shape and intensity descriptors for every labeled instance"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        region_properties(&input.labels, &input.intensity)
    }
}

#[derive(Debug, Clone)]
struct RegionAccumulator {
    count: usize,
    sum_r: f64,
    sum_c: f64,
    sum_rr: f64,
    sum_cc: f64,
    sum_rc: f64,
    min_r: usize,
    min_c: usize,
    max_r: usize,
    max_c: usize,
    boundary: usize,
    intensity_sum: f64,
}

impl RegionAccumulator {
    fn new(row: usize, col: usize) -> Self {
        Self {
            count: 0,
            sum_r: 0.0,
            sum_c: 0.0,
            sum_rr: 0.0,
            sum_cc: 0.0,
            sum_rc: 0.0,
            min_r: row,
            min_c: col,
            max_r: row,
            max_c: col,
            boundary: 0,
            intensity_sum: 0.0,
        }
    }

    fn add(&mut self, row: usize, col: usize, intensity: f64, on_boundary: bool) {
        let (r, c) = (row as f64, col as f64);
        self.count += 1;
        self.sum_r += r;
        self.sum_c += c;
        self.sum_rr += r * r;
        self.sum_cc += c * c;
        self.sum_rc += r * c;
        self.min_r = self.min_r.min(row);
        self.min_c = self.min_c.min(col);
        self.max_r = self.max_r.max(row);
        self.max_c = self.max_c.max(col);
        if on_boundary {
            self.boundary += 1;
        }
        self.intensity_sum += intensity;
    }

    fn into_record(self, id: u32) -> InstanceRecord {
        let n = self.count as f64;
        let mean_r = self.sum_r / n;
        let mean_c = self.sum_c / n;

        // Central second moments
        let var_r = (self.sum_rr / n - mean_r * mean_r).max(0.0);
        let var_c = (self.sum_cc / n - mean_c * mean_c).max(0.0);
        let cov = self.sum_rc / n - mean_r * mean_c;

        InstanceRecord {
            id,
            centroid: [mean_r, mean_c],
            area: n,
            perimeter: self.boundary as f64,
            eccentricity: eccentricity(var_r, var_c, cov),
            bounding_box: [self.min_r, self.min_c, self.max_r, self.max_c],
            mean_intensity: self.intensity_sum / n,
        }
    }
}

/// Eccentricity of the ellipse with covariance `[[var_r, cov], [cov, var_c]]`
fn eccentricity(var_r: f64, var_c: f64, cov: f64) -> f64 {
    let half_trace = (var_r + var_c) / 2.0;
    let spread = (((var_r - var_c) / 2.0).powi(2) + cov * cov).sqrt();
    let major = half_trace + spread;
    let minor = (half_trace - spread).max(0.0);

    if major <= f64::EPSILON {
        return 0.0;
    }
    (1.0 - minor / major).clamp(0.0, 1.0).sqrt()
}

/// Measure every labeled instance in `labels`.
///
/// # Arguments
/// * `labels` - Label map (0 = background)
/// * `intensity` - Intensity image, same shape as `labels`
///
/// # Returns
/// One record per distinct positive label, ascending by label. Fails with
/// [`Error::SizeMismatch`] when the two grids differ in shape.
pub fn region_properties(labels: &Grid<u32>, intensity: &Grid<f64>) -> Result<Vec<InstanceRecord>> {
    labels.ensure_same_shape(intensity)?;

    let mut regions: BTreeMap<u32, RegionAccumulator> = BTreeMap::new();

    for ((row, col), &label) in labels.data().indexed_iter() {
        if label == 0 {
            continue;
        }

        let on_boundary = ROOK_OFFSETS.iter().any(|&(dr, dc)| {
            match labels.offset(row, col, dr, dc) {
                Some((nr, nc)) => labels.data()[(nr, nc)] != label,
                None => true,
            }
        });

        regions
            .entry(label)
            .or_insert_with(|| RegionAccumulator::new(row, col))
            .add(row, col, intensity.data()[(row, col)], on_boundary);
    }

    Ok(regions
        .into_iter()
        .map(|(id, acc)| acc.into_record(id))
        .collect())
}
