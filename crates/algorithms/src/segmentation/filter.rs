//! Minimum-area instance filter
//!
//! Zeroes out labels smaller than a minimum pixel count. Surviving labels
//! keep their numbers, so the label set may have gaps afterwards.

use std::collections::BTreeMap;
use cellseg_core::raster::Grid;
use cellseg_core::{Algorithm, Error, Result};

/// Parameters for the area filter
#[derive(Debug, Clone)]
pub struct AreaFilterParams {
    /// Labels with fewer pixels than this become background
    pub min_area: usize,
}

impl Default for AreaFilterParams {
    fn default() -> Self {
        Self { min_area: 50 }
    }
}

/// Area filter algorithm
#[derive(Debug, Clone, Default)]
pub struct AreaFilter;

impl Algorithm for AreaFilter {
    type Input = Grid<u32>;
    type Output = Grid<u32>;
    type Params = AreaFilterParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Area Filter"
    }

    fn description(&self) -> &'static str {
        "Remove labeled instances below a minimum pixel area"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        Ok(filter_small_instances(&input, params.min_area))
    }
}

/// Pixel count of every positive label, ascending by label
pub fn instance_areas(labels: &Grid<u32>) -> BTreeMap<u32, usize> {
    let mut areas = BTreeMap::new();
    for &label in labels.data().iter() {
        if label > 0 {
            *areas.entry(label).or_insert(0) += 1;
        }
    }
    areas
}

/// Remove every label whose area is below `min_area`.
///
/// Area is counted per label, not per connected piece.
pub fn filter_small_instances(labels: &Grid<u32>, min_area: usize) -> Grid<u32> {
    let areas = instance_areas(labels);
    labels.map(|label| match areas.get(&label) {
        Some(&area) if area < min_area => 0,
        _ => label,
    })
}
