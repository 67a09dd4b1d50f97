//! Mask binarization
//!
//! Turns a continuous model response into a foreground/background mask.
//! Values equal to the threshold are background, as is NaN.

use crate::maybe_rayon::*;
use cellseg_core::raster::Grid;
use cellseg_core::{Algorithm, Error, Result};

/// Parameters for binarization
#[derive(Debug, Clone)]
pub struct BinarizeParams {
    /// Foreground iff response > threshold
    pub threshold: f64,
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Binarization algorithm
#[derive(Debug, Clone, Default)]
pub struct Binarize;

impl Algorithm for Binarize {
    type Input = Grid<f64>;
    type Output = Grid<bool>;
    type Params = BinarizeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Binarize"
    }

    fn description(&self) -> &'static str {
        "Threshold a segmentation response into a binary mask"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        binarize(&input, params.threshold)
    }
}

/// Threshold `response` into a binary mask (`true` = foreground).
///
/// A pixel is foreground iff its value is strictly greater than `threshold`.
pub fn binarize(response: &Grid<f64>, threshold: f64) -> Result<Grid<bool>> {
    let (rows, cols) = response.shape();
    let view = response.view();

    let data: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            view.row(row)
                .iter()
                .map(|&v| v > threshold)
                .collect::<Vec<bool>>()
        })
        .collect();

    Grid::from_vec(data, rows, cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binarize_strictly_above_threshold() {
        let response = Grid::from_vec(vec![0.2, 0.5, 0.51, 1.0, f64::NAN, -3.0], 2, 3).unwrap();
        let mask = binarize(&response, 0.5).unwrap();

        assert!(!mask.get(0, 0).unwrap());
        assert!(!mask.get(0, 1).unwrap(), "value equal to threshold is background");
        assert!(mask.get(0, 2).unwrap());
        assert!(mask.get(1, 0).unwrap());
        assert!(!mask.get(1, 1).unwrap(), "NaN is background");
        assert!(!mask.get(1, 2).unwrap());
    }

    #[test]
    fn test_binarize_all_background() {
        let response = Grid::filled(16, 16, 0.1);
        let mask = binarize(&response, 0.5).unwrap();
        assert_eq!(mask.count_true(), 0);
        assert_eq!(mask.shape(), (16, 16));
    }

    #[test]
    fn test_algorithm_trait_default_threshold() {
        let response = Grid::from_vec(vec![0.4, 0.6], 1, 2).unwrap();
        let mask = Binarize.execute_default(response).unwrap();
        assert_eq!(mask.count_true(), 1);
    }
}
