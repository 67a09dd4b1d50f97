//! Exact Euclidean distance transform
//!
//! For every foreground pixel, the distance to the nearest background pixel.
//! Pixels outside the image count as background, so a foreground pixel on
//! the image border has distance 1.
//!
//! Separable lower-envelope algorithm on squared distances: one 1D pass
//! down every column, then one along every row. Exact, O(n) per line.
//!
//! Reference:
//! Felzenszwalb, P. F., & Huttenlocher, D. P. (2012). Distance transforms of
//! sampled functions. *Theory of Computing*, 8(1), 415–428.

use crate::maybe_rayon::*;
use ndarray::Array2;
use cellseg_core::raster::Grid;
use cellseg_core::{Algorithm, Error, Result};

/// Squared distance standing in for "infinitely far" on foreground pixels.
/// Finite so the parabola intersections never produce NaN.
const FAR: f64 = 1e20;

/// Euclidean distance transform algorithm
#[derive(Debug, Clone, Default)]
pub struct DistanceTransform;

impl Algorithm for DistanceTransform {
    type Input = Grid<bool>;
    type Output = Grid<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Distance Transform"
    }

    fn description(&self) -> &'static str {
        "Exact Euclidean distance from foreground to nearest background"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        distance_transform(&input)
    }
}

/// Compute the exact Euclidean distance transform of a binary mask.
///
/// # Returns
/// Grid<f64> with the distance to the nearest background pixel on
/// foreground pixels and 0 on background pixels.
pub fn distance_transform(mask: &Grid<bool>) -> Result<Grid<f64>> {
    let (rows, cols) = mask.shape();

    // One pixel of background padding all round makes the image border
    // behave as background and guarantees every line has a zero.
    let (pr, pc) = (rows + 2, cols + 2);
    let mut padded = Array2::<f64>::zeros((pr, pc));
    for ((row, col), &fg) in mask.data().indexed_iter() {
        if fg {
            padded[(row + 1, col + 1)] = FAR;
        }
    }

    // Pass 1: squared distance along each column
    let columns: Vec<Vec<f64>> = (0..pc)
        .into_par_iter()
        .map(|col| {
            let f: Vec<f64> = padded.column(col).to_vec();
            squared_distance_1d(&f)
        })
        .collect();

    // Pass 2: along each interior row, then back to plain distances
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let f: Vec<f64> = columns.iter().map(|column| column[row + 1]).collect();
            let d = squared_distance_1d(&f);
            d[1..=cols].iter().map(|v| v.sqrt()).collect::<Vec<f64>>()
        })
        .collect();

    Grid::from_vec(data, rows, cols)
}

/// 1D squared distance transform of the sampled function `f`:
/// `d[q] = min_p (q - p)² + f[p]`.
fn squared_distance_1d(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    let mut d = vec![0.0; n];
    if n == 0 {
        return d;
    }

    // v: parabola apexes in the lower envelope; z: boundaries between them
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let qf = q as f64;
        let mut s;
        loop {
            let p = v[k] as f64;
            s = ((f[q] + qf * qf) - (f[v[k]] + p * p)) / (2.0 * qf - 2.0 * p);
            if s <= z[k] && k > 0 {
                k -= 1;
            } else {
                break;
            }
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let p = v[k] as f64;
        *out = (qf - p) * (qf - p) + f[v[k]];
    }

    d
}
