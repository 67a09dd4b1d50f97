//! Seed extraction from a distance field
//!
//! Seeds are the strict regional maxima of the distance field. A pixel is a
//! candidate when its distance is positive and nothing in the surrounding
//! window is strictly higher. Candidates only become a seed when the whole
//! 8-connected plateau of equal distance they sit on consists of candidates:
//! a flat ridge that runs into a higher pixel anywhere is a shoulder, not a
//! peak. Surviving plateaus form one seed each.

use std::collections::VecDeque;
use crate::maybe_rayon::*;
use cellseg_core::raster::{Grid, Neighborhood, QUEEN_OFFSETS};
use cellseg_core::{Algorithm, Error, Result};

use super::components::label_components;

/// Parameters for seed extraction
#[derive(Debug, Clone)]
pub struct SeedParams {
    /// Side of the square local-maximum window (odd, at least 3)
    pub neighborhood: usize,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self { neighborhood: 3 }
    }
}

impl SeedParams {
    pub fn validate(&self) -> Result<()> {
        validate_neighborhood(self.neighborhood)
    }
}

pub(crate) fn validate_neighborhood(size: usize) -> Result<()> {
    if size < 3 || size % 2 == 0 {
        return Err(Error::InvalidParameter {
            name: "seed_neighborhood",
            value: size.to_string(),
            reason: "window side must be odd and at least 3".to_string(),
        });
    }
    Ok(())
}

/// Seed extraction algorithm
#[derive(Debug, Clone, Default)]
pub struct SeedExtraction;

impl Algorithm for SeedExtraction {
    type Input = Grid<f64>;
    type Output = Grid<u32>;
    type Params = SeedParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Seed Extraction"
    }

    fn description(&self) -> &'static str {
        "Find merged local maxima of a distance field as watershed seeds"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        extract_seeds(&input, params).map(|(seeds, _)| seeds)
    }
}

/// Find the seeds of a distance field.
///
/// Seeds are numbered from 1 in ascending (row, col) order of each seed's
/// topmost-leftmost pixel, so identical input always yields identical seeds.
///
/// # Returns
/// The seed map (0 = no seed) and the number of seeds.
pub fn extract_seeds(distance: &Grid<f64>, params: SeedParams) -> Result<(Grid<u32>, u32)> {
    params.validate()?;

    let (rows, cols) = distance.shape();
    let offsets = Neighborhood::window(params.neighborhood).offsets_no_center();

    let candidates: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| is_local_max(distance, row, col, &offsets))
                .collect::<Vec<bool>>()
        })
        .collect();

    let candidates = Grid::from_vec(candidates, rows, cols)?;
    let peaks = regional_maxima(distance, &candidates);
    label_components(&peaks, Neighborhood::Queen3x3)
}

/// Keep the candidate plateaus whose every equal-valued member is a candidate.
///
/// Distances of equal squared length are bit-identical, so plateaus are
/// grown with exact equality.
fn regional_maxima(distance: &Grid<f64>, candidates: &Grid<bool>) -> Grid<bool> {
    let mut peaks = candidates.like(false);
    let mut visited = candidates.like(false);
    let mut queue = VecDeque::new();
    let mut plateau = Vec::new();

    for ((row, col), &is_candidate) in candidates.data().indexed_iter() {
        if !is_candidate || visited.data()[(row, col)] {
            continue;
        }

        let level = distance.data()[(row, col)];
        let mut is_peak = true;
        plateau.clear();
        visited.data_mut()[(row, col)] = true;
        queue.push_back((row, col));

        while let Some((r, c)) = queue.pop_front() {
            plateau.push((r, c));
            is_peak &= candidates.data()[(r, c)];

            for &(dr, dc) in &QUEEN_OFFSETS {
                let Some((nr, nc)) = distance.offset(r, c, dr, dc) else {
                    continue;
                };
                if !visited.data()[(nr, nc)] && distance.data()[(nr, nc)] == level {
                    visited.data_mut()[(nr, nc)] = true;
                    queue.push_back((nr, nc));
                }
            }
        }

        if is_peak {
            for &(r, c) in &plateau {
                peaks.data_mut()[(r, c)] = true;
            }
        }
    }

    peaks
}

fn is_local_max(distance: &Grid<f64>, row: usize, col: usize, offsets: &[(isize, isize)]) -> bool {
    let center = distance.data()[(row, col)];
    if !(center > 0.0) {
        return false;
    }

    offsets.iter().all(|&(dr, dc)| match distance.offset(row, col, dr, dc) {
        Some((nr, nc)) => distance.data()[(nr, nc)] <= center,
        None => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::distance::distance_transform;

    fn disc_mask(rows: usize, cols: usize, centers: &[(f64, f64)], radius: f64) -> Grid<bool> {
        let mut mask = Grid::filled(rows, cols, false);
        for r in 0..rows {
            for c in 0..cols {
                let inside = centers.iter().any(|&(cr, cc)| {
                    let (dr, dc) = (r as f64 - cr, c as f64 - cc);
                    dr * dr + dc * dc <= radius * radius
                });
                mask.set(r, c, inside).unwrap();
            }
        }
        mask
    }

    #[test]
    fn test_one_seed_per_disc() {
        let mask = disc_mask(40, 40, &[(10.0, 10.0), (28.0, 28.0)], 6.0);
        let distance = distance_transform(&mask).unwrap();
        let (seeds, count) = extract_seeds(&distance, SeedParams::default()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(seeds.get(10, 10).unwrap(), 1);
        assert_eq!(seeds.get(28, 28).unwrap(), 2);
    }

    #[test]
    fn test_plateau_merges_into_single_seed() {
        // A 3-pixel-tall bar has a flat ridge of equal distance along its middle row
        let mut mask = Grid::filled(9, 15, false);
        for r in 3..6 {
            for c in 2..13 {
                mask.set(r, c, true).unwrap();
            }
        }
        let distance = distance_transform(&mask).unwrap();
        let (seeds, count) = extract_seeds(&distance, SeedParams::default()).unwrap();

        assert_eq!(count, 1);
        for c in 3..12 {
            assert_eq!(seeds.get(4, c).unwrap(), 1, "ridge pixel (4, {}) should seed", c);
        }
        assert_eq!(seeds.get(3, 5).unwrap(), 0);
    }

    #[test]
    fn test_shoulder_plateau_is_not_a_seed() {
        // 4.0 ridge on both sides of a single 4.5 peak; the outer ridge
        // pixels do not see the peak but share its plateau with ones that do
        let distance = Grid::from_vec(
            vec![1.0, 4.0, 4.0, 4.0, 4.0, 4.5, 4.0, 4.0, 4.0, 4.0, 1.0],
            1,
            11,
        )
        .unwrap();
        let (seeds, count) = extract_seeds(&distance, SeedParams::default()).unwrap();

        assert_eq!(count, 1);
        assert_eq!(seeds.get(0, 5).unwrap(), 1);
        assert_eq!(seeds.get(0, 1).unwrap(), 0);
        assert_eq!(seeds.get(0, 9).unwrap(), 0);
    }

    #[test]
    fn test_ellipse_has_single_seed() {
        // Filled ellipse with semi-axes 10 (cols) and 4 (rows)
        let mut mask = Grid::filled(60, 60, false);
        for r in 0..60 {
            for c in 0..60 {
                let (dr, dc) = ((r as f64 - 30.0) / 4.0, (c as f64 - 30.0) / 10.0);
                mask.set(r, c, dr * dr + dc * dc <= 1.0).unwrap();
            }
        }
        let distance = distance_transform(&mask).unwrap();
        let (seeds, count) = extract_seeds(&distance, SeedParams::default()).unwrap();

        assert_eq!(count, 1);
        assert_eq!(seeds.get(30, 30).unwrap(), 1);
    }

    #[test]
    fn test_seeds_only_on_foreground() {
        let distance = Grid::filled(6, 6, 0.0);
        let (_, count) = extract_seeds(&distance, SeedParams::default()).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_numbering_is_row_major() {
        let mut distance: Grid<f64> = Grid::new(7, 7);
        distance.set(5, 1, 2.0).unwrap();
        distance.set(1, 5, 2.0).unwrap();
        let (seeds, count) = extract_seeds(&distance, SeedParams::default()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(seeds.get(1, 5).unwrap(), 1);
        assert_eq!(seeds.get(5, 1).unwrap(), 2);
    }

    #[test]
    fn test_larger_window_suppresses_nearby_peak() {
        let distance = Grid::from_vec(vec![1.0, 3.0, 1.5, 2.0, 0.5, 0.0, 0.0], 1, 7).unwrap();

        let (_, narrow) = extract_seeds(&distance, SeedParams { neighborhood: 3 }).unwrap();
        let (_, wide) = extract_seeds(&distance, SeedParams { neighborhood: 5 }).unwrap();
        assert_eq!(narrow, 2);
        assert_eq!(wide, 1);
    }

    #[test]
    fn test_rejects_even_window() {
        let distance: Grid<f64> = Grid::new(4, 4);
        let err = extract_seeds(&distance, SeedParams { neighborhood: 4 }).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "seed_neighborhood", .. }));
    }
}
