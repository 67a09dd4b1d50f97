//! Main Grid type

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use ndarray::{Array2, ArrayView2};

/// A 2D image grid in image coordinates.
///
/// `Grid<T>` stores values of type `T` in row-major order. Row 0 is the
/// top of the image and coordinates are `(row, col)` throughout.
///
/// # Example
///
/// ```ignore
/// use cellseg_core::Grid;
///
/// // Create a 100x100 grid filled with zeros
/// let mut grid: Grid<f64> = Grid::new(100, 100);
///
/// grid.set(10, 20, 0.75)?;
/// let value = grid.get(10, 20)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    /// Cell values stored in row-major order (row, col)
    data: Array2<T>,
}

impl<T: RasterElement> Grid<T> {
    /// Create a new grid filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Calculate basic statistics (min, max, mean, count of valid cells)
    pub fn statistics(&self) -> GridStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if value.is_missing() {
                continue;
            }

            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }

            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        GridStatistics {
            min,
            max,
            mean,
            valid_count: count,
        }
    }
}

impl<T: Copy> Grid<T> {
    /// Create a new grid filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Create a grid from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self { data: array })
    }

    /// Create a grid with the same dimensions, filled with a value of another type
    pub fn like<U: Copy>(&self, fill_value: U) -> Grid<U> {
        Grid::filled(self.rows(), self.cols(), fill_value)
    }

    /// Apply `f` to every cell, producing a new grid of the same shape
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: Fn(T) -> U,
    {
        Grid {
            data: self.data.mapv(f),
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the grid is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fail with [`Error::SizeMismatch`] unless `other` has the same shape.
    ///
    /// `self` is the expected shape, `other` the actual one.
    pub fn ensure_same_shape<U>(&self, other: &Grid<U>) -> Result<()> {
        let (er, ec) = self.shape();
        let (ar, ac) = other.data.dim();
        if (er, ec) != (ar, ac) {
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        Ok(())
    }

    /// Position of the neighbor at offset `(dr, dc)`, or `None` outside the grid
    #[inline]
    pub fn offset(&self, row: usize, col: usize, dr: isize, dc: isize) -> Option<(usize, usize)> {
        let nr = row as isize + dr;
        let nc = col as isize + dc;
        if nr < 0 || nc < 0 || nr >= self.rows() as isize || nc >= self.cols() as isize {
            return None;
        }
        Some((nr as usize, nc as usize))
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }
}

impl Grid<bool> {
    /// Number of `true` cells
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Basic statistics for a grid
#[derive(Debug, Clone)]
pub struct GridStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid: Grid<f64> = Grid::new(100, 200);
        assert_eq!(grid.rows(), 100);
        assert_eq!(grid.cols(), 200);
        assert_eq!(grid.shape(), (100, 200));
    }

    #[test]
    fn test_grid_access() {
        let mut grid: Grid<u32> = Grid::new(10, 10);
        grid.set(5, 5, 42).unwrap();
        assert_eq!(grid.get(5, 5).unwrap(), 42);
        assert!(grid.get(10, 0).is_err());
        assert!(grid.set(0, 10, 1).is_err());
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let result = Grid::from_vec(vec![0.0_f64; 11], 3, 4);
        assert!(matches!(result, Err(Error::InvalidDimensions { width: 4, height: 3 })));
    }

    #[test]
    fn test_ensure_same_shape() {
        let a: Grid<f64> = Grid::new(64, 64);
        let b: Grid<u32> = Grid::new(64, 65);
        assert!(a.ensure_same_shape(&a.like(0u32)).is_ok());
        match a.ensure_same_shape(&b) {
            Err(Error::SizeMismatch { er, ec, ar, ac }) => {
                assert_eq!((er, ec, ar, ac), (64, 64, 64, 65));
            }
            other => panic!("expected SizeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_offset_clips_at_border() {
        let grid: Grid<bool> = Grid::filled(3, 3, false);
        assert_eq!(grid.offset(0, 0, -1, 0), None);
        assert_eq!(grid.offset(2, 2, 0, 1), None);
        assert_eq!(grid.offset(1, 1, 1, -1), Some((2, 0)));
    }

    #[test]
    fn test_grid_statistics_skips_nan() {
        let mut grid: Grid<f64> = Grid::new(10, 10);
        for i in 0..10 {
            for j in 0..10 {
                grid.set(i, j, (i * 10 + j) as f64).unwrap();
            }
        }
        grid.set(0, 0, f64::NAN).unwrap();

        let stats = grid.statistics();
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(99.0));
        assert_eq!(stats.valid_count, 99);
    }

    #[test]
    fn test_count_true() {
        let mut mask = Grid::filled(4, 4, false);
        mask.set(1, 1, true).unwrap();
        mask.set(2, 3, true).unwrap();
        assert_eq!(mask.count_true(), 2);
    }
}
