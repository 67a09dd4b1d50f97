//! Connected-component labeling
//!
//! Plain flood-fill labeling of a binary mask. Components are numbered
//! 1, 2, ... in the order a row-major scan first touches them, i.e. by the
//! (row, col) of each component's topmost-leftmost pixel.

use std::collections::VecDeque;
use cellseg_core::raster::{Grid, Neighborhood};
use cellseg_core::{Algorithm, Error, Result};

/// Parameters for connected-component labeling
#[derive(Debug, Clone)]
pub struct ComponentParams {
    /// `Rook3x3` for 4-connectivity, `Queen3x3` for 8-connectivity
    pub connectivity: Neighborhood,
}

impl Default for ComponentParams {
    fn default() -> Self {
        Self {
            connectivity: Neighborhood::Queen3x3,
        }
    }
}

/// Connected-component labeling algorithm
#[derive(Debug, Clone, Default)]
pub struct ConnectedComponents;

impl Algorithm for ConnectedComponents {
    type Input = Grid<bool>;
    type Output = Grid<u32>;
    type Params = ComponentParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Connected Components"
    }

    fn description(&self) -> &'static str {
        "Label connected foreground regions of a binary mask"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        label_components(&input, params.connectivity).map(|(labels, _)| labels)
    }
}

/// Label the connected foreground components of `mask`.
///
/// # Returns
/// The label map (0 = background) and the number of components found.
pub fn label_components(mask: &Grid<bool>, connectivity: Neighborhood) -> Result<(Grid<u32>, u32)> {
    let mut labels = mask.like(0u32);
    let count = label_unclaimed(mask, &mut labels, connectivity, 0)?;
    Ok((labels, count))
}

/// Give every foreground component of `mask` that has no label yet in
/// `labels` a fresh label, counting up from `last_label + 1`.
///
/// Components are grown only through unlabeled foreground pixels.
///
/// # Returns
/// The largest label now in use.
pub(crate) fn label_unclaimed(
    mask: &Grid<bool>,
    labels: &mut Grid<u32>,
    connectivity: Neighborhood,
    last_label: u32,
) -> Result<u32> {
    mask.ensure_same_shape(labels)?;

    let (rows, cols) = mask.shape();
    let offsets = connectivity.offsets_no_center();
    let mut next = last_label;
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    for row in 0..rows {
        for col in 0..cols {
            if !mask.data()[(row, col)] || labels.data()[(row, col)] != 0 {
                continue;
            }

            next = next.checked_add(1).ok_or_else(|| {
                Error::Algorithm("label count exceeds u32 range".to_string())
            })?;
            labels.data_mut()[(row, col)] = next;
            queue.push_back((row, col));

            while let Some((r, c)) = queue.pop_front() {
                for &(dr, dc) in &offsets {
                    let Some((nr, nc)) = mask.offset(r, c, dr, dc) else {
                        continue;
                    };
                    if mask.data()[(nr, nc)] && labels.data()[(nr, nc)] == 0 {
                        labels.data_mut()[(nr, nc)] = next;
                        queue.push_back((nr, nc));
                    }
                }
            }
        }
    }

    Ok(next)
}
