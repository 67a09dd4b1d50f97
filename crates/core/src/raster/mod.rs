//! Grid data structures and pixel neighborhoods

mod element;
mod grid;
mod neighborhood;

pub use element::RasterElement;
pub use grid::{Grid, GridStatistics};
pub use neighborhood::{Neighborhood, QUEEN_OFFSETS, ROOK_OFFSETS};
