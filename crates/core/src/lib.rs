//! # cellseg core
//!
//! Core types, traits and I/O for the cellseg instance segmentation library.
//!
//! This crate provides:
//! - `Grid<T>`: Generic 2D image grid type
//! - `Neighborhood`: Pixel connectivity patterns
//! - Algorithm traits for consistent API
//! - TIFF reading for intensity images and model responses
//! - JSON persistence of per-image cell metadata

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{Grid, Neighborhood, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::io::{InstanceRecord, OutputRecord};
    pub use crate::raster::{Grid, Neighborhood, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in cellseg.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
