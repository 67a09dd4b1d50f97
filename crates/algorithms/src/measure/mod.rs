//! Measurement of labeled instances
//!
//! Per-instance geometric and intensity descriptors computed from a label
//! map and the intensity image it was segmented from.

mod regionprops;

pub use regionprops::{region_properties, RegionInput, RegionProperties};
