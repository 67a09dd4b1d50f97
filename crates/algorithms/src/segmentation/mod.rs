//! Instance separation from a segmentation response
//!
//! Stages, in pipeline order:
//! - Binarize: threshold the response into a foreground mask
//! - Distance transform: exact Euclidean distance to background
//! - Seeds: merged local maxima of the distance field
//! - Watershed: flood the negated distance field from the seeds
//! - Area filter: drop instances below a minimum pixel count
//!
//! Connected-component labeling backs the seed merge and the watershed's
//! seedless fallback.

mod binarize;
mod components;
mod distance;
mod filter;
mod seeds;
mod watershed;

pub use binarize::{binarize, Binarize, BinarizeParams};
pub use components::{label_components, ComponentParams, ConnectedComponents};
pub use distance::{distance_transform, DistanceTransform};
pub use filter::{filter_small_instances, instance_areas, AreaFilter, AreaFilterParams};
pub use seeds::{extract_seeds, SeedExtraction, SeedParams};
pub use watershed::{watershed, Watershed, WatershedInput};

pub(crate) use seeds::validate_neighborhood;
