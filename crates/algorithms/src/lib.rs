//! # cellseg algorithms
//!
//! Instance separation and measurement for microscopy segmentation responses.
//!
//! ## Modules
//!
//! - **segmentation**: Binarization, distance transform, seed extraction,
//!   watershed separation, connected components, area filtering
//! - **measure**: Per-instance shape and intensity descriptors
//! - **pipeline**: One-call processing of an image into an output record

mod maybe_rayon;
pub mod measure;
pub mod pipeline;
pub mod segmentation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::measure::region_properties;
    pub use crate::pipeline::{
        build_record, extract_cells, measure_segmentation, process_image, segment, Segmentation,
        SegmentationParams,
    };
    pub use crate::segmentation::{
        binarize, distance_transform, extract_seeds, filter_small_instances, label_components,
        watershed, SeedParams,
    };
    pub use cellseg_core::prelude::*;
}
