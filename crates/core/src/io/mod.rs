//! I/O at the pipeline boundary: TIFF images in, JSON metadata out

mod metadata;
mod tiff_io;

pub use metadata::{read_output_record, write_output_record, InstanceRecord, OutputRecord};
pub use tiff_io::{read_tiff, read_tiff_from_buffer, write_label_tiff, write_label_tiff_to_buffer};
