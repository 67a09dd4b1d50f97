//! Per-image cell metadata records
//!
//! An [`OutputRecord`] is written as pretty-printed JSON with a 4-space
//! indent. Field order follows the struct declarations, so `image_name`
//! always precedes `cells` and the output is byte-stable for equal input.
//!
//! Writes go through a temporary file in the destination directory that is
//! renamed over the target, so a reader never observes a partial record.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Shape and intensity descriptors of one labeled cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Label of the instance in the label map
    pub id: u32,
    /// Mean (row, col) of the instance's pixels
    pub centroid: [f64; 2],
    /// Pixel count
    pub area: f64,
    /// Number of boundary pixels
    pub perimeter: f64,
    /// Ellipse-fit elongation, 0 for a disk and approaching 1 for a line
    pub eccentricity: f64,
    /// Inclusive (row_min, col_min, row_max, col_max)
    pub bounding_box: [usize; 4],
    /// Mean intensity image value over the instance's pixels
    pub mean_intensity: f64,
}

/// Metadata for every cell found in one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub image_name: String,
    /// Ordered by ascending `id`
    pub cells: Vec<InstanceRecord>,
}

impl OutputRecord {
    pub fn new(image_name: impl Into<String>, cells: Vec<InstanceRecord>) -> Self {
        Self {
            image_name: image_name.into(),
            cells,
        }
    }

    /// Serialize to the on-disk JSON text
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))
    }

    /// Parse a record from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Write an output record to `path`, replacing any existing record.
///
/// Either the complete record ends up at `path` or the call fails with
/// [`Error::RecordWrite`] and `path` is left as it was.
pub fn write_output_record<P: AsRef<Path>>(record: &OutputRecord, path: P) -> Result<()> {
    let path = path.as_ref();
    let text = record.to_json()?;

    let write_err = |source: std::io::Error| Error::RecordWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(text.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Read an output record previously written by [`write_output_record`]
pub fn read_output_record<P: AsRef<Path>>(path: P) -> Result<OutputRecord> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> OutputRecord {
        OutputRecord::new(
            "sample.tiff",
            vec![
                InstanceRecord {
                    id: 1,
                    centroid: [10.0, 10.0],
                    area: 81.0,
                    perimeter: 32.0,
                    eccentricity: 0.0,
                    bounding_box: [5, 5, 15, 15],
                    mean_intensity: 0.8,
                },
                InstanceRecord {
                    id: 4,
                    centroid: [30.25, 29.5],
                    area: 60.0,
                    perimeter: 28.0,
                    eccentricity: 0.61,
                    bounding_box: [26, 25, 34, 34],
                    mean_intensity: 12.5,
                },
            ],
        )
    }

    #[test]
    fn test_json_field_order() {
        let text = sample_record().to_json().unwrap();
        let name_at = text.find("\"image_name\"").unwrap();
        let cells_at = text.find("\"cells\"").unwrap();
        assert!(name_at < cells_at);

        let id_at = text.find("\"id\"").unwrap();
        let bbox_at = text.find("\"bounding_box\"").unwrap();
        let mean_at = text.find("\"mean_intensity\"").unwrap();
        assert!(id_at < bbox_at && bbox_at < mean_at);

        // 4-space indentation
        assert!(text.contains("\n    \"image_name\": \"sample.tiff\""));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        let record = sample_record();

        write_output_record(&record, &path).unwrap();
        let back = read_output_record(&path).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_write_is_byte_identical_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        std::fs::write(&path, "stale contents").unwrap();

        let record = sample_record();
        write_output_record(&record, &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_output_record(&record, &path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert!(!String::from_utf8(first).unwrap().contains("stale"));
    }

    #[test]
    fn test_write_into_missing_directory_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("sample.json");

        match write_output_record(&sample_record(), &path) {
            Err(Error::RecordWrite { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected RecordWrite, got {:?}", other),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_cells_serialize_as_empty_list() {
        let record = OutputRecord::new("blank.tiff", Vec::new());
        let text = record.to_json().unwrap();
        assert!(text.contains("\"cells\": []"));
        assert_eq!(OutputRecord::from_json(&text).unwrap(), record);
    }
}
