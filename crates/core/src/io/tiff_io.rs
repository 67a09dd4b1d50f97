//! TIFF reading and writing
//!
//! Uses the `tiff` crate. Every sample format the decoder produces is
//! converted to `f64`; multi-channel images are reduced to one channel by
//! averaging the color channels (alpha is ignored).

use crate::error::{Error, Result};
use crate::raster::Grid;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32;
use tiff::encoder::TiffEncoder;
use tiff::ColorType;

/// Read a TIFF file into a single-channel `f64` grid
pub fn read_tiff<P: AsRef<Path>>(path: P) -> Result<Grid<f64>> {
    let file = File::open(path.as_ref())?;
    decode_tiff(BufReader::new(file))
}

/// Read a TIFF from an in-memory buffer into a single-channel `f64` grid
pub fn read_tiff_from_buffer(data: &[u8]) -> Result<Grid<f64>> {
    decode_tiff(Cursor::new(data))
}

/// Internal: decode a TIFF from any `Read + Seek` source
fn decode_tiff<R>(reader: R) -> Result<Grid<f64>>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder = Decoder::new(reader)?;

    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    // (samples per pixel, color samples averaged into the output)
    let (samples, colors) = match decoder.colortype()? {
        ColorType::Gray(_) => (1, 1),
        ColorType::GrayA(_) => (2, 1),
        ColorType::RGB(_) => (3, 3),
        ColorType::RGBA(_) => (4, 3),
        other => {
            return Err(Error::UnsupportedDataType(format!(
                "TIFF color type {:?}",
                other
            )))
        }
    };

    let values = samples_to_f64(decoder.read_image()?)?;

    if values.len() != rows * cols * samples {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let data: Vec<f64> = if samples == 1 {
        values
    } else {
        values
            .chunks_exact(samples)
            .map(|px| px[..colors].iter().sum::<f64>() / colors as f64)
            .collect()
    };

    Grid::from_vec(data, rows, cols)
}

#[allow(unreachable_patterns)]
fn samples_to_f64(result: DecodingResult) -> Result<Vec<f64>> {
    let values = match result {
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF sample format".to_string(),
            ))
        }
    };
    Ok(values)
}

/// Write a label map as a 32-bit grayscale TIFF
pub fn write_label_tiff<P: AsRef<Path>>(labels: &Grid<u32>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_labels(labels, BufWriter::new(file))
}

/// Write a label map to an in-memory TIFF buffer
pub fn write_label_tiff_to_buffer(labels: &Grid<u32>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_labels(labels, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Internal: encode a label map into any `Write + Seek` sink
fn encode_labels<W>(labels: &Grid<u32>, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let (rows, cols) = labels.shape();
    let data: Vec<u32> = labels.data().iter().copied().collect();
    encoder.write_image::<Gray32>(cols as u32, rows as u32, &data)?;
    Ok(())
}
