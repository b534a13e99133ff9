use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::{ColorType, TiffError};
use tracing::debug;

use crate::shear_pipeline::common::error::{Result, ShearError};

fn decode_error(e: TiffError) -> ShearError {
    ShearError::DecodeError(e.to_string())
}

/// Opens a single-channel image and returns `(width, height, samples)`.
fn decode_gray<R: Read + Seek>(reader: R) -> Result<(usize, usize, DecodingResult)> {
    let mut decoder = Decoder::new(reader).map_err(decode_error)?;
    let (width, height) = decoder.dimensions().map_err(decode_error)?;

    match decoder.colortype().map_err(decode_error)? {
        ColorType::Gray(_) => {}
        other => {
            return Err(ShearError::DecodeError(format!(
                "expected a grayscale image, found {other:?}"
            )));
        }
    }

    let image = decoder.read_image().map_err(decode_error)?;
    debug!("Decoded TIFF image: {}x{}", width, height);
    Ok((width as usize, height as usize, image))
}

fn into_array<T>(width: usize, height: usize, samples: Vec<T>) -> Result<Array2<T>> {
    let found = samples.len();
    Array2::from_shape_vec((height, width), samples).map_err(|_| {
        ShearError::DecodeError(format!(
            "{found} samples do not fill a {width}x{height} image"
        ))
    })
}

/// Reads a grayscale TIFF of any integer or float sample type as intensities.
pub fn read_gray_tiff<R: Read + Seek>(reader: R) -> Result<Array2<f64>> {
    let (width, height, image) = decode_gray(reader)?;

    let samples: Vec<f64> = match image {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        _ => {
            return Err(ShearError::DecodeError(
                "unsupported sample format".to_string(),
            ));
        }
    };

    into_array(width, height, samples)
}

/// Reads a grayscale TIFF holding raw sensor counts (8 or 16 bit).
pub fn read_gray_tiff_u16<R: Read + Seek>(reader: R) -> Result<Array2<u16>> {
    let (width, height, image) = decode_gray(reader)?;

    let samples: Vec<u16> = match image {
        DecodingResult::U8(v) => v.into_iter().map(u16::from).collect(),
        DecodingResult::U16(v) => v,
        _ => {
            return Err(ShearError::DecodeError(
                "raw frames must have 8 or 16 bit unsigned samples".to_string(),
            ));
        }
    };

    into_array(width, height, samples)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(|e| ShearError::InputReadError(format!("{}: {}", path.display(), e)))?;
    Ok(BufReader::new(file))
}

pub fn load_gray_tiff<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    read_gray_tiff(open(path.as_ref())?)
}

pub fn load_gray_tiff_u16<P: AsRef<Path>>(path: P) -> Result<Array2<u16>> {
    read_gray_tiff_u16(open(path.as_ref())?)
}
