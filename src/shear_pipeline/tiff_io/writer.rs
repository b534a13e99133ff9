use std::io::Write;
use std::path::Path;

use ndarray::Array2;
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{colortype, Compression, TiffEncoder};
use tracing::debug;

use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::tiff_io::types::TiffCompression;

/// Encodes `frame` as 16-bit grayscale. Samples are rounded and saturated to
/// the `u16` range.
pub fn write_frame_tiff(
    frame: &Array2<f64>,
    output: &mut dyn Write,
    compression: TiffCompression,
) -> Result<()> {
    let (rows, cols) = frame.dim();
    debug!("Encoding TIFF image: {}x{}", cols, rows);

    let compression = match compression {
        TiffCompression::None => Compression::Uncompressed,
        TiffCompression::Lzw => Compression::Lzw,
        TiffCompression::Deflate => Compression::Deflate(DeflateLevel::Balanced),
    };

    // iter() walks in logical row-major order regardless of memory layout
    let samples: Vec<u16> = frame
        .iter()
        .map(|&v| v.round().clamp(0.0, f64::from(u16::MAX)) as u16)
        .collect();

    let mut buffer = Vec::new();
    {
        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| ShearError::EncodeError(e.to_string()))?
            .with_compression(compression);

        encoder
            .write_image::<colortype::Gray16>(cols as u32, rows as u32, &samples)
            .map_err(|e| ShearError::EncodeError(e.to_string()))?;
    }

    output.write_all(&buffer)?;

    debug!("TIFF encoding complete");
    Ok(())
}

pub fn save_frame_tiff<P: AsRef<Path>>(
    path: P,
    frame: &Array2<f64>,
    compression: TiffCompression,
) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)
        .map_err(|e| ShearError::OutputWriteError(format!("{}: {}", path.display(), e)))?;
    write_frame_tiff(frame, &mut file, compression)
}
