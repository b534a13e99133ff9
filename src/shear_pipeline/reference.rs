//! Dark reference frame storage

use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::info;

use crate::shear_pipeline::common::error::Result;
use crate::shear_pipeline::tiff_io::load_gray_tiff;

/// Supplies the dark frame subtracted from every reduced burst. The frame must
/// already be in the reduced (rescaled) intensity scale.
pub trait ReferenceFrameStore {
    fn load_dark(&self) -> Result<Array2<f64>>;
}

/// Dark frame stored as a grayscale TIFF on disk.
#[derive(Debug, Clone)]
pub struct TiffDarkFrameStore {
    path: PathBuf,
}

impl TiffDarkFrameStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceFrameStore for TiffDarkFrameStore {
    fn load_dark(&self) -> Result<Array2<f64>> {
        let dark = load_gray_tiff(&self.path)?;
        info!(
            path = %self.path.display(),
            rows = dark.nrows(),
            cols = dark.ncols(),
            "Loaded dark frame"
        );
        Ok(dark)
    }
}

/// Dark frame already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDarkFrame(pub Array2<f64>);

impl InMemoryDarkFrame {
    /// All-zero reference, i.e. no dark correction.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self(Array2::zeros((rows, cols)))
    }
}

impl ReferenceFrameStore for InMemoryDarkFrame {
    fn load_dark(&self) -> Result<Array2<f64>> {
        Ok(self.0.clone())
    }
}
