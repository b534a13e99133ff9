//! Region of interest extraction with background removal.
//!
//! The residual background is estimated once per frame from a signal-free
//! corner patch of the full frame and the same level is removed from both
//! regions. This assumes the background is uniform across the sensor.

use ndarray::{s, Array2};
use tracing::{debug, instrument};

use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::common::types::Roi;

/// Top-left corner patch used to estimate residual background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundPatch {
    pub rows: usize,
    pub cols: usize,
}

impl Default for BackgroundPatch {
    fn default() -> Self {
        Self { rows: 30, cols: 30 }
    }
}

/// Median of the background patch. For an even sample count the two middle
/// samples are averaged.
pub fn background_level(frame: &Array2<f64>, patch: &BackgroundPatch) -> Result<f64> {
    let (rows, cols) = frame.dim();
    if patch.rows == 0 || patch.cols == 0 || patch.rows > rows || patch.cols > cols {
        return Err(ShearError::InvalidConfig(format!(
            "background patch {}x{} does not fit a {}x{} frame",
            patch.rows, patch.cols, rows, cols
        )));
    }

    let mut samples: Vec<f64> = frame
        .slice(s![..patch.rows, ..patch.cols])
        .iter()
        .copied()
        .collect();
    samples.sort_unstable_by(f64::total_cmp);

    let mid = samples.len() / 2;
    let median = if samples.len() % 2 == 0 {
        (samples[mid - 1] + samples[mid]) / 2.0
    } else {
        samples[mid]
    };

    Ok(median)
}

/// Copies `roi` out of `frame`, subtracts `background` and clips at zero.
#[instrument(skip(frame, roi), fields(roi = %roi))]
pub fn extract_region(frame: &Array2<f64>, roi: &Roi, background: f64) -> Result<Array2<f64>> {
    let (rows, cols) = frame.dim();
    if !roi.fits(rows, cols) {
        return Err(ShearError::RegionOutOfBounds {
            row_start: roi.row_start,
            row_end: roi.row_end,
            col_start: roi.col_start,
            col_end: roi.col_end,
            rows,
            cols,
        });
    }

    debug!(background, "Extracting region");

    let region = frame
        .slice(s![roi.row_start..roi.row_end, roi.col_start..roi.col_end])
        .mapv(|sample| (sample - background).max(0.0));

    Ok(region)
}
