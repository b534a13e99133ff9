//! Burst averaging and dark-frame correction.
//!
//! Turns a burst of raw sensor frames into a single noise-reduced frame in the
//! intensity scale of the stored reference frame. The steps always run in the
//! same order: mean, bit-depth rescale, dark subtraction, clip at zero.

use ndarray::{Array2, Zip};
use tracing::{debug, instrument};

use crate::shear_pipeline::common::error::{Result, ShearError};

/// Rescaling between the live sensor sample width and the reference format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitDepthScale {
    /// Significant bits in the live samples (Mono10 -> 10)
    pub source_bits: u32,
    /// Bits of the representation the dark frame was stored in
    pub target_bits: u32,
}

impl Default for BitDepthScale {
    fn default() -> Self {
        Self {
            source_bits: 10,
            target_bits: 16,
        }
    }
}

impl BitDepthScale {
    pub fn new(source_bits: u32, target_bits: u32) -> Self {
        Self {
            source_bits,
            target_bits,
        }
    }

    /// Multiplicative factor `2^(target_bits - source_bits)`.
    pub fn factor(&self) -> f64 {
        2f64.powi(self.target_bits as i32 - self.source_bits as i32)
    }
}

/// Element-wise arithmetic mean over a burst.
pub fn mean_frame(burst: &[Array2<u16>]) -> Result<Array2<f64>> {
    let first = burst.first().ok_or(ShearError::EmptyBurst)?;
    let shape = first.dim();

    let mut sum = Array2::<f64>::zeros(shape);
    for frame in burst {
        if frame.dim() != shape {
            return Err(ShearError::DimensionMismatch {
                what: "burst frame",
                expected: shape,
                found: frame.dim(),
            });
        }
        Zip::from(&mut sum)
            .and(frame)
            .for_each(|acc, &sample| *acc += f64::from(sample));
    }

    let n = burst.len() as f64;
    sum.mapv_inplace(|acc| acc / n);
    Ok(sum)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameReducer {
    scale: BitDepthScale,
}

impl FrameReducer {
    pub fn new(scale: BitDepthScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> BitDepthScale {
        self.scale
    }

    #[instrument(skip(self, burst, dark), fields(frames = burst.len()))]
    pub fn reduce(&self, burst: &[Array2<u16>], dark: &Array2<f64>) -> Result<Array2<f64>> {
        let mut frame = mean_frame(burst)?;

        if dark.dim() != frame.dim() {
            return Err(ShearError::DimensionMismatch {
                what: "dark frame",
                expected: frame.dim(),
                found: dark.dim(),
            });
        }

        let factor = self.scale.factor();
        debug!(
            rows = frame.nrows(),
            cols = frame.ncols(),
            factor,
            "Rescaling burst mean and subtracting dark frame"
        );

        Zip::from(&mut frame)
            .and(dark)
            .for_each(|sample, &dark| *sample = (*sample * factor - dark).max(0.0));

        Ok(frame)
    }
}
