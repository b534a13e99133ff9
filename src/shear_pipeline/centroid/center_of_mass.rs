use ndarray::ArrayView2;

use crate::shear_pipeline::common::error::{Result, ShearError};
use crate::shear_pipeline::common::types::Centroid;

/// Intensity-weighted mean position over every sample of `image`.
///
/// Fails with `DegenerateRegion` when the total intensity is zero or not finite,
/// since the position is undefined.
pub fn center_of_mass(image: &ArrayView2<f64>) -> Result<Centroid> {
    let total: f64 = image.sum();

    if !total.is_finite() || total <= 0.0 {
        return Err(ShearError::DegenerateRegion(format!(
            "total intensity {} over {}x{} samples",
            total,
            image.nrows(),
            image.ncols()
        )));
    }

    // Weights sum to one; a lone pixel gets exactly 1
    let mut x = 0.0;
    let mut y = 0.0;
    for ((row, col), &intensity) in image.indexed_iter() {
        let weight = intensity / total;
        x += col as f64 * weight;
        y += row as f64 * weight;
    }

    Ok(Centroid { x, y })
}
