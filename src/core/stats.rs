//! Reductions over residual arrays.
//!
//! Residuals are collected into `DVector<f64>`; every helper refuses an empty
//! vector instead of returning NaN.

use nalgebra::DVector;

use crate::error::AipesError;

/// Arithmetic mean.
pub fn mean(values: &DVector<f64>) -> Result<f64, AipesError> {
    if values.is_empty() {
        return Err(AipesError::EmptyInput);
    }
    Ok(values.mean())
}

/// Root-mean-square of the values: `sqrt(mean(v²))`.
pub fn rmse(values: &DVector<f64>) -> Result<f64, AipesError> {
    if values.is_empty() {
        return Err(AipesError::EmptyInput);
    }
    Ok((values.norm_squared() / values.len() as f64).sqrt())
}

/// Largest absolute value.
pub fn maxresid(values: &DVector<f64>) -> Result<f64, AipesError> {
    if values.is_empty() {
        return Err(AipesError::EmptyInput);
    }
    Ok(values.amax())
}
