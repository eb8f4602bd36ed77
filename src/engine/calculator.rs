use anyhow::Result;
use nalgebra::Vector3;

use crate::core::domain::Image;

/// A generic interface for energy/force predictors.
pub trait Calculator {
    /// Potential energy (eV) of `image`.
    /// `apply_constraint` must be honoured; benchmarks always pass `false`.
    fn get_potential_energy(&self, image: &Image, apply_constraint: bool) -> Result<f64>;

    /// One force vector (eV/Å) per atom of `image`.
    /// With `apply_constraint` set, fixed atoms report zero force.
    fn get_forces(&self, image: &Image, apply_constraint: bool) -> Result<Vec<Vector3<f64>>>;

    /// Returns the name of the engine (e.g., "Amp (tanh 10-10)").
    fn name(&self) -> &str;
}

/// A calculator whose model parameters are fitted in place.
pub trait Trainable: Calculator {
    /// Fits the model to `images`.
    /// `overwrite` allows replacing results the calculator cached earlier.
    fn train(&mut self, images: &[Image], overwrite: bool) -> Result<()>;
}
