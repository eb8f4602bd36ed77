use anyhow::Result;
use nalgebra::Vector3;

use crate::core::domain::Image;
use crate::core::spatial;
use crate::engine::calculator::Calculator;
use crate::error::AipesError;

/// Replays the results stored on each image.
///
/// This is how reference data enters a comparison: energies and forces that
/// were computed elsewhere (e.g. by a DFT code) and saved with the geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePointCalculator;

impl Calculator for SinglePointCalculator {
    fn name(&self) -> &str {
        "SinglePoint"
    }

    fn get_potential_energy(&self, image: &Image, _apply_constraint: bool) -> Result<f64> {
        Ok(image.reference_energy()?)
    }

    fn get_forces(&self, image: &Image, apply_constraint: bool) -> Result<Vec<Vector3<f64>>> {
        let stored = image.reference_forces()?;
        if stored.len() != image.num_atoms() {
            return Err(AipesError::ShapeMismatch {
                label: image.label.clone(),
                expected: image.num_atoms(),
                actual: stored.len(),
            }
            .into());
        }

        let mut forces = stored.to_vec();
        if apply_constraint {
            spatial::apply_constraints(image, &mut forces);
        }
        Ok(forces)
    }
}
