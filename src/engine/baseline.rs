use anyhow::{anyhow, bail, Result};
use log::debug;
use nalgebra::{DMatrix, DVector, Vector3};

use crate::core::domain::{Image, Topology};
use crate::engine::calculator::{Calculator, Trainable};

/// Singular values below this are treated as zero in the least-squares fit.
const SVD_EPS: f64 = 1e-12;

/// Composition baseline: `E = Σ_atoms ε[element]`, forces identically zero.
///
/// Fitted per element by linear least squares over the training energies.
/// Useful as the floor any learned potential must beat.
#[derive(Debug, Clone)]
pub struct CompositionModel {
    name: String,
    /// Per-element energies (eV). `None` until trained.
    epsilon: Option<DVector<f64>>,
}

impl CompositionModel {
    /// The topology only labels the model; a linear fit has no hidden layers.
    pub fn new(topology: &Topology) -> Self {
        let layers = topology
            .hidden_layers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-");
        Self {
            name: format!("Composition ({} {})", topology.activation, layers),
            epsilon: None,
        }
    }

    pub fn element_energies(&self) -> Option<&DVector<f64>> {
        self.epsilon.as_ref()
    }

    fn coefficients(&self) -> Result<&DVector<f64>> {
        self.epsilon
            .as_ref()
            .ok_or_else(|| anyhow!("{} has not been trained", self.name))
    }
}

impl Calculator for CompositionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_potential_energy(&self, image: &Image, _apply_constraint: bool) -> Result<f64> {
        let eps = self.coefficients()?;
        let mut energy = 0.0;
        for atom in &image.atoms {
            let e = eps.get(atom.element_id).ok_or_else(|| {
                anyhow!("Element {} of image '{}' was absent from training data", atom.element_id, image.label)
            })?;
            energy += e;
        }
        Ok(energy)
    }

    fn get_forces(&self, image: &Image, _apply_constraint: bool) -> Result<Vec<Vector3<f64>>> {
        self.coefficients()?;
        Ok(vec![Vector3::zeros(); image.num_atoms()])
    }
}

impl Trainable for CompositionModel {
    fn train(&mut self, images: &[Image], overwrite: bool) -> Result<()> {
        if self.epsilon.is_some() && !overwrite {
            bail!("{} is already trained; retraining requires overwrite", self.name);
        }
        if images.is_empty() {
            bail!("Cannot train {} on an empty image set", self.name);
        }

        let n_elements = images
            .iter()
            .flat_map(|img| img.atoms.iter().map(|a| a.element_id + 1))
            .max()
            .unwrap_or(0);
        if n_elements == 0 {
            bail!("Training images for {} contain no atoms", self.name);
        }

        // Design matrix: row i counts each element in image i.
        let mut counts = DMatrix::<f64>::zeros(images.len(), n_elements);
        let mut energies = DVector::<f64>::zeros(images.len());
        for (i, image) in images.iter().enumerate() {
            for atom in &image.atoms {
                counts[(i, atom.element_id)] += 1.0;
            }
            energies[i] = image.reference_energy()?;
        }

        let epsilon = counts
            .svd(true, true)
            .solve(&energies, SVD_EPS)
            .map_err(|e| anyhow!("Least-squares fit failed: {}", e))?;

        debug!("{}: fitted {} element energies on {} images", self.name, n_elements, images.len());
        self.epsilon = Some(epsilon);
        Ok(())
    }
}
