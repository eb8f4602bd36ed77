#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use aipes::core::domain::{Atom, Image};
use aipes::engine::calculator::{Calculator, Trainable};
use anyhow::{bail, Result};
use nalgebra::{Point3, Vector3};

/// Predicts the stored reference shifted by fixed offsets.
/// Zero offsets give a perfect predictor.
pub struct MockCalculator {
    pub energy_offset: f64,
    pub force_offset: Vector3<f64>,
    /// Labels of every training set seen, shared with the test.
    pub train_log: Rc<RefCell<Vec<Vec<String>>>>,
    pub trained: bool,
}

impl MockCalculator {
    pub fn perfect() -> Self {
        Self::with_offsets(0.0, Vector3::zeros())
    }

    pub fn with_offsets(energy_offset: f64, force_offset: Vector3<f64>) -> Self {
        Self {
            energy_offset,
            force_offset,
            train_log: Rc::new(RefCell::new(Vec::new())),
            trained: false,
        }
    }
}

impl Calculator for MockCalculator {
    fn get_potential_energy(&self, image: &Image, _apply_constraint: bool) -> Result<f64> {
        Ok(image.reference_energy()? + self.energy_offset)
    }

    fn get_forces(&self, image: &Image, apply_constraint: bool) -> Result<Vec<Vector3<f64>>> {
        let mut forces: Vec<Vector3<f64>> = image
            .reference_forces()?
            .iter()
            .map(|f| f + self.force_offset)
            .collect();
        if apply_constraint {
            aipes::core::spatial::apply_constraints(image, &mut forces);
        }
        Ok(forces)
    }

    fn name(&self) -> &str {
        "Mock Calculator"
    }
}

impl Trainable for MockCalculator {
    fn train(&mut self, images: &[Image], overwrite: bool) -> Result<()> {
        if self.trained && !overwrite {
            bail!("already trained");
        }
        self.train_log
            .borrow_mut()
            .push(images.iter().map(|img| img.label.clone()).collect());
        self.trained = true;
        Ok(())
    }
}

/// Always fails to evaluate anything.
pub struct BrokenCalculator;

impl Calculator for BrokenCalculator {
    fn get_potential_energy(&self, _image: &Image, _apply_constraint: bool) -> Result<f64> {
        bail!("engine crashed")
    }

    fn get_forces(&self, _image: &Image, _apply_constraint: bool) -> Result<Vec<Vector3<f64>>> {
        bail!("engine crashed")
    }

    fn name(&self) -> &str {
        "Broken Calculator"
    }
}

impl Trainable for BrokenCalculator {
    fn train(&mut self, _images: &[Image], _overwrite: bool) -> Result<()> {
        Ok(())
    }
}

/// A line of `n` atoms along x with the given reference results.
pub fn create_image(label: &str, n: usize, energy: f64, forces: Vec<Vector3<f64>>) -> Image {
    let atoms = (0..n)
        .map(|i| Atom::new(i % 2, Point3::new(i as f64, 0.0, 0.0)))
        .collect();
    Image::with_atoms(label, atoms).with_results(energy, forces)
}

/// Like [`create_image`] with zero reference forces.
pub fn create_relaxed_image(label: &str, n: usize, energy: f64) -> Image {
    create_image(label, n, energy, vec![Vector3::zeros(); n])
}
