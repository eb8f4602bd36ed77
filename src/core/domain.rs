use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::AipesError;

// --- Physics Types ---

/// A single atom of a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub element_id: usize, // Index into the model's element table
    pub position: Point3<f64>,
    /// Held in place by a fixed-atom constraint.
    #[serde(default)]
    pub is_fixed: bool,
}

impl Atom {
    pub fn new(element_id: usize, position: Point3<f64>) -> Self {
        Self {
            element_id,
            position,
            is_fixed: false,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.is_fixed = true;
        self
    }
}

/// Defines the Periodic Boundary Conditions (if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    pub vectors: Matrix3<f64>, // Columns are a, b, c
    pub inverse: Matrix3<f64>, // Precomputed for fractional conversion
}

impl Lattice {
    pub fn new(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Option<Self> {
        let vectors = Matrix3::from_columns(&[a, b, c]);
        let inverse = vectors.try_inverse()?;
        Some(Self { vectors, inverse })
    }
}

// --- The Core Entity ---

/// An atomic configuration, optionally carrying reference results
/// (energy in eV, one force vector in eV/Å per atom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub label: String,
    pub atoms: Vec<Atom>,
    #[serde(default)]
    pub lattice: Option<Lattice>,

    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub forces: Option<Vec<Vector3<f64>>>,
}

impl Image {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            atoms: Vec::new(),
            lattice: None,
            energy: None,
            forces: None,
        }
    }

    pub fn with_atoms(label: &str, atoms: Vec<Atom>) -> Self {
        Self {
            atoms,
            ..Self::new(label)
        }
    }

    /// Attaches reference results, replacing any previously stored ones.
    pub fn with_results(mut self, energy: f64, forces: Vec<Vector3<f64>>) -> Self {
        self.energy = Some(energy);
        self.forces = Some(forces);
        self
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn reference_energy(&self) -> Result<f64, AipesError> {
        self.energy
            .ok_or_else(|| AipesError::MissingReference(self.label.clone(), "energy"))
    }

    pub fn reference_forces(&self) -> Result<&[Vector3<f64>], AipesError> {
        self.forces
            .as_deref()
            .ok_or_else(|| AipesError::MissingReference(self.label.clone(), "forces"))
    }

    /// Drops stored results, e.g. after the geometry changed.
    pub fn clear_results(&mut self) {
        self.energy = None;
        self.forces = None;
    }
}

// --- Model Description ---

/// Neural-network layout handed to calculator factories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topology {
    pub hidden_layers: Vec<usize>,
    pub activation: String,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            hidden_layers: vec![10, 10],
            activation: "tanh".to_string(),
        }
    }
}
