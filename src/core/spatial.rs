use nalgebra::{Point3, Vector3};

use crate::core::domain::{Image, Lattice};
use crate::error::AipesError;

/// Displacement vector from `p1` to `p2`.
/// If `lattice` is provided, applies Minimum Image Convention (MIC).
#[inline]
pub fn displacement(p1: &Point3<f64>, p2: &Point3<f64>, lattice: Option<&Lattice>) -> Vector3<f64> {
    match lattice {
        Some(lat) => {
            // Periodic: Convert delta to fractional coordinates
            let mut d_frac = lat.inverse * (p2 - p1);

            // Wrap fractional components to [-0.5, 0.5]
            d_frac.x -= d_frac.x.round();
            d_frac.y -= d_frac.y.round();
            d_frac.z -= d_frac.z.round();

            lat.vectors * d_frac
        }
        None => p2 - p1,
    }
}

/// Zeroes the force on every fixed atom of `image`.
///
/// **Invariant**: `forces` is indexed like `image.atoms`; extra entries are left untouched.
pub fn apply_constraints(image: &Image, forces: &mut [Vector3<f64>]) {
    for (atom, f) in image.atoms.iter().zip(forces.iter_mut()) {
        if atom.is_fixed {
            *f = Vector3::zeros();
        }
    }
}

/// Linearly interpolates the intermediate images of a path between its endpoints.
///
/// Endpoints are left unchanged. Displacements follow the minimum image of the
/// first endpoint's lattice. Stored results on interpolated images are dropped
/// since their geometry changed.
pub fn interpolate(path: &mut [Image]) -> Result<(), AipesError> {
    let n = path.len();
    if n < 2 {
        return Err(AipesError::PathTooShort(n));
    }

    let (first, rest) = path.split_at_mut(1);
    let (middle, last) = rest.split_at_mut(n - 2);
    let initial = &first[0];
    let fin = &last[0];

    if initial.num_atoms() != fin.num_atoms() {
        return Err(AipesError::ShapeMismatch {
            label: fin.label.clone(),
            expected: initial.num_atoms(),
            actual: fin.num_atoms(),
        });
    }

    let lattice = initial.lattice.as_ref();
    let steps: Vec<Vector3<f64>> = initial
        .atoms
        .iter()
        .zip(fin.atoms.iter())
        .map(|(a, b)| displacement(&a.position, &b.position, lattice) / (n - 1) as f64)
        .collect();

    for (k, image) in middle.iter_mut().enumerate() {
        if image.num_atoms() != initial.num_atoms() {
            return Err(AipesError::ShapeMismatch {
                label: image.label.clone(),
                expected: initial.num_atoms(),
                actual: image.num_atoms(),
            });
        }
        let scale = (k + 1) as f64;
        for ((atom, start), step) in image.atoms.iter_mut().zip(initial.atoms.iter()).zip(&steps) {
            atom.position = start.position + step * scale;
        }
        image.clear_results();
    }

    Ok(())
}
