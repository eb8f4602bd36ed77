//! Checking a minimum energy path (MEP) computed with a learned potential
//! against a reference calculator.
//!
//! The reference images produced here carry their results, so they can be
//! appended to the training set when the path is not yet accurate enough;
//! [`refine`] repeats that until the path passes or the iteration cap is hit.

use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bench::validate::{validate, Accuracy};
use crate::core::domain::Image;
use crate::engine::calculator::{Calculator, Trainable};
use crate::error::AipesError;

/// Accuracy thresholds an MEP must meet, plus the refinement iteration cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Convergence {
    pub energy_rmse: f64,     // eV/atom
    pub energy_maxresid: f64, // eV/atom
    pub force_rmse: f64,      // eV/Å
    pub force_maxresid: f64,  // eV/Å
    pub max_iteration: usize,
}

impl Default for Convergence {
    fn default() -> Self {
        Self {
            energy_rmse: 1e-3,
            energy_maxresid: 5e-3,
            force_rmse: 5e-2,
            force_maxresid: 1e-1,
            max_iteration: 10,
        }
    }
}

/// Builds the initial path: the initial image, `num_inter_images` copies of it, then the final image.
pub fn initialize_mep(initial: &Image, fin: &Image, num_inter_images: usize) -> Vec<Image> {
    let mut mep = Vec::with_capacity(num_inter_images + 2);
    mep.push(initial.clone());
    for i in 0..num_inter_images {
        let mut image = initial.clone();
        image.label = format!("{}_{}", initial.label, i + 1);
        mep.push(image);
    }
    mep.push(fin.clone());
    mep
}

/// Evaluates every image of `mep` with its own reference calculator and
/// measures `calc` against the results.
///
/// Returns the accuracy together with copies of the images that carry the
/// reference energy and forces. Reference evaluations run in parallel;
/// `gen_calc_ref` is called once per image so no calculator is shared.
pub fn validate_mep<C, R, G>(mep: &[Image], calc: &C, gen_calc_ref: G) -> Result<(Accuracy, Vec<Image>)>
where
    C: Calculator + ?Sized,
    R: Calculator,
    G: Fn() -> Result<R> + Sync,
{
    let ref_images = mep
        .par_iter()
        .map(|image| -> Result<Image> {
            let calc_ref = gen_calc_ref()?;
            // Forces first: most reference codes yield the energy in the same run.
            let forces = calc_ref
                .get_forces(image, false)
                .with_context(|| format!("Reference forces failed for image '{}'", image.label))?;
            let energy = calc_ref
                .get_potential_energy(image, false)
                .with_context(|| format!("Reference energy failed for image '{}'", image.label))?;
            Ok(image.clone().with_results(energy, forces))
        })
        .collect::<Result<Vec<Image>>>()?;

    let accuracy = validate(calc, &ref_images)?;
    for line in accuracy.report_lines() {
        info!("{}", line);
    }

    Ok((accuracy, ref_images))
}

/// Result of a [`refine`] run.
#[derive(Debug, Clone)]
pub struct RefineOutcome {
    pub converged: bool,
    /// Iterations actually run.
    pub iterations: usize,
    /// Accuracy of the last iteration; `None` if no iteration ran.
    pub accuracy: Option<Accuracy>,
    /// Endpoints plus the reference-evaluated intermediates of the last iteration.
    pub mep: Vec<Image>,
    /// Training set including every reference image added along the way.
    pub train_set: Vec<Image>,
}

/// Trains, relaxes and validates a path until it matches the reference.
///
/// Each iteration builds a fresh calculator with `gen_calc`, trains it on
/// `train_set` (overwriting earlier results), copies the initial guess `path`
/// and hands it to `relax_path` together with the trained calculator. The
/// intermediate images of the relaxed path are then checked with
/// [`validate_mep`]. When any metric misses its threshold the reference
/// images join the training set and the next iteration starts, at most
/// `convergence.max_iteration` times.
pub fn refine<T, C, F, P, R, G>(
    mut gen_calc: F,
    topology: &T,
    mut relax_path: P,
    gen_calc_ref: G,
    path: &[Image],
    mut train_set: Vec<Image>,
    convergence: &Convergence,
) -> Result<RefineOutcome>
where
    T: ?Sized,
    C: Trainable,
    F: FnMut(&T) -> Result<C>,
    P: FnMut(&mut Vec<Image>, &C) -> Result<()>,
    R: Calculator,
    G: Fn() -> Result<R> + Sync,
{
    if path.len() < 3 {
        return Err(AipesError::NoIntermediateImages(path.len()).into());
    }

    let mut accuracy = None;
    let mut mep = path.to_vec();

    for iteration in 1..=convergence.max_iteration {
        info!("Iteration # {}", iteration);

        let mut calc = gen_calc(topology).with_context(|| format!("Iteration {}: calculator construction failed", iteration))?;
        info!("Training {} on {} images", calc.name(), train_set.len());
        calc.train(&train_set, true)
            .with_context(|| format!("Iteration {}: training failed", iteration))?;

        let mut relaxed = path.to_vec();
        relax_path(&mut relaxed, &calc).with_context(|| format!("Iteration {}: path relaxation failed", iteration))?;
        if relaxed.len() < 3 {
            return Err(AipesError::NoIntermediateImages(relaxed.len()).into());
        }

        let last = relaxed.len() - 1;
        let (acc, ref_images) = validate_mep(&relaxed[1..last], &calc, &gen_calc_ref)?;

        mep = Vec::with_capacity(relaxed.len());
        mep.push(relaxed[0].clone());
        mep.extend(ref_images.iter().cloned());
        mep.push(relaxed[last].clone());
        accuracy = Some(acc);

        if acc.is_converged(convergence) {
            info!("Path converged after {} iteration(s)", iteration);
            return Ok(RefineOutcome {
                converged: true,
                iterations: iteration,
                accuracy,
                mep,
                train_set,
            });
        }
        train_set.extend(ref_images);
    }

    warn!("Maximum iteration number reached; path not converged");
    Ok(RefineOutcome {
        converged: false,
        iterations: convergence.max_iteration,
        accuracy,
        mep,
        train_set,
    })
}
