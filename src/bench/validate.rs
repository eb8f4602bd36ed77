use std::fmt;

use anyhow::Result;
use nalgebra::DVector;
use serde::Serialize;

use crate::bench::mep::Convergence;
use crate::core::domain::Image;
use crate::core::stats;
use crate::engine::calculator::Calculator;
use crate::error::AipesError;

/// Cartesian components per force vector.
const SPATIAL_DIMS: f64 = 3.0;

/// Energy/force errors of a calculator over one image set.
/// Energies are per atom (eV/atom), forces per component (eV/Å).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Accuracy {
    pub energy_rmse: f64,
    pub energy_maxresid: f64,
    pub force_rmse: f64,
    pub force_maxresid: f64,
}

impl Accuracy {
    pub fn as_array(&self) -> [f64; 4] {
        [self.energy_rmse, self.energy_maxresid, self.force_rmse, self.force_maxresid]
    }

    pub fn from_array(v: [f64; 4]) -> Self {
        Self {
            energy_rmse: v[0],
            energy_maxresid: v[1],
            force_rmse: v[2],
            force_maxresid: v[3],
        }
    }

    /// Column-wise mean of several records.
    pub fn mean(rows: &[Accuracy]) -> Result<Accuracy, AipesError> {
        let mut cols = [0.0; 4];
        for (k, col) in cols.iter_mut().enumerate() {
            let values = DVector::from_iterator(rows.len(), rows.iter().map(|r| r.as_array()[k]));
            *col = stats::mean(&values)?;
        }
        Ok(Self::from_array(cols))
    }

    /// True when every metric is within its threshold.
    pub fn is_converged(&self, criteria: &Convergence) -> bool {
        self.energy_rmse <= criteria.energy_rmse
            && self.energy_maxresid <= criteria.energy_maxresid
            && self.force_rmse <= criteria.force_rmse
            && self.force_maxresid <= criteria.force_maxresid
    }

    /// One `name = value` line per metric, names right-aligned.
    pub fn report_lines(&self) -> Vec<String> {
        [
            ("energy_rmse", self.energy_rmse),
            ("energy_maxresid", self.energy_maxresid),
            ("force_rmse", self.force_rmse),
            ("force_maxresid", self.force_maxresid),
        ]
        .iter()
        .map(|(name, value)| format!("{:>16} = {:>13}", name, sci(*value)))
        .collect()
    }
}

impl fmt::Display for Accuracy {
    /// Four space-separated fields in `d.dddde±XX` notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self.as_array().iter().map(|v| sci(*v)).collect();
        write!(f, "{}", fields.join(" "))
    }
}

/// Scientific notation with four decimals and a signed, two-digit exponent
/// (`1.2340e-03`), the layout C's `%.4e` produces.
pub fn sci(value: f64) -> String {
    let raw = format!("{:.4e}", value);
    match raw.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(e) => {
                let sign = if e < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, e.abs())
            }
            Err(_) => raw,
        },
        // inf / NaN
        None => raw,
    }
}

/// Per-atom energy RMSE and maximum residual of `calc` against the references of `images`.
pub fn validate_energy<C: Calculator + ?Sized>(calc: &C, images: &[Image]) -> Result<(f64, f64)> {
    let mut diffs = Vec::with_capacity(images.len());
    for image in images {
        if image.num_atoms() == 0 {
            return Err(AipesError::NoAtoms(image.label.clone()).into());
        }
        let reference = image.reference_energy()?;
        let predicted = calc.get_potential_energy(image, false)?;
        diffs.push((predicted - reference) / image.num_atoms() as f64);
    }

    let diffs = DVector::from_vec(diffs);
    Ok((stats::rmse(&diffs)?, stats::maxresid(&diffs)?))
}

/// Per-component force RMSE and maximum residual of `calc` against the references of `images`.
pub fn validate_forces<C: Calculator + ?Sized>(calc: &C, images: &[Image]) -> Result<(f64, f64)> {
    let mut norms = Vec::new();
    let mut maxresid: Option<f64> = None;

    for image in images {
        let reference = image.reference_forces()?;
        let predicted = calc.get_forces(image, false)?;
        if predicted.len() != reference.len() {
            return Err(AipesError::ShapeMismatch {
                label: image.label.clone(),
                expected: reference.len(),
                actual: predicted.len(),
            }
            .into());
        }

        for (p, r) in predicted.iter().zip(reference.iter()) {
            let diff = p - r;
            let largest = diff.amax();
            maxresid = Some(maxresid.map_or(largest, |m| m.max(largest)));
            norms.push(diff.norm());
        }
    }

    let norms = DVector::from_vec(norms);
    let rmse = stats::rmse(&norms)? / SPATIAL_DIMS.sqrt();
    let maxresid = maxresid.ok_or(AipesError::EmptyInput)?;
    Ok((rmse, maxresid))
}

/// Runs both validators and bundles the result.
pub fn validate<C: Calculator + ?Sized>(calc: &C, images: &[Image]) -> Result<Accuracy> {
    let (energy_rmse, energy_maxresid) = validate_energy(calc, images)?;
    let (force_rmse, force_maxresid) = validate_forces(calc, images)?;
    Ok(Accuracy {
        energy_rmse,
        energy_maxresid,
        force_rmse,
        force_maxresid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sci_matches_printf_layout() {
        assert_eq!(sci(0.0), "0.0000e+00");
        assert_eq!(sci(0.1), "1.0000e-01");
        assert_eq!(sci(12345.678), "1.2346e+04");
        assert_eq!(sci(-2.5e-12), "-2.5000e-12");
        assert_eq!(sci(3.0e123), "3.0000e+123");
    }

    #[test]
    fn test_report_lines_alignment() {
        let acc = Accuracy {
            energy_rmse: 0.001,
            ..Default::default()
        };
        let lines = acc.report_lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "     energy_rmse =    1.0000e-03");
        assert_eq!(lines[3], "  force_maxresid =    0.0000e+00");
    }

    #[test]
    fn test_mean_of_rows() {
        let rows = [
            Accuracy::from_array([1.0, 2.0, 3.0, 4.0]),
            Accuracy::from_array([3.0, 4.0, 5.0, 6.0]),
        ];
        let m = Accuracy::mean(&rows).unwrap();
        assert_eq!(m.as_array(), [2.0, 3.0, 4.0, 5.0]);
        assert_eq!(Accuracy::mean(&[]), Err(AipesError::EmptyInput));
    }
}
