//! Synthetic sounding generation.
//!
//! Given a known layered model and a forward backend, produce simulated
//! apparent-resistivity data for exercising the inversion driver. Noise is
//! multiplicative Gaussian with a seeded RNG so runs are reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::{Geometry, LayerModel, Sounding};
use crate::error::AppError;
use crate::solver::ForwardOperator;

/// Default relative noise level.
pub const DEFAULT_NOISE_LEVEL: f64 = 0.01;
/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 1337;

/// Floor applied to perturbed readings, as a fraction of the clean value.
const RHOA_FLOOR_FRACTION: f64 = 1e-3;

/// A simulated sounding: perturbed readings plus the relative errors that
/// were applied.
#[derive(Debug, Clone)]
pub struct Synthetic {
    pub rhoa: Vec<f64>,
    pub err: Vec<f64>,
}

impl Synthetic {
    /// Package as a [`Sounding`] over the given geometry.
    ///
    /// A noise-free simulation carries no error vector.
    pub fn into_sounding(self, geometry: Geometry) -> Result<Sounding, AppError> {
        let err = if self.err.iter().all(|&e| e == 0.0) {
            None
        } else {
            Some(self.err)
        };
        Sounding::new(geometry, self.rhoa, err)
    }
}

/// Noise-free forward response of `model`.
pub fn simulate_clean<F: ForwardOperator>(op: &F, model: &LayerModel) -> Result<Vec<f64>, AppError> {
    model.validate()?;
    let rhoa = op
        .respond(model)
        .map_err(|e| AppError::numeric(format!("Forward evaluation failed: {e}")))?;
    if rhoa.len() != op.n_readings() {
        return Err(AppError::numeric(format!(
            "Forward backend returned {} readings, expected {}.",
            rhoa.len(),
            op.n_readings()
        )));
    }
    for (i, &v) in rhoa.iter().enumerate() {
        if !(v.is_finite() && v > 0.0) {
            return Err(AppError::numeric(format!(
                "Forward backend returned a non-physical value {v} at reading {}.",
                i + 1
            )));
        }
    }
    Ok(rhoa)
}

/// Simulate a sounding: clean response perturbed by multiplicative Gaussian
/// noise, `rhoa_i * (1 + noise_level * z_i)`, floored away from zero.
///
/// `err` is filled with the flat relative noise level, matching how field data
/// is usually annotated.
pub fn simulate<F: ForwardOperator>(
    op: &F,
    model: &LayerModel,
    noise_level: f64,
    seed: u64,
) -> Result<Synthetic, AppError> {
    if !(noise_level.is_finite() && (0.0..0.5).contains(&noise_level)) {
        return Err(AppError::config(format!(
            "noise_level must be in [0, 0.5), got {noise_level}."
        )));
    }

    let clean = simulate_clean(op, model)?;

    if noise_level == 0.0 {
        let err = vec![0.0; clean.len()];
        return Ok(Synthetic { rhoa: clean, err });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::numeric(format!("Noise distribution error: {e}")))?;

    let mut rhoa = Vec::with_capacity(clean.len());
    for &c in &clean {
        let z: f64 = normal.sample(&mut rng);
        let perturbed = (c * (1.0 + noise_level * z)).max(c * RHOA_FLOOR_FRACTION);
        rhoa.push(perturbed);
    }

    let err = vec![noise_level; rhoa.len()];
    Ok(Synthetic { rhoa, err })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Geometry;
    use crate::solver::mock::BlendOperator;

    fn setup() -> (Geometry, BlendOperator, LayerModel) {
        let g = Geometry::schlumberger_log(1.0, 100.0, 12).unwrap();
        let op = BlendOperator::new(&g);
        let model = LayerModel::new(vec![100.0, 20.0, 600.0], vec![3.0, 8.0]).unwrap();
        (g, op, model)
    }

    #[test]
    fn zero_noise_returns_the_clean_response() {
        let (_, op, model) = setup();
        let clean = simulate_clean(&op, &model).unwrap();
        let synth = simulate(&op, &model, 0.0, DEFAULT_SEED).unwrap();
        assert_eq!(synth.rhoa, clean);
        assert!(synth.err.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn same_seed_same_data() {
        let (_, op, model) = setup();
        let a = simulate(&op, &model, 0.05, 42).unwrap();
        let b = simulate(&op, &model, 0.05, 42).unwrap();
        assert_eq!(a.rhoa, b.rhoa);

        let c = simulate(&op, &model, 0.05, 43).unwrap();
        assert_ne!(a.rhoa, c.rhoa);
    }

    #[test]
    fn noise_stays_close_to_the_clean_response() {
        let (_, op, model) = setup();
        let clean = simulate_clean(&op, &model).unwrap();
        let synth = simulate(&op, &model, DEFAULT_NOISE_LEVEL, DEFAULT_SEED).unwrap();
        for (c, p) in clean.iter().zip(synth.rhoa.iter()) {
            let rel = ((p - c) / c).abs();
            assert!(rel < 0.1, "1% noise should stay well under 10%, got {rel}");
            assert!(*p > 0.0);
        }
        assert_eq!(synth.err, vec![DEFAULT_NOISE_LEVEL; clean.len()]);
    }

    #[test]
    fn simulate_rejects_bad_noise_levels() {
        let (_, op, model) = setup();
        assert!(simulate(&op, &model, 0.5, 1).is_err());
        assert!(simulate(&op, &model, -0.01, 1).is_err());
    }

    #[test]
    fn into_sounding_carries_errors() {
        let (g, op, model) = setup();
        let synth = simulate(&op, &model, 0.03, 7).unwrap();
        let sounding = synth.into_sounding(g).unwrap();
        assert_eq!(sounding.relative_errors(99.0), vec![0.03; sounding.len()]);
    }
}
