//! Test stand-in for the external forward backend.
//!
//! `BlendOperator` mixes layer resistivities with exponential depth weights
//! keyed to the electrode spacing: short spacings see the top layer, long
//! spacings see the basement, intermediate spacings a smooth blend. That gives
//! the drivers a well-behaved, differentiable target to invert against. It is
//! a numerical stand-in, not a physical forward model.

use crate::domain::{Geometry, LayerModel};
use crate::solver::{ForwardOperator, SolverError};

/// Fraction of AB/2 used as the effective probing depth.
const PROBE_DEPTH_FRACTION: f64 = 0.5;

pub struct BlendOperator {
    ab2: Vec<f64>,
}

impl BlendOperator {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            ab2: geometry.ab2.clone(),
        }
    }
}

impl ForwardOperator for BlendOperator {
    fn n_readings(&self) -> usize {
        self.ab2.len()
    }

    fn respond(&self, model: &LayerModel) -> Result<Vec<f64>, SolverError> {
        model
            .validate()
            .map_err(|e| SolverError::new(format!("invalid model: {e}")))?;

        let depths = model.depths();
        let mut out = Vec::with_capacity(self.ab2.len());

        for &ab2 in &self.ab2 {
            let z = ab2 * PROBE_DEPTH_FRACTION;
            let mut rhoa = 0.0;
            let mut top = 0.0;
            for (k, &res) in model.res.iter().enumerate() {
                let w = match depths.get(k) {
                    Some(&bottom) => (-top / z).exp() - (-bottom / z).exp(),
                    // Semi-infinite basement takes the remaining weight.
                    None => (-top / z).exp(),
                };
                rhoa += w * res;
                if let Some(&bottom) = depths.get(k) {
                    top = bottom;
                }
            }
            if !(rhoa.is_finite() && rhoa > 0.0) {
                return Err(SolverError::new(format!(
                    "non-physical response {rhoa} at ab2={ab2}"
                )));
            }
            out.push(rhoa);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layer() -> LayerModel {
        LayerModel::new(vec![50.0, 500.0], vec![5.0]).unwrap()
    }

    #[test]
    fn short_spacings_see_the_top_layer() {
        let g = Geometry::new(vec![0.5], vec![0.1]).unwrap();
        let op = BlendOperator::new(&g);
        let rhoa = op.respond(&two_layer()).unwrap();
        assert!((rhoa[0] - 50.0).abs() < 1.0, "got {}", rhoa[0]);
    }

    #[test]
    fn long_spacings_see_the_basement() {
        let g = Geometry::new(vec![1000.0], vec![200.0]).unwrap();
        let op = BlendOperator::new(&g);
        let rhoa = op.respond(&two_layer()).unwrap();
        assert!(rhoa[0] > 400.0, "got {}", rhoa[0]);
    }

    #[test]
    fn response_is_monotone_for_rising_basement() {
        let g = Geometry::schlumberger_log(1.0, 300.0, 12).unwrap();
        let op = BlendOperator::new(&g);
        let rhoa = op.respond(&two_layer()).unwrap();
        for w in rhoa.windows(2) {
            assert!(w[1] >= w[0], "expected non-decreasing response, got {rhoa:?}");
        }
    }
}
