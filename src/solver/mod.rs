//! The forward-solver seam.
//!
//! Computing the DC-resistivity response of a layered half-space (and everything
//! downstream of it: Jacobians, damped steps, convergence) is the job of an
//! external modeling backend. This crate only talks to that backend through
//! [`ForwardOperator`]: geometry is bound when the operator is constructed, and
//! the operator maps a [`LayerModel`] to one apparent-resistivity value per
//! reading.
//!
//! The inversion driver evaluates operators from rayon worker threads while
//! assembling Jacobian columns, hence the `Sync` bound.

use crate::domain::LayerModel;

#[cfg(test)]
pub mod mock;

/// Error crossing the solver seam.
#[derive(Debug, Clone)]
pub struct SolverError {
    message: String,
}

impl SolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SolverError {}

/// A 1-D DC-resistivity forward operator with its geometry bound at
/// construction time.
pub trait ForwardOperator: Sync {
    /// Number of readings this operator produces (one per electrode spacing).
    fn n_readings(&self) -> usize;

    /// Apparent resistivity response of `model`, one value per reading, in the
    /// order of the bound geometry.
    fn respond(&self, model: &LayerModel) -> Result<Vec<f64>, SolverError>;
}
