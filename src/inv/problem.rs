//! Least-squares adapter handed to the external minimizer.
//!
//! The problem is formulated entirely in log space:
//!
//! - parameters are `ln thk` and `ln res` (stacked), which keeps them positive
//!   and makes multiplicative model changes additive
//! - data residuals are `(ln rhoa_obs - ln rhoa_model) / err`, so a relative
//!   data error becomes a unit weight
//! - regularization appears as extra residual rows `sqrt(lam) * (p - p0)`
//!   pulling parameters toward the (log) start model
//!
//! The minimizer only sees `residuals()` and `jacobian()`; the damping strategy
//! and step control stay inside it. Jacobian columns are forward differences on
//! the log parameters around the cached base response, evaluated in parallel,
//! one opaque forward call per column.

use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use rayon::prelude::*;

use crate::domain::LayerModel;
use crate::solver::ForwardOperator;

pub(crate) struct SoundingProblem<'a, F: ForwardOperator> {
    op: &'a F,
    /// `ln` of the observed apparent resistivities.
    log_data: &'a [f64],
    /// Per-reading data weights `1 / err`.
    weights: &'a [f64],
    /// Log start model, the regularization pull target.
    prior: &'a [f64],
    sqrt_lam: f64,
    n_layers: usize,
    fd_step: f64,
    params: DVector<f64>,
    /// Cached `ln` response at `params`; `None` when evaluation failed.
    log_response: Option<Vec<f64>>,
}

impl<'a, F: ForwardOperator> SoundingProblem<'a, F> {
    pub(crate) fn new(
        op: &'a F,
        log_data: &'a [f64],
        weights: &'a [f64],
        prior: &'a [f64],
        lam: f64,
        n_layers: usize,
        fd_step: f64,
        params: DVector<f64>,
    ) -> Self {
        let mut problem = Self {
            op,
            log_data,
            weights,
            prior,
            sqrt_lam: lam.max(0.0).sqrt(),
            n_layers,
            fd_step,
            params,
            log_response: None,
        };
        let initial = problem.params.clone();
        problem.log_response = problem.respond_log(&initial);
        problem
    }

    fn n_data(&self) -> usize {
        self.log_data.len()
    }

    fn n_params(&self) -> usize {
        self.params.len()
    }

    /// Evaluate the forward backend at log parameters `p` and return the log
    /// response, or `None` on any numerical failure.
    fn respond_log(&self, p: &DVector<f64>) -> Option<Vec<f64>> {
        let stacked: Vec<f64> = p.iter().map(|&v| v.exp()).collect();
        let model = LayerModel::from_stacked(&stacked, self.n_layers).ok()?;
        let rhoa = self.op.respond(&model).ok()?;
        if rhoa.len() != self.n_data() {
            return None;
        }
        let mut out = Vec::with_capacity(rhoa.len());
        for v in rhoa {
            if !(v.is_finite() && v > 0.0) {
                return None;
            }
            out.push(v.ln());
        }
        Some(out)
    }
}

impl<'a, F: ForwardOperator> LeastSquaresProblem<f64, Dyn, Dyn> for SoundingProblem<'a, F> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.copy_from(x);
        self.log_response = self.respond_log(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let base = self.log_response.as_ref()?;
        let n = self.n_data();
        let m = self.n_params();

        let mut r = DVector::<f64>::zeros(n + m);
        for i in 0..n {
            r[i] = (self.log_data[i] - base[i]) * self.weights[i];
        }
        for j in 0..m {
            r[n + j] = self.sqrt_lam * (self.params[j] - self.prior[j]);
        }
        Some(r)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let base = self.log_response.as_ref()?;
        let n = self.n_data();
        let m = self.n_params();

        // Each column is independent, so evaluate them in parallel.
        let columns: Vec<Option<(f64, Vec<f64>)>> = (0..m)
            .into_par_iter()
            .map(|j| {
                let mut p = self.params.clone();
                let h = self.fd_step * (1.0 + p[j].abs());
                p[j] += h;
                let pert = self.respond_log(&p)?;
                Some((h, pert))
            })
            .collect();

        let mut jac = DMatrix::<f64>::zeros(n + m, m);
        for (j, col) in columns.into_iter().enumerate() {
            let (h, pert) = col?;
            for i in 0..n {
                // Residual is (log_data - log_response) * w, so the derivative
                // carries a minus sign.
                jac[(i, j)] = -self.weights[i] * (pert[i] - base[i]) / h;
            }
            jac[(n + j, j)] = self.sqrt_lam;
        }
        Some(jac)
    }
}
