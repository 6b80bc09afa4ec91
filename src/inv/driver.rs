//! The inversion driver.
//!
//! Wiring, not algorithm: the damped Gauss-Newton minimization is performed by
//! `levenberg_marquardt::LevenbergMarquardt` on the adapter in
//! [`crate::inv::problem`]. The driver owns what remains:
//!
//! - input validation and the underdetermination guard
//! - the log transforms and error weighting handed to the adapter
//! - the regularization schedule: start at `lam`, relax by `lambda_factor`
//!   per stage, stop on the chi2 target or stalled improvement
//! - splitting the recovered model vector and summarizing fit quality

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::DVector;

use crate::domain::{
    FitQuality, InversionConfig, InversionOutcome, LayerModel, Sounding, StageInfo,
};
use crate::error::AppError;
use crate::inv::problem::SoundingProblem;
use crate::inv::start::build_start_model;
use crate::math::{chi2_log, relrms_pct};
use crate::solver::ForwardOperator;

/// Run a 1-D sounding inversion.
///
/// Returns the recovered layer model, the forward response at the solution,
/// per-stage diagnostics, and the two scalar fit statistics (`relrms`, `chi2`).
pub fn invert<F: ForwardOperator>(
    op: &F,
    sounding: &Sounding,
    config: &InversionConfig,
) -> Result<InversionOutcome, AppError> {
    config.validate()?;
    sounding.validate()?;

    if op.n_readings() != sounding.len() {
        return Err(AppError::config(format!(
            "Forward backend is bound to {} readings but the sounding has {}.",
            op.n_readings(),
            sounding.len()
        )));
    }

    let n_params = 2 * config.n_layers - 1;
    if sounding.len() <= n_params {
        return Err(AppError::data(format!(
            "Underdetermined: {} readings cannot constrain {} parameters ({} layers).",
            sounding.len(),
            n_params,
            config.n_layers
        )));
    }

    let err = sounding.relative_errors(config.error_perc);
    let log_data: Vec<f64> = sounding.rhoa.iter().map(|v| v.ln()).collect();
    let weights: Vec<f64> = err.iter().map(|e| 1.0 / e).collect();

    let start = build_start_model(sounding, config)?;
    let prior: Vec<f64> = start.stacked().iter().map(|v| v.ln()).collect();

    let mut params = DVector::from_vec(prior.clone());
    let mut stages: Vec<StageInfo> = Vec::new();
    let mut best: Option<(f64, DVector<f64>, Vec<f64>)> = None;
    let mut prev_chi2 = f64::INFINITY;
    let mut lam = config.lam;

    for _ in 0..config.max_stages {
        let problem = SoundingProblem::new(
            op,
            &log_data,
            &weights,
            &prior,
            lam,
            config.n_layers,
            config.fd_step,
            params.clone(),
        );
        let (solved, report) = LevenbergMarquardt::new()
            .with_patience(config.patience)
            .minimize(problem);
        let trial = solved.params();

        let evaluated = evaluate(op, sounding, &err, &trial, config.n_layers);
        let (chi2, relrms, response) = match evaluated {
            Ok(v) => v,
            // A stage that fails numerically keeps the best model so far;
            // with nothing accepted yet the run is a hard failure.
            Err(e) => {
                if best.is_some() {
                    break;
                }
                return Err(e);
            }
        };

        stages.push(StageInfo {
            lam,
            chi2,
            relrms_pct: relrms,
            evaluations: report.number_of_evaluations,
            converged: report.termination.was_successful(),
        });

        let improved = best.as_ref().is_none_or(|(c, _, _)| chi2 < *c);
        if improved {
            best = Some((chi2, trial.clone(), response));
            params = trial;
        } else {
            // Restart the next stage from the best model, not the failed trial.
            if let Some((_, p, _)) = &best {
                params = p.clone();
            }
        }

        if chi2 <= config.chi2_target {
            break;
        }
        if prev_chi2.is_finite() {
            let gain = (prev_chi2 - chi2) / prev_chi2;
            if gain < config.min_improvement {
                break;
            }
        }
        prev_chi2 = chi2;
        lam *= config.lambda_factor;
    }

    let (chi2, p_best, response) =
        best.ok_or_else(|| AppError::numeric("Inversion produced no usable model."))?;
    let model = model_from_log_params(&p_best, config.n_layers)?;
    let relrms = relrms_pct(&sounding.rhoa, &response)
        .ok_or_else(|| AppError::numeric("Non-finite response at the recovered model."))?;

    Ok(InversionOutcome {
        model,
        response,
        quality: FitQuality {
            relrms_pct: relrms,
            chi2,
            n: sounding.len(),
        },
        stages,
    })
}

/// Evaluate a log-parameter vector: response in linear space plus the two fit
/// statistics.
fn evaluate<F: ForwardOperator>(
    op: &F,
    sounding: &Sounding,
    err: &[f64],
    log_params: &DVector<f64>,
    n_layers: usize,
) -> Result<(f64, f64, Vec<f64>), AppError> {
    let model = model_from_log_params(log_params, n_layers)?;
    let response = op
        .respond(&model)
        .map_err(|e| AppError::numeric(format!("Forward evaluation failed: {e}")))?;
    let chi2 = chi2_log(&sounding.rhoa, &response, err)
        .ok_or_else(|| AppError::numeric("Non-finite response during chi2 computation."))?;
    let relrms = relrms_pct(&sounding.rhoa, &response)
        .ok_or_else(|| AppError::numeric("Non-finite response during relrms computation."))?;
    Ok((chi2, relrms, response))
}

fn model_from_log_params(log_params: &DVector<f64>, n_layers: usize) -> Result<LayerModel, AppError> {
    let stacked: Vec<f64> = log_params.iter().map(|v| v.exp()).collect();
    for &v in &stacked {
        if !(v.is_finite() && v > 0.0) {
            return Err(AppError::numeric(
                "Recovered model left the positive parameter domain.",
            ));
        }
    }
    LayerModel::from_stacked(&stacked, n_layers)
}
