//! Per-reading residuals and formatted summaries.

use crate::domain::{InversionOutcome, Sounding};
use crate::error::AppError;

/// One reading of the fit table: observed vs modeled apparent resistivity.
#[derive(Debug, Clone)]
pub struct ReadingResidual {
    pub ab2: f64,
    pub mn2: f64,
    pub rhoa_obs: f64,
    pub rhoa_fit: f64,
    /// Relative misfit in percent, `100 * (obs - fit) / obs`.
    pub misfit_pct: f64,
}

/// Compute the per-reading residual table for a finished inversion.
pub fn compute_residual_table(
    sounding: &Sounding,
    outcome: &InversionOutcome,
) -> Result<Vec<ReadingResidual>, AppError> {
    if outcome.response.len() != sounding.len() {
        return Err(AppError::numeric(format!(
            "Response length {} does not match {} readings.",
            outcome.response.len(),
            sounding.len()
        )));
    }
    let mut out = Vec::with_capacity(sounding.len());
    for i in 0..sounding.len() {
        let obs = sounding.rhoa[i];
        let fit = outcome.response[i];
        if !fit.is_finite() {
            return Err(AppError::numeric(
                "Non-finite model response during residual computation.",
            ));
        }
        out.push(ReadingResidual {
            ab2: sounding.geometry.ab2[i],
            mn2: sounding.geometry.mn2[i],
            rhoa_obs: obs,
            rhoa_fit: fit,
            misfit_pct: 100.0 * (obs - fit) / obs,
        });
    }
    Ok(out)
}

/// Format the full run summary (layer table + fit statistics + stage trace).
pub fn format_inversion_summary(sounding: &Sounding, outcome: &InversionOutcome) -> String {
    let mut out = String::new();

    out.push_str("=== ves - 1-D Sounding Inversion ===\n");
    let stats = sounding.stats();
    out.push_str(&format!(
        "Readings: n={} | AB/2=[{:.2}, {:.2}] m | rhoa=[{:.1}, {:.1}] ohm-m\n",
        stats.n_readings, stats.ab2_min, stats.ab2_max, stats.rhoa_min, stats.rhoa_max
    ));
    out.push_str(&format!(
        "Fit: relrms={:.2}% | chi2={:.3} | n={}\n",
        outcome.quality.relrms_pct, outcome.quality.chi2, outcome.quality.n
    ));

    out.push_str("\nRecovered model:\n");
    out.push_str(&format_layer_table(outcome));

    out.push_str("\nStage trace:\n");
    for (i, s) in outcome.stages.iter().enumerate() {
        let mark = if s.converged { " " } else { "!" };
        out.push_str(&format!(
            "{mark} stage {:>2}: lam={:<8.3} chi2={:<10.3} relrms={:.2}% evals={}\n",
            i + 1,
            s.lam,
            s.chi2,
            s.relrms_pct,
            s.evaluations
        ));
    }
    out.push('\n');

    out
}

/// Format the layer table (depth ranges and resistivities).
pub fn format_layer_table(outcome: &InversionOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<6} {:>10} {:>10} {:>12}\n",
        "layer", "top(m)", "bottom(m)", "res(ohm-m)"
    ));

    let model = &outcome.model;
    let depths = model.depths();
    let mut top = 0.0;
    for (k, &res) in model.res.iter().enumerate() {
        let bottom = match depths.get(k) {
            Some(&d) => format!("{d:>10.2}"),
            None => format!("{:>10}", "-"),
        };
        out.push_str(&format!(
            "{:<6} {top:>10.2} {bottom} {res:>12.1}\n",
            k + 1
        ));
        if let Some(&d) = depths.get(k) {
            top = d;
        }
    }
    out
}

/// Format the per-reading fit table.
pub fn format_residual_table(rows: &[ReadingResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>10} {:>10} {:>12} {:>12} {:>10}\n",
        "ab2(m)", "mn2(m)", "rhoa(ohm-m)", "fit(ohm-m)", "misfit(%)"
    ));
    for r in rows {
        out.push_str(&format!(
            "{:>10.2} {:>10.2} {:>12.2} {:>12.2} {:>10.2}\n",
            r.ab2, r.mn2, r.rhoa_obs, r.rhoa_fit, r.misfit_pct
        ));
    }
    out
}

/// Format a dataset-only summary (for ingest checks without an inversion).
pub fn format_data_summary(sounding: &Sounding) -> String {
    let stats = sounding.stats();
    let mut out = String::new();
    out.push_str("=== ves - Sounding Data ===\n");
    out.push_str(&format!(
        "Readings: n={} | AB/2=[{:.2}, {:.2}] m | rhoa=[{:.1}, {:.1}] ohm-m\n",
        stats.n_readings, stats.ab2_min, stats.ab2_max, stats.rhoa_min, stats.rhoa_max
    ));
    match &sounding.err {
        Some(err) => {
            let max_err = err.iter().cloned().fold(0.0_f64, f64::max);
            out.push_str(&format!(
                "Errors: per-reading, up to {:.1}%\n",
                100.0 * max_err
            ));
        }
        None => out.push_str("Errors: none recorded\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, Geometry, LayerModel, StageInfo};

    fn outcome() -> (Sounding, InversionOutcome) {
        let g = Geometry::new(vec![1.0, 10.0, 100.0], vec![0.2, 2.0, 20.0]).unwrap();
        let sounding = Sounding::new(g, vec![100.0, 80.0, 400.0], None).unwrap();
        let outcome = InversionOutcome {
            model: LayerModel::new(vec![120.0, 15.0, 800.0], vec![2.5, 8.0]).unwrap(),
            response: vec![98.0, 82.0, 390.0],
            quality: FitQuality {
                relrms_pct: 2.4,
                chi2: 0.8,
                n: 3,
            },
            stages: vec![StageInfo {
                lam: 20.0,
                chi2: 0.8,
                relrms_pct: 2.4,
                evaluations: 17,
                converged: true,
            }],
        };
        (sounding, outcome)
    }

    #[test]
    fn residual_table_basic() {
        let (sounding, outcome) = outcome();
        let rows = compute_residual_table(&sounding, &outcome).unwrap();
        assert_eq!(rows.len(), 3);
        assert!((rows[0].misfit_pct - 2.0).abs() < 1e-9);
        assert!((rows[1].misfit_pct - (-2.5)).abs() < 1e-9);
    }

    #[test]
    fn residual_table_rejects_length_mismatch() {
        let (sounding, mut outcome) = outcome();
        outcome.response.pop();
        assert!(compute_residual_table(&sounding, &outcome).is_err());
    }

    #[test]
    fn layer_table_marks_the_basement_open_ended() {
        let (_, outcome) = outcome();
        let txt = format_layer_table(&outcome);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4, "header plus one row per layer");
        assert!(lines[3].contains('-'), "basement has no bottom depth");
        assert!(lines[1].contains("120.0"));
    }

    #[test]
    fn summary_mentions_fit_statistics() {
        let (sounding, outcome) = outcome();
        let txt = format_inversion_summary(&sounding, &outcome);
        assert!(txt.contains("relrms=2.40%"));
        assert!(txt.contains("chi2=0.800"));
        assert!(txt.contains("stage  1"));
    }
}
