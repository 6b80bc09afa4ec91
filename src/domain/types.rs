//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the inversion and simulation drivers
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::{log_space, median};

/// Default `ab2 / mn2` ratio for generated Schlumberger layouts.
///
/// Field layouts vary, but keeping the potential dipole a fifth of the current
/// electrode half-spacing is a common compromise between signal strength and
/// the validity of the gradient approximation.
pub const DEFAULT_AB2_MN2_RATIO: f64 = 5.0;

/// Schlumberger electrode geometry for one sounding.
///
/// `ab2` is half the current-electrode spacing AB/2, `mn2` half the potential
/// dipole MN/2, both in meters, one entry per reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub ab2: Vec<f64>,
    pub mn2: Vec<f64>,
}

impl Geometry {
    pub fn new(ab2: Vec<f64>, mn2: Vec<f64>) -> Result<Self, AppError> {
        let g = Self { ab2, mn2 };
        g.validate()?;
        Ok(g)
    }

    /// Log-spaced layout between `ab2_min` and `ab2_max` with a fixed
    /// `ab2/mn2` ratio.
    pub fn schlumberger_log(ab2_min: f64, ab2_max: f64, n: usize) -> Result<Self, AppError> {
        let ab2 = log_space(ab2_min, ab2_max, n)?;
        let mn2 = ab2.iter().map(|&a| a / DEFAULT_AB2_MN2_RATIO).collect();
        Self::new(ab2, mn2)
    }

    pub fn len(&self) -> usize {
        self.ab2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ab2.is_empty()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.ab2.is_empty() {
            return Err(AppError::data("Geometry has no readings."));
        }
        if self.ab2.len() != self.mn2.len() {
            return Err(AppError::data(format!(
                "Geometry length mismatch: {} ab2 values vs {} mn2 values.",
                self.ab2.len(),
                self.mn2.len()
            )));
        }
        for (i, (&a, &m)) in self.ab2.iter().zip(self.mn2.iter()).enumerate() {
            if !(a.is_finite() && a > 0.0 && m.is_finite() && m > 0.0) {
                return Err(AppError::data(format!(
                    "Reading {}: spacings must be finite and positive (ab2={a}, mn2={m}).",
                    i + 1
                )));
            }
            if m >= a {
                return Err(AppError::data(format!(
                    "Reading {}: mn2={m} must be smaller than ab2={a}.",
                    i + 1
                )));
            }
        }
        for w in self.ab2.windows(2) {
            if w[1] <= w[0] {
                return Err(AppError::data(format!(
                    "AB/2 spacings must be strictly increasing ({} followed by {}).",
                    w[0], w[1]
                )));
            }
        }
        Ok(())
    }
}

/// A 1-D layered-earth model: layer resistivities (ohm-m) and thicknesses (m),
/// topmost layer first, last layer semi-infinite.
///
/// Invariant: `res.len() == thk.len() + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerModel {
    pub res: Vec<f64>,
    pub thk: Vec<f64>,
}

impl LayerModel {
    pub fn new(res: Vec<f64>, thk: Vec<f64>) -> Result<Self, AppError> {
        let m = Self { res, thk };
        m.validate()?;
        Ok(m)
    }

    pub fn n_layers(&self) -> usize {
        self.res.len()
    }

    /// Number of free parameters: `n_layers` resistivities plus
    /// `n_layers - 1` thicknesses.
    pub fn n_params(&self) -> usize {
        2 * self.res.len() - 1
    }

    /// Stack into the solver-facing model vector
    /// `[thk_0 .. thk_{nl-2}, res_0 .. res_{nl-1}]`.
    pub fn stacked(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_params());
        out.extend_from_slice(&self.thk);
        out.extend_from_slice(&self.res);
        out
    }

    /// Split a stacked model vector back into thicknesses and resistivities.
    ///
    /// The layout is the inverse of [`LayerModel::stacked`]: the first
    /// `nl - 1` entries are thicknesses, the remaining `nl` are resistivities.
    pub fn from_stacked(values: &[f64], n_layers: usize) -> Result<Self, AppError> {
        if n_layers < 2 {
            return Err(AppError::config(format!(
                "A layered model needs at least 2 layers, got {n_layers}."
            )));
        }
        let expected = 2 * n_layers - 1;
        if values.len() != expected {
            return Err(AppError::numeric(format!(
                "Stacked model length {} does not match {} layers (expected {expected}).",
                values.len(),
                n_layers
            )));
        }
        let thk = values[0..n_layers - 1].to_vec();
        let res = values[n_layers - 1..].to_vec();
        Self::new(res, thk)
    }

    /// Depth to the bottom of each finite layer (running sum of thicknesses).
    pub fn depths(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.thk.len());
        let mut d = 0.0;
        for &t in &self.thk {
            d += t;
            out.push(d);
        }
        out
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.res.len() < 2 {
            return Err(AppError::config(format!(
                "A layered model needs at least 2 layers, got {}.",
                self.res.len()
            )));
        }
        if self.res.len() != self.thk.len() + 1 {
            return Err(AppError::config(format!(
                "Layer count mismatch: {} resistivities vs {} thicknesses (want thk = res - 1).",
                self.res.len(),
                self.thk.len()
            )));
        }
        for (i, &r) in self.res.iter().enumerate() {
            if !(r.is_finite() && r > 0.0) {
                return Err(AppError::numeric(format!(
                    "Layer {}: resistivity must be finite and positive, got {r}.",
                    i + 1
                )));
            }
        }
        for (i, &t) in self.thk.iter().enumerate() {
            if !(t.is_finite() && t > 0.0) {
                return Err(AppError::numeric(format!(
                    "Layer {}: thickness must be finite and positive, got {t}.",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

/// One sounding: geometry plus observed apparent resistivities, with optional
/// per-reading relative errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sounding {
    pub geometry: Geometry,
    /// Apparent resistivity per reading (ohm-m).
    pub rhoa: Vec<f64>,
    /// Relative error per reading (e.g. `0.03` for 3%), if known.
    pub err: Option<Vec<f64>>,
}

impl Sounding {
    pub fn new(geometry: Geometry, rhoa: Vec<f64>, err: Option<Vec<f64>>) -> Result<Self, AppError> {
        let s = Self { geometry, rhoa, err };
        s.validate()?;
        Ok(s)
    }

    pub fn len(&self) -> usize {
        self.rhoa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhoa.is_empty()
    }

    /// Per-reading relative errors, falling back to a flat `error_perc`
    /// percentage when the sounding carries none.
    pub fn relative_errors(&self, error_perc: f64) -> Vec<f64> {
        match &self.err {
            Some(err) => err.clone(),
            None => vec![error_perc / 100.0; self.rhoa.len()],
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.geometry.validate()?;
        if self.rhoa.len() != self.geometry.len() {
            return Err(AppError::data(format!(
                "Sounding length mismatch: {} readings vs {} spacings.",
                self.rhoa.len(),
                self.geometry.len()
            )));
        }
        for (i, &v) in self.rhoa.iter().enumerate() {
            if !(v.is_finite() && v > 0.0) {
                return Err(AppError::data(format!(
                    "Reading {}: apparent resistivity must be finite and positive, got {v}.",
                    i + 1
                )));
            }
        }
        if let Some(err) = &self.err {
            if err.len() != self.rhoa.len() {
                return Err(AppError::data(format!(
                    "Sounding error vector length {} does not match {} readings.",
                    err.len(),
                    self.rhoa.len()
                )));
            }
            for (i, &e) in err.iter().enumerate() {
                if !(e.is_finite() && e > 0.0) {
                    return Err(AppError::data(format!(
                        "Reading {}: relative error must be finite and positive, got {e}.",
                        i + 1
                    )));
                }
            }
        }
        Ok(())
    }

    /// Summary stats over the readings actually present.
    pub fn stats(&self) -> DatasetStats {
        let mut ab2_min = f64::INFINITY;
        let mut ab2_max = f64::NEG_INFINITY;
        let mut rhoa_min = f64::INFINITY;
        let mut rhoa_max = f64::NEG_INFINITY;
        for (&a, &r) in self.geometry.ab2.iter().zip(self.rhoa.iter()) {
            ab2_min = ab2_min.min(a);
            ab2_max = ab2_max.max(a);
            rhoa_min = rhoa_min.min(r);
            rhoa_max = rhoa_max.max(r);
        }
        DatasetStats {
            n_readings: self.rhoa.len(),
            ab2_min,
            ab2_max,
            rhoa_min,
            rhoa_max,
        }
    }
}

/// Summary stats about the readings used for an inversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_readings: usize,
    pub ab2_min: f64,
    pub ab2_max: f64,
    pub rhoa_min: f64,
    pub rhoa_max: f64,
}

/// How the start model is constructed.
#[derive(Debug, Clone)]
pub enum StartModel {
    /// Derive thickness and resistivity start values from the data:
    /// a characteristic depth of `max(ab2) / 3` split evenly across layers,
    /// and the median apparent resistivity for every layer.
    Auto,
    /// The same value for every thickness and resistivity.
    Constant(f64),
    /// A fully specified start model.
    Explicit(LayerModel),
}

/// Inversion settings.
///
/// Defaults follow common practice for Schlumberger soundings: moderate initial
/// regularization relaxed by 0.7 per stage, 3% assumed relative data error.
#[derive(Debug, Clone)]
pub struct InversionConfig {
    /// Number of layers to recover (last one semi-infinite).
    pub n_layers: usize,
    /// Initial regularization strength pulling parameters toward the start model.
    pub lam: f64,
    /// Multiplicative relaxation of `lam` between stages.
    pub lambda_factor: f64,
    /// Assumed relative data error in percent, used when the sounding carries
    /// no per-reading errors.
    pub error_perc: f64,
    /// Start model construction rule.
    pub start_model: StartModel,
    /// Maximum number of regularization stages.
    pub max_stages: usize,
    /// Iteration allowance handed to the minimizer per stage.
    pub patience: usize,
    /// Stop once the error-weighted chi2 drops to this value.
    pub chi2_target: f64,
    /// Stop once the relative chi2 improvement between stages falls below this.
    pub min_improvement: f64,
    /// Finite-difference step on the log parameters for Jacobian assembly.
    pub fd_step: f64,
}

impl InversionConfig {
    pub fn new(n_layers: usize) -> Self {
        Self {
            n_layers,
            lam: 20.0,
            lambda_factor: 0.7,
            error_perc: 3.0,
            start_model: StartModel::Auto,
            max_stages: 8,
            patience: 50,
            chi2_target: 1.0,
            min_improvement: 0.02,
            fd_step: 1e-4,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.n_layers < 2 {
            return Err(AppError::config(format!(
                "n_layers must be >= 2, got {}.",
                self.n_layers
            )));
        }
        if !(self.lam.is_finite() && self.lam >= 0.0) {
            return Err(AppError::config(format!("Invalid lam: {}.", self.lam)));
        }
        if !(self.lambda_factor.is_finite() && self.lambda_factor > 0.0 && self.lambda_factor <= 1.0)
        {
            return Err(AppError::config(format!(
                "lambda_factor must be in (0, 1], got {}.",
                self.lambda_factor
            )));
        }
        if !(self.error_perc.is_finite() && self.error_perc > 0.0) {
            return Err(AppError::config(format!(
                "error_perc must be positive, got {}.",
                self.error_perc
            )));
        }
        if self.max_stages == 0 {
            return Err(AppError::config("max_stages must be >= 1."));
        }
        if self.patience == 0 {
            return Err(AppError::config("patience must be >= 1."));
        }
        if !(self.chi2_target.is_finite() && self.chi2_target > 0.0) {
            return Err(AppError::config(format!(
                "chi2_target must be positive, got {}.",
                self.chi2_target
            )));
        }
        if !(self.min_improvement.is_finite() && self.min_improvement >= 0.0) {
            return Err(AppError::config(format!(
                "min_improvement must be >= 0, got {}.",
                self.min_improvement
            )));
        }
        if !(self.fd_step.is_finite() && self.fd_step > 0.0) {
            return Err(AppError::config(format!(
                "fd_step must be positive, got {}.",
                self.fd_step
            )));
        }
        if let StartModel::Constant(v) = self.start_model {
            if !(v.is_finite() && v > 0.0) {
                return Err(AppError::config(format!(
                    "Constant start value must be positive, got {v}."
                )));
            }
        }
        if let StartModel::Explicit(model) = &self.start_model {
            model.validate()?;
            if model.n_layers() != self.n_layers {
                return Err(AppError::config(format!(
                    "Explicit start model has {} layers but n_layers is {}.",
                    model.n_layers(),
                    self.n_layers
                )));
            }
        }
        Ok(())
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    /// Relative RMS data misfit, percent.
    pub relrms_pct: f64,
    /// Error-weighted chi2 of the log-transformed data, normalized by count.
    pub chi2: f64,
    pub n: usize,
}

/// Diagnostics for one regularization stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageInfo {
    pub lam: f64,
    pub chi2: f64,
    pub relrms_pct: f64,
    /// Forward evaluations spent by the minimizer in this stage.
    pub evaluations: usize,
    /// Whether the minimizer reported convergence for this stage.
    pub converged: bool,
}

/// Output of a finished inversion.
#[derive(Debug, Clone)]
pub struct InversionOutcome {
    pub model: LayerModel,
    /// Forward response at the recovered model, per reading (ohm-m).
    pub response: Vec<f64>,
    pub quality: FitQuality,
    pub stages: Vec<StageInfo>,
}

/// A saved sounding-plus-inversion file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundingFile {
    pub tool: String,
    pub n_layers: usize,
    pub geometry: Geometry,
    pub rhoa: Vec<f64>,
    pub err: Vec<f64>,
    pub model: LayerModel,
    pub response: Vec<f64>,
    pub quality: FitQuality,
    pub stages: Vec<StageInfo>,
}

/// Start-model helper: median apparent resistivity of a sounding.
///
/// Kept here (rather than in the driver) so reports can quote the same number.
pub fn median_rhoa(sounding: &Sounding) -> Result<f64, AppError> {
    median(&sounding.rhoa)
        .ok_or_else(|| AppError::data("Cannot take the median of an empty sounding."))
}
