//! Start model construction.
//!
//! The automatic rule derives everything from the sounding itself:
//!
//! - characteristic depth `para_depth = max(ab2) / 3`, split evenly over the
//!   layers, half of it per layer boundary
//! - the median apparent resistivity as the start value for every layer
//! - the second-layer resistivity scaled by 1.5 so the minimizer does not
//!   start on a perfectly homogeneous (zero-gradient) model

use crate::domain::{InversionConfig, LayerModel, Sounding, StartModel, median_rhoa};
use crate::error::AppError;

/// Factor applied to the second-layer start resistivity.
const SYMMETRY_BREAK_FACTOR: f64 = 1.5;

/// Build the start model for an inversion run.
pub fn build_start_model(
    sounding: &Sounding,
    config: &InversionConfig,
) -> Result<LayerModel, AppError> {
    let nl = config.n_layers;
    match &config.start_model {
        StartModel::Explicit(model) => {
            model.validate()?;
            if model.n_layers() != nl {
                return Err(AppError::config(format!(
                    "Explicit start model has {} layers but n_layers is {}.",
                    model.n_layers(),
                    nl
                )));
            }
            Ok(model.clone())
        }
        StartModel::Constant(v) => {
            LayerModel::new(vec![*v; nl], vec![*v; nl - 1])
        }
        StartModel::Auto => {
            let &ab2_max = sounding
                .geometry
                .ab2
                .last()
                .ok_or_else(|| AppError::data("Cannot build a start model without readings."))?;
            let para_depth = ab2_max / 3.0;
            let thk_start = para_depth / nl as f64 / 2.0;
            let res_start = median_rhoa(sounding)?;

            let mut stacked = Vec::with_capacity(2 * nl - 1);
            stacked.extend(std::iter::repeat(thk_start).take(nl - 1));
            stacked.extend(std::iter::repeat(res_start).take(nl));
            // Stacked index `nl` is the second resistivity entry.
            stacked[nl] *= SYMMETRY_BREAK_FACTOR;

            LayerModel::from_stacked(&stacked, nl)
        }
    }
}
