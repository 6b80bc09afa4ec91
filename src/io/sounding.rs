//! Read/write sounding JSON files.
//!
//! Sounding JSON is the "portable" representation of a finished run:
//! - the observed readings and their geometry
//! - the recovered layer model and its forward response
//! - fit statistics and the stage trace
//!
//! The schema is defined by `domain::SoundingFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{InversionConfig, InversionOutcome, Sounding, SoundingFile};
use crate::error::AppError;

/// Assemble the portable file payload from a finished inversion.
pub fn build_sounding_file(
    sounding: &Sounding,
    outcome: &InversionOutcome,
    config: &InversionConfig,
) -> SoundingFile {
    SoundingFile {
        tool: "ves".to_string(),
        n_layers: config.n_layers,
        geometry: sounding.geometry.clone(),
        rhoa: sounding.rhoa.clone(),
        err: sounding.relative_errors(config.error_perc),
        model: outcome.model.clone(),
        response: outcome.response.clone(),
        quality: outcome.quality.clone(),
        stages: outcome.stages.clone(),
    }
}

/// Write a sounding JSON file.
pub fn write_sounding_json(path: &Path, file_data: &SoundingFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create sounding JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, file_data)
        .map_err(|e| AppError::config(format!("Failed to write sounding JSON: {e}")))?;
    Ok(())
}

/// Read a sounding JSON file and validate its shape.
pub fn read_sounding_json(path: &Path) -> Result<SoundingFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!(
            "Failed to open sounding JSON '{}': {e}",
            path.display()
        ))
    })?;
    let data: SoundingFile = serde_json::from_reader(file)
        .map_err(|e| AppError::config(format!("Invalid sounding JSON: {e}")))?;

    data.geometry.validate()?;
    data.model.validate()?;
    if data.rhoa.len() != data.geometry.len() || data.response.len() != data.geometry.len() {
        return Err(AppError::data(
            "Sounding JSON length mismatch between geometry, data, and response.",
        ));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, Geometry, LayerModel, StageInfo};

    fn payload() -> SoundingFile {
        let geometry = Geometry::new(vec![1.0, 10.0, 100.0], vec![0.2, 2.0, 20.0]).unwrap();
        SoundingFile {
            tool: "ves".to_string(),
            n_layers: 2,
            geometry,
            rhoa: vec![100.0, 80.0, 400.0],
            err: vec![0.03, 0.03, 0.03],
            model: LayerModel::new(vec![110.0, 500.0], vec![4.0]).unwrap(),
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
                evaluations: 12,
                converged: true,
            }],
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("ves-sounding-json-{name}-{}.json", std::process::id()));
        path
    }

    #[test]
    fn json_roundtrip_preserves_the_run() {
        let path = temp_path("roundtrip");
        let data = payload();
        write_sounding_json(&path, &data).unwrap();
        let back = read_sounding_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.tool, "ves");
        assert_eq!(back.n_layers, 2);
        assert_eq!(back.rhoa, data.rhoa);
        assert_eq!(back.model.res, data.model.res);
        assert_eq!(back.stages.len(), 1);
        assert!((back.quality.chi2 - 0.8).abs() < 1e-12);
    }

    #[test]
    fn full_run_roundtrips_through_json() {
        use crate::inv::invert;
        use crate::solver::mock::BlendOperator;
        use crate::synth::simulate;

        let geometry = Geometry::schlumberger_log(1.0, 200.0, 16).unwrap();
        let op = BlendOperator::new(&geometry);
        let truth = LayerModel::new(vec![50.0, 500.0], vec![5.0]).unwrap();
        let synth = simulate(&op, &truth, 0.01, 1337).unwrap();
        let sounding = synth.into_sounding(geometry).unwrap();

        let config = crate::domain::InversionConfig::new(2);
        let outcome = invert(&op, &sounding, &config).unwrap();
        let data = build_sounding_file(&sounding, &outcome, &config);

        let path = temp_path("fullrun");
        write_sounding_json(&path, &data).unwrap();
        let back = read_sounding_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.n_layers, 2);
        assert_eq!(back.model.res.len(), 2);
        assert_eq!(back.response.len(), sounding.len());
        assert_eq!(back.err, vec![0.01; sounding.len()]);
    }

    #[test]
    fn mismatched_lengths_are_rejected_on_read() {
        let path = temp_path("mismatch");
        let mut data = payload();
        data.response.pop();
        write_sounding_json(&path, &data).unwrap();
        let err = read_sounding_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
