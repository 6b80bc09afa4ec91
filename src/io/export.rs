//! Export per-reading results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::ReadingResidual;

/// Write the per-reading fit table to a CSV file.
pub fn write_results_csv(path: &Path, rows: &[ReadingResidual]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "ab2_m,mn2_m,rhoa_obs,rhoa_fit,misfit_pct")
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for r in rows {
        writeln!(
            file,
            "{:.6},{:.6},{:.6},{:.6},{:.4}",
            r.ab2, r.mn2, r.rhoa_obs, r.rhoa_fit, r.misfit_pct
        )
        .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_writes_one_line_per_reading() {
        let rows = vec![
            ReadingResidual {
                ab2: 1.0,
                mn2: 0.2,
                rhoa_obs: 100.0,
                rhoa_fit: 98.0,
                misfit_pct: 2.0,
            },
            ReadingResidual {
                ab2: 10.0,
                mn2: 2.0,
                rhoa_obs: 80.0,
                rhoa_fit: 82.0,
                misfit_pct: -2.5,
            },
        ];

        let mut path = std::env::temp_dir();
        path.push(format!("ves-export-test-{}.csv", std::process::id()));
        write_results_csv(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ab2_m,"));
        assert!(lines[1].starts_with("1.000000,0.200000,"));
    }
}
