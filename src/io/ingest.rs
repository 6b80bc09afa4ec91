//! CSV ingest and normalization.
//!
//! This module turns a sounding CSV into a validated [`Sounding`]. Design goals:
//!
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden guessing beyond documented aliases)
//!
//! Required columns: `ab2` and `rhoa`. Optional: `mn2` (assumed `ab2/5` when
//! missing) and `err` (relative error, either as a fraction like `0.03` or as
//! percent like `3` when > 1).

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{DEFAULT_AB2_MN2_RATIO, DatasetStats, Geometry, Sounding};
use crate::error::AppError;

/// Column aliases accepted for each field, lowercase.
const AB2_ALIASES: [&str; 3] = ["ab2", "ab/2", "ab_2"];
const MN2_ALIASES: [&str; 3] = ["mn2", "mn/2", "mn_2"];
const RHOA_ALIASES: [&str; 4] = ["rhoa", "rho_a", "app_res", "apparent_resistivity"];
const ERR_ALIASES: [&str; 3] = ["err", "error", "rel_err"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: a validated sounding + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedSounding {
    pub sounding: Sounding,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
    /// Informational note about how inputs were interpreted
    /// (e.g. a missing `mn2` column).
    pub unit_note: Option<String>,
}

/// Load and normalize a sounding CSV.
pub fn read_sounding_csv(path: &Path) -> Result<IngestedSounding, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let ab2_idx = resolve_column(&header_map, &AB2_ALIASES)
        .ok_or_else(|| AppError::config("Missing required column: `ab2`."))?;
    let rhoa_idx = resolve_column(&header_map, &RHOA_ALIASES)
        .ok_or_else(|| AppError::config("Missing required column: `rhoa`."))?;
    let mn2_idx = resolve_column(&header_map, &MN2_ALIASES);
    let err_idx = resolve_column(&header_map, &ERR_ALIASES);

    let unit_note = if mn2_idx.is_none() {
        Some(format!(
            "No mn2 column; assumed mn2 = ab2/{DEFAULT_AB2_MN2_RATIO}."
        ))
    } else {
        None
    };

    let mut ab2 = Vec::new();
    let mut mn2 = Vec::new();
    let mut rhoa = Vec::new();
    let mut err = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (i, record) in reader.records().enumerate() {
        // Header occupies line 1.
        let line = i + 2;
        rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Unreadable row: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, ab2_idx, rhoa_idx, mn2_idx, err_idx) {
            Ok((a, m, r, e)) => {
                ab2.push(a);
                mn2.push(m);
                rhoa.push(r);
                err.push(e);
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if ab2.is_empty() {
        return Err(AppError::data(format!(
            "No usable readings in '{}' ({} rows, {} row errors).",
            path.display(),
            rows_read,
            row_errors.len()
        )));
    }

    // Per-reading errors only count when every kept row carries one.
    let err = if err.iter().all(|e| e.is_some()) {
        Some(err.into_iter().flatten().collect())
    } else {
        None
    };

    let rows_used = ab2.len();
    let geometry = Geometry::new(ab2, mn2)?;
    let sounding = Sounding::new(geometry, rhoa, err)?;
    let stats = sounding.stats();

    Ok(IngestedSounding {
        sounding,
        stats,
        row_errors,
        rows_read,
        rows_used,
        unit_note,
    })
}

fn parse_row(
    record: &StringRecord,
    ab2_idx: usize,
    rhoa_idx: usize,
    mn2_idx: Option<usize>,
    err_idx: Option<usize>,
) -> Result<(f64, f64, f64, Option<f64>), String> {
    let ab2 = parse_positive(get_field(record, ab2_idx), "ab2")?;
    let rhoa = parse_positive(get_field(record, rhoa_idx), "rhoa")?;

    let mn2 = match mn2_idx {
        Some(idx) => parse_positive(get_field(record, idx), "mn2")?,
        None => ab2 / DEFAULT_AB2_MN2_RATIO,
    };

    let err = match err_idx {
        Some(idx) => match get_field(record, idx) {
            Some(s) => {
                let v = parse_positive(Some(s), "err")?;
                // Values above 1 are read as percent.
                Some(if v > 1.0 { v / 100.0 } else { v })
            }
            None => None,
        },
        None => None,
    };

    Ok((ab2, mn2, rhoa, err))
}

fn get_field(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_positive(s: Option<&str>, name: &str) -> Result<f64, String> {
    let s = s.ok_or_else(|| format!("Missing required value: `{name}`"))?;
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number for `{name}`: '{s}'"))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(format!("`{name}` must be finite and positive, got {v}"));
    }
    Ok(v)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

fn resolve_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|a| header_map.get(*a).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("ves-sounding-test-{name}-{}.csv", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_a_well_formed_csv() {
        let path = write_temp(
            "ok",
            "ab2,mn2,rhoa,err\n1.0,0.2,100.0,0.03\n3.0,0.6,120.0,0.03\n10.0,2.0,90.0,0.05\n",
        );
        let ingest = read_sounding_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ingest.rows_read, 3);
        assert_eq!(ingest.rows_used, 3);
        assert!(ingest.row_errors.is_empty());
        assert!(ingest.unit_note.is_none());
        assert_eq!(ingest.sounding.rhoa, vec![100.0, 120.0, 90.0]);
        assert_eq!(
            ingest.sounding.err.as_ref().unwrap(),
            &vec![0.03, 0.03, 0.05]
        );
    }

    #[test]
    fn missing_mn2_gets_the_default_ratio() {
        let path = write_temp("nomn2", "ab2,rhoa\n1.0,100.0\n5.0,80.0\n");
        let ingest = read_sounding_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(ingest.unit_note.is_some());
        assert_eq!(ingest.sounding.geometry.mn2, vec![0.2, 1.0]);
    }

    #[test]
    fn percent_errors_are_converted() {
        let path = write_temp("pct", "ab2,rhoa,err\n1.0,100.0,3\n5.0,80.0,5\n");
        let ingest = read_sounding_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ingest.sounding.err.as_ref().unwrap(), &vec![0.03, 0.05]);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let path = write_temp(
            "bad",
            "ab2,rhoa\n1.0,100.0\nnot-a-number,80.0\n5.0,-2.0\n10.0,70.0\n",
        );
        let ingest = read_sounding_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ingest.rows_read, 4);
        assert_eq!(ingest.rows_used, 2);
        assert_eq!(ingest.row_errors.len(), 2);
        assert_eq!(ingest.row_errors[0].line, 3);
    }

    #[test]
    fn header_aliases_are_accepted() {
        let path = write_temp("alias", "AB/2,MN/2,app_res\n1.0,0.2,100.0\n5.0,1.0,80.0\n");
        let ingest = read_sounding_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ingest.sounding.rhoa, vec![100.0, 80.0]);
    }

    #[test]
    fn missing_required_column_is_a_config_error() {
        let path = write_temp("nocol", "spacing,value\n1.0,100.0\n");
        let err = read_sounding_csv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn all_rows_bad_is_a_data_error() {
        let path = write_temp("allbad", "ab2,rhoa\nx,y\n");
        let err = read_sounding_csv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
