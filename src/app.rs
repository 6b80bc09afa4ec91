//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads sounding CSV/JSON files
//! - prints reports and ASCII plots

use clap::Parser;

use crate::cli::{Command, DataArgs, PlotArgs};
use crate::error::AppError;

/// Entry point for the `ves` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Data(args) => handle_data(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_data(args: DataArgs) -> Result<(), AppError> {
    let ingest = crate::io::read_sounding_csv(&args.csv)?;

    println!("{}", crate::report::format_data_summary(&ingest.sounding));
    if let Some(note) = &ingest.unit_note {
        println!("Note: {note}");
    }
    for e in &ingest.row_errors {
        println!("(skipped line {}) {}", e.line, e.message);
    }

    let plot = crate::plot::render_data_plot(
        &ingest.sounding.geometry.ab2,
        &ingest.sounding.rhoa,
        args.width,
        args.height,
    );
    println!("{plot}");

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let data = crate::io::read_sounding_json(&args.sounding)?;

    println!(
        "Fit: relrms={:.2}% | chi2={:.3} | n={}",
        data.quality.relrms_pct, data.quality.chi2, data.quality.n
    );

    let model_plot = crate::plot::render_model_plot(&data.model, args.width, args.height);
    println!("{model_plot}");

    let fit_plot = crate::plot::render_sounding_plot(
        &data.geometry.ab2,
        &data.rhoa,
        &data.response,
        args.width,
        args.height,
    );
    println!("{fit_plot}");

    Ok(())
}
