//! Command-line parsing for the sounding toolkit.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/inversion code.
//!
//! Running an inversion or a simulation needs a forward backend, which is
//! supplied by library callers; the CLI covers the operations that are closed
//! over files: checking data and plotting saved runs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ves", version, about = "1-D VES sounding toolkit (data checks and plots)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest a sounding CSV, print dataset stats and an ASCII data plot.
    Data(DataArgs),
    /// Plot a previously exported sounding JSON (model + fit).
    Plot(PlotArgs),
}

/// Options for checking a sounding CSV.
#[derive(Debug, Parser)]
pub struct DataArgs {
    /// Sounding CSV with `ab2`, `rhoa` and optional `mn2`, `err` columns.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for plotting a saved run.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Sounding JSON produced by a finished inversion.
    #[arg(long, value_name = "JSON")]
    pub sounding: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
