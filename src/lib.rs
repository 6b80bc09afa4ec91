//! `ves-sounding` library crate.
//!
//! Thin drivers around an external 1-D DC-resistivity forward backend:
//! configure and run regularized sounding inversions, simulate synthetic
//! soundings, and render diagnostic plots and reports.
//!
//! The binary (`ves`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the inversion and simulation drivers stay usable from other programs,
//!   which supply the forward backend via [`solver::ForwardOperator`]

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod inv;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod solver;
pub mod synth;
