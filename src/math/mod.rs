//! Mathematical utilities: robust summary statistics and log-spaced grids.

pub mod grid;
pub mod stats;

pub use grid::*;
pub use stats::*;
