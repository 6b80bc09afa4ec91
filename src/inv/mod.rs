//! Inversion orchestration.
//!
//! Responsibilities:
//!
//! - build the start model from the data (`start`)
//! - adapt the sounding into the weighted least-squares problem consumed by
//!   the external minimizer (`problem`)
//! - run the relaxing regularization schedule and collect diagnostics (`driver`)

pub mod driver;
pub mod problem;
pub mod start;

pub use driver::*;
pub use start::*;
