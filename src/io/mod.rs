//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - per-reading result exports (`export`)
//! - sounding JSON read/write (`sounding`)

pub mod export;
pub mod ingest;
pub mod sounding;

pub use export::*;
pub use ingest::*;
pub use sounding::*;
