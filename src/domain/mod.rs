//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - survey geometry (`Geometry`) and observed soundings (`Sounding`)
//! - layered-earth models (`LayerModel`) and their stacked-vector mapping
//! - inversion configuration (`InversionConfig`, `StartModel`)
//! - inversion outputs (`InversionOutcome`, `FitQuality`, `StageInfo`)

pub mod types;

pub use types::*;
