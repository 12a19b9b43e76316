//! # lib-types
//!
//! Core type definitions for the Optik configuration layer.
//!
//! This crate provides foundational types used throughout the workspace:
//! - Physical units, quantities and a named unit registry
//! - Notation-aware unit rendering (generic, Unicode, LaTeX)
//! - Reference wavelengths as "wave" units
//! - Precision and the real/complex element types it selects

pub mod dtype;
pub mod units;
pub mod wavelengths;

pub use dtype::{DType, Precision};
pub use units::{BaseUnit, Dimension, Notation, Quantity, Unit, UnitRegistry, UnknownNotation};

/// Re-export num_complex for convenience
pub use num_complex::{Complex32, Complex64};
