//! Numeric precision and the real/complex element types it selects.

use num_complex::{Complex32, Complex64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type used for array computations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Float32,
    Float64,
    /// Pair of `f32`.
    Complex64,
    /// Pair of `f64`.
    Complex128,
}

impl DType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
        }
    }

    /// Size of one element in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Float32 => std::mem::size_of::<f32>(),
            Self::Float64 => std::mem::size_of::<f64>(),
            Self::Complex64 => std::mem::size_of::<Complex32>(),
            Self::Complex128 => std::mem::size_of::<Complex64>(),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Floating point precision, 32 or 64 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    Single,
    #[default]
    Double,
}

impl Precision {
    /// Map a bit count onto a precision; only 32 and 64 are defined.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            32 => Some(Self::Single),
            64 => Some(Self::Double),
            _ => None,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            Self::Single => 32,
            Self::Double => 64,
        }
    }

    /// Real element type.
    pub fn real(&self) -> DType {
        match self {
            Self::Single => DType::Float32,
            Self::Double => DType::Float64,
        }
    }

    /// Complex element type with the same component width as [`real`](Self::real).
    pub fn complex(&self) -> DType {
        match self {
            Self::Single => DType::Complex64,
            Self::Double => DType::Complex128,
        }
    }
}
