//! Error types for configuration, unit and label operations.

use lib_types::UnknownNotation;
use thiserror::Error;

/// Errors that can occur while configuring the library or rendering labels.
#[derive(Debug, Error)]
pub enum ConfError {
    /// A value outside the accepted set was passed to a setter or formatter.
    #[error("{0}")]
    InvalidArgument(String),

    /// A unit name that the registry does not define.
    #[error("Unresolved unit name: '{0}'")]
    UnresolvedUnitName(String),

    /// A notation name that the unit system does not define.
    #[error("Unknown unit notation: '{0}'")]
    UnknownNotation(String),

    /// A wavelength name with no known constant.
    #[error("Unknown wavelength: '{0}'")]
    UnknownWavelength(String),

    /// A unit expression that could not be parsed.
    #[error("Invalid unit expression '{expr}': {message}")]
    UnitExpr { expr: String, message: String },

    /// I/O error reading a settings file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML settings.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON settings.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an unresolved unit name error.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedUnitName(name.into())
    }

    /// Create a unit expression error.
    pub fn unit_expr(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnitExpr {
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// Check if this error came from a bad argument rather than bad input data.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<UnknownNotation> for ConfError {
    fn from(err: UnknownNotation) -> Self {
        Self::UnknownNotation(err.0)
    }
}

/// Result type for configuration operations.
pub type ConfResult<T> = Result<T, ConfError>;
