//! Error types for palaeomagnetic computations.
//!
//! Precondition failures (bad vectors, bad step sizes, too few points) are
//! reported through [`PalaeomagError`]. Statistically undefined results are not
//! errors: they surface as `None` or NaN fields with validity predicates.

use thiserror::Error;

/// Main error type for palaeomagnetic operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PalaeomagError {
    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A vector or scalar that must be finite contained NaN or infinity.
    #[error("Non-finite value: {context}")]
    NonFinite { context: String },

    /// A direction was required but a zero-length vector was supplied.
    #[error("Zero-length vector: {context}")]
    ZeroVector { context: String },

    /// Too few vectors or values for the requested fit.
    #[error("Insufficient data: need at least {min} values, got {actual}")]
    InsufficientData { min: usize, actual: usize },

    /// Both vectors passed to an equator-crossing calculation lie in the same hemisphere.
    #[error("Vectors are in the same hemisphere")]
    SameHemisphere,

    /// Operation not available for this configuration of the receiver.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A textual record could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for palaeomagnetic operations.
pub type Result<T> = std::result::Result<T, PalaeomagError>;

impl PalaeomagError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a non-finite value error.
    #[must_use]
    pub fn non_finite(context: impl Into<String>) -> Self {
        Self::NonFinite {
            context: context.into(),
        }
    }

    /// Create a zero-length vector error.
    #[must_use]
    pub fn zero_vector(context: impl Into<String>) -> Self {
        Self::ZeroVector {
            context: context.into(),
        }
    }

    /// Create an insufficient data error.
    #[must_use]
    pub const fn insufficient_data(min: usize, actual: usize) -> Self {
        Self::InsufficientData { min, actual }
    }

    /// Create an unsupported operation error.
    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for the precondition-violation family of errors.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::NonFinite { .. }
                | Self::ZeroVector { .. }
                | Self::InsufficientData { .. }
                | Self::SameHemisphere
        )
    }
}
