//! Structured errors for unit algebra and quantity arithmetic
//!
//! Every failure is local and surfaced immediately: nothing is retried and
//! no shared state is left half-mutated.

use thiserror::Error;

use crate::NumberError;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INCOMPATIBLE_UNITS: &str = "INCOMPATIBLE_UNITS";
    pub const INCOMMENSURABLE: &str = "INCOMMENSURABLE";
    pub const INCOMPATIBLE_DIMENSION: &str = "INCOMPATIBLE_DIMENSION";
    pub const FRACTIONAL_EXPONENT: &str = "FRACTIONAL_EXPONENT";
    pub const ARITHMETIC: &str = "ARITHMETIC";
    pub const DUPLICATE_SYMBOL: &str = "DUPLICATE_SYMBOL";
    pub const INVALID_CONVERTER: &str = "INVALID_CONVERTER";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const OVERFLOW: &str = "OVERFLOW";
}

/// Failure of a unit or quantity operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    /// Same dimension, different system units, and no conversion path
    #[error("cannot convert {from} to {to}: incompatible units")]
    IncompatibleUnits { from: String, to: String },

    /// Dimensions differ even after reduction by the dimensional model
    #[error("{from} ({from_dim}) is not commensurable with {to} ({to_dim})")]
    Incommensurable {
        from: String,
        to: String,
        from_dim: String,
        to_dim: String,
    },

    /// A unit was asserted to be of a quantity kind it does not measure
    #[error("unit {unit} ({actual}) is not compatible with quantities of kind {kind} ({expected})")]
    IncompatibleDimension {
        unit: String,
        kind: String,
        expected: String,
        actual: String,
    },

    /// Root of a unit whose exponents are not all divisible by the order
    #[error("root of order {order} of {unit} requires a fractional exponent")]
    FractionalExponent { unit: String, order: i32 },

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("symbol {symbol:?} is already bound to {existing}")]
    DuplicateSymbol { symbol: String, existing: String },

    #[error("invalid converter: {0}")]
    InvalidConverter(String),

    #[error(transparent)]
    Number(#[from] NumberError),
}

impl MeasureError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            MeasureError::IncompatibleUnits { .. } => codes::INCOMPATIBLE_UNITS,
            MeasureError::Incommensurable { .. } => codes::INCOMMENSURABLE,
            MeasureError::IncompatibleDimension { .. } => codes::INCOMPATIBLE_DIMENSION,
            MeasureError::FractionalExponent { .. } => codes::FRACTIONAL_EXPONENT,
            MeasureError::Arithmetic(_) => codes::ARITHMETIC,
            MeasureError::DuplicateSymbol { .. } => codes::DUPLICATE_SYMBOL,
            MeasureError::InvalidConverter(_) => codes::INVALID_CONVERTER,
            MeasureError::Number(e) => match e {
                NumberError::ParseError(_) => codes::PARSE_ERROR,
                NumberError::DivisionByZero => codes::DIV_ZERO,
                NumberError::DomainError(_) => codes::DOMAIN_ERROR,
                NumberError::Overflow => codes::OVERFLOW,
            },
        }
    }

    pub fn arithmetic(details: impl Into<String>) -> Self {
        MeasureError::Arithmetic(details.into())
    }

    pub fn invalid_converter(details: impl Into<String>) -> Self {
        MeasureError::InvalidConverter(details.into())
    }
}
