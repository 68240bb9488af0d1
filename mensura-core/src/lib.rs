//! Mensura Core - Numeric foundation
//!
//! This crate provides the types shared by the unit layer:
//! - `Number`: Arbitrary precision decimal numbers
//! - `MathContext`: precision used by decimal conversions
//! - `Numeric`: the numeric representations a quantity can carry
//! - `MeasureError`: typed failures of unit and quantity operations

mod number;
mod numeric;
mod error;

pub use number::{Number, NumberError, MathContext, DEFAULT_PRECISION};
pub use numeric::{Numeric, Representation};
pub use error::{MeasureError, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Number, Numeric, MathContext, MeasureError};
    pub use crate::error::codes;
}
