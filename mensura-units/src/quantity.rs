//! Quantity type - a numeric value with an associated unit
//!
//! Quantities keep the numeric representation they were created with.
//! Binary operations on same-kind quantities first convert the right
//! operand into the left operand's unit; the result carries the left unit.

use std::cmp::Ordering;
use std::fmt;

use mensura_core::{MathContext, MeasureError, Number, Numeric};

use crate::converter::UnitConverter;
use crate::dimension::Dimension;
use crate::kind::QuantityKind;
use crate::unit::Unit;

/// A physical quantity: a numeric value with an associated unit
#[derive(Debug, Clone)]
pub struct Quantity {
    value: Numeric,
    unit: Unit,
    ctx: MathContext,
}

/// Apply `converter` in the value's own representation. Exact values stay
/// exact while every step is rational, and fall back to doubles otherwise.
fn convert_value(value: &Numeric, converter: &UnitConverter, ctx: &MathContext) -> Result<Numeric, MeasureError> {
    if converter.is_identity() {
        return Ok(value.clone());
    }
    Ok(match value {
        Numeric::Float(f) => Numeric::Float(converter.convert(*f)),
        Numeric::Decimal(d) => Numeric::Decimal(converter.convert_decimal(d, ctx)?),
        Numeric::Integer(_) | Numeric::Rational(_) => {
            match value.to_rational().and_then(|r| converter.convert_ratio(&r)) {
                Some(r) => Numeric::from_rational(r),
                None => Numeric::Float(converter.convert(value.to_f64())),
            }
        }
    })
}

impl Quantity {
    /// Create a new quantity
    pub fn new(value: impl Into<Numeric>, unit: Unit) -> Self {
        Quantity { value: value.into(), unit, ctx: MathContext::default() }
    }

    /// Precision used by decimal arithmetic and conversions
    pub fn with_context(mut self, ctx: MathContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn value(&self) -> &Numeric {
        &self.value
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn context(&self) -> MathContext {
        self.ctx
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    fn with_value(&self, value: Numeric, unit: Unit) -> Quantity {
        Quantity { value, unit, ctx: self.ctx }
    }

    // ========== Conversion ==========

    /// Same quantity expressed in `unit`
    pub fn to(&self, unit: &Unit) -> Result<Quantity, MeasureError> {
        if *unit == self.unit {
            return Ok(self.with_value(self.value.clone(), unit.clone()));
        }
        let converter = self.unit.converter_to(unit)?;
        Ok(self.with_value(convert_value(&self.value, &converter, &self.ctx)?, unit.clone()))
    }

    /// Same quantity expressed in its unit's system unit
    pub fn to_system_unit(&self) -> Result<Quantity, MeasureError> {
        self.to(&self.unit.system_unit())
    }

    /// Value in `unit`, as a double
    pub fn double_value(&self, unit: &Unit) -> Result<f64, MeasureError> {
        if *unit == self.unit {
            return Ok(self.value.to_f64());
        }
        Ok(self.unit.converter_to(unit)?.convert(self.value.to_f64()))
    }

    /// Value in `unit`, as a decimal rounded to `ctx`
    pub fn decimal_value(&self, unit: &Unit, ctx: &MathContext) -> Result<Number, MeasureError> {
        let decimal = self.value.to_decimal(ctx)?;
        if *unit == self.unit {
            return Ok(decimal);
        }
        self.unit.converter_to(unit)?.convert_decimal(&decimal, ctx)
    }

    /// Value in `unit`, truncated to an i64
    pub fn long_value(&self, unit: &Unit) -> Result<i64, MeasureError> {
        let converted = self.to(unit)?;
        converted
            .value
            .to_i64()
            .map_err(|_| MeasureError::arithmetic(format!("overflow converting {} to a 64-bit integer", converted)))
    }

    /// The other quantity's value in this quantity's unit
    fn aligned(&self, other: &Quantity) -> Result<Numeric, MeasureError> {
        if other.unit == self.unit {
            Ok(other.value.clone())
        } else {
            Ok(other.to(&self.unit)?.value)
        }
    }

    // ========== Arithmetic ==========

    pub fn add(&self, other: &Quantity) -> Result<Quantity, MeasureError> {
        let rhs = self.aligned(other)?;
        Ok(self.with_value(self.value.add(&rhs, &self.ctx)?, self.unit.clone()))
    }

    pub fn subtract(&self, other: &Quantity) -> Result<Quantity, MeasureError> {
        let rhs = self.aligned(other)?;
        Ok(self.with_value(self.value.sub(&rhs, &self.ctx)?, self.unit.clone()))
    }

    pub fn negate(&self) -> Quantity {
        self.with_value(self.value.neg(), self.unit.clone())
    }

    /// Product of quantities (units are multiplied)
    pub fn multiply(&self, other: &Quantity) -> Result<Quantity, MeasureError> {
        let unit = self.unit.multiply(&other.unit)?;
        Ok(self.with_value(self.value.mul(&other.value, &self.ctx)?, unit))
    }

    /// Quotient of quantities (units are divided)
    pub fn divide(&self, other: &Quantity) -> Result<Quantity, MeasureError> {
        let unit = self.unit.divide(&other.unit)?;
        Ok(self.with_value(self.value.div(&other.value, &self.ctx)?, unit))
    }

    /// Scale by a pure number, keeping the unit
    pub fn multiply_by(&self, factor: impl Into<Numeric>) -> Result<Quantity, MeasureError> {
        Ok(self.with_value(self.value.mul(&factor.into(), &self.ctx)?, self.unit.clone()))
    }

    pub fn divide_by(&self, divisor: impl Into<Numeric>) -> Result<Quantity, MeasureError> {
        Ok(self.with_value(self.value.div(&divisor.into(), &self.ctx)?, self.unit.clone()))
    }

    /// Reciprocal value in the inverse unit
    pub fn inverse(&self) -> Result<Quantity, MeasureError> {
        let unit = self.unit.inverse()?;
        Ok(self.with_value(self.value.inverse(&self.ctx)?, unit))
    }

    /// Assert the quantity is of the given kind
    pub fn as_type(&self, kind: &QuantityKind) -> Result<Quantity, MeasureError> {
        let unit = self.unit.as_type(kind)?;
        Ok(self.with_value(self.value.clone(), unit))
    }

    /// Product asserted to be of the given kind
    pub fn multiply_as(&self, other: &Quantity, kind: &QuantityKind) -> Result<Quantity, MeasureError> {
        self.multiply(other)?.as_type(kind)
    }

    /// Quotient asserted to be of the given kind
    pub fn divide_as(&self, other: &Quantity, kind: &QuantityKind) -> Result<Quantity, MeasureError> {
        self.divide(other)?.as_type(kind)
    }

    // ========== Comparison ==========

    /// Compare with a quantity of the same kind, in this quantity's unit
    pub fn compare_to(&self, other: &Quantity) -> Result<Ordering, MeasureError> {
        let rhs = self.aligned(other)?;
        self.value
            .compare(&rhs, &self.ctx)?
            .ok_or_else(|| MeasureError::arithmetic(format!("{} and {} are unordered", self, other)))
    }

    pub fn is_greater_than(&self, other: &Quantity) -> Result<bool, MeasureError> {
        Ok(self.compare_to(other)? == Ordering::Greater)
    }

    pub fn is_greater_than_or_equal_to(&self, other: &Quantity) -> Result<bool, MeasureError> {
        Ok(self.compare_to(other)? != Ordering::Less)
    }

    pub fn is_less_than(&self, other: &Quantity) -> Result<bool, MeasureError> {
        Ok(self.compare_to(other)? == Ordering::Less)
    }

    pub fn is_less_than_or_equal_to(&self, other: &Quantity) -> Result<bool, MeasureError> {
        Ok(self.compare_to(other)? != Ordering::Greater)
    }

    /// Same amount, whatever the units
    pub fn is_equivalent_to(&self, other: &Quantity) -> Result<bool, MeasureError> {
        Ok(self.compare_to(other)? == Ordering::Equal)
    }
}

/// Order two quantities of the same kind by their double values in the
/// first quantity's unit
pub fn natural_order(a: &Quantity, b: &Quantity) -> Result<Ordering, MeasureError> {
    let rhs = b.double_value(&a.unit)?;
    Ok(a.value.to_f64().total_cmp(&rhs))
}

impl PartialEq for Quantity {
    /// Same unit and equal values; use `is_equivalent_to` across units
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && self.value == other.value
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit == Unit::one() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}
