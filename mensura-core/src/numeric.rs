//! Numeric representations carried by quantities
//!
//! A quantity keeps the representation it was created with: compact
//! integers, IEEE doubles, arbitrary precision decimals, or exact
//! rationals as the generic fallback. Mixed arithmetic promotes both
//! operands to the higher-ranked representation first.

use std::cmp::Ordering;
use std::fmt;

use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use serde::{Deserialize, Serialize};

use crate::{MathContext, Number, NumberError};

/// Numeric value of a quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "NumericRepr", try_from = "NumericRepr")]
pub enum Numeric {
    Integer(i64),
    Rational(RBig),
    Float(f64),
    Decimal(Number),
}

/// Serialized form of [`Numeric`]; rationals travel as `"n/d"` text
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
enum NumericRepr {
    Integer(i64),
    Rational(String),
    Float(f64),
    Decimal(Number),
}

/// Promotion order, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Representation {
    Integer,
    Rational,
    Float,
    Decimal,
}

impl Numeric {
    pub fn representation(&self) -> Representation {
        match self {
            Numeric::Integer(_) => Representation::Integer,
            Numeric::Rational(_) => Representation::Rational,
            Numeric::Float(_) => Representation::Float,
            Numeric::Decimal(_) => Representation::Decimal,
        }
    }

    // ========== Conversions ==========

    /// Nearest f64. Decimals above the f64 range become infinite, those
    /// below it underflow toward zero.
    pub fn to_f64(&self) -> f64 {
        match self {
            Numeric::Integer(i) => *i as f64,
            Numeric::Rational(r) => r.to_f64().value(),
            Numeric::Float(f) => *f,
            Numeric::Decimal(d) => d.to_f64().unwrap_or_else(|| {
                if d.is_negative() { f64::NEG_INFINITY } else { f64::INFINITY }
            }),
        }
    }

    /// Exact rational value, if the representation is exact
    pub fn to_rational(&self) -> Option<RBig> {
        match self {
            Numeric::Integer(i) => Some(RBig::from(IBig::from(*i))),
            Numeric::Rational(r) => Some(r.clone()),
            Numeric::Float(_) | Numeric::Decimal(_) => None,
        }
    }

    /// Decimal value, rounded to `ctx` where the source is inexact
    pub fn to_decimal(&self, ctx: &MathContext) -> Result<Number, NumberError> {
        match self {
            Numeric::Integer(i) => Ok(Number::from_i64(*i)),
            Numeric::Rational(r) => Ok(Number::from_rbig(r).round(ctx)),
            Numeric::Float(f) => Number::from_f64(*f),
            Numeric::Decimal(d) => Ok(d.clone()),
        }
    }

    /// Re-express in the given representation
    pub fn promote(&self, to: Representation, ctx: &MathContext) -> Result<Numeric, NumberError> {
        if self.representation() >= to {
            return Ok(self.clone());
        }
        Ok(match to {
            Representation::Integer => self.clone(),
            Representation::Rational => match self.to_rational() {
                Some(r) => Numeric::Rational(r),
                None => self.clone(),
            },
            Representation::Float => Numeric::Float(self.to_f64()),
            Representation::Decimal => Numeric::Decimal(self.to_decimal(ctx)?),
        })
    }

    /// Narrow an exact rational to a compact integer when it is integral
    pub fn from_rational(r: RBig) -> Numeric {
        if r.denominator() == &UBig::ONE {
            if let Ok(i) = i64::try_from(r.numerator().clone()) {
                return Numeric::Integer(i);
            }
        }
        Numeric::Rational(r)
    }

    /// Truncate toward zero into an i64
    pub fn to_i64(&self) -> Result<i64, NumberError> {
        match self {
            Numeric::Integer(i) => Ok(*i),
            Numeric::Rational(r) => {
                let (num, den) = (r.numerator().clone(), IBig::from(r.denominator().clone()));
                i64::try_from(num / den).map_err(|_| NumberError::Overflow)
            }
            Numeric::Float(f) => {
                // i64::MAX rounds up to 2^63 as a double, so the upper bound is exclusive
                if !f.is_finite() || *f < i64::MIN as f64 || *f >= 9_223_372_036_854_775_808.0 {
                    Err(NumberError::Overflow)
                } else {
                    Ok(f.trunc() as i64)
                }
            }
            Numeric::Decimal(d) => d.trunc_i64().ok_or(NumberError::Overflow),
        }
    }

    // ========== Arithmetic ==========

    fn coerce(a: &Numeric, b: &Numeric, ctx: &MathContext) -> Result<(Numeric, Numeric), NumberError> {
        let to = a.representation().max(b.representation());
        Ok((a.promote(to, ctx)?, b.promote(to, ctx)?))
    }

    pub fn add(&self, other: &Numeric, ctx: &MathContext) -> Result<Numeric, NumberError> {
        Ok(match Self::coerce(self, other, ctx)? {
            (Numeric::Integer(a), Numeric::Integer(b)) => match a.checked_add(b) {
                Some(sum) => Numeric::Integer(sum),
                None => Numeric::Rational(RBig::from(IBig::from(a)) + RBig::from(IBig::from(b))),
            },
            (Numeric::Rational(a), Numeric::Rational(b)) => Numeric::Rational(a + b),
            (Numeric::Float(a), Numeric::Float(b)) => Numeric::Float(a + b),
            (Numeric::Decimal(a), Numeric::Decimal(b)) => Numeric::Decimal(a.add(&b).round(ctx)),
            _ => unreachable!("coerce yields matching representations"),
        })
    }

    pub fn neg(&self) -> Numeric {
        match self {
            Numeric::Integer(i) => match i.checked_neg() {
                Some(n) => Numeric::Integer(n),
                None => Numeric::Rational(-RBig::from(IBig::from(*i))),
            },
            Numeric::Rational(r) => Numeric::Rational(-r.clone()),
            Numeric::Float(f) => Numeric::Float(-f),
            Numeric::Decimal(d) => Numeric::Decimal(d.neg()),
        }
    }

    pub fn sub(&self, other: &Numeric, ctx: &MathContext) -> Result<Numeric, NumberError> {
        self.add(&other.neg(), ctx)
    }

    pub fn mul(&self, other: &Numeric, ctx: &MathContext) -> Result<Numeric, NumberError> {
        Ok(match Self::coerce(self, other, ctx)? {
            (Numeric::Integer(a), Numeric::Integer(b)) => match a.checked_mul(b) {
                Some(p) => Numeric::Integer(p),
                None => Numeric::Rational(RBig::from(IBig::from(a) * IBig::from(b))),
            },
            (Numeric::Rational(a), Numeric::Rational(b)) => Numeric::Rational(a * b),
            (Numeric::Float(a), Numeric::Float(b)) => Numeric::Float(a * b),
            (Numeric::Decimal(a), Numeric::Decimal(b)) => Numeric::Decimal(a.mul(&b).round(ctx)),
            _ => unreachable!("coerce yields matching representations"),
        })
    }

    /// Division; exact representations fail on a zero divisor
    pub fn div(&self, other: &Numeric, ctx: &MathContext) -> Result<Numeric, NumberError> {
        Ok(match Self::coerce(self, other, ctx)? {
            (Numeric::Integer(a), Numeric::Integer(b)) => {
                if b == 0 {
                    return Err(NumberError::DivisionByZero);
                }
                Numeric::from_rational(RBig::from(IBig::from(a)) / RBig::from(IBig::from(b)))
            }
            (Numeric::Rational(a), Numeric::Rational(b)) => {
                if b == RBig::ZERO {
                    return Err(NumberError::DivisionByZero);
                }
                Numeric::Rational(a / b)
            }
            (Numeric::Float(a), Numeric::Float(b)) => Numeric::Float(a / b),
            (Numeric::Decimal(a), Numeric::Decimal(b)) => {
                let widened = a.round(&MathContext::new(ctx.precision.max(crate::number::DEFAULT_PRECISION)));
                Numeric::Decimal(widened.checked_div(&b)?.round(ctx))
            }
            _ => unreachable!("coerce yields matching representations"),
        })
    }

    /// Reciprocal
    pub fn inverse(&self, ctx: &MathContext) -> Result<Numeric, NumberError> {
        Numeric::Integer(1).div(self, ctx)
    }

    /// Compare after promotion; `None` when a NaN is involved
    pub fn compare(&self, other: &Numeric, ctx: &MathContext) -> Result<Option<Ordering>, NumberError> {
        Ok(match Self::coerce(self, other, ctx)? {
            (Numeric::Integer(a), Numeric::Integer(b)) => Some(a.cmp(&b)),
            (Numeric::Rational(a), Numeric::Rational(b)) => Some(a.cmp(&b)),
            (Numeric::Float(a), Numeric::Float(b)) => a.partial_cmp(&b),
            (Numeric::Decimal(a), Numeric::Decimal(b)) => Some(a.cmp(&b)),
            _ => unreachable!("coerce yields matching representations"),
        })
    }
}

impl PartialEq for Numeric {
    /// Equal when the values are equal, whatever the representation
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other, &MathContext::default()), Ok(Some(Ordering::Equal)))
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Integer(i) => write!(f, "{}", i),
            Numeric::Rational(r) => write!(f, "{}", r),
            Numeric::Float(x) => write!(f, "{}", x),
            Numeric::Decimal(d) => write!(f, "{}", d),
        }
    }
}

macro_rules! numeric_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Numeric {
            fn from(v: $t) -> Self {
                Numeric::Integer(v as i64)
            }
        })*
    };
}

numeric_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Numeric {
    fn from(v: f32) -> Self {
        Numeric::Float(v as f64)
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Float(v)
    }
}

impl From<Number> for Numeric {
    fn from(v: Number) -> Self {
        Numeric::Decimal(v)
    }
}

impl From<IBig> for Numeric {
    fn from(v: IBig) -> Self {
        Numeric::Decimal(Number::from_ibig(&v))
    }
}

impl From<RBig> for Numeric {
    fn from(v: RBig) -> Self {
        Numeric::Rational(v)
    }
}

impl From<Numeric> for NumericRepr {
    fn from(n: Numeric) -> Self {
        match n {
            Numeric::Integer(i) => NumericRepr::Integer(i),
            Numeric::Rational(r) => NumericRepr::Rational(format!("{}/{}", r.numerator(), r.denominator())),
            Numeric::Float(f) => NumericRepr::Float(f),
            Numeric::Decimal(d) => NumericRepr::Decimal(d),
        }
    }
}

impl TryFrom<NumericRepr> for Numeric {
    type Error = NumberError;

    fn try_from(repr: NumericRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            NumericRepr::Integer(i) => Numeric::Integer(i),
            NumericRepr::Rational(s) => {
                let (num, den) = s.split_once('/').unwrap_or((s.as_str(), "1"));
                let num: IBig = num.trim().parse().map_err(|_| NumberError::ParseError(s.clone()))?;
                let den: IBig = den.trim().parse().map_err(|_| NumberError::ParseError(s.clone()))?;
                if den == IBig::ZERO {
                    return Err(NumberError::DivisionByZero);
                }
                Numeric::Rational(RBig::from(num) / RBig::from(den))
            }
            NumericRepr::Float(f) => Numeric::Float(f),
            NumericRepr::Decimal(d) => Numeric::Decimal(d),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> MathContext {
        MathContext::default()
    }

    #[test]
    fn test_factories_pick_representation() {
        assert_eq!(Numeric::from(2i16).representation(), Representation::Integer);
        assert_eq!(Numeric::from(2u8).representation(), Representation::Integer);
        assert_eq!(Numeric::from(2.0f32).representation(), Representation::Float);
        assert_eq!(Numeric::from(2.0).representation(), Representation::Float);
        assert_eq!(Numeric::from(Number::from_i64(1)).representation(), Representation::Decimal);
        assert_eq!(Numeric::from(IBig::from(1)).representation(), Representation::Decimal);
    }

    #[test]
    fn test_integer_add_stays_integer() {
        let sum = Numeric::Integer(1).add(&Numeric::Integer(2), &ctx()).unwrap();
        assert!(matches!(sum, Numeric::Integer(3)));
    }

    #[test]
    fn test_integer_overflow_promotes_to_rational() {
        let sum = Numeric::Integer(i64::MAX).add(&Numeric::Integer(1), &ctx()).unwrap();
        assert_eq!(sum.representation(), Representation::Rational);
        assert!(Numeric::Integer(i64::MAX).to_i64().is_ok());
        assert!(sum.to_i64().is_err());
    }

    #[test]
    fn test_integer_division_keeps_exactness() {
        let q = Numeric::Integer(3).div(&Numeric::Integer(2), &ctx()).unwrap();
        assert_eq!(q.representation(), Representation::Rational);
        assert_eq!(q.to_f64(), 1.5);

        let whole = Numeric::Integer(6).div(&Numeric::Integer(2), &ctx()).unwrap();
        assert!(matches!(whole, Numeric::Integer(3)));

        assert!(matches!(
            Numeric::Integer(1).div(&Numeric::Integer(0), &ctx()),
            Err(NumberError::DivisionByZero)
        ));
    }

    #[test]
    fn test_decimal_and_float_promote_to_decimal() {
        let d = Numeric::Decimal(Number::from_i64(10));
        let f = Numeric::Float(2.5);
        let sum = d.add(&f, &ctx()).unwrap();
        assert_eq!(sum.representation(), Representation::Decimal);
        assert_eq!(sum, Numeric::Decimal(Number::from_str("12.5").unwrap()));
    }

    #[test]
    fn test_float_division_by_zero_is_ieee() {
        let q = Numeric::Float(1.0).div(&Numeric::Float(0.0), &ctx()).unwrap();
        assert_eq!(q.to_f64(), f64::INFINITY);
    }

    #[test]
    fn test_cross_representation_equality() {
        assert_eq!(Numeric::Integer(2), Numeric::Float(2.0));
        assert_eq!(Numeric::Float(0.5), Numeric::Decimal(Number::from_str("0.5").unwrap()));
        assert_ne!(Numeric::Float(f64::NAN), Numeric::Float(f64::NAN));
    }

    #[test]
    fn test_to_i64_truncates() {
        assert_eq!(Numeric::Float(71.9).to_i64().unwrap(), 71);
        assert!(Numeric::Float(1e300).to_i64().is_err());
        assert!(Numeric::Float(f64::NAN).to_i64().is_err());
        assert!(Numeric::Float(9.223372036854775807e18).to_i64().is_err());
        assert!(Numeric::Float(-9.223372036854775808e18).to_i64().is_ok());
        assert_eq!(Numeric::Float(9.223372036854774e18).to_i64().unwrap(), 9_223_372_036_854_774_784);
    }

    #[test]
    fn test_tiny_decimal_is_not_infinite() {
        let tiny = Numeric::Decimal(Number::from_str("1e-400").unwrap());
        assert_eq!(tiny.to_f64(), 0.0);
        let huge = Numeric::Decimal(Number::from_str("-1e400").unwrap());
        assert_eq!(huge.to_f64(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&Numeric::Integer(5)).unwrap();
        assert_eq!(json, r#"{"type":"Integer","value":5}"#);
        let r: Numeric = serde_json::from_str(r#"{"type":"Rational","value":"3/4"}"#).unwrap();
        assert_eq!(r.to_f64(), 0.75);
        let json = serde_json::to_string(&Numeric::Rational(RBig::from(IBig::from(-3)) / RBig::from(IBig::from(4)))).unwrap();
        assert_eq!(json, r#"{"type":"Rational","value":"-3/4"}"#);
        assert!(serde_json::from_str::<Numeric>(r#"{"type":"Rational","value":"1/0"}"#).is_err());
    }
}
