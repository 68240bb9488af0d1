//! Arbitrary precision decimal numbers using dashu
//!
//! Uses dashu-float (DBig) for arbitrary precision decimal arithmetic.
//! Exact scaling by integers and rationals, controlled-precision division,
//! and the transcendentals (ln, exp) needed by logarithmic converters.

use dashu_float::DBig;
use dashu_base::BitTest;
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use serde::{Deserialize, Serialize, Serializer, Deserializer};
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Overflow: result too large")]
    Overflow,
}

/// Default precision for calculations (decimal digits)
pub const DEFAULT_PRECISION: usize = 50;

/// Precision context for decimal conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MathContext {
    /// Significant decimal digits kept by inexact operations
    pub precision: usize,
}

impl MathContext {
    /// 34 digits, the IEEE 754 decimal128 format
    pub const DECIMAL128: MathContext = MathContext { precision: 34 };

    pub const fn new(precision: usize) -> Self {
        MathContext { precision }
    }
}

impl Default for MathContext {
    fn default() -> Self {
        MathContext { precision: DEFAULT_PRECISION }
    }
}

const PI_STR: &str = "3.14159265358979323846264338327950288419716939937510582097494459230781640628620899862803482534211706798214808651328230664709384460955058223172535940812848111745028410270193852110555964462294895493038196442881097566593344612847564823378678316527120190914564856692346034861045432664821339360726024914127372458700660631558817488152092096282925409171536436789259036001133053054882046652138414695194151160943305727036575959195309218611738193261179310511854807446237996274956735188575272489122793818301194912";

/// Arbitrary precision decimal number
///
/// Built on dashu-float's DBig. All operations return Results or new
/// Numbers - never panic.
#[derive(Debug, Clone)]
pub struct Number {
    inner: DBig,
}

impl Number {
    // ========== Construction ==========

    /// Ensure a DBig has adequate precision for calculations
    fn with_work_precision(val: DBig) -> DBig {
        val.with_precision(DEFAULT_PRECISION).value()
    }

    /// Create from string representation
    /// Supports: "123", "3.14", "1/3", "1.5e10", "-42"
    pub fn from_str(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();

        // Handle rational format "a/b"
        if s.contains('/') && !s.contains('.') && !s.contains('e') && !s.contains('E') {
            let parts: Vec<&str> = s.split('/').collect();
            if parts.len() == 2 {
                let num: IBig = parts[0].trim().parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let den: IBig = parts[1].trim().parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                return Self::from_ratio(num, den);
            }
        }

        // Handle scientific notation with integer mantissa: "602214076e15"
        if (s.contains('e') || s.contains('E')) && !s.contains('.') {
            let s_lower = s.to_lowercase();
            let parts: Vec<&str> = s_lower.split('e').collect();
            if parts.len() == 2 {
                let mantissa: IBig = parts[0].parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let exp: isize = parts[1].parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;

                let result = DBig::from_parts(mantissa, exp);
                return Ok(Self { inner: Self::with_work_precision(result) });
            }
        }

        let inner: DBig = s.parse()
            .map_err(|_| NumberError::ParseError(s.to_string()))?;

        Ok(Self { inner: Self::with_work_precision(inner) })
    }

    /// Create from i64 with working precision
    pub fn from_i64(n: i64) -> Self {
        Self { inner: Self::with_work_precision(DBig::from(n)) }
    }

    /// Create from an arbitrary precision integer
    pub fn from_ibig(n: &IBig) -> Self {
        Self { inner: Self::with_work_precision(DBig::from(n.clone())) }
    }

    /// Create from a ratio of arbitrary precision integers
    pub fn from_ratio(num: IBig, den: IBig) -> Result<Self, NumberError> {
        if den == IBig::ZERO {
            return Err(NumberError::DivisionByZero);
        }
        let n = Self::with_work_precision(DBig::from(num));
        let d = Self::with_work_precision(DBig::from(den));
        Ok(Self { inner: n / d })
    }

    /// Create from an exact rational, rounded to working precision
    pub fn from_rbig(r: &RBig) -> Self {
        let n = Self::with_work_precision(DBig::from(r.numerator().clone()));
        let d = Self::with_work_precision(DBig::from(r.denominator().clone()));
        Self { inner: n / d }
    }

    /// Create from f64 using its shortest round-trip decimal form.
    ///
    /// Non-finite input has no decimal representation.
    pub fn from_f64(f: f64) -> Result<Self, NumberError> {
        if !f.is_finite() {
            return Err(NumberError::DomainError(format!("{} has no decimal value", f)));
        }
        Self::from_str(&format!("{}", f))
    }

    /// Pi - from high-precision string constant
    pub fn pi(precision: usize) -> Self {
        let end_pos = (precision + 2).min(PI_STR.len());
        let inner: DBig = PI_STR[..end_pos].parse().unwrap_or(DBig::ZERO);
        Self { inner: inner.with_precision(precision.max(DEFAULT_PRECISION)).value() }
    }

    // ========== Predicates ==========

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.inner == DBig::ZERO
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.inner < DBig::ZERO
    }

    /// Check if value is an integer
    pub fn is_integer(&self) -> bool {
        let floor_val = self.inner.clone().floor();
        self.inner == floor_val
    }

    // ========== Basic Arithmetic ==========

    /// Addition
    pub fn add(&self, other: &Self) -> Self {
        Self { inner: &self.inner + &other.inner }
    }

    /// Multiplication
    pub fn mul(&self, other: &Self) -> Self {
        Self { inner: &self.inner * &other.inner }
    }

    /// Negation
    pub fn neg(&self) -> Self {
        Self { inner: -&self.inner }
    }

    /// Safe division (returns Result, never panics)
    pub fn checked_div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.is_zero() {
            Err(NumberError::DivisionByZero)
        } else {
            Ok(Self { inner: &self.inner / &other.inner })
        }
    }

    /// Exact scaling by an integer ratio, rounded once to the context precision
    pub fn mul_ratio(&self, num: &IBig, den: &UBig, ctx: &MathContext) -> Self {
        let scaled = &self.inner * &DBig::from(num.clone());
        let divisor = Self::with_work_precision(DBig::from(den.clone()));
        let widened = scaled.with_precision(ctx.precision.max(DEFAULT_PRECISION)).value();
        Self { inner: widened / divisor }.round(ctx)
    }

    /// Round to the significant digits of `ctx`
    pub fn round(&self, ctx: &MathContext) -> Self {
        Self { inner: self.inner.clone().with_precision(ctx.precision).value() }
    }

    // ========== Transcendental Functions ==========

    /// Natural logarithm
    pub fn ln(&self, precision: usize) -> Result<Self, NumberError> {
        if self.inner <= DBig::ZERO {
            return Err(NumberError::DomainError(
                "logarithm of non-positive number".to_string()
            ));
        }

        let val = self.inner.clone().with_precision(precision).value();
        Ok(Self { inner: val.ln() })
    }

    /// Exponential function (e^x)
    pub fn exp(&self, precision: usize) -> Self {
        let val = self.inner.clone().with_precision(precision).value();
        Self { inner: val.exp() }
    }

    // ========== Other Operations ==========

    /// Try to convert to i64
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }

        // DBig stores as significand * 10^exponent
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        let sig_i64: i64 = significand.try_into().ok()?;

        if exponent == 0 {
            Some(sig_i64)
        } else if exponent > 0 && exponent <= 18 {
            sig_i64.checked_mul(10_i64.checked_pow(exponent as u32)?)
        } else if exponent < 0 && exponent >= -18 {
            let divisor = 10_i64.checked_pow((-exponent) as u32)?;
            if sig_i64 % divisor == 0 {
                Some(sig_i64 / divisor)
            } else {
                None
            }
        } else {
            None
        }
    }

    /// Truncate toward zero and convert to i64
    pub fn trunc_i64(&self) -> Option<i64> {
        let truncated = if self.is_negative() {
            Self { inner: self.inner.clone().ceil() }
        } else {
            Self { inner: self.inner.clone().floor() }
        };
        truncated.to_i64()
    }

    /// Convert to f64 (may lose precision). Magnitudes below the f64 range
    /// underflow to a subnormal or zero; `None` only on overflow.
    pub fn to_f64(&self) -> Option<f64> {
        // Get the representation: significand * 10^exponent
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();

        let sig_f64: f64 = if significand.bit_len() <= 53 {
            match TryInto::<i64>::try_into(significand.clone()) {
                Ok(i) => i as f64,
                Err(_) => return None,
            }
        } else {
            // Significand too large - shift right to fit in 53 bits
            let extra_bits = significand.bit_len() - 53;
            let shifted = &significand >> extra_bits;
            let shifted_i64: i64 = shifted.try_into().ok()?;
            (shifted_i64 as f64) * 2_f64.powi(extra_bits as i32)
        };

        let result = if exponent == 0 {
            sig_f64
        } else if exponent > 0 && exponent <= 308 {
            sig_f64 * 10_f64.powi(exponent as i32)
        } else if exponent < 0 && exponent >= -308 {
            sig_f64 / 10_f64.powi((-exponent) as i32)
        } else if exponent < 0 {
            // Divide in two steps so the significand's digits survive
            // until the final rounding
            let rest = (exponent.unsigned_abs() - 308).min(i32::MAX as usize) as i32;
            sig_f64 / 1e308 / 10_f64.powi(rest)
        } else {
            return None; // Exponent out of f64 range
        };

        if result.is_finite() {
            Some(result)
        } else {
            None
        }
    }
}

// ========== Trait Implementations ==========

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self::from_i64(n)
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.inner.partial_cmp(&other.inner).unwrap_or(std::cmp::Ordering::Equal)
    }
}
