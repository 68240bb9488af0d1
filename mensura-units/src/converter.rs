//! Unit converters
//!
//! A converter is an immutable function over numeric values, stored as a
//! flattened list of atomic [`ConversionStep`]s. Steps are listed outermost
//! first: the converter `[a, b]` computes `a(b(x))`, so
//! `a.concatenate(&b).convert(x) == a.convert(b.convert(x))`.
//!
//! Construction normalizes degenerate steps (`Add(0)`, `Multiply(1)`,
//! `Rational(n/n)`) to identity, and concatenation merges adjacent steps
//! where the algebra allows it, so a converter composed with its inverse
//! is always the identity.

use std::f64::consts::{E, PI};
use std::fmt;
use std::hash::{Hash, Hasher};

use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use mensura_core::{MathContext, MeasureError, Number};

/// Atomic conversion function
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionStep {
    Identity,
    /// `v + offset`
    Add(f64),
    /// `v * factor`
    Multiply(f64),
    /// `v * ratio`, exact
    Rational(RBig),
    /// `log_base(v)`
    Log(f64),
    /// `base^v`
    Exp(f64),
    /// `v * π`
    PiMultiply,
    /// `v / π`
    PiDivide,
}

impl Eq for ConversionStep {}

impl Hash for ConversionStep {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ConversionStep::Add(x)
            | ConversionStep::Multiply(x)
            | ConversionStep::Log(x)
            | ConversionStep::Exp(x) => {
                // -0.0 == 0.0, so both hash as +0.0
                let x = if *x == 0.0 { 0.0 } else { *x };
                x.to_bits().hash(state)
            }
            ConversionStep::Rational(r) => {
                r.numerator().hash(state);
                r.denominator().hash(state);
            }
            ConversionStep::Identity | ConversionStep::PiMultiply | ConversionStep::PiDivide => {}
        }
    }
}

/// Exact rational reading of a double's shortest decimal form (0.1 -> 1/10)
pub(crate) fn decimal_ratio(f: f64) -> Option<RBig> {
    if !f.is_finite() {
        return None;
    }
    let text = format!("{}", f.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let digits: IBig = format!("{}{}", whole, frac).parse().ok()?;
    let scale = UBig::from(10u8).pow(frac.len());
    let magnitude = RBig::from_parts(digits, scale);
    Some(if f < 0.0 { -magnitude } else { magnitude })
}

/// Reciprocal of a double factor. When `1/f` is not the exact decimal
/// reciprocal of `f` (e.g. 0.3048), the inverse is kept as an exact ratio
/// so it cancels against `f` under concatenation.
fn multiply_inverse(f: f64) -> ConversionStep {
    let reciprocal = 1.0 / f;
    match (decimal_ratio(f), decimal_ratio(reciprocal)) {
        (Some(a), Some(b)) if a != RBig::ZERO && &a * &b != RBig::ONE => ConversionStep::Rational(RBig::ONE / a),
        _ => ConversionStep::Multiply(reciprocal),
    }
}

fn is_one(r: &RBig) -> bool {
    *r == RBig::ONE
}

impl ConversionStep {
    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            ConversionStep::Identity
                | ConversionStep::Multiply(_)
                | ConversionStep::Rational(_)
                | ConversionStep::PiMultiply
                | ConversionStep::PiDivide
        )
    }

    /// True for steps that compute `v` unchanged
    pub fn is_identity(&self) -> bool {
        match self {
            ConversionStep::Identity => true,
            ConversionStep::Add(o) => *o == 0.0,
            ConversionStep::Multiply(f) => *f == 1.0,
            ConversionStep::Rational(r) => is_one(r),
            _ => false,
        }
    }

    pub fn inverse(&self) -> ConversionStep {
        match self {
            ConversionStep::Identity => ConversionStep::Identity,
            ConversionStep::Add(o) => ConversionStep::Add(-o),
            ConversionStep::Multiply(f) => multiply_inverse(*f),
            ConversionStep::Rational(r) if *r == RBig::ZERO => ConversionStep::Multiply(f64::INFINITY),
            ConversionStep::Rational(r) => ConversionStep::Rational(RBig::ONE / r),
            ConversionStep::Log(b) => ConversionStep::Exp(*b),
            ConversionStep::Exp(b) => ConversionStep::Log(*b),
            ConversionStep::PiMultiply => ConversionStep::PiDivide,
            ConversionStep::PiDivide => ConversionStep::PiMultiply,
        }
    }

    pub fn offset(&self) -> Option<f64> {
        match self {
            ConversionStep::Add(o) => Some(*o),
            _ => None,
        }
    }

    /// Scale factor of a linear step, as a double
    pub fn factor(&self) -> Option<f64> {
        match self {
            ConversionStep::Identity => Some(1.0),
            ConversionStep::Multiply(f) => Some(*f),
            ConversionStep::Rational(r) => Some(r.to_f64().value()),
            ConversionStep::PiMultiply => Some(PI),
            ConversionStep::PiDivide => Some(1.0 / PI),
            _ => None,
        }
    }

    pub fn base(&self) -> Option<f64> {
        match self {
            ConversionStep::Log(b) | ConversionStep::Exp(b) => Some(*b),
            _ => None,
        }
    }

    pub fn convert(&self, v: f64) -> f64 {
        match self {
            ConversionStep::Identity => v,
            ConversionStep::Add(o) => v + o,
            ConversionStep::Multiply(f) => v * f,
            ConversionStep::Rational(r) => {
                let num = r.numerator().to_f64().value();
                let den = r.denominator().to_f64().value();
                v * num / den
            }
            ConversionStep::Log(b) => {
                if *b == E { v.ln() } else { v.log(*b) }
            }
            ConversionStep::Exp(b) => {
                if *b == E { v.exp() } else { b.powf(v) }
            }
            ConversionStep::PiMultiply => v * PI,
            ConversionStep::PiDivide => v / PI,
        }
    }

    pub fn convert_decimal(&self, v: &Number, ctx: &MathContext) -> Result<Number, MeasureError> {
        let p = ctx.precision;
        Ok(match self {
            ConversionStep::Identity => v.clone(),
            ConversionStep::Add(o) => v.add(&Number::from_f64(*o)?),
            ConversionStep::Multiply(f) => v.mul(&Number::from_f64(*f)?).round(ctx),
            ConversionStep::Rational(r) => v.mul_ratio(r.numerator(), r.denominator(), ctx),
            ConversionStep::Log(b) => {
                let ln_v = v.ln(p)?;
                if *b == E {
                    ln_v.round(ctx)
                } else {
                    ln_v.checked_div(&Number::from_f64(*b)?.ln(p)?)?.round(ctx)
                }
            }
            ConversionStep::Exp(b) => {
                if *b == E {
                    v.exp(p).round(ctx)
                } else {
                    v.mul(&Number::from_f64(*b)?.ln(p)?).exp(p).round(ctx)
                }
            }
            ConversionStep::PiMultiply => v.mul(&Number::pi(p + 2)).round(ctx),
            ConversionStep::PiDivide => v.checked_div(&Number::pi(p + 2))?.round(ctx),
        })
    }

    /// Exact application to a rational; `None` for irrational steps
    pub fn convert_ratio(&self, v: &RBig) -> Option<RBig> {
        match self {
            ConversionStep::Identity => Some(v.clone()),
            ConversionStep::Add(o) => Some(v + decimal_ratio(*o)?),
            ConversionStep::Multiply(f) => Some(v * decimal_ratio(*f)?),
            ConversionStep::Rational(r) => Some(v * r),
            _ => None,
        }
    }

    /// Combine `self` applied after `inner` into at most one step.
    ///
    /// `Some(None)` means the pair cancels out; `None` means the steps do
    /// not combine.
    fn merge(&self, inner: &ConversionStep) -> Option<Option<ConversionStep>> {
        use ConversionStep::*;
        let merged = match (self, inner) {
            (Add(a), Add(b)) => Add(a + b),
            (Multiply(a), Multiply(b)) => {
                // Stay a double only when the double product is exact
                let exact = decimal_ratio(*a)? * decimal_ratio(*b)?;
                let product = a * b;
                if decimal_ratio(product).as_ref() == Some(&exact) {
                    Multiply(product)
                } else {
                    Rational(exact)
                }
            }
            (Rational(a), Rational(b)) => Rational(a * b),
            (Multiply(f), Rational(r)) | (Rational(r), Multiply(f)) => Rational(decimal_ratio(*f)? * r),
            (PiMultiply, PiDivide) | (PiDivide, PiMultiply) => return Some(None),
            (Log(a), Exp(b)) | (Exp(a), Log(b)) if a == b => return Some(None),
            _ => return None,
        };
        if merged.is_identity() {
            Some(None)
        } else {
            Some(Some(merged))
        }
    }
}

impl fmt::Display for ConversionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStep::Identity => write!(f, "Identity"),
            ConversionStep::Add(o) => write!(f, "Add({})", o),
            ConversionStep::Multiply(x) => write!(f, "Multiply({})", x),
            ConversionStep::Rational(r) => write!(f, "Rational({}/{})", r.numerator(), r.denominator()),
            ConversionStep::Log(b) if *b == E => write!(f, "ln"),
            ConversionStep::Log(b) => write!(f, "Log({})", b),
            ConversionStep::Exp(b) if *b == E => write!(f, "e"),
            ConversionStep::Exp(b) => write!(f, "Exp({})", b),
            ConversionStep::PiMultiply => write!(f, "(π)"),
            ConversionStep::PiDivide => write!(f, "(1/π)"),
        }
    }
}

/// Composable conversion function between units
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnitConverter {
    /// Outermost first; empty for the identity
    steps: Vec<ConversionStep>,
}

impl UnitConverter {
    pub fn identity() -> Self {
        UnitConverter::default()
    }

    pub fn add(offset: f64) -> Self {
        UnitConverter::from_step(ConversionStep::Add(offset))
    }

    pub fn multiply(factor: f64) -> Self {
        UnitConverter::from_step(ConversionStep::Multiply(factor))
    }

    /// Exact scaling by `ratio`
    pub fn from_ratio(ratio: RBig) -> Self {
        UnitConverter::from_step(ConversionStep::Rational(ratio))
    }

    /// Exact scaling by `numerator / denominator`
    pub fn rational(numerator: impl Into<IBig>, denominator: impl Into<IBig>) -> Result<Self, MeasureError> {
        let den: IBig = denominator.into();
        if den == IBig::ZERO {
            return Err(MeasureError::invalid_converter("rational converter with zero denominator"));
        }
        Ok(UnitConverter::from_ratio(RBig::from(numerator.into()) / RBig::from(den)))
    }

    pub fn log(base: f64) -> Self {
        UnitConverter::from_step(ConversionStep::Log(base))
    }

    pub fn ln() -> Self {
        UnitConverter::log(E)
    }

    pub fn exp(base: f64) -> Self {
        UnitConverter::from_step(ConversionStep::Exp(base))
    }

    pub fn pi_multiply() -> Self {
        UnitConverter::from_step(ConversionStep::PiMultiply)
    }

    pub fn pi_divide() -> Self {
        UnitConverter::from_step(ConversionStep::PiDivide)
    }

    fn from_step(step: ConversionStep) -> Self {
        if step.is_identity() {
            UnitConverter::identity()
        } else {
            UnitConverter { steps: vec![step] }
        }
    }

    /// Build from untrusted steps (outermost first), rejecting non-finite
    /// parameters and logarithm bases that do not define a logarithm.
    pub fn try_from_steps(steps: impl IntoIterator<Item = ConversionStep>) -> Result<Self, MeasureError> {
        let mut converter = UnitConverter::identity();
        let mut inner_first: Vec<ConversionStep> = steps.into_iter().collect();
        inner_first.reverse();
        for step in inner_first {
            match &step {
                ConversionStep::Add(x) | ConversionStep::Multiply(x) if !x.is_finite() => {
                    return Err(MeasureError::invalid_converter(format!("{} has a non-finite parameter", step)));
                }
                ConversionStep::Log(b) | ConversionStep::Exp(b) if !b.is_finite() || *b <= 0.0 || *b == 1.0 => {
                    return Err(MeasureError::invalid_converter(format!("{} has an invalid base", step)));
                }
                _ => {}
            }
            converter = UnitConverter::from_step(step).concatenate(&converter);
        }
        Ok(converter)
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_linear(&self) -> bool {
        self.steps.iter().all(ConversionStep::is_linear)
    }

    /// Atomic steps, outermost first. Never empty: the identity reports a
    /// single `Identity` step.
    pub fn conversion_steps(&self) -> Vec<ConversionStep> {
        if self.steps.is_empty() {
            vec![ConversionStep::Identity]
        } else {
            self.steps.clone()
        }
    }

    pub fn inverse(&self) -> UnitConverter {
        UnitConverter {
            steps: self.steps.iter().rev().map(ConversionStep::inverse).collect(),
        }
    }

    /// Converter computing `self.convert(inner.convert(x))`
    pub fn concatenate(&self, inner: &UnitConverter) -> UnitConverter {
        let mut steps = self.steps.clone();
        for step in inner.steps.iter() {
            push_step(&mut steps, step.clone());
        }
        UnitConverter { steps }
    }

    pub fn convert(&self, value: f64) -> f64 {
        self.steps.iter().rev().fold(value, |v, step| step.convert(v))
    }

    pub fn convert_decimal(&self, value: &Number, ctx: &MathContext) -> Result<Number, MeasureError> {
        let mut v = value.clone();
        for step in self.steps.iter().rev() {
            v = step.convert_decimal(&v, ctx)?;
        }
        Ok(v)
    }

    /// Exact conversion of a rational, when every step preserves rationals
    pub fn convert_ratio(&self, value: &RBig) -> Option<RBig> {
        let mut v = value.clone();
        for step in self.steps.iter().rev() {
            v = step.convert_ratio(&v)?;
        }
        Some(v)
    }

    /// Linear converter raised to an integer power
    pub fn pow(&self, n: i32) -> Result<UnitConverter, MeasureError> {
        if !self.is_linear() {
            return Err(MeasureError::arithmetic(format!("cannot raise non-linear converter {} to a power", self)));
        }
        if self.is_identity() {
            return Ok(UnitConverter::identity());
        }
        // Square and multiply; linear steps commute
        let mut base = if n < 0 { self.inverse() } else { self.clone() };
        let mut remaining = n.unsigned_abs();
        let mut result = UnitConverter::identity();
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.concatenate(&base);
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.concatenate(&base);
            }
        }
        Ok(result)
    }

    /// Linear converter's root of order `n > 0`. Double factors are read
    /// as exact decimals, so exact roots and whole powers of π stay exact;
    /// anything else becomes a double factor.
    pub fn root(&self, n: i32) -> Result<UnitConverter, MeasureError> {
        if n <= 0 {
            return Err(MeasureError::arithmetic(format!("converter root of order {}", n)));
        }
        if !self.is_linear() {
            return Err(MeasureError::arithmetic(format!("cannot take root of non-linear converter {}", self)));
        }

        let mut pi_power = 0i32;
        let mut exact = RBig::ONE;
        let mut approx = 1.0f64;
        for step in &self.steps {
            match step {
                ConversionStep::PiMultiply => pi_power += 1,
                ConversionStep::PiDivide => pi_power -= 1,
                ConversionStep::Rational(r) => exact = exact * r,
                ConversionStep::Multiply(f) => match decimal_ratio(*f) {
                    Some(r) => exact = exact * r,
                    None => approx *= f,
                },
                _ => {}
            }
        }

        let mut result = UnitConverter::identity();
        if pi_power % n == 0 {
            let pi = if pi_power < 0 { UnitConverter::pi_divide() } else { UnitConverter::pi_multiply() };
            for _ in 0..(pi_power / n).unsigned_abs() {
                result = result.concatenate(&pi);
            }
        } else {
            approx *= PI.powf(pi_power as f64);
        }
        match exact_root(&exact, n) {
            Some(r) => result = result.concatenate(&UnitConverter::from_ratio(r)),
            None => approx *= exact.to_f64().value(),
        }
        if approx != 1.0 {
            result = result.concatenate(&UnitConverter::multiply(approx.powf(1.0 / n as f64)));
        }
        Ok(result)
    }
}

/// Push `step` as the new innermost step, merging where possible. Linear
/// steps commute, so a linear step may merge with any step of the trailing
/// linear run.
fn push_step(steps: &mut Vec<ConversionStep>, step: ConversionStep) {
    if step.is_identity() {
        return;
    }
    let mut idx = steps.len();
    while idx > 0 {
        idx -= 1;
        match steps[idx].merge(&step) {
            Some(None) => {
                steps.remove(idx);
                return;
            }
            Some(Some(merged)) => {
                steps[idx] = merged;
                return;
            }
            None => {}
        }
        if !(step.is_linear() && steps[idx].is_linear()) {
            break;
        }
    }
    steps.push(step);
}

fn exact_int_root(x: &UBig, n: i32) -> Option<UBig> {
    let guess = x.to_f64().value().powf(1.0 / n as f64).round();
    if !guess.is_finite() || guess < 0.0 || guess >= u64::MAX as f64 {
        return None;
    }
    // The double estimate can be off by one for large radicands
    let guess = guess as u64;
    [guess, guess.saturating_sub(1), guess + 1]
        .into_iter()
        .map(UBig::from)
        .find(|candidate| candidate.pow(n as usize) == *x)
}

fn exact_root(r: &RBig, n: i32) -> Option<RBig> {
    let negative = *r < RBig::ZERO;
    if negative && n % 2 == 0 {
        return None;
    }
    let magnitude = UBig::try_from(r.numerator().clone()).ok().or_else(|| UBig::try_from(-r.numerator().clone()).ok())?;
    let num = exact_int_root(&magnitude, n)?;
    let den = exact_int_root(r.denominator(), n)?;
    let root = RBig::from_parts(IBig::from(num), den);
    Some(if negative { -root } else { root })
}

impl fmt::Display for UnitConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "{}", ConversionStep::Identity);
        }
        let parts: Vec<String> = self.steps.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join(" ∘ "))
    }
}

impl From<ConversionStep> for UnitConverter {
    fn from(step: ConversionStep) -> Self {
        UnitConverter::from_step(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(n: i64, d: u64) -> RBig {
        RBig::from_parts(IBig::from(n), UBig::from(d))
    }

    #[test]
    fn test_degenerate_steps_normalize_to_identity() {
        assert!(UnitConverter::add(0.0).is_identity());
        assert!(UnitConverter::multiply(1.0).is_identity());
        assert!(UnitConverter::rational(7, 7).unwrap().is_identity());
        assert!(!UnitConverter::add(10.0).is_identity());
    }

    #[test]
    fn test_rational_zero_denominator() {
        let err = UnitConverter::rational(1, 0).unwrap_err();
        assert!(matches!(err, MeasureError::InvalidConverter(_)));
    }

    #[test]
    fn test_add_inverse() {
        let add = UnitConverter::add(10.0);
        assert_eq!(add.inverse(), UnitConverter::add(-10.0));
        assert!(add.concatenate(&UnitConverter::add(-10.0)).is_identity());
        assert!(!add.is_linear());
        assert_eq!(add.convert(5.0), 15.0);
        assert_eq!(add.to_string(), "Add(10)");
    }

    #[test]
    fn test_add_merges() {
        let c = UnitConverter::add(10.0).concatenate(&UnitConverter::add(5.0));
        assert_eq!(c, UnitConverter::add(15.0));
    }

    #[test]
    fn test_multiply_inverse() {
        let km = UnitConverter::multiply(1000.0);
        assert_eq!(km.inverse(), UnitConverter::multiply(0.001));
        assert!(km.concatenate(&km.inverse()).is_identity());
        let odd = UnitConverter::multiply(49.0);
        assert!(odd.concatenate(&odd.inverse()).is_identity());
        assert!(odd.inverse().concatenate(&odd).is_identity());
    }

    #[test]
    fn test_inexact_factor_round_trip() {
        let ft = UnitConverter::multiply(0.3048);
        assert_eq!(ft.inverse(), UnitConverter::from_ratio(ratio(10000, 3048)));
        assert!(ft.concatenate(&ft.inverse()).is_identity());
        let km_to_ft = ft.inverse().concatenate(&UnitConverter::rational(1000, 1).unwrap());
        let ft_to_km = UnitConverter::rational(1, 1000).unwrap().concatenate(&ft);
        assert!(km_to_ft.concatenate(&ft_to_km).is_identity());
        assert!((km_to_ft.convert(1.0) - 3280.839895013123).abs() < 1e-9);
    }

    #[test]
    fn test_rational_merges_exactly() {
        let a = UnitConverter::rational(1, 3).unwrap();
        let b = UnitConverter::rational(3, 1).unwrap();
        assert!(a.concatenate(&b).is_identity());
        let c = UnitConverter::rational(60, 1).unwrap().concatenate(&UnitConverter::rational(60, 1).unwrap());
        assert_eq!(c, UnitConverter::from_ratio(ratio(3600, 1)));
    }

    #[test]
    fn test_mixed_scaling_merges_to_rational() {
        let c = UnitConverter::multiply(0.3048).concatenate(&UnitConverter::rational(1, 1000).unwrap());
        assert_eq!(c, UnitConverter::from_ratio(ratio(3048, 10_000_000)));
    }

    #[test]
    fn test_log_exp() {
        let log10 = UnitConverter::log(10.0);
        assert_eq!(log10.convert(10.0), 1.0);
        assert!(log10.convert(-10.0).is_nan());
        assert_eq!(log10.convert(0.0), f64::NEG_INFINITY);
        assert_eq!(log10.inverse(), UnitConverter::exp(10.0));
        assert_eq!(UnitConverter::ln().inverse(), UnitConverter::exp(E));
        assert!(!log10.is_linear());
        assert_eq!(log10.to_string(), "Log(10)");
        assert_eq!(UnitConverter::ln().to_string(), "ln");
        assert!(log10.concatenate(&log10.inverse()).is_identity());
    }

    #[test]
    fn test_pi_converters() {
        let pi = UnitConverter::pi_multiply();
        assert!((pi.convert(100.0) - 314.159).abs() < 0.1);
        assert_eq!(pi.convert(0.0), 0.0);
        assert!(pi.is_linear());
        assert_eq!(pi.to_string(), "(π)");
        let div = UnitConverter::pi_divide();
        assert!((div.convert(3141.0) - 1000.0).abs() < 0.2);
        assert_eq!(div.to_string(), "(1/π)");
        assert!(pi.concatenate(&div).is_identity());
    }

    #[test]
    fn test_pi_decimal_uses_extended_digits() {
        let ctx = MathContext::DECIMAL128;
        let v = UnitConverter::pi_multiply().convert_decimal(&Number::from_i64(1), &ctx).unwrap();
        assert!(v.to_string().starts_with("3.14159265358979323846264338327950"));
    }

    #[test]
    fn test_compound_application_order() {
        // Fahrenheit to kelvin: (f + 459.67) * 5/9
        let to_kelvin = UnitConverter::rational(5, 9).unwrap().concatenate(&UnitConverter::add(459.67));
        assert_eq!(to_kelvin.conversion_steps().len(), 2);
        assert!((to_kelvin.convert(32.0) - 273.15).abs() < 1e-9);
        assert!((to_kelvin.inverse().convert(273.15) - 32.0).abs() < 1e-9);
        assert!(to_kelvin.concatenate(&to_kelvin.inverse()).is_identity());
        assert!(to_kelvin.inverse().concatenate(&to_kelvin).is_identity());
        assert_eq!(to_kelvin.to_string(), "Rational(5/9) ∘ Add(459.67)");
    }

    #[test]
    fn test_linear_steps_commute_when_merging() {
        let degree = UnitConverter::pi_multiply().concatenate(&UnitConverter::rational(1, 180).unwrap());
        let back = UnitConverter::pi_divide().concatenate(&UnitConverter::rational(180, 1).unwrap());
        assert!(degree.concatenate(&back).is_identity());
    }

    #[test]
    fn test_identity_steps_never_empty() {
        let steps = UnitConverter::identity().conversion_steps();
        assert_eq!(steps, vec![ConversionStep::Identity]);
        assert_eq!(UnitConverter::identity().to_string(), "Identity");
    }

    #[test]
    fn test_decimal_conversion_is_exact_for_ratios() {
        let ctx = MathContext::default();
        let c = UnitConverter::rational(1, 1000).unwrap();
        let v = c.convert_decimal(&Number::from_i64(5), &ctx).unwrap();
        assert_eq!(v, Number::from_str("0.005").unwrap());
        let celsius = UnitConverter::add(273.15);
        let k = celsius.convert_decimal(&Number::from_i64(20), &ctx).unwrap();
        assert_eq!(k, Number::from_str("293.15").unwrap());
    }

    #[test]
    fn test_ratio_conversion() {
        let c = UnitConverter::rational(1, 24).unwrap();
        assert_eq!(c.convert_ratio(&ratio(12, 1)), Some(ratio(1, 2)));
        assert_eq!(UnitConverter::add(273.15).convert_ratio(&ratio(0, 1)), Some(ratio(27315, 100)));
        assert_eq!(UnitConverter::pi_multiply().convert_ratio(&ratio(1, 1)), None);
    }

    #[test]
    fn test_try_from_steps_validates() {
        assert!(UnitConverter::try_from_steps(vec![ConversionStep::Add(f64::NAN)]).is_err());
        assert!(UnitConverter::try_from_steps(vec![ConversionStep::Log(1.0)]).is_err());
        let c = UnitConverter::try_from_steps(vec![ConversionStep::Multiply(2.0), ConversionStep::Add(1.0)]).unwrap();
        assert_eq!(c.convert(1.0), 4.0);
        assert!(UnitConverter::try_from_steps(vec![ConversionStep::Add(0.0)]).unwrap().is_identity());
    }

    #[test]
    fn test_pow_and_root() {
        let km = UnitConverter::rational(1000, 1).unwrap();
        let km2 = km.pow(2).unwrap();
        assert_eq!(km2, UnitConverter::rational(1_000_000, 1).unwrap());
        assert_eq!(km2.root(2).unwrap(), km);
        assert_eq!(km.pow(-1).unwrap(), km.inverse());
        assert!(UnitConverter::add(1.0).pow(2).is_err());

        let two = UnitConverter::rational(2, 1).unwrap();
        let root = two.root(2).unwrap();
        assert!((root.convert(1.0) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_inexact_products_merge_to_rational() {
        let c = UnitConverter::multiply(10.0).concatenate(&UnitConverter::multiply(0.45359237));
        assert_eq!(c, UnitConverter::from_ratio(ratio(45359237, 10_000_000)));
        let tenth = UnitConverter::multiply(0.1);
        assert_eq!(tenth.concatenate(&tenth), UnitConverter::from_ratio(ratio(1, 100)));
        assert_eq!(
            UnitConverter::multiply(2.5).concatenate(&UnitConverter::multiply(4.0)),
            UnitConverter::multiply(10.0)
        );
        assert!(UnitConverter::multiply(4.0).concatenate(&UnitConverter::multiply(0.25)).is_identity());
    }

    #[test]
    fn test_root_of_inexact_power() {
        for f in [0.0254, 1609.344, 0.45359237, 2.54, 0.1, 0.3048] {
            let c = UnitConverter::multiply(f);
            for n in 2..=3 {
                let back = c.pow(n).unwrap().root(n).unwrap();
                assert!(back.concatenate(&c.inverse()).is_identity(), "{} {}: {}", f, n, back);
                assert!(c.inverse().concatenate(&back).is_identity(), "{} {}: {}", f, n, back);
            }
        }
    }

    #[test]
    fn test_signed_zero_hashes_equal() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(step: &ConversionStep) -> u64 {
            let mut hasher = DefaultHasher::new();
            step.hash(&mut hasher);
            hasher.finish()
        }

        let (pos, neg) = (ConversionStep::Multiply(0.0), ConversionStep::Multiply(-0.0));
        assert_eq!(pos, neg);
        assert_eq!(hash_of(&pos), hash_of(&neg));
        assert_eq!(hash_of(&ConversionStep::Add(0.0)), hash_of(&ConversionStep::Add(-0.0)));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(UnitConverter::add(10.0), UnitConverter::add(10.0));
        assert_ne!(UnitConverter::add(10.0), UnitConverter::multiply(10.0));
        assert_ne!(UnitConverter::multiply(10.0), UnitConverter::rational(10, 1).unwrap());
    }
}
