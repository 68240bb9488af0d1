//! Dimensional analysis types
//!
//! A dimension maps base-dimension symbols to integer exponents. The seven
//! SI base quantities use the symbols below; models may introduce others.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use mensura_core::MeasureError;

/// Base-dimension symbols for the 7 SI base quantities
pub const LENGTH: char = 'L';
pub const MASS: char = 'M';
pub const TIME: char = 'T';
pub const CURRENT: char = 'I';
pub const TEMPERATURE: char = 'Θ';
pub const AMOUNT: char = 'N';
pub const LUMINOSITY: char = 'J';

const SI_ORDER: [char; 7] = [LENGTH, MASS, TIME, CURRENT, TEMPERATURE, AMOUNT, LUMINOSITY];

/// Represents the dimensions of a physical quantity as exponents of base
/// dimensions. Zero exponents are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    exponents: BTreeMap<char, i32>,
}

impl Dimension {
    /// Dimensionless quantity (no exponents)
    pub fn none() -> Self {
        Dimension::default()
    }

    /// A single base dimension
    pub fn base(symbol: char) -> Self {
        Dimension::from_exponents(&[(symbol, 1)])
    }

    /// Build from `(symbol, exponent)` pairs; repeated symbols accumulate
    pub fn from_exponents(pairs: &[(char, i32)]) -> Self {
        let mut exponents = BTreeMap::new();
        for &(symbol, exp) in pairs {
            *exponents.entry(symbol).or_insert(0) += exp;
        }
        exponents.retain(|_, e| *e != 0);
        Dimension { exponents }
    }

    pub fn length() -> Self { Dimension::base(LENGTH) }
    pub fn mass() -> Self { Dimension::base(MASS) }
    pub fn time() -> Self { Dimension::base(TIME) }
    pub fn current() -> Self { Dimension::base(CURRENT) }
    pub fn temperature() -> Self { Dimension::base(TEMPERATURE) }
    pub fn amount() -> Self { Dimension::base(AMOUNT) }
    pub fn luminosity() -> Self { Dimension::base(LUMINOSITY) }

    /// Exponent of a base dimension (0 when absent)
    pub fn exponent(&self, symbol: char) -> i32 {
        self.exponents.get(&symbol).copied().unwrap_or(0)
    }

    /// Non-zero exponents in symbol order
    pub fn exponents(&self) -> impl Iterator<Item = (char, i32)> + '_ {
        self.exponents.iter().map(|(&s, &e)| (s, e))
    }

    /// Check if this is a dimensionless quantity
    pub fn is_dimensionless(&self) -> bool {
        self.exponents.is_empty()
    }

    /// Multiply dimensions (add exponents)
    pub fn multiply(&self, other: &Dimension) -> Result<Dimension, MeasureError> {
        let mut exponents = self.exponents.clone();
        for (&symbol, &exp) in &other.exponents {
            let entry = exponents.entry(symbol).or_insert(0);
            *entry = entry.checked_add(exp).ok_or_else(|| overflow(self, "·", other))?;
        }
        exponents.retain(|_, e| *e != 0);
        Ok(Dimension { exponents })
    }

    /// Divide dimensions (subtract exponents)
    pub fn divide(&self, other: &Dimension) -> Result<Dimension, MeasureError> {
        self.multiply(&other.invert()?)
    }

    /// Raise to integer power (multiply exponents)
    pub fn pow(&self, n: i32) -> Result<Dimension, MeasureError> {
        if n == 0 {
            return Ok(Dimension::none());
        }
        let exponents = self
            .exponents
            .iter()
            .map(|(&s, &e)| e.checked_mul(n).map(|e| (s, e)))
            .collect::<Option<BTreeMap<char, i32>>>()
            .ok_or_else(|| overflow(self, "^", &n))?;
        Ok(Dimension { exponents })
    }

    /// Root of order `n` (divide exponents).
    ///
    /// Only integer exponents are supported, so every exponent must be
    /// divisible by `n`.
    pub fn root(&self, n: i32) -> Result<Dimension, MeasureError> {
        if n == 0 {
            return Err(MeasureError::arithmetic("root of order zero"));
        }
        if self.exponents.values().any(|e| e.checked_rem(n) != Some(0)) {
            return Err(MeasureError::FractionalExponent { unit: self.to_string(), order: n });
        }
        let exponents = self
            .exponents
            .iter()
            .map(|(&s, &e)| e.checked_div(n).map(|e| (s, e)))
            .collect::<Option<BTreeMap<char, i32>>>()
            .ok_or_else(|| MeasureError::arithmetic(format!("root of order {} of {}", n, self)))?;
        Ok(Dimension { exponents })
    }

    /// Invert dimensions (negate exponents)
    pub fn invert(&self) -> Result<Dimension, MeasureError> {
        self.pow(-1)
    }
}

fn overflow(dimension: &Dimension, op: &str, operand: &dyn fmt::Display) -> MeasureError {
    MeasureError::arithmetic(format!("exponent overflow in ({}){}{}", dimension, op, operand))
}

fn display_rank(symbol: char) -> (usize, char) {
    let rank = SI_ORDER.iter().position(|&s| s == symbol).unwrap_or(SI_ORDER.len());
    (rank, symbol)
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponents.is_empty() {
            return write!(f, "1");
        }

        let mut ordered: Vec<(char, i32)> = self.exponents().collect();
        ordered.sort_by_key(|&(s, _)| display_rank(s));

        let parts: Vec<String> = ordered
            .into_iter()
            .map(|(s, e)| if e == 1 { s.to_string() } else { format!("{}^{}", s, e) })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensionless() {
        assert!(Dimension::none().is_dimensionless());
        assert!(!Dimension::length().is_dimensionless());
    }

    #[test]
    fn test_multiply_cancels() {
        let velocity = Dimension::length().divide(&Dimension::time()).unwrap();
        assert_eq!(velocity, Dimension::from_exponents(&[(LENGTH, 1), (TIME, -1)]));
        assert_eq!(velocity.multiply(&Dimension::time()).unwrap(), Dimension::length());
        assert!(velocity.divide(&velocity).unwrap().is_dimensionless());
    }

    #[test]
    fn test_force() {
        let acceleration = Dimension::from_exponents(&[(LENGTH, 1), (TIME, -2)]);
        let force = Dimension::mass().multiply(&acceleration).unwrap();
        assert_eq!(force.exponent(MASS), 1);
        assert_eq!(force.exponent(LENGTH), 1);
        assert_eq!(force.exponent(TIME), -2);
        assert_eq!(force.exponent(CURRENT), 0);
    }

    #[test]
    fn test_pow_and_root() {
        let area = Dimension::length().pow(2).unwrap();
        assert_eq!(area.exponent(LENGTH), 2);
        assert_eq!(area.root(2).unwrap(), Dimension::length());
        assert!(Dimension::length().pow(0).unwrap().is_dimensionless());
    }

    #[test]
    fn test_root_rejects_fractional_exponents() {
        let err = Dimension::length().root(2).unwrap_err();
        assert!(matches!(err, MeasureError::FractionalExponent { order: 2, .. }));
        assert!(matches!(Dimension::length().root(0), Err(MeasureError::Arithmetic(_))));
    }

    #[test]
    fn test_exponent_overflow_is_an_error() {
        let big = Dimension::length().pow(i32::MAX).unwrap();
        assert!(matches!(big.pow(2), Err(MeasureError::Arithmetic(_))));
        assert!(matches!(big.multiply(&Dimension::length()), Err(MeasureError::Arithmetic(_))));
        let min = Dimension::from_exponents(&[(LENGTH, i32::MIN)]);
        assert!(matches!(min.invert(), Err(MeasureError::Arithmetic(_))));
        assert!(min.root(-1).is_err());
    }

    #[test]
    fn test_custom_base_symbols() {
        let info = Dimension::base('B');
        assert_eq!(info.multiply(&info).unwrap().exponent('B'), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Dimension::none()), "1");
        assert_eq!(format!("{}", Dimension::length()), "L");
        let velocity = Dimension::time().invert().unwrap().multiply(&Dimension::length()).unwrap();
        assert_eq!(format!("{}", velocity), "L T^-1");
        let energy = Dimension::from_exponents(&[(TIME, -2), (MASS, 1), (LENGTH, 2)]);
        assert_eq!(format!("{}", energy), "L^2 M T^-2");
    }
}
