//! Mensura Units - Unit algebra and quantity arithmetic
//!
//! Provides units of measurement built from base units, composable
//! converters between them, and quantities that carry a value in a unit.
//!
//! Components:
//! - Converters (add, multiply, exact rational, log/exp, π scaling, compound)
//! - Dimensions and the dimensional model deciding commensurability
//! - Units (base, alternate, product, transformed, annotated)
//! - Quantity kinds (Length, Speed, Energy, ...)
//! - The standard unit catalog and the symbol registry
//! - Quantities with exact, double and decimal values

mod converter;
mod dimension;
mod kind;
pub mod model;
mod quantity;
mod registry;
mod unit;
mod units;

pub use converter::{ConversionStep, UnitConverter};
pub use dimension::{Dimension, AMOUNT, CURRENT, LENGTH, LUMINOSITY, MASS, TEMPERATURE, TIME};
pub use kind::QuantityKind;
pub use model::{DimensionalModel, StandardModel};
pub use quantity::{natural_order, Quantity};
pub use registry::UnitRegistry;
pub use unit::{Factor, Unit, UnitKind};
pub use units::{StandardUnits, UNITS};

pub use mensura_core::{MathContext, MeasureError, Number, Numeric};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_round_trips() {
        let units = [&UNITS.kilometre, &UNITS.hour, &UNITS.celsius, &UNITS.degree_angle, &UNITS.litre];
        for u in units {
            let system = u.system_unit();
            let there = u.converter_to(&system).unwrap();
            let back = system.converter_to(u).unwrap();
            assert!(back.concatenate(&there).is_identity(), "{}", u);
            assert!(there.concatenate(&back).is_identity(), "{}", u);
            assert!(u.converter_to(u).unwrap().is_identity());
        }
    }

    #[test]
    fn test_global_registration() {
        let furlong = UNITS.metre.multiply_scalar(201.168).unwrap().with_symbol("fur");
        let bound = UnitRegistry::global().register(furlong.clone()).unwrap();
        assert_eq!(bound, furlong);
        assert!(matches!(
            Unit::base("fur", Dimension::length()),
            Err(MeasureError::DuplicateSymbol { .. })
        ));
        let q = Quantity::new(1.0, bound);
        assert!((q.double_value(&UNITS.metre).unwrap() - 201.168).abs() < 1e-9);
    }
}
