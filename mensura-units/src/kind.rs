//! Quantity kinds
//!
//! A quantity kind names what a unit measures (length, speed, energy) by
//! its dimension. Kinds are used to assert the dimension of units and
//! quantities, e.g. that `m/s` measures speed.

use serde::Serialize;

use crate::dimension::{Dimension, AMOUNT, CURRENT, LENGTH, LUMINOSITY, MASS, TEMPERATURE, TIME};

/// A named dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct QuantityKind {
    pub name: &'static str,
    exponents: &'static [(char, i32)],
}

impl QuantityKind {
    pub const DIMENSIONLESS: QuantityKind = QuantityKind::new("Dimensionless", &[]);
    pub const LENGTH: QuantityKind = QuantityKind::new("Length", &[(LENGTH, 1)]);
    pub const MASS: QuantityKind = QuantityKind::new("Mass", &[(MASS, 1)]);
    pub const TIME: QuantityKind = QuantityKind::new("Time", &[(TIME, 1)]);
    pub const ELECTRIC_CURRENT: QuantityKind = QuantityKind::new("ElectricCurrent", &[(CURRENT, 1)]);
    pub const TEMPERATURE: QuantityKind = QuantityKind::new("Temperature", &[(TEMPERATURE, 1)]);
    pub const AMOUNT_OF_SUBSTANCE: QuantityKind = QuantityKind::new("AmountOfSubstance", &[(AMOUNT, 1)]);
    pub const LUMINOUS_INTENSITY: QuantityKind = QuantityKind::new("LuminousIntensity", &[(LUMINOSITY, 1)]);
    pub const ANGLE: QuantityKind = QuantityKind::new("Angle", &[]);
    pub const AREA: QuantityKind = QuantityKind::new("Area", &[(LENGTH, 2)]);
    pub const VOLUME: QuantityKind = QuantityKind::new("Volume", &[(LENGTH, 3)]);
    pub const SPEED: QuantityKind = QuantityKind::new("Speed", &[(LENGTH, 1), (TIME, -1)]);
    pub const ACCELERATION: QuantityKind = QuantityKind::new("Acceleration", &[(LENGTH, 1), (TIME, -2)]);
    pub const FORCE: QuantityKind = QuantityKind::new("Force", &[(LENGTH, 1), (MASS, 1), (TIME, -2)]);
    pub const ENERGY: QuantityKind = QuantityKind::new("Energy", &[(LENGTH, 2), (MASS, 1), (TIME, -2)]);
    pub const POWER: QuantityKind = QuantityKind::new("Power", &[(LENGTH, 2), (MASS, 1), (TIME, -3)]);
    pub const PRESSURE: QuantityKind = QuantityKind::new("Pressure", &[(LENGTH, -1), (MASS, 1), (TIME, -2)]);
    pub const FREQUENCY: QuantityKind = QuantityKind::new("Frequency", &[(TIME, -1)]);
    pub const ELECTRIC_CHARGE: QuantityKind = QuantityKind::new("ElectricCharge", &[(TIME, 1), (CURRENT, 1)]);
    pub const ELECTRIC_POTENTIAL: QuantityKind =
        QuantityKind::new("ElectricPotential", &[(LENGTH, 2), (MASS, 1), (TIME, -3), (CURRENT, -1)]);
    pub const ELECTRIC_RESISTANCE: QuantityKind =
        QuantityKind::new("ElectricResistance", &[(LENGTH, 2), (MASS, 1), (TIME, -3), (CURRENT, -2)]);

    /// Every predefined kind. Dimensionless precedes Angle, so lookups by
    /// dimension resolve to it.
    pub const ALL: &'static [QuantityKind] = &[
        QuantityKind::DIMENSIONLESS,
        QuantityKind::LENGTH,
        QuantityKind::MASS,
        QuantityKind::TIME,
        QuantityKind::ELECTRIC_CURRENT,
        QuantityKind::TEMPERATURE,
        QuantityKind::AMOUNT_OF_SUBSTANCE,
        QuantityKind::LUMINOUS_INTENSITY,
        QuantityKind::ANGLE,
        QuantityKind::AREA,
        QuantityKind::VOLUME,
        QuantityKind::SPEED,
        QuantityKind::ACCELERATION,
        QuantityKind::FORCE,
        QuantityKind::ENERGY,
        QuantityKind::POWER,
        QuantityKind::PRESSURE,
        QuantityKind::FREQUENCY,
        QuantityKind::ELECTRIC_CHARGE,
        QuantityKind::ELECTRIC_POTENTIAL,
        QuantityKind::ELECTRIC_RESISTANCE,
    ];

    /// Declare a kind; further kinds can be defined outside this crate
    pub const fn new(name: &'static str, exponents: &'static [(char, i32)]) -> Self {
        QuantityKind { name, exponents }
    }

    pub fn dimension(&self) -> Dimension {
        Dimension::from_exponents(self.exponents)
    }

    /// First predefined kind with the given dimension
    pub fn of_dimension(dimension: &Dimension) -> Option<&'static QuantityKind> {
        QuantityKind::ALL.iter().find(|k| k.dimension() == *dimension)
    }
}
