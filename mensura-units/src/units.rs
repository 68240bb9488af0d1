//! Standard unit catalog - SI base and derived units plus common non-SI units
//!
//! Every catalog unit is bound in the global registry under its symbol the
//! first time the catalog is touched.

use std::sync::LazyLock;

use dashu_int::IBig;
use dashu_ratio::RBig;
use tracing::warn;

use crate::converter::UnitConverter;
use crate::dimension::Dimension;
use crate::registry::UnitRegistry;
use crate::unit::Unit;

/// Global unit catalog
pub static UNITS: LazyLock<StandardUnits> = LazyLock::new(StandardUnits::new);

/// Predefined units, by name
#[derive(Debug, Clone)]
pub struct StandardUnits {
    // SI base units
    pub metre: Unit,
    pub kilogram: Unit,
    pub second: Unit,
    pub ampere: Unit,
    pub kelvin: Unit,
    pub mole: Unit,
    pub candela: Unit,

    // Dimensionless
    pub one: Unit,
    pub radian: Unit,
    pub steradian: Unit,
    pub percent: Unit,

    // Named derived units
    pub newton: Unit,
    pub pascal: Unit,
    pub joule: Unit,
    pub watt: Unit,
    pub hertz: Unit,
    pub coulomb: Unit,
    pub volt: Unit,
    pub ohm: Unit,

    // Products
    pub square_metre: Unit,
    pub cubic_metre: Unit,
    pub metre_per_second: Unit,
    pub metre_per_square_second: Unit,

    // Non-SI and scaled units
    pub gram: Unit,
    pub kilometre: Unit,
    pub minute: Unit,
    pub hour: Unit,
    pub day: Unit,
    pub week: Unit,
    pub year: Unit,
    pub litre: Unit,
    pub celsius: Unit,
    pub degree_angle: Unit,
    pub kilometre_per_hour: Unit,
}

fn ratio(numerator: i64, denominator: i64) -> RBig {
    RBig::from(IBig::from(numerator)) / RBig::from(IBig::from(denominator))
}

/// `unit` scaled exactly by `numerator / denominator`
fn scaled(unit: &Unit, numerator: i64, denominator: i64) -> Unit {
    unit.transform(&UnitConverter::from_ratio(ratio(numerator, denominator)))
}

/// Product of powers of existing units. Catalog units are linear, so the
/// algebra cannot fail; a failure leaves the dimensionless unit in place
/// and is logged.
fn product(symbol: &str, factors: &[(&Unit, i32)]) -> Unit {
    let result = factors.iter().try_fold(Unit::one(), |acc, (unit, exponent)| {
        acc.multiply(&unit.pow(*exponent)?)
    });
    match result {
        Ok(unit) => unit,
        Err(e) => {
            warn!(symbol, error = %e, "failed to build catalog unit");
            Unit::one()
        }
    }
}

impl StandardUnits {
    fn new() -> Self {
        let metre = Unit::new_base("m", Dimension::length()).with_name("metre");
        let kilogram = Unit::new_base("kg", Dimension::mass()).with_name("kilogram");
        let second = Unit::new_base("s", Dimension::time()).with_name("second");
        let ampere = Unit::new_base("A", Dimension::current()).with_name("ampere");
        let kelvin = Unit::new_base("K", Dimension::temperature()).with_name("kelvin");
        let mole = Unit::new_base("mol", Dimension::amount()).with_name("mole");
        let candela = Unit::new_base("cd", Dimension::luminosity()).with_name("candela");

        let one = Unit::one();
        let radian = one.new_alternate("rad").with_name("radian");
        let steradian = one.new_alternate("sr").with_name("steradian");
        let percent = scaled(&one, 1, 100).with_symbol("%").with_name("percent");

        let newton = product("N", &[(&kilogram, 1), (&metre, 1), (&second, -2)]).new_alternate("N").with_name("newton");
        let pascal = product("Pa", &[(&newton, 1), (&metre, -2)]).new_alternate("Pa").with_name("pascal");
        let joule = product("J", &[(&newton, 1), (&metre, 1)]).new_alternate("J").with_name("joule");
        let watt = product("W", &[(&joule, 1), (&second, -1)]).new_alternate("W").with_name("watt");
        let hertz = product("Hz", &[(&second, -1)]).new_alternate("Hz").with_name("hertz");
        let coulomb = product("C", &[(&second, 1), (&ampere, 1)]).new_alternate("C").with_name("coulomb");
        let volt = product("V", &[(&watt, 1), (&ampere, -1)]).new_alternate("V").with_name("volt");
        let ohm = product("Ω", &[(&volt, 1), (&ampere, -1)]).new_alternate("Ω").with_name("ohm");

        let square_metre = product("m²", &[(&metre, 2)]).with_symbol("m²");
        let cubic_metre = product("m³", &[(&metre, 3)]).with_symbol("m³");
        let metre_per_second = product("m/s", &[(&metre, 1), (&second, -1)]);
        let metre_per_square_second = product("m/s²", &[(&metre, 1), (&second, -2)]).with_symbol("m/s²");

        let gram = scaled(&kilogram, 1, 1000).with_symbol("g").with_name("gram");
        let kilometre = scaled(&metre, 1000, 1).with_symbol("km").with_name("kilometre");
        let minute = scaled(&second, 60, 1).with_symbol("min").with_name("minute");
        let hour = scaled(&minute, 60, 1).with_symbol("h").with_name("hour");
        let day = scaled(&hour, 24, 1).with_symbol("d").with_name("day");
        let week = scaled(&day, 7, 1).with_symbol("week").with_name("week");
        let year = scaled(&day, 365, 1).with_symbol("year").with_name("year");
        let litre = scaled(&cubic_metre, 1, 1000).with_symbol("l").with_name("litre");
        let celsius = kelvin.shift(273.15).with_symbol("°C").with_name("Celsius");
        let degree_angle = radian
            .transform(&UnitConverter::pi_multiply().concatenate(&UnitConverter::from_ratio(ratio(1, 180))))
            .with_symbol("°")
            .with_name("degree");
        let kilometre_per_hour = product("km/h", &[(&kilometre, 1), (&hour, -1)]).with_symbol("km/h");

        let units = StandardUnits {
            metre,
            kilogram,
            second,
            ampere,
            kelvin,
            mole,
            candela,
            one,
            radian,
            steradian,
            percent,
            newton,
            pascal,
            joule,
            watt,
            hertz,
            coulomb,
            volt,
            ohm,
            square_metre,
            cubic_metre,
            metre_per_second,
            metre_per_square_second,
            gram,
            kilometre,
            minute,
            hour,
            day,
            week,
            year,
            litre,
            celsius,
            degree_angle,
            kilometre_per_hour,
        };
        units.register_all(UnitRegistry::global());
        units
    }

    /// Every catalog unit
    pub fn all(&self) -> Vec<&Unit> {
        vec![
            &self.metre,
            &self.kilogram,
            &self.second,
            &self.ampere,
            &self.kelvin,
            &self.mole,
            &self.candela,
            &self.radian,
            &self.steradian,
            &self.percent,
            &self.newton,
            &self.pascal,
            &self.joule,
            &self.watt,
            &self.hertz,
            &self.coulomb,
            &self.volt,
            &self.ohm,
            &self.square_metre,
            &self.cubic_metre,
            &self.metre_per_second,
            &self.metre_per_square_second,
            &self.gram,
            &self.kilometre,
            &self.minute,
            &self.hour,
            &self.day,
            &self.week,
            &self.year,
            &self.litre,
            &self.celsius,
            &self.degree_angle,
            &self.kilometre_per_hour,
        ]
    }

    fn register_all(&self, registry: &UnitRegistry) {
        for unit in self.all() {
            if let Err(e) = registry.register(unit.clone()) {
                warn!(unit = %unit, error = %e, "catalog unit not registered");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::QuantityKind;

    #[test]
    fn test_catalog_registered() {
        let metre = UNITS.metre.clone();
        let registry = UnitRegistry::global();
        assert_eq!(registry.get("m"), Some(metre));
        assert_eq!(registry.get("km"), Some(UNITS.kilometre.clone()));
        assert_eq!(registry.get("N"), Some(UNITS.newton.clone()));
        assert!(registry.contains("°C"));
    }

    #[test]
    fn test_time_units() {
        let c = UNITS.day.converter_to(&UNITS.hour).unwrap();
        assert_eq!(c, UnitConverter::rational(24, 1).unwrap());
        assert_eq!(UNITS.week.converter_to(&UNITS.second).unwrap().convert(1.0), 604_800.0);
        assert_eq!(UNITS.hour.system_unit(), UNITS.second);
    }

    #[test]
    fn test_celsius() {
        let to_kelvin = UNITS.celsius.converter_to(&UNITS.kelvin).unwrap();
        assert!((to_kelvin.convert(20.0) - 293.15).abs() < 1e-9);
        assert!(!to_kelvin.is_linear());
        assert!((to_kelvin.inverse().convert(0.0) + 273.15).abs() < 1e-9);
    }

    #[test]
    fn test_degree_angle() {
        let c = UNITS.degree_angle.converter_to(&UNITS.radian).unwrap();
        assert!((c.convert(90.0) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(UNITS.degree_angle.as_type(&QuantityKind::ANGLE).is_ok());
    }

    #[test]
    fn test_derived_units_are_distinct_system_units() {
        let product = UNITS.kilogram.multiply(&UNITS.metre_per_square_second).unwrap();
        assert_ne!(UNITS.newton, product);
        assert!(UNITS.newton.is_system_unit());
        assert!(UNITS.newton.converter_to(&product).unwrap().is_identity());
        assert!(UNITS.joule.as_type(&QuantityKind::ENERGY).is_ok());
        assert!(UNITS.watt.as_type(&QuantityKind::POWER).is_ok());
        assert!(UNITS.ohm.as_type(&QuantityKind::ELECTRIC_RESISTANCE).is_ok());
        assert!(UNITS.pascal.as_type(&QuantityKind::PRESSURE).is_ok());
    }

    #[test]
    fn test_scaled_units() {
        let c = UNITS.litre.converter_to(&UNITS.cubic_metre).unwrap();
        assert_eq!(c, UnitConverter::rational(1, 1000).unwrap());
        let c = UNITS.kilometre_per_hour.converter_to(&UNITS.metre_per_second).unwrap();
        assert!((c.convert(36.0) - 10.0).abs() < 1e-12);
        assert_eq!(UNITS.gram.converter_to(&UNITS.kilogram).unwrap().convert(500.0), 0.5);
        assert_eq!(UNITS.percent.converter_to(&UNITS.one).unwrap().convert(50.0), 0.5);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(UNITS.metre_per_second.to_string(), "m/s");
        assert_eq!(UNITS.square_metre.to_string(), "m²");
        assert_eq!(UNITS.hour.to_string(), "h");
        assert_eq!(UNITS.metre.name(), Some("metre"));
    }
}
