//! Unit representation and unit algebra
//!
//! A unit is an immutable, cheaply cloned handle over one of five variants.
//! Every unit derives from a system unit (coherent, unscaled) through its
//! system converter; conversions between units walk both sides to their
//! system units and, when those differ, through the dimensional model.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use dashu_int::IBig;
use dashu_ratio::RBig;
use mensura_core::MeasureError;
use tracing::trace;

use crate::converter::UnitConverter;
use crate::dimension::Dimension;
use crate::kind::QuantityKind;
use crate::model::{self, DimensionalModel};
use crate::registry::UnitRegistry;

/// A base or alternate unit raised to a non-zero integer power
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Factor {
    pub unit: Unit,
    pub exponent: i32,
}

/// Unit variants
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Independent unit of a single dimension
    Base { symbol: String, dimension: Dimension },
    /// New identity for an existing unit, e.g. `N` for `kg·m/s²`
    Alternate { parent: Unit, symbol: String },
    /// Canonical composite of atoms, sorted by symbol; empty for `ONE`
    Product { factors: Vec<Factor> },
    /// `parent` is a system unit; `converter` maps this unit onto it
    Transformed { parent: Unit, converter: UnitConverter },
    /// Delegate with a textual annotation, e.g. `m{peak}`
    Annotated { delegate: Unit, annotation: String },
}

#[derive(Debug)]
struct UnitInner {
    kind: UnitKind,
    dimension: Dimension,
    name: Option<String>,
    label: Option<String>,
}

/// Unit of measurement
///
/// Equality is structural: two units are equal when they are built the
/// same way, regardless of display name or symbol.
#[derive(Debug, Clone)]
pub struct Unit(Arc<UnitInner>);

static ONE: LazyLock<Unit> =
    LazyLock::new(|| Unit::from_kind(UnitKind::Product { factors: Vec::new() }, Dimension::none()));

impl Unit {
    // ========== Construction ==========

    fn from_kind(kind: UnitKind, dimension: Dimension) -> Unit {
        Unit(Arc::new(UnitInner { kind, dimension, name: None, label: None }))
    }

    /// The dimensionless unit
    pub fn one() -> Unit {
        ONE.clone()
    }

    /// Declare a base unit and bind its symbol in the global registry
    pub fn base(symbol: &str, dimension: Dimension) -> Result<Unit, MeasureError> {
        Unit::base_in(UnitRegistry::global(), symbol, dimension)
    }

    pub fn base_in(registry: &UnitRegistry, symbol: &str, dimension: Dimension) -> Result<Unit, MeasureError> {
        registry.register(Unit::new_base(symbol, dimension))
    }

    pub(crate) fn new_base(symbol: &str, dimension: Dimension) -> Unit {
        Unit::from_kind(UnitKind::Base { symbol: symbol.to_string(), dimension: dimension.clone() }, dimension)
    }

    /// Give this unit a distinct identity under `symbol`, bound in the
    /// global registry
    pub fn alternate(&self, symbol: &str) -> Result<Unit, MeasureError> {
        self.alternate_in(UnitRegistry::global(), symbol)
    }

    pub fn alternate_in(&self, registry: &UnitRegistry, symbol: &str) -> Result<Unit, MeasureError> {
        registry.register(self.new_alternate(symbol))
    }

    pub(crate) fn new_alternate(&self, symbol: &str) -> Unit {
        Unit::from_kind(UnitKind::Alternate { parent: self.clone(), symbol: symbol.to_string() }, self.dimension())
    }

    pub fn annotate(&self, annotation: &str) -> Unit {
        Unit::from_kind(UnitKind::Annotated { delegate: self.clone(), annotation: annotation.to_string() }, self.dimension())
    }

    /// Copy of this unit with a display name
    pub fn with_name(&self, name: &str) -> Unit {
        Unit(Arc::new(UnitInner {
            kind: self.0.kind.clone(),
            dimension: self.0.dimension.clone(),
            name: Some(name.to_string()),
            label: self.0.label.clone(),
        }))
    }

    /// Copy of this unit with a display symbol
    pub fn with_symbol(&self, symbol: &str) -> Unit {
        Unit(Arc::new(UnitInner {
            kind: self.0.kind.clone(),
            dimension: self.0.dimension.clone(),
            name: self.0.name.clone(),
            label: Some(symbol.to_string()),
        }))
    }

    /// `system` unit reached through `converter`, collapsing the identity
    fn transformed(system: Unit, converter: UnitConverter) -> Unit {
        if converter.is_identity() {
            system
        } else {
            let dimension = system.dimension();
            Unit::from_kind(UnitKind::Transformed { parent: system, converter }, dimension)
        }
    }

    /// Canonical product: equal atoms merged, zero exponents dropped,
    /// atoms sorted by symbol. Fails when an exponent overflows.
    fn product_of(factors: Vec<Factor>) -> Result<Unit, MeasureError> {
        let mut merged: Vec<Factor> = Vec::with_capacity(factors.len());
        for factor in factors {
            match merged.iter_mut().find(|f| f.unit == factor.unit) {
                Some(existing) => {
                    existing.exponent = existing
                        .exponent
                        .checked_add(factor.exponent)
                        .ok_or_else(|| exponent_overflow(&factor.unit))?;
                }
                None => merged.push(factor),
            }
        }
        merged.retain(|f| f.exponent != 0);
        merged.sort_by(|a, b| a.unit.atom_symbol().cmp(b.unit.atom_symbol()).then(b.exponent.cmp(&a.exponent)));

        Ok(match merged.as_slice() {
            [] => Unit::one(),
            [single] if single.exponent == 1 => single.unit.clone(),
            _ => {
                let dimension = merged.iter().try_fold(Dimension::none(), |d, f| {
                    d.multiply(&f.unit.dimension().pow(f.exponent)?)
                })?;
                Unit::from_kind(UnitKind::Product { factors: merged }, dimension)
            }
        })
    }

    // ========== Accessors ==========

    pub fn kind(&self) -> &UnitKind {
        &self.0.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn symbol(&self) -> Option<&str> {
        if let Some(label) = self.0.label.as_deref() {
            return Some(label);
        }
        match &self.0.kind {
            UnitKind::Base { symbol, .. } | UnitKind::Alternate { symbol, .. } => Some(symbol),
            UnitKind::Annotated { delegate, .. } => delegate.symbol(),
            UnitKind::Product { .. } | UnitKind::Transformed { .. } => None,
        }
    }

    fn atom_symbol(&self) -> &str {
        match &self.0.kind {
            UnitKind::Base { symbol, .. } | UnitKind::Alternate { symbol, .. } => symbol,
            _ => "",
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.0.dimension.clone()
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimension().is_dimensionless()
    }

    /// The coherent unit this unit is derived from
    pub fn system_unit(&self) -> Unit {
        match &self.0.kind {
            UnitKind::Base { .. } | UnitKind::Product { .. } => self.clone(),
            UnitKind::Alternate { parent, .. } => {
                if parent.system_converter().is_identity() {
                    self.clone()
                } else {
                    parent.system_unit()
                }
            }
            UnitKind::Transformed { parent, .. } => parent.clone(),
            UnitKind::Annotated { delegate, .. } => delegate.system_unit(),
        }
    }

    /// Converter from this unit to its system unit
    pub fn system_converter(&self) -> UnitConverter {
        match &self.0.kind {
            UnitKind::Base { .. } | UnitKind::Product { .. } => UnitConverter::identity(),
            UnitKind::Alternate { parent, .. } => parent.system_converter(),
            UnitKind::Transformed { converter, .. } => converter.clone(),
            UnitKind::Annotated { delegate, .. } => delegate.system_converter(),
        }
    }

    /// Annotated units never count as system units
    pub fn is_system_unit(&self) -> bool {
        !matches!(self.0.kind, UnitKind::Annotated { .. }) && self.system_converter().is_identity()
    }

    /// Atoms of this unit's system unit
    pub fn base_units(&self) -> Vec<Factor> {
        let system = self.system_unit();
        match &system.0.kind {
            UnitKind::Product { factors } => factors.clone(),
            _ => vec![Factor { unit: system.clone(), exponent: 1 }],
        }
    }

    /// System atoms plus the linear scale from this unit onto them
    fn decompose(&self) -> Result<(Vec<Factor>, UnitConverter), MeasureError> {
        let converter = self.system_converter();
        if !converter.is_linear() {
            return Err(MeasureError::arithmetic(format!(
                "unit {} has a non-linear converter and cannot be combined",
                self
            )));
        }
        Ok((self.base_units(), converter))
    }

    // ========== Algebra ==========

    pub fn multiply(&self, other: &Unit) -> Result<Unit, MeasureError> {
        if *other == *ONE {
            return Ok(self.clone());
        }
        if *self == *ONE {
            return Ok(other.clone());
        }
        let (mut atoms, this_scale) = self.decompose()?;
        let (other_atoms, other_scale) = other.decompose()?;
        atoms.extend(other_atoms);
        Ok(Unit::transformed(Unit::product_of(atoms)?, this_scale.concatenate(&other_scale)))
    }

    pub fn divide(&self, other: &Unit) -> Result<Unit, MeasureError> {
        if *other == *ONE {
            return Ok(self.clone());
        }
        self.multiply(&other.inverse()?)
    }

    pub fn inverse(&self) -> Result<Unit, MeasureError> {
        self.pow(-1)
    }

    pub fn pow(&self, n: i32) -> Result<Unit, MeasureError> {
        match n {
            0 => Ok(Unit::one()),
            1 => Ok(self.clone()),
            _ => {
                let (atoms, scale) = self.decompose()?;
                let atoms = atoms
                    .into_iter()
                    .map(|f| match f.exponent.checked_mul(n) {
                        Some(exponent) => Ok(Factor { unit: f.unit, exponent }),
                        None => Err(exponent_overflow(&f.unit)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Unit::transformed(Unit::product_of(atoms)?, scale.pow(n)?))
            }
        }
    }

    /// Root of order `n`. Exponents stay integers, so every exponent must
    /// be divisible by `n`.
    pub fn root(&self, n: i32) -> Result<Unit, MeasureError> {
        if n == 0 {
            return Err(MeasureError::arithmetic("root of order zero"));
        }
        if n < 0 {
            let order = n.checked_neg().ok_or_else(|| MeasureError::arithmetic(format!("root of order {}", n)))?;
            return Unit::one().divide(&self.root(order)?);
        }
        if n == 1 {
            return Ok(self.clone());
        }
        let (atoms, scale) = self.decompose()?;
        if atoms.iter().any(|f| f.exponent % n != 0) {
            return Err(MeasureError::FractionalExponent { unit: self.to_string(), order: n });
        }
        let atoms = atoms
            .into_iter()
            .map(|f| Factor { unit: f.unit, exponent: f.exponent / n })
            .collect();
        Ok(Unit::transformed(Unit::product_of(atoms)?, scale.root(n)?))
    }

    /// Unit whose values, converted by `operation`, are values of this unit
    pub fn transform(&self, operation: &UnitConverter) -> Unit {
        Unit::transformed(self.system_unit(), self.system_converter().concatenate(operation))
    }

    /// Unit offset from this one, e.g. `K.shift(273.15)` is °C
    pub fn shift(&self, offset: f64) -> Unit {
        self.transform(&UnitConverter::add(offset))
    }

    /// Unit `factor` times this one; integral factors scale exactly
    pub fn multiply_scalar(&self, factor: f64) -> Result<Unit, MeasureError> {
        if factor == 0.0 {
            return Err(MeasureError::arithmetic(format!("multiplication of unit {} by zero", self)));
        }
        if factor == 1.0 {
            return Ok(self.clone());
        }
        Ok(self.transform(&scalar_converter(factor)))
    }

    pub fn divide_scalar(&self, divisor: f64) -> Result<Unit, MeasureError> {
        if divisor == 0.0 {
            return Err(MeasureError::arithmetic(format!("division of unit {} by zero", self)));
        }
        if divisor == 1.0 {
            return Ok(self.clone());
        }
        Ok(self.transform(&scalar_converter(divisor).inverse()))
    }

    pub fn multiply_ratio(&self, ratio: &RBig) -> Result<Unit, MeasureError> {
        if *ratio == RBig::ZERO {
            return Err(MeasureError::arithmetic(format!("multiplication of unit {} by zero", self)));
        }
        Ok(self.transform(&UnitConverter::from_ratio(ratio.clone())))
    }

    /// Assert this unit measures quantities of `kind`: the dimensions must
    /// match exactly, whatever the dimensional model
    pub fn as_type(&self, kind: &QuantityKind) -> Result<Unit, MeasureError> {
        let expected = kind.dimension();
        let actual = self.dimension();
        if expected != actual {
            return Err(MeasureError::IncompatibleDimension {
                unit: self.to_string(),
                kind: kind.name.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(self.clone())
    }

    // ========== Conversion ==========

    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.is_compatible_in(other, model::current().as_ref())
    }

    pub fn is_compatible_in(&self, other: &Unit, model: &dyn DimensionalModel) -> bool {
        if self == other || self.system_unit() == other.system_unit() {
            return true;
        }
        let (a, b) = (self.dimension(), other.dimension());
        a == b || model.fundamental_dimension(&a) == model.fundamental_dimension(&b)
    }

    /// Converter from this unit to a unit of the same dimension
    pub fn converter_to(&self, other: &Unit) -> Result<UnitConverter, MeasureError> {
        if self == other {
            return Ok(UnitConverter::identity());
        }
        if self.system_unit() == other.system_unit() {
            return Ok(other.system_converter().inverse().concatenate(&self.system_converter()));
        }
        self.converter_to_any(other).map_err(|e| match e {
            MeasureError::Incommensurable { from, to, .. } => MeasureError::IncompatibleUnits { from, to },
            other => other,
        })
    }

    /// Converter from this unit to any commensurable unit, under the
    /// active dimensional model
    pub fn converter_to_any(&self, other: &Unit) -> Result<UnitConverter, MeasureError> {
        self.converter_to_any_in(other, model::current().as_ref())
    }

    pub fn converter_to_any_in(&self, other: &Unit, model: &dyn DimensionalModel) -> Result<UnitConverter, MeasureError> {
        if !self.is_compatible_in(other, model) {
            return Err(MeasureError::Incommensurable {
                from: self.to_string(),
                to: other.to_string(),
                from_dim: self.dimension().to_string(),
                to_dim: other.dimension().to_string(),
            });
        }
        if self == other {
            return Ok(UnitConverter::identity());
        }
        let (this_system, that_system) = (self.system_unit(), other.system_unit());
        if this_system == that_system {
            return Ok(other.system_converter().inverse().concatenate(&self.system_converter()));
        }
        trace!(from = %self, to = %other, model = model.name(), "converting through fundamental dimensions");
        let this_to_dim = model
            .dimensional_transform(&this_system.dimension())
            .concatenate(&self.system_converter());
        let that_to_dim = model
            .dimensional_transform(&that_system.dimension())
            .concatenate(&other.system_converter());
        Ok(that_to_dim.inverse().concatenate(&this_to_dim))
    }

    /// Display order: by name, then symbol, absent before present
    pub fn label_order(&self, other: &Unit) -> Ordering {
        self.name()
            .cmp(&other.name())
            .then_with(|| self.symbol().cmp(&other.symbol()))
    }
}

fn exponent_overflow(unit: &Unit) -> MeasureError {
    MeasureError::arithmetic(format!("exponent of {} overflows", unit))
}

fn scalar_converter(factor: f64) -> UnitConverter {
    // Integral doubles below 2^53 convert to i64 without loss
    if factor.fract() == 0.0 && factor.abs() < 9_007_199_254_740_992.0 {
        UnitConverter::from_ratio(RBig::from(IBig::from(factor as i64)))
    } else {
        UnitConverter::multiply(factor)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.kind == other.0.kind
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.kind.hash(state);
    }
}

fn power_text(unit: &Unit, exponent: i32) -> String {
    if exponent == 1 {
        unit.to_string()
    } else {
        format!("{}^{}", unit, exponent)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.0.label {
            return write!(f, "{}", label);
        }
        match &self.0.kind {
            UnitKind::Base { symbol, .. } | UnitKind::Alternate { symbol, .. } => write!(f, "{}", symbol),
            UnitKind::Annotated { delegate, annotation } => write!(f, "{}{{{}}}", delegate, annotation),
            UnitKind::Transformed { parent, converter } => write!(f, "{}[{}]", parent, converter),
            UnitKind::Product { factors } => {
                if factors.is_empty() {
                    return write!(f, "one");
                }
                let numerator: Vec<String> = factors
                    .iter()
                    .filter(|x| x.exponent > 0)
                    .map(|x| power_text(&x.unit, x.exponent))
                    .collect();
                let denominator: Vec<String> = factors
                    .iter()
                    .filter(|x| x.exponent < 0)
                    .map(|x| power_text(&x.unit, -x.exponent))
                    .collect();
                let top = if numerator.is_empty() { "1".to_string() } else { numerator.join("·") };
                match denominator.len() {
                    0 => write!(f, "{}", top),
                    1 => write!(f, "{}/{}", top, denominator[0]),
                    _ => write!(f, "{}/({})", top, denominator.join("·")),
                }
            }
        }
    }
}
