//! Symbol-to-unit registry
//!
//! Binding a symbol is an atomic check-and-insert: re-registering an equal
//! unit returns the unit already bound, while binding a different unit to a
//! taken symbol fails without touching the registry.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use mensura_core::MeasureError;
use tracing::debug;

use crate::unit::Unit;

static GLOBAL: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::new);

/// Registry of units by symbol
#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: RwLock<HashMap<String, Unit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        UnitRegistry::default()
    }

    /// Process-wide registry used by [`Unit::base`] and [`Unit::alternate`]
    pub fn global() -> &'static UnitRegistry {
        &GLOBAL
    }

    /// Bind `unit` under its symbol (its display form when it has none)
    pub fn register(&self, unit: Unit) -> Result<Unit, MeasureError> {
        let symbol = unit.to_string();
        let mut units = self.units.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = units.get(&symbol) {
            if *existing == unit {
                return Ok(existing.clone());
            }
            let existing = format!("{} ({})", existing, existing.dimension());
            debug!(symbol = %symbol, existing = %existing, "rejected duplicate unit symbol");
            return Err(MeasureError::DuplicateSymbol { symbol, existing });
        }
        debug!(symbol = %symbol, dimension = %unit.dimension(), "registered unit");
        units.insert(symbol, unit.clone());
        Ok(unit)
    }

    /// Get a unit by symbol
    pub fn get(&self, symbol: &str) -> Option<Unit> {
        self.units.read().unwrap_or_else(|e| e.into_inner()).get(symbol).cloned()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.units.read().unwrap_or_else(|e| e.into_inner()).contains_key(symbol)
    }

    /// Get all unit symbols, sorted
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .units
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.units.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Dimension;

    #[test]
    fn test_register_and_get() {
        let registry = UnitRegistry::new();
        assert!(registry.is_empty());
        let m = Unit::base_in(&registry, "m", Dimension::length()).unwrap();
        assert_eq!(registry.get("m"), Some(m));
        assert!(registry.contains("m"));
        assert!(registry.get("ft").is_none());
    }

    #[test]
    fn test_equal_registration_is_idempotent() {
        let registry = UnitRegistry::new();
        Unit::base_in(&registry, "s", Dimension::time()).unwrap();
        Unit::base_in(&registry, "s", Dimension::time()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let registry = UnitRegistry::new();
        let m = Unit::base_in(&registry, "m", Dimension::length()).unwrap();
        let err = Unit::base_in(&registry, "m", Dimension::mass()).unwrap_err();
        assert!(matches!(err, MeasureError::DuplicateSymbol { ref symbol, .. } if symbol == "m"));
        assert_eq!(registry.get("m"), Some(m));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_alternate_registration() {
        let registry = UnitRegistry::new();
        let rad = Unit::one().alternate_in(&registry, "rad").unwrap();
        assert!(rad.is_dimensionless());
        let err = Unit::base_in(&registry, "rad", Dimension::none()).unwrap_err();
        assert!(matches!(err, MeasureError::DuplicateSymbol { .. }));
        assert_eq!(registry.symbols(), vec!["rad".to_string()]);
    }
}
