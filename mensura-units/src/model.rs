//! Dimensional models
//!
//! A model reduces dimensions to their fundamental form and supplies the
//! converter that bridges two dimensions which differ only before
//! reduction. The standard model is the identity on both counts. One model
//! is active per process; it can be swapped for another at any time.

use std::fmt::Debug;
use std::sync::{Arc, LazyLock, RwLock};

use tracing::debug;

use crate::converter::UnitConverter;
use crate::dimension::Dimension;

/// Policy mapping dimensions to fundamental dimensions
pub trait DimensionalModel: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Reduced form of `dimension`
    fn fundamental_dimension(&self, dimension: &Dimension) -> Dimension {
        dimension.clone()
    }

    /// Converter from `dimension` to its fundamental dimension
    fn dimensional_transform(&self, _dimension: &Dimension) -> UnitConverter {
        UnitConverter::identity()
    }
}

/// Every dimension is already fundamental
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardModel;

impl DimensionalModel for StandardModel {
    fn name(&self) -> &str {
        "standard"
    }
}

static ACTIVE: LazyLock<RwLock<Arc<dyn DimensionalModel>>> =
    LazyLock::new(|| RwLock::new(Arc::new(StandardModel)));

/// The active model
pub fn current() -> Arc<dyn DimensionalModel> {
    ACTIVE.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Make `model` the active model, returning the one it replaces
pub fn install(model: Arc<dyn DimensionalModel>) -> Arc<dyn DimensionalModel> {
    let mut active = ACTIVE.write().unwrap_or_else(|e| e.into_inner());
    debug!(from = active.name(), to = model.name(), "installing dimensional model");
    std::mem::replace(&mut *active, model)
}

/// Restore the standard model
pub fn reset() -> Arc<dyn DimensionalModel> {
    install(Arc::new(StandardModel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::QuantityKind;
    use crate::unit::Unit;
    use mensura_core::MeasureError;

    /// Treats dimension 'Y' as 'X' scaled by 1000
    #[derive(Debug)]
    struct ScaledModel;

    impl DimensionalModel for ScaledModel {
        fn name(&self) -> &str {
            "scaled"
        }

        fn fundamental_dimension(&self, dimension: &Dimension) -> Dimension {
            let y = dimension.exponent('Y');
            let mut pairs: Vec<(char, i32)> = dimension.exponents().filter(|&(s, _)| s != 'Y').collect();
            pairs.push(('X', y));
            Dimension::from_exponents(&pairs)
        }

        fn dimensional_transform(&self, dimension: &Dimension) -> UnitConverter {
            let y = dimension.exponent('Y');
            UnitConverter::multiply(1000.0).pow(y).unwrap_or_default()
        }
    }

    #[test]
    fn test_standard_model_is_identity() {
        let model = StandardModel;
        let d = Dimension::length();
        assert_eq!(model.fundamental_dimension(&d), d);
        assert!(model.dimensional_transform(&d).is_identity());
    }

    #[test]
    fn test_custom_model_reduces() {
        let model = ScaledModel;
        let y = Dimension::base('Y');
        assert_eq!(model.fundamental_dimension(&y), Dimension::base('X'));
        assert_eq!(model.dimensional_transform(&y).convert(2.0), 2000.0);
    }

    #[test]
    fn test_install_returns_previous() {
        let previous = install(Arc::new(ScaledModel));
        assert_eq!(current().name(), "scaled");

        // Commensurable under the model, yet still not of kind X
        let y = Unit::new_base("y", Dimension::base('Y'));
        let x = Unit::new_base("x", Dimension::base('X'));
        let x_kind = QuantityKind::new("X", &[('X', 1)]);
        let compatible = y.is_compatible(&x);
        let typed = y.as_type(&x_kind);
        install(previous);

        assert!(compatible);
        assert!(matches!(typed, Err(MeasureError::IncompatibleDimension { .. })));
        assert!(x.as_type(&x_kind).is_ok());
    }
}
