//! Resolution of loosely typed unit tokens into units.

use crate::error::{ConfError, ConfResult};
use lib_types::{Unit, UnitRegistry};
use once_cell::sync::Lazy;

/// Aliases that stand for the current reference wavelength.
pub const WAVE_ALIASES: [&str; 3] = ["waves", "wave", "λ"];

/// A unit, or the name of one.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitToken {
    Unit(Unit),
    Name(String),
}

impl From<Unit> for UnitToken {
    fn from(unit: Unit) -> Self {
        Self::Unit(unit)
    }
}

impl From<&Unit> for UnitToken {
    fn from(unit: &Unit) -> Self {
        Self::Unit(unit.clone())
    }
}

impl From<&str> for UnitToken {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for UnitToken {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

static REGISTRY: Lazy<UnitRegistry> = Lazy::new(UnitRegistry::standard);

/// The standard registry, built once.
pub fn standard_registry() -> &'static UnitRegistry {
    &REGISTRY
}

/// True if `name` is one of the wave aliases, compared case-insensitively.
pub fn is_wave_alias(name: &str) -> bool {
    let lowered = name.to_lowercase();
    WAVE_ALIASES.iter().any(|alias| *alias == lowered)
}

/// Resolve a unit token against the standard registry.
///
/// Units pass through unchanged. Names equal to `waves`, `wave` or `λ`
/// (any case) resolve to `wavelength`; any other name is looked up in the
/// registry.
pub fn resolve_unit(token: impl Into<UnitToken>, wavelength: &Unit) -> ConfResult<Unit> {
    resolve_unit_in(standard_registry(), token, wavelength)
}

/// Resolve a unit token against a caller-supplied registry.
pub fn resolve_unit_in(
    registry: &UnitRegistry,
    token: impl Into<UnitToken>,
    wavelength: &Unit,
) -> ConfResult<Unit> {
    match token.into() {
        UnitToken::Unit(unit) => Ok(unit),
        UnitToken::Name(name) if is_wave_alias(&name) => Ok(wavelength.clone()),
        UnitToken::Name(name) => registry
            .get(&name)
            .cloned()
            .ok_or(ConfError::UnresolvedUnitName(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::units::{deg, mm, nm, BaseUnit, Dimension};
    use lib_types::wavelengths::{co2, hene};

    #[test]
    fn test_wave_aliases_resolve_to_wavelength() {
        for w in [hene(), co2(), nm()] {
            for alias in ["waves", "wave", "λ", "WAVES", "Wave", "Λ"] {
                assert_eq!(resolve_unit(alias, &w).unwrap(), w);
            }
        }
    }

    #[test]
    fn test_unit_passes_through() {
        let custom: Unit = BaseUnit::new("furlong", Dimension::Length, 201.168).into();
        assert_eq!(resolve_unit(&custom, &hene()).unwrap(), custom);
        assert_eq!(resolve_unit(mm(), &co2()).unwrap(), mm());
    }

    #[test]
    fn test_named_lookup() {
        assert_eq!(resolve_unit("mm", &hene()).unwrap(), mm());
        assert_eq!(resolve_unit("deg", &hene()).unwrap(), deg());
    }

    #[test]
    fn test_unknown_name_is_unresolved() {
        let err = resolve_unit("parsec-ish", &hene()).unwrap_err();
        assert!(matches!(err, ConfError::UnresolvedUnitName(ref n) if n == "parsec-ish"));

        // Registry names are case-sensitive; only the wave aliases are not.
        assert!(resolve_unit("MM", &hene()).is_err());
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = UnitRegistry::new();
        registry.register("mil", BaseUnit::new("mil", Dimension::Length, 25.4e-6).into());

        assert!(resolve_unit_in(&registry, "mil", &hene()).is_ok());
        assert!(resolve_unit_in(&registry, "mm", &hene()).is_err());
        assert_eq!(resolve_unit_in(&registry, "wave", &hene()).unwrap(), hene());
    }
}
