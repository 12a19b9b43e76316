//! Rendering of units and quantities into display strings.

use crate::error::{ConfError, ConfResult};
use lib_types::{Notation, Quantity, Unit};

/// A value handed to [`format_unit`].
///
/// Only units and quantities carry a unit; the other variants exist so that
/// loosely typed callers (settings values, CLI arguments) get an error
/// instead of silently rendering nothing.
#[derive(Clone, Copy, Debug)]
pub enum Formattable<'a> {
    Unit(&'a Unit),
    Quantity(&'a Quantity),
    Number(f64),
    Text(&'a str),
}

impl<'a> From<&'a Unit> for Formattable<'a> {
    fn from(unit: &'a Unit) -> Self {
        Self::Unit(unit)
    }
}

impl<'a> From<&'a Quantity> for Formattable<'a> {
    fn from(quantity: &'a Quantity) -> Self {
        Self::Quantity(quantity)
    }
}

impl From<f64> for Formattable<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<'a> From<&'a str> for Formattable<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

/// Format a unit, or the unit of a quantity, in the given notation.
pub fn format_unit<'a>(value: impl Into<Formattable<'a>>, notation: Notation) -> ConfResult<String> {
    match value.into() {
        Formattable::Unit(unit) => Ok(unit.to_string_in(notation)),
        Formattable::Quantity(quantity) => Ok(quantity.unit.to_string_in(notation)),
        Formattable::Number(_) | Formattable::Text(_) => Err(ConfError::invalid_argument(
            "must be a Unit or Quantity instance.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::units::{mm, nm};

    #[test]
    fn test_unit_and_quantity_render_alike() {
        let inv_mm = mm().recip();
        let q = inv_mm.quantity(42.0);

        for notation in Notation::ALL {
            assert_eq!(
                format_unit(&inv_mm, notation).unwrap(),
                format_unit(&q, notation).unwrap()
            );
        }
        assert_eq!(format_unit(&nm(), Notation::Generic).unwrap(), "nm");
    }

    #[test]
    fn test_non_unit_values_rejected() {
        let err = format_unit(3.5, Notation::Unicode).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "must be a Unit or Quantity instance.");

        assert!(format_unit("mm", Notation::Unicode).unwrap_err().is_invalid_argument());
    }
}
