//! Reference wavelengths expressed as "wave" units.
//!
//! A wave unit is a length unit whose size is one wavelength of some light
//! source. It renders as `λ` so that OPD-like data can be labelled in waves
//! without committing to a particular source in the label text.

use crate::units::{BaseUnit, Dimension, Unit};

/// CO₂ laser line, µm.
pub const CO2_UM: f64 = 10.6;
/// Nd:YAG fundamental, µm.
pub const NIR_UM: f64 = 1.064;
/// Telecom short-wave infrared, µm.
pub const SWIR_UM: f64 = 1.55;
/// Mid-wave infrared band center, µm.
pub const MWIR_UM: f64 = 4.0;
/// Long-wave infrared band center, µm.
pub const LWIR_UM: f64 = 10.0;
/// Helium-neon laser line, µm.
pub const HENE_UM: f64 = 0.6328;
/// Fraunhofer F line (hydrogen), µm.
pub const F_LINE_UM: f64 = 0.4861;
/// Fraunhofer d line (helium), µm.
pub const D_LINE_UM: f64 = 0.5876;
/// Fraunhofer C line (hydrogen), µm.
pub const C_LINE_UM: f64 = 0.6563;
/// Middle of the visible band, µm.
pub const VISIBLE_MID_UM: f64 = 0.55;

const NAMED: [(&str, f64); 10] = [
    ("CO2", CO2_UM),
    ("NIR", NIR_UM),
    ("SWIR", SWIR_UM),
    ("MWIR", MWIR_UM),
    ("LWIR", LWIR_UM),
    ("HeNe", HENE_UM),
    ("Fline", F_LINE_UM),
    ("dline", D_LINE_UM),
    ("Cline", C_LINE_UM),
    ("visible_mid", VISIBLE_MID_UM),
];

/// Make a wave unit for a wavelength given in microns.
pub fn mkwvl(microns: f64) -> Unit {
    BaseUnit::new("wave", Dimension::Length, microns * 1e-6)
        .with_unicode("λ")
        .with_latex(r"\lambda")
        .into()
}

pub fn co2() -> Unit {
    mkwvl(CO2_UM)
}

pub fn nir() -> Unit {
    mkwvl(NIR_UM)
}

pub fn swir() -> Unit {
    mkwvl(SWIR_UM)
}

pub fn mwir() -> Unit {
    mkwvl(MWIR_UM)
}

pub fn lwir() -> Unit {
    mkwvl(LWIR_UM)
}

pub fn hene() -> Unit {
    mkwvl(HENE_UM)
}

pub fn f_line() -> Unit {
    mkwvl(F_LINE_UM)
}

pub fn d_line() -> Unit {
    mkwvl(D_LINE_UM)
}

pub fn c_line() -> Unit {
    mkwvl(C_LINE_UM)
}

pub fn visible_mid() -> Unit {
    mkwvl(VISIBLE_MID_UM)
}

/// Look up a named wavelength (case-insensitive), e.g. `"HeNe"` or `"co2"`.
pub fn named(name: &str) -> Option<Unit> {
    NAMED
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map(|&(_, microns)| mkwvl(microns))
}

/// Names accepted by [`named`].
pub fn names() -> impl Iterator<Item = &'static str> {
    NAMED.iter().map(|&(n, _)| n)
}

/// Wavelength of a wave unit in microns, if the unit is one.
pub fn microns(unit: &Unit) -> Option<f64> {
    let mut factors = unit.factors();
    match (factors.next(), factors.next()) {
        (Some((base, 1)), None) if base.name == "wave" => Some(base.si_scale * 1e6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Notation;

    #[test]
    fn test_wave_unit_renders_lambda() {
        let w = hene();
        assert_eq!(w.to_string_in(Notation::Unicode), "λ");
        assert_eq!(w.to_string_in(Notation::LatexInline), r"$\mathrm{\lambda}$");
    }

    #[test]
    fn test_distinct_sources_are_distinct_units() {
        assert_ne!(hene(), co2());
        assert_eq!(hene(), mkwvl(0.6328));
    }

    #[test]
    fn test_named_lookup() {
        assert_eq!(named("hene"), Some(hene()));
        assert_eq!(named("CO2"), Some(co2()));
        assert!(named("sodium").is_none());
        assert!((microns(&hene()).unwrap() - HENE_UM).abs() < 1e-12);
        assert!(microns(&crate::units::mm()).is_none());
    }
}
