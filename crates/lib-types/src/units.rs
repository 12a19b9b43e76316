//! Physical units with named registry lookup and notation-aware rendering.
//!
//! A [`Unit`] is a product of named [`BaseUnit`]s raised to integer powers.
//! Units are plain immutable values: combining them (`mm / s`, `mm.recip()`)
//! produces new units, and equality is structural after normalization, so
//! `1 / mm` and `mm^-1` compare equal.
//!
//! Rendering is driven by [`Notation`]; each base unit carries its own
//! spelling per notation plus optional verbatim overrides (the `rel` unit
//! renders as `Rel 1.0` in LaTeX and Unicode).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;
use thiserror::Error;

/// Physical dimension of a base unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Length,
    Angle,
    Time,
    Frequency,
    /// Detector counts, pixels and similar tallies.
    Count,
    Dimensionless,
}

/// String notation used when rendering a unit.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
    /// Plain ASCII: `mm`, `1 / mm`, `mm2`.
    Generic,
    /// Unicode superscripts: `mm⁻¹`, `µm`.
    Unicode,
    /// Display LaTeX with fractions: `$\mathrm{\frac{1}{mm}}$`.
    Latex,
    /// Inline LaTeX with negative exponents: `$\mathrm{mm^{-1}}$`.
    #[default]
    LatexInline,
}

impl Notation {
    pub const ALL: [Notation; 4] = [
        Notation::Generic,
        Notation::Unicode,
        Notation::Latex,
        Notation::LatexInline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Unicode => "unicode",
            Self::Latex => "latex",
            Self::LatexInline => "latex_inline",
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notation name that the unit system does not define.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown unit notation '{0}'")]
pub struct UnknownNotation(pub String);

impl FromStr for Notation {
    type Err = UnknownNotation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "console" => Ok(Self::Generic),
            "unicode" => Ok(Self::Unicode),
            "latex" => Ok(Self::Latex),
            "latex_inline" => Ok(Self::LatexInline),
            _ => Err(UnknownNotation(s.to_string())),
        }
    }
}

/// A named, irreducible unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseUnit {
    /// Registry name and generic spelling (`mm`, `deg`).
    pub name: String,

    /// Unicode spelling (`µm`, `°`).
    pub unicode: String,

    /// LaTeX body placed inside `\mathrm{...}` (`mm`, `{}^{\circ}`).
    pub latex: String,

    pub dimension: Dimension,

    /// Size of one of this unit in SI base units of its dimension.
    pub si_scale: f64,

    /// Verbatim renderings that replace the whole output when the unit is
    /// rendered on its own.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<Notation, String>,
}

impl BaseUnit {
    /// Define a base unit whose spelling is the same in every notation.
    pub fn new(name: impl Into<String>, dimension: Dimension, si_scale: f64) -> Self {
        let name = name.into();
        Self {
            unicode: name.clone(),
            latex: name.clone(),
            name,
            dimension,
            si_scale,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_unicode(mut self, unicode: impl Into<String>) -> Self {
        self.unicode = unicode.into();
        self
    }

    pub fn with_latex(mut self, latex: impl Into<String>) -> Self {
        self.latex = latex.into();
        self
    }

    pub fn with_override(mut self, notation: Notation, text: impl Into<String>) -> Self {
        self.overrides.insert(notation, text.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Factor {
    base: BaseUnit,
    power: i32,
}

/// A physical unit: a product of base units raised to integer powers.
///
/// The empty product is the dimensionless unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    factors: Vec<Factor>,
}

impl Unit {
    /// The dimensionless, unscaled unit.
    pub fn dimensionless() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    /// A unit made of a single base unit.
    pub fn base(base: BaseUnit) -> Self {
        Self {
            factors: vec![Factor { base, power: 1 }],
        }
    }

    /// Merge repeated base units, drop zero powers and sort canonically.
    ///
    /// Returns `None` if a merged power overflows `i32`.
    fn checked_from_factors(factors: Vec<Factor>) -> Option<Self> {
        let mut merged: Vec<Factor> = Vec::with_capacity(factors.len());
        for factor in factors {
            match merged.iter_mut().find(|f| f.base == factor.base) {
                Some(existing) => existing.power = existing.power.checked_add(factor.power)?,
                None => merged.push(factor),
            }
        }
        merged.retain(|f| f.power != 0);
        // Canonical order: highest power first, then by name.
        merged.sort_by(|a, b| {
            b.power
                .cmp(&a.power)
                .then_with(|| a.base.name.cmp(&b.base.name))
        });
        Some(Self { factors: merged })
    }

    /// Same as `checked_from_factors`, clamping overflowing powers.
    fn from_factors(factors: Vec<Factor>) -> Self {
        let mut merged: Vec<Factor> = Vec::with_capacity(factors.len());
        for factor in factors {
            match merged.iter_mut().find(|f| f.base == factor.base) {
                Some(existing) => existing.power = existing.power.saturating_add(factor.power),
                None => merged.push(factor),
            }
        }
        Self::checked_from_factors(merged).unwrap_or_default()
    }

    /// Raise the unit to an integer power.
    ///
    /// Powers that do not fit an `i32` are clamped; use
    /// [`checked_powi`](Self::checked_powi) for untrusted input.
    pub fn powi(&self, power: i32) -> Self {
        Self::from_factors(
            self.factors
                .iter()
                .map(|f| Factor {
                    base: f.base.clone(),
                    power: f.power.saturating_mul(power),
                })
                .collect(),
        )
    }

    /// Raise the unit to an integer power, or `None` on exponent overflow.
    pub fn checked_powi(&self, power: i32) -> Option<Self> {
        let factors = self
            .factors
            .iter()
            .map(|f| {
                Some(Factor {
                    base: f.base.clone(),
                    power: f.power.checked_mul(power)?,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Self::checked_from_factors(factors)
    }

    /// Product of two units, or `None` on exponent overflow.
    pub fn checked_mul(&self, rhs: &Unit) -> Option<Self> {
        Self::checked_from_factors(self.factors.iter().chain(rhs.factors.iter()).cloned().collect())
    }

    /// Quotient of two units, or `None` on exponent overflow.
    pub fn checked_div(&self, rhs: &Unit) -> Option<Self> {
        self.checked_mul(&rhs.checked_powi(-1)?)
    }

    /// Reciprocal unit (`mm` → `1 / mm`).
    pub fn recip(&self) -> Self {
        self.powi(-1)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.factors.is_empty()
    }

    /// Base units and their powers, in canonical order.
    pub fn factors(&self) -> impl Iterator<Item = (&BaseUnit, i32)> + '_ {
        self.factors.iter().map(|f| (&f.base, f.power))
    }

    /// Scale of this unit relative to the SI base units of its dimensions.
    pub fn si_scale(&self) -> f64 {
        self.factors
            .iter()
            .map(|f| f.base.si_scale.powi(f.power))
            .product()
    }

    /// Wrap a value into a [`Quantity`] of this unit.
    pub fn quantity(&self, value: f64) -> Quantity {
        Quantity::new(value, self.clone())
    }

    /// Render the unit in the given notation.
    pub fn to_string_in(&self, notation: Notation) -> String {
        if let [Factor { base, power: 1 }] = self.factors.as_slice() {
            if let Some(text) = base.overrides.get(&notation) {
                return text.clone();
            }
        }

        match notation {
            Notation::Generic => self.render_generic(),
            Notation::Unicode => self.render_unicode(),
            Notation::Latex => self.render_latex(),
            Notation::LatexInline => self.render_latex_inline(),
        }
    }

    fn split(&self) -> (Vec<&Factor>, Vec<&Factor>) {
        self.factors.iter().partition(|f| f.power > 0)
    }

    fn render_generic(&self) -> String {
        let term = |f: &Factor, power: i32| {
            if power == 1 {
                f.base.name.clone()
            } else {
                format!("{}{}", f.base.name, power)
            }
        };

        let (num, den) = self.split();
        let num_str = num
            .iter()
            .map(|f| term(*f, f.power))
            .collect::<Vec<_>>()
            .join(" ");
        if den.is_empty() {
            return num_str;
        }

        let mut den_str = den
            .iter()
            .map(|f| term(*f, -f.power))
            .collect::<Vec<_>>()
            .join(" ");
        if den.len() > 1 {
            den_str = format!("({})", den_str);
        }

        let num_str = if num_str.is_empty() {
            "1".to_string()
        } else {
            num_str
        };
        format!("{} / {}", num_str, den_str)
    }

    fn render_unicode(&self) -> String {
        self.factors
            .iter()
            .map(|f| {
                if f.power == 1 {
                    f.base.unicode.clone()
                } else {
                    format!("{}{}", f.base.unicode, superscript(f.power))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn render_latex_inline(&self) -> String {
        let body = self
            .factors
            .iter()
            .map(|f| latex_term(&f.base, f.power))
            .collect::<Vec<_>>()
            .join(r"\,");
        format!(r"$\mathrm{{{}}}$", body)
    }

    fn render_latex(&self) -> String {
        let (num, den) = self.split();
        if den.is_empty() {
            return self.render_latex_inline();
        }

        let join = |factors: &[&Factor], sign: i32| {
            factors
                .iter()
                .map(|f| latex_term(&f.base, sign * f.power))
                .collect::<Vec<_>>()
                .join(r"\,")
        };
        let num_body = if num.is_empty() {
            "1".to_string()
        } else {
            join(num.as_slice(), 1)
        };
        format!(r"$\mathrm{{\frac{{{}}}{{{}}}}}$", num_body, join(den.as_slice(), -1))
    }
}

fn latex_term(base: &BaseUnit, power: i32) -> String {
    if power == 1 {
        base.latex.clone()
    } else {
        format!("{}^{{{}}}", base.latex, power)
    }
}

fn superscript(power: i32) -> String {
    power
        .to_string()
        .chars()
        .map(|c| match c {
            '-' => '⁻',
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            other => other,
        })
        .collect()
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_in(Notation::Generic))
    }
}

impl From<BaseUnit> for Unit {
    fn from(base: BaseUnit) -> Self {
        Self::base(base)
    }
}

impl Mul for Unit {
    type Output = Unit;
    fn mul(self, rhs: Unit) -> Unit {
        &self * &rhs
    }
}

impl Mul<&Unit> for &Unit {
    type Output = Unit;
    fn mul(self, rhs: &Unit) -> Unit {
        Unit::from_factors(
            self.factors
                .iter()
                .chain(rhs.factors.iter())
                .cloned()
                .collect(),
        )
    }
}

impl Div for Unit {
    type Output = Unit;
    fn div(self, rhs: Unit) -> Unit {
        &self / &rhs
    }
}

impl Div<&Unit> for &Unit {
    type Output = Unit;
    fn div(self, rhs: &Unit) -> Unit {
        self * &rhs.recip()
    }
}

/// A numeric value paired with a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_dimensionless() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

// ============================================================================
// Standard units
// ============================================================================

fn length(name: &str, si_scale: f64) -> Unit {
    BaseUnit::new(name, Dimension::Length, si_scale).into()
}

pub fn m() -> Unit {
    length("m", 1.0)
}

pub fn km() -> Unit {
    length("km", 1e3)
}

pub fn cm() -> Unit {
    length("cm", 1e-2)
}

pub fn mm() -> Unit {
    length("mm", 1e-3)
}

pub fn um() -> Unit {
    BaseUnit::new("um", Dimension::Length, 1e-6)
        .with_unicode("µm")
        .with_latex(r"\mu m")
        .into()
}

pub fn nm() -> Unit {
    length("nm", 1e-9)
}

pub fn pm() -> Unit {
    length("pm", 1e-12)
}

pub fn rad() -> Unit {
    BaseUnit::new("rad", Dimension::Angle, 1.0).into()
}

pub fn mrad() -> Unit {
    BaseUnit::new("mrad", Dimension::Angle, 1e-3).into()
}

pub fn urad() -> Unit {
    BaseUnit::new("urad", Dimension::Angle, 1e-6)
        .with_unicode("µrad")
        .with_latex(r"\mu rad")
        .into()
}

pub fn deg() -> Unit {
    BaseUnit::new("deg", Dimension::Angle, std::f64::consts::PI / 180.0)
        .with_unicode("°")
        .with_latex(r"{}^{\circ}")
        .into()
}

pub fn arcmin() -> Unit {
    BaseUnit::new("arcmin", Dimension::Angle, std::f64::consts::PI / 10_800.0)
        .with_unicode("′")
        .with_latex(r"{}^{\prime}")
        .into()
}

pub fn arcsec() -> Unit {
    BaseUnit::new("arcsec", Dimension::Angle, std::f64::consts::PI / 648_000.0)
        .with_unicode("″")
        .with_latex(r"{}^{\prime\prime}")
        .into()
}

pub fn pixel() -> Unit {
    BaseUnit::new("pix", Dimension::Count, 1.0).into()
}

pub fn adu() -> Unit {
    BaseUnit::new("adu", Dimension::Count, 1.0).into()
}

/// Relative (normalized) response, used for MTF-like data.
pub fn rel() -> Unit {
    BaseUnit::new("rel", Dimension::Dimensionless, 1.0)
        .with_override(Notation::Unicode, "Rel 1.0")
        .with_override(Notation::Latex, "Rel 1.0")
        .with_override(Notation::LatexInline, "Rel 1.0")
        .into()
}

pub fn s() -> Unit {
    BaseUnit::new("s", Dimension::Time, 1.0).into()
}

pub fn ms() -> Unit {
    BaseUnit::new("ms", Dimension::Time, 1e-3).into()
}

pub fn us() -> Unit {
    BaseUnit::new("us", Dimension::Time, 1e-6)
        .with_unicode("µs")
        .with_latex(r"\mu s")
        .into()
}

pub fn ns() -> Unit {
    BaseUnit::new("ns", Dimension::Time, 1e-9).into()
}

pub fn hz() -> Unit {
    BaseUnit::new("Hz", Dimension::Frequency, 1.0).into()
}

pub fn khz() -> Unit {
    BaseUnit::new("kHz", Dimension::Frequency, 1e3).into()
}

pub fn mhz() -> Unit {
    BaseUnit::new("MHz", Dimension::Frequency, 1e6).into()
}

pub fn ghz() -> Unit {
    BaseUnit::new("GHz", Dimension::Frequency, 1e9).into()
}

// ============================================================================
// Registry
// ============================================================================

/// Mapping from unit name to unit value.
///
/// Lookups are case-sensitive: `mm` and `Mm` are different names.
#[derive(Clone, Debug, Default)]
pub struct UnitRegistry {
    units: BTreeMap<String, Unit>,
}

impl UnitRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the standard length, angle, count, time and
    /// frequency units.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        let entries: Vec<(&str, Unit)> = vec![
            ("m", m()),
            ("km", km()),
            ("cm", cm()),
            ("mm", mm()),
            ("um", um()),
            ("µm", um()),
            ("micron", um()),
            ("nm", nm()),
            ("pm", pm()),
            ("rad", rad()),
            ("mrad", mrad()),
            ("urad", urad()),
            ("deg", deg()),
            ("arcmin", arcmin()),
            ("arcsec", arcsec()),
            ("pix", pixel()),
            ("pixel", pixel()),
            ("adu", adu()),
            ("rel", rel()),
            ("dimensionless_unscaled", Unit::dimensionless()),
            ("s", s()),
            ("ms", ms()),
            ("us", us()),
            ("ns", ns()),
            ("Hz", hz()),
            ("kHz", khz()),
            ("MHz", mhz()),
            ("GHz", ghz()),
            ("lp/mm", mm().recip()),
            ("cy/mm", mm().recip()),
        ];
        for (name, unit) in entries {
            registry.register(name, unit);
        }
        registry
    }

    /// Add or replace a named unit, returning the previous value.
    pub fn register(&mut self, name: impl Into<String>, unit: Unit) -> Option<Unit> {
        self.units.insert(name.into(), unit)
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.units.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
