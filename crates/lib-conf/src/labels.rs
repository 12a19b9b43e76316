//! Axis and quantity label templates.
//!
//! A [`Labels`] value holds the text pieces for one physical domain (pupil,
//! MTF, ...). Rendering reads `show_units` and `unit_format` from the
//! [`Config`] passed to each call, so changing those settings affects every
//! label rendered afterwards.

use crate::config::Config;
use crate::error::ConfResult;
use crate::format::{format_unit, Formattable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the base text that an x/y qualifier attaches to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AdditionSide {
    Left,
    #[default]
    Right,
}

impl AdditionSide {
    /// `left` and `l` (any case) select the left side; anything else is right.
    pub fn parse_lenient(side: &str) -> Self {
        match side.to_lowercase().as_str() {
            "left" | "l" => Self::Left,
            _ => Self::Right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl From<String> for AdditionSide {
    fn from(side: String) -> Self {
        Self::parse_lenient(&side)
    }
}

impl From<&str> for AdditionSide {
    fn from(side: &str) -> Self {
        Self::parse_lenient(side)
    }
}

impl From<AdditionSide> for String {
    fn from(side: AdditionSide) -> Self {
        side.as_str().to_string()
    }
}

impl fmt::Display for AdditionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

/// Label template for one physical domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    /// Base text for the x and y labels.
    pub xy_base: String,

    /// Qualifiers for the x (index 0) and y (index 1) labels.
    #[serde(default = "default_xy_additions")]
    pub xy_additions: [String; 2],

    #[serde(default)]
    pub xy_addition_side: AdditionSide,

    /// Text placed between the base and its qualifier.
    #[serde(default = "default_space")]
    pub addition_joiner: String,

    /// Label text for the z axis.
    #[serde(rename = "z")]
    pub z_base: String,

    #[serde(default = "default_unit_prefix")]
    pub unit_prefix: String,

    #[serde(default = "default_unit_suffix")]
    pub unit_suffix: String,

    /// Text placed between the label and the unit text.
    #[serde(default = "default_space")]
    pub unit_joiner: String,
}

fn default_xy_additions() -> [String; 2] {
    ["X".to_string(), "Y".to_string()]
}
fn default_space() -> String { " ".to_string() }
fn default_unit_prefix() -> String { "[".to_string() }
fn default_unit_suffix() -> String { "]".to_string() }

impl Labels {
    /// Labels with the default `X`/`Y` qualifiers on the right, a space
    /// joiner, and units wrapped in square brackets.
    pub fn new(xy_base: impl Into<String>, z_base: impl Into<String>) -> Self {
        Self {
            xy_base: xy_base.into(),
            xy_additions: default_xy_additions(),
            xy_addition_side: AdditionSide::Right,
            addition_joiner: default_space(),
            z_base: z_base.into(),
            unit_prefix: default_unit_prefix(),
            unit_suffix: default_unit_suffix(),
            unit_joiner: default_space(),
        }
    }

    pub fn with_additions(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.xy_additions = [x.into(), y.into()];
        self
    }

    pub fn with_side(mut self, side: impl Into<AdditionSide>) -> Self {
        self.xy_addition_side = side.into();
        self
    }

    pub fn with_unit_brackets(
        mut self,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.unit_prefix = prefix.into();
        self.unit_suffix = suffix.into();
        self
    }

    /// X label, e.g. `Pupil ξ [mm]`.
    pub fn x<'a>(
        &self,
        config: &Config,
        xy_unit: impl Into<Formattable<'a>>,
        z_unit: impl Into<Formattable<'a>>,
    ) -> ConfResult<String> {
        self.render(Axis::X, config, xy_unit.into(), z_unit.into())
    }

    /// Y label, e.g. `Pupil η [mm]`.
    pub fn y<'a>(
        &self,
        config: &Config,
        xy_unit: impl Into<Formattable<'a>>,
        z_unit: impl Into<Formattable<'a>>,
    ) -> ConfResult<String> {
        self.render(Axis::Y, config, xy_unit.into(), z_unit.into())
    }

    /// Z label, e.g. `OPD [nm]`.
    pub fn z<'a>(
        &self,
        config: &Config,
        xy_unit: impl Into<Formattable<'a>>,
        z_unit: impl Into<Formattable<'a>>,
    ) -> ConfResult<String> {
        self.render(Axis::Z, config, xy_unit.into(), z_unit.into())
    }

    /// Base text with the xy unit, without an x/y qualifier.
    ///
    /// The unit is always included, whatever `show_units` says.
    pub fn generic<'a>(
        &self,
        config: &Config,
        xy_unit: impl Into<Formattable<'a>>,
        _z_unit: impl Into<Formattable<'a>>,
    ) -> ConfResult<String> {
        let unit = format_unit(xy_unit, config.unit_format)?;
        Ok(format!(
            "{}{}{}{}{}",
            self.xy_base, self.unit_joiner, self.unit_prefix, unit, self.unit_suffix
        ))
    }

    /// Independent duplicate of this template.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    fn render(
        &self,
        axis: Axis,
        config: &Config,
        xy_unit: Formattable<'_>,
        z_unit: Formattable<'_>,
    ) -> ConfResult<String> {
        let (label, unit_str) = match axis {
            Axis::X | Axis::Y => {
                let addition = self.xy_additions[if axis == Axis::X { 0 } else { 1 }].as_str();
                let mut pieces = vec![self.xy_base.as_str()];
                match self.xy_addition_side {
                    AdditionSide::Left => pieces.insert(0, addition),
                    AdditionSide::Right => pieces.push(addition),
                }
                (
                    pieces.join(self.addition_joiner.as_str()),
                    format_unit(xy_unit, config.unit_format)?,
                )
            }
            Axis::Z => (self.z_base.clone(), format_unit(z_unit, config.unit_format)?),
        };

        // The joiner is appended even when the unit text is empty.
        let unit_text = if config.show_units {
            format!("{}{}{}", self.unit_prefix, unit_str, self.unit_suffix)
        } else {
            String::new()
        };
        Ok(format!("{}{}{}", label, self.unit_joiner, unit_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::units::{mm, nm};
    use lib_types::Notation;

    fn unicode_config(show_units: bool) -> Config {
        let mut config = Config::new();
        config.unit_format = Notation::Unicode;
        config.show_units = show_units;
        config
    }

    #[test]
    fn test_x_y_right_side() {
        let config = unicode_config(true);
        let labels = Labels::new("Pupil", "OPD").with_additions("ξ", "η");

        assert_eq!(labels.x(&config, &mm(), &nm()).unwrap(), "Pupil ξ [mm]");
        assert_eq!(labels.y(&config, &mm(), &nm()).unwrap(), "Pupil η [mm]");
    }

    #[test]
    fn test_left_side_variants() {
        let config = unicode_config(true);
        for side in ["left", "l", "LEFT", "L"] {
            let labels = Labels::new("Pupil", "OPD").with_side(side);
            assert_eq!(labels.x(&config, &mm(), &nm()).unwrap(), "X Pupil [mm]");
        }
        let labels = Labels::new("Pupil", "OPD").with_side("sideways");
        assert_eq!(labels.y(&config, &mm(), &nm()).unwrap(), "Pupil Y [mm]");
    }

    #[test]
    fn test_z_uses_z_unit() {
        let config = unicode_config(true);
        let labels = Labels::new("Pupil", "OPD");
        assert_eq!(labels.z(&config, &mm(), &nm()).unwrap(), "OPD [nm]");
    }

    #[test]
    fn test_hidden_units_keep_trailing_joiner() {
        let config = unicode_config(false);
        let labels = Labels::new("Pupil", "OPD");

        assert_eq!(labels.x(&config, &mm(), &nm()).unwrap(), "Pupil X ");
        assert_eq!(labels.z(&config, &mm(), &nm()).unwrap(), "OPD ");

        let labels = Labels {
            unit_joiner: " / ".to_string(),
            ..labels
        };
        assert_eq!(labels.z(&config, &mm(), &nm()).unwrap(), "OPD / ");
    }

    #[test]
    fn test_generic_ignores_show_units() {
        let labels = Labels::new("Spatial Frequency", "MTF");
        let inv_mm = mm().recip();

        for show in [true, false] {
            let config = unicode_config(show);
            assert_eq!(
                labels.generic(&config, &inv_mm, &nm()).unwrap(),
                "Spatial Frequency [mm⁻¹]"
            );
        }
    }

    #[test]
    fn test_reads_config_at_call_time() {
        let mut config = unicode_config(true);
        let labels = Labels::new("Image Plane", "Irradiance");

        assert_eq!(labels.x(&config, &mm(), &nm()).unwrap(), "Image Plane X [mm]");
        config.unit_format = Notation::LatexInline;
        assert_eq!(
            labels.x(&config, &mm(), &nm()).unwrap(),
            r"Image Plane X [$\mathrm{mm}$]"
        );
        config.show_units = false;
        assert_eq!(labels.x(&config, &mm(), &nm()).unwrap(), "Image Plane X ");
    }

    #[test]
    fn test_quantity_and_bad_values() {
        let config = unicode_config(true);
        let labels = Labels::new("Pupil", "OPD");
        let q = nm().quantity(632.8);

        assert_eq!(labels.z(&config, &mm(), &q).unwrap(), "OPD [nm]");
        assert!(labels.z(&config, &mm(), 1.0).unwrap_err().is_invalid_argument());
        // Only the unit for the requested axis is formatted.
        assert!(labels.x(&config, &mm(), "not a unit").is_ok());
        // Hidden units still require a formattable value.
        let hidden = unicode_config(false);
        assert!(labels.x(&hidden, 2.0, &nm()).is_err());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = Labels::new("Pupil", "OPD").with_additions("ξ", "η");
        let mut copy = original.copy();
        copy.xy_base = "Aperture".to_string();
        copy.xy_additions[0] = "u".to_string();
        copy.unit_prefix = "(".to_string();

        assert_eq!(original.xy_base, "Pupil");
        assert_eq!(original.xy_additions[0], "ξ");
        assert_eq!(original.unit_prefix, "[");
        assert_ne!(original, copy);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let labels: Labels = serde_json::from_str(r#"{"xy_base": "Pupil", "z": "OPD"}"#).unwrap();
        assert_eq!(labels, Labels::new("Pupil", "OPD"));

        let labels: Labels = serde_json::from_str(
            r#"{"xy_base": "Pupil", "z": "OPD", "xy_additions": ["u", "v"], "xy_addition_side": "l"}"#,
        )
        .unwrap();
        assert_eq!(labels.xy_addition_side, AdditionSide::Left);
        assert_eq!(labels.xy_additions, ["u".to_string(), "v".to_string()]);
    }
}
