//! Settings files.
//!
//! A [`Settings`] value is the serializable form of a [`Config`]: validated
//! fields are plain integers, units are unit expressions and the wavelength
//! is either a named source or a number of microns. Every field has a
//! default, so an empty file yields the library defaults.
//!
//! ```toml
//! precision = 32
//! zernike_base = 0
//! wavelength = "CO2"
//! unit_format = "unicode"
//!
//! [units]
//! phase_z = "waves"
//! image_z = "nm / wave(0.5)"
//! mtf_xy = "cy/mm"
//!
//! [labels.pupil]
//! xy_base = "Entrance Pupil"
//! z = "Wavefront"
//! ```

use crate::backend::Backend;
use crate::config::Config;
use crate::defaults;
use crate::error::{ConfError, ConfResult};
use crate::labels::Labels;
use crate::unit_expr::parse_unit_expr;
use lib_types::{wavelengths, BaseUnit, Notation, Unit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Serializable configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Floating point precision in bits, 32 or 64.
    #[serde(default = "default_precision")]
    pub precision: i64,

    #[serde(default)]
    pub backend: Backend,

    /// First zernike index, 0 or 1.
    #[serde(default = "default_zernike_base")]
    pub zernike_base: i64,

    /// Oversampling factor.
    #[serde(default = "default_q")]
    pub q: f64,

    #[serde(default)]
    pub wavelength: WavelengthSetting,

    #[serde(default)]
    pub plot: PlotSettings,

    /// Notation name: `generic`, `unicode`, `latex` or `latex_inline`.
    #[serde(default = "default_unit_format")]
    pub unit_format: String,

    #[serde(default = "default_true")]
    pub show_units: bool,

    #[serde(default)]
    pub units: UnitSettings,

    #[serde(default)]
    pub labels: LabelSettings,

    /// Keys this version does not recognize; reported and otherwise ignored.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

fn default_precision() -> i64 { 64 }
fn default_zernike_base() -> i64 { 1 }
fn default_q() -> f64 { 2.0 }
fn default_unit_format() -> String { Notation::LatexInline.as_str().to_string() }
fn default_true() -> bool { true }

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            backend: Backend::default(),
            zernike_base: default_zernike_base(),
            q: default_q(),
            wavelength: WavelengthSetting::default(),
            plot: PlotSettings::default(),
            unit_format: default_unit_format(),
            show_units: true,
            units: UnitSettings::default(),
            labels: LabelSettings::default(),
            unknown: BTreeMap::new(),
        }
    }
}

/// Reference wavelength: a named source or a value in microns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WavelengthSetting {
    Microns(f64),
    Named(String),
}

impl Default for WavelengthSetting {
    fn default() -> Self {
        Self::Named("HeNe".to_string())
    }
}

impl WavelengthSetting {
    /// The wave unit this setting describes.
    pub fn to_unit(&self) -> ConfResult<Unit> {
        match self {
            Self::Microns(microns) if microns.is_finite() && *microns > 0.0 => {
                Ok(wavelengths::mkwvl(*microns))
            }
            Self::Microns(microns) => Err(ConfError::invalid_argument(format!(
                "wavelength must be a positive number of microns, got {}",
                microns
            ))),
            Self::Named(name) => {
                wavelengths::named(name).ok_or_else(|| ConfError::UnknownWavelength(name.clone()))
            }
        }
    }
}

impl fmt::Display for WavelengthSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Microns(microns) => write!(f, "{} µm", microns),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Plot style defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotSettings {
    #[serde(default = "default_phase_cmap")]
    pub phase_cmap: String,

    #[serde(default = "default_image_cmap")]
    pub image_cmap: String,

    #[serde(default = "default_lw")]
    pub lw: f64,

    #[serde(default = "default_zorder")]
    pub zorder: i32,

    #[serde(default = "default_alpha")]
    pub alpha: f64,

    #[serde(default = "default_interpolation")]
    pub interpolation: String,
}

fn default_phase_cmap() -> String { "inferno".to_string() }
fn default_image_cmap() -> String { "Greys_r".to_string() }
fn default_lw() -> f64 { 3.0 }
fn default_zorder() -> i32 { 3 }
fn default_alpha() -> f64 { 1.0 }
fn default_interpolation() -> String { "lanczos".to_string() }

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            phase_cmap: default_phase_cmap(),
            image_cmap: default_image_cmap(),
            lw: default_lw(),
            zorder: default_zorder(),
            alpha: default_alpha(),
            interpolation: default_interpolation(),
        }
    }
}

/// Default units per domain, as unit expressions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSettings {
    #[serde(default = "default_phase_xy")]
    pub phase_xy: String,
    #[serde(default = "default_phase_z")]
    pub phase_z: String,
    #[serde(default = "default_image_xy")]
    pub image_xy: String,
    #[serde(default = "default_image_z")]
    pub image_z: String,
    #[serde(default = "default_inverse_mm")]
    pub mtf_xy: String,
    #[serde(default = "default_mtf_z")]
    pub mtf_z: String,
    #[serde(default = "default_inverse_mm")]
    pub ptf_xy: String,
    #[serde(default = "default_ptf_z")]
    pub ptf_z: String,
}

fn default_phase_xy() -> String { "mm".to_string() }
fn default_phase_z() -> String { "nm".to_string() }
fn default_image_xy() -> String { "um".to_string() }
fn default_image_z() -> String { "adu".to_string() }
fn default_inverse_mm() -> String { "1/mm".to_string() }
fn default_mtf_z() -> String { "rel".to_string() }
fn default_ptf_z() -> String { "deg".to_string() }

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            phase_xy: default_phase_xy(),
            phase_z: default_phase_z(),
            image_xy: default_image_xy(),
            image_z: default_image_z(),
            mtf_xy: default_inverse_mm(),
            mtf_z: default_mtf_z(),
            ptf_xy: default_inverse_mm(),
            ptf_z: default_ptf_z(),
        }
    }
}

/// Label templates per domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSettings {
    #[serde(default = "defaults::default_pupil_labels")]
    pub pupil: Labels,
    #[serde(default = "defaults::default_interferogram_labels")]
    pub interferogram: Labels,
    #[serde(default = "defaults::default_convolvable_labels")]
    pub convolvable: Labels,
    #[serde(default = "defaults::default_mtf_labels")]
    pub mtf: Labels,
    #[serde(default = "defaults::default_ptf_labels")]
    pub ptf: Labels,
    #[serde(default = "defaults::default_psd_labels")]
    pub psd: Labels,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            pupil: defaults::default_pupil_labels(),
            interferogram: defaults::default_interferogram_labels(),
            convolvable: defaults::default_convolvable_labels(),
            mtf: defaults::default_mtf_labels(),
            ptf: defaults::default_ptf_labels(),
            psd: defaults::default_psd_labels(),
        }
    }
}

/// Load settings from a TOML file, or a JSON file when the extension is `.json`.
///
/// Only syntax is checked here; [`Config::from_settings`] validates values.
pub fn load_settings(path: &Path) -> ConfResult<Settings> {
    let content = std::fs::read_to_string(path)?;

    let settings: Settings = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };

    tracing::info!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

impl Config {
    /// Build a validated configuration from settings.
    ///
    /// Fields are assigned in a fixed order, precision first, with the
    /// initialized flag cleared until every field is set.
    pub fn from_settings(settings: &Settings) -> ConfResult<Config> {
        for key in settings.unknown.keys() {
            tracing::warn!(key = %key, "Ignoring unknown setting");
        }

        let mut config = Config::new();
        config.set_initialized(false);

        config.set_precision(settings.precision)?;
        config.set_backend(settings.backend.clone());
        config.set_zernike_base(settings.zernike_base)?;
        config.q = settings.q;
        config.set_wavelength(settings.wavelength.to_unit()?);

        config.phase_cmap = settings.plot.phase_cmap.clone();
        config.image_cmap = settings.plot.image_cmap.clone();
        config.lw = settings.plot.lw;
        config.zorder = settings.plot.zorder;
        config.alpha = settings.plot.alpha;
        config.interpolation = settings.plot.interpolation.clone();

        config.set_unit_format(&settings.unit_format)?;
        config.show_units = settings.show_units;

        let units = &settings.units;
        let wavelength = config.wavelength.clone();
        let parse = |expr: &str| parse_unit_expr(expr, &wavelength);
        config.phase_xy_unit = parse(&units.phase_xy)?;
        config.phase_z_unit = parse(&units.phase_z)?;
        config.image_xy_unit = parse(&units.image_xy)?;
        config.image_z_unit = parse(&units.image_z)?;
        config.mtf_xy_unit = parse(&units.mtf_xy)?;
        config.mtf_z_unit = parse(&units.mtf_z)?;
        config.ptf_xy_unit = parse(&units.ptf_xy)?;
        config.ptf_z_unit = parse(&units.ptf_z)?;

        let labels = &settings.labels;
        config.pupil_labels = labels.pupil.clone();
        config.interferogram_labels = labels.interferogram.clone();
        config.convolvable_labels = labels.convolvable.clone();
        config.mtf_labels = labels.mtf.clone();
        config.ptf_labels = labels.ptf.clone();
        config.psd_labels = labels.psd.clone();

        config.set_initialized(true);
        Ok(config)
    }
}

/// Generic spelling of `unit` that parses back against `reference`.
///
/// Wave units other than the reference wavelength are written as
/// `wave(<microns>)`, since a bare `wave` would reload as the reference.
fn unit_expression(unit: &Unit, reference: &Unit) -> String {
    if unit.is_dimensionless() {
        return "1".to_string();
    }

    let spelled = unit.factors().fold(Unit::dimensionless(), |acc, (base, power)| {
        let single = Unit::from(base.clone());
        let base = match wavelengths::microns(&single) {
            Some(microns) if single != *reference => BaseUnit {
                name: format!("wave({})", microns),
                ..base.clone()
            },
            _ => base.clone(),
        };
        &acc * &Unit::from(base).powi(power)
    });
    spelled.to_string_in(Notation::Generic)
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        let wavelength = wavelengths::names()
            .find(|name| wavelengths::named(name).as_ref() == Some(&config.wavelength))
            .map(|name| WavelengthSetting::Named(name.to_string()))
            .or_else(|| wavelengths::microns(&config.wavelength).map(WavelengthSetting::Microns))
            .unwrap_or_default();

        Self {
            precision: i64::from(config.precision_bits()),
            backend: config.backend().clone(),
            zernike_base: i64::from(config.zernike_base()),
            q: config.q,
            wavelength,
            plot: PlotSettings {
                phase_cmap: config.phase_cmap.clone(),
                image_cmap: config.image_cmap.clone(),
                lw: config.lw,
                zorder: config.zorder,
                alpha: config.alpha,
                interpolation: config.interpolation.clone(),
            },
            unit_format: config.unit_format.as_str().to_string(),
            show_units: config.show_units,
            units: UnitSettings {
                phase_xy: unit_expression(&config.phase_xy_unit, &config.wavelength),
                phase_z: unit_expression(&config.phase_z_unit, &config.wavelength),
                image_xy: unit_expression(&config.image_xy_unit, &config.wavelength),
                image_z: unit_expression(&config.image_z_unit, &config.wavelength),
                mtf_xy: unit_expression(&config.mtf_xy_unit, &config.wavelength),
                mtf_z: unit_expression(&config.mtf_z_unit, &config.wavelength),
                ptf_xy: unit_expression(&config.ptf_xy_unit, &config.wavelength),
                ptf_z: unit_expression(&config.ptf_z_unit, &config.wavelength),
            },
            labels: LabelSettings {
                pupil: config.pupil_labels.clone(),
                interferogram: config.interferogram_labels.clone(),
                convolvable: config.convolvable_labels.clone(),
                mtf: config.mtf_labels.clone(),
                ptf: config.ptf_labels.clone(),
                psd: config.psd_labels.clone(),
            },
            unknown: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::Domain;
    use lib_types::units::{mm, nm};
    use lib_types::DType;

    fn assert_same_config(a: &Config, b: &Config) {
        assert_eq!(a.precision(), b.precision());
        assert_eq!(a.backend(), b.backend());
        assert_eq!(a.zernike_base(), b.zernike_base());
        assert_eq!(a.q, b.q);
        assert_eq!(a.wavelength, b.wavelength);
        assert_eq!(a.unit_format, b.unit_format);
        assert_eq!(a.show_units, b.show_units);
        for domain in Domain::ALL {
            assert_eq!(a.units(domain), b.units(domain), "{} units", domain);
            assert_eq!(a.labels(domain), b.labels(domain), "{} labels", domain);
        }
        assert_eq!(a.image_xy_unit, b.image_xy_unit);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());

        let config = Config::from_settings(&settings).unwrap();
        assert!(config.is_initialized());
        assert_same_config(&config, &Config::new());
    }

    #[test]
    fn test_toml_overrides() {
        let settings: Settings = toml::from_str(
            r#"
            precision = 32
            zernike_base = 0
            backend = "cuda"
            wavelength = "CO2"
            unit_format = "unicode"
            show_units = false

            [plot]
            lw = 1.5

            [units]
            phase_z = "waves"
            mtf_xy = "mm^-1"

            [labels.pupil]
            xy_base = "Entrance Pupil"
            z = "Wavefront"
            "#,
        )
        .unwrap();

        let config = Config::from_settings(&settings).unwrap();
        assert_eq!(config.precision(), DType::Float32);
        assert_eq!(config.zernike_base(), 0);
        assert_eq!(config.backend(), &Backend::Gpu);
        assert_eq!(config.wavelength, wavelengths::co2());
        assert_eq!(config.phase_z_unit, wavelengths::co2());
        assert_eq!(config.mtf_xy_unit, mm().recip());
        assert_eq!(config.unit_format, Notation::Unicode);
        assert!(!config.show_units);
        assert_eq!(config.lw, 1.5);
        assert_eq!(config.image_cmap, "Greys_r");
        assert_eq!(config.pupil_labels.xy_base, "Entrance Pupil");
        assert_eq!(config.pupil_labels.z_base, "Wavefront");
        assert_eq!(config.pupil_labels.xy_additions, ["X", "Y"].map(String::from));
    }

    #[test]
    fn test_json_and_numeric_wavelength() {
        let settings: Settings = serde_json::from_str(
            r#"{"wavelength": 0.5, "units": {"phase_z": "nm / wave"}}"#,
        )
        .unwrap();

        let config = Config::from_settings(&settings).unwrap();
        assert_eq!(config.wavelength, wavelengths::mkwvl(0.5));
        assert_eq!(config.phase_z_unit, &nm() / &wavelengths::mkwvl(0.5));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let settings = Settings {
            precision: 16,
            ..Settings::default()
        };
        let err = Config::from_settings(&settings).unwrap_err();
        assert_eq!(err.to_string(), "invalid precision. Precision should be 32 or 64.");

        let settings = Settings {
            zernike_base: 2,
            ..Settings::default()
        };
        let err = Config::from_settings(&settings).unwrap_err();
        assert_eq!(err.to_string(), "By convention zernike base must be 0 or 1.");

        let settings = Settings {
            wavelength: WavelengthSetting::Named("sodium".into()),
            ..Settings::default()
        };
        assert!(matches!(
            Config::from_settings(&settings).unwrap_err(),
            ConfError::UnknownWavelength(_)
        ));

        let settings = Settings {
            wavelength: WavelengthSetting::Microns(-1.0),
            ..Settings::default()
        };
        assert!(Config::from_settings(&settings).unwrap_err().is_invalid_argument());

        let mut settings = Settings::default();
        settings.units.ptf_z = "furlong".to_string();
        assert!(matches!(
            Config::from_settings(&settings).unwrap_err(),
            ConfError::UnresolvedUnitName(_)
        ));

        let mut settings = Settings::default();
        settings.unit_format = "braille".to_string();
        assert!(matches!(
            Config::from_settings(&settings).unwrap_err(),
            ConfError::UnknownNotation(_)
        ));
    }

    #[test]
    fn test_unknown_keys_are_collected() {
        let settings: Settings = toml::from_str("precision = 64\ncolour = \"blue\"").unwrap();
        assert!(settings.unknown.contains_key("colour"));
        assert!(Config::from_settings(&settings).is_ok());
    }

    #[test]
    fn test_config_to_settings_round_trip() {
        let mut config = Config::new();
        config.set_precision(32).unwrap();
        config.set_wavelength(wavelengths::swir());
        config.phase_z_unit = wavelengths::swir();
        config.mtf_xy_unit = &mm().recip() * &nm().recip();
        config.unit_format = Notation::Latex;

        let settings = Settings::from(&config);
        assert_eq!(settings.precision, 32);
        assert_eq!(settings.wavelength, WavelengthSetting::Named("SWIR".into()));
        assert_eq!(settings.units.phase_z, "wave");

        let restored = Config::from_settings(&settings).unwrap();
        assert_same_config(&restored, &config);
        assert_eq!(restored.mtf_xy_unit, config.mtf_xy_unit);
    }

    #[test]
    fn test_other_wavelengths_survive_round_trip() {
        let mut config = Config::new();
        config.phase_z_unit = wavelengths::mkwvl(0.5);
        config.phase_xy_unit = &nm() / &wavelengths::mkwvl(0.5);

        let settings = Settings::from(&config);
        assert!(settings.units.phase_z.starts_with("wave("), "{}", settings.units.phase_z);

        let restored = Config::from_settings(&settings).unwrap();
        let scale = restored.phase_z_unit.si_scale();
        assert!((scale - 5e-7).abs() < 5e-7 * 1e-12, "si scale {}", scale);
        let ratio = restored.phase_xy_unit.si_scale() / config.phase_xy_unit.si_scale();
        assert!((ratio - 1.0).abs() < 1e-12);
        assert_eq!(restored.wavelength, wavelengths::hene());
    }

    #[test]
    fn test_documented_example_loads() {
        let text = r#"
precision = 32
zernike_base = 0
wavelength = "CO2"
unit_format = "unicode"

[units]
phase_z = "waves"
image_z = "nm / wave(0.5)"
mtf_xy = "cy/mm"

[labels.pupil]
xy_base = "Entrance Pupil"
z = "Wavefront"
"#;
        let settings: Settings = toml::from_str(text).unwrap();
        let config = Config::from_settings(&settings).unwrap();

        assert_eq!(config.precision_bits(), 32);
        assert_eq!(config.phase_z_unit, wavelengths::co2());
        assert_eq!(config.image_z_unit, &nm() / &wavelengths::mkwvl(0.5));
        assert_eq!(config.mtf_xy_unit, mm().recip());
        assert_eq!(config.unit_format, Notation::Unicode);
        assert_eq!(config.pupil_labels.xy_base, "Entrance Pupil");
        assert_eq!(config.pupil_labels.z_base, "Wavefront");
    }

    #[test]
    fn test_load_settings_by_extension() {
        let dir = std::env::temp_dir().join(format!("optik-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let toml_path = dir.join("conf.toml");
        std::fs::write(&toml_path, "zernike_base = 0\n").unwrap();
        assert_eq!(load_settings(&toml_path).unwrap().zernike_base, 0);

        let json_path = dir.join("conf.json");
        std::fs::write(&json_path, r#"{"zernike_base": 0}"#).unwrap();
        assert_eq!(load_settings(&json_path).unwrap().zernike_base, 0);

        std::fs::write(&json_path, "zernike_base = 0").unwrap();
        assert!(matches!(load_settings(&json_path).unwrap_err(), ConfError::Json(_)));

        assert!(matches!(
            load_settings(&dir.join("missing.toml")).unwrap_err(),
            ConfError::Io(_)
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
