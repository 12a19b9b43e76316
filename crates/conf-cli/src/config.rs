//! Settings loading for the command line.

use anyhow::{Context, Result};
use lib_conf::{load_settings, Config, Settings, WavelengthSetting};
use lib_types::Unit;
use std::path::Path;

/// Read and validate a settings file.
pub fn load_config(path: &Path) -> Result<(Settings, Config)> {
    let settings = load_settings(path)
        .with_context(|| format!("Failed to read settings file: {:?}", path))?;

    let config = Config::from_settings(&settings)
        .with_context(|| format!("Invalid settings in {:?}", path))?;

    Ok((settings, config))
}

/// Configuration for this run: the settings file if one was given, else defaults.
pub fn effective_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading settings from {:?}", path);
            Ok(load_config(path)?.1)
        }
        None => {
            tracing::debug!("No settings file, using defaults");
            Ok(Config::new())
        }
    }
}

/// Parse a `--wavelength` argument: a number of microns or a source name.
pub fn parse_wavelength(arg: &str) -> Result<Unit> {
    let setting = match arg.trim().parse::<f64>() {
        Ok(microns) => WavelengthSetting::Microns(microns),
        Err(_) => WavelengthSetting::Named(arg.trim().to_string()),
    };
    setting
        .to_unit()
        .with_context(|| format!("Bad wavelength: {}", arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::wavelengths;

    #[test]
    fn test_parse_wavelength() {
        assert_eq!(parse_wavelength("HeNe").unwrap(), wavelengths::hene());
        assert_eq!(parse_wavelength(" 0.5 ").unwrap(), wavelengths::mkwvl(0.5));
        assert!(parse_wavelength("sodium").is_err());
        assert!(parse_wavelength("0").is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_config(Path::new("/nonexistent/optik.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read settings file"));
    }
}
