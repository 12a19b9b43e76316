//! Result output formatting.

use crate::OutputFormat;
use anyhow::Result;
use lib_conf::{Config, Domain, Settings};
use lib_types::{Notation, Unit};
use std::io::Write;
use std::path::Path;

/// x, y and z labels of a domain, rendered with the config's own units.
fn domain_labels(config: &Config, domain: Domain) -> Result<[String; 3]> {
    let units = config.units(domain);
    let labels = config.labels(domain);
    Ok([
        labels.x(config, &units.xy, &units.z)?,
        labels.y(config, &units.xy, &units.z)?,
        labels.z(config, &units.xy, &units.z)?,
    ])
}

/// Write the effective configuration.
pub fn write_config<W: Write>(w: &mut W, config: &Config, format: OutputFormat) -> Result<()> {
    let settings = Settings::from(config);

    match format {
        OutputFormat::Text => {
            writeln!(w, "Optik Configuration")?;
            writeln!(w, "===================")?;
            writeln!(
                w,
                "Precision:     {}-bit ({} / {})",
                config.precision_bits(),
                config.precision(),
                config.precision_complex()
            )?;
            writeln!(w, "Backend:       {}", config.backend())?;
            writeln!(w, "Zernike base:  {}", config.zernike_base())?;
            writeln!(w, "Oversampling:  {}", config.q)?;
            writeln!(w, "Wavelength:    {}", settings.wavelength)?;
            writeln!(w, "Unit format:   {}", config.unit_format)?;
            writeln!(w, "Show units:    {}", config.show_units)?;
            writeln!(w)?;

            writeln!(w, "{:<15}{:<12}{:<12}", "Domain", "XY", "Z")?;
            for domain in Domain::ALL {
                let units = config.units(domain);
                writeln!(
                    w,
                    "{:<15}{:<12}{:<12}",
                    domain.as_str(),
                    units.xy.to_string_in(Notation::Generic),
                    units.z.to_string_in(Notation::Generic)
                )?;
            }
            writeln!(w)?;

            writeln!(w, "Labels:")?;
            for domain in Domain::ALL {
                let [x, y, z] = domain_labels(config, domain)?;
                writeln!(w, "  {:<15}x: {}", domain.as_str(), x)?;
                writeln!(w, "  {:<15}y: {}", "", y)?;
                writeln!(w, "  {:<15}z: {}", "", z)?;
            }
        }
        OutputFormat::Json => {
            let mut labels = serde_json::Map::new();
            for domain in Domain::ALL {
                let [x, y, z] = domain_labels(config, domain)?;
                labels.insert(
                    domain.as_str().to_string(),
                    serde_json::json!({ "x": x, "y": y, "z": z }),
                );
            }

            let json = serde_json::json!({
                "settings": settings,
                "dtype": {
                    "real": config.precision().name(),
                    "complex": config.precision_complex().name(),
                },
                "rendered_labels": labels,
            });
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
    }

    Ok(())
}

/// Write one rendered label.
pub fn write_label<W: Write>(
    w: &mut W,
    domain: Domain,
    axis: &str,
    label: &str,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(w, "{}", label)?,
        OutputFormat::Json => {
            let json = serde_json::json!({
                "domain": domain.as_str(),
                "axis": axis,
                "label": label,
            });
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
    }
    Ok(())
}

/// Write a resolved unit in one notation, or in all of them.
pub fn write_unit<W: Write>(
    w: &mut W,
    token: &str,
    unit: &Unit,
    notation: Option<Notation>,
    format: OutputFormat,
) -> Result<()> {
    let notations: Vec<Notation> = match notation {
        Some(n) => vec![n],
        None => Notation::ALL.to_vec(),
    };

    match format {
        OutputFormat::Text => {
            if let [only] = notations.as_slice() {
                writeln!(w, "{}", unit.to_string_in(*only))?;
                return Ok(());
            }
            writeln!(w, "Unit: {}", token)?;
            for n in &notations {
                writeln!(w, "  {:<14}{}", format!("{}:", n), unit.to_string_in(*n))?;
            }
            writeln!(w, "  {:<14}{}", "SI scale:", unit.si_scale())?;
        }
        OutputFormat::Json => {
            let renderings: serde_json::Map<String, serde_json::Value> = notations
                .iter()
                .map(|n| (n.as_str().to_string(), unit.to_string_in(*n).into()))
                .collect();
            let json = serde_json::json!({
                "token": token,
                "si_scale": unit.si_scale(),
                "renderings": renderings,
            });
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
    }
    Ok(())
}

/// Write the outcome of validating a settings file.
pub fn write_check<W: Write>(
    w: &mut W,
    path: &Path,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let unknown: Vec<&str> = settings.unknown.keys().map(String::as_str).collect();

    match format {
        OutputFormat::Text => {
            writeln!(w, "{}: OK", path.display())?;
            for key in &unknown {
                writeln!(w, "  ignored unknown setting '{}'", key)?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "file": path.display().to_string(),
                "valid": true,
                "unknown_keys": unknown,
            });
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::units::mm;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_config_text_lists_every_domain() {
        let config = Config::new();
        let text = render(|w| write_config(w, &config, OutputFormat::Text));

        assert!(text.contains("Precision:     64-bit"));
        assert!(text.contains("Wavelength:    HeNe"));
        for domain in Domain::ALL {
            assert!(text.contains(domain.as_str()), "missing {}", domain);
        }
    }

    #[test]
    fn test_config_json_is_parseable() {
        let config = Config::new();
        let text = render(|w| write_config(w, &config, OutputFormat::Json));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["settings"]["precision"], 64);
        assert_eq!(json["dtype"]["complex"], "complex128");
        assert_eq!(json["settings"]["units"]["mtf_xy"], "1 / mm");
        assert_eq!(
            json["rendered_labels"]["pupil"]["z"],
            r"OPD [$\mathrm{nm}$]"
        );
    }

    #[test]
    fn test_unit_single_notation_prints_bare_string() {
        let unit = mm().recip();
        let text = render(|w| write_unit(w, "1/mm", &unit, Some(Notation::Unicode), OutputFormat::Text));
        assert_eq!(text, "mm⁻¹\n");

        let text = render(|w| write_unit(w, "1/mm", &unit, None, OutputFormat::Text));
        assert!(text.starts_with("Unit: 1/mm\n"));
        assert!(text.contains("1 / mm"));
    }

    #[test]
    fn test_check_reports_unknown_keys() {
        let settings: Settings = serde_json::from_str(r#"{"colour": "blue"}"#).unwrap();
        let text = render(|w| write_check(w, Path::new("a.json"), &settings, OutputFormat::Text));
        assert_eq!(text, "a.json: OK\n  ignored unknown setting 'colour'\n");
    }
}
