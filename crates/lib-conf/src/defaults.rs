//! Default units and label templates for each physical domain.

use crate::labels::Labels;
use lib_types::units::{adu, deg, mm, nm, pixel, rel};
use lib_types::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical domain a label or unit pair belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Pupil,
    Interferogram,
    Convolvable,
    Mtf,
    Ptf,
    Psd,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Pupil,
        Domain::Interferogram,
        Domain::Convolvable,
        Domain::Mtf,
        Domain::Ptf,
        Domain::Psd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pupil => "pupil",
            Self::Interferogram => "interferogram",
            Self::Convolvable => "convolvable",
            Self::Mtf => "mtf",
            Self::Ptf => "ptf",
            Self::Psd => "psd",
        }
    }

    /// Default label template for this domain.
    pub fn default_labels(&self) -> Labels {
        match self {
            Self::Pupil => default_pupil_labels(),
            Self::Interferogram => default_interferogram_labels(),
            Self::Convolvable => default_convolvable_labels(),
            Self::Mtf => default_mtf_labels(),
            Self::Ptf => default_ptf_labels(),
            Self::Psd => default_psd_labels(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown domain '{}'", s))
    }
}

/// Units for the in-plane (xy) and out-of-plane (z) axes of a dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainUnits {
    pub xy: Unit,
    pub z: Unit,
}

impl DomainUnits {
    pub fn new(xy: Unit, z: Unit) -> Self {
        Self { xy, z }
    }
}

pub fn default_phase_units() -> DomainUnits {
    DomainUnits::new(mm(), nm())
}

pub fn default_interferogram_units() -> DomainUnits {
    DomainUnits::new(pixel(), nm())
}

pub fn default_image_units() -> DomainUnits {
    DomainUnits::new(mm(), adu())
}

pub fn default_mtf_units() -> DomainUnits {
    DomainUnits::new(mm().recip(), rel())
}

pub fn default_ptf_units() -> DomainUnits {
    DomainUnits::new(mm().recip(), deg())
}

/// Axis qualifiers for pupil-like coordinates.
pub const XI_ETA: [&str; 2] = ["ξ", "η"];

/// Axis qualifiers for image-like coordinates.
pub const X_Y: [&str; 2] = ["X", "Y"];

fn labels(xy_base: &str, z: &str, additions: [&str; 2]) -> Labels {
    Labels::new(xy_base, z).with_additions(additions[0], additions[1])
}

pub fn default_pupil_labels() -> Labels {
    labels("Pupil", "OPD", XI_ETA)
}

pub fn default_interferogram_labels() -> Labels {
    labels("", "Height", X_Y)
}

pub fn default_convolvable_labels() -> Labels {
    labels("Image Plane", "Irradiance", X_Y)
}

pub fn default_mtf_labels() -> Labels {
    labels("Spatial Frequency", "MTF", X_Y)
}

pub fn default_ptf_labels() -> Labels {
    labels("Spatial Frequency", "PTF", XI_ETA)
}

pub fn default_psd_labels() -> Labels {
    labels("Spatial Frequency", "PSD", X_Y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_names_round_trip() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
        }
        assert_eq!("MTF".parse::<Domain>().unwrap(), Domain::Mtf);
        assert!("otf".parse::<Domain>().is_err());
    }

    #[test]
    fn test_pupil_like_domains_use_xi_eta() {
        assert_eq!(default_pupil_labels().xy_additions, ["ξ", "η"].map(String::from));
        assert_eq!(default_ptf_labels().xy_additions, ["ξ", "η"].map(String::from));
        assert_eq!(default_mtf_labels().xy_additions, ["X", "Y"].map(String::from));
    }

    #[test]
    fn test_mtf_units() {
        let units = default_mtf_units();
        assert_eq!(units.xy, mm().recip());
        assert_eq!(units.z, rel());
    }
}
