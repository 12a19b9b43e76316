//! Library-wide configuration.
//!
//! [`Config`] holds numeric settings (precision, zernike base, oversampling),
//! the computational backend, plot style defaults, per-domain default units
//! and label templates. Validated settings are private and changed through
//! setters; plain data is public.

use crate::backend::{Backend, BackendObservers, SubscriptionId};
use crate::defaults::{self, Domain, DomainUnits};
use crate::error::{ConfError, ConfResult};
use crate::labels::Labels;
use crate::resolve::{resolve_unit, UnitToken};
use lib_types::units::{adu, deg, mm, nm, rel, um};
use lib_types::wavelengths::hene;
use lib_types::{DType, Notation, Precision, Unit};

/// Global configuration of the library.
#[derive(Debug)]
pub struct Config {
    /// False while the constructor is still assigning fields.
    initialized: bool,

    precision: Precision,

    backend: Backend,

    backend_observers: BackendObservers,

    zernike_base: u8,

    /// Oversampling factor for numerical propagations.
    pub q: f64,

    /// Reference wavelength; `waves` tokens resolve to this unit.
    pub wavelength: Unit,

    /// Colormap for optical phase plots.
    pub phase_cmap: String,

    /// Colormap for greyscale images.
    pub image_cmap: String,

    /// Line width.
    pub lw: f64,

    pub zorder: i32,

    pub alpha: f64,

    /// Interpolation used by 2D plots.
    pub interpolation: String,

    /// Notation used when rendering units into labels.
    pub unit_format: Notation,

    /// Whether x/y/z labels include unit text.
    pub show_units: bool,

    pub phase_xy_unit: Unit,
    pub phase_z_unit: Unit,
    pub image_xy_unit: Unit,
    pub image_z_unit: Unit,
    pub mtf_xy_unit: Unit,
    pub mtf_z_unit: Unit,
    pub ptf_xy_unit: Unit,
    pub ptf_z_unit: Unit,

    pub pupil_labels: Labels,
    pub interferogram_labels: Labels,
    pub convolvable_labels: Labels,
    pub mtf_labels: Labels,
    pub ptf_labels: Labels,
    pub psd_labels: Labels,
}

pub(crate) const PRECISION_ERROR: &str = "invalid precision. Precision should be 32 or 64.";
pub(crate) const ZERNIKE_BASE_ERROR: &str = "By convention zernike base must be 0 or 1.";

impl Config {
    /// Configuration with the library defaults: 64-bit precision, CPU
    /// backend, base-1 zernikes, HeNe reference wavelength and LaTeX inline
    /// unit rendering.
    pub fn new() -> Self {
        let mut config = Self {
            initialized: false,
            precision: Precision::Double,
            backend: Backend::Cpu,
            backend_observers: BackendObservers::new(),
            zernike_base: 1,
            q: 2.0,
            wavelength: hene(),
            phase_cmap: "inferno".to_string(),
            image_cmap: "Greys_r".to_string(),
            lw: 3.0,
            zorder: 3,
            alpha: 1.0,
            interpolation: "lanczos".to_string(),
            unit_format: Notation::LatexInline,
            show_units: true,
            phase_xy_unit: mm(),
            phase_z_unit: nm(),
            image_xy_unit: um(),
            image_z_unit: adu(),
            mtf_xy_unit: mm().recip(),
            mtf_z_unit: rel(),
            ptf_xy_unit: mm().recip(),
            ptf_z_unit: deg(),
            pupil_labels: defaults::default_pupil_labels(),
            interferogram_labels: defaults::default_interferogram_labels(),
            convolvable_labels: defaults::default_convolvable_labels(),
            mtf_labels: defaults::default_mtf_labels(),
            ptf_labels: defaults::default_ptf_labels(),
            psd_labels: defaults::default_psd_labels(),
        };
        config.initialized = true;
        config
    }

    /// True once construction has assigned every field.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    // ------------------------------------------------------------------
    // Precision
    // ------------------------------------------------------------------

    /// Real element type used for computations.
    pub fn precision(&self) -> DType {
        self.precision.real()
    }

    /// Complex element type paired with [`precision`](Self::precision).
    pub fn precision_complex(&self) -> DType {
        self.precision.complex()
    }

    pub fn precision_bits(&self) -> u32 {
        self.precision.bits()
    }

    /// Select 32- or 64-bit precision.
    pub fn set_precision(&mut self, bits: i64) -> ConfResult<()> {
        let precision = u32::try_from(bits)
            .ok()
            .and_then(Precision::from_bits)
            .ok_or_else(|| ConfError::invalid_argument(PRECISION_ERROR))?;

        if precision != self.precision {
            tracing::debug!(bits, "Precision changed");
        }
        self.precision = precision;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Zernike base
    // ------------------------------------------------------------------

    pub fn zernike_base(&self) -> u8 {
        self.zernike_base
    }

    /// Set the first zernike index, 0 or 1.
    pub fn set_zernike_base(&mut self, base: i64) -> ConfResult<()> {
        match base {
            0 | 1 => {
                self.zernike_base = base as u8;
                Ok(())
            }
            _ => Err(ConfError::invalid_argument(ZERNIKE_BASE_ERROR)),
        }
    }

    // ------------------------------------------------------------------
    // Backend
    // ------------------------------------------------------------------

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Reassign the backend.
    ///
    /// Observers run first, in subscription order, and receive the backend
    /// that was active before this call; the new backend is stored after all
    /// of them return.
    pub fn set_backend(&mut self, backend: impl Into<Backend>) {
        let backend = backend.into();
        self.backend_observers.notify(&self.backend);
        tracing::debug!(from = %self.backend, to = %backend, "Backend changed");
        self.backend = backend;
    }

    /// Register a callback for backend changes.
    pub fn subscribe_backend<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&Backend) + Send + Sync + 'static,
    {
        self.backend_observers.subscribe(observer)
    }

    /// Remove a backend-change callback.
    pub fn unsubscribe_backend(&mut self, id: SubscriptionId) -> bool {
        self.backend_observers.unsubscribe(id)
    }

    pub fn backend_observers(&self) -> &BackendObservers {
        &self.backend_observers
    }

    /// Take every setting from `other` while keeping this config's backend
    /// observers. Observers are notified if the backend changes.
    pub fn replace_with(&mut self, mut other: Config) {
        other.backend_observers = std::mem::take(&mut self.backend_observers);
        let backend = std::mem::replace(&mut other.backend, self.backend.clone());
        *self = other;
        if self.backend != backend {
            self.set_backend(backend);
        }
    }

    // ------------------------------------------------------------------
    // Units and labels
    // ------------------------------------------------------------------

    /// Set the unit notation by name (`latex`, `latex_inline`, `unicode`, `generic`).
    pub fn set_unit_format(&mut self, name: &str) -> ConfResult<()> {
        self.unit_format = name.parse()?;
        Ok(())
    }

    /// Change the reference wavelength. Units already stored are not touched.
    pub fn set_wavelength(&mut self, wavelength: Unit) {
        tracing::debug!(wavelength = %wavelength, "Reference wavelength changed");
        self.wavelength = wavelength;
    }

    /// Resolve a unit token against this configuration's reference wavelength.
    pub fn resolve(&self, token: impl Into<UnitToken>) -> ConfResult<Unit> {
        resolve_unit(token, &self.wavelength)
    }

    /// Label template for a domain.
    pub fn labels(&self, domain: Domain) -> &Labels {
        match domain {
            Domain::Pupil => &self.pupil_labels,
            Domain::Interferogram => &self.interferogram_labels,
            Domain::Convolvable => &self.convolvable_labels,
            Domain::Mtf => &self.mtf_labels,
            Domain::Ptf => &self.ptf_labels,
            Domain::Psd => &self.psd_labels,
        }
    }

    pub fn labels_mut(&mut self, domain: Domain) -> &mut Labels {
        match domain {
            Domain::Pupil => &mut self.pupil_labels,
            Domain::Interferogram => &mut self.interferogram_labels,
            Domain::Convolvable => &mut self.convolvable_labels,
            Domain::Mtf => &mut self.mtf_labels,
            Domain::Ptf => &mut self.ptf_labels,
            Domain::Psd => &mut self.psd_labels,
        }
    }

    /// Units used for a domain's axes.
    ///
    /// Interferograms are always in pixels by nm. PSD uses the MTF frequency
    /// unit and a z unit of phase² · length².
    pub fn units(&self, domain: Domain) -> DomainUnits {
        match domain {
            Domain::Pupil => DomainUnits::new(self.phase_xy_unit.clone(), self.phase_z_unit.clone()),
            Domain::Interferogram => defaults::default_interferogram_units(),
            Domain::Convolvable => {
                DomainUnits::new(self.image_xy_unit.clone(), self.image_z_unit.clone())
            }
            Domain::Mtf => DomainUnits::new(self.mtf_xy_unit.clone(), self.mtf_z_unit.clone()),
            Domain::Ptf => DomainUnits::new(self.ptf_xy_unit.clone(), self.ptf_z_unit.clone()),
            Domain::Psd => DomainUnits::new(
                self.mtf_xy_unit.clone(),
                &self.phase_z_unit.powi(2) * &self.phase_xy_unit.powi(2),
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
