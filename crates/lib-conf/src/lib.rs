//! # lib-conf
//!
//! Validated configuration and unit-aware labelling for Optik.
//!
//! - **Unit resolution**: turn unit names (or the `waves` alias) into units
//! - **Unit formatting**: render units and quantities in a chosen notation
//! - **Labels**: per-domain axis label templates
//! - **Config**: validated library-wide settings with backend change observers
//! - **Settings**: TOML/JSON settings files and unit expressions
//!
//! ```
//! use lib_conf::{Config, Domain};
//! use lib_types::Notation;
//!
//! let mut config = Config::new();
//! config.unit_format = Notation::Unicode;
//!
//! let units = config.units(Domain::Pupil);
//! let label = config.labels(Domain::Pupil).x(&config, &units.xy, &units.z).unwrap();
//! assert_eq!(label, "Pupil ξ [mm]");
//! ```

pub mod backend;
pub mod config;
pub mod defaults;
pub mod error;
pub mod format;
pub mod labels;
pub mod resolve;
pub mod settings;
pub mod shared;
pub mod unit_expr;

pub use backend::{Backend, BackendObservers, SubscriptionId};
pub use config::Config;
pub use defaults::{Domain, DomainUnits};
pub use error::{ConfError, ConfResult};
pub use format::{format_unit, Formattable};
pub use labels::{AdditionSide, Labels};
pub use resolve::{resolve_unit, resolve_unit_in, UnitToken};
pub use settings::{load_settings, Settings, WavelengthSetting};
pub use shared::{install, shared, shared_mut};
pub use unit_expr::{parse_unit_expr, parse_unit_expr_in};
