//! The process-wide configuration instance.
//!
//! Library code should take a `&Config` where it can; this instance exists
//! for callers that have no configuration of their own to pass around. It is
//! created with the defaults on first access and lives for the rest of the
//! process.

use crate::config::Config;
use once_cell::sync::Lazy;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

static SHARED: Lazy<RwLock<Config>> = Lazy::new(|| {
    tracing::debug!("Creating shared config");
    RwLock::new(Config::new())
});

/// Helper trait to recover from poisoned locks.
///
/// A panic inside a backend observer poisons the lock. Every setter leaves
/// the config valid before observers run, so the data is still usable.
trait RecoverLock<T> {
    fn read_recover(&self) -> RwLockReadGuard<'_, T>;
    fn write_recover(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> RecoverLock<T> for RwLock<T> {
    fn read_recover(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Shared config lock was poisoned, recovering data");
            poisoned.into_inner()
        })
    }

    fn write_recover(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Shared config lock was poisoned, recovering data");
            poisoned.into_inner()
        })
    }
}

fn instance() -> &'static RwLock<Config> {
    &SHARED
}

/// Read access to the shared configuration.
///
/// Do not hold the guard across a call to [`shared_mut`] on the same thread.
pub fn shared() -> RwLockReadGuard<'static, Config> {
    instance().read_recover()
}

/// Write access to the shared configuration.
pub fn shared_mut() -> RwLockWriteGuard<'static, Config> {
    instance().write_recover()
}

/// Replace the shared configuration, keeping its backend observers.
pub fn install(config: Config) {
    shared_mut().replace_with(config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::Notation;

    // Tests here share one process-wide instance, so each one restores what
    // it changes and they avoid asserting on values other tests touch.

    #[test]
    fn test_same_instance_across_calls() {
        let a: *const Config = &*shared();
        let b: *const Config = &*shared();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mutation_visible_to_later_readers() {
        let previous = shared().unit_format;
        shared_mut().unit_format = Notation::Generic;
        assert_eq!(shared().unit_format, Notation::Generic);
        shared_mut().unit_format = previous;
    }
}
