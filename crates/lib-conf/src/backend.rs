//! Computational backend handle and change notification.
//!
//! Components that cache backend-specific state (compiled kernels, array
//! namespaces) subscribe to backend changes. When the backend is reassigned
//! every subscriber is called synchronously, in subscription order, with the
//! backend that was active before the change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque computational backend handle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Backend {
    /// Host CPU arrays.
    #[default]
    Cpu,
    /// GPU arrays.
    Gpu,
    /// Any other engine, identified by name.
    Named(String),
}

impl Backend {
    pub fn name(&self) -> &str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "cpu" | "np" | "numpy" => Self::Cpu,
            "gpu" | "cuda" | "cp" => Self::Gpu,
            _ => Self::Named(s.trim().to_string()),
        })
    }
}

impl From<String> for Backend {
    fn from(name: String) -> Self {
        match name.parse() {
            Ok(backend) => backend,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Backend {
    fn from(name: &str) -> Self {
        name.to_string().into()
    }
}

impl From<Backend> for String {
    fn from(backend: Backend) -> Self {
        backend.name().to_string()
    }
}

/// Callback invoked with the previous backend.
pub type BackendObserver = Box<dyn Fn(&Backend) + Send + Sync>;

/// Handle returned by [`BackendObservers::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Ordered registry of backend-change callbacks.
#[derive(Default)]
pub struct BackendObservers {
    observers: Vec<(SubscriptionId, BackendObserver)>,
    next_id: u64,
}

impl BackendObservers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it runs after every callback registered before it.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&Backend) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        tracing::debug!(id = id.0, total = self.observers.len(), "Backend observer subscribed");
        id
    }

    /// Remove a callback. Returns `false` if the handle was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        before != self.observers.len()
    }

    /// Call every observer, in subscription order, with `previous`.
    pub fn notify(&self, previous: &Backend) {
        tracing::debug!(
            previous = %previous,
            observers = self.observers.len(),
            "Notifying backend observers"
        );
        for (_, observer) in &self.observers {
            observer(previous);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for BackendObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendObservers")
            .field("count", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notify_in_subscription_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut observers = BackendObservers::new();

        for tag in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            observers.subscribe(move |prev| {
                calls.lock().unwrap().push(format!("{}:{}", tag, prev));
            });
        }

        observers.notify(&Backend::Gpu);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["first:gpu", "second:gpu", "third:gpu"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let calls = Arc::new(Mutex::new(0usize));
        let mut observers = BackendObservers::new();

        let counter = Arc::clone(&calls);
        let id = observers.subscribe(move |_| *counter.lock().unwrap() += 1);
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        assert!(observers.is_empty());

        observers.notify(&Backend::Cpu);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_backend_names() {
        assert_eq!("numpy".parse::<Backend>().unwrap(), Backend::Cpu);
        assert_eq!("CUDA".parse::<Backend>().unwrap(), Backend::Gpu);
        assert_eq!(
            "jax".parse::<Backend>().unwrap(),
            Backend::Named("jax".to_string())
        );
        assert_eq!(Backend::Named("jax".into()).to_string(), "jax");
    }
}
