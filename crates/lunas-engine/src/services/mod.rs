//! Keyed service registry.
//!
//! Host code uses it to hand shared collaborators (surface providers, audio,
//! asset caches) to the objects that register callbacks, without constructor
//! bloat or process-wide globals. The registry is an ordinary value: create one
//! at startup, pass it (or a clone of the services it holds) where needed, and
//! `clear` it on teardown.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::LunasError;

#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Rc<dyn Any>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `service` under `key`, returning the service it replaced.
    pub fn add<T: Any>(&mut self, key: impl Into<String>, service: Rc<T>) -> Option<Rc<dyn Any>> {
        let key = key.into();
        log::debug!("service registered: {key}");
        self.services.insert(key, service)
    }

    /// Looks up `key` and downcasts it to `T`.
    pub fn get<T: Any>(&self, key: &str) -> Result<Rc<T>, LunasError> {
        let service = self
            .services
            .get(key)
            .ok_or_else(|| LunasError::ServiceNotFound(key.to_string()))?;

        Rc::clone(service)
            .downcast::<T>()
            .map_err(|_| LunasError::ServiceTypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.services.contains_key(key)
    }

    /// Removes `key`. Returns `false` if nothing was registered under it.
    pub fn remove(&mut self, key: &str) -> bool {
        self.services.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.services.clear();
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
