//! Environment
//!
//! The live scheduler's view of the world outside the machines: a flat
//! name → value map that sensors are read from and actuators are written
//! to.

use llfsm_core::{PropertyList, Value};
use parking_lot::RwLock;
use std::sync::Arc;

/// Source of inputs and sink of outputs for the live scheduler
pub trait Environment {
    /// Current value of `name`, if the environment knows it
    fn read(&self, name: &str) -> Option<Value>;

    /// Publishes `value` under `name`
    fn write(&self, name: &str, value: Value);
}

/// Cloneable handle to an in-memory environment
///
/// Clones share the same map, so a test or device driver can hold one
/// handle while the scheduler holds another.
#[derive(Debug, Clone, Default)]
pub struct SharedEnvironment {
    values: Arc<RwLock<PropertyList>>,
}

impl SharedEnvironment {
    /// Empty environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment pre-populated with `values`
    #[must_use]
    pub fn with_values(values: PropertyList) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Copy of every value
    #[must_use]
    pub fn snapshot(&self) -> PropertyList {
        self.values.read().clone()
    }
}

impl Environment for SharedEnvironment {
    fn read(&self, name: &str) -> Option<Value> {
        self.values.read().get(name).cloned()
    }

    fn write(&self, name: &str, value: Value) {
        self.values.write().insert(name.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_values() {
        let env = SharedEnvironment::new();
        let handle = env.clone();
        handle.write("button", Value::Bool(true));
        assert_eq!(env.read("button"), Some(Value::Bool(true)));
        assert_eq!(env.read("missing"), None);
        assert_eq!(env.snapshot().len(), 1);
    }
}
