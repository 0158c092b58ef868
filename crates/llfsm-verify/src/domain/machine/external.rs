//! External Variables
//!
//! Values a machine shares with its environment. Sensors are read from the
//! environment, actuators are written to it, and external variables go both
//! ways.

use llfsm_core::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an external
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExternalKind {
    /// Read from the environment
    Sensor,
    /// Written to the environment
    Actuator,
    /// Read and written
    Variable,
}

impl ExternalKind {
    /// Sensors and external variables
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Sensor | Self::Variable)
    }

    /// Actuators and external variables
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Actuator | Self::Variable)
    }

    /// Key this kind is grouped under in a machine snapshot
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::Sensor => "sensors",
            Self::Actuator => "actuators",
            Self::Variable => "externalVariables",
        }
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor => write!(f, "sensor"),
            Self::Actuator => write!(f, "actuator"),
            Self::Variable => write!(f, "external variable"),
        }
    }
}

/// A declared external and its current value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalVariable {
    /// Name shared with the environment
    pub name: String,
    /// Direction
    pub kind: ExternalKind,
    /// Declared shape
    pub value_type: ValueType,
    /// Current value
    pub value: Value,
}

impl ExternalVariable {
    /// Create an external holding the default value of `value_type`
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ExternalKind, value_type: ValueType) -> Self {
        let value = value_type.default_value();
        Self {
            name: name.into(),
            kind,
            value_type,
            value,
        }
    }
}
