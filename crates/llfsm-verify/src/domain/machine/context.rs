//! Machine Context
//!
//! The only view of the world an action or guard gets. It exposes the
//! machine's own variables and externals, the arguments of the current
//! call (for parameterised machines), the clock and the gateway.

use super::definition::MachineDefinition;
use super::external::ExternalVariable;
use crate::domain::call::{Gateway, Parameters, Promise};
use crate::domain::clock::Clock;
use llfsm_core::{ExecutableId, PropertyList, TimeNs, Value};

/// Per-step handle passed to actions and guards
pub struct MachineContext<'a> {
    definition: &'a MachineDefinition,
    id: ExecutableId,
    variables: &'a mut PropertyList,
    externals: &'a mut [ExternalVariable],
    arguments: Option<&'a PropertyList>,
    clock: &'a mut dyn Clock,
    gateway: &'a mut dyn Gateway,
    result: Option<Value>,
    unresolved: Vec<String>,
}

impl<'a> MachineContext<'a> {
    pub(crate) fn new(
        definition: &'a MachineDefinition,
        id: ExecutableId,
        variables: &'a mut PropertyList,
        externals: &'a mut [ExternalVariable],
        arguments: Option<&'a PropertyList>,
        clock: &'a mut dyn Clock,
        gateway: &'a mut dyn Gateway,
    ) -> Self {
        Self {
            definition,
            id,
            variables,
            externals,
            arguments,
            clock,
            gateway,
            result: None,
            unresolved: Vec::new(),
        }
    }

    /// Name of the running machine
    #[must_use]
    pub fn machine(&self) -> &str {
        &self.definition.name
    }

    /// Id of the running machine
    #[must_use]
    pub const fn id(&self) -> ExecutableId {
        self.id
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Data
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Current value of a machine variable
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Overwrites a declared machine variable. Returns false if `name` is
    /// not declared or its type does not accept `value`.
    pub fn set_variable(&mut self, name: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        match (self.definition.variable_type(name), self.variables.get_mut(name)) {
            (Some(value_type), Some(slot)) if value_type.accepts(&value) => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    /// Current value of an external
    #[must_use]
    pub fn external(&self, name: &str) -> Option<&Value> {
        self.externals
            .iter()
            .find(|external| external.name == name)
            .map(|external| &external.value)
    }

    /// Boolean external, `false` when missing or not a boolean
    #[must_use]
    pub fn bool_external(&self, name: &str) -> bool {
        self.external(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Writes an external. Returns false if `name` is not declared or the
    /// value does not match its type.
    pub fn set_external(&mut self, name: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        match self.externals.iter_mut().find(|external| external.name == name) {
            Some(external) if external.value_type.accepts(&value) => {
                external.value = value;
                true
            }
            _ => false,
        }
    }

    /// Argument of the current call
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.arguments.and_then(|arguments| arguments.get(name))
    }

    /// Sets the value returned to the caller when the machine finishes
    pub fn set_result(&mut self, value: impl Into<Value>) {
        self.result = Some(value.into());
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Time
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// True iff more than `duration` has elapsed in the current state
    pub fn after(&mut self, duration: TimeNs) -> bool {
        self.clock.after(duration)
    }

    /// Time elapsed in the current state
    #[must_use]
    pub fn elapsed(&self) -> TimeNs {
        self.clock.elapsed()
    }

    /// Length of this machine's timeslot
    #[must_use]
    pub fn ringlet_length(&self) -> Option<TimeNs> {
        self.clock.ringlet_length(self.id)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Calls
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Synchronously calls the executable called `name`
    ///
    /// Returns `None` when the name cannot be resolved; the step is then
    /// reported as a configuration error.
    pub fn call(&mut self, name: &str, parameters: Parameters) -> Option<Promise> {
        let callee = self.resolve(name)?;
        Some(self.gateway.call(callee, parameters, self.id))
    }

    /// Asynchronously invokes the executable called `name`
    pub fn invoke(&mut self, name: &str, parameters: Parameters) -> Option<Promise> {
        let callee = self.resolve(name)?;
        Some(self.gateway.invoke(callee, parameters, self.id))
    }

    /// Latest result of the executable called `name`
    #[must_use]
    pub fn result_of(&self, name: &str) -> Option<Value> {
        self.gateway
            .id(name)
            .and_then(|callee| self.gateway.result(callee))
    }

    fn resolve(&mut self, name: &str) -> Option<ExecutableId> {
        let id = self.gateway.id(name);
        if id.is_none() {
            self.unresolved.push(name.to_owned());
        }
        id
    }

    pub(crate) fn finish(self) -> (Option<Value>, Vec<String>) {
        (self.result, self.unresolved)
    }
}
