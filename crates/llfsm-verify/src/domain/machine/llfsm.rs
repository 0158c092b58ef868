//! LLFSM Instances
//!
//! # Overview
//!
//! An [`Llfsm`] is one running instance of a [`MachineDefinition`]. A
//! single call to [`Llfsm::step`] is one ringlet:
//!
//! ```text
//!            ┌───────────────────────┐
//!            │ onEntry (if pending)  │
//!            └──────────┬────────────┘
//!                       ▼
//!           first guard that fires?
//!          ┌────────────┴────────────┐
//!         yes                        no
//!          ▼                         ▼
//!      onExit                     internal
//!      move to target             stay
//!      onEntry pending            onEntry not pending
//! ```
//!
//! A suspended or finished machine takes a no-op step. A machine is
//! finished once it sits in its exit state with `onEntry` already run.

use super::context::MachineContext;
use super::definition::{LlfsmBuilder, MachineDefinition};
use super::external::{ExternalKind, ExternalVariable};
use crate::domain::call::Gateway;
use crate::domain::clock::Clock;
use crate::error::ConfigurationError;
use llfsm_core::{ExecutableId, PropertyList, Value};
use std::fmt;
use std::sync::Arc;

/// Name reported as the previous state before the first transition
pub const INITIAL_PREVIOUS_STATE: &str = "initialPreviousState";

/// Observable effects of one ringlet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether a transition fired
    pub transitioned: bool,
    /// Result set by the actions, if any
    pub result: Option<Value>,
    /// Callee names that could not be resolved
    pub unresolved: Vec<String>,
}

/// A running low-level finite-state machine
#[derive(Clone)]
pub struct Llfsm {
    definition: Arc<MachineDefinition>,
    current_state: usize,
    previous_state: Option<usize>,
    should_execute_on_entry: bool,
    resume_state: Option<usize>,
    variables: PropertyList,
    externals: Vec<ExternalVariable>,
}

impl Llfsm {
    /// Start building a machine called `name`
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LlfsmBuilder {
        LlfsmBuilder::new(name)
    }

    pub(crate) fn from_definition(definition: Arc<MachineDefinition>) -> Self {
        Self {
            current_state: definition.initial_state,
            previous_state: None,
            should_execute_on_entry: true,
            resume_state: None,
            variables: definition.initial_variables.clone(),
            externals: definition.initial_externals.clone(),
            definition,
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Accessors
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Machine name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Shared definition
    #[must_use]
    pub fn definition(&self) -> &MachineDefinition {
        &self.definition
    }

    /// Name of the current state
    #[must_use]
    pub fn current_state(&self) -> &str {
        self.state_name(self.current_state)
    }

    /// Name of the previous state
    #[must_use]
    pub fn previous_state(&self) -> &str {
        self.previous_state
            .map_or(INITIAL_PREVIOUS_STATE, |index| self.state_name(index))
    }

    /// Whether `onEntry` runs on the next step
    #[must_use]
    pub const fn should_execute_on_entry(&self) -> bool {
        self.should_execute_on_entry
    }

    /// State to return to when resumed
    #[must_use]
    pub fn resume_state(&self) -> Option<&str> {
        self.resume_state.map(|index| self.state_name(index))
    }

    /// Machine variables
    #[must_use]
    pub const fn variables(&self) -> &PropertyList {
        &self.variables
    }

    /// Externals and their current values
    #[must_use]
    pub fn externals(&self) -> &[ExternalVariable] {
        &self.externals
    }

    fn state_name(&self, index: usize) -> &str {
        self.definition
            .states
            .get(index)
            .map_or("", |state| state.name())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Lifecycle
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// In the exit state with its `onEntry` already run
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.definition.exit_state == Some(self.current_state) && !self.should_execute_on_entry
    }

    /// In the suspend state
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.definition.suspend_state == Some(self.current_state)
    }

    /// Moves to the suspend state, remembering where to resume.
    ///
    /// Returns false if the machine has no suspend state or is already
    /// suspended.
    pub fn suspend(&mut self) -> bool {
        match self.definition.suspend_state {
            Some(suspend) if suspend != self.current_state => {
                self.resume_state = Some(self.current_state);
                self.previous_state = Some(self.current_state);
                self.current_state = suspend;
                self.should_execute_on_entry = true;
                true
            }
            _ => false,
        }
    }

    /// Returns from the suspend state. Returns false if not suspended.
    pub fn resume(&mut self) -> bool {
        match self.resume_state.take() {
            Some(resume) if self.is_suspended() => {
                self.previous_state = Some(self.current_state);
                self.current_state = resume;
                self.should_execute_on_entry = true;
                true
            }
            other => {
                self.resume_state = other;
                false
            }
        }
    }

    /// Returns to the initial state with initial variable values
    pub fn restart(&mut self) {
        self.current_state = self.definition.initial_state;
        self.previous_state = None;
        self.should_execute_on_entry = true;
        self.resume_state = None;
        self.variables = self.definition.initial_variables.clone();
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Data
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Overwrites a declared variable.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` or `TypeMismatch` against the declaration.
    pub fn set_variable(&mut self, name: &str, value: Value) -> Result<(), ConfigurationError> {
        let value_type = self.definition.variable_type(name).ok_or_else(|| {
            ConfigurationError::UnknownVariable {
                machine: self.name().to_owned(),
                name: name.to_owned(),
            }
        })?;
        if !value_type.accepts(&value) {
            return Err(ConfigurationError::TypeMismatch {
                name: name.to_owned(),
                expected: value_type.to_string(),
            });
        }
        self.variables.insert(name.to_owned(), value);
        Ok(())
    }

    /// Overwrites a declared external.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` or `TypeMismatch` against the declaration.
    pub fn set_external(&mut self, name: &str, value: Value) -> Result<(), ConfigurationError> {
        let Some(external) = self.externals.iter_mut().find(|e| e.name == name) else {
            return Err(ConfigurationError::UnknownVariable {
                machine: self.definition.name.clone(),
                name: name.to_owned(),
            });
        };
        if !external.value_type.accepts(&value) {
            return Err(ConfigurationError::TypeMismatch {
                name: name.to_owned(),
                expected: external.value_type.to_string(),
            });
        }
        external.value = value;
        Ok(())
    }

    /// Inputs read from the environment before the next step
    ///
    /// The current state's observed inputs, or every sensor and external
    /// variable if it does not restrict them. Suspended and finished
    /// machines observe nothing.
    #[must_use]
    pub fn observed_inputs(&self) -> Vec<&ExternalVariable> {
        if self.is_suspended() || self.has_finished() {
            return Vec::new();
        }
        let observes = self
            .definition
            .states
            .get(self.current_state)
            .and_then(|state| state.observes());
        self.externals
            .iter()
            .filter(|external| external.kind.is_input())
            .filter(|external| observes.map_or(true, |names| names.contains(&external.name)))
            .collect()
    }

    /// Actuators and external variables
    pub fn outputs(&self) -> impl Iterator<Item = &ExternalVariable> {
        self.externals.iter().filter(|external| external.kind.is_output())
    }

    /// Schema-driven snapshot of the whole machine
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let mut fields = PropertyList::new();
        fields.insert("currentState".into(), self.current_state().into());
        fields.insert("previousState".into(), self.previous_state().into());
        fields.insert(
            "shouldExecuteOnEntry".into(),
            self.should_execute_on_entry.into(),
        );
        fields.insert(
            "resumeState".into(),
            Value::Optional(self.resume_state().map(|name| Box::new(name.into()))),
        );
        fields.insert("variables".into(), Value::Compound(self.variables.clone()));
        for kind in [ExternalKind::Sensor, ExternalKind::Actuator, ExternalKind::Variable] {
            let group = self
                .externals
                .iter()
                .filter(|external| external.kind == kind)
                .map(|external| (external.name.clone(), external.value.clone()))
                .collect();
            fields.insert(kind.group().into(), Value::Compound(group));
        }
        Value::Compound(fields)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Execution
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Executes one ringlet.
    ///
    /// # Errors
    ///
    /// `UnknownState` if the instance points outside its definition.
    pub fn step(
        &mut self,
        id: ExecutableId,
        arguments: Option<&PropertyList>,
        clock: &mut dyn Clock,
        gateway: &mut dyn Gateway,
    ) -> Result<StepOutcome, ConfigurationError> {
        if self.is_suspended() || self.has_finished() {
            return Ok(StepOutcome::default());
        }
        let definition = Arc::clone(&self.definition);
        let state = definition.states.get(self.current_state).ok_or_else(|| {
            ConfigurationError::UnknownState {
                machine: definition.name.clone(),
                state: self.current_state.to_string(),
            }
        })?;

        let mut context = MachineContext::new(
            &definition,
            id,
            &mut self.variables,
            &mut self.externals,
            arguments,
            clock,
            gateway,
        );
        if self.should_execute_on_entry {
            if let Some(action) = state.on_entry_action() {
                action(&mut context);
            }
        }
        let target = state
            .transitions()
            .iter()
            .find(|transition| transition.fires(&mut context))
            .map(|transition| transition.target);
        let action = match target {
            Some(_) => state.on_exit_action(),
            None => state.internal_action(),
        };
        if let Some(action) = action {
            action(&mut context);
        }
        let (result, unresolved) = context.finish();

        self.previous_state = Some(self.current_state);
        if let Some(target) = target {
            self.current_state = target;
        }
        self.should_execute_on_entry = target.is_some();

        Ok(StepOutcome {
            transitioned: target.is_some(),
            result,
            unresolved,
        })
    }
}

impl PartialEq for Llfsm {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.snapshot() == other.snapshot()
    }
}

impl Eq for Llfsm {}

impl fmt::Debug for Llfsm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Llfsm")
            .field("name", &self.name())
            .field("current_state", &self.current_state())
            .field("previous_state", &self.previous_state())
            .field("should_execute_on_entry", &self.should_execute_on_entry)
            .field("variables", &self.variables)
            .field("externals", &self.externals)
            .finish()
    }
}
