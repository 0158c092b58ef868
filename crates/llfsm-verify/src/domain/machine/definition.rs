//! Machine Definitions
//!
//! # Overview
//!
//! A [`MachineDefinition`] is the immutable, shareable part of an LLFSM:
//! its states, their actions and guarded transitions, and the declared
//! shape of every variable and external. Instances ([`Llfsm`]) hold an
//! `Arc` to their definition, so cloning a pool for a new branch copies
//! only instance data.
//!
//! # Builder
//!
//! ```rust
//! use llfsm_core::ValueType;
//! use llfsm_verify::domain::machine::{Llfsm, State};
//!
//! let machine = Llfsm::builder("Switch")
//!     .sensor("button", ValueType::Bool)
//!     .state(State::new("Off").transition("On", |ctx| ctx.bool_external("button")))
//!     .state(State::new("On"))
//!     .initial_state("Off")
//!     .exit_state("On")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(machine.current_state(), "Off");
//! ```

use super::context::MachineContext;
use super::external::{ExternalKind, ExternalVariable};
use super::llfsm::Llfsm;
use crate::error::ConfigurationError;
use llfsm_core::{PropertyList, Value, ValueType};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// State action (`onEntry`, `onExit` or `internal`)
pub type Action = Arc<dyn Fn(&mut MachineContext<'_>) + Send + Sync>;

/// Transition guard
pub type Guard = Arc<dyn Fn(&mut MachineContext<'_>) -> bool + Send + Sync>;

/// Guarded transition to a target state
#[derive(Clone)]
pub struct Transition {
    /// Index of the target state
    pub target: usize,
    guard: Guard,
}

impl Transition {
    /// Evaluates the guard
    pub fn fires(&self, context: &mut MachineContext<'_>) -> bool {
        (self.guard)(context)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition").field("target", &self.target).finish_non_exhaustive()
    }
}

/// A named state with its actions and outgoing transitions
#[derive(Clone)]
pub struct State {
    name: String,
    on_entry: Option<Action>,
    on_exit: Option<Action>,
    internal: Option<Action>,
    transitions: Vec<(String, Guard)>,
    resolved: Vec<Transition>,
    observes: Option<Vec<String>>,
}

impl State {
    /// Create a state with no actions and no transitions
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_entry: None,
            on_exit: None,
            internal: None,
            transitions: Vec::new(),
            resolved: Vec::new(),
            observes: None,
        }
    }

    /// Sets the `onEntry` action
    #[must_use]
    pub fn on_entry(mut self, action: impl Fn(&mut MachineContext<'_>) + Send + Sync + 'static) -> Self {
        self.on_entry = Some(Arc::new(action));
        self
    }

    /// Sets the `onExit` action
    #[must_use]
    pub fn on_exit(mut self, action: impl Fn(&mut MachineContext<'_>) + Send + Sync + 'static) -> Self {
        self.on_exit = Some(Arc::new(action));
        self
    }

    /// Sets the `internal` action
    #[must_use]
    pub fn internal(mut self, action: impl Fn(&mut MachineContext<'_>) + Send + Sync + 'static) -> Self {
        self.internal = Some(Arc::new(action));
        self
    }

    /// Appends a transition; earlier transitions take priority
    #[must_use]
    pub fn transition(
        mut self,
        target: impl Into<String>,
        guard: impl Fn(&mut MachineContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.transitions.push((target.into(), Arc::new(guard)));
        self
    }

    /// Restricts the inputs read while in this state
    ///
    /// Without this, a state observes every sensor and external variable.
    #[must_use]
    pub fn observing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.observes = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// State name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transitions in priority order
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.resolved
    }

    /// Inputs this state restricts itself to, if any
    #[must_use]
    pub fn observes(&self) -> Option<&[String]> {
        self.observes.as_deref()
    }

    pub(crate) fn on_entry_action(&self) -> Option<&Action> {
        self.on_entry.as_ref()
    }

    pub(crate) fn on_exit_action(&self) -> Option<&Action> {
        self.on_exit.as_ref()
    }

    pub(crate) fn internal_action(&self) -> Option<&Action> {
        self.internal.as_ref()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("transitions", &self.resolved)
            .field("observes", &self.observes)
            .finish_non_exhaustive()
    }
}

/// Immutable description of an LLFSM
#[derive(Debug)]
pub struct MachineDefinition {
    /// Machine name
    pub name: String,
    /// States in declaration order
    pub states: Vec<State>,
    /// Index of the initial state
    pub initial_state: usize,
    /// Index of the exit state
    pub exit_state: Option<usize>,
    /// Index of the suspend state
    pub suspend_state: Option<usize>,
    /// Declared variables and their types
    pub variable_types: Vec<(String, ValueType)>,
    /// Variable values on (re)start
    pub initial_variables: PropertyList,
    /// Declared externals with their initial values
    pub initial_externals: Vec<ExternalVariable>,
}

impl MachineDefinition {
    /// Index of the state called `name`
    #[must_use]
    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|state| state.name == name)
    }

    /// Declared type of variable `name`
    #[must_use]
    pub fn variable_type(&self, name: &str) -> Option<&ValueType> {
        self.variable_types
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, ty)| ty)
    }
}

/// Builder for [`Llfsm`]
pub struct LlfsmBuilder {
    name: String,
    states: Vec<State>,
    initial_state: Option<String>,
    exit_state: Option<String>,
    suspend_state: Option<String>,
    variables: Vec<(String, ValueType, Value)>,
    externals: Vec<ExternalVariable>,
}

impl LlfsmBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            initial_state: None,
            exit_state: None,
            suspend_state: None,
            variables: Vec::new(),
            externals: Vec::new(),
        }
    }

    /// Adds a state
    #[must_use]
    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Names the initial state (defaults to the first state)
    #[must_use]
    pub fn initial_state(mut self, name: impl Into<String>) -> Self {
        self.initial_state = Some(name.into());
        self
    }

    /// Names the exit state
    #[must_use]
    pub fn exit_state(mut self, name: impl Into<String>) -> Self {
        self.exit_state = Some(name.into());
        self
    }

    /// Names the suspend state
    #[must_use]
    pub fn suspend_state(mut self, name: impl Into<String>) -> Self {
        self.suspend_state = Some(name.into());
        self
    }

    /// Declares a machine variable
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value_type: ValueType, initial: impl Into<Value>) -> Self {
        self.variables.push((name.into(), value_type, initial.into()));
        self
    }

    /// Declares a sensor
    #[must_use]
    pub fn sensor(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.external(ExternalVariable::new(name, ExternalKind::Sensor, value_type))
    }

    /// Declares an actuator
    #[must_use]
    pub fn actuator(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.external(ExternalVariable::new(name, ExternalKind::Actuator, value_type))
    }

    /// Declares a bidirectional external variable
    #[must_use]
    pub fn external_variable(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.external(ExternalVariable::new(name, ExternalKind::Variable, value_type))
    }

    /// Declares an external, replacing any previous declaration of its name
    #[must_use]
    pub fn external(mut self, external: ExternalVariable) -> Self {
        self.externals.retain(|existing| existing.name != external.name);
        self.externals.push(external);
        self
    }

    /// Validates the definition and creates the machine in its initial state.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] when the machine has no states, declares a
    /// state twice, references an unknown state or input, or gives a
    /// variable or external a value outside its declared type.
    pub fn build(self) -> Result<Llfsm, ConfigurationError> {
        let machine = self.name;
        if self.states.is_empty() {
            return Err(ConfigurationError::EmptyMachine(machine));
        }

        let mut seen = BTreeSet::new();
        for state in &self.states {
            if !seen.insert(state.name.as_str()) {
                return Err(ConfigurationError::DuplicateState {
                    machine: machine.clone(),
                    state: state.name.clone(),
                });
            }
        }

        let index_of = |name: &str| -> Result<usize, ConfigurationError> {
            self.states
                .iter()
                .position(|state| state.name == name)
                .ok_or_else(|| ConfigurationError::UnknownState {
                    machine: machine.clone(),
                    state: name.to_owned(),
                })
        };

        let initial_state = match &self.initial_state {
            Some(name) => index_of(name)?,
            None => 0,
        };
        let exit_state = self.exit_state.as_deref().map(index_of).transpose()?;
        let suspend_state = self.suspend_state.as_deref().map(index_of).transpose()?;

        let mut states = Vec::with_capacity(self.states.len());
        for mut state in self.states.iter().cloned() {
            state.resolved = state
                .transitions
                .iter()
                .map(|(target, guard)| {
                    index_of(target).map(|target| Transition {
                        target,
                        guard: Arc::clone(guard),
                    })
                })
                .collect::<Result<_, _>>()?;
            if let Some(observes) = &state.observes {
                for name in observes {
                    let known = self
                        .externals
                        .iter()
                        .any(|external| &external.name == name && external.kind.is_input());
                    if !known {
                        return Err(ConfigurationError::UnknownVariable {
                            machine: machine.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
            states.push(state);
        }

        let mut initial_variables = PropertyList::new();
        let mut variable_types = Vec::with_capacity(self.variables.len());
        for (name, value_type, value) in self.variables {
            if !value_type.accepts(&value) {
                return Err(ConfigurationError::TypeMismatch {
                    name,
                    expected: value_type.to_string(),
                });
            }
            initial_variables.insert(name.clone(), value);
            variable_types.push((name, value_type));
        }

        for external in &self.externals {
            if !external.value_type.accepts(&external.value) {
                return Err(ConfigurationError::TypeMismatch {
                    name: external.name.clone(),
                    expected: external.value_type.to_string(),
                });
            }
        }

        let definition = MachineDefinition {
            name: machine,
            states,
            initial_state,
            exit_state,
            suspend_state,
            variable_types,
            initial_variables,
            initial_externals: self.externals,
        };
        Ok(Llfsm::from_definition(Arc::new(definition)))
    }
}

impl fmt::Debug for LlfsmBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlfsmBuilder")
            .field("name", &self.name)
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}
