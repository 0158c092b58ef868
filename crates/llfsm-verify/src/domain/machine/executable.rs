//! Executables
//!
//! # Overview
//!
//! Everything the scheduler can run is an [`ExecutableType`], a closed
//! enum over the two kinds of machine:
//!
//! - `Controllable`: a plain LLFSM scheduled directly in a timeslot.
//! - `Parameterised`: an LLFSM that runs on behalf of a caller. It is
//!   started by a [`Call`], takes typed parameters and reports a result.
//!
//! ```text
//!   Inactive ──begin(call)──▶ Executing ──finished──▶ Inactive
//!                              │    ▲                 (result stored)
//!                              └step┘
//! ```

use super::llfsm::{Llfsm, StepOutcome};
use crate::domain::call::{Call, Gateway, Parameters};
use crate::domain::clock::Clock;
use crate::error::ConfigurationError;
use llfsm_core::{ExecutableId, PropertyList, Value, ValueType};
use serde::{Deserialize, Serialize};

/// Something an executable needs from its surroundings
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dependency {
    /// Called synchronously
    Callable(String),
    /// Invoked asynchronously
    Invocable(String),
    /// Controlled as a submachine
    Submachine(String),
}

impl Dependency {
    /// Name of the executable depended on
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Callable(name) | Self::Invocable(name) | Self::Submachine(name) => name,
        }
    }
}

/// Registration record of an executable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutableInformation {
    /// Pool key
    pub id: ExecutableId,
    /// Unique name
    pub name: String,
    /// Executables this one interacts with
    pub dependencies: Vec<Dependency>,
}

impl ExecutableInformation {
    /// Create a record with no dependencies
    #[must_use]
    pub fn new(id: ExecutableId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    /// Adds a dependency
    #[must_use]
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// Whether a parameterised machine is servicing a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    /// Waiting for a call
    Inactive,
    /// Running on behalf of a caller
    Executing,
}

impl CallStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Executing => "executing",
        }
    }
}

/// An LLFSM started by calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterisedMachine {
    machine: Llfsm,
    parameters: Vec<(String, ValueType)>,
    arguments: PropertyList,
    result: Option<Value>,
    status: CallStatus,
}

impl ParameterisedMachine {
    /// Wraps `machine` with the given parameter declarations
    #[must_use]
    pub fn new(machine: Llfsm, parameters: Vec<(String, ValueType)>) -> Self {
        let arguments = parameters
            .iter()
            .map(|(name, ty)| (name.clone(), ty.default_value()))
            .collect();
        Self {
            machine,
            parameters,
            arguments,
            result: None,
            status: CallStatus::Inactive,
        }
    }

    /// Wrapped machine
    #[must_use]
    pub const fn machine(&self) -> &Llfsm {
        &self.machine
    }

    /// Mutable access to the wrapped machine
    pub fn machine_mut(&mut self) -> &mut Llfsm {
        &mut self.machine
    }

    /// Arguments of the current (or last) call
    #[must_use]
    pub const fn arguments(&self) -> &PropertyList {
        &self.arguments
    }

    /// Result of the last completed call
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Current status
    #[must_use]
    pub const fn status(&self) -> CallStatus {
        self.status
    }

    /// Starts servicing a call.
    ///
    /// Missing or `None` arguments take the parameter's default value.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` for an undeclared parameter, `TypeMismatch` for an
    /// argument outside its declared type.
    pub fn begin(&mut self, parameters: &Parameters) -> Result<(), ConfigurationError> {
        if let Some(unknown) = parameters
            .keys()
            .find(|name| !self.parameters.iter().any(|(declared, _)| declared == *name))
        {
            return Err(ConfigurationError::UnknownVariable {
                machine: self.machine.name().to_owned(),
                name: unknown.clone(),
            });
        }
        let mut arguments = PropertyList::new();
        for (name, ty) in &self.parameters {
            let value = match parameters.get(name) {
                Some(Some(value)) if ty.accepts(value) => value.clone(),
                Some(Some(_)) => {
                    return Err(ConfigurationError::TypeMismatch {
                        name: name.clone(),
                        expected: ty.to_string(),
                    })
                }
                Some(None) | None => ty.default_value(),
            };
            arguments.insert(name.clone(), value);
        }
        self.arguments = arguments;
        self.machine.restart();
        self.status = CallStatus::Executing;
        Ok(())
    }

    /// Executes one ringlet if a call is being serviced.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Llfsm::step`].
    pub fn step(
        &mut self,
        id: ExecutableId,
        clock: &mut dyn Clock,
        gateway: &mut dyn Gateway,
    ) -> Result<StepOutcome, ConfigurationError> {
        if self.status != CallStatus::Executing {
            return Ok(StepOutcome::default());
        }
        let outcome = self.machine.step(id, Some(&self.arguments), clock, gateway)?;
        if let Some(result) = &outcome.result {
            self.result = Some(result.clone());
        }
        if self.machine.has_finished() {
            self.status = CallStatus::Inactive;
        }
        Ok(outcome)
    }

    /// Machine snapshot extended with `parameters`, `result` and `status`
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let mut snapshot = self.machine.snapshot();
        if let Some(fields) = snapshot.as_compound_mut() {
            fields.insert("parameters".into(), Value::Compound(self.arguments.clone()));
            fields.insert(
                "result".into(),
                Value::Optional(self.result.clone().map(Box::new)),
            );
            fields.insert("status".into(), self.status.as_str().into());
        }
        snapshot
    }
}

/// Closed set of executable kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableType {
    /// Scheduled directly
    Controllable(Llfsm),
    /// Runs on behalf of callers
    Parameterised(ParameterisedMachine),
}

impl ExecutableType {
    /// Machine name
    #[must_use]
    pub fn name(&self) -> &str {
        self.machine().name()
    }

    /// Underlying machine
    #[must_use]
    pub const fn machine(&self) -> &Llfsm {
        match self {
            Self::Controllable(machine) => machine,
            Self::Parameterised(parameterised) => parameterised.machine(),
        }
    }

    /// Mutable underlying machine
    pub fn machine_mut(&mut self) -> &mut Llfsm {
        match self {
            Self::Controllable(machine) => machine,
            Self::Parameterised(parameterised) => parameterised.machine_mut(),
        }
    }

    /// True for call delegates
    #[must_use]
    pub const fn is_parameterised(&self) -> bool {
        matches!(self, Self::Parameterised(_))
    }

    /// Result of the last completed call, for parameterised machines
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match self {
            Self::Controllable(_) => None,
            Self::Parameterised(parameterised) => parameterised.result(),
        }
    }

    /// Starts servicing `call`.
    ///
    /// # Errors
    ///
    /// `NotCallable` for controllable machines, otherwise as
    /// [`ParameterisedMachine::begin`].
    pub fn begin(&mut self, call: &Call) -> Result<(), ConfigurationError> {
        match self {
            Self::Controllable(machine) => Err(ConfigurationError::NotCallable(machine.name().to_owned())),
            Self::Parameterised(parameterised) => parameterised.begin(&call.parameters),
        }
    }

    /// Executes one ringlet.
    ///
    /// # Errors
    ///
    /// Propagates machine errors.
    pub fn step(
        &mut self,
        id: ExecutableId,
        clock: &mut dyn Clock,
        gateway: &mut dyn Gateway,
    ) -> Result<StepOutcome, ConfigurationError> {
        match self {
            Self::Controllable(machine) => machine.step(id, None, clock, gateway),
            Self::Parameterised(parameterised) => parameterised.step(id, clock, gateway),
        }
    }

    /// Snapshot of the executable
    #[must_use]
    pub fn snapshot(&self) -> Value {
        match self {
            Self::Controllable(machine) => machine.snapshot(),
            Self::Parameterised(parameterised) => parameterised.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{CallMethod, PoolGateway};
    use crate::domain::clock::{ScheduleTiming, SteppedClock};
    use crate::domain::machine::State;

    fn doubler() -> ParameterisedMachine {
        let machine = Llfsm::builder("Doubler")
            .state(State::new("Compute").transition("Done", |_| true).on_exit(|ctx| {
                let n = ctx.parameter("n").and_then(Value::as_i128).unwrap_or(0);
                ctx.set_result(u8::try_from(n * 2).unwrap_or(u8::MAX));
            }))
            .state(State::new("Done"))
            .exit_state("Done")
            .build()
            .unwrap();
        ParameterisedMachine::new(machine, vec![("n".into(), ValueType::U8)])
    }

    fn call(parameters: Parameters) -> Call {
        Call::new(
            ExecutableId::new(0),
            ExecutableId::new(1),
            parameters,
            CallMethod::Synchronous,
        )
    }

    fn step(executable: &mut ExecutableType) {
        let timing = ScheduleTiming::default();
        let mut clock = SteppedClock::new(&timing, 0);
        let mut gateway = PoolGateway::default();
        executable
            .step(ExecutableId::new(1), &mut clock, &mut gateway)
            .unwrap();
    }

    #[test]
    fn test_inactive_machine_does_not_step() {
        let mut executable = ExecutableType::Parameterised(doubler());
        let before = executable.snapshot();
        step(&mut executable);
        assert_eq!(executable.snapshot(), before);
    }

    #[test]
    fn test_call_lifecycle() {
        let mut executable = ExecutableType::Parameterised(doubler());
        let mut parameters = Parameters::new();
        parameters.insert("n".into(), Some(Value::U8(4)));
        executable.begin(&call(parameters)).unwrap();

        step(&mut executable);
        assert_eq!(executable.result(), Some(&Value::U8(8)));
        step(&mut executable);

        let ExecutableType::Parameterised(machine) = &executable else {
            panic!("expected parameterised machine");
        };
        assert_eq!(machine.status(), CallStatus::Inactive);
        assert_eq!(
            executable.snapshot().lookup("status"),
            Some(&Value::from("inactive"))
        );
    }

    #[test]
    fn test_missing_argument_uses_default() {
        let mut machine = doubler();
        let mut parameters = Parameters::new();
        parameters.insert("n".into(), None);
        machine.begin(&parameters).unwrap();
        assert_eq!(machine.arguments().get("n"), Some(&Value::U8(0)));
        assert_eq!(machine.status(), CallStatus::Executing);
    }

    #[test]
    fn test_bad_arguments_rejected() {
        let mut machine = doubler();
        let mut parameters = Parameters::new();
        parameters.insert("n".into(), Some(Value::Bool(true)));
        assert!(matches!(
            machine.begin(&parameters),
            Err(ConfigurationError::TypeMismatch { .. })
        ));

        let mut parameters = Parameters::new();
        parameters.insert("m".into(), None);
        assert!(matches!(
            machine.begin(&parameters),
            Err(ConfigurationError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn test_controllable_not_callable() {
        let machine = Llfsm::builder("Plain").state(State::new("A")).build().unwrap();
        let mut executable = ExecutableType::Controllable(machine);
        assert_eq!(
            executable.begin(&call(Parameters::new())),
            Err(ConfigurationError::NotCallable("Plain".into()))
        );
    }
}
