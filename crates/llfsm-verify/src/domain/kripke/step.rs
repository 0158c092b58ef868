//! Step Markers
//!
//! Every Kripke state carries a `pc` property naming where in the
//! schedule it sits:
//!
//! ```text
//!   <machine>.<state>.R   snapshot taken, section about to run
//!   <machine>.<state>.E   intermediate step of a section executed
//!   <machine>.<state>.W   section finished, outputs written
//! ```

use llfsm_core::Value;
use std::fmt;

/// Phase of a section a Kripke state belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    /// Read the environment
    TakeSnapshot,
    /// Executed a timeslot
    Execute,
    /// Wrote the environment
    SaveSnapshot,
}

impl StepKind {
    /// Single-letter marker
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::TakeSnapshot => "R",
            Self::Execute => "E",
            Self::SaveSnapshot => "W",
        }
    }
}

/// The `pc` property of a Kripke state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepMarker {
    /// Machine the step belongs to
    pub executable: String,
    /// State the machine was in
    pub state: String,
    /// Phase
    pub kind: StepKind,
}

impl StepMarker {
    /// Create a marker
    #[must_use]
    pub fn new(executable: impl Into<String>, state: impl Into<String>, kind: StepKind) -> Self {
        Self {
            executable: executable.into(),
            state: state.into(),
            kind,
        }
    }
}

impl fmt::Display for StepMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.executable, self.state, self.kind.marker())
    }
}

impl From<&StepMarker> for Value {
    fn from(marker: &StepMarker) -> Self {
        Self::String(marker.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let marker = StepMarker::new("Switch", "Off", StepKind::SaveSnapshot);
        assert_eq!(marker.to_string(), "Switch.Off.W");
        assert_eq!(Value::from(&marker), Value::from("Switch.Off.W"));
        assert_eq!(StepKind::TakeSnapshot.marker(), "R");
        assert_eq!(StepKind::Execute.marker(), "E");
    }
}
