//! View
//!
//! A [`View`] receives the Kripke structure as it is discovered. The
//! verifier calls `reset` once before exploring, `commit` once per new
//! state after its outgoing edges are complete, and `finish` once when
//! exploration has drained.

use super::state::KripkeState;
use crate::error::ViewError;

/// Sink for discovered Kripke states
pub trait View {
    /// Prepares for a new run
    ///
    /// # Errors
    ///
    /// Sink failures.
    fn reset(&mut self, using_clocks: bool) -> Result<(), ViewError>;

    /// Receives a newly discovered state with all its edges
    ///
    /// # Errors
    ///
    /// Sink failures.
    fn commit(&mut self, state: &KripkeState) -> Result<(), ViewError>;

    /// Called once after the last commit
    ///
    /// # Errors
    ///
    /// Sink failures.
    fn finish(&mut self) -> Result<(), ViewError>;
}
