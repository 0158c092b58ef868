//! Recording View
//!
//! Keeps everything it is given in memory. Used by tests and by callers
//! that post-process the structure themselves.

use crate::domain::kripke::{KripkeState, View};
use crate::error::ViewError;

/// In-memory record of a run
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    states: Vec<KripkeState>,
    resets: Vec<bool>,
    finish_count: usize,
}

impl RecordingView {
    /// Empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed states in commit order
    #[must_use]
    pub fn states(&self) -> &[KripkeState] {
        &self.states
    }

    /// `using_clocks` of every reset
    #[must_use]
    pub fn resets(&self) -> &[bool] {
        &self.resets
    }

    /// How often `finish` was called
    #[must_use]
    pub const fn finish_count(&self) -> usize {
        self.finish_count
    }

    /// Committed state whose `pc` is `pc`
    pub fn with_pc<'a>(&'a self, pc: &'a str) -> impl Iterator<Item = &'a KripkeState> + 'a {
        self.states.iter().filter(move |state| state.pc() == Some(pc))
    }
}

impl View for RecordingView {
    fn reset(&mut self, using_clocks: bool) -> Result<(), ViewError> {
        self.states.clear();
        self.finish_count = 0;
        self.resets.push(using_clocks);
        Ok(())
    }

    fn commit(&mut self, state: &KripkeState) -> Result<(), ViewError> {
        self.states.push(state.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ViewError> {
        self.finish_count += 1;
        Ok(())
    }
}
