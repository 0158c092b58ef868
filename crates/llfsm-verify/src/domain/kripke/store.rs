//! Persistent Store
//!
//! # Overview
//!
//! [`PersistentStore`] is where the verifier keeps the Kripke structure as
//! it grows. States are deduplicated by their property list; adding a
//! known property list returns the existing state.
//!
//! [`KripkeStructure`] is the in-memory arena. A durable, sled-backed
//! store lives in the infrastructure layer.

use super::state::{KripkeEdge, KripkeState};
use crate::error::StoreError;
use llfsm_core::{PropertyList, StateId};
use std::collections::HashMap;

/// Storage for a growing Kripke structure
pub trait PersistentStore {
    /// Adds a state, or returns the existing one with equal properties.
    /// `is_initial` is sticky: once initial, always initial.
    ///
    /// # Errors
    ///
    /// Backend failures.
    fn add(&mut self, properties: PropertyList, is_initial: bool) -> Result<(StateId, KripkeState), StoreError>;

    /// Adds `edge` to the state `source`.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownState`] if `source` does not exist.
    fn add_edge(&mut self, edge: KripkeEdge, source: StateId) -> Result<(), StoreError>;

    /// State stored under `id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownState`] if it does not exist.
    fn state(&self, id: StateId) -> Result<KripkeState, StoreError>;

    /// Id of the state with these properties.
    ///
    /// # Errors
    ///
    /// Backend failures.
    fn id(&self, properties: &PropertyList) -> Result<Option<StateId>, StoreError>;

    /// Whether a state with these properties exists.
    ///
    /// # Errors
    ///
    /// Backend failures.
    fn exists(&self, properties: &PropertyList) -> Result<bool, StoreError> {
        Ok(self.id(properties)?.is_some())
    }

    /// Number of states
    fn len(&self) -> usize;

    /// True when no state is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every state in id order.
    ///
    /// # Errors
    ///
    /// Backend or decoding failures.
    fn states(&self) -> Result<Vec<KripkeState>, StoreError>;

    /// Makes every write durable.
    ///
    /// # Errors
    ///
    /// Backend failures.
    fn flush(&mut self) -> Result<(), StoreError>;
}

/// In-memory Kripke structure
///
/// States live in an arena indexed by [`StateId`].
#[derive(Debug, Clone, Default)]
pub struct KripkeStructure {
    states: Vec<KripkeState>,
    ids: HashMap<PropertyList, StateId>,
}

impl KripkeStructure {
    /// Empty structure
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// States in id order
    pub fn iter(&self) -> impl Iterator<Item = &KripkeState> {
        self.states.iter()
    }

    /// Initial states
    pub fn initial_states(&self) -> impl Iterator<Item = &KripkeState> {
        self.states.iter().filter(|state| state.is_initial)
    }

    /// Total number of edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.states.iter().map(|state| state.edges.len()).sum()
    }

    /// First state matching `predicate`
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&KripkeState) -> bool) -> Option<&KripkeState> {
        self.states.iter().find(|state| predicate(state))
    }
}

impl PersistentStore for KripkeStructure {
    fn add(&mut self, properties: PropertyList, is_initial: bool) -> Result<(StateId, KripkeState), StoreError> {
        if let Some(&id) = self.ids.get(&properties) {
            let state = &mut self.states[id.as_usize()];
            state.is_initial |= is_initial;
            return Ok((id, state.clone()));
        }
        let id = StateId::new(self.states.len());
        let state = KripkeState::new(id, properties.clone(), is_initial);
        self.ids.insert(properties, id);
        self.states.push(state.clone());
        Ok((id, state))
    }

    fn add_edge(&mut self, edge: KripkeEdge, source: StateId) -> Result<(), StoreError> {
        self.states
            .get_mut(source.as_usize())
            .ok_or(StoreError::UnknownState(source))?
            .add_edge(edge);
        Ok(())
    }

    fn state(&self, id: StateId) -> Result<KripkeState, StoreError> {
        self.states
            .get(id.as_usize())
            .cloned()
            .ok_or(StoreError::UnknownState(id))
    }

    fn id(&self, properties: &PropertyList) -> Result<Option<StateId>, StoreError> {
        Ok(self.ids.get(properties).copied())
    }

    fn len(&self) -> usize {
        self.states.len()
    }

    fn states(&self) -> Result<Vec<KripkeState>, StoreError> {
        Ok(self.states.clone())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
