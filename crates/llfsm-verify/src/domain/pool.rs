//! Executable Pool
//!
//! # Overview
//!
//! An [`ExecutablePool`] is one consistent snapshot of "the world": every
//! registered executable together with its registration record, sorted by
//! [`ExecutableId`]. Each explored branch owns its own pool; `cloned` is a
//! deep copy of all machine instance data.
//!
//! # Invariants
//!
//! - Entries are sorted by id and ids are unique, whatever the insertion
//!   order. Lookups binary-search on the id.
//! - Two pools are equal iff their records and snapshots are equal.

use crate::domain::machine::{ExecutableInformation, ExecutableType};
use crate::error::ConfigurationError;
use llfsm_core::{ExecutableId, PropertyList, Value};
use std::collections::BTreeSet;

/// Ordered, id-indexed registry of executables
#[derive(Debug, Clone, Default)]
pub struct ExecutablePool {
    executables: Vec<(ExecutableInformation, ExecutableType)>,
}

impl ExecutablePool {
    /// Builds a pool from unordered entries.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateExecutable`] if two entries share an id.
    pub fn new(
        mut executables: Vec<(ExecutableInformation, ExecutableType)>,
    ) -> Result<Self, ConfigurationError> {
        executables.sort_by_key(|(info, _)| info.id);
        if let Some(pair) = executables.windows(2).find(|pair| pair[0].0.id == pair[1].0.id) {
            return Err(ConfigurationError::DuplicateExecutable(pair[0].0.id));
        }
        Ok(Self { executables })
    }

    #[inline]
    fn position(&self, id: ExecutableId) -> Result<usize, usize> {
        self.executables.binary_search_by_key(&id, |(info, _)| info.id)
    }

    /// Whether `id` is registered
    #[must_use]
    pub fn has(&self, id: ExecutableId) -> bool {
        self.position(id).is_ok()
    }

    /// Whether `id` is registered and is not a call delegate
    #[must_use]
    pub fn has_that_isnt_delegate(&self, id: ExecutableId) -> bool {
        self.get(id).is_some_and(|executable| !executable.is_parameterised())
    }

    /// Position of `id` in sorted order
    #[must_use]
    pub fn index(&self, id: ExecutableId) -> Option<usize> {
        self.position(id).ok()
    }

    /// Executable registered under `id`
    #[must_use]
    pub fn get(&self, id: ExecutableId) -> Option<&ExecutableType> {
        self.index(id).map(|index| &self.executables[index].1)
    }

    /// Mutable executable registered under `id`
    pub fn get_mut(&mut self, id: ExecutableId) -> Option<&mut ExecutableType> {
        self.index(id).map(move |index| &mut self.executables[index].1)
    }

    /// Registration record of `id`
    #[must_use]
    pub fn information(&self, id: ExecutableId) -> Option<&ExecutableInformation> {
        self.index(id).map(|index| &self.executables[index].0)
    }

    /// Id of the executable called `name`
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ExecutableId> {
        self.executables
            .iter()
            .find(|(info, _)| info.name == name)
            .map(|(info, _)| info.id)
    }

    /// Replaces the entry with the same id, or inserts it in sorted position
    pub fn insert(&mut self, information: ExecutableInformation, executable: ExecutableType) {
        match self.position(information.id) {
            Ok(index) => self.executables[index] = (information, executable),
            Err(index) => self.executables.insert(index, (information, executable)),
        }
    }

    /// Deep copy of every execution context
    #[must_use]
    pub fn cloned(&self) -> Self {
        self.clone()
    }

    /// Entries in id order
    pub fn iter(&self) -> impl Iterator<Item = &(ExecutableInformation, ExecutableType)> {
        self.executables.iter()
    }

    /// Registered ids in order
    pub fn ids(&self) -> impl Iterator<Item = ExecutableId> + '_ {
        self.executables.iter().map(|(info, _)| info.id)
    }

    /// Executables in id order
    pub fn executables(&self) -> impl Iterator<Item = &ExecutableType> {
        self.executables.iter().map(|(_, executable)| executable)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.executables.len()
    }

    /// True when nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executables.is_empty()
    }

    /// Name → snapshot of every executable
    #[must_use]
    pub fn property_list(&self) -> PropertyList {
        self.executables
            .iter()
            .map(|(info, executable)| (info.name.clone(), executable.snapshot()))
            .collect()
    }

    /// [`property_list`](Self::property_list) as a compound value
    #[must_use]
    pub fn snapshot(&self) -> Value {
        Value::Compound(self.property_list())
    }

    /// External names and dependency names of `id`
    #[must_use]
    pub fn dependencies_of(&self, id: ExecutableId) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        if let Some(executable) = self.get(id) {
            names.extend(executable.machine().externals().iter().map(|e| e.name.clone()));
        }
        if let Some(info) = self.information(id) {
            names.extend(info.dependencies.iter().map(|d| d.name().to_owned()));
        }
        names
    }

    /// `base` with every executable that differs between `base` and
    /// `changed` taken from `changed`
    #[must_use]
    pub fn overlaid(&self, base: &Self, changed: &Self) -> Self {
        let mut result = self.clone();
        for (info, executable) in &changed.executables {
            let unchanged = base.get(info.id).is_some_and(|before| before == executable);
            if !unchanged {
                result.insert(info.clone(), executable.clone());
            }
        }
        result
    }
}

impl PartialEq for ExecutablePool {
    fn eq(&self, other: &Self) -> bool {
        self.executables.len() == other.executables.len()
            && self
                .executables
                .iter()
                .zip(&other.executables)
                .all(|((a_info, a), (b_info, b))| a_info == b_info && a.snapshot() == b.snapshot())
    }
}

impl Eq for ExecutablePool {}

impl<'p> IntoIterator for &'p ExecutablePool {
    type Item = &'p (ExecutableInformation, ExecutableType);
    type IntoIter = std::slice::Iter<'p, (ExecutableInformation, ExecutableType)>;

    fn into_iter(self) -> Self::IntoIter {
        self.executables.iter()
    }
}
