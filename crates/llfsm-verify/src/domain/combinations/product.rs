//! Combinations
//!
//! The Cartesian product of several independent domains, one tuple per
//! combination:
//!
//! ```text
//! [Bool, Bool] ─▶ [f, f] [f, t] [t, f] [t, t]
//! []           ─▶ []
//! ```
//!
//! The number of tuples is always the product of the domain sizes and no
//! tuple repeats.

use super::spinner::{advance, check_enumerable, first_value};
use crate::error::ConfigurationError;
use llfsm_core::{Value, ValueType};
use std::iter::FusedIterator;

/// Lazy Cartesian product over enumerable domains
#[derive(Debug, Clone)]
pub struct Combinations {
    domains: Vec<ValueType>,
    current: Option<Vec<Value>>,
    total: u128,
    remaining: u128,
}

impl Combinations {
    /// Product of `domains` in order.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnenumerableDomain`] naming the position of the
    /// first domain that cannot be enumerated.
    pub fn new(domains: Vec<ValueType>) -> Result<Self, ConfigurationError> {
        let named = domains
            .into_iter()
            .enumerate()
            .map(|(index, ty)| (format!("source {index}"), ty))
            .collect();
        Self::named(named)
    }

    /// Product of named sources, naming the offending source in errors.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnenumerableDomain`] for the first source that
    /// cannot be enumerated, [`ConfigurationError::DuplicateField`] for a
    /// compound source that repeats a field name.
    pub fn named(sources: Vec<(String, ValueType)>) -> Result<Self, ConfigurationError> {
        let mut domains = Vec::with_capacity(sources.len());
        let mut current = Vec::with_capacity(sources.len());
        let mut total = 1u128;
        for (name, ty) in sources {
            let size = check_enumerable(&name, &ty)?;
            current.push(first_value(&ty).ok_or(ConfigurationError::UnenumerableDomain { name })?);
            total = total.saturating_mul(size);
            domains.push(ty);
        }
        Ok(Self {
            domains,
            current: Some(current),
            total,
            remaining: total,
        })
    }

    /// Product over the leaves of `sources`, compounds flattened in field
    /// order
    ///
    /// # Errors
    ///
    /// As [`Combinations::new`].
    pub fn flatten(sources: Vec<ValueType>) -> Result<Self, ConfigurationError> {
        fn leaves(ty: ValueType, out: &mut Vec<ValueType>) {
            match ty {
                ValueType::Compound(fields) => {
                    for (_, field) in fields {
                        leaves(field, out);
                    }
                }
                leaf => out.push(leaf),
            }
        }
        let mut flat = Vec::new();
        for (index, source) in sources.into_iter().enumerate() {
            check_enumerable(&format!("source {index}"), &source)?;
            leaves(source, &mut flat);
        }
        Self::new(flat)
    }

    /// Number of tuples in the full product, saturating
    #[must_use]
    pub const fn total(&self) -> u128 {
        self.total
    }
}

impl Iterator for Combinations {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Vec<Value>> {
        let current = self.current.take()?;
        let mut successor = current.clone();
        if advance(&self.domains, &mut successor) {
            self.current = Some(successor);
        }
        self.remaining = self.remaining.saturating_sub(1);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Combinations {}
