//! Spinners
//!
//! A [`Spinner`] walks the complete domain of one [`ValueType`]:
//!
//! - `Bool`: `false`, `true`
//! - integers: `MIN..=MAX` ascending
//! - compounds: the Cartesian product of the fields in declaration order,
//!   last field varying fastest
//!
//! Spinners are lazy and fused: once exhausted they stay exhausted.

use crate::error::ConfigurationError;
use llfsm_core::{PropertyList, Value, ValueType};
use std::iter::FusedIterator;

/// Rejects a type the spinner cannot walk, naming the source as `name`
pub(crate) fn check_enumerable(name: &str, value_type: &ValueType) -> Result<u128, ConfigurationError> {
    if let Some(field) = value_type.duplicate_field() {
        return Err(ConfigurationError::DuplicateField {
            name: name.to_owned(),
            field: field.to_owned(),
        });
    }
    value_type
        .domain_size()
        .filter(|_| value_type.is_enumerable())
        .ok_or_else(|| ConfigurationError::UnenumerableDomain { name: name.to_owned() })
}

/// Smallest value of an enumerable type
pub(crate) fn first_value(value_type: &ValueType) -> Option<Value> {
    match value_type {
        ValueType::Bool => Some(Value::Bool(false)),
        ValueType::Compound(fields) => fields
            .iter()
            .map(|(name, ty)| first_value(ty).map(|value| (name.clone(), value)))
            .collect::<Option<PropertyList>>()
            .map(Value::Compound),
        integer => {
            let (min, _) = integer.integer_bounds()?;
            integer.integer_value(min)
        }
    }
}

/// Successor of `value` in the domain of `value_type`
pub(crate) fn next_value(value_type: &ValueType, value: &Value) -> Option<Value> {
    match (value_type, value) {
        (ValueType::Bool, Value::Bool(false)) => Some(Value::Bool(true)),
        (ValueType::Compound(fields), Value::Compound(current)) => {
            let mut next = current.clone();
            for (name, ty) in fields.iter().rev() {
                let field = current.get(name)?;
                if let Some(successor) = next_value(ty, field) {
                    next.insert(name.clone(), successor);
                    return Some(Value::Compound(next));
                }
                next.insert(name.clone(), first_value(ty)?);
            }
            None
        }
        (integer, value) => {
            let (_, max) = integer.integer_bounds()?;
            let n = value.as_i128()?;
            if n < max {
                integer.integer_value(n + 1)
            } else {
                None
            }
        }
    }
}

/// Advances `current` to the next tuple, last position fastest.
///
/// Returns false once every tuple has been produced.
pub(crate) fn advance(domains: &[ValueType], current: &mut [Value]) -> bool {
    for (ty, slot) in domains.iter().zip(current.iter_mut()).rev() {
        if let Some(successor) = next_value(ty, slot) {
            *slot = successor;
            return true;
        }
        match first_value(ty) {
            Some(first) => *slot = first,
            None => return false,
        }
    }
    false
}

/// Lazy enumeration of a single domain
#[derive(Debug, Clone)]
pub struct Spinner {
    value_type: ValueType,
    next: Option<Value>,
    remaining: u128,
}

impl Spinner {
    /// Spinner over `value_type`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnenumerableDomain`] if the type has no finite
    /// enumeration.
    pub fn new(value_type: ValueType) -> Result<Self, ConfigurationError> {
        Self::named("value", value_type)
    }

    /// Like [`Spinner::new`], naming the source in errors
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnenumerableDomain`] if the type has no finite
    /// enumeration, [`ConfigurationError::DuplicateField`] for a compound
    /// that repeats a field name.
    pub fn named(name: &str, value_type: ValueType) -> Result<Self, ConfigurationError> {
        let remaining = check_enumerable(name, &value_type)?;
        let next = first_value(&value_type);
        Ok(Self {
            value_type,
            next,
            remaining,
        })
    }

    /// Size of the full domain
    #[must_use]
    pub fn domain_size(&self) -> u128 {
        self.value_type.domain_size().unwrap_or(0)
    }
}

impl Iterator for Spinner {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let current = self.next.take()?;
        self.next = next_value(&self.value_type, &current);
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

impl FusedIterator for Spinner {}
