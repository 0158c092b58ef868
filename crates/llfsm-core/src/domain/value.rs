//! Schema-Driven Values
//!
//! # Overview
//!
//! Machines never expose their runtime types to the engine. Instead each
//! machine declares the shape of every variable, external and parameter as
//! a [`ValueType`] and snapshots its state into [`Value`]s. A snapshot of a
//! whole machine is a [`Value::Compound`] whose fields form a
//! [`PropertyList`].
//!
//! # Ordering and Hashing
//!
//! `PropertyList` is a `BTreeMap`, so two snapshots with the same contents
//! always compare, hash and serialize identically regardless of the order
//! in which fields were written. Kripke-state deduplication depends on this.
//!
//! ```text
//! Value::Compound {
//!     "currentState": String("Initial"),
//!     "sensors": Compound { "button": Bool(false) },
//!     "variables": Compound { "count": U8(3) },
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered, hashable map of named values.
pub type PropertyList = BTreeMap<String, Value>;

/// A snapshot-able value.
///
/// There are deliberately no floating point variants: every value must be
/// totally ordered and hashable so that snapshots can be deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Signed 8-bit integer
    I8(i8),
    /// Signed 16-bit integer
    I16(i16),
    /// Signed 32-bit integer
    I32(i32),
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Unsigned 64-bit integer
    U64(u64),
    /// UTF-8 string
    String(String),
    /// Optional value
    Optional(Option<Box<Value>>),
    /// Homogeneous collection
    Collection(Vec<Value>),
    /// Named fields
    Compound(PropertyList),
}

impl Value {
    /// Returns the boolean payload, if this is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns any integer payload widened to `i128`.
    #[must_use]
    pub const fn as_i128(&self) -> Option<i128> {
        match self {
            Self::I8(v) => Some(*v as i128),
            Self::I16(v) => Some(*v as i128),
            Self::I32(v) => Some(*v as i128),
            Self::I64(v) => Some(*v as i128),
            Self::U8(v) => Some(*v as i128),
            Self::U16(v) => Some(*v as i128),
            Self::U32(v) => Some(*v as i128),
            Self::U64(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the fields, if this is a `Compound`.
    #[must_use]
    pub const fn as_compound(&self) -> Option<&PropertyList> {
        match self {
            Self::Compound(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns a mutable view of the fields, if this is a `Compound`.
    pub fn as_compound_mut(&mut self) -> Option<&mut PropertyList> {
        match self {
            Self::Compound(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a (possibly nested) field by a dotted path.
    ///
    /// ```rust
    /// use llfsm_core::{PropertyList, Value};
    ///
    /// let mut inner = PropertyList::new();
    /// inner.insert("button".into(), Value::Bool(true));
    /// let mut outer = PropertyList::new();
    /// outer.insert("sensors".into(), Value::Compound(inner));
    ///
    /// let value = Value::Compound(outer);
    /// assert_eq!(value.lookup("sensors.button"), Some(&Value::Bool(true)));
    /// ```
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Self> {
        path.split('.')
            .try_fold(self, |value, key| value.as_compound()?.get(key))
    }

    /// True for the fixed-width integer variants.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        self.as_i128().is_some()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "\"{v}\""),
            Self::Optional(None) => write!(f, "nil"),
            Self::Optional(Some(v)) => write!(f, "{v}"),
            Self::Collection(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Self::Compound(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            other => match other.as_i128() {
                Some(n) => write!(f, "{n}"),
                None => Ok(()),
            },
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    String => String,
    PropertyList => Compound,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Declared shape of a value.
///
/// A `ValueType` is what a machine declares for each of its externals,
/// variables and parameters. Only booleans, fixed-width integers and
/// compounds of those have a finite, enumerable domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// `false`, `true`
    Bool,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Unsigned 64-bit integer
    U64,
    /// UTF-8 string (not enumerable)
    String,
    /// Optional wrapper (not enumerable)
    Optional(Box<ValueType>),
    /// Collection (not enumerable)
    Collection(Box<ValueType>),
    /// Named fields in declaration order
    Compound(Vec<(String, ValueType)>),
}

impl ValueType {
    /// Inclusive numeric bounds for the integer types.
    #[must_use]
    pub const fn integer_bounds(&self) -> Option<(i128, i128)> {
        match self {
            Self::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::U8 => Some((0, u8::MAX as i128)),
            Self::U16 => Some((0, u16::MAX as i128)),
            Self::U32 => Some((0, u32::MAX as i128)),
            Self::U64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }

    /// Builds an integer value of this type, if `n` is representable.
    #[must_use]
    pub fn integer_value(&self, n: i128) -> Option<Value> {
        match self {
            Self::I8 => i8::try_from(n).ok().map(Value::I8),
            Self::I16 => i16::try_from(n).ok().map(Value::I16),
            Self::I32 => i32::try_from(n).ok().map(Value::I32),
            Self::I64 => i64::try_from(n).ok().map(Value::I64),
            Self::U8 => u8::try_from(n).ok().map(Value::U8),
            Self::U16 => u16::try_from(n).ok().map(Value::U16),
            Self::U32 => u32::try_from(n).ok().map(Value::U32),
            Self::U64 => u64::try_from(n).ok().map(Value::U64),
            _ => None,
        }
    }

    /// First field name declared twice in a compound, searching nested
    /// compounds depth-first.
    #[must_use]
    pub fn duplicate_field(&self) -> Option<&str> {
        let Self::Compound(fields) = self else {
            return None;
        };
        let mut names = std::collections::BTreeSet::new();
        fields
            .iter()
            .find(|(name, _)| !names.insert(name.as_str()))
            .map(|(name, _)| name.as_str())
            .or_else(|| fields.iter().find_map(|(_, ty)| ty.duplicate_field()))
    }

    /// Whether the full domain of this type can be enumerated.
    ///
    /// A compound that repeats a field name is not: its values would
    /// collapse onto fewer keys than its declaration has fields.
    #[must_use]
    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Bool => true,
            Self::Compound(fields) => {
                self.duplicate_field().is_none() && fields.iter().all(|(_, ty)| ty.is_enumerable())
            }
            other => other.integer_bounds().is_some(),
        }
    }

    /// Number of values in the domain, saturating at `u128::MAX`.
    ///
    /// Returns `None` when the type is not enumerable. An empty compound
    /// has exactly one value.
    #[must_use]
    pub fn domain_size(&self) -> Option<u128> {
        match self {
            Self::Bool => Some(2),
            Self::Compound(_) if self.duplicate_field().is_some() => None,
            Self::Compound(fields) => fields.iter().try_fold(1u128, |acc, (_, ty)| {
                ty.domain_size().map(|size| acc.saturating_mul(size))
            }),
            other => other.integer_bounds().map(|(min, max)| {
                u128::try_from(max - min).map_or(u128::MAX, |span| span.saturating_add(1))
            }),
        }
    }

    /// Zero value of this type.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::String => Value::String(String::new()),
            Self::Optional(_) => Value::Optional(None),
            Self::Collection(_) => Value::Collection(Vec::new()),
            Self::Compound(fields) => Value::Compound(
                fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.default_value()))
                    .collect(),
            ),
            integer => integer.integer_value(0).unwrap_or(Value::Bool(false)),
        }
    }

    /// Whether `value` inhabits this type.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Bool, Value::Bool(_))
            | (Self::I8, Value::I8(_))
            | (Self::I16, Value::I16(_))
            | (Self::I32, Value::I32(_))
            | (Self::I64, Value::I64(_))
            | (Self::U8, Value::U8(_))
            | (Self::U16, Value::U16(_))
            | (Self::U32, Value::U32(_))
            | (Self::U64, Value::U64(_))
            | (Self::String, Value::String(_))
            | (Self::Optional(_), Value::Optional(None)) => true,
            (Self::Optional(inner), Value::Optional(Some(v))) => inner.accepts(v),
            (Self::Collection(inner), Value::Collection(values)) => {
                values.iter().all(|v| inner.accepts(v))
            }
            (Self::Compound(fields), Value::Compound(values)) => {
                fields.len() == values.len()
                    && fields
                        .iter()
                        .all(|(name, ty)| values.get(name).is_some_and(|v| ty.accepts(v)))
            }
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::String => write!(f, "string"),
            Self::Optional(inner) => write!(f, "{inner}?"),
            Self::Collection(inner) => write!(f, "[{inner}]"),
            Self::Compound(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
