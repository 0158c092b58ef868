//! Clock Constraints
//!
//! # Overview
//!
//! A [`Constraint`] is a predicate over the value of a single clock. Timed
//! Kripke edges carry one to say for which elapsed times the transition is
//! possible. The time-aware ringlet builder produces constraints that
//! partition the time axis, e.g.
//!
//! ```text
//!   c <= 5        (5 < c) && (c <= 15)        c > 15
//! ├────────────┼──────────────────────────┼──────────────▶ c
//! 0            5                          15
//! ```
//!
//! # Algebra
//!
//! - `inverse`: logical negation pushed down to the comparison leaves
//! - `reduced`: an equivalent constraint without `Not` or `Implies`
//! - `expression`: textual form over a given clock label

use serde::{Deserialize, Serialize};
use std::fmt;

/// A predicate over a clock value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// `c < n`
    LessThan(u64),
    /// `c <= n`
    LessThanEqual(u64),
    /// `c == n`
    Equal(u64),
    /// `c != n`
    NotEqual(u64),
    /// `c > n`
    GreaterThan(u64),
    /// `c >= n`
    GreaterThanEqual(u64),
    /// Both hold
    And(Box<Constraint>, Box<Constraint>),
    /// Either holds
    Or(Box<Constraint>, Box<Constraint>),
    /// If the first holds, the second holds
    Implies(Box<Constraint>, Box<Constraint>),
    /// Negation
    Not(Box<Constraint>),
}

impl Constraint {
    /// `lhs && rhs`
    #[must_use]
    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::And(Box::new(lhs), Box::new(rhs))
    }

    /// `lhs || rhs`
    #[must_use]
    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::Or(Box::new(lhs), Box::new(rhs))
    }

    /// `lhs -> rhs`
    #[must_use]
    pub fn implies(lhs: Self, rhs: Self) -> Self {
        Self::Implies(Box::new(lhs), Box::new(rhs))
    }

    /// `!self`
    #[must_use]
    pub fn negated(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluates the constraint for a concrete clock value.
    #[must_use]
    pub fn is_satisfied_by(&self, value: u64) -> bool {
        match self {
            Self::LessThan(n) => value < *n,
            Self::LessThanEqual(n) => value <= *n,
            Self::Equal(n) => value == *n,
            Self::NotEqual(n) => value != *n,
            Self::GreaterThan(n) => value > *n,
            Self::GreaterThanEqual(n) => value >= *n,
            Self::And(lhs, rhs) => lhs.is_satisfied_by(value) && rhs.is_satisfied_by(value),
            Self::Or(lhs, rhs) => lhs.is_satisfied_by(value) || rhs.is_satisfied_by(value),
            Self::Implies(lhs, rhs) => !lhs.is_satisfied_by(value) || rhs.is_satisfied_by(value),
            Self::Not(inner) => !inner.is_satisfied_by(value),
        }
    }

    /// Satisfied by every clock value.
    ///
    /// Only recognises the syntactic forms the engine produces (`c >= 0`
    /// and disjunctions containing it); it is not a decision procedure.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        match self {
            Self::GreaterThanEqual(0) => true,
            Self::Or(lhs, rhs) => lhs.is_trivial() || rhs.is_trivial(),
            Self::And(lhs, rhs) => lhs.is_trivial() && rhs.is_trivial(),
            _ => false,
        }
    }

    /// Logical negation with the `Not` pushed to the leaves.
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Self::LessThan(n) => Self::GreaterThanEqual(*n),
            Self::LessThanEqual(n) => Self::GreaterThan(*n),
            Self::Equal(n) => Self::NotEqual(*n),
            Self::NotEqual(n) => Self::Equal(*n),
            Self::GreaterThan(n) => Self::LessThanEqual(*n),
            Self::GreaterThanEqual(n) => Self::LessThan(*n),
            Self::And(lhs, rhs) => Self::or(lhs.inverse(), rhs.inverse()),
            Self::Or(lhs, rhs) => Self::and(lhs.inverse(), rhs.inverse()),
            Self::Implies(lhs, rhs) => Self::and(lhs.reduced(), rhs.inverse()),
            Self::Not(inner) => inner.reduced(),
        }
    }

    /// Equivalent constraint using only comparisons, `And` and `Or`.
    #[must_use]
    pub fn reduced(&self) -> Self {
        match self {
            Self::And(lhs, rhs) => Self::and(lhs.reduced(), rhs.reduced()),
            Self::Or(lhs, rhs) => Self::or(lhs.reduced(), rhs.reduced()),
            Self::Implies(lhs, rhs) => Self::or(lhs.inverse(), rhs.reduced()),
            Self::Not(inner) => inner.inverse(),
            leaf => leaf.clone(),
        }
    }

    /// Renders the constraint over the clock called `label`.
    ///
    /// ```rust
    /// use llfsm_core::Constraint;
    ///
    /// let window = Constraint::and(Constraint::GreaterThan(5), Constraint::LessThanEqual(15));
    /// assert_eq!(window.expression("c"), "(c > 5) && (c <= 15)");
    /// ```
    #[must_use]
    pub fn expression(&self, label: &str) -> String {
        match self {
            Self::LessThan(n) => format!("{label} < {n}"),
            Self::LessThanEqual(n) => format!("{label} <= {n}"),
            Self::Equal(n) => format!("{label} == {n}"),
            Self::NotEqual(n) => format!("{label} != {n}"),
            Self::GreaterThan(n) => format!("{label} > {n}"),
            Self::GreaterThanEqual(n) => format!("{label} >= {n}"),
            Self::And(lhs, rhs) => {
                format!("({}) && ({})", lhs.expression(label), rhs.expression(label))
            }
            Self::Or(lhs, rhs) => {
                format!("({}) || ({})", lhs.expression(label), rhs.expression(label))
            }
            Self::Implies(lhs, rhs) => {
                format!("({}) -> ({})", lhs.expression(label), rhs.expression(label))
            }
            Self::Not(inner) => format!("!({})", inner.expression(label)),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression("c"))
    }
}
