//! Kripke States and Edges
//!
//! # Overview
//!
//! A [`KripkeState`] is a property list plus its outgoing edges. Edges
//! point at their target by [`StateId`], so cycles and self-loops are
//! plain data.
//!
//! # Edge Merging
//!
//! Two edges that differ only in their clock constraint describe the same
//! transition under different timing, so `add_edge` merges them into one
//! edge whose constraint is the disjunction. An edge without a constraint
//! (or with a trivial one) absorbs the other.

use llfsm_core::{Constraint, PropertyList, StateId, TimeNs, Value};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Timed transition between two Kripke states
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KripkeEdge {
    /// Clock the constraint refers to
    pub clock_name: Option<String>,
    /// Elapsed-time condition for the transition
    pub constraint: Option<Constraint>,
    /// Whether the clock restarts
    pub reset_clock: bool,
    /// Whether the environment is snapshotted on this transition
    pub take_snapshot: bool,
    /// Schedule time the transition takes
    pub time: TimeNs,
    /// Target state
    pub target: StateId,
}

impl KripkeEdge {
    /// Untimed, unconstrained edge to `target`
    #[must_use]
    pub const fn new(target: StateId) -> Self {
        Self {
            clock_name: None,
            constraint: None,
            reset_clock: false,
            take_snapshot: false,
            time: 0,
            target,
        }
    }

    /// Sets the clock name
    #[must_use]
    pub fn clock(mut self, name: impl Into<String>) -> Self {
        self.clock_name = Some(name.into());
        self
    }

    /// Sets the constraint
    #[must_use]
    pub fn constrained(mut self, constraint: Option<Constraint>) -> Self {
        self.constraint = constraint;
        self
    }

    /// Sets the reset flag
    #[must_use]
    pub const fn resetting(mut self, reset_clock: bool) -> Self {
        self.reset_clock = reset_clock;
        self
    }

    /// Sets the snapshot flag
    #[must_use]
    pub const fn snapshotting(mut self, take_snapshot: bool) -> Self {
        self.take_snapshot = take_snapshot;
        self
    }

    /// Sets the elapsed time
    #[must_use]
    pub const fn after(mut self, time: TimeNs) -> Self {
        self.time = time;
        self
    }

    /// Equal in everything but the constraint
    #[must_use]
    pub fn same_transition(&self, other: &Self) -> bool {
        self.clock_name == other.clock_name
            && self.reset_clock == other.reset_clock
            && self.take_snapshot == other.take_snapshot
            && self.time == other.time
            && self.target == other.target
    }
}

/// A state of the Kripke structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KripkeState {
    /// Stable arena id
    pub id: StateId,
    /// Flattened snapshot plus step marker
    pub properties: PropertyList,
    /// Whether exploration may start here
    pub is_initial: bool,
    /// Outgoing edges, sorted
    pub edges: Vec<KripkeEdge>,
}

impl KripkeState {
    /// State without edges
    #[must_use]
    pub const fn new(id: StateId, properties: PropertyList, is_initial: bool) -> Self {
        Self {
            id,
            properties,
            is_initial,
            edges: Vec::new(),
        }
    }

    /// Adds an edge, ignoring exact duplicates and merging constraints of
    /// otherwise equal edges
    pub fn add_edge(&mut self, edge: KripkeEdge) {
        if self.edges.contains(&edge) {
            return;
        }
        match self.edges.iter_mut().find(|existing| existing.same_transition(&edge)) {
            Some(existing) => {
                existing.constraint = merge(existing.constraint.take(), edge.constraint);
            }
            None => self.edges.push(edge),
        }
        self.edges.sort();
    }

    /// Step marker of the state
    #[must_use]
    pub fn pc(&self) -> Option<&str> {
        self.properties.get("pc").and_then(Value::as_str)
    }
}

impl PartialEq for KripkeState {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
    }
}

impl Eq for KripkeState {}

impl Hash for KripkeState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.properties.hash(state);
    }
}

fn merge(lhs: Option<Constraint>, rhs: Option<Constraint>) -> Option<Constraint> {
    let (lhs, rhs) = (lhs?, rhs?);
    if lhs.is_trivial() || rhs.is_trivial() {
        return None;
    }
    if disjuncts(&lhs).contains(&&rhs) {
        return Some(lhs);
    }
    Some(Constraint::or(lhs, rhs))
}

fn disjuncts(constraint: &Constraint) -> Vec<&Constraint> {
    match constraint {
        Constraint::Or(lhs, rhs) => {
            let mut all = disjuncts(lhs);
            all.extend(disjuncts(rhs));
            all
        }
        other => vec![other],
    }
}
