//! Kripke Model
//!
//! # Overview
//!
//! The verifier's output: an arena of states connected by timed edges.
//!
//! # Architecture
//!
//! ```text
//! ScheduleVerifier ──add/add_edge──▶ PersistentStore (arena, by StateId)
//!        │
//!        └──commit/finish──────────▶ View (stream of completed states)
//! ```

mod state;
mod step;
mod store;
mod view;

pub use state::{KripkeEdge, KripkeState};
pub use step::{StepKind, StepMarker};
pub use store::{KripkeStructure, PersistentStore};
pub use view::View;
