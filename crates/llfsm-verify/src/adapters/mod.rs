//! Adapters Layer - Sinks for Discovered States
//!
//! Implementations of the [`View`](crate::domain::kripke::View) port.
//! Renderers for graph or model-checker formats plug in here.

pub mod view;

// Re-exports
pub use view::{JsonLinesView, RecordingView};
