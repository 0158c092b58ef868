//! Domain Layer
//!
//! The value model shared by every other crate in the workspace. It is
//! independent of execution and storage concerns and remains the
//! authoritative definition of what a machine snapshot looks like.
//!
//! Organized into three behavioral domains:
//! - **ids**: identifiers for executables and Kripke states
//! - **value**: schema-driven values and their declared shapes
//! - **constraint**: clock constraints attached to timed transitions

pub mod constraint;
pub mod ids;
pub mod value;

pub use constraint::Constraint;
pub use ids::{ExecutableId, StateId, TimeNs};
pub use value::{PropertyList, Value, ValueType};
