//! Combinations
//!
//! Exhaustive, duplicate-free enumeration of value domains. This is what
//! bounds the verifier's branching on external inputs.

mod product;
mod spinner;

pub use product::Combinations;
pub use spinner::Spinner;
