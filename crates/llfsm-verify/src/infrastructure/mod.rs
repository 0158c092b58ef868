//! Infrastructure Layer - External Technology Stack
//!
//! Concrete implementations of domain ports that depend on external
//! libraries.
//!
//! # Responsibilities
//! - Durable Kripke structure storage (sled)
//! - Record serialization (serde_json)

pub mod storage;

// Re-exports
pub use storage::SledKripkeStore;
