//! Storage backends for [`PersistentStore`](crate::domain::kripke::PersistentStore)

pub mod sled_store;

pub use sled_store::SledKripkeStore;
