//! Cross-Machine Calls
//!
//! Records of invocations between executables, the chain of synchronous
//! calls active during a ringlet, and the gateway machines use to issue
//! them.

pub mod chain;
pub mod gateway;
pub mod types;

pub use chain::CallChain;
pub use gateway::{Gateway, PoolGateway, Promise};
pub use types::{Call, CallMethod, Parameters};
