//! Test support shared by the flowboard integration tests and the simulator.
//!
//! Nothing here depends on `flowboard` itself, so the helpers check the
//! serialized contract rather than the Rust types.

pub mod failure;
pub mod logging;
