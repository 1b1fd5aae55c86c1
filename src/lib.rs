//! Umbrella crate for the rivnitz-live workspace; the member crates carry
//! the implementation, this package hosts the cross-crate integration tests.

pub use live_orchestrator;
