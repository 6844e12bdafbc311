//! Group registry implementations.
//!
//! - `inmemory`: single-process registry backed by a locked arena of sets

pub mod inmemory;

pub use inmemory::InMemoryGroupRegistry;
