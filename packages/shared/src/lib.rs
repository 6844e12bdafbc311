//! Utilities shared by the Hiroba crates: logger setup and clock helpers.

pub mod logger;
pub mod time;
