//! Foundational data structures, error types, and the tag registry.

pub mod error;
pub mod models;
pub mod tags;
