//! Shared helpers.

pub mod random;
