//! Shared data-types go here.

pub mod address;
pub mod ids;
