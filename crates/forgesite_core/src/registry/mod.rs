//! Compiled-in catalog of togglable content-unit kinds.
//!
//! # Responsibility
//! - Map every kind to its storage handle without exposing family-specific
//!   SQL to callers.
//! - Keep the kind list and its exclusivity declarations in one place.

pub mod unit_registry;
