//! Domain model for togglable content units and the visit counter.
//!
//! # Responsibility
//! - Define the canonical unit shape shared by every content family.
//! - Keep the compiled-in kind catalog in one place.
//!
//! # Invariants
//! - Every unit is identified by a slug unique within its kind.
//! - Exclusivity is declared per kind, never decided per call site.

pub mod unit;
pub mod visit;
