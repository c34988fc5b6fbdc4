//! Persistence layer for content units and the visit counter.
//!
//! # Responsibility
//! - Define the kind-polymorphic storage contract (`UnitStore`).
//! - Keep SQL details for every content family inside this boundary.
//!
//! # Invariants
//! - All `is_active` writes flow through `UnitStore::write_active`; no other
//!   component touches the flag columns.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod unit_store;
pub mod visit_repo;
