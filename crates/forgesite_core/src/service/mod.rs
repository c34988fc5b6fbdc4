//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate registry and repository calls into use-case level APIs.
//! - Own the consistency rules: exclusivity sequencing, counter
//!   read-modify-write, on-demand aggregation.
//!
//! # Invariants
//! - Every `is_active` mutation flows through the activation service.
//! - Aggregate views are computed per call, never cached across a toggle.

pub mod activation;
pub mod aggregate;
pub mod routes;
pub mod visits;
