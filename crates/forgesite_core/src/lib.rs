//! Core activation and aggregation logic for the forgesite backend.
//! This crate is the single source of truth for the activation invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::unit::{
    is_valid_slug, BaseMetalKind, ProcessKind, Unit, UnitKind, PROMO_POPUP_GROUP,
};
pub use model::visit::{VisitSnapshot, DEFAULT_ACTIVE_WINDOW_MS};
pub use registry::unit_registry::{RegistryError, RegistryResult, UnitRegistry};
pub use repo::unit_store::{
    SqliteCatalogStore, SqlitePageStore, StoreResult, UnitStore, UnitStoreError,
};
pub use repo::visit_repo::{SqliteVisitRepository, VisitRepository};
pub use service::activation::{ActivationError, ActivationResult, ActivationService};
pub use service::aggregate::{AggregateView, Aggregator, MenuEntryView};
pub use service::routes::public_routes;
pub use service::visits::{VisitError, VisitResult, VisitService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
