//! Request handlers and response envelopes for the JSON boundary.
//!
//! # Responsibility
//! - Deserialize request bodies, run core services, serialize responses.
//! - Map the core error taxonomy onto HTTP statuses.
//!
//! # Invariants
//! - Handlers never panic; every outcome is a status/body pair.
//! - Client errors are 400 (bad input, unknown kind) or 404 (missing
//!   unit); storage and sequencing failures are 500.

use forgesite_core::{
    ActivationError, ActivationService, Aggregator, RegistryError, SqliteVisitRepository, Unit,
    UnitKind, UnitRegistry, VisitError, VisitService, DEFAULT_ACTIVE_WINDOW_MS,
};
use log::debug;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// One boundary outcome: HTTP status plus a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn ok(body: impl Serialize) -> Self {
        match serde_json::to_string(&body) {
            Ok(body) => Self { status: 200, body },
            Err(err) => Self::error(500, format!("response serialization failed: {err}")),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }).to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ToggleRequest {
    kind: String,
    identity: String,
    is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnitBody {
    kind: String,
    identity: String,
    display_name: String,
    is_active: bool,
    order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
}

impl From<Unit> for UnitBody {
    fn from(unit: Unit) -> Self {
        Self {
            kind: unit.kind.name(),
            identity: unit.identity,
            display_name: unit.display_name,
            is_active: unit.is_active,
            order: unit.sort_order,
            parent: unit.parent,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveUnitRow {
    identity: String,
    display_name: String,
    order: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryBody {
    count_by_kind: BTreeMap<String, usize>,
    active_processes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VisitBody {
    count: i64,
    last_visit_at: i64,
    is_active: bool,
}

/// `GET` aggregate summary: active counts per kind plus the composite
/// active-process statistic.
pub fn get_aggregate_summary(conn: &Connection) -> ApiResponse {
    let registry = UnitRegistry::with_default_kinds(conn);
    let aggregator = Aggregator::new(&registry);

    let view = match aggregator.aggregate_view() {
        Ok(view) => view,
        Err(err) => return registry_error_response(err),
    };
    let active_processes = match aggregator.count_active_across_kinds(&UnitKind::processes()) {
        Ok(count) => count,
        Err(err) => return registry_error_response(err),
    };

    let count_by_kind = view
        .active_count_by_kind
        .into_iter()
        .map(|(kind, count)| (kind.name(), count))
        .collect();
    ApiResponse::ok(SummaryBody {
        count_by_kind,
        active_processes,
    })
}

/// `GET` active units of one kind, in catalog order.
pub fn get_active_units(conn: &Connection, kind: &str) -> ApiResponse {
    let Some(kind) = UnitKind::parse(kind) else {
        return ApiResponse::error(400, format!("unknown unit kind: {kind}"));
    };

    let registry = UnitRegistry::with_default_kinds(conn);
    let aggregator = Aggregator::new(&registry);
    match aggregator.active_units(kind) {
        Ok(units) => ApiResponse::ok(
            units
                .into_iter()
                .map(|unit| ActiveUnitRow {
                    identity: unit.identity,
                    display_name: unit.display_name,
                    order: unit.sort_order,
                })
                .collect::<Vec<_>>(),
        ),
        Err(err) => registry_error_response(err),
    }
}

/// `PUT`/`POST` toggle: `{kind, identity, isActive}` -> updated unit.
pub fn post_toggle(conn: &Connection, body: &str) -> ApiResponse {
    let request: ToggleRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(err) => return ApiResponse::error(400, format!("invalid toggle request: {err}")),
    };
    let Some(kind) = UnitKind::parse(&request.kind) else {
        return ApiResponse::error(400, format!("unknown unit kind: {}", request.kind));
    };
    debug!(
        "event=api_toggle module=api kind={kind} identity={} value={}",
        request.identity, request.is_active
    );

    let registry = UnitRegistry::with_default_kinds(conn);
    let activation = ActivationService::new(conn, &registry);
    match activation.toggle(kind, &request.identity, request.is_active) {
        Ok(unit) => ApiResponse::ok(UnitBody::from(unit)),
        Err(ActivationError::Registry(err)) => registry_error_response(err),
        Err(err @ ActivationError::ActivationFailed { .. }) => {
            ApiResponse::error(500, err.to_string())
        }
    }
}

/// `POST` increment the visit counter -> `{count}`.
pub fn post_increment_visits(conn: &Connection) -> ApiResponse {
    let service = VisitService::new(SqliteVisitRepository::new(conn));
    match service.increment() {
        Ok(snapshot) => ApiResponse::ok(json!({ "count": snapshot.count })),
        Err(err) => visit_error_response(err),
    }
}

/// `POST` administrative counter reset -> `{count: 0}`.
pub fn post_reset_visits(conn: &Connection) -> ApiResponse {
    let service = VisitService::new(SqliteVisitRepository::new(conn));
    match service.reset() {
        Ok(()) => ApiResponse::ok(json!({ "count": 0 })),
        Err(err) => visit_error_response(err),
    }
}

/// `GET` visit counter snapshot with the dashboard liveness badge.
pub fn get_visit_snapshot(conn: &Connection) -> ApiResponse {
    let service = VisitService::new(SqliteVisitRepository::new(conn));
    match service.current() {
        Ok(snapshot) => ApiResponse::ok(VisitBody {
            count: snapshot.count,
            last_visit_at: snapshot.last_visit_at,
            is_active: snapshot.is_recently_active(now_epoch_ms(), DEFAULT_ACTIVE_WINDOW_MS),
        }),
        Err(err) => visit_error_response(err),
    }
}

fn registry_error_response(err: RegistryError) -> ApiResponse {
    let status = match &err {
        RegistryError::UnknownKind(_) | RegistryError::InvalidIdentity(_) => 400,
        RegistryError::UnitNotFound { .. } => 404,
        RegistryError::Db(_) | RegistryError::InvalidData(_) => 500,
    };
    ApiResponse::error(status, err.to_string())
}

fn visit_error_response(err: VisitError) -> ApiResponse {
    ApiResponse::error(500, err.to_string())
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
