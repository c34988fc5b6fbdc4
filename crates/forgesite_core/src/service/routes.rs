//! Public route materialization from the aggregate view.
//!
//! # Responsibility
//! - Map active page units to the dynamic routes the public site serves.
//!
//! This module is a consumer of the aggregator: the static-site generator
//! calls it per build, so the route list always reflects current unit
//! state.

use crate::model::unit::{BaseMetalKind, UnitKind};
use crate::registry::unit_registry::RegistryResult;
use crate::service::aggregate::Aggregator;

/// Returns the dynamic public routes implied by currently-active units:
/// one `/processes/<slug>` per active process page, one `/metals/<slug>`
/// per active base-metal page, in catalog order.
pub fn public_routes(aggregator: &Aggregator<'_>) -> RegistryResult<Vec<String>> {
    let mut routes = Vec::new();

    for kind in UnitKind::processes() {
        for unit in aggregator.active_units(kind)? {
            routes.push(format!("/processes/{}", unit.identity));
        }
    }
    for metal in BaseMetalKind::ALL {
        for unit in aggregator.active_units(UnitKind::BaseMetal(metal))? {
            routes.push(format!("/metals/{}", unit.identity));
        }
    }

    Ok(routes)
}
