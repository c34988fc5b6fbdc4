//! On-demand aggregation over the unit registry.
//!
//! # Responsibility
//! - Compute active counts and active-unit lists for dashboards and route
//!   generation.
//! - Combine active menu entries with their active sub-entries.
//!
//! # Invariants
//! - Views are recomputed from current unit state on every call; nothing
//!   is cached across a toggle.
//! - `count_active(kind) == active_units(kind).len()` for every kind.

use crate::model::unit::{Unit, UnitKind};
use crate::registry::unit_registry::{RegistryResult, UnitRegistry};
use std::collections::BTreeMap;

/// Derived, non-persisted summary of active units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateView {
    pub active_count_by_kind: BTreeMap<UnitKind, usize>,
    pub active_units_by_kind: BTreeMap<UnitKind, Vec<Unit>>,
}

/// One active navigation entry with its active children, in sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntryView {
    pub entry: Unit,
    pub sub_entries: Vec<Unit>,
}

/// Read-side computation over the registry. Stateless; holds no unit data.
pub struct Aggregator<'a> {
    registry: &'a UnitRegistry<'a>,
}

impl<'a> Aggregator<'a> {
    pub fn new(registry: &'a UnitRegistry<'a>) -> Self {
        Self { registry }
    }

    /// Counts active units of one kind. A kind with zero units counts 0;
    /// an unregistered kind is an error, never silently skipped.
    pub fn count_active(&self, kind: UnitKind) -> RegistryResult<usize> {
        Ok(self.active_units(kind)?.len())
    }

    /// Lists active units of one kind, ordered by sort key then identity.
    pub fn active_units(&self, kind: UnitKind) -> RegistryResult<Vec<Unit>> {
        let mut units = self.registry.units_of(kind)?;
        units.retain(|unit| unit.is_active);
        Ok(units)
    }

    /// Sums active counts over the given kinds. Used by the dashboard's
    /// composite active-process statistic, which spans all process kinds.
    pub fn count_active_across_kinds(&self, kinds: &[UnitKind]) -> RegistryResult<usize> {
        let mut total = 0;
        for kind in kinds {
            total += self.count_active(*kind)?;
        }
        Ok(total)
    }

    /// Computes the full aggregate view over every registered kind.
    pub fn aggregate_view(&self) -> RegistryResult<AggregateView> {
        let mut active_count_by_kind = BTreeMap::new();
        let mut active_units_by_kind = BTreeMap::new();

        for kind in self.registry.kinds() {
            let units = self.active_units(kind)?;
            active_count_by_kind.insert(kind, units.len());
            active_units_by_kind.insert(kind, units);
        }

        Ok(AggregateView {
            active_count_by_kind,
            active_units_by_kind,
        })
    }

    /// Returns active menu entries, each carrying its active sub-entries.
    ///
    /// Sub-entries whose parent is inactive or missing are dropped from the
    /// tree; the public site never renders orphaned navigation.
    pub fn active_menu_tree(&self) -> RegistryResult<Vec<MenuEntryView>> {
        let entries = self.active_units(UnitKind::MenuEntry)?;
        let sub_entries = self.active_units(UnitKind::MenuSubEntry)?;

        let mut children_by_parent: BTreeMap<String, Vec<Unit>> = BTreeMap::new();
        for sub_entry in sub_entries {
            if let Some(parent) = sub_entry.parent.clone() {
                children_by_parent.entry(parent).or_default().push(sub_entry);
            }
        }

        Ok(entries
            .into_iter()
            .map(|entry| {
                let sub_entries = children_by_parent
                    .remove(&entry.identity)
                    .unwrap_or_default();
                MenuEntryView { entry, sub_entries }
            })
            .collect())
    }
}
