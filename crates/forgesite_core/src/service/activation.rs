//! Activation service: the single authority for `is_active` mutations.
//!
//! # Responsibility
//! - Apply toggles through the registry, enforcing declared exclusivity.
//! - Run the deactivate-group-then-activate-target sequence as one atomic
//!   commit relative to concurrent togglers.
//!
//! # Invariants
//! - For any exclusivity group, at most one member is active at every
//!   observable point between calls.
//! - A failed exclusivity sequence rolls back whole; a zero-active group
//!   state after a prior success can never persist.

use crate::model::unit::{is_valid_slug, Unit, UnitKind};
use crate::registry::unit_registry::{RegistryError, RegistryResult, UnitRegistry};
use log::{error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ActivationResult<T> = Result<T, ActivationError>;

/// Errors surfaced by activation operations.
#[derive(Debug)]
pub enum ActivationError {
    Registry(RegistryError),
    /// The exclusivity write sequence failed after its internal retry.
    ActivationFailed { kind: UnitKind, identity: String },
}

impl Display for ActivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "{err}"),
            Self::ActivationFailed { kind, identity } => {
                write!(f, "activation failed for {kind}/{identity}")
            }
        }
    }
}

impl Error for ActivationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            Self::ActivationFailed { .. } => None,
        }
    }
}

impl From<RegistryError> for ActivationError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

/// Single mutation authority over unit activation state.
pub struct ActivationService<'a> {
    conn: &'a Connection,
    registry: &'a UnitRegistry<'a>,
}

impl<'a> ActivationService<'a> {
    pub fn new(conn: &'a Connection, registry: &'a UnitRegistry<'a>) -> Self {
        Self { conn, registry }
    }

    /// Toggles one unit's active flag and returns the updated unit.
    ///
    /// # Contract
    /// - Non-exclusive kind, or `value = false`: direct idempotent write.
    /// - Exclusive kind and `value = true`: every other group member is
    ///   deactivated and the target activated in one IMMEDIATE transaction.
    /// - A malformed identity is rejected as `InvalidIdentity` before
    ///   either path touches storage.
    /// - `UnitNotFound` and `UnknownKind` surface unchanged; storage
    ///   failures during the exclusivity sequence are retried once, then
    ///   reported as `ActivationFailed`.
    pub fn toggle(
        &self,
        kind: UnitKind,
        identity: &str,
        value: bool,
    ) -> ActivationResult<Unit> {
        let group = kind.exclusivity_group();
        let result = if !is_valid_slug(identity) {
            Err(ActivationError::Registry(RegistryError::InvalidIdentity(
                identity.to_string(),
            )))
        } else {
            match group {
                Some(group) if value => self.toggle_exclusive(kind, identity, group),
                _ => self.registry.set_active(kind, identity, value).map_err(Into::into),
            }
        };

        match &result {
            Ok(unit) => info!(
                "event=unit_toggle module=activation status=ok kind={kind} identity={} value={value} exclusive={}",
                unit.identity,
                group.is_some()
            ),
            Err(err) => error!(
                "event=unit_toggle module=activation status=error kind={kind} identity={identity} value={value} error={err}"
            ),
        }
        result
    }

    /// Sets every unit of one kind inactive. Idempotent administrative
    /// reset, e.g. clearing all popups before publishing a new one.
    pub fn deactivate_all(&self, kind: UnitKind) -> ActivationResult<()> {
        self.registry.deactivate_all(kind)?;
        info!("event=deactivate_all module=activation status=ok kind={kind}");
        Ok(())
    }

    fn toggle_exclusive(
        &self,
        kind: UnitKind,
        identity: &str,
        group: &str,
    ) -> ActivationResult<Unit> {
        // Resolve the target before mutating anything, so a missing unit
        // surfaces as UnitNotFound with the group untouched.
        self.registry.find_unit(kind, identity)?;

        match self.apply_exclusive_sequence(kind, identity, group) {
            Ok(unit) => Ok(unit),
            Err(err) if is_retryable(&err) => {
                warn!(
                    "event=unit_toggle module=activation status=retry kind={kind} identity={identity} error={err}"
                );
                self.apply_exclusive_sequence(kind, identity, group)
                    .map_err(|retry_err| match retry_err {
                        err if is_retryable(&err) => ActivationError::ActivationFailed {
                            kind,
                            identity: identity.to_string(),
                        },
                        other => ActivationError::Registry(other),
                    })
            }
            Err(other) => Err(ActivationError::Registry(other)),
        }
    }

    /// Deactivates every group member, then activates the target, inside
    /// one IMMEDIATE transaction. Dropping the transaction on any error
    /// rolls the whole sequence back.
    fn apply_exclusive_sequence(
        &self,
        kind: UnitKind,
        identity: &str,
        group: &str,
    ) -> RegistryResult<Unit> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        for member_kind in self.registry.kinds_in_group(group) {
            self.registry.deactivate_all(member_kind)?;
        }
        let unit = self.registry.set_active(kind, identity, true)?;

        tx.commit()?;
        Ok(unit)
    }
}

fn is_retryable(err: &RegistryError) -> bool {
    matches!(err, RegistryError::Db(_))
}

#[cfg(test)]
mod tests {
    use super::{ActivationError, ActivationService};
    use crate::db::{open_db_in_memory, DbError};
    use crate::model::unit::{Unit, UnitKind};
    use crate::registry::unit_registry::UnitRegistry;
    use crate::repo::unit_store::{StoreResult, UnitStore, UnitStoreError};
    use std::cell::{Cell, RefCell};

    struct FlakyStore {
        kind: UnitKind,
        write_failures_left: Cell<u32>,
        units: RefCell<Vec<Unit>>,
    }

    impl FlakyStore {
        fn new(kind: UnitKind, identities: &[&str], write_failures: u32) -> Self {
            let units = identities
                .iter()
                .map(|identity| Unit::new(kind, *identity, identity.to_uppercase()))
                .collect();
            Self {
                kind,
                write_failures_left: Cell::new(write_failures),
                units: RefCell::new(units),
            }
        }

        fn fail_if_armed(&self) -> StoreResult<()> {
            if self.write_failures_left.get() > 0 {
                self.write_failures_left.set(self.write_failures_left.get() - 1);
                return Err(UnitStoreError::Db(DbError::Sqlite(
                    rusqlite::Error::SqliteFailure(
                        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
                        Some("database is locked".to_string()),
                    ),
                )));
            }
            Ok(())
        }
    }

    impl UnitStore for FlakyStore {
        fn kind(&self) -> UnitKind {
            self.kind
        }

        fn list_units(&self) -> StoreResult<Vec<Unit>> {
            Ok(self.units.borrow().clone())
        }

        fn write_active(&self, identity: &str, value: bool) -> StoreResult<Unit> {
            self.fail_if_armed()?;
            let mut units = self.units.borrow_mut();
            match units.iter_mut().find(|unit| unit.identity == identity) {
                Some(unit) => {
                    unit.is_active = value;
                    Ok(unit.clone())
                }
                None => Err(UnitStoreError::UnitNotFound {
                    kind: self.kind,
                    identity: identity.to_string(),
                }),
            }
        }

        fn deactivate_all(&self) -> StoreResult<()> {
            for unit in self.units.borrow_mut().iter_mut() {
                unit.is_active = false;
            }
            Ok(())
        }
    }

    #[test]
    fn exclusive_toggle_recovers_from_one_transient_storage_failure() {
        let conn = open_db_in_memory().expect("bootstrap should succeed");
        let mut registry = UnitRegistry::new();
        registry.register(Box::new(FlakyStore::new(
            UnitKind::Popup,
            &["spring-sale"],
            1,
        )));
        let activation = ActivationService::new(&conn, &registry);

        let unit = activation
            .toggle(UnitKind::Popup, "spring-sale", true)
            .expect("retry should succeed");
        assert!(unit.is_active);
    }

    #[test]
    fn exclusive_toggle_reports_activation_failed_after_second_failure() {
        let conn = open_db_in_memory().expect("bootstrap should succeed");
        let mut registry = UnitRegistry::new();
        registry.register(Box::new(FlakyStore::new(
            UnitKind::Popup,
            &["spring-sale"],
            2,
        )));
        let activation = ActivationService::new(&conn, &registry);

        let err = activation
            .toggle(UnitKind::Popup, "spring-sale", true)
            .unwrap_err();
        assert!(matches!(
            err,
            ActivationError::ActivationFailed {
                kind: UnitKind::Popup,
                ..
            }
        ));
    }

    #[test]
    fn non_retryable_failure_during_the_sequence_is_not_masked() {
        let conn = open_db_in_memory().expect("bootstrap should succeed");
        let mut registry = UnitRegistry::new();
        registry.register(Box::new(FlakyStore::new(UnitKind::Popup, &[], 0)));
        let activation = ActivationService::new(&conn, &registry);

        let err = activation
            .toggle(UnitKind::Popup, "spring-sale", true)
            .unwrap_err();
        assert!(matches!(
            err,
            ActivationError::Registry(super::RegistryError::UnitNotFound { .. })
        ));
    }
}
