//! In-process unit registry over per-kind storage handles.
//!
//! # Responsibility
//! - Register one `UnitStore` per compiled-in kind at construction.
//! - Give the aggregator and activation service a uniform,
//!   kind-polymorphic read/write surface.
//!
//! # Invariants
//! - An unregistered kind is a programming error (`UnknownKind`), never
//!   silently skipped.
//! - `set_active` is idempotent and validates the identity slug before
//!   touching storage.

use crate::db::DbError;
use crate::model::unit::{is_valid_slug, BaseMetalKind, ProcessKind, Unit, UnitKind};
use crate::repo::unit_store::{SqliteCatalogStore, SqlitePageStore, UnitStore, UnitStoreError};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry and storage errors surfaced to services and the API boundary.
#[derive(Debug)]
pub enum RegistryError {
    UnknownKind(String),
    InvalidIdentity(String),
    UnitNotFound { kind: UnitKind, identity: String },
    Db(DbError),
    InvalidData(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKind(value) => write!(f, "unknown unit kind: {value}"),
            Self::InvalidIdentity(value) => write!(f, "invalid unit identity: {value}"),
            Self::UnitNotFound { kind, identity } => {
                write!(f, "unit not found: {kind}/{identity}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "{message}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnitStoreError> for RegistryError {
    fn from(value: UnitStoreError) -> Self {
        match value {
            UnitStoreError::Db(err) => Self::Db(err),
            UnitStoreError::UnitNotFound { kind, identity } => {
                Self::UnitNotFound { kind, identity }
            }
            UnitStoreError::InvalidData(message) => Self::InvalidData(message),
        }
    }
}

impl From<DbError> for RegistryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Runtime registry of kind -> storage handle.
pub struct UnitRegistry<'conn> {
    stores: BTreeMap<UnitKind, Box<dyn UnitStore + 'conn>>,
}

impl<'conn> UnitRegistry<'conn> {
    /// Creates an empty registry. Production code uses
    /// [`UnitRegistry::with_default_kinds`]; tests may register mocks.
    pub fn new() -> Self {
        Self {
            stores: BTreeMap::new(),
        }
    }

    /// Builds the registry with every compiled-in kind bound to its SQLite
    /// table: 12 process pages, 6 base-metal pages, menu entries, menu
    /// sub-entries and popups.
    pub fn with_default_kinds(conn: &'conn Connection) -> Self {
        let mut registry = Self::new();

        for process in ProcessKind::ALL {
            registry.register(Box::new(SqlitePageStore::new(
                conn,
                UnitKind::Process(process),
                process.table(),
            )));
        }
        for metal in BaseMetalKind::ALL {
            registry.register(Box::new(SqlitePageStore::new(
                conn,
                UnitKind::BaseMetal(metal),
                metal.table(),
            )));
        }
        registry.register(Box::new(SqliteCatalogStore::new(
            conn,
            UnitKind::MenuEntry,
            "menu_entries",
            false,
        )));
        registry.register(Box::new(SqliteCatalogStore::new(
            conn,
            UnitKind::MenuSubEntry,
            "menu_sub_entries",
            true,
        )));
        registry.register(Box::new(SqliteCatalogStore::new(
            conn,
            UnitKind::Popup,
            "popups",
            false,
        )));

        registry
    }

    /// Registers one storage handle under its declared kind, replacing any
    /// previous registration for that kind.
    pub fn register(&mut self, store: Box<dyn UnitStore + 'conn>) {
        self.stores.insert(store.kind(), store);
    }

    /// Returns every registered kind in canonical catalog order.
    pub fn kinds(&self) -> Vec<UnitKind> {
        self.stores.keys().copied().collect()
    }

    /// Returns registered kinds sharing the given exclusivity group.
    pub fn kinds_in_group(&self, group: &str) -> Vec<UnitKind> {
        self.stores
            .keys()
            .copied()
            .filter(|kind| kind.exclusivity_group() == Some(group))
            .collect()
    }

    /// Lists every unit of one kind in deterministic order.
    pub fn units_of(&self, kind: UnitKind) -> RegistryResult<Vec<Unit>> {
        let units = self.store_for(kind)?.list_units()?;
        Ok(units)
    }

    /// Returns one unit by identity, or `UnitNotFound`.
    pub fn find_unit(&self, kind: UnitKind, identity: &str) -> RegistryResult<Unit> {
        self.units_of(kind)?
            .into_iter()
            .find(|unit| unit.identity == identity)
            .ok_or_else(|| RegistryError::UnitNotFound {
                kind,
                identity: identity.to_string(),
            })
    }

    /// Persists one `is_active` change and returns the updated unit.
    pub fn set_active(
        &self,
        kind: UnitKind,
        identity: &str,
        value: bool,
    ) -> RegistryResult<Unit> {
        if !is_valid_slug(identity) {
            return Err(RegistryError::InvalidIdentity(identity.to_string()));
        }
        let unit = self.store_for(kind)?.write_active(identity, value)?;
        Ok(unit)
    }

    /// Sets every unit of one kind inactive. Idempotent.
    pub fn deactivate_all(&self, kind: UnitKind) -> RegistryResult<()> {
        self.store_for(kind)?.deactivate_all()?;
        Ok(())
    }

    fn store_for(&self, kind: UnitKind) -> RegistryResult<&(dyn UnitStore + 'conn)> {
        self.stores
            .get(&kind)
            .map(|store| store.as_ref())
            .ok_or_else(|| RegistryError::UnknownKind(kind.name()))
    }
}

impl Default for UnitRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{RegistryError, UnitRegistry};
    use crate::model::unit::{Unit, UnitKind};
    use crate::repo::unit_store::{StoreResult, UnitStore, UnitStoreError};
    use std::cell::RefCell;

    struct MockStore {
        kind: UnitKind,
        units: RefCell<Vec<Unit>>,
    }

    impl MockStore {
        fn new(kind: UnitKind, identities: &[&str]) -> Self {
            let units = identities
                .iter()
                .map(|identity| Unit::new(kind, *identity, identity.to_uppercase()))
                .collect();
            Self {
                kind,
                units: RefCell::new(units),
            }
        }
    }

    impl UnitStore for MockStore {
        fn kind(&self) -> UnitKind {
            self.kind
        }

        fn list_units(&self) -> StoreResult<Vec<Unit>> {
            Ok(self.units.borrow().clone())
        }

        fn write_active(&self, identity: &str, value: bool) -> StoreResult<Unit> {
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
    fn unregistered_kind_is_an_unknown_kind_error() {
        let registry = UnitRegistry::new();
        let err = registry.units_of(UnitKind::Popup).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownKind(_)));
    }

    #[test]
    fn set_active_rejects_malformed_identity_before_storage() {
        let mut registry = UnitRegistry::new();
        registry.register(Box::new(MockStore::new(UnitKind::MenuEntry, &["services"])));

        let err = registry
            .set_active(UnitKind::MenuEntry, "Not A Slug", true)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidIdentity(_)));
    }

    #[test]
    fn set_active_returns_updated_unit_and_is_idempotent() {
        let mut registry = UnitRegistry::new();
        registry.register(Box::new(MockStore::new(UnitKind::MenuEntry, &["services"])));

        let first = registry
            .set_active(UnitKind::MenuEntry, "services", false)
            .expect("toggle should succeed");
        assert!(!first.is_active);

        let second = registry
            .set_active(UnitKind::MenuEntry, "services", false)
            .expect("repeat toggle should succeed");
        assert_eq!(first, second);
    }

    #[test]
    fn find_unit_reports_missing_identity() {
        let mut registry = UnitRegistry::new();
        registry.register(Box::new(MockStore::new(UnitKind::Popup, &["spring-sale"])));

        let err = registry
            .find_unit(UnitKind::Popup, "winter-sale")
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnitNotFound { kind: UnitKind::Popup, .. }
        ));
    }

    #[test]
    fn kinds_in_group_returns_only_declared_members() {
        let mut registry = UnitRegistry::new();
        registry.register(Box::new(MockStore::new(UnitKind::MenuEntry, &[])));
        registry.register(Box::new(MockStore::new(UnitKind::Popup, &[])));

        let members = registry.kinds_in_group(crate::model::unit::PROMO_POPUP_GROUP);
        assert_eq!(members, vec![UnitKind::Popup]);
    }
}
