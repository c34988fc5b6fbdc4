//! Kind-polymorphic unit storage contract and SQLite implementations.
//!
//! # Responsibility
//! - Give every content family a uniform list/write-active surface over its
//!   own physical table.
//! - Keep family-specific SQL out of the registry, aggregator and
//!   activation service.
//!
//! # Invariants
//! - `list_units` returns deterministic order: `sort_order`, then identity.
//! - `write_active` is idempotent and reports `UnitNotFound` for missing
//!   identities instead of silently writing nothing.

use crate::db::DbError;
use crate::model::unit::{Unit, UnitKind};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, UnitStoreError>;

/// Persistence error for unit storage operations.
#[derive(Debug)]
pub enum UnitStoreError {
    Db(DbError),
    UnitNotFound { kind: UnitKind, identity: String },
    InvalidData(String),
}

impl Display for UnitStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnitNotFound { kind, identity } => {
                write!(f, "unit not found: {kind}/{identity}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted unit data: {message}"),
        }
    }
}

impl Error for UnitStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UnitNotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for UnitStoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for UnitStoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage handle for one content family.
///
/// Implemented once per physical shape and registered into the unit
/// registry at startup, so callers never branch on the family.
pub trait UnitStore {
    fn kind(&self) -> UnitKind;

    /// Lists every unit of the family, active or not, in catalog order.
    fn list_units(&self) -> StoreResult<Vec<Unit>>;

    /// Persists one `is_active` change and returns the updated unit.
    fn write_active(&self, identity: &str, value: bool) -> StoreResult<Unit>;

    /// Sets every unit of the family inactive. Idempotent.
    fn deactivate_all(&self) -> StoreResult<()>;
}

/// Store for the fixed single-row marketing page tables (processes and base
/// metals). The seed migration guarantees the one row exists.
pub struct SqlitePageStore<'conn> {
    conn: &'conn Connection,
    kind: UnitKind,
    table: &'static str,
}

impl<'conn> SqlitePageStore<'conn> {
    pub fn new(conn: &'conn Connection, kind: UnitKind, table: &'static str) -> Self {
        Self { conn, kind, table }
    }
}

impl UnitStore for SqlitePageStore<'_> {
    fn kind(&self) -> UnitKind {
        self.kind
    }

    fn list_units(&self) -> StoreResult<Vec<Unit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT slug, display_name, is_active, sort_order
             FROM {}
             ORDER BY sort_order ASC, slug ASC;",
            self.table
        ))?;

        let mut rows = stmt.query([])?;
        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(parse_unit_row(row, self.kind, self.table, false)?);
        }
        Ok(units)
    }

    fn write_active(&self, identity: &str, value: bool) -> StoreResult<Unit> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET is_active = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE slug = ?1;",
                self.table
            ),
            params![identity, bool_to_int(value)],
        )?;

        if changed == 0 {
            return Err(UnitStoreError::UnitNotFound {
                kind: self.kind,
                identity: identity.to_string(),
            });
        }

        fetch_unit(self.conn, self.kind, self.table, identity, false)
    }

    fn deactivate_all(&self) -> StoreResult<()> {
        self.conn.execute(
            &format!(
                "UPDATE {}
                 SET is_active = 0,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE is_active = 1;",
                self.table
            ),
            [],
        )?;
        Ok(())
    }
}

/// Store for the admin-managed multi-row tables (menu entries, menu
/// sub-entries, popups). Sub-entries additionally carry a parent link.
pub struct SqliteCatalogStore<'conn> {
    conn: &'conn Connection,
    kind: UnitKind,
    table: &'static str,
    has_parent: bool,
}

impl<'conn> SqliteCatalogStore<'conn> {
    pub fn new(
        conn: &'conn Connection,
        kind: UnitKind,
        table: &'static str,
        has_parent: bool,
    ) -> Self {
        Self {
            conn,
            kind,
            table,
            has_parent,
        }
    }
}

impl UnitStore for SqliteCatalogStore<'_> {
    fn kind(&self) -> UnitKind {
        self.kind
    }

    fn list_units(&self) -> StoreResult<Vec<Unit>> {
        let parent_column = if self.has_parent {
            "parent_slug"
        } else {
            "NULL AS parent_slug"
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT slug, display_name, is_active, sort_order, {parent_column}
             FROM {}
             ORDER BY sort_order ASC, slug ASC;",
            self.table
        ))?;

        let mut rows = stmt.query([])?;
        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(parse_unit_row(row, self.kind, self.table, true)?);
        }
        Ok(units)
    }

    fn write_active(&self, identity: &str, value: bool) -> StoreResult<Unit> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET is_active = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE slug = ?1;",
                self.table
            ),
            params![identity, bool_to_int(value)],
        )?;

        if changed == 0 {
            return Err(UnitStoreError::UnitNotFound {
                kind: self.kind,
                identity: identity.to_string(),
            });
        }

        fetch_unit(self.conn, self.kind, self.table, identity, self.has_parent)
    }

    fn deactivate_all(&self) -> StoreResult<()> {
        self.conn.execute(
            &format!(
                "UPDATE {}
                 SET is_active = 0,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE is_active = 1;",
                self.table
            ),
            [],
        )?;
        Ok(())
    }
}

fn fetch_unit(
    conn: &Connection,
    kind: UnitKind,
    table: &str,
    identity: &str,
    with_parent: bool,
) -> StoreResult<Unit> {
    let parent_column = if with_parent {
        "parent_slug"
    } else {
        "NULL AS parent_slug"
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT slug, display_name, is_active, sort_order, {parent_column}
         FROM {table}
         WHERE slug = ?1;"
    ))?;

    let mut rows = stmt.query([identity])?;
    match rows.next()? {
        Some(row) => parse_unit_row(row, kind, table, true),
        None => Err(UnitStoreError::UnitNotFound {
            kind,
            identity: identity.to_string(),
        }),
    }
}

fn parse_unit_row(
    row: &Row<'_>,
    kind: UnitKind,
    table: &str,
    with_parent: bool,
) -> StoreResult<Unit> {
    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(UnitStoreError::InvalidData(format!(
                "invalid is_active value `{other}` in {table}.is_active"
            )));
        }
    };

    let parent = if with_parent {
        row.get::<_, Option<String>>("parent_slug")?
    } else {
        None
    };

    Ok(Unit {
        kind,
        identity: row.get("slug")?,
        display_name: row.get("display_name")?,
        is_active,
        sort_order: row.get("sort_order")?,
        parent,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
