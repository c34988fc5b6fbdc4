//! Singleton visit counter persistence.
//!
//! # Responsibility
//! - Keep the one-row counter table behind a read-modify-write contract.
//! - Guarantee no lost updates under concurrent increments.
//!
//! # Invariants
//! - The singleton row has `id = 1`; first access creates it lazily.
//! - `increment` runs inside an IMMEDIATE transaction, so two racing calls
//!   serialize on the write lock instead of both reading the same prior
//!   count.

use crate::db::DbResult;
use crate::model::visit::VisitSnapshot;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Storage contract for the visit counter singleton.
pub trait VisitRepository {
    /// Atomically adds one visit and returns the post-increment snapshot.
    fn increment(&self) -> DbResult<VisitSnapshot>;

    /// Non-blocking read of the current counter state.
    fn snapshot(&self) -> DbResult<VisitSnapshot>;

    /// Administrative reset to zero. Racing increments resolve
    /// last-write-wins, which is the accepted behavior.
    fn reset(&self) -> DbResult<()>;
}

/// SQLite-backed visit counter repository.
pub struct SqliteVisitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVisitRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl VisitRepository for SqliteVisitRepository<'_> {
    fn increment(&self) -> DbResult<VisitSnapshot> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_counter_row(&tx)?;

        tx.execute(
            "UPDATE visit_counter
             SET count = count + 1,
                 last_visit_at = (strftime('%s', 'now') * 1000)
             WHERE id = 1;",
            [],
        )?;
        let snapshot = read_counter_row(&tx)?;

        tx.commit()?;
        Ok(snapshot)
    }

    fn snapshot(&self) -> DbResult<VisitSnapshot> {
        ensure_counter_row(self.conn)?;
        read_counter_row(self.conn)
    }

    fn reset(&self) -> DbResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_counter_row(&tx)?;

        tx.execute(
            "UPDATE visit_counter
             SET count = 0,
                 last_visit_at = (strftime('%s', 'now') * 1000)
             WHERE id = 1;",
            [],
        )?;

        tx.commit()?;
        Ok(())
    }
}

fn ensure_counter_row(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO visit_counter (id, count, last_visit_at)
         VALUES (1, 0, 0);",
        [],
    )?;
    Ok(())
}

fn read_counter_row(conn: &Connection) -> DbResult<VisitSnapshot> {
    let snapshot = conn.query_row(
        "SELECT count, last_visit_at FROM visit_counter WHERE id = 1;",
        [],
        |row| {
            Ok(VisitSnapshot {
                count: row.get("count")?,
                last_visit_at: row.get("last_visit_at")?,
            })
        },
    )?;
    Ok(snapshot)
}
