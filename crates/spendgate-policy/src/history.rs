//! Durable transaction history with `SQLite` persistence.
//!
//! A [`HistoryStore`] lets a [`SpendGovernor`](crate::governor::SpendGovernor)
//! keep its log across restarts: accepted transactions are appended to the
//! store before they enter the in-memory log, and are replayed from it when a
//! governor is attached to the store.
//!
//! # Features
//!
//! - Persistent storage using `SQLite`
//! - Connection pooling via `r2d2`
//! - Thread-safe operations
//! - Full history retained, in insertion order
//!
//! # Example
//!
//! ```no_run
//! use spendgate_core::types::Transaction;
//! use spendgate_policy::history::{HistoryStore, SqliteHistory};
//! use std::path::Path;
//!
//! let history = SqliteHistory::new(Path::new("/path/to/history.db")).unwrap();
//! history.append(&Transaction::now(3.0, "API_CREDITS").unwrap()).unwrap();
//!
//! let replayed = history.load().unwrap();
//! assert_eq!(replayed.len(), 1);
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, TransactionBehavior};
use spendgate_core::error::{GovernorError, StoreError};
use spendgate_core::types::Transaction;
use std::path::Path;
use std::time::Duration;

/// Pool size for file-backed databases.
const FILE_POOL_SIZE: u32 = 4;

/// How long a writer waits for another process's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistence collaborator for accepted transactions.
pub trait HistoryStore: Send + Sync {
    /// Returns every stored transaction in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read or holds an entry
    /// that is not a valid transaction.
    fn load(&self) -> Result<Vec<Transaction>, StoreError>;

    /// Appends `tx` to the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the transaction could not be persisted.
    fn append(&self, tx: &Transaction) -> Result<(), StoreError>;

    /// Appends `tx` while holding the store's write lock.
    ///
    /// `admit` first receives every transaction stored after the first `known`
    /// ones, that is, rows other writers added since the caller last synced.
    /// `tx` is written only if `admit` returns `Ok`. Stores shared between
    /// processes must run the read, `admit`, and the write as one atomic unit.
    ///
    /// The default suits stores with a single writer: nothing new is ever
    /// reported and the append is plain.
    ///
    /// # Errors
    ///
    /// Returns the error from `admit`, or [`GovernorError::Store`] if the
    /// store cannot be read or written.
    fn append_exclusive(
        &self,
        tx: &Transaction,
        known: usize,
        admit: &mut dyn FnMut(Vec<Transaction>) -> Result<(), GovernorError>,
    ) -> Result<(), GovernorError> {
        let _ = known;
        admit(Vec::new())?;
        self.append(tx)?;
        Ok(())
    }
}

/// A stored transaction together with its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// Row id. Increases with insertion order.
    pub id: i64,
    /// The stored transaction.
    pub transaction: Transaction,
}

/// Transaction history backed by `SQLite`.
///
/// # Thread Safety
///
/// `SqliteHistory` is `Send + Sync`; the connection pool handles concurrent access.
pub struct SqliteHistory {
    pool: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for SqliteHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHistory")
            .field("pool_size", &self.pool.max_size())
            .finish_non_exhaustive()
    }
}

impl SqliteHistory {
    /// Opens (or creates) a file-backed history database.
    ///
    /// The parent directory must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the database cannot be opened or initialized.
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        let manager =
            SqliteConnectionManager::file(db_path).with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        Self::from_manager(manager, FILE_POOL_SIZE)
    }

    /// Creates a history in a private in-memory database.
    ///
    /// Nothing survives once the value is dropped. Useful for tests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the database cannot be initialized.
    ///
    /// # Example
    ///
    /// ```
    /// use spendgate_policy::history::SqliteHistory;
    ///
    /// let history = SqliteHistory::in_memory().unwrap();
    /// assert_eq!(history.count().unwrap(), 0);
    /// ```
    pub fn in_memory() -> Result<Self, StoreError> {
        // Every `:memory:` connection is its own database, so keep exactly one.
        let manager = SqliteConnectionManager::memory();
        Self::from_manager(manager, 1)
    }

    fn from_manager(manager: SqliteConnectionManager, max_size: u32) -> Result<Self, StoreError> {
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(|e| StoreError::database(e.to_string()))?;

        let history = Self { pool };
        history.init_schema()?;
        Ok(history)
    }

    fn get_conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        self.pool
            .get()
            .map_err(|e| StoreError::database(e.to_string()))
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.get_conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                target TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError::database(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_created_at ON history(created_at)",
            [],
        )
        .map_err(|e| StoreError::database(e.to_string()))?;

        Ok(())
    }

    /// Number of stored transactions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.get_conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
            .map_err(|e| StoreError::database(e.to_string()))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// The most recent `limit` transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails and
    /// [`StoreError::Corrupted`] if a row is not a valid transaction.
    ///
    /// # Example
    ///
    /// ```
    /// use spendgate_core::types::Transaction;
    /// use spendgate_policy::history::{HistoryStore, SqliteHistory};
    ///
    /// let history = SqliteHistory::in_memory().unwrap();
    /// history.append(&Transaction::now(1.0, "first").unwrap()).unwrap();
    /// history.append(&Transaction::now(2.0, "second").unwrap()).unwrap();
    ///
    /// let recent = history.recent(1).unwrap();
    /// assert_eq!(recent[0].transaction.target(), "second");
    /// ```
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, StoreError> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_records(
            "SELECT id, amount, target, created_at FROM history ORDER BY id DESC LIMIT ?1",
            params![limit_i64],
        )
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        let conn = self.get_conn()?;
        read_records(&conn, sql, params)
    }
}

impl HistoryStore for SqliteHistory {
    fn load(&self) -> Result<Vec<Transaction>, StoreError> {
        let records = self.query_records(
            "SELECT id, amount, target, created_at FROM history ORDER BY id ASC",
            params![],
        )?;

        Ok(records.into_iter().map(|r| r.transaction).collect())
    }

    fn append(&self, tx: &Transaction) -> Result<(), StoreError> {
        let conn = self.get_conn()?;
        insert(&conn, tx)
    }

    /// Runs inside a `BEGIN IMMEDIATE` transaction, so writers in other
    /// processes on the same file wait until this one commits or rolls back.
    fn append_exclusive(
        &self,
        tx: &Transaction,
        known: usize,
        admit: &mut dyn FnMut(Vec<Transaction>) -> Result<(), GovernorError>,
    ) -> Result<(), GovernorError> {
        let mut conn = self.get_conn()?;
        let db_tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| StoreError::database(e.to_string()))?;

        let offset = i64::try_from(known).unwrap_or(i64::MAX);
        let newer = read_records(
            &db_tx,
            "SELECT id, amount, target, created_at FROM history ORDER BY id ASC LIMIT -1 OFFSET ?1",
            params![offset],
        )?;

        // Dropping `db_tx` on the error path rolls back and releases the lock
        admit(newer.into_iter().map(|r| r.transaction).collect())?;

        insert(&db_tx, tx)?;
        db_tx
            .commit()
            .map_err(|e| StoreError::database(e.to_string()))?;
        Ok(())
    }
}

fn insert(conn: &Connection, tx: &Transaction) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO history (amount, target, created_at) VALUES (?1, ?2, ?3)",
        params![tx.amount(), tx.target(), encode_timestamp(tx.created_at())],
    )
    .map_err(|e| StoreError::database(e.to_string()))?;

    Ok(())
}

fn read_records(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<HistoryRecord>, StoreError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| StoreError::database(e.to_string()))?;

    let rows = stmt
        .query_map(params, |row| {
            let id: i64 = row.get(0)?;
            let amount: f64 = row.get(1)?;
            let target: String = row.get(2)?;
            let created_at: String = row.get(3)?;
            Ok((id, amount, target, created_at))
        })
        .map_err(|e| StoreError::database(e.to_string()))?;

    let mut records = Vec::new();
    for row in rows {
        let (id, amount, target, created_at) =
            row.map_err(|e| StoreError::database(e.to_string()))?;

        records.push(HistoryRecord {
            id,
            transaction: decode_row(id, amount, &target, &created_at)?,
        });
    }

    Ok(records)
}

fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Rebuilds a stored row through [`Transaction::new`] so invariants hold.
fn decode_row(
    id: i64,
    amount: f64,
    target: &str,
    created_at: &str,
) -> Result<Transaction, StoreError> {
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|e| StoreError::corrupted(format!("row {id}: bad timestamp: {e}")))?
        .with_timezone(&Utc);

    Transaction::new(amount, target, created_at)
        .map_err(|e| StoreError::corrupted(format!("row {id}: {e}")))
}
