//! Table store contract.
//!
//! The ledger lives in two named tables: balances (one row per user) and
//! history (newest first). A store only ever reads a table whole or
//! replaces both tables whole; there is no partial update.

use std::path::PathBuf;

use thiserror::Error;

use crate::ledger::{BalanceRow, HistoryRecord};

mod cache;
mod memory;
mod workbook;

pub use cache::CachedStore;
pub use memory::MemoryStore;
pub use workbook::{WorkbookStore, DEFAULT_BALANCES_TABLE, DEFAULT_HISTORY_TABLE};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable at {location}")]
    Unreachable { location: String },
    #[error("table {table} not found")]
    TableNotFound { table: String },
    #[error("i/o error on table {table}: {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed table {table}: {source}")]
    Malformed {
        table: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store already initialised at {path}")]
    AlreadyExists { path: PathBuf },
}

/// Result of reading the history table, which may legitimately be absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryRead {
    Found(Vec<HistoryRecord>),
    Missing,
}

impl HistoryRead {
    /// Substitutes an empty log for a missing table.
    pub fn into_records(self) -> Vec<HistoryRecord> {
        match self {
            HistoryRead::Found(records) => records,
            HistoryRead::Missing => Vec::new(),
        }
    }
}

pub trait LedgerStore {
    fn read_balances(&mut self) -> Result<Vec<BalanceRow>, StoreError>;

    fn read_history(&mut self) -> Result<HistoryRead, StoreError>;

    /// Replaces both tables. Implementations must not leave one table
    /// rewritten and the other untouched when they return an error they
    /// could detect before writing.
    fn write_all(
        &mut self,
        balances: &[BalanceRow],
        history: &[HistoryRecord],
    ) -> Result<(), StoreError>;

    /// Drops any cached copies so the next read sees the last write.
    fn invalidate_cache(&mut self) {}
}
