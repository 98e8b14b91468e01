use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::ledger::{BalanceRow, HistoryRecord};

use super::{HistoryRead, LedgerStore, StoreError};

pub const DEFAULT_BALANCES_TABLE: &str = "Sheet1";
pub const DEFAULT_HISTORY_TABLE: &str = "History";

/// File-backed store: a directory with one JSON document per table,
/// `<table>.json`, each holding an array of rows keyed by column name.
#[derive(Clone, Debug)]
pub struct WorkbookStore {
    root: PathBuf,
    balances_table: String,
    history_table: String,
}

impl WorkbookStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::with_tables(root, DEFAULT_BALANCES_TABLE, DEFAULT_HISTORY_TABLE)
    }

    pub fn with_tables(
        root: impl Into<PathBuf>,
        balances_table: impl Into<String>,
        history_table: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            balances_table: balances_table.into(),
            history_table: history_table.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.json"))
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::Unreachable {
                location: self.root.display().to_string(),
            });
        }
        Ok(())
    }

    /// Creates the workbook with the given balances and an empty history.
    /// Refuses to touch a workbook that already has a balances table.
    pub fn initialise(&self, balances: &[BalanceRow]) -> Result<(), StoreError> {
        let path = self.table_path(&self.balances_table);
        if path.exists() {
            return Err(StoreError::AlreadyExists { path });
        }
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            table: self.balances_table.clone(),
            source,
        })?;
        self.write_tables(balances, &[])
    }

    fn stage<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<NamedTempFile, StoreError> {
        let io_err = |source| StoreError::Io {
            table: table.to_string(),
            source,
        };
        let bytes = serde_json::to_vec_pretty(rows).map_err(|source| StoreError::Malformed {
            table: table.to_string(),
            source,
        })?;
        let mut temp = NamedTempFile::new_in(&self.root).map_err(io_err)?;
        temp.write_all(&bytes).map_err(io_err)?;
        temp.flush().map_err(io_err)?;
        Ok(temp)
    }

    fn write_tables(
        &self,
        balances: &[BalanceRow],
        history: &[HistoryRecord],
    ) -> Result<(), StoreError> {
        // Stage both tables before renaming either one into place.
        let staged_balances = self.stage(&self.balances_table, balances)?;
        let staged_history = self.stage(&self.history_table, history)?;

        for (table, staged) in [
            (&self.balances_table, staged_balances),
            (&self.history_table, staged_history),
        ] {
            staged
                .persist(self.table_path(table))
                .map_err(|err| StoreError::Io {
                    table: table.clone(),
                    source: err.error,
                })?;
        }
        debug!(
            root = %self.root.display(),
            rows = balances.len(),
            history = history.len(),
            "workbook written"
        );
        Ok(())
    }
}

impl LedgerStore for WorkbookStore {
    fn read_balances(&mut self) -> Result<Vec<BalanceRow>, StoreError> {
        self.check_reachable()?;
        let table = &self.balances_table;
        let bytes = match fs::read(self.table_path(table)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::TableNotFound {
                    table: table.clone(),
                })
            }
            Err(source) => {
                return Err(StoreError::Io {
                    table: table.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
            table: table.clone(),
            source,
        })
    }

    fn read_history(&mut self) -> Result<HistoryRead, StoreError> {
        self.check_reachable()?;
        let table = &self.history_table;
        let bytes = match fs::read(self.table_path(table)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(HistoryRead::Missing),
            Err(source) => {
                return Err(StoreError::Io {
                    table: table.clone(),
                    source,
                })
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(HistoryRead::Missing);
        }
        serde_json::from_slice(&bytes)
            .map(HistoryRead::Found)
            .map_err(|source| StoreError::Malformed {
                table: table.clone(),
                source,
            })
    }

    fn write_all(
        &mut self,
        balances: &[BalanceRow],
        history: &[HistoryRecord],
    ) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.write_tables(balances, history)
    }
}
