use crate::ledger::{BalanceRow, HistoryRecord};

use super::{HistoryRead, LedgerStore, StoreError};

/// In-process store. Starts with whatever tables it is given; `None`
/// stands for a table that does not exist yet.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    balances: Option<Vec<BalanceRow>>,
    history: Option<Vec<HistoryRecord>>,
    offline: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new(balances: Vec<BalanceRow>) -> Self {
        Self {
            balances: Some(balances),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryRecord>) -> Self {
        self.history = Some(history);
        self
    }

    /// Makes every operation fail as if the store were unreachable.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn balances(&self) -> Option<&[BalanceRow]> {
        self.balances.as_deref()
    }

    pub fn history(&self) -> Option<&[HistoryRecord]> {
        self.history.as_deref()
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unreachable {
                location: "memory".to_string(),
            });
        }
        Ok(())
    }
}

impl LedgerStore for MemoryStore {
    fn read_balances(&mut self) -> Result<Vec<BalanceRow>, StoreError> {
        self.check_online()?;
        self.balances
            .clone()
            .ok_or_else(|| StoreError::TableNotFound {
                table: "balances".to_string(),
            })
    }

    fn read_history(&mut self) -> Result<HistoryRead, StoreError> {
        self.check_online()?;
        Ok(match &self.history {
            Some(records) => HistoryRead::Found(records.clone()),
            None => HistoryRead::Missing,
        })
    }

    fn write_all(
        &mut self,
        balances: &[BalanceRow],
        history: &[HistoryRecord],
    ) -> Result<(), StoreError> {
        self.check_online()?;
        self.balances = Some(balances.to_vec());
        self.history = Some(history.to_vec());
        self.writes += 1;
        Ok(())
    }
}
