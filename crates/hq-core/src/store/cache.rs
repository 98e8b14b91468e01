use tracing::debug;

use crate::ledger::{BalanceRow, HistoryRecord};

use super::{HistoryRead, LedgerStore, StoreError};

/// Read-through cache in front of another store. Writes go straight
/// through; cached reads survive until [`LedgerStore::invalidate_cache`].
#[derive(Debug)]
pub struct CachedStore<S> {
    inner: S,
    balances: Option<Vec<BalanceRow>>,
    history: Option<HistoryRead>,
}

impl<S: LedgerStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            balances: None,
            history: None,
        }
    }

    pub fn is_warm(&self) -> bool {
        self.balances.is_some() || self.history.is_some()
    }
}

impl<S: LedgerStore> LedgerStore for CachedStore<S> {
    fn read_balances(&mut self) -> Result<Vec<BalanceRow>, StoreError> {
        if let Some(rows) = &self.balances {
            return Ok(rows.clone());
        }
        let rows = self.inner.read_balances()?;
        self.balances = Some(rows.clone());
        Ok(rows)
    }

    fn read_history(&mut self) -> Result<HistoryRead, StoreError> {
        if let Some(read) = &self.history {
            return Ok(read.clone());
        }
        let read = self.inner.read_history()?;
        self.history = Some(read.clone());
        Ok(read)
    }

    fn write_all(
        &mut self,
        balances: &[BalanceRow],
        history: &[HistoryRecord],
    ) -> Result<(), StoreError> {
        self.inner.write_all(balances, history)
    }

    fn invalidate_cache(&mut self) {
        debug!("dropping cached tables");
        self.balances = None;
        self.history = None;
        self.inner.invalidate_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn reads_are_served_from_cache_until_invalidated() {
        let mut store = CachedStore::new(MemoryStore::new(vec![BalanceRow::new("Rob", 1)]));
        assert_eq!(store.read_balances().unwrap()[0].balance, 1);
        assert!(store.is_warm());

        store
            .write_all(&[BalanceRow::new("Rob", 7)], &[])
            .unwrap();
        assert_eq!(store.read_balances().unwrap()[0].balance, 1);

        store.invalidate_cache();
        assert!(!store.is_warm());
        assert_eq!(store.read_balances().unwrap()[0].balance, 7);
        assert_eq!(store.read_history().unwrap(), HistoryRead::Found(vec![]));
    }
}
