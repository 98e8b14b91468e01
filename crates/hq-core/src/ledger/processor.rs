use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::store::{HistoryRead, LedgerStore};
use crate::HqError;

use super::{
    Amount, HistoryRecord, Ledger, LedgerError, Transaction, TransactionKind, HISTORY_DATE_FORMAT,
};

/// How the dashboard should acknowledge a committed transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acknowledgment {
    /// Money was earned.
    Celebrate(Amount),
    /// Money was spent.
    Neutral(Amount),
    /// Nothing worth announcing.
    Silent,
}

impl Acknowledgment {
    /// Earning celebrates, spending is acknowledged neutrally. Deposits,
    /// fines and zero-value chores pass silently.
    pub fn for_transaction(txn: &Transaction) -> Self {
        match (txn.kind, txn.value) {
            (TransactionKind::EarnOrSpend, v) if v > 0 => Acknowledgment::Celebrate(v),
            (TransactionKind::EarnOrSpend, v) if v < 0 => Acknowledgment::Neutral(v.saturating_abs()),
            _ => Acknowledgment::Silent,
        }
    }
}

/// The committed history record and how to acknowledge it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub record: HistoryRecord,
    pub acknowledgment: Acknowledgment,
}

/// Runs one full read, mutate, write cycle per transaction against a store.
pub struct TransactionProcessor<S> {
    store: S,
}

impl<S: LedgerStore> TransactionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads both tables. A missing history table becomes an empty log.
    pub fn load(&mut self) -> Result<Ledger, HqError> {
        let balances = self.store.read_balances()?;
        let history = match self.store.read_history()? {
            HistoryRead::Found(records) => records,
            HistoryRead::Missing => {
                debug!("history table missing, starting an empty log");
                Vec::new()
            }
        };
        Ok(Ledger::new(balances, history))
    }

    pub fn process(&mut self, txn: &Transaction) -> Result<Receipt, HqError> {
        self.process_at(txn, Local::now().naive_local())
    }

    /// Applies `txn` stamped with `now`. Nothing is written unless the
    /// ledger accepts the transaction.
    pub fn process_at(
        &mut self,
        txn: &Transaction,
        now: NaiveDateTime,
    ) -> Result<Receipt, HqError> {
        let mut ledger = self.load()?;
        let date = now.format(HISTORY_DATE_FORMAT).to_string();
        let record = match ledger.apply(txn, date) {
            Ok(record) => record,
            Err(err @ LedgerError::InsufficientFunds { .. }) => {
                warn!(user = %txn.user, kind = ?txn.kind, value = txn.value, "transaction rejected");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        self.commit(&ledger)?;
        info!(user = %record.user, msg = %record.msg, val = record.val, "transaction committed");
        Ok(Receipt {
            acknowledgment: Acknowledgment::for_transaction(txn),
            record,
        })
    }

    /// Takes `amount` out of the house pot and returns what is left.
    pub fn spend_pot(&mut self, amount: Amount) -> Result<Amount, HqError> {
        let mut ledger = self.load()?;
        let remaining = ledger.spend_pot(amount)?;
        self.commit(&ledger)?;
        info!(amount, remaining, "house pot spent");
        Ok(remaining)
    }

    fn commit(&mut self, ledger: &Ledger) -> Result<(), HqError> {
        self.store.write_all(&ledger.balances, &ledger.history)?;
        self.store.invalidate_cache();
        Ok(())
    }
}
