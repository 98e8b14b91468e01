use thiserror::Error;

use crate::config::ConfigError;
use crate::household::ActionError;
use crate::ledger::LedgerError;
use crate::store::StoreError;

/// Canonical error type exposed by the core crate.
#[derive(Debug, Error)]
pub enum HqError {
    /// The table store failed to read or write.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A transaction was rejected by the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A dashboard action is not available to the user right now.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The household configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HqError {
    /// True when the store could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, HqError::Store(StoreError::Unreachable { .. }))
    }

    /// True for rejections that leave the ledger untouched and only warrant a warning.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            HqError::Ledger(LedgerError::InsufficientFunds { .. })
                | HqError::Action(
                    ActionError::NotYourWeek
                        | ActionError::Locked { .. }
                        | ActionError::OutOfRange { .. }
                        | ActionError::InsufficientCash { .. }
                )
        )
    }
}
