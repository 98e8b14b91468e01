use serde::{Deserialize, Serialize};

mod processor;

pub use processor::{Acknowledgment, Receipt, TransactionProcessor};

pub type UserId = String;
pub type Amount = i64;

/// Name of the shared row that collects fines.
pub const HOUSE_POT: &str = "House_Pot";

/// Timestamp layout used in the `Date` column of the history table.
pub const HISTORY_DATE_FORMAT: &str = "%d/%m %H:%M";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("unknown user {user}")]
    UnknownUser { user: UserId },
    #[error("not enough cash: {user} has £{available}, needs £{needed}")]
    InsufficientFunds {
        user: UserId,
        available: Amount,
        needed: Amount,
    },
    #[error("amount must be positive, got {value}")]
    InvalidAmount { value: Amount },
    #[error("amount {value} would overflow the balance of {user}")]
    Overflow { user: UserId, value: Amount },
    #[error("House_Pot cannot {what}")]
    PotRestricted { what: &'static str },
}

/// One row of the balances table. Field order matches the column order of
/// the stored table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BalanceRow {
    #[serde(rename = "User")]
    pub user: UserId,
    #[serde(rename = "Balance")]
    pub balance: Amount,
    #[serde(rename = "Vault", default)]
    pub vault: Amount,
    #[serde(rename = "Vault_Goal", default)]
    pub vault_goal: Amount,
    #[serde(rename = "XP", default)]
    pub xp: Amount,
}

impl BalanceRow {
    pub fn new(user: impl Into<UserId>, balance: Amount) -> Self {
        Self {
            user: user.into(),
            balance,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "User")]
    pub user: UserId,
    #[serde(rename = "Msg")]
    pub msg: String,
    #[serde(rename = "Val")]
    pub val: Amount,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Adds `value` to the balance; positive values also add XP.
    #[default]
    EarnOrSpend,
    /// Moves `value` from the balance into the vault.
    VaultDeposit,
    /// Moves `|value|` from the user to the house pot.
    Fine,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub user: UserId,
    pub action: String,
    pub value: Amount,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn earn(user: impl Into<UserId>, action: impl Into<String>, value: Amount) -> Self {
        Self::new(user, action, value, TransactionKind::EarnOrSpend)
    }

    pub fn vault_deposit(user: impl Into<UserId>, value: Amount) -> Self {
        Self::new(user, "Vault", value, TransactionKind::VaultDeposit)
    }

    pub fn fine(user: impl Into<UserId>, value: Amount) -> Self {
        Self::new(user, "Fine", value, TransactionKind::Fine)
    }

    pub fn new(
        user: impl Into<UserId>,
        action: impl Into<String>,
        value: Amount,
        kind: TransactionKind,
    ) -> Self {
        Self {
            user: user.into(),
            action: action.into(),
            value,
            kind,
        }
    }
}

/// In-memory copy of both tables. Loaded whole, mutated, written back whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    pub balances: Vec<BalanceRow>,
    /// Newest first.
    pub history: Vec<HistoryRecord>,
}

impl Ledger {
    pub fn new(balances: Vec<BalanceRow>, history: Vec<HistoryRecord>) -> Self {
        Self { balances, history }
    }

    pub fn row(&self, user: &str) -> Result<&BalanceRow, LedgerError> {
        self.balances
            .iter()
            .find(|row| row.user == user)
            .ok_or_else(|| LedgerError::UnknownUser {
                user: user.to_string(),
            })
    }

    fn index_of(&self, user: &str) -> Result<usize, LedgerError> {
        self.balances
            .iter()
            .position(|row| row.user == user)
            .ok_or_else(|| LedgerError::UnknownUser {
                user: user.to_string(),
            })
    }

    pub fn pot_balance(&self) -> Result<Amount, LedgerError> {
        self.row(HOUSE_POT).map(|row| row.balance)
    }

    /// Sum of `Balance` across every row, pot included.
    pub fn total_balance(&self) -> Amount {
        self.balances.iter().map(|row| row.balance).sum()
    }

    /// Applies `txn` to the balances and puts its record at the front of
    /// the history. On error nothing is mutated.
    pub fn apply(
        &mut self,
        txn: &Transaction,
        date: impl Into<String>,
    ) -> Result<HistoryRecord, LedgerError> {
        let idx = self.index_of(&txn.user)?;
        let overflow = || LedgerError::Overflow {
            user: txn.user.clone(),
            value: txn.value,
        };
        let msg = match txn.kind {
            TransactionKind::EarnOrSpend => {
                if txn.user == HOUSE_POT && txn.value > 0 {
                    return Err(LedgerError::PotRestricted { what: "earn XP" });
                }
                let row = &self.balances[idx];
                let balance = row.balance.checked_add(txn.value).ok_or_else(overflow)?;
                let xp = if txn.value > 0 {
                    row.xp.checked_add(txn.value).ok_or_else(overflow)?
                } else {
                    row.xp
                };
                let row = &mut self.balances[idx];
                row.balance = balance;
                row.xp = xp;
                format!("{}: {}", txn.user, txn.action)
            }
            TransactionKind::VaultDeposit => {
                if txn.user == HOUSE_POT {
                    return Err(LedgerError::PotRestricted {
                        what: "save to a vault",
                    });
                }
                if txn.value <= 0 {
                    return Err(LedgerError::InvalidAmount { value: txn.value });
                }
                let row = &self.balances[idx];
                if row.balance < txn.value {
                    return Err(LedgerError::InsufficientFunds {
                        user: txn.user.clone(),
                        available: row.balance,
                        needed: txn.value,
                    });
                }
                let vault = row.vault.checked_add(txn.value).ok_or_else(overflow)?;
                let row = &mut self.balances[idx];
                row.balance -= txn.value;
                row.vault = vault;
                format!("{}: Saved to Vault", txn.user)
            }
            TransactionKind::Fine => {
                let pot_idx = self.index_of(HOUSE_POT)?;
                let amount = txn.value.checked_abs().ok_or_else(overflow)?;
                // A pot fining itself nets to zero.
                if idx != pot_idx {
                    let user_balance = self.balances[idx]
                        .balance
                        .checked_sub(amount)
                        .ok_or_else(overflow)?;
                    let pot_balance = self.balances[pot_idx]
                        .balance
                        .checked_add(amount)
                        .ok_or_else(overflow)?;
                    self.balances[idx].balance = user_balance;
                    self.balances[pot_idx].balance = pot_balance;
                }
                format!("{}: Fined £{}", txn.user, amount)
            }
        };

        let record = HistoryRecord {
            date: date.into(),
            user: txn.user.clone(),
            msg,
            val: txn.value,
        };
        self.history.insert(0, record.clone());
        Ok(record)
    }

    /// Takes `amount` out of the house pot. Leaves the history untouched.
    pub fn spend_pot(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount { value: amount });
        }
        let pot_idx = self.index_of(HOUSE_POT)?;
        let pot = &mut self.balances[pot_idx];
        if pot.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                user: HOUSE_POT.to_string(),
                available: pot.balance,
                needed: amount,
            });
        }
        pot.balance -= amount;
        Ok(pot.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Ledger {
        Ledger::new(
            vec![
                BalanceRow {
                    user: "Rob".into(),
                    balance: 10,
                    ..BalanceRow::default()
                },
                BalanceRow {
                    user: "Eva".into(),
                    balance: 3,
                    vault: 0,
                    vault_goal: 20,
                    xp: 0,
                },
                BalanceRow::new("Noah", 5),
                BalanceRow::new(HOUSE_POT, 10),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn earning_adds_balance_and_xp() {
        let mut ledger = ledger();
        let record = ledger
            .apply(&Transaction::earn("Rob", "Kitchen", 2), "02/02 09:00")
            .unwrap();
        let rob = ledger.row("Rob").unwrap();
        assert_eq!(rob.balance, 12);
        assert_eq!(rob.xp, 2);
        assert_eq!(record.user, "Rob");
        assert_eq!(record.msg, "Rob: Kitchen");
        assert_eq!(record.val, 2);
        assert_eq!(ledger.history[0], record);
    }

    #[test]
    fn spending_leaves_xp_alone() {
        let mut ledger = ledger();
        ledger
            .apply(&Transaction::earn("Noah", "Paid Cash", -5), "02/02 09:00")
            .unwrap();
        let noah = ledger.row("Noah").unwrap();
        assert_eq!(noah.balance, 0);
        assert_eq!(noah.xp, 0);
    }

    #[test]
    fn zero_value_chore_is_recorded_without_changes() {
        let mut ledger = ledger();
        let before = ledger.balances.clone();
        ledger
            .apply(&Transaction::earn("Eva", "Bedroom", 0), "02/02 09:00")
            .unwrap();
        assert_eq!(ledger.balances, before);
        assert_eq!(ledger.history.len(), 1);
        assert_eq!(ledger.history[0].msg, "Eva: Bedroom");
        assert_eq!(ledger.history[0].val, 0);
    }

    #[test]
    fn vault_deposit_is_a_closed_transfer() {
        let mut ledger = ledger();
        let record = ledger
            .apply(&Transaction::vault_deposit("Rob", 4), "02/02 09:00")
            .unwrap();
        let rob = ledger.row("Rob").unwrap();
        assert_eq!(rob.balance, 6);
        assert_eq!(rob.vault, 4);
        assert_eq!(rob.balance + rob.vault, 10);
        assert_eq!(record.msg, "Rob: Saved to Vault");
    }

    #[test]
    fn vault_deposit_without_cash_is_rejected_untouched() {
        let mut ledger = ledger();
        let before = ledger.clone();
        let err = ledger
            .apply(&Transaction::vault_deposit("Eva", 5), "02/02 09:00")
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                user: "Eva".into(),
                available: 3,
                needed: 5,
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn vault_deposit_requires_positive_amount() {
        let mut ledger = ledger();
        let err = ledger
            .apply(&Transaction::vault_deposit("Rob", 0), "02/02 09:00")
            .unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount { value: 0 });
        assert!(ledger.history.is_empty());
    }

    #[test]
    fn fines_fund_the_pot_and_conserve_total() {
        let mut ledger = ledger();
        let total = ledger.total_balance();
        let record = ledger
            .apply(&Transaction::fine("Noah", 2), "02/02 09:00")
            .unwrap();
        assert_eq!(ledger.row("Noah").unwrap().balance, 3);
        assert_eq!(ledger.pot_balance().unwrap(), 12);
        assert_eq!(ledger.total_balance(), total);
        assert_eq!(record.msg, "Noah: Fined £2");

        ledger
            .apply(&Transaction::fine("Noah", -3), "02/02 09:01")
            .unwrap();
        assert_eq!(ledger.row("Noah").unwrap().balance, 0);
        assert_eq!(ledger.pot_balance().unwrap(), 15);
    }

    #[test]
    fn unknown_user_fails_loudly() {
        let mut ledger = ledger();
        let err = ledger
            .apply(&Transaction::earn("Mallory", "Kitchen", 2), "02/02 09:00")
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::UnknownUser {
                user: "Mallory".into()
            }
        );
    }

    #[test]
    fn fine_without_pot_row_mutates_nothing() {
        let mut ledger = ledger();
        ledger.balances.retain(|row| row.user != HOUSE_POT);
        let before = ledger.clone();
        let err = ledger
            .apply(&Transaction::fine("Noah", 2), "02/02 09:00")
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownUser { .. }));
        assert_eq!(ledger, before);
    }

    #[test]
    fn overflowing_amounts_are_rejected_untouched() {
        let mut ledger = ledger();
        let before = ledger.clone();
        let err = ledger
            .apply(&Transaction::fine("Noah", i64::MIN), "02/02 09:00")
            .unwrap_err();
        assert!(matches!(err, LedgerError::Overflow { .. }));
        let err = ledger
            .apply(&Transaction::earn("Rob", "Jackpot", i64::MAX), "02/02 09:00")
            .unwrap_err();
        assert!(matches!(err, LedgerError::Overflow { .. }));
        ledger.balances[0].balance = i64::MIN + 1;
        let err = ledger
            .apply(&Transaction::fine("Rob", 2), "02/02 09:00")
            .unwrap_err();
        assert!(matches!(err, LedgerError::Overflow { .. }));
        ledger.balances[0].balance = before.balances[0].balance;
        assert_eq!(ledger, before);
    }

    #[test]
    fn pot_cannot_earn_xp() {
        let mut ledger = ledger();
        let before = ledger.clone();
        let err = ledger
            .apply(&Transaction::earn(HOUSE_POT, "Bonus", 5), "02/02 09:00")
            .unwrap_err();
        assert!(matches!(err, LedgerError::PotRestricted { .. }));
        assert_eq!(ledger, before);

        ledger
            .apply(&Transaction::earn(HOUSE_POT, "Pizza", -5), "02/02 09:00")
            .unwrap();
        assert_eq!(ledger.pot_balance().unwrap(), 5);
        assert_eq!(ledger.row(HOUSE_POT).unwrap().xp, 0);
    }

    #[test]
    fn pot_cannot_save_to_a_vault() {
        let mut ledger = ledger();
        let before = ledger.clone();
        let err = ledger
            .apply(&Transaction::vault_deposit(HOUSE_POT, 3), "02/02 09:00")
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::PotRestricted {
                what: "save to a vault"
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn history_stays_newest_first() {
        let mut ledger = ledger();
        for (i, action) in ["Kitchen", "Bathroom", "Bins"].iter().enumerate() {
            ledger
                .apply(
                    &Transaction::earn("Rob", *action, 1),
                    format!("02/02 09:0{i}"),
                )
                .unwrap();
        }
        let msgs: Vec<_> = ledger.history.iter().map(|r| r.msg.as_str()).collect();
        assert_eq!(msgs, ["Rob: Bins", "Rob: Bathroom", "Rob: Kitchen"]);
    }

    #[test]
    fn pot_spend_checks_balance() {
        let mut ledger = ledger();
        assert_eq!(ledger.spend_pot(5).unwrap(), 5);
        assert_eq!(ledger.spend_pot(5).unwrap(), 0);
        assert!(matches!(
            ledger.spend_pot(5),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert!(ledger.history.is_empty());
    }

    #[test]
    fn balance_row_columns_keep_table_names() {
        let row = BalanceRow {
            user: "Eva".into(),
            balance: 1,
            vault: 2,
            vault_goal: 20,
            xp: 3,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"User":"Eva","Balance":1,"Vault":2,"Vault_Goal":20,"XP":3}"#
        );
    }
}
