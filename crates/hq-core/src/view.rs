//! Read-side projections shown by the dashboard.

use chrono::NaiveDate;

use crate::household::{ActionEntry, Household};
use crate::ledger::{Amount, BalanceRow, HistoryRecord, Ledger, LedgerError, UserId};
use crate::rotation::WeekInfo;
use crate::HqError;

/// `Vault / Vault_Goal`, clamped to `[0, 1]`. A non-positive goal counts as reached.
pub fn vault_progress(row: &BalanceRow) -> f64 {
    if row.vault_goal <= 0 {
        return 1.0;
    }
    (row.vault as f64 / row.vault_goal as f64).clamp(0.0, 1.0)
}

/// The newest `limit` records.
pub fn recent_history(ledger: &Ledger, limit: usize) -> &[HistoryRecord] {
    &ledger.history[..limit.min(ledger.history.len())]
}

/// "Rob / Eva": first three letters of who is on duty and who is unlocked.
pub fn turn_label(week: &WeekInfo) -> String {
    let short = |name: &str| name.chars().take(3).collect::<String>();
    format!(
        "{} / {}",
        short(&week.on_duty_adult),
        short(&week.unlocked_child)
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct VaultLine {
    pub user: UserId,
    pub vault: Amount,
    pub goal: Amount,
    pub progress: f64,
}

pub fn vault_lines(ledger: &Ledger, household: &Household) -> Result<Vec<VaultLine>, LedgerError> {
    household
        .children()
        .iter()
        .map(|child| {
            let row = ledger.row(child)?;
            Ok(VaultLine {
                user: row.user.clone(),
                vault: row.vault,
                goal: row.vault_goal,
                progress: vault_progress(row),
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub pot: Amount,
    pub week: WeekInfo,
    pub user: UserId,
    pub wallet: Amount,
    pub xp: Amount,
    pub actions: Vec<ActionEntry>,
}

impl Dashboard {
    pub fn build(
        household: &Household,
        ledger: &Ledger,
        user: &str,
        today: NaiveDate,
    ) -> Result<Self, HqError> {
        let week = household.week(today);
        let row = ledger.row(user)?;
        let actions = household.catalog(user, &week, ledger)?;
        Ok(Self {
            pot: ledger.pot_balance()?,
            user: row.user.clone(),
            wallet: row.balance,
            xp: row.xp,
            week,
            actions,
        })
    }
}
