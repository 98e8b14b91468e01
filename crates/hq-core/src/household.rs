//! Household roster and the actions each role can take from the dashboard.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::HouseholdConfig;
use crate::ledger::{Amount, BalanceRow, Ledger, Transaction, UserId, HOUSE_POT};
use crate::rotation::{Rotation, WeekInfo};
use crate::HqError;

pub const KITCHEN_REWARD: Amount = 2;
pub const BATHROOM_REWARD: Amount = 1;
pub const LIVING_ROOM_REWARD: Amount = 2;
pub const CASH_PAYMENT: Amount = 5;
pub const SELF_FINE: Amount = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Parent,
    Child,
    Pot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Parent => "parents",
            Role::Child => "children",
            Role::Pot => "the house pot",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{user} is not part of the household")]
    NotAMember { user: UserId },
    #[error("unknown action {name}")]
    UnknownAction { name: String },
    #[error("{action} is for {role} only")]
    WrongRole { action: &'static str, role: Role },
    #[error("Not your week!")]
    NotYourWeek,
    #[error("{action} is locked this week")]
    Locked { action: &'static str },
    #[error("deposit must be between £{min} and £{max}, got £{amount}")]
    OutOfRange {
        amount: Amount,
        min: Amount,
        max: Amount,
    },
    #[error("not enough cash: {user} has £{available}, needs £{needed}")]
    InsufficientCash {
        user: UserId,
        available: Amount,
        needed: Amount,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Kitchen,
    Bathroom,
    PotSpend,
    Bedroom,
    LivingRoom,
    PayCash,
    SelfFine,
    VaultDeposit(Amount),
}

impl Action {
    pub const PARENT: [Action; 3] = [Action::Kitchen, Action::Bathroom, Action::PotSpend];
    pub const CHILD: [Action; 4] = [
        Action::Bedroom,
        Action::LivingRoom,
        Action::PayCash,
        Action::SelfFine,
    ];

    /// Name used on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Action::Kitchen => "kitchen",
            Action::Bathroom => "bathroom",
            Action::PotSpend => "pot",
            Action::Bedroom => "bedroom",
            Action::LivingRoom => "living-room",
            Action::PayCash => "pay",
            Action::SelfFine => "fine",
            Action::VaultDeposit(_) => "deposit",
        }
    }

    pub fn label(&self, pot_spend: Amount) -> String {
        match self {
            Action::Kitchen => format!("Kitchen (+£{KITCHEN_REWARD})"),
            Action::Bathroom => format!("Bathroom (+£{BATHROOM_REWARD})"),
            Action::PotSpend => format!("Pot £{pot_spend}"),
            Action::Bedroom => "Bedroom (XP)".to_string(),
            Action::LivingRoom => format!("Living Room (+£{LIVING_ROOM_REWARD})"),
            Action::PayCash => format!("Pay £{CASH_PAYMENT}"),
            Action::SelfFine => format!("Fine £{SELF_FINE}"),
            Action::VaultDeposit(amount) => format!("Lock £{amount}"),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Action::Kitchen | Action::Bathroom | Action::PotSpend => Role::Parent,
            _ => Role::Child,
        }
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::PARENT
            .into_iter()
            .chain(Action::CHILD)
            .find(|action| action.key() == s)
            .ok_or_else(|| ActionError::UnknownAction {
                name: s.to_string(),
            })
    }
}

/// What the dashboard will do once an action is accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    Record(Transaction),
    SpendPot(Amount),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Open,
    NotYourWeek,
    Locked,
    Unaffordable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionEntry {
    pub action: Action,
    pub label: String,
    pub availability: Availability,
}

#[derive(Clone, Debug)]
pub struct Household {
    rotation: Rotation,
    adults: [UserId; 2],
    children: [UserId; 2],
    deposit_min: Amount,
    deposit_max: Amount,
    pot_spend: Amount,
    vault_goal: Amount,
}

impl Household {
    pub fn new(config: &HouseholdConfig) -> Self {
        Self {
            rotation: config.to_rotation(),
            adults: config.rotation.adults.clone(),
            children: config.rotation.children.clone(),
            deposit_min: config.dashboard.deposit_min,
            deposit_max: config.dashboard.deposit_max,
            pot_spend: config.household.pot_spend,
            vault_goal: config.household.vault_goal,
        }
    }

    pub fn role_of(&self, user: &str) -> Option<Role> {
        if self.adults.iter().any(|name| name == user) {
            Some(Role::Parent)
        } else if self.children.iter().any(|name| name == user) {
            Some(Role::Child)
        } else if user == HOUSE_POT {
            Some(Role::Pot)
        } else {
            None
        }
    }

    pub fn children(&self) -> &[UserId] {
        &self.children
    }

    pub fn pot_spend(&self) -> Amount {
        self.pot_spend
    }

    pub fn deposit_range(&self) -> (Amount, Amount) {
        (self.deposit_min, self.deposit_max)
    }

    pub fn week(&self, today: NaiveDate) -> WeekInfo {
        self.rotation.week_info(today)
    }

    /// Rows for a brand new workbook: every member at zero, children with
    /// the configured vault goal, then the house pot.
    pub fn initial_rows(&self) -> Vec<BalanceRow> {
        let mut rows: Vec<BalanceRow> = self
            .adults
            .iter()
            .map(|name| BalanceRow::new(name.clone(), 0))
            .collect();
        rows.extend(self.children.iter().map(|name| BalanceRow {
            vault_goal: self.vault_goal,
            ..BalanceRow::new(name.clone(), 0)
        }));
        rows.push(BalanceRow::new(HOUSE_POT, 0));
        rows
    }

    /// Every action the user's role offers, with whether it can run now.
    pub fn catalog(
        &self,
        user: &str,
        week: &WeekInfo,
        ledger: &Ledger,
    ) -> Result<Vec<ActionEntry>, HqError> {
        let actions: &[Action] = match self.role_of(user) {
            Some(Role::Parent) => &Action::PARENT,
            Some(Role::Child) => &Action::CHILD,
            Some(Role::Pot) => &[],
            None => {
                return Err(ActionError::NotAMember {
                    user: user.to_string(),
                }
                .into())
            }
        };
        actions
            .iter()
            .map(|action| {
                let availability = match self.plan(user, *action, week, ledger) {
                    Ok(_) => Availability::Open,
                    Err(HqError::Action(ActionError::NotYourWeek)) => Availability::NotYourWeek,
                    Err(HqError::Action(ActionError::Locked { .. })) => Availability::Locked,
                    Err(HqError::Action(ActionError::InsufficientCash { .. })) => {
                        Availability::Unaffordable
                    }
                    Err(err) => return Err(err),
                };
                Ok(ActionEntry {
                    action: *action,
                    label: action.label(self.pot_spend),
                    availability,
                })
            })
            .collect()
    }

    /// Checks that `user` may take `action` this week and turns it into
    /// the ledger operation to run.
    pub fn plan(
        &self,
        user: &str,
        action: Action,
        week: &WeekInfo,
        ledger: &Ledger,
    ) -> Result<Plan, HqError> {
        let role = self.role_of(user).ok_or_else(|| ActionError::NotAMember {
            user: user.to_string(),
        })?;
        if action.role() != role {
            return Err(ActionError::WrongRole {
                action: action.key(),
                role: action.role(),
            }
            .into());
        }

        let plan = match action {
            Action::Kitchen | Action::Bathroom if !week.is_on_duty(user) => {
                return Err(ActionError::NotYourWeek.into())
            }
            Action::Kitchen => Plan::Record(Transaction::earn(user, "Kitchen", KITCHEN_REWARD)),
            Action::Bathroom => Plan::Record(Transaction::earn(user, "Bathroom", BATHROOM_REWARD)),
            Action::PotSpend => {
                let available = ledger.pot_balance()?;
                if available < self.pot_spend {
                    return Err(ActionError::InsufficientCash {
                        user: HOUSE_POT.to_string(),
                        available,
                        needed: self.pot_spend,
                    }
                    .into());
                }
                Plan::SpendPot(self.pot_spend)
            }
            Action::Bedroom => Plan::Record(Transaction::earn(user, "Bedroom", 0)),
            Action::LivingRoom if !week.is_unlocked(user) => {
                return Err(ActionError::Locked {
                    action: "Living Room",
                }
                .into())
            }
            Action::LivingRoom => {
                Plan::Record(Transaction::earn(user, "Living Room", LIVING_ROOM_REWARD))
            }
            Action::PayCash => {
                let available = ledger.row(user)?.balance;
                if available < CASH_PAYMENT {
                    return Err(ActionError::InsufficientCash {
                        user: user.to_string(),
                        available,
                        needed: CASH_PAYMENT,
                    }
                    .into());
                }
                Plan::Record(Transaction::earn(user, "Paid Cash", -CASH_PAYMENT))
            }
            Action::SelfFine => Plan::Record(Transaction::fine(user, SELF_FINE)),
            Action::VaultDeposit(amount) => {
                if amount < self.deposit_min || amount > self.deposit_max {
                    return Err(ActionError::OutOfRange {
                        amount,
                        min: self.deposit_min,
                        max: self.deposit_max,
                    }
                    .into());
                }
                Plan::Record(Transaction::vault_deposit(user, amount))
            }
        };
        Ok(plan)
    }
}
