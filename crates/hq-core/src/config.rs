//! Configuration parsing.
//!
//! `hq.toml` names the household roster, the rotation epoch, where the
//! workbook lives and a few dashboard limits. Every field has a default, so
//! an empty file describes the original household.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::household::Household;
use crate::ledger::{Amount, UserId, HOUSE_POT};
use crate::rotation::Rotation;
use crate::store::{DEFAULT_BALANCES_TABLE, DEFAULT_HISTORY_TABLE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Top-level household configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HouseholdConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub rotation: RotationConfig,

    #[serde(default)]
    pub household: MembersConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl HouseholdConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Like [`HouseholdConfig::from_file`], but a missing file yields the defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rotation = &self.rotation;
        let members = &self.household;
        let roster: Vec<&UserId> = rotation.adults.iter().chain(&rotation.children).collect();
        for (i, name) in roster.iter().enumerate() {
            if roster[..i].contains(name) {
                return Err(ConfigError::Validation(format!(
                    "{name} is listed more than once"
                )));
            }
        }
        if roster.iter().any(|name| name.as_str() == HOUSE_POT) {
            return Err(ConfigError::Validation(format!(
                "{HOUSE_POT} is the shared pot, not a member"
            )));
        }
        if !roster.contains(&&members.default_user) {
            return Err(ConfigError::Validation(format!(
                "default user {} is not in the roster",
                members.default_user
            )));
        }
        let dash = &self.dashboard;
        if dash.deposit_min < 1 || dash.deposit_min > dash.deposit_max {
            return Err(ConfigError::Validation(format!(
                "deposit range {}..={} is empty or not positive",
                dash.deposit_min, dash.deposit_max
            )));
        }
        if members.pot_spend < 1 {
            return Err(ConfigError::Validation(
                "pot_spend must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_rotation(&self) -> Rotation {
        Rotation::new(
            self.rotation.epoch,
            self.rotation.adults.clone(),
            self.rotation.children.clone(),
        )
    }

    pub fn to_household(&self) -> Household {
        Household::new(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Workbook directory.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_balances_table")]
    pub balances_table: String,

    #[serde(default = "default_history_table")]
    pub history_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            balances_table: default_balances_table(),
            history_table: default_history_table(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("hq-data")
}

fn default_balances_table() -> String {
    DEFAULT_BALANCES_TABLE.to_string()
}

fn default_history_table() -> String {
    DEFAULT_HISTORY_TABLE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RotationConfig {
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,

    /// On duty in odd and even weeks respectively.
    #[serde(default = "default_adults")]
    pub adults: [UserId; 2],

    /// Bonus chore unlocked in odd and even weeks respectively.
    #[serde(default = "default_children")]
    pub children: [UserId; 2],
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
            adults: default_adults(),
            children: default_children(),
        }
    }
}

fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).unwrap_or_default()
}

fn default_adults() -> [UserId; 2] {
    ["Rob".to_string(), "Lauren".to_string()]
}

fn default_children() -> [UserId; 2] {
    ["Eva".to_string(), "Noah".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembersConfig {
    /// Active user when none is chosen.
    #[serde(default = "default_user")]
    pub default_user: UserId,

    /// Vault goal given to each child when the workbook is created.
    #[serde(default = "default_vault_goal")]
    pub vault_goal: Amount,

    /// Cost of one parent pot spend.
    #[serde(default = "default_pot_spend")]
    pub pot_spend: Amount,
}

impl Default for MembersConfig {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            vault_goal: default_vault_goal(),
            pot_spend: default_pot_spend(),
        }
    }
}

fn default_user() -> UserId {
    "Rob".to_string()
}

const fn default_vault_goal() -> Amount {
    20
}

const fn default_pot_spend() -> Amount {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardConfig {
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_deposit_min")]
    pub deposit_min: Amount,

    #[serde(default = "default_deposit_max")]
    pub deposit_max: Amount,

    /// Pause after a committed transaction before the dashboard redraws.
    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            deposit_min: default_deposit_min(),
            deposit_max: default_deposit_max(),
            confirm_delay_ms: default_confirm_delay_ms(),
        }
    }
}

const fn default_history_limit() -> usize {
    10
}

const fn default_deposit_min() -> Amount {
    1
}

const fn default_deposit_max() -> Amount {
    20
}

const fn default_confirm_delay_ms() -> u64 {
    1000
}
