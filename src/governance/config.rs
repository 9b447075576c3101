//! Deployment parameters and their TOML form.
//!
//! Durations are fixed when the DAO is deployed. The TOML file uses
//! operator-friendly units (hours, millicoins) and converts into the runtime
//! `GovernanceConfig` (milliseconds, base units).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Amount, DAY_MS, HOUR_MS};

/// Signing domain name used unless configured otherwise
pub const DEFAULT_DOMAIN_NAME: &str = "Collector DAO";

/// Chain id used unless configured otherwise
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Pending phase length (2 days)
pub const DEFAULT_VOTING_DELAY_HOURS: u32 = 48;

/// Active phase length (3 days)
pub const DEFAULT_VOTING_PERIOD_HOURS: u32 = 72;

/// Post-voting execution window (2 days)
pub const DEFAULT_EXECUTION_WINDOW_HOURS: u32 = 48;

/// Share of members that must vote for a proposal to be decided
pub const DEFAULT_QUORUM_PERCENT: u8 = 25;

/// Cumulative contribution needed for membership, in millicoins (1 coin)
pub const DEFAULT_MEMBERSHIP_THRESHOLD_MILLICOINS: u64 = 1_000;

/// Longest allowed voting delay, voting period or execution window (ms)
pub const MAX_PHASE_MS: i64 = 3_650 * DAY_MS;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML could not be parsed or written
    #[error("parse error: {0}")]
    Parse(String),
    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Runtime governance parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Signing domain name
    pub name: String,
    /// Chain offline tools sign ballots for; the contract always uses the
    /// chain it runs on
    pub chain_id: u64,
    /// Time from creation until voting opens (ms)
    pub voting_delay_ms: i64,
    /// Length of the voting phase (ms)
    pub voting_period_ms: i64,
    /// Time after voting closes during which execution is allowed (ms)
    pub execution_window_ms: i64,
    /// Quorum as a percentage of the live member count
    pub quorum_percent: u8,
    /// Cumulative contribution that makes an address a member
    pub membership_threshold: Amount,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DOMAIN_NAME.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            voting_delay_ms: i64::from(DEFAULT_VOTING_DELAY_HOURS) * HOUR_MS,
            voting_period_ms: i64::from(DEFAULT_VOTING_PERIOD_HOURS) * HOUR_MS,
            execution_window_ms: i64::from(DEFAULT_EXECUTION_WINDOW_HOURS) * HOUR_MS,
            quorum_percent: DEFAULT_QUORUM_PERCENT,
            membership_threshold: Amount::from_millicoins(DEFAULT_MEMBERSHIP_THRESHOLD_MILLICOINS),
        }
    }
}

impl GovernanceConfig {
    /// Check ranges
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("domain name must not be empty".into()));
        }
        if self.voting_delay_ms < 0 {
            return Err(ConfigError::Invalid("voting delay must not be negative".into()));
        }
        let phases = [
            ("voting delay", self.voting_delay_ms),
            ("voting period", self.voting_period_ms),
            ("execution window", self.execution_window_ms),
        ];
        if let Some((phase, _)) = phases.iter().find(|(_, ms)| *ms > MAX_PHASE_MS) {
            return Err(ConfigError::Invalid(format!("{phase} is longer than ten years")));
        }
        if self.voting_period_ms <= 0 {
            return Err(ConfigError::Invalid("voting period must be positive".into()));
        }
        if self.execution_window_ms <= 0 {
            return Err(ConfigError::Invalid("execution window must be positive".into()));
        }
        if !(1..=100).contains(&self.quorum_percent) {
            return Err(ConfigError::Invalid(format!(
                "quorum must be 1..=100 percent, got {}",
                self.quorum_percent
            )));
        }
        if self.membership_threshold.is_zero() {
            return Err(ConfigError::Invalid("membership threshold must be positive".into()));
        }
        Ok(())
    }
}

/// TOML-serializable governance config
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceConfigToml {
    /// Signing domain name
    #[serde(default = "default_name")]
    pub name: String,
    /// Chain id
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Voting schedule
    #[serde(default)]
    pub voting: VotingToml,
    /// Membership threshold in millicoins (default: 1 coin)
    #[serde(default = "default_threshold")]
    pub membership_threshold_millicoins: u64,
}

/// TOML-serializable voting schedule
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingToml {
    /// Pending phase in hours (default: 48)
    #[serde(default = "default_delay_hours")]
    pub delay_hours: u32,
    /// Active phase in hours (default: 72)
    #[serde(default = "default_period_hours")]
    pub period_hours: u32,
    /// Execution window in hours (default: 48)
    #[serde(default = "default_window_hours")]
    pub execution_window_hours: u32,
    /// Quorum percent (default: 25)
    #[serde(default = "default_quorum")]
    pub quorum_percent: u8,
}

impl Default for VotingToml {
    fn default() -> Self {
        Self {
            delay_hours: DEFAULT_VOTING_DELAY_HOURS,
            period_hours: DEFAULT_VOTING_PERIOD_HOURS,
            execution_window_hours: DEFAULT_EXECUTION_WINDOW_HOURS,
            quorum_percent: DEFAULT_QUORUM_PERCENT,
        }
    }
}

fn default_name() -> String {
    DEFAULT_DOMAIN_NAME.to_string()
}

fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

fn default_threshold() -> u64 {
    DEFAULT_MEMBERSHIP_THRESHOLD_MILLICOINS
}

fn default_delay_hours() -> u32 {
    DEFAULT_VOTING_DELAY_HOURS
}

fn default_period_hours() -> u32 {
    DEFAULT_VOTING_PERIOD_HOURS
}

fn default_window_hours() -> u32 {
    DEFAULT_EXECUTION_WINDOW_HOURS
}

fn default_quorum() -> u8 {
    DEFAULT_QUORUM_PERCENT
}

impl GovernanceConfigToml {
    /// Load from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Convert to runtime parameters and validate them
    ///
    /// # Errors
    /// Returns error if any value is out of range
    pub fn into_config(self) -> Result<GovernanceConfig, ConfigError> {
        let config = GovernanceConfig {
            name: self.name,
            chain_id: self.chain_id,
            voting_delay_ms: i64::from(self.voting.delay_hours) * HOUR_MS,
            voting_period_ms: i64::from(self.voting.period_hours) * HOUR_MS,
            execution_window_ms: i64::from(self.voting.execution_window_hours) * HOUR_MS,
            quorum_percent: self.voting.quorum_percent,
            membership_threshold: Amount::from_millicoins(self.membership_threshold_millicoins),
        };
        config.validate()?;
        Ok(config)
    }
}

/// The default config as written by `collector-dao config`
#[must_use]
pub fn default_config_toml() -> GovernanceConfigToml {
    GovernanceConfigToml {
        name: default_name(),
        chain_id: DEFAULT_CHAIN_ID,
        voting: VotingToml::default(),
        membership_threshold_millicoins: DEFAULT_MEMBERSHIP_THRESHOLD_MILLICOINS,
    }
}
