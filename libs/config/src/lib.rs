//! # Manaswap Centralized Configuration
//!
//! This crate provides the runtime parameters of the AMM engine in one
//! place, eliminating hard-coded constants in the trading path. The swap
//! fee in particular is configuration, not algorithm: it is passed into
//! the quote functions per call, so per-pool fee tiers stay a config
//! change away.
//!
//! ## Usage
//!
//! ```rust
//! use config::EngineConfig;
//!
//! // Defaults, then environment overrides (MANASWAP_FEE_BPS, ...)
//! let config = EngineConfig::load(None).unwrap();
//! assert_eq!(config.fee_bps, 30);
//! ```
//!
//! Precedence: TOML file (when given) < environment variables. Every load
//! path ends in [`EngineConfig::validate`].

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default swap fee: 30 bps = 0.3%.
pub const DEFAULT_FEE_BPS: u32 = 30;

/// Default bound on a single Balance Ledger call.
pub const DEFAULT_LEDGER_TIMEOUT_MS: u64 = 3_000;

/// Default bound on waiting for a pool's trade lock.
pub const DEFAULT_LOCK_WAIT_MS: u64 = 2_000;

/// Default retry budget for persisting a commit after a successful debit.
pub const DEFAULT_MAX_COMMIT_RETRIES: u32 = 3;

/// LP shares minted to a pool creator, in smallest units (1M display units).
pub const DEFAULT_BOOTSTRAP_LP_SHARES: u64 = 1_000_000_000_000;

/// Complete configuration for the AMM engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Swap fee in basis points (30 = 0.3%), charged on the side entering
    /// the pool and accrued to reserves.
    pub fee_bps: u32,
    /// Timeout for a single Balance Ledger debit/credit call.
    pub ledger_timeout_ms: u64,
    /// How long a trade waits for the per-pool lock before surfacing a
    /// concurrency conflict to the caller.
    pub lock_wait_ms: u64,
    /// Commit retries after a successful ledger debit. Exhausting these is
    /// the fatal-and-alerted path, never a silent drop.
    pub max_commit_retries: u32,
    /// LP shares minted to the creator at pool bootstrap, smallest units.
    pub bootstrap_lp_shares: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS,
            ledger_timeout_ms: DEFAULT_LEDGER_TIMEOUT_MS,
            lock_wait_ms: DEFAULT_LOCK_WAIT_MS,
            max_commit_retries: DEFAULT_MAX_COMMIT_RETRIES,
            bootstrap_lp_shares: DEFAULT_BOOTSTRAP_LP_SHARES,
        }
    }
}

impl EngineConfig {
    /// Load configuration: defaults, optionally a TOML file, then
    /// `MANASWAP_*` environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        info!(
            fee_bps = config.fee_bps,
            ledger_timeout_ms = config.ledger_timeout_ms,
            "Engine configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML configuration file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `MANASWAP_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_parse::<u32>("MANASWAP_FEE_BPS")? {
            self.fee_bps = v;
        }
        if let Some(v) = env_parse::<u64>("MANASWAP_LEDGER_TIMEOUT_MS")? {
            self.ledger_timeout_ms = v;
        }
        if let Some(v) = env_parse::<u64>("MANASWAP_LOCK_WAIT_MS")? {
            self.lock_wait_ms = v;
        }
        if let Some(v) = env_parse::<u32>("MANASWAP_MAX_COMMIT_RETRIES")? {
            self.max_commit_retries = v;
        }
        if let Some(v) = env_parse::<u64>("MANASWAP_BOOTSTRAP_LP_SHARES")? {
            self.bootstrap_lp_shares = v;
        }
        Ok(())
    }

    /// Reject configurations the engine cannot run safely with.
    pub fn validate(&self) -> Result<()> {
        if self.fee_bps >= 10_000 {
            bail!("fee_bps {} must be below 10_000 (100%)", self.fee_bps);
        }
        if self.ledger_timeout_ms == 0 {
            bail!("ledger_timeout_ms must be positive");
        }
        if self.lock_wait_ms == 0 {
            bail!("lock_wait_ms must be positive");
        }
        if self.max_commit_retries == 0 {
            bail!("max_commit_retries must be at least 1");
        }
        if self.bootstrap_lp_shares == 0 {
            bail!("bootstrap_lp_shares must be positive");
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => {
            let value = raw
                .parse::<T>()
                .with_context(|| format!("Invalid value for {key}: {raw}"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
