//! Farm deployment configuration.
//!
//! Loaded from a TOML file with environment overrides: `IFTL__MULTIPLIER`,
//! `IFTL__TOKEN__SYMBOL`, `IFTL__INTEREST__IEEE_BITS` and so on (nested keys
//! are separated by `__`).
//!
//! Rate and multiplier may both be given as raw IEEE 754 binary128 bit
//! patterns, the way deployments that share values with other binary128
//! systems pass them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use iftl_core::constants::{
    DEFAULT_INTEREST_DENOMINATOR, DEFAULT_INTEREST_NUMERATOR, DEFAULT_LOCK_DURATION,
    DEFAULT_MULTIPLIER, DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL, ENV_PREFIX,
};
use iftl_core::error::{FarmError, MathError};
use iftl_core::event::EventLog;
use iftl_core::traits::RewardCalculator;
use iftl_core::types::{Address, Shares};
use iftl_math::{Quad, RewardEngine};

use crate::engine::FarmParams;
use crate::splitter::PaymentSplitter;

/// Top-level farm configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    #[serde(default)]
    pub token: TokenSettings,

    #[serde(default)]
    pub interest: InterestSettings,

    /// Scale from accepted-token units to reward-token units.
    #[serde(default = "default_multiplier")]
    pub multiplier: u64,

    /// Hex bit pattern of a fractional multiplier. Takes precedence over
    /// `multiplier` when set.
    #[serde(default)]
    pub multiplier_ieee_bits: Option<String>,

    #[serde(default = "default_lock_duration")]
    pub lock_duration_secs: u64,

    pub owner: Address,

    /// The farm's own account on both token ledgers.
    pub farm_address: Address,

    #[serde(default)]
    pub payees: Vec<PayeeEntry>,
}

/// Reward token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSettings {
    #[serde(default = "default_token_name")]
    pub name: String,

    #[serde(default = "default_token_symbol")]
    pub symbol: String,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            name: default_token_name(),
            symbol: default_token_symbol(),
        }
    }
}

/// Interest rate as a ratio, or as a raw IEEE 754 binary128 bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestSettings {
    #[serde(default = "default_numerator")]
    pub numerator: i64,

    #[serde(default = "default_denominator")]
    pub denominator: i64,

    /// Hex bit pattern (e.g. `0x3FFF71547652B82FE1777D0FFDA0D23A`). Takes
    /// precedence over the ratio when set.
    #[serde(default)]
    pub ieee_bits: Option<String>,
}

impl Default for InterestSettings {
    fn default() -> Self {
        Self {
            numerator: default_numerator(),
            denominator: default_denominator(),
            ieee_bits: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeEntry {
    pub address: Address,
    pub shares: u64,
}

fn default_token_name() -> String {
    DEFAULT_TOKEN_NAME.to_string()
}

fn default_token_symbol() -> String {
    DEFAULT_TOKEN_SYMBOL.to_string()
}

fn default_numerator() -> i64 {
    DEFAULT_INTEREST_NUMERATOR as i64
}

fn default_denominator() -> i64 {
    DEFAULT_INTEREST_DENOMINATOR as i64
}

fn default_multiplier() -> u64 {
    DEFAULT_MULTIPLIER as u64
}

fn default_lock_duration() -> u64 {
    DEFAULT_LOCK_DURATION
}

impl FarmConfig {
    /// Load `path` with `IFTL__*` environment overrides, then validate.
    pub fn load(path: &Path) -> Result<Self, FarmError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load `path` with `<prefix>__*` environment overrides, then validate.
    pub fn load_with_prefix(path: &Path, prefix: &str) -> Result<Self, FarmError> {
        let loaded: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| FarmError::Config(e.to_string()))?;
        loaded.validate()?;
        tracing::debug!(path = %path.display(), payees = loaded.payees.len(), "farm config loaded");
        Ok(loaded)
    }

    /// Check everything a deployment would reject, without deploying.
    pub fn validate(&self) -> Result<(), FarmError> {
        if self.owner.is_zero() {
            return Err(FarmError::Config("owner is the zero address".into()));
        }
        if self.farm_address.is_zero() {
            return Err(FarmError::Config("farm_address is the zero address".into()));
        }
        if self.lock_duration_secs == 0 {
            return Err(FarmError::Config("lock_duration_secs must be positive".into()));
        }
        let params = self.params()?;
        let engine = RewardEngine::new(params.interest_rate, params.multiplier)?;
        self.check_releasable(&engine)?;
        let (accounts, shares) = self.payee_lists();
        PaymentSplitter::new(&accounts, &shares, &mut EventLog::new())?;
        Ok(())
    }

    /// A release mints nothing once the reward truncates to zero, and a
    /// zero reward blocks the release. Reject parameters under which even
    /// the largest principal would earn nothing at the earliest release,
    /// since every deposit would then stay locked for good. An overflow at
    /// the largest principal means smaller ones still earn something.
    fn check_releasable(&self, engine: &RewardEngine) -> Result<(), FarmError> {
        let elapsed = i64::try_from(self.lock_duration_secs).map_err(|_| {
            FarmError::Config(format!(
                "lock_duration_secs {} is out of range",
                self.lock_duration_secs
            ))
        })?;
        match engine.compute_reward(u128::MAX, elapsed) {
            Ok(0) => Err(FarmError::Config(format!(
                "lock_duration_secs {}: every reward truncates to zero, so no deposit could be released",
                self.lock_duration_secs
            ))),
            Ok(_) | Err(MathError::Overflow) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reward and lock parameters.
    pub fn params(&self) -> Result<FarmParams, FarmError> {
        let interest_rate = match &self.interest.ieee_bits {
            Some(hex) => Quad::from_ieee_bits(parse_bits("interest.ieee_bits", hex)?)?,
            None => {
                Quad::from_ratio(self.interest.numerator.into(), self.interest.denominator.into())?
            }
        };
        let multiplier = match &self.multiplier_ieee_bits {
            Some(hex) => Quad::from_ieee_bits(parse_bits("multiplier_ieee_bits", hex)?)?,
            None => Quad::from_u128(self.multiplier.into()),
        };
        Ok(FarmParams {
            interest_rate,
            multiplier,
            lock_duration: self.lock_duration_secs,
        })
    }

    /// Payees as `(address, shares)` pairs.
    pub fn payee_pairs(&self) -> Vec<(Address, Shares)> {
        self.payees
            .iter()
            .map(|p| (p.address, Shares::from(p.shares)))
            .collect()
    }

    fn payee_lists(&self) -> (Vec<Address>, Vec<Shares>) {
        self.payee_pairs().into_iter().unzip()
    }
}

fn parse_bits(field: &str, hex: &str) -> Result<u128, FarmError> {
    let digits = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")).unwrap_or(hex);
    u128::from_str_radix(&digits.replace('_', ""), 16)
        .map_err(|e| FarmError::Config(format!("{field} {hex:?}: {e}")))
}
