//! Protocol constants and deployment defaults.
//!
//! The defaults are a 0.25% per-second rate, a 10^12 multiplier and a
//! one-hour lock. At that rate a one-day lock would discount every reward
//! to zero.

/// Default reward token name.
pub const DEFAULT_TOKEN_NAME: &str = "Interest Faster Than Light";
/// Default reward token symbol.
pub const DEFAULT_TOKEN_SYMBOL: &str = "IFTL";
/// Decimals reported by in-memory token ledgers.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Default interest rate numerator (rate = 25 / 10_000 = 0.25%).
pub const DEFAULT_INTEREST_NUMERATOR: i128 = 25;
/// Default interest rate denominator.
pub const DEFAULT_INTEREST_DENOMINATOR: i128 = 10_000;

/// Default multiplier converting accepted-token units into reward-token units.
pub const DEFAULT_MULTIPLIER: u128 = 1_000_000_000_000;

/// Seconds per hour.
pub const SECS_PER_HOUR: u64 = 60 * 60;
/// Default lock duration in seconds.
pub const DEFAULT_LOCK_DURATION: u64 = SECS_PER_HOUR;

/// Prefix for environment variable overrides of the farm configuration.
pub const ENV_PREFIX: &str = "IFTL";
