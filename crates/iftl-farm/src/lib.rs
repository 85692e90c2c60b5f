//! # iftl-farm: Time-locked yield farming with proportional payouts.
//!
//! - **[`TimeLockRegistry`]**: one escrowed deposit per depositor, released
//!   once mature together with a computed reward.
//! - **[`PaymentSplitter`]**: payee shares and pull payments against the
//!   farm's reward pool.
//! - **[`Ownable`]**: single-owner access control handing out [`OwnerCap`]
//!   capabilities for privileged splitter calls.
//! - **[`YieldFarm`]**: the orchestrator wiring token ledgers, the clock and
//!   the reward engine together.
//! - **[`FarmConfig`]**: deployment parameters from TOML and environment.

pub mod config;
pub mod engine;
pub mod ownership;
pub mod splitter;
pub mod timelock;

pub use config::FarmConfig;
pub use engine::{FarmParams, YieldFarm};
pub use ownership::{Ownable, OwnerCap};
pub use splitter::PaymentSplitter;
pub use timelock::{TimeLockRegistry, TokenTimeLock};
