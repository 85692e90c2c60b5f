//! # iftl-core
//! Foundation types, error taxonomy and collaborator traits for the IFTL
//! yield farm.
//!
//! The farm itself lives in `iftl-farm`; the reward math in `iftl-math`.
//! This crate defines the seams between them:
//! - [`traits::FungibleToken`] / [`traits::MintableToken`]: token ledgers
//! - [`traits::TimeSource`]: the clock
//! - [`traits::RewardCalculator`]: reward computation on lock release
//!
//! plus in-memory implementations of the ledger and clock used by tests and
//! the CLI simulator.

pub mod clock;
pub mod constants;
pub mod error;
pub mod event;
pub mod token;
pub mod traits;
pub mod types;
