//! Error types for the IFTL yield farm.
//!
//! Each subsystem has its own enum; [`FarmError`] wraps them at the
//! orchestrator boundary. Every error maps onto a coarse [`ErrorKind`] via
//! `kind()`, and its `Display` string is the user-visible rejection reason.
use serde::Serialize;
use thiserror::Error;

use crate::types::{Address, Amount, Shares, Timestamp};

/// Coarse failure taxonomy shared by every subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    PermissionDenied,
    TemporalViolation,
    ArithmeticDomainError,
    InsufficientResource,
    NothingDue,
    AlreadyExists,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address length: {0} hex digits, expected 40")] InvalidLength(usize),
    #[error("invalid address hex: {0}")] InvalidHex(String),
}

impl AddressError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("division by zero")] DivisionByZero,
    #[error("negative elapsed time: {0}")] NegativeElapsed(i64),
    #[error("logarithm of a non-positive value")] NonPositiveLogarithm,
    #[error("arithmetic overflow")] Overflow,
    #[error("negative value cannot be converted to an unsigned integer")] NegativeValue,
    #[error("value is not finite")] NotFinite,
}

impl MathError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ArithmeticDomainError
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("zero address")] ZeroAddress,
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: Amount, need: Amount },
    #[error("insufficient allowance: have {have}, need {need}")] InsufficientAllowance { have: Amount, need: Amount },
    #[error("total supply overflow")] SupplyOverflow,
    #[error("{0} is not the minter")] NotMinter(Address),
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAddress => ErrorKind::InvalidInput,
            Self::InsufficientBalance { .. } | Self::InsufficientAllowance { .. } => {
                ErrorKind::InsufficientResource
            }
            Self::SupplyOverflow => ErrorKind::ArithmeticDomainError,
            Self::NotMinter(_) => ErrorKind::PermissionDenied,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeLockError {
    #[error("token timelock already active for {0}")] AlreadyLocked(Address),
    #[error("release time {release_time} is not after current time {now}")] InvalidReleaseTime { release_time: Timestamp, now: Timestamp },
    #[error("principal must be greater than zero")] ZeroPrincipal,
    #[error("token timelock not found for {0}")] NotFound(Address),
    #[error("current time {now} is before release time {release_time}")] TooEarly { now: Timestamp, release_time: Timestamp },
    #[error("no tokens to release")] NoTokens,
    #[error("reward computation: {0}")] Reward(#[from] MathError),
}

impl TimeLockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyLocked(_) => ErrorKind::AlreadyExists,
            Self::InvalidReleaseTime { .. } | Self::TooEarly { .. } => ErrorKind::TemporalViolation,
            Self::ZeroPrincipal => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NoTokens => ErrorKind::NothingDue,
            Self::Reward(e) => e.kind(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitterError {
    #[error("payees and shares length mismatch: {payees} payees, {shares} shares")] LengthMismatch { payees: usize, shares: usize },
    #[error("payee list cannot be empty")] EmptyPayeeList,
    #[error("shares are zero for {0}")] ZeroShares(Address),
    #[error("account is the zero address")] ZeroAddress,
    #[error("account {0} already has shares")] DuplicatePayee(Address),
    #[error("account {0} has no shares")] NotAPayee(Address),
    #[error("account {0} is not due payment")] NothingDue(Address),
    #[error("account {account} already holds {shares} shares")] SameShares { account: Address, shares: Shares },
    #[error("payee {0} not found")] PayeeNotFound(Address),
    #[error("insufficient shares: have {have}, need {need}")] InsufficientShares { have: Shares, need: Shares },
    #[error("cannot transfer shares from {0} to itself")] SelfTransfer(Address),
    #[error("the farm account {0} cannot hold shares")] FarmAccount(Address),
    #[error("payee index {index} out of range for {len} payees")] IndexOutOfRange { index: usize, len: usize },
    #[error("share arithmetic overflow")] Overflow,
}

impl SplitterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthMismatch { .. }
            | Self::EmptyPayeeList
            | Self::ZeroShares(_)
            | Self::ZeroAddress
            | Self::DuplicatePayee(_)
            | Self::NotAPayee(_)
            | Self::SameShares { .. }
            | Self::SelfTransfer(_)
            | Self::FarmAccount(_) => ErrorKind::InvalidInput,
            Self::PayeeNotFound(_) | Self::IndexOutOfRange { .. } => ErrorKind::NotFound,
            Self::NothingDue(_) => ErrorKind::NothingDue,
            Self::InsufficientShares { .. } => ErrorKind::InsufficientResource,
            Self::Overflow => ErrorKind::ArithmeticDomainError,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("caller {caller} is not the owner {owner}")] NotOwner { caller: Address, owner: Address },
    #[error("new owner is the zero address")] ZeroAddress,
}

impl AccessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } => ErrorKind::PermissionDenied,
            Self::ZeroAddress => ErrorKind::InvalidInput,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FarmError {
    #[error(transparent)] TimeLock(#[from] TimeLockError),
    #[error(transparent)] Splitter(#[from] SplitterError),
    #[error(transparent)] Access(#[from] AccessError),
    #[error(transparent)] Math(#[from] MathError),
    #[error("token transfer failed: {0}")] TransferFailed(#[from] TokenError),
    #[error("amount must be greater than zero")] ZeroAmount,
    #[error("config: {0}")] Config(String),
}

impl FarmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TimeLock(e) => e.kind(),
            Self::Splitter(e) => e.kind(),
            Self::Access(e) => e.kind(),
            Self::Math(e) => e.kind(),
            Self::TransferFailed(_) => ErrorKind::InsufficientResource,
            Self::ZeroAmount | Self::Config(_) => ErrorKind::InvalidInput,
        }
    }
}
