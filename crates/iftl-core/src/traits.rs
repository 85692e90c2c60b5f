//! Trait interfaces for the IFTL yield farm.
//!
//! These traits define the contracts between the farm and its collaborators:
//! - [`FungibleToken`]: balance/allowance/transfer ledger (accepted token)
//! - [`MintableToken`]: a ledger the farm may mint into and burn from (reward token)
//! - [`TimeSource`]: monotonically non-decreasing clock
//! - [`RewardCalculator`]: reward math (iftl-math implements)

use crate::error::{MathError, TokenError};
use crate::types::{Address, Amount, Timestamp};

/// A standard fungible-token ledger.
///
/// Every mutating call either applies fully or fails with no effect.
pub trait FungibleToken {
    fn name(&self) -> &str;

    fn symbol(&self) -> &str;

    fn decimals(&self) -> u8;

    fn total_supply(&self) -> Amount;

    /// Balance of `account`. Unknown accounts hold zero.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Remaining amount `spender` may move on behalf of `owner`.
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Set `spender`'s allowance over `owner`'s balance to `amount`.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount)
    -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;

    /// Move `amount` from `owner` to `to`, consuming `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;
}

/// A token ledger with a privileged minter.
pub trait MintableToken: FungibleToken {
    /// Create `amount` new tokens for `to`. Only the minter may call this.
    fn mint(&mut self, minter: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;

    /// Destroy `amount` of `holder`'s tokens, consuming `spender`'s allowance.
    fn burn_from(
        &mut self,
        spender: &Address,
        holder: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;
}

/// Source of the current time.
///
/// Successive calls never go backwards.
pub trait TimeSource {
    fn timestamp(&self) -> Timestamp;
}

/// Pure computation of the reward minted when a lock matures.
///
/// Implementations carry their own rate and multiplier; identical inputs
/// always produce identical output.
pub trait RewardCalculator {
    /// Reward for `principal` held for `elapsed` time units.
    ///
    /// Fails with [`MathError::NegativeElapsed`] when `elapsed < 0`.
    fn compute_reward(&self, principal: Amount, elapsed: i64) -> Result<Amount, MathError>;
}
