//! In-memory fungible-token ledger.
//!
//! [`MemoryToken`] implements [`FungibleToken`] and [`MintableToken`] with
//! plain `HashMap`s. It plays both roles in tests and in the CLI simulator:
//! the accepted token (seeded with [`MemoryToken::mint_to`]) and the reward
//! token (minted only by the farm).
//!
//! Checks run before any balance changes, so a failed call leaves the ledger
//! untouched.

use std::collections::HashMap;

use crate::constants::DEFAULT_DECIMALS;
use crate::error::TokenError;
use crate::traits::{FungibleToken, MintableToken};
use crate::types::{Address, Amount};

#[derive(Debug, Clone)]
pub struct MemoryToken {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    /// owner → spender → remaining allowance.
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    /// Account allowed to call [`MintableToken::mint`]. `None` disables minting.
    minter: Option<Address>,
}

impl MemoryToken {
    /// Create an empty ledger with no minter.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals: DEFAULT_DECIMALS,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            minter: None,
        }
    }

    /// Create an empty ledger whose only minter is `minter`.
    pub fn with_minter(name: impl Into<String>, symbol: impl Into<String>, minter: Address) -> Self {
        Self {
            minter: Some(minter),
            ..Self::new(name, symbol)
        }
    }

    /// Credit `amount` to `to` without a minter check.
    ///
    /// Seeds balances for the accepted token, like a mock ERC-20 constructor.
    pub fn mint_to(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        self.credit(to, amount)
    }

    fn credit(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow)?;
        // Every balance is bounded by total supply, so this cannot overflow.
        *self.balances.entry(*to).or_insert(0) += amount;
        self.total_supply = supply;
        Ok(())
    }

    fn check_balance(&self, account: &Address, amount: Amount) -> Result<(), TokenError> {
        let have = self.balance_of(account);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        Ok(())
    }

    fn check_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let have = self.allowance(owner, spender);
        if have < amount {
            return Err(TokenError::InsufficientAllowance { have, need: amount });
        }
        Ok(())
    }

    fn spend_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        if let Some(slot) = self
            .allowances
            .get_mut(owner)
            .and_then(|m| m.get_mut(spender))
        {
            *slot -= amount;
        }
    }

    fn debit(&mut self, account: &Address, amount: Amount) {
        if let Some(balance) = self.balances.get_mut(account) {
            *balance -= amount;
            if *balance == 0 {
                self.balances.remove(account);
            }
        }
    }
}

impl FungibleToken for MemoryToken {
    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if from.is_zero() || to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.check_balance(from, amount)?;
        self.debit(from, amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if owner.is_zero() || to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.check_allowance(owner, spender, amount)?;
        self.check_balance(owner, amount)?;
        self.spend_allowance(owner, spender, amount);
        self.debit(owner, amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}

impl MintableToken for MemoryToken {
    fn mint(&mut self, minter: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if self.minter != Some(*minter) {
            return Err(TokenError::NotMinter(*minter));
        }
        self.credit(to, amount)
    }

    fn burn_from(
        &mut self,
        spender: &Address,
        holder: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if holder.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.check_allowance(holder, spender, amount)?;
        self.check_balance(holder, amount)?;
        self.spend_allowance(holder, spender, amount);
        self.debit(holder, amount);
        self.total_supply -= amount;
        Ok(())
    }
}
