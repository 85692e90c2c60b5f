//! Proportional pull-payment ledger.
//!
//! Payees hold integer shares of a pool. At any time a payee is entitled to
//! `floor(total_received * shares / total_shares)` and may pull whatever part
//! of that has not been paid out yet. The splitter only keeps the books: the
//! caller supplies `total_received` and moves the tokens.
//!
//! Payees live in a dense `Vec` with an address-to-slot index, so membership
//! checks and removals are O(1). Removal is swap-remove: the last payee takes
//! the removed payee's slot, so [`payee`](PaymentSplitter::payee) indices
//! may change whenever someone leaves the list.
//!
//! The payee list is exactly the set of accounts with nonzero shares. An
//! account whose shares reach zero (through an update, a removal or
//! transferring all of them away) leaves the list. Its `released` total is
//! kept so the ledger totals stay consistent.

use std::collections::HashMap;

use iftl_core::error::SplitterError;
use iftl_core::event::{Event, EventLog};
use iftl_core::types::{Address, Amount, Shares};
use iftl_math::mul_div_floor;

use crate::ownership::OwnerCap;

#[derive(Debug, Clone, Default)]
pub struct PaymentSplitter {
    payees: Vec<Address>,
    slots: HashMap<Address, usize>,
    /// Only nonzero holdings are stored.
    shares: HashMap<Address, Shares>,
    released: HashMap<Address, Amount>,
    total_shares: Shares,
    total_released: Amount,
}

impl PaymentSplitter {
    /// Build a splitter from parallel address and share lists.
    ///
    /// Emits [`Event::PayeeAdded`] for every entry. Any invalid entry fails
    /// the whole construction.
    pub fn new(
        payees: &[Address],
        shares: &[Shares],
        events: &mut EventLog,
    ) -> Result<Self, SplitterError> {
        if payees.len() != shares.len() {
            return Err(SplitterError::LengthMismatch {
                payees: payees.len(),
                shares: shares.len(),
            });
        }
        if payees.is_empty() {
            return Err(SplitterError::EmptyPayeeList);
        }

        let mut splitter = Self::default();
        let mut added = EventLog::new();
        for (account, amount) in payees.iter().zip(shares) {
            if account.is_zero() {
                return Err(SplitterError::ZeroAddress);
            }
            if *amount == 0 {
                return Err(SplitterError::ZeroShares(*account));
            }
            if splitter.is_payee(account) {
                return Err(SplitterError::DuplicatePayee(*account));
            }
            splitter.add_payee(*account, *amount, &mut added)?;
        }
        events.extend(added.drain());
        Ok(splitter)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn total_shares(&self) -> Shares {
        self.total_shares
    }

    pub fn total_released(&self) -> Amount {
        self.total_released
    }

    /// Shares held by `account`; zero for accounts that are not payees.
    pub fn shares(&self, account: &Address) -> Shares {
        self.shares.get(account).copied().unwrap_or(0)
    }

    /// Cumulative amount paid out to `account`.
    pub fn released(&self, account: &Address) -> Amount {
        self.released.get(account).copied().unwrap_or(0)
    }

    pub fn is_payee(&self, account: &Address) -> bool {
        self.slots.contains_key(account)
    }

    /// Payee at `index`. Indices follow swap-remove order.
    pub fn payee(&self, index: usize) -> Result<Address, SplitterError> {
        self.payees
            .get(index)
            .copied()
            .ok_or(SplitterError::IndexOutOfRange {
                index,
                len: self.payees.len(),
            })
    }

    pub fn payees(&self) -> &[Address] {
        &self.payees
    }

    pub fn payee_count(&self) -> usize {
        self.payees.len()
    }

    /// Amount `account` could pull right now given `total_received`.
    ///
    /// Zero for non-payees and for payees whose entitlement dropped below
    /// what they were already paid after a share change.
    pub fn pending(&self, account: &Address, total_received: Amount) -> Amount {
        self.entitlement(account, total_received)
            .map(|owed| owed.saturating_sub(self.released(account)))
            .unwrap_or(0)
    }

    fn entitlement(&self, account: &Address, total_received: Amount) -> Result<Amount, SplitterError> {
        let held = self.shares(account);
        if held == 0 || self.total_shares == 0 {
            return Ok(0);
        }
        mul_div_floor(total_received, held, self.total_shares).map_err(|_| SplitterError::Overflow)
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    /// Record a payment of everything `account` is due and return the amount.
    ///
    /// The caller transfers the tokens. If that transfer fails it must call
    /// [`revert_release`](Self::revert_release) with the returned amount.
    pub fn release(
        &mut self,
        account: &Address,
        total_received: Amount,
        events: &mut EventLog,
    ) -> Result<Amount, SplitterError> {
        if !self.is_payee(account) {
            return Err(SplitterError::NotAPayee(*account));
        }
        let owed = self.entitlement(account, total_received)?;
        let already = self.released(account);
        let due = owed.saturating_sub(already);
        if due == 0 {
            return Err(SplitterError::NothingDue(*account));
        }

        let total_released = self
            .total_released
            .checked_add(due)
            .ok_or(SplitterError::Overflow)?;
        self.released.insert(*account, already + due);
        self.total_released = total_released;

        tracing::debug!(%account, due, "payment released");
        events.emit(Event::PaymentReleased {
            account: *account,
            amount: due,
        });
        Ok(due)
    }

    /// Undo a [`release`](Self::release) whose payout could not be made.
    pub fn revert_release(&mut self, account: &Address, amount: Amount) {
        if let Some(paid) = self.released.get_mut(account) {
            *paid = paid.saturating_sub(amount);
            if *paid == 0 {
                self.released.remove(account);
            }
        }
        self.total_released = self.total_released.saturating_sub(amount);
    }

    // ------------------------------------------------------------------
    // Share mutation
    // ------------------------------------------------------------------

    /// Set `account`'s shares to `new_shares`. Owner only.
    ///
    /// Setting zero removes the payee and emits [`Event::PayeeRemoved`];
    /// otherwise emits [`Event::PayeeUpdated`] with the signed change.
    pub fn update_payee(
        &mut self,
        _cap: &OwnerCap,
        account: &Address,
        new_shares: Shares,
        events: &mut EventLog,
    ) -> Result<(), SplitterError> {
        let current = self.shares(account);
        if current == 0 {
            return Err(SplitterError::NotAPayee(*account));
        }
        if new_shares == current {
            return Err(SplitterError::SameShares {
                account: *account,
                shares: current,
            });
        }
        if new_shares == 0 {
            return self.remove(account, events);
        }

        let delta = signed(new_shares)? - signed(current)?;
        let total = (self.total_shares - current)
            .checked_add(new_shares)
            .ok_or(SplitterError::Overflow)?;
        self.shares.insert(*account, new_shares);
        self.total_shares = total;

        tracing::debug!(%account, new_shares, delta, "payee updated");
        events.emit(Event::PayeeUpdated {
            account: *account,
            delta,
        });
        Ok(())
    }

    /// Remove `account` from the payee list. Owner only.
    pub fn remove_payee(
        &mut self,
        _cap: &OwnerCap,
        account: &Address,
        events: &mut EventLog,
    ) -> Result<(), SplitterError> {
        if !self.is_payee(account) {
            return Err(SplitterError::PayeeNotFound(*account));
        }
        self.remove(account, events)
    }

    /// Move `amount` of `from`'s shares to `to`. Any payee may do this.
    ///
    /// A new recipient joins the payee list ([`Event::PayeeAdded`]); a sender
    /// left with nothing leaves it ([`Event::PayeeRemoved`]). Total shares
    /// are unchanged. Always ends with [`Event::SharesTransferred`].
    pub fn transfer_shares(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Shares,
        events: &mut EventLog,
    ) -> Result<(), SplitterError> {
        let held = self.shares(from);
        if held == 0 {
            return Err(SplitterError::NotAPayee(*from));
        }
        if to.is_zero() {
            return Err(SplitterError::ZeroAddress);
        }
        if from == to {
            return Err(SplitterError::SelfTransfer(*from));
        }
        if amount == 0 {
            return Err(SplitterError::ZeroShares(*to));
        }
        if amount > held {
            return Err(SplitterError::InsufficientShares { have: held, need: amount });
        }
        let receiving = self.shares(to);
        // Both holdings are part of total_shares, so this cannot overflow in practice.
        let received = receiving.checked_add(amount).ok_or(SplitterError::Overflow)?;

        let mut staged = EventLog::new();
        if held == amount {
            self.detach(from);
            tracing::debug!(account = %from, "payee removed");
            staged.emit(Event::PayeeRemoved { account: *from });
        } else {
            self.shares.insert(*from, held - amount);
        }

        if receiving == 0 {
            self.attach(*to, amount);
            tracing::debug!(account = %to, shares = amount, "payee added");
            staged.emit(Event::PayeeAdded {
                account: *to,
                shares: amount,
            });
        } else {
            self.shares.insert(*to, received);
        }

        tracing::debug!(%from, %to, amount, "shares transferred");
        staged.emit(Event::SharesTransferred {
            from: *from,
            to: *to,
            amount,
        });
        events.extend(staged.drain());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn add_payee(
        &mut self,
        account: Address,
        amount: Shares,
        events: &mut EventLog,
    ) -> Result<(), SplitterError> {
        self.total_shares = self
            .total_shares
            .checked_add(amount)
            .ok_or(SplitterError::Overflow)?;
        self.attach(account, amount);
        events.emit(Event::PayeeAdded {
            account,
            shares: amount,
        });
        Ok(())
    }

    /// Remove a payee and its shares from the total. Refuses to empty the list.
    fn remove(&mut self, account: &Address, events: &mut EventLog) -> Result<(), SplitterError> {
        if self.payees.len() == 1 {
            return Err(SplitterError::EmptyPayeeList);
        }
        let held = self.shares(account);
        self.detach(account);
        self.total_shares -= held;

        tracing::debug!(%account, "payee removed");
        events.emit(Event::PayeeRemoved { account: *account });
        Ok(())
    }

    /// Append to the payee list without touching `total_shares`.
    fn attach(&mut self, account: Address, amount: Shares) {
        self.slots.insert(account, self.payees.len());
        self.payees.push(account);
        self.shares.insert(account, amount);
    }

    /// Swap-remove from the payee list without touching `total_shares`.
    fn detach(&mut self, account: &Address) {
        self.shares.remove(account);
        let Some(slot) = self.slots.remove(account) else {
            return;
        };
        self.payees.swap_remove(slot);
        if let Some(moved) = self.payees.get(slot) {
            self.slots.insert(*moved, slot);
        }
    }
}

fn signed(shares: Shares) -> Result<i128, SplitterError> {
    i128::try_from(shares).map_err(|_| SplitterError::Overflow)
}
