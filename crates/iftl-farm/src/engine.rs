//! The yield farm orchestrator.
//!
//! [`YieldFarm`] escrows deposits of the accepted token in per-depositor
//! time locks. Releasing a mature lock returns the principal, mints the
//! computed reward to the depositor and mints the same amount into the
//! farm's own reward balance, which is the pool the payment splitter pays
//! out of.
//!
//! Every operation updates the farm's own books before touching a token
//! ledger and undoes them if the ledger call fails, so a failed operation
//! leaves the farm, both ledgers and the signal log as they were.

use tracing::{debug, info, warn};

use iftl_core::error::{FarmError, MathError, SplitterError, TokenError};
use iftl_core::event::{Event, EventLog};
use iftl_core::traits::{FungibleToken, MintableToken, TimeSource};
use iftl_core::types::{Address, Amount, Shares, Timestamp};
use iftl_math::{Quad, RewardEngine};

use crate::ownership::Ownable;
use crate::splitter::PaymentSplitter;
use crate::timelock::{Release, TimeLockRegistry, TokenTimeLock};

/// Reward and lock parameters fixed at deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmParams {
    /// Per-time-unit interest rate.
    pub interest_rate: Quad,
    /// Scale from accepted-token units to reward-token units.
    pub multiplier: Quad,
    /// Time between a deposit and its earliest release.
    pub lock_duration: u64,
}

pub struct YieldFarm<A, R, C> {
    /// The farm's own account on both ledgers.
    address: Address,
    ownable: Ownable,
    accepted: A,
    reward: R,
    clock: C,
    calculator: RewardEngine,
    lock_duration: u64,
    locks: TimeLockRegistry,
    splitter: PaymentSplitter,
    events: EventLog,
}

impl<A, R, C> YieldFarm<A, R, C>
where
    A: FungibleToken,
    R: MintableToken,
    C: TimeSource,
{
    /// Deploy a farm.
    ///
    /// `reward` must accept `address` as its minter. Construction emits a
    /// [`Event::PayeeAdded`] per initial payee and fails as a whole if any
    /// parameter or payee is invalid.
    pub fn new(
        address: Address,
        owner: Address,
        accepted: A,
        reward: R,
        clock: C,
        params: FarmParams,
        payees: &[(Address, Shares)],
    ) -> Result<Self, FarmError> {
        if address.is_zero() {
            return Err(FarmError::Config("farm address is the zero address".into()));
        }
        if payees.iter().any(|(account, _)| *account == address) {
            return Err(SplitterError::FarmAccount(address).into());
        }
        let ownable = Ownable::new(owner)?;
        let calculator = RewardEngine::new(params.interest_rate, params.multiplier)?;

        let (accounts, shares): (Vec<Address>, Vec<Shares>) = payees.iter().copied().unzip();
        let mut events = EventLog::new();
        let splitter = PaymentSplitter::new(&accounts, &shares, &mut events)?;

        info!(
            %address,
            %owner,
            rate = %params.interest_rate,
            multiplier = %params.multiplier,
            lock_duration = params.lock_duration,
            payees = payees.len(),
            "yield farm deployed"
        );
        Ok(Self {
            address,
            ownable,
            accepted,
            reward,
            clock,
            calculator,
            lock_duration: params.lock_duration,
            locks: TimeLockRegistry::new(),
            splitter,
            events,
        })
    }

    // ------------------------------------------------------------------
    // Deposits and releases
    // ------------------------------------------------------------------

    /// Lock `amount` of the caller's accepted tokens for the lock duration.
    ///
    /// The caller must have approved the farm for at least `amount`.
    pub fn deposit(&mut self, caller: &Address, amount: Amount) -> Result<(), FarmError> {
        let now = self.clock.timestamp();
        let release_time = now
            .checked_add(self.lock_duration)
            .ok_or(MathError::Overflow)?;
        self.locks.create(*caller, amount, now, release_time)?;

        if let Err(e) = self
            .accepted
            .transfer_from(&self.address, caller, &self.address, amount)
        {
            warn!(%caller, amount, error = %e, "deposit transfer failed, lock dropped");
            self.locks.cancel(caller);
            return Err(e.into());
        }

        info!(%caller, amount, release_time, "deposit locked");
        self.events.emit(Event::Deposited {
            depositor: *caller,
            amount,
        });
        Ok(())
    }

    /// Release the caller's mature lock and pay out principal and reward.
    ///
    /// Returns the reward minted to the caller.
    pub fn release_tokens(&mut self, caller: &Address) -> Result<Amount, FarmError> {
        let now = self.clock.timestamp();
        let Release { lock, reward } = self.locks.release(caller, now, &self.calculator)?;

        // Depositor and pool each receive `reward`.
        let minted = match reward.checked_mul(2) {
            Some(m) => m,
            None => {
                self.locks.restore(lock);
                return Err(TokenError::SupplyOverflow.into());
            }
        };
        if let Err(e) = self.reward.mint(&self.address, &self.address, minted) {
            warn!(%caller, reward, error = %e, "reward mint failed, lock restored");
            self.locks.restore(lock);
            return Err(e.into());
        }
        if let Err(e) = self.reward.transfer(&self.address, caller, reward) {
            warn!(%caller, reward, error = %e, "reward payout failed, lock restored");
            self.unmint(minted);
            self.locks.restore(lock);
            return Err(e.into());
        }
        if let Err(e) = self.accepted.transfer(&self.address, caller, lock.principal) {
            warn!(%caller, principal = lock.principal, error = %e, "principal return failed, lock restored");
            if let Err(undo) = self.reward.transfer(caller, &self.address, reward) {
                warn!(%caller, error = %undo, "could not reclaim reward payout");
            }
            self.unmint(minted);
            self.locks.restore(lock);
            return Err(e.into());
        }

        info!(%caller, principal = lock.principal, reward, "time lock released");
        self.events.emit(Event::Released {
            releaser: *caller,
            amount: reward,
        });
        Ok(reward)
    }

    /// Destroy a mint the farm made to itself.
    fn unmint(&mut self, amount: Amount) {
        let farm = self.address;
        let undone = self
            .reward
            .approve(&farm, &farm, amount)
            .and_then(|_| self.reward.burn_from(&farm, &farm, amount));
        if let Err(e) = undone {
            warn!(amount, error = %e, "could not undo reward mint");
        }
    }

    /// The caller's active lock.
    pub fn my_time_lock(&self, caller: &Address) -> Result<&TokenTimeLock, FarmError> {
        Ok(self.locks.peek(caller)?)
    }

    /// Burn `amount` of the caller's reward tokens.
    ///
    /// The caller must have approved the farm on the reward ledger.
    pub fn burn(&mut self, caller: &Address, amount: Amount) -> Result<(), FarmError> {
        if amount == 0 {
            return Err(FarmError::ZeroAmount);
        }
        self.reward.burn_from(&self.address, caller, amount)?;
        info!(%caller, amount, "reward burned");
        self.events.emit(Event::Burned {
            burner: *caller,
            amount,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ownership and payee administration
    // ------------------------------------------------------------------

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), FarmError> {
        self.ownable
            .transfer_ownership(caller, new_owner, &mut self.events)?;
        Ok(())
    }

    /// Owner only. See [`PaymentSplitter::update_payee`].
    pub fn update_payee(
        &mut self,
        caller: &Address,
        account: &Address,
        shares: Shares,
    ) -> Result<(), FarmError> {
        let cap = self.ownable.authorize(caller)?;
        self.ensure_not_farm(account)?;
        self.splitter
            .update_payee(&cap, account, shares, &mut self.events)?;
        Ok(())
    }

    /// Owner only. See [`PaymentSplitter::remove_payee`].
    pub fn remove_payee(&mut self, caller: &Address, account: &Address) -> Result<(), FarmError> {
        let cap = self.ownable.authorize(caller)?;
        self.splitter.remove_payee(&cap, account, &mut self.events)?;
        Ok(())
    }

    /// Move shares from the caller to `to`.
    pub fn transfer_shares(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Shares,
    ) -> Result<(), FarmError> {
        self.ensure_not_farm(to)?;
        self.splitter
            .transfer_shares(caller, to, amount, &mut self.events)?;
        Ok(())
    }

    /// The pool balance counts toward `total_received`, so paying the farm
    /// its own share would inflate every entitlement.
    fn ensure_not_farm(&self, account: &Address) -> Result<(), SplitterError> {
        if *account == self.address {
            return Err(SplitterError::FarmAccount(self.address));
        }
        Ok(())
    }

    /// Pay `account` everything it is due from the reward pool.
    ///
    /// Anyone may trigger this; the funds always go to `account`.
    pub fn release_payment(&mut self, account: &Address) -> Result<Amount, FarmError> {
        let received = self.total_received();
        let mut staged = EventLog::new();
        let due = self.splitter.release(account, received, &mut staged)?;

        if let Err(e) = self.reward.transfer(&self.address, account, due) {
            warn!(%account, due, error = %e, "payment transfer failed, release reverted");
            self.splitter.revert_release(account, due);
            return Err(e.into());
        }

        debug!(%account, due, "payment sent");
        self.events.extend(staged.drain());
        Ok(due)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn lock_duration(&self) -> u64 {
        self.lock_duration
    }

    pub fn interest_rate(&self) -> Quad {
        self.calculator.interest_rate()
    }

    pub fn multiplier(&self) -> Quad {
        self.calculator.multiplier()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.timestamp()
    }

    /// Everything the pool has taken in: the current balance plus all payouts.
    pub fn total_received(&self) -> Amount {
        self.reward
            .balance_of(&self.address)
            .saturating_add(self.splitter.total_released())
    }

    pub fn pending_payment(&self, account: &Address) -> Amount {
        self.splitter.pending(account, self.total_received())
    }

    pub fn splitter(&self) -> &PaymentSplitter {
        &self.splitter
    }

    pub fn payees(&self) -> &[Address] {
        self.splitter.payees()
    }

    pub fn payee_count(&self) -> usize {
        self.splitter.payee_count()
    }

    pub fn payee(&self, index: usize) -> Result<Address, FarmError> {
        Ok(self.splitter.payee(index)?)
    }

    pub fn shares(&self, account: &Address) -> Shares {
        self.splitter.shares(account)
    }

    pub fn released(&self, account: &Address) -> Amount {
        self.splitter.released(account)
    }

    pub fn total_shares(&self) -> Shares {
        self.splitter.total_shares()
    }

    pub fn total_released(&self) -> Amount {
        self.splitter.total_released()
    }

    /// Number of active locks.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    /// Accepted tokens currently held in escrow.
    pub fn total_locked(&self) -> Amount {
        self.locks.total_locked()
    }

    pub fn accepted_token(&self) -> &A {
        &self.accepted
    }

    pub fn reward_token(&self) -> &R {
        &self.reward
    }

    /// Mutable ledger access for account-side actions such as approvals.
    pub fn accepted_token_mut(&mut self) -> &mut A {
        &mut self.accepted
    }

    /// Mutable ledger access for account-side actions such as approvals.
    pub fn reward_token_mut(&mut self) -> &mut R {
        &mut self.reward
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// Remove and return all signals emitted so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}
