//! Per-depositor time locks.
//!
//! Each depositor has at most one active [`TokenTimeLock`]. A lock is
//! created on deposit and removed when it is released; releasing computes
//! the reward through a [`RewardCalculator`] using the time actually elapsed
//! since the deposit.

use std::collections::HashMap;

use serde::Serialize;

use iftl_core::error::{MathError, TimeLockError};
use iftl_core::traits::RewardCalculator;
use iftl_core::types::{Address, Amount, Timestamp};

/// Escrowed principal and its maturity time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTimeLock {
    pub beneficiary: Address,
    pub principal: Amount,
    /// Time of the deposit that created the lock.
    pub locked_at: Timestamp,
    pub release_time: Timestamp,
}

impl TokenTimeLock {
    pub fn is_mature(&self, now: Timestamp) -> bool {
        now >= self.release_time
    }

    /// Time held since the deposit.
    pub fn elapsed(&self, now: Timestamp) -> Result<i64, MathError> {
        if now < self.locked_at {
            let behind = i64::try_from(self.locked_at - now).map_err(|_| MathError::Overflow)?;
            return Err(MathError::NegativeElapsed(-behind));
        }
        i64::try_from(now - self.locked_at).map_err(|_| MathError::Overflow)
    }
}

/// A matured lock removed from the registry, with the reward it earned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub lock: TokenTimeLock,
    pub reward: Amount,
}

/// Active locks keyed by depositor.
#[derive(Debug, Clone, Default)]
pub struct TimeLockRegistry {
    locks: HashMap<Address, TokenTimeLock>,
}

impl TimeLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a lock for `beneficiary`.
    ///
    /// Rejects a second lock for the same depositor, a release time that is
    /// not strictly in the future and a zero principal.
    pub fn create(
        &mut self,
        beneficiary: Address,
        principal: Amount,
        now: Timestamp,
        release_time: Timestamp,
    ) -> Result<&TokenTimeLock, TimeLockError> {
        if self.locks.contains_key(&beneficiary) {
            return Err(TimeLockError::AlreadyLocked(beneficiary));
        }
        if release_time <= now {
            return Err(TimeLockError::InvalidReleaseTime { release_time, now });
        }
        if principal == 0 {
            return Err(TimeLockError::ZeroPrincipal);
        }

        tracing::debug!(%beneficiary, principal, release_time, "time lock created");
        let lock = TokenTimeLock {
            beneficiary,
            principal,
            locked_at: now,
            release_time,
        };
        Ok(self.locks.entry(beneficiary).or_insert(lock))
    }

    pub fn peek(&self, beneficiary: &Address) -> Result<&TokenTimeLock, TimeLockError> {
        self.locks
            .get(beneficiary)
            .ok_or(TimeLockError::NotFound(*beneficiary))
    }

    /// Remove a mature lock and compute its reward.
    ///
    /// A zero reward fails with [`TimeLockError::NoTokens`]. On any failure
    /// the lock stays in place.
    pub fn release<R: RewardCalculator>(
        &mut self,
        beneficiary: &Address,
        now: Timestamp,
        calculator: &R,
    ) -> Result<Release, TimeLockError> {
        let lock = self.peek(beneficiary)?;
        if !lock.is_mature(now) {
            return Err(TimeLockError::TooEarly {
                now,
                release_time: lock.release_time,
            });
        }

        let elapsed = lock.elapsed(now)?;
        let reward = calculator.compute_reward(lock.principal, elapsed)?;
        if reward == 0 {
            return Err(TimeLockError::NoTokens);
        }

        let lock = self
            .locks
            .remove(beneficiary)
            .ok_or(TimeLockError::NotFound(*beneficiary))?;
        tracing::debug!(%beneficiary, elapsed, reward, "time lock released");
        Ok(Release { lock, reward })
    }

    /// Put back a lock taken out by [`release`](Self::release) or
    /// [`cancel`](Self::cancel).
    pub fn restore(&mut self, lock: TokenTimeLock) {
        self.locks.insert(lock.beneficiary, lock);
    }

    /// Drop a lock without paying a reward.
    pub fn cancel(&mut self, beneficiary: &Address) -> Option<TokenTimeLock> {
        self.locks.remove(beneficiary)
    }

    pub fn contains(&self, beneficiary: &Address) -> bool {
        self.locks.contains_key(beneficiary)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Sum of all escrowed principal.
    pub fn total_locked(&self) -> Amount {
        self.locks
            .values()
            .fold(0, |acc: Amount, l| acc.saturating_add(l.principal))
    }
}
