//! Reward engine implementing the [`RewardCalculator`] trait.
//!
//! The reward minted when a lock matures is the principal scaled by the
//! multiplier and discounted by compounding the interest rate over the time
//! the tokens were held:
//!
//! ```text
//! growth = exp(elapsed * ln(1 + rate))
//! reward = trunc(principal * multiplier / growth)
//! ```

use iftl_core::error::MathError;
use iftl_core::traits::RewardCalculator;
use iftl_core::types::Amount;

use crate::quad::Quad;

/// The production reward calculator.
///
/// `ln(1 + rate)` is computed once at construction, so every reward costs a
/// single `exp`, one multiply and one divide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardEngine {
    interest_rate: Quad,
    multiplier: Quad,
    ln_growth: Quad,
}

impl RewardEngine {
    /// Create an engine for a per-time-unit `interest_rate` and a reward
    /// `multiplier`.
    ///
    /// Fails with [`MathError::NonPositiveLogarithm`] when `1 + rate <= 0`
    /// and with [`MathError::NegativeValue`] for a negative multiplier.
    pub fn new(interest_rate: Quad, multiplier: Quad) -> Result<Self, MathError> {
        if multiplier.is_negative() {
            return Err(MathError::NegativeValue);
        }
        let ln_growth = Quad::ONE.add(interest_rate)?.ln()?;
        tracing::debug!(rate = %interest_rate, multiplier = %multiplier, "reward engine ready");
        Ok(Self {
            interest_rate,
            multiplier,
            ln_growth,
        })
    }

    pub fn interest_rate(&self) -> Quad {
        self.interest_rate
    }

    pub fn multiplier(&self) -> Quad {
        self.multiplier
    }

    /// Compound growth factor `(1 + rate)^elapsed`.
    pub fn growth(&self, elapsed: i64) -> Result<Quad, MathError> {
        if elapsed < 0 {
            return Err(MathError::NegativeElapsed(elapsed));
        }
        self.ln_growth.mul(Quad::from_int(elapsed as i128))?.exp()
    }
}

impl RewardCalculator for RewardEngine {
    fn compute_reward(&self, principal: Amount, elapsed: i64) -> Result<Amount, MathError> {
        if elapsed < 0 {
            return Err(MathError::NegativeElapsed(elapsed));
        }
        if principal == 0 || self.multiplier.is_zero() {
            return Ok(0);
        }

        let scaled = Quad::from_u128(principal).mul(self.multiplier)?;
        let growth = match self.growth(elapsed) {
            Ok(g) => g,
            // A growth factor past the binary128 range discounts any u128 principal to nothing.
            Err(MathError::Overflow) => return Ok(0),
            Err(e) => return Err(e),
        };
        if growth.is_zero() {
            // Negative rate held long enough: the quotient is unbounded.
            return Err(MathError::Overflow);
        }

        scaled.div(growth)?.to_u128()
    }
}

/// One-shot reward computation without keeping an engine around.
pub fn compute_reward(
    principal: Amount,
    interest_rate: Quad,
    multiplier: Quad,
    elapsed: i64,
) -> Result<Amount, MathError> {
    RewardEngine::new(interest_rate, multiplier)?.compute_reward(principal, elapsed)
}
