//! Shared deployment helpers for scenario and adversarial tests.

use iftl_core::clock::ManualClock;
use iftl_core::error::FarmError;
use iftl_core::token::MemoryToken;
use iftl_core::traits::FungibleToken;
use iftl_core::types::{Address, Amount, Shares};
use iftl_farm::{FarmParams, YieldFarm};
use iftl_math::Quad;

/// The farm type every test deploys.
pub type TestFarm = YieldFarm<MemoryToken, MemoryToken, ManualClock>;

/// Deployment start time.
pub const GENESIS: u64 = 1_700_000_000;

/// Accepted-token balance seeded for every depositor.
pub const SEED_BALANCE: Amount = 1_000_000_000;

/// Simple address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

/// The farm's own account.
pub fn farm_address() -> Address {
    addr(0xFA)
}

/// The deploying owner.
pub fn owner() -> Address {
    addr(0x0E)
}

/// Rate 25/10000, given multiplier and lock duration.
pub fn params(multiplier: u128, lock_duration: u64) -> FarmParams {
    FarmParams {
        interest_rate: Quad::from_ratio(25, 10_000).unwrap(),
        multiplier: Quad::from_u128(multiplier),
        lock_duration,
    }
}

/// Deploy a farm whose accepted token seeds each of `depositors` with
/// [`SEED_BALANCE`]. Signals emitted by construction are drained.
pub fn deploy(
    params: FarmParams,
    payees: &[(Address, Shares)],
    depositors: &[Address],
) -> (TestFarm, ManualClock) {
    try_deploy(params, payees, depositors).unwrap()
}

/// Like [`deploy`] but returns construction failures.
pub fn try_deploy(
    params: FarmParams,
    payees: &[(Address, Shares)],
    depositors: &[Address],
) -> Result<(TestFarm, ManualClock), FarmError> {
    let clock = ManualClock::new(GENESIS);
    let mut accepted = MemoryToken::new("ERC20Mock name", "ERC20Mock symbol");
    for d in depositors {
        accepted.mint_to(d, SEED_BALANCE)?;
    }
    let reward = MemoryToken::with_minter("Interest Faster Than Light", "IFTL", farm_address());
    let mut farm = YieldFarm::new(
        farm_address(),
        owner(),
        accepted,
        reward,
        clock.clone(),
        params,
        payees,
    )?;
    farm.drain_events();
    Ok((farm, clock))
}

/// Approve the farm for `amount` and deposit it.
pub fn approve_and_deposit(
    farm: &mut TestFarm,
    depositor: &Address,
    amount: Amount,
) -> Result<(), FarmError> {
    let spender = farm.address();
    farm.accepted_token_mut().approve(depositor, &spender, amount)?;
    farm.deposit(depositor, amount)
}

/// Everything a failed operation must leave unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub payees: Vec<Address>,
    pub shares: Vec<Shares>,
    pub released: Vec<Amount>,
    pub total_shares: Shares,
    pub total_released: Amount,
    pub owner: Address,
    pub active_locks: usize,
    pub total_locked: Amount,
    pub accepted_balances: Vec<Amount>,
    pub reward_balances: Vec<Amount>,
    pub reward_supply: Amount,
    pub event_count: usize,
}

/// Capture the observable state for `accounts` (plus the farm itself).
pub fn snapshot(farm: &TestFarm, accounts: &[Address]) -> Snapshot {
    let mut all = accounts.to_vec();
    all.push(farm.address());
    Snapshot {
        payees: farm.payees().to_vec(),
        shares: all.iter().map(|a| farm.shares(a)).collect(),
        released: all.iter().map(|a| farm.released(a)).collect(),
        total_shares: farm.total_shares(),
        total_released: farm.total_released(),
        owner: farm.owner(),
        active_locks: farm.active_locks(),
        total_locked: farm.total_locked(),
        accepted_balances: all
            .iter()
            .map(|a| farm.accepted_token().balance_of(a))
            .collect(),
        reward_balances: all
            .iter()
            .map(|a| farm.reward_token().balance_of(a))
            .collect(),
        reward_supply: farm.reward_token().total_supply(),
        event_count: farm.events().len(),
    }
}
