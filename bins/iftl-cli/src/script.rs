//! Operation scripts for the `simulate` subcommand.
//!
//! A script is a JSON array of objects tagged by `op`, for example
//! `{"op": "deposit", "caller": "0x…", "amount": 1000}`. Replay runs each
//! operation against an in-memory farm built from the config; a rejected
//! operation produces an error line and replay continues.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use iftl_core::clock::ManualClock;
use iftl_core::error::{ErrorKind, FarmError};
use iftl_core::token::MemoryToken;
use iftl_core::traits::FungibleToken;
use iftl_core::types::{Address, Amount, Shares};
use iftl_farm::{FarmConfig, YieldFarm};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Op {
    /// Seed accepted-token balance.
    Mint { to: Address, amount: Amount },
    /// Approve the farm on the accepted token.
    Approve { owner: Address, amount: Amount },
    Deposit { caller: Address, amount: Amount },
    Advance { secs: u64 },
    ReleaseTokens { caller: Address },
    ReleasePayment { account: Address },
    /// Approve the farm on the reward token, ahead of a burn.
    ApproveReward { owner: Address, amount: Amount },
    Burn { caller: Address, amount: Amount },
    TransferShares { caller: Address, to: Address, amount: Shares },
    UpdatePayee { caller: Address, account: Address, shares: Shares },
    RemovePayee { caller: Address, account: Address },
    TransferOwnership { caller: Address, new_owner: Address },
}

pub fn parse(raw: &str) -> Result<Vec<Op>> {
    Ok(serde_json::from_str(raw)?)
}

/// A rejected operation as printed by the replay.
#[derive(Debug, Serialize)]
struct Rejection<'a> {
    index: usize,
    op: &'a str,
    error: String,
    kind: ErrorKind,
}

/// End-of-replay state.
#[derive(Debug, Serialize)]
struct Summary {
    now: u64,
    owner: Address,
    active_locks: usize,
    total_locked: Amount,
    total_shares: Shares,
    total_received: Amount,
    total_released: Amount,
    reward_supply: Amount,
    payees: Vec<PayeeLine>,
}

#[derive(Debug, Serialize)]
struct PayeeLine {
    address: Address,
    shares: Shares,
    released: Amount,
    pending: Amount,
}

type SimFarm = YieldFarm<MemoryToken, MemoryToken, ManualClock>;

pub struct Simulation {
    farm: SimFarm,
    clock: ManualClock,
}

impl Simulation {
    /// Build a farm from `config` with fresh ledgers.
    pub fn deploy(config: &FarmConfig, clock: ManualClock) -> Result<Self> {
        let params = config.params()?;
        let accepted = MemoryToken::new("Accepted Token", "ACC");
        let reward = MemoryToken::with_minter(
            config.token.name.clone(),
            config.token.symbol.clone(),
            config.farm_address,
        );
        let farm = YieldFarm::new(
            config.farm_address,
            config.owner,
            accepted,
            reward,
            clock.clone(),
            params,
            &config.payee_pairs(),
        )
        .context("Failed to deploy farm")?;
        Ok(Self { farm, clock })
    }

    /// Apply one operation and return the lines to print: one per signal,
    /// or a single rejection line.
    pub fn step(&mut self, index: usize, op: &Op) -> Result<Vec<String>> {
        debug!(index, ?op, "applying");
        if let Err(e) = self.apply(op) {
            warn!(index, error = %e, "operation rejected");
            let rejection = Rejection {
                index,
                op: op.name(),
                error: e.to_string(),
                kind: e.kind(),
            };
            return Ok(vec![serde_json::to_string(&rejection)?]);
        }
        let mut lines = Vec::new();
        for event in self.farm.drain_events() {
            lines.push(serde_json::to_string(&event)?);
        }
        Ok(lines)
    }

    fn apply(&mut self, op: &Op) -> Result<(), FarmError> {
        let farm_address = self.farm.address();
        match op {
            Op::Mint { to, amount } => self.farm.accepted_token_mut().mint_to(to, *amount)?,
            Op::Approve { owner, amount } => {
                self.farm
                    .accepted_token_mut()
                    .approve(owner, &farm_address, *amount)?
            }
            Op::Deposit { caller, amount } => self.farm.deposit(caller, *amount)?,
            Op::Advance { secs } => self.clock.advance(*secs),
            Op::ReleaseTokens { caller } => {
                self.farm.release_tokens(caller)?;
            }
            Op::ReleasePayment { account } => {
                self.farm.release_payment(account)?;
            }
            Op::ApproveReward { owner, amount } => {
                self.farm
                    .reward_token_mut()
                    .approve(owner, &farm_address, *amount)?
            }
            Op::Burn { caller, amount } => self.farm.burn(caller, *amount)?,
            Op::TransferShares { caller, to, amount } => {
                self.farm.transfer_shares(caller, to, *amount)?
            }
            Op::UpdatePayee { caller, account, shares } => {
                self.farm.update_payee(caller, account, *shares)?
            }
            Op::RemovePayee { caller, account } => self.farm.remove_payee(caller, account)?,
            Op::TransferOwnership { caller, new_owner } => {
                self.farm.transfer_ownership(caller, *new_owner)?
            }
        }
        Ok(())
    }

    /// Final farm state as one JSON line.
    pub fn summary(&self) -> Result<String> {
        let payees = self
            .farm
            .payees()
            .iter()
            .map(|address| PayeeLine {
                address: *address,
                shares: self.farm.shares(address),
                released: self.farm.released(address),
                pending: self.farm.pending_payment(address),
            })
            .collect();
        let summary = Summary {
            now: self.farm.now(),
            owner: self.farm.owner(),
            active_locks: self.farm.active_locks(),
            total_locked: self.farm.total_locked(),
            total_shares: self.farm.total_shares(),
            total_received: self.farm.total_received(),
            total_released: self.farm.total_released(),
            reward_supply: self.farm.reward_token().total_supply(),
            payees,
        };
        Ok(serde_json::to_string(&summary)?)
    }
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Approve { .. } => "approve",
            Self::Deposit { .. } => "deposit",
            Self::Advance { .. } => "advance",
            Self::ReleaseTokens { .. } => "release_tokens",
            Self::ReleasePayment { .. } => "release_payment",
            Self::ApproveReward { .. } => "approve_reward",
            Self::Burn { .. } => "burn",
            Self::TransferShares { .. } => "transfer_shares",
            Self::UpdatePayee { .. } => "update_payee",
            Self::RemovePayee { .. } => "remove_payee",
            Self::TransferOwnership { .. } => "transfer_ownership",
        }
    }
}
