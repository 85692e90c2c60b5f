//! End-to-end deployment scenarios.
//!
//! Each test deploys a fresh farm over in-memory ledgers and drives it the
//! way depositors, payees and the owner would, checking balances, signals
//! and rejection reasons.

use iftl_core::error::{ErrorKind, FarmError, SplitterError, TimeLockError};
use iftl_core::event::Event;
use iftl_core::traits::{FungibleToken, MintableToken};
use iftl_core::types::Address;
use iftl_tests::helpers::{
    GENESIS, SEED_BALANCE, addr, approve_and_deposit, deploy, farm_address, owner, params,
    snapshot, try_deploy,
};

const ALICE: u8 = 0xA1;
const BOB: u8 = 0xB0;
const CAROL: u8 = 0xC0;

fn three_payees() -> Vec<(Address, u128)> {
    vec![(addr(ALICE), 100), (addr(BOB), 100), (addr(CAROL), 100)]
}

// ----------------------------------------------------------------------------
// Deposit and release
// ----------------------------------------------------------------------------

#[test]
fn deposit_then_release_after_one_period() {
    let alice = addr(ALICE);
    let (mut farm, clock) = deploy(params(1_000_000_000_000, 1), &three_payees(), &[alice]);

    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    let lock = farm.my_time_lock(&alice).unwrap();
    assert_eq!(lock.principal, 1_000);
    assert_eq!(lock.release_time, GENESIS + 1);

    clock.advance(1);
    let reward = farm.release_tokens(&alice).unwrap();

    // 1000 * 1e12 / 1.0025
    assert_eq!(reward, 997_506_234_413_965);
    assert_eq!(
        farm.events(),
        &[
            Event::Deposited { depositor: alice, amount: 1_000 },
            Event::Released { releaser: alice, amount: 997_506_234_413_965 },
        ]
    );
    assert_eq!(farm.accepted_token().balance_of(&alice), SEED_BALANCE);
    assert_eq!(farm.reward_token().balance_of(&alice), reward);
    assert_eq!(farm.reward_token().balance_of(&farm_address()), reward);
    assert_eq!(farm.reward_token().total_supply(), 2 * reward);
    assert!(farm.my_time_lock(&alice).is_err());
}

#[test]
fn longer_hold_earns_less() {
    let alice = addr(ALICE);
    let bob = addr(BOB);
    let (mut farm, clock) = deploy(params(1_000_000, 1), &three_payees(), &[alice, bob]);

    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    approve_and_deposit(&mut farm, &bob, 1_000).unwrap();
    clock.advance(1);
    let early = farm.release_tokens(&alice).unwrap();
    clock.advance(100);
    let late = farm.release_tokens(&bob).unwrap();

    assert!(late < early);
}

#[test]
fn zero_multiplier_leaves_nothing_to_release() {
    let alice = addr(ALICE);
    let (mut farm, clock) = deploy(params(0, 1), &three_payees(), &[alice]);
    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    clock.advance(1);

    let before = snapshot(&farm, &[alice]);
    let err = farm.release_tokens(&alice).unwrap_err();
    assert_eq!(err, FarmError::TimeLock(TimeLockError::NoTokens));
    assert_eq!(err.kind(), ErrorKind::NothingDue);
    assert_eq!(err.to_string(), "no tokens to release");
    assert_eq!(snapshot(&farm, &[alice]), before);
}

#[test]
fn second_deposit_rejected_and_lock_unchanged() {
    let alice = addr(ALICE);
    let (mut farm, _) = deploy(params(1, 100), &three_payees(), &[alice]);
    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    let first = farm.my_time_lock(&alice).unwrap().clone();

    let err = approve_and_deposit(&mut farm, &alice, 500).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(
        err.to_string(),
        format!("token timelock already active for {alice}")
    );
    assert_eq!(farm.my_time_lock(&alice).unwrap(), &first);
    assert_eq!(farm.accepted_token().balance_of(&farm_address()), 1_000);
}

#[test]
fn release_before_maturity_keeps_escrow() {
    let alice = addr(ALICE);
    let (mut farm, clock) = deploy(params(1, 10), &three_payees(), &[alice]);
    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    clock.advance(9);

    let err = farm.release_tokens(&alice).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TemporalViolation);
    assert_eq!(farm.total_locked(), 1_000);

    clock.advance(1);
    assert!(farm.release_tokens(&alice).is_ok());
    assert_eq!(farm.total_locked(), 0);
}

#[test]
fn redeposit_after_release() {
    let alice = addr(ALICE);
    let (mut farm, clock) = deploy(params(1, 1), &three_payees(), &[alice]);
    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    clock.advance(1);
    farm.release_tokens(&alice).unwrap();

    approve_and_deposit(&mut farm, &alice, 2_000).unwrap();
    assert_eq!(farm.my_time_lock(&alice).unwrap().principal, 2_000);
}

// ----------------------------------------------------------------------------
// Payment splitting
// ----------------------------------------------------------------------------

#[test]
fn equal_payees_split_pool() {
    let (mut farm, _) = deploy(params(1, 1), &three_payees(), &[]);
    // The farm is the reward minter; fund the pool directly.
    farm.reward_token_mut()
        .mint(&farm_address(), &farm_address(), 1_000)
        .unwrap();

    assert_eq!(farm.total_received(), 1_000);
    let paid = farm.release_payment(&addr(ALICE)).unwrap();
    assert_eq!(paid, 333);
    assert_eq!(farm.reward_token().balance_of(&addr(ALICE)), 333);
    assert_eq!(farm.released(&addr(ALICE)), 333);
    assert_eq!(farm.total_released(), 333);
    assert_eq!(
        farm.events(),
        &[Event::PaymentReleased { account: addr(ALICE), amount: 333 }]
    );

    // Entitlement is measured against everything received, not the balance.
    assert_eq!(farm.pending_payment(&addr(BOB)), 333);
    assert_eq!(farm.release_payment(&addr(BOB)).unwrap(), 333);

    let err = farm.release_payment(&addr(ALICE)).unwrap_err();
    assert_eq!(
        err,
        FarmError::Splitter(SplitterError::NothingDue(addr(ALICE)))
    );
}

#[test]
fn unequal_shares_split_proportionally() {
    let payees = [(addr(ALICE), 1), (addr(BOB), 3)];
    let (mut farm, _) = deploy(params(1, 1), &payees, &[]);
    farm.reward_token_mut()
        .mint(&farm_address(), &farm_address(), 1_000)
        .unwrap();

    assert_eq!(farm.release_payment(&addr(ALICE)).unwrap(), 250);
    assert_eq!(farm.release_payment(&addr(BOB)).unwrap(), 750);
    assert_eq!(farm.reward_token().balance_of(&farm_address()), 0);
}

#[test]
fn pool_fills_from_releases() {
    let alice = addr(ALICE);
    let (mut farm, clock) = deploy(params(1, 1), &three_payees(), &[alice]);
    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    clock.advance(1);
    let reward = farm.release_tokens(&alice).unwrap();

    assert_eq!(farm.total_received(), reward);
    assert_eq!(farm.pending_payment(&addr(CAROL)), reward / 3);
}

#[test]
fn transferring_one_share_adds_payee() {
    let dave = addr(0xD0);
    let (mut farm, _) = deploy(params(1, 1), &three_payees(), &[]);

    farm.transfer_shares(&addr(ALICE), &dave, 1).unwrap();

    assert_eq!(
        farm.events(),
        &[
            Event::PayeeAdded { account: dave, shares: 1 },
            Event::SharesTransferred { from: addr(ALICE), to: dave, amount: 1 },
        ]
    );
    assert_eq!(farm.total_shares(), 300);
    assert_eq!(farm.shares(&addr(ALICE)), 99);
    assert_eq!(farm.shares(&dave), 1);
    assert_eq!(farm.payee_count(), 4);
}

#[test]
fn transferring_all_shares_removes_sender() {
    let (mut farm, _) = deploy(params(1, 1), &three_payees(), &[]);
    farm.transfer_shares(&addr(ALICE), &addr(BOB), 100).unwrap();

    assert_eq!(farm.payee_count(), 2);
    assert_eq!(farm.shares(&addr(BOB)), 200);
    assert_eq!(farm.total_shares(), 300);
    assert_eq!(
        farm.events(),
        &[
            Event::PayeeRemoved { account: addr(ALICE) },
            Event::SharesTransferred { from: addr(ALICE), to: addr(BOB), amount: 100 },
        ]
    );
}

#[test]
fn transferring_more_than_held_rejected() {
    let (mut farm, _) = deploy(params(1, 1), &three_payees(), &[]);
    let before = snapshot(&farm, &[addr(ALICE), addr(BOB)]);
    let err = farm.transfer_shares(&addr(ALICE), &addr(BOB), 101).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientResource);
    assert_eq!(snapshot(&farm, &[addr(ALICE), addr(BOB)]), before);
}

#[test]
fn farm_never_becomes_a_payee() {
    let mut payees = three_payees();
    payees.push((farm_address(), 100));
    assert_eq!(
        try_deploy(params(1, 1), &payees, &[]).err(),
        Some(FarmError::Splitter(SplitterError::FarmAccount(farm_address())))
    );

    let alice = addr(ALICE);
    let (mut farm, clock) = deploy(params(1, 1), &three_payees(), &[alice]);
    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    clock.advance(1);
    let reward = farm.release_tokens(&alice).unwrap();

    let before = snapshot(&farm, &[alice]);
    let err = farm.transfer_shares(&alice, &farm_address(), 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(snapshot(&farm, &[alice]), before);

    // Every payee still gets exactly a third of the one reward.
    for who in [ALICE, BOB, CAROL] {
        farm.release_payment(&addr(who)).unwrap();
    }
    assert_eq!(farm.total_received(), reward);
    assert_eq!(farm.total_released(), reward / 3 * 3);
}

// ----------------------------------------------------------------------------
// Administration
// ----------------------------------------------------------------------------

#[test]
fn removing_last_payee_rejected() {
    let (mut farm, _) = deploy(params(1, 1), &[(addr(ALICE), 10)], &[]);
    let err = farm.remove_payee(&owner(), &addr(ALICE)).unwrap_err();
    assert_eq!(err, FarmError::Splitter(SplitterError::EmptyPayeeList));
    assert_eq!(farm.payees(), &[addr(ALICE)]);
    assert_eq!(farm.total_shares(), 10);
}

#[test]
fn owner_reweights_payees() {
    let (mut farm, _) = deploy(params(1, 1), &three_payees(), &[]);
    farm.update_payee(&owner(), &addr(BOB), 300).unwrap();
    farm.update_payee(&owner(), &addr(CAROL), 0).unwrap();

    assert_eq!(farm.total_shares(), 400);
    assert_eq!(farm.payee_count(), 2);
    assert_eq!(
        farm.events(),
        &[
            Event::PayeeUpdated { account: addr(BOB), delta: 200 },
            Event::PayeeRemoved { account: addr(CAROL) },
        ]
    );

    farm.reward_token_mut()
        .mint(&farm_address(), &farm_address(), 400)
        .unwrap();
    assert_eq!(farm.release_payment(&addr(BOB)).unwrap(), 300);
}

#[test]
fn strangers_cannot_administer() {
    let (mut farm, _) = deploy(params(1, 1), &three_payees(), &[]);
    let before = snapshot(&farm, &[addr(ALICE)]);

    for err in [
        farm.update_payee(&addr(ALICE), &addr(ALICE), 1).unwrap_err(),
        farm.remove_payee(&addr(ALICE), &addr(BOB)).unwrap_err(),
        farm.transfer_ownership(&addr(ALICE), addr(ALICE)).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }
    assert_eq!(snapshot(&farm, &[addr(ALICE)]), before);
}

#[test]
fn burn_through_farm() {
    let alice = addr(ALICE);
    let (mut farm, clock) = deploy(params(1, 1), &three_payees(), &[alice]);
    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    clock.advance(1);
    let reward = farm.release_tokens(&alice).unwrap();

    farm.reward_token_mut()
        .approve(&alice, &farm_address(), reward)
        .unwrap();
    farm.burn(&alice, reward).unwrap();
    assert_eq!(farm.reward_token().balance_of(&alice), 0);
    assert_eq!(farm.reward_token().total_supply(), reward);
}

// ----------------------------------------------------------------------------
// Signals
// ----------------------------------------------------------------------------

#[test]
fn signals_serialize_as_tagged_json() {
    let alice = addr(ALICE);
    let (mut farm, clock) = deploy(params(1, 1), &three_payees(), &[alice]);
    approve_and_deposit(&mut farm, &alice, 1_000).unwrap();
    clock.advance(1);
    farm.release_tokens(&alice).unwrap();

    let lines: Vec<String> = farm
        .drain_events()
        .iter()
        .map(|e| serde_json::to_string(e).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"event\":\"deposited\""));
    assert!(lines[1].contains("\"event\":\"released\""));
    assert!(farm.events().is_empty());
}
