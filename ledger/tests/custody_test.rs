//! Integration tests for the ledger/vault trust boundary.
//!
//! The custody invariants: the vault releases value only to its wired
//! caller, the sum of open stakes never exceeds what the vault holds,
//! and the interest pool can never go negative -- a settlement that would
//! overdraw it fails without touching anything.

use chrono::{Duration, Utc};
use chronostake_ledger::{AccountId, Ledger, LedgerError, StakeConfig, Vault, VaultError};

const ONE: u64 = 1_000_000_000_000_000_000;

fn owner() -> AccountId {
    AccountId::from("deployer")
}

fn ledger_id() -> AccountId {
    AccountId::from("ledger")
}

fn deploy_with_pool(pool: u64) -> Ledger {
    let config = StakeConfig::from_percent(1, 5, 10, 15).unwrap();
    let mut ledger = Ledger::new(ledger_id(), owner(), config);
    ledger
        .set_treasury(&owner(), Vault::new(owner(), ledger_id()))
        .unwrap();
    if pool > 0 {
        ledger.deposit_interest(&owner(), pool).unwrap();
    }
    ledger
}

// ---------------------------------------------------------------------------
// Authorization boundary
// ---------------------------------------------------------------------------

#[test]
fn vault_only_obeys_its_wired_caller() {
    let mut vault = Vault::new(owner(), ledger_id());
    vault.receive(ONE).unwrap();

    for intruder in ["deployer", "addr1", "ledger-2", ""] {
        let result = vault.release(&AccountId::from(intruder), 1);
        assert!(
            matches!(result, Err(VaultError::Unauthorized { .. })),
            "vault obeyed {intruder:?}"
        );
    }
    assert_eq!(vault.held(), ONE);

    assert!(vault.release(&ledger_id(), ONE).is_ok());
    assert_eq!(vault.held(), 0);
}

#[test]
fn miswired_treasury_fails_settlement_atomically() {
    // Treasury wired to some other ledger's identity: staking still pays
    // custody in (deposits are unconditional), but settlement cannot pull
    // the principal back out, and must change nothing when it fails.
    let config = StakeConfig::from_percent(1, 5, 10, 15).unwrap();
    let mut ledger = Ledger::new(ledger_id(), owner(), config);
    ledger
        .set_treasury(&owner(), Vault::new(owner(), AccountId::from("ledger-2")))
        .unwrap();
    ledger.deposit_interest(&owner(), ONE).unwrap();

    let alice = AccountId::from("alice");
    ledger.receive(&alice, ONE).unwrap();
    let start = Utc::now();
    ledger.stake_at(&alice, ONE, start).unwrap();

    let result = ledger.unstake_at(&alice, start + Duration::seconds(10));
    assert!(matches!(
        result,
        Err(LedgerError::Vault(VaultError::Unauthorized { .. }))
    ));

    // Nothing moved.
    assert_eq!(ledger.balance_of(&alice), 0);
    assert_eq!(ledger.available_interest(), ONE);
    assert_eq!(ledger.treasury().unwrap().held(), ONE);
    assert!(ledger.stake_of(&alice).is_some());
}

// ---------------------------------------------------------------------------
// Custody conservation
// ---------------------------------------------------------------------------

#[test]
fn custody_always_covers_open_stakes() {
    let mut ledger = deploy_with_pool(ONE);
    let t0 = Utc::now();

    let users: Vec<AccountId> = (0..5)
        .map(|i| AccountId::new(format!("user-{i}")))
        .collect();

    for (i, user) in users.iter().enumerate() {
        ledger.receive(user, ONE).unwrap();
        ledger
            .stake_at(user, ONE / (i as u64 + 1), t0)
            .unwrap();
        assert!(ledger.total_staked() <= ledger.treasury().unwrap().held());
    }

    // Settle a few and keep checking the invariant.
    for user in users.iter().take(3) {
        ledger
            .unstake_at(user, t0 + Duration::seconds(5))
            .unwrap();
        assert!(ledger.total_staked() <= ledger.treasury().unwrap().held());
    }

    // With no outside deposits into the vault, the two are exactly equal.
    assert_eq!(ledger.total_staked(), ledger.treasury().unwrap().held());
}

#[test]
fn outside_custody_deposits_do_not_break_accounting() {
    // Anyone can pay into the vault directly; the ledger's stakes are
    // still fully covered and settlements still release exact principals.
    let config = StakeConfig::from_percent(1, 5, 10, 15).unwrap();
    let mut ledger = Ledger::new(ledger_id(), owner(), config);

    // A stray donation lands in custody before the vault is even installed.
    let mut vault = Vault::new(owner(), ledger_id());
    vault.receive(12_345).unwrap();
    ledger.set_treasury(&owner(), vault).unwrap();
    ledger.deposit_interest(&owner(), ONE).unwrap();

    let alice = AccountId::from("alice");
    ledger.receive(&alice, ONE).unwrap();
    let start = Utc::now();
    ledger.stake_at(&alice, ONE, start).unwrap();

    assert!(ledger.total_staked() <= ledger.treasury().unwrap().held());

    let settlement = ledger
        .unstake_at(&alice, start + Duration::seconds(5))
        .unwrap();
    assert_eq!(settlement.principal, ONE);
    // The donation stays behind; only the principal was recalled.
    assert_eq!(ledger.treasury().unwrap().held(), 12_345);
}

// ---------------------------------------------------------------------------
// Interest pool floor
// ---------------------------------------------------------------------------

#[test]
fn pool_never_overdrawn_even_by_one_unit() {
    // Pool is one smallest-unit short of the interest owed.
    let mut ledger = deploy_with_pool(ONE / 100 - 1);
    let alice = AccountId::from("alice");

    ledger.receive(&alice, ONE).unwrap();
    let start = Utc::now();
    ledger.stake_at(&alice, ONE, start).unwrap();

    let result = ledger.unstake_at(&alice, start + Duration::seconds(10));
    assert!(matches!(
        result,
        Err(LedgerError::InterestPoolExhausted { .. })
    ));
    assert_eq!(ledger.available_interest(), ONE / 100 - 1);

    // The principal-only band is still reachable: the pool shortfall only
    // blocks settlements that owe interest.
    let mut ledger = deploy_with_pool(0);
    ledger.receive(&alice, ONE).unwrap();
    let start = Utc::now();
    ledger.stake_at(&alice, ONE, start).unwrap();
    let settlement = ledger
        .unstake_at(&alice, start + Duration::seconds(5))
        .unwrap();
    assert_eq!(settlement.interest, 0);
}

#[test]
fn pool_is_segregated_from_balances() {
    let mut ledger = deploy_with_pool(ONE);
    let alice = AccountId::from("alice");

    // A withdrawal can never touch the pool, and pool funding can never
    // be withdrawn as a balance.
    assert!(ledger.withdraw(&owner()).is_err());

    ledger.receive(&alice, ONE).unwrap();
    let payout = ledger.withdraw(&alice).unwrap();
    assert_eq!(payout.amount, ONE);
    assert_eq!(ledger.available_interest(), ONE);
}
