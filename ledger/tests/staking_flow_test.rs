//! Integration tests for the full staking lifecycle.
//!
//! These exercise the deployment wiring and the reference scenario:
//! 1% interest, a 5 second minimum hold, full interest from 10 seconds,
//! and a withdrawal window that closes after 15 seconds, with a one-unit
//! interest pool. Time is injected through the `_at` variants so every
//! band boundary is hit exactly.

use chrono::{Duration, Utc};
use chronostake_ledger::{
    AccountId, Ledger, LedgerError, StakeConfig, Vault,
};

/// One whole unit in smallest units (1 ether = 10^18 wei in the reference
/// deployment).
const ONE: u64 = 1_000_000_000_000_000_000;

fn owner() -> AccountId {
    AccountId::from("deployer")
}

fn ledger_id() -> AccountId {
    AccountId::from("ledger")
}

fn user() -> AccountId {
    AccountId::from("addr1")
}

/// Helper: constructs the two components, wires the treasury, and seeds
/// the interest pool -- the deployment flow the orchestration layer runs.
fn deploy() -> Ledger {
    let config = StakeConfig::from_percent(1, 5, 10, 15).expect("fixture config is valid");
    let mut ledger = Ledger::new(ledger_id(), owner(), config);

    let treasury = Vault::new(owner(), ledger_id());
    assert_eq!(treasury.allowed_caller(), Some(&ledger_id()));

    ledger.set_treasury(&owner(), treasury).unwrap();
    ledger.deposit_interest(&owner(), ONE).unwrap();
    ledger
}

// ---------------------------------------------------------------------------
// Deployment
// ---------------------------------------------------------------------------

#[test]
fn deployment_records_parameters() {
    let ledger = deploy();
    let config = ledger.config();

    assert_eq!(config.interest_rate, 10_000_000); // 1% at RATE_SCALE
    assert_eq!(config.min_stake_secs, 5);
    assert_eq!(config.max_stake_secs, 10);
    assert_eq!(config.withdrawal_period_ends_secs, 15);
    assert_eq!(ledger.available_interest(), ONE);
}

#[test]
fn treasury_is_wired_to_the_ledger() {
    let ledger = deploy();
    let treasury = ledger.treasury().expect("treasury installed");
    assert_eq!(treasury.allowed_caller(), Some(ledger.id()));
    assert_eq!(treasury.held(), 0);
}

// ---------------------------------------------------------------------------
// Reference scenario
// ---------------------------------------------------------------------------

#[test]
fn deposit_then_withdraw_round_trips() {
    let mut ledger = deploy();

    ledger.receive(&user(), ONE).unwrap();
    assert_eq!(ledger.balance_of(&user()), ONE);

    let payout = ledger.withdraw(&user()).unwrap();
    assert_eq!(payout.amount, ONE);
    assert_eq!(ledger.balance_of(&user()), 0);
}

#[test]
fn stake_moves_exactly_the_principal_into_custody() {
    let mut ledger = deploy();

    ledger.receive(&user(), ONE).unwrap();
    ledger.stake(&user(), ONE).unwrap();

    assert_eq!(ledger.stake_of(&user()).unwrap().principal, ONE);
    assert_eq!(ledger.treasury().unwrap().held(), ONE);
    assert_eq!(ledger.balance_of(&user()), 0);
}

#[test]
fn cannot_unstake_immediately() {
    let mut ledger = deploy();
    ledger.receive(&user(), ONE).unwrap();

    let start = Utc::now();
    ledger.stake_at(&user(), ONE, start).unwrap();

    let result = ledger.unstake_at(&user(), start);
    assert!(matches!(result, Err(LedgerError::TooEarly { .. })));
    assert_eq!(
        result.unwrap_err().to_string(),
        "you can't unstake yet: 0s elapsed, minimum hold 5s"
    );
}

#[test]
fn unstake_after_five_seconds_returns_principal() {
    let mut ledger = deploy();
    ledger.receive(&user(), ONE).unwrap();

    let start = Utc::now();
    ledger.stake_at(&user(), ONE, start).unwrap();
    ledger
        .unstake_at(&user(), start + Duration::seconds(5))
        .unwrap();

    assert!(ledger.stake_of(&user()).is_none());
    assert_eq!(ledger.treasury().unwrap().held(), 0);
    // Balance is back to exactly what went in; no interest this early.
    assert_eq!(ledger.balance_of(&user()), ONE);
}

#[test]
fn unstake_after_ten_seconds_pays_full_interest() {
    let mut ledger = deploy();
    ledger.receive(&user(), ONE).unwrap();

    let start = Utc::now();
    ledger.stake_at(&user(), ONE, start).unwrap();
    ledger
        .unstake_at(&user(), start + Duration::seconds(10))
        .unwrap();

    // 1.01 units, the reference fixture's expected balance.
    assert_eq!(ledger.balance_of(&user()), 1_010_000_000_000_000_000);
    assert_eq!(ledger.available_interest(), ONE - ONE / 100);
}

#[test]
fn unstake_after_sixteen_seconds_is_refused() {
    let mut ledger = deploy();
    ledger.receive(&user(), ONE).unwrap();

    let start = Utc::now();
    ledger.stake_at(&user(), ONE, start).unwrap();

    let result = ledger.unstake_at(&user(), start + Duration::seconds(16));
    assert_eq!(
        result.unwrap_err().to_string(),
        "unstake period exceeded: 16s elapsed, window closed at 15s"
    );
    // The principal is stranded in custody; the record remains active.
    assert_eq!(ledger.treasury().unwrap().held(), ONE);
    assert_eq!(ledger.stake_of(&user()).unwrap().principal, ONE);
}

// ---------------------------------------------------------------------------
// Re-staking after settlement
// ---------------------------------------------------------------------------

#[test]
fn fresh_stake_after_settlement_starts_a_new_window() {
    let mut ledger = deploy();
    ledger.receive(&user(), ONE).unwrap();

    let t0 = Utc::now();
    ledger.stake_at(&user(), ONE, t0).unwrap();
    ledger.unstake_at(&user(), t0 + Duration::seconds(5)).unwrap();

    // Second stake, opened later, is judged by its own start time.
    let t1 = t0 + Duration::seconds(60);
    ledger.stake_at(&user(), ONE, t1).unwrap();

    let result = ledger.unstake_at(&user(), t1 + Duration::seconds(2));
    assert!(matches!(result, Err(LedgerError::TooEarly { .. })));

    let settlement = ledger
        .unstake_at(&user(), t1 + Duration::seconds(10))
        .unwrap();
    assert_eq!(settlement.interest, ONE / 100);
}

#[test]
fn interest_pool_drains_across_settlements() {
    let mut ledger = deploy();
    let t0 = Utc::now();

    // 100 settlements at 1% of one unit each exactly empty a one-unit pool.
    for i in 0..100i64 {
        ledger.receive(&user(), ONE).unwrap();
        let start = t0 + Duration::seconds(i * 100);
        ledger.stake_at(&user(), ONE, start).unwrap();
        ledger
            .unstake_at(&user(), start + Duration::seconds(10))
            .unwrap();
        ledger.withdraw(&user()).unwrap();
    }
    assert_eq!(ledger.available_interest(), 0);

    // The 101st full-interest settlement finds the pool empty.
    ledger.receive(&user(), ONE).unwrap();
    let start = t0 + Duration::seconds(100_000);
    ledger.stake_at(&user(), ONE, start).unwrap();
    let result = ledger.unstake_at(&user(), start + Duration::seconds(10));
    assert!(matches!(
        result,
        Err(LedgerError::InterestPoolExhausted { available: 0, .. })
    ));
}

// ---------------------------------------------------------------------------
// Estimation agrees with settlement at every band
// ---------------------------------------------------------------------------

#[test]
fn estimation_matches_settlement_in_all_bands() {
    for elapsed in [5u64, 7, 9, 10, 12, 15] {
        let mut ledger = deploy();
        ledger.receive(&user(), ONE).unwrap();

        let predicted = ledger.calculate_interest(ONE, elapsed).unwrap();

        let start = Utc::now();
        ledger.stake_at(&user(), ONE, start).unwrap();
        let settlement = ledger
            .unstake_at(&user(), start + Duration::seconds(elapsed as i64))
            .unwrap();

        assert_eq!(
            settlement.interest, predicted,
            "estimate and settlement disagree at {elapsed}s"
        );
    }
}

#[test]
fn estimation_rejects_match_settlement_rejects() {
    let ledger = deploy();

    assert!(matches!(
        ledger.calculate_interest(ONE, 4),
        Err(LedgerError::TooEarly { .. })
    ));
    assert!(matches!(
        ledger.calculate_interest(ONE, 16),
        Err(LedgerError::WindowExpired { .. })
    ));
}
