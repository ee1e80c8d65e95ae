//! # Staking Ledger
//!
//! The [`Ledger`] owns all user-facing accounting: free balances, active
//! stake records, and the interest pool. It is the sole authorized caller
//! of the custody [`Vault`] it forwards staked principal to.
//!
//! ## State machine
//!
//! Per account: `NoStake -> (stake) -> Active -> (unstake) -> NoStake`.
//! A second `stake` while one is active is rejected, and `unstake` has
//! exactly three outcomes depending on elapsed time -- principal only,
//! principal plus full interest, or a rejection (`TooEarly` before the
//! minimum hold, `WindowExpired` after the withdrawal period closes).
//!
//! ## Atomicity and ordering
//!
//! Every operation validates completely before mutating anything; a failed
//! call leaves balances, stake records, the pool, and custody untouched.
//! Outward value movement follows internal mutation (checks, then effects,
//! then interactions): `withdraw` zeroes the balance before the [`Payout`]
//! receipt that drives the external transfer exists, so a reentrant caller
//! can never observe a stale positive balance.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::account::AccountId;
use crate::config::StakeConfig;
use crate::interest;
use crate::vault::{Vault, VaultError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The caller lacks the required role for a restricted operation.
    #[error("caller {caller} is not the ledger owner")]
    Unauthorized {
        /// The identity that attempted the operation.
        caller: AccountId,
    },

    /// Zero-amount operations are rejected rather than silently ignored;
    /// they never create phantom balance.
    #[error("zero-amount operations are not permitted")]
    ZeroAmount,

    /// A withdrawal or stake exceeds the caller's free balance.
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// The caller's current free balance.
        available: u64,
        /// The amount the operation needed.
        requested: u64,
    },

    /// The account already has an open stake. One active stake per account.
    #[error("a stake is already active for this account")]
    StakeAlreadyActive,

    /// `unstake` was called with no open stake to settle.
    #[error("no active stake for this account")]
    NoActiveStake,

    /// No custody vault has been installed via `set_treasury`.
    #[error("no treasury vault has been configured")]
    TreasuryNotConfigured,

    /// The minimum hold has not elapsed yet.
    #[error("you can't unstake yet: {elapsed_secs}s elapsed, minimum hold {min_secs}s")]
    TooEarly {
        /// Seconds elapsed since the stake started.
        elapsed_secs: u64,
        /// The configured minimum hold.
        min_secs: u64,
    },

    /// The withdrawal window has closed.
    #[error("unstake period exceeded: {elapsed_secs}s elapsed, window closed at {end_secs}s")]
    WindowExpired {
        /// Seconds elapsed since the stake started.
        elapsed_secs: u64,
        /// The configured end of the withdrawal period.
        end_secs: u64,
    },

    /// The interest pool cannot cover the interest owed. The stake stays
    /// active so the user can retry once the pool is funded.
    #[error("interest pool exhausted: available {available}, required {required}")]
    InterestPoolExhausted {
        /// Funds currently in the pool.
        available: u64,
        /// Interest the settlement would have paid.
        required: u64,
    },

    /// `principal * rate / RATE_SCALE` does not fit in a `u64`.
    #[error("interest overflow: principal {principal} at rate {rate}")]
    InterestOverflow {
        /// The principal being settled.
        principal: u64,
        /// The configured fixed-point rate.
        rate: u64,
    },

    /// A balance or pool credit would exceed `u64::MAX`.
    #[error("balance overflow: current {current}, credit {credit}")]
    BalanceOverflow {
        /// The value before the failed credit.
        current: u64,
        /// The credit that caused the overflow.
        credit: u64,
    },

    /// A custody operation failed.
    #[error("custody error: {0}")]
    Vault(#[from] VaultError),
}

// ---------------------------------------------------------------------------
// Records and receipts
// ---------------------------------------------------------------------------

/// An open stake: the committed principal and when it started.
///
/// At most one exists per account at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// The staked amount, exclusive of interest, in smallest units.
    pub principal: u64,
    /// When the stake was opened. Elapsed time is measured from here.
    pub started_at: DateTime<Utc>,
}

/// Receipt for a completed withdrawal.
///
/// By the time a `Payout` exists, the caller's balance is already zeroed;
/// the embedding system performs the actual outward transfer from this
/// receipt, strictly after the internal state change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payout {
    /// Unique id for this payout.
    pub id: Uuid,
    /// The account the value is owed to.
    pub to: AccountId,
    /// The full withdrawn amount in smallest units.
    pub amount: u64,
    /// When the withdrawal was executed.
    pub timestamp: DateTime<Utc>,
}

/// Receipt for a settled unstake.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique id for this settlement.
    pub id: Uuid,
    /// The account whose stake was settled.
    pub account: AccountId,
    /// The principal recalled from custody.
    pub principal: u64,
    /// The interest paid out of the pool (zero in the principal-only band).
    pub interest: u64,
    /// Elapsed seconds the settlement was evaluated at.
    pub elapsed_secs: u64,
    /// The account's free balance after crediting principal + interest.
    pub new_balance: u64,
    /// When the settlement was executed.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The staking ledger: balances, stakes, interest pool, and custody link.
///
/// Mutating operations take `&mut self`; serializing them is the caller's
/// job ([`StakingService`](crate::service::StakingService) wraps a ledger
/// in a `parking_lot::RwLock` for concurrent deployments). Each public
/// operation with time-dependent behavior has an `_at` variant taking an
/// explicit timestamp so embedders and tests control the clock; the plain
/// variant reads `Utc::now()`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    /// This ledger's own identity, presented to the vault on release calls.
    id: AccountId,

    /// The identity allowed to fund the pool and install the treasury.
    owner: AccountId,

    /// Immutable staking parameters.
    config: StakeConfig,

    /// Free (withdrawable) balances per account.
    balances: HashMap<AccountId, u64>,

    /// Open stakes per account. At most one entry per account.
    stakes: HashMap<AccountId, StakeRecord>,

    /// Funds set aside to pay interest. Never commingled with balances.
    available_interest: u64,

    /// The custody vault staked principal is forwarded to.
    treasury: Option<Vault>,
}

impl Ledger {
    /// Creates a ledger with no balances, no stakes, an empty pool, and
    /// no treasury installed yet.
    pub fn new(id: AccountId, owner: AccountId, config: StakeConfig) -> Self {
        Self {
            id,
            owner,
            config,
            balances: HashMap::new(),
            stakes: HashMap::new(),
            available_interest: 0,
            treasury: None,
        }
    }

    // -----------------------------------------------------------------------
    // Deposits and withdrawals
    // -----------------------------------------------------------------------

    /// Credits an inbound transfer to `from`'s free balance.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] for a zero transfer and
    /// [`LedgerError::BalanceOverflow`] if the credit would exceed
    /// `u64::MAX`.
    pub fn receive(&mut self, from: &AccountId, amount: u64) -> Result<u64, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let balance = self.balances.entry(from.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                current: *balance,
                credit: amount,
            })?;

        Ok(*balance)
    }

    /// Withdraws the caller's entire free balance.
    pub fn withdraw(&mut self, caller: &AccountId) -> Result<Payout, LedgerError> {
        self.withdraw_at(caller, Utc::now())
    }

    /// Deterministic variant of [`withdraw`](Self::withdraw).
    ///
    /// The balance is zeroed before the [`Payout`] receipt exists, so no
    /// reentrant caller can observe a stale positive balance while the
    /// outward transfer is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] if there is nothing to
    /// withdraw.
    pub fn withdraw_at(
        &mut self,
        caller: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Payout, LedgerError> {
        let amount = self.balance_of(caller);
        if amount == 0 {
            return Err(LedgerError::InsufficientFunds {
                available: 0,
                requested: 0,
            });
        }
        self.balances.remove(caller);

        Ok(Payout {
            id: Uuid::new_v4(),
            to: caller.clone(),
            amount,
            timestamp: now,
        })
    }

    /// Funds the interest pool. Owner-restricted.
    ///
    /// Returns the new pool total.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unauthorized`] for any caller other than the
    /// owner, [`LedgerError::ZeroAmount`] for a zero deposit, and
    /// [`LedgerError::BalanceOverflow`] on pool overflow.
    pub fn deposit_interest(
        &mut self,
        caller: &AccountId,
        amount: u64,
    ) -> Result<u64, LedgerError> {
        self.require_owner(caller)?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        self.available_interest = self
            .available_interest
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                current: self.available_interest,
                credit: amount,
            })?;

        Ok(self.available_interest)
    }

    /// Installs the custody vault staked principal is forwarded to.
    /// Owner-restricted; last write wins.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unauthorized`] for any caller other than the
    /// owner.
    pub fn set_treasury(&mut self, caller: &AccountId, vault: Vault) -> Result<(), LedgerError> {
        self.require_owner(caller)?;
        self.treasury = Some(vault);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Staking
    // -----------------------------------------------------------------------

    /// Commits `amount` of the caller's free balance to a stake.
    pub fn stake(&mut self, caller: &AccountId, amount: u64) -> Result<StakeRecord, LedgerError> {
        self.stake_at(caller, amount, Utc::now())
    }

    /// Deterministic variant of [`stake`](Self::stake).
    ///
    /// Debits the free balance, forwards the exact amount into custody,
    /// and records the stake with `now` as its start.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`], [`LedgerError::StakeAlreadyActive`],
    /// [`LedgerError::TreasuryNotConfigured`], or
    /// [`LedgerError::InsufficientFunds`]; on any failure no state changes.
    pub fn stake_at(
        &mut self,
        caller: &AccountId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<StakeRecord, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if self.stakes.contains_key(caller) {
            return Err(LedgerError::StakeAlreadyActive);
        }

        let available = self.balance_of(caller);
        if amount > available {
            return Err(LedgerError::InsufficientFunds {
                available,
                requested: amount,
            });
        }

        let remainder = available - amount;
        let treasury = self
            .treasury
            .as_mut()
            .ok_or(LedgerError::TreasuryNotConfigured)?;

        // Custody first: the only way receive can fail is overflow, and at
        // that point nothing else has been touched.
        treasury.receive(amount)?;

        // Infallible from here on.
        self.balances.insert(caller.clone(), remainder);

        let record = StakeRecord {
            principal: amount,
            started_at: now,
        };
        self.stakes.insert(caller.clone(), record);

        Ok(record)
    }

    /// Settles the caller's open stake.
    pub fn unstake(&mut self, caller: &AccountId) -> Result<Settlement, LedgerError> {
        self.unstake_at(caller, Utc::now())
    }

    /// Deterministic variant of [`unstake`](Self::unstake).
    ///
    /// Evaluates the time bands at `now`, recalls the principal from
    /// custody, debits the pool by the interest owed, and credits
    /// `principal + interest` to the free balance.
    ///
    /// Every check runs before any mutation: a rejected settlement leaves
    /// the stake record, the pool, and custody exactly as they were.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoActiveStake`], [`LedgerError::TooEarly`],
    /// [`LedgerError::WindowExpired`], [`LedgerError::InterestPoolExhausted`],
    /// [`LedgerError::TreasuryNotConfigured`], or a propagated
    /// [`VaultError`](crate::vault::VaultError).
    pub fn unstake_at(
        &mut self,
        caller: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Settlement, LedgerError> {
        let record = self
            .stakes
            .get(caller)
            .copied()
            .ok_or(LedgerError::NoActiveStake)?;

        let elapsed_secs = elapsed_seconds(record.started_at, now);
        let interest = interest::interest_due(&self.config, record.principal, elapsed_secs)?;

        if interest > self.available_interest {
            return Err(LedgerError::InterestPoolExhausted {
                available: self.available_interest,
                required: interest,
            });
        }

        let credit =
            record
                .principal
                .checked_add(interest)
                .ok_or(LedgerError::BalanceOverflow {
                    current: record.principal,
                    credit: interest,
                })?;
        let current = self.balance_of(caller);
        let new_balance = current
            .checked_add(credit)
            .ok_or(LedgerError::BalanceOverflow { current, credit })?;

        let ledger_id = self.id.clone();
        let treasury = self
            .treasury
            .as_mut()
            .ok_or(LedgerError::TreasuryNotConfigured)?;

        // Last fallible step. A release failure (wrong wiring, custody
        // shortfall) aborts with all ledger state untouched.
        treasury.release(&ledger_id, record.principal)?;

        self.available_interest -= interest;
        self.balances.insert(caller.clone(), new_balance);
        self.stakes.remove(caller);

        Ok(Settlement {
            id: Uuid::new_v4(),
            account: caller.clone(),
            principal: record.principal,
            interest,
            elapsed_secs,
            new_balance,
            timestamp: now,
        })
    }

    /// Pure estimation query: the interest `unstake` would pay on `amount`
    /// at `elapsed_secs`, or the rejection it would report.
    ///
    /// Delegates to the same [`crate::interest`] routine the settlement
    /// path uses, so the two agree bit for bit.
    pub fn calculate_interest(&self, amount: u64, elapsed_secs: u64) -> Result<u64, LedgerError> {
        interest::interest_due(&self.config, amount, elapsed_secs)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns an account's free balance (zero for unknown accounts).
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Returns an account's open stake, if any.
    pub fn stake_of(&self, account: &AccountId) -> Option<StakeRecord> {
        self.stakes.get(account).copied()
    }

    /// Returns the current interest pool total.
    pub fn available_interest(&self) -> u64 {
        self.available_interest
    }

    /// Sum of all open stakes' principal. Never exceeds the treasury's
    /// held total when bookkeeping is correct.
    pub fn total_staked(&self) -> u64 {
        self.stakes.values().map(|record| record.principal).sum()
    }

    /// Returns the installed custody vault, if any.
    pub fn treasury(&self) -> Option<&Vault> {
        self.treasury.as_ref()
    }

    /// Returns this ledger's identity.
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Returns the owning identity.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Returns the staking parameters.
    pub fn config(&self) -> &StakeConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn require_owner(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if caller != &self.owner {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }
}

/// Elapsed whole seconds between a stake's start and `now`.
///
/// Clamped at zero: the reference clock is monotonically non-decreasing,
/// so a negative difference can only mean skew between two wall-clock
/// reads, and a stake can never be "younger than new".
fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - started_at).num_seconds().max(0) as u64
}
