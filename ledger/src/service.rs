//! # Staking Service
//!
//! A cloneable, thread-safe handle around a [`Ledger`] for deployments
//! where the ledger runs as a standalone concurrent service. The reference
//! execution model serializes every state-mutating operation globally,
//! including its nested custody call; this wrapper reproduces that
//! discipline with a single `parking_lot::RwLock` over the whole
//! balance/stake/pool state. Mutations hold the write lock for their full
//! duration, read-only queries share the read lock.
//!
//! The service layer is also where operations get logged. User-level
//! rejections are `warn`, committed operations are `info`, and a custody
//! shortfall -- unreachable with correct bookkeeping -- is `error`,
//! because it means the deployment itself is broken.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::account::AccountId;
use crate::config::StakeConfig;
use crate::ledger::{Ledger, LedgerError, Payout, Settlement, StakeRecord};
use crate::vault::{Vault, VaultError};

/// Shared handle to a staking ledger.
///
/// Clones are cheap and all refer to the same underlying state.
#[derive(Clone)]
pub struct StakingService {
    inner: Arc<RwLock<Ledger>>,
}

impl StakingService {
    /// Wraps a ledger for shared concurrent use.
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Credits an inbound transfer. See [`Ledger::receive`].
    pub fn receive(&self, from: &AccountId, amount: u64) -> Result<u64, LedgerError> {
        let result = self.inner.write().receive(from, amount);
        match &result {
            Ok(balance) => info!(%from, amount, balance, "deposit credited"),
            Err(e) => warn!(%from, amount, error = %e, "deposit rejected"),
        }
        result
    }

    /// Withdraws the caller's entire free balance. See [`Ledger::withdraw`].
    pub fn withdraw(&self, caller: &AccountId) -> Result<Payout, LedgerError> {
        let result = self.inner.write().withdraw(caller);
        match &result {
            Ok(payout) => info!(%caller, amount = payout.amount, payout_id = %payout.id, "withdrawal settled"),
            Err(e) => warn!(%caller, error = %e, "withdrawal rejected"),
        }
        result
    }

    /// Funds the interest pool. See [`Ledger::deposit_interest`].
    pub fn deposit_interest(&self, caller: &AccountId, amount: u64) -> Result<u64, LedgerError> {
        let result = self.inner.write().deposit_interest(caller, amount);
        match &result {
            Ok(pool) => info!(%caller, amount, pool, "interest pool funded"),
            Err(e) => warn!(%caller, amount, error = %e, "interest deposit rejected"),
        }
        result
    }

    /// Installs the custody vault. See [`Ledger::set_treasury`].
    pub fn set_treasury(&self, caller: &AccountId, vault: Vault) -> Result<(), LedgerError> {
        let result = self.inner.write().set_treasury(caller, vault);
        match &result {
            Ok(()) => info!(%caller, "treasury installed"),
            Err(e) => warn!(%caller, error = %e, "set_treasury rejected"),
        }
        result
    }

    /// Opens a stake at the current time. See [`Ledger::stake`].
    pub fn stake(&self, caller: &AccountId, amount: u64) -> Result<StakeRecord, LedgerError> {
        self.stake_at(caller, amount, Utc::now())
    }

    /// Opens a stake at an explicit time. See [`Ledger::stake_at`].
    pub fn stake_at(
        &self,
        caller: &AccountId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<StakeRecord, LedgerError> {
        let result = self.inner.write().stake_at(caller, amount, now);
        match &result {
            Ok(record) => {
                info!(%caller, principal = record.principal, started_at = %record.started_at, "stake opened")
            }
            Err(e) => warn!(%caller, amount, error = %e, "stake rejected"),
        }
        result
    }

    /// Settles a stake at the current time. See [`Ledger::unstake`].
    pub fn unstake(&self, caller: &AccountId) -> Result<Settlement, LedgerError> {
        self.unstake_at(caller, Utc::now())
    }

    /// Settles a stake at an explicit time. See [`Ledger::unstake_at`].
    pub fn unstake_at(
        &self,
        caller: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Settlement, LedgerError> {
        let result = self.inner.write().unstake_at(caller, now);
        match &result {
            Ok(settlement) => info!(
                %caller,
                principal = settlement.principal,
                interest = settlement.interest,
                elapsed_secs = settlement.elapsed_secs,
                "stake settled"
            ),
            Err(LedgerError::Vault(VaultError::InsufficientCustody { held, requested })) => {
                // Custody cannot come up short if the ledger's bookkeeping
                // is correct. This is a deployment bug, not a user error.
                error!(
                    %caller,
                    held,
                    requested,
                    "custody shortfall during settlement; ledger and vault disagree"
                );
            }
            Err(e) => warn!(%caller, error = %e, "unstake rejected"),
        }
        result
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns an account's free balance.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.inner.read().balance_of(account)
    }

    /// Returns an account's open stake, if any.
    pub fn stake_of(&self, account: &AccountId) -> Option<StakeRecord> {
        self.inner.read().stake_of(account)
    }

    /// Returns the current interest pool total.
    pub fn available_interest(&self) -> u64 {
        self.inner.read().available_interest()
    }

    /// Returns the amount currently held in custody, if a treasury is
    /// installed.
    pub fn custody_held(&self) -> Option<u64> {
        self.inner.read().treasury().map(Vault::held)
    }

    /// Pure estimation query. See [`Ledger::calculate_interest`].
    pub fn calculate_interest(&self, amount: u64, elapsed_secs: u64) -> Result<u64, LedgerError> {
        self.inner.read().calculate_interest(amount, elapsed_secs)
    }

    /// Returns a copy of the staking parameters.
    pub fn config(&self) -> StakeConfig {
        *self.inner.read().config()
    }

    /// Clones the full ledger state, e.g. for persistence.
    pub fn snapshot(&self) -> Ledger {
        self.inner.read().clone()
    }
}
