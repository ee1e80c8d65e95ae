//! # Custody Vault
//!
//! A segregated custody account for staked principal. The vault accepts
//! inbound value from anyone but releases it only to a single
//! pre-authorized caller -- in the intended deployment, the ledger
//! component. It keeps no per-depositor bookkeeping, only the running
//! total it holds: the ledger owns all user-facing accounting, and the
//! vault trusts its instructions completely once authorized.
//!
//! The dependency points one way. The vault knows nothing about stakes,
//! balances, or interest; it compares one [`AccountId`] against another
//! and moves value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The caller is not authorized for this operation.
    #[error("caller {caller} is not authorized to operate the vault")]
    Unauthorized {
        /// The identity that attempted the operation.
        caller: AccountId,
    },

    /// A release was requested for more than the vault holds.
    ///
    /// With correct ledger bookkeeping this is unreachable: the ledger only
    /// recalls principal it previously forwarded. Seeing it in practice
    /// means the deployment is broken, not that the user did something
    /// wrong. The service layer logs it at error level.
    #[error("insufficient custody: held {held}, requested {requested}")]
    InsufficientCustody {
        /// The amount currently in custody.
        held: u64,
        /// The amount the caller tried to release.
        requested: u64,
    },

    /// The custody total would exceed `u64::MAX`.
    #[error("custody overflow: held {held}, deposit {deposit}")]
    Overflow {
        /// The amount currently in custody.
        held: u64,
        /// The deposit that caused the overflow.
        deposit: u64,
    },
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// A custody account with exactly one authorized withdrawer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vault {
    /// The deploying identity, allowed to (re)point `allowed_caller`.
    owner: AccountId,

    /// The single identity permitted to release custody funds.
    ///
    /// `None` only between construction via [`Vault::unwired`] and the
    /// owner's `set_allowed_caller` call; a vault with no allowed caller
    /// releases nothing.
    allowed_caller: Option<AccountId>,

    /// Running total of value in custody, in smallest units.
    held: u64,
}

impl Vault {
    /// Creates a vault wired to its authorized caller at construction,
    /// the normal deployment flow.
    pub fn new(owner: AccountId, allowed_caller: AccountId) -> Self {
        Self {
            owner,
            allowed_caller: Some(allowed_caller),
            held: 0,
        }
    }

    /// Creates a vault with no authorized caller yet.
    ///
    /// Until the owner calls [`set_allowed_caller`](Self::set_allowed_caller),
    /// every release attempt fails.
    pub fn unwired(owner: AccountId) -> Self {
        Self {
            owner,
            allowed_caller: None,
            held: 0,
        }
    }

    /// Points the vault at its authorized caller. Owner-restricted.
    ///
    /// Intended to be called once at deployment; a later call re-points
    /// the authorization (last write wins).
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Unauthorized`] if `caller` is not the owner.
    pub fn set_allowed_caller(
        &mut self,
        caller: &AccountId,
        allowed: AccountId,
    ) -> Result<(), VaultError> {
        if caller != &self.owner {
            return Err(VaultError::Unauthorized {
                caller: caller.clone(),
            });
        }
        self.allowed_caller = Some(allowed);
        Ok(())
    }

    /// Accepts an inbound transfer unconditionally.
    ///
    /// Anyone may pay into custody; only the allowed caller can take out.
    /// Returns the new custody total.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the total would exceed `u64::MAX`.
    pub fn receive(&mut self, amount: u64) -> Result<u64, VaultError> {
        self.held = self
            .held
            .checked_add(amount)
            .ok_or(VaultError::Overflow {
                held: self.held,
                deposit: amount,
            })?;
        Ok(self.held)
    }

    /// Releases `amount` from custody. Restricted to the allowed caller.
    ///
    /// Returns the remaining custody total.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Unauthorized`] if `caller` does not match the
    /// configured allowed caller (or none is configured).
    /// Returns [`VaultError::InsufficientCustody`] if `amount` exceeds the
    /// held total -- an internal-consistency failure, not a user error.
    pub fn release(&mut self, caller: &AccountId, amount: u64) -> Result<u64, VaultError> {
        if self.allowed_caller.as_ref() != Some(caller) {
            return Err(VaultError::Unauthorized {
                caller: caller.clone(),
            });
        }

        if amount > self.held {
            return Err(VaultError::InsufficientCustody {
                held: self.held,
                requested: amount,
            });
        }

        self.held -= amount;
        Ok(self.held)
    }

    /// Returns the identity currently allowed to release custody funds.
    pub fn allowed_caller(&self) -> Option<&AccountId> {
        self.allowed_caller.as_ref()
    }

    /// Returns the vault's owner.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Returns the amount currently in custody.
    pub fn held(&self) -> u64 {
        self.held
    }
}
