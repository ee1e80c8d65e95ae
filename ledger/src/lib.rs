// Copyright (c) 2026 Chronostake Labs. MIT License.
// See LICENSE for details.

//! # Chronostake — Time-Gated Staking Ledger
//!
//! A staking ledger with a segregated custody vault. Depositors place
//! funds under management, lock a portion for a bounded time window to
//! earn interest, and later reclaim principal plus a time-banded bonus.
//! Staked principal lives in a custody [`Vault`] that releases value only
//! to the [`Ledger`] itself, so it is never commingled with free balances
//! or the interest pool.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of the
//! system:
//!
//! - **account** — Opaque identity strings. Equality is the trust model.
//! - **config** — The four immutable deployment parameters.
//! - **interest** — Time-band classification and the interest formula,
//!   defined exactly once.
//! - **vault** — Segregated custody with a single authorized withdrawer.
//! - **ledger** — Balances, stake records, the interest pool, and the
//!   staking state machine.
//! - **service** — A thread-safe handle serializing all mutation, plus
//!   the logging seam.
//!
//! ## Design Philosophy
//!
//! 1. Checks, then effects, then interactions. Internal state is fully
//!    mutated before any outward value movement.
//! 2. Every failure is atomic: an operation either commits completely or
//!    changes nothing.
//! 3. All monetary arithmetic is checked. Money does not wrap.
//! 4. If it touches money, it has tests. Plural.

pub mod account;
pub mod config;
pub mod interest;
pub mod ledger;
pub mod service;
pub mod vault;

pub use account::AccountId;
pub use config::{ConfigError, StakeConfig, RATE_SCALE};
pub use interest::StakeBand;
pub use ledger::{Ledger, LedgerError, Payout, Settlement, StakeRecord};
pub use service::StakingService;
pub use vault::{Vault, VaultError};
