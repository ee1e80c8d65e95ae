//! # Staking Configuration
//!
//! The four parameters that define a staking deployment. They are fixed at
//! construction time and treated as immutable configuration thereafter --
//! there is no governance path to change them on a live ledger.
//!
//! ## Rate convention
//!
//! All monetary amounts in this system are integral smallest-unit values,
//! and the interest rate follows the same fixed-point convention the
//! deployment tooling uses: a fraction scaled by [`RATE_SCALE`]
//! (`1_000_000_000`). One percent is therefore `10_000_000`. The rate is
//! only ever combined with a principal as
//! `principal * rate / RATE_SCALE`, computed in 128-bit intermediate
//! precision (see [`crate::interest`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-point denominator for [`StakeConfig::interest_rate`].
///
/// A rate of `RATE_SCALE` is 100%. One percent is `RATE_SCALE / 100`.
pub const RATE_SCALE: u64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors detected while constructing a [`StakeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The three time bounds are not in non-decreasing order.
    #[error(
        "invalid staking windows: min {min}s, max {max}s, withdrawal period end {end}s \
         (required: min <= max <= end)"
    )]
    WindowOrdering {
        /// Configured minimum stake duration.
        min: u64,
        /// Configured duration at which full interest is earned.
        max: u64,
        /// Configured end of the withdrawal period.
        end: u64,
    },
}

// ---------------------------------------------------------------------------
// StakeConfig
// ---------------------------------------------------------------------------

/// Immutable parameters of a staking deployment.
///
/// The three durations carve elapsed stake time into four bands
/// (see [`crate::interest::StakeBand`]):
///
/// ```text
/// 0 ........ min ............ max ............. end ..........>
///   TooEarly | PrincipalOnly  | FullInterest    | Expired
/// ```
///
/// Construction enforces `min <= max <= end`; a config that violates the
/// ordering cannot exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeConfig {
    /// Interest rate as a fraction scaled by [`RATE_SCALE`].
    pub interest_rate: u64,

    /// Minimum elapsed seconds before unstaking is permitted at all.
    pub min_stake_secs: u64,

    /// Elapsed seconds at or beyond which full interest is earned.
    pub max_stake_secs: u64,

    /// Elapsed seconds beyond which unstaking is refused entirely.
    pub withdrawal_period_ends_secs: u64,
}

impl StakeConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WindowOrdering`] unless
    /// `min_stake_secs <= max_stake_secs <= withdrawal_period_ends_secs`.
    pub fn new(
        interest_rate: u64,
        min_stake_secs: u64,
        max_stake_secs: u64,
        withdrawal_period_ends_secs: u64,
    ) -> Result<Self, ConfigError> {
        if min_stake_secs > max_stake_secs || max_stake_secs > withdrawal_period_ends_secs {
            return Err(ConfigError::WindowOrdering {
                min: min_stake_secs,
                max: max_stake_secs,
                end: withdrawal_period_ends_secs,
            });
        }

        Ok(Self {
            interest_rate,
            min_stake_secs,
            max_stake_secs,
            withdrawal_period_ends_secs,
        })
    }

    /// Convenience constructor taking the rate in whole percent.
    ///
    /// `from_percent(1, ..)` is the canonical 1% deployment.
    pub fn from_percent(
        percent: u64,
        min_stake_secs: u64,
        max_stake_secs: u64,
        withdrawal_period_ends_secs: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(
            percent * (RATE_SCALE / 100),
            min_stake_secs,
            max_stake_secs,
            withdrawal_period_ends_secs,
        )
    }
}
