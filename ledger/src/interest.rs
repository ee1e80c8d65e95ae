//! # Interest Mathematics
//!
//! The single source of truth for the time-band classification and the
//! interest formula. Both the pure estimation query
//! ([`Ledger::calculate_interest`](crate::ledger::Ledger::calculate_interest))
//! and the settlement path inside `unstake` call into this module, so the
//! two can never disagree.
//!
//! Interest is a step function of elapsed time: zero once the minimum hold
//! has passed, the full `principal * rate / RATE_SCALE` once the maximum
//! hold is reached, and nothing at all outside the permitted window.

use crate::config::{StakeConfig, RATE_SCALE};
use crate::ledger::LedgerError;

// ---------------------------------------------------------------------------
// StakeBand
// ---------------------------------------------------------------------------

/// The four bands an elapsed stake duration can fall into.
///
/// Boundary semantics, with `e` the elapsed seconds:
///
/// | band            | condition         |
/// |-----------------|-------------------|
/// | `TooEarly`      | `e < min`         |
/// | `PrincipalOnly` | `min <= e < max`  |
/// | `FullInterest`  | `max <= e <= end` |
/// | `Expired`       | `e > end`         |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeBand {
    /// Unstaking is not permitted yet.
    TooEarly,
    /// Unstaking returns the principal with no interest.
    PrincipalOnly,
    /// Unstaking returns the principal plus full interest.
    FullInterest,
    /// The withdrawal window has closed; unstaking is refused.
    Expired,
}

/// Classifies an elapsed duration against a configuration's windows.
pub fn classify(config: &StakeConfig, elapsed_secs: u64) -> StakeBand {
    if elapsed_secs < config.min_stake_secs {
        StakeBand::TooEarly
    } else if elapsed_secs < config.max_stake_secs {
        StakeBand::PrincipalOnly
    } else if elapsed_secs <= config.withdrawal_period_ends_secs {
        StakeBand::FullInterest
    } else {
        StakeBand::Expired
    }
}

// ---------------------------------------------------------------------------
// Formula
// ---------------------------------------------------------------------------

/// Computes `amount * rate / RATE_SCALE` in 128-bit intermediate precision.
///
/// The product of two `u64` values always fits in a `u128`, so the only
/// failure mode is a result that no longer fits in `u64` -- which requires
/// a rate above 100% combined with a near-maximal principal. Returns `None`
/// in that case rather than wrapping; money does not wrap.
pub fn full_interest(amount: u64, interest_rate: u64) -> Option<u64> {
    let scaled = (amount as u128) * (interest_rate as u128) / (RATE_SCALE as u128);
    u64::try_from(scaled).ok()
}

/// The complete interest decision for one (amount, elapsed) pair.
///
/// Returns the interest owed on an accepting band, or the rejection that
/// `unstake` would report at the same elapsed time. This is the function
/// both `unstake` and `calculate_interest` delegate to.
pub fn interest_due(
    config: &StakeConfig,
    amount: u64,
    elapsed_secs: u64,
) -> Result<u64, LedgerError> {
    match classify(config, elapsed_secs) {
        StakeBand::TooEarly => Err(LedgerError::TooEarly {
            elapsed_secs,
            min_secs: config.min_stake_secs,
        }),
        StakeBand::PrincipalOnly => Ok(0),
        StakeBand::FullInterest => {
            full_interest(amount, config.interest_rate).ok_or(LedgerError::InterestOverflow {
                principal: amount,
                rate: config.interest_rate,
            })
        }
        StakeBand::Expired => Err(LedgerError::WindowExpired {
            elapsed_secs,
            end_secs: config.withdrawal_period_ends_secs,
        }),
    }
}
