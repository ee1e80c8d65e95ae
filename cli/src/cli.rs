//! # CLI Interface
//!
//! Defines the command-line argument structure for `chronostake` using
//! `clap` derive. Supports three subcommands: `estimate`, `check`, and
//! `version`.

use clap::{Parser, Subcommand};

/// Chronostake staking ledger tools.
///
/// Offline utilities for a staking deployment: validate a parameter set
/// and estimate the interest an unstake would pay at a given elapsed time,
/// using exactly the arithmetic the ledger itself settles with.
#[derive(Parser, Debug)]
#[command(
    name = "chronostake",
    about = "Time-gated staking ledger tools",
    version,
    propagate_version = true
)]
pub struct ChronostakeCli {
    /// Log output format: "pretty" or "json".
    #[arg(long, env = "CHRONOSTAKE_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the chronostake binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the interest an unstake would pay at a given elapsed time.
    Estimate(EstimateArgs),
    /// Validate a staking parameter set.
    Check(ConfigArgs),
    /// Print version information and exit.
    Version,
}

/// The four staking deployment parameters.
///
/// Defaults mirror the reference deployment: 1% interest, a 10 second
/// minimum hold, full interest from 120 seconds, and a withdrawal window
/// that closes after 600 seconds.
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Interest rate as a fixed-point fraction scaled by 10^9 (1% = 10000000).
    #[arg(long, env = "CHRONOSTAKE_INTEREST_RATE", default_value_t = 10_000_000)]
    pub interest_rate: u64,

    /// Minimum elapsed seconds before unstaking is permitted.
    #[arg(long, env = "CHRONOSTAKE_MIN_STAKE_SECS", default_value_t = 10)]
    pub min_stake_secs: u64,

    /// Elapsed seconds at or beyond which full interest is earned.
    #[arg(long, env = "CHRONOSTAKE_MAX_STAKE_SECS", default_value_t = 120)]
    pub max_stake_secs: u64,

    /// Elapsed seconds beyond which unstaking is refused entirely.
    #[arg(
        long,
        env = "CHRONOSTAKE_WITHDRAWAL_PERIOD_ENDS_SECS",
        default_value_t = 600
    )]
    pub withdrawal_period_ends_secs: u64,
}

/// Arguments for the `estimate` subcommand.
#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Principal amount in smallest units.
    #[arg(long)]
    pub amount: u64,

    /// Elapsed seconds since the stake started.
    #[arg(long)]
    pub elapsed_secs: u64,

    #[command(flatten)]
    pub config: ConfigArgs,
}
