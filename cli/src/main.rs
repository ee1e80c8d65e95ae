// Copyright (c) 2026 Chronostake Labs. MIT License.
// See LICENSE for details.

//! # Chronostake CLI
//!
//! Entry point for the `chronostake` binary. Parses CLI arguments,
//! initializes logging, and runs offline utilities against a staking
//! parameter set:
//!
//! - `estimate` — interest an unstake would pay at a given elapsed time
//! - `check`    — validate the four deployment parameters
//! - `version`  — print build version information

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;

use chronostake_ledger::interest;
use chronostake_ledger::{LedgerError, StakeConfig};

use cli::{ChronostakeCli, Commands, ConfigArgs, EstimateArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = ChronostakeCli::parse();
    logging::init_logging(
        "chronostake=info,chronostake_ledger=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Estimate(args) => estimate(args),
        Commands::Check(args) => check(args),
        Commands::Version => {
            println!("chronostake {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Builds a validated [`StakeConfig`] from CLI parameters.
fn build_config(args: &ConfigArgs) -> Result<StakeConfig> {
    StakeConfig::new(
        args.interest_rate,
        args.min_stake_secs,
        args.max_stake_secs,
        args.withdrawal_period_ends_secs,
    )
    .context("invalid staking configuration")
}

/// Prints the interest an unstake would pay at the given elapsed time,
/// using the same routine the ledger settles with.
fn estimate(args: EstimateArgs) -> Result<()> {
    let config = build_config(&args.config)?;

    tracing::info!(
        amount = args.amount,
        elapsed_secs = args.elapsed_secs,
        interest_rate = config.interest_rate,
        "estimating settlement"
    );

    match interest::interest_due(&config, args.amount, args.elapsed_secs) {
        Ok(interest) => {
            let total = args
                .amount
                .checked_add(interest)
                .context("principal + interest exceeds the representable range")?;
            println!("Principal : {}", args.amount);
            println!("Interest  : {}", interest);
            println!("Total     : {}", total);
        }
        Err(rejection @ (LedgerError::TooEarly { .. } | LedgerError::WindowExpired { .. })) => {
            println!("No payout at {}s: {}", args.elapsed_secs, rejection);
        }
        Err(other) => return Err(other).context("estimation failed"),
    }

    Ok(())
}

/// Validates the parameter set and prints the resulting time bands.
fn check(args: ConfigArgs) -> Result<()> {
    let config = build_config(&args)?;

    println!("Configuration OK.");
    println!(
        "  Interest rate        : {} / 10^9 ({}%)",
        config.interest_rate,
        config.interest_rate as f64 / 10_000_000.0
    );
    println!(
        "  Too early            : elapsed < {}s",
        config.min_stake_secs
    );
    println!(
        "  Principal only       : {}s <= elapsed < {}s",
        config.min_stake_secs, config.max_stake_secs
    );
    println!(
        "  Full interest        : {}s <= elapsed <= {}s",
        config.max_stake_secs, config.withdrawal_period_ends_secs
    );
    println!(
        "  Window expired       : elapsed > {}s",
        config.withdrawal_period_ends_secs
    );

    Ok(())
}
