//! Optimus worker — operator CLI over the settlement engines.
//!
//! Prints the effective configuration and runs the pure settlement operations
//! (installment schedules, proportional distributions, vote tallies) with JSON
//! output, so operators can check what the engines will do before it happens.

use anyhow::Context;
use clap::Parser;
use optimus_distribution::{distribute, validate_sum, WeightedShare};
use optimus_governance::{tally, Ballot};
use optimus_lifecycle::SettlementConfig;
use optimus_schedule::{build_plan, PaymentTerms};
use optimus_types::{PaymentRequestId, SubjectRef, Timestamp, TokenAmount};
use optimus_utils::LogFormat;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "optimus-worker", about = "Optimus settlement worker")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "OPTIMUS_CONFIG")]
    config: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "OPTIMUS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "OPTIMUS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the effective configuration as TOML.
    Config,

    /// Print the installment plan for a principal.
    Schedule {
        #[arg(long)]
        principal: u64,
        #[arg(long)]
        installments: u32,
        #[arg(long)]
        period_days: u32,
        /// Due date of installment 1, Unix seconds. Defaults to now.
        #[arg(long)]
        origin: Option<u64>,
    },

    /// Split a total across weighted parties.
    Distribute {
        #[arg(long)]
        total: u64,
        /// `address=weight`, repeatable.
        #[arg(long = "share", value_parser = parse_share, required = true)]
        shares: Vec<WeightedShare>,
    },

    /// Tally a JSON array of ballots.
    Tally {
        #[arg(long)]
        ballots: PathBuf,
        /// End of the voting window, Unix seconds. Defaults to now.
        #[arg(long)]
        expires_at: Option<u64>,
    },
}

fn parse_share(s: &str) -> Result<WeightedShare, String> {
    let (party, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected address=weight, got {s:?}"))?;
    let weight = weight
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("bad weight in {s:?}: {e}"))?;
    Ok(WeightedShare::new(party.trim(), weight))
}

fn load_config(cli: &Cli) -> anyhow::Result<SettlementConfig> {
    let mut config = match &cli.config {
        Some(path) => SettlementConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SettlementConfig::default(),
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    optimus_utils::init_tracing(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "configuration loaded");
    }

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Schedule {
            principal,
            installments,
            period_days,
            origin,
        } => {
            let origin = origin.map(Timestamp::new).unwrap_or_else(Timestamp::now);
            let parent = SubjectRef::PaymentRequest(PaymentRequestId::new("preview"));
            let plan = build_plan(
                &parent,
                TokenAmount::new(principal),
                PaymentTerms::from_days(period_days, installments),
                origin,
            )?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Distribute { total, shares } => {
            let total = TokenAmount::new(total);
            let payouts = distribute(total, &shares);
            let parties = shares.iter().filter(|s| s.weight > 0).count();
            let check = validate_sum(&payouts, total, parties);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "payouts": payouts, "sum_check": check }))?
            );
        }
        Command::Tally {
            ballots,
            expires_at,
        } => {
            let raw = std::fs::read_to_string(&ballots)
                .with_context(|| format!("reading {}", ballots.display()))?;
            let ballots: Vec<Ballot> =
                serde_json::from_str(&raw).context("ballots must be a JSON array")?;
            let now = Timestamp::now();
            let result = tally(&ballots, now, expires_at.map(Timestamp::new).unwrap_or(now));
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
