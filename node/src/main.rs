// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Vault Node
//!
//! Entry point for the `vault-node` binary. Parses CLI arguments, sets up
//! logging, resolves the configuration, opens the persistent ledger and runs
//! one command against it.
//!
//! Configuration is layered: built-in defaults, then the JSON config file
//! (`--config`), then `--profile` / `--domain` (or their `VAULT_*`
//! environment variables).
//!
//! Operation failures are returned from `main`, so the process exits
//! non-zero with the error message on stderr.

mod cli;
mod logging;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use vault_core::{
    LedgerStore, OwnerId, Operation, Receipt, SledLedger, VaultConfig, VaultProcessor,
};

use cli::{Commands, GlobalArgs, VaultNodeCli};
use logging::LogFormat;

/// Ledger subdirectory inside the data directory.
const LEDGER_DIR: &str = "ledger";

type Processor = VaultProcessor<SledLedger>;

fn main() -> Result<()> {
    let cli = VaultNodeCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    logging::init_logging(
        logging::DEFAULT_DIRECTIVE,
        LogFormat::from_str_lossy(&cli.global.log_format),
    );

    let config = resolve_config(&cli.global)?;
    let json = cli.global.json;

    if let Commands::Address(args) = &cli.command {
        return print_address(&config, &args.owner, json);
    }

    let processor = open_processor(&cli.global.data_dir, &config)?;

    let result = match cli.command {
        Commands::Deposit(args) => {
            let owner = parse_owner(&args.owner)?;
            run_op(&processor, &owner, Operation::Deposit { amount: args.amount }, json)
        }
        Commands::Withdraw(args) => {
            let owner = parse_owner(&args.owner)?;
            run_op(&processor, &owner, Operation::Withdraw { amount: args.amount }, json)
        }
        Commands::Close(args) => {
            let owner = parse_owner(&args.owner)?;
            run_op(&processor, &owner, Operation::Close, json)
        }
        Commands::Balance(args) => print_balance(&processor, &args.owner, json),
        Commands::Replay(args) => replay(&processor, &args.script, json),
        Commands::Status => print_status(&processor, json),
        Commands::Address(_) | Commands::Version => Ok(()),
    };

    processor
        .store()
        .flush()
        .context("failed to flush ledger")?;

    result
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Defaults, then the config file, then flags and environment.
fn resolve_config(global: &GlobalArgs) -> Result<VaultConfig> {
    let mut config = match &global.config {
        Some(path) => VaultConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => VaultConfig::default(),
    };

    if let Some(profile) = global.profile {
        config.profile = profile;
    }
    if let Some(domain) = &global.domain {
        config.domain = domain.clone();
    }

    tracing::debug!(profile = %config.profile, domain = %config.domain, "configuration resolved");
    Ok(config)
}

fn open_processor(data_dir: &Path, config: &VaultConfig) -> Result<Processor> {
    let policy = config.policy().context("invalid policy configuration")?;
    let deriver = config.deriver().context("invalid address configuration")?;

    let ledger_path = data_dir.join(LEDGER_DIR);
    std::fs::create_dir_all(&ledger_path).with_context(|| {
        format!("failed to create ledger directory: {}", ledger_path.display())
    })?;

    let ledger = SledLedger::open(&ledger_path, config.profile)
        .with_context(|| format!("failed to open ledger at {}", ledger_path.display()))?;

    tracing::info!(
        path = %ledger_path.display(),
        profile = %policy.profile,
        min_deposit = policy.min_deposit,
        records = ledger.len(),
        "ledger opened"
    );

    Ok(VaultProcessor::new(ledger, policy, deriver))
}

fn parse_owner(text: &str) -> Result<OwnerId> {
    text.parse()
        .with_context(|| format!("invalid owner id '{text}'"))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run_op(processor: &Processor, owner: &OwnerId, op: Operation, json: bool) -> Result<()> {
    let receipt = processor
        .apply(owner, op)
        .with_context(|| format!("{} failed for owner {owner}", op.name()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("{}", describe(&receipt));
    }
    Ok(())
}

fn describe(receipt: &Receipt) -> String {
    match receipt {
        Receipt::Deposit(r) if r.created => format!(
            "created vault {} with {} (reserve locked: {})",
            r.address, r.balance, r.reserve_locked
        ),
        Receipt::Deposit(r) => format!(
            "deposited {} into vault {}; balance {}",
            r.amount, r.address, r.balance
        ),
        Receipt::Withdraw(r) if r.closed => format!(
            "withdrew {} from vault {}; vault closed",
            r.amount, r.address
        ),
        Receipt::Withdraw(r) => format!(
            "withdrew {} from vault {}; balance {}",
            r.amount, r.address, r.balance
        ),
        Receipt::Close(r) => format!(
            "closed vault {}; released reserve {}",
            r.address, r.reserve_released
        ),
    }
}

#[derive(Serialize)]
struct BalanceReport {
    owner: OwnerId,
    address: vault_core::VaultAddress,
    exists: bool,
    balance: u64,
}

fn print_balance(processor: &Processor, owner: &str, json: bool) -> Result<()> {
    let owner = parse_owner(owner)?;
    let record = processor.record(&owner)?;
    let report = BalanceReport {
        owner,
        address: processor.address_of(&owner),
        exists: record.is_some(),
        balance: record.map_or(0, |r| r.balance),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.balance);
    }
    Ok(())
}

fn print_address(config: &VaultConfig, owner: &str, json: bool) -> Result<()> {
    let owner = parse_owner(owner)?;
    let deriver = config.deriver()?;
    let vault = deriver.derive(&owner);
    let state = deriver.derive_state(&owner);

    if json {
        let value = serde_json::json!({
            "owner": owner,
            "domain": config.domain,
            "vault": vault,
            "state": state,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("vault : {vault}");
        println!("state : {state}");
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    profile: vault_core::PolicyProfile,
    domain: String,
    records: usize,
    total_custody: u128,
    state_root: String,
}

fn print_status(processor: &Processor, json: bool) -> Result<()> {
    let report = StatusReport {
        profile: processor.policy().profile,
        domain: String::from_utf8_lossy(processor.deriver().domain()).into_owned(),
        records: processor.store().len(),
        total_custody: processor.total_custody()?,
        state_root: hex::encode(processor.state_root()?),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Profile       : {}", report.profile);
        println!("Domain        : {}", report.domain);
        println!("Vaults        : {}", report.records);
        println!("Total custody : {}", report.total_custody);
        println!("State root    : {}", report.state_root);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// One line of a replay script.
#[derive(Debug, Deserialize)]
struct ScriptEntry {
    owner: OwnerId,
    op: Operation,
}

#[derive(Debug, Serialize)]
struct ReplayOutcome {
    index: usize,
    owner: OwnerId,
    op: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<Receipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn load_script(path: &Path) -> Result<Vec<ScriptEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse script {}", path.display()))
}

/// Apply every entry in order. A failing entry is reported and skipped; the
/// command fails at the end if any entry did.
fn replay(processor: &Processor, path: &Path, json: bool) -> Result<()> {
    let script = load_script(path)?;
    tracing::info!(entries = script.len(), script = %path.display(), "replaying script");

    let outcomes: Vec<ReplayOutcome> = script
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let result = processor.apply(&entry.owner, entry.op);
            if let Err(e) = &result {
                tracing::warn!(index, owner = %entry.owner, op = entry.op.name(), error = %e, "script entry rejected");
            }
            let (receipt, error) = match result {
                Ok(r) => (Some(r), None),
                Err(e) => (None, Some(e.to_string())),
            };
            ReplayOutcome {
                index,
                owner: entry.owner,
                op: entry.op,
                receipt,
                error,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for o in &outcomes {
            match (&o.receipt, &o.error) {
                (Some(r), _) => println!("[{}] ok    {}", o.index, describe(r)),
                (None, Some(e)) => println!("[{}] error {} for {}: {}", o.index, o.op.name(), o.owner, e),
                (None, None) => {}
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} script entries failed", outcomes.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

fn print_version() {
    println!("vault-node {}", env!("CARGO_PKG_VERSION"));
    println!("domain     {}", vault_core::config::DEFAULT_DOMAIN);
    println!("rustc      {}", rustc_version());
}

/// Rust compiler version baked in at build time, if any.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
