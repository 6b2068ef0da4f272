//! # CLI Interface
//!
//! Command-line structure for `vault-node`, built with `clap` derive.
//! Global flags pick the ledger and policy; each subcommand is one vault
//! operation or an inspection of the ledger.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use vault_core::config::DEFAULT_DATA_DIR;
use vault_core::PolicyProfile;

/// Custodial vault operator CLI.
///
/// Drives the vault processor against a persistent ledger in the data
/// directory. Owners are given as base58 or 64-character hex.
#[derive(Parser, Debug)]
#[command(
    name = "vault-node",
    about = "Custodial vault operator CLI",
    version,
    propagate_version = true
)]
pub struct VaultNodeCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Ledger directory. Created on first use.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "VAULT_DATA_DIR",
        default_value = DEFAULT_DATA_DIR
    )]
    pub data_dir: PathBuf,

    /// Policy profile: `top-up` or `single-shot`. Overrides the config file.
    #[arg(long, global = true, env = "VAULT_PROFILE")]
    pub profile: Option<PolicyProfile>,

    /// JSON config file with profile, domain and policy overrides.
    #[arg(long, short = 'c', global = true, env = "VAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address derivation domain. Overrides the config file.
    #[arg(long, global = true, env = "VAULT_DOMAIN")]
    pub domain: Option<String>,

    /// Log format: `pretty` or `json`.
    #[arg(long, global = true, env = "VAULT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Print results as JSON on stdout.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deposit into an owner's vault, creating it if needed.
    Deposit(AmountArgs),
    /// Withdraw from an owner's vault.
    ///
    /// Under `top-up` the amount is required; under `single-shot` the whole
    /// balance is paid out and the vault is destroyed.
    Withdraw(WithdrawArgs),
    /// Destroy an empty vault and release its reserve (`top-up` only).
    Close(OwnerArgs),
    /// Print an owner's balance (0 if no vault exists).
    Balance(OwnerArgs),
    /// Print an owner's vault address. Does not touch the ledger.
    Address(OwnerArgs),
    /// Apply a JSON script of operations in order.
    Replay(ReplayArgs),
    /// Print ledger totals and the state root.
    Status,
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct OwnerArgs {
    /// Owner id (base58 or hex).
    #[arg(long)]
    pub owner: String,
}

#[derive(Args, Debug)]
pub struct AmountArgs {
    /// Owner id (base58 or hex).
    #[arg(long)]
    pub owner: String,

    /// Amount in smallest units.
    #[arg(long)]
    pub amount: u64,
}

#[derive(Args, Debug)]
pub struct WithdrawArgs {
    /// Owner id (base58 or hex).
    #[arg(long)]
    pub owner: String,

    /// Amount in smallest units. Ignored under `single-shot`.
    #[arg(long)]
    pub amount: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to a JSON array of `{ "owner": .., "op": { "type": .. } }`.
    #[arg(long, short = 's')]
    pub script: PathBuf,
}
