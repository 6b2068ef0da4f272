//! # Policy Profiles
//!
//! The processor is one state machine with a handful of knobs. A
//! [`PolicyProfile`] names a bundle of knob settings; a [`Policy`] is the
//! resolved bundle (profile + floor + reserve + guard) the processor
//! actually consults.
//!
//! | Knob                | `top-up`            | `single-shot`          |
//! |---------------------|---------------------|------------------------|
//! | deposits per life   | unlimited           | one                    |
//! | withdraw            | partial, explicit   | full balance only      |
//! | destruction         | explicit `close`    | implicit on full drain |
//! | reserve at creation | state-record rent   | none                   |
//! | minimum deposit     | 1                   | rent minimum + 1       |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{SINGLE_SHOT_MIN_DEPOSIT, STATE_RECORD_RESERVE, TOP_UP_MIN_DEPOSIT};

/// Named behavior profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyProfile {
    /// Repeated deposits, partial withdrawals, explicit close.
    TopUp,
    /// One deposit, full withdrawal that also destroys the vault.
    SingleShot,
}

impl PolicyProfile {
    /// Stable name used on the CLI, in config files and in ledger metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyProfile::TopUp => "top-up",
            PolicyProfile::SingleShot => "single-shot",
        }
    }
}

impl fmt::Display for PolicyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top-up" | "topup" => Ok(PolicyProfile::TopUp),
            "single-shot" | "singleshot" => Ok(PolicyProfile::SingleShot),
            other => Err(format!(
                "unknown profile '{other}' (expected 'top-up' or 'single-shot')"
            )),
        }
    }
}

/// What counts as "already funded" under the single-deposit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepositGuard {
    /// Any live record blocks another deposit.
    RecordExists,
    /// Only a record holding funds blocks another deposit.
    NonzeroBalance,
}

/// How withdrawals are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawMode {
    /// The caller names the amount.
    Partial,
    /// The whole balance goes, and the vault with it.
    FullOnly,
}

/// Resolved policy consulted by the processor on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// The profile this policy was built from.
    pub profile: PolicyProfile,
    /// Smallest accepted deposit (inclusive).
    pub min_deposit: u64,
    /// Units locked against a record at creation, released by close.
    pub record_reserve: u64,
    /// Single-deposit guard. Ignored by multi-deposit profiles.
    pub deposit_guard: DepositGuard,
}

impl Policy {
    /// Profile defaults.
    pub fn for_profile(profile: PolicyProfile) -> Self {
        match profile {
            PolicyProfile::TopUp => Self {
                profile,
                min_deposit: TOP_UP_MIN_DEPOSIT,
                record_reserve: STATE_RECORD_RESERVE,
                deposit_guard: DepositGuard::RecordExists,
            },
            PolicyProfile::SingleShot => Self {
                profile,
                min_deposit: SINGLE_SHOT_MIN_DEPOSIT,
                record_reserve: 0,
                deposit_guard: DepositGuard::RecordExists,
            },
        }
    }

    pub fn top_up() -> Self {
        Self::for_profile(PolicyProfile::TopUp)
    }

    pub fn single_shot() -> Self {
        Self::for_profile(PolicyProfile::SingleShot)
    }

    /// Whether a vault may take more than one deposit per lifetime.
    pub fn allows_top_up(&self) -> bool {
        matches!(self.profile, PolicyProfile::TopUp)
    }

    pub fn withdraw_mode(&self) -> WithdrawMode {
        match self.profile {
            PolicyProfile::TopUp => WithdrawMode::Partial,
            PolicyProfile::SingleShot => WithdrawMode::FullOnly,
        }
    }

    /// Whether destruction is an explicit `close` call.
    pub fn has_close(&self) -> bool {
        matches!(self.profile, PolicyProfile::TopUp)
    }

    /// Whether an existing record with `balance` blocks a further deposit.
    pub fn blocks_deposit(&self, balance: u64) -> bool {
        if self.allows_top_up() {
            return false;
        }
        match self.deposit_guard {
            DepositGuard::RecordExists => true,
            DepositGuard::NonzeroBalance => balance > 0,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::top_up()
    }
}
