//! Settlement policy parameters.
//!
//! Everything the engines treat as policy rather than invariant lives here, so a
//! deployment can tune it from configuration without touching the algorithms.

use crate::time::SECS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Policy parameters shared by the lifecycle, scheduler and risk engines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementParams {
    // ── Governance ───────────────────────────────────────────────────────
    /// Voting window for a loan proposal, in seconds. Default: 7 days.
    pub loan_voting_window_secs: u64,

    /// Voting window for a BNPL-access application, in seconds. Default: 3 days.
    pub bnpl_voting_window_secs: u64,

    // ── Repayment ────────────────────────────────────────────────────────
    /// Number of installments a disbursed loan is repaid in. Default: 12.
    pub loan_installments: u32,

    /// Late fee on an overdue installment, in basis points. Default: 500 (5%).
    pub late_fee_bps: u32,

    /// Look-ahead window for installment reminders, in seconds. Default: 3 days.
    pub reminder_window_secs: u64,

    /// Consecutive `Late` installments that put a loan into default. Default: 2.
    pub default_after_consecutive_late: u32,

    // ── Risk ─────────────────────────────────────────────────────────────
    /// Inactivity window before decay applies, in seconds. Default: 30 days.
    pub inactivity_window_secs: u64,

    /// Points removed by one decay run. Default: 2.
    pub decay_points: u32,

    /// Points removed when a borrower's loan is rejected by vote. Default: 5.
    pub rejection_penalty: u32,
}

impl Default for SettlementParams {
    fn default() -> Self {
        Self {
            loan_voting_window_secs: 7 * SECS_PER_DAY,
            bnpl_voting_window_secs: 3 * SECS_PER_DAY,
            loan_installments: 12,
            late_fee_bps: 500,
            reminder_window_secs: 3 * SECS_PER_DAY,
            default_after_consecutive_late: 2,
            inactivity_window_secs: 30 * SECS_PER_DAY,
            decay_points: 2,
            rejection_penalty: 5,
        }
    }
}
