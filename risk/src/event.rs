use optimus_types::SettlementParams;
use serde::{Deserialize, Serialize};

/// Something that moves a participant's score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskEvent {
    /// Completed payment, as payer or recipient.
    PaymentParticipation,
    OnTimeInstallment,
    LateInstallment,
    InactivityDecay,
    LoanRejected,
}

impl RiskEvent {
    /// Whether the event counts as the participant transacting.
    pub fn is_activity(&self) -> bool {
        matches!(
            self,
            Self::PaymentParticipation | Self::OnTimeInstallment | Self::LateInstallment
        )
    }
}

/// The policy-defined parts of the delta table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPolicy {
    pub decay_points: u32,
    pub rejection_penalty: u32,
    pub inactivity_window_secs: u64,
}

impl RiskPolicy {
    pub fn delta(&self, event: RiskEvent) -> i64 {
        match event {
            RiskEvent::PaymentParticipation => 1,
            RiskEvent::OnTimeInstallment => 2,
            RiskEvent::LateInstallment => -3,
            RiskEvent::InactivityDecay => -(self.decay_points as i64),
            RiskEvent::LoanRejected => -(self.rejection_penalty as i64),
        }
    }
}

impl From<&SettlementParams> for RiskPolicy {
    fn from(params: &SettlementParams) -> Self {
        Self {
            decay_points: params.decay_points,
            rejection_penalty: params.rejection_penalty,
            inactivity_window_secs: params.inactivity_window_secs,
        }
    }
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self::from(&SettlementParams::default())
    }
}
