use optimus_types::{ParticipantId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub participant_id: ParticipantId,
    pub score: u32,
    pub last_activity_at: Timestamp,
}

impl RiskProfile {
    /// A fresh profile starts at zero.
    pub fn new(participant_id: ParticipantId, now: Timestamp) -> Self {
        Self {
            participant_id,
            score: 0,
            last_activity_at: now,
        }
    }

    /// `max(0, score + delta)`.
    pub fn adjust(&mut self, delta: i64) {
        let next = (self.score as i64).saturating_add(delta);
        self.score = next.clamp(0, u32::MAX as i64) as u32;
    }

    pub fn is_inactive(&self, window_secs: u64, now: Timestamp) -> bool {
        self.last_activity_at.has_expired(window_secs, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_floors_at_zero() {
        let mut p = RiskProfile::new(ParticipantId::new("alice"), Timestamp::EPOCH);
        p.adjust(1);
        p.adjust(-3);
        assert_eq!(p.score, 0);
        p.adjust(2);
        assert_eq!(p.score, 2);
    }
}
