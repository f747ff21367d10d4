//! Score updates and the inactivity decay job.

use crate::error::RiskError;
use crate::event::{RiskEvent, RiskPolicy};
use crate::profile::RiskProfile;
use optimus_store::{codec, RiskProfileStore};
use optimus_types::{ParticipantId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Outcome of one decay run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayReport {
    pub decayed: Vec<ParticipantId>,
    /// Active again, already at zero, or without a profile.
    pub skipped: Vec<ParticipantId>,
    pub total_decay_points: u64,
}

pub struct RiskEngine<'a, S> {
    store: &'a S,
    policy: RiskPolicy,
}

impl<'a, S: RiskProfileStore> RiskEngine<'a, S> {
    pub fn new(store: &'a S, policy: RiskPolicy) -> Self {
        Self { store, policy }
    }

    pub fn profile(&self, participant: &ParticipantId) -> Result<Option<RiskProfile>, RiskError> {
        match self.store.get_profile(participant)? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Current score; zero for a participant with no profile yet.
    pub fn score(&self, participant: &ParticipantId) -> Result<u32, RiskError> {
        Ok(self.profile(participant)?.map(|p| p.score).unwrap_or(0))
    }

    /// Apply one event, creating the profile on first use.
    pub fn apply(
        &self,
        participant: &ParticipantId,
        event: RiskEvent,
        now: Timestamp,
    ) -> Result<RiskProfile, RiskError> {
        let mut profile = self
            .profile(participant)?
            .unwrap_or_else(|| RiskProfile::new(participant.clone(), now));
        let before = profile.score;
        profile.adjust(self.policy.delta(event));
        if event.is_activity() {
            profile.last_activity_at = now;
        }
        self.store
            .put_profile(participant, &codec::encode(&profile)?)?;
        debug!(
            participant = %participant,
            event = ?event,
            before,
            after = profile.score,
            "risk score updated"
        );
        Ok(profile)
    }

    /// Participants with a positive score and no activity for the window.
    pub fn find_inactive(&self, now: Timestamp) -> Result<Vec<ParticipantId>, RiskError> {
        let profiles: Vec<RiskProfile> = codec::decode_all(&self.store.iter_profiles()?)?;
        let mut inactive: Vec<ParticipantId> = profiles
            .into_iter()
            .filter(|p| p.score > 0 && p.is_inactive(self.policy.inactivity_window_secs, now))
            .map(|p| p.participant_id)
            .collect();
        inactive.sort();
        info!(count = inactive.len(), "inactive participants found");
        Ok(inactive)
    }

    /// Decay each listed participant once.
    ///
    /// The inactivity window is re-checked against the stored profile, so a
    /// stale id list from an earlier run never decays someone who has since
    /// transacted. Decay does not count as activity.
    pub fn apply_decay(
        &self,
        participants: &[ParticipantId],
        now: Timestamp,
    ) -> Result<DecayReport, RiskError> {
        let unique: BTreeSet<&ParticipantId> = participants.iter().collect();
        let mut report = DecayReport::default();

        for id in unique {
            let eligible = match self.profile(id)? {
                Some(p) => p.score > 0 && p.is_inactive(self.policy.inactivity_window_secs, now),
                None => false,
            };
            if !eligible {
                report.skipped.push(id.clone());
                continue;
            }
            let before = self.score(id)?;
            let after = self.apply(id, RiskEvent::InactivityDecay, now)?.score;
            report.total_decay_points += (before - after) as u64;
            report.decayed.push(id.clone());
        }

        info!(
            decayed = report.decayed.len(),
            skipped = report.skipped.len(),
            points = report.total_decay_points,
            "decay run complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimus_nullables::NullStore;
    use optimus_types::SECS_PER_DAY;

    fn engine(store: &NullStore) -> RiskEngine<'_, NullStore> {
        RiskEngine::new(store, RiskPolicy::default())
    }

    #[test]
    fn profile_created_on_first_event() {
        let store = NullStore::new();
        let risk = engine(&store);
        let alice = ParticipantId::new("alice");
        assert!(risk.profile(&alice).unwrap().is_none());

        let p = risk
            .apply(&alice, RiskEvent::OnTimeInstallment, Timestamp::new(10))
            .unwrap();
        assert_eq!(p.score, 2);
        assert_eq!(p.last_activity_at, Timestamp::new(10));
    }

    #[test]
    fn late_installment_never_goes_negative() {
        let store = NullStore::new();
        let risk = engine(&store);
        let bob = ParticipantId::new("bob");
        risk.apply(&bob, RiskEvent::PaymentParticipation, Timestamp::EPOCH)
            .unwrap();
        let p = risk
            .apply(&bob, RiskEvent::LateInstallment, Timestamp::EPOCH)
            .unwrap();
        assert_eq!(p.score, 0);
    }

    #[test]
    fn decay_stops_at_zero() {
        let store = NullStore::new();
        let risk = engine(&store);
        let carol = ParticipantId::new("carol");
        risk.apply(&carol, RiskEvent::PaymentParticipation, Timestamp::EPOCH)
            .unwrap();

        let now = Timestamp::new(31 * SECS_PER_DAY);
        let inactive = risk.find_inactive(now).unwrap();
        assert_eq!(inactive, vec![carol.clone()]);

        let report = risk.apply_decay(&inactive, now).unwrap();
        assert_eq!(report.decayed, vec![carol.clone()]);
        assert_eq!(report.total_decay_points, 1);
        assert_eq!(risk.score(&carol).unwrap(), 0);

        // Re-running with the same stale list is a no-op.
        let again = risk.apply_decay(&inactive, now).unwrap();
        assert!(again.decayed.is_empty());
        assert_eq!(again.skipped, vec![carol.clone()]);
        assert_eq!(risk.score(&carol).unwrap(), 0);
        assert!(risk.find_inactive(now).unwrap().is_empty());
    }

    #[test]
    fn reactivated_participant_is_not_decayed() {
        let store = NullStore::new();
        let risk = engine(&store);
        let dave = ParticipantId::new("dave");
        risk.apply(&dave, RiskEvent::OnTimeInstallment, Timestamp::EPOCH)
            .unwrap();
        let stale = vec![dave.clone()];

        let later = Timestamp::new(40 * SECS_PER_DAY);
        risk.apply(&dave, RiskEvent::PaymentParticipation, later)
            .unwrap();
        let report = risk.apply_decay(&stale, later.plus_secs(1)).unwrap();
        assert!(report.decayed.is_empty());
        assert_eq!(risk.score(&dave).unwrap(), 3);
    }

    #[test]
    fn decay_keeps_last_activity() {
        let store = NullStore::new();
        let risk = engine(&store);
        let erin = ParticipantId::new("erin");
        for _ in 0..5 {
            risk.apply(&erin, RiskEvent::OnTimeInstallment, Timestamp::EPOCH)
                .unwrap();
        }
        let now = Timestamp::new(30 * SECS_PER_DAY);
        let ids = vec![erin.clone(), erin.clone()];
        let report = risk.apply_decay(&ids, now).unwrap();
        assert_eq!(report.decayed.len(), 1);
        assert_eq!(report.total_decay_points, 2);

        let p = risk.profile(&erin).unwrap().unwrap();
        assert_eq!(p.score, 8);
        assert_eq!(p.last_activity_at, Timestamp::EPOCH);
    }

    #[test]
    fn rejection_applies_configured_penalty() {
        let store = NullStore::new();
        let risk = RiskEngine::new(
            &store,
            RiskPolicy {
                decay_points: 2,
                rejection_penalty: 4,
                inactivity_window_secs: 30 * SECS_PER_DAY,
            },
        );
        let frank = ParticipantId::new("frank");
        for _ in 0..3 {
            risk.apply(&frank, RiskEvent::OnTimeInstallment, Timestamp::EPOCH)
                .unwrap();
        }
        let p = risk
            .apply(&frank, RiskEvent::LoanRejected, Timestamp::EPOCH)
            .unwrap();
        assert_eq!(p.score, 2);
    }
}
