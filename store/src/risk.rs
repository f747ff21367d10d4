//! Risk profile storage trait.

use crate::StoreError;
use optimus_types::ParticipantId;

pub trait RiskProfileStore {
    fn put_profile(&self, participant: &ParticipantId, data: &[u8]) -> Result<(), StoreError>;

    /// `None` until the participant's first scored event.
    fn get_profile(&self, participant: &ParticipantId) -> Result<Option<Vec<u8>>, StoreError>;

    fn iter_profiles(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}
