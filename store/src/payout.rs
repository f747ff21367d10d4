//! Payout receipts: one per party per distribution run, so a retried
//! distribution never pays the same party twice.

use crate::StoreError;
use optimus_types::{DistributionId, WalletAddress};

pub trait PayoutStore {
    fn put_payout(
        &self,
        distribution: &DistributionId,
        party: &WalletAddress,
        data: &[u8],
    ) -> Result<(), StoreError>;

    fn get_payout(
        &self,
        distribution: &DistributionId,
        party: &WalletAddress,
    ) -> Result<Option<Vec<u8>>, StoreError>;
}
