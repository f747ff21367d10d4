//! Price oracle contract.

use crate::ChainError;
use optimus_types::TokenAmount;
use std::future::Future;

/// Fiat → token conversion. Treated as a pure function at call time; the core
/// never caches a quote.
pub trait PriceOracle: Send + Sync {
    /// Convert `amount_minor` (fiat minor units, e.g. cents) of `currency` into
    /// base units of `token`.
    fn convert(
        &self,
        amount_minor: u64,
        currency: &str,
        token: &str,
    ) -> impl Future<Output = Result<TokenAmount, ChainError>> + Send;
}
