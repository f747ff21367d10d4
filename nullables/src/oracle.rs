//! Nullable price oracle — fixed conversion rates.

use optimus_chain::{ChainError, PriceOracle};
use optimus_types::TokenAmount;
use std::collections::HashMap;
use std::sync::Mutex;

/// Converts fiat minor units to token base units at a scripted rate.
pub struct NullOracle {
    rates: Mutex<HashMap<(String, String), u64>>,
}

impl NullOracle {
    pub fn new() -> Self {
        Self {
            rates: Mutex::new(HashMap::new()),
        }
    }

    /// One fiat minor unit of `currency` buys `units_per_minor` base units of `token`.
    pub fn with_rate(self, currency: &str, token: &str, units_per_minor: u64) -> Self {
        self.rates
            .lock()
            .unwrap()
            .insert((currency.to_string(), token.to_string()), units_per_minor);
        self
    }
}

impl Default for NullOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceOracle for NullOracle {
    async fn convert(
        &self,
        amount_minor: u64,
        currency: &str,
        token: &str,
    ) -> Result<TokenAmount, ChainError> {
        let rate = self
            .rates
            .lock()
            .unwrap()
            .get(&(currency.to_string(), token.to_string()))
            .copied()
            .ok_or_else(|| ChainError::Oracle(format!("no price feed for {currency}/{token}")))?;
        amount_minor
            .checked_mul(rate)
            .map(TokenAmount::new)
            .ok_or_else(|| ChainError::Oracle("conversion overflow".into()))
    }
}
