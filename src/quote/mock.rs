//! Mock quote provider for testing without network calls.

use super::{Quote, QuoteError, QuoteProvider, QuoteRequest};
use crate::domain::{Address, Decimal};
use async_trait::async_trait;
use std::collections::HashMap;

/// Quotes at a fixed rate per pair; unknown pairs have no liquidity.
#[derive(Debug, Clone, Default)]
pub struct MockQuoteProvider {
    rates: HashMap<(Address, Address), Decimal>,
    failure: Option<QuoteError>,
}

impl MockQuoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote `amount * rate` destination units for this pair.
    pub fn with_rate(mut self, src: Address, dst: Address, rate: Decimal) -> Self {
        self.rates.insert((src, dst), rate);
        self
    }

    /// Fail every request with `error`.
    pub fn with_failure(mut self, error: QuoteError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let rate = self
            .rates
            .get(&(request.src_token.clone(), request.dst_token.clone()))
            .ok_or(QuoteError::InsufficientLiquidity)?;
        Ok(Quote {
            destination_amount: (request.amount * *rate).floor_to_decimals(request.dst_decimals),
        })
    }
}
