use crate::domain::{Address, Decimal, TimeMs};
use crate::engine::{
    assemble_twap_descriptor, compute_schedule_parameters, Routing, RoutingMode, ScheduleError,
    ScheduleIntent, ScheduleParameters, StopCondition, TwapDescriptor,
};
use crate::quote::{QuoteProvider, QuoteRequest};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Schedule inputs as the user enters them, before a quote is attached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub src_token: Address,
    pub dst_token: Address,
    pub chunk_in: Decimal,
    pub interval_secs: i64,
    pub stop_condition: StopCondition,
    #[serde(default)]
    pub slippage_tolerance_percent: Decimal,
    pub src_decimals: u32,
    pub dst_decimals: u32,
}

impl ScheduleRequest {
    fn intent(&self, quote_amount: Option<Decimal>) -> ScheduleIntent {
        ScheduleIntent {
            src_token: self.src_token.clone(),
            dst_token: self.dst_token.clone(),
            chunk_in: self.chunk_in,
            interval_secs: self.interval_secs,
            stop_condition: self.stop_condition,
            slippage_tolerance_percent: self.slippage_tolerance_percent,
            quote_amount,
            dst_decimals: self.dst_decimals,
        }
    }
}

/// Fetches the quote a schedule needs, then runs the calculator and assembler.
pub struct ScheduleService {
    quotes: Arc<dyn QuoteProvider>,
}

impl ScheduleService {
    pub fn new(quotes: Arc<dyn QuoteProvider>) -> Self {
        Self { quotes }
    }

    /// Execution parameters for `request` as of `now`.
    ///
    /// Input errors are reported before any quote is fetched; same-token
    /// requests never hit the quote provider.
    pub async fn preview(
        &self,
        request: &ScheduleRequest,
        now: TimeMs,
    ) -> Result<ScheduleParameters, ScheduleError> {
        match compute_schedule_parameters(&request.intent(None), now) {
            Err(ScheduleError::QuoteUnavailable(_)) => {}
            other => return other,
        }

        let quote = self
            .quotes
            .quote(&QuoteRequest {
                src_token: request.src_token.clone(),
                dst_token: request.dst_token.clone(),
                amount: request.chunk_in,
                src_decimals: request.src_decimals,
                dst_decimals: request.dst_decimals,
            })
            .await
            .map_err(|e| {
                warn!(
                    src = %request.src_token,
                    dst = %request.dst_token,
                    error = %e,
                    "Quote fetch failed"
                );
                ScheduleError::QuoteUnavailable(e.to_string())
            })?;

        debug!(
            src = %request.src_token,
            dst = %request.dst_token,
            quote = %quote.destination_amount,
            "Quote received"
        );

        compute_schedule_parameters(&request.intent(Some(quote.destination_amount)), now)
    }

    /// Parameters plus the descriptor the signing layer embeds in the order.
    pub async fn build_twap(
        &self,
        request: &ScheduleRequest,
        wallet: &Address,
        mode: RoutingMode,
        now: TimeMs,
    ) -> Result<(ScheduleParameters, TwapDescriptor), ScheduleError> {
        let params = self.preview(request, now).await?;
        let routing = Routing {
            wallet: wallet.clone(),
            mode,
            decimals_src: request.src_decimals,
            decimals_dst: request.dst_decimals,
        };
        let descriptor = assemble_twap_descriptor(&params, &routing)?;
        Ok((params, descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{MockQuoteProvider, QuoteError};
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn usdc() -> Address {
        Address::from_str("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap()
    }

    fn weth() -> Address {
        Address::from_str("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb").unwrap()
    }

    fn request() -> ScheduleRequest {
        ScheduleRequest {
            src_token: usdc(),
            dst_token: weth(),
            chunk_in: d("100"),
            interval_secs: 86_400,
            stop_condition: StopCondition::TotalAmount(d("350")),
            slippage_tolerance_percent: d("1"),
            src_decimals: 6,
            dst_decimals: 18,
        }
    }

    fn service(provider: MockQuoteProvider) -> ScheduleService {
        ScheduleService::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_preview_uses_quote() {
        let svc = service(MockQuoteProvider::new().with_rate(usdc(), weth(), d("0.0004")));
        let params = svc.preview(&request(), TimeMs::new(0)).await.unwrap();
        assert_eq!(params.total_cycles, 3);
        assert_eq!(params.total_principal, d("300"));
        assert_eq!(params.min_output_per_cycle, d("0.0396"));
    }

    #[tokio::test]
    async fn test_validation_reported_before_quote() {
        let svc = service(MockQuoteProvider::new().with_failure(QuoteError::RateLimited));
        let mut req = request();
        req.interval_secs = 30;
        assert!(matches!(
            svc.preview(&req, TimeMs::new(0)).await,
            Err(ScheduleError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_quote_failure_surfaces() {
        let svc = service(MockQuoteProvider::new().with_failure(QuoteError::RateLimited));
        assert!(matches!(
            svc.preview(&request(), TimeMs::new(0)).await,
            Err(ScheduleError::QuoteUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_same_token_skips_provider() {
        let svc = service(MockQuoteProvider::new().with_failure(QuoteError::RateLimited));
        let mut req = request();
        req.dst_token = usdc();
        req.dst_decimals = 6;
        let params = svc.preview(&req, TimeMs::new(0)).await.unwrap();
        assert_eq!(params.min_output_per_cycle, d("100"));
    }

    #[tokio::test]
    async fn test_build_twap_descriptor() {
        let svc = service(MockQuoteProvider::new().with_rate(usdc(), weth(), d("0.0004")));
        let wallet = Address::from_str("0x1111111111111111111111111111111111111111").unwrap();
        let (params, desc) = svc
            .build_twap(&request(), &wallet, RoutingMode::SelfTransfer, TimeMs::new(0))
            .await
            .unwrap();
        assert_eq!(desc.chunk_count, params.total_cycles);
        assert_eq!(desc.chunk_in_amount, 100_000_000);
        assert_eq!(desc.min_out_amount, 39_600_000_000_000_000);
        assert_eq!(desc.recipient, wallet);
    }
}
