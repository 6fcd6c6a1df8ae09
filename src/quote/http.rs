//! HTTP quote provider speaking the common aggregator `/quote` shape.

use super::{Quote, QuoteError, QuoteProvider, QuoteRequest};
use crate::domain::Decimal;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Quote provider backed by an aggregator's `GET {base}/quote` endpoint.
///
/// Amounts travel in base units: `amount` in the query, `outAmount` in the
/// response body.
#[derive(Debug, Clone)]
pub struct HttpQuoteProvider {
    client: Client,
    base_url: String,
}

impl HttpQuoteProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_quote(&self, query: &[(&str, String)]) -> Result<serde_json::Value, QuoteError> {
        let url = format!("{}/quote", self.base_url);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(10)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(&url)
                .query(query)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(QuoteError::NetworkError(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(QuoteError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(QuoteError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                let message = response.text().await.map_err(|e| {
                    backoff::Error::transient(QuoteError::NetworkError(e.to_string()))
                })?;
                return Err(backoff::Error::permanent(rejection(status.as_u16(), message)));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(QuoteError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        let amount = request
            .amount
            .to_base_units(request.src_decimals)
            .ok_or_else(|| {
                QuoteError::InvalidRequest(format!(
                    "amount {} not representable with {} decimals",
                    request.amount, request.src_decimals
                ))
            })?;

        debug!(
            src = %request.src_token,
            dst = %request.dst_token,
            amount = %amount,
            "Fetching quote"
        );

        let query = [
            ("inputMint", request.src_token.to_string()),
            ("outputMint", request.dst_token.to_string()),
            ("amount", amount.to_string()),
        ];
        let body = self.get_quote(&query).await?;
        parse_quote(&body, request.dst_decimals)
    }
}

/// Classify a non-retryable error response by its body.
fn rejection(status: u16, message: String) -> QuoteError {
    if message.contains("NO_ROUTES_FOUND") || message.contains("liquidity") {
        QuoteError::InsufficientLiquidity
    } else {
        QuoteError::HttpError { status, message }
    }
}

fn parse_quote(body: &serde_json::Value, dst_decimals: u32) -> Result<Quote, QuoteError> {
    let out = match body.get("outAmount") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Err(QuoteError::ParseError("missing outAmount".to_string())),
    };
    let units = out
        .parse::<u128>()
        .map_err(|e| QuoteError::ParseError(format!("invalid outAmount {}: {}", out, e)))?;
    if units == 0 {
        return Err(QuoteError::InsufficientLiquidity);
    }
    let destination_amount = Decimal::from_base_units(units, dst_decimals)
        .ok_or_else(|| QuoteError::ParseError(format!("outAmount {} out of range", out)))?;
    Ok(Quote { destination_amount })
}
