//! Quote provider abstraction: current exchange-rate quotes for a token pair.

use crate::domain::{Address, Decimal};
use async_trait::async_trait;
use std::fmt;

pub mod http;
pub mod mock;

pub use http::HttpQuoteProvider;
pub use mock::MockQuoteProvider;

/// A quote request for spending `amount` of `src_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub src_token: Address,
    pub dst_token: Address,
    /// Human-readable source amount.
    pub amount: Decimal,
    pub src_decimals: u32,
    pub dst_decimals: u32,
}

/// Destination amount the liquidity provider currently returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub destination_amount: Decimal,
}

/// Quote provider trait.
///
/// Implementations own their retry/backoff policy; callers treat any error
/// as "no quote" and may try again later.
#[async_trait]
pub trait QuoteProvider: Send + Sync + fmt::Debug {
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError>;
}

/// Error type for quote operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 4xx invalid parameters, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// The pair has no route for this amount
    InsufficientLiquidity,
    /// Request cannot be expressed (e.g. amount not representable in base units)
    InvalidRequest(String),
}

impl fmt::Display for QuoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            QuoteError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            QuoteError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            QuoteError::RateLimited => write!(f, "Rate limited"),
            QuoteError::InsufficientLiquidity => write!(f, "Insufficient liquidity"),
            QuoteError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for QuoteError {}
