//! Quote provider boundary: the 1Click intents quote and status API.

pub mod client;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

use types::{QuoteRequest, QuoteResponse, StatusResponse};

/// Any failure talking to the provider: transport error, timeout, or a
/// non-success HTTP status with the provider's message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("provider error (status {status:?}): {message}")]
pub struct ProviderError {
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn request_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ProviderError>;

    /// Execution status of the quote identified by its deposit address.
    async fn poll_status(&self, deposit_address: &str) -> Result<StatusResponse, ProviderError>;
}
