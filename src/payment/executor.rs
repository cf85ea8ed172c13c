use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::Instant;

use super::{ExecutionOutcome, Quote};
use crate::assets::AssetId;
use crate::near::Account;
use crate::oneclick::QuoteProvider;
use crate::oneclick::types::{ExecutionStatus, StatusResponse};

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub poll_interval: Duration,
    pub settlement_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            settlement_timeout: Duration::from_secs(10 * 60),
        }
    }
}

/// Errors before settlement polling starts. The quote cannot be reused
/// after either of these; a fresh one must be negotiated.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("quote expired at {expiry}")]
    QuoteExpired { expiry: DateTime<Utc> },

    #[error("submission failed: {cause}")]
    SubmissionFailed { cause: String },
}

#[derive(Clone)]
pub struct TransferExecutor {
    provider: Arc<dyn QuoteProvider>,
    cfg: ExecutorConfig,
}

impl TransferExecutor {
    pub fn new(provider: Arc<dyn QuoteProvider>, cfg: ExecutorConfig) -> Self {
        Self { provider, cfg }
    }

    pub async fn execute(
        &self,
        account: &dyn Account,
        quote: Quote,
        origin_asset: &AssetId,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let tx_hash = self.submit(account, &quote, origin_asset).await?;
        tracing::info!(
            deposit_address = %quote.deposit_address,
            amount = %quote.quoted_input_amount,
            tx_hash = %tx_hash,
            "transfer submitted"
        );

        Ok(self.await_settlement(&quote).await)
    }

    async fn submit(
        &self,
        account: &dyn Account,
        quote: &Quote,
        origin_asset: &AssetId,
    ) -> Result<String, ExecutionError> {
        if quote.is_expired(Utc::now()) {
            return Err(ExecutionError::QuoteExpired {
                expiry: quote.expiry,
            });
        }

        account
            .submit_transfer(
                &quote.deposit_address,
                origin_asset,
                quote.quoted_input_amount,
            )
            .await
            .map_err(|e| ExecutionError::SubmissionFailed {
                cause: e.to_string(),
            })
    }

    /// Polls until the provider reports a terminal state or the settlement
    /// timeout elapses.
    pub async fn await_settlement(&self, quote: &Quote) -> ExecutionOutcome {
        let deadline = Instant::now() + self.cfg.settlement_timeout;

        loop {
            match self.provider.poll_status(&quote.provider_quote_id).await {
                Ok(status) => {
                    if let Some(outcome) = terminal_outcome(&status, quote) {
                        tracing::info!(
                            deposit_address = %quote.deposit_address,
                            status = ?status.status,
                            outcome = outcome.kind(),
                            "settlement finished"
                        );
                        return outcome;
                    }
                    tracing::debug!(
                        deposit_address = %quote.deposit_address,
                        status = ?status.status,
                        "settlement pending"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        deposit_address = %quote.deposit_address,
                        error = %err,
                        "status poll failed"
                    );
                }
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    deposit_address = %quote.deposit_address,
                    timeout_secs = self.cfg.settlement_timeout.as_secs(),
                    "settlement polling timed out"
                );
                return ExecutionOutcome::TimedOut;
            }

            tokio::time::sleep(self.cfg.poll_interval.min(deadline - now)).await;
        }
    }
}

fn terminal_outcome(status: &StatusResponse, quote: &Quote) -> Option<ExecutionOutcome> {
    let details = status.swap_details.clone().unwrap_or_default();
    match status.status {
        ExecutionStatus::Success => {
            let settled_amount = details
                .amount_out
                .and_then(|a| a.parse::<u128>().ok())
                .unwrap_or(quote.quoted_output_amount);
            Some(ExecutionOutcome::Completed { settled_amount })
        }
        ExecutionStatus::Refunded => Some(ExecutionOutcome::failed(match details.refund_reason {
            Some(reason) => format!("refunded: {reason}"),
            None => "refunded by provider".to_string(),
        })),
        ExecutionStatus::Failed => Some(ExecutionOutcome::failed("provider reported failure")),
        _ => None,
    }
}
