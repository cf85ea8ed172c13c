use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use super::{DestinationEncoding, ParamOverride, Quote, RecipientScope, SwapMode, TransferIntent};
use crate::assets::AssetRegistry;
use crate::oneclick::types::{
    DepositType, QuoteRequest, QuoteResponse, RecipientType, RefundType, SwapType,
};
use crate::oneclick::{ProviderError, QuoteProvider};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariantError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("unusable quote: {0}")]
    UnusableQuote(String),

    #[error("cannot encode destination asset: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantFailure {
    pub variant: ParamOverride,
    pub error: VariantError,
}

/// Every variant was tried and none produced a usable quote. Failures are
/// kept in the order the variants were attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationExhausted {
    pub failures: Vec<VariantFailure>,
}

impl fmt::Display for NegotiationExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all {} quote variants failed", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{} ({})", failure.variant, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for NegotiationExhausted {}

#[derive(Clone)]
pub struct QuoteNegotiator {
    provider: Arc<dyn QuoteProvider>,
    registry: Arc<AssetRegistry>,
}

impl QuoteNegotiator {
    pub fn new(provider: Arc<dyn QuoteProvider>, registry: Arc<AssetRegistry>) -> Self {
        Self { provider, registry }
    }

    /// Tries `variants` in order and returns the first usable quote. Each
    /// attempt gets a deadline computed from the current time.
    pub async fn negotiate(
        &self,
        intent: &TransferIntent,
        variants: &[ParamOverride],
    ) -> Result<Quote, NegotiationExhausted> {
        let mut failures = Vec::with_capacity(variants.len());

        for variant in variants {
            match self.attempt(intent, variant).await {
                Ok(quote) => {
                    tracing::info!(
                        variant = %variant,
                        deposit_address = %quote.deposit_address,
                        amount_in = %quote.quoted_input_amount,
                        amount_out = %quote.quoted_output_amount,
                        expiry = %quote.expiry,
                        "quote accepted"
                    );
                    return Ok(quote);
                }
                Err(error) => {
                    tracing::warn!(variant = %variant, error = %error, "quote variant failed");
                    failures.push(VariantFailure {
                        variant: variant.clone(),
                        error,
                    });
                }
            }
        }

        Err(NegotiationExhausted { failures })
    }

    async fn attempt(
        &self,
        intent: &TransferIntent,
        variant: &ParamOverride,
    ) -> Result<Quote, VariantError> {
        let request = self.build_request(&variant.apply(intent))?;
        let response = self.provider.request_quote(&request).await?;
        accept(response, &request, &variant.label)
    }

    pub fn build_request(&self, intent: &TransferIntent) -> Result<QuoteRequest, VariantError> {
        if intent.swap_mode == SwapMode::ExactOutput {
            self.check_same_units(intent)?;
        }
        let destination_asset = self.encode_destination(intent)?;

        Ok(QuoteRequest {
            dry: intent.dry,
            swap_type: match intent.swap_mode {
                SwapMode::ExactInput => SwapType::ExactInput,
                SwapMode::ExactOutput => SwapType::ExactOutput,
            },
            slippage_tolerance: intent.max_slippage_bps,
            origin_asset: intent.origin_asset.to_string(),
            deposit_type: DepositType::Intents,
            destination_asset,
            amount: intent.amount.to_string(),
            refund_to: intent.refund_recipient.clone(),
            refund_type: RefundType::Intents,
            recipient: intent.recipient.clone(),
            recipient_type: match intent.recipient_scope {
                RecipientScope::ExternalChain => RecipientType::DestinationChain,
                RecipientScope::WithinProvider => RecipientType::Intents,
            },
            deadline: Utc::now() + intent.deadline_window,
            referral: None,
            quote_waiting_time_ms: None,
        })
    }

    /// `amount` is denominated in the origin asset, so it can only be asked
    /// for as an exact output when both sides are the same token in the same
    /// units.
    fn check_same_units(&self, intent: &TransferIntent) -> Result<(), VariantError> {
        let origin = self
            .registry
            .lookup(&intent.origin_asset)
            .map_err(|e| VariantError::Encoding(e.to_string()))?;
        let destination = self
            .registry
            .lookup(&intent.destination_asset)
            .map_err(|e| VariantError::Encoding(e.to_string()))?;

        if origin.decimals != destination.decimals
            || !origin.symbol.eq_ignore_ascii_case(&destination.symbol)
        {
            return Err(VariantError::Encoding(format!(
                "exact output needs matching units: {} {} ({} decimals) vs {} {} ({} decimals)",
                intent.origin_asset,
                origin.symbol,
                origin.decimals,
                intent.destination_asset,
                destination.symbol,
                destination.decimals
            )));
        }
        Ok(())
    }

    fn encode_destination(&self, intent: &TransferIntent) -> Result<String, VariantError> {
        if intent.destination_encoding == DestinationEncoding::AssetId {
            return Ok(intent.destination_asset.to_string());
        }

        let info = self
            .registry
            .lookup(&intent.destination_asset)
            .map_err(|e| VariantError::Encoding(e.to_string()))?;
        if info.is_native() {
            return Err(VariantError::Encoding(format!(
                "{} is a native coin without a contract address",
                intent.destination_asset
            )));
        }

        let address = if info.address.starts_with("0x") {
            info.address.to_ascii_lowercase()
        } else {
            info.address.clone()
        };
        Ok(match intent.destination_encoding {
            DestinationEncoding::ChainPrefixed => format!("{}:{address}", info.chain),
            _ => address,
        })
    }
}

fn accept(
    response: QuoteResponse,
    request: &QuoteRequest,
    variant: &str,
) -> Result<Quote, VariantError> {
    let details = response.quote;

    let deposit_address = details.deposit_address.filter(|a| !a.trim().is_empty());
    let deposit_address = match (deposit_address, request.dry) {
        (Some(address), _) => address,
        (None, true) => String::new(),
        (None, false) => {
            return Err(VariantError::UnusableQuote(
                "missing deposit address".to_string(),
            ));
        }
    };

    let expiry = details
        .deadline
        .or(details.time_when_inactive)
        .unwrap_or(request.deadline);
    if expiry <= Utc::now() {
        return Err(VariantError::UnusableQuote(format!(
            "quote already expired at {expiry}"
        )));
    }

    let quoted_input_amount = parse_amount("amountIn", &details.amount_in)?;
    let quoted_output_amount = parse_amount("amountOut", &details.amount_out)?;

    Ok(Quote {
        quoted_input_amount,
        quoted_output_amount,
        provider_quote_id: deposit_address.clone(),
        deposit_address,
        expiry,
        variant: variant.to_string(),
    })
}

fn parse_amount(field: &str, value: &str) -> Result<u128, VariantError> {
    value
        .parse::<u128>()
        .map_err(|e| VariantError::UnusableQuote(format!("invalid {field} {value:?}: {e}")))
}
