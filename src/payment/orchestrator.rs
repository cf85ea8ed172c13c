use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;

use super::balance::{check_native_sufficient, check_sufficient};
use super::executor::TransferExecutor;
use super::negotiator::QuoteNegotiator;
use super::{
    DestinationEncoding, ExecutionOutcome, ParamOverride, PaymentRequest,
    REJECT_INSUFFICIENT_BALANCE, REJECT_UNSUPPORTED_ASSET, RecipientScope, SwapMode,
    TransferIntent,
};
use crate::assets::{AssetId, AssetRegistry, format_units};
use crate::near::Account;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Floor for the balance check; the payment amount wins when larger.
    pub min_required_balance: u128,
    pub max_slippage_bps: u32,
    pub quote_window: TimeDelta,
    pub recipient_scope: RecipientScope,
    pub variants: Vec<ParamOverride>,
    /// Deposit native coin into the intents contract before quoting when the
    /// origin asset is `wrapped_native_asset`.
    pub wrap_native: bool,
    pub wrapped_native_asset: AssetId,
    /// Quote with `dry` set and stop before any deposit or transfer.
    pub dry_run: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_required_balance: 0,
            max_slippage_bps: 100,
            quote_window: TimeDelta::minutes(10),
            recipient_scope: RecipientScope::ExternalChain,
            variants: ParamOverride::default_variants(),
            wrap_native: false,
            wrapped_native_asset: AssetId::new("nep141:wrap.near"),
            dry_run: false,
        }
    }
}

/// Runs one payment to a terminal outcome.
#[async_trait]
pub trait PaymentRunner: Send + Sync {
    fn account_id(&self) -> &str;

    async fn run(&self, request: &PaymentRequest) -> ExecutionOutcome;
}

/// Balance check, optional native deposit, quote negotiation and transfer
/// execution. Holds no state between runs. In dry-run mode nothing is
/// deposited or transferred and runs end in [`ExecutionOutcome::Simulated`].
pub struct PaymentOrchestrator {
    account: Arc<dyn Account>,
    registry: Arc<AssetRegistry>,
    negotiator: QuoteNegotiator,
    executor: TransferExecutor,
    cfg: OrchestratorConfig,
}

impl PaymentOrchestrator {
    pub fn new(
        account: Arc<dyn Account>,
        registry: Arc<AssetRegistry>,
        negotiator: QuoteNegotiator,
        executor: TransferExecutor,
        cfg: OrchestratorConfig,
    ) -> Self {
        Self {
            account,
            registry,
            negotiator,
            executor,
            cfg,
        }
    }

    pub async fn run_with(
        &self,
        account: &dyn Account,
        request: &PaymentRequest,
    ) -> ExecutionOutcome {
        let payment_id = request.payment_id.as_str();

        let destination_asset = match self
            .registry
            .resolve_route(&request.token, &request.chain)
        {
            Ok(id) => id.clone(),
            Err(err) => {
                tracing::warn!(payment_id, error = %err, "payment rejected");
                return ExecutionOutcome::rejected(REJECT_UNSUPPORTED_ASSET);
            }
        };
        let origin = match self.registry.lookup(&request.origin_asset) {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(payment_id, error = %err, "payment rejected");
                return ExecutionOutcome::rejected(REJECT_UNSUPPORTED_ASSET);
            }
        };
        if request.amount == 0 {
            return ExecutionOutcome::rejected("amount must be greater than zero");
        }

        let required = request.amount.max(self.cfg.min_required_balance);
        if let Err(outcome) = self.ensure_funds(account, request, required).await {
            return outcome;
        }
        tracing::info!(
            payment_id,
            required = %format_units(required, origin.decimals),
            symbol = %origin.symbol,
            "balance verified"
        );

        let intent = TransferIntent {
            origin_asset: request.origin_asset.clone(),
            destination_asset,
            amount: request.amount,
            recipient: request.recipient.clone(),
            recipient_scope: self.cfg.recipient_scope,
            refund_recipient: account.account_id().to_string(),
            deadline_window: self.cfg.quote_window,
            max_slippage_bps: self.cfg.max_slippage_bps,
            swap_mode: SwapMode::ExactInput,
            destination_encoding: DestinationEncoding::AssetId,
            dry: self.cfg.dry_run,
        };

        let quote = match self.negotiator.negotiate(&intent, &self.cfg.variants).await {
            Ok(quote) => quote,
            Err(exhausted) => {
                tracing::warn!(payment_id, error = %exhausted, "quote negotiation exhausted");
                return ExecutionOutcome::failed(exhausted.to_string());
            }
        };

        // An exact-output quote may ask for more input than was verified.
        if quote.quoted_input_amount > required {
            let held =
                match check_sufficient(account, &request.origin_asset, quote.quoted_input_amount)
                    .await
                {
                    Ok(held) => held,
                    Err(err) => return ExecutionOutcome::failed(err.to_string()),
                };
            if !held.sufficient {
                tracing::warn!(
                    payment_id,
                    variant = %quote.variant,
                    available = %held.available,
                    quoted_input = %quote.quoted_input_amount,
                    "insufficient balance for quoted input"
                );
                return ExecutionOutcome::rejected(REJECT_INSUFFICIENT_BALANCE);
            }
        }

        if self.cfg.dry_run {
            tracing::info!(
                payment_id,
                variant = %quote.variant,
                amount_in = %quote.quoted_input_amount,
                amount_out = %quote.quoted_output_amount,
                "dry run; transfer skipped"
            );
            return ExecutionOutcome::Simulated {
                quoted_input_amount: quote.quoted_input_amount,
                quoted_output_amount: quote.quoted_output_amount,
            };
        }

        match self
            .executor
            .execute(account, quote, &request.origin_asset)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(payment_id, error = %err, "transfer execution failed");
                ExecutionOutcome::failed(err.to_string())
            }
        }
    }

    /// Ensures `required` of the origin asset is held in the intents
    /// contract, depositing native coin for the shortfall when configured.
    /// The deposited balance is re-read rather than assumed, so a partially
    /// completed earlier deposit is safe to build on.
    async fn ensure_funds(
        &self,
        account: &dyn Account,
        request: &PaymentRequest,
        required: u128,
    ) -> Result<(), ExecutionOutcome> {
        let payment_id = request.payment_id.as_str();
        let held = check_sufficient(account, &request.origin_asset, required)
            .await
            .map_err(|e| ExecutionOutcome::failed(e.to_string()))?;
        if held.sufficient {
            return Ok(());
        }

        let wraps_native =
            self.cfg.wrap_native && request.origin_asset == self.cfg.wrapped_native_asset;
        if !wraps_native {
            tracing::warn!(
                payment_id,
                available = %held.available,
                required = %required,
                "insufficient balance"
            );
            return Err(ExecutionOutcome::rejected(REJECT_INSUFFICIENT_BALANCE));
        }

        let shortfall = held.shortfall(required);
        let native = check_native_sufficient(account, shortfall)
            .await
            .map_err(|e| ExecutionOutcome::failed(e.to_string()))?;
        if !native.sufficient {
            tracing::warn!(
                payment_id,
                available = %native.available,
                shortfall = %shortfall,
                "insufficient native balance for deposit"
            );
            return Err(ExecutionOutcome::rejected(REJECT_INSUFFICIENT_BALANCE));
        }

        if self.cfg.dry_run {
            tracing::info!(payment_id, amount = %shortfall, "dry run; native deposit skipped");
            return Ok(());
        }

        let tx_hash = account
            .deposit_native(shortfall)
            .await
            .map_err(|e| ExecutionOutcome::failed(format!("native deposit: {e}")))?;
        tracing::info!(payment_id, amount = %shortfall, tx_hash = %tx_hash, "native deposit submitted");

        let after = check_sufficient(account, &request.origin_asset, required)
            .await
            .map_err(|e| ExecutionOutcome::failed(e.to_string()))?;
        if !after.sufficient {
            return Err(ExecutionOutcome::failed(format!(
                "deposit not reflected in balance: available={} required={required}",
                after.available
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentRunner for PaymentOrchestrator {
    fn account_id(&self) -> &str {
        self.account.account_id()
    }

    async fn run(&self, request: &PaymentRequest) -> ExecutionOutcome {
        self.run_with(self.account.as_ref(), request).await
    }
}
