//! In-process stand-ins for the NEAR account and the 1Click API. Each test
//! binary uses a different subset.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};

use recurring_intents::assets::{AssetId, AssetRegistry};
use recurring_intents::near::{Account, AccountError};
use recurring_intents::oneclick::types::{
    ExecutionStatus, QuoteDetails, QuoteRequest, QuoteResponse, StatusResponse, SwapDetails,
};
use recurring_intents::oneclick::{ProviderError, QuoteProvider};
use recurring_intents::payment::executor::{ExecutorConfig, TransferExecutor};
use recurring_intents::payment::negotiator::QuoteNegotiator;
use recurring_intents::payment::orchestrator::{
    OrchestratorConfig, PaymentOrchestrator, PaymentRunner,
};
use recurring_intents::payment::{ExecutionOutcome, PaymentRequest};

pub const PAYER: &str = "payer.near";
pub const WRAP_NEAR: &str = "nep141:wrap.near";
pub const NEAR_USDC: &str =
    "nep141:17208628f84f5d6ad33f0da3bbbeb27ffcb398eac501a31bd6ad2011e36133a1";
pub const BASE_USDC: &str = "nep141:base-0x833589fcd6edb6e08f4c7c32d4f71b54bda02913.omft.near";
pub const RECIPIENT: &str = "0x1111111111111111111111111111111111111111";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: String,
    pub asset: AssetId,
    pub amount: u128,
}

#[derive(Debug, Default)]
pub struct FakeAccount {
    balances: Mutex<HashMap<AssetId, u128>>,
    native: Mutex<u128>,
    balance_error: Mutex<Option<String>>,
    submit_error: Mutex<Option<String>>,
    submissions: Mutex<Vec<Submission>>,
    deposits: Mutex<Vec<u128>>,
}

impl FakeAccount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, asset: &str, amount: u128) -> Self {
        self.set_balance(asset, amount);
        self
    }

    pub fn with_native(self, amount: u128) -> Self {
        *self.native.lock().unwrap() = amount;
        self
    }

    pub fn set_balance(&self, asset: &str, amount: u128) {
        self.balances
            .lock()
            .unwrap()
            .insert(AssetId::new(asset), amount);
    }

    pub fn balance(&self, asset: &str) -> u128 {
        self.balances
            .lock()
            .unwrap()
            .get(&AssetId::new(asset))
            .copied()
            .unwrap_or(0)
    }

    pub fn fail_balance_queries(&self, message: &str) {
        *self.balance_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_submissions(&self, message: &str) {
        *self.submit_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn deposits(&self) -> Vec<u128> {
        self.deposits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Account for FakeAccount {
    fn account_id(&self) -> &str {
        PAYER
    }

    async fn native_balance(&self) -> Result<u128, AccountError> {
        if let Some(message) = self.balance_error.lock().unwrap().clone() {
            return Err(AccountError::Query(message));
        }
        Ok(*self.native.lock().unwrap())
    }

    async fn query_balance(&self, asset: &AssetId) -> Result<u128, AccountError> {
        if let Some(message) = self.balance_error.lock().unwrap().clone() {
            return Err(AccountError::Query(message));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(asset)
            .copied()
            .unwrap_or(0))
    }

    async fn deposit_native(&self, amount: u128) -> Result<String, AccountError> {
        {
            let mut native = self.native.lock().unwrap();
            if *native < amount {
                return Err(AccountError::Transaction("not enough native".to_string()));
            }
            *native -= amount;
        }
        *self
            .balances
            .lock()
            .unwrap()
            .entry(AssetId::new(WRAP_NEAR))
            .or_default() += amount;
        self.deposits.lock().unwrap().push(amount);
        Ok(format!("deposit-tx-{amount}"))
    }

    async fn submit_transfer(
        &self,
        target: &str,
        asset: &AssetId,
        amount: u128,
    ) -> Result<String, AccountError> {
        if let Some(message) = self.submit_error.lock().unwrap().clone() {
            return Err(AccountError::Transaction(message));
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(Submission {
            target: target.to_string(),
            asset: asset.clone(),
            amount,
        });
        Ok(format!("transfer-tx-{}", submissions.len()))
    }
}

/// Replays queued quote and status responses in order. Once the status
/// queue runs dry every poll reports `fallback_status`.
#[derive(Debug)]
pub struct ScriptedProvider {
    quotes: Mutex<VecDeque<Result<QuoteResponse, ProviderError>>>,
    statuses: Mutex<VecDeque<Result<StatusResponse, ProviderError>>>,
    fallback_status: Mutex<StatusResponse>,
    quote_requests: Mutex<Vec<QuoteRequest>>,
    status_polls: Mutex<Vec<String>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            quotes: Mutex::default(),
            statuses: Mutex::default(),
            fallback_status: Mutex::new(status(ExecutionStatus::PendingDeposit)),
            quote_requests: Mutex::default(),
            status_polls: Mutex::default(),
        }
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_quote(&self, quote: Result<QuoteResponse, ProviderError>) {
        self.quotes.lock().unwrap().push_back(quote);
    }

    pub fn push_quote_error(&self, status: u16, message: &str) {
        self.push_quote(Err(ProviderError::new(Some(status), message)));
    }

    pub fn push_status(&self, status: Result<StatusResponse, ProviderError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn set_fallback_status(&self, status: StatusResponse) {
        *self.fallback_status.lock().unwrap() = status;
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.quote_requests.lock().unwrap().clone()
    }

    pub fn status_polls(&self) -> Vec<String> {
        self.status_polls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    async fn request_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ProviderError> {
        self.quote_requests.lock().unwrap().push(request.clone());
        self.quotes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::new(Some(400), "no quote scripted")))
    }

    async fn poll_status(&self, deposit_address: &str) -> Result<StatusResponse, ProviderError> {
        self.status_polls
            .lock()
            .unwrap()
            .push(deposit_address.to_string());
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback_status.lock().unwrap().clone()))
    }
}

pub fn quote_response(deposit_address: &str, amount_in: u128, amount_out: u128) -> QuoteResponse {
    QuoteResponse {
        timestamp: None,
        signature: None,
        quote: QuoteDetails {
            deposit_address: Some(deposit_address.to_string()),
            amount_in: amount_in.to_string(),
            amount_in_formatted: None,
            amount_out: amount_out.to_string(),
            amount_out_formatted: None,
            min_amount_out: None,
            deadline: Some(Utc::now() + TimeDelta::minutes(10)),
            time_when_inactive: None,
            time_estimate: Some(20),
        },
    }
}

pub fn status(status: ExecutionStatus) -> StatusResponse {
    StatusResponse {
        status,
        updated_at: None,
        swap_details: None,
    }
}

pub fn settled(amount_out: u128) -> StatusResponse {
    StatusResponse {
        status: ExecutionStatus::Success,
        updated_at: None,
        swap_details: Some(SwapDetails {
            amount_out: Some(amount_out.to_string()),
            ..Default::default()
        }),
    }
}

pub fn fast_executor_config() -> ExecutorConfig {
    ExecutorConfig {
        poll_interval: Duration::from_millis(10),
        settlement_timeout: Duration::from_millis(200),
    }
}

pub fn orchestrator(
    account: Arc<FakeAccount>,
    provider: Arc<ScriptedProvider>,
    cfg: OrchestratorConfig,
) -> PaymentOrchestrator {
    let registry = Arc::new(AssetRegistry::builtin());
    let negotiator = QuoteNegotiator::new(provider.clone(), registry.clone());
    let executor = TransferExecutor::new(provider, fast_executor_config());
    PaymentOrchestrator::new(account, registry, negotiator, executor, cfg)
}

pub fn usdc_payment(amount: u128) -> PaymentRequest {
    PaymentRequest {
        payment_id: "payment-1".to_string(),
        recipient: RECIPIENT.to_string(),
        amount,
        origin_asset: AssetId::new(NEAR_USDC),
        token: "USDC".to_string(),
        chain: "base".to_string(),
    }
}

/// Runner that returns queued outcomes and records every request. Payment
/// ids in the panic set make the run panic.
#[derive(Debug)]
pub struct ScriptedRunner {
    outcomes: Mutex<VecDeque<ExecutionOutcome>>,
    default_outcome: ExecutionOutcome,
    calls: Mutex<Vec<PaymentRequest>>,
    panic_for: Mutex<HashSet<String>>,
    delay: Option<Duration>,
}

impl ScriptedRunner {
    pub fn completing(settled_amount: u128) -> Self {
        Self::returning(ExecutionOutcome::Completed { settled_amount })
    }

    pub fn returning(outcome: ExecutionOutcome) -> Self {
        Self {
            outcomes: Mutex::default(),
            default_outcome: outcome,
            calls: Mutex::default(),
            panic_for: Mutex::default(),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_outcome(&self, outcome: ExecutionOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn panic_for(&self, payment_id: &str) {
        self.panic_for
            .lock()
            .unwrap()
            .insert(payment_id.to_string());
    }

    pub fn calls(&self) -> Vec<PaymentRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentRunner for ScriptedRunner {
    fn account_id(&self) -> &str {
        PAYER
    }

    async fn run(&self, request: &PaymentRequest) -> ExecutionOutcome {
        self.calls.lock().unwrap().push(request.clone());
        if self
            .panic_for
            .lock()
            .unwrap()
            .contains(&request.payment_id)
        {
            panic!("scripted panic for {}", request.payment_id);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.default_outcome.clone())
    }
}
