mod support {
    pub mod fakes;
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{TimeDelta, Utc};

use recurring_intents::assets::AssetId;
use recurring_intents::oneclick::ProviderError;
use recurring_intents::oneclick::types::{ExecutionStatus, StatusResponse, SwapDetails};
use recurring_intents::payment::executor::{ExecutionError, ExecutorConfig, TransferExecutor};
use recurring_intents::payment::{ExecutionOutcome, Quote};

use support::fakes::{
    FakeAccount, NEAR_USDC, ScriptedProvider, Submission, fast_executor_config, settled, status,
};

fn quote(expires_in: TimeDelta) -> Quote {
    Quote {
        quoted_input_amount: 100_000,
        quoted_output_amount: 99_000,
        deposit_address: "deposit-addr".to_string(),
        expiry: Utc::now() + expires_in,
        provider_quote_id: "deposit-addr".to_string(),
        variant: "asset-id".to_string(),
    }
}

#[tokio::test]
async fn expired_quote_is_never_submitted() {
    let provider = Arc::new(ScriptedProvider::new());
    let account = FakeAccount::new().with_balance(NEAR_USDC, 1_000_000);
    let executor = TransferExecutor::new(provider.clone(), fast_executor_config());

    let err = executor
        .execute(&account, quote(-TimeDelta::seconds(1)), &AssetId::new(NEAR_USDC))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::QuoteExpired { .. }), "{err}");
    assert!(account.submissions().is_empty());
    assert!(provider.status_polls().is_empty());
}

#[tokio::test]
async fn submits_quoted_input_to_the_deposit_address() -> Result<()> {
    let provider = Arc::new(ScriptedProvider::new());
    provider.push_status(Ok(status(ExecutionStatus::PendingDeposit)));
    provider.push_status(Ok(status(ExecutionStatus::Processing)));
    provider.push_status(Ok(settled(98_765)));
    let account = FakeAccount::new().with_balance(NEAR_USDC, 1_000_000);
    let executor = TransferExecutor::new(provider.clone(), fast_executor_config());

    let outcome = executor
        .execute(&account, quote(TimeDelta::minutes(5)), &AssetId::new(NEAR_USDC))
        .await?;

    assert_eq!(
        outcome,
        ExecutionOutcome::Completed {
            settled_amount: 98_765
        }
    );
    assert_eq!(
        account.submissions(),
        vec![Submission {
            target: "deposit-addr".to_string(),
            asset: AssetId::new(NEAR_USDC),
            amount: 100_000,
        }]
    );
    assert_eq!(provider.status_polls(), vec!["deposit-addr"; 3]);
    Ok(())
}

#[tokio::test]
async fn success_without_details_settles_the_quoted_output() -> Result<()> {
    let provider = Arc::new(ScriptedProvider::new());
    provider.push_status(Ok(status(ExecutionStatus::Success)));
    let account = FakeAccount::new();
    let executor = TransferExecutor::new(provider, fast_executor_config());

    let outcome = executor
        .execute(&account, quote(TimeDelta::minutes(5)), &AssetId::new(NEAR_USDC))
        .await?;

    assert_eq!(
        outcome,
        ExecutionOutcome::Completed {
            settled_amount: 99_000
        }
    );
    Ok(())
}

#[tokio::test]
async fn refund_and_failure_are_failed_outcomes() -> Result<()> {
    let account = FakeAccount::new();

    let provider = Arc::new(ScriptedProvider::new());
    provider.push_status(Ok(StatusResponse {
        status: ExecutionStatus::Refunded,
        updated_at: None,
        swap_details: Some(SwapDetails {
            refund_reason: Some("slippage exceeded".to_string()),
            ..Default::default()
        }),
    }));
    let executor = TransferExecutor::new(provider, fast_executor_config());
    let outcome = executor
        .execute(&account, quote(TimeDelta::minutes(5)), &AssetId::new(NEAR_USDC))
        .await?;
    assert_eq!(outcome, ExecutionOutcome::failed("refunded: slippage exceeded"));

    let provider = Arc::new(ScriptedProvider::new());
    provider.push_status(Ok(status(ExecutionStatus::Failed)));
    let executor = TransferExecutor::new(provider, fast_executor_config());
    let outcome = executor
        .execute(&account, quote(TimeDelta::minutes(5)), &AssetId::new(NEAR_USDC))
        .await?;
    assert!(matches!(outcome, ExecutionOutcome::Failed { .. }));
    Ok(())
}

#[tokio::test]
async fn polling_past_the_cap_times_out() -> Result<()> {
    let provider = Arc::new(ScriptedProvider::new());
    provider.set_fallback_status(status(ExecutionStatus::KnownDepositTx));
    let account = FakeAccount::new();
    let executor = TransferExecutor::new(
        provider.clone(),
        ExecutorConfig {
            poll_interval: Duration::from_millis(10),
            settlement_timeout: Duration::from_millis(80),
        },
    );

    let outcome = executor
        .execute(&account, quote(TimeDelta::minutes(5)), &AssetId::new(NEAR_USDC))
        .await?;

    assert_eq!(outcome, ExecutionOutcome::TimedOut);
    assert_eq!(account.submissions().len(), 1);
    assert!(provider.status_polls().len() >= 2);
    Ok(())
}

#[tokio::test]
async fn poll_errors_do_not_end_settlement() -> Result<()> {
    let provider = Arc::new(ScriptedProvider::new());
    provider.push_status(Err(ProviderError::new(Some(502), "bad gateway")));
    provider.push_status(Err(ProviderError::new(None, "connection reset")));
    provider.push_status(Ok(settled(1)));
    let account = FakeAccount::new();
    let executor = TransferExecutor::new(provider.clone(), fast_executor_config());

    let outcome = executor
        .execute(&account, quote(TimeDelta::minutes(5)), &AssetId::new(NEAR_USDC))
        .await?;

    assert_eq!(outcome, ExecutionOutcome::Completed { settled_amount: 1 });
    assert_eq!(provider.status_polls().len(), 3);
    Ok(())
}

#[tokio::test]
async fn rejected_submission_is_a_submission_error() {
    let provider = Arc::new(ScriptedProvider::new());
    let account = FakeAccount::new();
    account.fail_submissions("InvalidNonce");
    let executor = TransferExecutor::new(provider.clone(), fast_executor_config());

    let err = executor
        .execute(&account, quote(TimeDelta::minutes(5)), &AssetId::new(NEAR_USDC))
        .await
        .unwrap_err();

    match err {
        ExecutionError::SubmissionFailed { cause } => assert!(cause.contains("InvalidNonce")),
        other => panic!("unexpected error {other}"),
    }
    assert!(provider.status_polls().is_empty());
}
