mod support {
    pub mod fakes;
}

use anyhow::Result;

use recurring_intents::assets::AssetId;
use recurring_intents::payment::balance::{
    BalanceCheck, check_native_sufficient, check_sufficient,
};

use support::fakes::{FakeAccount, NEAR_USDC};

#[tokio::test]
async fn sufficient_matches_integer_comparison() -> Result<()> {
    let asset = AssetId::new(NEAR_USDC);

    for (available, required) in [
        (0, 0),
        (0, 1),
        (99_999, 100_000),
        (100_000, 100_000),
        (100_001, 100_000),
        (u128::MAX, u128::MAX - 1),
    ] {
        let account = FakeAccount::new().with_balance(NEAR_USDC, available);
        let check = check_sufficient(&account, &asset, required).await?;
        assert_eq!(
            check,
            BalanceCheck {
                sufficient: available >= required,
                available,
            },
            "available={available} required={required}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn tenth_of_usdc_against_half_of_it() -> Result<()> {
    let account = FakeAccount::new().with_balance(NEAR_USDC, 50_000);

    let check = check_sufficient(&account, &AssetId::new(NEAR_USDC), 100_000).await?;

    assert!(!check.sufficient);
    assert_eq!(check.available, 50_000);
    assert_eq!(check.shortfall(100_000), 50_000);
    Ok(())
}

#[tokio::test]
async fn unknown_asset_reads_as_zero() -> Result<()> {
    let account = FakeAccount::new();

    let check = check_sufficient(&account, &AssetId::new("nep141:other.near"), 1).await?;

    assert_eq!(check.available, 0);
    assert!(!check.sufficient);
    Ok(())
}

#[tokio::test]
async fn query_failure_is_an_error_not_a_rejection() {
    let account = FakeAccount::new().with_balance(NEAR_USDC, 1_000_000);
    account.fail_balance_queries("rpc unavailable");

    let err = check_sufficient(&account, &AssetId::new(NEAR_USDC), 1)
        .await
        .unwrap_err();

    assert_eq!(err.asset, NEAR_USDC);
    assert!(err.to_string().contains("rpc unavailable"), "{err}");
}

#[tokio::test]
async fn native_balance_is_checked_separately() -> Result<()> {
    let account = FakeAccount::new()
        .with_native(5)
        .with_balance(NEAR_USDC, 1_000);

    let check = check_native_sufficient(&account, 6).await?;
    assert_eq!(check, BalanceCheck::evaluate(5, 6));
    assert!(!check.sufficient);

    let check = check_native_sufficient(&account, 5).await?;
    assert!(check.sufficient);
    Ok(())
}
