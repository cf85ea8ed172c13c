use thiserror::Error;

use crate::assets::AssetId;
use crate::near::{Account, AccountError};

#[derive(Debug, Error)]
#[error("balance query failed for {asset}: {source}")]
pub struct BalanceQueryError {
    pub asset: String,
    #[source]
    pub source: AccountError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceCheck {
    pub sufficient: bool,
    pub available: u128,
}

impl BalanceCheck {
    pub fn evaluate(available: u128, required: u128) -> Self {
        Self {
            sufficient: available >= required,
            available,
        }
    }

    pub fn shortfall(&self, required: u128) -> u128 {
        required.saturating_sub(self.available)
    }
}

/// Intents-held balance of `asset` against `required`.
pub async fn check_sufficient(
    account: &dyn Account,
    asset: &AssetId,
    required: u128,
) -> Result<BalanceCheck, BalanceQueryError> {
    let available = account
        .query_balance(asset)
        .await
        .map_err(|source| BalanceQueryError {
            asset: asset.to_string(),
            source,
        })?;
    Ok(BalanceCheck::evaluate(available, required))
}

/// Native coin balance of the account against `required`.
pub async fn check_native_sufficient(
    account: &dyn Account,
    required: u128,
) -> Result<BalanceCheck, BalanceQueryError> {
    let available = account
        .native_balance()
        .await
        .map_err(|source| BalanceQueryError {
            asset: "native".to_string(),
            source,
        })?;
    Ok(BalanceCheck::evaluate(available, required))
}
