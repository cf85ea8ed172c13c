//! Account and signing boundary.
//!
//! Balances are held inside the intents contract as multi-tokens; the native
//! coin sits on the account itself until it is wrapped and deposited.

pub mod account;
pub mod keys;

use async_trait::async_trait;
use thiserror::Error;

use crate::assets::AssetId;

pub const DEFAULT_INTENTS_CONTRACT: &str = "intents.near";
pub const DEFAULT_WRAP_CONTRACT: &str = "wrap.near";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("balance query failed: {0}")]
    Query(String),

    #[error("transaction failed: {0}")]
    Transaction(String),
}

#[async_trait]
pub trait Account: Send + Sync {
    fn account_id(&self) -> &str;

    /// Native coin balance held by the account itself, smallest unit.
    async fn native_balance(&self) -> Result<u128, AccountError>;

    /// Balance of `asset` held for the account inside the intents contract.
    async fn query_balance(&self, asset: &AssetId) -> Result<u128, AccountError>;

    /// Wraps `amount` of the native coin and deposits it into the intents
    /// contract. Returns the transaction hash.
    async fn deposit_native(&self, amount: u128) -> Result<String, AccountError>;

    /// Moves `amount` of `asset` inside the intents contract to `target`.
    /// Returns the transaction hash.
    async fn submit_transfer(
        &self,
        target: &str,
        asset: &AssetId,
        amount: u128,
    ) -> Result<String, AccountError>;
}
