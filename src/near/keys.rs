use std::str::FromStr as _;

use anyhow::{Context as _, Result};
use near_crypto::{InMemorySigner, SecretKey, Signer};
use near_primitives::types::AccountId;

pub fn signer_from_secret_key(account_id: &AccountId, secret_key: &str) -> Result<Signer> {
    let secret_key = SecretKey::from_str(secret_key.trim()).context("parse secret key")?;
    Ok(InMemorySigner::from_secret_key(account_id.clone(), secret_key))
}
