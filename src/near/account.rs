use anyhow::{Context as _, Result};
use async_trait::async_trait;
use near_crypto::Signer;
use near_jsonrpc_client::{JsonRpcClient, methods};
use near_jsonrpc_primitives::types::query::QueryResponseKind;
use near_primitives::transaction::{
    Action, FunctionCallAction, SignedTransaction, Transaction, TransactionV0,
};
use near_primitives::types::{AccountId, BlockReference, Finality, FunctionArgs, Gas};
use near_primitives::views::{FinalExecutionStatus, QueryRequest, TxExecutionStatus};
use near_token::NearToken;
use serde_json::json;
use tokio::sync::Mutex;

use super::keys::signer_from_secret_key;
use super::{Account, AccountError};
use crate::assets::AssetId;

const DEPOSIT_GAS: u64 = 10_000_000_000_000;
const TRANSFER_CALL_GAS: u64 = 50_000_000_000_000;
const MT_TRANSFER_GAS: u64 = 30_000_000_000_000;

#[derive(Debug, Clone)]
pub struct NearConfig {
    pub rpc_url: String,
    pub account_id: String,
    pub secret_key: String,
    pub intents_contract: String,
    pub wrap_contract: String,
}

pub struct NearAccount {
    client: JsonRpcClient,
    account_id: AccountId,
    signer: Signer,
    intents_contract: AccountId,
    wrap_contract: AccountId,
    // Serializes nonce use: one transaction in flight per account.
    tx_lock: Mutex<()>,
}

impl NearAccount {
    pub fn new(cfg: NearConfig) -> Result<Self> {
        let account_id: AccountId = cfg.account_id.parse().context("parse account id")?;
        let intents_contract: AccountId = cfg
            .intents_contract
            .parse()
            .context("parse intents contract id")?;
        let wrap_contract: AccountId = cfg
            .wrap_contract
            .parse()
            .context("parse wrap contract id")?;
        let signer =
            signer_from_secret_key(&account_id, &cfg.secret_key).context("create signer")?;

        Ok(Self {
            client: JsonRpcClient::connect(&cfg.rpc_url),
            account_id,
            signer,
            intents_contract,
            wrap_contract,
            tx_lock: Mutex::new(()),
        })
    }

    async fn view_call(
        &self,
        method_name: &str,
        args: serde_json::Value,
    ) -> Result<Vec<u8>, AccountError> {
        let request = methods::query::RpcQueryRequest {
            block_reference: BlockReference::Finality(Finality::Final),
            request: QueryRequest::CallFunction {
                account_id: self.intents_contract.clone(),
                method_name: method_name.to_string(),
                args: FunctionArgs::from(args.to_string().into_bytes()),
            },
        };

        let response = self
            .client
            .call(request)
            .await
            .map_err(|e| AccountError::Query(format!("{method_name}: {e}")))?;

        match response.kind {
            QueryResponseKind::CallResult(result) => Ok(result.result),
            _ => Err(AccountError::Query(format!(
                "{method_name}: unexpected query response"
            ))),
        }
    }

    async fn next_nonce(&self) -> Result<u64, AccountError> {
        let request = methods::query::RpcQueryRequest {
            block_reference: BlockReference::Finality(Finality::Final),
            request: QueryRequest::ViewAccessKey {
                account_id: self.account_id.clone(),
                public_key: self.signer.public_key(),
            },
        };

        let response = self
            .client
            .call(request)
            .await
            .map_err(|e| AccountError::Transaction(format!("fetch access key: {e}")))?;

        match response.kind {
            QueryResponseKind::AccessKey(access_key) => Ok(access_key.nonce + 1),
            _ => Err(AccountError::Transaction(
                "unexpected response when fetching access key".to_string(),
            )),
        }
    }

    async fn send_function_calls(
        &self,
        receiver_id: &AccountId,
        calls: Vec<FunctionCallAction>,
    ) -> Result<String, AccountError> {
        let _guard = self.tx_lock.lock().await;

        let nonce = self.next_nonce().await?;
        let block = self
            .client
            .call(methods::block::RpcBlockRequest {
                block_reference: BlockReference::Finality(Finality::Final),
            })
            .await
            .map_err(|e| AccountError::Transaction(format!("fetch latest block: {e}")))?;

        let actions = calls
            .into_iter()
            .map(|call| Action::FunctionCall(Box::new(call)))
            .collect();

        let tx = Transaction::V0(TransactionV0 {
            signer_id: self.account_id.clone(),
            public_key: self.signer.public_key(),
            nonce,
            receiver_id: receiver_id.clone(),
            block_hash: block.header.hash,
            actions,
        });

        let (tx_hash, _) = tx.get_hash_and_size();
        let signature = self.signer.sign(tx_hash.as_ref());
        let signed_transaction = SignedTransaction::new(signature, tx);

        let response = self
            .client
            .call(methods::send_tx::RpcSendTransactionRequest {
                signed_transaction,
                wait_until: TxExecutionStatus::Final,
            })
            .await
            .map_err(|e| AccountError::Transaction(format!("send transaction: {e}")))?;

        if let Some(outcome) = response.final_execution_outcome
            && let FinalExecutionStatus::Failure(err) = outcome.into_outcome().status
        {
            return Err(AccountError::Transaction(format!(
                "transaction {tx_hash} failed: {err:?}"
            )));
        }

        tracing::info!(tx_hash = %tx_hash, receiver_id = %receiver_id, "transaction finalized");
        Ok(tx_hash.to_string())
    }
}

#[async_trait]
impl Account for NearAccount {
    fn account_id(&self) -> &str {
        self.account_id.as_str()
    }

    async fn native_balance(&self) -> Result<u128, AccountError> {
        let request = methods::query::RpcQueryRequest {
            block_reference: BlockReference::Finality(Finality::Final),
            request: QueryRequest::ViewAccount {
                account_id: self.account_id.clone(),
            },
        };

        let response = self
            .client
            .call(request)
            .await
            .map_err(|e| AccountError::Query(format!("view_account: {e}")))?;

        match response.kind {
            QueryResponseKind::ViewAccount(view) => Ok(view.amount.as_yoctonear()),
            _ => Err(AccountError::Query(
                "view_account: unexpected query response".to_string(),
            )),
        }
    }

    async fn query_balance(&self, asset: &AssetId) -> Result<u128, AccountError> {
        let raw = self
            .view_call(
                "mt_balance_of",
                json!({
                    "token_id": asset.as_str(),
                    "account_id": self.account_id.as_str(),
                }),
            )
            .await?;

        let balance: String = serde_json::from_slice(&raw)
            .map_err(|e| AccountError::Query(format!("decode mt_balance_of: {e}")))?;
        balance
            .parse::<u128>()
            .map_err(|e| AccountError::Query(format!("parse balance {balance:?}: {e}")))
    }

    async fn deposit_native(&self, amount: u128) -> Result<String, AccountError> {
        let calls = vec![
            FunctionCallAction {
                method_name: "near_deposit".to_string(),
                args: json!({}).to_string().into_bytes(),
                gas: Gas::from_gas(DEPOSIT_GAS),
                deposit: NearToken::from_yoctonear(amount),
            },
            FunctionCallAction {
                method_name: "ft_transfer_call".to_string(),
                args: json!({
                    "receiver_id": self.intents_contract.as_str(),
                    "amount": amount.to_string(),
                    "msg": "",
                })
                .to_string()
                .into_bytes(),
                gas: Gas::from_gas(TRANSFER_CALL_GAS),
                deposit: NearToken::from_yoctonear(1),
            },
        ];

        self.send_function_calls(&self.wrap_contract, calls).await
    }

    async fn submit_transfer(
        &self,
        target: &str,
        asset: &AssetId,
        amount: u128,
    ) -> Result<String, AccountError> {
        let call = FunctionCallAction {
            method_name: "mt_transfer".to_string(),
            args: json!({
                "token_id": asset.as_str(),
                "receiver_id": target,
                "amount": amount.to_string(),
            })
            .to_string()
            .into_bytes(),
            gas: Gas::from_gas(MT_TRANSFER_GAS),
            deposit: NearToken::from_yoctonear(1),
        };

        self.send_function_calls(&self.intents_contract, vec![call])
            .await
    }
}
