//! `LedgerClient` backed by a Solana JSON-RPC endpoint

use async_trait::async_trait;
use log::debug;
use solana_account::Account;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_commitment_config::CommitmentConfig;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::Transaction;
use solana_transaction_status::UiTransactionEncoding;

use crate::errors::{ErrorContext, ErrorExt, StakerError, StakerResult};
use crate::models::amount::TokenAmount;
use crate::models::transaction::ResolvedTransaction;
use super::parser::parse_confirmed_transaction;
use super::LedgerClient;

/// Ledger access over RPC
pub struct RpcLedger {
    rpc_client: RpcClient,
}

impl RpcLedger {
    /// Create a new ledger client with the given RPC URL
    pub fn new(rpc_url: &str) -> Self {
        let rpc_client =
            RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed());
        Self { rpc_client }
    }

    pub fn url(&self) -> String {
        self.rpc_client.url()
    }
}

fn context(operation: &str, signature: Option<String>, details: Option<String>) -> ErrorContext {
    ErrorContext {
        signature,
        component: "rpc_ledger".to_string(),
        operation: operation.to_string(),
        details,
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn get_transaction(&self, signature: &Signature) -> StakerResult<ResolvedTransaction> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        debug!("getTransaction {}", signature);
        // An unknown signature comes back as a null result, which the
        // client reports as a deserialization failure.
        let confirmed = self
            .rpc_client
            .get_transaction_with_config(signature, config)
            .await
            .with_context(context("get_transaction", Some(signature.to_string()), None))?;

        parse_confirmed_transaction(&signature.to_string(), confirmed)
    }

    async fn get_account(&self, address: &Pubkey) -> StakerResult<Option<Account>> {
        debug!("getAccountInfo {}", address);
        let response = self
            .rpc_client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .with_context(context("get_account", None, Some(format!("address {}", address))))?;
        Ok(response.value)
    }

    async fn get_token_balance(&self, token_account: &Pubkey) -> StakerResult<TokenAmount> {
        debug!("getTokenAccountBalance {}", token_account);
        let balance = self
            .rpc_client
            .get_token_account_balance(token_account)
            .await
            .with_context(context("get_token_balance", None, Some(format!("token account {}", token_account))))?;

        let raw = balance.amount.parse::<u64>().map_err(|e| {
            StakerError::Rpc(format!(
                "unreadable balance '{}' for {}: {}",
                balance.amount, token_account, e
            ))
        })?;
        Ok(TokenAmount::from_raw(raw, balance.decimals))
    }

    async fn latest_blockhash(&self) -> StakerResult<Hash> {
        self.rpc_client
            .get_latest_blockhash()
            .await
            .with_simple_context("rpc_ledger", "latest_blockhash")
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> StakerResult<Signature> {
        self.rpc_client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(|e| StakerError::SubmissionRejected(e.to_string()))
    }
}
