//! Ledger access for the restaker
//!
//! Everything the pipeline needs from the cluster goes through the
//! `LedgerClient` capability, so retry policies and test doubles can be
//! layered in without touching the pipeline.

pub mod parser;
pub mod retry;
pub mod rpc;

use std::str::FromStr;
use async_trait::async_trait;
use log::info;
use solana_account::Account;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::Transaction;

use crate::errors::{StakerError, StakerResult};
use crate::models::amount::TokenAmount;
use crate::models::transaction::ResolvedTransaction;

pub use self::retry::{RetryPolicy, RetryingLedger};
pub use self::rpc::RpcLedger;

/// Read and write access to the ledger at `confirmed` commitment
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Confirmed transaction by signature; `TransactionNotFound` if the
    /// ledger does not know it (yet)
    async fn get_transaction(&self, signature: &Signature) -> StakerResult<ResolvedTransaction>;

    /// Account by address, `None` if it does not exist
    async fn get_account(&self, address: &Pubkey) -> StakerResult<Option<Account>>;

    /// Balance of a token account in raw units
    async fn get_token_balance(&self, token_account: &Pubkey) -> StakerResult<TokenAmount>;

    async fn latest_blockhash(&self) -> StakerResult<Hash>;

    /// Submit a signed transaction and wait for confirmation
    async fn send_and_confirm(&self, transaction: &Transaction) -> StakerResult<Signature>;
}

/// Fetches the transaction that paid out a finished job
pub struct TransactionResolver<'a, L: ?Sized> {
    ledger: &'a L,
}

impl<'a, L: LedgerClient + ?Sized> TransactionResolver<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }

    /// Resolve a base58 signature printed by the node
    pub async fn resolve(&self, signature: &str) -> StakerResult<ResolvedTransaction> {
        let parsed = Signature::from_str(signature)
            .map_err(|e| StakerError::InvalidSignature(format!("{}: {}", signature, e)))?;

        let transaction = self.ledger.get_transaction(&parsed).await?;
        info!(
            "Resolved job transaction {} at slot {} ({} inner instruction groups)",
            signature,
            transaction.slot,
            transaction.inner_instructions.len()
        );
        Ok(transaction)
    }
}
