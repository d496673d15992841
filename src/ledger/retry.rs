//! Retry decorator for ledger lookups that race the node's log output

use std::time::Duration;
use async_trait::async_trait;
use log::{debug, warn};
use solana_account::Account;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::Transaction;

use crate::errors::{StakerError, StakerResult};
use crate::models::amount::TokenAmount;
use crate::models::transaction::ResolvedTransaction;
use super::LedgerClient;

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Cap on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Retries `get_transaction` while the ledger has not indexed the signature.
///
/// Only `TransactionNotFound` is retried; all other calls and errors pass
/// straight through to the wrapped client.
pub struct RetryingLedger<L> {
    inner: L,
    policy: RetryPolicy,
}

impl<L: LedgerClient> RetryingLedger<L> {
    pub fn new(inner: L, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

#[async_trait]
impl<L: LedgerClient> LedgerClient for RetryingLedger<L> {
    async fn get_transaction(&self, signature: &Signature) -> StakerResult<ResolvedTransaction> {
        let mut attempt = 1;
        loop {
            match self.inner.get_transaction(signature).await {
                Err(StakerError::TransactionNotFound(_)) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    debug!(
                        "Transaction {} not indexed yet (attempt {}/{}), retrying in {:?}",
                        signature, attempt, self.policy.max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(StakerError::TransactionNotFound(msg)) => {
                    warn!(
                        "Transaction {} still not found after {} attempts",
                        signature, attempt
                    );
                    return Err(StakerError::TransactionNotFound(msg));
                }
                other => return other,
            }
        }
    }

    async fn get_account(&self, address: &Pubkey) -> StakerResult<Option<Account>> {
        self.inner.get_account(address).await
    }

    async fn get_token_balance(&self, token_account: &Pubkey) -> StakerResult<TokenAmount> {
        self.inner.get_token_balance(token_account).await
    }

    async fn latest_blockhash(&self) -> StakerResult<Hash> {
        self.inner.latest_blockhash().await
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> StakerResult<Signature> {
        self.inner.send_and_confirm(transaction).await
    }
}
