//! In-memory ledger shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use solana_account::Account;
use solana_hash::Hash;
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;

use solana_auto_restake::constants::staking::{DEFAULT_DECIMALS, STAKING_MINT, STAKING_PROGRAM_ID};
use solana_auto_restake::errors::{StakerError, StakerResult};
use solana_auto_restake::ledger::LedgerClient;
use solana_auto_restake::models::transaction::{
    InnerInstruction, InnerInstructionGroup, ResolvedTransaction, TokenBalance, TokenTransfer,
};
use solana_auto_restake::models::{StakeAccount, TokenAmount};
use solana_auto_restake::stake::{derive_stake_address, derive_vault_address};

/// Ledger backed by maps, recording every submitted transaction
#[derive(Default)]
pub struct MockLedger {
    pub transactions: HashMap<Signature, ResolvedTransaction>,
    pub accounts: HashMap<Pubkey, Account>,
    pub balances: HashMap<Pubkey, TokenAmount>,
    pub sent: Mutex<Vec<Transaction>>,
    /// Fail every submission the way a failed simulation does
    pub reject_submissions: bool,
}

impl MockLedger {
    /// Ledger with a stake account set up for `authority`
    pub fn with_stake_account(authority: &Pubkey) -> Self {
        let mut ledger = Self::default();
        let (stake, _) = derive_stake_address(&STAKING_PROGRAM_ID, authority, &STAKING_MINT);
        let (vault, vault_bump) = derive_vault_address(&STAKING_PROGRAM_ID, authority, &STAKING_MINT);
        let record = StakeAccount {
            amount: 1_000_000_000,
            authority: *authority,
            duration: 365 * 24 * 60 * 60,
            time_unstake: 0,
            vault,
            vault_bump,
            xnos: 0,
        };
        ledger.accounts.insert(
            stake,
            Account {
                lamports: 2_000_000,
                data: record.to_bytes(),
                owner: STAKING_PROGRAM_ID,
                executable: false,
                rent_epoch: 0,
            },
        );
        ledger
    }

    pub fn add_transaction(&mut self, transaction: ResolvedTransaction) -> Signature {
        let signature: Signature = transaction.signature.parse().expect("valid signature");
        self.transactions.insert(signature, transaction);
        signature
    }

    pub fn set_balance(&mut self, token_account: Pubkey, raw: u64) {
        self.balances
            .insert(token_account, TokenAmount::from_raw(raw, DEFAULT_DECIMALS));
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_transaction(&self, signature: &Signature) -> StakerResult<ResolvedTransaction> {
        self.transactions
            .get(signature)
            .cloned()
            .ok_or_else(|| StakerError::TransactionNotFound(signature.to_string()))
    }

    async fn get_account(&self, address: &Pubkey) -> StakerResult<Option<Account>> {
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_token_balance(&self, token_account: &Pubkey) -> StakerResult<TokenAmount> {
        self.balances
            .get(token_account)
            .copied()
            .ok_or_else(|| StakerError::AccountNotFound(token_account.to_string()))
    }

    async fn latest_blockhash(&self) -> StakerResult<Hash> {
        Ok(Hash::new_from_array([1u8; 32]))
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> StakerResult<Signature> {
        if self.reject_submissions {
            return Err(StakerError::SubmissionRejected(
                "Transaction simulation failed: custom program error: 0x1".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }
}

/// Base58 job signature derived from a seed byte
pub fn job_signature(seed: u8) -> String {
    Signature::from([seed; 64]).to_string()
}

/// Associated token account of `authority` for the staking mint
pub fn authority_ata(authority: &Keypair) -> Pubkey {
    get_associated_token_address(&authority.pubkey(), &STAKING_MINT)
}

/// Job payout crediting `raw` units to `destination`, with balance metadata
pub fn payout_transaction(signature: &str, destination: Pubkey, raw: u64) -> ResolvedTransaction {
    let transfer = TokenTransfer {
        program_id: spl_token::ID,
        source: Pubkey::new_unique(),
        destination,
        authority: Some(Pubkey::new_unique()),
        amount: raw,
        decimals: None,
    };
    ResolvedTransaction {
        signature: signature.to_string(),
        slot: 42,
        inner_instructions: vec![InnerInstructionGroup {
            index: 0,
            instructions: vec![
                InnerInstruction::Other {
                    program_id: "nosJhNRqr2bc9g1nfGDcXXTXvYUmxD4cVwy2pMWhrYM".to_string(),
                },
                InnerInstruction::TokenTransfer(transfer),
            ],
        }],
        post_token_balances: vec![TokenBalance {
            account_index: 3,
            account: Some(destination),
            mint: STAKING_MINT,
            owner: None,
            raw_amount: raw,
            decimals: DEFAULT_DECIMALS,
        }],
    }
}

/// Job transaction with no token movement at all
pub fn empty_transaction(signature: &str) -> ResolvedTransaction {
    ResolvedTransaction {
        signature: signature.to_string(),
        slot: 43,
        inner_instructions: Vec::new(),
        post_token_balances: Vec::new(),
    }
}
