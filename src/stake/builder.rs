//! Construction and submission of the restake transaction

use log::{debug, info};
use solana_hash::Hash;
use solana_instruction::{AccountMeta, Instruction};
use solana_keypair::Keypair;
use solana_message::Message;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;

use crate::constants::discriminator::TOPUP_DISCRIMINATOR;
use crate::constants::staking::PACKET_DATA_SIZE;
use crate::errors::{StakerError, StakerResult};
use crate::ledger::LedgerClient;
use crate::models::amount::TokenAmount;
use super::pda::StakeAddresses;

/// What `build_and_submit` did with the transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Confirmed on chain under this signature
    Confirmed(Signature),
    /// Dry run: built, signed and checked, never sent
    DryRun {
        /// Serialized size in bytes
        size: usize,
    },
}

/// `topup(amount)` on the staking program
pub fn topup_instruction(
    program_id: &Pubkey,
    user_token_account: &Pubkey,
    vault: &Pubkey,
    stake: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&TOPUP_DISCRIMINATOR[..]);
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(*vault, false),
            AccountMeta::new(*stake, false),
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new_readonly(spl_token::ID, false),
        ],
        data,
    }
}

/// Builds the two-instruction restake transaction: a token transfer from
/// the authority's associated token account into the vault, followed by a
/// top-up of the stake account by the same amount. Both instructions run in
/// one transaction, so a rejected top-up also undoes the transfer.
pub struct StakeTransactionBuilder<'a, L: ?Sized> {
    ledger: &'a L,
    authority: &'a Keypair,
    program_id: Pubkey,
    mint: Pubkey,
    dry_run: bool,
}

impl<'a, L: LedgerClient + ?Sized> StakeTransactionBuilder<'a, L> {
    pub fn new(ledger: &'a L, authority: &'a Keypair, program_id: Pubkey, mint: Pubkey) -> Self {
        Self {
            ledger,
            authority,
            program_id,
            mint,
            dry_run: false,
        }
    }

    /// Stop after building and checking the transaction
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The authority's associated token account for the mint
    pub fn source_token_account(&self) -> Pubkey {
        get_associated_token_address(&self.authority.pubkey(), &self.mint)
    }

    /// Transfer then top-up, in that order
    pub fn instructions(
        &self,
        amount: TokenAmount,
        addresses: &StakeAddresses,
    ) -> StakerResult<Vec<Instruction>> {
        let authority = self.authority.pubkey();
        let source = self.source_token_account();

        let transfer = spl_token::instruction::transfer(
            &spl_token::ID,
            &source,
            &addresses.vault,
            &authority,
            &[],
            amount.raw(),
        )
        .map_err(|e| StakerError::TransactionBuild(e.to_string()))?;

        let topup = topup_instruction(
            &self.program_id,
            &source,
            &addresses.vault,
            &addresses.stake,
            &authority,
            amount.raw(),
        );

        Ok(vec![transfer, topup])
    }

    /// Signed transaction paid for by the authority
    pub fn build(
        &self,
        amount: TokenAmount,
        addresses: &StakeAddresses,
        recent_blockhash: Hash,
    ) -> StakerResult<Transaction> {
        let instructions = self.instructions(amount, addresses)?;
        let message = Message::new(&instructions, Some(&self.authority.pubkey()));
        let transaction = Transaction::new(&[self.authority], message, recent_blockhash);

        let size = bincode::serialize(&transaction)
            .map_err(|e| StakerError::TransactionBuild(e.to_string()))?
            .len();
        if size > PACKET_DATA_SIZE {
            return Err(StakerError::TransactionBuild(format!(
                "transaction is {} bytes, limit is {}",
                size, PACKET_DATA_SIZE
            )));
        }
        Ok(transaction)
    }

    /// Check the balance, build, sign and submit.
    ///
    /// Nothing is sent for a zero amount or when the authority's token
    /// account holds less than `amount`. The balance is read right before
    /// submission; a concurrent spend can still make the ledger reject it.
    pub async fn build_and_submit(
        &self,
        amount: TokenAmount,
        addresses: &StakeAddresses,
    ) -> StakerResult<Submission> {
        if amount.is_zero() {
            return Err(StakerError::ZeroAmount);
        }

        let source = self.source_token_account();
        let balance = self.ledger.get_token_balance(&source).await?;
        if balance.decimals() != amount.decimals() {
            return Err(StakerError::DecimalsMismatch {
                amount: amount.decimals(),
                balance: balance.decimals(),
            });
        }
        if balance.raw() < amount.raw() {
            return Err(StakerError::InsufficientFunds {
                needed: amount.raw(),
                available: balance.raw(),
            });
        }
        debug!("Token account {} holds {}, staking {}", source, balance, amount);

        let blockhash = self.ledger.latest_blockhash().await?;
        let transaction = self.build(amount, addresses, blockhash)?;

        if self.dry_run {
            let size = bincode::serialized_size(&transaction)
                .map_err(|e| StakerError::TransactionBuild(e.to_string()))? as usize;
            info!(
                "Dry run: would stake {} into vault {} for stake account {}",
                amount, addresses.vault, addresses.stake
            );
            return Ok(Submission::DryRun { size });
        }

        let signature = self.ledger.send_and_confirm(&transaction).await?;
        info!("Staked {} tokens in transaction {}", amount, signature);
        Ok(Submission::Confirmed(signature))
    }
}
