//! Confirmed transaction records as read back from the ledger

use solana_pubkey::Pubkey;

/// The parts of a confirmed transaction the restaker needs
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTransaction {
    /// Base58 signature of the transaction
    pub signature: String,
    /// Slot the transaction was confirmed in
    pub slot: u64,
    /// Inner instruction groups, in execution order
    pub inner_instructions: Vec<InnerInstructionGroup>,
    /// Token balances after execution
    pub post_token_balances: Vec<TokenBalance>,
}

/// Inner instructions executed by one top-level instruction
#[derive(Debug, Clone, PartialEq)]
pub struct InnerInstructionGroup {
    /// Index of the top-level instruction that produced the group
    pub index: u8,
    pub instructions: Vec<InnerInstruction>,
}

/// A parsed inner instruction
#[derive(Debug, Clone, PartialEq)]
pub enum InnerInstruction {
    /// SPL token `transfer` or `transferChecked`
    TokenTransfer(TokenTransfer),
    /// Anything else; only the invoked program is kept
    Other {
        program_id: String,
    },
}

/// A token movement between two token accounts
#[derive(Debug, Clone, PartialEq)]
pub struct TokenTransfer {
    /// Token program that executed the transfer
    pub program_id: Pubkey,
    pub source: Pubkey,
    pub destination: Pubkey,
    /// Owner or delegate that signed for the source, if reported
    pub authority: Option<Pubkey>,
    /// Raw base units moved
    pub amount: u64,
    /// Decimals, present for `transferChecked` only
    pub decimals: Option<u8>,
}

/// Post-execution balance of one token account
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBalance {
    /// Index into the transaction's account keys
    pub account_index: u8,
    /// Address at `account_index`, when the keys could be resolved
    pub account: Option<Pubkey>,
    pub mint: Pubkey,
    pub owner: Option<Pubkey>,
    /// Raw base units held
    pub raw_amount: u64,
    pub decimals: u8,
}

impl ResolvedTransaction {
    /// Decimals recorded for a token account in the balance metadata
    pub fn decimals_of(&self, account: &Pubkey) -> Option<u8> {
        self.post_token_balances
            .iter()
            .find(|balance| balance.account.as_ref() == Some(account))
            .map(|balance| balance.decimals)
    }

    /// All token transfers across every inner instruction group
    pub fn token_transfers(&self) -> impl Iterator<Item = &TokenTransfer> {
        self.inner_instructions
            .iter()
            .flat_map(|group| group.instructions.iter())
            .filter_map(|instruction| match instruction {
                InnerInstruction::TokenTransfer(transfer) => Some(transfer),
                InnerInstruction::Other { .. } => None,
            })
    }
}
