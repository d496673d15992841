//! Immutable state shared by every staking cycle

use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signer::Signer;
use spl_associated_token_account::get_associated_token_address;

use crate::constants::staking::{DEFAULT_DECIMALS, STAKING_MINT, STAKING_PROGRAM_ID};
use crate::ledger::LedgerClient;

/// Ledger handle, authority and program addresses for the process lifetime.
///
/// Built once at startup and shared read-only between concurrent cycles.
pub struct StakingContext<L> {
    pub ledger: L,
    pub authority: Keypair,
    pub program_id: Pubkey,
    pub mint: Pubkey,
    /// Decimals assumed when a transaction carries no balance metadata
    pub default_decimals: u8,
    /// Build and check stake transactions without sending them
    pub dry_run: bool,
}

impl<L: LedgerClient> StakingContext<L> {
    /// Context for the default staking program and mint
    pub fn new(ledger: L, authority: Keypair) -> Self {
        Self {
            ledger,
            authority,
            program_id: STAKING_PROGRAM_ID,
            mint: STAKING_MINT,
            default_decimals: DEFAULT_DECIMALS,
            dry_run: false,
        }
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_mint(mut self, mint: Pubkey, default_decimals: u8) -> Self {
        self.mint = mint;
        self.default_decimals = default_decimals;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn authority_pubkey(&self) -> Pubkey {
        self.authority.pubkey()
    }

    /// Token account job payouts are credited to
    pub fn authority_token_account(&self) -> Pubkey {
        get_associated_token_address(&self.authority.pubkey(), &self.mint)
    }
}
