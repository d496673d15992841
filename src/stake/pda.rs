//! Stake account and vault address resolution

use log::{debug, warn};
use solana_pubkey::Pubkey;

use crate::constants::staking::{STAKE_SEED, VAULT_SEED};
use crate::errors::{StakerError, StakerResult};
use crate::ledger::LedgerClient;
use crate::models::stake_account::StakeAccount;

/// Stake account of an authority and the vault it records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeAddresses {
    pub stake: Pubkey,
    pub vault: Pubkey,
}

/// `["stake", mint, authority]` under the staking program
pub fn derive_stake_address(program_id: &Pubkey, authority: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[STAKE_SEED, mint.as_ref(), authority.as_ref()], program_id)
}

/// `["vault", mint, authority]` under the staking program
pub fn derive_vault_address(program_id: &Pubkey, authority: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, mint.as_ref(), authority.as_ref()], program_id)
}

/// Resolves the stake account of an authority and reads its vault from chain
pub struct PdaResolver<'a, L: ?Sized> {
    ledger: &'a L,
    program_id: Pubkey,
}

impl<'a, L: LedgerClient + ?Sized> PdaResolver<'a, L> {
    pub fn new(ledger: &'a L, program_id: Pubkey) -> Self {
        Self { ledger, program_id }
    }

    /// Derived addresses only, no network access
    pub fn derive(&self, authority: &Pubkey, mint: &Pubkey) -> StakeAddresses {
        let (stake, _) = derive_stake_address(&self.program_id, authority, mint);
        let (vault, _) = derive_vault_address(&self.program_id, authority, mint);
        StakeAddresses { stake, vault }
    }

    /// Derive the stake address and read the vault recorded in the stake account.
    ///
    /// The recorded vault is authoritative. Staking must have been set up
    /// beforehand; a missing stake account is `AccountNotFound`.
    pub async fn resolve(&self, authority: &Pubkey, mint: &Pubkey) -> StakerResult<StakeAddresses> {
        let derived = self.derive(authority, mint);

        let account = self
            .ledger
            .get_account(&derived.stake)
            .await?
            .ok_or_else(|| {
                StakerError::AccountNotFound(format!(
                    "stake account {} for authority {}",
                    derived.stake, authority
                ))
            })?;

        if account.owner != self.program_id {
            return Err(StakerError::InvalidAccountData(format!(
                "stake account {} is owned by {}, expected {}",
                derived.stake, account.owner, self.program_id
            )));
        }

        let stake = StakeAccount::try_from_slice(&account.data)?;
        if stake.authority != *authority {
            return Err(StakerError::InvalidAccountData(format!(
                "stake account {} belongs to {}",
                derived.stake, stake.authority
            )));
        }
        if stake.vault != derived.vault {
            warn!(
                "Stake account {} records vault {}, derived {}; using the recorded one",
                derived.stake, stake.vault, derived.vault
            );
        }
        debug!(
            "Stake account {} holds {} raw units in vault {}",
            derived.stake, stake.amount, stake.vault
        );

        Ok(StakeAddresses {
            stake: derived.stake,
            vault: stake.vault,
        })
    }
}
