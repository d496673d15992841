//! On-chain stake account layout

use solana_pubkey::Pubkey;
use crate::constants::discriminator::{ANCHOR_DISCRIMINATOR_LENGTH, STAKE_ACCOUNT_DISCRIMINATOR};
use crate::errors::{StakerError, StakerResult};

/// Stake record owned by the staking program.
///
/// Layout after the 8-byte discriminator:
/// `amount: u64, authority: Pubkey, duration: u64, time_unstake: i64,
/// vault: Pubkey, vault_bump: u8, xnos: u128`, all little endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeAccount {
    /// Raw units currently staked
    pub amount: u64,
    pub authority: Pubkey,
    /// Unstake duration in seconds
    pub duration: u64,
    /// Unix time the unstake was requested, 0 while staked
    pub time_unstake: i64,
    /// Token account holding the staked tokens
    pub vault: Pubkey,
    pub vault_bump: u8,
    pub xnos: u128,
}

impl StakeAccount {
    /// Serialized size including the discriminator
    pub const LEN: usize = ANCHOR_DISCRIMINATOR_LENGTH + 8 + 32 + 8 + 8 + 32 + 1 + 16;

    /// Decode account data, checking the discriminator
    pub fn try_from_slice(data: &[u8]) -> StakerResult<Self> {
        if data.len() < Self::LEN {
            return Err(StakerError::InvalidAccountData(format!(
                "stake account is {} bytes, expected at least {}",
                data.len(),
                Self::LEN
            )));
        }
        if data[..ANCHOR_DISCRIMINATOR_LENGTH] != STAKE_ACCOUNT_DISCRIMINATOR[..] {
            return Err(StakerError::InvalidAccountData(
                "stake account discriminator mismatch".to_string(),
            ));
        }

        let mut offset = ANCHOR_DISCRIMINATOR_LENGTH;
        let amount = u64::from_le_bytes(read_array(data, &mut offset));
        let authority = Pubkey::new_from_array(read_array(data, &mut offset));
        let duration = u64::from_le_bytes(read_array(data, &mut offset));
        let time_unstake = i64::from_le_bytes(read_array(data, &mut offset));
        let vault = Pubkey::new_from_array(read_array(data, &mut offset));
        let vault_bump = data[offset];
        offset += 1;
        let xnos = u128::from_le_bytes(read_array(data, &mut offset));

        Ok(Self {
            amount,
            authority,
            duration,
            time_unstake,
            vault,
            vault_bump,
            xnos,
        })
    }

    /// Encode into account data, discriminator first
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&STAKE_ACCOUNT_DISCRIMINATOR[..]);
        data.extend_from_slice(&self.amount.to_le_bytes());
        data.extend_from_slice(self.authority.as_ref());
        data.extend_from_slice(&self.duration.to_le_bytes());
        data.extend_from_slice(&self.time_unstake.to_le_bytes());
        data.extend_from_slice(self.vault.as_ref());
        data.push(self.vault_bump);
        data.extend_from_slice(&self.xnos.to_le_bytes());
        data
    }
}

// Callers check the total length up front.
fn read_array<const N: usize>(data: &[u8], offset: &mut usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[*offset..*offset + N]);
    *offset += N;
    out
}
