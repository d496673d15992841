//! Anchor discriminator constants

use once_cell::sync::Lazy;
use crate::utils::hash::{generate_account_discriminator, generate_instruction_discriminator};

/// Length of an Anchor discriminator in bytes
pub const ANCHOR_DISCRIMINATOR_LENGTH: usize = 8;

/// Namespace of instruction discriminators
pub const ANCHOR_INSTRUCTION_NAMESPACE: &str = "global";

/// Namespace of account discriminators
pub const ANCHOR_ACCOUNT_NAMESPACE: &str = "account";

/// `topup(amount)` of the staking program
pub static TOPUP_DISCRIMINATOR: Lazy<[u8; 8]> =
    Lazy::new(|| generate_instruction_discriminator("topup"));

/// `StakeAccount` records owned by the staking program
pub static STAKE_ACCOUNT_DISCRIMINATOR: Lazy<[u8; 8]> =
    Lazy::new(|| generate_account_discriminator("StakeAccount"));
