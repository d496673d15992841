//! Constants used throughout the restaker

pub mod staking;

/// Discriminator constants
pub mod discriminator;
