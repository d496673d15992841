//! Hashing utilities

use sha2::{Sha256, Digest};
use crate::constants::discriminator::{ANCHOR_ACCOUNT_NAMESPACE, ANCHOR_INSTRUCTION_NAMESPACE};

/// Generate an Anchor discriminator from a namespace and a name
pub fn generate_anchor_discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let preimage = format!("{}:{}", namespace, name);
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    let hash = hasher.finalize();
    
    let mut result = [0u8; 8];
    result.copy_from_slice(&hash[..8]);
    result
}

/// Discriminator prefixed to the data of an instruction handler
pub fn generate_instruction_discriminator(name: &str) -> [u8; 8] {
    generate_anchor_discriminator(ANCHOR_INSTRUCTION_NAMESPACE, name)
}

/// Discriminator stored in the first bytes of an account
pub fn generate_account_discriminator(name: &str) -> [u8; 8] {
    generate_anchor_discriminator(ANCHOR_ACCOUNT_NAMESPACE, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminators_differ_by_namespace() {
        let ix = generate_instruction_discriminator("topup");
        let acc = generate_account_discriminator("topup");
        assert_ne!(ix, acc);
        assert_eq!(ix, generate_instruction_discriminator("topup"));
    }

    #[test]
    fn test_known_instruction_discriminator() {
        // sha256("global:initialize")[..8]
        assert_eq!(
            generate_instruction_discriminator("initialize"),
            [175, 175, 109, 31, 13, 152, 155, 237]
        );
    }
}
