//! Amount extraction from a job's payout transaction

use log::{debug, warn};
use solana_pubkey::Pubkey;

use crate::errors::StakerResult;
use crate::models::amount::TokenAmount;
use crate::models::transaction::ResolvedTransaction;

/// Sum every token transfer crediting `destination` across all inner
/// instruction groups.
///
/// Decimals are taken from the transaction's token balance entry for
/// `destination`; `fallback_decimals` is used only when the metadata has no
/// such entry. A transaction that credits nothing yields zero, not an error.
pub fn extract(
    tx: &ResolvedTransaction,
    destination: &Pubkey,
    fallback_decimals: u8,
) -> StakerResult<TokenAmount> {
    let decimals = match tx.decimals_of(destination) {
        Some(decimals) => decimals,
        None => {
            debug!(
                "No token balance recorded for {} in {}, assuming {} decimals",
                destination, tx.signature, fallback_decimals
            );
            fallback_decimals
        }
    };

    let mut total = TokenAmount::zero(decimals);
    for transfer in tx.token_transfers().filter(|t| t.destination == *destination) {
        if let Some(checked) = transfer.decimals {
            if checked != decimals {
                warn!(
                    "transferChecked to {} reports {} decimals, balance metadata says {}",
                    destination, checked, decimals
                );
            }
        }
        total = total.checked_add(TokenAmount::from_raw(transfer.amount, decimals))?;
    }

    debug!("{} credited {} tokens to {}", tx.signature, total, destination);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StakerError;
    use crate::models::transaction::{
        InnerInstruction, InnerInstructionGroup, TokenBalance, TokenTransfer,
    };

    fn transfer(destination: Pubkey, amount: u64) -> InnerInstruction {
        InnerInstruction::TokenTransfer(TokenTransfer {
            program_id: spl_token::ID,
            source: Pubkey::new_unique(),
            destination,
            authority: None,
            amount,
            decimals: None,
        })
    }

    fn tx(groups: Vec<Vec<InnerInstruction>>, balances: Vec<TokenBalance>) -> ResolvedTransaction {
        ResolvedTransaction {
            signature: "job".to_string(),
            slot: 1,
            inner_instructions: groups
                .into_iter()
                .enumerate()
                .map(|(index, instructions)| InnerInstructionGroup {
                    index: index as u8,
                    instructions,
                })
                .collect(),
            post_token_balances: balances,
        }
    }

    fn balance(account: Pubkey, decimals: u8) -> TokenBalance {
        TokenBalance {
            account_index: 1,
            account: Some(account),
            mint: Pubkey::new_unique(),
            owner: None,
            raw_amount: 0,
            decimals,
        }
    }

    #[test]
    fn test_no_matching_transfer_is_zero() {
        let ours = Pubkey::new_unique();
        let empty = tx(vec![], vec![]);
        assert!(extract(&empty, &ours, 6).unwrap().is_zero());

        let elsewhere = tx(
            vec![vec![
                transfer(Pubkey::new_unique(), 5),
                InnerInstruction::Other { program_id: "11111111111111111111111111111111".into() },
            ]],
            vec![],
        );
        assert!(extract(&elsewhere, &ours, 6).unwrap().is_zero());
    }

    #[test]
    fn test_sums_across_groups_with_chain_decimals() {
        let ours = Pubkey::new_unique();
        let resolved = tx(
            vec![
                vec![transfer(ours, 10_000_000), transfer(Pubkey::new_unique(), 99)],
                vec![transfer(ours, 2_500_000)],
            ],
            vec![balance(ours, 6)],
        );
        let amount = extract(&resolved, &ours, 9).unwrap();
        assert_eq!(amount.raw(), 12_500_000);
        assert_eq!(amount.decimals(), 6);
        assert_eq!(amount.to_string(), "12.5");
    }

    #[test]
    fn test_order_of_credits_does_not_matter() {
        let ours = Pubkey::new_unique();
        let credits = [1u64, 333_333, 7_000_000_001, 42, 999_999];
        let forward: Vec<_> = credits.iter().map(|&a| transfer(ours, a)).collect();
        let backward: Vec<_> = credits.iter().rev().map(|&a| transfer(ours, a)).collect();

        let a = extract(&tx(vec![forward], vec![]), &ours, 6).unwrap();
        let b = extract(&tx(vec![backward], vec![]), &ours, 6).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.raw(), credits.iter().sum::<u64>());
    }

    #[test]
    fn test_non_standard_decimals_come_from_metadata() {
        let ours = Pubkey::new_unique();
        let resolved = tx(vec![vec![transfer(ours, 1_500_000_000)]], vec![balance(ours, 9)]);
        let amount = extract(&resolved, &ours, 6).unwrap();
        assert_eq!(amount.to_string(), "1.5");
    }

    #[test]
    fn test_overflow_is_an_error() {
        let ours = Pubkey::new_unique();
        let resolved = tx(vec![vec![transfer(ours, u64::MAX), transfer(ours, 1)]], vec![]);
        assert!(matches!(extract(&resolved, &ours, 6), Err(StakerError::AmountOverflow)));
    }
}
