//! Conversion of RPC transaction records into `ResolvedTransaction`.
//!
//! Transactions are fetched with `jsonParsed` encoding, so token program
//! instructions arrive already decoded as `{"type": ..., "info": {...}}`
//! objects. Only what the restaker reads is kept: the inner instruction
//! groups and the post-execution token balances.

use std::str::FromStr;
use log::{debug, warn};
use serde_json::Value;
use solana_pubkey::Pubkey;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInnerInstructions,
    UiInstruction, UiMessage, UiParsedInstruction, UiTransactionStatusMeta,
    UiTransactionTokenBalance,
};

use crate::constants::staking::TOKEN_2022_PROGRAM_ID;
use crate::errors::{StakerError, StakerResult};
use crate::models::transaction::{
    InnerInstruction, InnerInstructionGroup, ResolvedTransaction, TokenBalance, TokenTransfer,
};

/// Convert a confirmed transaction fetched over RPC.
///
/// # Arguments
///
/// * `signature` - Signature the transaction was fetched by.
/// * `confirmed` - The RPC record.
///
/// # Returns
///
/// The resolved transaction, or `TransactionMalformed` when the record has no
/// status metadata or no inner instruction set.
pub fn parse_confirmed_transaction(
    signature: &str,
    confirmed: EncodedConfirmedTransactionWithStatusMeta,
) -> StakerResult<ResolvedTransaction> {
    let meta = confirmed.transaction.meta.ok_or_else(|| {
        StakerError::TransactionMalformed(format!("{}: missing meta", signature))
    })?;

    let account_keys = account_keys(&confirmed.transaction.transaction, &meta);

    let inner_instructions = match &meta.inner_instructions {
        OptionSerializer::Some(groups) => groups.iter().map(parse_inner_group).collect(),
        _ => {
            return Err(StakerError::TransactionMalformed(format!(
                "{}: missing inner instructions",
                signature
            )))
        }
    };

    let post_token_balances = match &meta.post_token_balances {
        OptionSerializer::Some(balances) => balances
            .iter()
            .filter_map(|balance| parse_token_balance(balance, &account_keys))
            .collect(),
        _ => Vec::new(),
    };

    Ok(ResolvedTransaction {
        signature: signature.to_string(),
        slot: confirmed.slot,
        inner_instructions,
        post_token_balances,
    })
}

/// Account keys in message order, followed by addresses loaded from lookup tables
fn account_keys(transaction: &EncodedTransaction, meta: &UiTransactionStatusMeta) -> Vec<Option<Pubkey>> {
    let EncodedTransaction::Json(ui_transaction) = transaction else {
        warn!("Transaction is not JSON encoded; token balance addresses stay unresolved");
        return Vec::new();
    };

    match &ui_transaction.message {
        // Parsed messages already list lookup-table addresses
        UiMessage::Parsed(message) => message
            .account_keys
            .iter()
            .map(|key| Pubkey::from_str(&key.pubkey).ok())
            .collect(),
        UiMessage::Raw(message) => {
            let mut keys: Vec<Option<Pubkey>> = message
                .account_keys
                .iter()
                .map(|key| Pubkey::from_str(key).ok())
                .collect();
            if let OptionSerializer::Some(loaded) = &meta.loaded_addresses {
                keys.extend(loaded.writable.iter().map(|key| Pubkey::from_str(key).ok()));
                keys.extend(loaded.readonly.iter().map(|key| Pubkey::from_str(key).ok()));
            }
            keys
        }
    }
}

fn parse_inner_group(group: &UiInnerInstructions) -> InnerInstructionGroup {
    InnerInstructionGroup {
        index: group.index,
        instructions: group.instructions.iter().map(parse_inner_instruction).collect(),
    }
}

fn parse_inner_instruction(instruction: &UiInstruction) -> InnerInstruction {
    match instruction {
        UiInstruction::Parsed(UiParsedInstruction::Parsed(parsed)) => {
            let program_id = match Pubkey::from_str(&parsed.program_id) {
                Ok(program_id) => program_id,
                Err(_) => {
                    return InnerInstruction::Other {
                        program_id: parsed.program_id.clone(),
                    }
                }
            };
            if !is_token_program(&program_id) {
                return InnerInstruction::Other {
                    program_id: parsed.program_id.clone(),
                };
            }
            match parse_token_transfer(program_id, &parsed.parsed) {
                Some(transfer) => InnerInstruction::TokenTransfer(transfer),
                None => InnerInstruction::Other {
                    program_id: parsed.program_id.clone(),
                },
            }
        }
        UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(partial)) => {
            InnerInstruction::Other {
                program_id: partial.program_id.clone(),
            }
        }
        UiInstruction::Compiled(compiled) => InnerInstruction::Other {
            program_id: format!("#{}", compiled.program_id_index),
        },
    }
}

/// Whether a program is one of the SPL token programs
pub fn is_token_program(program_id: &Pubkey) -> bool {
    *program_id == spl_token::ID || *program_id == TOKEN_2022_PROGRAM_ID
}

/// Decode a parsed `transfer` / `transferChecked` token instruction
pub fn parse_token_transfer(program_id: Pubkey, parsed: &Value) -> Option<TokenTransfer> {
    let kind = parsed.get("type")?.as_str()?;
    let info = parsed.get("info")?;

    let (amount, decimals) = match kind {
        "transfer" => (parse_amount(info.get("amount")?)?, None),
        "transferChecked" => {
            let token_amount = info.get("tokenAmount")?;
            let decimals = token_amount
                .get("decimals")
                .and_then(Value::as_u64)
                .and_then(|d| u8::try_from(d).ok());
            (parse_amount(token_amount.get("amount")?)?, decimals)
        }
        _ => return None,
    };

    let pubkey_field = |name: &str| {
        info.get(name)
            .and_then(Value::as_str)
            .and_then(|s| Pubkey::from_str(s).ok())
    };

    let transfer = TokenTransfer {
        program_id,
        source: pubkey_field("source")?,
        destination: pubkey_field("destination")?,
        authority: pubkey_field("authority").or_else(|| pubkey_field("multisigAuthority")),
        amount,
        decimals,
    };
    debug!(
        "Token {} of {} raw units {} -> {}",
        kind, transfer.amount, transfer.source, transfer.destination
    );
    Some(transfer)
}

/// Raw amounts are JSON strings; accept plain numbers too
fn parse_amount(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn parse_token_balance(
    balance: &UiTransactionTokenBalance,
    account_keys: &[Option<Pubkey>],
) -> Option<TokenBalance> {
    let mint = Pubkey::from_str(&balance.mint).ok()?;
    let owner = match &balance.owner {
        OptionSerializer::Some(owner) => Pubkey::from_str(owner).ok(),
        _ => None,
    };
    let raw_amount = balance.ui_token_amount.amount.parse().ok()?;

    Some(TokenBalance {
        account_index: balance.account_index,
        account: account_keys.get(balance.account_index as usize).copied().flatten(),
        mint,
        owner,
        raw_amount,
        decimals: balance.ui_token_amount.decimals,
    })
}
