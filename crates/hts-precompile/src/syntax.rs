//! Structural checks on synthetic bodies, run before business logic.
//!
//! These are the same checks a node runs on a natively submitted body before
//! it touches state: they look only at the body and the configured limits.

use crate::config::HtsConfig;
use hts_primitives::{
    AccountAmount, AccountId, NftTransfer, ResponseCode, SupplyType, SyntheticTransaction,
    TokenAssociationBody, TokenCreateBody, TokenMintBody, TokenTransferList, TokenType,
    TokenUpdateBody, TransactionBody,
};
use std::collections::BTreeSet;

/// Largest metadata entry accepted for a single NFT.
pub const MAX_NFT_METADATA_BYTES: usize = 100;

/// Validates `txn`, returning [`ResponseCode::Ok`] when it is well formed.
pub fn validate(txn: &SyntheticTransaction, config: &HtsConfig) -> ResponseCode {
    check_body(&txn.body, config)
        .err()
        .unwrap_or(ResponseCode::Ok)
}

fn check_body(body: &TransactionBody, config: &HtsConfig) -> Result<(), ResponseCode> {
    match body {
        TransactionBody::TokenAssociate(body) | TransactionBody::TokenDissociate(body) => {
            association(body)
        }
        TransactionBody::TokenMint(body) => mint(body),
        TransactionBody::TokenBurn(body) => {
            let count = body.serial_numbers.len();
            supply_change(body.amount, count, ResponseCode::InvalidTokenBurnAmount)?;
            serials(&body.serial_numbers)
        }
        TransactionBody::TokenWipe(body) => {
            if body.account.is_zero() {
                return Err(ResponseCode::InvalidAccountId);
            }
            let count = body.serial_numbers.len();
            supply_change(body.amount, count, ResponseCode::InvalidWipingAmount)?;
            serials(&body.serial_numbers)
        }
        TransactionBody::TokenPause(token) | TransactionBody::TokenUnpause(token) => {
            if token.is_zero() {
                Err(ResponseCode::InvalidTokenId)
            } else {
                Ok(())
            }
        }
        TransactionBody::TokenCreate(body) => create(body, config),
        TransactionBody::TokenUpdate(body) => update(body, config),
        TransactionBody::CryptoTransfer { hbar_transfers, token_transfers } => {
            transfer(hbar_transfers, token_transfers)
        }
        TransactionBody::CryptoApproveAllowance { .. }
        | TransactionBody::CryptoDeleteAllowance(_)
        | TransactionBody::TokenQuery(_) => Ok(()),
    }
}

fn association(body: &TokenAssociationBody) -> Result<(), ResponseCode> {
    if body.account.is_zero() {
        return Err(ResponseCode::InvalidAccountId);
    }
    let mut seen = BTreeSet::new();
    if body.tokens.iter().any(|token| !seen.insert(*token)) {
        return Err(ResponseCode::TokenIdRepeatedInTokenList);
    }
    Ok(())
}

fn mint(body: &TokenMintBody) -> Result<(), ResponseCode> {
    let count = body.metadata.len();
    supply_change(body.amount, count, ResponseCode::InvalidTokenMintAmount)?;
    for entry in &body.metadata {
        if entry.len() > MAX_NFT_METADATA_BYTES {
            return Err(ResponseCode::MetadataTooLong);
        }
    }
    Ok(())
}

/// Exactly one of a fungible amount or a unique-token list may be present.
fn supply_change(
    amount: i64,
    unique_count: usize,
    negative: ResponseCode,
) -> Result<(), ResponseCode> {
    if amount < 0 {
        return Err(negative);
    }
    if amount > 0 && unique_count > 0 {
        return Err(ResponseCode::InvalidTransactionBody);
    }
    Ok(())
}

fn serials(serials: &[i64]) -> Result<(), ResponseCode> {
    if serials.iter().any(|serial| *serial <= 0) {
        return Err(ResponseCode::InvalidNftId);
    }
    Ok(())
}

fn name_and_symbol(name: &str, symbol: &str, config: &HtsConfig) -> Result<(), ResponseCode> {
    if name.len() > config.max_token_name_utf8_bytes {
        return Err(ResponseCode::TokenNameTooLong);
    }
    if symbol.len() > config.max_token_symbol_utf8_bytes {
        return Err(ResponseCode::TokenSymbolTooLong);
    }
    Ok(())
}

fn create(body: &TokenCreateBody, config: &HtsConfig) -> Result<(), ResponseCode> {
    if body.name.is_empty() {
        return Err(ResponseCode::MissingTokenName);
    }
    if body.symbol.is_empty() {
        return Err(ResponseCode::MissingTokenSymbol);
    }
    name_and_symbol(&body.name, &body.symbol, config)?;
    if body.treasury.is_zero() {
        return Err(ResponseCode::InvalidTreasuryAccountForToken);
    }
    if body.decimals < 0 {
        return Err(ResponseCode::InvalidTokenDecimals);
    }
    if body.initial_supply < 0 {
        return Err(ResponseCode::InvalidTokenInitialSupply);
    }
    if body.token_type == TokenType::NonFungibleUnique {
        if body.decimals != 0 {
            return Err(ResponseCode::InvalidTokenDecimals);
        }
        if body.initial_supply != 0 {
            return Err(ResponseCode::InvalidTokenInitialSupply);
        }
    }
    if body.supply_type == SupplyType::Finite && body.initial_supply > body.max_supply {
        return Err(ResponseCode::InvalidTokenInitialSupply);
    }
    Ok(())
}

fn update(body: &TokenUpdateBody, config: &HtsConfig) -> Result<(), ResponseCode> {
    if body.token.is_zero() {
        return Err(ResponseCode::InvalidTokenId);
    }
    name_and_symbol(
        body.name.as_deref().unwrap_or_default(),
        body.symbol.as_deref().unwrap_or_default(),
        config,
    )
}

fn transfer(hbar: &[AccountAmount], tokens: &[TokenTransferList]) -> Result<(), ResponseCode> {
    if hbar.is_empty() && tokens.is_empty() {
        return Err(ResponseCode::EmptyTokenTransferBody);
    }
    if !hbar.is_empty() {
        adjustments(hbar, ResponseCode::InvalidAccountAmounts)?;
    }

    let mut seen = BTreeSet::new();
    for list in tokens {
        if !seen.insert(list.token) {
            return Err(ResponseCode::TokenIdRepeatedInTokenList);
        }
        if list.transfers.is_empty() && list.nft_transfers.is_empty() {
            return Err(ResponseCode::EmptyTokenTransferAccountAmounts);
        }
        if !list.transfers.is_empty() {
            adjustments(&list.transfers, ResponseCode::TransfersNotZeroSumForToken)?;
        }
        nft_moves(&list.nft_transfers)?;
    }
    Ok(())
}

/// Adjustments must name distinct accounts and net to zero.
fn adjustments(
    adjustments: &[AccountAmount],
    unbalanced: ResponseCode,
) -> Result<(), ResponseCode> {
    let mut accounts = BTreeSet::new();
    let mut net: i128 = 0;
    for adjustment in adjustments {
        if !accounts.insert(adjustment.account) {
            return Err(ResponseCode::AccountRepeatedInAccountAmounts);
        }
        net += i128::from(adjustment.amount);
    }
    if net != 0 {
        return Err(unbalanced);
    }
    Ok(())
}

fn nft_moves(moves: &[NftTransfer]) -> Result<(), ResponseCode> {
    let mut serials = BTreeSet::new();
    for nft in moves {
        if nft.serial <= 0 {
            return Err(ResponseCode::InvalidTokenNftSerialNumber);
        }
        if nft.sender == nft.receiver || nft.receiver == AccountId::default() {
            return Err(ResponseCode::InvalidAccountAmounts);
        }
        if !serials.insert(nft.serial) {
            return Err(ResponseCode::InvalidTransactionBody);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;
    use hts_primitives::{TokenBurnBody, TokenId};

    fn check(body: TransactionBody) -> ResponseCode {
        validate(&SyntheticTransaction::new(body), &HtsConfig::default())
    }

    #[test]
    fn duplicate_associate_tokens_are_rejected() {
        let token = TokenId::from_num(0x486);
        let code = check(TransactionBody::TokenAssociate(TokenAssociationBody {
            account: AccountId::from_num(0x488),
            tokens: vec![token, token],
        }));
        assert_eq!(code, ResponseCode::TokenIdRepeatedInTokenList);
    }

    #[test]
    fn mint_with_amount_and_metadata_is_invalid() {
        let code = check(TransactionBody::TokenMint(TokenMintBody {
            token: TokenId::from_num(0x43e),
            amount: 15,
            metadata: vec![Bytes::from_static(b"x")],
        }));
        assert_eq!(code, ResponseCode::InvalidTransactionBody);
    }

    #[test]
    fn negative_burn_amount_is_rejected() {
        let code = check(TransactionBody::TokenBurn(TokenBurnBody {
            token: TokenId::from_num(0x498),
            amount: -1,
            serial_numbers: Vec::new(),
        }));
        assert_eq!(code, ResponseCode::InvalidTokenBurnAmount);
    }

    #[test]
    fn unbalanced_token_transfer_is_rejected() {
        let token = TokenId::from_num(0x482);
        let code = check(TransactionBody::CryptoTransfer {
            hbar_transfers: Vec::new(),
            token_transfers: vec![TokenTransferList {
                token,
                transfers: vec![
                    AccountAmount::new(AccountId::from_num(1), -5),
                    AccountAmount::new(AccountId::from_num(2), 4),
                ],
                nft_transfers: Vec::new(),
            }],
        });
        assert_eq!(code, ResponseCode::TransfersNotZeroSumForToken);
    }

    #[test]
    fn balanced_transfer_passes() {
        let code = check(TransactionBody::CryptoTransfer {
            hbar_transfers: Vec::new(),
            token_transfers: vec![TokenTransferList {
                token: TokenId::from_num(0x482),
                transfers: vec![
                    AccountAmount::new(AccountId::from_num(1), -5),
                    AccountAmount::new(AccountId::from_num(2), 5),
                ],
                nft_transfers: Vec::new(),
            }],
        });
        assert_eq!(code, ResponseCode::Ok);
    }

    #[test]
    fn create_limits_come_from_config() {
        let mut body = TokenCreateBody {
            name: "n".repeat(11),
            symbol: "S".into(),
            treasury: AccountId::from_num(2),
            ..Default::default()
        };
        let config = HtsConfig {
            max_token_name_utf8_bytes: 10,
            ..Default::default()
        };
        let txn = SyntheticTransaction::new(TransactionBody::TokenCreate(Box::new(body.clone())));
        assert_eq!(validate(&txn, &config), ResponseCode::TokenNameTooLong);

        body.name = "name".into();
        body.treasury = AccountId::default();
        let txn = SyntheticTransaction::new(TransactionBody::TokenCreate(Box::new(body)));
        assert_eq!(
            validate(&txn, &config),
            ResponseCode::InvalidTreasuryAccountForToken
        );
    }
}
