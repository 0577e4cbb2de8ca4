//! Read-only query evaluation against the ledger view.

use crate::{descriptor::TokenQuery, ledger::WorldLedgers};
use hts_primitives::{
    AccountId, CustomFee, Expiry, Key, NftId, ResponseCode, Token, TokenId, TokenType, UniqueToken,
};

/// `tokenURI` result for a serial that does not exist.
pub const URI_QUERY_NON_EXISTING_TOKEN_ERROR: &str =
    "ERC721Metadata: URI query for nonexistent token";

/// Answer to one query, before ABI encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewValue {
    /// Full token info.
    TokenInfo(Box<Token>),
    /// Token info plus decimals.
    FungibleInfo(Box<Token>),
    /// Token info plus one NFT.
    NftInfo(Box<Token>, Box<UniqueToken>),
    /// Key in the requested slot, if set.
    Key(Option<Key>),
    /// Custom fee schedule.
    CustomFees(Vec<CustomFee>),
    /// Expiry settings.
    Expiry(Expiry),
    /// Whether the address is a token.
    IsToken(bool),
    /// Token type.
    TokenType(TokenType),
    /// Name.
    Name(String),
    /// Symbol.
    Symbol(String),
    /// Decimals.
    Decimals(u32),
    /// Total supply.
    TotalSupply(i64),
    /// Balance of one account.
    Balance(i64),
    /// NFT owner.
    Owner(AccountId),
    /// NFT metadata rendered as a URI.
    TokenUri(String),
    /// Fungible allowance.
    Allowance(i64),
    /// Approved NFT spender; the zero account when none.
    Approved(AccountId),
    /// Operator approval.
    ApprovedForAll(bool),
}

fn token(ledgers: &WorldLedgers<'_>, id: &TokenId) -> Result<Token, ResponseCode> {
    ledgers.token(id).ok_or(ResponseCode::InvalidTokenId)
}

fn nft_row(ledgers: &WorldLedgers<'_>, id: &NftId) -> Result<UniqueToken, ResponseCode> {
    ledgers
        .nft(id)
        .ok_or(ResponseCode::InvalidTokenNftSerialNumber)
}

/// Evaluates `query`.
pub fn evaluate(
    query: &TokenQuery,
    ledgers: &WorldLedgers<'_>,
) -> Result<ViewValue, ResponseCode> {
    let value = match query {
        TokenQuery::Info(id) => ViewValue::TokenInfo(Box::new(token(ledgers, id)?)),
        TokenQuery::FungibleInfo(id) => ViewValue::FungibleInfo(Box::new(token(ledgers, id)?)),
        TokenQuery::NftInfo(nft) => {
            let info = token(ledgers, &nft.token)?;
            let unique = nft_row(ledgers, nft)?;
            ViewValue::NftInfo(Box::new(info), Box::new(unique))
        }
        TokenQuery::Key { token: id, key_type } => {
            ViewValue::Key(token(ledgers, id)?.keys.get(*key_type).cloned())
        }
        TokenQuery::CustomFees(id) => ViewValue::CustomFees(token(ledgers, id)?.custom_fees),
        TokenQuery::Expiry(id) => ViewValue::Expiry(token(ledgers, id)?.expiry),
        TokenQuery::IsToken(id) => ViewValue::IsToken(ledgers.token(id).is_some()),
        TokenQuery::Type(id) => ViewValue::TokenType(token(ledgers, id)?.token_type),
        TokenQuery::Name(id) => ViewValue::Name(token(ledgers, id)?.name),
        TokenQuery::Symbol(id) => ViewValue::Symbol(token(ledgers, id)?.symbol),
        TokenQuery::Decimals(id) => ViewValue::Decimals(token(ledgers, id)?.decimals),
        TokenQuery::TotalSupply(id) => ViewValue::TotalSupply(token(ledgers, id)?.total_supply),
        TokenQuery::BalanceOf { token: id, account } => {
            token(ledgers, id)?;
            ViewValue::Balance(ledgers.token_rel(account, id).map_or(0, |rel| rel.balance))
        }
        TokenQuery::OwnerOf(nft) => {
            let owner = nft_row(ledgers, nft)?.owner;
            if owner.is_zero() {
                ViewValue::Owner(token(ledgers, &nft.token)?.treasury)
            } else {
                ViewValue::Owner(owner)
            }
        }
        TokenQuery::TokenUri(nft) => ViewValue::TokenUri(match ledgers.nft(nft) {
            Some(unique) => String::from_utf8_lossy(&unique.metadata).into_owned(),
            None => URI_QUERY_NON_EXISTING_TOKEN_ERROR.to_string(),
        }),
        TokenQuery::Allowance { token: id, owner, spender } => {
            token(ledgers, id)?;
            let granted = ledgers
                .account(owner)
                .ok_or(ResponseCode::InvalidAccountId)?
                .fungible_allowances
                .get(&(*id, *spender))
                .copied();
            ViewValue::Allowance(granted.unwrap_or_default())
        }
        TokenQuery::GetApproved(nft) => {
            let unique = nft_row(ledgers, nft)?;
            ViewValue::Approved(unique.spender.unwrap_or_default())
        }
        TokenQuery::IsApprovedForAll { token: id, owner, operator } => {
            token(ledgers, id)?;
            let approved = ledgers
                .account(owner)
                .is_some_and(|owner| owner.approve_for_all.contains(&(*id, *operator)));
            ViewValue::ApprovedForAll(approved)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::StoreError,
        ledger::{LedgerChanges, LedgerStore, RelKey},
    };
    use alloy_primitives::{Address, Bytes};
    use hts_primitives::{Account, TokenRelationship};
    use std::collections::BTreeMap;

    const TREASURY: AccountId = AccountId::from_num(2);
    const NFT: TokenId = TokenId::from_num(0xc);

    #[derive(Default)]
    struct Store {
        nfts: BTreeMap<NftId, UniqueToken>,
    }

    impl LedgerStore for Store {
        fn account(&self, id: &AccountId) -> Option<Account> {
            Some(Account {
                id: *id,
                ..Default::default()
            })
        }
        fn token(&self, id: &TokenId) -> Option<Token> {
            (*id == NFT).then(|| Token {
                id: NFT,
                name: "Unique".into(),
                treasury: TREASURY,
                token_type: TokenType::NonFungibleUnique,
                ..Default::default()
            })
        }
        fn token_rel(&self, key: &RelKey) -> Option<TokenRelationship> {
            (key.0 == TREASURY).then(|| TokenRelationship {
                balance: 1,
                ..Default::default()
            })
        }
        fn nft(&self, id: &NftId) -> Option<UniqueToken> {
            self.nfts.get(id).cloned()
        }
        fn peek_next_entity_num(&self) -> u64 {
            0
        }
        fn apply(&mut self, _changes: LedgerChanges) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn identity(address: Address) -> Address {
        address
    }

    fn store() -> Store {
        let id = NftId::new(NFT, 1);
        let mut store = Store::default();
        store.nfts.insert(
            id,
            UniqueToken {
                id,
                owner: AccountId::default(),
                metadata: Bytes::from_static(b"ipfs://one"),
                ..Default::default()
            },
        );
        store
    }

    #[test]
    fn treasury_held_nft_reports_treasury_owner() {
        let mut store = store();
        let ledgers = WorldLedgers::wrap(&mut store, &identity);
        assert_eq!(
            evaluate(&TokenQuery::OwnerOf(NftId::new(NFT, 1)), &ledgers),
            Ok(ViewValue::Owner(TREASURY))
        );
    }

    #[test]
    fn token_uri_of_missing_serial_is_a_fixed_message() {
        let mut store = store();
        let ledgers = WorldLedgers::wrap(&mut store, &identity);
        assert_eq!(
            evaluate(&TokenQuery::TokenUri(NftId::new(NFT, 1)), &ledgers),
            Ok(ViewValue::TokenUri("ipfs://one".into()))
        );
        assert_eq!(
            evaluate(&TokenQuery::TokenUri(NftId::new(NFT, 9)), &ledgers),
            Ok(ViewValue::TokenUri(URI_QUERY_NON_EXISTING_TOKEN_ERROR.into()))
        );
    }

    #[test]
    fn missing_token_fails_but_is_token_answers() {
        let mut store = store();
        let ledgers = WorldLedgers::wrap(&mut store, &identity);
        let other = TokenId::from_num(0xd);
        assert_eq!(
            evaluate(&TokenQuery::Name(other), &ledgers),
            Err(ResponseCode::InvalidTokenId)
        );
        assert_eq!(
            evaluate(&TokenQuery::IsToken(other), &ledgers),
            Ok(ViewValue::IsToken(false))
        );
        let balance = TokenQuery::BalanceOf {
            token: NFT,
            account: TREASURY,
        };
        assert_eq!(evaluate(&balance, &ledgers), Ok(ViewValue::Balance(1)));
    }
}
