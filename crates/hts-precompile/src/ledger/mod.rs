//! Transactional view over the four ledger tables.
//!
//! A [`WorldLedgers`] lives for exactly one precompile invocation. Reads see
//! staged writes first and fall through to the backing [`LedgerStore`];
//! writes stay staged until [`WorldLedgers::commit`] hands them to the store
//! in a single [`LedgerStore::apply`] call. Dropping the view discards them.

mod overlay;

pub use overlay::TransactionalLedger;

use crate::{error::StoreError, side_effects::SideEffects};
use alloy_primitives::Address;
use hts_primitives::{
    Account, AccountId, NftId, Token, TokenId, TokenRelationship, TokenType, UniqueToken,
};
use std::{collections::BTreeMap, fmt};

/// Key of the token-relationships table.
pub type RelKey = (AccountId, TokenId);

/// Backing storage for committed ledger state.
pub trait LedgerStore {
    /// Reads an account row.
    fn account(&self, id: &AccountId) -> Option<Account>;

    /// Reads a token row.
    fn token(&self, id: &TokenId) -> Option<Token>;

    /// Reads a token relationship row.
    fn token_rel(&self, key: &RelKey) -> Option<TokenRelationship>;

    /// Reads a unique token row.
    fn nft(&self, id: &NftId) -> Option<UniqueToken>;

    /// Entity number the next created entity would receive.
    fn peek_next_entity_num(&self) -> u64;

    /// Applies a change set atomically.
    fn apply(&mut self, changes: LedgerChanges) -> Result<(), StoreError>;
}

/// Maps an EVM address to the address the ledger knows the entity by.
pub trait AliasResolver {
    /// Returns the long-zero address behind `address`, or `address` itself.
    fn resolve_for_evm(&self, address: Address) -> Address;
}

impl<F> AliasResolver for F
where
    F: Fn(Address) -> Address,
{
    fn resolve_for_evm(&self, address: Address) -> Address {
        self(address)
    }
}

/// Looks up the fungibility of a token.
pub trait TokenTypes {
    /// Type of `token`, or `None` if it does not exist.
    fn token_type(&self, token: &TokenId) -> Option<TokenType>;
}

/// Token type lookup that knows no tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTokens;

impl TokenTypes for NoTokens {
    fn token_type(&self, _token: &TokenId) -> Option<TokenType> {
        None
    }
}

/// Everything one invocation wrote, keyed per table. `None` removes a row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerChanges {
    /// Account rows.
    pub accounts: BTreeMap<AccountId, Option<Account>>,
    /// Token rows.
    pub tokens: BTreeMap<TokenId, Option<Token>>,
    /// Token relationship rows.
    pub token_rels: BTreeMap<RelKey, Option<TokenRelationship>>,
    /// Unique token rows.
    pub nfts: BTreeMap<NftId, Option<UniqueToken>>,
    /// Number of entity numbers consumed, starting at the store's next number.
    pub entities_created: u64,
}

/// Per-invocation transactional view over the ledger.
pub struct WorldLedgers<'a> {
    store: &'a mut dyn LedgerStore,
    aliases: &'a dyn AliasResolver,
    accounts: TransactionalLedger<AccountId, Account>,
    tokens: TransactionalLedger<TokenId, Token>,
    token_rels: TransactionalLedger<RelKey, TokenRelationship>,
    nfts: TransactionalLedger<NftId, UniqueToken>,
    entities_created: u64,
}

impl fmt::Debug for WorldLedgers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldLedgers")
            .field("accounts", &self.accounts)
            .field("tokens", &self.tokens)
            .field("token_rels", &self.token_rels)
            .field("nfts", &self.nfts)
            .field("entities_created", &self.entities_created)
            .finish_non_exhaustive()
    }
}

impl<'a> WorldLedgers<'a> {
    /// Wraps `store` for one invocation.
    pub fn wrap(store: &'a mut dyn LedgerStore, aliases: &'a dyn AliasResolver) -> Self {
        Self {
            store,
            aliases,
            accounts: TransactionalLedger::new(),
            tokens: TransactionalLedger::new(),
            token_rels: TransactionalLedger::new(),
            nfts: TransactionalLedger::new(),
            entities_created: 0,
        }
    }

    /// Resolves an EVM alias to its long-zero address.
    pub fn canonical_address(&self, address: Address) -> Address {
        self.aliases.resolve_for_evm(address)
    }

    /// Reads an account.
    pub fn account(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get_or_else(id, || self.store.account(id))
    }

    /// Reads a token.
    pub fn token(&self, id: &TokenId) -> Option<Token> {
        self.tokens.get_or_else(id, || self.store.token(id))
    }

    /// Reads the relationship between `account` and `token`.
    pub fn token_rel(&self, account: &AccountId, token: &TokenId) -> Option<TokenRelationship> {
        let key = (*account, *token);
        self.token_rels.get_or_else(&key, || self.store.token_rel(&key))
    }

    /// Reads one NFT.
    pub fn nft(&self, id: &NftId) -> Option<UniqueToken> {
        self.nfts.get_or_else(id, || self.store.nft(id))
    }

    /// Stages an account row.
    pub fn put_account(&mut self, account: Account) {
        self.accounts.put(account.id, account);
    }

    /// Stages a token row.
    pub fn put_token(&mut self, token: Token) {
        self.tokens.put(token.id, token);
    }

    /// Stages a relationship row.
    pub fn put_token_rel(&mut self, account: AccountId, token: TokenId, rel: TokenRelationship) {
        self.token_rels.put((account, token), rel);
    }

    /// Stages removal of a relationship row.
    pub fn remove_token_rel(&mut self, account: AccountId, token: TokenId) {
        self.token_rels.remove((account, token));
    }

    /// Stages an NFT row.
    pub fn put_nft(&mut self, nft: UniqueToken) {
        self.nfts.put(nft.id, nft);
    }

    /// Stages removal of an NFT row.
    pub fn remove_nft(&mut self, id: NftId) {
        self.nfts.remove(id);
    }

    /// Reserves the next entity number.
    pub fn allocate_entity_num(&mut self) -> u64 {
        let num = self.store.peek_next_entity_num() + self.entities_created;
        self.entities_created += 1;
        num
    }

    /// Applies every staged write in one store call and reports what changed.
    ///
    /// Consumes the view, so a call can commit at most once.
    pub fn commit(self) -> Result<SideEffects, StoreError> {
        let changes = LedgerChanges {
            accounts: self.accounts.into_changes(),
            tokens: self.tokens.into_changes(),
            token_rels: self.token_rels.into_changes(),
            nfts: self.nfts.into_changes(),
            entities_created: self.entities_created,
        };
        let side_effects = SideEffects::from_changes(&changes, &*self.store);
        self.store.apply(changes)?;
        Ok(side_effects)
    }
}

impl TokenTypes for WorldLedgers<'_> {
    fn token_type(&self, token: &TokenId) -> Option<TokenType> {
        self.token(token).map(|token| token.token_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemStore {
        tokens: BTreeMap<TokenId, Token>,
        applied: Vec<LedgerChanges>,
    }

    impl LedgerStore for MemStore {
        fn account(&self, _id: &AccountId) -> Option<Account> {
            None
        }

        fn token(&self, id: &TokenId) -> Option<Token> {
            self.tokens.get(id).cloned()
        }

        fn token_rel(&self, _key: &RelKey) -> Option<TokenRelationship> {
            None
        }

        fn nft(&self, _id: &NftId) -> Option<UniqueToken> {
            None
        }

        fn peek_next_entity_num(&self) -> u64 {
            1001
        }

        fn apply(&mut self, changes: LedgerChanges) -> Result<(), StoreError> {
            self.applied.push(changes);
            Ok(())
        }
    }

    fn identity(address: Address) -> Address {
        address
    }

    #[test]
    fn dropped_view_writes_nothing() {
        let mut store = MemStore::default();
        {
            let mut ledgers = WorldLedgers::wrap(&mut store, &identity);
            ledgers.put_token(Token {
                id: TokenId::from_num(7),
                ..Default::default()
            });
            assert!(ledgers.token(&TokenId::from_num(7)).is_some());
        }
        assert!(store.applied.is_empty());
    }

    #[test]
    fn commit_applies_once_and_allocates_sequential_ids() {
        let mut store = MemStore::default();
        let mut ledgers = WorldLedgers::wrap(&mut store, &identity);
        assert_eq!(ledgers.allocate_entity_num(), 1001);
        assert_eq!(ledgers.allocate_entity_num(), 1002);
        ledgers.put_token(Token {
            id: TokenId::from_num(1001),
            ..Default::default()
        });

        let effects = ledgers.commit().unwrap();
        assert_eq!(effects.new_token, Some(TokenId::from_num(1001)));
        assert_eq!(store.applied.len(), 1);
        assert_eq!(store.applied[0].entities_created, 2);
    }

    #[test]
    fn token_types_come_from_the_view() {
        let mut store = MemStore::default();
        let nft = TokenId::from_num(0xc);
        store.tokens.insert(
            nft,
            Token {
                id: nft,
                token_type: TokenType::NonFungibleUnique,
                ..Default::default()
            },
        );
        let ledgers = WorldLedgers::wrap(&mut store, &identity);
        assert_eq!(ledgers.token_type(&nft), Some(TokenType::NonFungibleUnique));
        assert_eq!(ledgers.token_type(&TokenId::from_num(0xd)), None);
    }
}
