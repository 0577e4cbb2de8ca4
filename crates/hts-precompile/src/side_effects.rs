//! Ledger effects reported on success records.
//!
//! Effects are derived from the committed change set against the state it
//! replaces, so every operation reports them the same way regardless of which
//! business logic produced the writes.

use crate::ledger::{LedgerChanges, LedgerStore};
use hts_primitives::{
    AccountAmount, NftTransfer, TokenAssociation, TokenId, TokenTransferList, TokenType,
};
use std::collections::BTreeMap;

/// Observable effects of one committed invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SideEffects {
    /// Token created.
    pub new_token: Option<TokenId>,
    /// Total supply of the token whose supply changed.
    pub new_total_supply: Option<i64>,
    /// Serials minted, ascending.
    pub minted_serials: Vec<i64>,
    /// Fungible adjustments and NFT movements grouped per token.
    pub token_transfers: Vec<TokenTransferList>,
    /// Relationships created.
    pub associations: Vec<TokenAssociation>,
    /// Hbar adjustments.
    pub hbar_transfers: Vec<AccountAmount>,
}

impl SideEffects {
    /// Diffs `changes` against the rows currently in `store`.
    pub fn from_changes(changes: &LedgerChanges, store: &dyn LedgerStore) -> Self {
        let mut effects = Self::default();
        let mut per_token: BTreeMap<TokenId, TokenTransferList> = BTreeMap::new();

        for (id, staged) in &changes.tokens {
            let Some(token) = staged else { continue };
            match store.token(id) {
                None => {
                    effects.new_token = Some(*id);
                    if token.total_supply != 0 {
                        effects.new_total_supply = Some(token.total_supply);
                    }
                }
                Some(prior) if prior.total_supply != token.total_supply => {
                    effects.new_total_supply = Some(token.total_supply);
                }
                Some(_) => {}
            }
        }

        for ((account, token), staged) in &changes.token_rels {
            let prior = store.token_rel(&(*account, *token));
            if prior.is_none() && staged.is_some() {
                effects.associations.push(TokenAssociation {
                    token: *token,
                    account: *account,
                });
            }
            if is_non_fungible(changes, store, token) {
                continue;
            }
            let before = prior.map_or(0, |rel| rel.balance);
            let after = staged.as_ref().map_or(0, |rel| rel.balance);
            if after != before {
                list_for(&mut per_token, *token)
                    .transfers
                    .push(AccountAmount::new(*account, after - before));
            }
        }

        for (id, staged) in &changes.nfts {
            let prior_owner = store.nft(id).map(|nft| nft.owner);
            let new_owner = staged.as_ref().map(|nft| nft.owner);
            if prior_owner.is_none() && new_owner.is_some() {
                effects.minted_serials.push(id.serial);
            }
            if prior_owner != new_owner {
                list_for(&mut per_token, id.token).nft_transfers.push(NftTransfer {
                    sender: prior_owner.unwrap_or_default(),
                    receiver: new_owner.unwrap_or_default(),
                    serial: id.serial,
                    is_approval: false,
                });
            }
        }

        for (id, staged) in &changes.accounts {
            let before = store.account(id).map_or(0, |account| account.balance);
            let after = staged.as_ref().map_or(0, |account| account.balance);
            if after != before {
                effects.hbar_transfers.push(AccountAmount::new(*id, after - before));
            }
        }

        effects.token_transfers = per_token.into_values().collect();
        effects
    }
}

fn list_for(
    lists: &mut BTreeMap<TokenId, TokenTransferList>,
    token: TokenId,
) -> &mut TokenTransferList {
    let empty = TokenTransferList {
        token,
        ..Default::default()
    };
    lists.entry(token).or_insert(empty)
}

fn is_non_fungible(changes: &LedgerChanges, store: &dyn LedgerStore, token: &TokenId) -> bool {
    let token_type = match changes.tokens.get(token) {
        Some(Some(staged)) => Some(staged.token_type),
        _ => store.token(token).map(|existing| existing.token_type),
    };
    token_type == Some(TokenType::NonFungibleUnique)
}
