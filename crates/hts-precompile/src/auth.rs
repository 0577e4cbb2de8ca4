//! Signing-authority checks for precompile calls.
//!
//! A call inherits no signatures of its own. Authority comes from two places:
//! the cryptographic signatures on the parent transaction, reported by a
//! [`SignatureOracle`], and the contract making the call, which activates
//! contract-bound keys that name it.
//!
//! Top-level calls use the permissive check: a `ContractId` key naming the
//! active contract is active, and the active contract may act on its own
//! account. Delegate calls use the strict check, where only
//! `DelegatableContractId` keys honor the active contract.

use crate::{error::AuthorizationError, frame::CallContext, ledger::WorldLedgers};
use hts_primitives::{
    AccountId, ContractId, Key, KeyKind, NativeFunction, ResponseCode, SyntheticTransaction,
    TokenId, TransactionBody,
};
use tracing::debug;

/// Reports which cryptographic keys signed the parent transaction.
pub trait SignatureOracle {
    /// Returns `true` if `key` (an Ed25519 or secp256k1 key) signed.
    fn has_signed(&self, key: &Key) -> bool;
}

impl<F> SignatureOracle for F
where
    F: Fn(&Key) -> bool,
{
    fn has_signed(&self, key: &Key) -> bool {
        self(key)
    }
}

/// Entity whose key must be active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subject {
    /// An account's own key.
    Account(AccountId),
    /// One of a token's key slots.
    Token(TokenId),
}

/// One authority a call must demonstrate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// A key looked up on the ledger.
    Ledger {
        /// Which key.
        kind: KeyKind,
        /// Whose key.
        subject: Subject,
    },
    /// A key carried in the body itself, such as a new token's admin key.
    Explicit(Key),
}

/// Code returned when a key of `kind` is present but not active.
pub const fn denial_code(kind: KeyKind) -> ResponseCode {
    match kind {
        KeyKind::Ordinary => ResponseCode::InvalidFullPrefixSignatureForPrecompile,
        KeyKind::Supply | KeyKind::Admin | KeyKind::Wipe | KeyKind::Pause => {
            ResponseCode::InvalidSignature
        }
    }
}

const fn missing_key_code(kind: KeyKind) -> ResponseCode {
    match kind {
        KeyKind::Supply => ResponseCode::TokenHasNoSupplyKey,
        KeyKind::Admin => ResponseCode::TokenIsImmutable,
        KeyKind::Wipe => ResponseCode::TokenHasNoWipeKey,
        KeyKind::Pause => ResponseCode::TokenHasNoPauseKey,
        KeyKind::Ordinary => ResponseCode::InvalidAccountId,
    }
}

/// Evaluates keys for one invocation.
pub struct Authorizer<'a> {
    oracle: &'a dyn SignatureOracle,
    active_contract: ContractId,
    strict: bool,
}

impl std::fmt::Debug for Authorizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("active_contract", &self.active_contract)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl<'a> Authorizer<'a> {
    /// Builds an authorizer for the call described by `ctx`.
    ///
    /// `active_contract` is the caller's address after alias resolution.
    pub fn new(
        oracle: &'a dyn SignatureOracle,
        active_contract: ContractId,
        ctx: &CallContext,
    ) -> Self {
        Self {
            oracle,
            active_contract,
            strict: ctx.is_delegate_call,
        }
    }

    /// Returns `true` when delegate-call rules apply.
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Checks whether `kind` of `subject` is active.
    pub fn authorize(
        &self,
        kind: KeyKind,
        subject: Subject,
        ledgers: Option<&WorldLedgers<'_>>,
        function: NativeFunction,
    ) -> Result<bool, AuthorizationError> {
        let ledgers = ledgers.ok_or(AuthorizationError::Unavailable)?;
        let key = match subject {
            Subject::Account(account) => {
                if !self.strict && account == AccountId::from(self.active_contract) {
                    debug!(
                        target: "hts_precompile",
                        %function,
                        %account,
                        "caller acts on its own account"
                    );
                    return Ok(true);
                }
                ledgers
                    .account(&account)
                    .ok_or(AuthorizationError::MissingAccount)?
                    .key
            }
            Subject::Token(token) => {
                let token = ledgers
                    .token(&token)
                    .ok_or(AuthorizationError::MissingToken)?;
                let slot = match kind {
                    KeyKind::Supply => token.keys.supply,
                    KeyKind::Admin => token.keys.admin,
                    KeyKind::Wipe => token.keys.wipe,
                    KeyKind::Pause => token.keys.pause,
                    KeyKind::Ordinary => None,
                };
                Some(slot.ok_or(AuthorizationError::MissingKey(missing_key_code(kind)))?)
            }
        };
        let active = key.as_ref().is_some_and(|key| self.is_active(key));
        debug!(
            target: "hts_precompile",
            %function,
            ?kind,
            ?subject,
            strict = self.strict,
            active,
            "authorization checked"
        );
        Ok(active)
    }

    /// Returns `true` if `key` is active for this call.
    pub fn is_active(&self, key: &Key) -> bool {
        match key {
            Key::Ed25519(_) | Key::EcdsaSecp256k1(_) => self.oracle.has_signed(key),
            Key::ContractId(id) => !self.strict && *id == self.active_contract,
            Key::DelegatableContractId(id) => *id == self.active_contract,
            Key::KeyList(keys) => !keys.is_empty() && keys.iter().all(|key| self.is_active(key)),
            Key::Threshold { threshold, keys } => {
                let needed = (*threshold).max(1) as usize;
                let active = keys.iter().filter(|key| self.is_active(key));
                active.take(needed).count() >= needed
            }
        }
    }

    /// Checks every requirement of `txn`, returning the first denial.
    pub fn check(
        &self,
        txn: &SyntheticTransaction,
        ledgers: Option<&WorldLedgers<'_>>,
        sender: AccountId,
    ) -> Result<(), ResponseCode> {
        let function = txn.function();
        for requirement in requirements(txn, sender) {
            match requirement {
                Requirement::Ledger { kind, subject } => {
                    match self.authorize(kind, subject, ledgers, function) {
                        Ok(true) => {}
                        Ok(false) => return Err(denial_code(kind)),
                        Err(err) => return Err(err.code()),
                    }
                }
                Requirement::Explicit(key) => {
                    if !self.is_active(&key) {
                        return Err(ResponseCode::InvalidSignature);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Keys `txn` needs, in the order they are checked.
pub fn requirements(txn: &SyntheticTransaction, sender: AccountId) -> Vec<Requirement> {
    let ordinary = |account| Requirement::Ledger {
        kind: KeyKind::Ordinary,
        subject: Subject::Account(account),
    };
    let token_key = |kind, token| Requirement::Ledger {
        kind,
        subject: Subject::Token(token),
    };

    match &txn.body {
        TransactionBody::TokenAssociate(body) | TransactionBody::TokenDissociate(body) => {
            vec![ordinary(body.account)]
        }
        TransactionBody::TokenMint(body) => vec![token_key(KeyKind::Supply, body.token)],
        TransactionBody::TokenBurn(body) => vec![token_key(KeyKind::Supply, body.token)],
        TransactionBody::TokenWipe(body) => vec![token_key(KeyKind::Wipe, body.token)],
        TransactionBody::TokenPause(token) | TransactionBody::TokenUnpause(token) => {
            vec![token_key(KeyKind::Pause, *token)]
        }
        TransactionBody::TokenCreate(body) => {
            let mut needed = vec![ordinary(body.treasury)];
            if let Some(admin) = &body.keys.admin {
                needed.push(Requirement::Explicit(admin.clone()));
            }
            needed
        }
        TransactionBody::TokenUpdate(body) => vec![token_key(KeyKind::Admin, body.token)],
        TransactionBody::CryptoTransfer { hbar_transfers, token_transfers } => {
            let mut debited = Vec::new();
            let token_debits = token_transfers.iter().flat_map(|list| &list.transfers);
            let debits = hbar_transfers
                .iter()
                .chain(token_debits)
                .filter(|adjustment| adjustment.amount < 0 && !adjustment.is_approval)
                .map(|adjustment| adjustment.account);
            let senders = token_transfers
                .iter()
                .flat_map(|list| list.nft_transfers.iter())
                .filter(|nft| !nft.is_approval)
                .map(|nft| nft.sender);
            for account in debits.chain(senders) {
                if !debited.contains(&account) {
                    debited.push(account);
                }
            }
            debited.into_iter().map(ordinary).collect()
        }
        TransactionBody::CryptoApproveAllowance { .. }
        | TransactionBody::CryptoDeleteAllowance(_) => vec![ordinary(sender)],
        TransactionBody::TokenQuery(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::StoreError,
        frame::{CallFrame, ParentFrame},
        ledger::{LedgerChanges, LedgerStore, RelKey},
    };
    use alloy_primitives::{Address, Bytes};
    use hts_primitives::{
        Account, AccountAmount, NftId, Token, TokenKeys, TokenMintBody, TokenRelationship,
        TokenTransferList, UniqueToken,
    };
    use std::collections::BTreeMap;

    const CALLER: u64 = 0x4d2;

    #[derive(Default)]
    struct Store {
        accounts: BTreeMap<AccountId, Account>,
        tokens: BTreeMap<TokenId, Token>,
    }

    impl LedgerStore for Store {
        fn account(&self, id: &AccountId) -> Option<Account> {
            self.accounts.get(id).cloned()
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
            2000
        }
        fn apply(&mut self, _changes: LedgerChanges) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn identity(address: Address) -> Address {
        address
    }

    fn nobody_signed(_key: &Key) -> bool {
        false
    }

    fn ctx(delegating: bool) -> CallContext {
        let caller = AccountId::from_num(CALLER).to_evm_address();
        let code = if delegating {
            AccountId::from_num(0xbee).to_evm_address()
        } else {
            caller
        };
        let parent = ParentFrame {
            contract: code,
            recipient: caller,
        };
        CallContext::capture(&CallFrame {
            sender: caller,
            parent: Some(parent),
            ..Default::default()
        })
    }

    fn token_with_supply(key: Key) -> Token {
        Token {
            id: TokenId::from_num(0x43e),
            keys: TokenKeys {
                supply: Some(key),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn mint() -> SyntheticTransaction {
        SyntheticTransaction::new(TransactionBody::TokenMint(TokenMintBody {
            token: TokenId::from_num(0x43e),
            amount: 1,
            metadata: Vec::new(),
        }))
    }

    #[test]
    fn contract_key_is_honored_only_outside_delegate_calls() {
        let mut store = Store::default();
        let token = token_with_supply(Key::ContractId(ContractId::from_num(CALLER)));
        store.tokens.insert(token.id, token);
        let ledgers = WorldLedgers::wrap(&mut store, &identity);
        let caller = ContractId::from_num(CALLER);
        let sender = AccountId::from(caller);

        let top_level = Authorizer::new(&nobody_signed, caller, &ctx(false));
        assert_eq!(top_level.check(&mint(), Some(&ledgers), sender), Ok(()));

        let delegated = Authorizer::new(&nobody_signed, caller, &ctx(true));
        assert!(delegated.is_strict());
        assert_eq!(
            delegated.check(&mint(), Some(&ledgers), sender),
            Err(ResponseCode::InvalidSignature)
        );
    }

    #[test]
    fn delegatable_key_survives_delegate_calls() {
        let mut store = Store::default();
        let token = token_with_supply(Key::DelegatableContractId(ContractId::from_num(CALLER)));
        store.tokens.insert(token.id, token);
        let ledgers = WorldLedgers::wrap(&mut store, &identity);
        let caller = ContractId::from_num(CALLER);

        let delegated = Authorizer::new(&nobody_signed, caller, &ctx(true));
        let sender = AccountId::from(caller);
        assert_eq!(delegated.check(&mint(), Some(&ledgers), sender), Ok(()));
    }

    #[test]
    fn missing_slot_and_missing_view_map_to_codes() {
        let mut store = Store::default();
        let token = Token {
            id: TokenId::from_num(0x43e),
            ..Default::default()
        };
        store.tokens.insert(token.id, token);
        let ledgers = WorldLedgers::wrap(&mut store, &identity);
        let caller = ContractId::from_num(CALLER);
        let sender = AccountId::from(caller);
        let auth = Authorizer::new(&nobody_signed, caller, &ctx(false));

        assert_eq!(
            auth.check(&mint(), Some(&ledgers), sender),
            Err(ResponseCode::TokenHasNoSupplyKey)
        );
        assert_eq!(
            auth.check(&mint(), None, sender),
            Err(ResponseCode::FailInvalid)
        );
    }

    #[test]
    fn caller_owns_its_account_only_at_top_level() {
        let mut store = Store::default();
        let account = AccountId::from_num(CALLER);
        let row = Account {
            id: account,
            ..Default::default()
        };
        store.accounts.insert(account, row);
        let ledgers = WorldLedgers::wrap(&mut store, &identity);
        let caller = ContractId::from_num(CALLER);
        let subject = Subject::Account(account);
        let function = NativeFunction::TokenAssociateToAccount;

        let top_level = Authorizer::new(&nobody_signed, caller, &ctx(false));
        assert_eq!(
            top_level.authorize(KeyKind::Ordinary, subject, Some(&ledgers), function),
            Ok(true)
        );
        let delegated = Authorizer::new(&nobody_signed, caller, &ctx(true));
        assert_eq!(
            delegated.authorize(KeyKind::Ordinary, subject, Some(&ledgers), function),
            Ok(false)
        );
    }

    #[test]
    fn threshold_and_list_keys_count_active_members() {
        let signer = Key::Ed25519(Bytes::from_static(&[7; 32]));
        let other = Key::Ed25519(Bytes::from_static(&[8; 32]));
        let signed = signer.clone();
        let oracle = move |key: &Key| *key == signed;
        let auth = Authorizer::new(&oracle, ContractId::from_num(CALLER), &ctx(false));

        let threshold = |threshold| Key::Threshold {
            threshold,
            keys: vec![signer.clone(), other.clone()],
        };
        assert!(auth.is_active(&threshold(1)));
        assert!(!auth.is_active(&threshold(2)));
        assert!(!auth.is_active(&Key::KeyList(vec![signer.clone(), other])));
        assert!(auth.is_active(&Key::KeyList(vec![signer])));
        assert!(!auth.is_active(&Key::KeyList(Vec::new())));
    }

    #[test]
    fn approval_debits_need_no_owner_signature() {
        let token = TokenId::from_num(0x482);
        let owner = AccountId::from_num(7);
        let txn = SyntheticTransaction::new(TransactionBody::CryptoTransfer {
            hbar_transfers: Vec::new(),
            token_transfers: vec![TokenTransferList {
                token,
                transfers: vec![
                    AccountAmount {
                        account: owner,
                        amount: -5,
                        is_approval: true,
                    },
                    AccountAmount::new(AccountId::from_num(8), 5),
                ],
                nft_transfers: Vec::new(),
            }],
        });
        assert!(requirements(&txn, AccountId::from_num(CALLER)).is_empty());
    }
}
