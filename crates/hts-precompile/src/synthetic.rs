//! Builds the native transaction body a descriptor stands for.

use crate::descriptor::{
    CreateOp, ExpiryArg, KeyValue, OperationDescriptor, TokenKeyArg, TransferValue, UpdateInfoOp,
};
use hts_primitives::{
    AccountAmount, AccountId, Expiry, Key, NftAllowance, NftRemoveAllowance, NftTransfer,
    SyntheticTransaction, TokenAllowance, TokenAssociationBody, TokenBurnBody, TokenCreateBody,
    TokenId, TokenKeys, TokenMintBody, TokenQueryBody, TokenTransferList, TokenUpdateBody,
    TokenWipeBody, TransactionBody,
};

/// Caller facts the builder needs beyond the descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildContext {
    /// Calling account.
    pub sender: AccountId,
    /// Key of the calling account, substituted for `inheritAccountKey`.
    pub sender_key: Option<Key>,
    /// Current owner of the NFT an approve call targets.
    pub nft_owner: Option<AccountId>,
}

/// Builds the synthetic transaction for `descriptor`.
pub fn build(descriptor: &OperationDescriptor, ctx: &BuildContext) -> SyntheticTransaction {
    use OperationDescriptor as Op;

    let body = match descriptor {
        Op::Associate { account, token } => {
            TransactionBody::TokenAssociate(association(*account, vec![*token]))
        }
        Op::MultiAssociate { account, tokens } => {
            TransactionBody::TokenAssociate(association(*account, tokens.clone()))
        }
        Op::Dissociate { account, token } => {
            TransactionBody::TokenDissociate(association(*account, vec![*token]))
        }
        Op::MultiDissociate { account, tokens } => {
            TransactionBody::TokenDissociate(association(*account, tokens.clone()))
        }
        Op::Mint(op) => TransactionBody::TokenMint(TokenMintBody {
            token: op.token,
            amount: op.amount,
            metadata: op.metadata.clone(),
        }),
        Op::Burn(op) => TransactionBody::TokenBurn(TokenBurnBody {
            token: op.token,
            amount: op.amount,
            serial_numbers: op.serials.clone(),
        }),
        Op::Wipe(op) => TransactionBody::TokenWipe(TokenWipeBody {
            token: op.token,
            account: op.account,
            amount: op.amount,
            serial_numbers: op.serials.clone(),
        }),
        Op::Pause(token) => TransactionBody::TokenPause(*token),
        Op::Unpause(token) => TransactionBody::TokenUnpause(*token),
        Op::Create(op) => TransactionBody::TokenCreate(Box::new(create_body(op, ctx))),
        Op::UpdateInfo(op) => TransactionBody::TokenUpdate(Box::new(update_info_body(op, ctx))),
        Op::UpdateKeys { token, keys } => TransactionBody::TokenUpdate(Box::new(TokenUpdateBody {
            token: *token,
            keys: token_keys(keys, ctx),
            ..Default::default()
        })),
        Op::UpdateExpiry { token, expiry, .. } => {
            let body = TokenUpdateBody {
                token: *token,
                ..Default::default()
            };
            TransactionBody::TokenUpdate(Box::new(with_expiry(body, expiry)))
        }
        Op::CryptoTransfer(op) => TransactionBody::CryptoTransfer {
            hbar_transfers: op.hbar_transfers.clone(),
            token_transfers: op.token_transfers.clone(),
        },
        Op::ErcTransfer { token, from, to, value } => erc_transfer(*token, *from, *to, *value, ctx),
        Op::Approve { token, spender, value: TransferValue::Amount(amount) } => {
            TransactionBody::CryptoApproveAllowance {
                crypto: Vec::new(),
                fungible: vec![TokenAllowance {
                    token: *token,
                    owner: ctx.sender,
                    spender: *spender,
                    amount: *amount,
                }],
                nft: Vec::new(),
            }
        }
        Op::Approve { token, spender, value: TransferValue::Serial(serial) } => {
            let owner = ctx.nft_owner.unwrap_or(ctx.sender);
            if spender.is_zero() {
                TransactionBody::CryptoDeleteAllowance(vec![NftRemoveAllowance {
                    token: *token,
                    owner,
                    serial_numbers: vec![*serial],
                }])
            } else {
                TransactionBody::CryptoApproveAllowance {
                    crypto: Vec::new(),
                    fungible: Vec::new(),
                    nft: vec![NftAllowance {
                        token: *token,
                        owner,
                        spender: *spender,
                        serial_numbers: vec![*serial],
                        approved_for_all: None,
                        delegating_spender: (owner != ctx.sender).then_some(ctx.sender),
                    }],
                }
            }
        }
        Op::SetApprovalForAll { token, operator, approved } => {
            TransactionBody::CryptoApproveAllowance {
                crypto: Vec::new(),
                fungible: Vec::new(),
                nft: vec![NftAllowance {
                    token: *token,
                    owner: ctx.sender,
                    spender: *operator,
                    serial_numbers: Vec::new(),
                    approved_for_all: Some(*approved),
                    delegating_spender: None,
                }],
            }
        }
        Op::Query(query) => TransactionBody::TokenQuery(match query.nft() {
            Some(nft) => TokenQueryBody::Nft(nft),
            None => TokenQueryBody::Token(query.token()),
        }),
    };
    SyntheticTransaction::new(body)
}

/// Resolves a decoded key value into a native key.
pub fn resolve_key(value: &KeyValue, ctx: &BuildContext) -> Option<Key> {
    match value {
        KeyValue::InheritAccountKey => ctx.sender_key.clone(),
        KeyValue::Contract(id) => Some(Key::ContractId(*id)),
        KeyValue::Ed25519(bytes) => Some(Key::Ed25519(bytes.clone())),
        KeyValue::EcdsaSecp256k1(bytes) => Some(Key::EcdsaSecp256k1(bytes.clone())),
        KeyValue::DelegatableContract(id) => Some(Key::DelegatableContractId(*id)),
        KeyValue::Unset => None,
    }
}

fn association(account: AccountId, tokens: Vec<TokenId>) -> TokenAssociationBody {
    TokenAssociationBody { account, tokens }
}

fn token_keys(args: &[TokenKeyArg], ctx: &BuildContext) -> TokenKeys {
    let mut keys = TokenKeys::default();
    for arg in args {
        if let Some(key) = resolve_key(&arg.value, ctx) {
            keys.assign(arg.key_type, &key);
        }
    }
    keys
}

fn create_body(op: &CreateOp, ctx: &BuildContext) -> TokenCreateBody {
    TokenCreateBody {
        name: op.name.clone(),
        symbol: op.symbol.clone(),
        treasury: op.treasury,
        memo: op.memo.clone(),
        token_type: op.token_type,
        supply_type: op.supply_type,
        max_supply: op.max_supply,
        initial_supply: op.initial_supply,
        decimals: op.decimals,
        freeze_default: op.freeze_default,
        keys: token_keys(&op.keys, ctx),
        expiry: Expiry {
            second: op.expiry.second,
            auto_renew_account: op.expiry.auto_renew_account,
            auto_renew_period: op.expiry.auto_renew_period,
        },
        custom_fees: op.custom_fees.clone(),
    }
}

fn update_info_body(op: &UpdateInfoOp, ctx: &BuildContext) -> TokenUpdateBody {
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
    let body = TokenUpdateBody {
        token: op.token,
        name: non_empty(&op.name),
        symbol: non_empty(&op.symbol),
        treasury: op.treasury,
        memo: non_empty(&op.memo),
        keys: token_keys(&op.keys, ctx),
        ..Default::default()
    };
    with_expiry(body, &op.expiry)
}

fn with_expiry(mut body: TokenUpdateBody, expiry: &ExpiryArg) -> TokenUpdateBody {
    body.expiry = (expiry.second != 0).then_some(expiry.second);
    body.auto_renew_account = expiry.auto_renew_account;
    body.auto_renew_period = (expiry.auto_renew_period != 0).then_some(expiry.auto_renew_period);
    body
}

fn erc_transfer(
    token: TokenId,
    from: Option<AccountId>,
    to: AccountId,
    value: TransferValue,
    ctx: &BuildContext,
) -> TransactionBody {
    let owner = from.unwrap_or(ctx.sender);
    let is_approval = owner != ctx.sender;
    let list = match value {
        TransferValue::Amount(amount) => TokenTransferList {
            token,
            transfers: vec![
                AccountAmount {
                    account: owner,
                    amount: amount.saturating_neg(),
                    is_approval,
                },
                AccountAmount::new(to, amount),
            ],
            nft_transfers: Vec::new(),
        },
        TransferValue::Serial(serial) => TokenTransferList {
            token,
            transfers: Vec::new(),
            nft_transfers: vec![NftTransfer {
                sender: owner,
                receiver: to,
                serial,
                is_approval,
            }],
        },
    };
    TransactionBody::CryptoTransfer {
        hbar_transfers: Vec::new(),
        token_transfers: vec![list],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AbiVersion, MintOp};
    use hts_primitives::{token_key_type, ContractId, NativeFunction};

    fn ctx() -> BuildContext {
        BuildContext {
            sender: AccountId::from_num(1001),
            sender_key: Some(Key::ContractId(ContractId::from_num(1001))),
            nft_owner: None,
        }
    }

    #[test]
    fn transfer_from_other_owner_is_an_approval() {
        let token = TokenId::from_num(0x482);
        let owner = AccountId::from_num(7);
        let to = AccountId::from_num(8);
        let txn = build(
            &OperationDescriptor::ErcTransfer {
                token,
                from: Some(owner),
                to,
                value: TransferValue::Amount(50),
            },
            &ctx(),
        );
        match txn.body {
            TransactionBody::CryptoTransfer { token_transfers, .. } => {
                assert_eq!(
                    token_transfers[0].transfers,
                    vec![
                        AccountAmount {
                            account: owner,
                            amount: -50,
                            is_approval: true,
                        },
                        AccountAmount::new(to, 50),
                    ]
                );
            }
            other => panic!("expected crypto transfer, got {other:?}"),
        }
    }

    #[test]
    fn transfer_by_sender_is_not_an_approval() {
        let txn = build(
            &OperationDescriptor::ErcTransfer {
                token: TokenId::from_num(0x482),
                from: None,
                to: AccountId::from_num(8),
                value: TransferValue::Serial(3),
            },
            &ctx(),
        );
        match txn.body {
            TransactionBody::CryptoTransfer { token_transfers, .. } => {
                let nft = &token_transfers[0].nft_transfers[0];
                assert!(!nft.is_approval);
                assert_eq!(nft.sender, AccountId::from_num(1001));
            }
            other => panic!("expected crypto transfer, got {other:?}"),
        }
    }

    #[test]
    fn nft_approve_to_zero_removes_allowance() {
        let mut ctx = ctx();
        ctx.nft_owner = Some(AccountId::from_num(44));
        let txn = build(
            &OperationDescriptor::Approve {
                token: TokenId::from_num(0x42e),
                spender: AccountId::default(),
                value: TransferValue::Serial(2),
            },
            &ctx,
        );
        assert_eq!(txn.function(), NativeFunction::CryptoDeleteAllowance);
        assert_eq!(
            txn.body,
            TransactionBody::CryptoDeleteAllowance(vec![NftRemoveAllowance {
                token: TokenId::from_num(0x42e),
                owner: AccountId::from_num(44),
                serial_numbers: vec![2],
            }])
        );
    }

    #[test]
    fn inherited_key_uses_sender_key() {
        let supply = TokenKeyArg {
            key_type: token_key_type::SUPPLY,
            value: KeyValue::InheritAccountKey,
        };
        let keys = token_keys(&[supply], &ctx());
        assert_eq!(keys.supply, ctx().sender_key);
        assert!(keys.admin.is_none());
    }

    #[test]
    fn mint_body_copies_metadata() {
        let txn = build(
            &OperationDescriptor::Mint(MintOp {
                token: TokenId::from_num(0x42e),
                amount: 0,
                metadata: vec![alloy_primitives::Bytes::from_static(b"NFT metadata test1")],
                version: AbiVersion::V1,
            }),
            &ctx(),
        );
        assert!(txn.memo.is_empty());
        match txn.body {
            TransactionBody::TokenMint(body) => assert_eq!(body.metadata.len(), 1),
            other => panic!("expected mint, got {other:?}"),
        }
    }
}
