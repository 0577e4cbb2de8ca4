//! Selector dispatch and ABI decoding into [`OperationDescriptor`]s.

use crate::{
    abi::{
        IERC20Facade, IERC721Facade, IHederaTokenService as Hts, IHederaTokenServiceV1 as HtsV1,
        IHederaTokenServiceV2 as HtsV2,
    },
    config::HtsConfig,
    descriptor::{
        AbiVersion, BurnOp, CallConvention, CreateOp, ExpiryArg, KeyValue, MintOp,
        OperationDescriptor, ResolvedCall, TokenKeyArg, TokenQuery, TransferKind, TransferOp,
        TransferValue, UpdateInfoOp, WipeOp,
    },
    error::{DecodeError, DispatchError},
    ledger::{AliasResolver, TokenTypes},
    redirect::{unwrap_redirect, Redirect},
    selectors::{self as sel, selector_of, Selector},
};
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use hts_primitives::{
    AccountAmount, AccountId, ContractId, CustomFee, FixedFee, FractionalFee, Key, NftId,
    NftTransfer, RoyaltyFee, SupplyType, TokenId, TokenTransferList, TokenType,
};
use tracing::debug;

/// Revert reason for fungible-only facade calls on other tokens.
pub const ERC20_ONLY: &str = "Invalid operation for ERC-20 token!";
/// Revert reason for NFT-only facade calls on other tokens.
pub const ERC721_ONLY: &str = "Invalid operation for ERC-721 token!";
/// Revert reason for HRC calls on addresses that are not tokens.
pub const HRC_ONLY: &str = "Invalid operation for HRC token!";

/// Inputs the decoder needs besides the payload itself.
#[derive(Clone, Copy)]
pub struct DecodeContext<'a> {
    /// Calling account, the implicit subject of HRC calls.
    pub sender: AccountId,
    /// Resolves EVM aliases in address arguments.
    pub aliases: &'a dyn AliasResolver,
    /// Token type lookup for facade checks.
    pub token_types: &'a dyn TokenTypes,
    /// Feature switches.
    pub config: &'a HtsConfig,
}

impl std::fmt::Debug for DecodeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeContext")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl DecodeContext<'_> {
    fn resolve(&self, address: Address) -> Address {
        self.aliases.resolve_for_evm(address)
    }

    fn account(&self, address: Address) -> AccountId {
        AccountId::from_evm_address(self.resolve(address))
    }

    fn optional_account(&self, address: Address) -> Option<AccountId> {
        (address != Address::ZERO).then(|| self.account(address))
    }

    fn token(&self, address: Address) -> TokenId {
        TokenId::from_evm_address(self.resolve(address))
    }

    fn optional_token(&self, address: Address) -> Option<TokenId> {
        (address != Address::ZERO).then(|| self.token(address))
    }

    fn contract(&self, address: Address) -> ContractId {
        ContractId::from_evm_address(self.resolve(address))
    }

    fn gate(&self, enabled: bool, family: &'static str) -> Result<(), DispatchError> {
        if enabled {
            Ok(())
        } else {
            Err(DispatchError::NotSupported { family })
        }
    }
}

/// Resolves `input` to an operation.
///
/// Returns `Ok(None)` when the selector, bare or nested in a redirect, names
/// no known operation.
pub fn dispatch(
    input: &[u8],
    ctx: &DecodeContext<'_>,
) -> Result<Option<ResolvedCall>, DispatchError> {
    if let Some(redirect) = unwrap_redirect(input)? {
        return dispatch_redirect(&redirect, ctx);
    }
    let Some(selector) = selector_of(input) else {
        return Ok(None);
    };
    let descriptor = decode_direct(selector, input, ctx)?;
    debug!(
        target: "hts_precompile",
        selector = %hex_selector(selector),
        found = descriptor.is_some(),
        "dispatched direct call"
    );
    Ok(descriptor.map(|descriptor| ResolvedCall {
        selector,
        descriptor,
        convention: CallConvention::Direct,
    }))
}

fn hex_selector(selector: Selector) -> String {
    alloy_primitives::hex::encode_prefixed(selector)
}

fn call<C: SolCall>(input: &[u8]) -> Result<C, DecodeError> {
    Ok(C::abi_decode(input)?)
}

fn to_i64<T: TryInto<i64>>(value: T, field: &'static str) -> Result<i64, DecodeError> {
    value
        .try_into()
        .map_err(|_| DecodeError::Overflow { field })
}

fn to_i32<T: TryInto<i32>>(value: T, field: &'static str) -> Result<i32, DecodeError> {
    value
        .try_into()
        .map_err(|_| DecodeError::Overflow { field })
}

fn amounts(list: Vec<Hts::AccountAmount>, ctx: &DecodeContext<'_>) -> Vec<AccountAmount> {
    list.into_iter().map(|aa| aa.into_amount(ctx)).collect()
}

fn same_len(left: usize, right: usize) -> Result<(), DecodeError> {
    if left == right {
        Ok(())
    } else {
        Err(DecodeError::LengthMismatch { left, right })
    }
}

fn decode_direct(
    selector: Selector,
    input: &[u8],
    ctx: &DecodeContext<'_>,
) -> Result<Option<OperationDescriptor>, DispatchError> {
    use OperationDescriptor as Op;

    let config = ctx.config;
    let descriptor = match selector {
        sel::ASSOCIATE_TOKEN => {
            let c: Hts::associateTokenCall = call(input)?;
            Op::Associate {
                account: ctx.account(c.account),
                token: ctx.token(c.token),
            }
        }
        sel::ASSOCIATE_TOKENS => {
            let c: Hts::associateTokensCall = call(input)?;
            Op::MultiAssociate {
                account: ctx.account(c.account),
                tokens: c.tokens.into_iter().map(|t| ctx.token(t)).collect(),
            }
        }
        sel::DISSOCIATE_TOKEN => {
            let c: Hts::dissociateTokenCall = call(input)?;
            Op::Dissociate {
                account: ctx.account(c.account),
                token: ctx.token(c.token),
            }
        }
        sel::DISSOCIATE_TOKENS => {
            let c: Hts::dissociateTokensCall = call(input)?;
            Op::MultiDissociate {
                account: ctx.account(c.account),
                tokens: c.tokens.into_iter().map(|t| ctx.token(t)).collect(),
            }
        }

        sel::MINT_TOKEN => {
            let c: HtsV1::mintTokenCall = call(input)?;
            Op::Mint(MintOp {
                token: ctx.token(c.token),
                amount: to_i64(c.amount, "amount")?,
                metadata: c.metadata,
                version: AbiVersion::V1,
            })
        }
        sel::MINT_TOKEN_V2 => {
            let c: Hts::mintTokenCall = call(input)?;
            Op::Mint(MintOp {
                token: ctx.token(c.token),
                amount: c.amount,
                metadata: c.metadata,
                version: AbiVersion::V2,
            })
        }
        sel::BURN_TOKEN => {
            let c: HtsV1::burnTokenCall = call(input)?;
            Op::Burn(BurnOp {
                token: ctx.token(c.token),
                amount: to_i64(c.amount, "amount")?,
                serials: c.serialNumbers,
                version: AbiVersion::V1,
            })
        }
        sel::BURN_TOKEN_V2 => {
            let c: Hts::burnTokenCall = call(input)?;
            Op::Burn(BurnOp {
                token: ctx.token(c.token),
                amount: c.amount,
                serials: c.serialNumbers,
                version: AbiVersion::V2,
            })
        }
        sel::WIPE_TOKEN_ACCOUNT => {
            let c: HtsV1::wipeTokenAccountCall = call(input)?;
            Op::Wipe(WipeOp {
                token: ctx.token(c.token),
                account: ctx.account(c.account),
                amount: i64::from(c.amount),
                serials: Vec::new(),
                version: AbiVersion::V1,
            })
        }
        sel::WIPE_TOKEN_ACCOUNT_V2 => {
            let c: Hts::wipeTokenAccountCall = call(input)?;
            Op::Wipe(WipeOp {
                token: ctx.token(c.token),
                account: ctx.account(c.account),
                amount: c.amount,
                serials: Vec::new(),
                version: AbiVersion::V2,
            })
        }
        sel::WIPE_TOKEN_ACCOUNT_NFT => {
            let c: Hts::wipeTokenAccountNFTCall = call(input)?;
            Op::Wipe(WipeOp {
                token: ctx.token(c.token),
                account: ctx.account(c.account),
                amount: 0,
                serials: c.serialNumbers,
                version: AbiVersion::V1,
            })
        }

        sel::PAUSE_TOKEN => Op::Pause(ctx.token(call::<Hts::pauseTokenCall>(input)?.token)),
        sel::UNPAUSE_TOKEN => Op::Unpause(ctx.token(call::<Hts::unpauseTokenCall>(input)?.token)),

        sel::CREATE_FUNGIBLE_TOKEN => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: HtsV1::createFungibleTokenCall = call(input)?;
            let supply = to_i64(c.initialTotalSupply, "initialTotalSupply")?;
            let decimals = to_i32(c.decimals, "decimals")?;
            let parts = c.token.into_parts(ctx)?;
            fungible_create(parts, supply, decimals, Vec::new(), AbiVersion::V1)
        }
        sel::CREATE_FUNGIBLE_TOKEN_V2 => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: HtsV2::createFungibleTokenCall = call(input)?;
            let supply = to_i64(c.initialTotalSupply, "initialTotalSupply")?;
            let decimals = to_i32(c.decimals, "decimals")?;
            let parts = c.token.into_parts(ctx)?;
            fungible_create(parts, supply, decimals, Vec::new(), AbiVersion::V2)
        }
        sel::CREATE_FUNGIBLE_TOKEN_V3 => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: Hts::createFungibleTokenCall = call(input)?;
            fungible_create(
                c.token.into_parts(ctx)?,
                c.initialTotalSupply,
                c.decimals,
                Vec::new(),
                AbiVersion::V3,
            )
        }
        sel::CREATE_FUNGIBLE_TOKEN_WITH_FEES => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: HtsV1::createFungibleTokenWithCustomFeesCall = call(input)?;
            let supply = to_i64(c.initialTotalSupply, "initialTotalSupply")?;
            let decimals = to_i32(c.decimals, "decimals")?;
            let fees = collect_fees(ctx, c.fixedFees, c.fractionalFees);
            let parts = c.token.into_parts(ctx)?;
            fungible_create(parts, supply, decimals, fees, AbiVersion::V1)
        }
        sel::CREATE_FUNGIBLE_TOKEN_WITH_FEES_V2 => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: HtsV2::createFungibleTokenWithCustomFeesCall = call(input)?;
            let supply = to_i64(c.initialTotalSupply, "initialTotalSupply")?;
            let decimals = to_i32(c.decimals, "decimals")?;
            let fees = collect_fees(ctx, c.fixedFees, c.fractionalFees);
            let parts = c.token.into_parts(ctx)?;
            fungible_create(parts, supply, decimals, fees, AbiVersion::V2)
        }
        sel::CREATE_FUNGIBLE_TOKEN_WITH_FEES_V3 => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: Hts::createFungibleTokenWithCustomFeesCall = call(input)?;
            let fees = collect_fees(ctx, c.fixedFees, c.fractionalFees);
            fungible_create(
                c.token.into_parts(ctx)?,
                c.initialTotalSupply,
                c.decimals,
                fees,
                AbiVersion::V3,
            )
        }
        sel::CREATE_NON_FUNGIBLE_TOKEN => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: HtsV1::createNonFungibleTokenCall = call(input)?;
            nft_create(c.token.into_parts(ctx)?, Vec::new(), AbiVersion::V1)
        }
        sel::CREATE_NON_FUNGIBLE_TOKEN_V2 => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: HtsV2::createNonFungibleTokenCall = call(input)?;
            nft_create(c.token.into_parts(ctx)?, Vec::new(), AbiVersion::V2)
        }
        sel::CREATE_NON_FUNGIBLE_TOKEN_V3 => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: Hts::createNonFungibleTokenCall = call(input)?;
            nft_create(c.token.into_parts(ctx)?, Vec::new(), AbiVersion::V3)
        }
        sel::CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: HtsV1::createNonFungibleTokenWithCustomFeesCall = call(input)?;
            let fees = collect_fees(ctx, c.fixedFees, c.royaltyFees);
            nft_create(c.token.into_parts(ctx)?, fees, AbiVersion::V1)
        }
        sel::CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V2 => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: HtsV2::createNonFungibleTokenWithCustomFeesCall = call(input)?;
            let fees = collect_fees(ctx, c.fixedFees, c.royaltyFees);
            nft_create(c.token.into_parts(ctx)?, fees, AbiVersion::V2)
        }
        sel::CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V3 => {
            ctx.gate(config.create_enabled, "token create")?;
            let c: Hts::createNonFungibleTokenWithCustomFeesCall = call(input)?;
            let fees = collect_fees(ctx, c.fixedFees, c.royaltyFees);
            nft_create(c.token.into_parts(ctx)?, fees, AbiVersion::V3)
        }

        sel::UPDATE_TOKEN_INFO => {
            let c: HtsV1::updateTokenInfoCall = call(input)?;
            let parts = c.tokenInfo.into_parts(ctx)?;
            update_info(ctx.token(c.token), parts, AbiVersion::V1)
        }
        sel::UPDATE_TOKEN_INFO_V2 => {
            let c: HtsV2::updateTokenInfoCall = call(input)?;
            let parts = c.tokenInfo.into_parts(ctx)?;
            update_info(ctx.token(c.token), parts, AbiVersion::V2)
        }
        sel::UPDATE_TOKEN_INFO_V3 => {
            let c: Hts::updateTokenInfoCall = call(input)?;
            let parts = c.tokenInfo.into_parts(ctx)?;
            update_info(ctx.token(c.token), parts, AbiVersion::V3)
        }
        sel::UPDATE_TOKEN_KEYS => {
            let c: Hts::updateTokenKeysCall = call(input)?;
            Op::UpdateKeys {
                token: ctx.token(c.token),
                keys: c
                    .keys
                    .into_iter()
                    .map(|key| key.into_arg(ctx))
                    .collect::<Result<_, _>>()?,
            }
        }
        sel::UPDATE_TOKEN_EXPIRY_INFO => {
            let c: HtsV1::updateTokenExpiryInfoCall = call(input)?;
            Op::UpdateExpiry {
                token: ctx.token(c.token),
                expiry: c.expiryInfo.into_arg(ctx),
                version: AbiVersion::V1,
            }
        }
        sel::UPDATE_TOKEN_EXPIRY_INFO_V2 => {
            let c: Hts::updateTokenExpiryInfoCall = call(input)?;
            Op::UpdateExpiry {
                token: ctx.token(c.token),
                expiry: c.expiryInfo.into_arg(ctx),
                version: AbiVersion::V2,
            }
        }

        sel::CRYPTO_TRANSFER => {
            let c: HtsV1::cryptoTransferCall = call(input)?;
            let token_transfers = c
                .tokenTransfers
                .into_iter()
                .map(|list| TokenTransferList {
                    token: ctx.token(list.token),
                    transfers: list
                        .transfers
                        .into_iter()
                        .map(|aa| AccountAmount::new(ctx.account(aa.accountID), aa.amount))
                        .collect(),
                    nft_transfers: list
                        .nftTransfers
                        .into_iter()
                        .map(|nft| NftTransfer {
                            sender: ctx.account(nft.senderAccountID),
                            receiver: ctx.account(nft.receiverAccountID),
                            serial: nft.serialNumber,
                            is_approval: false,
                        })
                        .collect(),
                })
                .collect();
            Op::CryptoTransfer(TransferOp {
                kind: TransferKind::CryptoTransfer,
                hbar_transfers: Vec::new(),
                token_transfers,
            })
        }
        sel::CRYPTO_TRANSFER_V2 => {
            ctx.gate(
                config.atomic_crypto_transfer_enabled,
                "atomic crypto transfer",
            )?;
            let c: Hts::cryptoTransferCall = call(input)?;
            let token_transfers = c
                .tokenTransfers
                .into_iter()
                .map(|list| TokenTransferList {
                    token: ctx.token(list.token),
                    transfers: amounts(list.transfers, ctx),
                    nft_transfers: list
                        .nftTransfers
                        .into_iter()
                        .map(|nft| NftTransfer {
                            sender: ctx.account(nft.senderAccountID),
                            receiver: ctx.account(nft.receiverAccountID),
                            serial: nft.serialNumber,
                            is_approval: nft.isApproval,
                        })
                        .collect(),
                })
                .collect();
            Op::CryptoTransfer(TransferOp {
                kind: TransferKind::CryptoTransferV2,
                hbar_transfers: amounts(c.transferList.transfers, ctx),
                token_transfers,
            })
        }
        sel::TRANSFER_TOKENS => {
            let c: Hts::transferTokensCall = call(input)?;
            same_len(c.accountId.len(), c.amount.len())?;
            let transfers = c
                .accountId
                .into_iter()
                .zip(c.amount)
                .map(|(account, amount)| AccountAmount::new(ctx.account(account), amount))
                .collect();
            let token = ctx.token(c.token);
            single_list(TransferKind::TransferTokens, token, transfers, Vec::new())
        }
        sel::TRANSFER_TOKEN => {
            let c: Hts::transferTokenCall = call(input)?;
            let debit = c
                .amount
                .checked_neg()
                .ok_or(DecodeError::Overflow { field: "amount" })?;
            let transfers = vec![
                AccountAmount::new(ctx.account(c.sender), debit),
                AccountAmount::new(ctx.account(c.recipient), c.amount),
            ];
            let token = ctx.token(c.token);
            single_list(TransferKind::TransferToken, token, transfers, Vec::new())
        }
        sel::TRANSFER_NFTS => {
            let c: Hts::transferNFTsCall = call(input)?;
            same_len(c.sender.len(), c.receiver.len())?;
            same_len(c.sender.len(), c.serialNumber.len())?;
            let nft_transfers = c
                .sender
                .into_iter()
                .zip(c.receiver)
                .zip(c.serialNumber)
                .map(|((sender, receiver), serial)| NftTransfer {
                    sender: ctx.account(sender),
                    receiver: ctx.account(receiver),
                    serial,
                    is_approval: false,
                })
                .collect();
            let token = ctx.token(c.token);
            single_list(TransferKind::TransferNfts, token, Vec::new(), nft_transfers)
        }
        sel::TRANSFER_NFT => {
            let c: Hts::transferNFTCall = call(input)?;
            let nft_transfers = vec![NftTransfer {
                sender: ctx.account(c.sender),
                receiver: ctx.account(c.recipient),
                serial: c.serialNumber,
                is_approval: false,
            }];
            let token = ctx.token(c.token);
            single_list(TransferKind::TransferNft, token, Vec::new(), nft_transfers)
        }
        sel::TRANSFER_FROM => {
            let c: Hts::transferFromCall = call(input)?;
            Op::ErcTransfer {
                token: ctx.token(c.token),
                from: Some(ctx.account(c.from)),
                to: ctx.account(c.to),
                value: TransferValue::Amount(to_i64(c.amount, "amount")?),
            }
        }
        sel::TRANSFER_FROM_NFT => {
            let c: Hts::transferFromNFTCall = call(input)?;
            Op::ErcTransfer {
                token: ctx.token(c.token),
                from: Some(ctx.account(c.from)),
                to: ctx.account(c.to),
                value: TransferValue::Serial(to_i64(c.serialNumber, "serialNumber")?),
            }
        }

        sel::APPROVE => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: Hts::approveCall = call(input)?;
            Op::Approve {
                token: ctx.token(c.token),
                spender: ctx.account(c.spender),
                value: TransferValue::Amount(to_i64(c.amount, "amount")?),
            }
        }
        sel::APPROVE_NFT => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: Hts::approveNFTCall = call(input)?;
            Op::Approve {
                token: ctx.token(c.token),
                spender: ctx.account(c.approved),
                value: TransferValue::Serial(to_i64(c.serialNumber, "serialNumber")?),
            }
        }
        sel::SET_APPROVAL_FOR_ALL => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: Hts::setApprovalForAllCall = call(input)?;
            Op::SetApprovalForAll {
                token: ctx.token(c.token),
                operator: ctx.account(c.operator),
                approved: c.approved,
            }
        }
        sel::GET_APPROVED => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: Hts::getApprovedCall = call(input)?;
            let serial = to_i64(c.serialNumber, "serialNumber")?;
            Op::Query(TokenQuery::GetApproved(NftId::new(ctx.token(c.token), serial)))
        }
        sel::IS_APPROVED_FOR_ALL => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: Hts::isApprovedForAllCall = call(input)?;
            Op::Query(TokenQuery::IsApprovedForAll {
                token: ctx.token(c.token),
                owner: ctx.account(c.owner),
                operator: ctx.account(c.operator),
            })
        }
        sel::ALLOWANCE => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: Hts::allowanceCall = call(input)?;
            Op::Query(TokenQuery::Allowance {
                token: ctx.token(c.token),
                owner: ctx.account(c.owner),
                spender: ctx.account(c.spender),
            })
        }

        sel::GET_TOKEN_INFO => {
            Op::Query(TokenQuery::Info(ctx.token(call::<Hts::getTokenInfoCall>(input)?.token)))
        }
        sel::GET_FUNGIBLE_TOKEN_INFO => {
            let c: Hts::getFungibleTokenInfoCall = call(input)?;
            Op::Query(TokenQuery::FungibleInfo(ctx.token(c.token)))
        }
        sel::GET_NON_FUNGIBLE_TOKEN_INFO => {
            let c: Hts::getNonFungibleTokenInfoCall = call(input)?;
            Op::Query(TokenQuery::NftInfo(NftId::new(ctx.token(c.token), c.serialNumber)))
        }
        sel::GET_TOKEN_KEY => {
            let c: Hts::getTokenKeyCall = call(input)?;
            let key_type = u64::try_from(c.keyType)
                .map_err(|_| DecodeError::Overflow { field: "keyType" })?;
            let token = ctx.token(c.token);
            Op::Query(TokenQuery::Key { token, key_type })
        }
        sel::GET_TOKEN_CUSTOM_FEES => {
            let c: Hts::getTokenCustomFeesCall = call(input)?;
            Op::Query(TokenQuery::CustomFees(ctx.token(c.token)))
        }
        sel::GET_TOKEN_EXPIRY_INFO => {
            let c: Hts::getTokenExpiryInfoCall = call(input)?;
            Op::Query(TokenQuery::Expiry(ctx.token(c.token)))
        }
        sel::IS_TOKEN => {
            let c: Hts::isTokenCall = call(input)?;
            Op::Query(TokenQuery::IsToken(ctx.token(c.token)))
        }
        sel::GET_TOKEN_TYPE => {
            let c: Hts::getTokenTypeCall = call(input)?;
            Op::Query(TokenQuery::Type(ctx.token(c.token)))
        }

        _ => return Ok(None),
    };
    Ok(Some(descriptor))
}

fn dispatch_redirect(
    redirect: &Redirect,
    ctx: &DecodeContext<'_>,
) -> Result<Option<ResolvedCall>, DispatchError> {
    use OperationDescriptor as Op;

    let Some(selector) = redirect.selector() else {
        let len = redirect.nested.len() + 24;
        return Err(DecodeError::ShortRedirect { len }.into());
    };
    let token = ctx.token(redirect.token);
    let token_type = ctx.token_types.token_type(&token);
    let nested: &[u8] = &redirect.nested;
    let config = ctx.config;

    let require = |wanted: TokenType, reason: &'static str| -> Result<(), DispatchError> {
        if token_type == Some(wanted) {
            Ok(())
        } else {
            Err(DispatchError::UnsupportedForTokenType { reason })
        }
    };
    // Shared ERC-20/721 selectors are read by the token's type.
    let shared_value = |raw: alloy_primitives::U256| -> Result<TransferValue, DispatchError> {
        match token_type {
            Some(TokenType::FungibleCommon) => Ok(TransferValue::Amount(to_i64(raw, "amount")?)),
            Some(TokenType::NonFungibleUnique) => {
                Ok(TransferValue::Serial(to_i64(raw, "serialNumber")?))
            }
            None => Err(DispatchError::UnsupportedForTokenType { reason: ERC20_ONLY }),
        }
    };

    let descriptor = match selector {
        sel::ERC_NAME => Op::Query(TokenQuery::Name(token)),
        sel::ERC_SYMBOL => Op::Query(TokenQuery::Symbol(token)),
        sel::ERC_TOTAL_SUPPLY => Op::Query(TokenQuery::TotalSupply(token)),
        sel::ERC_DECIMALS => {
            require(TokenType::FungibleCommon, ERC20_ONLY)?;
            Op::Query(TokenQuery::Decimals(token))
        }
        sel::ERC_BALANCE_OF => {
            let c: IERC20Facade::balanceOfCall = call(nested)?;
            let account = ctx.account(c.account);
            Op::Query(TokenQuery::BalanceOf { token, account })
        }
        sel::ERC_TRANSFER => {
            require(TokenType::FungibleCommon, ERC20_ONLY)?;
            let c: IERC20Facade::transferCall = call(nested)?;
            Op::ErcTransfer {
                token,
                from: None,
                to: ctx.account(c.recipient),
                value: TransferValue::Amount(to_i64(c.amount, "amount")?),
            }
        }
        sel::ERC_TRANSFER_FROM => {
            let c: IERC20Facade::transferFromCall = call(nested)?;
            Op::ErcTransfer {
                token,
                from: Some(ctx.account(c.sender)),
                to: ctx.account(c.recipient),
                value: shared_value(c.amount)?,
            }
        }
        sel::ERC_ALLOWANCE => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: IERC20Facade::allowanceCall = call(nested)?;
            Op::Query(TokenQuery::Allowance {
                token,
                owner: ctx.account(c.owner),
                spender: ctx.account(c.spender),
            })
        }
        sel::ERC_APPROVE => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: IERC20Facade::approveCall = call(nested)?;
            Op::Approve {
                token,
                spender: ctx.account(c.spender),
                value: shared_value(c.amount)?,
            }
        }
        sel::ERC_OWNER_OF => {
            require(TokenType::NonFungibleUnique, ERC721_ONLY)?;
            let c: IERC721Facade::ownerOfCall = call(nested)?;
            Op::Query(TokenQuery::OwnerOf(NftId::new(token, to_i64(c.tokenId, "tokenId")?)))
        }
        sel::ERC_TOKEN_URI => {
            require(TokenType::NonFungibleUnique, ERC721_ONLY)?;
            let c: IERC721Facade::tokenURICall = call(nested)?;
            Op::Query(TokenQuery::TokenUri(NftId::new(token, to_i64(c.tokenId, "tokenId")?)))
        }
        sel::ERC_SET_APPROVAL_FOR_ALL => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: IERC721Facade::setApprovalForAllCall = call(nested)?;
            Op::SetApprovalForAll {
                token,
                operator: ctx.account(c.operator),
                approved: c.approved,
            }
        }
        sel::ERC_GET_APPROVED => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: IERC721Facade::getApprovedCall = call(nested)?;
            Op::Query(TokenQuery::GetApproved(NftId::new(token, to_i64(c.tokenId, "tokenId")?)))
        }
        sel::ERC_IS_APPROVED_FOR_ALL => {
            ctx.gate(config.allowances_enabled, "allowances")?;
            let c: IERC721Facade::isApprovedForAllCall = call(nested)?;
            Op::Query(TokenQuery::IsApprovedForAll {
                token,
                owner: ctx.account(c.owner),
                operator: ctx.account(c.operator),
            })
        }
        sel::HRC_ASSOCIATE | sel::HRC_DISSOCIATE => {
            ctx.gate(config.hrc_associate_enabled, "hrc associate")?;
            if token_type.is_none() {
                return Err(DispatchError::UnsupportedForTokenType { reason: HRC_ONLY });
            }
            let account = ctx.sender;
            if selector == sel::HRC_ASSOCIATE {
                Op::Associate { account, token }
            } else {
                Op::Dissociate { account, token }
            }
        }
        _ => {
            debug!(
                target: "hts_precompile",
                selector = %hex_selector(selector),
                %token,
                "unknown facade selector"
            );
            return Ok(None);
        }
    };

    debug!(
        target: "hts_precompile",
        selector = %hex_selector(selector),
        %token,
        explicit = redirect.explicit,
        "dispatched facade call"
    );
    Ok(Some(ResolvedCall {
        selector,
        descriptor,
        convention: CallConvention::Redirect {
            token,
            explicit: redirect.explicit,
        },
    }))
}

/// Token fields shared by every create and update generation.
#[derive(Debug)]
struct TokenParts {
    name: String,
    symbol: String,
    treasury: Address,
    memo: String,
    finite_supply: bool,
    max_supply: i64,
    freeze_default: bool,
    keys: Vec<TokenKeyArg>,
    expiry: ExpiryArg,
}

fn fungible_create(
    parts: TokenParts,
    initial_supply: i64,
    decimals: i32,
    custom_fees: Vec<CustomFee>,
    version: AbiVersion,
) -> OperationDescriptor {
    let treasury = AccountId::from_evm_address(parts.treasury);
    OperationDescriptor::Create(Box::new(CreateOp {
        token_type: TokenType::FungibleCommon,
        initial_supply,
        decimals,
        custom_fees,
        version,
        ..create_base(parts, treasury)
    }))
}

fn nft_create(
    parts: TokenParts,
    custom_fees: Vec<CustomFee>,
    version: AbiVersion,
) -> OperationDescriptor {
    let treasury = AccountId::from_evm_address(parts.treasury);
    OperationDescriptor::Create(Box::new(CreateOp {
        token_type: TokenType::NonFungibleUnique,
        custom_fees,
        version,
        ..create_base(parts, treasury)
    }))
}

fn create_base(parts: TokenParts, treasury: AccountId) -> CreateOp {
    CreateOp {
        token_type: TokenType::FungibleCommon,
        name: parts.name,
        symbol: parts.symbol,
        treasury,
        memo: parts.memo,
        supply_type: if parts.finite_supply {
            SupplyType::Finite
        } else {
            SupplyType::Infinite
        },
        max_supply: parts.max_supply,
        initial_supply: 0,
        decimals: 0,
        freeze_default: parts.freeze_default,
        keys: parts.keys,
        expiry: parts.expiry,
        custom_fees: Vec::new(),
        version: AbiVersion::V3,
    }
}

fn update_info(token: TokenId, parts: TokenParts, version: AbiVersion) -> OperationDescriptor {
    OperationDescriptor::UpdateInfo(Box::new(UpdateInfoOp {
        token,
        name: parts.name,
        symbol: parts.symbol,
        treasury: (parts.treasury != Address::ZERO)
            .then(|| AccountId::from_evm_address(parts.treasury)),
        memo: parts.memo,
        keys: parts.keys,
        expiry: parts.expiry,
        version,
    }))
}

fn single_list(
    kind: TransferKind,
    token: TokenId,
    transfers: Vec<AccountAmount>,
    nft_transfers: Vec<NftTransfer>,
) -> OperationDescriptor {
    OperationDescriptor::CryptoTransfer(TransferOp {
        kind,
        hbar_transfers: Vec::new(),
        token_transfers: vec![TokenTransferList {
            token,
            transfers,
            nft_transfers,
        }],
    })
}

impl Hts::AccountAmount {
    fn into_amount(self, ctx: &DecodeContext<'_>) -> AccountAmount {
        AccountAmount {
            account: ctx.account(self.accountID),
            amount: self.amount,
            is_approval: self.isApproval,
        }
    }
}

fn key_value(
    ctx: &DecodeContext<'_>,
    inherit: bool,
    contract: Address,
    ed25519: Bytes,
    ecdsa: Bytes,
    delegatable: Address,
) -> Result<KeyValue, DecodeError> {
    let mut kinds = Vec::with_capacity(1);
    if inherit {
        kinds.push(KeyValue::InheritAccountKey);
    }
    if contract != Address::ZERO {
        kinds.push(KeyValue::Contract(ctx.contract(contract)));
    }
    if !ed25519.is_empty() {
        if ed25519.len() != Key::ED25519_LEN {
            return Err(DecodeError::InvalidKey(format!("ed25519 key of {} bytes", ed25519.len())));
        }
        kinds.push(KeyValue::Ed25519(ed25519));
    }
    if !ecdsa.is_empty() {
        if ecdsa.len() != Key::ECDSA_SECP256K1_LEN {
            return Err(DecodeError::InvalidKey(format!("secp256k1 key of {} bytes", ecdsa.len())));
        }
        kinds.push(KeyValue::EcdsaSecp256k1(ecdsa));
    }
    if delegatable != Address::ZERO {
        kinds.push(KeyValue::DelegatableContract(ctx.contract(delegatable)));
    }
    match kinds.len() {
        0 => Ok(KeyValue::Unset),
        1 => Ok(kinds.remove(0)),
        n => Err(DecodeError::InvalidKey(format!("{n} key kinds set in one key value"))),
    }
}

fn fixed_fee(
    ctx: &DecodeContext<'_>,
    amount: i64,
    token: Address,
    use_current_token: bool,
    collector: Address,
) -> FixedFee {
    FixedFee {
        amount,
        denominating_token: ctx.optional_token(token),
        use_current_token,
        fee_collector: ctx.account(collector),
    }
}

trait IntoFee {
    fn into_fee(self, ctx: &DecodeContext<'_>) -> CustomFee;
}

// Each ABI generation has its own struct types with identical field names;
// the widths differ, so conversions go through `i64::from`.
macro_rules! token_struct_conversions {
    ($module:ident) => {
        impl $module::TokenKey {
            fn into_arg(self, ctx: &DecodeContext<'_>) -> Result<TokenKeyArg, DecodeError> {
                let key_type = u64::try_from(self.keyType)
                    .map_err(|_| DecodeError::InvalidKey("key type overflows".to_string()))?;
                let value = key_value(
                    ctx,
                    self.key.inheritAccountKey,
                    self.key.contractId,
                    self.key.ed25519,
                    self.key.ecdsaSecp256k1,
                    self.key.delegatableContractId,
                )?;
                Ok(TokenKeyArg { key_type, value })
            }
        }

        impl $module::Expiry {
            fn into_arg(self, ctx: &DecodeContext<'_>) -> ExpiryArg {
                ExpiryArg {
                    second: i64::from(self.second),
                    auto_renew_account: ctx.optional_account(self.autoRenewAccount),
                    auto_renew_period: i64::from(self.autoRenewPeriod),
                }
            }
        }

        impl $module::HederaToken {
            fn into_parts(self, ctx: &DecodeContext<'_>) -> Result<TokenParts, DecodeError> {
                Ok(TokenParts {
                    name: self.name,
                    symbol: self.symbol,
                    treasury: ctx.resolve(self.treasury),
                    memo: self.memo,
                    finite_supply: self.tokenSupplyType,
                    max_supply: i64::from(self.maxSupply),
                    freeze_default: self.freezeDefault,
                    keys: self
                        .tokenKeys
                        .into_iter()
                        .map(|key| key.into_arg(ctx))
                        .collect::<Result<_, _>>()?,
                    expiry: self.expiry.into_arg(ctx),
                })
            }
        }

        impl IntoFee for $module::FixedFee {
            fn into_fee(self, ctx: &DecodeContext<'_>) -> CustomFee {
                CustomFee::Fixed(fixed_fee(
                    ctx,
                    self.amount,
                    self.tokenId,
                    self.useCurrentTokenForPayment,
                    self.feeCollector,
                ))
            }
        }

        impl IntoFee for $module::FractionalFee {
            fn into_fee(self, ctx: &DecodeContext<'_>) -> CustomFee {
                CustomFee::Fractional(FractionalFee {
                    numerator: self.numerator,
                    denominator: self.denominator,
                    minimum_amount: self.minimumAmount,
                    maximum_amount: self.maximumAmount,
                    net_of_transfers: self.netOfTransfers,
                    fee_collector: ctx.account(self.feeCollector),
                })
            }
        }

        impl IntoFee for $module::RoyaltyFee {
            fn into_fee(self, ctx: &DecodeContext<'_>) -> CustomFee {
                let fallback = (self.amount != 0)
                    .then(|| fixed_fee(ctx, self.amount, self.tokenId, false, self.feeCollector));
                CustomFee::Royalty(RoyaltyFee {
                    numerator: self.numerator,
                    denominator: self.denominator,
                    fallback,
                    fee_collector: ctx.account(self.feeCollector),
                })
            }
        }
    };
}

token_struct_conversions!(Hts);
token_struct_conversions!(HtsV1);
token_struct_conversions!(HtsV2);

/// Concatenates two fee lists in argument order.
fn collect_fees<F: IntoFee, R: IntoFee>(
    ctx: &DecodeContext<'_>,
    first: Vec<F>,
    second: Vec<R>,
) -> Vec<CustomFee> {
    first
        .into_iter()
        .map(|fee| fee.into_fee(ctx))
        .chain(second.into_iter().map(|fee| fee.into_fee(ctx)))
        .collect()
}
