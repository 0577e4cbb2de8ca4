//! ABI encoding of call results.
//!
//! Direct token service calls return a leading `int32` response code; facade
//! calls return the bare ERC-style value. Failures carry only the status,
//! padded with zeroed fields where the success shape has them so callers can
//! decode either outcome with one signature.

use crate::{
    abi::IHederaTokenService as Hts,
    descriptor::{CallConvention, OperationDescriptor, TransferValue},
    logic::Execution,
    views::ViewValue,
};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{abi::TokenSeq, SolType, SolValue};
use hts_primitives::{
    token_key_type, AccountId, CustomFee, Expiry, FixedFee, Key, ResponseCode, SupplyType, Token,
    TokenId, TokenKeys, UniqueToken,
};

const KEY_SLOTS: [u64; 7] = [
    token_key_type::ADMIN,
    token_key_type::KYC,
    token_key_type::FREEZE,
    token_key_type::WIPE,
    token_key_type::SUPPLY,
    token_key_type::FEE_SCHEDULE,
    token_key_type::PAUSE,
];

fn status(code: ResponseCode) -> i32 {
    code.as_i32()
}

fn ok() -> i32 {
    status(ResponseCode::Success)
}

fn address_of(account: AccountId) -> Address {
    if account.is_zero() {
        Address::ZERO
    } else {
        account.to_evm_address()
    }
}

fn token_address(token: Option<TokenId>) -> Address {
    token.map_or(Address::ZERO, |id| id.to_evm_address())
}

fn unsigned(value: i64) -> U256 {
    U256::from(u64::try_from(value).unwrap_or_default())
}

fn encode<T>(value: T) -> Bytes
where
    T: SolValue,
    for<'a> <T::SolType as SolType>::Token<'a>: TokenSeq<'a>,
{
    value.abi_encode_params().into()
}

/// Encodes a successful state-changing call.
pub fn encode_execution(
    descriptor: &OperationDescriptor,
    convention: CallConvention,
    execution: &Execution,
) -> Bytes {
    let redirect = convention.is_redirect();
    match (descriptor, execution) {
        (OperationDescriptor::Mint(_), Execution::Minted(outcome)) => encode((
            ok(),
            u64::try_from(outcome.new_total_supply).unwrap_or_default(),
            outcome.serials.clone(),
        )),
        (OperationDescriptor::Burn(_), Execution::SupplyChanged { new_total_supply }) => {
            encode((ok(), u64::try_from(*new_total_supply).unwrap_or_default()))
        }
        (OperationDescriptor::Create(_), Execution::Created(token)) => {
            encode((ok(), token.to_evm_address()))
        }
        (OperationDescriptor::ErcTransfer { value, .. }, _) if redirect => match value {
            TransferValue::Amount(_) => encode((true,)),
            TransferValue::Serial(_) => Bytes::new(),
        },
        (OperationDescriptor::Approve { value, .. }, _) => match (value, redirect) {
            (TransferValue::Amount(_), true) => encode((true,)),
            (TransferValue::Amount(_), false) => encode((ok(), true)),
            (TransferValue::Serial(_), true) => Bytes::new(),
            (TransferValue::Serial(_), false) => encode((ok(),)),
        },
        (OperationDescriptor::SetApprovalForAll { .. }, _) if redirect => Bytes::new(),
        _ => encode((ok(),)),
    }
}

/// Encodes a successful query.
pub fn encode_view(convention: CallConvention, value: &ViewValue, ledger_id: &str) -> Bytes {
    let redirect = convention.is_redirect();
    match value {
        ViewValue::TokenInfo(token) => encode((ok(), token_info(token, ledger_id))),
        ViewValue::FungibleInfo(token) => encode((
            ok(),
            Hts::FungibleTokenInfo {
                tokenInfo: token_info(token, ledger_id),
                decimals: i32::try_from(token.decimals).unwrap_or(i32::MAX),
            },
        )),
        ViewValue::NftInfo(token, nft) => encode((ok(), nft_info(token, nft, ledger_id))),
        ViewValue::Key(key) => encode((ok(), key_value(key.as_ref()))),
        ViewValue::CustomFees(fees) => {
            let (fixed, fractional, royalty) = fee_lists(fees);
            encode((ok(), fixed, fractional, royalty))
        }
        ViewValue::Expiry(expiry) => encode((ok(), expiry_of(expiry))),
        ViewValue::IsToken(is_token) => encode((ok(), *is_token)),
        ViewValue::TokenType(token_type) => encode((ok(), token_type.abi_code())),
        ViewValue::Name(text) | ViewValue::Symbol(text) | ViewValue::TokenUri(text) => {
            encode((text.clone(),))
        }
        ViewValue::Decimals(decimals) => {
            encode((U256::from(u8::try_from(*decimals).unwrap_or(u8::MAX)),))
        }
        ViewValue::TotalSupply(amount) | ViewValue::Balance(amount) => encode((unsigned(*amount),)),
        ViewValue::Owner(owner) => encode((address_of(*owner),)),
        ViewValue::Allowance(amount) if redirect => encode((unsigned(*amount),)),
        ViewValue::Allowance(amount) => encode((ok(), unsigned(*amount))),
        ViewValue::Approved(spender) if redirect => encode((address_of(*spender),)),
        ViewValue::Approved(spender) => encode((ok(), address_of(*spender))),
        ViewValue::ApprovedForAll(approved) if redirect => encode((*approved,)),
        ViewValue::ApprovedForAll(approved) => encode((ok(), *approved)),
    }
}

/// Encodes a failed call carrying `code`.
pub fn encode_failure(descriptor: &OperationDescriptor, code: ResponseCode) -> Bytes {
    match descriptor {
        OperationDescriptor::Mint(_) => encode((status(code), 0u64, Vec::<i64>::new())),
        OperationDescriptor::Burn(_) => encode((status(code), 0u64)),
        OperationDescriptor::Create(_) => encode((status(code), Address::ZERO)),
        _ => encode((status(code),)),
    }
}

fn token_info(token: &Token, ledger_id: &str) -> Hts::TokenInfo {
    let (fixed, fractional, royalty) = fee_lists(&token.custom_fees);
    Hts::TokenInfo {
        token: hedera_token(token),
        totalSupply: token.total_supply,
        deleted: token.deleted,
        defaultKycStatus: token.kyc_granted_by_default,
        pauseStatus: token.paused,
        fixedFees: fixed,
        fractionalFees: fractional,
        royaltyFees: royalty,
        ledgerId: ledger_id.to_string(),
    }
}

fn nft_info(token: &Token, nft: &UniqueToken, ledger_id: &str) -> Hts::NonFungibleTokenInfo {
    let owner = if nft.owner.is_zero() {
        token.treasury
    } else {
        nft.owner
    };
    Hts::NonFungibleTokenInfo {
        tokenInfo: token_info(token, ledger_id),
        serialNumber: nft.id.serial,
        ownerId: address_of(owner),
        creationTime: nft.creation_time.seconds,
        metadata: nft.metadata.clone(),
        spenderId: nft.spender.map_or(Address::ZERO, address_of),
    }
}

fn hedera_token(token: &Token) -> Hts::HederaToken {
    Hts::HederaToken {
        name: token.name.clone(),
        symbol: token.symbol.clone(),
        treasury: address_of(token.treasury),
        memo: token.memo.clone(),
        tokenSupplyType: token.supply_type == SupplyType::Finite,
        maxSupply: token.max_supply,
        freezeDefault: token.freeze_default,
        tokenKeys: token_keys(&token.keys),
        expiry: expiry_of(&token.expiry),
    }
}

fn token_keys(keys: &TokenKeys) -> Vec<Hts::TokenKey> {
    KEY_SLOTS
        .iter()
        .filter_map(|slot| {
            keys.get(*slot).map(|key| Hts::TokenKey {
                keyType: U256::from(*slot),
                key: key_value(Some(key)),
            })
        })
        .collect()
}

/// Only single-kind keys have an ABI form; composite keys encode as all-zero.
fn key_value(key: Option<&Key>) -> Hts::KeyValue {
    let mut value = Hts::KeyValue {
        inheritAccountKey: false,
        contractId: Address::ZERO,
        ed25519: Bytes::new(),
        ecdsaSecp256k1: Bytes::new(),
        delegatableContractId: Address::ZERO,
    };
    match key {
        Some(Key::Ed25519(bytes)) => value.ed25519 = bytes.clone(),
        Some(Key::EcdsaSecp256k1(bytes)) => value.ecdsaSecp256k1 = bytes.clone(),
        Some(Key::ContractId(id)) => value.contractId = id.to_evm_address(),
        Some(Key::DelegatableContractId(id)) => value.delegatableContractId = id.to_evm_address(),
        Some(Key::KeyList(_) | Key::Threshold { .. }) | None => {}
    }
    value
}

fn expiry_of(expiry: &Expiry) -> Hts::Expiry {
    Hts::Expiry {
        second: expiry.second,
        autoRenewAccount: expiry.auto_renew_account.map_or(Address::ZERO, address_of),
        autoRenewPeriod: expiry.auto_renew_period,
    }
}

fn fixed_fee(fee: &FixedFee) -> Hts::FixedFee {
    Hts::FixedFee {
        amount: fee.amount,
        tokenId: token_address(fee.denominating_token),
        useHbarsForPayment: fee.denominating_token.is_none() && !fee.use_current_token,
        useCurrentTokenForPayment: fee.use_current_token,
        feeCollector: address_of(fee.fee_collector),
    }
}

type FeeLists = (Vec<Hts::FixedFee>, Vec<Hts::FractionalFee>, Vec<Hts::RoyaltyFee>);

fn fee_lists(fees: &[CustomFee]) -> FeeLists {
    let mut fixed = Vec::new();
    let mut fractional = Vec::new();
    let mut royalty = Vec::new();
    for fee in fees {
        match fee {
            CustomFee::Fixed(fee) => fixed.push(fixed_fee(fee)),
            CustomFee::Fractional(fee) => fractional.push(Hts::FractionalFee {
                numerator: fee.numerator,
                denominator: fee.denominator,
                minimumAmount: fee.minimum_amount,
                maximumAmount: fee.maximum_amount,
                netOfTransfers: fee.net_of_transfers,
                feeCollector: address_of(fee.fee_collector),
            }),
            CustomFee::Royalty(fee) => {
                let fallback = fee.fallback.as_ref().map(fixed_fee);
                royalty.push(Hts::RoyaltyFee {
                    numerator: fee.numerator,
                    denominator: fee.denominator,
                    amount: fallback.as_ref().map_or(0, |f| f.amount),
                    tokenId: fallback.as_ref().map_or(Address::ZERO, |f| f.tokenId),
                    useHbarsForPayment: fallback.as_ref().is_some_and(|f| f.useHbarsForPayment),
                    feeCollector: address_of(fee.fee_collector),
                });
            }
        }
    }
    (fixed, fractional, royalty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{descriptor::{AbiVersion, MintOp}, logic::MintOutcome};
    use alloy_sol_types::sol_data;
    use hts_primitives::ContractId;

    const TOKEN: TokenId = TokenId::from_num(0x482);

    fn mint() -> OperationDescriptor {
        OperationDescriptor::Mint(MintOp {
            token: TOKEN,
            amount: 0,
            metadata: vec![Bytes::from_static(b"a")],
            version: AbiVersion::V3,
        })
    }

    #[test]
    fn mint_success_carries_supply_and_serials() {
        let out = encode_execution(
            &mint(),
            CallConvention::Direct,
            &Execution::Minted(MintOutcome {
                new_total_supply: 2,
                serials: vec![1, 2],
            }),
        );
        type Out = (sol_data::Int<32>, sol_data::Uint<64>, sol_data::Array<sol_data::Int<64>>);
        let (code, supply, serials) = Out::abi_decode_params(&out).unwrap();
        assert_eq!(code, 22);
        assert_eq!(supply, 2);
        assert_eq!(serials, vec![1, 2]);
    }

    #[test]
    fn failures_pad_the_success_shape() {
        let out = encode_failure(&mint(), ResponseCode::InvalidTokenId);
        type Out = (sol_data::Int<32>, sol_data::Uint<64>, sol_data::Array<sol_data::Int<64>>);
        let (code, supply, serials) = Out::abi_decode_params(&out).unwrap();
        assert_eq!(code, ResponseCode::InvalidTokenId.as_i32());
        assert_eq!(supply, 0);
        assert!(serials.is_empty());

        let associate = OperationDescriptor::Associate {
            account: AccountId::from_num(7),
            token: TOKEN,
        };
        let out = encode_failure(&associate, ResponseCode::TokenAlreadyAssociatedToAccount);
        assert_eq!(out.len(), 32);
        assert_eq!(<sol_data::Int<32>>::abi_decode(&out).unwrap(), 194);
    }

    #[test]
    fn facade_results_drop_the_status() {
        let redirect = CallConvention::Redirect {
            token: TOKEN,
            explicit: false,
        };
        let out = encode_view(redirect, &ViewValue::Name("Gold".into()), "0x03");
        assert_eq!(<sol_data::String>::abi_decode(&out).unwrap(), "Gold");

        let out = encode_view(redirect, &ViewValue::Allowance(5), "0x03");
        let allowance = <sol_data::Uint<256>>::abi_decode(&out).unwrap();
        assert_eq!(allowance, U256::from(5));

        let out = encode_view(CallConvention::Direct, &ViewValue::Allowance(5), "0x03");
        type Direct = (sol_data::Int<32>, sol_data::Uint<256>);
        let (code, allowance) = Direct::abi_decode_params(&out).unwrap();
        assert_eq!((code, allowance), (22, U256::from(5)));

        let transfer = OperationDescriptor::ErcTransfer {
            token: TOKEN,
            from: None,
            to: AccountId::from_num(9),
            value: TransferValue::Serial(1),
        };
        assert!(encode_execution(&transfer, redirect, &Execution::Completed).is_empty());
    }

    #[test]
    fn token_info_reports_ledger_id_and_keys() {
        let token = Token {
            id: TOKEN,
            name: "Gold".into(),
            symbol: "AU".into(),
            treasury: AccountId::from_num(2),
            supply_type: SupplyType::Finite,
            max_supply: 100,
            keys: TokenKeys {
                supply: Some(Key::ContractId(ContractId::from_num(0x4d2))),
                ..Default::default()
            },
            ..Default::default()
        };
        let value = ViewValue::TokenInfo(Box::new(token));
        let out = encode_view(CallConvention::Direct, &value, "0x03");
        let (code, info) = <(sol_data::Int<32>, Hts::TokenInfo)>::abi_decode_params(&out).unwrap();
        assert_eq!(code, 22);
        assert_eq!(info.ledgerId, "0x03");
        assert!(info.token.tokenSupplyType);
        assert_eq!(info.token.tokenKeys.len(), 1);
        let supply_slot = U256::from(token_key_type::SUPPLY);
        assert_eq!(info.token.tokenKeys[0].keyType, supply_slot);
        assert_eq!(
            info.token.tokenKeys[0].key.contractId,
            ContractId::from_num(0x4d2).to_evm_address()
        );
    }
}
