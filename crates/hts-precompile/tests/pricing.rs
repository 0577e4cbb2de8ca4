//! Gas charged for settled calls.

mod common;

use alloy_sol_types::SolCall;
use common::*;
use hts_precompile::{abi::IHederaTokenService as Hts, pricing::CanonicalPriceTable};
use hts_primitives::{AccountId, NativeFunction, ResponseCode, SubType, TokenId};

fn associate(account: AccountId, token: TokenId) -> Vec<u8> {
    Hts::associateTokenCall {
        account: account.to_evm_address(),
        token: token.to_evm_address(),
    }
    .abi_encode()
}

fn associate_minimum(prices: &CanonicalPriceTable, sub_type: SubType) {
    // 720_000_000 tinycents at 1 hbar per 12 cents is 60_000_000 tinybars.
    let function = NativeFunction::TokenAssociateToAccount;
    prices.set(function, sub_type, 720_000_000);
}

#[test]
fn fee_total_sets_gas_when_no_minimum_is_listed() {
    let mut harness = Harness::new();
    let (result, _) = harness.run(&associate(SENDER, OTHER));
    assert_eq!(result.response_code, ResponseCode::Success);
    assert_eq!(result.gas_requirement, EXPECTED_GAS);
}

#[test]
fn view_calls_are_priced_from_the_query_estimate() {
    let mut harness = Harness::new();
    let input = Hts::isTokenCall {
        token: FUNGIBLE.to_evm_address(),
    }
    .abi_encode();
    let (result, _) = harness.run(&input);
    assert_eq!(result.gas_requirement, EXPECTED_GAS);
}

#[test]
fn canonical_minimum_dominates_a_cheaper_fee() {
    let mut harness = Harness::new();
    associate_minimum(harness.precompile.prices(), SubType::Default);

    let (result, _) = harness.run(&associate(SENDER, OTHER));
    assert_eq!(result.response_code, ResponseCode::Success);
    assert_eq!(result.gas_requirement, 7_200);
}

#[test]
fn minimum_for_another_sub_type_is_ignored() {
    let mut harness = Harness::new();
    associate_minimum(harness.precompile.prices(), SubType::TokenNonFungibleUnique);
    let (result, _) = harness.run(&associate(SENDER, OTHER));
    assert_eq!(result.gas_requirement, EXPECTED_GAS);
}

#[test]
fn reloaded_prices_apply_to_later_calls() {
    let mut harness = Harness::new();
    let refresher = harness.precompile.prices().clone();

    refresher
        .reload_json_str(r#"{"TokenAssociateToAccount": {"Default": 720000000}}"#)
        .unwrap();
    let (first, _) = harness.run(&associate(SENDER, OTHER));
    assert_eq!(first.gas_requirement, 7_200);

    refresher.reload_json_str("{}").unwrap();
    harness.signatures = Signatures(vec![alice_key()]);
    let (second, _) = harness.run(&associate(ALICE, FUNGIBLE));
    assert_eq!(second.response_code, ResponseCode::Success);
    assert_eq!(second.gas_requirement, EXPECTED_GAS);
}

#[test]
fn price_table_rejects_unknown_names() {
    let parse = CanonicalPriceTable::from_json_str;
    assert!(parse(r#"{"TokenMint": {"TokenFungibleCommon": 100}}"#).is_ok());
    assert!(parse(r#"{"TokenTeleport": {"Default": 1}}"#).is_err());
    assert!(parse(r#"{"TokenMint": {"Rare": 1}}"#).is_err());
    assert!(parse("[]").is_err());
}

#[test]
fn failed_reload_keeps_previous_prices() {
    let mut harness = Harness::new();
    let prices = harness.precompile.prices();
    associate_minimum(prices, SubType::Default);
    assert!(prices.reload_json_str("not json").is_err());

    let (result, _) = harness.run(&associate(SENDER, OTHER));
    assert_eq!(result.gas_requirement, 7_200);
}
