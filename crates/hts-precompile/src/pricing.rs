//! Fee and gas computation for precompile calls.
//!
//! A call is charged the larger of two prices: what the fee calculator would
//! bill for the synthetic transaction if it were submitted natively, and the
//! canonical minimum for the operation. The tinybar price is turned into gas
//! at the current gas price with a 20% markup.

use eyre::WrapErr;
use hts_primitives::{
    AccountId, NativeFunction, SubType, SyntheticTransaction, Timestamp, TokenType, TransactionBody,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::{collections::HashMap, sync::Arc};

/// Fee components in tinybars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeObject {
    /// Node fee.
    pub node_fee: u64,
    /// Network fee.
    pub network_fee: u64,
    /// Service fee.
    pub service_fee: u64,
}

impl FeeObject {
    /// Sum of all components.
    pub const fn total(&self) -> u64 {
        self.node_fee
            .saturating_add(self.network_fee)
            .saturating_add(self.service_fee)
    }
}

/// Conversion rate between hbar and US cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeRate {
    /// Hbar side of the rate.
    pub hbar_equiv: u32,
    /// Cent side of the rate.
    pub cent_equiv: u32,
}

impl ExchangeRate {
    /// Converts a tinycent amount to tinybars, rounding down.
    pub fn tinycents_to_tinybars(&self, tinycents: u64) -> u64 {
        let cents = u128::from(self.cent_equiv.max(1));
        let tinybars = u128::from(tinycents) * u128::from(self.hbar_equiv) / cents;
        u64::try_from(tinybars).unwrap_or(u64::MAX)
    }
}

/// Computes native fees for synthetic transactions.
pub trait FeeCalculator {
    /// Full fee for `txn` paid by `payer`.
    fn compute_fee(
        &self,
        txn: &SyntheticTransaction,
        payer: AccountId,
        now: Timestamp,
    ) -> FeeObject;

    /// Estimated fee for a query of `function`.
    fn estimate_payment(&self, function: NativeFunction, now: Timestamp) -> FeeObject;

    /// Current gas price for `function`, in tinybars.
    fn estimated_gas_price_in_tinybars(&self, function: NativeFunction, now: Timestamp) -> u64;
}

/// Source of the active exchange rate.
pub trait ExchangeRates {
    /// Rate in effect at `now`.
    fn rate_at(&self, now: Timestamp) -> ExchangeRate;
}

/// Canonical minimum prices, in tinycents.
pub trait CanonicalPrices {
    /// Price of `function` at `sub_type`; zero when unlisted.
    fn price_in_tinycents(&self, function: NativeFunction, sub_type: SubType) -> u64;
}

type PriceMap = HashMap<(NativeFunction, SubType), u64>;

/// Shared canonical price table.
///
/// Clones share the same table, so a refresher holding one clone can swap in
/// new prices while calls read through another.
#[derive(Clone, Debug, Default)]
pub struct CanonicalPriceTable {
    prices: Arc<RwLock<PriceMap>>,
}

impl CanonicalPriceTable {
    /// Builds a table from explicit entries.
    pub fn from_entries(
        entries: impl IntoIterator<Item = ((NativeFunction, SubType), u64)>,
    ) -> Self {
        let prices = entries.into_iter().collect();
        Self {
            prices: Arc::new(RwLock::new(prices)),
        }
    }

    /// Parses a table shaped as `{"TokenMint": {"TokenFungibleCommon": 100}}`.
    pub fn from_json_str(json: &str) -> eyre::Result<Self> {
        Ok(Self::from_entries(parse_prices(json)?))
    }

    /// Replaces every price with those in `json`.
    pub fn reload_json_str(&self, json: &str) -> eyre::Result<()> {
        let prices = parse_prices(json)?;
        *self.prices.write() = prices;
        Ok(())
    }

    /// Sets a single price.
    pub fn set(&self, function: NativeFunction, sub_type: SubType, tinycents: u64) {
        self.prices.write().insert((function, sub_type), tinycents);
    }
}

fn parse_prices(json: &str) -> eyre::Result<PriceMap> {
    let schedule: HashMap<String, HashMap<String, u64>> =
        serde_json::from_str(json).wrap_err("invalid canonical price table")?;
    let mut prices = PriceMap::new();
    for (function, entries) in schedule {
        let function: NativeFunction = parse_name(&function)?;
        for (sub_type, price) in entries {
            prices.insert((function, parse_name(&sub_type)?), price);
        }
    }
    Ok(prices)
}

fn parse_name<T: DeserializeOwned>(name: &str) -> eyre::Result<T> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .wrap_err_with(|| format!("unknown price table entry {name}"))
}

impl CanonicalPrices for CanonicalPriceTable {
    fn price_in_tinycents(&self, function: NativeFunction, sub_type: SubType) -> u64 {
        self.prices
            .read()
            .get(&(function, sub_type))
            .copied()
            .unwrap_or_default()
    }
}

/// Price of one call and the gas it requires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriceQuote {
    /// Node fee in tinybars.
    pub node_fee: u64,
    /// Network fee in tinybars.
    pub network_fee: u64,
    /// Service fee in tinybars.
    pub service_fee: u64,
    /// Canonical minimum in tinybars.
    pub minimum_tinybars: u64,
    /// Gas price in tinybars.
    pub gas_price: u64,
    /// Gas required.
    pub gas: u64,
}

impl PriceQuote {
    fn new(fee: FeeObject, minimum_tinybars: u64, gas_price: u64) -> Self {
        Self {
            node_fee: fee.node_fee,
            network_fee: fee.network_fee,
            service_fee: fee.service_fee,
            minimum_tinybars,
            gas_price,
            gas: gas_for(minimum_tinybars.max(fee.total()), gas_price),
        }
    }
}

/// Gas needed to pay `tinybars` at `gas_price`, marked up by 20%.
pub const fn gas_for(tinybars: u64, gas_price: u64) -> u64 {
    let gas_price = if gas_price == 0 { 1 } else { gas_price };
    (tinybars / gas_price).saturating_mul(6) / 5
}

/// Fee sub-type a body is priced at.
pub fn sub_type_of(txn: &SyntheticTransaction) -> SubType {
    match &txn.body {
        TransactionBody::TokenMint(body) if !body.metadata.is_empty() => {
            SubType::TokenNonFungibleUnique
        }
        TransactionBody::TokenBurn(body) if !body.serial_numbers.is_empty() => {
            SubType::TokenNonFungibleUnique
        }
        TransactionBody::TokenWipe(body) if !body.serial_numbers.is_empty() => {
            SubType::TokenNonFungibleUnique
        }
        TransactionBody::TokenMint(_)
        | TransactionBody::TokenBurn(_)
        | TransactionBody::TokenWipe(_) => SubType::TokenFungibleCommon,
        TransactionBody::TokenCreate(body) => match (body.token_type, body.custom_fees.is_empty()) {
            (TokenType::FungibleCommon, true) => SubType::TokenFungibleCommon,
            (TokenType::FungibleCommon, false) => SubType::TokenFungibleCommonWithCustomFees,
            (TokenType::NonFungibleUnique, true) => SubType::TokenNonFungibleUnique,
            (TokenType::NonFungibleUnique, false) => SubType::TokenNonFungibleUniqueWithCustomFees,
        },
        _ => SubType::Default,
    }
}

/// Prices calls against the fee calculator, exchange rate and price table.
pub struct PricingEngine<'a> {
    calculator: &'a dyn FeeCalculator,
    rates: &'a dyn ExchangeRates,
    prices: &'a dyn CanonicalPrices,
}

impl std::fmt::Debug for PricingEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricingEngine").finish_non_exhaustive()
    }
}

impl<'a> PricingEngine<'a> {
    /// Wraps the three pricing collaborators.
    pub fn new(
        calculator: &'a dyn FeeCalculator,
        rates: &'a dyn ExchangeRates,
        prices: &'a dyn CanonicalPrices,
    ) -> Self {
        Self {
            calculator,
            rates,
            prices,
        }
    }

    fn gas_price(&self, now: Timestamp) -> u64 {
        self.calculator
            .estimated_gas_price_in_tinybars(NativeFunction::ContractCall, now)
    }

    /// Quotes a state-changing call.
    pub fn quote(
        &self,
        txn: &SyntheticTransaction,
        payer: AccountId,
        now: Timestamp,
    ) -> PriceQuote {
        let fee = self.calculator.compute_fee(txn, payer, now);
        PriceQuote::new(fee, self.minimum_tinybars(txn, now), self.gas_price(now))
    }

    /// Quotes a view call from the query fee estimate.
    pub fn view_quote(&self, function: NativeFunction, now: Timestamp) -> PriceQuote {
        let fee = self.calculator.estimate_payment(function, now);
        PriceQuote::new(fee, 0, self.gas_price(now))
    }

    /// Canonical minimum price of `txn`, in tinybars.
    pub fn minimum_tinybars(&self, txn: &SyntheticTransaction, now: Timestamp) -> u64 {
        let function = txn.function();
        let tinycents = match &txn.body {
            TransactionBody::CryptoTransfer { hbar_transfers, token_transfers } => {
                let price = |sub_type| self.prices.price_in_tinycents(function, sub_type);
                let fungible = token_transfers
                    .iter()
                    .map(|list| list.transfers.len() as u64)
                    .sum::<u64>();
                let nfts = token_transfers
                    .iter()
                    .map(|list| list.nft_transfers.len() as u64)
                    .sum::<u64>();
                let hbar = hbar_transfers.len() as u64;
                (price(SubType::TokenFungibleCommon) / 2)
                    .saturating_mul(fungible)
                    .saturating_add(price(SubType::TokenNonFungibleUnique).saturating_mul(nfts))
                    .saturating_add((price(SubType::Default) / 2).saturating_mul(hbar))
            }
            _ => self.prices.price_in_tinycents(function, sub_type_of(txn)),
        };
        self.rates.rate_at(now).tinycents_to_tinybars(tinycents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hts_primitives::{AccountAmount, TokenAssociationBody, TokenId, TokenTransferList};

    struct Fixed(FeeObject);

    impl FeeCalculator for Fixed {
        fn compute_fee(
            &self,
            _txn: &SyntheticTransaction,
            _payer: AccountId,
            _now: Timestamp,
        ) -> FeeObject {
            self.0
        }
        fn estimate_payment(&self, _function: NativeFunction, _now: Timestamp) -> FeeObject {
            self.0
        }
        fn estimated_gas_price_in_tinybars(
            &self,
            _function: NativeFunction,
            _now: Timestamp,
        ) -> u64 {
            10_000
        }
    }

    struct OneToOne;

    impl ExchangeRates for OneToOne {
        fn rate_at(&self, _now: Timestamp) -> ExchangeRate {
            ExchangeRate {
                hbar_equiv: 1,
                cent_equiv: 1,
            }
        }
    }

    fn associate() -> SyntheticTransaction {
        SyntheticTransaction::new(TransactionBody::TokenAssociate(TokenAssociationBody {
            account: AccountId::from_num(0x482),
            tokens: vec![TokenId::from_num(0x480)],
        }))
    }

    const FEE: FeeObject = FeeObject {
        node_fee: 300_000,
        network_fee: 400_000,
        service_fee: 5_000_000,
    };

    #[test]
    fn gas_is_total_over_price_with_markup() {
        assert_eq!(gas_for(5_700_000, 10_000), 684);
        assert_eq!(gas_for(10, 0), 12);
    }

    #[test]
    fn computed_fee_drives_gas_when_above_minimum() {
        let (calculator, prices) = (Fixed(FEE), CanonicalPriceTable::default());
        let engine = PricingEngine::new(&calculator, &OneToOne, &prices);
        let now = Timestamp::from_seconds(1);
        let quote = engine.quote(&associate(), AccountId::from_num(1), now);
        assert_eq!(quote.gas, 684);
        assert_eq!(quote.minimum_tinybars, 0);
    }

    #[test]
    fn canonical_minimum_dominates_when_larger() {
        let prices = CanonicalPriceTable::from_entries([(
            (NativeFunction::TokenAssociateToAccount, SubType::Default),
            12_000_000,
        )]);
        let calculator = Fixed(FEE);
        let engine = PricingEngine::new(&calculator, &OneToOne, &prices);
        let now = Timestamp::from_seconds(1);
        let quote = engine.quote(&associate(), AccountId::from_num(1), now);
        assert_eq!(quote.minimum_tinybars, 12_000_000);
        assert_eq!(quote.gas, 12_000_000 / 10_000 * 6 / 5);
    }

    #[test]
    fn transfer_minimum_counts_adjustments() {
        let prices = CanonicalPriceTable::from_entries([
            ((NativeFunction::CryptoTransfer, SubType::Default), 100),
            ((NativeFunction::CryptoTransfer, SubType::TokenFungibleCommon), 200),
            ((NativeFunction::CryptoTransfer, SubType::TokenNonFungibleUnique), 400),
        ]);
        let calculator = Fixed(FeeObject::default());
        let engine = PricingEngine::new(&calculator, &OneToOne, &prices);
        let txn = SyntheticTransaction::new(TransactionBody::CryptoTransfer {
            hbar_transfers: vec![
                AccountAmount::new(AccountId::from_num(1), -1),
                AccountAmount::new(AccountId::from_num(2), 1),
            ],
            token_transfers: vec![TokenTransferList {
                token: TokenId::from_num(0x482),
                transfers: vec![
                    AccountAmount::new(AccountId::from_num(1), -1),
                    AccountAmount::new(AccountId::from_num(2), 1),
                ],
                nft_transfers: Vec::new(),
            }],
        });
        let minimum = engine.minimum_tinybars(&txn, Timestamp::default());
        assert_eq!(minimum, 2 * 50 + 2 * 100);
    }

    #[test]
    fn exchange_rate_converts_with_wide_intermediates() {
        let rate = ExchangeRate {
            hbar_equiv: 30_000,
            cent_equiv: 12,
        };
        assert_eq!(rate.tinycents_to_tinybars(u64::MAX / 2), u64::MAX);
        assert_eq!(rate.tinycents_to_tinybars(12), 30_000);
    }

    #[test]
    fn reload_replaces_prices() {
        let json = r#"{"TokenMint": {"TokenFungibleCommon": 5}}"#;
        let table = CanonicalPriceTable::from_json_str(json).unwrap();
        let shared = table.clone();
        let mint = |prices: &CanonicalPriceTable| {
            prices.price_in_tinycents(NativeFunction::TokenMint, SubType::TokenFungibleCommon)
        };
        assert_eq!(mint(&shared), 5);
        table
            .reload_json_str(r#"{"TokenMint": {"TokenFungibleCommon": 9}}"#)
            .unwrap();
        assert_eq!(mint(&shared), 9);
        assert!(CanonicalPriceTable::from_json_str("[]").is_err());
    }
}
