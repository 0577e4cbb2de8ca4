//! Ledger entity rows for the four tables the precompile works against.

use crate::{
    ids::{AccountId, NftId, Timestamp, TokenId},
    keys::{Key, TokenKeys},
};
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Fungibility of a token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Interchangeable units with decimals.
    #[default]
    FungibleCommon,
    /// Unique serial-numbered instances.
    NonFungibleUnique,
}

impl TokenType {
    /// Value reported by the `getTokenType` query.
    pub const fn abi_code(self) -> i32 {
        match self {
            Self::FungibleCommon => 0,
            Self::NonFungibleUnique => 1,
        }
    }
}

/// Whether total supply is capped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplyType {
    /// No cap.
    #[default]
    Infinite,
    /// Capped at `max_supply`.
    Finite,
}

/// Expiry and auto-renew settings of a token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiry {
    /// Expiration time in seconds; zero means unset.
    pub second: i64,
    /// Account charged for auto-renewal.
    pub auto_renew_account: Option<AccountId>,
    /// Auto-renew period in seconds.
    pub auto_renew_period: i64,
}

/// Flat fee charged per transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFee {
    /// Amount in the denominating unit.
    pub amount: i64,
    /// Denominating token; `None` with `use_current_token == false` means hbar.
    pub denominating_token: Option<TokenId>,
    /// Charge in units of the token being transferred.
    pub use_current_token: bool,
    /// Fee collector.
    pub fee_collector: AccountId,
}

/// Fraction of each fungible transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractionalFee {
    /// Fraction numerator.
    pub numerator: i64,
    /// Fraction denominator.
    pub denominator: i64,
    /// Lower bound on the assessed amount.
    pub minimum_amount: i64,
    /// Upper bound on the assessed amount; zero means none.
    pub maximum_amount: i64,
    /// Charge the receiver instead of the sender.
    pub net_of_transfers: bool,
    /// Fee collector.
    pub fee_collector: AccountId,
}

/// Fraction of the value exchanged for an NFT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltyFee {
    /// Fraction numerator.
    pub numerator: i64,
    /// Fraction denominator.
    pub denominator: i64,
    /// Fallback fee charged when no value is exchanged.
    pub fallback: Option<FixedFee>,
    /// Fee collector.
    pub fee_collector: AccountId,
}

/// One custom fee entry on a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomFee {
    /// Flat fee.
    Fixed(FixedFee),
    /// Fractional fee (fungible tokens only).
    Fractional(FractionalFee),
    /// Royalty fee (non-fungible tokens only).
    Royalty(RoyaltyFee),
}

/// Row of the tokens table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token id.
    pub id: TokenId,
    /// Fungibility.
    pub token_type: TokenType,
    /// Supply cap kind.
    pub supply_type: SupplyType,
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Free-form memo.
    pub memo: String,
    /// Treasury account.
    pub treasury: AccountId,
    /// Decimals for fungible tokens.
    pub decimals: u32,
    /// Current total supply.
    pub total_supply: i64,
    /// Supply cap when `supply_type` is finite.
    pub max_supply: i64,
    /// New relationships start frozen.
    pub freeze_default: bool,
    /// New relationships start with KYC granted.
    pub kyc_granted_by_default: bool,
    /// Key slots.
    pub keys: TokenKeys,
    /// Expiry settings.
    pub expiry: Expiry,
    /// Custom fee schedule.
    pub custom_fees: Vec<CustomFee>,
    /// Whether the token is paused.
    pub paused: bool,
    /// Whether the token is deleted.
    pub deleted: bool,
    /// Last serial number handed out by mint.
    pub last_used_serial: i64,
}

/// Row of the accounts table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    pub id: AccountId,
    /// Controlling key; `None` for keyless accounts.
    pub key: Option<Key>,
    /// Hbar balance in tinybars.
    pub balance: i64,
    /// Whether the account was deleted.
    pub deleted: bool,
    /// Whether the account is a contract.
    pub smart_contract: bool,
    /// EVM alias, when the account was created through one.
    pub alias: Option<alloy_primitives::Address>,
    /// Hbar allowances keyed by spender.
    pub crypto_allowances: BTreeMap<AccountId, i64>,
    /// Fungible allowances keyed by `(token, spender)`.
    pub fungible_allowances: BTreeMap<(TokenId, AccountId), i64>,
    /// Operators approved for all serials of a token.
    pub approve_for_all: BTreeSet<(TokenId, AccountId)>,
}

/// Row of the token-relationships table, keyed by `(account, token)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRelationship {
    /// Units held (serial count for NFTs).
    pub balance: i64,
    /// Whether the account is frozen for this token.
    pub frozen: bool,
    /// Whether KYC is granted.
    pub kyc_granted: bool,
    /// Whether the association was created automatically.
    pub automatic_association: bool,
}

/// Row of the unique-token-instances table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueToken {
    /// Id of this instance.
    pub id: NftId,
    /// Current owner.
    pub owner: AccountId,
    /// Approved spender, if any.
    pub spender: Option<AccountId>,
    /// Immutable metadata set at mint.
    pub metadata: Bytes,
    /// Mint time.
    pub creation_time: Timestamp,
}
