//! Native transaction bodies produced for precompile calls.
//!
//! These mirror the shapes a client would submit directly, so a record tagged
//! with one of them reads the same as a record of a natively submitted
//! transaction.

use crate::{
    entities::{CustomFee, Expiry, SupplyType, TokenType},
    functionality::NativeFunction,
    ids::{AccountId, NftId, TokenId},
    keys::TokenKeys,
};
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// Signed adjustment of one account's balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAmount {
    /// Adjusted account.
    pub account: AccountId,
    /// Negative for debits, positive for credits.
    pub amount: i64,
    /// Debit is drawn against an allowance rather than the owner's signature.
    pub is_approval: bool,
}

impl AccountAmount {
    /// Builds a non-approval adjustment.
    pub const fn new(account: AccountId, amount: i64) -> Self {
        Self {
            account,
            amount,
            is_approval: false,
        }
    }
}

/// Movement of one NFT between accounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransfer {
    /// Current owner.
    pub sender: AccountId,
    /// New owner.
    pub receiver: AccountId,
    /// Serial number moved.
    pub serial: i64,
    /// Move is drawn against an allowance.
    pub is_approval: bool,
}

/// All adjustments for one token inside a crypto transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransferList {
    /// Token moved.
    pub token: TokenId,
    /// Fungible adjustments.
    pub transfers: Vec<AccountAmount>,
    /// NFT movements.
    pub nft_transfers: Vec<NftTransfer>,
}

/// Associate or dissociate body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAssociationBody {
    /// Account whose relationships change.
    pub account: AccountId,
    /// Tokens in request order.
    pub tokens: Vec<TokenId>,
}

/// Mint body. Exactly one of `amount` or `metadata` is meaningful.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMintBody {
    /// Token minted.
    pub token: TokenId,
    /// Fungible units to mint.
    pub amount: i64,
    /// One metadata entry per NFT to mint.
    pub metadata: Vec<Bytes>,
}

/// Burn body. Exactly one of `amount` or `serial_numbers` is meaningful.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBurnBody {
    /// Token burned.
    pub token: TokenId,
    /// Fungible units to burn.
    pub amount: i64,
    /// NFT serials to burn.
    pub serial_numbers: Vec<i64>,
}

/// Wipe body. Exactly one of `amount` or `serial_numbers` is meaningful.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenWipeBody {
    /// Token wiped.
    pub token: TokenId,
    /// Account wiped.
    pub account: AccountId,
    /// Fungible units to wipe.
    pub amount: i64,
    /// NFT serials to wipe.
    pub serial_numbers: Vec<i64>,
}

/// Create body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCreateBody {
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Treasury account.
    pub treasury: AccountId,
    /// Memo.
    pub memo: String,
    /// Fungibility.
    pub token_type: TokenType,
    /// Supply cap kind.
    pub supply_type: SupplyType,
    /// Supply cap.
    pub max_supply: i64,
    /// Initial supply credited to the treasury.
    pub initial_supply: i64,
    /// Decimals.
    pub decimals: i32,
    /// New relationships start frozen.
    pub freeze_default: bool,
    /// Key slots.
    pub keys: TokenKeys,
    /// Expiry settings.
    pub expiry: Expiry,
    /// Custom fees.
    pub custom_fees: Vec<CustomFee>,
}

/// Update body. `None` leaves a property unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUpdateBody {
    /// Token updated.
    pub token: TokenId,
    /// New name.
    pub name: Option<String>,
    /// New symbol.
    pub symbol: Option<String>,
    /// New treasury.
    pub treasury: Option<AccountId>,
    /// New memo.
    pub memo: Option<String>,
    /// Replacement keys; empty slots are left unchanged.
    pub keys: TokenKeys,
    /// New expiry second.
    pub expiry: Option<i64>,
    /// New auto-renew account.
    pub auto_renew_account: Option<AccountId>,
    /// New auto-renew period.
    pub auto_renew_period: Option<i64>,
}

/// Hbar allowance grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoAllowance {
    /// Granting owner.
    pub owner: AccountId,
    /// Spender.
    pub spender: AccountId,
    /// Tinybars granted.
    pub amount: i64,
}

/// Fungible allowance grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAllowance {
    /// Token.
    pub token: TokenId,
    /// Granting owner.
    pub owner: AccountId,
    /// Spender.
    pub spender: AccountId,
    /// Units granted.
    pub amount: i64,
}

/// NFT allowance grant, either per serial or for all serials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftAllowance {
    /// Token.
    pub token: TokenId,
    /// Granting owner.
    pub owner: AccountId,
    /// Spender or operator.
    pub spender: AccountId,
    /// Serials approved for `spender`.
    pub serial_numbers: Vec<i64>,
    /// Approval for all serials, when set.
    pub approved_for_all: Option<bool>,
    /// Account acting on behalf of the owner, when not the owner itself.
    pub delegating_spender: Option<AccountId>,
}

/// NFT allowance removal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftRemoveAllowance {
    /// Token.
    pub token: TokenId,
    /// Owner.
    pub owner: AccountId,
    /// Serials whose spender is cleared.
    pub serial_numbers: Vec<i64>,
}

/// Read-only query tag carried by the record of a view call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenQueryBody {
    /// Query about a token type.
    Token(TokenId),
    /// Query about one NFT.
    Nft(NftId),
}

/// Operation-specific part of a synthetic transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionBody {
    /// Associate tokens.
    TokenAssociate(TokenAssociationBody),
    /// Dissociate tokens.
    TokenDissociate(TokenAssociationBody),
    /// Mint.
    TokenMint(TokenMintBody),
    /// Burn.
    TokenBurn(TokenBurnBody),
    /// Wipe.
    TokenWipe(TokenWipeBody),
    /// Pause.
    TokenPause(TokenId),
    /// Unpause.
    TokenUnpause(TokenId),
    /// Create.
    TokenCreate(Box<TokenCreateBody>),
    /// Update.
    TokenUpdate(Box<TokenUpdateBody>),
    /// Crypto transfer.
    CryptoTransfer {
        /// Hbar adjustments.
        hbar_transfers: Vec<AccountAmount>,
        /// Token adjustments.
        token_transfers: Vec<TokenTransferList>,
    },
    /// Allowance grants.
    CryptoApproveAllowance {
        /// Hbar grants.
        crypto: Vec<CryptoAllowance>,
        /// Fungible grants.
        fungible: Vec<TokenAllowance>,
        /// NFT grants.
        nft: Vec<NftAllowance>,
    },
    /// NFT allowance removals.
    CryptoDeleteAllowance(Vec<NftRemoveAllowance>),
    /// Read-only query.
    TokenQuery(TokenQueryBody),
}

impl TransactionBody {
    /// Native function this body corresponds to.
    pub const fn function(&self) -> NativeFunction {
        match self {
            Self::TokenAssociate(_) => NativeFunction::TokenAssociateToAccount,
            Self::TokenDissociate(_) => NativeFunction::TokenDissociateFromAccount,
            Self::TokenMint(_) => NativeFunction::TokenMint,
            Self::TokenBurn(_) => NativeFunction::TokenBurn,
            Self::TokenWipe(_) => NativeFunction::TokenAccountWipe,
            Self::TokenPause(_) => NativeFunction::TokenPause,
            Self::TokenUnpause(_) => NativeFunction::TokenUnpause,
            Self::TokenCreate(_) => NativeFunction::TokenCreate,
            Self::TokenUpdate(_) => NativeFunction::TokenUpdate,
            Self::CryptoTransfer { .. } => NativeFunction::CryptoTransfer,
            Self::CryptoApproveAllowance { .. } => NativeFunction::CryptoApproveAllowance,
            Self::CryptoDeleteAllowance(_) => NativeFunction::CryptoDeleteAllowance,
            Self::TokenQuery(TokenQueryBody::Token(_)) => NativeFunction::TokenGetInfo,
            Self::TokenQuery(TokenQueryBody::Nft(_)) => NativeFunction::TokenGetNftInfo,
        }
    }
}

/// A native transaction body built for one precompile invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticTransaction {
    /// Operation-specific body.
    pub body: TransactionBody,
    /// Transaction memo; always empty for precompile calls.
    pub memo: String,
}

impl SyntheticTransaction {
    /// Wraps a body with an empty memo.
    pub const fn new(body: TransactionBody) -> Self {
        Self {
            body,
            memo: String::new(),
        }
    }

    /// Native function of the wrapped body.
    pub const fn function(&self) -> NativeFunction {
        self.body.function()
    }
}
