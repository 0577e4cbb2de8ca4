//! Decoded native operations.
//!
//! An [`OperationDescriptor`] is the closed set of things a precompile call can
//! ask for. It is built once by the decoder and never mutated; how the result
//! is returned to the caller is tracked separately by [`CallConvention`] so a
//! facade call and its direct equivalent decode to equal descriptors.

use crate::selectors::Selector;
use alloy_primitives::Bytes;
use hts_primitives::{
    AccountAmount, AccountId, ContractId, CustomFee, NativeFunction, NftId, SupplyType,
    TokenId, TokenTransferList, TokenType,
};

/// ABI generation an operation was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbiVersion {
    /// Unsigned-width overloads.
    V1,
    /// Signed supply cap, unsigned expiry.
    V2,
    /// Fully signed widths.
    V3,
}

/// One key as supplied in a `KeyValue` ABI struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyValue {
    /// Use the calling account's own key.
    InheritAccountKey,
    /// Contract id key.
    Contract(ContractId),
    /// Ed25519 public key.
    Ed25519(Bytes),
    /// Compressed secp256k1 public key.
    EcdsaSecp256k1(Bytes),
    /// Delegatable contract id key.
    DelegatableContract(ContractId),
    /// No key was set.
    Unset,
}

/// A key assigned to one or more token key slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenKeyArg {
    /// Bit mask of `token_key_type` slots.
    pub key_type: u64,
    /// Key value.
    pub value: KeyValue,
}

/// Expiry settings as supplied in call arguments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpiryArg {
    /// Expiration second; zero leaves it unset.
    pub second: i64,
    /// Auto-renew account, if any.
    pub auto_renew_account: Option<AccountId>,
    /// Auto-renew period in seconds.
    pub auto_renew_period: i64,
}

/// Token creation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateOp {
    /// Fungibility.
    pub token_type: TokenType,
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Treasury account.
    pub treasury: AccountId,
    /// Memo.
    pub memo: String,
    /// Supply cap kind.
    pub supply_type: SupplyType,
    /// Supply cap.
    pub max_supply: i64,
    /// Units credited to the treasury; zero for NFTs.
    pub initial_supply: i64,
    /// Decimals; zero for NFTs.
    pub decimals: i32,
    /// New relationships start frozen.
    pub freeze_default: bool,
    /// Key assignments.
    pub keys: Vec<TokenKeyArg>,
    /// Expiry settings.
    pub expiry: ExpiryArg,
    /// Custom fees.
    pub custom_fees: Vec<CustomFee>,
    /// ABI generation.
    pub version: AbiVersion,
}

/// Token info update request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateInfoOp {
    /// Token updated.
    pub token: TokenId,
    /// New name; empty leaves it unchanged.
    pub name: String,
    /// New symbol; empty leaves it unchanged.
    pub symbol: String,
    /// New treasury; `None` leaves it unchanged.
    pub treasury: Option<AccountId>,
    /// New memo; empty leaves it unchanged.
    pub memo: String,
    /// Key replacements.
    pub keys: Vec<TokenKeyArg>,
    /// Expiry settings.
    pub expiry: ExpiryArg,
    /// ABI generation.
    pub version: AbiVersion,
}

/// Mint request; `amount` for fungible tokens, `metadata` for NFTs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintOp {
    /// Token minted.
    pub token: TokenId,
    /// Fungible units.
    pub amount: i64,
    /// One entry per NFT.
    pub metadata: Vec<Bytes>,
    /// ABI generation.
    pub version: AbiVersion,
}

/// Burn request; `amount` for fungible tokens, `serials` for NFTs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnOp {
    /// Token burned.
    pub token: TokenId,
    /// Fungible units.
    pub amount: i64,
    /// NFT serials.
    pub serials: Vec<i64>,
    /// ABI generation.
    pub version: AbiVersion,
}

/// Wipe request; `amount` for fungible tokens, `serials` for NFTs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WipeOp {
    /// Token wiped.
    pub token: TokenId,
    /// Account wiped.
    pub account: AccountId,
    /// Fungible units.
    pub amount: i64,
    /// NFT serials.
    pub serials: Vec<i64>,
    /// ABI generation.
    pub version: AbiVersion,
}

/// Which transfer entry point produced a [`TransferOp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferKind {
    /// `cryptoTransfer` with token lists only.
    CryptoTransfer,
    /// `cryptoTransfer` with hbar adjustments.
    CryptoTransferV2,
    /// `transferTokens`.
    TransferTokens,
    /// `transferToken`.
    TransferToken,
    /// `transferNFTs`.
    TransferNfts,
    /// `transferNFT`.
    TransferNft,
}

/// A batch of hbar and token movements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOp {
    /// Entry point.
    pub kind: TransferKind,
    /// Hbar adjustments.
    pub hbar_transfers: Vec<AccountAmount>,
    /// Token adjustments in input order.
    pub token_transfers: Vec<TokenTransferList>,
}

/// Amount or serial moved by an ERC-style call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferValue {
    /// Fungible units.
    Amount(i64),
    /// NFT serial.
    Serial(i64),
}

/// Read-only token queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenQuery {
    /// Full token info.
    Info(TokenId),
    /// Fungible token info.
    FungibleInfo(TokenId),
    /// NFT info.
    NftInfo(NftId),
    /// One key slot.
    Key {
        /// Token queried.
        token: TokenId,
        /// Single-bit slot selector.
        key_type: u64,
    },
    /// Custom fee schedule.
    CustomFees(TokenId),
    /// Expiry settings.
    Expiry(TokenId),
    /// Whether the address is a token.
    IsToken(TokenId),
    /// Fungibility.
    Type(TokenId),
    /// Name.
    Name(TokenId),
    /// Symbol.
    Symbol(TokenId),
    /// Decimals.
    Decimals(TokenId),
    /// Total supply.
    TotalSupply(TokenId),
    /// Balance of an account.
    BalanceOf {
        /// Token queried.
        token: TokenId,
        /// Holder.
        account: AccountId,
    },
    /// Owner of one NFT.
    OwnerOf(NftId),
    /// Metadata of one NFT, as a string.
    TokenUri(NftId),
    /// Fungible allowance.
    Allowance {
        /// Token queried.
        token: TokenId,
        /// Granting owner.
        owner: AccountId,
        /// Spender.
        spender: AccountId,
    },
    /// Spender approved for one NFT.
    GetApproved(NftId),
    /// Whether an operator is approved for all serials.
    IsApprovedForAll {
        /// Token queried.
        token: TokenId,
        /// Owner.
        owner: AccountId,
        /// Operator.
        operator: AccountId,
    },
}

impl TokenQuery {
    /// Token the query targets.
    pub const fn token(&self) -> TokenId {
        match self {
            Self::Info(token)
            | Self::FungibleInfo(token)
            | Self::CustomFees(token)
            | Self::Expiry(token)
            | Self::IsToken(token)
            | Self::Type(token)
            | Self::Name(token)
            | Self::Symbol(token)
            | Self::Decimals(token)
            | Self::TotalSupply(token)
            | Self::Key { token, .. }
            | Self::BalanceOf { token, .. }
            | Self::Allowance { token, .. }
            | Self::IsApprovedForAll { token, .. } => *token,
            Self::NftInfo(nft)
            | Self::OwnerOf(nft)
            | Self::TokenUri(nft)
            | Self::GetApproved(nft) => nft.token,
        }
    }

    /// NFT the query targets, for per-serial queries.
    pub const fn nft(&self) -> Option<NftId> {
        match self {
            Self::NftInfo(nft)
            | Self::OwnerOf(nft)
            | Self::TokenUri(nft)
            | Self::GetApproved(nft) => Some(*nft),
            _ => None,
        }
    }
}

/// A fully decoded native operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationDescriptor {
    /// Associate one token.
    Associate {
        /// Account associated.
        account: AccountId,
        /// Token associated.
        token: TokenId,
    },
    /// Associate several tokens, in order.
    MultiAssociate {
        /// Account associated.
        account: AccountId,
        /// Tokens in input order; duplicates preserved.
        tokens: Vec<TokenId>,
    },
    /// Dissociate one token.
    Dissociate {
        /// Account dissociated.
        account: AccountId,
        /// Token dissociated.
        token: TokenId,
    },
    /// Dissociate several tokens, in order.
    MultiDissociate {
        /// Account dissociated.
        account: AccountId,
        /// Tokens in input order; duplicates preserved.
        tokens: Vec<TokenId>,
    },
    /// Mint.
    Mint(MintOp),
    /// Burn.
    Burn(BurnOp),
    /// Wipe.
    Wipe(WipeOp),
    /// Pause.
    Pause(TokenId),
    /// Unpause.
    Unpause(TokenId),
    /// Create.
    Create(Box<CreateOp>),
    /// Update name, symbol, treasury, memo, keys and expiry.
    UpdateInfo(Box<UpdateInfoOp>),
    /// Update keys only.
    UpdateKeys {
        /// Token updated.
        token: TokenId,
        /// Key replacements.
        keys: Vec<TokenKeyArg>,
    },
    /// Update expiry only.
    UpdateExpiry {
        /// Token updated.
        token: TokenId,
        /// New expiry.
        expiry: ExpiryArg,
        /// ABI generation.
        version: AbiVersion,
    },
    /// Batch transfer.
    CryptoTransfer(TransferOp),
    /// ERC-style transfer or transferFrom.
    ErcTransfer {
        /// Token moved.
        token: TokenId,
        /// Owner debited; `None` debits the caller.
        from: Option<AccountId>,
        /// Receiver.
        to: AccountId,
        /// Units or serial.
        value: TransferValue,
    },
    /// Grant a fungible allowance or approve one NFT.
    Approve {
        /// Token.
        token: TokenId,
        /// Spender; the zero id clears an NFT approval.
        spender: AccountId,
        /// Units or serial.
        value: TransferValue,
    },
    /// Approve or revoke an operator for all serials.
    SetApprovalForAll {
        /// Token.
        token: TokenId,
        /// Operator.
        operator: AccountId,
        /// Grant or revoke.
        approved: bool,
    },
    /// Read-only query.
    Query(TokenQuery),
}

impl OperationDescriptor {
    /// Native function used for pricing and records.
    pub const fn function(&self) -> NativeFunction {
        match self {
            Self::Associate { .. } | Self::MultiAssociate { .. } => {
                NativeFunction::TokenAssociateToAccount
            }
            Self::Dissociate { .. } | Self::MultiDissociate { .. } => {
                NativeFunction::TokenDissociateFromAccount
            }
            Self::Mint(_) => NativeFunction::TokenMint,
            Self::Burn(_) => NativeFunction::TokenBurn,
            Self::Wipe(_) => NativeFunction::TokenAccountWipe,
            Self::Pause(_) => NativeFunction::TokenPause,
            Self::Unpause(_) => NativeFunction::TokenUnpause,
            Self::Create(_) => NativeFunction::TokenCreate,
            Self::UpdateInfo(_) | Self::UpdateKeys { .. } | Self::UpdateExpiry { .. } => {
                NativeFunction::TokenUpdate
            }
            Self::CryptoTransfer(_) | Self::ErcTransfer { .. } => NativeFunction::CryptoTransfer,
            Self::Approve { spender, value: TransferValue::Serial(_), .. } if spender.is_zero() => {
                NativeFunction::CryptoDeleteAllowance
            }
            Self::Approve { .. } | Self::SetApprovalForAll { .. } => {
                NativeFunction::CryptoApproveAllowance
            }
            Self::Query(query) => match query.nft() {
                Some(_) => NativeFunction::TokenGetNftInfo,
                None => NativeFunction::TokenGetInfo,
            },
        }
    }

    /// Returns `true` for read-only operations.
    pub const fn is_view(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

/// How the caller reached the operation, which decides the output encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallConvention {
    /// Direct call to a token service function.
    Direct,
    /// ERC or HRC facade call through `redirectForToken`.
    Redirect {
        /// Token the facade call targets.
        token: TokenId,
        /// Whether the envelope was ABI-encoded rather than packed.
        explicit: bool,
    },
}

impl CallConvention {
    /// Returns `true` for facade calls.
    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

/// Result of dispatching one payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Selector that picked the operation; the nested one for facade calls.
    pub selector: Selector,
    /// Decoded operation.
    pub descriptor: OperationDescriptor,
    /// Output convention.
    pub convention: CallConvention,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nft_approval_to_zero_spender_removes_allowance() {
        let token = TokenId::from_num(0x482);
        let clear = OperationDescriptor::Approve {
            token,
            spender: AccountId::default(),
            value: TransferValue::Serial(1),
        };
        assert_eq!(clear.function(), NativeFunction::CryptoDeleteAllowance);

        let grant = OperationDescriptor::Approve {
            token,
            spender: AccountId::default(),
            value: TransferValue::Amount(0),
        };
        assert_eq!(grant.function(), NativeFunction::CryptoApproveAllowance);
    }

    #[test]
    fn per_serial_queries_price_as_nft_info() {
        let nft = NftId::new(TokenId::from_num(0xc), 1);
        assert_eq!(
            OperationDescriptor::Query(TokenQuery::OwnerOf(nft)).function(),
            NativeFunction::TokenGetNftInfo
        );
        assert_eq!(
            OperationDescriptor::Query(TokenQuery::Name(nft.token)).function(),
            NativeFunction::TokenGetInfo
        );
        assert!(OperationDescriptor::Query(TokenQuery::IsToken(nft.token)).is_view());
    }
}
