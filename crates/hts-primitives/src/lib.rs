//! # Native ledger primitives
//!
//! Plain data types shared by the token service precompile and its host:
//! entity ids and their long-zero address encoding, response codes, keys,
//! the rows of the four ledger tables, synthetic transaction bodies and
//! record shapes.
//!
//! Nothing here performs I/O or holds state; every type is `serde`-friendly
//! so hosts can persist or stream it as they see fit.

pub mod entities;
pub mod functionality;
pub mod ids;
pub mod keys;
pub mod record;
pub mod response_code;
pub mod txn;

pub use entities::{
    Account, CustomFee, Expiry, FixedFee, FractionalFee, RoyaltyFee, SupplyType, Token,
    TokenRelationship, TokenType, UniqueToken,
};
pub use functionality::{NativeFunction, SubType};
pub use ids::{is_long_zero, AccountId, ContractId, NftId, Timestamp, TokenId};
pub use keys::{token_key_type, Key, KeyKind, TokenKeys};
pub use record::{ContractCallResult, TokenAssociation, TransactionReceipt, TransactionRecord};
pub use response_code::ResponseCode;
pub use txn::{
    AccountAmount, CryptoAllowance, NftAllowance, NftRemoveAllowance, NftTransfer,
    SyntheticTransaction, TokenAllowance, TokenAssociationBody, TokenBurnBody, TokenCreateBody,
    TokenMintBody, TokenQueryBody, TokenTransferList, TokenUpdateBody, TokenWipeBody,
    TransactionBody,
};
