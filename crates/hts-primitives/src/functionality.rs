//! Native function and fee sub-type enumerations used to key fee schedules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Native ledger operation a synthetic transaction stands in for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NativeFunction {
    /// Associate tokens with an account.
    TokenAssociateToAccount,
    /// Dissociate tokens from an account.
    TokenDissociateFromAccount,
    /// Mint fungible units or NFTs.
    TokenMint,
    /// Burn fungible units or NFTs from the treasury.
    TokenBurn,
    /// Wipe units or NFTs from a non-treasury account.
    TokenAccountWipe,
    /// Pause all operations on a token.
    TokenPause,
    /// Lift a token pause.
    TokenUnpause,
    /// Create a new token.
    TokenCreate,
    /// Update token properties, keys or expiry.
    TokenUpdate,
    /// Transfer hbar, fungible units or NFTs.
    CryptoTransfer,
    /// Grant hbar, fungible or NFT allowances.
    CryptoApproveAllowance,
    /// Remove NFT allowances.
    CryptoDeleteAllowance,
    /// Token information query.
    TokenGetInfo,
    /// NFT information query.
    TokenGetNftInfo,
    /// Plain EVM contract call, used for gas-price estimates.
    ContractCall,
}

impl NativeFunction {
    /// Returns `true` for query functions answered without a state change.
    pub const fn is_query(self) -> bool {
        matches!(self, Self::TokenGetInfo | Self::TokenGetNftInfo)
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Fee schedule sub-type distinguishing prices for the same function.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SubType {
    /// Price applying when no finer sub-type is relevant.
    #[default]
    Default,
    /// Fungible token without custom fees.
    TokenFungibleCommon,
    /// Non-fungible token without custom fees.
    TokenNonFungibleUnique,
    /// Fungible token carrying custom fees.
    TokenFungibleCommonWithCustomFees,
    /// Non-fungible token carrying custom fees.
    TokenNonFungibleUniqueWithCustomFees,
}
