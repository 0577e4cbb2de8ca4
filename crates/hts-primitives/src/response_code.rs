//! Status codes shared with the native transaction-processing path.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! response_codes {
    ($($(#[$doc:meta])* $variant:ident = $value:literal => $name:literal,)+) => {
        /// Native response code. Numeric values match the network's public
        /// status enumeration so encoded failure payloads stay comparable.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum ResponseCode {
            $(
                $(#[$doc])*
                #[serde(rename = $name)]
                $variant = $value,
            )+
        }

        impl ResponseCode {
            /// Canonical upper-snake-case name, also used as a revert reason.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Looks up a code by its numeric value.
            pub const fn from_i32(value: i32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

response_codes! {
    /// Pre-check passed.
    Ok = 0 => "OK",
    /// Generic malformed transaction.
    InvalidTransaction = 1 => "INVALID_TRANSACTION",
    /// A required signature is missing or does not verify.
    InvalidSignature = 7 => "INVALID_SIGNATURE",
    /// The operation is disabled on this network.
    NotSupported = 13 => "NOT_SUPPORTED",
    /// The referenced account does not exist.
    InvalidAccountId = 15 => "INVALID_ACCOUNT_ID",
    /// The transaction reached consensus and succeeded.
    Success = 22 => "SUCCESS",
    /// Unexpected internal failure.
    FailInvalid = 23 => "FAIL_INVALID",
    /// The account cannot cover a debit.
    InsufficientAccountBalance = 28 => "INSUFFICIENT_ACCOUNT_BALANCE",
    /// Not enough gas was supplied for the call.
    InsufficientGas = 30 => "INSUFFICIENT_GAS",
    /// The contract call reverted.
    ContractRevertExecuted = 33 => "CONTRACT_REVERT_EXECUTED",
    /// An account amount list is malformed.
    InvalidAccountAmounts = 48 => "INVALID_ACCOUNT_AMOUNTS",
    /// The body combines fields that may not be used together.
    InvalidTransactionBody = 50 => "INVALID_TRANSACTION_BODY",
    /// The account was deleted.
    AccountDeleted = 72 => "ACCOUNT_DELETED",
    /// The same account appears twice in one transfer list.
    AccountRepeatedInAccountAmounts = 74 => "ACCOUNT_REPEATED_IN_ACCOUNT_AMOUNTS",
    /// The account is frozen for the token.
    AccountFrozenForToken = 165 => "ACCOUNT_FROZEN_FOR_TOKEN",
    /// The referenced token does not exist.
    InvalidTokenId = 167 => "INVALID_TOKEN_ID",
    /// Decimals are out of range.
    InvalidTokenDecimals = 168 => "INVALID_TOKEN_DECIMALS",
    /// Initial supply is out of range.
    InvalidTokenInitialSupply = 169 => "INVALID_TOKEN_INITIAL_SUPPLY",
    /// Treasury account is missing or invalid.
    InvalidTreasuryAccountForToken = 170 => "INVALID_TREASURY_ACCOUNT_FOR_TOKEN",
    /// Token transfers for one token do not net to zero.
    TransfersNotZeroSumForToken = 173 => "TRANSFERS_NOT_ZERO_SUM_FOR_TOKEN",
    /// Token symbol is empty.
    MissingTokenSymbol = 174 => "MISSING_TOKEN_SYMBOL",
    /// Token symbol exceeds the configured limit.
    TokenSymbolTooLong = 175 => "TOKEN_SYMBOL_TOO_LONG",
    /// The account has not been granted KYC for the token.
    AccountKycNotGrantedForToken = 176 => "ACCOUNT_KYC_NOT_GRANTED_FOR_TOKEN",
    /// The account balance cannot cover the debit.
    InsufficientTokenBalance = 178 => "INSUFFICIENT_TOKEN_BALANCE",
    /// The token was deleted.
    TokenWasDeleted = 179 => "TOKEN_WAS_DELETED",
    /// The token has no supply key.
    TokenHasNoSupplyKey = 180 => "TOKEN_HAS_NO_SUPPLY_KEY",
    /// The token has no wipe key.
    TokenHasNoWipeKey = 181 => "TOKEN_HAS_NO_WIPE_KEY",
    /// Mint amount is negative or otherwise invalid.
    InvalidTokenMintAmount = 182 => "INVALID_TOKEN_MINT_AMOUNT",
    /// Burn amount is negative or otherwise invalid.
    InvalidTokenBurnAmount = 183 => "INVALID_TOKEN_BURN_AMOUNT",
    /// The account is not associated with the token.
    TokenNotAssociatedToAccount = 184 => "TOKEN_NOT_ASSOCIATED_TO_ACCOUNT",
    /// The treasury's holding cannot be wiped.
    CannotWipeTokenTreasuryAccount = 185 => "CANNOT_WIPE_TOKEN_TREASURY_ACCOUNT",
    /// Token name is empty.
    MissingTokenName = 190 => "MISSING_TOKEN_NAME",
    /// Token name exceeds the configured limit.
    TokenNameTooLong = 191 => "TOKEN_NAME_TOO_LONG",
    /// Wipe amount is negative or otherwise invalid.
    InvalidWipingAmount = 192 => "INVALID_WIPING_AMOUNT",
    /// The token has no admin key and cannot be changed.
    TokenIsImmutable = 193 => "TOKEN_IS_IMMUTABLE",
    /// The account is already associated with the token.
    TokenAlreadyAssociatedToAccount = 194 => "TOKEN_ALREADY_ASSOCIATED_TO_ACCOUNT",
    /// Dissociation requires a zero balance.
    TransactionRequiresZeroTokenBalances = 195 => "TRANSACTION_REQUIRES_ZERO_TOKEN_BALANCES",
    /// The account is the token's treasury.
    AccountIsTreasury = 196 => "ACCOUNT_IS_TREASURY",
    /// A token id appears more than once in the token list.
    TokenIdRepeatedInTokenList = 197 => "TOKEN_ID_REPEATED_IN_TOKEN_LIST",
    /// A token transfer body carries no transfers.
    EmptyTokenTransferBody = 199 => "EMPTY_TOKEN_TRANSFER_BODY",
    /// A token transfer list carries no account amounts.
    EmptyTokenTransferAccountAmounts = 200 => "EMPTY_TOKEN_TRANSFER_ACCOUNT_AMOUNTS",
    /// The serial number does not exist for the token.
    InvalidTokenNftSerialNumber = 226 => "INVALID_TOKEN_NFT_SERIAL_NUMBER",
    /// The NFT id is malformed.
    InvalidNftId = 227 => "INVALID_NFT_ID",
    /// NFT metadata exceeds the size limit.
    MetadataTooLong = 228 => "METADATA_TOO_LONG",
    /// The sender neither owns the NFT nor operates for its owner.
    SenderDoesNotOwnNftSerialNo = 238 => "SENDER_DOES_NOT_OWN_NFT_SERIAL_NO",
    /// The token has no pause key.
    TokenHasNoPauseKey = 263 => "TOKEN_HAS_NO_PAUSE_KEY",
    /// The token is paused.
    TokenIsPaused = 265 => "TOKEN_IS_PAUSED",
    /// A precompile call lacked a full-prefix signature for a required key.
    InvalidFullPrefixSignatureForPrecompile = 290 => "INVALID_FULL_PREFIX_SIGNATURE_FOR_PRECOMPILE",
    /// The spender has no allowance from the owner.
    SpenderDoesNotHaveAllowance = 292 => "SPENDER_DOES_NOT_HAVE_ALLOWANCE",
    /// The debit exceeds the granted allowance.
    AmountExceedsAllowance = 293 => "AMOUNT_EXCEEDS_ALLOWANCE",
}

impl ResponseCode {
    /// Numeric value of this code.
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns `true` for the two codes that denote a successful outcome.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::Success)
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_values_line_up() {
        assert_eq!(ResponseCode::Success.as_i32(), 22);
        assert_eq!(ResponseCode::InvalidTokenId.name(), "INVALID_TOKEN_ID");
        assert_eq!(
            ResponseCode::from_i32(197),
            Some(ResponseCode::TokenIdRepeatedInTokenList)
        );
        assert_eq!(ResponseCode::from_i32(-1), None);
    }

    #[test]
    fn serializes_as_canonical_name() {
        let json = serde_json::to_string(&ResponseCode::InvalidSignature).unwrap();
        assert_eq!(json, "\"INVALID_SIGNATURE\"");
        let back: ResponseCode = serde_json::from_str("\"FAIL_INVALID\"").unwrap();
        assert_eq!(back, ResponseCode::FailInvalid);
    }

    #[test]
    fn only_ok_and_success_are_success() {
        assert!(ResponseCode::Ok.is_success());
        assert!(ResponseCode::Success.is_success());
        assert!(!ResponseCode::FailInvalid.is_success());
    }
}
