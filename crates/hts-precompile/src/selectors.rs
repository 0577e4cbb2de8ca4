//! Function selectors, named after the calls they identify.
//!
//! Every selector is derived from the generated call type, so a typo in an
//! interface shows up as a mismatch in the tests below rather than as a
//! silently unreachable operation.

use crate::abi::{
    IERC20Facade, IERC721Facade, IHRCFacade, IHederaTokenService as Hts,
    IHederaTokenServiceV1 as HtsV1, IHederaTokenServiceV2 as HtsV2,
};
use alloy_sol_types::SolCall;

/// 4-byte function selector.
pub type Selector = [u8; 4];

macro_rules! selectors {
    ($($(#[$doc:meta])* $name:ident = $call:ty;)+) => {
        $(
            $(#[$doc])*
            pub const $name: Selector = <$call as SolCall>::SELECTOR;
        )+
    };
}

selectors! {
    /// `cryptoTransfer` with token lists only.
    CRYPTO_TRANSFER = HtsV1::cryptoTransferCall;
    /// `cryptoTransfer` with hbar adjustments and approvals.
    CRYPTO_TRANSFER_V2 = Hts::cryptoTransferCall;
    TRANSFER_TOKENS = Hts::transferTokensCall;
    TRANSFER_TOKEN = Hts::transferTokenCall;
    TRANSFER_NFTS = Hts::transferNFTsCall;
    TRANSFER_NFT = Hts::transferNFTCall;
    TRANSFER_FROM = Hts::transferFromCall;
    TRANSFER_FROM_NFT = Hts::transferFromNFTCall;

    MINT_TOKEN = HtsV1::mintTokenCall;
    MINT_TOKEN_V2 = Hts::mintTokenCall;
    BURN_TOKEN = HtsV1::burnTokenCall;
    BURN_TOKEN_V2 = Hts::burnTokenCall;
    WIPE_TOKEN_ACCOUNT = HtsV1::wipeTokenAccountCall;
    WIPE_TOKEN_ACCOUNT_V2 = Hts::wipeTokenAccountCall;
    WIPE_TOKEN_ACCOUNT_NFT = Hts::wipeTokenAccountNFTCall;

    ASSOCIATE_TOKEN = Hts::associateTokenCall;
    ASSOCIATE_TOKENS = Hts::associateTokensCall;
    DISSOCIATE_TOKEN = Hts::dissociateTokenCall;
    DISSOCIATE_TOKENS = Hts::dissociateTokensCall;

    PAUSE_TOKEN = Hts::pauseTokenCall;
    UNPAUSE_TOKEN = Hts::unpauseTokenCall;

    CREATE_FUNGIBLE_TOKEN = HtsV1::createFungibleTokenCall;
    CREATE_FUNGIBLE_TOKEN_V2 = HtsV2::createFungibleTokenCall;
    CREATE_FUNGIBLE_TOKEN_V3 = Hts::createFungibleTokenCall;
    CREATE_FUNGIBLE_TOKEN_WITH_FEES = HtsV1::createFungibleTokenWithCustomFeesCall;
    CREATE_FUNGIBLE_TOKEN_WITH_FEES_V2 = HtsV2::createFungibleTokenWithCustomFeesCall;
    CREATE_FUNGIBLE_TOKEN_WITH_FEES_V3 = Hts::createFungibleTokenWithCustomFeesCall;
    CREATE_NON_FUNGIBLE_TOKEN = HtsV1::createNonFungibleTokenCall;
    CREATE_NON_FUNGIBLE_TOKEN_V2 = HtsV2::createNonFungibleTokenCall;
    CREATE_NON_FUNGIBLE_TOKEN_V3 = Hts::createNonFungibleTokenCall;
    CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES = HtsV1::createNonFungibleTokenWithCustomFeesCall;
    CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V2 = HtsV2::createNonFungibleTokenWithCustomFeesCall;
    CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V3 = Hts::createNonFungibleTokenWithCustomFeesCall;

    UPDATE_TOKEN_INFO = HtsV1::updateTokenInfoCall;
    UPDATE_TOKEN_INFO_V2 = HtsV2::updateTokenInfoCall;
    UPDATE_TOKEN_INFO_V3 = Hts::updateTokenInfoCall;
    UPDATE_TOKEN_KEYS = Hts::updateTokenKeysCall;
    UPDATE_TOKEN_EXPIRY_INFO = HtsV1::updateTokenExpiryInfoCall;
    UPDATE_TOKEN_EXPIRY_INFO_V2 = Hts::updateTokenExpiryInfoCall;

    APPROVE = Hts::approveCall;
    APPROVE_NFT = Hts::approveNFTCall;
    SET_APPROVAL_FOR_ALL = Hts::setApprovalForAllCall;
    GET_APPROVED = Hts::getApprovedCall;
    IS_APPROVED_FOR_ALL = Hts::isApprovedForAllCall;
    ALLOWANCE = Hts::allowanceCall;

    GET_TOKEN_INFO = Hts::getTokenInfoCall;
    GET_FUNGIBLE_TOKEN_INFO = Hts::getFungibleTokenInfoCall;
    GET_NON_FUNGIBLE_TOKEN_INFO = Hts::getNonFungibleTokenInfoCall;
    GET_TOKEN_KEY = Hts::getTokenKeyCall;
    GET_TOKEN_CUSTOM_FEES = Hts::getTokenCustomFeesCall;
    GET_TOKEN_EXPIRY_INFO = Hts::getTokenExpiryInfoCall;
    IS_TOKEN = Hts::isTokenCall;
    GET_TOKEN_TYPE = Hts::getTokenTypeCall;

    /// Wrapper carrying a token address and a nested facade call.
    REDIRECT_FOR_TOKEN = Hts::redirectForTokenCall;

    ERC_NAME = IERC20Facade::nameCall;
    ERC_SYMBOL = IERC20Facade::symbolCall;
    ERC_DECIMALS = IERC20Facade::decimalsCall;
    ERC_TOTAL_SUPPLY = IERC20Facade::totalSupplyCall;
    ERC_BALANCE_OF = IERC20Facade::balanceOfCall;
    ERC_TRANSFER = IERC20Facade::transferCall;
    /// Shared by the fungible and non-fungible facades.
    ERC_TRANSFER_FROM = IERC20Facade::transferFromCall;
    ERC_ALLOWANCE = IERC20Facade::allowanceCall;
    /// Shared by the fungible and non-fungible facades.
    ERC_APPROVE = IERC20Facade::approveCall;
    ERC_OWNER_OF = IERC721Facade::ownerOfCall;
    ERC_TOKEN_URI = IERC721Facade::tokenURICall;
    ERC_SET_APPROVAL_FOR_ALL = IERC721Facade::setApprovalForAllCall;
    ERC_GET_APPROVED = IERC721Facade::getApprovedCall;
    ERC_IS_APPROVED_FOR_ALL = IERC721Facade::isApprovedForAllCall;
    HRC_ASSOCIATE = IHRCFacade::associateCall;
    HRC_DISSOCIATE = IHRCFacade::dissociateCall;
}

/// Selectors that accept attached value.
pub const PAYABLE: [Selector; 12] = [
    CREATE_FUNGIBLE_TOKEN,
    CREATE_FUNGIBLE_TOKEN_V2,
    CREATE_FUNGIBLE_TOKEN_V3,
    CREATE_FUNGIBLE_TOKEN_WITH_FEES,
    CREATE_FUNGIBLE_TOKEN_WITH_FEES_V2,
    CREATE_FUNGIBLE_TOKEN_WITH_FEES_V3,
    CREATE_NON_FUNGIBLE_TOKEN,
    CREATE_NON_FUNGIBLE_TOKEN_V2,
    CREATE_NON_FUNGIBLE_TOKEN_V3,
    CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES,
    CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V2,
    CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V3,
];

/// Direct selectors that never change state.
const DIRECT_VIEWS: [Selector; 11] = [
    GET_APPROVED,
    IS_APPROVED_FOR_ALL,
    ALLOWANCE,
    GET_TOKEN_INFO,
    GET_FUNGIBLE_TOKEN_INFO,
    GET_NON_FUNGIBLE_TOKEN_INFO,
    GET_TOKEN_KEY,
    GET_TOKEN_CUSTOM_FEES,
    GET_TOKEN_EXPIRY_INFO,
    IS_TOKEN,
    GET_TOKEN_TYPE,
];

/// Facade selectors that never change state.
const FACADE_VIEWS: [Selector; 10] = [
    ERC_NAME,
    ERC_SYMBOL,
    ERC_DECIMALS,
    ERC_TOTAL_SUPPLY,
    ERC_BALANCE_OF,
    ERC_ALLOWANCE,
    ERC_OWNER_OF,
    ERC_TOKEN_URI,
    ERC_GET_APPROVED,
    ERC_IS_APPROVED_FOR_ALL,
];

/// Returns `true` if the selector accepts attached value.
pub fn is_payable(selector: Selector) -> bool {
    PAYABLE.contains(&selector)
}

/// Returns `true` if the direct selector names a read-only operation.
pub fn is_direct_view(selector: Selector) -> bool {
    DIRECT_VIEWS.contains(&selector)
}

/// Returns `true` if the facade selector names a read-only operation.
pub fn is_facade_view(selector: Selector) -> bool {
    FACADE_VIEWS.contains(&selector)
}

/// Leading selector of a payload, if it has one.
pub fn selector_of(input: &[u8]) -> Option<Selector> {
    input.get(..4).and_then(|bytes| bytes.try_into().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex4(selector: Selector) -> String {
        hex::encode(selector)
    }

    #[test]
    fn versioned_selectors_match_published_ids() {
        let expected = [
            (CRYPTO_TRANSFER, "189a554c"),
            (CRYPTO_TRANSFER_V2, "0e71804f"),
            (MINT_TOKEN, "278e0b88"),
            (MINT_TOKEN_V2, "e0f4059a"),
            (BURN_TOKEN, "acb9cff9"),
            (BURN_TOKEN_V2, "d6910d06"),
            (WIPE_TOKEN_ACCOUNT, "9790686d"),
            (WIPE_TOKEN_ACCOUNT_V2, "efef57f9"),
            (WIPE_TOKEN_ACCOUNT_NFT, "f7f38e26"),
            (CREATE_FUNGIBLE_TOKEN, "7812a04b"),
            (CREATE_FUNGIBLE_TOKEN_V2, "c23baeb6"),
            (CREATE_FUNGIBLE_TOKEN_V3, "0fb65bf3"),
            (CREATE_FUNGIBLE_TOKEN_WITH_FEES, "444d1412"),
            (CREATE_FUNGIBLE_TOKEN_WITH_FEES_V3, "2af0c59a"),
            (CREATE_NON_FUNGIBLE_TOKEN, "9dc711e0"),
            (CREATE_NON_FUNGIBLE_TOKEN_V2, "9c89bb35"),
            (CREATE_NON_FUNGIBLE_TOKEN_V3, "ea83f293"),
            (CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES, "c1dbfff0"),
            (CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V3, "abb54eb5"),
            (UPDATE_TOKEN_INFO, "2cccc36f"),
            (UPDATE_TOKEN_INFO_V2, "18370d34"),
            (UPDATE_TOKEN_INFO_V3, "7d305cfa"),
            (UPDATE_TOKEN_EXPIRY_INFO, "593d6e82"),
            (UPDATE_TOKEN_EXPIRY_INFO_V2, "d27be6cd"),
            (UPDATE_TOKEN_KEYS, "6fc3cbaf"),
        ];
        for (selector, id) in expected {
            assert_eq!(hex4(selector), id);
        }
    }

    #[test]
    fn unversioned_selectors_match_published_ids() {
        let expected = [
            (ASSOCIATE_TOKEN, "49146bde"),
            (ASSOCIATE_TOKENS, "2e63879b"),
            (DISSOCIATE_TOKEN, "099794e8"),
            (DISSOCIATE_TOKENS, "78b63918"),
            (PAUSE_TOKEN, "7c41ad2c"),
            (UNPAUSE_TOKEN, "3b3bff0f"),
            (TRANSFER_TOKENS, "82bba493"),
            (TRANSFER_TOKEN, "eca36917"),
            (TRANSFER_NFTS, "2c4ba191"),
            (TRANSFER_NFT, "5cfc9011"),
            (TRANSFER_FROM, "15dacbea"),
            (TRANSFER_FROM_NFT, "9b23d3d9"),
            (APPROVE, "e1f21c67"),
            (APPROVE_NFT, "7336aaf0"),
            (SET_APPROVAL_FOR_ALL, "367605ca"),
            (GET_APPROVED, "098f2366"),
            (IS_APPROVED_FOR_ALL, "f49f40db"),
            (ALLOWANCE, "927da105"),
            (GET_TOKEN_INFO, "1f69565f"),
            (GET_FUNGIBLE_TOKEN_INFO, "3f28a19b"),
            (GET_NON_FUNGIBLE_TOKEN_INFO, "287e1da8"),
            (GET_TOKEN_KEY, "3c4dd32e"),
            (GET_TOKEN_CUSTOM_FEES, "ae7611a0"),
            (GET_TOKEN_EXPIRY_INFO, "d614cdb8"),
            (IS_TOKEN, "19f37361"),
            (GET_TOKEN_TYPE, "93272baf"),
            (REDIRECT_FOR_TOKEN, "618dc65e"),
        ];
        for (selector, id) in expected {
            assert_eq!(hex4(selector), id);
        }
    }

    #[test]
    fn facade_selectors_match_erc_ids() {
        let expected = [
            (ERC_NAME, "06fdde03"),
            (ERC_SYMBOL, "95d89b41"),
            (ERC_DECIMALS, "313ce567"),
            (ERC_TOTAL_SUPPLY, "18160ddd"),
            (ERC_BALANCE_OF, "70a08231"),
            (ERC_OWNER_OF, "6352211e"),
            (ERC_TOKEN_URI, "c87b56dd"),
            (ERC_TRANSFER, "a9059cbb"),
            (ERC_TRANSFER_FROM, "23b872dd"),
            (ERC_ALLOWANCE, "dd62ed3e"),
            (ERC_APPROVE, "095ea7b3"),
            (ERC_SET_APPROVAL_FOR_ALL, "a22cb465"),
            (ERC_GET_APPROVED, "081812fc"),
            (ERC_IS_APPROVED_FOR_ALL, "e985e9c5"),
            (HRC_ASSOCIATE, "0a754de6"),
            (HRC_DISSOCIATE, "5c9217e0"),
        ];
        for (selector, id) in expected {
            assert_eq!(hex4(selector), id);
        }
    }

    #[test]
    fn only_create_family_is_payable() {
        assert!(is_payable(CREATE_FUNGIBLE_TOKEN_V3));
        assert!(!is_payable(MINT_TOKEN));
        assert!(!is_payable(ERC_TRANSFER));
    }

    #[test]
    fn selector_requires_four_bytes() {
        assert_eq!(selector_of(&[0x49, 0x14, 0x6b]), None);
        assert_eq!(
            selector_of(&[0x49, 0x14, 0x6b, 0xde, 0x00]),
            Some(ASSOCIATE_TOKEN)
        );
    }
}
