//! Solidity interfaces understood by the token service precompile.
//!
//! Overloads that differ only in integer widths live in separate versioned
//! interfaces so each generated call type keeps a plain name.

use alloy_sol_types::sol;

sol! {
    /// Current token service interface.
    interface IHederaTokenService {
        struct KeyValue {
            bool inheritAccountKey;
            address contractId;
            bytes ed25519;
            bytes ecdsaSecp256k1;
            address delegatableContractId;
        }

        struct TokenKey {
            uint256 keyType;
            KeyValue key;
        }

        struct Expiry {
            int64 second;
            address autoRenewAccount;
            int64 autoRenewPeriod;
        }

        struct HederaToken {
            string name;
            string symbol;
            address treasury;
            string memo;
            bool tokenSupplyType;
            int64 maxSupply;
            bool freezeDefault;
            TokenKey[] tokenKeys;
            Expiry expiry;
        }

        struct FixedFee {
            int64 amount;
            address tokenId;
            bool useHbarsForPayment;
            bool useCurrentTokenForPayment;
            address feeCollector;
        }

        struct FractionalFee {
            int64 numerator;
            int64 denominator;
            int64 minimumAmount;
            int64 maximumAmount;
            bool netOfTransfers;
            address feeCollector;
        }

        struct RoyaltyFee {
            int64 numerator;
            int64 denominator;
            int64 amount;
            address tokenId;
            bool useHbarsForPayment;
            address feeCollector;
        }

        struct AccountAmount {
            address accountID;
            int64 amount;
            bool isApproval;
        }

        struct NftTransfer {
            address senderAccountID;
            address receiverAccountID;
            int64 serialNumber;
            bool isApproval;
        }

        struct TokenTransferList {
            address token;
            AccountAmount[] transfers;
            NftTransfer[] nftTransfers;
        }

        struct TransferList {
            AccountAmount[] transfers;
        }

        struct TokenInfo {
            HederaToken token;
            int64 totalSupply;
            bool deleted;
            bool defaultKycStatus;
            bool pauseStatus;
            FixedFee[] fixedFees;
            FractionalFee[] fractionalFees;
            RoyaltyFee[] royaltyFees;
            string ledgerId;
        }

        struct FungibleTokenInfo {
            TokenInfo tokenInfo;
            int32 decimals;
        }

        struct NonFungibleTokenInfo {
            TokenInfo tokenInfo;
            int64 serialNumber;
            address ownerId;
            int64 creationTime;
            bytes metadata;
            address spenderId;
        }

        function cryptoTransfer(TransferList transferList, TokenTransferList[] tokenTransfers);
        function transferTokens(address token, address[] accountId, int64[] amount);
        function transferToken(address token, address sender, address recipient, int64 amount);
        function transferNFTs(
            address token,
            address[] sender,
            address[] receiver,
            int64[] serialNumber
        );
        function transferNFT(address token, address sender, address recipient, int64 serialNumber);
        function transferFrom(address token, address from, address to, uint256 amount);
        function transferFromNFT(address token, address from, address to, uint256 serialNumber);

        function mintToken(address token, int64 amount, bytes[] metadata);
        function burnToken(address token, int64 amount, int64[] serialNumbers);
        function wipeTokenAccount(address token, address account, int64 amount);
        function wipeTokenAccountNFT(address token, address account, int64[] serialNumbers);

        function associateToken(address account, address token);
        function associateTokens(address account, address[] tokens);
        function dissociateToken(address account, address token);
        function dissociateTokens(address account, address[] tokens);

        function pauseToken(address token);
        function unpauseToken(address token);

        function createFungibleToken(
            HederaToken token,
            int64 initialTotalSupply,
            int32 decimals
        ) payable;
        function createFungibleTokenWithCustomFees(
            HederaToken token,
            int64 initialTotalSupply,
            int32 decimals,
            FixedFee[] fixedFees,
            FractionalFee[] fractionalFees
        ) payable;
        function createNonFungibleToken(HederaToken token) payable;
        function createNonFungibleTokenWithCustomFees(
            HederaToken token,
            FixedFee[] fixedFees,
            RoyaltyFee[] royaltyFees
        ) payable;

        function updateTokenInfo(address token, HederaToken tokenInfo);
        function updateTokenKeys(address token, TokenKey[] keys);
        function updateTokenExpiryInfo(address token, Expiry expiryInfo);

        function approve(address token, address spender, uint256 amount);
        function approveNFT(address token, address approved, uint256 serialNumber);
        function setApprovalForAll(address token, address operator, bool approved);
        function getApproved(address token, uint256 serialNumber);
        function isApprovedForAll(address token, address owner, address operator);
        function allowance(address token, address owner, address spender);

        function getTokenInfo(address token);
        function getFungibleTokenInfo(address token);
        function getNonFungibleTokenInfo(address token, int64 serialNumber);
        function getTokenKey(address token, uint256 keyType);
        function getTokenCustomFees(address token);
        function getTokenExpiryInfo(address token);
        function isToken(address token);
        function getTokenType(address token);

        function redirectForToken(address token, bytes encodedFunctionSelector);
    }
}

sol! {
    /// First-generation overloads with unsigned widths.
    interface IHederaTokenServiceV1 {
        struct KeyValue {
            bool inheritAccountKey;
            address contractId;
            bytes ed25519;
            bytes ecdsaSecp256k1;
            address delegatableContractId;
        }

        struct TokenKey {
            uint256 keyType;
            KeyValue key;
        }

        struct Expiry {
            uint32 second;
            address autoRenewAccount;
            uint32 autoRenewPeriod;
        }

        struct HederaToken {
            string name;
            string symbol;
            address treasury;
            string memo;
            bool tokenSupplyType;
            uint32 maxSupply;
            bool freezeDefault;
            TokenKey[] tokenKeys;
            Expiry expiry;
        }

        struct FixedFee {
            int64 amount;
            address tokenId;
            bool useHbarsForPayment;
            bool useCurrentTokenForPayment;
            address feeCollector;
        }

        struct FractionalFee {
            int64 numerator;
            int64 denominator;
            int64 minimumAmount;
            int64 maximumAmount;
            bool netOfTransfers;
            address feeCollector;
        }

        struct RoyaltyFee {
            int64 numerator;
            int64 denominator;
            int64 amount;
            address tokenId;
            bool useHbarsForPayment;
            address feeCollector;
        }

        struct AccountAmount {
            address accountID;
            int64 amount;
        }

        struct NftTransfer {
            address senderAccountID;
            address receiverAccountID;
            int64 serialNumber;
        }

        struct TokenTransferList {
            address token;
            AccountAmount[] transfers;
            NftTransfer[] nftTransfers;
        }

        function cryptoTransfer(TokenTransferList[] tokenTransfers);
        function mintToken(address token, uint64 amount, bytes[] metadata);
        function burnToken(address token, uint64 amount, int64[] serialNumbers);
        function wipeTokenAccount(address token, address account, uint32 amount);

        function createFungibleToken(
            HederaToken token,
            uint256 initialTotalSupply,
            uint256 decimals
        ) payable;
        function createFungibleTokenWithCustomFees(
            HederaToken token,
            uint256 initialTotalSupply,
            uint256 decimals,
            FixedFee[] fixedFees,
            FractionalFee[] fractionalFees
        ) payable;
        function createNonFungibleToken(HederaToken token) payable;
        function createNonFungibleTokenWithCustomFees(
            HederaToken token,
            FixedFee[] fixedFees,
            RoyaltyFee[] royaltyFees
        ) payable;

        function updateTokenInfo(address token, HederaToken tokenInfo);
        function updateTokenExpiryInfo(address token, Expiry expiryInfo);
    }
}

sol! {
    /// Second-generation overloads: signed supply cap, unsigned expiry.
    interface IHederaTokenServiceV2 {
        struct KeyValue {
            bool inheritAccountKey;
            address contractId;
            bytes ed25519;
            bytes ecdsaSecp256k1;
            address delegatableContractId;
        }

        struct TokenKey {
            uint256 keyType;
            KeyValue key;
        }

        struct Expiry {
            uint32 second;
            address autoRenewAccount;
            uint32 autoRenewPeriod;
        }

        struct HederaToken {
            string name;
            string symbol;
            address treasury;
            string memo;
            bool tokenSupplyType;
            int64 maxSupply;
            bool freezeDefault;
            TokenKey[] tokenKeys;
            Expiry expiry;
        }

        struct FixedFee {
            int64 amount;
            address tokenId;
            bool useHbarsForPayment;
            bool useCurrentTokenForPayment;
            address feeCollector;
        }

        struct FractionalFee {
            int64 numerator;
            int64 denominator;
            int64 minimumAmount;
            int64 maximumAmount;
            bool netOfTransfers;
            address feeCollector;
        }

        struct RoyaltyFee {
            int64 numerator;
            int64 denominator;
            int64 amount;
            address tokenId;
            bool useHbarsForPayment;
            address feeCollector;
        }

        function createFungibleToken(
            HederaToken token,
            uint64 initialTotalSupply,
            uint32 decimals
        ) payable;
        function createFungibleTokenWithCustomFees(
            HederaToken token,
            uint64 initialTotalSupply,
            uint32 decimals,
            FixedFee[] fixedFees,
            FractionalFee[] fractionalFees
        ) payable;
        function createNonFungibleToken(HederaToken token) payable;
        function createNonFungibleTokenWithCustomFees(
            HederaToken token,
            FixedFee[] fixedFees,
            RoyaltyFee[] royaltyFees
        ) payable;

        function updateTokenInfo(address token, HederaToken tokenInfo);
    }
}

sol! {
    /// Fungible facade reachable through a token redirect.
    interface IERC20Facade {
        function name();
        function symbol();
        function decimals();
        function totalSupply();
        function balanceOf(address account);
        function transfer(address recipient, uint256 amount);
        function transferFrom(address sender, address recipient, uint256 amount);
        function allowance(address owner, address spender);
        function approve(address spender, uint256 amount);
    }
}

sol! {
    /// Non-fungible facade reachable through a token redirect.
    interface IERC721Facade {
        function ownerOf(uint256 tokenId);
        function tokenURI(uint256 tokenId);
        function setApprovalForAll(address operator, bool approved);
        function getApproved(uint256 tokenId);
        function isApprovedForAll(address owner, address operator);
    }
}

sol! {
    /// Association facade reachable through a token redirect.
    interface IHRCFacade {
        function associate();
        function dissociate();
    }
}
