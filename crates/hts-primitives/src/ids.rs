//! Native entity identifiers and their 20-byte EVM address layout.
//!
//! A long-zero address packs `shard.realm.num` as big-endian integers:
//!
//! | Bytes    | Field |
//! |----------|-------|
//! | `0..4`   | shard |
//! | `4..12`  | realm |
//! | `12..20` | num   |

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns `true` when `address` encodes a shard-0, realm-0 entity directly
/// instead of being an EVM alias.
pub fn is_long_zero(address: &Address) -> bool {
    address.as_slice()[..12].iter().all(|byte| *byte == 0)
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
            Deserialize,
        )]
        pub struct $name {
            /// Shard number.
            pub shard: u32,
            /// Realm number.
            pub realm: u64,
            /// Entity number within the realm.
            pub num: u64,
        }

        impl $name {
            /// Builds an id from its three components.
            pub const fn new(shard: u32, realm: u64, num: u64) -> Self {
                Self { shard, realm, num }
            }

            /// Builds a `0.0.num` id.
            pub const fn from_num(num: u64) -> Self {
                Self::new(0, 0, num)
            }

            /// Returns `true` for the `0.0.0` sentinel.
            pub const fn is_zero(&self) -> bool {
                self.shard == 0 && self.realm == 0 && self.num == 0
            }

            /// Decodes an id from its long-zero EVM address.
            pub fn from_evm_address(address: Address) -> Self {
                let bytes = address.as_slice();
                let mut shard = [0u8; 4];
                let mut realm = [0u8; 8];
                let mut num = [0u8; 8];
                shard.copy_from_slice(&bytes[..4]);
                realm.copy_from_slice(&bytes[4..12]);
                num.copy_from_slice(&bytes[12..20]);
                Self::new(
                    u32::from_be_bytes(shard),
                    u64::from_be_bytes(realm),
                    u64::from_be_bytes(num),
                )
            }

            /// Encodes this id as a long-zero EVM address.
            pub fn to_evm_address(&self) -> Address {
                let mut bytes = [0u8; 20];
                bytes[..4].copy_from_slice(&self.shard.to_be_bytes());
                bytes[4..12].copy_from_slice(&self.realm.to_be_bytes());
                bytes[12..].copy_from_slice(&self.num.to_be_bytes());
                Address::from(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
            }
        }

        impl From<Address> for $name {
            fn from(address: Address) -> Self {
                Self::from_evm_address(address)
            }
        }

        impl From<$name> for Address {
            fn from(id: $name) -> Self {
                id.to_evm_address()
            }
        }
    };
}

entity_id! {
    /// Identifier of a crypto account (contracts are accounts too).
    AccountId
}

entity_id! {
    /// Identifier of a token type.
    TokenId
}

entity_id! {
    /// Identifier of a smart contract, used inside contract-bound keys.
    ContractId
}

impl From<ContractId> for AccountId {
    fn from(id: ContractId) -> Self {
        Self::new(id.shard, id.realm, id.num)
    }
}

impl From<AccountId> for ContractId {
    fn from(id: AccountId) -> Self {
        Self::new(id.shard, id.realm, id.num)
    }
}

/// A single unique token instance: its token type plus serial number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NftId {
    /// Owning token type.
    pub token: TokenId,
    /// Serial number, assigned at mint time starting from 1.
    pub serial: i64,
}

impl NftId {
    /// Builds a new NFT id.
    pub const fn new(token: TokenId, serial: i64) -> Self {
        Self { token, serial }
    }
}

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.token, self.serial)
    }
}

/// Consensus timestamp with nanosecond precision.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp {
    /// Whole seconds since the epoch.
    pub seconds: i64,
    /// Nanoseconds within the second.
    pub nanos: i32,
}

impl Timestamp {
    /// Builds a timestamp at a whole second.
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn long_zero_address_round_trips() {
        let token = TokenId::from_num(0x482);
        let encoded = token.to_evm_address();
        assert_eq!(
            encoded,
            address!("0x0000000000000000000000000000000000000482")
        );
        assert!(is_long_zero(&encoded));
        assert_eq!(TokenId::from_evm_address(encoded), token);
    }

    #[test]
    fn shard_and_realm_occupy_leading_bytes() {
        let id =
            AccountId::from_evm_address(address!("0x0000000100000000000000020000000000000003"));
        assert_eq!(id, AccountId::new(1, 2, 3));
        assert_eq!(id.to_string(), "1.2.3");
        assert!(!is_long_zero(&id.to_evm_address()));
    }

    #[test]
    fn evm_alias_is_not_long_zero() {
        assert!(!is_long_zero(&address!("0x7f3a1c0000000000000000000000000000000001")));
    }
}
