//! Signing keys attached to accounts and tokens.

use crate::ids::ContractId;
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// A native key. Composite keys nest arbitrarily.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// 32-byte Ed25519 public key.
    Ed25519(Bytes),
    /// 33-byte compressed secp256k1 public key.
    EcdsaSecp256k1(Bytes),
    /// Active only while the named contract is the direct caller.
    ContractId(ContractId),
    /// Active while the named contract is the caller, including via delegate calls.
    DelegatableContractId(ContractId),
    /// Every member must be active.
    KeyList(Vec<Key>),
    /// At least `threshold` members must be active.
    Threshold {
        /// Number of active members required.
        threshold: u32,
        /// Candidate keys.
        keys: Vec<Key>,
    },
}

impl Key {
    /// Length of an Ed25519 public key.
    pub const ED25519_LEN: usize = 32;
    /// Length of a compressed secp256k1 public key.
    pub const ECDSA_SECP256K1_LEN: usize = 33;

    /// Returns `true` for contract-bound key variants.
    pub const fn is_contract_bound(&self) -> bool {
        matches!(self, Self::ContractId(_) | Self::DelegatableContractId(_))
    }
}

/// Which key a precompile call must prove control of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// The subject account's own key.
    Ordinary,
    /// The token's supply key.
    Supply,
    /// The token's admin key.
    Admin,
    /// The token's wipe key.
    Wipe,
    /// The token's pause key.
    Pause,
}

/// Bit flags selecting token key slots in the `TokenKey.keyType` ABI field.
pub mod token_key_type {
    /// Admin key slot.
    pub const ADMIN: u64 = 1;
    /// KYC key slot.
    pub const KYC: u64 = 2;
    /// Freeze key slot.
    pub const FREEZE: u64 = 4;
    /// Wipe key slot.
    pub const WIPE: u64 = 8;
    /// Supply key slot.
    pub const SUPPLY: u64 = 16;
    /// Fee schedule key slot.
    pub const FEE_SCHEDULE: u64 = 32;
    /// Pause key slot.
    pub const PAUSE: u64 = 64;
    /// All defined bits.
    pub const ALL: u64 = ADMIN | KYC | FREEZE | WIPE | SUPPLY | FEE_SCHEDULE | PAUSE;
}

/// The seven optional key slots of a token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenKeys {
    /// Admin key.
    pub admin: Option<Key>,
    /// KYC key.
    pub kyc: Option<Key>,
    /// Freeze key.
    pub freeze: Option<Key>,
    /// Wipe key.
    pub wipe: Option<Key>,
    /// Supply key.
    pub supply: Option<Key>,
    /// Fee schedule key.
    pub fee_schedule: Option<Key>,
    /// Pause key.
    pub pause: Option<Key>,
}

impl TokenKeys {
    /// Stores `key` into every slot selected by `key_type`.
    pub fn assign(&mut self, key_type: u64, key: &Key) {
        use token_key_type as t;
        let slots = [
            (t::ADMIN, &mut self.admin),
            (t::KYC, &mut self.kyc),
            (t::FREEZE, &mut self.freeze),
            (t::WIPE, &mut self.wipe),
            (t::SUPPLY, &mut self.supply),
            (t::FEE_SCHEDULE, &mut self.fee_schedule),
            (t::PAUSE, &mut self.pause),
        ];
        for (bit, slot) in slots {
            if key_type & bit != 0 {
                *slot = Some(key.clone());
            }
        }
    }

    /// Returns the key stored in the single slot named by `key_type`.
    ///
    /// Multi-bit masks select nothing.
    pub const fn get(&self, key_type: u64) -> Option<&Key> {
        use token_key_type as t;
        let slot = match key_type {
            t::ADMIN => &self.admin,
            t::KYC => &self.kyc,
            t::FREEZE => &self.freeze,
            t::WIPE => &self.wipe,
            t::SUPPLY => &self.supply,
            t::FEE_SCHEDULE => &self.fee_schedule,
            t::PAUSE => &self.pause,
            _ => return None,
        };
        slot.as_ref()
    }
}
