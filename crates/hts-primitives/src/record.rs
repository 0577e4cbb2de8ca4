//! Transaction record shapes emitted for precompile calls.

use crate::{
    ids::{AccountId, ContractId, Timestamp, TokenId},
    response_code::ResponseCode,
    txn::{AccountAmount, TokenTransferList},
};
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// Receipt part of a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Final status.
    pub status: ResponseCode,
    /// Token created by the transaction.
    pub token_id: Option<TokenId>,
    /// Total supply after a mint, burn or wipe.
    pub new_total_supply: Option<i64>,
    /// Serials minted.
    pub serial_numbers: Vec<i64>,
}

impl TransactionReceipt {
    /// Receipt carrying only a status.
    pub const fn with_status(status: ResponseCode) -> Self {
        Self {
            status,
            token_id: None,
            new_total_supply: None,
            serial_numbers: Vec::new(),
        }
    }
}

/// An association created as a side effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAssociation {
    /// Token associated.
    pub token: TokenId,
    /// Account associated.
    pub account: AccountId,
}

/// Contract-call details exported on precompile records when enabled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCallResult {
    /// The precompile's contract id.
    pub contract_id: ContractId,
    /// Output returned to the caller.
    pub result: Bytes,
    /// Revert or failure reason.
    pub error_message: Option<String>,
    /// Gas charged for the call.
    pub gas_used: u64,
    /// Calling account.
    pub sender: AccountId,
}

/// Full record of a synthetic transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Receipt.
    pub receipt: TransactionReceipt,
    /// Memo; always empty for precompile calls.
    pub memo: String,
    /// Consensus time of the parent transaction.
    pub consensus_time: Timestamp,
    /// Hbar adjustments.
    pub hbar_transfers: Vec<AccountAmount>,
    /// Token adjustments grouped per token.
    pub token_transfer_lists: Vec<TokenTransferList>,
    /// Associations created.
    pub automatic_token_associations: Vec<TokenAssociation>,
    /// Exported call details.
    pub contract_call_result: Option<ContractCallResult>,
}

impl TransactionRecord {
    /// Final status of the record.
    pub const fn status(&self) -> ResponseCode {
        self.receipt.status
    }
}
