//! Success and failure records for precompile calls.

use crate::side_effects::SideEffects;
use alloy_primitives::Bytes;
use hts_primitives::{
    AccountId, ContractCallResult, ContractId, ResponseCode, SyntheticTransaction, Timestamp,
    TransactionReceipt, TransactionRecord,
};

/// Accepts the record of the call currently executing.
pub trait RecordsHistorian {
    /// Attaches `record` for `txn` as a child of the parent transaction.
    fn manage_in_progress_record(&mut self, record: TransactionRecord, txn: SyntheticTransaction);
}

/// Call output exported on records when enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallExport {
    /// Bytes returned to the caller.
    pub output: Bytes,
    /// Gas charged.
    pub gas_used: u64,
    /// Failure reason, if any.
    pub error_message: Option<String>,
}

/// Facts about the call a record is built for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordContext {
    /// Consensus time of the parent transaction.
    pub consensus_time: Timestamp,
    /// Calling account.
    pub sender: AccountId,
    /// Contract id of the precompile.
    pub precompile: ContractId,
    /// Present only when results are exported.
    pub export: Option<CallExport>,
}

/// Builds the record of a call that ended with `code`.
///
/// Side effects are only reported for `OK` and `SUCCESS`; any other code
/// yields a bare receipt with that status.
pub fn finalize(
    code: ResponseCode,
    effects: SideEffects,
    txn: &SyntheticTransaction,
    ctx: RecordContext,
) -> TransactionRecord {
    let contract_call_result = ctx.export.map(|export| ContractCallResult {
        contract_id: ctx.precompile,
        result: export.output,
        error_message: export.error_message,
        gas_used: export.gas_used,
        sender: ctx.sender,
    });

    if !code.is_success() {
        return TransactionRecord {
            receipt: TransactionReceipt::with_status(code),
            memo: txn.memo.clone(),
            consensus_time: ctx.consensus_time,
            hbar_transfers: Vec::new(),
            token_transfer_lists: Vec::new(),
            automatic_token_associations: Vec::new(),
            contract_call_result,
        };
    }

    TransactionRecord {
        receipt: TransactionReceipt {
            status: code,
            token_id: effects.new_token,
            new_total_supply: effects.new_total_supply,
            serial_numbers: effects.minted_serials,
        },
        memo: txn.memo.clone(),
        consensus_time: ctx.consensus_time,
        hbar_transfers: effects.hbar_transfers,
        token_transfer_lists: effects.token_transfers,
        automatic_token_associations: effects.associations,
        contract_call_result,
    }
}
