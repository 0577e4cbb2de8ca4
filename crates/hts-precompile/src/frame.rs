//! Call-frame facts the host hands to the precompile.

use crate::{
    auth::SignatureOracle,
    ledger::{AliasResolver, LedgerStore},
    records::RecordsHistorian,
};
use alloy_primitives::{Address, U256};
use hts_primitives::Timestamp;
use std::fmt;

/// The frame that called into the precompile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentFrame {
    /// Address whose code the parent frame runs.
    pub contract: Address,
    /// Address whose storage the parent frame runs against.
    pub recipient: Address,
}

impl ParentFrame {
    /// A parent running foreign code against its own storage is a delegate call.
    pub fn is_delegating(&self) -> bool {
        self.contract != self.recipient
    }
}

/// Immutable facts about one invocation, captured before decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Immediate caller of the precompile.
    pub sender: Address,
    /// Code address of the precompile frame.
    pub contract: Address,
    /// Storage address of the precompile frame.
    pub recipient: Address,
    /// Gas left in the frame.
    pub remaining_gas: u64,
    /// Value attached to the call.
    pub value: U256,
    /// The frame forbids state changes.
    pub is_static: bool,
    /// Consensus time of the parent transaction.
    pub consensus_time: Timestamp,
    /// Frame that made the call, if any.
    pub parent: Option<ParentFrame>,
    /// Whether the caller reached the precompile through a delegate call.
    pub is_delegate_call: bool,
}

impl CallContext {
    /// Captures a context, deriving the delegate flag from `parent`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sender: Address,
        contract: Address,
        recipient: Address,
        remaining_gas: u64,
        value: U256,
        is_static: bool,
        consensus_time: Timestamp,
        parent: Option<ParentFrame>,
    ) -> Self {
        let is_delegate_call = parent.as_ref().is_some_and(ParentFrame::is_delegating);
        Self {
            sender,
            contract,
            recipient,
            remaining_gas,
            value,
            is_static,
            consensus_time,
            parent,
            is_delegate_call,
        }
    }

    /// Captures the context of `frame`.
    pub fn capture(frame: &CallFrame) -> Self {
        Self::new(
            frame.sender,
            frame.contract,
            frame.recipient,
            frame.remaining_gas,
            frame.value,
            frame.is_static,
            frame.consensus_time,
            frame.parent,
        )
    }

    /// Address whose authority a contract-bound key must name.
    ///
    /// Inside a delegate call this is the storage owner of the delegating
    /// frame, otherwise the direct caller.
    pub fn active_contract(&self) -> Address {
        match self.parent {
            Some(parent) if self.is_delegate_call => parent.recipient,
            _ => self.sender,
        }
    }
}

/// Lifecycle state of a frame as seen by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameState {
    /// Still executing.
    #[default]
    Running,
    /// Reverted; output is the revert reason.
    Reverted,
    /// Stopped with an exceptional halt.
    Halted,
}

/// Why a call stopped with an exceptional halt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// Input bytes could not be decoded.
    ErrorDecodingPrecompileInput,
    /// The operation family is disabled.
    NotSupported,
    /// The delegate caller is not permitted.
    InvalidDelegate,
    /// The frame lacks a collaborator the precompile needs.
    MissingFrameField,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::ErrorDecodingPrecompileInput => "ERROR_DECODING_PRECOMPILE_INPUT",
            Self::NotSupported => "NOT_SUPPORTED",
            Self::InvalidDelegate => "INVALID_DELEGATE",
            Self::MissingFrameField => "MISSING_FRAME_FIELD",
        };
        f.write_str(reason)
    }
}

/// Host frame the precompile runs in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallFrame {
    /// Immediate caller.
    pub sender: Address,
    /// Code address.
    pub contract: Address,
    /// Storage address.
    pub recipient: Address,
    /// Gas left.
    pub remaining_gas: u64,
    /// Attached value.
    pub value: U256,
    /// Static frame flag.
    pub is_static: bool,
    /// Consensus time.
    pub consensus_time: Timestamp,
    /// Calling frame.
    pub parent: Option<ParentFrame>,
    /// Current state.
    pub state: FrameState,
    /// Revert reason set by a guard.
    pub revert_reason: Option<String>,
    /// Exceptional halt reason.
    pub halt_reason: Option<HaltReason>,
}

impl CallFrame {
    /// Marks the frame reverted with `reason`.
    pub fn revert(&mut self, reason: impl Into<String>) {
        self.state = FrameState::Reverted;
        self.revert_reason = Some(reason.into());
    }

    /// Marks the frame halted.
    pub fn halt(&mut self, reason: HaltReason) {
        self.state = FrameState::Halted;
        self.halt_reason = Some(reason);
    }
}

/// Collaborators the host lends to one invocation.
pub struct Host<'a> {
    /// Backing ledger; `None` when the host has no world state to offer.
    pub ledgers: Option<&'a mut dyn LedgerStore>,
    /// EVM alias resolver.
    pub aliases: &'a dyn AliasResolver,
    /// In-progress record manager.
    pub records: Option<&'a mut dyn RecordsHistorian>,
    /// Signatures on the parent transaction.
    pub signatures: &'a dyn SignatureOracle,
}

impl fmt::Debug for Host<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("ledgers", &self.ledgers.is_some())
            .field("records", &self.records.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const CALLER: Address = address!("0x00000000000000000000000000000000000004d2");
    const LIBRARY: Address = address!("0x0000000000000000000000000000000000000bee");

    fn frame(parent: Option<ParentFrame>) -> CallFrame {
        CallFrame {
            sender: CALLER,
            parent,
            ..Default::default()
        }
    }

    #[test]
    fn top_level_call_is_not_delegate() {
        let parent = ParentFrame {
            contract: CALLER,
            recipient: CALLER,
        };
        let ctx = CallContext::capture(&frame(Some(parent)));
        assert!(!ctx.is_delegate_call);
        assert_eq!(ctx.active_contract(), CALLER);

        assert!(!CallContext::capture(&frame(None)).is_delegate_call);
    }

    #[test]
    fn delegating_parent_sets_flag() {
        let parent = ParentFrame {
            contract: LIBRARY,
            recipient: CALLER,
        };
        let ctx = CallContext::capture(&frame(Some(parent)));
        assert!(ctx.is_delegate_call);
        assert_eq!(ctx.active_contract(), CALLER);
    }

    #[test]
    fn revert_and_halt_update_state() {
        let mut frame = frame(None);
        frame.revert("nope");
        assert_eq!(frame.state, FrameState::Reverted);
        frame.halt(HaltReason::InvalidDelegate);
        assert_eq!(frame.state, FrameState::Halted);
        assert_eq!(frame.halt_reason, Some(HaltReason::InvalidDelegate));
        assert_eq!(HaltReason::InvalidDelegate.to_string(), "INVALID_DELEGATE");
    }
}
