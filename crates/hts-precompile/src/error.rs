//! Error types raised along the dispatch and settlement pipeline.

use hts_primitives::ResponseCode;
use thiserror::Error;

/// Input bytes could not be turned into an operation descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The ABI payload is malformed for the matched selector.
    #[error("invalid abi payload: {0}")]
    Abi(String),
    /// A redirect envelope is shorter than its fixed header.
    #[error("redirect payload of {len} bytes is shorter than its header")]
    ShortRedirect {
        /// Length of the received payload.
        len: usize,
    },
    /// A numeric argument does not fit the native width.
    #[error("{field} value overflows a signed 64-bit integer")]
    Overflow {
        /// Argument that overflowed.
        field: &'static str,
    },
    /// Two arrays meant to be zipped have different lengths.
    #[error("parallel arrays differ in length: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first array.
        left: usize,
        /// Length of the second array.
        right: usize,
    },
    /// A key argument selects zero or several key kinds at once.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl From<alloy_sol_types::Error> for DecodeError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::Abi(err.to_string())
    }
}

/// Why a call could not be dispatched to an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The payload failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The operation family is switched off in configuration.
    #[error("{family} is not enabled")]
    NotSupported {
        /// Disabled family.
        family: &'static str,
    },
    /// The facade call does not apply to this token's type.
    #[error("{reason}")]
    UnsupportedForTokenType {
        /// Fixed revert reason returned to the caller.
        reason: &'static str,
    },
}

/// Authorization could not be evaluated.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No ledger view was available to look up keys.
    #[error("ledger view unavailable")]
    Unavailable,
    /// The subject account does not exist.
    #[error("account not found")]
    MissingAccount,
    /// The subject token does not exist.
    #[error("token not found")]
    MissingToken,
    /// The token lacks the key slot the operation needs.
    #[error("token has no key for {0}")]
    MissingKey(ResponseCode),
}

impl AuthorizationError {
    /// Response code reported for this error.
    pub const fn code(self) -> ResponseCode {
        match self {
            Self::Unavailable => ResponseCode::FailInvalid,
            Self::MissingAccount => ResponseCode::InvalidAccountId,
            Self::MissingToken => ResponseCode::InvalidTokenId,
            Self::MissingKey(code) => code,
        }
    }
}

/// Failure raised by business logic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogicError {
    /// A domain rule rejected the operation.
    #[error("{0}")]
    Status(ResponseCode),
    /// An unexpected failure without a domain status.
    #[error("{0}")]
    Other(String),
    /// Gas or another resource ran out; not recoverable inside the call.
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),
}

/// Reason a failed ledger write was rejected by the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("ledger store rejected changes: {0}")]
pub struct StoreError(pub String);

/// Fatal errors propagated to the host instead of being folded into a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// Business logic exhausted a resource.
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),
    /// The backing store failed to apply a committed change set.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Non-fatal reasons an operation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationFailure {
    /// Authorization denied with the given code.
    Denied(ResponseCode),
    /// Syntax validation rejected the body.
    InvalidSyntax(ResponseCode),
    /// Business logic or a view failed.
    ExecutionFailed {
        /// Status recorded.
        status: ResponseCode,
        /// Reason exposed as the revert reason.
        revert_reason: String,
    },
}

impl OperationFailure {
    /// Builds an execution failure whose revert reason is the status name.
    pub fn execution(status: ResponseCode) -> Self {
        Self::ExecutionFailed {
            status,
            revert_reason: status.name().to_string(),
        }
    }

    /// Status recorded for this failure.
    pub const fn status(&self) -> ResponseCode {
        match self {
            Self::Denied(code) | Self::InvalidSyntax(code) => *code,
            Self::ExecutionFailed { status, .. } => *status,
        }
    }
}
