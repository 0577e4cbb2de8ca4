//! Settlement controller: one precompile invocation from raw input to record.
//!
//! The controller owns no state between calls. Everything an invocation
//! touches is either configuration held by [`HtsPrecompile`] or borrowed from
//! the host through [`Host`] for the duration of [`HtsPrecompile::compute`].

use crate::{
    auth::{Authorizer, SignatureOracle},
    config::HtsConfig,
    decoder::{dispatch, DecodeContext},
    descriptor::{OperationDescriptor, ResolvedCall, TransferValue},
    encoding::{encode_execution, encode_failure, encode_view},
    error::{DispatchError, LogicError, OperationFailure, SettlementError},
    frame::{CallContext, CallFrame, HaltReason, Host},
    ledger::{LedgerStore, WorldLedgers},
    logic::{self, TokenLogic},
    pricing::{CanonicalPriceTable, ExchangeRates, FeeCalculator, PricingEngine},
    records::{finalize, CallExport, RecordContext, RecordsHistorian},
    redirect::unwrap_redirect,
    selectors::{self as sel, selector_of},
    side_effects::SideEffects,
    synthetic::{self, BuildContext},
    syntax, views, HTS_PRECOMPILE_ID,
};
use alloy_primitives::Bytes;
use hts_primitives::{AccountId, ContractId, NftId, ResponseCode, SyntheticTransaction, TokenId};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Revert reason for value attached to a non-payable call.
pub const NON_PAYABLE_REVERT_REASON: &str = "Transfer of value to a non-payable precompile";

/// Revert reason for state-changing calls from a static frame.
pub const STATIC_CALL_REVERT_REASON: &str = "HTS precompiles are not static";

/// Stage an invocation reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SettlementState {
    /// Nothing prepared yet.
    #[default]
    Idle,
    /// Context captured and ledger view wrapped.
    FieldsPrepared,
    /// Operation decoded and synthetic body built.
    ComputationPrepared,
    /// Operation ran, successfully or not.
    Executed,
    /// Output and record settled.
    Finalized,
    /// Stopped with an exceptional halt.
    Halted,
}

impl SettlementState {
    /// Stage that follows `self` when nothing goes wrong; terminal stages stay put.
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::FieldsPrepared,
            Self::FieldsPrepared => Self::ComputationPrepared,
            Self::ComputationPrepared => Self::Executed,
            Self::Executed | Self::Finalized => Self::Finalized,
            Self::Halted => Self::Halted,
        }
    }

    fn advance(&mut self) {
        let next = self.next();
        trace!(target: "hts_precompile", from = ?*self, to = ?next, "settlement advanced");
        *self = next;
    }
}

/// Outcome of one invocation as reported to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementResult {
    /// Status of the call; guard reverts and halts report the closest code.
    pub response_code: ResponseCode,
    /// Bytes returned to the caller; `None` when the call produced none.
    pub output: Option<Bytes>,
    /// Gas charged.
    pub gas_requirement: u64,
    /// Revert reason, when the frame was reverted.
    pub revert_reason: Option<String>,
    /// Halt reason, when the frame halted.
    pub halt_reason: Option<HaltReason>,
    /// Last state reached.
    pub final_state: SettlementState,
}

impl SettlementResult {
    fn halted(reason: HaltReason, gas_requirement: u64) -> Self {
        let response_code = match reason {
            HaltReason::NotSupported => ResponseCode::NotSupported,
            _ => ResponseCode::FailInvalid,
        };
        Self {
            response_code,
            output: None,
            gas_requirement,
            revert_reason: None,
            halt_reason: Some(reason),
            final_state: SettlementState::Halted,
        }
    }

    fn reverted(reason: &str, gas_requirement: u64) -> Self {
        Self {
            response_code: ResponseCode::ContractRevertExecuted,
            output: None,
            gas_requirement,
            revert_reason: Some(reason.to_string()),
            halt_reason: None,
            final_state: SettlementState::Finalized,
        }
    }

    /// Returns `true` when the call succeeded.
    pub const fn is_success(&self) -> bool {
        self.response_code.is_success()
    }
}

/// The token service precompile.
#[derive(Clone)]
pub struct HtsPrecompile {
    config: HtsConfig,
    logic: Arc<dyn TokenLogic + Send + Sync>,
    fees: Arc<dyn FeeCalculator + Send + Sync>,
    rates: Arc<dyn ExchangeRates + Send + Sync>,
    prices: CanonicalPriceTable,
}

impl std::fmt::Debug for HtsPrecompile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtsPrecompile")
            .field("config", &self.config)
            .field("prices", &self.prices)
            .finish_non_exhaustive()
    }
}

impl HtsPrecompile {
    /// Creates a precompile from its collaborators.
    pub fn new(
        config: HtsConfig,
        logic: Arc<dyn TokenLogic + Send + Sync>,
        fees: Arc<dyn FeeCalculator + Send + Sync>,
        rates: Arc<dyn ExchangeRates + Send + Sync>,
        prices: CanonicalPriceTable,
    ) -> Self {
        Self {
            config,
            logic,
            fees,
            rates,
            prices,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &HtsConfig {
        &self.config
    }

    /// Shared price table, for hosts that refresh it.
    pub const fn prices(&self) -> &CanonicalPriceTable {
        &self.prices
    }

    /// Runs one invocation against `frame`.
    ///
    /// Only fatal conditions are returned as errors: resource exhaustion in
    /// business logic and a store that rejects a commit. Every other outcome,
    /// including reverts and halts, is reported through [`SettlementResult`]
    /// and the frame.
    pub fn compute(
        &self,
        input: &[u8],
        frame: &mut CallFrame,
        host: Host<'_>,
    ) -> Result<SettlementResult, SettlementError> {
        let mut state = SettlementState::Idle;
        let ctx = CallContext::capture(frame);
        let default_gas = self.config.default_gas_cost;
        let selector = selector_of(input);

        if !ctx.value.is_zero() && !selector.is_some_and(sel::is_payable) {
            warn!(target: "hts_precompile", value = %ctx.value, "value sent to non-payable call");
            frame.revert(NON_PAYABLE_REVERT_REASON);
            return Ok(SettlementResult::reverted(NON_PAYABLE_REVERT_REASON, default_gas));
        }
        if ctx.is_static && !is_view_input(input) {
            warn!(target: "hts_precompile", "state-changing call from static frame");
            frame.revert(STATIC_CALL_REVERT_REASON);
            return Ok(SettlementResult::reverted(STATIC_CALL_REVERT_REASON, default_gas));
        }

        let Host { ledgers, aliases, records, signatures } = host;
        if ctx.is_delegate_call && !self.delegate_permitted(&ctx, ledgers.as_deref()) {
            warn!(
                target: "hts_precompile",
                caller = %ctx.active_contract(),
                "unqualified delegate call"
            );
            frame.halt(HaltReason::InvalidDelegate);
            return Ok(SettlementResult::halted(HaltReason::InvalidDelegate, default_gas));
        }

        let (Some(store), Some(records)) = (ledgers, records) else {
            warn!(target: "hts_precompile", "frame is missing its ledger or record manager");
            frame.halt(HaltReason::MissingFrameField);
            return Ok(SettlementResult::halted(HaltReason::MissingFrameField, default_gas));
        };
        let mut ledgers = WorldLedgers::wrap(store, aliases);
        state.advance();
        let sender = AccountId::from_evm_address(aliases.resolve_for_evm(ctx.sender));

        let decode_ctx = DecodeContext {
            sender,
            aliases,
            token_types: &ledgers,
            config: &self.config,
        };
        let resolved = match dispatch(input, &decode_ctx) {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                debug!(target: "hts_precompile", "no operation for input");
                return Ok(SettlementResult {
                    response_code: ResponseCode::Ok,
                    output: Some(Bytes::new()),
                    gas_requirement: default_gas,
                    revert_reason: None,
                    halt_reason: None,
                    final_state: SettlementState::Finalized,
                });
            }
            Err(DispatchError::Decode(err)) => {
                warn!(target: "hts_precompile", %err, "failed to decode input");
                let reason = HaltReason::ErrorDecodingPrecompileInput;
                frame.halt(reason);
                return Ok(SettlementResult::halted(reason, default_gas));
            }
            Err(DispatchError::NotSupported { family }) => {
                warn!(target: "hts_precompile", family, "operation family disabled");
                frame.halt(HaltReason::NotSupported);
                return Ok(SettlementResult::halted(HaltReason::NotSupported, default_gas));
            }
            Err(DispatchError::UnsupportedForTokenType { reason }) => {
                warn!(target: "hts_precompile", reason, "facade call does not apply to token");
                frame.revert(reason);
                return Ok(SettlementResult::reverted(reason, default_gas));
            }
        };

        let now = ctx.consensus_time;
        let build_ctx = BuildContext {
            sender,
            sender_key: ledgers.account(&sender).and_then(|account| account.key),
            nft_owner: nft_owner(&resolved.descriptor, &ledgers),
        };
        let txn = synthetic::build(&resolved.descriptor, &build_ctx);
        state.advance();

        let pricing = PricingEngine::new(self.fees.as_ref(), self.rates.as_ref(), &self.prices);
        let quote = if resolved.descriptor.is_view() {
            pricing.view_quote(resolved.descriptor.function(), now)
        } else {
            pricing.quote(&txn, sender, now)
        };
        let gas = quote.gas;
        debug!(
            target: "hts_precompile",
            selector = ?resolved.selector,
            function = %txn.function(),
            gas,
            "call prepared"
        );

        if ctx.remaining_gas < gas {
            warn!(target: "hts_precompile", gas, remaining = ctx.remaining_gas, "insufficient gas");
            let status = ResponseCode::InsufficientGas;
            self.emit(
                records,
                status,
                SideEffects::default(),
                txn,
                &ctx,
                sender,
                None,
                gas,
            );
            return Ok(SettlementResult {
                response_code: status,
                output: None,
                gas_requirement: gas,
                revert_reason: None,
                halt_reason: None,
                final_state: SettlementState::Finalized,
            });
        }

        let outcome = self.execute(&resolved, &txn, &mut ledgers, &ctx, sender, signatures)?;
        state.advance();

        match outcome {
            Ok(output) => {
                let effects = ledgers.commit()?;
                state.advance();
                info!(target: "hts_precompile", function = %txn.function(), gas, "committed");
                self.emit(
                    records,
                    ResponseCode::Success,
                    effects,
                    txn,
                    &ctx,
                    sender,
                    Some((&output, None)),
                    gas,
                );
                Ok(SettlementResult {
                    response_code: ResponseCode::Success,
                    output: Some(output),
                    gas_requirement: gas,
                    revert_reason: None,
                    halt_reason: None,
                    final_state: state,
                })
            }
            Err(failure) => {
                drop(ledgers);
                state.advance();
                let status = failure.status();
                let output = encode_failure(&resolved.descriptor, status);
                let revert_reason = match failure {
                    OperationFailure::ExecutionFailed { revert_reason, .. } => {
                        frame.revert(revert_reason.clone());
                        Some(revert_reason)
                    }
                    OperationFailure::Denied(_) | OperationFailure::InvalidSyntax(_) => None,
                };
                warn!(
                    target: "hts_precompile",
                    %status,
                    function = %txn.function(),
                    "operation failed"
                );
                self.emit(
                    records,
                    status,
                    SideEffects::default(),
                    txn,
                    &ctx,
                    sender,
                    Some((&output, Some(status.name().to_string()))),
                    gas,
                );
                Ok(SettlementResult {
                    response_code: status,
                    output: Some(output),
                    gas_requirement: gas,
                    revert_reason,
                    halt_reason: None,
                    final_state: state,
                })
            }
        }
    }

    /// Authorizes, validates and runs a prepared call.
    ///
    /// The outer error is fatal; the inner one is an ordinary failed call.
    fn execute(
        &self,
        resolved: &ResolvedCall,
        txn: &SyntheticTransaction,
        ledgers: &mut WorldLedgers<'_>,
        ctx: &CallContext,
        sender: AccountId,
        signatures: &dyn SignatureOracle,
    ) -> Result<Result<Bytes, OperationFailure>, SettlementError> {
        let active = ledgers.canonical_address(ctx.active_contract());
        let authorizer = Authorizer::new(signatures, ContractId::from_evm_address(active), ctx);
        if let Err(code) = authorizer.check(txn, Some(&*ledgers), sender) {
            warn!(target: "hts_precompile", %code, "authorization denied");
            return Ok(Err(OperationFailure::Denied(code)));
        }
        debug!(target: "hts_precompile", strict = authorizer.is_strict(), "authorized");

        let code = syntax::validate(txn, &self.config);
        if code != ResponseCode::Ok {
            return Ok(Err(OperationFailure::InvalidSyntax(code)));
        }

        if let OperationDescriptor::Query(query) = &resolved.descriptor {
            return Ok(views::evaluate(query, ledgers)
                .map(|value| encode_view(resolved.convention, &value, &self.config.ledger_id))
                .map_err(OperationFailure::execution));
        }

        let now = ctx.consensus_time;
        let executed = logic::execute(self.logic.as_ref(), ledgers, txn, sender, now);
        match executed {
            Ok(execution) => {
                let bytes = encode_execution(&resolved.descriptor, resolved.convention, &execution);
                Ok(Ok(bytes))
            }
            Err(LogicError::Status(code)) => Ok(Err(OperationFailure::execution(code))),
            Err(LogicError::Other(reason)) => {
                warn!(target: "hts_precompile", %reason, "internal precompile failure");
                Ok(Err(OperationFailure::execution(ResponseCode::FailInvalid)))
            }
            Err(LogicError::ResourceLimit(reason)) => Err(SettlementError::ResourceLimit(reason)),
        }
    }

    /// Builds and attaches the record of the current call.
    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        records: &mut dyn RecordsHistorian,
        status: ResponseCode,
        effects: SideEffects,
        txn: SyntheticTransaction,
        ctx: &CallContext,
        sender: AccountId,
        output: Option<(&Bytes, Option<String>)>,
        gas: u64,
    ) {
        let export = self.config.export_precompile_results.then(|| {
            let (output, error_message) = match output {
                Some((bytes, error)) => (bytes.clone(), error),
                None => (Bytes::new(), Some(status.name().to_string())),
            };
            CallExport {
                output,
                gas_used: gas,
                error_message,
            }
        });
        let record_ctx = RecordContext {
            consensus_time: ctx.consensus_time,
            sender,
            precompile: HTS_PRECOMPILE_ID,
            export,
        };
        let record = finalize(status, effects, &txn, record_ctx);
        info!(target: "hts_precompile", %status, function = %txn.function(), "record emitted");
        records.manage_in_progress_record(record, txn);
    }

    /// Delegate calls are accepted from token proxies and permitted callers.
    fn delegate_permitted(&self, ctx: &CallContext, store: Option<&dyn LedgerStore>) -> bool {
        let caller = ctx.active_contract();
        let token = TokenId::from_evm_address(caller);
        let is_token = store.is_some_and(|store| store.token(&token).is_some());
        is_token || self.config.permits_delegate_caller(&caller)
    }
}

/// Returns `true` when `input` names a read-only operation.
fn is_view_input(input: &[u8]) -> bool {
    match unwrap_redirect(input) {
        Ok(Some(redirect)) => redirect.selector().is_some_and(sel::is_facade_view),
        _ => selector_of(input).is_some_and(sel::is_direct_view),
    }
}

/// Current owner of the NFT an approve call targets; the treasury when unowned.
fn nft_owner(descriptor: &OperationDescriptor, ledgers: &WorldLedgers<'_>) -> Option<AccountId> {
    let OperationDescriptor::Approve {
        token,
        value: TransferValue::Serial(serial),
        ..
    } = descriptor
    else {
        return None;
    };
    let owner = ledgers.nft(&NftId::new(*token, *serial))?.owner;
    if owner.is_zero() {
        ledgers.token(token).map(|token| token.treasury)
    } else {
        Some(owner)
    }
}
