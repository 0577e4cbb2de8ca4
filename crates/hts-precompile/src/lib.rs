//! # Token Service Precompile
//!
//! Dispatch and settlement engine for the native token service exposed to
//! EVM contracts. A call is decoded into a typed operation, mirrored as a
//! native synthetic transaction, priced in gas, authorized against the keys
//! of the accounts and tokens it touches, validated, executed against a
//! per-call transactional view of the ledger, and settled into ABI output
//! plus an auditable child record.
//!
//! ## Addresses
//!
//! | Address | Name | Description |
//! |---------|------|-------------|
//! | `0x167` | [`HtsPrecompile`] | Token service calls and `redirectForToken` facades |
//!
//! Token proxy contracts forward ERC-20, ERC-721 and HRC calls through
//! `redirectForToken(address, bytes)`; those decode to the same operations as
//! the equivalent direct call and differ only in their output encoding.
//!
//! ## Pipeline
//!
//! 1. **Guards**: value to non-payable calls, static frames, delegate callers
//! 2. **Dispatch**: [`decoder::dispatch`] resolves the selector to an
//!    [`OperationDescriptor`]
//! 3. **Pricing**: [`pricing::PricingEngine`] converts fees to gas
//! 4. **Authorization**: [`auth::Authorizer`] checks the required keys
//! 5. **Execution**: [`logic::TokenLogic`] or [`views::evaluate`] against
//!    [`ledger::WorldLedgers`]
//! 6. **Settlement**: commit on success only, then [`records::finalize`]
//!
//! ## Integration
//!
//! ```ignore
//! use hts_precompile::{config::HtsConfig, logic::LedgerTokenLogic, HtsPrecompile};
//!
//! let precompile = HtsPrecompile::new(
//!     HtsConfig::from_env()?,
//!     Arc::new(LedgerTokenLogic),
//!     fee_calculator,
//!     exchange_rates,
//!     CanonicalPriceTable::from_json_str(&prices_json)?,
//! );
//! let result = precompile.compute(&input, &mut frame, host)?;
//! ```
//!
//! The library installs no tracing subscriber; events are emitted under the
//! `hts_precompile` target.

pub mod abi;
pub mod auth;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod descriptor;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod ledger;
pub mod logic;
pub mod pricing;
pub mod records;
pub mod redirect;
pub mod selectors;
pub mod side_effects;
pub mod synthetic;
pub mod syntax;
pub mod views;

use alloy_primitives::{address, Address};
use hts_primitives::ContractId;

pub use config::HtsConfig;
pub use controller::{HtsPrecompile, SettlementResult, SettlementState};
pub use descriptor::{CallConvention, OperationDescriptor};
pub use error::{DecodeError, DispatchError, LogicError, OperationFailure, SettlementError};
pub use frame::{CallFrame, HaltReason, Host};

/// EVM address of the token service precompile.
pub const HTS_PRECOMPILE_ADDRESS: Address = address!("0x0000000000000000000000000000000000000167");

/// Contract id of the token service precompile, as reported on records.
pub const HTS_PRECOMPILE_ID: ContractId = ContractId::from_num(0x167);
