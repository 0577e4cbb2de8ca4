//! Runtime configuration for the token service precompile.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeSet, env, str::FromStr};
use thiserror::Error;

/// Gas reported for calls that never reach pricing (halts, guards, no-ops).
pub const DEFAULT_GAS_COST: u64 = 10_000;

/// Ledger id reported in token info queries when none is configured.
pub const DEFAULT_LEDGER_ID: &str = "0x03";

/// Default UTF-8 byte limit for token names and symbols.
pub const DEFAULT_MAX_UTF8_BYTES: usize = 100;

const fn default_gas_cost() -> u64 {
    DEFAULT_GAS_COST
}

const fn enabled() -> bool {
    true
}

fn default_ledger_id() -> String {
    DEFAULT_LEDGER_ID.to_string()
}

const fn default_max_utf8_bytes() -> usize {
    DEFAULT_MAX_UTF8_BYTES
}

/// Feature switches and limits consulted on every call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtsConfig {
    /// Gas reported when a call halts or resolves to no operation.
    #[serde(default = "default_gas_cost")]
    pub default_gas_cost: u64,
    /// Enables approve, setApprovalForAll and the allowance queries.
    #[serde(default = "enabled")]
    pub allowances_enabled: bool,
    /// Enables the token create family.
    #[serde(default = "enabled")]
    pub create_enabled: bool,
    /// Enables the v2 crypto transfer with hbar adjustments and approvals.
    #[serde(default = "enabled")]
    pub atomic_crypto_transfer_enabled: bool,
    /// Enables the HRC `associate()`/`dissociate()` facade calls.
    #[serde(default = "enabled")]
    pub hrc_associate_enabled: bool,
    /// Attach call output and gas to emitted records.
    #[serde(default)]
    pub export_precompile_results: bool,
    /// Contracts allowed to reach the precompile through a delegate call.
    ///
    /// An empty set disables the delegate-caller check.
    #[serde(default)]
    pub permitted_delegate_callers: BTreeSet<Address>,
    /// Ledger id reported by token info queries.
    #[serde(default = "default_ledger_id")]
    pub ledger_id: String,
    /// UTF-8 byte limit for token names.
    #[serde(default = "default_max_utf8_bytes")]
    pub max_token_name_utf8_bytes: usize,
    /// UTF-8 byte limit for token symbols.
    #[serde(default = "default_max_utf8_bytes")]
    pub max_token_symbol_utf8_bytes: usize,
}

impl Default for HtsConfig {
    fn default() -> Self {
        Self {
            default_gas_cost: DEFAULT_GAS_COST,
            allowances_enabled: true,
            create_enabled: true,
            atomic_crypto_transfer_enabled: true,
            hrc_associate_enabled: true,
            export_precompile_results: false,
            permitted_delegate_callers: BTreeSet::new(),
            ledger_id: default_ledger_id(),
            max_token_name_utf8_bytes: DEFAULT_MAX_UTF8_BYTES,
            max_token_symbol_utf8_bytes: DEFAULT_MAX_UTF8_BYTES,
        }
    }
}

/// Errors raised while reading [`HtsConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The `hts` section is absent from the extras document.
    #[error("missing hts config in chainspec extras")]
    Missing,
    /// The section exists but does not deserialize.
    #[error("invalid hts config: {0}")]
    Invalid(String),
    /// An environment variable was set to whitespace only.
    #[error("environment variable {var} is empty")]
    EmptyEnv {
        /// Name of the offending variable.
        var: String,
    },
    /// An environment variable holds an unparseable value.
    #[error("environment variable {var} has invalid value {value:?}")]
    InvalidEnv {
        /// Name of the offending variable.
        var: String,
        /// Raw value found.
        value: String,
    },
}

impl HtsConfig {
    /// Reads the `hts` section of a chainspec extras JSON blob.
    ///
    /// Expected shape (example):
    /// {
    ///   "hts": {
    ///     "defaultGasCost": 10000,
    ///     "allowancesEnabled": true,
    ///     "permittedDelegateCallers": ["0x0000000000000000000000000000000000000402"],
    ///     "exportPrecompileResults": true
    ///   }
    /// }
    pub fn from_json(extras: &Value) -> Result<Self, ConfigError> {
        let section = extras.get("hts").ok_or(ConfigError::Missing)?;
        serde_json::from_value::<Self>(section.clone())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Builds the configuration from `HTS_*` environment variables.
    ///
    /// Unset variables keep their defaults; set-but-invalid ones are errors.
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Some(gas) = env_value::<u64>("HTS_DEFAULT_GAS_COST")? {
            config.default_gas_cost = gas;
        }
        if let Some(flag) = env_value::<bool>("HTS_ALLOWANCES_ENABLED")? {
            config.allowances_enabled = flag;
        }
        if let Some(flag) = env_value::<bool>("HTS_CREATE_ENABLED")? {
            config.create_enabled = flag;
        }
        if let Some(flag) = env_value::<bool>("HTS_ATOMIC_CRYPTO_TRANSFER_ENABLED")? {
            config.atomic_crypto_transfer_enabled = flag;
        }
        if let Some(flag) = env_value::<bool>("HTS_HRC_ASSOCIATE_ENABLED")? {
            config.hrc_associate_enabled = flag;
        }
        if let Some(flag) = env_value::<bool>("HTS_EXPORT_PRECOMPILE_RESULTS")? {
            config.export_precompile_results = flag;
        }
        if let Some(ledger_id) = env_raw("HTS_LEDGER_ID")? {
            config.ledger_id = ledger_id;
        }
        if let Some(raw) = env_raw("HTS_PERMITTED_DELEGATE_CALLERS")? {
            config.permitted_delegate_callers = raw
                .split(',')
                .map(|s| Address::from_str(s.trim()))
                .collect::<Result<BTreeSet<_>, _>>()?;
        }

        Ok(config)
    }

    /// Returns `true` if `caller` may reach the precompile through a delegate call.
    pub fn permits_delegate_caller(&self, caller: &Address) -> bool {
        self.permitted_delegate_callers.is_empty()
            || self.permitted_delegate_callers.contains(caller)
    }
}

fn env_raw(var: &str) -> Result<Option<String>, ConfigError> {
    match env::var(var) {
        Ok(raw) if raw.trim().is_empty() => Err(ConfigError::EmptyEnv { var: var.into() }),
        Ok(raw) => Ok(Some(raw.trim().to_string())),
        Err(_) => Ok(None),
    }
}

fn env_value<T: FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    env_raw(var)?
        .map(|raw| {
            raw.parse::<T>().map_err(|_| ConfigError::InvalidEnv {
                var: var.into(),
                value: raw.clone(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use serde_json::json;

    #[test]
    fn missing_section_is_reported() {
        assert_eq!(HtsConfig::from_json(&json!({})), Err(ConfigError::Missing));
    }

    #[test]
    fn absent_fields_fall_back_to_defaults() {
        let cfg = HtsConfig::from_json(&json!({ "hts": { "createEnabled": false } })).unwrap();
        assert!(!cfg.create_enabled);
        assert!(cfg.allowances_enabled);
        assert_eq!(cfg.default_gas_cost, DEFAULT_GAS_COST);
        assert_eq!(cfg.ledger_id, DEFAULT_LEDGER_ID);
    }

    #[test]
    fn malformed_section_is_invalid() {
        let err =
            HtsConfig::from_json(&json!({ "hts": { "defaultGasCost": "lots" } })).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn delegate_allow_list_is_open_when_empty() {
        let caller = address!("0x0000000000000000000000000000000000000402");
        let mut cfg = HtsConfig::default();
        assert!(cfg.permits_delegate_caller(&caller));

        cfg.permitted_delegate_callers
            .insert(address!("0x0000000000000000000000000000000000000999"));
        assert!(!cfg.permits_delegate_caller(&caller));

        cfg.permitted_delegate_callers.insert(caller);
        assert!(cfg.permits_delegate_caller(&caller));
    }

    #[test]
    fn env_loader_reads_overrides() {
        env::set_var("HTS_DEFAULT_GAS_COST", "25000");
        env::set_var("HTS_CREATE_ENABLED", "false");
        env::set_var(
            "HTS_PERMITTED_DELEGATE_CALLERS",
            "0x0000000000000000000000000000000000000402,0x0000000000000000000000000000000000000403",
        );
        let cfg = HtsConfig::from_env().unwrap();
        env::remove_var("HTS_DEFAULT_GAS_COST");
        env::remove_var("HTS_CREATE_ENABLED");
        env::remove_var("HTS_PERMITTED_DELEGATE_CALLERS");

        assert_eq!(cfg.default_gas_cost, 25_000);
        assert!(!cfg.create_enabled);
        assert_eq!(cfg.permitted_delegate_callers.len(), 2);
    }
}
