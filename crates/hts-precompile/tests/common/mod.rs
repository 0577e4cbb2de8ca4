//! Shared fixtures for the settlement, decoding and pricing tests.
//!
//! Every test gets a fresh in-memory ledger seeded with two accounts and
//! three tokens, a record manager that keeps what it is handed, and fee
//! collaborators that price every call at 684 gas.

#![allow(dead_code, unreachable_pub)]

use alloy_primitives::{Address, Bytes};
use hts_precompile::{
    auth::SignatureOracle,
    error::{LogicError, StoreError},
    frame::ParentFrame,
    ledger::{LedgerChanges, LedgerStore, RelKey, WorldLedgers},
    logic::{LedgerTokenLogic, MintOutcome, TokenLogic},
    pricing::{CanonicalPriceTable, ExchangeRate, ExchangeRates, FeeCalculator, FeeObject},
    records::RecordsHistorian,
    CallFrame, Host, HtsConfig, HtsPrecompile, SettlementError, SettlementResult,
    HTS_PRECOMPILE_ADDRESS,
};
use hts_primitives::{
    Account, AccountAmount, AccountId, ContractId, CryptoAllowance, Key, NativeFunction,
    NftAllowance, NftId, NftRemoveAllowance, SyntheticTransaction, Timestamp, Token,
    TokenAllowance, TokenAssociationBody, TokenBurnBody, TokenCreateBody, TokenId, TokenKeys,
    TokenMintBody, TokenRelationship, TokenTransferList, TokenType, TokenUpdateBody,
    TokenWipeBody, TransactionRecord, UniqueToken,
};
use std::{collections::BTreeMap, sync::Arc};

/// Contract account making most calls; its key names itself.
pub const SENDER: AccountId = AccountId::from_num(1001);
/// Externally owned account with an Ed25519 key.
pub const ALICE: AccountId = AccountId::from_num(1002);
/// Fungible token treasured by [`SENDER`].
pub const FUNGIBLE: TokenId = TokenId::from_num(0x482);
/// NFT collection treasured by [`SENDER`], serial 1 minted.
pub const NFT: TokenId = TokenId::from_num(0x483);
/// Fungible token nobody is associated with.
pub const OTHER: TokenId = TokenId::from_num(0x484);

/// Gas every call costs under [`FixedFees`].
pub const EXPECTED_GAS: u64 = 684;
/// Consensus time of every frame.
pub const CONSENSUS_SECONDS: i64 = 1_700_000_000;

/// Installs a test log writer once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn alice_key() -> Key {
    Key::Ed25519(Bytes::from(vec![0xa1; Key::ED25519_LEN]))
}

pub fn identity(address: Address) -> Address {
    address
}

/// In-memory ledger counting how often changes were applied.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub accounts: BTreeMap<AccountId, Account>,
    pub tokens: BTreeMap<TokenId, Token>,
    pub rels: BTreeMap<RelKey, TokenRelationship>,
    pub nfts: BTreeMap<NftId, UniqueToken>,
    pub next_entity: u64,
    pub applied: usize,
}

fn merge<K: Ord, V>(table: &mut BTreeMap<K, V>, changes: BTreeMap<K, Option<V>>) {
    for (key, row) in changes {
        match row {
            Some(row) => {
                table.insert(key, row);
            }
            None => {
                table.remove(&key);
            }
        }
    }
}

impl LedgerStore for MemoryStore {
    fn account(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get(id).cloned()
    }

    fn token(&self, id: &TokenId) -> Option<Token> {
        self.tokens.get(id).cloned()
    }

    fn token_rel(&self, key: &RelKey) -> Option<TokenRelationship> {
        self.rels.get(key).copied()
    }

    fn nft(&self, id: &NftId) -> Option<UniqueToken> {
        self.nfts.get(id).cloned()
    }

    fn peek_next_entity_num(&self) -> u64 {
        self.next_entity
    }

    fn apply(&mut self, changes: LedgerChanges) -> Result<(), StoreError> {
        merge(&mut self.accounts, changes.accounts);
        merge(&mut self.tokens, changes.tokens);
        merge(&mut self.rels, changes.token_rels);
        merge(&mut self.nfts, changes.nfts);
        self.next_entity += changes.entities_created;
        self.applied += 1;
        Ok(())
    }
}

impl MemoryStore {
    /// Ledger shared by the settlement tests.
    pub fn seeded() -> Self {
        let mut store = Self {
            next_entity: 5000,
            ..Default::default()
        };
        store.accounts.insert(
            SENDER,
            Account {
                id: SENDER,
                key: Some(Key::ContractId(ContractId::from_num(1001))),
                smart_contract: true,
                ..Default::default()
            },
        );
        store.accounts.insert(
            ALICE,
            Account {
                id: ALICE,
                key: Some(alice_key()),
                ..Default::default()
            },
        );

        let supply = TokenKeys {
            supply: Some(Key::ContractId(ContractId::from_num(1001))),
            ..Default::default()
        };
        store.tokens.insert(
            FUNGIBLE,
            Token {
                id: FUNGIBLE,
                name: "Gold".into(),
                symbol: "AU".into(),
                treasury: SENDER,
                decimals: 2,
                total_supply: 1000,
                keys: supply.clone(),
                ..Default::default()
            },
        );
        store.tokens.insert(
            NFT,
            Token {
                id: NFT,
                token_type: TokenType::NonFungibleUnique,
                name: "Art".into(),
                symbol: "ART".into(),
                treasury: SENDER,
                total_supply: 1,
                last_used_serial: 1,
                keys: supply,
                ..Default::default()
            },
        );
        store.tokens.insert(
            OTHER,
            Token {
                id: OTHER,
                name: "Silver".into(),
                symbol: "AG".into(),
                treasury: ALICE,
                ..Default::default()
            },
        );

        let granted = TokenRelationship {
            kyc_granted: true,
            ..Default::default()
        };
        let holding = |balance| TokenRelationship { balance, ..granted };
        store.rels.insert((SENDER, FUNGIBLE), holding(1000));
        store.rels.insert((SENDER, NFT), holding(1));
        store.rels.insert((ALICE, OTHER), granted);
        store.nfts.insert(
            NftId::new(NFT, 1),
            UniqueToken {
                id: NftId::new(NFT, 1),
                owner: SENDER,
                metadata: Bytes::from_static(b"ipfs://art/1"),
                ..Default::default()
            },
        );
        store
    }
}

/// Keeps every record it is handed.
#[derive(Debug, Default)]
pub struct RecordingHistorian {
    pub records: Vec<(TransactionRecord, SyntheticTransaction)>,
}

impl RecordsHistorian for RecordingHistorian {
    fn manage_in_progress_record(&mut self, record: TransactionRecord, txn: SyntheticTransaction) {
        self.records.push((record, txn));
    }
}

impl RecordingHistorian {
    pub fn only(&self) -> &TransactionRecord {
        assert_eq!(self.records.len(), 1, "expected exactly one record");
        &self.records[0].0
    }
}

/// Keys that signed the parent transaction.
#[derive(Debug, Default)]
pub struct Signatures(pub Vec<Key>);

impl SignatureOracle for Signatures {
    fn has_signed(&self, key: &Key) -> bool {
        self.0.contains(key)
    }
}

/// Prices every call at the same fee and gas price.
#[derive(Debug, Clone, Copy)]
pub struct FixedFees {
    pub fee: FeeObject,
    pub gas_price: u64,
}

impl Default for FixedFees {
    fn default() -> Self {
        Self {
            fee: FeeObject {
                node_fee: 300_000,
                network_fee: 400_000,
                service_fee: 5_000_000,
            },
            gas_price: 10_000,
        }
    }
}

impl FeeCalculator for FixedFees {
    fn compute_fee(
        &self,
        _txn: &SyntheticTransaction,
        _payer: AccountId,
        _now: Timestamp,
    ) -> FeeObject {
        self.fee
    }

    fn estimate_payment(&self, _function: NativeFunction, _now: Timestamp) -> FeeObject {
        self.fee
    }

    fn estimated_gas_price_in_tinybars(&self, _function: NativeFunction, _now: Timestamp) -> u64 {
        self.gas_price
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedRate(pub ExchangeRate);

impl Default for FixedRate {
    fn default() -> Self {
        Self(ExchangeRate {
            hbar_equiv: 1,
            cent_equiv: 12,
        })
    }
}

impl ExchangeRates for FixedRate {
    fn rate_at(&self, _now: Timestamp) -> ExchangeRate {
        self.0
    }
}

/// Ledger logic that can be told to fail every association.
#[derive(Debug, Default)]
pub struct FailingLogic {
    pub inner: LedgerTokenLogic,
    pub associate_error: Option<LogicError>,
}

impl FailingLogic {
    pub fn failing(error: LogicError) -> Self {
        Self {
            inner: LedgerTokenLogic,
            associate_error: Some(error),
        }
    }
}

impl TokenLogic for FailingLogic {
    fn associate(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenAssociationBody,
    ) -> Result<(), LogicError> {
        match &self.associate_error {
            Some(error) => Err(error.clone()),
            None => self.inner.associate(ledgers, body),
        }
    }

    fn dissociate(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenAssociationBody,
    ) -> Result<(), LogicError> {
        self.inner.dissociate(ledgers, body)
    }

    fn mint(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenMintBody,
        now: Timestamp,
    ) -> Result<MintOutcome, LogicError> {
        self.inner.mint(ledgers, body, now)
    }

    fn burn(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenBurnBody,
    ) -> Result<i64, LogicError> {
        self.inner.burn(ledgers, body)
    }

    fn wipe(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenWipeBody,
    ) -> Result<i64, LogicError> {
        self.inner.wipe(ledgers, body)
    }

    fn pause(&self, ledgers: &mut WorldLedgers<'_>, token: TokenId) -> Result<(), LogicError> {
        self.inner.pause(ledgers, token)
    }

    fn unpause(&self, ledgers: &mut WorldLedgers<'_>, token: TokenId) -> Result<(), LogicError> {
        self.inner.unpause(ledgers, token)
    }

    fn create(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenCreateBody,
        now: Timestamp,
    ) -> Result<TokenId, LogicError> {
        self.inner.create(ledgers, body, now)
    }

    fn update(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenUpdateBody,
    ) -> Result<(), LogicError> {
        self.inner.update(ledgers, body)
    }

    fn crypto_transfer(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        hbar: &[AccountAmount],
        tokens: &[TokenTransferList],
        spender: AccountId,
    ) -> Result<(), LogicError> {
        self.inner.crypto_transfer(ledgers, hbar, tokens, spender)
    }

    fn approve_allowances(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        crypto: &[CryptoAllowance],
        fungible: &[TokenAllowance],
        nft: &[NftAllowance],
    ) -> Result<(), LogicError> {
        self.inner.approve_allowances(ledgers, crypto, fungible, nft)
    }

    fn delete_allowances(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        payer: AccountId,
        removals: &[NftRemoveAllowance],
    ) -> Result<(), LogicError> {
        self.inner.delete_allowances(ledgers, payer, removals)
    }
}

/// Top-level frame called by [`SENDER`] with plenty of gas.
pub fn frame() -> CallFrame {
    let sender = SENDER.to_evm_address();
    CallFrame {
        sender,
        contract: HTS_PRECOMPILE_ADDRESS,
        recipient: HTS_PRECOMPILE_ADDRESS,
        remaining_gas: 1_000_000,
        consensus_time: Timestamp::from_seconds(CONSENSUS_SECONDS),
        parent: Some(ParentFrame {
            contract: sender,
            recipient: sender,
        }),
        ..Default::default()
    }
}

/// A precompile wired to the seeded ledger and fixed-price collaborators.
pub struct Harness {
    pub store: MemoryStore,
    pub records: RecordingHistorian,
    pub signatures: Signatures,
    pub precompile: HtsPrecompile,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(HtsConfig::default(), Arc::new(LedgerTokenLogic))
    }

    pub fn with_config(config: HtsConfig) -> Self {
        Self::with(config, Arc::new(LedgerTokenLogic))
    }

    pub fn with(config: HtsConfig, logic: Arc<dyn TokenLogic + Send + Sync>) -> Self {
        init_tracing();
        Self {
            store: MemoryStore::seeded(),
            records: RecordingHistorian::default(),
            signatures: Signatures::default(),
            precompile: HtsPrecompile::new(
                config,
                logic,
                Arc::new(FixedFees::default()),
                Arc::new(FixedRate::default()),
                CanonicalPriceTable::default(),
            ),
        }
    }

    pub fn call(
        &mut self,
        input: &[u8],
        frame: &mut CallFrame,
    ) -> Result<SettlementResult, SettlementError> {
        let host = Host {
            ledgers: Some(&mut self.store),
            aliases: &identity,
            records: Some(&mut self.records),
            signatures: &self.signatures,
        };
        self.precompile.compute(input, frame, host)
    }

    /// Calls from the default frame, failing the test on a fatal error.
    pub fn run(&mut self, input: &[u8]) -> (SettlementResult, CallFrame) {
        let mut frame = frame();
        let result = match self.call(input, &mut frame) {
            Ok(result) => result,
            Err(err) => panic!("settlement failed: {err}"),
        };
        (result, frame)
    }
}
