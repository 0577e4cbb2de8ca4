//! Business logic behind each operation family.
//!
//! [`TokenLogic`] is the seam the settlement controller calls through; every
//! method stages its writes on the invocation's [`WorldLedgers`] and either
//! returns a typed outcome or a [`LogicError`]. Nothing reaches the store
//! unless the controller later commits the view.
//!
//! [`LedgerTokenLogic`] applies the native ledger rules directly against the
//! view and is what hosts without their own transition logic plug in.

use crate::{error::LogicError, ledger::WorldLedgers};
use hts_primitives::{
    Account, AccountAmount, AccountId, CryptoAllowance, Expiry, NftAllowance, NftId,
    NftRemoveAllowance, ResponseCode, SupplyType, SyntheticTransaction, Timestamp, Token,
    TokenAllowance, TokenAssociationBody, TokenBurnBody, TokenCreateBody, TokenId, TokenKeys,
    TokenMintBody, TokenRelationship, TokenTransferList, TokenType, TokenUpdateBody,
    TokenWipeBody, TransactionBody, UniqueToken,
};

/// Result of a mint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MintOutcome {
    /// Total supply after the mint.
    pub new_total_supply: i64,
    /// Serials assigned, for NFT mints.
    pub serials: Vec<i64>,
}

/// Typed outcome of a successful state-changing operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Execution {
    /// Completed with nothing to report beyond the status.
    Completed,
    /// Units or NFTs were minted.
    Minted(MintOutcome),
    /// A burn or wipe changed the total supply.
    SupplyChanged {
        /// Total supply after the change.
        new_total_supply: i64,
    },
    /// A token was created.
    Created(TokenId),
}

/// Native transition logic, one method per operation family.
pub trait TokenLogic {
    /// Associates `body.tokens` with `body.account`.
    fn associate(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenAssociationBody,
    ) -> Result<(), LogicError>;

    /// Dissociates `body.tokens` from `body.account`.
    fn dissociate(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenAssociationBody,
    ) -> Result<(), LogicError>;

    /// Mints fungible units or NFTs into the treasury.
    fn mint(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenMintBody,
        now: Timestamp,
    ) -> Result<MintOutcome, LogicError>;

    /// Burns from the treasury, returning the new total supply.
    fn burn(&self, ledgers: &mut WorldLedgers<'_>, body: &TokenBurnBody) -> Result<i64, LogicError>;

    /// Wipes from a non-treasury account, returning the new total supply.
    fn wipe(&self, ledgers: &mut WorldLedgers<'_>, body: &TokenWipeBody) -> Result<i64, LogicError>;

    /// Pauses a token.
    fn pause(&self, ledgers: &mut WorldLedgers<'_>, token: TokenId) -> Result<(), LogicError>;

    /// Lifts a token pause.
    fn unpause(&self, ledgers: &mut WorldLedgers<'_>, token: TokenId) -> Result<(), LogicError>;

    /// Creates a token, returning its id.
    fn create(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenCreateBody,
        now: Timestamp,
    ) -> Result<TokenId, LogicError>;

    /// Updates token properties, keys or expiry.
    fn update(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenUpdateBody,
    ) -> Result<(), LogicError>;

    /// Applies hbar and token adjustments; approval debits draw on
    /// allowances granted to `spender`.
    fn crypto_transfer(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        hbar: &[AccountAmount],
        tokens: &[TokenTransferList],
        spender: AccountId,
    ) -> Result<(), LogicError>;

    /// Grants allowances.
    fn approve_allowances(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        crypto: &[CryptoAllowance],
        fungible: &[TokenAllowance],
        nft: &[NftAllowance],
    ) -> Result<(), LogicError>;

    /// Clears NFT spenders on behalf of `payer`, who must own each serial or
    /// operate for its owner.
    fn delete_allowances(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        payer: AccountId,
        removals: &[NftRemoveAllowance],
    ) -> Result<(), LogicError>;
}

/// Routes `txn` to the matching [`TokenLogic`] method.
pub fn execute(
    logic: &dyn TokenLogic,
    ledgers: &mut WorldLedgers<'_>,
    txn: &SyntheticTransaction,
    sender: AccountId,
    now: Timestamp,
) -> Result<Execution, LogicError> {
    match &txn.body {
        TransactionBody::TokenAssociate(body) => completed(logic.associate(ledgers, body)),
        TransactionBody::TokenDissociate(body) => completed(logic.dissociate(ledgers, body)),
        TransactionBody::TokenMint(body) => logic.mint(ledgers, body, now).map(Execution::Minted),
        TransactionBody::TokenBurn(body) => supply_changed(logic.burn(ledgers, body)),
        TransactionBody::TokenWipe(body) => supply_changed(logic.wipe(ledgers, body)),
        TransactionBody::TokenPause(token) => completed(logic.pause(ledgers, *token)),
        TransactionBody::TokenUnpause(token) => completed(logic.unpause(ledgers, *token)),
        TransactionBody::TokenCreate(body) => {
            logic.create(ledgers, body, now).map(Execution::Created)
        }
        TransactionBody::TokenUpdate(body) => completed(logic.update(ledgers, body)),
        TransactionBody::CryptoTransfer { hbar_transfers, token_transfers } => {
            completed(logic.crypto_transfer(ledgers, hbar_transfers, token_transfers, sender))
        }
        TransactionBody::CryptoApproveAllowance { crypto, fungible, nft } => {
            completed(logic.approve_allowances(ledgers, crypto, fungible, nft))
        }
        TransactionBody::CryptoDeleteAllowance(removals) => {
            completed(logic.delete_allowances(ledgers, sender, removals))
        }
        TransactionBody::TokenQuery(_) => {
            Err(LogicError::Other("queries are answered by views".into()))
        }
    }
}

fn completed(result: Result<(), LogicError>) -> Result<Execution, LogicError> {
    result.map(|()| Execution::Completed)
}

fn supply_changed(result: Result<i64, LogicError>) -> Result<Execution, LogicError> {
    result.map(|new_total_supply| Execution::SupplyChanged { new_total_supply })
}

/// Ledger-backed [`TokenLogic`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LedgerTokenLogic;

const fn fail(code: ResponseCode) -> LogicError {
    LogicError::Status(code)
}

fn live_account(ledgers: &WorldLedgers<'_>, id: &AccountId) -> Result<Account, LogicError> {
    let account = ledgers
        .account(id)
        .ok_or(fail(ResponseCode::InvalidAccountId))?;
    if account.deleted {
        return Err(fail(ResponseCode::AccountDeleted));
    }
    Ok(account)
}

fn existing_token(ledgers: &WorldLedgers<'_>, id: &TokenId) -> Result<Token, LogicError> {
    let token = ledgers.token(id).ok_or(fail(ResponseCode::InvalidTokenId))?;
    if token.deleted {
        return Err(fail(ResponseCode::TokenWasDeleted));
    }
    Ok(token)
}

fn usable_token(ledgers: &WorldLedgers<'_>, id: &TokenId) -> Result<Token, LogicError> {
    let token = existing_token(ledgers, id)?;
    if token.paused {
        return Err(fail(ResponseCode::TokenIsPaused));
    }
    Ok(token)
}

fn relationship(
    ledgers: &WorldLedgers<'_>,
    account: &AccountId,
    token: &TokenId,
) -> Result<TokenRelationship, LogicError> {
    ledgers
        .token_rel(account, token)
        .ok_or(fail(ResponseCode::TokenNotAssociatedToAccount))
}

/// Relationship that may send or receive units.
fn usable_relationship(
    ledgers: &WorldLedgers<'_>,
    account: &AccountId,
    token: &TokenId,
) -> Result<TokenRelationship, LogicError> {
    let rel = relationship(ledgers, account, token)?;
    if rel.frozen {
        return Err(fail(ResponseCode::AccountFrozenForToken));
    }
    if !rel.kyc_granted {
        return Err(fail(ResponseCode::AccountKycNotGrantedForToken));
    }
    Ok(rel)
}

fn adjust(balance: i64, delta: i64, insufficient: ResponseCode) -> Result<i64, LogicError> {
    match balance.checked_add(delta) {
        Some(updated) if updated >= 0 => Ok(updated),
        _ => Err(fail(insufficient)),
    }
}

fn count(items: usize) -> i64 {
    i64::try_from(items).unwrap_or(i64::MAX)
}

fn merge_keys(current: &mut TokenKeys, replacement: &TokenKeys) {
    let slots = [
        (&mut current.admin, &replacement.admin),
        (&mut current.kyc, &replacement.kyc),
        (&mut current.freeze, &replacement.freeze),
        (&mut current.wipe, &replacement.wipe),
        (&mut current.supply, &replacement.supply),
        (&mut current.fee_schedule, &replacement.fee_schedule),
        (&mut current.pause, &replacement.pause),
    ];
    for (slot, new) in slots {
        if new.is_some() {
            slot.clone_from(new);
        }
    }
}

/// Draws `amount` from an allowance, removing it once exhausted.
fn draw_allowance<K: Ord>(
    allowances: &mut std::collections::BTreeMap<K, i64>,
    key: K,
    amount: i64,
) -> Result<(), LogicError> {
    let granted = allowances
        .get(&key)
        .copied()
        .ok_or(fail(ResponseCode::SpenderDoesNotHaveAllowance))?;
    if granted < amount {
        return Err(fail(ResponseCode::AmountExceedsAllowance));
    }
    if granted == amount {
        allowances.remove(&key);
    } else {
        allowances.insert(key, granted - amount);
    }
    Ok(())
}

impl TokenLogic for LedgerTokenLogic {
    fn associate(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenAssociationBody,
    ) -> Result<(), LogicError> {
        live_account(ledgers, &body.account)?;
        for id in &body.tokens {
            let token = existing_token(ledgers, id)?;
            if ledgers.token_rel(&body.account, id).is_some() {
                return Err(fail(ResponseCode::TokenAlreadyAssociatedToAccount));
            }
            let rel = TokenRelationship {
                balance: 0,
                frozen: token.freeze_default && token.keys.freeze.is_some(),
                kyc_granted: token.keys.kyc.is_none(),
                automatic_association: false,
            };
            ledgers.put_token_rel(body.account, *id, rel);
        }
        Ok(())
    }

    fn dissociate(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenAssociationBody,
    ) -> Result<(), LogicError> {
        live_account(ledgers, &body.account)?;
        for id in &body.tokens {
            let rel = relationship(ledgers, &body.account, id)?;
            if let Some(token) = ledgers.token(id).filter(|token| !token.deleted) {
                if token.treasury == body.account {
                    return Err(fail(ResponseCode::AccountIsTreasury));
                }
                if rel.balance != 0 {
                    return Err(fail(ResponseCode::TransactionRequiresZeroTokenBalances));
                }
            }
            ledgers.remove_token_rel(body.account, *id);
        }
        Ok(())
    }

    fn mint(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenMintBody,
        now: Timestamp,
    ) -> Result<MintOutcome, LogicError> {
        let mut token = usable_token(ledgers, &body.token)?;
        let mut treasury = relationship(ledgers, &token.treasury, &token.id)?;
        let mut serials = Vec::new();

        let minted = match token.token_type {
            TokenType::FungibleCommon => {
                if !body.metadata.is_empty() || body.amount <= 0 {
                    return Err(fail(ResponseCode::InvalidTokenMintAmount));
                }
                body.amount
            }
            TokenType::NonFungibleUnique => {
                if body.amount != 0 || body.metadata.is_empty() {
                    return Err(fail(ResponseCode::InvalidTokenMintAmount));
                }
                for metadata in &body.metadata {
                    token.last_used_serial += 1;
                    let id = NftId::new(token.id, token.last_used_serial);
                    ledgers.put_nft(UniqueToken {
                        id,
                        owner: token.treasury,
                        spender: None,
                        metadata: metadata.clone(),
                        creation_time: now,
                    });
                    serials.push(id.serial);
                }
                count(body.metadata.len())
            }
        };

        let invalid = ResponseCode::InvalidTokenMintAmount;
        token.total_supply = adjust(token.total_supply, minted, invalid)?;
        if token.supply_type == SupplyType::Finite && token.total_supply > token.max_supply {
            return Err(fail(invalid));
        }
        treasury.balance = adjust(treasury.balance, minted, invalid)?;
        let new_total_supply = token.total_supply;
        ledgers.put_token_rel(token.treasury, token.id, treasury);
        ledgers.put_token(token);
        Ok(MintOutcome {
            new_total_supply,
            serials,
        })
    }

    fn burn(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenBurnBody,
    ) -> Result<i64, LogicError> {
        let mut token = usable_token(ledgers, &body.token)?;
        let mut treasury = relationship(ledgers, &token.treasury, &token.id)?;

        let burned = match token.token_type {
            TokenType::FungibleCommon => {
                if !body.serial_numbers.is_empty() || body.amount <= 0 {
                    return Err(fail(ResponseCode::InvalidTokenBurnAmount));
                }
                body.amount
            }
            TokenType::NonFungibleUnique => {
                if body.amount != 0 || body.serial_numbers.is_empty() {
                    return Err(fail(ResponseCode::InvalidTokenBurnAmount));
                }
                for serial in &body.serial_numbers {
                    let id = NftId::new(token.id, *serial);
                    match ledgers.nft(&id) {
                        Some(nft) if nft.owner == token.treasury => ledgers.remove_nft(id),
                        _ => return Err(fail(ResponseCode::InvalidNftId)),
                    }
                }
                count(body.serial_numbers.len())
            }
        };

        let insufficient = ResponseCode::InsufficientTokenBalance;
        let invalid = ResponseCode::InvalidTokenBurnAmount;
        treasury.balance = adjust(treasury.balance, -burned, insufficient)?;
        token.total_supply = adjust(token.total_supply, -burned, invalid)?;
        let new_total_supply = token.total_supply;
        ledgers.put_token_rel(token.treasury, token.id, treasury);
        ledgers.put_token(token);
        Ok(new_total_supply)
    }

    fn wipe(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenWipeBody,
    ) -> Result<i64, LogicError> {
        let mut token = usable_token(ledgers, &body.token)?;
        live_account(ledgers, &body.account)?;
        if body.account == token.treasury {
            return Err(fail(ResponseCode::CannotWipeTokenTreasuryAccount));
        }
        let mut rel = relationship(ledgers, &body.account, &token.id)?;

        let wiped = match token.token_type {
            TokenType::FungibleCommon => {
                if !body.serial_numbers.is_empty() || body.amount <= 0 {
                    return Err(fail(ResponseCode::InvalidWipingAmount));
                }
                body.amount
            }
            TokenType::NonFungibleUnique => {
                if body.amount != 0 || body.serial_numbers.is_empty() {
                    return Err(fail(ResponseCode::InvalidWipingAmount));
                }
                for serial in &body.serial_numbers {
                    let id = NftId::new(token.id, *serial);
                    match ledgers.nft(&id) {
                        Some(nft) if nft.owner == body.account => ledgers.remove_nft(id),
                        _ => return Err(fail(ResponseCode::InvalidNftId)),
                    }
                }
                count(body.serial_numbers.len())
            }
        };

        let invalid = ResponseCode::InvalidWipingAmount;
        rel.balance = adjust(rel.balance, -wiped, invalid)?;
        token.total_supply = adjust(token.total_supply, -wiped, invalid)?;
        let new_total_supply = token.total_supply;
        ledgers.put_token_rel(body.account, token.id, rel);
        ledgers.put_token(token);
        Ok(new_total_supply)
    }

    fn pause(&self, ledgers: &mut WorldLedgers<'_>, token: TokenId) -> Result<(), LogicError> {
        let mut token = existing_token(ledgers, &token)?;
        token.paused = true;
        ledgers.put_token(token);
        Ok(())
    }

    fn unpause(&self, ledgers: &mut WorldLedgers<'_>, token: TokenId) -> Result<(), LogicError> {
        let mut token = existing_token(ledgers, &token)?;
        token.paused = false;
        ledgers.put_token(token);
        Ok(())
    }

    fn create(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenCreateBody,
        now: Timestamp,
    ) -> Result<TokenId, LogicError> {
        let treasury = live_account(ledgers, &body.treasury)
            .map_err(|_| fail(ResponseCode::InvalidTreasuryAccountForToken))?;
        if let Some(auto_renew) = &body.expiry.auto_renew_account {
            live_account(ledgers, auto_renew)?;
        }
        let decimals = u32::try_from(body.decimals)
            .map_err(|_| fail(ResponseCode::InvalidTokenDecimals))?;

        let num = ledgers.allocate_entity_num();
        let id = TokenId::new(treasury.id.shard, treasury.id.realm, num);
        let expiry = if body.expiry.second == 0 {
            Expiry {
                second: now.seconds.saturating_add(body.expiry.auto_renew_period),
                ..body.expiry
            }
        } else {
            body.expiry
        };
        ledgers.put_token(Token {
            id,
            token_type: body.token_type,
            supply_type: body.supply_type,
            name: body.name.clone(),
            symbol: body.symbol.clone(),
            memo: body.memo.clone(),
            treasury: body.treasury,
            decimals,
            total_supply: body.initial_supply,
            max_supply: body.max_supply,
            freeze_default: body.freeze_default,
            kyc_granted_by_default: body.keys.kyc.is_none(),
            keys: body.keys.clone(),
            expiry,
            custom_fees: body.custom_fees.clone(),
            paused: false,
            deleted: false,
            last_used_serial: 0,
        });
        let treasury_rel = TokenRelationship {
            balance: body.initial_supply,
            frozen: false,
            kyc_granted: true,
            automatic_association: false,
        };
        ledgers.put_token_rel(body.treasury, id, treasury_rel);
        Ok(id)
    }

    fn update(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        body: &TokenUpdateBody,
    ) -> Result<(), LogicError> {
        let mut token = usable_token(ledgers, &body.token)?;
        if let Some(name) = &body.name {
            token.name.clone_from(name);
        }
        if let Some(symbol) = &body.symbol {
            token.symbol.clone_from(symbol);
        }
        if let Some(memo) = &body.memo {
            token.memo.clone_from(memo);
        }
        if let Some(new_treasury) = body.treasury.filter(|treasury| *treasury != token.treasury) {
            live_account(ledgers, &new_treasury)?;
            let mut incoming = usable_relationship(ledgers, &new_treasury, &token.id)?;
            if token.token_type == TokenType::FungibleCommon {
                let mut outgoing = relationship(ledgers, &token.treasury, &token.id)?;
                let invalid = ResponseCode::InvalidAccountAmounts;
                incoming.balance = adjust(incoming.balance, outgoing.balance, invalid)?;
                outgoing.balance = 0;
                ledgers.put_token_rel(token.treasury, token.id, outgoing);
                ledgers.put_token_rel(new_treasury, token.id, incoming);
            }
            token.treasury = new_treasury;
        }
        merge_keys(&mut token.keys, &body.keys);
        if let Some(second) = body.expiry {
            token.expiry.second = second;
        }
        if let Some(account) = body.auto_renew_account {
            live_account(ledgers, &account)?;
            token.expiry.auto_renew_account = Some(account);
        }
        if let Some(period) = body.auto_renew_period {
            token.expiry.auto_renew_period = period;
        }
        ledgers.put_token(token);
        Ok(())
    }

    fn crypto_transfer(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        hbar: &[AccountAmount],
        tokens: &[TokenTransferList],
        spender: AccountId,
    ) -> Result<(), LogicError> {
        for adjustment in hbar {
            let mut account = live_account(ledgers, &adjustment.account)?;
            if adjustment.is_approval && adjustment.amount < 0 {
                draw_allowance(&mut account.crypto_allowances, spender, -adjustment.amount)?;
            }
            let insufficient = ResponseCode::InsufficientAccountBalance;
            account.balance = adjust(account.balance, adjustment.amount, insufficient)?;
            ledgers.put_account(account);
        }

        for list in tokens {
            let token = usable_token(ledgers, &list.token)?;
            let fungible = token.token_type == TokenType::FungibleCommon;
            let misplaced = if fungible {
                !list.nft_transfers.is_empty()
            } else {
                !list.transfers.is_empty()
            };
            if misplaced {
                return Err(fail(ResponseCode::InvalidTransactionBody));
            }

            for adjustment in &list.transfers {
                let mut owner = live_account(ledgers, &adjustment.account)?;
                let mut rel = usable_relationship(ledgers, &adjustment.account, &token.id)?;
                if adjustment.is_approval && adjustment.amount < 0 {
                    let key = (token.id, spender);
                    draw_allowance(&mut owner.fungible_allowances, key, -adjustment.amount)?;
                    ledgers.put_account(owner);
                }
                let insufficient = ResponseCode::InsufficientTokenBalance;
                rel.balance = adjust(rel.balance, adjustment.amount, insufficient)?;
                ledgers.put_token_rel(adjustment.account, token.id, rel);
            }

            for nft in &list.nft_transfers {
                let id = NftId::new(token.id, nft.serial);
                let mut unique = ledgers.nft(&id).ok_or(fail(ResponseCode::InvalidNftId))?;
                if unique.owner != nft.sender {
                    return Err(fail(ResponseCode::InsufficientTokenBalance));
                }
                if nft.is_approval {
                    let owner = live_account(ledgers, &nft.sender)?;
                    let approved = unique.spender == Some(spender)
                        || owner.approve_for_all.contains(&(token.id, spender));
                    if !approved {
                        return Err(fail(ResponseCode::SpenderDoesNotHaveAllowance));
                    }
                }
                live_account(ledgers, &nft.receiver)?;
                let mut from = usable_relationship(ledgers, &nft.sender, &token.id)?;
                let mut to = usable_relationship(ledgers, &nft.receiver, &token.id)?;
                from.balance = adjust(from.balance, -1, ResponseCode::InsufficientTokenBalance)?;
                to.balance = adjust(to.balance, 1, ResponseCode::InvalidAccountAmounts)?;
                ledgers.put_token_rel(nft.sender, token.id, from);
                ledgers.put_token_rel(nft.receiver, token.id, to);
                unique.owner = nft.receiver;
                unique.spender = None;
                ledgers.put_nft(unique);
            }
        }
        Ok(())
    }

    fn approve_allowances(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        crypto: &[CryptoAllowance],
        fungible: &[TokenAllowance],
        nft: &[NftAllowance],
    ) -> Result<(), LogicError> {
        for grant in crypto {
            let mut owner = live_account(ledgers, &grant.owner)?;
            live_account(ledgers, &grant.spender)?;
            if grant.amount == 0 {
                owner.crypto_allowances.remove(&grant.spender);
            } else {
                owner.crypto_allowances.insert(grant.spender, grant.amount);
            }
            ledgers.put_account(owner);
        }

        for grant in fungible {
            let mut owner = live_account(ledgers, &grant.owner)?;
            let token = usable_token(ledgers, &grant.token)?;
            if token.token_type != TokenType::FungibleCommon {
                return Err(fail(ResponseCode::InvalidTransactionBody));
            }
            relationship(ledgers, &grant.owner, &token.id)?;
            if grant.amount == 0 {
                owner.fungible_allowances.remove(&(token.id, grant.spender));
            } else {
                owner.fungible_allowances.insert((token.id, grant.spender), grant.amount);
            }
            ledgers.put_account(owner);
        }

        for grant in nft {
            let mut owner = live_account(ledgers, &grant.owner)?;
            let token = usable_token(ledgers, &grant.token)?;
            if token.token_type != TokenType::NonFungibleUnique {
                return Err(fail(ResponseCode::InvalidTransactionBody));
            }
            relationship(ledgers, &grant.owner, &token.id)?;
            if let Some(delegating) = grant.delegating_spender {
                if !owner.approve_for_all.contains(&(token.id, delegating)) {
                    return Err(fail(ResponseCode::SpenderDoesNotHaveAllowance));
                }
            }
            for serial in &grant.serial_numbers {
                let id = NftId::new(token.id, *serial);
                let mut unique = ledgers.nft(&id).ok_or(fail(ResponseCode::InvalidNftId))?;
                if unique.owner != grant.owner {
                    return Err(fail(ResponseCode::InvalidNftId));
                }
                unique.spender = Some(grant.spender);
                ledgers.put_nft(unique);
            }
            match grant.approved_for_all {
                Some(true) => {
                    owner.approve_for_all.insert((token.id, grant.spender));
                }
                Some(false) => {
                    owner.approve_for_all.remove(&(token.id, grant.spender));
                }
                None => {}
            }
            ledgers.put_account(owner);
        }
        Ok(())
    }

    fn delete_allowances(
        &self,
        ledgers: &mut WorldLedgers<'_>,
        payer: AccountId,
        removals: &[NftRemoveAllowance],
    ) -> Result<(), LogicError> {
        for removal in removals {
            let token = usable_token(ledgers, &removal.token)?;
            if payer != removal.owner {
                let owner = live_account(ledgers, &removal.owner)?;
                if !owner.approve_for_all.contains(&(token.id, payer)) {
                    return Err(fail(ResponseCode::SenderDoesNotOwnNftSerialNo));
                }
            }
            for serial in &removal.serial_numbers {
                let id = NftId::new(token.id, *serial);
                let mut unique = ledgers.nft(&id).ok_or(fail(ResponseCode::InvalidNftId))?;
                let holder = if unique.owner.is_zero() {
                    token.treasury
                } else {
                    unique.owner
                };
                if holder != removal.owner {
                    return Err(fail(ResponseCode::SenderDoesNotOwnNftSerialNo));
                }
                unique.spender = None;
                ledgers.put_nft(unique);
            }
        }
        Ok(())
    }
}
