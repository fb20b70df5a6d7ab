//! In-memory ledger that answers the fixture RPC commands.
//!
//! Transactions apply to the open ledger immediately (as on a standalone
//! node) and `ledger_accept` moves the open transaction set into a closed
//! ledger. Failure injection hooks let tests script read misses, rejected
//! offers and node errors per account.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;

use super::rpc::{
    ACCOUNT_NOT_FOUND, AccountInfo, AccountOffer, AccountRoot, LedgerRpc, RpcError, RpcHandle,
};
use crate::{
    tx::{Drops, SubmitOptions, SubmitResult, TES_SUCCESS, Transaction, TxKind},
    wallet::Wallet,
};

/// Open ledger index of a freshly started standalone node.
pub const FIRST_OPEN_LEDGER: u32 = 2;

/// Fee charged when a submission asks for autofill.
pub const FAKE_BASE_FEE: Drops = Drops::new(10);

/// Error a regular-privilege port answers sign-and-submit requests with when
/// `signing_support` is off.
pub const SIGNING_NOT_SUPPORTED: &str = "notSupported";

#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<State>,
}

struct State {
    current_index: u32,
    open: Vec<String>,
    closed: BTreeMap<u32, Vec<String>>,
    accounts: HashMap<String, FakeAccount>,
    submissions: Vec<Transaction>,
    account_info_failures: HashMap<String, (usize, String)>,
    account_offers_failures: HashMap<String, String>,
    submit_failures: HashMap<String, String>,
    offer_rejections: HashMap<String, String>,
    tx_counter: u64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            current_index: FIRST_OPEN_LEDGER,
            open: Vec::new(),
            closed: BTreeMap::new(),
            accounts: HashMap::new(),
            submissions: Vec::new(),
            account_info_failures: HashMap::new(),
            account_offers_failures: HashMap::new(),
            submit_failures: HashMap::new(),
            offer_rejections: HashMap::new(),
            tx_counter: 0,
        }
    }
}

struct FakeAccount {
    balance: Drops,
    sequence: u32,
    offers: Vec<AccountOffer>,
}

impl FakeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger whose only account is `genesis`, holding `balance`.
    #[must_use]
    pub fn with_genesis(genesis: &Wallet, balance: Drops) -> Self {
        let ledger = Self::new();
        ledger.state().accounts.insert(
            genesis.address().to_owned(),
            FakeAccount {
                balance,
                sequence: 1,
                offers: Vec::new(),
            },
        );
        ledger
    }

    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.state().current_index
    }

    #[must_use]
    pub fn closed_ledgers(&self) -> usize {
        self.state().closed.len()
    }

    #[must_use]
    pub fn balance(&self, address: &str) -> Option<Drops> {
        self.state().accounts.get(address).map(|account| account.balance)
    }

    #[must_use]
    pub fn offers(&self, address: &str) -> Vec<AccountOffer> {
        self.state()
            .accounts
            .get(address)
            .map(|account| account.offers.clone())
            .unwrap_or_default()
    }

    /// Every transaction handed to `submit`, accepted or not.
    #[must_use]
    pub fn submissions(&self) -> Vec<Transaction> {
        self.state().submissions.clone()
    }

    #[must_use]
    pub fn submissions_of(&self, tx_type: &str) -> usize {
        self.state()
            .submissions
            .iter()
            .filter(|tx| tx.type_name() == tx_type)
            .count()
    }

    /// Fails the next `times` `account_info` calls for `address` with the
    /// node error `error`.
    pub fn fail_account_info(&self, address: &str, times: usize, error: &str) {
        self.state()
            .account_info_failures
            .insert(address.to_owned(), (times, error.to_owned()));
    }

    pub fn fail_account_offers(&self, address: &str, error: &str) {
        self.state()
            .account_offers_failures
            .insert(address.to_owned(), error.to_owned());
    }

    /// Answers submissions from `address` with a node error response.
    pub fn fail_submit_from(&self, address: &str, error: &str) {
        self.state()
            .submit_failures
            .insert(address.to_owned(), error.to_owned());
    }

    /// Answers OfferCreate from `address` with `engine_result` and applies
    /// nothing.
    pub fn reject_offers_from(&self, address: &str, engine_result: &str) {
        self.state()
            .offer_rejections
            .insert(address.to_owned(), engine_result.to_owned());
    }

    /// Regular-privilege view of `ledger`: reads pass through, submissions
    /// that ask the node to sign are refused.
    #[must_use]
    pub fn user_port(ledger: &Arc<Self>) -> RpcHandle {
        Arc::new(FakeUserPort {
            ledger: Arc::clone(ledger),
        })
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl State {
    fn apply(&mut self, mut tx: Transaction, autofill: bool, wallet: &Wallet) -> Result<SubmitResult, RpcError> {
        let account = tx.account.clone();
        if let Some(error) = self.submit_failures.get(&account) {
            self.submissions.push(tx);
            return Err(RpcError::node("submit", error, None));
        }

        let Some(sender) = self.accounts.get(&account) else {
            self.submissions.push(tx);
            return Ok(verdict("terNO_ACCOUNT", -96, "The source account does not exist."));
        };

        if wallet.address() != account {
            self.submissions.push(tx);
            return Ok(verdict("tefBAD_AUTH", -199, "Transaction's public key is not authorized."));
        }

        if autofill {
            tx.sequence = tx.sequence.or(Some(sender.sequence));
            tx.fee = tx.fee.or(Some(FAKE_BASE_FEE));
            tx.last_ledger_sequence = tx.last_ledger_sequence.or(Some(self.current_index + 20));
        }

        if tx.sequence != Some(sender.sequence) {
            self.submissions.push(tx);
            return Ok(verdict("tefPAST_SEQ", -190, "This sequence number has already passed."));
        }

        let fee = tx.fee.unwrap_or(FAKE_BASE_FEE);
        let sequence = sender.sequence;
        let sender_balance = sender.balance;

        let outcome = match tx.kind.clone() {
            TxKind::Payment { destination, amount } => match amount.as_drops() {
                None => Some(verdict("temBAD_AMOUNT", -298, "Can only send positive amounts.")),
                Some(amount) => match sender_balance.checked_sub(amount.saturating_add(fee)) {
                    None => Some(verdict("tecUNFUNDED_PAYMENT", 104, "Insufficient XRP balance to send.")),
                    Some(remaining) => {
                        let opened_at = self.current_index;
                        self.debit(&account, remaining);
                        let destination = self.accounts.entry(destination).or_insert_with(|| FakeAccount {
                            balance: Drops::ZERO,
                            sequence: opened_at,
                            offers: Vec::new(),
                        });
                        destination.balance = destination.balance.saturating_add(amount);
                        None
                    }
                },
            },
            TxKind::OfferCreate { taker_gets, taker_pays } => {
                if let Some(engine_result) = self.offer_rejections.get(&account) {
                    Some(verdict(engine_result, 103, "Offer rejected by ledger."))
                } else {
                    match sender_balance.checked_sub(fee) {
                        None => Some(verdict("terINSUF_FEE_B", -99, "Account balance can't pay fee.")),
                        Some(remaining) => {
                            self.debit(&account, remaining);
                            if let Some(owner) = self.accounts.get_mut(&account) {
                                owner.offers.push(AccountOffer {
                                    seq: sequence,
                                    flags: 0,
                                    taker_gets,
                                    taker_pays,
                                    quality: String::new(),
                                });
                            }
                            None
                        }
                    }
                }
            }
        };

        self.submissions.push(tx);
        if let Some(rejected) = outcome {
            return Ok(rejected);
        }

        if let Some(sender) = self.accounts.get_mut(&account) {
            sender.sequence += 1;
        }
        self.tx_counter += 1;
        self.open.push(format!("{:064X}", self.tx_counter));

        Ok(verdict(
            TES_SUCCESS,
            0,
            "The transaction was applied. Only final in a validated ledger.",
        ))
    }

    fn debit(&mut self, address: &str, remaining: Drops) {
        if let Some(account) = self.accounts.get_mut(address) {
            account.balance = remaining;
        }
    }
}

fn verdict(engine_result: &str, code: i32, message: &str) -> SubmitResult {
    SubmitResult {
        engine_result: engine_result.to_owned(),
        engine_result_code: code,
        engine_result_message: message.to_owned(),
    }
}

#[async_trait]
impl LedgerRpc for FakeLedger {
    fn label(&self) -> &str {
        "fake"
    }

    async fn ledger_current(&self) -> Result<u32, RpcError> {
        Ok(self.current_index())
    }

    async fn ledger_transactions(&self, ledger_index: u32) -> Result<Vec<String>, RpcError> {
        let state = self.state();
        if ledger_index == state.current_index {
            return Ok(state.open.clone());
        }
        state
            .closed
            .get(&ledger_index)
            .cloned()
            .ok_or_else(|| RpcError::node("ledger", "lgrNotFound", Some("ledgerNotFound".into())))
    }

    async fn ledger_accept(&self) -> Result<u32, RpcError> {
        let mut state = self.state();
        let settled = std::mem::take(&mut state.open);
        let closed_index = state.current_index;
        state.closed.insert(closed_index, settled);
        state.current_index += 1;
        Ok(state.current_index)
    }

    async fn account_info(&self, address: &str) -> Result<AccountInfo, RpcError> {
        let mut state = self.state();

        if let Some((remaining, error)) = state.account_info_failures.get_mut(address) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RpcError::node("account_info", error, None));
            }
        }

        let current_index = state.current_index;
        let account = state.accounts.get(address).ok_or_else(|| {
            RpcError::node("account_info", ACCOUNT_NOT_FOUND, Some("Account not found.".into()))
        })?;

        Ok(AccountInfo {
            account_data: AccountRoot {
                account: address.to_owned(),
                balance: account.balance,
                sequence: account.sequence,
                owner_count: u32::try_from(account.offers.len()).unwrap_or(u32::MAX),
            },
            ledger_current_index: Some(current_index),
            validated: false,
        })
    }

    async fn account_offers(&self, address: &str) -> Result<Vec<AccountOffer>, RpcError> {
        let state = self.state();
        if let Some(error) = state.account_offers_failures.get(address) {
            return Err(RpcError::node("account_offers", error, None));
        }
        state
            .accounts
            .get(address)
            .map(|account| account.offers.clone())
            .ok_or_else(|| RpcError::node("account_offers", ACCOUNT_NOT_FOUND, None))
    }

    async fn submit(
        &self,
        tx: Transaction,
        options: SubmitOptions<'_>,
    ) -> Result<SubmitResult, RpcError> {
        self.state().apply(tx, options.autofill, options.wallet)
    }
}

struct FakeUserPort {
    ledger: Arc<FakeLedger>,
}

#[async_trait]
impl LedgerRpc for FakeUserPort {
    fn label(&self) -> &str {
        "fake-user"
    }

    async fn ledger_current(&self) -> Result<u32, RpcError> {
        self.ledger.ledger_current().await
    }

    async fn ledger_transactions(&self, ledger_index: u32) -> Result<Vec<String>, RpcError> {
        self.ledger.ledger_transactions(ledger_index).await
    }

    async fn ledger_accept(&self) -> Result<u32, RpcError> {
        Err(RpcError::node("ledger_accept", "noPermission", None))
    }

    async fn account_info(&self, address: &str) -> Result<AccountInfo, RpcError> {
        self.ledger.account_info(address).await
    }

    async fn account_offers(&self, address: &str) -> Result<Vec<AccountOffer>, RpcError> {
        self.ledger.account_offers(address).await
    }

    async fn submit(
        &self,
        _tx: Transaction,
        _options: SubmitOptions<'_>,
    ) -> Result<SubmitResult, RpcError> {
        Err(RpcError::node(
            "submit",
            SIGNING_NOT_SUPPORTED,
            Some("Signing is not supported by this server.".into()),
        ))
    }
}
