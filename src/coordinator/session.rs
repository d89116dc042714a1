//! User intents against the bank.
//!
//! `BankSession` is what a UI talks to: it accepts connect / deposit /
//! withdraw / rename / refresh, owns the `SessionStore`, and hands out
//! snapshot and error subscriptions. Owner gating for rename happens here,
//! above the coordinator.

use std::sync::Arc;

use alloy::primitives::U256;
use tokio::sync::{broadcast, watch};

use crate::blockchain::client::ChainClient;
use crate::blockchain::codec::to_base_units;
use crate::blockchain::provider::WalletProvider;
use crate::blockchain::types::{Account, RawFailure};
use crate::coordinator::transaction::{BlockReason, Outcome, TransactionCoordinator};
use crate::session::state::Field;
use crate::session::{ErrorKind, ErrorReport, SessionState, SessionStore};

pub struct BankSession<P> {
    client: Arc<ChainClient<P>>,
    store: Arc<SessionStore>,
    coordinator: TransactionCoordinator<P>,
}

impl<P: WalletProvider> BankSession<P> {
    pub fn new(client: ChainClient<P>) -> Self {
        let client = Arc::new(client);
        let store = Arc::new(SessionStore::new());
        let coordinator = TransactionCoordinator::new(client.clone(), store.clone());
        Self {
            client,
            store,
            coordinator,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.store.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    pub fn subscribe_errors(&self) -> broadcast::Receiver<ErrorReport> {
        self.store.subscribe_errors()
    }

    pub fn coordinator(&self) -> &TransactionCoordinator<P> {
        &self.coordinator
    }

    /// The UI has displayed `last_error`.
    pub fn acknowledge_error(&self) {
        self.store.clear_error();
    }

    /// Connect the wallet, then load owner, name and balance.
    ///
    /// Read failures after a successful connection are recorded in
    /// `last_error` but leave the session connected.
    pub async fn connect(&self) -> Result<Account, ErrorKind> {
        let account = match self.client.connect().await {
            Ok(account) => account,
            Err(failure) => return Err(self.store.report("connect", &failure)),
        };

        let owner_ticket = self.store.begin_refresh(Field::Owner);
        let owner = match self.client.read_owner().await {
            Ok(owner) => Some(owner),
            Err(failure) => {
                self.store.report("read_owner", &failure);
                None
            }
        };

        self.store.update(|state| {
            state.apply_connection(account, None);
            if let Some(owner) = owner {
                state.apply_owner_from(owner_ticket, owner);
            }
            true
        });
        tracing::info!(
            account = %account,
            is_owner = self.store.current().is_owner(),
            "Session connected"
        );

        tokio::join!(
            self.coordinator.refresh_bank_name(),
            self.coordinator.refresh_balance()
        );
        Ok(account)
    }

    /// Re-read name, owner and balance. Returns false if any read failed.
    pub async fn refresh(&self) -> bool {
        let (name, owner, balance) = tokio::join!(
            self.coordinator.refresh_bank_name(),
            self.coordinator.refresh_owner(),
            self.coordinator.refresh_balance()
        );
        name && owner && balance
    }

    /// Deposit a decimal amount such as `"0.5"`.
    pub async fn deposit(&self, amount: &str) -> Outcome {
        if let Some(blocked) = self.require_connection() {
            return blocked;
        }
        match self.parse_amount("deposit", amount) {
            Ok(amount_wei) => self.coordinator.run_deposit(amount_wei).await,
            Err(outcome) => outcome,
        }
    }

    /// Withdraw a decimal amount to the connected account.
    pub async fn withdraw(&self, amount: &str) -> Outcome {
        if let Some(blocked) = self.require_connection() {
            return blocked;
        }
        match self.parse_amount("withdraw", amount) {
            Ok(amount_wei) => self.coordinator.run_withdraw(amount_wei).await,
            Err(outcome) => outcome,
        }
    }

    /// Rename the bank. Only the owner may.
    pub async fn rename(&self, name: &str) -> Outcome {
        if let Some(blocked) = self.require_connection() {
            return blocked;
        }
        if !self.store.current().is_owner() {
            tracing::info!("Rename refused, connected account is not the bank owner");
            return Outcome::Blocked {
                reason: BlockReason::NotOwner,
            };
        }
        self.coordinator.run_rename(name).await
    }

    fn require_connection(&self) -> Option<Outcome> {
        if self.store.current().is_connected() {
            return None;
        }
        if !self.client.has_provider() {
            let kind = self.store.report("intent", &RawFailure::MissingProvider);
            return Some(Outcome::Failed { kind, hash: None });
        }
        Some(Outcome::Blocked {
            reason: BlockReason::NotConnected,
        })
    }

    fn parse_amount(
        &self,
        operation: &'static str,
        amount: &str,
    ) -> Result<U256, Outcome> {
        to_base_units(amount).map_err(|err| {
            let kind = self.store.report(operation, &RawFailure::from(err));
            Outcome::Failed { kind, hash: None }
        })
    }
}
