//! Lifecycle of one state-mutating attempt.
//!
//! ```text
//! Idle → Submitting → AwaitingConfirmation → Succeeded
//!            │                 │
//!            └────────┬────────┘
//!                     ▼
//!                   Failed
//! ```
//!
//! Every `run_*` call is a fresh attempt starting at `Idle`. A failed
//! on-chain transaction is never resubmitted automatically; calling `run_*`
//! again creates a new, independent transaction. Several attempts may be in
//! flight at once; nonce ordering is left to the wallet provider.

use std::sync::Arc;
use std::time::Instant;

use alloy::primitives::{TxHash, U256};
use serde::Serialize;

use crate::blockchain::client::ChainClient;
use crate::blockchain::provider::WalletProvider;
use crate::blockchain::types::{PendingTransaction, RawFailure, TxKind, TxStatus};
use crate::observability::metrics;
use crate::session::state::Field;
use crate::session::{ErrorKind, SessionStore};

/// Phase of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPhase {
    Idle,
    Submitting,
    AwaitingConfirmation,
    Succeeded,
    Failed,
}

impl AttemptPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptPhase::Succeeded | AttemptPhase::Failed)
    }
}

/// Why an intent never reached the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    NotConnected,
    NotOwner,
}

/// Terminal result of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Confirmed on chain. `refreshed` is false when the follow-up read
    /// failed; the error is then in `last_error`.
    Succeeded { hash: TxHash, refreshed: bool },
    Failed { kind: ErrorKind, hash: Option<TxHash> },
    Blocked { reason: BlockReason },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}

/// One attempt's progress, logged on every transition.
#[derive(Debug)]
struct Attempt {
    kind: TxKind,
    phase: AttemptPhase,
    started: Instant,
}

impl Attempt {
    fn new(kind: TxKind) -> Self {
        Self {
            kind,
            phase: AttemptPhase::Idle,
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: AttemptPhase) {
        debug_assert!(!self.phase.is_terminal(), "attempt already finished");
        tracing::debug!(kind = self.kind.as_str(), from = ?self.phase, to = ?next, "Attempt phase");
        self.phase = next;
    }
}

/// Drives submit → confirm → refresh for deposit, withdraw and rename.
pub struct TransactionCoordinator<P> {
    client: Arc<ChainClient<P>>,
    store: Arc<SessionStore>,
}

impl<P> Clone for TransactionCoordinator<P> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: self.store.clone(),
        }
    }
}

impl<P: WalletProvider> TransactionCoordinator<P> {
    pub fn new(client: Arc<ChainClient<P>>, store: Arc<SessionStore>) -> Self {
        Self { client, store }
    }

    /// Deposit `amount` and refresh the connected account's balance.
    pub async fn run_deposit(&self, amount: U256) -> Outcome {
        let mut attempt = Attempt::new(TxKind::Deposit);
        attempt.advance(AttemptPhase::Submitting);
        let submitted = self.client.submit_deposit(amount).await;
        let tx = match self.confirm(&mut attempt, submitted).await {
            Ok(tx) => tx,
            Err(outcome) => return outcome,
        };
        let hash = match self.succeed(attempt, tx) {
            Ok(hash) => hash,
            Err(outcome) => return outcome,
        };
        let refreshed = self.refresh_balance().await;
        Outcome::Succeeded { hash, refreshed }
    }

    /// Withdraw `amount` to the connected account and refresh its balance.
    pub async fn run_withdraw(&self, amount: U256) -> Outcome {
        let Some(account) = self.store.current().account().copied() else {
            return Outcome::Blocked {
                reason: BlockReason::NotConnected,
            };
        };

        let mut attempt = Attempt::new(TxKind::Withdraw);
        attempt.advance(AttemptPhase::Submitting);
        let submitted = self.client.submit_withdraw(&account, amount).await;
        let tx = match self.confirm(&mut attempt, submitted).await {
            Ok(tx) => tx,
            Err(outcome) => return outcome,
        };
        let hash = match self.succeed(attempt, tx) {
            Ok(hash) => hash,
            Err(outcome) => return outcome,
        };
        let refreshed = self.refresh_balance().await;
        Outcome::Succeeded { hash, refreshed }
    }

    /// Rename the bank and refresh the stored name.
    pub async fn run_rename(&self, name: &str) -> Outcome {
        let mut attempt = Attempt::new(TxKind::Rename);
        attempt.advance(AttemptPhase::Submitting);
        let submitted = self.client.submit_rename(name).await;
        let tx = match self.confirm(&mut attempt, submitted).await {
            Ok(tx) => tx,
            Err(outcome) => return outcome,
        };
        let hash = match self.succeed(attempt, tx) {
            Ok(hash) => hash,
            Err(outcome) => return outcome,
        };
        let refreshed = self.refresh_bank_name().await;
        Outcome::Succeeded { hash, refreshed }
    }

    /// Wait for the submitted transaction; a failure ends the attempt.
    async fn confirm(
        &self,
        attempt: &mut Attempt,
        submitted: Result<PendingTransaction, RawFailure>,
    ) -> Result<PendingTransaction, Outcome> {
        let pending = match submitted {
            Ok(pending) => pending,
            Err(failure) => return Err(self.fail(attempt, &failure, None)),
        };

        attempt.advance(AttemptPhase::AwaitingConfirmation);
        let tx = self.client.await_confirmation(pending).await;
        if tx.status == TxStatus::Confirmed {
            return Ok(tx);
        }
        let failure = tx.failure.clone().unwrap_or_else(|| {
            RawFailure::Other(format!("confirmation ended in {:?}", tx.status))
        });
        Err(self.fail(attempt, &failure, tx.submitted_hash))
    }

    fn fail(&self, attempt: &mut Attempt, failure: &RawFailure, hash: Option<TxHash>) -> Outcome {
        attempt.advance(AttemptPhase::Failed);
        let kind = self.store.report(attempt.kind.as_str(), failure);
        metrics::record_transaction(attempt.kind, "failed");
        Outcome::Failed { kind, hash }
    }

    /// Record a confirmed transaction; the caller follows up with a refresh.
    fn succeed(&self, mut attempt: Attempt, tx: PendingTransaction) -> Result<TxHash, Outcome> {
        let Some(hash) = tx.submitted_hash else {
            let failure = RawFailure::Invalid("confirmed transaction has no hash".to_string());
            return Err(self.fail(&mut attempt, &failure, None));
        };

        attempt.advance(AttemptPhase::Succeeded);
        metrics::record_transaction(attempt.kind, "confirmed");
        metrics::record_confirmation_latency(attempt.kind, attempt.started.elapsed());
        Ok(hash)
    }

    /// Re-read the connected account's balance. The ticket is taken after
    /// confirmation so older in-flight reads cannot overwrite the result.
    pub async fn refresh_balance(&self) -> bool {
        let Some(account) = self.store.current().account().copied() else {
            tracing::debug!("No connected account, skipping balance refresh");
            return false;
        };

        let ticket = self.store.begin_refresh(Field::Balance);
        match self.client.read_balance(&account).await {
            Ok(balance) => {
                self.store
                    .update(|state| state.apply_balance_from(ticket, balance));
                true
            }
            Err(failure) => {
                self.store.report("read_balance", &failure);
                false
            }
        }
    }

    pub async fn refresh_bank_name(&self) -> bool {
        let ticket = self.store.begin_refresh(Field::BankName);
        match self.client.read_bank_name().await {
            Ok(name) => {
                self.store
                    .update(|state| state.apply_bank_name_from(ticket, name));
                true
            }
            Err(failure) => {
                self.store.report("read_bank_name", &failure);
                false
            }
        }
    }

    pub async fn refresh_owner(&self) -> bool {
        let ticket = self.store.begin_refresh(Field::Owner);
        match self.client.read_owner().await {
            Ok(owner) => {
                self.store
                    .update(|state| state.apply_owner_from(ticket, owner));
                true
            }
            Err(failure) => {
                self.store.report("read_owner", &failure);
                false
            }
        }
    }
}
