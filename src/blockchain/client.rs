//! Bank contract client.
//!
//! # Responsibilities
//! - Request account access from the wallet provider
//! - Read bank name, owner and customer balance
//! - Submit deposit / withdraw / rename transactions
//! - Follow a submitted transaction until it is mined or rejected
//!
//! Every failure leaves this module as a `RawFailure`; classification
//! happens in `session::error`.

use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::codec::{decode_name, encode_name};
use crate::blockchain::contract::IBank;
use crate::blockchain::provider::{ContractCall, WalletProvider};
use crate::blockchain::types::{Account, PendingTransaction, RawFailure, TxKind};
use crate::config::ChainConfig;

/// Client for one bank contract behind one wallet provider.
///
/// Holds no session state. `provider` is `None` when the environment has no
/// wallet, in which case every operation fails with
/// `RawFailure::MissingProvider`.
pub struct ChainClient<P> {
    provider: Option<P>,
    contract: Address,
    /// Bound on reads and receipt polls. Never applied to the confirmation
    /// wait as a whole.
    rpc_timeout: Duration,
    poll_interval: Duration,
    confirmation_blocks: u32,
}

impl<P: WalletProvider> ChainClient<P> {
    /// Create a client for `contract`.
    pub fn new(provider: Option<P>, contract: Address, config: &ChainConfig) -> Self {
        Self {
            provider,
            contract,
            rpc_timeout: Duration::from_secs(config.rpc_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            confirmation_blocks: config.confirmation_blocks.max(1),
        }
    }

    /// Contract address this client talks to.
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Whether a wallet provider is present.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&P, RawFailure> {
        self.provider.as_ref().ok_or(RawFailure::MissingProvider)
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, RawFailure>>,
    ) -> Result<T, RawFailure> {
        match timeout(self.rpc_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(op, timeout_secs = self.rpc_timeout.as_secs(), "Provider request timed out");
                Err(RawFailure::Timeout(self.rpc_timeout.as_secs()))
            }
        }
    }

    /// Request account access and return the primary account.
    pub async fn connect(&self) -> Result<Account, RawFailure> {
        let provider = self.provider()?;
        // Not bounded: the provider may be waiting on a permission prompt.
        let accounts = provider.request_accounts().await?;
        let account = accounts
            .first()
            .copied()
            .map(Account::new)
            .ok_or(RawFailure::NoAccounts)?;

        tracing::info!(account = %account, "Wallet connected");
        Ok(account)
    }

    async fn read(&self, op: &'static str, call: ContractCall) -> Result<Vec<u8>, RawFailure> {
        let provider = self.provider()?;
        let output = self.bounded(op, provider.call(call)).await?;
        tracing::debug!(op, bytes = output.len(), "Contract read complete");
        Ok(output.to_vec())
    }

    /// Current bank name with padding removed.
    pub async fn read_bank_name(&self) -> Result<String, RawFailure> {
        let call = ContractCall::new(self.contract, IBank::bankNameCall {}.abi_encode());
        let output = self.read("bankName", call).await?;
        let raw = IBank::bankNameCall::abi_decode_returns(&output)?;
        Ok(decode_name(&raw)?)
    }

    /// Owner address recorded by the contract.
    pub async fn read_owner(&self) -> Result<Account, RawFailure> {
        let call = ContractCall::new(self.contract, IBank::bankOwnerCall {}.abi_encode());
        let output = self.read("bankOwner", call).await?;
        let owner = IBank::bankOwnerCall::abi_decode_returns(&output)?;
        Ok(Account::new(owner))
    }

    /// Tracked balance of `account` in base units.
    pub async fn read_balance(&self, account: &Account) -> Result<U256, RawFailure> {
        let call = ContractCall::new(self.contract, IBank::getCustomerBalanceCall {}.abi_encode())
            .with_sender(account.address());
        let output = self.read("getCustomerBalance", call).await?;
        Ok(IBank::getCustomerBalanceCall::abi_decode_returns(&output)?)
    }

    async fn submit(&self, kind: TxKind, call: ContractCall) -> Result<PendingTransaction, RawFailure> {
        let provider = self.provider()?;
        // Not bounded: signing may involve a user confirmation.
        let hash = provider.send_transaction(call).await?;
        tracing::info!(kind = kind.as_str(), tx_hash = %hash, "Transaction submitted");
        Ok(PendingTransaction::submitted(kind, hash))
    }

    /// Submit `setBankName`. Names longer than the slot are rejected before
    /// anything reaches the provider.
    pub async fn submit_rename(&self, name: &str) -> Result<PendingTransaction, RawFailure> {
        let encoded = encode_name(name)?;
        let data = IBank::setBankNameCall { name: encoded }.abi_encode();
        self.submit(TxKind::Rename, ContractCall::new(self.contract, data))
            .await
    }

    /// Submit `depositMoney` carrying `amount` as value.
    pub async fn submit_deposit(&self, amount: U256) -> Result<PendingTransaction, RawFailure> {
        let data = IBank::depositMoneyCall {}.abi_encode();
        let call = ContractCall::new(self.contract, data).with_value(amount);
        self.submit(TxKind::Deposit, call).await
    }

    /// Submit `withdrawMoney(to, amount)`.
    pub async fn submit_withdraw(
        &self,
        to: &Account,
        amount: U256,
    ) -> Result<PendingTransaction, RawFailure> {
        let data = IBank::withdrawMoneyCall {
            to: to.address(),
            amount,
        }
        .abi_encode();
        self.submit(TxKind::Withdraw, ContractCall::new(self.contract, data))
            .await
    }

    /// Wait until `tx` is mined with the configured depth, or rejected.
    ///
    /// There is no overall deadline. Individual polls that time out are
    /// retried; any other provider error ends the wait as `Failed`.
    pub async fn await_confirmation(&self, tx: PendingTransaction) -> PendingTransaction {
        let Some(hash) = tx.submitted_hash else {
            return tx.fail(RawFailure::Invalid("transaction has no hash".to_string()));
        };
        let provider = match self.provider() {
            Ok(provider) => provider,
            Err(failure) => return tx.fail(failure),
        };

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let receipt = match self
                .bounded("transaction_receipt", provider.transaction_receipt(hash))
                .await
            {
                Ok(Some(receipt)) => receipt,
                Ok(None) => {
                    tracing::debug!(tx_hash = %hash, "Transaction pending");
                    continue;
                }
                Err(RawFailure::Timeout(_)) => continue,
                Err(failure) => return tx.fail(failure),
            };

            if !receipt.success {
                tracing::warn!(tx_hash = %hash, kind = tx.kind.as_str(), "Transaction reverted");
                return tx.fail(RawFailure::Reverted { reason: None });
            }

            if self.confirmation_blocks > 1 {
                // Depth cannot be measured until the receipt names its block.
                let Some(tx_block) = receipt.block_number else {
                    tracing::debug!(tx_hash = %hash, "Receipt has no block number yet");
                    continue;
                };
                let current_block = match self
                    .bounded("block_number", provider.block_number())
                    .await
                {
                    Ok(block) => block,
                    Err(RawFailure::Timeout(_)) => continue,
                    Err(failure) => return tx.fail(failure),
                };
                // The inclusion block counts as the first confirmation.
                let confirmations = current_block.saturating_sub(tx_block) + 1;
                if confirmations < u64::from(self.confirmation_blocks) {
                    tracing::debug!(
                        tx_hash = %hash,
                        confirmations = confirmations,
                        required = self.confirmation_blocks,
                        "Waiting for confirmations"
                    );
                    continue;
                }
            }

            tracing::info!(tx_hash = %hash, kind = tx.kind.as_str(), "Transaction confirmed");
            return tx.confirm();
        }
    }
}

impl<P> std::fmt::Debug for ChainClient<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("contract", &self.contract)
            .field("has_provider", &self.provider.is_some())
            .field("timeout_secs", &self.rpc_timeout.as_secs())
            .field("confirmation_blocks", &self.confirmation_blocks)
            .finish()
    }
}
