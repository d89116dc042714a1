//! Wallet provider protocol.
//!
//! # Responsibilities
//! - Expose account access (`request_accounts`)
//! - Run read-only calls and submit signed transactions against a contract
//! - Report receipts and chain height for confirmation tracking
//!
//! `RpcWalletProvider` implements the protocol over a JSON-RPC node with a
//! local signing wallet. Failures are returned as `RawFailure` and are not
//! interpreted here.

use std::future::Future;
use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::types::{RawFailure, ReceiptOutcome};
use crate::blockchain::wallet::Wallet;
use crate::config::ChainConfig;

/// A call against the contract, read-only or state-mutating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    /// Caller identity for reads that depend on `msg.sender`.
    pub from: Option<Address>,
    pub data: Bytes,
    pub value: U256,
}

impl ContractCall {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            from: None,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    pub fn with_sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    fn into_request(self) -> TransactionRequest {
        let request = TransactionRequest::default()
            .with_to(self.to)
            .with_input(self.data)
            .with_value(self.value);
        match self.from {
            Some(from) => request.with_from(from),
            None => request,
        }
    }
}

/// Bridge to the user's wallet.
///
/// The provider serializes nonces for concurrent submissions; callers do not
/// coordinate ordering themselves.
pub trait WalletProvider: Send + Sync {
    /// Ask for account access. May prompt the user.
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, RawFailure>> + Send;

    /// Execute a read-only call and return the raw ABI output.
    fn call(&self, call: ContractCall) -> impl Future<Output = Result<Bytes, RawFailure>> + Send;

    /// Sign and broadcast a state-mutating call. Returns once the provider
    /// has accepted it, not once it is mined.
    fn send_transaction(
        &self,
        call: ContractCall,
    ) -> impl Future<Output = Result<TxHash, RawFailure>> + Send;

    /// Receipt of a mined transaction, or `None` while still pending.
    fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> impl Future<Output = Result<Option<ReceiptOutcome>, RawFailure>> + Send;

    /// Latest block height.
    fn block_number(&self) -> impl Future<Output = Result<u64, RawFailure>> + Send;
}

/// JSON-RPC node plus local signer.
#[derive(Clone)]
pub struct RpcWalletProvider {
    provider: Arc<dyn Provider + Send + Sync>,
    wallet: Wallet,
}

impl RpcWalletProvider {
    /// Build a signing provider for the configured endpoint.
    pub fn connect(config: &ChainConfig, wallet: Wallet) -> Result<Self, RawFailure> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            RawFailure::Invalid(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url);

        tracing::info!(
            rpc_url = %config.rpc_url,
            account = %wallet.address(),
            "Wallet provider ready"
        );

        Ok(Self {
            provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
            wallet,
        })
    }
}

impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, RawFailure> {
        // A local key is implicitly authorized.
        Ok(vec![self.wallet.address()])
    }

    async fn call(&self, call: ContractCall) -> Result<Bytes, RawFailure> {
        let request = call.into_request();
        Ok(self.provider.call(request).await?)
    }

    async fn send_transaction(&self, call: ContractCall) -> Result<TxHash, RawFailure> {
        let request = call
            .into_request()
            .with_from(self.wallet.address())
            .with_chain_id(self.wallet.chain_id());
        let pending = self.provider.send_transaction(request).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptOutcome>, RawFailure> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|r| ReceiptOutcome {
            success: r.status(),
            block_number: r.block_number,
        }))
    }

    async fn block_number(&self) -> Result<u64, RawFailure> {
        Ok(self.provider.get_block_number().await?)
    }
}

impl std::fmt::Debug for RpcWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWalletProvider")
            .field("account", &self.wallet.address())
            .field("chain_id", &self.wallet.chain_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_config() -> ChainConfig {
        ChainConfig {
            rpc_url: "http://localhost:8545".to_string(),
            ..ChainConfig::default()
        }
    }

    #[test]
    fn test_contract_call_builder() {
        let call = ContractCall::new(Address::ZERO, vec![1u8, 2, 3])
            .with_sender(Address::repeat_byte(0x11))
            .with_value(U256::from(7u64));
        assert_eq!(call.from, Some(Address::repeat_byte(0x11)));
        assert_eq!(call.value, U256::from(7u64));
        assert_eq!(&call.data[..], &[1u8, 2, 3]);
    }

    #[test]
    fn test_invalid_rpc_url_rejected() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let result = RpcWalletProvider::connect(&config, wallet);
        assert!(matches!(result, Err(RawFailure::Invalid(_))));
    }

    #[tokio::test]
    async fn test_local_wallet_exposes_single_account() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
        let expected = wallet.address();
        let provider = RpcWalletProvider::connect(&test_config(), wallet).unwrap();
        let accounts = provider.request_accounts().await.unwrap();
        assert_eq!(accounts, vec![expected]);
    }
}
