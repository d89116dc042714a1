//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Wallet provider (browser extension, or local key + JSON-RPC node)
//!     → provider.rs (account access, calls, receipts)
//!     → client.rs (bank contract reads/writes, confirmation wait)
//!     → codec.rs (bytes32 names, 18-decimal amounts)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - Reads and receipt polls have configurable timeouts

pub mod client;
pub mod codec;
pub mod contract;
pub mod provider;
pub mod types;
pub mod wallet;

pub use client::ChainClient;
pub use provider::{ContractCall, RpcWalletProvider, WalletProvider};
pub use types::{Account, PendingTransaction, RawFailure, ReceiptOutcome, TxKind, TxStatus};
pub use wallet::Wallet;
