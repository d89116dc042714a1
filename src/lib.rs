//! Client for a single on-chain bank contract.
//!
//! # Architecture Overview
//!
//! ```text
//!   UI intent ──▶ coordinator::BankSession ──▶ coordinator::TransactionCoordinator
//!                        │                               │
//!                        │ reads                         │ submit / confirm / refresh
//!                        ▼                               ▼
//!                 blockchain::ChainClient ◀──────────────┘
//!                        │
//!                        ▼
//!                 WalletProvider (wallet extension or local key + node)
//!
//!   failures ──▶ session::classify ──▶ session::SessionStore ──▶ snapshots / error stream
//! ```

// Core subsystems
pub mod blockchain;
pub mod coordinator;
pub mod session;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use blockchain::{ChainClient, RpcWalletProvider, WalletProvider};
pub use config::ClientConfig;
pub use coordinator::{BankSession, Outcome, TransactionCoordinator};
pub use session::{ErrorKind, SessionState};
