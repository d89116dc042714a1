//! Chain-facing types and boundary failures.

use std::fmt;
use std::str::FromStr;

use alloy::hex;
use alloy::primitives::{Address, TxHash};
use alloy::transports::RpcError;
use alloy::transports::TransportError;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::blockchain::codec::CodecError;

/// An externally-owned account, compared case-insensitively.
///
/// Backed by the raw 20-byte address so equality never depends on the
/// casing the provider happened to return. Displays as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Account(Address);

impl Account {
    pub fn new(address: Address) -> Self {
        Self(address)
    }

    /// The underlying address.
    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for Account {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for Account {
    type Err = RawFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Address>()
            .map(Self)
            .map_err(|e| RawFailure::Invalid(format!("invalid account address '{}': {}", s, e)))
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_prefixed(self.0))
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Kind of state-mutating call against the bank contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Deposit,
    Withdraw,
    Rename,
}

impl TxKind {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Deposit => "deposit",
            TxKind::Withdraw => "withdraw",
            TxKind::Rename => "rename",
        }
    }
}

/// Lifecycle status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Submitted,
    Confirmed,
    Failed,
}

/// Handle for a dispatched write call.
///
/// Returned as soon as the provider accepts the call; confirmation is
/// awaited separately so the caller is never blocked on mining latency.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransaction {
    pub kind: TxKind,
    pub submitted_hash: Option<TxHash>,
    pub status: TxStatus,
    /// Boundary failure that moved the transaction to `Failed`.
    pub failure: Option<RawFailure>,
}

impl PendingTransaction {
    pub fn submitted(kind: TxKind, hash: TxHash) -> Self {
        Self {
            kind,
            submitted_hash: Some(hash),
            status: TxStatus::Submitted,
            failure: None,
        }
    }

    pub(crate) fn confirm(mut self) -> Self {
        self.status = TxStatus::Confirmed;
        self
    }

    pub(crate) fn fail(mut self, failure: RawFailure) -> Self {
        self.status = TxStatus::Failed;
        self.failure = Some(failure);
        self
    }
}

/// Receipt fields the client cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptOutcome {
    /// False when the transaction was mined but reverted.
    pub success: bool,
    pub block_number: Option<u64>,
}

/// A failure as surfaced by the provider, node or local validation.
///
/// The shapes are heterogeneous and only loosely specified by wallet
/// providers; `session::error::classify` is the single place that
/// interprets them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RawFailure {
    /// The environment has no wallet provider at all.
    #[error("no wallet provider available")]
    MissingProvider,

    /// The provider answered the account request with no accounts.
    #[error("provider returned no authorized accounts")]
    NoAccounts,

    /// Structured JSON-RPC / EIP-1193 error.
    #[error("provider error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<String>,
    },

    /// Transport-level failure (connection refused, HTTP error, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The transaction was mined but reverted.
    #[error("transaction reverted: {}", reason.as_deref().unwrap_or("no reason given"))]
    Reverted { reason: Option<String> },

    /// Local encoding/decoding or input validation failure.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Anything else, kept as text.
    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for RawFailure {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => RawFailure::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
                data: payload.data.map(|raw| raw.get().to_string()),
            },
            RpcError::Transport(kind) => RawFailure::Transport(kind.to_string()),
            other => RawFailure::Other(other.to_string()),
        }
    }
}

impl From<CodecError> for RawFailure {
    fn from(err: CodecError) -> Self {
        RawFailure::Invalid(err.to_string())
    }
}

impl From<alloy::sol_types::Error> for RawFailure {
    fn from(err: alloy::sol_types::Error) -> Self {
        RawFailure::Invalid(format!("ABI decode failed: {}", err))
    }
}
