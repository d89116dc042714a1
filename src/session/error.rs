//! Failure taxonomy shown to the user.
//!
//! `classify` is the only interpreter of `RawFailure`. It is a total
//! function: anything it does not recognise becomes `ErrorKind::Unknown`.

use std::fmt;

use alloy::hex;
use alloy::sol_types::{Revert, SolError};
use serde::Serialize;

use crate::blockchain::types::RawFailure;

/// EIP-1193: user rejected the request.
const CODE_USER_REJECTED: i64 = 4001;
/// EIP-1193: the requested method/account has not been authorized.
const CODE_UNAUTHORIZED: i64 = 4100;
/// EIP-1193: provider is disconnected from all chains.
const CODE_DISCONNECTED: i64 = 4900;
/// EIP-1193: provider is not connected to the requested chain.
const CODE_CHAIN_DISCONNECTED: i64 = 4901;
/// Geth/Anvil: execution reverted.
const CODE_EXECUTION_REVERTED: i64 = 3;

/// What went wrong, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No wallet in the environment. Nothing works until one is installed.
    NoProvider,
    /// The user declined a prompt.
    UserRejected,
    /// The contract refused the operation.
    ChainRevert,
    /// Node or transport unreachable; re-invoking may succeed.
    NetworkUnavailable,
    Unknown,
}

impl ErrorKind {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoProvider => "no_provider",
            ErrorKind::UserRejected => "user_rejected",
            ErrorKind::ChainRevert => "chain_revert",
            ErrorKind::NetworkUnavailable => "network_unavailable",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Re-invoking the same operation unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::NetworkUnavailable)
    }

    /// No contract operation can succeed without user action outside the app.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::NoProvider)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ErrorKind::NoProvider => "Please install a wallet to use the bank.",
            ErrorKind::UserRejected => "The request was rejected in the wallet.",
            ErrorKind::ChainRevert => "The bank contract rejected the transaction.",
            ErrorKind::NetworkUnavailable => "The network is unavailable. Please try again.",
            ErrorKind::Unknown => "Something went wrong.",
        };
        f.write_str(message)
    }
}

/// An error as published to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    /// Contract revert reason, shown verbatim when available.
    pub reason: Option<String>,
}

impl ErrorReport {
    pub fn from_failure(failure: &RawFailure) -> Self {
        let kind = classify(failure);
        let reason = match kind {
            ErrorKind::ChainRevert => revert_reason(failure),
            _ => None,
        };
        Self { kind, reason }
    }
}

/// Map a boundary failure to the taxonomy.
pub fn classify(failure: &RawFailure) -> ErrorKind {
    match failure {
        RawFailure::MissingProvider => ErrorKind::NoProvider,
        RawFailure::NoAccounts => ErrorKind::UserRejected,
        RawFailure::Rpc { code, message, .. } => match *code {
            CODE_USER_REJECTED | CODE_UNAUTHORIZED => ErrorKind::UserRejected,
            CODE_DISCONNECTED | CODE_CHAIN_DISCONNECTED => ErrorKind::NetworkUnavailable,
            CODE_EXECUTION_REVERTED => ErrorKind::ChainRevert,
            _ => classify_message(message),
        },
        RawFailure::Transport(_) | RawFailure::Timeout(_) => ErrorKind::NetworkUnavailable,
        RawFailure::Reverted { .. } => ErrorKind::ChainRevert,
        RawFailure::Invalid(_) => ErrorKind::Unknown,
        RawFailure::Other(message) => classify_message(message),
    }
}

fn classify_message(message: &str) -> ErrorKind {
    let message = message.to_ascii_lowercase();
    let any = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if any(&["user rejected", "user denied", "rejected by user", "action_rejected"]) {
        ErrorKind::UserRejected
    } else if any(&["revert", "insufficient funds for transfer"]) {
        ErrorKind::ChainRevert
    } else if any(&[
        "timeout",
        "timed out",
        "network",
        "connection",
        "unreachable",
        "failed to fetch",
        "disconnected",
    ]) {
        ErrorKind::NetworkUnavailable
    } else {
        ErrorKind::Unknown
    }
}

/// Best-effort extraction of the contract's revert reason.
pub fn revert_reason(failure: &RawFailure) -> Option<String> {
    match failure {
        RawFailure::Reverted { reason } => reason.clone(),
        RawFailure::Rpc { message, data, .. } => data
            .as_deref()
            .and_then(decode_reason_data)
            .or_else(|| reason_from_message(message)),
        RawFailure::Other(message) => reason_from_message(message),
        _ => None,
    }
}

fn decode_reason_data(data: &str) -> Option<String> {
    let bytes = hex::decode(data.trim().trim_matches('"')).ok()?;
    Revert::abi_decode(&bytes).ok().map(|revert| revert.reason)
}

fn reason_from_message(message: &str) -> Option<String> {
    let (_, reason) = message.split_once("reverted:")?;
    let reason = reason.trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc(code: i64, message: &str) -> RawFailure {
        RawFailure::Rpc {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_missing_provider() {
        assert_eq!(classify(&RawFailure::MissingProvider), ErrorKind::NoProvider);
    }

    #[test]
    fn test_user_rejection_codes_and_messages() {
        assert_eq!(classify(&rpc(4001, "User rejected the request.")), ErrorKind::UserRejected);
        assert_eq!(classify(&rpc(4100, "unauthorized")), ErrorKind::UserRejected);
        assert_eq!(
            classify(&rpc(-32603, "MetaMask Tx Signature: User denied transaction signature.")),
            ErrorKind::UserRejected
        );
        assert_eq!(classify(&RawFailure::NoAccounts), ErrorKind::UserRejected);
    }

    #[test]
    fn test_revert_shapes() {
        assert_eq!(classify(&rpc(3, "execution reverted")), ErrorKind::ChainRevert);
        assert_eq!(
            classify(&rpc(-32000, "execution reverted: Insufficient balance")),
            ErrorKind::ChainRevert
        );
        assert_eq!(
            classify(&RawFailure::Reverted { reason: None }),
            ErrorKind::ChainRevert
        );
    }

    #[test]
    fn test_network_shapes() {
        assert_eq!(classify(&RawFailure::Timeout(10)), ErrorKind::NetworkUnavailable);
        assert_eq!(
            classify(&RawFailure::Transport("connection refused".into())),
            ErrorKind::NetworkUnavailable
        );
        assert_eq!(classify(&rpc(4900, "disconnected")), ErrorKind::NetworkUnavailable);
        assert_eq!(
            classify(&RawFailure::Other("request timed out".into())),
            ErrorKind::NetworkUnavailable
        );
    }

    #[test]
    fn test_unrecognised_is_unknown() {
        assert_eq!(classify(&rpc(-32602, "invalid params")), ErrorKind::Unknown);
        assert_eq!(classify(&RawFailure::Other(String::new())), ErrorKind::Unknown);
        assert_eq!(classify(&RawFailure::Invalid("name too long".into())), ErrorKind::Unknown);
    }

    #[test]
    fn test_revert_reason_from_message() {
        let failure = rpc(-32000, "execution reverted: Insufficient balance");
        assert_eq!(revert_reason(&failure), Some("Insufficient balance".to_string()));
        assert_eq!(revert_reason(&rpc(3, "execution reverted")), None);
    }

    #[test]
    fn test_revert_reason_from_error_data() {
        // Error(string) with "Not owner"
        let data = "0x08c379a0\
            0000000000000000000000000000000000000000000000000000000000000020\
            0000000000000000000000000000000000000000000000000000000000000009\
            4e6f74206f776e65720000000000000000000000000000000000000000000000";
        let failure = RawFailure::Rpc {
            code: 3,
            message: "execution reverted".to_string(),
            data: Some(format!("\"{}\"", data)),
        };
        assert_eq!(revert_reason(&failure), Some("Not owner".to_string()));
    }

    #[test]
    fn test_report_only_carries_reason_for_reverts() {
        let report = ErrorReport::from_failure(&RawFailure::Reverted {
            reason: Some("Not owner".into()),
        });
        assert_eq!(report.kind, ErrorKind::ChainRevert);
        assert_eq!(report.reason.as_deref(), Some("Not owner"));

        let report = ErrorReport::from_failure(&rpc(4001, "execution reverted: nope"));
        assert_eq!(report.kind, ErrorKind::UserRejected);
        assert!(report.reason.is_none());
    }

    #[test]
    fn test_retry_and_fatal_flags() {
        assert!(ErrorKind::NetworkUnavailable.is_retryable());
        assert!(!ErrorKind::ChainRevert.is_retryable());
        assert!(ErrorKind::NoProvider.is_fatal());
        assert!(!ErrorKind::UserRejected.is_fatal());
    }
}
