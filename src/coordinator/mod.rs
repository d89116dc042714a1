//! Coordination of user intents, transactions and session updates.
//!
//! # Data Flow
//! ```text
//! UI intent (connect / deposit / withdraw / rename)
//!     → session.rs (gating, amount parsing)
//!     → transaction.rs (submit → await confirmation → refresh)
//!     → SessionStore (snapshot + error stream)
//! ```
//!
//! # Design Decisions
//! - Single-task cooperative execution; intents may be awaited concurrently
//! - State changes happen only between suspension points
//! - No automatic retries of any kind

pub mod session;
pub mod transaction;

pub use session::BankSession;
pub use transaction::{AttemptPhase, BlockReason, Outcome, TransactionCoordinator};
