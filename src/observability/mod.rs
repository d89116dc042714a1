//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (transaction and error counters)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`tx_hash`, `kind`, `operation`) on every boundary event
//! - JSON format for machine parsing, pretty format for terminals
//! - Metrics are no-ops until the host installs a recorder

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
