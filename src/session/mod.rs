//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! ChainClient result / RawFailure
//!     → error.rs (classify into ErrorKind)
//!     → state.rs (apply_* transitions, generation checks)
//!     → store.rs (publish snapshot + error stream to the UI)
//! ```

pub mod error;
pub mod state;
pub mod store;

pub use error::{classify, ErrorKind, ErrorReport};
pub use state::{ConnectionStatus, Field, RefreshTicket, SessionSnapshot, SessionState};
pub use store::SessionStore;
