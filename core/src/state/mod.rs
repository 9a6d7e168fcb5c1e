//! Session state.
//!
//! One [`SessionHandle`] tracks the preload of one navigation. The
//! [`SessionManager`] holds the single active-session slot of a runtime
//! context: beginning a navigation installs a new session and cancels the
//! previous one if it was still pending.
//!
//! Lifecycle:
//!
//! ```text
//! Pending ──→ Finished
//!    ├──────→ Failed
//!    ├──────→ Cancelled
//!    └──────→ Redirected
//! ```
//!
//! Terminal sessions accept no further mutation.

pub mod manager;
pub mod session;
pub mod transitions;
pub mod types;

pub use manager::{SessionManager, Supersession};
pub use session::{SessionHandle, SessionState};
pub use transitions::{SessionTransition, TransitionError};
pub use types::SessionStatus;
