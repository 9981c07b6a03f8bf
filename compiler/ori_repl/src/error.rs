//! Session errors.
//!
//! Backend diagnostics are not errors at this level; they come back inside
//! [`CheckResult::Error`](crate::CheckResult) and
//! [`CompileResult::Error`](crate::CompileResult). What remains is caller
//! misuse of the lifecycle and history failures.

use ori_repl_history::HistoryError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The compilation state was read before initialization or after disposal.
    #[error("compilation session is uninitialized or already destroyed")]
    InvalidState,

    /// The compilation state was requested after disposal.
    #[error("compilation session has been disposed")]
    Disposed,

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl SessionError {
    /// Whether the session can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::History(err) if err.is_fatal())
    }
}
