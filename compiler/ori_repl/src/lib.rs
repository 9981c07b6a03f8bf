//! Ori REPL - Session Management for Line-at-a-Time Compilation
//!
//! A REPL session accepts one snippet at a time and keeps the history of the
//! snippets it accepted. The actual compiling is delegated to a backend; this
//! crate sequences calls into it and keeps two ledgers in lockstep.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   │ check / compile / reset / reset_to      (write lock)
//!   ▼
//! ReplSession ──► CompilationSession ──get_or_init──► ReplBackend::create_state
//!   │                                                 (once per session)
//!   ├──► ReplBackend::check_syntax / compile
//!   ▼
//! DualHistory ── compiled ledger (owned)
//!             └─ analysis ledger (borrowed from the backend state per rewind)
//! ```
//!
//! Backend diagnostics come back as `Error` results. Lifecycle misuse and
//! history failures come back as [`SessionError`]; a history divergence is
//! fatal for the session.

mod backend;
mod diagnostic;
mod error;
mod options;
mod session;
mod state;
pub mod testing;

pub use backend::{BackendState, CompiledUnit, ReplBackend, SyntaxStatus};
pub use diagnostic::{render_diagnostics, Diagnostic};
pub use error::SessionError;
pub use options::ReplOptions;
pub use session::{CheckResult, CompileResult, CompiledHistory, CompiledSnippet, ReplSession};
pub use state::{CompilationSession, InitError, SessionStatus};

// History types are part of this crate's API.
pub use ori_repl_history::{HistoryError, Ledger, LedgerEntry, LineId, Snippet};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=ori_repl=debug` or `RUST_LOG=ori_repl_history=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
