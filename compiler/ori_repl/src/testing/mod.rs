//! Testing utilities for REPL sessions.
//!
//! - **mocks**: an in-memory backend with fault injection and counters
//! - **harness**: session constructors and snippet shorthands
//!
//! # Usage
//!
//! ```ignore
//! use ori_repl::testing::{mock_session, snippet};
//!
//! let (session, _counters) = mock_session();
//! let result = session.compile(&snippet(0, 0, "1 + 1"))?;
//! ```

pub mod harness;
pub mod mocks;

pub use harness::{mock_session, mock_session_with, snippet};
pub use mocks::{
    AnalyzedLine, MockArtifact, MockBackend, MockConfig, MockCounters, MockState, DESYNC_MARKER,
};
