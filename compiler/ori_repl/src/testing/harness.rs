//! Session constructors for tests.

use std::sync::Arc;

use ori_repl_history::{LineId, Snippet};

use super::mocks::{MockBackend, MockConfig, MockCounters};
use crate::{ReplOptions, ReplSession};

/// A session over a fresh [`MockBackend`] with default configuration.
pub fn mock_session() -> (ReplSession<MockBackend>, Arc<MockCounters>) {
    mock_session_with(MockBackend::new(), MockConfig::default())
}

/// A session over `backend` and `config` with default options.
pub fn mock_session_with(
    backend: MockBackend,
    config: MockConfig,
) -> (ReplSession<MockBackend>, Arc<MockCounters>) {
    let counters = backend.counters();
    let session = ReplSession::with_options(backend, config, ReplOptions::default());
    (session, counters)
}

/// Snippet shorthand: `snippet(no, generation, source)`.
pub fn snippet(no: u32, generation: u32, source: &str) -> Snippet {
    Snippet::new(LineId::new(no, generation), source)
}
