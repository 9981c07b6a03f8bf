//! REPL session facade.
//!
//! `ReplSession` is the surface a REPL front-end talks to. It owns the
//! compiled history and the lazily-built backend state behind one
//! `parking_lot::RwLock`.
//!
//! # Locking
//!
//! Every operation that touches the backend or the history (`check`,
//! `compile`, `compile_next`, `reset`, `reset_to`, `dispose`) holds the **write** lock for its
//! whole duration, `check` included. Operations therefore complete in lock
//! acquisition order, and the compiled ledger's order is exactly the order in
//! which `compile` calls acquired the lock. A rewind sees both ledgers frozen
//! relative to each other.
//!
//! Read-only accessors (`history_ids`, `generation`, `with_state`, ...) take
//! the read lock.
//!
//! Clones of a session are views over the same lock and data.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use ori_repl_history::{AnalysisHistory, DualHistory, HistoryError, Ledger, LineId, Snippet};
use parking_lot::RwLock;

use crate::state::InitError;
use crate::{
    render_diagnostics, BackendState, CompilationSession, CompiledUnit, ReplBackend, ReplOptions,
    SessionError, SessionStatus, SyntaxStatus,
};

/// Outcome of [`ReplSession::check`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CheckResult {
    /// The snippet is complete and syntactically valid.
    Ok,
    /// The snippet needs more text before it can be compiled.
    Incomplete,
    /// Rendered backend diagnostics.
    Error(String),
}

/// Descriptor of a successfully compiled snippet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledSnippet<A> {
    pub id: LineId,
    /// Every line in the compiled history, oldest first, including `id`.
    pub history: Vec<LineId>,
    pub unit_name: String,
    pub has_result: bool,
    pub result_type: Option<String>,
    pub artifact: A,
}

/// Outcome of [`ReplSession::compile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileResult<A> {
    Compiled(CompiledSnippet<A>),
    /// Rendered backend diagnostics. The history is unchanged.
    Error(String),
}

/// Compiled units as stored in the session history.
pub type CompiledHistory<A> = Ledger<CompiledUnit<A>>;

struct SessionInner<B: ReplBackend> {
    state: CompilationSession<B>,
    history: DualHistory<CompiledUnit<B::Artifact>>,
}

struct Shared<B: ReplBackend> {
    backend: B,
    config: B::Config,
    options: ReplOptions,
    inner: RwLock<SessionInner<B>>,
}

/// A REPL session over backend `B`.
pub struct ReplSession<B: ReplBackend> {
    shared: Arc<Shared<B>>,
}

impl<B: ReplBackend> Clone for ReplSession<B> {
    fn clone(&self) -> Self {
        ReplSession {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: ReplBackend> fmt::Debug for ReplSession<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.read();
        f.debug_struct("ReplSession")
            .field("status", &inner.state.status())
            .field("history", &inner.history.ids())
            .field("generation", &inner.history.generation())
            .finish_non_exhaustive()
    }
}

impl<B: ReplBackend> ReplSession<B> {
    /// Create a session. The backend state is built on first use.
    pub fn new(backend: B, config: B::Config) -> Self {
        Self::with_options(backend, config, ReplOptions::default())
    }

    pub fn with_options(backend: B, config: B::Config, options: ReplOptions) -> Self {
        let inner = SessionInner {
            state: CompilationSession::new(),
            history: DualHistory::new(),
        };
        ReplSession {
            shared: Arc::new(Shared {
                backend,
                config,
                options,
                inner: RwLock::new(inner),
            }),
        }
    }

    /// Whether `other` is a view over the same session lock.
    pub fn shares_lock_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn options(&self) -> &ReplOptions {
        &self.shared.options
    }

    /// Syntax-check a snippet. Never touches the history.
    pub fn check(&self, snippet: &Snippet) -> Result<CheckResult, SessionError> {
        let shared = &*self.shared;
        let mut inner = shared.inner.write();
        let SessionInner { state, history } = &mut *inner;
        if history.is_poisoned() {
            return Err(HistoryError::Poisoned.into());
        }

        let state = match state.get_or_init(&shared.backend, &shared.config, &shared.options) {
            Ok(state) => state,
            Err(InitError::Backend(message)) => return Ok(CheckResult::Error(message)),
            Err(InitError::Session(err)) => return Err(err),
        };

        tracing::trace!(line = %snippet.id, "checking snippet");
        let result = match shared.backend.check_syntax(snippet, &shared.config, state) {
            Ok(SyntaxStatus::Complete) => CheckResult::Ok,
            Ok(SyntaxStatus::Incomplete) => CheckResult::Incomplete,
            Err(diagnostics) => {
                CheckResult::Error(render_diagnostics(&diagnostics, &shared.options))
            }
        };
        Ok(result)
    }

    /// Compile a snippet and record it in the history.
    ///
    /// `snippet.id` must extend the history: current generation, sequence
    /// number after the newest line (see [`ReplSession::next_line`]).
    pub fn compile(
        &self,
        snippet: &Snippet,
    ) -> Result<CompileResult<B::Artifact>, SessionError> {
        let shared = &*self.shared;
        let mut inner = shared.inner.write();
        Self::compile_locked(shared, &mut inner, snippet)
    }

    /// Compile `source` as the next line of the history.
    ///
    /// The id is minted under the same write lock the compile holds, so
    /// concurrent callers never race for one id. The assigned id is in
    /// [`CompiledSnippet::id`].
    pub fn compile_next(
        &self,
        source: impl Into<String>,
    ) -> Result<CompileResult<B::Artifact>, SessionError> {
        let shared = &*self.shared;
        let mut inner = shared.inner.write();
        let snippet = Snippet::new(inner.history.next_id(), source);
        Self::compile_locked(shared, &mut inner, &snippet)
    }

    fn compile_locked(
        shared: &Shared<B>,
        inner: &mut SessionInner<B>,
        snippet: &Snippet,
    ) -> Result<CompileResult<B::Artifact>, SessionError> {
        let SessionInner { state, history } = inner;
        if history.is_poisoned() {
            return Err(HistoryError::Poisoned.into());
        }
        if state.status() == SessionStatus::Disposed {
            return Err(SessionError::Disposed);
        }

        // Before the backend sees the snippet, so its analysis ledger stays in step.
        history.check_next(snippet.id)?;

        let state = match state.get_or_init(&shared.backend, &shared.config, &shared.options) {
            Ok(state) => state,
            Err(InitError::Backend(message)) => return Ok(CompileResult::Error(message)),
            Err(InitError::Session(err)) => return Err(err),
        };

        tracing::trace!(line = %snippet.id, "compiling snippet");
        let unit = match shared.backend.compile(state, snippet, history.compiled()) {
            Ok(unit) => unit,
            Err(diagnostics) => {
                tracing::debug!(
                    line = %snippet.id,
                    count = diagnostics.len(),
                    "snippet failed to compile"
                );
                let message = render_diagnostics(&diagnostics, &shared.options);
                return Ok(CompileResult::Error(message));
            }
        };

        let unit = history.record(snippet.id, unit)?.payload.clone();
        Ok(CompileResult::Compiled(CompiledSnippet {
            id: snippet.id,
            history: history.ids(),
            unit_name: unit.name,
            has_result: unit.has_result,
            result_type: unit.result_type,
            artifact: unit.artifact,
        }))
    }

    /// Drop every line from the history. Returns the removed ids, oldest first.
    pub fn reset(&self) -> Result<Vec<LineId>, SessionError> {
        let mut inner = self.shared.inner.write();
        let SessionInner { state, history } = &mut *inner;
        let removed = match state.get_mut()? {
            Some(state) => history.reset(state.analysis_mut())?,
            None => history.reset(&mut Detached)?,
        };
        Ok(removed)
    }

    /// Drop every line after `target`. Returns the removed ids, oldest first.
    ///
    /// An unknown `target` fails with [`HistoryError::LineNotFound`] and
    /// changes nothing.
    pub fn reset_to(&self, target: LineId) -> Result<Vec<LineId>, SessionError> {
        let mut inner = self.shared.inner.write();
        let SessionInner { state, history } = &mut *inner;
        let removed = match state.get_mut()? {
            Some(state) => history.reset_to(state.analysis_mut(), target)?,
            None => history.reset_to(&mut Detached, target)?,
        };
        Ok(removed)
    }

    /// Release the backend state. Idempotent.
    ///
    /// The compiled history stays readable; checks, compiles and rewinds fail
    /// with [`SessionError::Disposed`] afterwards.
    pub fn dispose(&self) {
        self.shared.inner.write().state.dispose();
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.inner.read().state.status()
    }

    /// Whether an earlier rewind found the two ledgers diverged.
    pub fn is_poisoned(&self) -> bool {
        self.shared.inner.read().history.is_poisoned()
    }

    /// Ids of every compiled line, oldest first.
    pub fn history_ids(&self) -> Vec<LineId> {
        self.shared.inner.read().history.ids()
    }

    /// Current history generation.
    pub fn generation(&self) -> u32 {
        self.shared.inner.read().history.generation()
    }

    /// The id the next compiled snippet should carry.
    ///
    /// Another view can take this id before the caller compiles with it;
    /// shared sessions should use [`ReplSession::compile_next`].
    pub fn next_line(&self) -> LineId {
        self.shared.inner.read().history.next_id()
    }

    /// Inspect the compiled history under the read lock.
    pub fn with_history<R>(&self, f: impl FnOnce(&CompiledHistory<B::Artifact>) -> R) -> R {
        f(self.shared.inner.read().history.compiled())
    }

    /// Inspect the backend state under the read lock.
    ///
    /// Fails with [`SessionError::InvalidState`] before the first check or
    /// compile and after disposal.
    pub fn with_state<R>(&self, f: impl FnOnce(&B::State) -> R) -> Result<R, SessionError> {
        let inner = self.shared.inner.read();
        inner.state.get().map(f)
    }
}

/// Analysis history of a session whose backend state was never built.
///
/// Nothing can have been compiled yet, so it never holds an entry.
struct Detached;

impl AnalysisHistory for Detached {
    type Entry = Infallible;

    fn reset(&mut self) -> Result<Vec<Infallible>, HistoryError> {
        Ok(Vec::new())
    }

    fn reset_to(&mut self, target: LineId) -> Result<Vec<Infallible>, HistoryError> {
        Err(HistoryError::LineNotFound(target))
    }

    fn line_of(entry: &Infallible) -> LineId {
        match *entry {}
    }
}

#[cfg(test)]
mod tests;
