//! Lazily-initialized compilation state.
//!
//! The backend's compilation environment is expensive, so it is built on the
//! first check or compile and kept for the rest of the session.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──get_or_init──► Initialized ──dispose──► Disposed
//!       │                                                    ▲
//!       └────────────────────────dispose─────────────────────┘
//! ```
//!
//! `Disposed` is terminal. The raw slot is never exposed, so callers cannot
//! step around the state machine.

use crate::{render_diagnostics, ReplBackend, ReplOptions, SessionError};

/// Lifecycle phase of a [`CompilationSession`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Uninitialized,
    Initialized,
    Disposed,
}

enum Lifecycle<S> {
    Uninitialized,
    Initialized(S),
    Disposed,
}

/// Why [`CompilationSession::get_or_init`] produced no state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitError {
    /// The backend failed to build the state. Rendered diagnostics.
    Backend(String),
    /// The session was torn down.
    Session(SessionError),
}

/// Owner of the backend state for one REPL session.
pub struct CompilationSession<B: ReplBackend> {
    lifecycle: Lifecycle<B::State>,
}

impl<B: ReplBackend> Default for CompilationSession<B> {
    fn default() -> Self {
        CompilationSession {
            lifecycle: Lifecycle::Uninitialized,
        }
    }
}

impl<B: ReplBackend> CompilationSession<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        match self.lifecycle {
            Lifecycle::Uninitialized => SessionStatus::Uninitialized,
            Lifecycle::Initialized(_) => SessionStatus::Initialized,
            Lifecycle::Disposed => SessionStatus::Disposed,
        }
    }

    /// Return the state, building it from `config` on first use.
    ///
    /// Later calls return the same state and ignore `config`. A backend
    /// failure leaves the session uninitialized so the next call retries.
    pub fn get_or_init(
        &mut self,
        backend: &B,
        config: &B::Config,
        options: &ReplOptions,
    ) -> Result<&mut B::State, InitError> {
        if let Lifecycle::Uninitialized = self.lifecycle {
            let state = backend
                .create_state(config)
                .map_err(|diagnostics| InitError::Backend(render_diagnostics(&diagnostics, options)))?;
            tracing::debug!("initialized compilation session");
            self.lifecycle = Lifecycle::Initialized(state);
        }

        match &mut self.lifecycle {
            Lifecycle::Initialized(state) => Ok(state),
            Lifecycle::Disposed => Err(InitError::Session(SessionError::Disposed)),
            Lifecycle::Uninitialized => Err(InitError::Session(SessionError::InvalidState)),
        }
    }

    /// Read the state without initializing it.
    pub fn get(&self) -> Result<&B::State, SessionError> {
        match &self.lifecycle {
            Lifecycle::Initialized(state) => Ok(state),
            Lifecycle::Uninitialized | Lifecycle::Disposed => Err(SessionError::InvalidState),
        }
    }

    /// Mutable access to an existing state.
    ///
    /// `Ok(None)` while uninitialized; disposal is an error.
    pub fn get_mut(&mut self) -> Result<Option<&mut B::State>, SessionError> {
        match &mut self.lifecycle {
            Lifecycle::Initialized(state) => Ok(Some(state)),
            Lifecycle::Uninitialized => Ok(None),
            Lifecycle::Disposed => Err(SessionError::Disposed),
        }
    }

    /// Release the state. Idempotent; the session cannot be reinitialized.
    pub fn dispose(&mut self) {
        let previous = std::mem::replace(&mut self.lifecycle, Lifecycle::Disposed);
        if let Lifecycle::Initialized(state) = previous {
            drop(state);
            tracing::debug!("disposed compilation session");
        }
    }
}
