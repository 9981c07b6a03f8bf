//! Backend proxy interface.
//!
//! The backend does the real work: lexing, parsing, type checking and code
//! generation of one snippet. The session only sequences calls into it and
//! records what it produces.

use ori_repl_history::{AnalysisHistory, Ledger, Snippet};

use crate::Diagnostic;

/// Outcome of a successful syntax check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxStatus {
    /// The snippet is a complete unit of input.
    Complete,
    /// The snippet is a valid prefix; the caller should ask for more text.
    Incomplete,
}

/// A successfully compiled snippet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledUnit<A> {
    /// Name of the generated unit (e.g. the script class or module name).
    pub name: String,
    /// Whether evaluating the unit produces a result value.
    pub has_result: bool,
    /// Type of the result value, when the backend knows it.
    pub result_type: Option<String>,
    /// Backend-specific compiled artifact.
    pub artifact: A,
}

/// Heavyweight per-session compilation state built by the backend.
///
/// Holds the compilation environment and the analyzer engine. Resources are
/// released when the state is dropped.
pub trait BackendState {
    /// The analyzer's own ledger of analyzed lines.
    type Analysis: AnalysisHistory;

    /// Borrow the analysis ledger for a rewind.
    fn analysis_mut(&mut self) -> &mut Self::Analysis;
}

/// The compiler backend behind a REPL session.
///
/// Every method returns diagnostics on failure; the session renders them and
/// never inspects them further.
pub trait ReplBackend {
    /// Opaque configuration passed unchanged into every call.
    type Config;
    type State: BackendState;
    type Artifact: Clone;

    /// Build the compilation environment and analyzer engine.
    fn create_state(&self, config: &Self::Config) -> Result<Self::State, Vec<Diagnostic>>;

    /// Syntax-only check of a snippet.
    fn check_syntax(
        &self,
        snippet: &Snippet,
        config: &Self::Config,
        state: &Self::State,
    ) -> Result<SyntaxStatus, Vec<Diagnostic>>;

    /// Compile a snippet against the history of previously compiled units.
    ///
    /// On success the backend has recorded the snippet in its analysis ledger
    /// under `snippet.id`.
    fn compile(
        &self,
        state: &mut Self::State,
        snippet: &Snippet,
        history: &Ledger<CompiledUnit<Self::Artifact>>,
    ) -> Result<CompiledUnit<Self::Artifact>, Vec<Diagnostic>>;
}
