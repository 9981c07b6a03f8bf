//! Scriptable in-memory backend.
//!
//! `MockBackend` understands a toy expression syntax, just enough to drive
//! every path through a session:
//!
//! - trailing `=` or unclosed `(`/`{`/`[` is incomplete input
//! - a stray closing bracket is a syntax error
//! - `undefined` anywhere is an unresolved reference at compile time
//! - `val`/`let` snippets are declarations without a result
//! - `#desync` compiles but is left out of the analysis ledger, which makes the
//!   next rewind over it diverge

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ori_repl_history::{Ledger, Snippet};

use crate::{BackendState, CompiledUnit, Diagnostic, ReplBackend, SyntaxStatus};

/// Marker that keeps a snippet out of the analysis ledger.
pub const DESYNC_MARKER: &str = "#desync";

/// Configuration for [`MockBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockConfig {
    pub name: String,
    /// Make `create_state` fail.
    pub fail_init: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        MockConfig {
            name: "default".to_string(),
            fail_init: false,
        }
    }
}

impl MockConfig {
    pub fn named(name: &str) -> Self {
        MockConfig {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        MockConfig {
            fail_init: true,
            ..Self::default()
        }
    }
}

/// Creation and disposal counts, shared with every state the backend builds.
#[derive(Debug, Default)]
pub struct MockCounters {
    created: AtomicUsize,
    disposed: AtomicUsize,
    compiled: AtomicUsize,
}

impl MockCounters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Number of backend compile calls, successful or not.
    pub fn compiled(&self) -> usize {
        self.compiled.load(Ordering::SeqCst)
    }
}

/// One line as seen by the mock analyzer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzedLine {
    pub source: String,
}

/// Compiled artifact of the mock backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockArtifact {
    pub source: String,
    /// Number of earlier units visible to the compile call.
    pub history_len: usize,
}

/// State built by [`MockBackend::create_state`].
#[derive(Debug)]
pub struct MockState {
    /// Creation ordinal, starting at 1.
    pub instance: usize,
    pub config_name: String,
    pub analysis: Ledger<AnalyzedLine>,
    counters: Arc<MockCounters>,
}

impl BackendState for MockState {
    type Analysis = Ledger<AnalyzedLine>;

    fn analysis_mut(&mut self) -> &mut Self::Analysis {
        &mut self.analysis
    }
}

impl Drop for MockState {
    fn drop(&mut self) {
        self.counters.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

type CompileHook = Arc<dyn Fn(&Snippet) + Send + Sync>;

/// In-memory backend for tests.
#[derive(Clone, Default)]
pub struct MockBackend {
    counters: Arc<MockCounters>,
    compile_hook: Option<CompileHook>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` at the start of every compile call.
    ///
    /// The hook runs while the session holds its write lock, which lets tests
    /// force interleavings between threads.
    #[must_use]
    pub fn with_compile_hook(mut self, hook: impl Fn(&Snippet) + Send + Sync + 'static) -> Self {
        self.compile_hook = Some(Arc::new(hook));
        self
    }

    pub fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }
}

impl ReplBackend for MockBackend {
    type Config = MockConfig;
    type State = MockState;
    type Artifact = MockArtifact;

    fn create_state(&self, config: &MockConfig) -> Result<MockState, Vec<Diagnostic>> {
        if config.fail_init {
            return Err(vec![Diagnostic::new("environment unavailable")]);
        }
        let instance = self.counters.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MockState {
            instance,
            config_name: config.name.clone(),
            analysis: Ledger::new(),
            counters: Arc::clone(&self.counters),
        })
    }

    fn check_syntax(
        &self,
        snippet: &Snippet,
        _config: &MockConfig,
        _state: &MockState,
    ) -> Result<SyntaxStatus, Vec<Diagnostic>> {
        scan(&snippet.source)
    }

    fn compile(
        &self,
        state: &mut MockState,
        snippet: &Snippet,
        history: &Ledger<CompiledUnit<MockArtifact>>,
    ) -> Result<CompiledUnit<MockArtifact>, Vec<Diagnostic>> {
        self.counters.compiled.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.compile_hook {
            hook(snippet);
        }

        let source = snippet.source.trim();
        if scan(source)? == SyntaxStatus::Incomplete {
            return Err(vec![Diagnostic::new("incomplete input")]);
        }
        if source.contains("undefined") {
            return Err(vec![Diagnostic::new("unresolved reference: undefined")]);
        }

        if !source.contains(DESYNC_MARKER) {
            let line = AnalyzedLine {
                source: source.to_string(),
            };
            state
                .analysis
                .push(snippet.id, line)
                .map_err(|err| vec![Diagnostic::new(err.to_string())])?;
        }

        let is_declaration = source.starts_with("val ") || source.starts_with("let ");
        let result_type = if is_declaration {
            None
        } else if is_arithmetic(source) {
            Some("int".to_string())
        } else {
            Some("str".to_string())
        };

        Ok(CompiledUnit {
            name: format!("Line_{}_gen_{}", snippet.id.no, snippet.id.generation),
            has_result: !is_declaration,
            result_type,
            artifact: MockArtifact {
                source: source.to_string(),
                history_len: history.len(),
            },
        })
    }
}

fn scan(source: &str) -> Result<SyntaxStatus, Vec<Diagnostic>> {
    let mut depth: usize = 0;
    let mut errors = Vec::new();
    for ch in source.chars() {
        match ch {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => match depth.checked_sub(1) {
                Some(next) => depth = next,
                None => errors.push(Diagnostic::new(format!("unexpected `{ch}`"))),
            },
            _ => {}
        }
    }

    if !errors.is_empty() {
        Err(errors)
    } else if depth > 0 || source.trim_end().ends_with('=') {
        Ok(SyntaxStatus::Incomplete)
    } else {
        Ok(SyntaxStatus::Complete)
    }
}

fn is_arithmetic(source: &str) -> bool {
    source
        .chars()
        .all(|ch| ch.is_ascii_digit() || ch.is_whitespace() || "+-*/()".contains(ch))
}
