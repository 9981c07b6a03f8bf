//! Session options.

/// Configuration for a REPL session, independent of the backend's own
/// configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ReplOptions {
    /// Maximum number of diagnostic lines in an error message (0 = unlimited).
    pub diagnostic_limit: usize,
    /// Drop repeated diagnostic messages.
    pub deduplicate: bool,
}

impl ReplOptions {
    /// Options for interactive use: at most 10 lines, no repeats.
    pub fn concise() -> Self {
        ReplOptions {
            diagnostic_limit: 10,
            deduplicate: true,
        }
    }
}
