//! Backend diagnostics and their plain-text rendering.
//!
//! The session does no structured rendering: messages are joined with
//! newlines, optionally deduplicated and capped per [`ReplOptions`].

use std::fmt;

use crate::ReplOptions;

/// A message reported by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Join diagnostic messages into one newline-separated string.
pub fn render_diagnostics(diagnostics: &[Diagnostic], options: &ReplOptions) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(diagnostics.len());
    for diagnostic in diagnostics {
        let message = diagnostic.message.as_str();
        if options.deduplicate && lines.contains(&message) {
            continue;
        }
        lines.push(message);
    }

    let limit = options.diagnostic_limit;
    if limit == 0 || lines.len() <= limit {
        return lines.join("\n");
    }

    let hidden = lines.len() - limit;
    lines.truncate(limit);
    let mut rendered = lines.join("\n");
    rendered.push_str(&format!("\n... and {hidden} more"));
    rendered
}
