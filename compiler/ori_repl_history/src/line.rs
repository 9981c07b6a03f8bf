//! Line identifiers and submitted snippets.

use std::fmt;

/// Position of a snippet in the REPL history.
///
/// `no` is the sequence number, strictly increasing within one generation.
/// `generation` counts rewinds: ids minted after a rewind carry the bumped
/// generation, ids minted before keep theirs.
///
/// Ordering compares `no` first, then `generation`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId {
    /// Sequence number of the line.
    pub no: u32,
    /// Rewind generation the line was minted in.
    pub generation: u32,
}

impl LineId {
    /// Sequence number a fresh (or fully reset) history starts from.
    pub const FIRST: u32 = 0;

    /// Sequence number no ledger accepts, so every recorded line has a
    /// successor.
    pub const LAST: u32 = u32::MAX;

    #[inline]
    pub const fn new(no: u32, generation: u32) -> Self {
        LineId { no, generation }
    }

    /// The id following this one in the same generation, if the sequence
    /// number can still grow.
    #[inline]
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self.no.checked_add(1) {
            Some(no) => Some(LineId {
                no,
                generation: self.generation,
            }),
            None => None,
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} (generation {})", self.no, self.generation)
    }
}

/// One unit of source text submitted to the REPL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Snippet {
    pub id: LineId,
    pub source: String,
}

impl Snippet {
    pub fn new(id: LineId, source: impl Into<String>) -> Self {
        Snippet {
            id,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests;
