//! History errors.

use thiserror::Error;

use crate::LineId;

/// Failure of a ledger or dual-history operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Rewind target is not in the ledger. Nothing was removed.
    #[error("cannot rewind to {0}: no such line in history")]
    LineNotFound(LineId),

    /// A caller-minted id does not extend the ledger.
    #[error("{id} does not follow the history (current generation {generation}, newest line {})", newest_display(.after))]
    OutOfOrder {
        id: LineId,
        generation: u32,
        after: Option<u32>,
    },

    /// The id uses the reserved last sequence number.
    #[error("{0} is past the last line a history can hold")]
    SequenceExhausted(LineId),

    /// Rewinding would need a generation past `u32::MAX`. Nothing was removed.
    #[error("cannot rewind past generation {0}")]
    GenerationExhausted(u32),

    /// The compiled and analysis ledgers removed different lines on a rewind.
    ///
    /// Fatal: the history is poisoned and every later operation fails with
    /// [`HistoryError::Poisoned`].
    #[error("history divergence: compiled ledger removed {compiled:?}, analysis ledger removed {analysis:?}")]
    Divergence {
        compiled: Vec<LineId>,
        analysis: Vec<LineId>,
    },

    /// An earlier divergence left the history unusable.
    #[error("history is unusable after an earlier divergence")]
    Poisoned,
}

impl HistoryError {
    /// Whether the error leaves the history unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HistoryError::Divergence { .. } | HistoryError::Poisoned)
    }
}

fn newest_display(after: &Option<u32>) -> String {
    match after {
        Some(no) => no.to_string(),
        None => "none".to_string(),
    }
}
