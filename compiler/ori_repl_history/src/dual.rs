//! Dual-ledger history.
//!
//! The REPL session owns the compiled ledger. The backend's analyzer owns a
//! second ledger of analyzed lines that must track exactly the same snippets.
//! `DualHistory` never owns that second ledger: each rewind borrows it through
//! the narrow [`AnalysisHistory`] capability, rewinds both, and compares the
//! removed ids pairwise.
//!
//! # Rewind Protocol
//!
//! 1. Validate the target against the compiled ledger, and that its
//!    generation can still grow (nothing is touched otherwise).
//! 2. Rewind the analysis ledger.
//! 3. Rewind the compiled ledger.
//! 4. Compare. Any difference in length or value is a divergence: the history
//!    is poisoned and [`HistoryError::Divergence`] carries both id lists.
//!
//! Once poisoned, every operation fails with [`HistoryError::Poisoned`].

use crate::{HistoryError, Ledger, LedgerEntry, LineId};

/// Rewind capability over a ledger owned by someone else.
///
/// Implemented for every [`Ledger`], which covers backends that keep their
/// analyzed lines in one.
pub trait AnalysisHistory {
    /// A removed analysis entry.
    type Entry;

    /// Remove every entry, oldest first.
    fn reset(&mut self) -> Result<Vec<Self::Entry>, HistoryError>;

    /// Remove every entry after `target`, oldest first.
    fn reset_to(&mut self, target: LineId) -> Result<Vec<Self::Entry>, HistoryError>;

    /// The line an analysis entry belongs to.
    fn line_of(entry: &Self::Entry) -> LineId;
}

impl<T> AnalysisHistory for Ledger<T> {
    type Entry = LedgerEntry<T>;

    fn reset(&mut self) -> Result<Vec<Self::Entry>, HistoryError> {
        self.take_all()
    }

    fn reset_to(&mut self, target: LineId) -> Result<Vec<Self::Entry>, HistoryError> {
        self.take_after(target)
    }

    fn line_of(entry: &Self::Entry) -> LineId {
        entry.id
    }
}

/// Compiled ledger plus the cross-ledger consistency check.
#[derive(Clone, Debug)]
pub struct DualHistory<T> {
    compiled: Ledger<T>,
    poisoned: bool,
}

impl<T> Default for DualHistory<T> {
    fn default() -> Self {
        DualHistory {
            compiled: Ledger::new(),
            poisoned: false,
        }
    }
}

impl<T> DualHistory<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled-unit ledger.
    #[inline]
    pub fn compiled(&self) -> &Ledger<T> {
        &self.compiled
    }

    /// Ids of every compiled line, oldest first.
    pub fn ids(&self) -> Vec<LineId> {
        self.compiled.ids().collect()
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.compiled.generation()
    }

    #[inline]
    pub fn next_id(&self) -> LineId {
        self.compiled.next_id()
    }

    /// Whether an earlier rewind diverged.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Check that `id` may be recorded next.
    pub fn check_next(&self, id: LineId) -> Result<(), HistoryError> {
        self.ensure_healthy()?;
        self.compiled.check_next(id)
    }

    /// Record a compiled unit for `id`.
    pub fn record(&mut self, id: LineId, payload: T) -> Result<&LedgerEntry<T>, HistoryError> {
        self.ensure_healthy()?;
        self.compiled.push(id, payload)
    }

    /// Remove every line from both ledgers.
    ///
    /// Returns the removed compiled ids, oldest first.
    pub fn reset<A>(&mut self, analysis: &mut A) -> Result<Vec<LineId>, HistoryError>
    where
        A: AnalysisHistory,
    {
        self.ensure_healthy()?;
        self.compiled.check_rewind()?;
        let analysis_removed = lines_of::<A>(&analysis.reset()?);
        let compiled_removed = self.compiled.reset()?;
        self.verify(compiled_removed, analysis_removed)
    }

    /// Remove every line after `target` from both ledgers.
    ///
    /// Returns the removed compiled ids, oldest first.
    pub fn reset_to<A>(
        &mut self,
        analysis: &mut A,
        target: LineId,
    ) -> Result<Vec<LineId>, HistoryError>
    where
        A: AnalysisHistory,
    {
        self.ensure_healthy()?;
        if !self.compiled.contains(target) {
            return Err(HistoryError::LineNotFound(target));
        }
        if self.compiled.last().map(|entry| entry.id) != Some(target) {
            self.compiled.check_rewind()?;
        }

        // The compiled ledger knows the target; an analysis ledger that does not
        // has already drifted.
        let analysis_removed = match analysis.reset_to(target) {
            Ok(entries) => Some(lines_of::<A>(&entries)),
            Err(HistoryError::LineNotFound(_)) => None,
            Err(err) => return Err(err),
        };
        let compiled_removed = self.compiled.reset_to(target)?;
        match analysis_removed {
            Some(analysis_removed) => self.verify(compiled_removed, analysis_removed),
            None => Err(self.diverge(compiled_removed, Vec::new())),
        }
    }

    fn verify(
        &mut self,
        compiled: Vec<LineId>,
        analysis: Vec<LineId>,
    ) -> Result<Vec<LineId>, HistoryError> {
        if compiled == analysis {
            tracing::debug!(
                removed = compiled.len(),
                generation = self.compiled.generation(),
                "rewound history"
            );
            Ok(compiled)
        } else {
            Err(self.diverge(compiled, analysis))
        }
    }

    fn diverge(&mut self, compiled: Vec<LineId>, analysis: Vec<LineId>) -> HistoryError {
        tracing::error!(?compiled, ?analysis, "compiled and analysis histories diverged");
        self.poisoned = true;
        HistoryError::Divergence { compiled, analysis }
    }

    fn ensure_healthy(&self) -> Result<(), HistoryError> {
        if self.poisoned {
            Err(HistoryError::Poisoned)
        } else {
            Ok(())
        }
    }
}

fn lines_of<A: AnalysisHistory>(entries: &[A::Entry]) -> Vec<LineId> {
    entries.iter().map(A::line_of).collect()
}
