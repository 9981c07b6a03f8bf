//! Append-only, rewindable log of `(LineId, payload)` entries.
//!
//! Insertion order is chronological order. Sequence numbers only grow: within
//! a generation they are strictly increasing, and after a partial rewind the
//! next line continues from the kept tail in a new generation.
//!
//! # Rewinds
//!
//! | operation | removes | generation |
//! |---|---|---|
//! | [`Ledger::reset`] | everything | always bumped |
//! | [`Ledger::reset_to`] | entries after the target | bumped if anything was removed |
//!
//! Removed ids are returned oldest-first.
//!
//! Neither counter wraps. [`LineId::LAST`] is never recorded, and a rewind
//! that would need a generation past `u32::MAX` fails without removing
//! anything.

use crate::{HistoryError, LineId};

/// One ledger entry. Owned by its ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry<T> {
    pub id: LineId,
    pub payload: T,
}

/// Append-only log of entries for one payload type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger<T> {
    entries: Vec<LedgerEntry<T>>,
    generation: u32,
}

impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Ledger {
            entries: Vec::new(),
            generation: 0,
        }
    }
}

impl<T> Ledger<T> {
    /// Create an empty ledger in generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation new ids are minted in.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    #[inline]
    pub fn entries(&self) -> &[LedgerEntry<T>] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LedgerEntry<T>> {
        self.entries.iter()
    }

    /// Ids of all entries, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = LineId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    /// The newest entry.
    pub fn last(&self) -> Option<&LedgerEntry<T>> {
        self.entries.last()
    }

    pub fn get(&self, id: LineId) -> Option<&LedgerEntry<T>> {
        self.position(id).map(|idx| &self.entries[idx])
    }

    pub fn contains(&self, id: LineId) -> bool {
        self.position(id).is_some()
    }

    /// The id [`Ledger::append`] would assign next.
    ///
    /// Recorded lines stay below [`LineId::LAST`], so this never overflows.
    pub fn next_id(&self) -> LineId {
        let no = match self.entries.last() {
            Some(entry) => entry.id.successor().map_or(LineId::LAST, |next| next.no),
            None => LineId::FIRST,
        };
        LineId::new(no, self.generation)
    }

    /// Append a payload under a freshly minted id.
    ///
    /// Fails with [`HistoryError::SequenceExhausted`] once the minted id would
    /// be [`LineId::LAST`].
    pub fn append(&mut self, payload: T) -> Result<&LedgerEntry<T>, HistoryError> {
        let id = self.next_id();
        self.push(id, payload)
    }

    /// Check that `id` may be pushed without modifying the ledger.
    ///
    /// The id must belong to the current generation and its sequence number
    /// must be greater than the newest entry's and below [`LineId::LAST`].
    pub fn check_next(&self, id: LineId) -> Result<(), HistoryError> {
        if id.no == LineId::LAST {
            return Err(HistoryError::SequenceExhausted(id));
        }
        let after = self.entries.last().map(|entry| entry.id.no);
        let in_order = after.map_or(true, |no| id.no > no);
        if id.generation == self.generation && in_order {
            Ok(())
        } else {
            Err(HistoryError::OutOfOrder {
                id,
                generation: self.generation,
                after,
            })
        }
    }

    /// Append a payload under a caller-minted id.
    pub fn push(&mut self, id: LineId, payload: T) -> Result<&LedgerEntry<T>, HistoryError> {
        self.check_next(id)?;
        Ok(self.insert(id, payload))
    }

    /// Remove every entry. Returns the removed ids, oldest first.
    pub fn reset(&mut self) -> Result<Vec<LineId>, HistoryError> {
        self.take_all().map(Self::ids_of)
    }

    /// Remove every entry after `target`, keeping `target` itself.
    ///
    /// Returns the removed ids, oldest first. An unknown target is an error
    /// and leaves the ledger untouched.
    pub fn reset_to(&mut self, target: LineId) -> Result<Vec<LineId>, HistoryError> {
        self.take_after(target).map(Self::ids_of)
    }

    /// Remove and return every entry. Bumps the generation.
    ///
    /// Fails with [`HistoryError::GenerationExhausted`], removing nothing,
    /// when the generation cannot grow.
    pub fn take_all(&mut self) -> Result<Vec<LedgerEntry<T>>, HistoryError> {
        self.generation = self.bumped_generation()?;
        Ok(std::mem::take(&mut self.entries))
    }

    /// Remove and return the entries after `target`.
    ///
    /// Bumps the generation when at least one entry was removed.
    pub fn take_after(&mut self, target: LineId) -> Result<Vec<LedgerEntry<T>>, HistoryError> {
        let idx = self
            .position(target)
            .ok_or(HistoryError::LineNotFound(target))?;
        if idx + 1 == self.entries.len() {
            return Ok(Vec::new());
        }
        self.generation = self.bumped_generation()?;
        Ok(self.entries.split_off(idx + 1))
    }

    /// Fail unless a rewind could bump the generation.
    pub fn check_rewind(&self) -> Result<(), HistoryError> {
        self.bumped_generation().map(|_| ())
    }

    fn bumped_generation(&self) -> Result<u32, HistoryError> {
        self.generation
            .checked_add(1)
            .ok_or(HistoryError::GenerationExhausted(self.generation))
    }

    fn insert(&mut self, id: LineId, payload: T) -> &LedgerEntry<T> {
        let idx = self.entries.len();
        self.entries.push(LedgerEntry { id, payload });
        &self.entries[idx]
    }

    // Sequence numbers are strictly increasing, so the entries are sorted by `no`.
    fn position(&self, id: LineId) -> Option<usize> {
        let idx = self
            .entries
            .binary_search_by_key(&id.no, |entry| entry.id.no)
            .ok()?;
        (self.entries[idx].id == id).then_some(idx)
    }

    fn ids_of(entries: Vec<LedgerEntry<T>>) -> Vec<LineId> {
        entries.into_iter().map(|entry| entry.id).collect()
    }
}

impl<'a, T> IntoIterator for &'a Ledger<T> {
    type Item = &'a LedgerEntry<T>;
    type IntoIter = std::slice::Iter<'a, LedgerEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
