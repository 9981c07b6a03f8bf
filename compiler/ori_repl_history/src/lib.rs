//! Ori REPL History - Rewindable Line Ledgers
//!
//! The REPL accepts one snippet at a time. Every accepted snippet leaves an
//! entry in two logs maintained by different subsystems:
//!
//! - the **compiled ledger**, owned by the REPL session, holding compiled units
//! - the **analysis ledger**, owned by the backend's analyzer
//!
//! Both logs must always describe the same sequence of lines. This crate
//! provides the pieces that keep them honest:
//!
//! ```text
//! LineId ──► Ledger<T> ──► DualHistory<T>
//!                               │
//!                               └──► &mut impl AnalysisHistory (borrowed per rewind)
//! ```
//!
//! # Design Philosophy
//!
//! - **Append-only, rewindable**: entries are never edited, only dropped from the end
//! - **Generations over mutation**: a rewind bumps the generation for future ids,
//!   existing ids never change
//! - **Fail loudly on drift**: a rewind that removes different lines from the two
//!   ledgers poisons the history instead of being repaired

mod dual;
mod error;
mod ledger;
mod line;

pub use dual::{AnalysisHistory, DualHistory};
pub use error::HistoryError;
pub use ledger::{Ledger, LedgerEntry};
pub use line::{LineId, Snippet};
