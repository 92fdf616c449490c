//! Score persistence
//!
//! Round results go to a document store through a [`ScoreBook`]. The game
//! only sees the [`ResultReporter`] seam, optionally behind a
//! [`DeferredReporter`] so saving never runs inside a frame. Stores can be
//! swapped for tests, native play (one JSON file) or the browser
//! (LocalStorage).

pub mod deferred;
pub mod document;
pub mod scorebook;
pub mod store;

pub use deferred::DeferredReporter;
pub use document::{Document, merge};
pub use scorebook::{Player, ProgressUpdate, RoundRecord, ScoreBook, ScoreRecord, UserStats};
#[cfg(not(target_arch = "wasm32"))]
pub use store::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;
pub use store::{DocumentStore, MemoryStore};

use crate::sim::RoundReport;

/// Receives the final result of every round, exactly once per round
pub trait ResultReporter {
    fn report(&mut self, report: &RoundReport) -> crate::Result<()>;
}

/// Reporter that drops results, for guests and demos
#[derive(Debug, Default)]
pub struct NullReporter;

impl ResultReporter for NullReporter {
    fn report(&mut self, report: &RoundReport) -> crate::Result<()> {
        log::debug!("Discarding round result: {} points", report.score);
        Ok(())
    }
}
