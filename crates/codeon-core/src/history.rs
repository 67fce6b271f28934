//! History repository trait.
//!
//! Defines the interface for transcript persistence operations.

use crate::error::Result;
use crate::transcript::Transcript;
use async_trait::async_trait;

/// An abstract repository for persisting the conversation transcript.
///
/// This trait decouples the conversation engine from the storage mechanism.
/// The contract is deliberately forgiving on the read side: a missing or
/// undecodable store yields an empty transcript so a session can always
/// start.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Loads the persisted transcript.
    ///
    /// # Returns
    ///
    /// - `Ok(Transcript)`: the stored history; empty when nothing was
    ///   persisted yet or the stored state was malformed (malformed state
    ///   is logged and discarded, never fatal)
    /// - `Err(_)`: the store exists but could not be read at all
    async fn load(&self) -> Result<Transcript>;

    /// Persists the transcript, fully replacing the previous state.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the transcript is durably stored
    /// - `Err(_)`: nothing was replaced; the previous state is intact
    async fn save(&self, transcript: &Transcript) -> Result<()>;
}
