//! Conversation transcript types.
//!
//! This module contains the record of one user/assistant exchange and the
//! ordered transcript those records form, including the wire representation
//! used by the persisted history file.

use serde::{Deserialize, Serialize};

/// Number of exchanges a transcript may reach before the next turn replaces
/// it with a single summary exchange.
pub const MAX_HISTORY_LENGTH: usize = 8;

/// Query label of the synthetic exchange that stands in for summarized history.
pub const SUMMARY_QUERY: &str = "Previous conversation summary";

/// One completed (query, answer) pair.
///
/// Serialized as a 2-element array `[query, answer]` so that persisted
/// transcripts remain an array of pairs on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Exchange {
    /// What the user asked.
    pub query: String,
    /// What the assistant answered.
    pub answer: String,
}

impl Exchange {
    /// Creates an exchange from a query and its answer.
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
        }
    }

    /// Creates the synthetic exchange that replaces summarized history.
    pub fn summary(answer: impl Into<String>) -> Self {
        Self {
            query: SUMMARY_QUERY.to_string(),
            answer: answer.into(),
        }
    }

    /// Whether this exchange is a summary stand-in rather than a real turn.
    pub fn is_summary(&self) -> bool {
        self.query == SUMMARY_QUERY
    }
}

impl From<(String, String)> for Exchange {
    fn from((query, answer): (String, String)) -> Self {
        Self { query, answer }
    }
}

impl From<Exchange> for (String, String) {
    fn from(exchange: Exchange) -> Self {
        (exchange.query, exchange.answer)
    }
}

/// Ordered history of exchanges for one session.
///
/// Grows by one exchange per completed turn and shrinks only when replaced
/// by a summary exchange. Serializes transparently as an array of pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    exchanges: Vec<Exchange>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded exchanges.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Whether no exchange has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Appends a completed exchange.
    pub fn push(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
    }

    /// Removes and returns the most recent exchange, if any.
    ///
    /// Used to roll back an append when persisting the turn failed, so the
    /// in-memory transcript stays consistent with what is on disk.
    pub fn pop(&mut self) -> Option<Exchange> {
        self.exchanges.pop()
    }

    /// Whether the transcript has grown past [`MAX_HISTORY_LENGTH`].
    pub fn exceeds_limit(&self) -> bool {
        self.exchanges.len() > MAX_HISTORY_LENGTH
    }

    /// Replaces the whole history with a single summary exchange.
    pub fn replace_with_summary(&mut self, summary: Exchange) {
        self.exchanges = vec![summary];
    }

    /// Iterates over exchanges in chronological order.
    pub fn iter(&self) -> std::slice::Iter<'_, Exchange> {
        self.exchanges.iter()
    }

    /// Exchanges in chronological order.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Renders the transcript as prompt text, one `User:`/`CodeOn:` block
    /// per exchange separated by blank lines. Empty transcript renders as
    /// an empty string.
    pub fn to_prompt_text(&self) -> String {
        self.exchanges
            .iter()
            .map(|exchange| format!("User: {}\nCodeOn: {}", exchange.query, exchange.answer))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Exchange;
    type IntoIter = std::slice::Iter<'a, Exchange>;

    fn into_iter(self) -> Self::IntoIter {
        self.exchanges.iter()
    }
}

impl FromIterator<Exchange> for Transcript {
    fn from_iter<T: IntoIterator<Item = Exchange>>(iter: T) -> Self {
        Self {
            exchanges: iter.into_iter().collect(),
        }
    }
}
