//! Conversation turn orchestration.
//!
//! `ConversationEngine` drives one question/answer turn: gather code
//! context, compact oversized history, assemble the prompt, generate the
//! answer, and persist the updated transcript.

use codeon_core::clients::{GenerateOptions, GenerationClient, RetrievalClient};
use codeon_core::error::Result;
use codeon_core::history::HistoryRepository;
use codeon_core::transcript::{Exchange, MAX_HISTORY_LENGTH, Transcript};
use std::sync::Arc;

/// Number of code snippets requested per question.
pub const RETRIEVAL_K: usize = 10;

/// Context block used when no snippets are available.
pub const NO_CONTEXT_PLACEHOLDER: &str =
    "No specific code context available from vector database.";

const CHAT_PREAMBLE: &str = "You are CodeOn, a CLI-based code improvement and debugging \
     assistant. Use the following code context to answer the user's question. Be concise, \
     helpful, and insightful.";

/// Drives the ask-and-answer loop over injected service boundaries.
///
/// The engine owns the in-memory transcript for the session and keeps it
/// consistent with the persisted copy: an exchange is recorded only when
/// the whole turn, including persistence, succeeded. Turns are strictly
/// sequential; `turn` takes `&mut self` and awaits every step in order.
pub struct ConversationEngine {
    /// Client used for answers and history summaries
    generation: Arc<dyn GenerationClient>,
    /// Optional snippet search; `None` disables code context
    retrieval: Option<Arc<dyn RetrievalClient>>,
    /// Storage backend for the transcript
    history: Arc<dyn HistoryRepository>,
    /// Exchanges recorded so far, oldest first
    transcript: Transcript,
}

impl ConversationEngine {
    /// Creates an engine and restores the persisted transcript.
    ///
    /// # Arguments
    ///
    /// * `generation` - Client used for answers and history summaries
    /// * `retrieval` - Optional snippet search client
    /// * `history` - Storage backend for the transcript
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted transcript cannot be read.
    pub async fn new(
        generation: Arc<dyn GenerationClient>,
        retrieval: Option<Arc<dyn RetrievalClient>>,
        history: Arc<dyn HistoryRepository>,
    ) -> Result<Self> {
        let transcript = history.load().await?;
        if !transcript.is_empty() {
            tracing::info!(
                "[ConversationEngine] Restored {} previous exchange(s)",
                transcript.len()
            );
        }

        Ok(Self {
            generation,
            retrieval,
            history,
            transcript,
        })
    }

    /// Exchanges recorded for the current session.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs one full conversation turn and returns the answer.
    ///
    /// 1. Retrieves code snippets for the question; any retrieval problem
    ///    degrades to the no-context placeholder instead of failing.
    /// 2. Summarizes the history first when it has grown past
    ///    [`MAX_HISTORY_LENGTH`] exchanges.
    /// 3. Assembles the prompt and generates the answer.
    /// 4. Appends the exchange and persists the transcript. If persisting
    ///    fails the append is rolled back, so a retried turn re-sends the
    ///    same history.
    ///
    /// # Errors
    ///
    /// Returns an error if summarization, generation, or persistence fails.
    /// The transcript on disk is never left ahead of the one in memory.
    pub async fn turn(&mut self, query: &str) -> Result<String> {
        let context = self.retrieve_context(query).await;

        if self.transcript.exceeds_limit() {
            self.summarize_history().await?;
        }

        let prompt = build_chat_prompt(&context, &self.transcript, query);
        let answer = self
            .generation
            .generate(&prompt, &GenerateOptions::default())
            .await?
            .trim()
            .to_string();

        self.transcript.push(Exchange::new(query, answer.clone()));
        if let Err(err) = self.history.save(&self.transcript).await {
            tracing::error!(
                "[ConversationEngine] Failed to persist history, dropping the exchange: {err}"
            );
            self.transcript.pop();
            return Err(err);
        }

        Ok(answer)
    }

    /// Fetches snippets for the question and formats them as a numbered
    /// context block. Missing client, empty results, and retrieval errors
    /// all yield the placeholder; an unreachable search service must not
    /// take the conversation down with it.
    async fn retrieve_context(&self, query: &str) -> String {
        let Some(retrieval) = &self.retrieval else {
            tracing::debug!("[ConversationEngine] No snippet search configured");
            return NO_CONTEXT_PLACEHOLDER.to_string();
        };

        match retrieval.retrieve(query, RETRIEVAL_K).await {
            Ok(snippets) if snippets.is_empty() => NO_CONTEXT_PLACEHOLDER.to_string(),
            Ok(snippets) => format_snippets(&snippets),
            Err(err) => {
                tracing::warn!(
                    "[ConversationEngine] Snippet search failed, continuing without context: {err}"
                );
                NO_CONTEXT_PLACEHOLDER.to_string()
            }
        }
    }

    /// Replaces the transcript with a single summary exchange.
    ///
    /// # Errors
    ///
    /// Propagates generation failures; the transcript is left untouched in
    /// that case, in memory and on disk.
    async fn summarize_history(&mut self) -> Result<()> {
        tracing::info!(
            "[ConversationEngine] History exceeds {MAX_HISTORY_LENGTH} exchanges, summarizing"
        );

        let prompt = format!(
            "Summarize this conversation: {}",
            self.transcript.to_prompt_text()
        );
        let summary = self
            .generation
            .generate(&prompt, &GenerateOptions::default())
            .await?
            .trim()
            .to_string();

        self.transcript.replace_with_summary(Exchange::summary(summary));
        Ok(())
    }
}

/// Formats snippets as `[1] …` blocks separated by blank lines.
fn format_snippets(snippets: &[String]) -> String {
    snippets
        .iter()
        .enumerate()
        .map(|(i, snippet)| format!("[{}] {snippet}", i + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assembles the chat prompt from context, history, and the new question.
fn build_chat_prompt(context: &str, transcript: &Transcript, query: &str) -> String {
    format!(
        "{CHAT_PREAMBLE}\n\nCode Context:\n{context}\n\nChat History:\n{}\n\nNew Question:\n{query}\n\nAnswer:",
        transcript.to_prompt_text()
    )
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
