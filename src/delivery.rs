//! Thread delivery boundary toward the bot runtime
//!
//! The dispatcher never talks to a chat platform directly; it goes through
//! [`ChatThread`], one instance per conversation thread. Reply text longer
//! than the runtime can deliver in one message is cut into chunks first.

use anyhow::Result;
use async_trait::async_trait;

/// Longest chunk the runtime is asked to deliver in one message
pub const MAX_CHUNK_CHARS: usize = 1500;

/// Severity of a banner shown in the thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A visible banner appended to the thread instead of a chat reply
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

/// One conversation thread in the bot runtime
#[async_trait]
pub trait ChatThread: Send + Sync {
    /// Deliver one chunk of reply text. Returns a permalink to the delivered
    /// message when the runtime exposes one.
    async fn send(&self, text: &str) -> Result<Option<String>>;

    /// Append a visible banner to the thread
    async fn notify(&self, notice: Notice) -> Result<()>;

    /// Close/archive the thread; nothing is delivered afterwards
    async fn close(&self) -> Result<()>;
}

/// Split reply text into chunks of at most [`MAX_CHUNK_CHARS`] chars.
///
/// Cuts on char boundaries, preserves order, drops nothing. Empty input
/// yields no chunks.
pub fn split_into_chunks(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        if count == MAX_CHUNK_CHARS {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(split_into_chunks("hello"), vec!["hello"]);
    }

    #[test]
    fn long_text_splits_at_the_limit() {
        let text = "x".repeat(MAX_CHUNK_CHARS * 2 + 100);
        let chunks = split_into_chunks(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), MAX_CHUNK_CHARS);
        assert_eq!(chunks[1].chars().count(), MAX_CHUNK_CHARS);
        assert_eq!(chunks[2].chars().count(), 100);
    }

    #[test]
    fn chunks_reassemble_to_the_input() {
        let text = "猫".repeat(MAX_CHUNK_CHARS + 7);
        let chunks = split_into_chunks(&text);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_into_chunks("").is_empty());
    }
}
