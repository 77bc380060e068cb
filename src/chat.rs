//! Response classification: one completion request in, one tagged outcome out
//!
//! [`ChatEngine`] owns the configuration plus the completion and moderation
//! collaborators and exposes the single entry point into the pipeline,
//! [`ChatEngine::generate_chat_response`]. Classification is total: every
//! call path terminates in exactly one of the six [`ChatResult`] tags, so the
//! dispatcher can match exhaustively with no fallback error branch.

use std::sync::Arc;

use tracing::error;

use crate::completion::{CompletionBackend, CompletionError};
use crate::config::BotConfig;
use crate::conversation::ChatConversation;
use crate::moderation::ModerationBackend;
use crate::types::{ChatMessage, Message, Role};

/// How much transcript tail the moderation classifier sees
const MODERATION_PROBE_CHARS: usize = 500;

/// Provider phrase identifying an oversized conversation
const CONTEXT_LENGTH_MARKER: &str = "maximum context length";

/// Classification of one completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatResult {
    Ok,
    TooLong,
    InvalidRequest,
    OtherError,
    ModerationFlagged,
    ModerationBlocked,
}

/// Outcome of one completion request.
///
/// Produced exactly once per request and consumed exactly once by the
/// dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatData {
    pub status: ChatResult,
    pub reply_text: Option<String>,
    pub status_text: Option<String>,
}

impl ChatData {
    fn failure(status: ChatResult, status_text: String) -> Self {
        Self {
            status,
            reply_text: None,
            status_text: Some(status_text),
        }
    }
}

/// Classifier over the completion and moderation collaborators
pub struct ChatEngine {
    config: BotConfig,
    completion: Arc<dyn CompletionBackend>,
    moderation: Arc<dyn ModerationBackend>,
}

impl ChatEngine {
    pub fn new(
        config: BotConfig,
        completion: Arc<dyn CompletionBackend>,
        moderation: Arc<dyn ModerationBackend>,
    ) -> Self {
        Self {
            config,
            completion,
            moderation,
        }
    }

    /// Turn a message history plus the invoking user's identity into a
    /// tagged outcome.
    ///
    /// The role-tagged conversation is derived fresh from `messages`, the
    /// persona preamble is prepended, and the completion plus moderation
    /// calls are awaited sequentially. No error escapes this boundary.
    pub async fn generate_chat_response(&self, messages: &[Message], user: &str) -> ChatData {
        let mut conv = ChatConversation::from_messages(&self.config.name, messages);
        conv.prepend(ChatMessage::new(
            Role::System,
            self.config.instructions.clone(),
        ));

        let reply = match self
            .completion
            .complete(&self.config.model, &conv.messages)
            .await
        {
            Ok(reply) => reply,
            Err(CompletionError::InvalidRequest(message)) => {
                return if message.contains(CONTEXT_LENGTH_MARKER) {
                    ChatData::failure(ChatResult::TooLong, message)
                } else {
                    error!("completion request rejected: {}", message);
                    ChatData::failure(ChatResult::InvalidRequest, message)
                };
            }
            Err(err) => {
                error!("completion failed: {}", err);
                return ChatData::failure(ChatResult::OtherError, err.to_string());
            }
        };

        if let Some(reply) = reply.as_deref().filter(|r| !r.is_empty()) {
            let transcript = conv.render(&self.config.separator);
            let probe = tail_chars(&format!("{transcript}{reply}"), MODERATION_PROBE_CHARS);

            let verdict = match self.moderation.moderate(&probe, user).await {
                Ok(verdict) => verdict,
                Err(err) => {
                    error!("moderation failed: {:#}", err);
                    return ChatData::failure(ChatResult::OtherError, err.to_string());
                }
            };

            // Blocked takes precedence over flagged
            if verdict.is_blocked() {
                return ChatData {
                    status: ChatResult::ModerationBlocked,
                    reply_text: Some(reply.to_string()),
                    status_text: Some(format!("from_response:{}", verdict.blocked)),
                };
            }
            if verdict.is_flagged() {
                return ChatData {
                    status: ChatResult::ModerationFlagged,
                    reply_text: Some(reply.to_string()),
                    status_text: Some(format!("from_response:{}", verdict.flagged)),
                };
            }
        }

        // An empty or absent reply is still OK; the dispatcher surfaces it
        // as a distinct empty-response case
        ChatData {
            status: ChatResult::Ok,
            reply_text: reply,
            status_text: None,
        }
    }
}

/// Last `limit` chars of `text`, never splitting a code point
fn tail_chars(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    text.chars().skip(count - limit).collect()
}
