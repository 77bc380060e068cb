//! Ordered conversation sequences and transcript rendering
//!
//! A conversation is built fresh from an externally supplied message list at
//! the start of a completion request, mutated only by prepending a system
//! preamble, and discarded once the request completes. Turns are joined by a
//! configured separator token when rendered into a single transcript.

use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, Message};

/// Display-oriented conversation: an ordered sequence of raw messages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Inject a message before the first turn
    pub fn prepend(&mut self, message: Message) -> &mut Self {
        self.messages.insert(0, message);
        self
    }

    /// Render every turn, joined by `"\n" + separator`
    pub fn render(&self, separator: &str) -> String {
        self.messages
            .iter()
            .map(Message::render)
            .collect::<Vec<_>>()
            .join(&format!("\n{separator}"))
    }
}

/// Role-tagged conversation, strictly derived from a display message list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatConversation {
    pub messages: Vec<ChatMessage>,
}

impl ChatConversation {
    /// Derive the role-tagged view of a message list.
    ///
    /// Order is preserved turn for turn; no message is dropped.
    pub fn from_messages(bot_name: &str, messages: &[Message]) -> Self {
        Self {
            messages: messages
                .iter()
                .map(|m| ChatMessage::from_message(bot_name, m))
                .collect(),
        }
    }

    /// Inject a message before the first turn
    pub fn prepend(&mut self, message: ChatMessage) -> &mut Self {
        self.messages.insert(0, message);
        self
    }

    /// Render every turn, joined by `"\n" + separator`
    pub fn render(&self, separator: &str) -> String {
        self.messages
            .iter()
            .map(ChatMessage::render)
            .collect::<Vec<_>>()
            .join(&format!("\n{separator}"))
    }
}

/// Prompt for the legacy single-string completion path.
///
/// The role-tagged path bypasses this entirely and sends a message list
/// directly to the completion API.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub header: Message,
    pub examples: Vec<Conversation>,
    pub convo: Conversation,
}

impl Prompt {
    /// Compose header, example conversations, and the live conversation into
    /// one transcript. Pure string composition; nothing is validated.
    pub fn render(&self, separator: &str) -> String {
        let mut parts = vec![self.header.render()];
        parts.push(Message::new("System", "Example conversations:").render());
        parts.extend(self.examples.iter().map(|c| c.render(separator)));
        parts.push(Message::new("System", "Current conversation:").render());
        parts.push(self.convo.render(separator));
        parts.join(&format!("\n{separator}"))
    }
}
