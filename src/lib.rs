//! Chat Relay - LLM completion mediator for a chat bot runtime
//!
//! Renders a bounded conversation history into a completion request,
//! classifies the outcome into one of six tags, and routes the result back
//! to the originating conversation thread:
//! - Message/conversation model with a display view and a derived
//!   role-tagged view
//! - Response classifier over the completion and moderation collaborators
//! - Outcome dispatcher mapping each tag to one thread side effect
//!
//! The bot runtime plugs in through the [`delivery::ChatThread`] and
//! [`moderation::ModerationAlerts`] traits; completion and moderation ship
//! with OpenAI-compatible HTTP implementations.
//!
//! # Example
//!
//! ```ignore
//! use chat_relay::{BotConfig, ChatEngine, OpenAiClient, OpenAiModeration};
//! use chat_relay::types::Message;
//! use std::sync::Arc;
//!
//! # async fn run(thread: &dyn chat_relay::delivery::ChatThread,
//! #              alerts: &dyn chat_relay::moderation::ModerationAlerts)
//! #              -> anyhow::Result<()> {
//! let config = BotConfig::load()?;
//! let completion = Arc::new(OpenAiClient::from_env()?);
//! let moderation = Arc::new(OpenAiModeration::new("sk-...", config.moderation));
//! let engine = ChatEngine::new(config, completion, moderation);
//!
//! let history = vec![Message::new("alice", "hi")];
//! let outcome = engine.generate_chat_response(&history, "alice").await;
//! chat_relay::dispatch::process_response("alice", thread, alerts, outcome).await?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod types;
pub mod conversation;
pub mod config;
pub mod completion;
pub mod moderation;
pub mod chat;
pub mod delivery;
pub mod dispatch;

// Re-export commonly used types for convenience
pub use chat::{ChatData, ChatEngine, ChatResult};
pub use completion::{CompletionBackend, CompletionError, OpenAiClient};
pub use config::BotConfig;
pub use conversation::{ChatConversation, Conversation, Prompt};
pub use dispatch::process_response;
pub use moderation::{ModerationBackend, ModerationVerdict, OpenAiModeration};
pub use types::{ChatMessage, Message, Role};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging for hosts that do not bring their own subscriber
/// (WARN level by default, use RUST_LOG=debug for more)
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();
}
