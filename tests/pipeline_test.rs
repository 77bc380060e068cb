//! End-to-end pipeline tests: classify a completion outcome, then dispatch it

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chat_relay::chat::ChatEngine;
use chat_relay::completion::{CompletionBackend, CompletionError};
use chat_relay::delivery::{ChatThread, Notice, Severity};
use chat_relay::dispatch::process_response;
use chat_relay::moderation::{ModerationAlerts, ModerationBackend, ModerationVerdict};
use chat_relay::types::{ChatMessage, Message};
use chat_relay::BotConfig;

/// Completion backend with a scripted outcome
struct ScriptedCompletion(Mutex<Option<Result<Option<String>, CompletionError>>>);

impl ScriptedCompletion {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(Some(Ok(Some(reply.to_string()))))))
    }

    fn rejecting(message: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(Some(Err(CompletionError::InvalidRequest(
            message.to_string(),
        ))))))
    }
}

#[async_trait::async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn complete(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
    ) -> Result<Option<String>, CompletionError> {
        self.0.lock().unwrap().take().expect("completion re-used")
    }
}

/// Moderation backend with a fixed verdict
struct FixedModeration(ModerationVerdict);

impl FixedModeration {
    fn clean() -> Arc<Self> {
        Arc::new(Self(ModerationVerdict::clean()))
    }

    fn verdict(flagged: &str, blocked: &str) -> Arc<Self> {
        Arc::new(Self(ModerationVerdict {
            flagged: flagged.to_string(),
            blocked: blocked.to_string(),
        }))
    }
}

#[async_trait::async_trait]
impl ModerationBackend for FixedModeration {
    async fn moderate(&self, _text: &str, _user: &str) -> Result<ModerationVerdict> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Sent(String),
    Noticed(Severity, String),
    Closed,
    FlaggedAlert(String),
    BlockedAlert(String),
}

/// Thread and alert channel recording everything in arrival order
#[derive(Default)]
struct FakeRuntime {
    events: Mutex<Vec<Event>>,
}

impl FakeRuntime {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait::async_trait]
impl ChatThread for FakeRuntime {
    async fn send(&self, text: &str) -> Result<Option<String>> {
        self.push(Event::Sent(text.to_string()));
        Ok(Some("https://chat.example/m/1".to_string()))
    }

    async fn notify(&self, notice: Notice) -> Result<()> {
        self.push(Event::Noticed(notice.severity, notice.text));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.push(Event::Closed);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ModerationAlerts for FakeRuntime {
    async fn flagged(
        &self,
        _user: &str,
        category: &str,
        _message: &str,
        _url: Option<&str>,
    ) -> Result<()> {
        self.push(Event::FlaggedAlert(category.to_string()));
        Ok(())
    }

    async fn blocked(&self, _user: &str, category: &str, _message: &str) -> Result<()> {
        self.push(Event::BlockedAlert(category.to_string()));
        Ok(())
    }
}

fn history() -> Vec<Message> {
    vec![Message::new("alice", "hi")]
}

#[tokio::test]
async fn clean_turn_delivers_one_chunk_and_no_banner() {
    let engine = ChatEngine::new(
        BotConfig::default(),
        ScriptedCompletion::replying("hello"),
        FixedModeration::clean(),
    );
    let runtime = FakeRuntime::default();

    let outcome = engine.generate_chat_response(&history(), "alice").await;
    process_response("alice", &runtime, &runtime, outcome)
        .await
        .unwrap();

    assert_eq!(runtime.events(), vec![Event::Sent("hello".to_string())]);
}

#[tokio::test]
async fn oversized_context_closes_the_thread_silently() {
    let engine = ChatEngine::new(
        BotConfig::default(),
        ScriptedCompletion::rejecting(
            "This model's maximum context length is 4097 tokens in the messages.",
        ),
        FixedModeration::clean(),
    );
    let runtime = FakeRuntime::default();

    let outcome = engine.generate_chat_response(&history(), "alice").await;
    process_response("alice", &runtime, &runtime, outcome)
        .await
        .unwrap();

    assert_eq!(runtime.events(), vec![Event::Closed]);
}

#[tokio::test]
async fn flagged_turn_delivers_then_alerts_then_banners() {
    let engine = ChatEngine::new(
        BotConfig::default(),
        ScriptedCompletion::replying("spicy take"),
        FixedModeration::verdict("mild", ""),
    );
    let runtime = FakeRuntime::default();

    let outcome = engine.generate_chat_response(&history(), "alice").await;
    process_response("alice", &runtime, &runtime, outcome)
        .await
        .unwrap();

    assert_eq!(
        runtime.events(),
        vec![
            Event::Sent("spicy take".to_string()),
            Event::FlaggedAlert("from_response:mild".to_string()),
            Event::Noticed(
                Severity::Warning,
                "This conversation has been flagged by moderation.".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn blocked_turn_suppresses_the_reply_entirely() {
    let engine = ChatEngine::new(
        BotConfig::default(),
        ScriptedCompletion::replying("bad take"),
        FixedModeration::verdict("mild", "severe"),
    );
    let runtime = FakeRuntime::default();

    let outcome = engine.generate_chat_response(&history(), "alice").await;
    process_response("alice", &runtime, &runtime, outcome)
        .await
        .unwrap();

    let events = runtime.events();
    assert!(events.iter().all(|e| !matches!(e, Event::Sent(_))));
    assert_eq!(
        events,
        vec![
            Event::BlockedAlert("from_response:severe".to_string()),
            Event::Noticed(
                Severity::Error,
                "The response has been blocked by moderation.".to_string()
            ),
        ]
    );
}
