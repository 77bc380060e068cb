//! Moderation collaborator and the moderation-alert side channel
//!
//! The classifier treats moderation as a black box: a probe string goes in,
//! two independent category strings come out. [`OpenAiModeration`] backs the
//! trait with an OpenAI-compatible `moderations` endpoint, folding per-category
//! scores into the flagged/blocked strings via configured thresholds.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default API base URL
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Verdict from the moderation classifier.
///
/// `flagged` and `blocked` are independent comma-joined category lists,
/// either possibly empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModerationVerdict {
    pub flagged: String,
    pub blocked: String,
}

impl ModerationVerdict {
    /// A verdict that neither flags nor blocks
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn is_flagged(&self) -> bool {
        !self.flagged.is_empty()
    }

    pub fn is_blocked(&self) -> bool {
        !self.blocked.is_empty()
    }
}

/// Boundary to the moderation classifier
#[async_trait]
pub trait ModerationBackend: Send + Sync {
    /// Classify a probe string submitted on behalf of `user`
    async fn moderate(&self, text: &str, user: &str) -> Result<ModerationVerdict>;
}

/// Per-category score thresholds for the HTTP moderation client
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModerationThresholds {
    /// Scores at or above this flag the content for review
    #[serde(default = "default_flag_threshold")]
    pub flag: f64,
    /// Scores at or above this block delivery outright
    #[serde(default = "default_block_threshold")]
    pub block: f64,
}

fn default_flag_threshold() -> f64 {
    0.5
}

fn default_block_threshold() -> f64 {
    0.9
}

impl Default for ModerationThresholds {
    fn default() -> Self {
        Self {
            flag: default_flag_threshold(),
            block: default_block_threshold(),
        }
    }
}

/// OpenAI-compatible moderation endpoint client
pub struct OpenAiModeration {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    thresholds: ModerationThresholds,
}

impl OpenAiModeration {
    /// Create a client against the default OpenAI endpoint
    pub fn new(api_key: impl Into<String>, thresholds: ModerationThresholds) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL, thresholds)
    }

    /// Create a client against a custom OpenAI-compatible endpoint
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        thresholds: ModerationThresholds,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            thresholds,
        }
    }
}

#[async_trait]
impl ModerationBackend for OpenAiModeration {
    async fn moderate(&self, text: &str, user: &str) -> Result<ModerationVerdict> {
        debug!(
            "moderation probe for user {} ({} chars)",
            user,
            text.chars().count()
        );

        let response = self
            .client
            .post(format!("{}/moderations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({ "input": text }))
            .send()
            .await
            .context("Failed to reach moderation endpoint")?
            .error_for_status()
            .context("Moderation endpoint returned an error")?;

        let raw: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse moderation response")?;

        Ok(verdict_from_scores(&raw, self.thresholds))
    }
}

/// Fold the first result's category scores into a verdict.
///
/// A category lands in exactly one bucket: `blocked` when its score reaches
/// the block threshold, otherwise `flagged` when it reaches the flag
/// threshold. Category order follows the provider's response.
fn verdict_from_scores(
    raw: &serde_json::Value,
    thresholds: ModerationThresholds,
) -> ModerationVerdict {
    let mut flagged = Vec::new();
    let mut blocked = Vec::new();

    let scores = raw
        .get("results")
        .and_then(|r| r.as_array())
        .and_then(|arr| arr.first())
        .and_then(|result| result.get("category_scores"))
        .and_then(|s| s.as_object());

    if let Some(scores) = scores {
        for (category, score) in scores {
            let score = score.as_f64().unwrap_or(0.0);
            if score >= thresholds.block {
                blocked.push(category.as_str());
            } else if score >= thresholds.flag {
                flagged.push(category.as_str());
            }
        }
    }

    ModerationVerdict {
        flagged: flagged.join(", "),
        blocked: blocked.join(", "),
    }
}

/// Audit side channel for moderation outcomes
#[async_trait]
pub trait ModerationAlerts: Send + Sync {
    /// A reply was delivered but flagged for review. `url` links to the
    /// delivered message when the runtime exposes one.
    async fn flagged(
        &self,
        user: &str,
        category: &str,
        message: &str,
        url: Option<&str>,
    ) -> Result<()>;

    /// A reply was suppressed outright; `message` is the unsent text
    async fn blocked(&self, user: &str, category: &str, message: &str) -> Result<()>;
}
