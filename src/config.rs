//! Bot configuration
//!
//! Process-wide constants the classifier consumes: the bot's display name,
//! the persona preamble, the completion model, the transcript separator, and
//! the example conversations for the legacy prompt path. Loaded once at
//! startup and passed into the classifier as a value, never read as ambient
//! globals.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::moderation::ModerationThresholds;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Display name the bot speaks under; the one speaker that maps to the
    /// `assistant` role
    #[serde(default = "default_name")]
    pub name: String,
    /// System persona preamble prepended to every completion request
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Completion model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Sentinel token joining turns in a rendered transcript. Reserved so it
    /// can be recognized downstream; ordinary message text is not sanitized
    /// against it.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Example conversations for the legacy single-string prompt path
    #[serde(default)]
    pub example_conversations: Vec<Conversation>,
    /// Moderation score thresholds
    #[serde(default)]
    pub moderation: ModerationThresholds,
}

fn default_name() -> String {
    "minnow".to_string()
}

fn default_instructions() -> String {
    "You are a knowledgeable assistant hanging out in a chat server. You chat \
     casually, use emoji, and skip capital letters. You have lots of interests \
     and enjoy talking to people. When a reply contains code, wrap it in a \
     fenced code block so it can be copied directly."
        .to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_separator() -> String {
    "<|endoftext|>".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            instructions: default_instructions(),
            model: default_model(),
            separator: default_separator(),
            example_conversations: Vec::new(),
            moderation: ModerationThresholds::default(),
        }
    }
}

impl BotConfig {
    /// Load configuration from the platform config directory, writing the
    /// defaults there on first run
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            Self::from_path(&config_path)
        } else {
            let config = BotConfig::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to the platform config directory
    pub fn save(&self) -> Result<()> {
        let config_path = config_path()?;
        let parent = config_path.parent().context("Config path has no parent")?;

        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "chat-relay", "chat-relay")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}
