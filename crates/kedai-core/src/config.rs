use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{KedaiError, Result};

/// Top-level configuration for the Kedai assistant.
///
/// Loaded from `~/.kedai/config.toml` by default. Each section corresponds
/// to one subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KedaiConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl KedaiConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: KedaiConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| KedaiError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Conversation orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Master switch for the chat surface.
    pub enabled: bool,
    /// Maximum utterance length in characters.
    pub max_message_length: usize,
    /// Number of turns kept in session history; older turns are dropped.
    pub max_history_turns: usize,
    /// Idle minutes after which a session is treated as fresh on next access.
    pub session_idle_minutes: u32,
    /// Raw score an intent must reach to count as a significant signal.
    pub significant_score: f32,
    /// Normalized-confidence gap below which a runner-up intent is reported
    /// as a secondary intent instead of being discarded.
    pub dominance_margin: f32,
    /// Score added to a pending follow-up intent when classifying the answer.
    pub followup_bias: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_message_length: 2000,
            max_history_turns: 10,
            session_idle_minutes: 30,
            significant_score: 2.0,
            dominance_margin: 0.15,
            followup_bias: 2.5,
        }
    }
}

/// External tool dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Timeout for a single tool call, in milliseconds. A call that exceeds
    /// this is treated as a tool failure, never retried.
    pub dispatch_timeout_ms: u64,
    /// Maximum products listed in a reply.
    pub max_products_in_reply: usize,
    /// Maximum outlets listed in a reply.
    pub max_outlets_in_reply: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            dispatch_timeout_ms: 3000,
            max_products_in_reply: 5,
            max_outlets_in_reply: 5,
        }
    }
}
