//! Bot configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use czarbot_game::GameConfig;
use czarbot_protocol::{ChannelName, Nick};
use czarbot_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Everything the bot is told at startup.
///
/// Loadable from JSON. Missing fields take their defaults:
///
/// ```json
/// {
///   "nick": "czarbot",
///   "channels": ["#cah", "games"],
///   "points_to_win": 7,
///   "card_file": "cards.json"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// The bot's own nick. Events from it are ignored.
    pub nick: String,

    /// Channels to join. A missing `#` is added.
    pub channels: Vec<String>,

    pub min_players: usize,
    pub points_to_win: u32,
    pub hand_size: usize,

    /// Fixed RNG seed for every game. Unset in production.
    pub seed: Option<u64>,

    /// Master-card JSON file to deal from.
    pub card_file: Option<PathBuf>,

    pub queue_capacity: usize,
    pub enqueue_timeout_ms: u64,
    pub whisper_spacing_ms: u64,
    pub lobby_nag_secs: u64,
    pub answer_timeout_secs: u64,
    pub judge_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        let game = GameConfig::default();
        let session = SessionConfig::default();
        Self {
            nick: "czarbot".to_string(),
            channels: Vec::new(),
            min_players: game.min_players,
            points_to_win: game.points_to_win,
            hand_size: game.hand_size,
            seed: None,
            card_file: None,
            queue_capacity: session.queue_capacity,
            enqueue_timeout_ms: millis(session.enqueue_timeout),
            whisper_spacing_ms: millis(session.whisper_spacing),
            lobby_nag_secs: session.lobby_nag_interval.as_secs(),
            answer_timeout_secs: session.answer_timeout.as_secs(),
            judge_timeout_secs: session.judge_timeout.as_secs(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl BotConfig {
    /// Parses a JSON config.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed JSON.
    pub fn from_json(body: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Reads and parses a JSON config file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&body)
    }

    /// Checks the config describes a bot that can run.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nick.trim().is_empty() {
            return Err(ConfigError::Invalid("nick is empty".into()));
        }
        if self.channels.is_empty() {
            return Err(ConfigError::Invalid("no channels to join".into()));
        }
        if let Some(bad) = self
            .channels
            .iter()
            .find(|c| c.trim_start_matches('#').is_empty() || c.contains(char::is_whitespace))
        {
            return Err(ConfigError::Invalid(format!("bad channel name \"{bad}\"")));
        }
        self.game_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Channel names, each starting with `#`.
    pub fn channel_names(&self) -> Vec<ChannelName> {
        self.channels
            .iter()
            .map(|c| {
                if c.starts_with('#') {
                    ChannelName::new(c.as_str())
                } else {
                    ChannelName::new(format!("#{c}"))
                }
            })
            .collect()
    }

    pub fn bot_nick(&self) -> Nick {
        Nick::new(self.nick.as_str())
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            min_players: self.min_players,
            points_to_win: self.points_to_win,
            hand_size: self.hand_size,
            seed: self.seed,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            queue_capacity: self.queue_capacity,
            enqueue_timeout: Duration::from_millis(self.enqueue_timeout_ms),
            whisper_spacing: Duration::from_millis(self.whisper_spacing_ms),
            lobby_nag_interval: Duration::from_secs(self.lobby_nag_secs),
            answer_timeout: Duration::from_secs(self.answer_timeout_secs),
            judge_timeout: Duration::from_secs(self.judge_timeout_secs),
        }
        .validated()
    }
}
