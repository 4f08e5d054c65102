//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every session the registry spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Commands a session's mailbox holds before senders have to wait.
    /// Also bounds the lines waiting in its output pump.
    pub queue_capacity: usize,

    /// How long a sender waits on a full mailbox before giving up.
    pub enqueue_timeout: Duration,

    /// Minimum gap between two whispers.
    pub whisper_spacing: Duration,

    /// How often a game waiting in Lobby asks for more players.
    pub lobby_nag_interval: Duration,

    /// How long players have to answer before the round moves on.
    pub answer_timeout: Duration,

    /// How long the czar has to pick a winner.
    pub judge_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            enqueue_timeout: Duration::from_secs(1),
            whisper_spacing: Duration::from_millis(750),
            lobby_nag_interval: Duration::from_secs(60),
            answer_timeout: Duration::from_secs(120),
            judge_timeout: Duration::from_secs(120),
        }
    }
}

impl SessionConfig {
    /// Fixes values a session can't run with. A zero-sized mailbox becomes
    /// a single slot.
    pub fn validated(mut self) -> Self {
        if self.queue_capacity == 0 {
            tracing::warn!("queue_capacity of 0 is not usable, using 1");
            self.queue_capacity = 1;
        }
        self
    }
}
