//! Identity and event types shared by every czarbot layer.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The name of a chat channel, e.g. `#cah`.
///
/// One channel hosts at most one game, so this is also the key a game
/// session is registered under. Serialized as a plain string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    /// Wraps a channel name without normalizing it.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A participant's chat nickname.
///
/// Nicks are the key players are looked up by inside a game; two players in
/// the same game never share one.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Nick(String);

impl Nick {
    pub fn new(nick: impl Into<String>) -> Self {
        Self(nick.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Nick {
    fn from(nick: &str) -> Self {
        Self::new(nick)
    }
}

// ---------------------------------------------------------------------------
// Recipient — where does a line of game output go?
// ---------------------------------------------------------------------------

/// Who should receive a line of game output.
///
/// Game logic never talks to the transport directly. It returns
/// `(Recipient, String)` pairs and the session turns them into `say` or
/// `whisper` calls for its own channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Said publicly in the game's channel.
    Channel,

    /// Whispered privately to one participant.
    Player(Nick),
}

// ---------------------------------------------------------------------------
// InboundEvent — what the transport hands us
// ---------------------------------------------------------------------------

/// An event delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    /// Someone entered a channel.
    Join { channel: ChannelName, nick: Nick },

    /// Someone left a channel.
    Part { channel: ChannelName, nick: Nick },

    /// Someone said something in a channel.
    PublicMessage {
        channel: ChannelName,
        nick: Nick,
        text: String,
    },
}

impl InboundEvent {
    /// The channel the event happened in.
    pub fn channel(&self) -> &ChannelName {
        match self {
            Self::Join { channel, .. }
            | Self::Part { channel, .. }
            | Self::PublicMessage { channel, .. } => channel,
        }
    }

    /// The participant who caused the event.
    pub fn nick(&self) -> &Nick {
        match self {
            Self::Join { nick, .. }
            | Self::Part { nick, .. }
            | Self::PublicMessage { nick, .. } => nick,
        }
    }
}
