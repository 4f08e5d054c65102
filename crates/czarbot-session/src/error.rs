//! Error types for the session layer.

use czarbot_cards::FetchError;
use czarbot_game::GameError;
use czarbot_protocol::ChannelName;

/// Errors from creating, finding, or talking to a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session runs in this channel.
    #[error("there's no game running in {0}, type !start to start one")]
    NotFound(ChannelName),

    /// The channel already has a game, or one is being set up.
    #[error("a game is already in progress in {0}, type !join to join")]
    GameInProgress(ChannelName),

    /// The session has stopped.
    #[error("the game in {0} has ended")]
    Unavailable(ChannelName),

    /// The session's mailbox stayed full past the enqueue timeout.
    #[error("the game in {0} is busy, try again")]
    Busy(ChannelName),

    /// The deck couldn't be fetched. The cause is logged, not shown.
    #[error("couldn't get the cards, try again later")]
    Fetch(#[from] FetchError),

    /// The game refused to start.
    #[error(transparent)]
    Game(#[from] GameError),
}
