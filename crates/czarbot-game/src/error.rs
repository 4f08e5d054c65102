//! Error types for the game engine.

/// Why a game operation was rejected.
///
/// Every variant except [`GameError::Invariant`] leaves the game untouched
/// and carries a short phrase meant for the player who caused it, so the
/// `Display` output can go straight into a channel reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The game was asked to start with unusable settings.
    #[error("{0}")]
    Config(String),

    /// The command is fine, the timing isn't: no game, wrong phase, not the
    /// czar, not in this round.
    #[error("{0}")]
    State(String),

    /// The command's arguments don't fit: wrong card count, index out of
    /// range, the same card twice.
    #[error("{0}")]
    Validation(String),

    /// Something the game needs isn't there: playable cards, a czar.
    #[error("{0}")]
    Resource(String),

    /// The game's own bookkeeping is inconsistent. The session running this
    /// game must stop it.
    #[error("internal error: {0}")]
    Invariant(String),
}

impl GameError {
    pub(crate) fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Returns `true` if the game can't continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_bare_phrase() {
        let err = GameError::validation("pick a number 0-9");
        assert_eq!(err.to_string(), "pick a number 0-9");
    }

    #[test]
    fn test_only_invariant_is_fatal() {
        assert!(GameError::invariant("lost the round").is_fatal());
        assert!(!GameError::state("not now").is_fatal());
        assert!(!GameError::Resource("no cards".into()).is_fatal());
    }
}
