//! Unified error type for czarbot.

use std::path::PathBuf;

use czarbot_cards::FetchError;
use czarbot_game::GameError;
use czarbot_protocol::ParseError;
use czarbot_session::SessionError;
use czarbot_transport::TransportError;

/// The bot's configuration can't be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("couldn't read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error that wraps every crate's error.
///
/// `#[from]` on each variant lets `?` lift sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum CzarbotError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use czarbot_protocol::ChannelName;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: CzarbotError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, CzarbotError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_parse_error() {
        let err: CzarbotError = ParseError::MissingArgument { usage: "!winner #" }.into();
        assert!(matches!(err, CzarbotError::Parse(_)));
        assert_eq!(err.to_string(), "usage: !winner #");
    }

    #[test]
    fn test_from_session_error() {
        let err: CzarbotError = SessionError::NotFound(ChannelName::new("#cah")).into();
        assert!(matches!(err, CzarbotError::Session(_)));
    }

    #[test]
    fn test_from_config_error() {
        let err: CzarbotError = ConfigError::Invalid("no channels".into()).into();
        assert_eq!(err.to_string(), "invalid config: no channels");
    }
}
