//! Error types for fetching cards.

use std::path::PathBuf;

/// Errors that can occur while fetching a deck.
///
/// A fetch failure aborts game creation; nothing retries.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The card file couldn't be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The card data isn't valid master-card JSON.
    #[error("malformed card data: {0}")]
    Parse(#[from] serde_json::Error),

    /// The data parsed but holds no cards of the given kind.
    #[error("deck has no {0} cards")]
    Empty(&'static str),
}
