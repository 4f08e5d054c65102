//! Error types for the command grammar.

/// A public message looked like a command but its arguments were unusable.
///
/// The `Display` output is shown to the player as-is, so every message is a
/// short hint rather than a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The command needs at least one argument and got none.
    #[error("usage: {usage}")]
    MissingArgument { usage: &'static str },

    /// More arguments than the command accepts.
    #[error("usage: {usage}")]
    TooManyArguments { usage: &'static str },

    /// An argument that should be a non-negative integer isn't one.
    #[error("\"{arg}\" isn't a number, usage: {usage}")]
    NotANumber { arg: String, usage: &'static str },
}
