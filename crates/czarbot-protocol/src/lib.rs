//! Chat-side vocabulary for czarbot.
//!
//! This crate defines what the bot hears and how it reads it:
//!
//! - **Identities** ([`ChannelName`], [`Nick`]) — who said what, where.
//! - **Events** ([`InboundEvent`]) — what the chat transport delivers.
//! - **Recipients** ([`Recipient`]) — where game output should go.
//! - **Commands** ([`Command`]) — the `!start`/`!play`/... grammar, parsed
//!   from public channel text by [`Command::parse`].
//!
//! ```text
//! Transport (events) → Protocol (Command) → Session (game mutation)
//! ```
//!
//! It knows nothing about connections or games.

mod command;
mod error;
mod types;

pub use command::{Command, HELP_TEXT};
pub use error::ParseError;
pub use types::{ChannelName, InboundEvent, Nick, Recipient};
