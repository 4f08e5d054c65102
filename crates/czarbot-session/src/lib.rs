//! Game sessions for czarbot.
//!
//! Each channel's [`Game`](czarbot_game::Game) lives inside a session: a
//! Tokio task that owns the game outright and applies commands from a
//! bounded mailbox one at a time. Nothing else can reach the game, so the
//! engine needs no locks. Timers post synthetic commands into the same
//! mailbox instead of touching the game from the side.
//!
//! ```text
//! SessionHandle ──mpsc──▶ session task ──▶ Game
//!                              │
//!                              └──unbounded──▶ output pump ──▶ ChatTransport
//! ```
//!
//! # Key types
//!
//! - [`SessionRegistry`] — channel → session map; creates, finds, removes
//! - [`SessionHandle`] — send commands to a running session, stop it
//! - [`SessionCommand`] — what a player can ask a session to do
//! - [`SessionConfig`] — mailbox size, pacing, timeouts
//! - [`AppContext`] — supplier, transport and defaults shared by all sessions

mod config;
mod error;
mod pump;
mod registry;
mod session;
mod timer;

pub use config::SessionConfig;
pub use error::SessionError;
pub use registry::{AppContext, SessionRegistry};
pub use session::{Query, SessionCommand, SessionHandle, SessionId, SessionInfo};
