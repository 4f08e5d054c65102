//! The card game itself: one [`Game`] per channel.
//!
//! A game is a plain, synchronous state machine. It never locks, never
//! spawns, and never touches the network: every operation mutates the game
//! and queues output lines (public or whispered) that the owning session
//! drains with [`Game::drain_output`] and forwards to the chat transport.
//! Exactly one task ever holds a `&mut Game`, which is what makes that safe.
//!
//! # Key types
//!
//! - [`Game`] — roster, piles, rounds, scoring
//! - [`GameState`] — Lobby → Active → Finished lifecycle
//! - [`GameConfig`] — player minimum, points to win, hand size, RNG seed
//! - [`Round`] / [`RoundState`] — one question, one czar, the submissions
//! - [`Player`] — nick, hand, awesome points, presence
//! - [`GameError`] — what a rejected operation tells the player

mod config;
mod error;
mod game;
mod pile;
mod player;
mod round;

pub use config::{GameConfig, GameState};
pub use error::GameError;
pub use game::{Game, MAX_ANSWERS};
pub use pile::Pile;
pub use player::{PlayedCard, Player, PlayerId, Presence};
pub use round::{Round, RoundState, Submission};
