//! Cards and where they come from.
//!
//! A game gets its cards exactly once, at creation, from a
//! [`CardSupplier`]. What comes back is a [`CardBox`]: an ordered list of
//! question cards and an ordered list of answer cards. From then on the game
//! owns them; nothing here is consulted again.
//!
//! # Key types
//!
//! - [`QuestionCard`] / [`AnswerCard`] — immutable card data
//! - [`CardBox`] — one fetched deck
//! - [`CardSupplier`] — the trait the bot is given at startup
//! - [`StaticCardSupplier`] — serves a fixed deck (tests, demos)
//! - [`JsonCardSupplier`] — reads a master-card JSON file

mod card;
mod error;
mod json;
mod supplier;

pub use card::{AnswerCard, CardBox, CardId, QuestionCard};
pub use error::FetchError;
pub use json::{JsonCardSupplier, parse_master_cards};
pub use supplier::{CardSupplier, StaticCardSupplier};
