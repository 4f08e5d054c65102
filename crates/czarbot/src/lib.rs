//! # czarbot
//!
//! A chat bot that runs Cards Against Humanity games, one game per channel.
//!
//! The bot ties the layers together: transport events go through the
//! [`Dispatcher`], which parses commands and hands them to the channel's
//! game session, creating one on `!start`.
//!
//! ```text
//! ChatTransport → Dispatcher → Command::parse → SessionRegistry → session → Game
//!                                                                     │
//!                                            ChatTransport ◀── output pump
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use czarbot::prelude::*;
//!
//! # async fn run() -> Result<(), CzarbotError> {
//! let (transport, _peer) = MemoryTransport::new();
//! let bot = CzarBotBuilder::new()
//!     .nick("czarbot")
//!     .channel("#cah")
//!     .build(StaticCardSupplier::generated(50, 500), transport)?;
//! bot.run().await
//! # }
//! ```

mod bot;
mod config;
mod dispatcher;
mod error;

pub use bot::{CzarBot, CzarBotBuilder};
pub use config::BotConfig;
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, CzarbotError};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs a `tracing` subscriber that logs to stderr, filtered by
/// `RUST_LOG` (default `info`). Does nothing if one is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

pub mod prelude {
    pub use czarbot_cards::{CardBox, CardSupplier, JsonCardSupplier, StaticCardSupplier};
    pub use czarbot_game::{GameConfig, GameState};
    pub use czarbot_protocol::{ChannelName, Command, InboundEvent, Nick};
    pub use czarbot_session::{SessionConfig, SessionRegistry};
    pub use czarbot_transport::{ChatTransport, MemoryPeer, MemoryTransport, Outbound};

    pub use crate::{BotConfig, CzarBot, CzarBotBuilder, CzarbotError, init_tracing};
}
