//! `CzarBot` builder and event loop.
//!
//! This is the entry point for running the bot. It ties the layers
//! together: transport → dispatcher → registry → sessions.

use std::sync::Arc;

use czarbot_cards::CardSupplier;
use czarbot_session::{AppContext, SessionRegistry};
use czarbot_transport::ChatTransport;

use crate::{BotConfig, CzarbotError, Dispatcher};

const GREETING: [&str; 2] = ["Cards Against Humanity!", "Type !start to start a game!"];

/// Builder for configuring a [`CzarBot`].
///
/// # Example
///
/// ```rust,ignore
/// let bot = CzarBotBuilder::new()
///     .nick("czarbot")
///     .channel("#cah")
///     .points_to_win(7)
///     .build(JsonCardSupplier::new("cards.json"), my_transport)?;
/// bot.run().await
/// ```
#[derive(Debug, Clone, Default)]
pub struct CzarBotBuilder {
    config: BotConfig,
}

impl CzarBotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: BotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn nick(mut self, nick: &str) -> Self {
        self.config.nick = nick.to_string();
        self
    }

    /// Adds a channel to join.
    pub fn channel(mut self, channel: &str) -> Self {
        self.config.channels.push(channel.to_string());
        self
    }

    pub fn points_to_win(mut self, points: u32) -> Self {
        self.config.points_to_win = points;
        self
    }

    pub fn min_players(mut self, players: usize) -> Self {
        self.config.min_players = players;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Validates the configuration and wires up the bot.
    ///
    /// # Errors
    /// [`CzarbotError::Config`] if the configuration can't be used.
    pub fn build<S: CardSupplier, T: ChatTransport>(
        self,
        supplier: S,
        transport: T,
    ) -> Result<CzarBot<S, T>, CzarbotError> {
        self.config.validate()?;

        let transport = Arc::new(transport);
        let context = AppContext::new(supplier, Arc::clone(&transport))
            .with_game_config(self.config.game_config())
            .with_session_config(self.config.session_config());
        let registry = SessionRegistry::new(context);
        let dispatcher = Dispatcher::new(registry, self.config.bot_nick());

        Ok(CzarBot {
            config: self.config,
            transport,
            dispatcher,
        })
    }
}

/// A configured bot, ready to [`run`](Self::run).
pub struct CzarBot<S: CardSupplier, T: ChatTransport> {
    config: BotConfig,
    transport: Arc<T>,
    dispatcher: Dispatcher<S, T>,
}

impl<S: CardSupplier, T: ChatTransport> CzarBot<S, T> {
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry<S, T> {
        self.dispatcher.registry()
    }

    /// Joins and greets every configured channel, then handles events until
    /// the transport closes.
    ///
    /// On the way out every game is stopped.
    ///
    /// # Errors
    /// [`CzarbotError::Transport`] if joining a channel or reading events
    /// fails.
    pub async fn run(mut self) -> Result<(), CzarbotError> {
        for channel in self.config.channel_names() {
            self.transport.join(&channel).await?;
            for line in GREETING {
                if let Err(error) = self.transport.say(&channel, line).await {
                    tracing::warn!(%channel, %error, "greeting failed");
                }
            }
            tracing::info!(%channel, "joined channel");
        }
        tracing::info!(nick = %self.config.nick, "czarbot running");

        let result = loop {
            match self.transport.next_event().await {
                Ok(Some(event)) => self.dispatcher.dispatch(event).await,
                Ok(None) => break Ok(()),
                Err(error) => {
                    tracing::error!(%error, "transport failed");
                    break Err(error.into());
                }
            }
        };

        self.dispatcher.shutdown().await;
        self.dispatcher.registry().shutdown().await;
        tracing::info!("czarbot stopped");
        result
    }
}
