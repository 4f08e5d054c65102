//! Session registry: which channel runs which session.

use std::collections::HashMap;
use std::sync::Arc;

use czarbot_cards::CardSupplier;
use czarbot_game::{Game, GameConfig};
use czarbot_protocol::{ChannelName, Nick};
use czarbot_transport::ChatTransport;
use tokio::sync::Mutex;

use crate::session::{SessionExit, spawn_session};
use crate::{SessionConfig, SessionError, SessionHandle, SessionId};

/// Everything sessions share, built once at startup.
pub struct AppContext<S: CardSupplier, T: ChatTransport> {
    pub supplier: S,
    pub transport: Arc<T>,
    /// Settings for new games. `!start <points>` overrides the threshold.
    pub game: GameConfig,
    pub session: SessionConfig,
}

impl<S: CardSupplier, T: ChatTransport> AppContext<S, T> {
    pub fn new(supplier: S, transport: Arc<T>) -> Self {
        Self {
            supplier,
            transport,
            game: GameConfig::default(),
            session: SessionConfig::default(),
        }
    }

    pub fn with_game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    pub fn with_session_config(mut self, session: SessionConfig) -> Self {
        self.session = session.validated();
        self
    }
}

enum Slot {
    /// A game is being set up: its deck is still being fetched.
    Reserved(SessionId),
    Running(SessionHandle),
}

impl Slot {
    fn id(&self) -> SessionId {
        match self {
            Self::Reserved(id) => *id,
            Self::Running(handle) => handle.id(),
        }
    }
}

type Slots = Arc<Mutex<HashMap<ChannelName, Slot>>>;

/// Maps channels to their sessions.
///
/// Lookups, creation and removal all go through one lock, so two events
/// racing to start a game in the same channel can't both win. The lock is
/// never held across the deck fetch: creation reserves the channel, lets go,
/// fetches, and only then fills the slot in.
pub struct SessionRegistry<S: CardSupplier, T: ChatTransport> {
    context: Arc<AppContext<S, T>>,
    slots: Slots,
}

impl<S: CardSupplier, T: ChatTransport> Clone for SessionRegistry<S, T> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<S: CardSupplier, T: ChatTransport> SessionRegistry<S, T> {
    pub fn new(context: AppContext<S, T>) -> Self {
        Self {
            context: Arc::new(context),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn context(&self) -> &AppContext<S, T> {
        &self.context
    }

    /// The running session for `channel`, if there is one.
    pub async fn get(&self, channel: &ChannelName) -> Option<SessionHandle> {
        match self.slots.lock().await.get(channel) {
            Some(Slot::Running(handle)) if !handle.is_closed() => Some(handle.clone()),
            _ => None,
        }
    }

    /// Starts a game in `channel` with `starter` as its first player.
    ///
    /// `points_to_win` overrides the configured threshold.
    ///
    /// # Errors
    /// - [`SessionError::GameInProgress`] if the channel already has a game
    ///   or one is being set up.
    /// - [`SessionError::Fetch`] / [`SessionError::Game`] if the deck or
    ///   the game can't be made. The channel is free again afterwards.
    /// - [`SessionError::Unavailable`] if the channel was cleared while the
    ///   deck was being fetched.
    pub async fn create_if_absent(
        &self,
        channel: &ChannelName,
        starter: &Nick,
        points_to_win: Option<u32>,
    ) -> Result<SessionHandle, SessionError> {
        let id = SessionId::next();
        {
            let mut slots = self.slots.lock().await;
            let busy = match slots.get(channel) {
                Some(Slot::Reserved(_)) => true,
                Some(Slot::Running(handle)) => !handle.is_closed(),
                None => false,
            };
            if busy {
                return Err(SessionError::GameInProgress(channel.clone()));
            }
            slots.insert(channel.clone(), Slot::Reserved(id));
        }

        let game = match self.build_game(channel, starter, points_to_win).await {
            Ok(game) => game,
            Err(error) => {
                tracing::warn!(%channel, %error, "game creation failed");
                remove_if(&self.slots, channel, id).await;
                return Err(error);
            }
        };

        let (handle, task) = spawn_session(
            id,
            game,
            Arc::clone(&self.context.transport),
            self.context.session.clone(),
        );

        let slots = Arc::clone(&self.slots);
        let exit_channel = channel.clone();
        tokio::spawn(async move {
            match task.await {
                Ok(SessionExit::Failed(error)) => {
                    tracing::error!(channel = %exit_channel, session = %id, %error, "session failed");
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::error!(channel = %exit_channel, session = %id, %error, "session task panicked");
                }
            }
            remove_if(&slots, &exit_channel, id).await;
        });

        let mut slots = self.slots.lock().await;
        match slots.get(channel) {
            Some(Slot::Reserved(reserved)) if *reserved == id => {
                slots.insert(channel.clone(), Slot::Running(handle.clone()));
                tracing::info!(%channel, session = %id, %starter, "session registered");
                Ok(handle)
            }
            _ => {
                handle.stop();
                Err(SessionError::Unavailable(channel.clone()))
            }
        }
    }

    /// Stops and forgets the session in `channel`.
    pub async fn remove(&self, channel: &ChannelName) -> Option<SessionHandle> {
        let removed = self.slots.lock().await.remove(channel)?;
        match removed {
            Slot::Running(handle) => {
                handle.stop();
                tracing::info!(%channel, session = %handle.id(), "session removed");
                Some(handle)
            }
            Slot::Reserved(_) => None,
        }
    }

    /// Channels with a running or reserved session.
    pub async fn channels(&self) -> Vec<ChannelName> {
        self.slots.lock().await.keys().cloned().collect()
    }

    /// Stops every session.
    pub async fn shutdown(&self) {
        let mut slots = self.slots.lock().await;
        for (_, slot) in slots.drain() {
            if let Slot::Running(handle) = slot {
                handle.stop();
            }
        }
    }

    async fn build_game(
        &self,
        channel: &ChannelName,
        starter: &Nick,
        points_to_win: Option<u32>,
    ) -> Result<Game, SessionError> {
        let deck = self.context.supplier.fetch().await.map_err(|error| {
            tracing::warn!(%channel, %error, "deck fetch failed");
            error
        })?;
        let mut config = self.context.game.clone();
        if let Some(points) = points_to_win {
            config.points_to_win = points;
        }
        Ok(Game::create(channel.clone(), starter.clone(), config, deck)?)
    }
}

/// Removes `channel`'s slot only if it still belongs to session `id`.
async fn remove_if(slots: &Mutex<HashMap<ChannelName, Slot>>, channel: &ChannelName, id: SessionId) {
    let mut slots = slots.lock().await;
    if slots.get(channel).is_some_and(|slot| slot.id() == id) {
        slots.remove(channel);
        tracing::debug!(%channel, session = %id, "registry slot released");
    }
}
