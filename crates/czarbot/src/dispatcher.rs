//! Dispatcher: routes transport events to game sessions.
//!
//! Every channel gets its own lane: a task that handles that channel's
//! events one after another. Channels don't wait on each other, and a
//! slow `!start` (the deck fetch) only holds up its own channel.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use czarbot_cards::CardSupplier;
use czarbot_protocol::{ChannelName, Command, HELP_TEXT, InboundEvent, Nick};
use czarbot_session::{Query, SessionCommand, SessionError, SessionHandle, SessionRegistry};
use czarbot_transport::ChatTransport;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const LANE_CAPACITY: usize = 64;

struct Lane {
    sender: mpsc::Sender<InboundEvent>,
    task: JoinHandle<()>,
}

/// Fans inbound events out to per-channel lanes.
pub struct Dispatcher<S: CardSupplier, T: ChatTransport> {
    router: Arc<Router<S, T>>,
    bot_nick: Nick,
    lanes: HashMap<ChannelName, Lane>,
}

impl<S: CardSupplier, T: ChatTransport> Dispatcher<S, T> {
    pub fn new(registry: SessionRegistry<S, T>, bot_nick: Nick) -> Self {
        let transport = Arc::clone(&registry.context().transport);
        Self {
            router: Arc::new(Router {
                registry,
                transport,
            }),
            bot_nick,
            lanes: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &SessionRegistry<S, T> {
        &self.router.registry
    }

    /// Hands `event` to its channel's lane. Events from the bot itself are
    /// dropped.
    pub async fn dispatch(&mut self, event: InboundEvent) {
        if *event.nick() == self.bot_nick {
            return;
        }
        let channel = event.channel().clone();

        let lane = self
            .lanes
            .entry(channel.clone())
            .or_insert_with(|| spawn_lane(Arc::clone(&self.router), channel.clone()));
        if let Err(mpsc::error::SendError(event)) = lane.sender.send(event).await {
            tracing::warn!(%channel, "lane closed, restarting it");
            let lane = spawn_lane(Arc::clone(&self.router), channel.clone());
            if lane.sender.send(event).await.is_err() {
                tracing::error!(%channel, "restarted lane closed at once, dropping event");
            }
            self.lanes.insert(channel, lane);
        }
    }

    /// Closes every lane and waits for the events already queued to be
    /// handled.
    pub async fn shutdown(&mut self) {
        for (channel, lane) in self.lanes.drain() {
            drop(lane.sender);
            if let Err(error) = lane.task.await {
                tracing::error!(%channel, %error, "lane task failed");
            }
        }
    }
}

fn spawn_lane<S: CardSupplier, T: ChatTransport>(
    router: Arc<Router<S, T>>,
    channel: ChannelName,
) -> Lane {
    let (sender, mut events) = mpsc::channel(LANE_CAPACITY);
    let task = tokio::spawn(async move {
        tracing::debug!(%channel, "lane opened");
        while let Some(event) = events.recv().await {
            router.route(event).await;
        }
        tracing::debug!(%channel, "lane closed");
    });
    Lane { sender, task }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

struct Router<S: CardSupplier, T: ChatTransport> {
    registry: SessionRegistry<S, T>,
    transport: Arc<T>,
}

impl<S: CardSupplier, T: ChatTransport> Router<S, T> {
    async fn route(&self, event: InboundEvent) {
        match event {
            InboundEvent::Join { channel, nick } => {
                if let Some(handle) = self.registry.get(&channel).await {
                    self.forward(&handle, SessionCommand::Arrive(nick)).await;
                }
            }
            InboundEvent::Part { channel, nick } => {
                if let Some(handle) = self.registry.get(&channel).await {
                    self.forward(&handle, SessionCommand::Depart(nick)).await;
                }
            }
            InboundEvent::PublicMessage {
                channel,
                nick,
                text,
            } => self.route_text(&channel, &nick, &text).await,
        }
    }

    async fn route_text(&self, channel: &ChannelName, nick: &Nick, text: &str) {
        let command = match Command::parse(text) {
            Ok(Some(command)) => command,
            Ok(None) => return,
            Err(error) => {
                tracing::debug!(%channel, %nick, %error, "unparseable command");
                self.reply(channel, nick, &error).await;
                return;
            }
        };
        tracing::debug!(%channel, %nick, command = command.name(), "command");

        match command {
            Command::Start { points_to_win } => {
                if let Err(error) = self
                    .registry
                    .create_if_absent(channel, nick, points_to_win)
                    .await
                {
                    self.reply(channel, nick, &error).await;
                }
            }
            Command::Help => self.say(channel, HELP_TEXT).await,
            Command::Pause | Command::Resume => {
                tracing::debug!(%channel, %nick, "reserved command ignored");
            }
            command => {
                let Some(session_command) = session_command(command, nick) else {
                    return;
                };
                match self.registry.get(channel).await {
                    Some(handle) => self.forward(&handle, session_command).await,
                    None => {
                        let error = SessionError::NotFound(channel.clone());
                        self.reply(channel, nick, &error).await;
                    }
                }
            }
        }
    }

    async fn forward(&self, handle: &SessionHandle, command: SessionCommand) {
        let nick = command.nick().clone();
        if let Err(error) = handle.send(command).await {
            tracing::warn!(channel = %handle.channel(), %nick, %error, "command not delivered");
            self.reply(handle.channel(), &nick, &error).await;
        }
    }

    async fn reply(&self, channel: &ChannelName, nick: &Nick, error: impl Display) {
        self.say(channel, &format!("{nick}, {error}")).await;
    }

    async fn say(&self, channel: &ChannelName, text: &str) {
        if let Err(error) = self.transport.say(channel, text).await {
            tracing::warn!(%channel, %error, "say failed");
        }
    }
}

/// The session-side form of a game command. `None` for commands the
/// dispatcher answers itself.
fn session_command(command: Command, nick: &Nick) -> Option<SessionCommand> {
    let nick = nick.clone();
    let query = match command {
        Command::Join => return Some(SessionCommand::Join(nick)),
        Command::Play(cards) => return Some(SessionCommand::Play { nick, cards }),
        Command::Winner(pick) => return Some(SessionCommand::Winner { nick, pick }),
        Command::Quit => return Some(SessionCommand::Quit(nick)),
        Command::Cards => Query::Cards,
        Command::Points => Query::Points,
        Command::List => Query::List,
        Command::Status => Query::Status,
        Command::Start { .. } | Command::Help | Command::Pause | Command::Resume => return None,
    };
    Some(SessionCommand::Query { nick, query })
}
