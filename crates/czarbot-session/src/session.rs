//! Session actor: one Tokio task that owns one channel's game.
//!
//! The task is the only thing that ever touches its [`Game`]. Player
//! commands, timer expiries and info requests all arrive through the same
//! bounded mailbox and are applied strictly in arrival order.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use czarbot_game::{Game, GameError, GameState, RoundState};
use czarbot_protocol::{ChannelName, Nick, Recipient};
use czarbot_transport::ChatTransport;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::pump::{OutputSender, spawn_pump};
use crate::timer::{TimerKind, Timers};
use crate::{SessionConfig, SessionError};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique id of one session. A channel that hosts several games over time
/// gets a new id for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl SessionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Read-only requests that don't change the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Cards,
    Points,
    List,
    Status,
}

/// What a player can ask a session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// `!join`
    Join(Nick),
    /// The nick (re)entered the channel.
    Arrive(Nick),
    /// The nick left the channel.
    Depart(Nick),
    Play { nick: Nick, cards: Vec<usize> },
    Winner { nick: Nick, pick: usize },
    Quit(Nick),
    Query { nick: Nick, query: Query },
}

impl SessionCommand {
    pub fn nick(&self) -> &Nick {
        match self {
            Self::Join(nick)
            | Self::Arrive(nick)
            | Self::Depart(nick)
            | Self::Quit(nick)
            | Self::Play { nick, .. }
            | Self::Winner { nick, .. }
            | Self::Query { nick, .. } => nick,
        }
    }
}

/// Everything that can land in a session's mailbox.
pub(crate) enum Mail {
    Command(SessionCommand),
    Timer(TimerKind),
    Info(oneshot::Sender<SessionInfo>),
}

/// A snapshot of a session, for status checks and tests.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: SessionId,
    pub channel: ChannelName,
    pub state: GameState,
    /// Number and phase of the current (or last) round.
    pub round: Option<(u32, RoundState)>,
    pub players: usize,
    pub active_players: usize,
}

/// Why a session task ended.
#[derive(Debug)]
pub(crate) enum SessionExit {
    Stopped,
    Finished,
    Deserted,
    Closed,
    Failed(GameError),
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Handle to a running session.
///
/// Cheap to clone. The registry keeps one per channel and hands out clones.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    channel: ChannelName,
    sender: mpsc::Sender<Mail>,
    stop: Arc<watch::Sender<bool>>,
    enqueue_timeout: Duration,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// Returns `true` once the session task has exited.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queues `command`, waiting at most the configured enqueue timeout for
    /// mailbox space.
    ///
    /// # Errors
    /// [`SessionError::Busy`] if the mailbox stayed full,
    /// [`SessionError::Unavailable`] if the session is gone.
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.post(Mail::Command(command)).await
    }

    /// Asks the session for a snapshot.
    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.post(Mail::Info(reply_tx)).await?;
        reply_rx
            .await
            .map_err(|_| SessionError::Unavailable(self.channel.clone()))
    }

    /// Tells the session to stop. Commands still queued are dropped.
    /// Calling this more than once is harmless.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    async fn post(&self, mail: Mail) -> Result<(), SessionError> {
        match tokio::time::timeout(self.enqueue_timeout, self.sender.send(mail)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(SessionError::Unavailable(self.channel.clone())),
            Err(_) => {
                tracing::warn!(channel = %self.channel, session = %self.id, "session mailbox full");
                Err(SessionError::Busy(self.channel.clone()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionActor
// ---------------------------------------------------------------------------

struct SessionActor {
    id: SessionId,
    channel: ChannelName,
    game: Game,
    config: SessionConfig,
    mailbox: mpsc::Receiver<Mail>,
    stop: watch::Receiver<bool>,
    output: OutputSender,
    timers: Timers<Mail>,
    /// Round number and phase the deadline timers were last set for.
    timed_phase: Option<(u32, RoundState)>,
    nag_armed: bool,
}

impl SessionActor {
    async fn run(mut self) -> SessionExit {
        tracing::info!(channel = %self.channel, session = %self.id, "session started");
        self.flush().await;
        self.arm_timers();

        let exit = loop {
            tokio::select! {
                biased;

                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        break SessionExit::Stopped;
                    }
                }
                mail = self.mailbox.recv() => {
                    let Some(mail) = mail else {
                        break SessionExit::Closed;
                    };
                    if let ControlFlow::Break(exit) = self.apply(mail).await {
                        break exit;
                    }
                }
            }
        };

        self.timers.cancel_all();
        self.mailbox.close();
        tracing::info!(channel = %self.channel, session = %self.id, ?exit, "session stopped");
        exit
    }

    async fn apply(&mut self, mail: Mail) -> ControlFlow<SessionExit> {
        let result = match mail {
            Mail::Info(reply) => {
                let _ = reply.send(self.info());
                return ControlFlow::Continue(());
            }
            Mail::Command(command) => self.handle(command).await,
            Mail::Timer(timer) => self.fire(timer),
        };

        self.flush().await;
        if let Err(error) = result {
            tracing::error!(channel = %self.channel, session = %self.id, %error, "game failed, stopping session");
            self.emit(
                Recipient::Channel,
                "Something went wrong with this game and it had to stop. Type !start to start a new one".into(),
            )
            .await;
            return ControlFlow::Break(SessionExit::Failed(error));
        }

        if self.game.state().is_finished() {
            return ControlFlow::Break(SessionExit::Finished);
        }
        if self.game.is_empty() {
            self.emit(Recipient::Channel, "Everyone left, so the game is over.".into())
                .await;
            return ControlFlow::Break(SessionExit::Deserted);
        }
        self.arm_timers();
        ControlFlow::Continue(())
    }

    /// Applies a player command. Rejections are answered in the channel;
    /// only a fatal error comes back out.
    async fn handle(&mut self, command: SessionCommand) -> Result<(), GameError> {
        let nick = command.nick().clone();
        let result = match command {
            SessionCommand::Join(nick) => self.game.join(&nick),
            SessionCommand::Arrive(nick) => self.game.resume(&nick),
            SessionCommand::Depart(nick) => self.game.suspend(&nick),
            SessionCommand::Play { nick, cards } => self.game.play(&nick, &cards),
            SessionCommand::Winner { nick, pick } => self.game.winner(&nick, pick),
            SessionCommand::Quit(nick) => self.game.quit(&nick),
            SessionCommand::Query { nick, query } => match query {
                Query::Cards => self.game.show_cards(&nick),
                Query::Points => {
                    self.game.show_points();
                    Ok(())
                }
                Query::List => {
                    self.game.show_players();
                    Ok(())
                }
                Query::Status => {
                    self.game.show_status();
                    Ok(())
                }
            },
        };

        match result {
            Err(error) if !error.is_fatal() => {
                tracing::debug!(channel = %self.channel, %nick, %error, "command rejected");
                self.flush().await;
                self.emit(Recipient::Channel, format!("{nick}, {error}"))
                    .await;
                Ok(())
            }
            other => other,
        }
    }

    fn fire(&mut self, timer: TimerKind) -> Result<(), GameError> {
        tracing::debug!(channel = %self.channel, ?timer, "timer fired");
        match timer {
            TimerKind::LobbyNag => {
                self.nag_armed = false;
                self.game.nag();
                Ok(())
            }
            TimerKind::AnswerDeadline(round) => self.game.expire_answers(round),
            TimerKind::JudgeDeadline(round) => self.game.expire_judging(round),
        }
    }

    /// Sets deadline timers for a round phase that hasn't been timed yet,
    /// and keeps the lobby nag going while the game waits for players.
    fn arm_timers(&mut self) {
        let phase = self
            .game
            .round()
            .filter(|_| self.game.state().is_active())
            .map(|r| (r.number(), r.state()));
        if phase != self.timed_phase {
            self.timed_phase = phase;
            match phase {
                Some((round, RoundState::CollectingAnswers)) => self.timers.after(
                    self.config.answer_timeout,
                    Mail::Timer(TimerKind::AnswerDeadline(round)),
                ),
                Some((round, RoundState::CzarJudging)) => self.timers.after(
                    self.config.judge_timeout,
                    Mail::Timer(TimerKind::JudgeDeadline(round)),
                ),
                _ => {}
            }
        }

        if self.game.state() == GameState::Lobby && !self.nag_armed {
            self.nag_armed = true;
            self.timers
                .after(self.config.lobby_nag_interval, Mail::Timer(TimerKind::LobbyNag));
        }
    }

    async fn flush(&mut self) {
        for (recipient, text) in self.game.drain_output() {
            self.emit(recipient, text).await;
        }
    }

    /// Hands a line to the pump, waiting for room if its backlog is full.
    async fn emit(&self, recipient: Recipient, text: String) {
        if self.output.send((recipient, text)).await.is_err() {
            tracing::warn!(channel = %self.channel, "output pump is gone, dropping line");
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            channel: self.channel.clone(),
            state: self.game.state(),
            round: self.game.round().map(|r| (r.number(), r.state())),
            players: self.game.players().len(),
            active_players: self.game.active_count(),
        }
    }
}

/// Spawns a session task for `game` plus its output pump.
///
/// Returns the handle and the task's join handle, which resolves to why the
/// session ended (or to a `JoinError` if it panicked).
pub(crate) fn spawn_session<T: ChatTransport>(
    id: SessionId,
    game: Game,
    transport: Arc<T>,
    config: SessionConfig,
) -> (SessionHandle, JoinHandle<SessionExit>) {
    let channel = game.channel().clone();
    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let (stop_tx, stop_rx) = watch::channel(false);
    let (output, _pump) = spawn_pump(
        channel.clone(),
        transport,
        config.whisper_spacing,
        config.queue_capacity,
    );

    let handle = SessionHandle {
        id,
        channel: channel.clone(),
        sender: tx.clone(),
        stop: Arc::new(stop_tx),
        enqueue_timeout: config.enqueue_timeout,
    };

    let actor = SessionActor {
        id,
        channel,
        game,
        mailbox: rx,
        stop: stop_rx,
        output,
        timers: Timers::new(tx.downgrade()),
        timed_phase: None,
        nag_armed: false,
        config,
    };

    (handle, tokio::spawn(actor.run()))
}
