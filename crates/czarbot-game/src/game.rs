//! The game engine.
//!
//! [`Game`] owns everything about one channel's game: roster, both card
//! piles, the current round and the scores. Operations either change the
//! game and queue output, or return a [`GameError`] and change nothing.
//! The only exception is [`GameError::Invariant`], after which the game
//! must be thrown away.

use czarbot_cards::{AnswerCard, CardBox, QuestionCard};
use czarbot_protocol::{ChannelName, Nick, Recipient};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{
    GameConfig, GameError, GameState, Pile, PlayedCard, Player, PlayerId, Presence,
    Round, RoundState, Submission,
};

/// The most answers a question may ask for. `!play` carries at most two
/// card indexes, so questions wanting more can't be answered.
pub const MAX_ANSWERS: usize = 2;

/// One channel's game.
pub struct Game {
    channel: ChannelName,
    config: GameConfig,
    state: GameState,
    starter: Nick,
    /// Join order. Quitters are removed, suspended players stay.
    players: Vec<Player>,
    next_player_id: u32,
    answers: Pile<AnswerCard>,
    questions: Pile<QuestionCard>,
    /// The current round, or the last one once it completes.
    round: Option<Round>,
    rng: StdRng,
    outbox: Vec<(Recipient, String)>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("channel", &self.channel)
            .field("state", &self.state)
            .field("players", &self.players.len())
            .field("round", &self.round.as_ref().map(Round::number))
            .finish_non_exhaustive()
    }
}

impl Game {
    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Creates a game in Lobby and joins `starter` to it.
    ///
    /// # Errors
    /// - [`GameError::Config`] if `config` fails validation.
    /// - [`GameError::Resource`] if the deck has no playable question or no
    ///   answer cards.
    pub fn create(
        channel: ChannelName,
        starter: Nick,
        config: GameConfig,
        deck: CardBox,
    ) -> Result<Self, GameError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let CardBox { questions, answers } = deck;
        let offered = questions.len();
        let questions: Vec<QuestionCard> = questions
            .into_iter()
            .filter(|q| (1..=MAX_ANSWERS).contains(&q.answers))
            .collect();
        if questions.len() < offered {
            tracing::debug!(
                %channel,
                dropped = offered - questions.len(),
                "dropping questions that need more than two answers"
            );
        }
        if questions.is_empty() {
            return Err(GameError::Resource("no playable question cards".into()));
        }
        if answers.is_empty() {
            return Err(GameError::Resource("no answer cards".into()));
        }

        let mut game = Self {
            questions: Pile::shuffled(questions, &mut rng),
            answers: Pile::shuffled(answers, &mut rng),
            channel,
            state: GameState::Lobby,
            starter: starter.clone(),
            players: Vec::new(),
            next_player_id: 0,
            round: None,
            rng,
            outbox: Vec::new(),
            config,
        };

        tracing::info!(
            channel = %game.channel,
            %starter,
            points_to_win = game.config.points_to_win,
            "game created"
        );
        game.say(format!(
            "New game has started to {} Awesome Points! Type !join to join",
            game.config.points_to_win
        ));
        game.join(&starter)?;
        Ok(game)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn starter(&self) -> &Nick {
        &self.starter
    }

    /// The roster in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, nick: &Nick) -> Option<&Player> {
        self.players.iter().find(|p| p.nick() == nick)
    }

    /// The current round, or the last completed one.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn answer_pile(&self) -> &Pile<AnswerCard> {
        &self.answers
    }

    pub fn question_pile(&self) -> &Pile<QuestionCard> {
        &self.questions
    }

    /// Players not sitting out.
    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Takes every line queued since the last call, in the order produced.
    pub fn drain_output(&mut self) -> Vec<(Recipient, String)> {
        std::mem::take(&mut self.outbox)
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Adds `nick` to the game with a full hand.
    ///
    /// Joining twice, or joining a finished game, only produces feedback.
    /// A suspended player who joins again is resumed instead.
    pub fn join(&mut self, nick: &Nick) -> Result<(), GameError> {
        if self.state.is_finished() {
            self.say(format!("{nick}, this game is over. Type !start for a new one"));
            return Ok(());
        }
        if let Some(player) = self.player(nick) {
            if player.is_active() {
                self.say(format!("Hey {nick}, you're already playing!"));
                return Ok(());
            }
            return self.resume(nick);
        }

        let hand = self.draw_answers(self.config.hand_size);
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        self.players.push(Player::new(id, nick.clone(), hand));
        tracing::info!(channel = %self.channel, %nick, player = %id, "player joined");

        match self.state {
            GameState::Lobby => {
                let needed = self.players_needed();
                if needed > 0 {
                    self.say(format!(
                        "{nick} has joined the game! {needed} more players needed to start!"
                    ));
                    Ok(())
                } else {
                    self.say(format!("{nick} has joined the game! Let's start!"));
                    self.begin_play()
                }
            }
            GameState::Active => {
                self.say(format!(
                    "{nick} has joined the game! You'll be dealt in next round."
                ));
                self.revive_stalled_round()
            }
            GameState::Finished => Ok(()),
        }
    }

    /// Removes `nick` from the game. Their hand goes to the discard pile.
    ///
    /// # Errors
    /// [`GameError::State`] if `nick` isn't playing.
    pub fn quit(&mut self, nick: &Nick) -> Result<(), GameError> {
        if self.state.is_finished() {
            return Ok(());
        }
        let at = self
            .player_index(nick)
            .ok_or_else(|| GameError::state("you're not in this game"))?;
        let mut player = self.players.remove(at);
        self.answers.discard_all(player.take_hand());
        tracing::info!(channel = %self.channel, %nick, "player quit");
        self.say(format!("{nick} has left the game."));
        self.handle_departure(player.id(), nick)
    }

    /// Sits `nick` out after they leave the channel. Hand and points are
    /// kept for when they come back. Unknown nicks are ignored.
    pub fn suspend(&mut self, nick: &Nick) -> Result<(), GameError> {
        if self.state.is_finished() {
            return Ok(());
        }
        let Some(at) = self.player_index(nick) else {
            return Ok(());
        };
        if !self.players[at].is_active() {
            return Ok(());
        }
        self.players[at].set_presence(Presence::Suspended);
        let id = self.players[at].id();
        tracing::info!(channel = %self.channel, %nick, "player suspended");
        self.say(format!(
            "{nick} left and is sitting out. Their cards and points are kept for when they're back."
        ));
        self.handle_departure(id, nick)
    }

    /// Deals a suspended `nick` back in. Unknown or active nicks are ignored.
    pub fn resume(&mut self, nick: &Nick) -> Result<(), GameError> {
        if self.state.is_finished() {
            return Ok(());
        }
        let Some(at) = self.player_index(nick) else {
            return Ok(());
        };
        if self.players[at].is_active() {
            return Ok(());
        }
        self.players[at].set_presence(Presence::Active);
        let points = self.players[at].awesome_points();
        tracing::info!(channel = %self.channel, %nick, "player resumed");
        self.say(format!(
            "Welcome back {nick}! You're dealt back in with {points} Awesome Points."
        ));

        match self.state {
            GameState::Lobby if self.players_needed() == 0 => self.begin_play(),
            GameState::Active => self.revive_stalled_round(),
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Round commands
    // -----------------------------------------------------------------------

    /// Plays the cards at `indexes` from `nick`'s hand as their answer.
    ///
    /// Playing again in the same round replaces the earlier answer. Indexes
    /// always refer to the hand as it was at the start of the round.
    ///
    /// # Errors
    /// - [`GameError::State`] when there's no round collecting answers or
    ///   `nick` isn't one of its players.
    /// - [`GameError::Validation`] for the wrong number of cards, an index
    ///   outside the hand, or the same card twice.
    pub fn play(&mut self, nick: &Nick, indexes: &[usize]) -> Result<(), GameError> {
        self.ensure_active()?;
        let at = self
            .player_index(nick)
            .ok_or_else(|| GameError::state("you're not in this game, type !join to join"))?;
        let id = self.players[at].id();
        let round = self.current_round()?;

        if round.state() != RoundState::CollectingAnswers {
            return Err(GameError::state("answers are closed for this round"));
        }
        if round.czar() == id {
            return Err(GameError::state("you're the card czar this round"));
        }
        if !round.is_eligible(id) || !self.players[at].is_active() {
            return Err(GameError::state(
                "you're not playing this round, wait for the next one",
            ));
        }

        let required = round.question().answers;
        if indexes.len() != required {
            return Err(GameError::validation(match required {
                1 => "pick 1 card".to_string(),
                n => format!("pick {n} cards"),
            }));
        }
        let already_played = round.submission(id).map_or(0, |s| s.cards.len());
        let hand_len = self.players[at].hand().len() + already_played;
        if indexes.iter().any(|&i| i >= hand_len) {
            return Err(GameError::validation(format!(
                "pick a number 0-{}",
                hand_len.saturating_sub(1)
            )));
        }
        for (n, i) in indexes.iter().enumerate() {
            if indexes[..n].contains(i) {
                return Err(GameError::validation("pick two different cards"));
            }
        }
        let number = round.number();

        let round = self
            .round
            .as_mut()
            .ok_or_else(|| GameError::invariant("round vanished mid-play"))?;
        let player = &mut self.players[at];
        let changed = match round.withdraw(id) {
            Some(previous) => {
                player.restore_cards(previous.cards);
                true
            }
            None => false,
        };
        let cards = player.take_cards(indexes);
        round.record(Submission {
            player: id,
            nick: nick.clone(),
            cards,
        });

        tracing::debug!(channel = %self.channel, %nick, round = number, changed, "answer recorded");
        if changed {
            self.whisper(nick, format!("Your answer for Round {number} has been changed!"));
        }
        self.check_round_complete();
        Ok(())
    }

    /// The czar picks the submission at `index` as the round's winner.
    ///
    /// # Errors
    /// - [`GameError::State`] if `nick` isn't the czar or the round isn't
    ///   being judged.
    /// - [`GameError::Validation`] if `index` is past the last submission.
    pub fn winner(&mut self, nick: &Nick, index: usize) -> Result<(), GameError> {
        self.ensure_active()?;
        let round = self.current_round()?;
        if round.czar_nick() != nick {
            return Err(GameError::state("only the card czar can pick the winner"));
        }
        if round.state() != RoundState::CzarJudging {
            return Err(GameError::state("it's not time to pick a winner yet"));
        }
        let count = round.submissions().len();
        if index >= count {
            return Err(GameError::validation(format!(
                "pick a number 0-{}",
                count.saturating_sub(1)
            )));
        }

        let number = round.number();
        let picked = &round.submissions()[index];
        let winner_id = picked.player;
        let winner_nick = picked.nick.clone();
        let answer = round.question().fill(picked.cards.iter().map(|p| &p.card));

        let winner = self
            .players
            .iter_mut()
            .find(|p| p.id() == winner_id)
            .ok_or_else(|| GameError::invariant("winning submission has no player"))?;
        let points = winner.award_point();

        let submitters = self.close_round(Some(winner_nick.clone()))?;
        tracing::info!(channel = %self.channel, round = number, winner = %winner_nick, points, "round won");
        self.say(format!(
            "{winner_nick} wins Round {number} with \"{answer}\" and now has {points} Awesome Points!"
        ));

        if points >= self.config.points_to_win {
            self.state = GameState::Finished;
            tracing::info!(channel = %self.channel, winner = %winner_nick, "game finished");
            self.say(format!(
                "Game Over! {winner_nick} is the winner with {points} Awesome Points!"
            ));
            let standings = self.standings();
            self.say(format!("Total Awesome Points: {standings}"));
            return Ok(());
        }

        for id in submitters {
            self.refill_hand(id);
        }
        self.start_round()
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Closes answers for round `number` if it's still collecting them.
    ///
    /// With no answers in, the round starts over. Otherwise whoever hasn't
    /// played forfeits the round and the czar judges what's there.
    pub fn expire_answers(&mut self, number: u32) -> Result<(), GameError> {
        if !self.is_current(number, RoundState::CollectingAnswers) {
            return Ok(());
        }
        let Some(round) = self.round.as_ref() else {
            return Ok(());
        };

        if round.submissions().is_empty() {
            tracing::info!(channel = %self.channel, round = number, "answer timeout with no answers");
            self.say("Time's up and nobody played a card. Starting a new round.".to_string());
            self.abandon_round();
            return self.start_round();
        }

        let late: Vec<PlayerId> = round
            .eligible()
            .filter(|id| round.submission(*id).is_none())
            .collect();
        let names = late
            .iter()
            .filter_map(|id| self.player_by_id(*id))
            .map(|p| p.nick().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if let Some(round) = self.round.as_mut() {
            for id in &late {
                round.forfeit(*id);
            }
        }
        tracing::info!(channel = %self.channel, round = number, late = late.len(), "answer timeout");
        if !names.is_empty() {
            self.say(format!("Time's up! {names} didn't play in time."));
        }
        self.check_round_complete();
        Ok(())
    }

    /// Abandons round `number` if its czar still hasn't picked a winner.
    pub fn expire_judging(&mut self, number: u32) -> Result<(), GameError> {
        if !self.is_current(number, RoundState::CzarJudging) {
            return Ok(());
        }
        let czar = self
            .round
            .as_ref()
            .map(|r| r.czar_nick().clone())
            .ok_or_else(|| GameError::invariant("judging round vanished"))?;
        tracing::info!(channel = %self.channel, round = number, %czar, "judging timeout");
        self.say(format!(
            "{czar} took too long to pick. Nobody wins Round {number}."
        ));
        self.abandon_round();
        self.start_round()
    }

    /// Repeats the players-needed message while the game waits in Lobby.
    pub fn nag(&mut self) {
        if self.state == GameState::Lobby {
            let needed = self.players_needed();
            self.say(format!(
                "{needed} more players needed to start! Type !join to join the game"
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Read-only queries
    // -----------------------------------------------------------------------

    /// Whispers `nick` their hand.
    pub fn show_cards(&mut self, nick: &Nick) -> Result<(), GameError> {
        let listing = self
            .player(nick)
            .map(Player::hand_listing)
            .ok_or_else(|| GameError::state("you're not in this game"))?;
        self.whisper(nick, format!("Your cards are: {listing}"));
        Ok(())
    }

    pub fn show_points(&mut self) {
        let standings = self.standings();
        self.say(format!("Awesome Points: {standings}"));
    }

    pub fn show_players(&mut self) {
        let czar = self
            .round
            .as_ref()
            .filter(|r| !r.is_complete())
            .map(Round::czar);
        let roster = self
            .players
            .iter()
            .map(|p| match (Some(p.id()) == czar, p.presence()) {
                (true, _) => format!("{} (czar)", p.nick()),
                (false, Presence::Suspended) => format!("{} (away)", p.nick()),
                (false, Presence::Active) => p.nick().to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.say(format!("Players: {roster}"));
    }

    pub fn show_status(&mut self) {
        let line = match (self.state, self.round.as_ref()) {
            (GameState::Lobby, _) => format!(
                "Waiting for players: {} joined, {} more needed. Type !join to join",
                self.active_count(),
                self.players_needed()
            ),
            (GameState::Finished, _) => "The game is over.".to_string(),
            (GameState::Active, Some(round)) => match round.state() {
                RoundState::CollectingAnswers => {
                    let waiting = self.eligible_count().saturating_sub(round.submissions().len());
                    format!(
                        "Round {}: waiting for {waiting} more answers. {} is the card czar",
                        round.number(),
                        round.czar_nick()
                    )
                }
                RoundState::CzarJudging => format!(
                    "Round {}: waiting for {} to pick the winner",
                    round.number(),
                    round.czar_nick()
                ),
                RoundState::Complete => format!("Round {} is over", round.number()),
            },
            (GameState::Active, None) => "The game is starting.".to_string(),
        };
        self.say(line);
    }

    // -----------------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------------

    fn begin_play(&mut self) -> Result<(), GameError> {
        self.state = GameState::Active;
        tracing::info!(channel = %self.channel, players = self.players.len(), "game started");
        self.start_round()
    }

    /// Starts the next round, or falls back to Lobby if fewer than two
    /// players are around.
    fn start_round(&mut self) -> Result<(), GameError> {
        let active: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_active())
            .map(Player::id)
            .collect();
        if active.len() < 2 {
            self.return_to_lobby();
            return Ok(());
        }

        let czar = self.pick_czar(&active)?;
        let czar_nick = self
            .player_by_id(czar)
            .map(|p| p.nick().clone())
            .ok_or_else(|| GameError::invariant("czar is not on the roster"))?;
        let question = self
            .questions
            .draw(&mut self.rng)
            .ok_or_else(|| GameError::invariant("question pile is empty"))?;
        let number = self.round.as_ref().map_or(1, |r| r.number() + 1);

        let round = Round::new(number, question, czar, czar_nick.clone(), active);
        let blanks = match round.question().answers {
            1 => "!play #",
            _ => "!play # #",
        };
        let question_line = match round.question().answers {
            1 => format!("QUESTION: {}", round.question().text),
            n => format!("QUESTION: {} (pick {n})", round.question().text),
        };
        let pool = round.pool().to_vec();
        self.round = Some(round);

        tracing::info!(channel = %self.channel, round = number, czar = %czar_nick, "round started");
        self.say(format!("Round {number}! {czar_nick} is the card czar"));
        self.say(question_line);
        for id in pool {
            if let Some(player) = self.player_by_id(id) {
                let nick = player.nick().clone();
                let listing = player.hand_listing();
                self.whisper(
                    &nick,
                    format!("Your cards are: {listing} | Type {blanks} to play"),
                );
            }
        }
        Ok(())
    }

    /// Round 1 draws a random czar. After that the role passes to the next
    /// player in join order, or to a random one if the last czar is gone.
    fn pick_czar(&mut self, candidates: &[PlayerId]) -> Result<PlayerId, GameError> {
        if candidates.is_empty() {
            return Err(GameError::Resource(
                "no players left to be the card czar".into(),
            ));
        }
        let previous = self
            .round
            .as_ref()
            .map(Round::czar)
            .filter(|id| candidates.contains(id));

        let Some(previous) = previous else {
            let at = self.rng.random_range(0..candidates.len());
            return Ok(candidates[at]);
        };
        let at = candidates
            .iter()
            .position(|id| *id == previous)
            .ok_or_else(|| GameError::invariant("previous czar lost from candidates"))?;
        Ok(candidates[(at + 1) % candidates.len()])
    }

    /// Moves to judging once every eligible player has answered.
    fn check_round_complete(&mut self) {
        let eligible = self.eligible_count();
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.state() != RoundState::CollectingAnswers
            || eligible == 0
            || round.submissions().len() < eligible
        {
            return;
        }

        round.begin_judging();
        round.submissions_mut().shuffle(&mut self.rng);
        tracing::info!(
            channel = %self.channel,
            round = round.number(),
            answers = round.submissions().len(),
            "judging started"
        );
        self.announce_answers("Here are the answers:");
    }

    fn announce_answers(&mut self, heading: &str) {
        let Some(round) = self.round.as_ref() else {
            return;
        };
        let number = round.number();
        let czar = round.czar_nick().clone();
        let lines: Vec<String> = round
            .submissions()
            .iter()
            .enumerate()
            .map(|(i, s)| format!("[{i}] {}", round.question().fill(s.cards.iter().map(|p| &p.card))))
            .collect();

        self.say(format!("Round {number}! {heading}"));
        for line in lines {
            self.say(line);
        }
        self.say(format!("{czar}, pick the winner by typing !winner #"));
    }

    /// Completes the current round. Played cards and the question go to the
    /// discard piles. Returns who had submitted.
    fn close_round(&mut self, winner: Option<Nick>) -> Result<Vec<PlayerId>, GameError> {
        let round = self
            .round
            .as_mut()
            .ok_or_else(|| GameError::invariant("no round to close"))?;
        let submissions = round.take_submissions();
        round.complete(winner);
        self.questions.discard(round.question().clone());

        let mut submitters = Vec::with_capacity(submissions.len());
        for submission in submissions {
            submitters.push(submission.player);
            self.answers
                .discard_all(submission.cards.into_iter().map(|p| p.card));
        }
        Ok(submitters)
    }

    /// Ends the current round without a winner. Played cards go back to the
    /// hands they came from.
    fn abandon_round(&mut self) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.is_complete() {
            return;
        }
        let submissions = round.take_submissions();
        round.complete(None);
        self.questions.discard(round.question().clone());
        tracing::debug!(channel = %self.channel, round = round.number(), "round abandoned");

        for submission in submissions {
            self.return_cards(submission.player, submission.cards);
        }
    }

    fn return_to_lobby(&mut self) {
        if self.state != GameState::Active {
            return;
        }
        self.abandon_round();
        self.state = GameState::Lobby;
        let needed = self.players_needed();
        tracing::info!(channel = %self.channel, needed, "game back in lobby");
        self.say(format!(
            "Not enough players to keep going. {needed} more players needed! Type !join to join"
        ));
    }

    /// A round nobody can answer restarts as soon as someone can.
    fn revive_stalled_round(&mut self) -> Result<(), GameError> {
        let stalled = self.state == GameState::Active
            && self
                .round
                .as_ref()
                .is_some_and(|r| r.state() == RoundState::CollectingAnswers)
            && self.eligible_count() == 0;
        if !stalled {
            return Ok(());
        }
        self.say("Nobody could answer this round. Dealing a new one.".to_string());
        self.abandon_round();
        self.start_round()
    }

    /// Cleans up after a player quits or is suspended.
    fn handle_departure(&mut self, id: PlayerId, nick: &Nick) -> Result<(), GameError> {
        if self.state != GameState::Active {
            return Ok(());
        }
        if self.active_count() < 2 {
            self.return_to_lobby();
            return Ok(());
        }
        let Some(round) = self.round.as_mut() else {
            return Err(GameError::invariant("active game has no round"));
        };

        match round.state() {
            RoundState::Complete => Ok(()),
            _ if round.czar() == id => {
                let number = round.number();
                self.say(format!(
                    "{nick} was the card czar, so nobody wins Round {number}."
                ));
                self.abandon_round();
                self.start_round()
            }
            RoundState::CollectingAnswers => {
                if let Some(submission) = round.withdraw(id) {
                    self.return_cards(id, submission.cards);
                }
                self.check_round_complete();
                self.revive_stalled_round()
            }
            RoundState::CzarJudging => {
                let Some(submission) = round.withdraw(id) else {
                    return Ok(());
                };
                let remaining = round.submissions().len();
                self.return_cards(id, submission.cards);
                if remaining == 0 {
                    self.say("No answers left to judge. Starting a new round.".to_string());
                    self.abandon_round();
                    self.start_round()
                } else {
                    self.announce_answers("The answers have changed:");
                    Ok(())
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn ensure_active(&self) -> Result<(), GameError> {
        match self.state {
            GameState::Active => Ok(()),
            GameState::Lobby => Err(GameError::state("the game hasn't started yet")),
            GameState::Finished => Err(GameError::state("the game is over")),
        }
    }

    fn current_round(&self) -> Result<&Round, GameError> {
        self.round
            .as_ref()
            .ok_or_else(|| GameError::invariant("active game has no round"))
    }

    fn is_current(&self, number: u32, phase: RoundState) -> bool {
        self.state == GameState::Active
            && self
                .round
                .as_ref()
                .is_some_and(|r| r.number() == number && r.state() == phase)
    }

    fn player_index(&self, nick: &Nick) -> Option<usize> {
        self.players.iter().position(|p| p.nick() == nick)
    }

    fn player_by_id(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    /// Eligible players of the current round who are still here.
    fn eligible_count(&self) -> usize {
        let Some(round) = self.round.as_ref() else {
            return 0;
        };
        round
            .eligible()
            .filter(|id| self.player_by_id(*id).is_some_and(Player::is_active))
            .count()
    }

    fn players_needed(&self) -> usize {
        self.config.min_players.saturating_sub(self.active_count())
    }

    fn draw_answers(&mut self, count: usize) -> Vec<AnswerCard> {
        let cards: Vec<AnswerCard> = (0..count)
            .map_while(|_| self.answers.draw(&mut self.rng))
            .collect();
        if cards.len() < count {
            tracing::warn!(
                channel = %self.channel,
                wanted = count,
                dealt = cards.len(),
                "answer cards ran out"
            );
        }
        cards
    }

    fn refill_hand(&mut self, id: PlayerId) {
        let Some(missing) = self
            .player_by_id(id)
            .map(|p| self.config.hand_size.saturating_sub(p.hand().len()))
        else {
            return;
        };
        let cards = self.draw_answers(missing);
        if let Some(player) = self.players.iter_mut().find(|p| p.id() == id) {
            player.add_cards(cards);
        }
    }

    /// Gives played cards back to their owner, or discards them if the
    /// owner has quit.
    fn return_cards(&mut self, id: PlayerId, cards: Vec<PlayedCard>) {
        match self.players.iter_mut().find(|p| p.id() == id) {
            Some(player) => player.restore_cards(cards),
            None => self.answers.discard_all(cards.into_iter().map(|p| p.card)),
        }
    }

    /// `nick: points` by points descending, join order among ties.
    fn standings(&self) -> String {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.awesome_points().cmp(&a.awesome_points()));
        ranked
            .iter()
            .map(|p| format!("{}: {}", p.nick(), p.awesome_points()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn say(&mut self, text: String) {
        self.outbox.push((Recipient::Channel, text));
    }

    fn whisper(&mut self, nick: &Nick, text: String) {
        self.outbox.push((Recipient::Player(nick.clone()), text));
    }
}
