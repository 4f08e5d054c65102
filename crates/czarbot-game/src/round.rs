//! One round: a question, a czar, and the answers played to it.

use czarbot_cards::QuestionCard;
use czarbot_protocol::Nick;
use serde::{Deserialize, Serialize};

use crate::{PlayedCard, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    CollectingAnswers,
    CzarJudging,
    Complete,
}

/// The cards one player put forward this round.
#[derive(Debug, Clone)]
pub struct Submission {
    pub player: PlayerId,
    pub nick: Nick,
    pub cards: Vec<PlayedCard>,
}

#[derive(Debug, Clone)]
pub struct Round {
    number: u32,
    state: RoundState,
    question: QuestionCard,
    czar: PlayerId,
    czar_nick: Nick,
    /// Who may submit, fixed when the round starts. Never holds the czar.
    pool: Vec<PlayerId>,
    /// Pool members who timed out and may no longer submit.
    forfeited: Vec<PlayerId>,
    submissions: Vec<Submission>,
    winner: Option<Nick>,
}

impl Round {
    pub(crate) fn new(
        number: u32,
        question: QuestionCard,
        czar: PlayerId,
        czar_nick: Nick,
        pool: Vec<PlayerId>,
    ) -> Self {
        let pool = pool.into_iter().filter(|id| *id != czar).collect();
        Self {
            number,
            state: RoundState::CollectingAnswers,
            question,
            czar,
            czar_nick,
            pool,
            forfeited: Vec::new(),
            submissions: Vec::new(),
            winner: None,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn question(&self) -> &QuestionCard {
        &self.question
    }

    pub fn czar(&self) -> PlayerId {
        self.czar
    }

    pub fn czar_nick(&self) -> &Nick {
        &self.czar_nick
    }

    pub fn pool(&self) -> &[PlayerId] {
        &self.pool
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn winner(&self) -> Option<&Nick> {
        self.winner.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.state == RoundState::Complete
    }

    /// Pool members who haven't forfeited. Presence is the game's concern.
    pub fn eligible(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.pool
            .iter()
            .copied()
            .filter(|id| !self.forfeited.contains(id))
    }

    pub fn is_eligible(&self, player: PlayerId) -> bool {
        self.pool.contains(&player) && !self.forfeited.contains(&player)
    }

    pub fn submission(&self, player: PlayerId) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.player == player)
    }

    pub(crate) fn record(&mut self, submission: Submission) {
        self.submissions.push(submission);
    }

    /// Removes and returns `player`'s submission, if any.
    pub(crate) fn withdraw(&mut self, player: PlayerId) -> Option<Submission> {
        let at = self.submissions.iter().position(|s| s.player == player)?;
        Some(self.submissions.remove(at))
    }

    pub(crate) fn forfeit(&mut self, player: PlayerId) {
        if !self.forfeited.contains(&player) {
            self.forfeited.push(player);
        }
    }

    pub(crate) fn submissions_mut(&mut self) -> &mut Vec<Submission> {
        &mut self.submissions
    }

    pub(crate) fn take_submissions(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.submissions)
    }

    pub(crate) fn begin_judging(&mut self) {
        self.state = RoundState::CzarJudging;
    }

    pub(crate) fn complete(&mut self, winner: Option<Nick>) {
        self.winner = winner;
        self.state = RoundState::Complete;
    }
}

#[cfg(test)]
mod tests {
    use czarbot_cards::AnswerCard;

    use super::*;

    fn round() -> Round {
        Round::new(
            1,
            QuestionCard::new(1, "_?", 1),
            PlayerId(0),
            Nick::new("alice"),
            vec![PlayerId(0), PlayerId(1), PlayerId(2)],
        )
    }

    fn submission(id: u32) -> Submission {
        Submission {
            player: PlayerId(id),
            nick: Nick::new(format!("p{id}")),
            cards: vec![PlayedCard {
                slot: 0,
                card: AnswerCard::new(100 + id, "x"),
            }],
        }
    }

    #[test]
    fn test_czar_never_in_pool() {
        let round = round();
        assert_eq!(round.pool(), &[PlayerId(1), PlayerId(2)]);
        assert!(!round.is_eligible(PlayerId(0)));
    }

    #[test]
    fn test_withdraw_returns_the_submission() {
        let mut round = round();
        round.record(submission(1));
        assert!(round.submission(PlayerId(1)).is_some());

        let taken = round.withdraw(PlayerId(1)).unwrap();
        assert_eq!(taken.player, PlayerId(1));
        assert!(round.submissions().is_empty());
        assert!(round.withdraw(PlayerId(1)).is_none());
    }

    #[test]
    fn test_forfeit_removes_from_eligible() {
        let mut round = round();
        round.forfeit(PlayerId(2));
        round.forfeit(PlayerId(2));
        assert_eq!(round.eligible().collect::<Vec<_>>(), vec![PlayerId(1)]);
        assert!(!round.is_eligible(PlayerId(2)));
    }

    #[test]
    fn test_complete_records_winner() {
        let mut round = round();
        round.begin_judging();
        assert_eq!(round.state(), RoundState::CzarJudging);
        round.complete(Some(Nick::new("bob")));
        assert!(round.is_complete());
        assert_eq!(round.winner().map(Nick::as_str), Some("bob"));
    }
}
