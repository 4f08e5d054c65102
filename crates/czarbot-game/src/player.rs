//! Players and their hands.

use std::fmt;

use czarbot_cards::AnswerCard;
use czarbot_protocol::Nick;
use serde::{Deserialize, Serialize};

/// A player's join index. Never reused within a game, even when the same
/// nick quits and joins again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Whether a player is currently taking part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Active,
    /// Left the channel. Keeps hand and points, sits out rounds.
    Suspended,
}

/// A card moved out of a hand, remembering the slot it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedCard {
    pub slot: usize,
    pub card: AnswerCard,
}

#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    nick: Nick,
    awesome_points: u32,
    hand: Vec<AnswerCard>,
    presence: Presence,
}

impl Player {
    pub(crate) fn new(id: PlayerId, nick: Nick, hand: Vec<AnswerCard>) -> Self {
        Self {
            id,
            nick,
            awesome_points: 0,
            hand,
            presence: Presence::Active,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn nick(&self) -> &Nick {
        &self.nick
    }

    pub fn awesome_points(&self) -> u32 {
        self.awesome_points
    }

    pub fn hand(&self) -> &[AnswerCard] {
        &self.hand
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn is_active(&self) -> bool {
        self.presence == Presence::Active
    }

    pub(crate) fn award_point(&mut self) -> u32 {
        self.awesome_points += 1;
        self.awesome_points
    }

    pub(crate) fn set_presence(&mut self, presence: Presence) {
        self.presence = presence;
    }

    pub(crate) fn add_cards(&mut self, cards: impl IntoIterator<Item = AnswerCard>) {
        self.hand.extend(cards);
    }

    pub(crate) fn take_hand(&mut self) -> Vec<AnswerCard> {
        std::mem::take(&mut self.hand)
    }

    /// Moves the cards at `slots` out of the hand, in the order given.
    ///
    /// Callers validate first: every slot in range, no repeats.
    pub(crate) fn take_cards(&mut self, slots: &[usize]) -> Vec<PlayedCard> {
        let played: Vec<PlayedCard> = slots
            .iter()
            .map(|&slot| PlayedCard {
                slot,
                card: self.hand[slot].clone(),
            })
            .collect();

        let mut descending = slots.to_vec();
        descending.sort_unstable_by(|a, b| b.cmp(a));
        for slot in descending {
            self.hand.remove(slot);
        }
        played
    }

    /// Puts previously taken cards back into the slots they came from.
    pub(crate) fn restore_cards(&mut self, mut played: Vec<PlayedCard>) {
        played.sort_unstable_by_key(|p| p.slot);
        for PlayedCard { slot, card } in played {
            let at = slot.min(self.hand.len());
            self.hand.insert(at, card);
        }
    }

    /// The hand as `[0] text [1] text ...`.
    pub fn hand_listing(&self) -> String {
        self.hand
            .iter()
            .enumerate()
            .map(|(i, card)| format!("[{i}] {}", card.text))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_with(n: u32) -> Player {
        let hand = (0..n).map(|i| AnswerCard::new(i, format!("card {i}"))).collect();
        Player::new(PlayerId(0), Nick::new("alice"), hand)
    }

    #[test]
    fn test_take_cards_keeps_requested_order() {
        let mut player = player_with(5);
        let played = player.take_cards(&[3, 1]);
        assert_eq!(played[0].card.text, "card 3");
        assert_eq!(played[1].card.text, "card 1");
        let left: Vec<_> = player.hand().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(left, vec!["card 0", "card 2", "card 4"]);
    }

    #[test]
    fn test_restore_puts_cards_back_in_place() {
        let mut player = player_with(10);
        let before = player.hand().to_vec();
        let played = player.take_cards(&[7, 3]);
        player.restore_cards(played);
        assert_eq!(player.hand(), before.as_slice());
    }

    #[test]
    fn test_hand_listing() {
        let player = player_with(2);
        assert_eq!(player.hand_listing(), "[0] card 0 [1] card 1");
    }

    #[test]
    fn test_award_point_counts_up() {
        let mut player = player_with(0);
        assert_eq!(player.award_point(), 1);
        assert_eq!(player.award_point(), 2);
        assert_eq!(player.awesome_points(), 2);
    }
}
