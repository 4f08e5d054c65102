//! Draw and discard piles.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

/// One kind of card's draw sequence plus its discard bag.
///
/// Cards are never created or dropped here: everything drawn is somewhere
/// else until it is discarded, and an empty draw sequence is refilled by
/// shuffling the whole discard bag back in.
#[derive(Debug, Clone)]
pub struct Pile<T> {
    draw: VecDeque<T>,
    discard: Vec<T>,
}

impl<T> Pile<T> {
    /// Builds a pile from `cards`, shuffled.
    pub fn shuffled<R: Rng + ?Sized>(mut cards: Vec<T>, rng: &mut R) -> Self {
        cards.shuffle(rng);
        Self {
            draw: cards.into(),
            discard: Vec::new(),
        }
    }

    /// Takes the next card, reshuffling the discards first if the draw
    /// sequence is empty. `None` only when both are empty.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.draw.is_empty() && !self.discard.is_empty() {
            let mut cards = std::mem::take(&mut self.discard);
            cards.shuffle(rng);
            tracing::debug!(cards = cards.len(), "reshuffling discard pile");
            self.draw = cards.into();
        }
        self.draw.pop_front()
    }

    pub fn discard(&mut self, card: T) {
        self.discard.push(card);
    }

    pub fn discard_all(&mut self, cards: impl IntoIterator<Item = T>) {
        self.discard.extend(cards);
    }

    pub fn draw_len(&self) -> usize {
        self.draw.len()
    }

    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    /// Every card held by the pile, draw sequence first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.draw.iter().chain(self.discard.iter())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_draw_empties_then_returns_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pile = Pile::shuffled(vec![1, 2, 3], &mut rng);
        let mut drawn: Vec<i32> = (0..3).filter_map(|_| pile.draw(&mut rng)).collect();
        drawn.sort_unstable();
        assert_eq!(drawn, vec![1, 2, 3]);
        assert_eq!(pile.draw(&mut rng), None);
    }

    #[test]
    fn test_exhausted_draw_reshuffles_discards() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut pile = Pile::shuffled(vec![1, 2], &mut rng);
        let a = pile.draw(&mut rng).unwrap();
        let b = pile.draw(&mut rng).unwrap();
        pile.discard_all([a, b]);
        assert_eq!(pile.draw_len(), 0);
        assert_eq!(pile.discard_len(), 2);

        assert!(pile.draw(&mut rng).is_some());
        assert_eq!(pile.discard_len(), 0);
        assert_eq!(pile.draw_len(), 1);
    }

    #[test]
    fn test_iter_covers_both_halves() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pile = Pile::shuffled(vec![1, 2, 3], &mut rng);
        let card = pile.draw(&mut rng).unwrap();
        pile.discard(card);
        assert_eq!(pile.iter().count(), 3);
    }
}
