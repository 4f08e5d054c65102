//! The card supplier hook.
//!
//! czarbot doesn't decide where cards live. A web endpoint, a file, a
//! database: whatever it is, it implements [`CardSupplier`] and the bot
//! calls it once for every new game.

use std::future::Future;

use crate::{CardBox, FetchError};

/// Produces a fresh deck for a new game.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the supplier lives as long as the bot and is
///   shared by every channel.
/// - The returned future is `Send` because creation runs inside a
///   per-channel Tokio task.
///
/// # Example
///
/// ```rust
/// use czarbot_cards::{AnswerCard, CardBox, CardSupplier, FetchError, QuestionCard};
///
/// /// Always deals the same tiny deck.
/// struct TinyDeck;
///
/// impl CardSupplier for TinyDeck {
///     async fn fetch(&self) -> Result<CardBox, FetchError> {
///         Ok(CardBox::new(
///             vec![QuestionCard::new(1, "Why can't I sleep at night? _", 1)],
///             vec![AnswerCard::new(2, "Bees")],
///         ))
///     }
/// }
/// ```
pub trait CardSupplier: Send + Sync + 'static {
    /// Fetches the question and answer cards for one game.
    ///
    /// # Errors
    /// Returns a [`FetchError`] if the cards can't be produced. The caller
    /// reports it to the channel and gives up on that game.
    fn fetch(&self) -> impl Future<Output = Result<CardBox, FetchError>> + Send;
}

/// Serves a clone of the same deck every time.
#[derive(Debug, Clone, Default)]
pub struct StaticCardSupplier {
    deck: CardBox,
}

impl StaticCardSupplier {
    pub fn new(deck: CardBox) -> Self {
        Self { deck }
    }

    /// A deck of `questions` single-answer questions and `answers` answers,
    /// with distinct ids and placeholder text.
    pub fn generated(questions: u32, answers: u32) -> Self {
        let qs = (0..questions)
            .map(|i| crate::QuestionCard::new(i, format!("Question {i}: _"), 1))
            .collect();
        let ans = (0..answers)
            .map(|i| crate::AnswerCard::new(10_000 + i, format!("Answer {i}")))
            .collect();
        Self::new(CardBox::new(qs, ans))
    }
}

impl CardSupplier for StaticCardSupplier {
    async fn fetch(&self) -> Result<CardBox, FetchError> {
        if self.deck.questions.is_empty() {
            return Err(FetchError::Empty("question"));
        }
        if self.deck.answers.is_empty() {
            return Err(FetchError::Empty("answer"));
        }
        Ok(self.deck.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_supplier_returns_its_deck() {
        let supplier = StaticCardSupplier::generated(3, 40);
        let deck = supplier.fetch().await.unwrap();
        assert_eq!(deck.questions.len(), 3);
        assert_eq!(deck.answers.len(), 40);
    }

    #[tokio::test]
    async fn test_static_supplier_rejects_empty_deck() {
        let supplier = StaticCardSupplier::default();
        assert!(matches!(
            supplier.fetch().await,
            Err(FetchError::Empty("question"))
        ));
    }
}
