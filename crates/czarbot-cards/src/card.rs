//! Card data types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a card within its deck.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A white card: something players play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCard {
    pub id: CardId,
    pub text: String,
}

impl AnswerCard {
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id: CardId(id),
            text: text.into(),
        }
    }
}

/// A black card: the prompt for a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCard {
    pub id: CardId,
    pub text: String,
    /// How many answer cards a submission for this question carries.
    pub answers: usize,
}

impl QuestionCard {
    pub fn new(id: u32, text: impl Into<String>, answers: usize) -> Self {
        Self {
            id: CardId(id),
            text: text.into(),
            answers,
        }
    }

    /// Renders the question with `answers` filled in.
    ///
    /// Each answer replaces the next run of underscores. Answers left over
    /// once the blanks run out are appended.
    pub fn fill<'a>(&self, answers: impl IntoIterator<Item = &'a AnswerCard>) -> String {
        let mut out = self.text.clone();
        for answer in answers {
            match out.find('_') {
                Some(start) => {
                    let end = out[start..]
                        .find(|c: char| c != '_')
                        .map_or(out.len(), |len| start + len);
                    out.replace_range(start..end, &answer.text);
                }
                None => {
                    out.push(' ');
                    out.push_str(&answer.text);
                }
            }
        }
        out
    }
}

/// One fetched deck: every question and answer card a game starts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBox {
    pub questions: Vec<QuestionCard>,
    pub answers: Vec<AnswerCard>,
}

impl CardBox {
    pub fn new(questions: Vec<QuestionCard>, answers: Vec<AnswerCard>) -> Self {
        Self { questions, answers }
    }
}
