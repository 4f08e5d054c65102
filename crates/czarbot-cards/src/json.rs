//! Card files in the "master cards" JSON format.
//!
//! The format is a JSON array of card objects, optionally assigned to a
//! JavaScript variable:
//!
//! ```text
//! masterCards = [
//!   {"id": 1, "cardType": "Q", "text": "Why can't I sleep at night?", "numAnswers": 1, "expansion": "Base"},
//!   {"id": 2, "cardType": "A", "text": "Bees?", "expansion": "Base"}
//! ]
//! ```
//!
//! Card text in these files carries HTML leftovers (`&amp;`, `<i>`, `<br>`),
//! which are cleaned before the cards reach a game.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{AnswerCard, CardBox, CardId, CardSupplier, FetchError, QuestionCard};

const VARIABLE_PREFIX: &str = "masterCards = ";

const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#039;", "'"),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", " "),
    ("&reg;", "®"),
    ("&trade;", "™"),
];

const TAGS: &[&str] = &["<br>", "<b>", "</b>", "<i>", "</i>", "<u>", "</u>"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MasterCard {
    id: u32,
    text: String,
    #[serde(default)]
    num_answers: usize,
    card_type: String,
}

/// Reads a master-card JSON file every time a game needs a deck.
#[derive(Debug, Clone)]
pub struct JsonCardSupplier {
    path: PathBuf,
}

impl JsonCardSupplier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CardSupplier for JsonCardSupplier {
    async fn fetch(&self) -> Result<CardBox, FetchError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        let deck = parse_master_cards(&body)?;
        tracing::debug!(
            path = %self.path.display(),
            questions = deck.questions.len(),
            answers = deck.answers.len(),
            "card file loaded"
        );
        Ok(deck)
    }
}

/// Parses master-card JSON into a deck.
///
/// Cards with an unknown `cardType` are skipped. Question cards that don't
/// state `numAnswers` take one answer.
///
/// # Errors
/// [`FetchError::Parse`] for malformed JSON, [`FetchError::Empty`] if either
/// kind of card is missing entirely.
pub fn parse_master_cards(body: &str) -> Result<CardBox, FetchError> {
    let body = body.trim_start();
    let body = body.strip_prefix(VARIABLE_PREFIX).unwrap_or(body);
    let body = body.trim_end().trim_end_matches(';').replace("\\'", "'");

    let cards: Vec<MasterCard> = serde_json::from_str(&body)?;

    let mut deck = CardBox::default();
    for card in cards {
        let text = clean_text(&card.text);
        match card.card_type.as_str() {
            "Q" => deck.questions.push(QuestionCard {
                id: CardId(card.id),
                text,
                answers: card.num_answers.max(1),
            }),
            "A" => deck.answers.push(AnswerCard {
                id: CardId(card.id),
                text: text.trim_end_matches('.').to_string(),
            }),
            other => {
                tracing::debug!(id = card.id, card_type = other, "skipping unknown card type");
            }
        }
    }

    if deck.questions.is_empty() {
        return Err(FetchError::Empty("question"));
    }
    if deck.answers.is_empty() {
        return Err(FetchError::Empty("answer"));
    }
    Ok(deck)
}

fn clean_text(raw: &str) -> String {
    let mut text = raw.to_string();
    for (entity, plain) in ENTITIES {
        text = text.replace(entity, plain);
    }
    for tag in TAGS {
        text = text.replace(tag, "");
    }
    while text.contains("  ") {
        text = text.replace("  ", " ");
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_markup() {
        assert_eq!(
            clean_text("Tom &amp; Jerry&#039;s <i>big</i>  <b>day</b><br>"),
            "Tom & Jerry's big day"
        );
    }

    #[test]
    fn test_parse_with_variable_prefix() {
        let body = r#"masterCards = [
            {"id": 1, "cardType": "Q", "text": "What ended my last relationship? _", "numAnswers": 1, "expansion": "Base"},
            {"id": 2, "cardType": "Q", "text": "_ + _ = _", "numAnswers": 3, "expansion": "Base"},
            {"id": 3, "cardType": "A", "text": "A balanced breakfast.", "expansion": "Base"}
        ];"#;
        let deck = parse_master_cards(body).unwrap();
        assert_eq!(deck.questions.len(), 2);
        assert_eq!(deck.questions[1].answers, 3);
        assert_eq!(deck.answers[0].text, "A balanced breakfast");
        assert_eq!(deck.answers[0].id, CardId(3));
    }

    #[test]
    fn test_parse_unescapes_javascript_quotes() {
        let body = r#"[
            {"id": 1, "cardType": "Q", "text": "It\'s a trap: _"},
            {"id": 2, "cardType": "A", "text": "Ackbar"}
        ]"#;
        let deck = parse_master_cards(body).unwrap();
        assert_eq!(deck.questions[0].text, "It's a trap: _");
        assert_eq!(deck.questions[0].answers, 1);
    }

    #[test]
    fn test_parse_rejects_deck_without_answers() {
        let body = r#"[{"id": 1, "cardType": "Q", "text": "Lonely _", "numAnswers": 1}]"#;
        assert!(matches!(
            parse_master_cards(body),
            Err(FetchError::Empty("answer"))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_master_cards("masterCards = [{"),
            Err(FetchError::Parse(_))
        ));
    }
}
