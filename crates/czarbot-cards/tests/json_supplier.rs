//! Integration tests for reading card files from disk.

use std::io::Write;

use czarbot_cards::{CardSupplier, FetchError, JsonCardSupplier};

const DECK: &str = r#"masterCards = [
    {"id": 1, "cardType": "Q", "text": "What's my secret power? _", "numAnswers": 1, "expansion": "Base"},
    {"id": 2, "cardType": "Q", "text": "_ is a slippery slope that leads to _.", "numAnswers": 2, "expansion": "Base"},
    {"id": 3, "cardType": "A", "text": "Being on fire.", "expansion": "Base"},
    {"id": 4, "cardType": "A", "text": "Racism &amp; sexism.", "expansion": "Base"},
    {"id": 5, "cardType": "A", "text": "<i>Passive-aggressive</i> Post-it notes.", "expansion": "Base"}
]"#;

#[tokio::test]
async fn test_fetch_reads_and_cleans_card_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DECK.as_bytes()).unwrap();

    let supplier = JsonCardSupplier::new(file.path());
    let deck = supplier.fetch().await.unwrap();

    assert_eq!(deck.questions.len(), 2);
    assert_eq!(deck.answers.len(), 3);
    assert_eq!(deck.questions[1].answers, 2);
    assert_eq!(deck.answers[1].text, "Racism & sexism");
    assert_eq!(deck.answers[2].text, "Passive-aggressive Post-it notes");
}

#[tokio::test]
async fn test_fetch_is_repeatable() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DECK.as_bytes()).unwrap();

    let supplier = JsonCardSupplier::new(file.path());
    let first = supplier.fetch().await.unwrap();
    let second = supplier.fetch().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_fetch_missing_file_is_io_error() {
    let supplier = JsonCardSupplier::new("/nonexistent/czarbot/cards.json");
    let err = supplier.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Io { .. }));
    assert!(err.to_string().contains("cards.json"));
}
