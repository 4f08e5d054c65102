use czarbot_cards::{AnswerCard, CardBox, CardId, QuestionCard};
use czarbot_game::{Game, GameConfig, GameError, GameState, RoundState};
use czarbot_protocol::{Nick, Recipient};

// ===========================================================================
// Helpers
// ===========================================================================

fn deck() -> CardBox {
    CardBox::new(
        (0..12)
            .map(|i| QuestionCard::new(i, format!("Why {i}? _"), 1))
            .collect(),
        (0..60)
            .map(|i| AnswerCard::new(500 + i, format!("Answer {i}")))
            .collect(),
    )
}

fn start(min_players: usize, points: u32, seed: u64, nicks: &[&str]) -> Game {
    let config = GameConfig::default()
        .with_min_players(min_players)
        .with_points_to_win(points)
        .with_seed(seed);
    let mut game = Game::create("#cah".into(), nicks[0].into(), config, deck()).unwrap();
    for nick in &nicks[1..] {
        game.join(&(*nick).into()).unwrap();
    }
    game
}

fn czar(game: &Game) -> Nick {
    game.round().unwrap().czar_nick().clone()
}

fn pool_nicks(game: &Game) -> Vec<Nick> {
    let round = game.round().unwrap();
    game.players()
        .iter()
        .filter(|p| round.pool().contains(&p.id()))
        .map(|p| p.nick().clone())
        .collect()
}

/// Every answer card id the game holds, wherever it is.
fn answer_ids(game: &Game) -> Vec<CardId> {
    let mut ids: Vec<CardId> = game.answer_pile().iter().map(|c| c.id).collect();
    for player in game.players() {
        ids.extend(player.hand().iter().map(|c| c.id));
    }
    if let Some(round) = game.round() {
        for submission in round.submissions() {
            ids.extend(submission.cards.iter().map(|p| p.card.id));
        }
    }
    ids.sort();
    ids
}

fn all_answer_ids() -> Vec<CardId> {
    (0..60).map(|i| CardId(500 + i)).collect()
}

/// Every question card id: both piles plus the question of an open round.
/// A completed round's question is already on the discard pile.
fn question_ids(game: &Game) -> Vec<CardId> {
    let mut ids: Vec<CardId> = game.question_pile().iter().map(|c| c.id).collect();
    if let Some(round) = game.round().filter(|r| !r.is_complete()) {
        ids.push(round.question().id);
    }
    ids.sort();
    ids
}

fn all_question_ids() -> Vec<CardId> {
    (0..12).map(CardId).collect()
}

fn said(game: &mut Game) -> Vec<String> {
    game.drain_output()
        .into_iter()
        .filter(|(to, _)| *to == Recipient::Channel)
        .map(|(_, text)| text)
        .collect()
}

fn play_round(game: &mut Game, pick: usize) {
    for nick in pool_nicks(game) {
        game.play(&nick, &[0]).unwrap();
    }
    let czar = czar(game);
    game.winner(&czar, pick).unwrap();
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn test_three_player_game_to_one_point() {
    let mut game = start(3, 1, 11, &["A", "B", "C"]);
    assert_eq!(game.state(), GameState::Active);
    assert_eq!(game.round().unwrap().number(), 1);

    let czar = czar(&game);
    let players = pool_nicks(&game);
    assert_eq!(players.len(), 2);
    assert!(!players.contains(&czar));

    game.play(&players[0], &[0]).unwrap();
    assert_eq!(game.round().unwrap().state(), RoundState::CollectingAnswers);
    game.play(&players[1], &[0]).unwrap();
    assert_eq!(game.round().unwrap().state(), RoundState::CzarJudging);

    let winner = game.round().unwrap().submissions()[0].nick.clone();
    game.drain_output();
    game.winner(&czar, 0).unwrap();

    assert_eq!(game.state(), GameState::Finished);
    assert_eq!(game.player(&winner).unwrap().awesome_points(), 1);
    let lines = said(&mut game);
    let standings = lines.last().unwrap();
    assert!(standings.starts_with(&format!("Total Awesome Points: {winner}: 1")));
    for nick in ["A", "B", "C"] {
        assert!(standings.contains(nick));
    }
}

#[test]
fn test_finished_game_rejects_moves() {
    let mut game = start(2, 1, 3, &["A", "B"]);
    play_round(&mut game, 0);
    assert_eq!(game.state(), GameState::Finished);

    assert!(matches!(
        game.play(&"A".into(), &[0]),
        Err(GameError::State(_))
    ));
    game.join(&"Z".into()).unwrap();
    assert!(game.player(&"Z".into()).is_none());
}

#[test]
fn test_not_finished_before_threshold() {
    let mut game = start(3, 3, 5, &["A", "B", "C"]);
    for _ in 0..2 {
        play_round(&mut game, 0);
        assert_eq!(game.state(), GameState::Active);
    }
    assert!(game.players().iter().all(|p| p.awesome_points() < 3));
}

#[test]
fn test_czar_quitting_abandons_round() {
    let mut game = start(3, 5, 21, &["A", "B", "C", "D"]);
    let czar = czar(&game);
    let players = pool_nicks(&game);
    game.play(&players[0], &[4]).unwrap();
    let hand_before = game.player(&players[0]).unwrap().hand().len();

    game.quit(&czar).unwrap();

    let round = game.round().unwrap();
    assert_eq!(round.number(), 2);
    assert_eq!(round.state(), RoundState::CollectingAnswers);
    assert_ne!(round.czar_nick(), &czar);
    assert!(round.submissions().is_empty());
    assert_eq!(game.player(&players[0]).unwrap().hand().len(), hand_before + 1);
    assert!(game.players().iter().all(|p| p.awesome_points() == 0));
    assert_eq!(answer_ids(&game), all_answer_ids());
}

#[test]
fn test_quitter_with_pending_answer_does_not_block_round() {
    let mut game = start(4, 5, 8, &["A", "B", "C", "D"]);
    let players = pool_nicks(&game);
    assert_eq!(players.len(), 3);
    game.play(&players[0], &[0]).unwrap();
    game.play(&players[1], &[0]).unwrap();
    game.quit(&players[0]).unwrap();
    assert_eq!(game.round().unwrap().state(), RoundState::CollectingAnswers);

    game.play(&players[2], &[0]).unwrap();
    let round = game.round().unwrap();
    assert_eq!(round.state(), RoundState::CzarJudging);
    assert_eq!(round.submissions().len(), 2);
    assert_eq!(answer_ids(&game).len(), 60);
}

#[test]
fn test_late_joiner_waits_for_next_round() {
    let mut game = start(3, 5, 13, &["A", "B", "C"]);
    game.join(&"D".into()).unwrap();
    assert!(matches!(
        game.play(&"D".into(), &[0]),
        Err(GameError::State(_))
    ));

    for nick in pool_nicks(&game) {
        game.play(&nick, &[0]).unwrap();
    }
    assert_eq!(game.round().unwrap().state(), RoundState::CzarJudging);
}

// ===========================================================================
// Timers
// ===========================================================================

#[test]
fn test_answer_timeout_forfeits_late_players() {
    let mut game = start(3, 5, 17, &["A", "B", "C"]);
    let players = pool_nicks(&game);
    game.play(&players[0], &[0]).unwrap();

    game.expire_answers(1).unwrap();

    let round = game.round().unwrap();
    assert_eq!(round.state(), RoundState::CzarJudging);
    assert_eq!(round.submissions().len(), 1);
    assert!(!round.is_eligible(game.player(&players[1]).unwrap().id()));
}

#[test]
fn test_answer_timeout_with_no_answers_restarts() {
    let mut game = start(3, 5, 19, &["A", "B", "C"]);
    game.expire_answers(1).unwrap();
    let round = game.round().unwrap();
    assert_eq!(round.number(), 2);
    assert_eq!(round.state(), RoundState::CollectingAnswers);
}

#[test]
fn test_stale_timers_are_ignored() {
    let mut game = start(3, 5, 23, &["A", "B", "C"]);
    game.expire_judging(1).unwrap();
    game.expire_answers(7).unwrap();
    let round = game.round().unwrap();
    assert_eq!(round.number(), 1);
    assert_eq!(round.state(), RoundState::CollectingAnswers);
}

#[test]
fn test_judging_timeout_returns_cards() {
    let mut game = start(3, 5, 29, &["A", "B", "C"]);
    for nick in pool_nicks(&game) {
        game.play(&nick, &[0]).unwrap();
    }
    game.expire_judging(1).unwrap();

    assert_eq!(game.round().unwrap().number(), 2);
    assert!(game.players().iter().all(|p| p.hand().len() == 10));
    assert!(game.players().iter().all(|p| p.awesome_points() == 0));
}

// ===========================================================================
// Card conservation
// ===========================================================================

#[test]
fn test_cards_are_conserved_through_a_long_game() {
    let mut game = start(3, 50, 31, &["A", "B", "C", "D"]);
    assert_eq!(answer_ids(&game), all_answer_ids());
    assert_eq!(question_ids(&game), all_question_ids());

    for turn in 0..30 {
        let players = pool_nicks(&game);
        for (i, nick) in players.iter().enumerate() {
            game.play(nick, &[(turn + i) % 10]).unwrap();
            assert_eq!(answer_ids(&game), all_answer_ids());
        }
        assert_eq!(question_ids(&game), all_question_ids());
        let czar = czar(&game);
        game.winner(&czar, turn % players.len()).unwrap();
        assert_eq!(answer_ids(&game), all_answer_ids());
        assert_eq!(question_ids(&game), all_question_ids());
    }
    assert_eq!(game.round().unwrap().number(), 31);
}

#[test]
fn test_quitting_discards_the_hand() {
    let mut game = start(3, 5, 37, &["A", "B", "C", "D"]);
    let discards = game.answer_pile().discard_len();
    let leaver = pool_nicks(&game).remove(0);
    game.quit(&leaver).unwrap();

    assert_eq!(game.answer_pile().discard_len(), discards + 10);
    assert_eq!(answer_ids(&game), all_answer_ids());
}
