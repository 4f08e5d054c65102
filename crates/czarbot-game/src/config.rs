//! Game configuration and lifecycle state.

use serde::{Deserialize, Serialize};

use crate::GameError;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Settings a new game is created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Players needed before round 1 starts.
    pub min_players: usize,

    /// Awesome points that end the game.
    pub points_to_win: u32,

    /// Cards each player holds between rounds.
    pub hand_size: usize,

    /// Seed for every random choice the game makes. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 3,
            points_to_win: 5,
            hand_size: 10,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = min_players;
        self
    }

    pub fn with_points_to_win(mut self, points_to_win: u32) -> Self {
        self.points_to_win = points_to_win;
        self
    }

    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the settings a game can actually be played with.
    ///
    /// # Errors
    /// [`GameError::Config`] naming the first unusable setting.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.points_to_win < 1 {
            return Err(GameError::Config(
                "the game has to be played to at least 1 Awesome Point".into(),
            ));
        }
        if self.min_players < 2 {
            return Err(GameError::Config(
                "a game needs at least 2 players".into(),
            ));
        }
        if self.hand_size < 1 {
            return Err(GameError::Config(
                "players need at least 1 card in hand".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The lifecycle state of a game.
///
/// ```text
/// Lobby ⇄ Active → Finished
/// ```
///
/// - **Lobby**: waiting for enough players. A game starts here and comes
///   back here if an Active game drops below two active players.
/// - **Active**: rounds are being played.
/// - **Finished**: someone reached the points threshold. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Lobby,
    Active,
    Finished,
}

impl GameState {
    /// Returns `true` if players can still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby | Self::Active)
    }

    /// Returns `true` while rounds are being played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Lobby, Self::Active)
                | (Self::Active, Self::Lobby)
                | (Self::Active, Self::Finished)
        )
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Active => write!(f, "Active"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_points_rejected() {
        let config = GameConfig::default().with_points_to_win(0);
        assert!(matches!(config.validate(), Err(GameError::Config(_))));
    }

    #[test]
    fn test_single_player_minimum_rejected() {
        let config = GameConfig::default().with_min_players(1);
        assert!(matches!(config.validate(), Err(GameError::Config(_))));
    }

    #[test]
    fn test_game_state_transitions() {
        assert!(GameState::Lobby.can_transition_to(GameState::Active));
        assert!(GameState::Active.can_transition_to(GameState::Lobby));
        assert!(GameState::Active.can_transition_to(GameState::Finished));
        assert!(!GameState::Lobby.can_transition_to(GameState::Finished));
        assert!(!GameState::Finished.can_transition_to(GameState::Active));
        assert!(!GameState::Finished.can_transition_to(GameState::Lobby));
    }

    #[test]
    fn test_game_state_predicates() {
        assert!(GameState::Lobby.is_joinable());
        assert!(GameState::Active.is_joinable());
        assert!(!GameState::Finished.is_joinable());
        assert!(GameState::Active.is_active());
        assert!(GameState::Finished.is_finished());
    }
}
