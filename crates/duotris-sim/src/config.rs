use duotris_bot::BotConfig;
use duotris_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::SimulationError;

/// Who sends the inputs for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    /// Inputs arrive through [`Simulation::command`](crate::Simulation::command).
    Human,
    /// A [`BotController`](duotris_bot::BotController) acts on every tick.
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarbageConfig {
    /// Smallest single-lock clear that sends garbage to the opponent.
    pub min_clear_lines: usize,
}

impl Default for GarbageConfig {
    fn default() -> Self {
        Self { min_clear_lines: 2 }
    }
}

/// Everything needed to set up a match.
///
/// ```
/// use duotris_bot::Difficulty;
/// use duotris_sim::{Controller, SimulationConfig};
///
/// let config: SimulationConfig = serde_json::from_str(
///     r#"{ "players": ["human", "bot"], "bot": { "difficulty": "hard" } }"#,
/// )
/// .unwrap();
/// assert_eq!(config.players, [Controller::Human, Controller::Bot]);
/// assert_eq!(config.bot.difficulty, Difficulty::Hard);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// One entry per player; one player is a solo game, two a versus match.
    pub players: Vec<Controller>,
    pub engine: EngineConfig,
    /// `None` turns garbage off.
    pub garbage: Option<GarbageConfig>,
    pub bot: BotConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::single()
    }
}

impl SimulationConfig {
    pub const MAX_PLAYERS: usize = 2;

    fn with_players(players: &[Controller]) -> Self {
        Self {
            players: players.to_vec(),
            engine: EngineConfig::standard(),
            garbage: Some(GarbageConfig::default()),
            bot: BotConfig::default(),
        }
    }

    #[must_use]
    pub fn single() -> Self {
        Self::with_players(&[Controller::Human])
    }

    #[must_use]
    pub fn single_bot() -> Self {
        Self::with_players(&[Controller::Bot])
    }

    #[must_use]
    pub fn human_vs_human() -> Self {
        Self::with_players(&[Controller::Human, Controller::Human])
    }

    #[must_use]
    pub fn human_vs_bot() -> Self {
        Self::with_players(&[Controller::Human, Controller::Bot])
    }

    #[must_use]
    pub fn bot_vs_bot() -> Self {
        Self::with_players(&[Controller::Bot, Controller::Bot])
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.players.is_empty() || self.players.len() > Self::MAX_PLAYERS {
            return Err(SimulationError::PlayerCount {
                count: self.players.len(),
            });
        }
        self.engine.validate()?;
        Ok(())
    }
}
