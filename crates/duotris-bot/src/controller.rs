use std::{ops::ControlFlow, time::Duration};

use duotris_engine::{PlayerSession, RotationDirection};
use serde::{Deserialize, Serialize};

use crate::{
    placement_evaluator::{HeuristicPlacementEvaluator, HeuristicWeights},
    turn_evaluator::{TurnEvaluator, TurnPlan},
};

/// How fast the bot acts.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Time between two bot actions.
    #[must_use]
    pub const fn action_interval(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(350),
            Difficulty::Normal => Duration::from_millis(200),
            Difficulty::Hard => Duration::from_millis(80),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub difficulty: Difficulty,
    /// Overrides the difficulty's action interval.
    pub action_interval_ms: Option<u64>,
    pub weights: HeuristicWeights,
    /// Also search placements of the piece hold would bring in.
    pub use_hold: bool,
}

impl BotConfig {
    #[must_use]
    pub fn action_interval(&self) -> Duration {
        self.action_interval_ms
            .map_or_else(|| self.difficulty.action_interval(), Duration::from_millis)
    }
}

/// A single input issued by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BotAction {
    #[display("hold")]
    Hold,
    #[display("rotate")]
    Rotate,
    #[display("move left")]
    MoveLeft,
    #[display("move right")]
    MoveRight,
    #[display("hard drop")]
    HardDrop,
}

/// Drives a [`PlayerSession`] toward the best placement, one input at a time.
///
/// A new plan is computed whenever the session spawns a piece. Each time the action
/// interval elapses the controller issues the next step of the plan: hold if planned, then
/// clockwise rotation to the target state, then horizontal moves to the target column, and
/// finally a hard drop. If the session rejects a step the plan is dropped, and the next
/// action hard-drops the piece where it is.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use duotris_bot::{BotConfig, BotController, Difficulty};
/// use duotris_engine::{EngineConfig, PieceSeed, PlayerSession};
///
/// let mut session = PlayerSession::new(EngineConfig::standard(), PieceSeed::from_u128(3));
/// session.start().unwrap();
///
/// let mut bot = BotController::new(BotConfig {
///     difficulty: Difficulty::Hard,
///     ..BotConfig::default()
/// });
/// for _ in 0..200 {
///     session.advance(Duration::from_millis(20));
///     bot.tick(&mut session, Duration::from_millis(20));
/// }
/// assert!(session.stats().completed_pieces() > 0);
/// ```
#[derive(Debug)]
pub struct BotController {
    config: BotConfig,
    turn_evaluator: TurnEvaluator<'static>,
    plan: Option<TurnPlan>,
    planned_spawn: Option<u64>,
    cadence: Duration,
}

impl BotController {
    #[must_use]
    pub fn new(config: BotConfig) -> Self {
        let turn_evaluator = TurnEvaluator::new(Box::new(HeuristicPlacementEvaluator::new(
            config.weights,
        )));
        Self {
            config,
            turn_evaluator,
            plan: None,
            planned_spawn: None,
            cadence: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// The placement the bot is currently working toward.
    #[must_use]
    pub fn plan(&self) -> Option<&TurnPlan> {
        self.plan.as_ref()
    }

    /// Forgets the plan and the cadence timer.
    pub fn reset(&mut self) {
        self.plan = None;
        self.planned_spawn = None;
        self.cadence = Duration::ZERO;
    }

    /// Advances the cadence timer by `delta` and issues at most one action.
    ///
    /// Does nothing, and keeps the timer frozen, unless the session is playing.
    pub fn tick(&mut self, session: &mut PlayerSession, delta: Duration) -> Option<BotAction> {
        if !session.state().is_playing() {
            return None;
        }

        if self.planned_spawn != Some(session.spawn_count()) {
            self.planned_spawn = Some(session.spawn_count());
            self.plan = self
                .turn_evaluator
                .select_best_turn(session.field(), self.config.use_hold)
                .map(|(plan, _analysis)| plan);
        }

        self.cadence += delta;
        if self.cadence < self.config.action_interval() {
            return None;
        }
        self.cadence = Duration::ZERO;

        let (action, flow) = self.operate_game(session);
        if flow.is_break() {
            self.plan = None;
        }
        Some(action)
    }

    fn next_action(&self, session: &PlayerSession) -> BotAction {
        let (Some(target), Some(falling_piece)) = (self.plan, session.falling_piece()) else {
            return BotAction::HardDrop;
        };
        if target.use_hold() && !session.is_hold_used() {
            return BotAction::Hold;
        }
        let target = target.placement();
        if falling_piece.kind() != target.kind() {
            return BotAction::HardDrop;
        }
        if falling_piece.rotation() != target.rotation() {
            return BotAction::Rotate;
        }
        if falling_piece.position().x() < target.position().x() {
            return BotAction::MoveRight;
        }
        if falling_piece.position().x() > target.position().x() {
            return BotAction::MoveLeft;
        }
        BotAction::HardDrop
    }

    /// Issues the next step of the plan.
    ///
    /// Returns `Break` once the plan is finished or had to be abandoned. Without a plan
    /// the next action is a hard drop.
    fn operate_game(&mut self, session: &mut PlayerSession) -> (BotAction, ControlFlow<()>) {
        let action = self.next_action(session);
        let result = match action {
            BotAction::Hold => session.try_hold(),
            BotAction::Rotate => session.try_rotate(RotationDirection::Clockwise),
            BotAction::MoveLeft => session.try_move_left(),
            BotAction::MoveRight => session.try_move_right(),
            BotAction::HardDrop => session.hard_drop(),
        };
        match (action, result) {
            (BotAction::HardDrop, _) | (_, Err(_)) => (action, ControlFlow::Break(())),
            (_, Ok(())) => (action, ControlFlow::Continue(())),
        }
    }
}
