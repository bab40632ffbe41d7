//! Heuristic bot for duotris player sessions.
//!
//! The bot works in three layers:
//!
//! 1. **Placement evaluation** ([`placement_evaluator`]) - scores the board left behind by
//!    one placement with a weighted sum of cleared lines, aggregate height, holes, and
//!    bumpiness
//! 2. **Turn evaluation** ([`turn_evaluator`]) - enumerates every reachable placement of the
//!    falling piece and keeps the best one
//! 3. **Control** ([`controller`]) - turns the chosen placement into one input per action
//!    interval on a live [`PlayerSession`](duotris_engine::PlayerSession)
//!
//! [`board_analysis`] and [`placement_analysis`] compute the metrics the evaluator reads.

pub use self::{
    board_analysis::BoardAnalysis,
    controller::{BotAction, BotConfig, BotController, Difficulty},
    placement_analysis::PlacementAnalysis,
    placement_evaluator::{HeuristicPlacementEvaluator, HeuristicWeights, PlacementEvaluator},
    turn_evaluator::{TurnEvaluator, TurnPlan},
};

pub mod board_analysis;
pub mod controller;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod turn_evaluator;
