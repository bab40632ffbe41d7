use std::fmt;

use serde::{Deserialize, Serialize};

use crate::placement_analysis::PlacementAnalysis;

/// Scores a single placement; higher is better.
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32;
}

/// Weights of the linear placement heuristic.
///
/// ```text
/// value = lines * w_lines - aggregate_height * w_height - holes * w_holes - bumpiness * w_bump
/// ```
///
/// ```
/// use duotris_bot::HeuristicWeights;
///
/// let weights: HeuristicWeights = serde_json::from_str(r#"{ "holes": 25.0 }"#).unwrap();
/// assert_eq!(weights.holes, 25.0);
/// assert_eq!(weights.lines, 1000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    pub lines: f32,
    pub height: f32,
    pub holes: f32,
    pub bumpiness: f32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            lines: 1000.0,
            height: 0.5,
            holes: 10.0,
            bumpiness: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicPlacementEvaluator {
    weights: HeuristicWeights,
}

impl HeuristicPlacementEvaluator {
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }
}

impl PlacementEvaluator for HeuristicPlacementEvaluator {
    #[expect(clippy::cast_precision_loss)]
    fn evaluate_placement(&self, analysis: &PlacementAnalysis) -> f32 {
        let board = analysis.board_analysis();
        let w = &self.weights;
        analysis.cleared_lines() as f32 * w.lines
            - board.aggregate_height() as f32 * w.height
            - board.num_holes() as f32 * w.holes
            - board.bumpiness() as f32 * w.bumpiness
    }
}
