//! Constants for board geometry, scoring, and search parameters.
//!
//! The grid is a fixed 15x15 square stored as a flat array. A cell at
//! column `x` and row `y` lives at index `x * GRID_SIZE + y`.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
pub const GRID_SIZE: usize = 15;

/// Total number of cells on the board.
pub const NUM_CELLS: usize = GRID_SIZE * GRID_SIZE;

// =============================================================================
// Scoring
// =============================================================================

/// Points deducted per group when scoring a color.
pub const GROUP_PENALTY: i32 = 6;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Exploration constant in the UCT formula.
pub const UCT_C: f64 = 0.01;

/// A node compares against its existing children only once it has more
/// children than this.
pub const EXPANSION_THRESHOLD: usize = 4;

/// Default wall-clock budget per decision.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(50);

// =============================================================================
// Move Policy Probabilities
// =============================================================================

/// Probability of trying an exploration move first when a tree node
/// materializes a new child.
pub const TREE_P_EXPLORE: f64 = 0.7;

/// Probability of trying an exploration move first during rollouts.
pub const ROLLOUT_P_EXPLORE: f64 = 0.5;
