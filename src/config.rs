//! Search configuration.

use std::time::Duration;

use crate::constants::{DEFAULT_TIME_BUDGET, ROLLOUT_P_EXPLORE, TREE_P_EXPLORE};

/// How long a single decision may search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchBudget {
    /// Stop once this much wall-clock time has elapsed. The iteration in
    /// flight always completes, so the budget can be slightly overshot.
    Time(Duration),
    /// Run exactly this many iterations (at least one).
    Iterations(usize),
}

/// Whose result a node's win count records.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RewardPerspective {
    /// A node counts a win when the color that moved into it wins the
    /// rollout, so each level of the tree is scored for the side choosing it.
    Mover,
    /// Every node counts a win when the color the search runs for wins,
    /// regardless of whose turn the node represents.
    SearchColor,
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub budget: SearchBudget,
    /// Probability of trying exploration first when a node creates a child
    pub tree_p_explore: f64,
    /// Probability of trying exploration first during rollouts
    pub rollout_p_explore: f64,
    pub reward: RewardPerspective,
    /// Seed for the engine's random generator; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            budget: SearchBudget::Time(DEFAULT_TIME_BUDGET),
            tree_p_explore: TREE_P_EXPLORE,
            rollout_p_explore: ROLLOUT_P_EXPLORE,
            reward: RewardPerspective::Mover,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Default settings with a fixed iteration count.
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            budget: SearchBudget::Iterations(iterations),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub(crate) fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}
