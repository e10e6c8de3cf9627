//! Territory-MCTS: a Monte Carlo Tree Search engine for a 15x15 territory game.
//!
//! Two players take turns placing stones; stones are never removed. A turn is
//! either an *exploration* (one stone with no friendly neighbor) or an
//! *expansion* (several stones, each extending or joining friendly groups).
//! When the board is full each color scores its stones minus 6 points per
//! group, so the game rewards covering ground with few, large groups.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and engine parameters
//! - [`board`] - Board state and incremental group tracking
//! - [`moves`] - Moves and `A1-B12` notation
//! - [`policy`] - Randomized exploration and expansion move generation
//! - [`playout`] - Random game simulation for position evaluation
//! - [`config`] - Search budget and tuning
//! - [`mcts`] - Monte Carlo Tree Search with UCT and tree reuse
//! - [`player`] - Agents and the turn-by-turn driver
//!
//! ## Example
//!
//! ```
//! use territory_mcts::board::{Board, Color};
//! use territory_mcts::config::SearchConfig;
//! use territory_mcts::mcts::MctsEngine;
//!
//! let board = Board::new();
//! let mut engine = MctsEngine::new(SearchConfig::with_iterations(100));
//! let mv = engine.choose_move(Color::White, &board).unwrap();
//! println!("Best move: {mv}");
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod mcts;
pub mod moves;
pub mod player;
pub mod playout;
pub mod policy;
