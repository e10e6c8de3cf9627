//! Turn-by-turn game driver.
//!
//! The driver speaks a line protocol: it reads one token per turn and
//! answers with one line.
//!
//! - `Start` as the very first token means we move first and play WHITE;
//!   any other first token is the opponent's move and we play BLACK
//! - `Quit` (or end of input) ends the game
//! - every other token is the opponent's move in `A1-B12` notation
//!
//! ## Example
//!
//! ```ignore
//! use territory_mcts::mcts::MctsEngine;
//! use territory_mcts::player::Player;
//! let mut player = Player::new(Box::new(MctsEngine::default()));
//! player.run(std::io::stdin().lock(), std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::board::{Board, Color};
use crate::mcts::MctsEngine;
use crate::moves::Move;
use crate::policy::{choose_move, CellOrder};

/// Token telling us to make the opening move.
pub const START: &str = "Start";

/// Token ending the game.
pub const QUIT: &str = "Quit";

/// Something that picks moves.
pub trait Agent {
    /// Pick a move for `color`. `None` only when `board` is finished.
    fn choose_move(&mut self, color: Color, board: &Board) -> Option<Move>;

    /// Told about every move the other side makes.
    fn apply_opponent_move(&mut self, _mv: &Move, _color: Color) {}
}

impl Agent for MctsEngine {
    fn choose_move(&mut self, color: Color, board: &Board) -> Option<Move> {
        MctsEngine::choose_move(self, color, board)
    }

    fn apply_opponent_move(&mut self, mv: &Move, color: Color) {
        MctsEngine::apply_opponent_move(self, mv, color)
    }
}

/// Plays the rollout policy directly, without any search.
pub struct RandomAgent {
    rng: fastrand::Rng,
    p_explore: f64,
    explorations: CellOrder,
    expansions: CellOrder,
}

impl RandomAgent {
    pub fn new(p_explore: f64, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let explorations = CellOrder::shuffled(&mut rng);
        let expansions = CellOrder::shuffled(&mut rng);
        Self {
            rng,
            p_explore,
            explorations,
            expansions,
        }
    }
}

impl Agent for RandomAgent {
    fn choose_move(&mut self, color: Color, board: &Board) -> Option<Move> {
        if board.game_finished() {
            return None;
        }
        choose_move(
            board,
            color,
            &mut self.explorations,
            &self.expansions,
            self.p_explore,
            &mut self.rng,
        )
    }
}

/// Keeps the authoritative board and translates between notation and moves.
pub struct Player {
    board: Board,
    color: Option<Color>,
    agent: Box<dyn Agent>,
    /// Every token received, for the replay log
    received: Vec<String>,
}

impl Player {
    pub fn new(agent: Box<dyn Agent>) -> Self {
        Self {
            board: Board::new(),
            color: None,
            agent,
            received: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Our color, known once the first token has been seen.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Apply the opponent's token and return our reply in notation.
    ///
    /// Returns `Ok(None)` when the board is full and there is nothing to play.
    pub fn do_move(&mut self, opponent_move: &str) -> Result<Option<String>> {
        let is_start = opponent_move == START;
        let color = match self.color {
            Some(_) if is_start => bail!("'{START}' is only valid as the first token"),
            Some(color) => color,
            None => {
                let color = if is_start { Color::White } else { Color::Black };
                log::info!("playing {color}");
                self.color = Some(color);
                color
            }
        };

        if !is_start {
            let mv: Move = opponent_move
                .parse()
                .with_context(|| format!("invalid opponent move '{opponent_move}'"))?;
            self.place_opponent_stones(&mv, color.opponent())?;
            self.agent.apply_opponent_move(&mv, color.opponent());
        }

        let Some(mv) = self.agent.choose_move(color, &self.board) else {
            return Ok(None);
        };
        self.board.set_move(&mv, color);
        Ok(Some(mv.to_string()))
    }

    fn place_opponent_stones(&mut self, mv: &Move, color: Color) -> Result<()> {
        let mut board = self.board.clone();
        for &pt in mv.cells() {
            if board.get(pt).owner.is_some() {
                bail!("opponent move {mv} places a stone on an owned cell");
            }
            board.set(pt, color);
        }
        self.board = board;
        Ok(())
    }

    /// Run the game loop until `Quit`, end of input, or a full board.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        'game: for line in input.lines() {
            let line = line.context("failed to read opponent move")?;
            for token in line.split_whitespace() {
                self.received.push(token.to_string());
                if token == QUIT {
                    break 'game;
                }

                let Some(reply) = self.do_move(token)? else {
                    break 'game;
                };
                log::info!("opp move: {token}");
                log::info!("my move : {reply}");
                log::debug!("\n{}", self.board);
                log::debug!("groups:\n{}", self.board.groups_string());
                writeln!(output, "{reply}").context("failed to write move")?;
                output.flush().context("failed to write move")?;

                if self.board.game_finished() {
                    break 'game;
                }
            }
        }

        log::info!(
            "{}: {}  {}: {}",
            Color::White,
            self.board.score(Color::White),
            Color::Black,
            self.board.score(Color::Black)
        );
        log::debug!("replay:\n{}", self.received.join("\n"));
        Ok(())
    }
}
