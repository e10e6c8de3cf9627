//! Monte Carlo Tree Search (MCTS) with UCT selection and tree reuse.
//!
//! Each iteration runs four phases:
//! - **select**: descend from the root, at every node either stepping into
//!   the best existing child or materializing a new one
//! - **expand**: attach the new child to its parent
//! - **simulate**: play a random game to the end from the leaf
//! - **backpropagate**: add the result to the leaf and every ancestor
//!
//! Nodes own their children. The route from the root to the current leaf is
//! kept as a path of child indices, which is all backpropagation needs to
//! walk back up, so no node holds a pointer to its parent.
//!
//! After a decision the chosen child becomes the new root and its siblings
//! are dropped, so statistics along the line actually played carry over to
//! the next turn.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::board::{Board, Color};
use crate::config::{RewardPerspective, SearchBudget, SearchConfig};
use crate::constants::{EXPANSION_THRESHOLD, UCT_C};
use crate::moves::Move;
use crate::playout::mcplayout;
use crate::policy::{generate, strategy_order, CellOrder, Strategy};

/// UCT value of a child with the given win rate and visit count.
#[inline]
pub fn uct(winrate: f64, visits: u32, parent_visits: u32) -> f64 {
    winrate + UCT_C * ((parent_visits as f64 + 1.0).ln() / (visits as f64 + 1.0)).sqrt()
}

/// A node in the MCTS search tree.
pub struct TreeNode {
    /// Position at this node
    pub board: Board,
    /// Color to move from this position
    pub to_move: Color,
    /// Move that produced this position (empty at a fresh root)
    pub mv: Move,
    /// Number of visits
    pub v: u32,
    /// Number of wins (winrate = w/v)
    pub w: u32,
    pub children: Vec<TreeNode>,
    /// Consumed one cell at a time, so an exploration is never proposed twice
    explorations: CellOrder,
    /// Reshuffled before every expansion attempt
    expansions: CellOrder,
}

/// Outcome of [`TreeNode::select`].
pub enum Selection {
    /// A new, not yet attached child. Selection stops here.
    Expanded(TreeNode),
    /// Index of an existing child to descend into.
    Descend(usize),
}

impl TreeNode {
    /// Create a root node for `board` with `to_move` to play.
    pub fn new(board: Board, to_move: Color, rng: &mut fastrand::Rng) -> Self {
        Self {
            board,
            to_move,
            mv: Move::default(),
            v: 0,
            w: 0,
            children: Vec::new(),
            explorations: CellOrder::shuffled(rng),
            expansions: CellOrder::shuffled(rng),
        }
    }

    /// Create the node reached by playing `mv` from here.
    fn child(&self, mv: Move, rng: &mut fastrand::Rng) -> Self {
        let mut board = self.board.clone();
        board.set_move(&mv, self.to_move);
        let mut child = Self::new(board, self.to_move.opponent(), rng);
        child.mv = mv;
        child
    }

    /// Color that played the move into this node.
    pub fn mover(&self) -> Color {
        self.to_move.opponent()
    }

    /// Calculate the winrate for this node.
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.v > 0 {
            self.w as f64 / self.v as f64
        } else {
            -0.1 // Indicate unvisited
        }
    }

    fn uct_value(&self, parent_visits: u32) -> f64 {
        uct(self.winrate().max(0.0), self.v, parent_visits)
    }

    /// Existing child with the highest UCT value.
    fn best_uct_child(&self) -> Option<(usize, f64)> {
        self.children
            .iter()
            .map(|c| c.uct_value(self.v))
            .enumerate()
            .fold(None, |best, (i, value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((i, value)),
            })
    }

    /// Choose where the descent goes next.
    ///
    /// A never-tried move is valued as a child with no visits. While this
    /// node has at most [`EXPANSION_THRESHOLD`] children a new child is always
    /// attempted; past that it is attempted only when it beats every existing
    /// child. If no new move can be generated the best existing child is used.
    ///
    /// Must not be called on a finished position.
    pub fn select(&mut self, p_explore: f64, rng: &mut fastrand::Rng) -> Selection {
        let new_value = uct(0.0, 0, self.v);
        let best = if self.children.len() > EXPANSION_THRESHOLD {
            self.best_uct_child()
        } else {
            None
        };

        if best.is_none_or(|(_, best_value)| new_value > best_value) {
            if let Some(mv) = self.new_move(p_explore, rng) {
                log::trace!("expanding {} with {mv}", self.to_move);
                return Selection::Expanded(self.child(mv, rng));
            }
        }

        match best.or_else(|| self.best_uct_child()) {
            Some((idx, _)) => Selection::Descend(idx),
            None => panic!(
                "no move for {} on an unfinished board ({} white, {} black stones)",
                self.to_move,
                self.board.num_stones(Color::White),
                self.board.num_stones(Color::Black)
            ),
        }
    }

    /// Generate a move that is not already one of the children.
    fn new_move(&mut self, p_explore: f64, rng: &mut fastrand::Rng) -> Option<Move> {
        let color = self.to_move;
        for strategy in strategy_order(&self.board, color, p_explore, rng) {
            if strategy == Strategy::Expansion {
                self.expansions.reshuffle(rng);
            }
            let Some(mv) = generate(
                strategy,
                &self.board,
                color,
                &mut self.explorations,
                &self.expansions,
            ) else {
                continue;
            };
            if self.children.iter().any(|c| c.mv.same_cells(&mv)) {
                log::trace!("duplicate {strategy:?} move {mv}");
                continue;
            }
            return Some(mv);
        }
        None
    }

    /// Index of the child with the highest win rate.
    ///
    /// Pure exploitation, used once a search is over to pick the move to play.
    pub fn best_move(&self) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, c)| match best {
                Some((_, rate)) if rate >= c.winrate() => best,
                _ => Some((i, c.winrate())),
            })
            .map(|(i, _)| i)
    }

    /// Detach child `idx` as a new root; every other node is dropped.
    pub fn into_child(mut self, idx: usize) -> TreeNode {
        self.children.swap_remove(idx)
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_size).sum::<usize>()
    }

    fn record(&mut self, win: bool) {
        self.v += 1;
        if win {
            self.w += 1;
        }
    }

    /// Render this subtree as a Graphviz digraph.
    pub fn write_dot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "digraph g {{\n  graph [size=\"8.0,10.5\" bgcolor=white overlap=false splines=true];"
        )?;
        writeln!(
            out,
            "  node [fontname=\"Courier\",fontsize=10,labeljust=l,shape=Mrecord];"
        )?;
        let mut next_id = 0;
        self.write_dot_node(out, &mut next_id)?;
        writeln!(out, "}}")
    }

    fn write_dot_node<W: Write>(&self, out: &mut W, next_id: &mut usize) -> io::Result<usize> {
        let id = *next_id;
        *next_id += 1;
        let fill = match self.mover() {
            Color::White => "#FFFFFF",
            Color::Black => "#AAAAAA",
        };
        writeln!(
            out,
            "  n{id} [style=filled,fillcolor=\"{fill}\",label=\"Move: {}\\nWins  : {}\\nVisits: {}\"];",
            self.mv, self.w, self.v
        )?;
        for child in &self.children {
            let child_id = child.write_dot_node(out, next_id)?;
            writeln!(out, "  n{id} -> n{child_id};")?;
        }
        Ok(id)
    }
}

/// Summary of one search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub iterations: usize,
    pub max_depth: usize,
    pub elapsed: Duration,
}

/// Result of the selection phase.
struct Descent {
    /// Child indices from the root to the deepest existing node reached
    path: Vec<usize>,
    /// Freshly generated child of that node, if one was created
    leaf: Option<TreeNode>,
}

/// Descend from the root until a new child is produced or a finished
/// position is reached.
fn tree_descend(root: &mut TreeNode, p_explore: f64, rng: &mut fastrand::Rng) -> Descent {
    let mut path = Vec::new();
    let mut node = root;

    while !node.board.game_finished() {
        match node.select(p_explore, rng) {
            Selection::Expanded(leaf) => {
                return Descent {
                    path,
                    leaf: Some(leaf),
                };
            }
            Selection::Descend(idx) => {
                path.push(idx);
                node = &mut node.children[idx];
            }
        }
    }

    Descent { path, leaf: None }
}

/// Attach `leaf` under the node at the end of `path` and extend the path to it.
fn tree_expand(root: &mut TreeNode, path: &mut Vec<usize>, leaf: TreeNode) {
    let parent = path
        .iter()
        .fold(root, |node, &idx| &mut node.children[idx]);
    parent.children.push(leaf);
    path.push(parent.children.len() - 1);
}

fn get_leaf<'a>(root: &'a TreeNode, path: &[usize]) -> &'a TreeNode {
    path.iter().fold(root, |node, &idx| &node.children[idx])
}

/// Play out the game from the leaf and return the winner.
fn tree_simulate(root: &TreeNode, path: &[usize], p_explore: f64, rng: &mut fastrand::Rng) -> Color {
    let leaf = get_leaf(root, path);
    let mut board = leaf.board.clone();
    mcplayout(&mut board, leaf.to_move, p_explore, rng)
}

/// Add one visit to every node on the path, and a win where the result
/// counts as one under `reward`.
fn tree_update(root: &mut TreeNode, path: &[usize], winner: Color, reward: RewardPerspective) {
    let search_color = root.to_move;
    let credit = |node: &TreeNode| match reward {
        RewardPerspective::Mover => winner == node.mover(),
        RewardPerspective::SearchColor => winner == search_color,
    };

    let win = credit(root);
    root.record(win);

    let mut node = root;
    for &idx in path {
        node = &mut node.children[idx];
        let win = credit(node);
        node.record(win);
    }
}

/// Run one select/expand/simulate/backpropagate pass and return its depth.
fn run_iteration(root: &mut TreeNode, config: &SearchConfig, rng: &mut fastrand::Rng) -> usize {
    let Descent { mut path, leaf } = tree_descend(root, config.tree_p_explore, rng);
    if let Some(leaf) = leaf {
        tree_expand(root, &mut path, leaf);
    }
    let winner = tree_simulate(root, &path, config.rollout_p_explore, rng);
    tree_update(root, &path, winner, config.reward);
    path.len()
}

/// Search from `root` until the budget is spent.
///
/// At least one iteration always runs, so the root of an unfinished position
/// ends up with at least one child whatever the budget.
pub fn tree_search(root: &mut TreeNode, config: &SearchConfig, rng: &mut fastrand::Rng) -> SearchStats {
    let start = Instant::now();
    let mut stats = SearchStats::default();
    if root.board.game_finished() {
        return stats;
    }

    loop {
        let depth = run_iteration(root, config, rng);
        stats.iterations += 1;
        stats.max_depth = stats.max_depth.max(depth);

        let done = match config.budget {
            SearchBudget::Time(limit) => start.elapsed() >= limit,
            SearchBudget::Iterations(n) => stats.iterations >= n,
        };
        if done {
            break;
        }
    }

    stats.elapsed = start.elapsed();
    stats
}

/// Log the root's children.
pub fn dump_children(root: &TreeNode) {
    for child in &root.children {
        log::debug!(
            "move {} v={} w={} wr={:.3}",
            child.mv,
            child.v,
            child.w,
            child.winrate()
        );
    }
}

/// Search engine that keeps its tree between decisions.
pub struct MctsEngine {
    config: SearchConfig,
    rng: fastrand::Rng,
    /// Position after the last move the engine knows about
    board: Board,
    root: Option<TreeNode>,
    last_stats: SearchStats,
    dot_dir: Option<PathBuf>,
    decisions: usize,
}

impl Default for MctsEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl MctsEngine {
    pub fn new(config: SearchConfig) -> Self {
        let rng = config.rng();
        Self {
            config,
            rng,
            board: Board::new(),
            root: None,
            last_stats: SearchStats::default(),
            dot_dir: None,
            decisions: 0,
        }
    }

    /// Write the tree to `<dir>/tree_<n>.dot` after every decision.
    pub fn with_dot_dir(mut self, dir: PathBuf) -> Self {
        self.dot_dir = Some(dir);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    /// Search for a move for `color` on `board`.
    ///
    /// Reuses the stored tree when its root matches `board` and `color`;
    /// otherwise starts a fresh one. Returns `None` only when the board is
    /// already finished.
    pub fn choose_move(&mut self, color: Color, board: &Board) -> Option<Move> {
        if board.game_finished() {
            return None;
        }

        let mut root = match self.root.take() {
            Some(root) if root.to_move == color && root.board.same_position(board) => root,
            stale => {
                if stale.is_some() {
                    log::debug!("search tree out of sync with the board, starting over");
                }
                TreeNode::new(board.clone(), color, &mut self.rng)
            }
        };
        self.board = board.clone();

        let stats = tree_search(&mut root, &self.config, &mut self.rng);
        self.last_stats = stats;
        self.decisions += 1;
        dump_children(&root);
        self.write_dot(&root);

        let idx = root.best_move()?;
        let new_root = root.into_child(idx);
        let mv = new_root.mv.clone();

        log::info!(
            "{color} plays {mv} (wr={:.3}, {} visits) after {} iterations, depth {}, {:?}",
            new_root.winrate(),
            new_root.v,
            stats.iterations,
            stats.max_depth,
            stats.elapsed
        );

        self.board.set_move(&mv, color);
        debug_assert!(new_root.board.same_position(&self.board));
        self.root = Some(new_root);
        Some(mv)
    }

    /// Record a move made by the other side.
    ///
    /// If the resulting position is already in the tree that subtree becomes
    /// the root, otherwise the tree is discarded.
    pub fn apply_opponent_move(&mut self, mv: &Move, color: Color) {
        self.board.set_move(mv, color);
        self.root = self.root.take().and_then(|root| {
            if root.to_move != color {
                return None;
            }
            let idx = root
                .children
                .iter()
                .position(|c| c.board.same_position(&self.board))?;
            log::debug!("reusing subtree for opponent move {mv}");
            Some(root.into_child(idx))
        });
    }

    fn write_dot(&self, root: &TreeNode) {
        let Some(dir) = &self.dot_dir else {
            return;
        };
        let path = dir.join(format!("tree_{}.dot", self.decisions));
        let result = File::create(&path).and_then(|file| {
            let mut out = BufWriter::new(file);
            root.write_dot(&mut out)?;
            out.flush()
        });
        if let Err(e) = result {
            log::warn!("failed to write {}: {e}", path.display());
        }
    }
}
