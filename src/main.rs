//! Territory-MCTS: a Monte Carlo Tree Search player for a 15x15 territory game.
//!
//! ## Usage
//!
//! - `territory-mcts` - Play over stdin/stdout
//! - `territory-mcts play` - Same as above
//! - `territory-mcts demo` - Play one game of the search engine against the random agent

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use territory_mcts::board::{Board, Color};
use territory_mcts::config::{RewardPerspective, SearchBudget, SearchConfig};
use territory_mcts::constants::ROLLOUT_P_EXPLORE;
use territory_mcts::mcts::MctsEngine;
use territory_mcts::player::{Agent, Player, RandomAgent};

/// Territory-MCTS: a Monte Carlo Tree Search player for a 15x15 territory game
#[derive(Parser)]
#[command(name = "territory-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    engine: EngineArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Read opponent moves from stdin and write replies to stdout
    Play,
    /// Play one game of the search engine against the random agent
    Demo,
}

#[derive(Args)]
struct EngineArgs {
    /// Which agent picks our moves
    #[arg(long, value_enum, default_value_t = AgentKind::Mcts, global = true)]
    agent: AgentKind,

    /// Search time per move in milliseconds
    #[arg(long, default_value_t = 50, global = true)]
    time_ms: u64,

    /// Search a fixed number of iterations per move instead of a time budget
    #[arg(long, global = true)]
    iterations: Option<usize>,

    /// Probability of trying an exploration first when the tree grows
    #[arg(long, global = true)]
    p_explore: Option<f64>,

    /// Probability of trying an exploration first during rollouts
    #[arg(long, global = true)]
    rollout_p_explore: Option<f64>,

    /// Whose result each tree node records
    #[arg(long, value_enum, default_value_t = Reward::Mover, global = true)]
    reward: Reward,

    /// Seed for the random generator
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Write the search tree as Graphviz to this directory after every move
    #[arg(long, global = true)]
    dot_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum)]
enum AgentKind {
    Mcts,
    Random,
}

#[derive(Copy, Clone, ValueEnum)]
enum Reward {
    Mover,
    SearchColor,
}

impl EngineArgs {
    fn search_config(&self) -> SearchConfig {
        let mut config = SearchConfig::default();
        config.budget = match self.iterations {
            Some(n) => SearchBudget::Iterations(n),
            None => SearchBudget::Time(Duration::from_millis(self.time_ms)),
        };
        if let Some(p) = self.p_explore {
            config.tree_p_explore = p;
        }
        if let Some(p) = self.rollout_p_explore {
            config.rollout_p_explore = p;
        }
        config.reward = match self.reward {
            Reward::Mover => RewardPerspective::Mover,
            Reward::SearchColor => RewardPerspective::SearchColor,
        };
        config.seed = self.seed;
        config
    }

    fn mcts(&self) -> MctsEngine {
        let engine = MctsEngine::new(self.search_config());
        match &self.dot_dir {
            Some(dir) => engine.with_dot_dir(dir.clone()),
            None => engine,
        }
    }

    fn agent(&self) -> Box<dyn Agent> {
        match self.agent {
            AgentKind::Mcts => Box::new(self.mcts()),
            AgentKind::Random => Box::new(RandomAgent::new(
                self.rollout_p_explore.unwrap_or(ROLLOUT_P_EXPLORE),
                self.seed,
            )),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Some(Commands::Play) | None => {
            let mut player = Player::new(cli.engine.agent());
            let stdin = io::stdin();
            player
                .run(stdin.lock(), io::stdout())
                .context("game loop failed")?;
        }
        Some(Commands::Demo) => run_demo(&cli.engine),
    }
    Ok(())
}

fn run_demo(args: &EngineArgs) {
    println!("Territory-MCTS: search engine (WHITE) vs random agent (BLACK)\n");

    let mut engine = args.mcts();
    let mut random = RandomAgent::new(ROLLOUT_P_EXPLORE, args.seed.map(|s| s.wrapping_add(1)));
    let mut board = Board::new();
    let mut color = Color::White;
    let mut turn = 0;

    while !board.game_finished() {
        let mv = match color {
            Color::White => engine.choose_move(color, &board),
            Color::Black => random.choose_move(color, &board),
        };
        let Some(mv) = mv else {
            break;
        };
        board.set_move(&mv, color);
        if color == Color::Black {
            engine.apply_opponent_move(&mv, color);
        }
        turn += 1;
        println!("{turn:>3}. {color}: {mv}");
        color = color.opponent();
    }

    println!("\n{board}");
    println!(
        "{}: {}  {}: {}  winner: {}",
        Color::White,
        board.score(Color::White),
        Color::Black,
        board.score(Color::Black),
        board.winner()
    );
}
