//! The UCI engine loop.
//!
//! Commands are read line by line from stdin on the calling thread; `go`
//! dispatches the search to a worker thread so that `stop` can cancel it
//! mid-flight through the shared [`StopToken`].

use std::io::{self, BufRead};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use castellan_core::{Board, Color};
use castellan_engine::{EvaluationWeights, SearchParameters, Searcher, StopToken};

use crate::command::{parse_command, Command, GoParams};
use crate::error::UciError;

/// Depth ceiling used for `go infinite` and bare `go`.
const INFINITE_DEPTH: u8 = 64;

/// How a `go` command maps onto the searcher's API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchMode {
    /// Fixed depth, no clock.
    Depth(u8),
    /// Deepen until stopped.
    Infinite,
    /// Spend exactly this long, in milliseconds.
    MoveTime(u64),
    /// Play on the clock.
    Clock {
        time_left_ms: u64,
        increment_ms: u64,
        moves_to_go: u32,
    },
}

/// Decide the search mode from `go` parameters and the side to move.
fn search_mode(params: &GoParams, side: Color) -> SearchMode {
    if let Some(depth) = params.depth {
        return SearchMode::Depth(depth);
    }
    if params.infinite {
        return SearchMode::Infinite;
    }
    if let Some(movetime) = params.movetime {
        return SearchMode::MoveTime(movetime);
    }

    let (time_left, increment) = match side {
        Color::White => (params.wtime, params.winc),
        Color::Black => (params.btime, params.binc),
    };
    match time_left {
        Some(time_left_ms) => SearchMode::Clock {
            time_left_ms,
            increment_ms: increment.unwrap_or(0),
            moves_to_go: params.movestogo.unwrap_or(0),
        },
        None => SearchMode::Infinite,
    }
}

/// A search running on the worker thread.
struct ActiveSearch {
    token: StopToken,
    handle: JoinHandle<()>,
}

/// UCI front end holding the current position and the engine.
pub struct UciEngine {
    searcher: Arc<Mutex<Searcher>>,
    board: Board,
    active: Option<ActiveSearch>,
}

impl UciEngine {
    /// An engine with default weights and parameters, reporting `info`
    /// lines per completed depth.
    pub fn new() -> UciEngine {
        UciEngine::with_config(EvaluationWeights::default(), SearchParameters::default())
    }

    /// An engine with explicit (e.g. tuner-produced) configuration.
    pub fn with_config(weights: EvaluationWeights, params: SearchParameters) -> UciEngine {
        let mut searcher = Searcher::new(weights, params);
        searcher.set_verbose(true);
        UciEngine {
            searcher: Arc::new(Mutex::new(searcher)),
            board: Board::starting_position(),
            active: None,
        }
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run(mut self) -> Result<(), UciError> {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(command = trimmed, "uci input");

            match parse_command(trimmed) {
                Ok(Command::Uci) => self.handle_uci(),
                Ok(Command::IsReady) => println!("readyok"),
                Ok(Command::UciNewGame) => self.handle_new_game(),
                Ok(Command::Position(board)) => self.board = *board,
                Ok(Command::Go(params)) => self.handle_go(&params),
                Ok(Command::Stop) => self.handle_stop(),
                Ok(Command::Quit) => break,
                Ok(Command::Unknown(cmd)) => {
                    if !cmd.is_empty() {
                        debug!(command = cmd, "ignoring unknown command");
                    }
                }
                Err(err) => warn!(error = %err, "rejected uci command"),
            }
        }

        self.finish_active();
        info!("castellan shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name castellan");
        println!("id author castellan developers");
        println!("uciok");
    }

    fn handle_new_game(&mut self) {
        self.finish_active();
        self.lock_searcher().new_game();
        self.board = Board::starting_position();
    }

    fn handle_go(&mut self, params: &GoParams) {
        // A new go supersedes any search still running.
        self.finish_active();

        let mode = search_mode(params, self.board.side_to_move());
        let token = StopToken::new();

        {
            let mut searcher = self.lock_searcher();
            searcher.set_position(self.board.clone());
        }

        let searcher = Arc::clone(&self.searcher);
        let thread_token = token.clone();
        let handle = std::thread::spawn(move || {
            let mut searcher = match searcher.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let outcome = match mode {
                SearchMode::Depth(depth) => searcher.search_to_depth(depth, &thread_token),
                SearchMode::Infinite => searcher.search_to_depth(INFINITE_DEPTH, &thread_token),
                SearchMode::MoveTime(ms) => searcher.iterative_deepening(ms, 0, 1, &thread_token),
                SearchMode::Clock {
                    time_left_ms,
                    increment_ms,
                    moves_to_go,
                } => searcher.iterative_deepening(
                    time_left_ms,
                    increment_ms,
                    moves_to_go,
                    &thread_token,
                ),
            };
            println!("bestmove {}", outcome.best_move);
        });

        self.active = Some(ActiveSearch { token, handle });
    }

    fn handle_stop(&mut self) {
        if let Some(active) = &self.active {
            active.token.stop();
        }
    }

    /// Stop and reap the worker, if one is running.
    fn finish_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.token.stop();
            if active.handle.join().is_err() {
                warn!("search thread panicked");
            }
        }
    }

    fn lock_searcher(&self) -> std::sync::MutexGuard<'_, Searcher> {
        match self.searcher.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use castellan_core::Color;

    use super::{search_mode, SearchMode};
    use crate::command::GoParams;

    #[test]
    fn depth_takes_priority() {
        let params = GoParams {
            depth: Some(6),
            wtime: Some(1_000),
            infinite: true,
            ..GoParams::default()
        };
        assert_eq!(search_mode(&params, Color::White), SearchMode::Depth(6));
    }

    #[test]
    fn clock_picks_the_side_to_move() {
        let params = GoParams {
            wtime: Some(60_000),
            btime: Some(30_000),
            winc: Some(1_000),
            binc: Some(500),
            ..GoParams::default()
        };
        assert_eq!(
            search_mode(&params, Color::Black),
            SearchMode::Clock {
                time_left_ms: 30_000,
                increment_ms: 500,
                moves_to_go: 0,
            }
        );
    }

    #[test]
    fn movetime_maps_to_fixed_budget() {
        let params = GoParams {
            movetime: Some(2_500),
            ..GoParams::default()
        };
        assert_eq!(search_mode(&params, Color::White), SearchMode::MoveTime(2_500));
    }

    #[test]
    fn bare_go_is_infinite() {
        assert_eq!(
            search_mode(&GoParams::default(), Color::White),
            SearchMode::Infinite
        );
    }
}
