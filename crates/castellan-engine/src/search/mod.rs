//! Iterative-deepening search driver.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;

use std::time::Duration;

use castellan_core::{generate_moves, Board, Move};
use tracing::debug;

use crate::eval::Evaluator;
use crate::params::SearchParameters;
use crate::search::control::{SearchControl, StopToken};
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::negamax::{negamax, LmrTable, PvTable, SearchContext, INF, MATE_SCORE, MATE_THRESHOLD};
use crate::search::tt::TranspositionTable;
use crate::time::time_for_move;
use crate::weights::EvaluationWeights;

/// Default transposition table size in megabytes.
const DEFAULT_TT_MB: usize = 16;

/// Result of a completed top-level search.
#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    /// Best move at the deepest fully completed iteration. Null only when
    /// the position has no legal moves.
    pub best_move: Move,
    /// Score of `best_move` from the side to move's perspective.
    pub best_score: i32,
    /// Nodes visited, including quiescence nodes.
    pub nodes: u64,
    /// Deepest fully completed iteration.
    pub depth: u8,
}

/// The search engine: iterative deepening over negamax with a transposition
/// table, killer/history ordering, and a per-move time budget.
///
/// One `Searcher` owns its board, caches, and configuration; a search call
/// owns the mutable state exclusively for its duration.
pub struct Searcher {
    board: Board,
    evaluator: Evaluator,
    params: SearchParameters,
    tt: TranspositionTable,
    lmr: Box<LmrTable>,
    verbose: bool,
    moves_out_of_book: u32,
}

impl Searcher {
    /// Build a searcher from evaluation weights and search parameters.
    ///
    /// Degenerate parameter values are clamped; see
    /// [`SearchParameters::sanitized`].
    pub fn new(weights: EvaluationWeights, params: SearchParameters) -> Searcher {
        Searcher {
            board: Board::starting_position(),
            evaluator: Evaluator::new(weights),
            params: params.sanitized(),
            tt: TranspositionTable::new(DEFAULT_TT_MB),
            lmr: build_lmr_table(),
            verbose: false,
            moves_out_of_book: 0,
        }
    }

    /// Set the position to search from.
    pub fn set_position(&mut self, board: Board) {
        self.board = board;
    }

    /// Toggle per-depth `info` reporting on stdout.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Invalidate the transposition table.
    pub fn clear(&mut self) {
        self.tt.clear();
    }

    /// Reset for a new game: fresh transposition table and book counter.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.moves_out_of_book = 0;
    }

    /// Replace the transposition table with one of the given size.
    pub fn resize_tt(&mut self, megabytes: usize) {
        self.tt = TranspositionTable::new(megabytes);
    }

    /// The configured evaluator.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Search under a clock: deepen until the budget computed from the
    /// remaining time is spent or `token` is stopped.
    pub fn iterative_deepening(
        &mut self,
        time_left_ms: u64,
        increment_ms: u64,
        moves_to_go: u32,
        token: &StopToken,
    ) -> SearchOutcome {
        let budget = time_for_move(
            time_left_ms,
            increment_ms,
            moves_to_go,
            self.moves_out_of_book,
        );
        debug!(budget_ms = budget, "starting timed search");
        let max_depth = self.params.max_depth;
        self.run(
            SearchControl::timed(token.clone(), Duration::from_millis(budget)),
            max_depth,
        )
    }

    /// Search to a fixed depth, stopping early only via `token`.
    pub fn search_to_depth(&mut self, depth: u8, token: &StopToken) -> SearchOutcome {
        let depth = depth.clamp(1, self.params.max_depth);
        self.run(SearchControl::infinite(token.clone()), depth)
    }

    fn run(&mut self, control: SearchControl, max_depth: u8) -> SearchOutcome {
        let verbose = self.verbose;
        let mut board = self.board.clone();

        let mut ctx = SearchContext {
            evaluator: &self.evaluator,
            params: &self.params,
            tt: &mut self.tt,
            lmr: &*self.lmr,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            pv: PvTable::new(),
            prev_pv: Vec::new(),
            follow_pv: false,
            control,
            nodes: 0,
            stopped: false,
        };

        let mut outcome = SearchOutcome {
            best_move: Move::NULL,
            best_score: 0,
            nodes: 0,
            depth: 0,
        };
        let mut previous_score = 0;

        for depth in 1..=max_depth {
            // Give up before a depth we cannot plausibly finish; its result
            // would be discarded anyway.
            if depth > 1 && ctx.control.hopeless_to_deepen() {
                break;
            }

            ctx.follow_pv = !ctx.prev_pv.is_empty();
            let score = search_root(&mut board, depth, previous_score, &mut ctx);

            // Only a fully completed depth may update the visible result.
            if ctx.stopped {
                break;
            }

            previous_score = score;
            let line = ctx.pv.root_line().to_vec();
            if let Some(&first) = line.first() {
                outcome.best_move = first;
            }
            outcome.best_score = score;
            outcome.depth = depth;
            outcome.nodes = ctx.nodes;
            ctx.prev_pv = line;

            if verbose {
                print_info(depth, score, ctx.nodes, &ctx.prev_pv);
            }
            debug!(depth, score, nodes = ctx.nodes, "iteration complete");
        }

        outcome.nodes = ctx.nodes;

        self.moves_out_of_book += 1;

        // Stopped before depth 1 completed: any legal move beats a null one.
        if outcome.best_move.is_null()
            && let Some(&fallback) = generate_moves(&self.board).first()
        {
            outcome.best_move = fallback;
        }

        outcome
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("tt", &self.tt)
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// One root search, with aspiration windows once deep enough.
///
/// A narrow window around the previous score is tried first, widened on
/// each failure, with a final full-width re-search as the backstop.
/// Near-mate scores skip aspiration entirely.
fn search_root(
    board: &mut Board,
    depth: u8,
    previous_score: i32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    let depth = i32::from(depth);
    let params = ctx.params;

    if depth < i32::from(params.aspiration_min_depth) || previous_score.abs() >= MATE_THRESHOLD {
        return negamax(board, depth, -INF, INF, 0, false, ctx);
    }

    let deltas = [
        params.aspiration_initial_delta,
        params.aspiration_widening[0],
        params.aspiration_widening[1],
    ];
    for delta in deltas {
        let alpha = (previous_score - delta).max(-INF);
        let beta = (previous_score + delta).min(INF);
        let score = negamax(board, depth, alpha, beta, 0, false, ctx);
        if ctx.stopped {
            return score;
        }
        if score > alpha && score < beta {
            return score;
        }
        debug!(depth, delta, score, "aspiration window failed");
        ctx.follow_pv = !ctx.prev_pv.is_empty();
    }

    negamax(board, depth, -INF, INF, 0, false, ctx)
}

/// Emit a UCI-style `info` line for a completed depth.
fn print_info(depth: u8, score: i32, nodes: u64, pv: &[Move]) {
    let score_text = if score.abs() >= MATE_THRESHOLD {
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {score}")
    };
    let line: Vec<String> = pv.iter().map(|m| m.to_uci()).collect();
    println!(
        "info depth {depth} score {score_text} nodes {nodes} pv {}",
        line.join(" ")
    );
}

/// Build the logarithmic late-move reduction table.
fn build_lmr_table() -> Box<LmrTable> {
    let mut table = Box::new([[0u8; 64]; 64]);
    for depth in 1..64 {
        for moves in 1..64 {
            let reduction = 0.75 + (depth as f64).ln() * (moves as f64).ln() / 2.25;
            table[depth][moves] = reduction as u8;
        }
    }
    table
}
