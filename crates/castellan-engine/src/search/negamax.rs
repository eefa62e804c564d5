//! Negamax alpha-beta recursion with quiescence and pruning heuristics.

use castellan_core::{
    bishop_attacks, generate_captures, generate_moves, knight_attacks, pawn_attacks, queen_attacks,
    rook_attacks, Board, Color, Move, MoveKind, PieceKind,
};

use crate::eval::Evaluator;
use crate::params::SearchParameters;
use crate::search::control::SearchControl;
use crate::search::heuristics::{HistoryTable, KillerTable, MAX_PLY};
use crate::search::ordering::MovePicker;
use crate::search::tt::{BoundKind, TranspositionTable};

/// Unreachable score bound.
pub const INF: i32 = 30_000;

/// Mate score at the root; ply-adjusted so shorter mates score higher.
pub const MATE_SCORE: i32 = 29_000;

/// Scores beyond this magnitude signal a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Score for drawn positions.
pub const DRAW_SCORE: i32 = 0;

/// Precomputed late-move reduction plies, indexed `[depth][move_count]`.
pub(crate) type LmrTable = [[u8; 64]; 64];

/// Mutable search state threaded through the recursion.
pub(crate) struct SearchContext<'a> {
    pub evaluator: &'a Evaluator,
    pub params: &'a SearchParameters,
    pub tt: &'a mut TranspositionTable,
    pub lmr: &'a LmrTable,
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub pv: PvTable,
    pub prev_pv: Vec<Move>,
    pub follow_pv: bool,
    pub control: SearchControl,
    pub nodes: u64,
    pub stopped: bool,
}

impl SearchContext<'_> {
    /// Poll the cancellation state. Once set, it sticks for the whole call.
    fn check_stop(&mut self) -> bool {
        if !self.stopped && self.control.should_stop(self.nodes) {
            self.stopped = true;
        }
        self.stopped
    }

    /// Static evaluation from the side to move's perspective.
    fn eval(&self, board: &Board, lazy: bool) -> i32 {
        let white_score = self.evaluator.evaluate(board, lazy);
        match board.side_to_move() {
            Color::White => white_score,
            Color::Black => -white_score,
        }
    }

    fn lmr_reduction(&self, depth: i32, move_count: usize) -> i32 {
        let d = (depth.max(0) as usize).min(63);
        let m = move_count.min(63);
        self.lmr[d][m] as i32
    }
}

/// Apply `mv`, run `f`, and undo — on every path out of `f`.
pub(crate) fn with_move<T>(board: &mut Board, mv: Move, f: impl FnOnce(&mut Board) -> T) -> T {
    let undo = board.make_move(mv);
    let result = f(board);
    board.unmake_move(mv, undo);
    result
}

/// Null-move variant of [`with_move`].
fn with_null_move<T>(board: &mut Board, f: impl FnOnce(&mut Board) -> T) -> T {
    let undo = board.make_null_move();
    let result = f(board);
    board.unmake_null_move(undo);
    result
}

/// What became of one candidate move inside the move loop.
enum ChildOutcome {
    Pruned,
    Score(i32),
}

/// Negamax alpha-beta search returning the side-to-move score.
///
/// A cancelled search unwinds with a neutral score; the driver never
/// publishes results from a depth that did not complete.
pub(crate) fn negamax(
    board: &mut Board,
    mut depth: i32,
    mut alpha: i32,
    mut beta: i32,
    ply: usize,
    allow_null: bool,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    if ctx.check_stop() {
        return DRAW_SCORE;
    }

    ctx.pv.clear_ply(ply);

    if ply > 0
        && (board.is_repetition()
            || board.halfmove_clock() >= 100
            || board.is_insufficient_material())
    {
        return DRAW_SCORE;
    }

    if ply >= MAX_PLY {
        return ctx.eval(board, false);
    }

    let in_check = board.in_check();
    if in_check {
        depth += 1;
    }

    if depth <= 0 {
        return quiescence(board, alpha, beta, ply, ctx);
    }

    ctx.nodes += 1;

    let is_pv = beta - alpha > 1;
    let params = ctx.params;

    // Transposition probe. The stored move is always kept as an ordering
    // hint; the score only cuts outside the root and PV windows.
    let mut tt_move = Move::NULL;
    if let Some(entry) = ctx.tt.retrieve(board.hash()) {
        tt_move = entry.best_move;
        if ply > 0 && !is_pv && i32::from(entry.depth) >= depth {
            match entry.bound {
                BoundKind::Exact => return entry.score,
                BoundKind::Lower => alpha = alpha.max(entry.score),
                BoundKind::Upper => beta = beta.min(entry.score),
            }
            if alpha >= beta {
                return entry.score;
            }
        }
    }

    // Reverse futility: a static eval so far above beta that a shallow
    // search will not fall back under it.
    if !in_check
        && !is_pv
        && depth <= i32::from(params.rfp_max_depth)
        && beta.abs() < MATE_THRESHOLD
    {
        let static_eval = ctx.eval(board, params.rfp_lazy_eval);
        let margin = params.rfp_margin * depth;
        if static_eval - margin >= beta {
            return static_eval - margin;
        }
    }

    // Null move: hand the opponent a free move; if the reduced search still
    // clears beta, a real move surely would.
    if allow_null
        && !in_check
        && !is_pv
        && depth >= i32::from(params.null_move_min_depth)
        && board.has_non_pawn_material(board.side_to_move())
        && ctx.eval(board, params.null_move_lazy_eval) >= beta
    {
        let divisor = i32::from(params.null_move_depth_divisor).max(1);
        let reduction = i32::from(params.null_move_base_reduction) + depth / divisor;
        let score = with_null_move(board, |board| {
            -negamax(board, depth - 1 - reduction, -beta, -beta + 1, ply + 1, false, ctx)
        });
        if ctx.stopped {
            return DRAW_SCORE;
        }
        if score >= beta {
            // Never trust a null search with a mate score.
            return if score >= MATE_THRESHOLD { beta } else { score };
        }
    }

    // Razoring: hopelessly below alpha at shallow depth; confirm with a
    // quiescence probe and cut if it agrees.
    if !in_check && !is_pv && depth <= 3 && alpha.abs() < MATE_THRESHOLD {
        let margin = params.futility_margins[(depth as usize - 1).min(2)];
        if ctx.eval(board, params.razor_lazy_eval) + margin <= alpha {
            let score = quiescence(board, alpha, alpha + 1, ply, ctx);
            if score <= alpha {
                return score;
            }
        }
    }

    let moves = generate_moves(board);
    if moves.is_empty() {
        return if in_check {
            -(MATE_SCORE - ply as i32)
        } else {
            DRAW_SCORE
        };
    }

    // Principal-variation move from the previous, shallower iteration.
    let pv_move = if ctx.follow_pv {
        ctx.prev_pv.get(ply).copied()
    } else {
        None
    };
    if pv_move.is_none() {
        ctx.follow_pv = false;
    }
    let was_following = ctx.follow_pv;

    let mut picker = MovePicker::new(
        moves,
        board,
        pv_move,
        tt_move,
        &ctx.killers,
        &ctx.history,
        params,
        ply,
    );

    let original_alpha = alpha;
    let mut best_score = -INF;
    let mut best_move = Move::NULL;
    let mut move_count = 0usize;

    while let Some(mv) = picker.next() {
        let is_quiet = mv.kind() == MoveKind::Normal && board.piece_on(mv.to()).is_none();
        let moving_piece = board.piece_on(mv.from()).unwrap_or(PieceKind::Pawn);

        // Stay on the previous PV only down its first branch.
        ctx.follow_pv = was_following && move_count == 0 && pv_move == Some(mv);

        let lmp_limit = params.lmp_base_moves + (depth * depth) as usize;
        let current_best = best_score;

        let outcome = with_move(board, mv, |board| {
            let gives_check = board.in_check();

            // Late-move pruning: quiet non-checking moves far down the
            // ordering at shallow depth are skipped outright.
            if is_quiet
                && !gives_check
                && !is_pv
                && !in_check
                && depth <= i32::from(params.lmp_max_depth)
                && move_count >= lmp_limit
                && current_best > -MATE_THRESHOLD
            {
                return ChildOutcome::Pruned;
            }

            let score = if move_count == 0 {
                -negamax(board, depth - 1, -beta, -alpha, ply + 1, true, ctx)
            } else {
                // Late-move reductions: likely-irrelevant quiet moves get a
                // reduced-depth scout search first.
                let mut reduction = 0;
                if is_quiet
                    && !gives_check
                    && !in_check
                    && !is_pv
                    && depth >= i32::from(params.lmr_min_depth)
                    && move_count >= params.lmr_min_moves
                {
                    reduction = ctx.lmr_reduction(depth, move_count);
                    if depth >= i32::from(params.lmr_deep_depth)
                        && move_count >= params.lmr_deep_moves
                    {
                        reduction += 1;
                    }
                    reduction = reduction.clamp(0, depth - 1);
                }

                let mut score = -negamax(
                    board,
                    depth - 1 - reduction,
                    -alpha - 1,
                    -alpha,
                    ply + 1,
                    true,
                    ctx,
                );
                if score > alpha && reduction > 0 {
                    score = -negamax(board, depth - 1, -alpha - 1, -alpha, ply + 1, true, ctx);
                }
                if score > alpha && score < beta && is_pv {
                    score = -negamax(board, depth - 1, -beta, -alpha, ply + 1, true, ctx);
                }
                score
            };
            ChildOutcome::Score(score)
        });

        let score = match outcome {
            ChildOutcome::Pruned => {
                move_count += 1;
                continue;
            }
            ChildOutcome::Score(score) => score,
        };

        // A cancelled child returned garbage; do not let it into the state.
        if ctx.stopped {
            return DRAW_SCORE;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if score > alpha {
                alpha = score;
                ctx.pv.update(ply, mv);
            }
        }

        if alpha >= beta {
            if is_quiet {
                ctx.killers.store(ply, mv);
                ctx.history
                    .reward(board.side_to_move(), moving_piece, mv.to().index(), depth);
            }
            break;
        }

        move_count += 1;
    }

    // Cache the result. Aborted nodes and near-mate scores are unstable;
    // neither is worth poisoning the table with.
    if !ctx.stopped && best_score.abs() < MATE_THRESHOLD {
        let bound = if best_score <= original_alpha {
            BoundKind::Upper
        } else if best_score >= beta {
            BoundKind::Lower
        } else {
            BoundKind::Exact
        };
        ctx.tt
            .save(board.hash(), depth.clamp(0, 255) as u8, best_score, bound, best_move);
    }

    best_score
}

/// Capture-and-promotion search below the horizon, bounded by stand-pat.
pub(crate) fn quiescence(
    board: &mut Board,
    mut alpha: i32,
    beta: i32,
    ply: usize,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    if ctx.check_stop() {
        return DRAW_SCORE;
    }

    ctx.nodes += 1;

    let stand_pat = ctx.eval(board, false);
    if ply >= MAX_PLY {
        return stand_pat;
    }
    if stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    // Delta pruning is unsound when promotions loom or in pawn endings
    // where a single capture can decide the game.
    let pawn_ending = !board.has_non_pawn_material(Color::White)
        && !board.has_non_pawn_material(Color::Black);

    let mut picker = MovePicker::new_quiescence(generate_captures(board), board);
    let mut best_score = stand_pat;

    while let Some(mv) = picker.next() {
        if mv.kind() != MoveKind::Promotion && !pawn_ending {
            let gain = match mv.kind() {
                MoveKind::EnPassant => ctx.evaluator.weights().material_mg(PieceKind::Pawn),
                _ => board
                    .piece_on(mv.to())
                    .map_or(0, |victim| ctx.evaluator.weights().material_mg(victim)),
            };
            if stand_pat + gain + ctx.params.delta_margin <= alpha
                && !gives_direct_check(board, mv)
            {
                continue;
            }
        }

        let score = with_move(board, mv, |board| {
            -quiescence(board, -beta, -alpha, ply + 1, ctx)
        });
        if ctx.stopped {
            return DRAW_SCORE;
        }

        if score > best_score {
            best_score = score;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break;
        }
    }

    best_score
}

/// Cheap direct-check test: would the moved piece attack the enemy king
/// from its destination? Discovered checks are not detected.
fn gives_direct_check(board: &Board, mv: Move) -> bool {
    let us = board.side_to_move();
    let enemy_king = board.king_square(!us);
    let Some(kind) = (match mv.promotion_piece() {
        Some(promo) => Some(promo.kind()),
        None => board.piece_on(mv.from()),
    }) else {
        return false;
    };

    let occupied = board.occupied().without(mv.from()).with(mv.to());
    let attacks = match kind {
        PieceKind::Pawn => pawn_attacks(us, mv.to()),
        PieceKind::Knight => knight_attacks(mv.to()),
        PieceKind::Bishop => bishop_attacks(mv.to(), occupied),
        PieceKind::Rook => rook_attacks(mv.to(), occupied),
        PieceKind::Queen => queen_attacks(mv.to(), occupied),
        PieceKind::King => return false,
    };
    attacks.contains(enemy_king)
}

/// Triangular principal-variation collector.
pub(crate) struct PvTable {
    moves: [[Move; MAX_PLY]; MAX_PLY],
    len: [usize; MAX_PLY],
}

impl PvTable {
    pub fn new() -> PvTable {
        PvTable {
            moves: [[Move::NULL; MAX_PLY]; MAX_PLY],
            len: [0; MAX_PLY],
        }
    }

    /// Drop the stored line at `ply` (called on node entry).
    pub fn clear_ply(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// Set `mv` as the best move at `ply` and append the child line.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        self.moves[ply][0] = mv;

        let child = ply + 1;
        if child < MAX_PLY {
            let child_len = self.len[child].min(MAX_PLY - 1);
            let (upper, lower) = self.moves.split_at_mut(child);
            upper[ply][1..1 + child_len].copy_from_slice(&lower[0][..child_len]);
            self.len[ply] = 1 + child_len;
        } else {
            self.len[ply] = 1;
        }
    }

    /// The principal variation from the root.
    pub fn root_line(&self) -> &[Move] {
        &self.moves[0][..self.len[0]]
    }
}

#[cfg(test)]
mod tests {
    use castellan_core::{Move, Square};

    use super::PvTable;

    #[test]
    fn pv_update_prepends_move() {
        let mut pv = PvTable::new();
        let reply = Move::new(Square::E7, Square::E5);
        let first = Move::new(Square::E2, Square::E4);

        pv.update(1, reply);
        pv.update(0, first);

        assert_eq!(pv.root_line(), &[first, reply]);
    }

    #[test]
    fn clear_ply_truncates_child_line() {
        let mut pv = PvTable::new();
        pv.update(1, Move::new(Square::E7, Square::E5));
        pv.clear_ply(1);
        pv.update(0, Move::new(Square::E2, Square::E4));
        assert_eq!(pv.root_line().len(), 1);
    }
}
