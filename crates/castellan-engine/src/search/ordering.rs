//! Move ordering: band-based priority scores with partial selection.
//!
//! Bands, descending: principal-variation move, transposition-table move,
//! promotions, captures by MVV-LVA, killers, quiets by history score. The
//! picker selection-sorts lazily — alpha-beta usually cuts off after the
//! first few moves, so a full sort would be wasted work.

use castellan_core::{Board, Color, Move, MoveKind, MoveList, PieceKind};

use crate::params::SearchParameters;
use crate::search::heuristics::{HistoryTable, KillerTable};

const PV_BAND: i32 = 1_000_000;
const TT_BAND: i32 = 900_000;
const PROMOTION_BAND: i32 = 800_000;
const CAPTURE_BAND: i32 = 700_000;
const KILLER_BAND: i32 = 600_000;
const QUIET_BAND: i32 = 300_000;

/// Exchange weights per piece kind for MVV-LVA scoring.
const EXCHANGE_WEIGHT: [i32; PieceKind::COUNT] = [1, 3, 3, 5, 9, 0];

/// Most-valuable-victim / least-valuable-attacker score. The victim class
/// dominates; the attacker class only breaks ties.
fn mvv_lva(victim: PieceKind, attacker: PieceKind) -> i32 {
    EXCHANGE_WEIGHT[victim.index()] * 16 - EXCHANGE_WEIGHT[attacker.index()]
}

/// The captured piece kind, if the move is a capture.
fn victim_of(board: &Board, mv: Move) -> Option<PieceKind> {
    match mv.kind() {
        MoveKind::EnPassant => Some(PieceKind::Pawn),
        MoveKind::Castle => None,
        _ => board.piece_on(mv.to()),
    }
}

/// Incremental highest-first move picker.
pub struct MovePicker {
    moves: MoveList,
    scores: Vec<i32>,
    cursor: usize,
}

impl MovePicker {
    /// Score a full move list for the main search.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        moves: MoveList,
        board: &Board,
        pv_move: Option<Move>,
        tt_move: Move,
        killers: &KillerTable,
        history: &HistoryTable,
        params: &SearchParameters,
        ply: usize,
    ) -> MovePicker {
        let side = board.side_to_move();
        let scores = moves
            .iter()
            .map(|&mv| {
                if pv_move == Some(mv) {
                    return PV_BAND;
                }
                if mv == tt_move && !tt_move.is_null() {
                    return TT_BAND;
                }
                score_move(board, mv, side, killers, history, params, ply)
            })
            .collect();
        MovePicker {
            moves,
            scores,
            cursor: 0,
        }
    }

    /// Score a captures-and-promotions list for quiescence search.
    pub fn new_quiescence(moves: MoveList, board: &Board) -> MovePicker {
        let scores = moves
            .iter()
            .map(|&mv| match mv.promotion_piece() {
                Some(promo) => {
                    PROMOTION_BAND + EXCHANGE_WEIGHT[promo.kind().index()]
                }
                None => match victim_of(board, mv) {
                    Some(victim) => {
                        let attacker =
                            board.piece_on(mv.from()).unwrap_or(PieceKind::Pawn);
                        CAPTURE_BAND + mvv_lva(victim, attacker)
                    }
                    None => 0,
                },
            })
            .collect();
        MovePicker {
            moves,
            scores,
            cursor: 0,
        }
    }

    /// The highest-scoring unexamined move, or `None` when exhausted.
    pub fn next(&mut self) -> Option<Move> {
        if self.cursor >= self.moves.len() {
            return None;
        }

        let mut best = self.cursor;
        for i in (self.cursor + 1)..self.moves.len() {
            if self.scores[i] > self.scores[best] {
                best = i;
            }
        }
        self.moves.swap(self.cursor, best);
        self.scores.swap(self.cursor, best);

        let mv = self.moves[self.cursor];
        self.cursor += 1;
        Some(mv)
    }
}

fn score_move(
    board: &Board,
    mv: Move,
    side: Color,
    killers: &KillerTable,
    history: &HistoryTable,
    params: &SearchParameters,
    ply: usize,
) -> i32 {
    if let Some(promo) = mv.promotion_piece() {
        return PROMOTION_BAND + params.promotion_move_score + EXCHANGE_WEIGHT[promo.kind().index()];
    }

    if let Some(victim) = victim_of(board, mv) {
        let attacker = board.piece_on(mv.from()).unwrap_or(PieceKind::Pawn);
        return CAPTURE_BAND + mvv_lva(victim, attacker);
    }

    if let Some(slot) = killers.slot_of(ply, mv) {
        // Slot 0 is the most recent killer and goes first.
        return KILLER_BAND + params.killer_move_score + (1 - slot as i32);
    }

    let piece = board.piece_on(mv.from()).unwrap_or(PieceKind::Pawn);
    QUIET_BAND + params.base_move_score + history.score(side, piece, mv.to().index())
}

#[cfg(test)]
mod tests {
    use castellan_core::{generate_captures, generate_moves, Board, Move, Square};

    use super::*;
    use crate::params::SearchParameters;

    fn pick_all(mut picker: MovePicker) -> Vec<Move> {
        let mut out = Vec::new();
        while let Some(mv) = picker.next() {
            out.push(mv);
        }
        out
    }

    fn plain_picker(board: &Board, pv: Option<Move>, tt: Move) -> MovePicker {
        MovePicker::new(
            generate_moves(board),
            board,
            pv,
            tt,
            &KillerTable::new(),
            &HistoryTable::new(),
            &SearchParameters::default(),
            0,
        )
    }

    #[test]
    fn mvv_lva_prefers_valuable_victims_and_cheap_attackers() {
        assert!(
            mvv_lva(PieceKind::Queen, PieceKind::Pawn) > mvv_lva(PieceKind::Pawn, PieceKind::Queen)
        );
        assert!(
            mvv_lva(PieceKind::Rook, PieceKind::Pawn) > mvv_lva(PieceKind::Rook, PieceKind::Knight)
        );
    }

    #[test]
    fn picker_yields_every_move_once() {
        let board = Board::starting_position();
        let picked = pick_all(plain_picker(&board, None, Move::NULL));
        assert_eq!(picked.len(), 20);
    }

    #[test]
    fn pv_move_comes_first() {
        let board = Board::starting_position();
        let pv = Move::new(Square::D2, Square::D4);
        let picked = pick_all(plain_picker(&board, Some(pv), Move::NULL));
        assert_eq!(picked[0], pv);
    }

    #[test]
    fn pv_outranks_tt_move() {
        let board = Board::starting_position();
        let pv = Move::new(Square::D2, Square::D4);
        let tt = Move::new(Square::E2, Square::E4);
        let picked = pick_all(plain_picker(&board, Some(pv), tt));
        assert_eq!(picked[0], pv);
        assert_eq!(picked[1], tt);
    }

    #[test]
    fn captures_precede_quiet_moves() {
        // White queen on d4 can capture the e5 pawn.
        let board: Board = "4k3/8/8/4p3/3Q4/8/8/4K3 w - - 0 1".parse().unwrap();
        let picked = pick_all(plain_picker(&board, None, Move::NULL));
        assert_eq!(picked[0], Move::new(Square::D4, Square::E5));
    }

    #[test]
    fn killers_precede_other_quiets() {
        let board = Board::starting_position();
        let killer = Move::new(Square::B1, Square::C3);
        let mut killers = KillerTable::new();
        killers.store(0, killer);

        let picker = MovePicker::new(
            generate_moves(&board),
            &board,
            None,
            Move::NULL,
            &killers,
            &HistoryTable::new(),
            &SearchParameters::default(),
            0,
        );
        assert_eq!(pick_all(picker)[0], killer);
    }

    #[test]
    fn history_orders_quiets() {
        let board = Board::starting_position();
        let favoured = Move::new(Square::G1, Square::F3);
        let mut history = HistoryTable::new();
        history.reward(Color::White, PieceKind::Knight, Square::F3.index(), 9);

        let picker = MovePicker::new(
            generate_moves(&board),
            &board,
            None,
            Move::NULL,
            &KillerTable::new(),
            &history,
            &SearchParameters::default(),
            0,
        );
        assert_eq!(pick_all(picker)[0], favoured);
    }

    #[test]
    fn quiescence_picker_orders_by_victim_value() {
        // White queen on d5 can take the rook on d8 or the pawn on b7.
        let board: Board = "3r2k1/1p6/8/3Q4/8/8/8/6K1 w - - 0 1".parse().unwrap();
        let picker = MovePicker::new_quiescence(generate_captures(&board), &board);
        let picked = pick_all(picker);
        assert!(!picked.is_empty());
        assert_eq!(picked[0], Move::new(Square::D5, Square::D8));
    }
}
