//! Static position evaluation.
//!
//! [`Evaluator::evaluate`] scores a position from White's perspective: one
//! accumulation pass over the pieces builds material, mobility, and attack
//! bitboards per side; a positional pass adds the pawn-structure, king, and
//! piece-activity features. Middlegame and endgame components are blended
//! once at the end by the game phase.

pub mod king;
pub mod minors;
pub mod pawns;
pub mod rooks;
pub mod taper;

use castellan_core::{
    bishop_attacks, knight_attacks, pawn_attack_span, queen_attacks, rook_attacks, Bitboard,
    Board, Color, PieceKind, Square,
};

use crate::eval::taper::{game_phase, TaperedScore};
use crate::weights::EvaluationWeights;

/// Skip the positional pass when the lazy core already exceeds this
/// magnitude outside the endgame.
const LAZY_EXIT_MARGIN: i32 = 700;

/// Phase at or below which the lazy early exit is disabled; endgames are
/// decided by exactly the features the lazy path skips.
const LAZY_PHASE_FLOOR: i32 = 6;

/// One side's accumulated piece data from the single board pass.
struct SideEval {
    pawns: Bitboard,
    knights: Bitboard,
    bishops: Bitboard,
    rooks: Bitboard,
    queens: Bitboard,
    king: Square,
    pawn_attacks: Bitboard,
    /// Material plus mobility — the lazy core.
    core: TaperedScore,
}

impl SideEval {
    fn gather(board: &Board, color: Color, weights: &EvaluationWeights) -> SideEval {
        let occupied = board.occupied();
        let friendly = board.side(color);
        let not_friendly = !friendly;

        let pawns = board.pieces_of(color, PieceKind::Pawn);
        let knights = board.pieces_of(color, PieceKind::Knight);
        let bishops = board.pieces_of(color, PieceKind::Bishop);
        let rooks = board.pieces_of(color, PieceKind::Rook);
        let queens = board.pieces_of(color, PieceKind::Queen);

        let mut core = TaperedScore::ZERO;
        core += weights.pawn * pawns.count() as i32;
        core += weights.knight * knights.count() as i32;
        core += weights.bishop * bishops.count() as i32;
        core += weights.rook * rooks.count() as i32;
        core += weights.queen * queens.count() as i32;

        for sq in knights {
            let reach = knight_attacks(sq) & not_friendly;
            core += weights.knight_mobility * reach.count() as i32;
        }
        for sq in bishops {
            let reach = bishop_attacks(sq, occupied) & not_friendly;
            core += weights.bishop_mobility * reach.count() as i32;
        }
        for sq in rooks {
            let reach = rook_attacks(sq, occupied) & not_friendly;
            core += weights.rook_mobility * reach.count() as i32;
        }
        for sq in queens {
            let reach = queen_attacks(sq, occupied) & not_friendly;
            core += weights.queen_mobility * reach.count() as i32;
        }

        SideEval {
            pawns,
            knights,
            bishops,
            rooks,
            queens,
            king: board.king_square(color),
            pawn_attacks: pawn_attack_span(color, pawns),
            core,
        }
    }
}

/// The static evaluator, configured once with a weight table.
#[derive(Debug, Clone)]
pub struct Evaluator {
    weights: EvaluationWeights,
}

impl Evaluator {
    /// Build an evaluator around a weight table.
    pub fn new(weights: EvaluationWeights) -> Evaluator {
        Evaluator { weights }
    }

    /// The configured weights.
    pub fn weights(&self) -> &EvaluationWeights {
        &self.weights
    }

    /// Score the position in centipawns, positive when White stands better.
    ///
    /// With `lazy` the material-and-mobility core is returned without the
    /// positional pass; cheap-bound call sites (null-move preconditions,
    /// reverse-futility checks) use it. The full path also exits early when
    /// the core alone is decisive outside the endgame.
    pub fn evaluate(&self, board: &Board, lazy: bool) -> i32 {
        let phase = game_phase(board);

        let white = SideEval::gather(board, Color::White, &self.weights);
        let black = SideEval::gather(board, Color::Black, &self.weights);
        let core = (white.core - black.core).taper(phase);

        if lazy {
            return core;
        }
        if phase > LAZY_PHASE_FLOOR && core.abs() > LAZY_EXIT_MARGIN {
            return core;
        }

        core + self.positional(board, &white, &black).taper(phase)
    }

    /// The positional feature pass: every term is
    /// `(white count − black count) × weight`.
    fn positional(&self, board: &Board, white: &SideEval, black: &SideEval) -> TaperedScore {
        let w = &self.weights;
        let occupied = board.occupied();
        let all_pawns = white.pawns | black.pawns;
        let mut score = TaperedScore::ZERO;

        // Pawn structure.
        let white_passed = pawns::passed(white.pawns, black.pawns, Color::White);
        let black_passed = pawns::passed(black.pawns, white.pawns, Color::Black);
        score += w.passed_pawn * count_diff(white_passed, black_passed);

        score -= w.doubled_pawn
            * (pawns::doubled_count(white.pawns) - pawns::doubled_count(black.pawns));

        let white_isolated = pawns::isolated(white.pawns);
        let black_isolated = pawns::isolated(black.pawns);
        score -= w.isolated_pawn * count_diff(white_isolated, black_isolated);

        let white_backward = pawns::backward(
            white.pawns,
            black.pawns,
            Color::White,
            white_passed | white_isolated,
        );
        let black_backward = pawns::backward(
            black.pawns,
            white.pawns,
            Color::Black,
            black_passed | black_isolated,
        );
        score -= w.backward_pawn * count_diff(white_backward, black_backward);

        let white_weak = pawns::weak_squares(white.pawns, Color::White);
        let black_weak = pawns::weak_squares(black.pawns, Color::Black);
        score -= w.weak_square * count_diff(white_weak, black_weak);

        // King-and-pawn races: credit the defender who reaches the square.
        score += w.rule_of_square
            * (king::rule_of_square(black_passed, Color::Black, white.king)
                - king::rule_of_square(white_passed, Color::White, black.king));

        // Minor pieces.
        score += w.knight_outpost
            * (minors::knight_outposts(white.knights, black_weak, white.pawn_attacks)
                - minors::knight_outposts(black.knights, white_weak, black.pawn_attacks));

        score += w.bishop_pair
            * (minors::has_bishop_pair(white.bishops) as i32
                - minors::has_bishop_pair(black.bishops) as i32);

        // Rook activity.
        score += w.rook_on_king_file
            * (rooks::on_king_file(white.rooks, black.king)
                - rooks::on_king_file(black.rooks, white.king));
        score += w.rook_on_king_adjacent_file
            * (rooks::on_king_adjacent_file(white.rooks, black.king)
                - rooks::on_king_adjacent_file(black.rooks, white.king));
        score += w.rook_on_seventh
            * (rooks::on_seventh(white.rooks, Color::White)
                - rooks::on_seventh(black.rooks, Color::Black));
        score += w.rook_connected
            * (rooks::connected(white.rooks, occupied) - rooks::connected(black.rooks, occupied));
        score += w.rook_behind_passed_pawn
            * (rooks::behind_passed_pawn(white.rooks, white_passed, Color::White)
                - rooks::behind_passed_pawn(black.rooks, black_passed, Color::Black));
        score += w.rook_open_file
            * (rooks::open_file(white.rooks, all_pawns) - rooks::open_file(black.rooks, all_pawns));
        score += w.rook_semi_open_file
            * (rooks::semi_open_file(white.rooks, white.pawns, black.pawns)
                - rooks::semi_open_file(black.rooks, black.pawns, white.pawns));
        score += w.rook_on_weak_pawn_file
            * (rooks::on_weak_pawn_file(white.rooks, black_backward, white.pawns)
                - rooks::on_weak_pawn_file(black.rooks, white_backward, black.pawns));

        // King safety.
        score += w.king_pawn_shelter
            * (king::shelter(white.king, white.pawns) - king::shelter(black.king, black.pawns));
        score -= w.king_pawn_storm
            * (king::pawn_storm(white.king, black.pawns)
                - king::pawn_storm(black.king, white.pawns));
        score -= w.king_pressure
            * (king::pressure(white.king, |kind| pieces_by_kind(black, kind))
                - king::pressure(black.king, |kind| pieces_by_kind(white, kind)));

        score
    }
}

fn pieces_by_kind(side: &SideEval, kind: PieceKind) -> Bitboard {
    match kind {
        PieceKind::Pawn => side.pawns,
        PieceKind::Knight => side.knights,
        PieceKind::Bishop => side.bishops,
        PieceKind::Rook => side.rooks,
        PieceKind::Queen => side.queens,
        PieceKind::King => Bitboard::EMPTY,
    }
}

fn count_diff(white: Bitboard, black: Bitboard) -> i32 {
    white.count() as i32 - black.count() as i32
}

#[cfg(test)]
mod tests {
    use castellan_core::Board;

    use super::Evaluator;
    use crate::weights::EvaluationWeights;

    const SAMPLE_FENS: &[&str] = &[
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 6 5",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "4rr1k/1p4bp/2p3p1/p7/P2pBQn1/1P3nqN/6P1/B3RR1K b - - 0 33",
        "8/8/4kp2/8/4KP2/8/8/8 w - - 0 1",
    ];

    #[test]
    fn starting_position_is_balanced() {
        let evaluator = Evaluator::new(EvaluationWeights::default());
        let board = Board::starting_position();
        assert_eq!(evaluator.evaluate(&board, false), 0);
        assert_eq!(evaluator.evaluate(&board, true), 0);
    }

    #[test]
    fn evaluation_is_antisymmetric_under_color_flip() {
        let evaluator = Evaluator::new(EvaluationWeights::default());
        for fen in SAMPLE_FENS {
            let board: Board = fen.parse().unwrap();
            let flipped = board.color_flipped();
            assert_eq!(
                evaluator.evaluate(&board, false),
                -evaluator.evaluate(&flipped, false),
                "full evaluation must mirror for {fen}"
            );
            assert_eq!(
                evaluator.evaluate(&board, true),
                -evaluator.evaluate(&flipped, true),
                "lazy evaluation must mirror for {fen}"
            );
        }
    }

    #[test]
    fn extra_material_scores_positive() {
        let evaluator = Evaluator::new(EvaluationWeights::default());
        // White has an extra queen.
        let board: Board = "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        assert!(evaluator.evaluate(&board, false) > 500);
        assert!(evaluator.evaluate(&board, true) > 500);
    }

    #[test]
    fn lazy_never_strays_far_from_full() {
        // Lazy-based pruning margins assume the positional pass is bounded;
        // keep the gap well under the razoring margins.
        let evaluator = Evaluator::new(EvaluationWeights::default());
        for fen in SAMPLE_FENS {
            let board: Board = fen.parse().unwrap();
            let full = evaluator.evaluate(&board, false);
            let lazy = evaluator.evaluate(&board, true);
            assert!(
                (full - lazy).abs() <= 500,
                "lazy/full gap too wide for {fen}: {full} vs {lazy}"
            );
        }
    }

    #[test]
    fn passed_pawn_edge_favours_the_owner() {
        let evaluator = Evaluator::new(EvaluationWeights::default());
        let passed: Board = "4k3/8/8/4P3/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let blocked: Board = "4k3/4p3/8/4P3/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(
            evaluator.evaluate(&passed, false) > evaluator.evaluate(&blocked, false),
            "a passed pawn should outscore a blocked one"
        );
    }

    #[test]
    fn tuned_preset_stays_antisymmetric() {
        let evaluator = Evaluator::new(EvaluationWeights::tuned());
        for fen in SAMPLE_FENS {
            let board: Board = fen.parse().unwrap();
            let flipped = board.color_flipped();
            assert_eq!(
                evaluator.evaluate(&board, false),
                -evaluator.evaluate(&flipped, false)
            );
        }
    }
}
