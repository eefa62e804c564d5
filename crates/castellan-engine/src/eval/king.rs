//! King safety and king-pawn race features.

use castellan_core::{Bitboard, Color, PieceKind, Square};

use crate::eval::pawns::ADJACENT_FILES;

/// Diminishing-return credit for friendly pawns sheltering the king.
///
/// Pawns on the king's file or an adjacent file add `6 - (distance + 1)`,
/// floored at zero, so a pawn right next to the king is worth the most and
/// far pawns contribute nothing.
pub fn shelter(king: Square, own_pawns: Bitboard) -> i32 {
    let nearby_files = king.file().mask() | ADJACENT_FILES[king.file().index()];
    let mut credit = 0;
    for pawn in own_pawns & nearby_files {
        let distance = king.manhattan_distance(pawn) as i32 + 1;
        credit += (6 - distance).max(0);
    }
    credit
}

/// Threat from enemy pawns advancing near the king.
///
/// Enemy pawns on the king's or an adjacent file within three ranks add
/// `4 - rank_distance`; the evaluator applies this as a penalty.
pub fn pawn_storm(king: Square, enemy_pawns: Bitboard) -> i32 {
    let nearby_files = king.file().mask() | ADJACENT_FILES[king.file().index()];
    let mut threat = 0;
    for pawn in enemy_pawns & nearby_files {
        let rank_distance = king.rank_distance(pawn) as i32;
        if rank_distance <= 3 {
            threat += 4 - rank_distance;
        }
    }
    threat
}

/// Zone radius, in manhattan distance, inside which enemy pieces press on
/// the king.
const PRESSURE_ZONE: i32 = 6;

/// Tropism weights per piece kind (knight, bishop, rook, queen).
const PRESSURE_WEIGHTS: [(PieceKind, i32); 4] = [
    (PieceKind::Knight, 3),
    (PieceKind::Bishop, 3),
    (PieceKind::Rook, 5),
    (PieceKind::Queen, 9),
];

/// Inverse-distance-weighted pressure from enemy pieces inside the king's
/// zone, weighted by piece value. Pawns are covered by [`pawn_storm`].
pub fn pressure(king: Square, enemy_pieces: impl Fn(PieceKind) -> Bitboard) -> i32 {
    let mut total = 0;
    for (kind, weight) in PRESSURE_WEIGHTS {
        for sq in enemy_pieces(kind) {
            let distance = (king.manhattan_distance(sq) as i32).max(1);
            if distance <= PRESSURE_ZONE {
                total += weight * 8 / distance;
            }
        }
    }
    total
}

/// Passed pawns of `passer_color` whose promotion the defending king can
/// reach in time: the king's move distance to the pawn does not exceed the
/// pawn's distance to its promotion rank.
pub fn rule_of_square(
    passers: Bitboard,
    passer_color: Color,
    defending_king: Square,
) -> i32 {
    let promotion_rank = match passer_color {
        Color::White => 7,
        Color::Black => 0,
    };
    let mut caught = 0;
    for pawn in passers {
        let to_promotion = (promotion_rank as i32 - pawn.rank().index() as i32).abs();
        let king_distance = defending_king.chebyshev_distance(pawn) as i32;
        if king_distance <= to_promotion {
            caught += 1;
        }
    }
    caught
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shelter_prefers_close_pawns() {
        let king = Square::G1;
        let tight = Bitboard::EMPTY.with(Square::F2).with(Square::G2).with(Square::H2);
        let loose = Bitboard::EMPTY.with(Square::F4).with(Square::G4).with(Square::H4);
        assert!(shelter(king, tight) > shelter(king, loose));
    }

    #[test]
    fn shelter_ignores_distant_files() {
        let king = Square::G1;
        let far = Bitboard::EMPTY.with(Square::A2).with(Square::B2);
        assert_eq!(shelter(king, far), 0);
    }

    #[test]
    fn storm_counts_advancing_pawns() {
        let king = Square::G1;
        let close = Bitboard::EMPTY.with(Square::G3);
        let distant = Bitboard::EMPTY.with(Square::G7);
        assert!(pawn_storm(king, close) > 0);
        assert_eq!(pawn_storm(king, distant), 0);
    }

    #[test]
    fn pressure_scales_with_proximity_and_value() {
        let king = Square::G1;
        let queen_near = |kind: PieceKind| {
            if kind == PieceKind::Queen {
                Bitboard::EMPTY.with(Square::G3)
            } else {
                Bitboard::EMPTY
            }
        };
        let queen_far = |kind: PieceKind| {
            if kind == PieceKind::Queen {
                Bitboard::EMPTY.with(Square::G6)
            } else {
                Bitboard::EMPTY
            }
        };
        let knight_near = |kind: PieceKind| {
            if kind == PieceKind::Knight {
                Bitboard::EMPTY.with(Square::G3)
            } else {
                Bitboard::EMPTY
            }
        };
        assert!(pressure(king, queen_near) > pressure(king, queen_far));
        assert!(pressure(king, queen_near) > pressure(king, knight_near));
    }

    #[test]
    fn pressure_ignores_pieces_outside_zone() {
        let king = Square::G1;
        let rook_far = |kind: PieceKind| {
            if kind == PieceKind::Rook {
                Bitboard::EMPTY.with(Square::A8)
            } else {
                Bitboard::EMPTY
            }
        };
        assert_eq!(pressure(king, rook_far), 0);
    }

    #[test]
    fn rule_of_square_catches_slow_pawns() {
        // Black king on e4 vs white pawn on a4: the pawn needs 4 moves,
        // the king needs 4 king moves to reach it — caught.
        let passers = Bitboard::EMPTY.with(Square::A4);
        assert_eq!(rule_of_square(passers, Color::White, Square::E4), 1);
        // From e3 the king is still 4 files away but the pawn is no closer;
        // move the king a file further and it loses the race.
        assert_eq!(rule_of_square(passers, Color::White, Square::F4), 0);
    }
}
