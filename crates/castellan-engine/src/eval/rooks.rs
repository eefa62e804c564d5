//! Rook activity features.

use castellan_core::{Bitboard, Color, Square};

use crate::eval::pawns::ADJACENT_FILES;

/// Rooks sharing a file with the enemy king.
pub fn on_king_file(rooks: Bitboard, enemy_king: Square) -> i32 {
    (rooks & enemy_king.file().mask()).count() as i32
}

/// Rooks on a file adjacent to the enemy king's.
pub fn on_king_adjacent_file(rooks: Bitboard, enemy_king: Square) -> i32 {
    (rooks & ADJACENT_FILES[enemy_king.file().index()]).count() as i32
}

/// Rooks on the second-to-last rank from their own side's perspective.
pub fn on_seventh(rooks: Bitboard, color: Color) -> i32 {
    let seventh = match color {
        Color::White => Bitboard::RANK_7,
        Color::Black => Bitboard::RANK_2,
    };
    (rooks & seventh).count() as i32
}

/// 1 when two rooks defend each other along an empty rank or file.
pub fn connected(rooks: Bitboard, occupied: Bitboard) -> i32 {
    let squares: Vec<Square> = rooks.collect();
    for (i, &a) in squares.iter().enumerate() {
        for &b in &squares[i + 1..] {
            if a.file() != b.file() && a.rank() != b.rank() {
                continue;
            }
            if (between(a, b) & occupied).is_empty() {
                return 1;
            }
        }
    }
    0
}

/// Squares strictly between two aligned squares (same rank or file).
fn between(a: Square, b: Square) -> Bitboard {
    let mut result = Bitboard::EMPTY;
    let df = (b.file().index() as i8 - a.file().index() as i8).signum();
    let dr = (b.rank().index() as i8 - a.rank().index() as i8).signum();
    let mut current = a;
    while let Some(next) = current.offset(df, dr) {
        if next == b {
            break;
        }
        result = result.with(next);
        current = next;
    }
    result
}

/// Rooks behind a friendly passed pawn on the same file (behind relative to
/// the pawn's direction of advance).
pub fn behind_passed_pawn(rooks: Bitboard, own_passed: Bitboard, color: Color) -> i32 {
    let mut count = 0;
    for rook in rooks {
        for pawn in own_passed & rook.file().mask() {
            let rook_behind = match color {
                Color::White => rook.rank() < pawn.rank(),
                Color::Black => rook.rank() > pawn.rank(),
            };
            if rook_behind {
                count += 1;
            }
        }
    }
    count
}

/// Rooks on a file with no pawns of either color.
pub fn open_file(rooks: Bitboard, all_pawns: Bitboard) -> i32 {
    rooks
        .filter(|sq| (sq.file().mask() & all_pawns).is_empty())
        .count() as i32
}

/// Rooks on a file with enemy pawns but no friendly ones.
pub fn semi_open_file(rooks: Bitboard, own_pawns: Bitboard, enemy_pawns: Bitboard) -> i32 {
    rooks
        .filter(|sq| {
            let file = sq.file().mask();
            (file & own_pawns).is_empty() && (file & enemy_pawns).any()
        })
        .count() as i32
}

/// Rooks attacking a weak enemy pawn down a file with no friendly pawns in
/// the way.
pub fn on_weak_pawn_file(rooks: Bitboard, enemy_weak_pawns: Bitboard, own_pawns: Bitboard) -> i32 {
    rooks
        .filter(|sq| {
            let file = sq.file().mask();
            (file & enemy_weak_pawns).any() && (file & own_pawns).is_empty()
        })
        .count() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn king_file_alignment() {
        let rooks = Bitboard::EMPTY.with(Square::E1).with(Square::A1);
        assert_eq!(on_king_file(rooks, Square::E8), 1);
        assert_eq!(on_king_adjacent_file(rooks, Square::E8), 0);
        assert_eq!(on_king_adjacent_file(rooks, Square::B8), 1);
    }

    #[test]
    fn seventh_rank_is_color_relative() {
        let white_rook = Bitboard::EMPTY.with(Square::D7);
        assert_eq!(on_seventh(white_rook, Color::White), 1);
        assert_eq!(on_seventh(white_rook, Color::Black), 0);

        let black_rook = Bitboard::EMPTY.with(Square::D2);
        assert_eq!(on_seventh(black_rook, Color::Black), 1);
    }

    #[test]
    fn connected_rooks_need_clear_line() {
        let rooks = Bitboard::EMPTY.with(Square::A1).with(Square::H1);
        assert_eq!(connected(rooks, rooks), 1);

        let blocker = rooks.with(Square::D1);
        assert_eq!(connected(rooks, blocker), 0);

        let diagonal = Bitboard::EMPTY.with(Square::A1).with(Square::B2);
        assert_eq!(connected(diagonal, diagonal), 0);
    }

    #[test]
    fn rook_behind_passer_respects_direction() {
        let rooks = Bitboard::EMPTY.with(Square::E2);
        let passers = Bitboard::EMPTY.with(Square::E6);
        assert_eq!(behind_passed_pawn(rooks, passers, Color::White), 1);

        // The same geometry is "in front" for a black rook.
        assert_eq!(behind_passed_pawn(rooks, passers, Color::Black), 0);
    }

    #[test]
    fn open_and_semi_open_files() {
        let rooks = Bitboard::EMPTY.with(Square::E1);
        let own = Bitboard::EMPTY.with(Square::D2);
        let enemy = Bitboard::EMPTY.with(Square::E7);

        assert_eq!(open_file(rooks, own | enemy), 0); // enemy pawn on e-file
        assert_eq!(semi_open_file(rooks, own, enemy), 1);
        assert_eq!(open_file(rooks, own), 1); // no pawns on the e-file at all
    }

    #[test]
    fn weak_pawn_file_requires_clear_path() {
        let rooks = Bitboard::EMPTY.with(Square::E1);
        let weak = Bitboard::EMPTY.with(Square::E6);
        assert_eq!(on_weak_pawn_file(rooks, weak, Bitboard::EMPTY), 1);

        let own_blocker = Bitboard::EMPTY.with(Square::E3);
        assert_eq!(on_weak_pawn_file(rooks, weak, own_blocker), 0);
    }
}
