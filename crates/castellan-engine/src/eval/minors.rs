//! Minor-piece features: knight outposts and the bishop pair.

use castellan_core::Bitboard;

/// Squares excluded from outpost credit.
const OUTPOST_EXCLUDED: Bitboard = Bitboard::new(
    Bitboard::FILE_A.bits() | Bitboard::FILE_H.bits() | Bitboard::RANK_1.bits() | Bitboard::RANK_8.bits(),
);

/// Knights sitting on a square that is weak for the opponent and defended
/// by a friendly pawn. Edge files and back ranks never count.
pub fn knight_outposts(
    knights: Bitboard,
    opponent_weak_squares: Bitboard,
    own_pawn_attacks: Bitboard,
) -> i32 {
    (knights & opponent_weak_squares & own_pawn_attacks & !OUTPOST_EXCLUDED).count() as i32
}

/// `true` when the side owns two or more bishops.
pub fn has_bishop_pair(bishops: Bitboard) -> bool {
    bishops.count() >= 2
}
