//! Legal move generation.
//!
//! Moves are generated pseudo-legally, then filtered by applying each one to
//! a scratch board and rejecting those that leave the mover's king attacked.

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::color::Color;
use crate::moves::{Move, Promotion};
use crate::piece::PieceKind;
use crate::square::{Rank, Square};

/// A list of generated moves.
pub type MoveList = Vec<Move>;

/// All legal moves for the side to move.
pub fn generate_moves(board: &Board) -> MoveList {
    generate(board, false)
}

/// Legal captures and promotions only, for quiescence search.
pub fn generate_captures(board: &Board) -> MoveList {
    generate(board, true)
}

fn generate(board: &Board, captures_only: bool) -> MoveList {
    let mut list = Vec::with_capacity(48);
    pseudo_legal(board, captures_only, &mut list);

    let us = board.side_to_move();
    let mut scratch = board.clone();
    list.retain(|&mv| {
        let undo = scratch.make_move(mv);
        let legal = !scratch.is_square_attacked(scratch.king_square(us), !us);
        scratch.unmake_move(mv, undo);
        legal
    });
    list
}

fn pseudo_legal(board: &Board, captures_only: bool, list: &mut MoveList) {
    let us = board.side_to_move();
    let them = !us;
    let occupied = board.occupied();
    let friendly = board.side(us);
    let enemy = board.side(them);
    let targets = if captures_only { enemy } else { !friendly };

    for from in board.pieces_of(us, PieceKind::Knight) {
        for to in knight_attacks(from) & targets {
            list.push(Move::new(from, to));
        }
    }
    for from in board.pieces_of(us, PieceKind::Bishop) {
        for to in bishop_attacks(from, occupied) & targets {
            list.push(Move::new(from, to));
        }
    }
    for from in board.pieces_of(us, PieceKind::Rook) {
        for to in rook_attacks(from, occupied) & targets {
            list.push(Move::new(from, to));
        }
    }
    for from in board.pieces_of(us, PieceKind::Queen) {
        for to in (bishop_attacks(from, occupied) | rook_attacks(from, occupied)) & targets {
            list.push(Move::new(from, to));
        }
    }

    let king = board.king_square(us);
    for to in king_attacks(king) & targets {
        list.push(Move::new(king, to));
    }
    if !captures_only {
        castling_moves(board, us, occupied, list);
    }

    pawn_moves(board, us, captures_only, occupied, enemy, list);
}

fn pawn_moves(
    board: &Board,
    us: Color,
    captures_only: bool,
    occupied: Bitboard,
    enemy: Bitboard,
    list: &mut MoveList,
) {
    let dir = us.pawn_direction();
    let (start_rank, promo_rank) = match us {
        Color::White => (Rank::R2, Rank::R8),
        Color::Black => (Rank::R7, Rank::R1),
    };

    for from in board.pieces_of(us, PieceKind::Pawn) {
        // Pushes. A push onto the promotion rank is generated even in
        // captures-only mode; quiescence examines promotions.
        if let Some(one) = from.offset(0, dir)
            && !occupied.contains(one)
        {
            if one.rank() == promo_rank {
                for promo in Promotion::ALL {
                    list.push(Move::promotion(from, one, promo));
                }
            } else if !captures_only {
                list.push(Move::new(from, one));
                if from.rank() == start_rank
                    && let Some(two) = one.offset(0, dir)
                    && !occupied.contains(two)
                {
                    list.push(Move::new(from, two));
                }
            }
        }

        for to in pawn_attacks(us, from) & enemy {
            if to.rank() == promo_rank {
                for promo in Promotion::ALL {
                    list.push(Move::promotion(from, to, promo));
                }
            } else {
                list.push(Move::new(from, to));
            }
        }

        if let Some(ep) = board.en_passant()
            && pawn_attacks(us, from).contains(ep)
        {
            list.push(Move::en_passant(from, ep));
        }
    }
}

/// Castling moves that pass the cheap pre-checks.
///
/// The king's destination square is vetted by the generic legality filter;
/// here we require the rights, an empty path, no current check, and an
/// unattacked crossing square.
fn castling_moves(board: &Board, us: Color, occupied: Bitboard, list: &mut MoveList) {
    if board.in_check() {
        return;
    }
    let them = !us;

    let (king_from, kingside_to, queenside_to) = match us {
        Color::White => (Square::E1, Square::G1, Square::C1),
        Color::Black => (Square::E8, Square::G8, Square::C8),
    };
    let (kingside_path, kingside_cross) = match us {
        Color::White => (Bitboard::EMPTY.with(Square::F1).with(Square::G1), Square::F1),
        Color::Black => (Bitboard::EMPTY.with(Square::F8).with(Square::G8), Square::F8),
    };
    let (queenside_path, queenside_cross) = match us {
        Color::White => (
            Bitboard::EMPTY.with(Square::D1).with(Square::C1).with(Square::B1),
            Square::D1,
        ),
        Color::Black => (
            Bitboard::EMPTY.with(Square::D8).with(Square::C8).with(Square::B8),
            Square::D8,
        ),
    };

    if board.castling().kingside(us)
        && (occupied & kingside_path).is_empty()
        && !board.is_square_attacked(kingside_cross, them)
    {
        list.push(Move::castle(king_from, kingside_to));
    }
    if board.castling().queenside(us)
        && (occupied & queenside_path).is_empty()
        && !board.is_square_attacked(queenside_cross, them)
    {
        list.push(Move::castle(king_from, queenside_to));
    }
}
