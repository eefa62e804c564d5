//! Board state with mutate-and-undo move application.
//!
//! The search mutates one board down the recursion and undoes on the way
//! back up; every `make_move` returns the `Undo` record that restores the
//! irreversible state (captures, castling rights, en passant, clocks, hash).

use std::fmt;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::castling::CastleRights;
use crate::color::Color;
use crate::fen::STARTING_FEN;
use crate::moves::{Move, MoveKind};
use crate::piece::{Piece, PieceKind};
use crate::square::{Rank, Square};
use crate::zobrist;

/// State needed to reverse a [`Board::make_move`].
#[derive(Debug, Clone, Copy)]
pub struct Undo {
    captured: Option<PieceKind>,
    castling: CastleRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    hash: u64,
}

/// State needed to reverse a [`Board::make_null_move`].
#[derive(Debug, Clone, Copy)]
pub struct NullUndo {
    en_passant: Option<Square>,
    halfmove_clock: u16,
    hash: u64,
}

/// Complete position state plus the hash history for repetition detection.
#[derive(Clone, Debug)]
pub struct Board {
    pieces: [Bitboard; PieceKind::COUNT],
    sides: [Bitboard; Color::COUNT],
    side_to_move: Color,
    castling: CastleRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
    hash: u64,
    /// Hashes of the positions before each move still on the make stack.
    history: Vec<u64>,
}

impl Board {
    /// The standard starting position.
    pub fn starting_position() -> Board {
        match STARTING_FEN.parse() {
            Ok(board) => board,
            Err(_) => unreachable!("starting FEN is valid"),
        }
    }

    pub(crate) fn from_parts(
        pieces: [Bitboard; PieceKind::COUNT],
        sides: [Bitboard; Color::COUNT],
        side_to_move: Color,
        castling: CastleRights,
        en_passant: Option<Square>,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) -> Board {
        let mut board = Board {
            pieces,
            sides,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            hash: 0,
            history: Vec::with_capacity(128),
        };
        board.hash = zobrist::hash_board(&board);
        board
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// All squares holding a piece of `kind` (either color).
    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()]
    }

    /// All squares held by `color`.
    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    /// All squares holding a piece of `kind` and `color`.
    #[inline]
    pub fn pieces_of(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()] & self.sides[color.index()]
    }

    /// All occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.sides[0] | self.sides[1]
    }

    /// The piece kind on `sq`, if any.
    pub fn piece_on(&self, sq: Square) -> Option<PieceKind> {
        for kind in PieceKind::ALL {
            if self.pieces[kind.index()].contains(sq) {
                return Some(kind);
            }
        }
        None
    }

    /// The colored piece on `sq`, if any.
    pub fn colored_piece_on(&self, sq: Square) -> Option<Piece> {
        let kind = self.piece_on(sq)?;
        let color = if self.sides[Color::White.index()].contains(sq) {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, kind))
    }

    /// Which side moves next.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Current castling rights.
    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    /// En passant target square, if the last move was a double pawn push.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Halfmove clock for the fifty-move rule.
    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Fullmove number (starts at 1, incremented after Black moves).
    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Zobrist hash of the position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The square of `color`'s king.
    pub fn king_square(&self, color: Color) -> Square {
        match self.pieces_of(color, PieceKind::King).first() {
            Some(sq) => sq,
            None => unreachable!("board has no {color} king"),
        }
    }

    /// `true` if `sq` is attacked by any piece of `by`.
    ///
    /// Reverse lookup: attack patterns are cast from the target square and
    /// intersected with the attacker's pieces of each kind.
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let them = self.side(by);
        let occupied = self.occupied();

        if (knight_attacks(sq) & them & self.pieces(PieceKind::Knight)).any() {
            return true;
        }
        if (king_attacks(sq) & them & self.pieces(PieceKind::King)).any() {
            return true;
        }
        // A pawn of `by` attacks `sq` iff a pawn of the other color on `sq`
        // would attack the pawn's square.
        if (pawn_attacks(!by, sq) & them & self.pieces(PieceKind::Pawn)).any() {
            return true;
        }

        let rooks_queens = (self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen)) & them;
        if (rook_attacks(sq, occupied) & rooks_queens).any() {
            return true;
        }

        let bishops_queens = (self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen)) & them;
        if (bishop_attacks(sq, occupied) & bishops_queens).any() {
            return true;
        }

        false
    }

    /// `true` if the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.is_square_attacked(self.king_square(self.side_to_move), !self.side_to_move)
    }

    /// `true` if `color` has any piece besides pawns and the king.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let non_pawn = self.pieces(PieceKind::Knight)
            | self.pieces(PieceKind::Bishop)
            | self.pieces(PieceKind::Rook)
            | self.pieces(PieceKind::Queen);
        (non_pawn & self.side(color)).any()
    }

    /// `true` if neither side can possibly deliver mate.
    ///
    /// Covers K vs K, K+minor vs K, and same-colored single bishops.
    pub fn is_insufficient_material(&self) -> bool {
        let majors_or_pawns = self.pieces(PieceKind::Pawn)
            | self.pieces(PieceKind::Rook)
            | self.pieces(PieceKind::Queen);
        if majors_or_pawns.any() {
            return false;
        }

        let knights = self.pieces(PieceKind::Knight);
        let bishops = self.pieces(PieceKind::Bishop);
        if (knights | bishops).count() <= 1 {
            return true;
        }

        if knights.any() {
            return false;
        }

        // Only bishops remain: drawn when one per side and both on the same
        // square color.
        let white_bishops = bishops & self.side(Color::White);
        let black_bishops = bishops & self.side(Color::Black);
        white_bishops.count() == 1
            && black_bishops.count() == 1
            && ((bishops & Bitboard::DARK_SQUARES) == bishops
                || (bishops & Bitboard::LIGHT_SQUARES) == bishops)
    }

    /// `true` if the current position occurred before since the last
    /// irreversible move.
    pub fn is_repetition(&self) -> bool {
        self.history
            .iter()
            .rev()
            .take(self.halfmove_clock as usize)
            .any(|&h| h == self.hash)
    }

    // ── Move application ────────────────────────────────────────────────────

    /// Flip a piece's presence on `sq`, updating bitboards and hash together.
    #[inline]
    fn toggle_piece(&mut self, sq: Square, kind: PieceKind, color: Color) {
        let bb = sq.bitboard();
        self.pieces[kind.index()] ^= bb;
        self.sides[color.index()] ^= bb;
        self.hash ^= zobrist::PIECE_SQUARE[Piece::new(color, kind).index()][sq.index()];
    }

    /// Rook relocation for a castling move, keyed by the king's destination.
    fn castle_rook_squares(king_to: Square) -> (Square, Square) {
        match king_to {
            Square::G1 => (Square::H1, Square::F1),
            Square::C1 => (Square::A1, Square::D1),
            Square::G8 => (Square::H8, Square::F8),
            Square::C8 => (Square::A8, Square::D8),
            _ => unreachable!("castle destination {king_to} is not a castling square"),
        }
    }

    /// Apply a move. The caller must pass a legal move for this position.
    ///
    /// Returns the [`Undo`] record for the matching [`Board::unmake_move`].
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let us = self.side_to_move;
        let them = !us;
        let from = mv.from();
        let to = mv.to();

        let mut undo = Undo {
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        };

        self.history.push(self.hash);

        let moving = match self.piece_on(from) {
            Some(kind) => kind,
            None => unreachable!("make_move: no piece on {from}"),
        };

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= zobrist::EN_PASSANT_FILE[ep.file().index()];
        }

        self.halfmove_clock += 1;
        if moving == PieceKind::Pawn {
            self.halfmove_clock = 0;
        }

        match mv.kind() {
            MoveKind::Normal | MoveKind::Promotion => {
                if let Some(captured) = self.piece_on(to) {
                    self.toggle_piece(to, captured, them);
                    undo.captured = Some(captured);
                    self.halfmove_clock = 0;
                }
                self.toggle_piece(from, moving, us);
                let placed = match mv.promotion_piece() {
                    Some(promo) => promo.kind(),
                    None => moving,
                };
                self.toggle_piece(to, placed, us);

                if moving == PieceKind::Pawn && from.rank_distance(to) == 2 {
                    let mid = (from.rank().index() + to.rank().index()) / 2;
                    let ep = Square::new(from.file(), Rank::ALL[mid]);
                    self.en_passant = Some(ep);
                    self.hash ^= zobrist::EN_PASSANT_FILE[ep.file().index()];
                }
            }
            MoveKind::EnPassant => {
                // The captured pawn sits beside the moving pawn, on the
                // destination file.
                let captured_sq = Square::new(to.file(), from.rank());
                self.toggle_piece(captured_sq, PieceKind::Pawn, them);
                undo.captured = Some(PieceKind::Pawn);
                self.toggle_piece(from, PieceKind::Pawn, us);
                self.toggle_piece(to, PieceKind::Pawn, us);
            }
            MoveKind::Castle => {
                self.toggle_piece(from, PieceKind::King, us);
                self.toggle_piece(to, PieceKind::King, us);
                let (rook_from, rook_to) = Self::castle_rook_squares(to);
                self.toggle_piece(rook_from, PieceKind::Rook, us);
                self.toggle_piece(rook_to, PieceKind::Rook, us);
            }
        }

        self.hash ^= zobrist::CASTLING[self.castling.bits() as usize];
        self.castling = self.castling.after_touching(from).after_touching(to);
        self.hash ^= zobrist::CASTLING[self.castling.bits() as usize];

        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;
        self.hash ^= zobrist::SIDE_TO_MOVE;

        undo
    }

    /// Reverse the most recent [`Board::make_move`].
    ///
    /// Must be called with the same move and the `Undo` it returned; makes
    /// and unmakes must nest strictly.
    pub fn unmake_move(&mut self, mv: Move, undo: Undo) {
        let them = self.side_to_move;
        let us = !them;
        self.side_to_move = us;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }

        let from = mv.from();
        let to = mv.to();

        match mv.kind() {
            MoveKind::Normal => {
                let moving = match self.piece_on(to) {
                    Some(kind) => kind,
                    None => unreachable!("unmake_move: no piece on {to}"),
                };
                self.toggle_piece(to, moving, us);
                self.toggle_piece(from, moving, us);
                if let Some(captured) = undo.captured {
                    self.toggle_piece(to, captured, them);
                }
            }
            MoveKind::Promotion => {
                let placed = match mv.promotion_piece() {
                    Some(promo) => promo.kind(),
                    None => unreachable!("promotion move without promotion piece"),
                };
                self.toggle_piece(to, placed, us);
                self.toggle_piece(from, PieceKind::Pawn, us);
                if let Some(captured) = undo.captured {
                    self.toggle_piece(to, captured, them);
                }
            }
            MoveKind::EnPassant => {
                self.toggle_piece(to, PieceKind::Pawn, us);
                self.toggle_piece(from, PieceKind::Pawn, us);
                self.toggle_piece(Square::new(to.file(), from.rank()), PieceKind::Pawn, them);
            }
            MoveKind::Castle => {
                self.toggle_piece(to, PieceKind::King, us);
                self.toggle_piece(from, PieceKind::King, us);
                let (rook_from, rook_to) = Self::castle_rook_squares(to);
                self.toggle_piece(rook_to, PieceKind::Rook, us);
                self.toggle_piece(rook_from, PieceKind::Rook, us);
            }
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
        self.history.pop();
    }

    /// Pass the move to the opponent without touching any pieces.
    pub fn make_null_move(&mut self) -> NullUndo {
        let undo = NullUndo {
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        };
        self.history.push(self.hash);

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= zobrist::EN_PASSANT_FILE[ep.file().index()];
        }
        self.halfmove_clock += 1;
        self.side_to_move = !self.side_to_move;
        self.hash ^= zobrist::SIDE_TO_MOVE;

        undo
    }

    /// Reverse the most recent [`Board::make_null_move`].
    pub fn unmake_null_move(&mut self, undo: NullUndo) {
        self.side_to_move = !self.side_to_move;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
        self.history.pop();
    }

    /// The same position with colors swapped and the board mirrored
    /// vertically. The evaluation of the flipped position must be the
    /// negation of the original's.
    pub fn color_flipped(&self) -> Board {
        let mut pieces = [Bitboard::EMPTY; PieceKind::COUNT];
        let mut sides = [Bitboard::EMPTY; Color::COUNT];

        for color in Color::ALL {
            for kind in PieceKind::ALL {
                for sq in self.pieces_of(color, kind) {
                    let mirrored = sq.mirror().bitboard();
                    pieces[kind.index()] |= mirrored;
                    sides[(!color).index()] |= mirrored;
                }
            }
        }

        Board::from_parts(
            pieces,
            sides,
            !self.side_to_move,
            self.castling.color_flipped(),
            self.en_passant.map(Square::mirror),
            self.halfmove_clock,
            self.fullmove_number,
        )
    }
}

impl fmt::Display for Board {
    /// Renders the FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}
