//! Position oracle for castellan: board state, move application/undo,
//! legal move generation, and the game-rule queries the search consults.

mod attacks;
mod bitboard;
mod board;
mod castling;
mod color;
mod error;
mod fen;
mod movegen;
mod moves;
mod perft;
mod piece;
mod square;
mod zobrist;

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attack_span, pawn_attacks, queen_attacks,
    rook_attacks,
};
pub use bitboard::Bitboard;
pub use board::{Board, NullUndo, Undo};
pub use castling::CastleRights;
pub use color::Color;
pub use error::FenError;
pub use fen::STARTING_FEN;
pub use movegen::{generate_captures, generate_moves, MoveList};
pub use moves::{Move, MoveKind, Promotion};
pub use perft::perft;
pub use piece::{Piece, PieceKind};
pub use square::{File, Rank, Square};
