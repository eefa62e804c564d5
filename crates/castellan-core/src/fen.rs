//! FEN parsing and printing.

use std::str::FromStr;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castling::CastleRights;
use crate::color::Color;
use crate::error::FenError;
use crate::piece::{Piece, PieceKind};
use crate::square::{File, Rank, Square};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub(crate) fn parse(fen: &str) -> Result<Board, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(FenError::MissingFields(fields.len()));
    }

    let mut pieces = [Bitboard::EMPTY; PieceKind::COUNT];
    let mut sides = [Bitboard::EMPTY; Color::COUNT];

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadPlacement(fields[0].to_string()));
    }

    for (row, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - row; // FEN lists rank 8 first
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
                continue;
            }
            let piece = Piece::from_fen_char(c).ok_or(FenError::BadPiece(c))?;
            if file >= 8 {
                return Err(FenError::BadPlacement(fields[0].to_string()));
            }
            let sq = Square::new(
                File::ALL[file],
                Rank::ALL[rank],
            );
            pieces[piece.kind.index()] |= sq.bitboard();
            sides[piece.color.index()] |= sq.bitboard();
            file += 1;
        }
        if file != 8 {
            return Err(FenError::BadPlacement(fields[0].to_string()));
        }
    }

    for color in Color::ALL {
        if (pieces[PieceKind::King.index()] & sides[color.index()]).count() != 1 {
            return Err(FenError::BadKingCount);
        }
    }

    let side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::BadSideToMove(other.to_string())),
    };

    let mut castling = CastleRights::NONE;
    if fields[2] != "-" {
        let mut bits = 0u8;
        for c in fields[2].chars() {
            bits |= match c {
                'K' => 1,
                'Q' => 2,
                'k' => 4,
                'q' => 8,
                _ => return Err(FenError::BadCastling(fields[2].to_string())),
            };
        }
        castling = CastleRights::from_bits(bits);
    }

    let en_passant = match fields[3] {
        "-" => None,
        s => Some(Square::from_uci(s).ok_or_else(|| FenError::BadEnPassant(s.to_string()))?),
    };

    let halfmove_clock = match fields.get(4) {
        Some(s) => s
            .parse::<u16>()
            .map_err(|_| FenError::BadCounter(s.to_string()))?,
        None => 0,
    };
    let fullmove_number = match fields.get(5) {
        Some(s) => s
            .parse::<u16>()
            .map_err(|_| FenError::BadCounter(s.to_string()))?
            .max(1),
        None => 1,
    };

    Ok(Board::from_parts(
        pieces,
        sides,
        side_to_move,
        castling,
        en_passant,
        halfmove_clock,
        fullmove_number,
    ))
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Board, FenError> {
        parse(s)
    }
}

impl Board {
    /// Render the position as a FEN string.
    pub fn fen(&self) -> String {
        let mut out = String::with_capacity(80);

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::new(File::ALL[file], Rank::ALL[rank]);
                match self.colored_piece_on(sq) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from_digit(empty, 10).unwrap_or('0'));
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from_digit(empty, 10).unwrap_or('0'));
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        });
        out.push(' ');
        out.push_str(&self.castling().to_string());
        out.push(' ');
        match self.en_passant() {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }
        out.push_str(&format!(
            " {} {}",
            self.halfmove_clock(),
            self.fullmove_number()
        ));

        out
    }
}
