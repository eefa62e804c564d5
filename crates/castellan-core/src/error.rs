//! Core error types.

/// Errors produced while parsing a FEN string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FenError {
    /// The FEN does not have the required fields.
    #[error("FEN must have at least 4 fields, got {0}")]
    MissingFields(usize),

    /// The piece placement field does not describe 8 ranks of 8 squares.
    #[error("malformed piece placement: {0}")]
    BadPlacement(String),

    /// An unknown piece character appeared in the placement field.
    #[error("unknown piece character: {0}")]
    BadPiece(char),

    /// The side-to-move field is not `w` or `b`.
    #[error("bad side to move: {0}")]
    BadSideToMove(String),

    /// The castling field contains an unknown character.
    #[error("bad castling rights: {0}")]
    BadCastling(String),

    /// The en passant field is not `-` or a square.
    #[error("bad en passant square: {0}")]
    BadEnPassant(String),

    /// A move counter failed to parse.
    #[error("bad move counter: {0}")]
    BadCounter(String),

    /// Each side must have exactly one king.
    #[error("each side needs exactly one king")]
    BadKingCount,
}
