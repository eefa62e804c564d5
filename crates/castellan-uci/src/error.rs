//! UCI protocol errors.

/// Errors that can occur while handling UCI input.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen`.
    #[error("malformed position command: expected startpos or fen")]
    MalformedPosition,

    /// A FEN string in a `position` command failed to parse.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The offending FEN string.
        fen: String,
    },

    /// A move token in a `position` command could not be applied.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The offending move string.
        uci_move: String,
    },

    /// A numeric argument failed to parse.
    #[error("invalid number for {field}: {value}")]
    InvalidNumber {
        /// Which `go` field was malformed.
        field: &'static str,
        /// The offending token.
        value: String,
    },

    /// Reading from stdin failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying error.
        #[from]
        source: std::io::Error,
    },
}
