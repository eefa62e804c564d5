//! UCI command parsing.

use castellan_core::{Board, Move};

use crate::error::UciError;

/// Clock and limit parameters of the `go` command. All optional; a bare
/// `go` searches to the default depth ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoParams {
    /// White's remaining time in milliseconds.
    pub wtime: Option<u64>,
    /// Black's remaining time in milliseconds.
    pub btime: Option<u64>,
    /// White's increment per move in milliseconds.
    pub winc: Option<u64>,
    /// Black's increment per move in milliseconds.
    pub binc: Option<u64>,
    /// Moves until the next time control.
    pub movestogo: Option<u32>,
    /// Fixed search depth.
    pub depth: Option<u8>,
    /// Fixed search time in milliseconds.
    pub movetime: Option<u64>,
    /// Search until `stop`.
    pub infinite: bool,
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` — identify the engine.
    Uci,
    /// `isready` — synchronization ping.
    IsReady,
    /// `ucinewgame` — reset per-game engine state.
    UciNewGame,
    /// `position` — the board after applying any listed moves.
    Position(Box<Board>),
    /// `go` — start searching.
    Go(GoParams),
    /// `stop` — halt the running search.
    Stop,
    /// `quit` — exit.
    Quit,
    /// Anything unrecognized; ignored per protocol convention.
    Unknown(String),
}

/// Parse one line of UCI input.
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match first {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        other => Ok(Command::Unknown(other.to_string())),
    }
}

/// `position startpos|fen <fen> [moves <move>...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let (mut board, rest) = match tokens.first() {
        Some(&"startpos") => (Board::starting_position(), &tokens[1..]),
        Some(&"fen") => {
            // A FEN is six space-separated fields.
            if tokens.len() < 7 {
                return Err(UciError::InvalidFen {
                    fen: tokens[1..].join(" "),
                });
            }
            let fen = tokens[1..7].join(" ");
            let board: Board = fen
                .parse()
                .map_err(|_| UciError::InvalidFen { fen: fen.clone() })?;
            (board, &tokens[7..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    if let Some(&"moves") = rest.first() {
        for token in &rest[1..] {
            let mv = Move::from_uci(token, &board).ok_or_else(|| UciError::InvalidMove {
                uci_move: token.to_string(),
            })?;
            board.make_move(mv);
        }
    }

    Ok(Command::Position(Box::new(board)))
}

fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();
    let mut iter = tokens.iter();

    while let Some(&keyword) = iter.next() {
        match keyword {
            "infinite" => params.infinite = true,
            "wtime" => params.wtime = Some(parse_number(&mut iter, "wtime")?),
            "btime" => params.btime = Some(parse_number(&mut iter, "btime")?),
            "winc" => params.winc = Some(parse_number(&mut iter, "winc")?),
            "binc" => params.binc = Some(parse_number(&mut iter, "binc")?),
            "movestogo" => params.movestogo = Some(parse_number(&mut iter, "movestogo")? as u32),
            "depth" => params.depth = Some(parse_number(&mut iter, "depth")?.min(255) as u8),
            "movetime" => params.movetime = Some(parse_number(&mut iter, "movetime")?),
            // Unknown go options are skipped along with their value.
            _ => {}
        }
    }

    Ok(Command::Go(params))
}

fn parse_number<'a>(
    iter: &mut std::slice::Iter<'_, &'a str>,
    field: &'static str,
) -> Result<u64, UciError> {
    let token = iter.next().ok_or(UciError::InvalidNumber {
        field,
        value: String::new(),
    })?;
    token.parse::<i64>().map(|n| n.max(0) as u64).map_err(|_| {
        UciError::InvalidNumber {
            field,
            value: token.to_string(),
        }
    })
}
