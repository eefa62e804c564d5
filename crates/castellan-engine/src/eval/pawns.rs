//! Pawn-structure feature detectors.
//!
//! All detectors are pure bitboard functions; the evaluator weighs the
//! counts. Sign conventions live in the evaluator, not here.

use castellan_core::{pawn_attack_span, Bitboard, Color};

/// For each file, the mask of its neighbouring files.
pub(crate) static ADJACENT_FILES: [Bitboard; 8] = {
    let mut table = [Bitboard::EMPTY; 8];
    let file_a = 0x0101_0101_0101_0101u64;
    let mut f = 0;
    while f < 8 {
        let mut bits = 0u64;
        if f > 0 {
            bits |= file_a << (f - 1);
        }
        if f < 7 {
            bits |= file_a << (f + 1);
        }
        table[f] = Bitboard::new(bits);
        f += 1;
    }
    table
};

/// For each `[color][square]`, the squares ahead of a pawn on its own and
/// adjacent files. A pawn is passed when this mask holds no enemy pawn.
pub(crate) static FRONT_SPAN: [[Bitboard; 64]; 2] = {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let file_a = 0x0101_0101_0101_0101u64;
    let mut sq = 0;
    while sq < 64 {
        let file = sq % 8;
        let rank = sq / 8;

        let mut span = file_a << file;
        if file > 0 {
            span |= file_a << (file - 1);
        }
        if file < 7 {
            span |= file_a << (file + 1);
        }

        // Ranks strictly ahead, from each color's direction of advance.
        let mut white_ranks = 0u64;
        let mut r = rank + 1;
        while r < 8 {
            white_ranks |= 0xFFu64 << (r * 8);
            r += 1;
        }
        let mut black_ranks = 0u64;
        let mut r = 0;
        while r < rank {
            black_ranks |= 0xFFu64 << (r * 8);
            r += 1;
        }

        table[0][sq] = Bitboard::new(span & white_ranks);
        table[1][sq] = Bitboard::new(span & black_ranks);
        sq += 1;
    }
    table
};

/// Pawns with no enemy pawn ahead on their own or adjacent files.
pub fn passed(own: Bitboard, enemy: Bitboard, color: Color) -> Bitboard {
    let mut result = Bitboard::EMPTY;
    for sq in own {
        if (FRONT_SPAN[color.index()][sq.index()] & enemy).is_empty() {
            result = result.with(sq);
        }
    }
    result
}

/// Number of excess pawns per file beyond the first.
pub fn doubled_count(pawns: Bitboard) -> i32 {
    let mut doubled = 0;
    for file_mask in Bitboard::FILES {
        let on_file = (pawns & file_mask).count() as i32;
        if on_file > 1 {
            doubled += on_file - 1;
        }
    }
    doubled
}

/// Pawns alone on their file with no friendly pawn on an adjacent file.
///
/// A doubled pair with no neighbours counts as doubled, not isolated; the
/// two penalties never stack on the same pawns.
pub fn isolated(pawns: Bitboard) -> Bitboard {
    let mut result = Bitboard::EMPTY;
    for sq in pawns {
        let file = sq.file().index();
        let alone_on_file = (pawns & sq.file().mask()).count() == 1;
        if alone_on_file && (pawns & ADJACENT_FILES[file]).is_empty() {
            result = result.with(sq);
        }
    }
    result
}

/// Every square the pawns attack now or could attack after advancing.
pub fn attack_front_span(pawns: Bitboard, color: Color) -> Bitboard {
    let mut fill = pawns;
    match color {
        Color::White => {
            for _ in 0..6 {
                fill |= fill.north();
            }
        }
        Color::Black => {
            for _ in 0..6 {
                fill |= fill.south();
            }
        }
    }
    pawn_attack_span(color, fill)
}

/// Backward pawns: the stop square is covered by an enemy pawn and by no
/// friendly pawn, now or ever.
///
/// `exempt` removes pawns already scored as passed or isolated, so a pawn
/// is never penalised twice.
pub fn backward(own: Bitboard, enemy: Bitboard, color: Color, exempt: Bitboard) -> Bitboard {
    let enemy_attacks = pawn_attack_span(!color, enemy);
    let own_span = attack_front_span(own, color);

    let mut result = Bitboard::EMPTY;
    for sq in own & !exempt {
        let Some(stop) = sq.offset(0, color.pawn_direction()) else {
            continue;
        };
        if enemy_attacks.contains(stop) && !own_span.contains(stop) {
            result = result.with(sq);
        }
    }
    result
}

/// Central-band squares this side's pawns can never defend.
pub fn weak_squares(own_pawns: Bitboard, color: Color) -> Bitboard {
    let band = match color {
        Color::White => Bitboard::RANK_4 | Bitboard::RANK_5 | Bitboard::RANK_6,
        Color::Black => Bitboard::RANK_3 | Bitboard::RANK_4 | Bitboard::RANK_5,
    };
    band & !attack_front_span(own_pawns, color) & !own_pawns
}
