//! Per-move time budgeting.

/// Fixed allowance for protocol and I/O latency, subtracted up front.
const MOVE_OVERHEAD_MS: u64 = 55;

/// Smallest budget worth searching with.
const MIN_SEARCH_MS: u64 = 50;

/// Assumed moves remaining when the clock gives no `movestogo`.
const DEFAULT_HORIZON: u32 = 30;

/// Moves out of book over which the front-loading factor tapers off.
const FRONTLOAD_MOVES: u32 = 10;

/// Compute the time budget for one move, in milliseconds.
///
/// The remaining time (minus a safety overhead) is spread over the expected
/// number of moves, with most of the increment added back. The first few
/// moves after leaving the opening book get up to twice the baseline —
/// early middlegame decisions shape the whole game — tapering linearly to
/// 1x after [`FRONTLOAD_MOVES`] moves. The result is floored at
/// [`MIN_SEARCH_MS`] and never exceeds the usable remainder.
pub fn time_for_move(
    time_left_ms: u64,
    increment_ms: u64,
    moves_to_go: u32,
    moves_out_of_book: u32,
) -> u64 {
    let usable = time_left_ms.saturating_sub(MOVE_OVERHEAD_MS).max(1);
    let horizon = u64::from(if moves_to_go == 0 {
        DEFAULT_HORIZON
    } else {
        moves_to_go
    });

    let target = usable / horizon + increment_ms * 3 / 4;

    let frontload = u64::from(2 * FRONTLOAD_MOVES - moves_out_of_book.min(FRONTLOAD_MOVES));
    let budget = target * frontload / u64::from(FRONTLOAD_MOVES);

    budget.clamp(MIN_SEARCH_MS.min(usable), usable)
}

#[cfg(test)]
mod tests {
    use super::time_for_move;

    #[test]
    fn more_moves_to_go_means_less_time() {
        let few = time_for_move(60_000, 0, 10, 20);
        let many = time_for_move(60_000, 0, 40, 20);
        assert!(few > many);
    }

    #[test]
    fn budget_shrinks_with_remaining_time() {
        let long = time_for_move(120_000, 0, 30, 20);
        let short = time_for_move(6_000, 0, 30, 20);
        assert!(long > short);
    }

    #[test]
    fn fresh_out_of_book_gets_double_time() {
        let early = time_for_move(60_000, 0, 30, 0);
        let settled = time_for_move(60_000, 0, 30, 10);
        assert_eq!(early, settled * 2);
    }

    #[test]
    fn frontload_tapers_linearly() {
        let mid = time_for_move(60_000, 0, 30, 5);
        let settled = time_for_move(60_000, 0, 30, 10);
        assert!(mid > settled);
        assert!(mid < settled * 2);
        // Past the taper the factor stays at 1x.
        assert_eq!(settled, time_for_move(60_000, 0, 30, 25));
    }

    #[test]
    fn increment_extends_the_budget() {
        let without = time_for_move(60_000, 0, 30, 20);
        let with = time_for_move(60_000, 2_000, 30, 20);
        assert!(with > without);
    }

    #[test]
    fn floored_at_minimum() {
        assert_eq!(time_for_move(10_000, 0, 1_000, 20), 50);
    }

    #[test]
    fn never_exceeds_usable_time() {
        // One move to go with front-loading would overshoot; the cap holds.
        let budget = time_for_move(1_000, 0, 1, 0);
        assert!(budget <= 945);

        // Nearly flagged: the budget collapses to what is actually left.
        let desperate = time_for_move(30, 0, 1, 0);
        assert!(desperate <= 30);
    }

    #[test]
    fn zero_moves_to_go_uses_default_horizon() {
        assert_eq!(
            time_for_move(60_000, 0, 0, 20),
            time_for_move(60_000, 0, 30, 20)
        );
    }
}
