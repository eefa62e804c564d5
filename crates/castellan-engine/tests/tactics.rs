//! End-to-end search scenarios: tactics, clock handling, and cancellation.

use castellan_core::{generate_moves, Board};
use castellan_engine::search::negamax::MATE_THRESHOLD;
use castellan_engine::{EvaluationWeights, SearchParameters, Searcher, StopToken};

fn engine() -> Searcher {
    Searcher::new(EvaluationWeights::default(), SearchParameters::default())
}

#[test]
fn startpos_under_a_second_plays_an_opening_move() {
    let mut searcher = engine();
    searcher.set_position(Board::starting_position());

    let outcome = searcher.iterative_deepening(1_000, 0, 1, &StopToken::new());

    let legal = generate_moves(&Board::starting_position());
    assert!(
        legal.contains(&outcome.best_move),
        "{} is not a legal opening move",
        outcome.best_move
    );
    assert!(outcome.nodes > 0);
    assert!(outcome.depth >= 1);
}

#[test]
fn finds_mate_in_two() {
    // Lichess mate-in-2 study position; black mates starting with Rf4.
    let mut searcher = engine();
    searcher.set_position(
        "4rr1k/1p4bp/2p3p1/p7/P2pBQn1/1P3nqN/6P1/B3RR1K b - - 0 33"
            .parse()
            .unwrap(),
    );

    let outcome = searcher.search_to_depth(5, &StopToken::new());

    assert_eq!(outcome.best_move.to_uci(), "f8f4");
    assert!(
        outcome.best_score > MATE_THRESHOLD,
        "mate-in-2 should report a forced mate, got {}",
        outcome.best_score
    );
}

#[test]
fn mate_in_one_found_on_the_clock() {
    let mut searcher = engine();
    searcher.set_position(
        "4r2k/1p3rbp/2p1N1p1/p3n3/P2NB1nq/1P6/4R1P1/B1Q2RK1 b - - 4 32"
            .parse()
            .unwrap(),
    );

    let outcome = searcher.iterative_deepening(1_000, 0, 1, &StopToken::new());

    assert_eq!(outcome.best_move.to_uci(), "h4h2");
    assert!(outcome.best_score > MATE_THRESHOLD);
}

#[test]
fn sole_legal_move_is_instant() {
    let mut searcher = engine();
    searcher.set_position("6k1/5R2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap());

    let outcome = searcher.iterative_deepening(500, 0, 1, &StopToken::new());

    assert_eq!(outcome.best_move.to_uci(), "g8h8");
}

#[test]
fn smaller_budgets_do_not_reach_deeper() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    let mut generous = engine();
    generous.set_position(fen.parse().unwrap());
    let slow = generous.iterative_deepening(2_000, 0, 1, &StopToken::new());

    let mut rushed = engine();
    rushed.set_position(fen.parse().unwrap());
    let fast = rushed.iterative_deepening(150, 0, 1, &StopToken::new());

    // Depth under a strict clock is non-increasing in expectation; one ply
    // of slack absorbs scheduler noise.
    assert!(
        fast.depth <= slow.depth + 1,
        "150ms reached depth {}, 2000ms only {}",
        fast.depth,
        slow.depth
    );
    assert!(!fast.best_move.is_null());
}

#[test]
fn stop_token_cuts_a_long_search_short() {
    use std::time::{Duration, Instant};

    let mut searcher = engine();
    searcher.set_position(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap(),
    );

    let token = StopToken::new();
    let stopper = {
        let token = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            token.stop();
        })
    };

    let start = Instant::now();
    let outcome = searcher.iterative_deepening(600_000, 0, 1, &token);
    let elapsed = start.elapsed();

    stopper.join().expect("stopper thread");
    assert!(
        elapsed < Duration::from_secs(30),
        "stop token ignored; search ran {elapsed:?}"
    );
    assert!(!outcome.best_move.is_null());
}

#[test]
fn repeated_play_stays_legal() {
    // Play the engine against itself for a few moves; every choice must be
    // legal in the evolving position and the board must stay consistent.
    let mut searcher = engine();
    let mut board = Board::starting_position();

    for _ in 0..6 {
        searcher.set_position(board.clone());
        let outcome = searcher.iterative_deepening(200, 0, 20, &StopToken::new());
        let legal = generate_moves(&board);
        if legal.is_empty() {
            break;
        }
        assert!(
            legal.contains(&outcome.best_move),
            "illegal move {} in position {}",
            outcome.best_move,
            board.fen()
        );
        board.make_move(outcome.best_move);
    }
}
