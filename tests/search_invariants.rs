use arrocco::board::{Board, START_FEN};
use arrocco::eval::{evaluate, Score};
use arrocco::moves::{move_to_uci, Move};
use arrocco::search::{Search, SearchParams, DRAW, INFINITE, MATE, MATE_BOUND};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

fn search_for(fen: &str) -> Search {
    Search::new(Board::from_fen(fen).expect("Invalid FEN"), 4, SearchParams::default())
}

fn find_mate_in_n(fen: &str, n: u8, expected_move: Option<&str>) {
    // mate in n takes 2n-1 plies; one more for margin
    let depth = n * 2;
    let mut search = search_for(fen);
    let best_move = search.think(depth, 0, false).expect("a move");
    let score = search.info().score;

    assert_eq!(score, MATE - (2 * n as Score - 1), "no mate in {} from {}", n, fen);
    if let Some(exp) = expected_move {
        assert_eq!(move_to_uci(best_move), exp, "Failed to find specific mate move");
    }
}

#[test]
fn mate_in_1_simple() {
    arrocco::init();
    // 1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#
    find_mate_in_n(
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        1,
        Some("h5f7"),
    );
}

#[test]
fn mate_in_2_rook_ladder() {
    // 1. Rb7 K moves 2. Ra8#
    find_mate_in_n("4k3/8/8/8/8/8/R7/1R4K1 w - - 0 1", 2, None);
}

#[test]
fn checkmated_and_stalemated_roots() {
    let mut mated = search_for("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
    assert_eq!(mated.think(3, 0, false), None);
    assert_eq!(mated.info().score, -MATE);
    assert!(mated.info().pv.is_empty());

    let mut stalemate = search_for("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert_eq!(stalemate.think(3, 0, false), None);
    assert_eq!(stalemate.info().score, DRAW);
}

#[test]
fn mate_scores_sit_beyond_the_mate_bound() {
    let mut search = search_for("4k3/8/8/8/8/8/R7/1R4K1 w - - 0 1");
    search.think(4, 0, false);
    assert!(search.info().score >= MATE_BOUND);
}

#[test]
fn sanity_check_startpos() {
    let mut search = search_for(START_FEN);
    search.think(4, 0, false).expect("a move");
    let score = search.info().score;
    assert!(
        score > -100 && score < 100,
        "Startpos score {} outside reasonable draw range",
        score
    );
}

// Plain negamax with the same leaf rules, no pruning and no cache
fn naive(board: &mut Board, depth: u32, ply: usize) -> Score {
    if ply > 0 && board.is_draw() {
        return DRAW;
    }
    if depth == 0 {
        return naive_quiescence(board);
    }
    let moves = board.generate_moves();
    if moves.is_empty() {
        return if board.is_in_check(board.side()) { -MATE + ply as Score } else { DRAW };
    }
    let mut best = -INFINITE;
    for mv in moves {
        board.make_move(mv);
        best = best.max(-naive(board, depth - 1, ply + 1));
        board.unmake_move(mv);
    }
    best
}

fn naive_quiescence(board: &mut Board) -> Score {
    let mut best = evaluate(board);
    for mv in board.generate_captures() {
        board.make_move(mv);
        best = best.max(-naive_quiescence(board));
        board.unmake_move(mv);
    }
    best
}

fn check_window(fen: &str, depth: u8, alpha: Score, beta: Score, exact: Score) {
    let mut search = search_for(fen);
    let s = search.search_window(depth, alpha, beta);
    if s >= beta {
        assert!(exact >= beta, "{} fail-high {} but value {} < beta {}", fen, s, exact, beta);
    } else if s <= alpha {
        assert!(exact <= alpha, "{} fail-low {} but value {} > alpha {}", fen, s, exact, alpha);
    } else {
        assert_eq!(s, exact, "{} window ({}, {})", fen, alpha, beta);
    }
}

#[test]
fn window_results_bound_the_minimax_value() {
    let cases = [
        (START_FEN, 3u8),
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 3),
        ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", 2),
        ("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", 3),
    ];
    for (fen, depth) in cases {
        let mut board = Board::from_fen(fen).unwrap();
        let exact = naive(&mut board, depth as u32, 0);

        let mut full = search_for(fen);
        assert_eq!(full.search_window(depth, -INFINITE, INFINITE), exact, "{}", fen);

        check_window(fen, depth, exact - 1, exact + 1, exact);
        check_window(fen, depth, exact + 10, exact + 100, exact);
        check_window(fen, depth, exact - 100, exact - 10, exact);
        check_window(fen, depth, exact - 5, exact + 5, exact);
    }
}

#[test]
fn interrupted_search_keeps_last_completed_depth() {
    for d in 2..=4u8 {
        let mut reference = search_for(START_FEN);
        let expected = reference.think(d, 0, false);

        let mut interrupted = search_for(START_FEN);
        let stop = interrupted.stop_handle();
        interrupted.set_on_iteration(Box::new(move |info| {
            if info.depth >= d {
                stop.store(true, Ordering::SeqCst);
            }
        }));
        let got = interrupted.think(d + 3, 0, false);

        assert_eq!(got, expected, "depth {}", d);
        assert_eq!(interrupted.info().depth, d);
        assert_eq!(interrupted.info().score, reference.info().score);
        assert_eq!(interrupted.info().pv, reference.info().pv);
    }
}

#[test]
fn iterations_are_reported_in_order() {
    let seen: Arc<Mutex<Vec<(u8, Option<Move>)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut search = search_for("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    search.set_on_iteration(Box::new(move |info| {
        sink.lock().unwrap().push((info.depth, info.best_move()));
    }));
    let best = search.think(4, 0, false);

    let seen = seen.lock().unwrap();
    let depths: Vec<u8> = seen.iter().map(|&(d, _)| d).collect();
    assert_eq!(depths, vec![1, 2, 3, 4]);
    assert!(seen.iter().all(|&(_, mv)| mv.is_some()));
    assert_eq!(seen.last().and_then(|&(_, mv)| mv), best);
}

#[test]
fn time_limit_is_respected() {
    let mut search = search_for(START_FEN);
    let start = std::time::Instant::now();
    let best = search.think(64, 200, false);
    assert!(best.is_some());
    assert!(start.elapsed().as_millis() < 2_000);
}
