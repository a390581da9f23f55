//! Integration tests for UCI protocol implementation

use arrocco::uci::{process_uci_line, UciEngine};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

fn engine() -> (UciEngine, Receiver<String>) {
    let (tx, rx) = mpsc::channel();
    (UciEngine::new(tx), rx)
}

#[test]
fn test_uci_engine_lifecycle() {
    let (mut engine, _rx) = engine();

    let responses = process_uci_line("uci", &mut engine);
    assert!(responses[0].starts_with("id name arrocco"));
    assert!(responses[1].starts_with("id author"));
    assert!(responses.iter().any(|r| r.starts_with("option name Hash type spin")));
    assert_eq!(responses.last().map(String::as_str), Some("uciok"));

    assert_eq!(process_uci_line("isready", &mut engine), vec!["readyok".to_string()]);

    assert!(process_uci_line("quit", &mut engine).is_empty());
    assert!(!engine.is_running());
}

#[test]
fn test_go_depth_reports_info_then_bestmove() {
    let (mut engine, rx) = engine();

    process_uci_line("position startpos moves e2e4", &mut engine);
    assert!(process_uci_line("go depth 3", &mut engine).is_empty());
    engine.wait_for_search();

    let lines: Vec<String> = rx.try_iter().collect();
    assert_eq!(lines.len(), 4, "{:?}", lines);
    for (i, line) in lines[..3].iter().enumerate() {
        assert!(line.starts_with(&format!("info depth {} seldepth", i + 1)), "{}", line);
        assert!(line.contains(" score cp "));
        assert!(line.contains(" pv "));
    }
    assert!(lines[3].starts_with("bestmove "));
    assert_ne!(lines[3], "bestmove 0000");
}

#[test]
fn test_mate_is_reported_in_moves() {
    let (mut engine, rx) = engine();
    process_uci_line("position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", &mut engine);
    process_uci_line("go depth 2", &mut engine);
    engine.wait_for_search();

    let lines: Vec<String> = rx.try_iter().collect();
    assert!(lines[1].contains("score mate 1"), "{}", lines[1]);
    assert_eq!(lines.last().map(String::as_str), Some("bestmove a1a8"));
}

#[test]
fn test_no_legal_move_gives_null_bestmove() {
    let (mut engine, rx) = engine();
    process_uci_line("position fen 7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", &mut engine);
    process_uci_line("go depth 3", &mut engine);
    engine.wait_for_search();
    let lines: Vec<String> = rx.try_iter().collect();
    assert_eq!(lines.last().map(String::as_str), Some("bestmove 0000"));
}

#[test]
fn test_go_infinite_then_stop() {
    let (mut engine, rx) = engine();
    process_uci_line("position startpos", &mut engine);
    process_uci_line("go infinite", &mut engine);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(process_uci_line("isready", &mut engine), vec!["readyok".to_string()]);
    assert!(!rx.try_iter().any(|l| l.starts_with("bestmove")));

    process_uci_line("stop", &mut engine);
    let lines: Vec<String> = rx.try_iter().collect();
    assert!(lines.last().is_some_and(|l| l.starts_with("bestmove ")), "{:?}", lines);
}

#[test]
fn test_go_with_clock() {
    let (mut engine, rx) = engine();
    process_uci_line("position startpos", &mut engine);
    process_uci_line("go wtime 2000 btime 2000 winc 0 binc 0", &mut engine);
    engine.wait_for_search();
    let lines: Vec<String> = rx.try_iter().collect();
    assert!(lines.last().is_some_and(|l| l.starts_with("bestmove ")));
}

#[test]
fn test_position_and_display() {
    let (mut engine, _rx) = engine();
    process_uci_line("position startpos moves e2e4 c7c5 g1f3", &mut engine);
    let lines = process_uci_line("d", &mut engine);
    assert!(lines
        .iter()
        .any(|l| l == "Fen: rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"));

    // a bad fen leaves an empty board
    process_uci_line("position fen not/a/fen w - - 0 1 moves e2e4", &mut engine);
    assert_eq!(engine.board().occupancy(), 0);
    assert_eq!(engine.board().ply(), 0);

    process_uci_line("ucinewgame", &mut engine);
    assert_eq!(engine.board().to_fen(), arrocco::board::START_FEN);
}

#[test]
fn test_setoption_hash() {
    let (mut engine, _rx) = engine();
    assert!(process_uci_line("setoption name Hash value 8", &mut engine).is_empty());
    assert_eq!(engine.options().hash_mb, 8);

    let replies = process_uci_line("setoption name Hash value 0", &mut engine);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("info string"));
    assert_eq!(engine.options().hash_mb, 8);

    assert!(process_uci_line("setoption name Threads value 4", &mut engine)[0].contains("unknown option"));
}

#[test]
fn test_bad_fen_then_go_answers_null_move() {
    let (mut engine, rx) = engine();
    process_uci_line("position fen 4k3/8/8/3P4/8/8/8/4K3 w - e6 0 1", &mut engine);
    assert_eq!(engine.board().occupancy(), 0);

    process_uci_line("go depth 2", &mut engine);
    engine.wait_for_search();
    let lines: Vec<String> = rx.try_iter().collect();
    assert_eq!(lines.last().map(String::as_str), Some("bestmove 0000"));
}
