use arrocco::board::Board;
use arrocco::movegen::{MoveGenerator, ScanGenerator, TableGenerator};
use arrocco::moves::move_to_uci;
use arrocco::perft::{divide_with, perft_with};
use pretty_assertions::assert_eq;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};

// (name, fen) pairs exercising pins, en-passant corner cases, castling and promotions
const EDGE_CASES: &[(&str, &str)] = &[
    ("ep discovered check", "3k4/3p4/8/K1P4r/8/8/8/8 b - - 0 1"),
    ("bishop pin", "8/8/4k3/8/2p5/8/B2P2K1/8 w - - 0 1"),
    ("ep evades check", "8/8/1k6/2b5/2pP4/8/5K2/8 b - d3 0 1"),
    ("ep exposes king on rank", "8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1"),
    ("short castle gives check", "5k2/8/8/8/8/8/8/4K2R w K - 0 1"),
    ("long castle gives check", "3k4/8/8/8/8/8/8/R3K3 w Q - 0 1"),
    ("castling rights lost", "r3k2r/1b4bq/8/8/8/8/7B/R3K2R w KQkq - 0 1"),
    ("castling prevented", "r3k2r/8/3Q4/8/8/5q2/8/R3K2R b KQkq - 0 1"),
    ("promote out of check", "2K2r2/4P3/8/8/8/8/8/3k4 w - - 0 1"),
    ("discovered check", "8/8/1P2K3/8/2n5/1q6/8/5k2 b - - 0 1"),
    ("promote to give check", "4k3/1P6/8/8/8/8/K7/8 w - - 0 1"),
    ("under promote to give check", "8/P1k5/K7/8/8/8/8/8 w - - 0 1"),
    ("self stalemate", "K1k5/8/P7/8/8/8/8/8 w - - 0 1"),
    ("stalemate and checkmate", "8/k1P5/8/1K6/8/8/8/8 w - - 0 1"),
    ("double check", "8/8/2k5/5q2/5n2/8/5K2/8 b - - 0 1"),
];

fn shakmaty_pos(fen_str: &str) -> Chess {
    let fen: Fen = fen_str.parse().expect("shakmaty fen");
    fen.into_position(CastlingMode::Standard).expect("shakmaty position")
}

fn perft_shakmaty(pos: &Chess, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0u64;
    for m in pos.legal_moves() {
        let mut new_pos = pos.clone();
        new_pos.play_unchecked(&m);
        nodes += perft_shakmaty(&new_pos, depth - 1);
    }
    nodes
}

fn divide_shakmaty(pos: &Chess, depth: u32) -> Vec<(String, u64)> {
    let mut split: Vec<(String, u64)> = pos
        .legal_moves()
        .iter()
        .map(|m| {
            let mut next = pos.clone();
            next.play_unchecked(m);
            (m.to_uci(CastlingMode::Standard).to_string(), perft_shakmaty(&next, depth - 1))
        })
        .collect();
    split.sort();
    split
}

fn divide_sorted<G: MoveGenerator>(board: &mut Board, depth: u32, generator: &G) -> Vec<(String, u64)> {
    let mut split: Vec<(String, u64)> = divide_with(board, depth, generator)
        .into_iter()
        .map(|(mv, n)| (move_to_uci(mv), n))
        .collect();
    split.sort();
    split
}

#[test]
fn edge_cases_match_shakmaty() {
    arrocco::init();
    for &(name, fen) in EDGE_CASES {
        let pos = shakmaty_pos(fen);
        let mut board = Board::from_fen(fen).expect("valid fen");
        for depth in 1..=3 {
            let expected = perft_shakmaty(&pos, depth);
            assert_eq!(
                perft_with(&mut board, depth, &TableGenerator),
                expected,
                "{} (table) depth {}",
                name,
                depth
            );
            assert_eq!(
                perft_with(&mut board, depth, &ScanGenerator),
                expected,
                "{} (scan) depth {}",
                name,
                depth
            );
        }
    }
}

#[test]
fn divide_matches_shakmaty_move_by_move() {
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "8/8/1k6/2b5/2pP4/8/5K2/8 b - d3 0 1",
    ];
    for fen in fens {
        let pos = shakmaty_pos(fen);
        let mut board = Board::from_fen(fen).unwrap();
        let expected = divide_shakmaty(&pos, 2);
        assert_eq!(divide_sorted(&mut board, 2, &TableGenerator), expected, "{}", fen);
        assert_eq!(divide_sorted(&mut board, 2, &ScanGenerator), expected, "{}", fen);
    }
}

#[test]
fn generators_agree_on_move_sets() {
    let fens = [
        arrocco::board::START_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    ];
    for fen in fens {
        let mut board = Board::from_fen(fen).unwrap();

        let mut table = TableGenerator.legal_moves(&mut board);
        let mut scan = ScanGenerator.legal_moves(&mut board);
        table.sort_unstable();
        scan.sort_unstable();
        assert_eq!(table, scan, "legal moves of {}", fen);

        let mut table = TableGenerator.legal_captures(&mut board);
        let mut scan = ScanGenerator.legal_captures(&mut board);
        table.sort_unstable();
        scan.sort_unstable();
        assert_eq!(table, scan, "captures of {}", fen);
    }
}
