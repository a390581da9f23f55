use arrocco::board::{Board, START_FEN};
use arrocco::movegen::{ScanGenerator, TableGenerator};
use arrocco::perft::perft_with;
use arrocco::search::{Search, SearchParams};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_generators(c: &mut Criterion) {
    arrocco::init();
    let mut group = c.benchmark_group("perft");
    for (name, fen, depth) in [("startpos", START_FEN, 3), ("kiwipete", KIWIPETE, 2)] {
        let mut board = Board::from_fen(fen).expect("valid fen");
        group.bench_with_input(BenchmarkId::new("table", name), &depth, |b, &d| {
            b.iter(|| perft_with(black_box(&mut board), d, &TableGenerator))
        });
        group.bench_with_input(BenchmarkId::new("scan", name), &depth, |b, &d| {
            b.iter(|| perft_with(black_box(&mut board), d, &ScanGenerator))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    c.bench_function("search kiwipete depth 4", |b| {
        b.iter(|| {
            let board = Board::from_fen(KIWIPETE).expect("valid fen");
            let mut search = Search::new(board, 4, SearchParams::default());
            black_box(search.think(4, 0, false))
        })
    });
}

criterion_group!(benches, bench_generators, bench_search);
criterion_main!(benches);
