use anyhow::{anyhow, bail, Context};
use arrocco::board::{Board, START_FEN};
use arrocco::movegen::Strategy;
use arrocco::moves::move_to_uci;
use arrocco::perft::{divide_with, perft_with};
use clap::{Parser, ValueEnum};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Generator {
    Scan,
    Table,
}

impl From<Generator> for Strategy {
    fn from(g: Generator) -> Self {
        match g {
            Generator::Scan => Strategy::Scan,
            Generator::Table => Strategy::Table,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Count move-tree leaves of a position", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    #[arg(short, long, default_value_t = 4)]
    depth: u32,

    /// Print the count below every root move
    #[arg(long)]
    divide: bool,

    #[arg(short, long, value_enum, default_value_t = Generator::Table)]
    generator: Generator,

    /// Check the result against shakmaty
    #[arg(long)]
    compare: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    arrocco::init();
    if args.divide && args.depth == 0 {
        bail!("--divide needs a depth of at least 1");
    }

    let mut board = Board::from_fen(&args.fen).with_context(|| format!("bad fen {:?}", args.fen))?;
    let strategy = Strategy::from(args.generator);
    println!("Running perft on FEN: '{}' at depth {} ({:?})", args.fen, args.depth, args.generator);

    let start = Instant::now();
    let (nodes, per_move) = if args.divide {
        let split = divide_with(&mut board, args.depth, &strategy);
        let per_move: BTreeMap<String, u64> = split.iter().map(|&(mv, n)| (move_to_uci(mv), n)).collect();
        (split.iter().map(|&(_, n)| n).sum(), Some(per_move))
    } else {
        (perft_with(&mut board, args.depth, &strategy), None)
    };
    let duration = start.elapsed();

    if let Some(per_move) = &per_move {
        for (mv, n) in per_move {
            println!("{}: {}", mv, n);
        }
        println!();
    }
    println!(
        "perft({}) = {} nodes ({} ms, {:.2} Mnps)",
        args.depth,
        nodes,
        duration.as_millis(),
        nodes as f64 / duration.as_micros().max(1) as f64
    );

    if args.compare {
        compare_with_shakmaty(&args.fen, args.depth, nodes, per_move.as_ref())?;
    }
    Ok(())
}

fn compare_with_shakmaty(
    fen: &str,
    depth: u32,
    nodes: u64,
    per_move: Option<&BTreeMap<String, u64>>,
) -> anyhow::Result<()> {
    let fen: Fen = fen.parse().map_err(|e| anyhow!("shakmaty rejected fen: {}", e))?;
    let pos: Chess = fen
        .into_position(CastlingMode::Standard)
        .map_err(|e| anyhow!("shakmaty rejected position: {}", e))?;

    let expected = perft_shakmaty(&pos, depth);
    if let Some(ours) = per_move {
        let theirs: BTreeMap<String, u64> = pos
            .legal_moves()
            .iter()
            .map(|m| {
                let mut next = pos.clone();
                next.play_unchecked(m);
                (m.to_uci(CastlingMode::Standard).to_string(), perft_shakmaty(&next, depth.saturating_sub(1)))
            })
            .collect();
        for (mv, n) in &theirs {
            match ours.get(mv) {
                Some(m) if m == n => {}
                Some(m) => println!("{}: ours {} shakmaty {}", mv, m, n),
                None => println!("{}: missing (shakmaty {})", mv, n),
            }
        }
        for mv in ours.keys().filter(|mv| !theirs.contains_key(*mv)) {
            println!("{}: not legal according to shakmaty", mv);
        }
    }

    if expected != nodes {
        bail!("mismatch: ours {} shakmaty {}", nodes, expected);
    }
    println!("shakmaty agrees: {}", expected);
    Ok(())
}

fn perft_shakmaty(pos: &Chess, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    let moves = pos.legal_moves();
    for m in moves {
        let mut new_pos = pos.clone();
        new_pos.play_unchecked(&m);
        nodes += perft_shakmaty(&new_pos, depth - 1);
    }
    nodes
}
